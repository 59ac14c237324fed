//! 可选的 TOML 配置文件与数据目录的解析。

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::fsrs::{FsrsScheduler, DEFAULT_RETENTION};
use crate::scheduler::{LadderScheduler, DEFAULT_AGAIN_MINUTES, DEFAULT_GOOD_MINUTES};

pub const DATA_ENV: &str = "KANA_DRILL_DATA";
pub const DEFAULT_FEEDBACK_MS: u64 = 1000;
const APP_DIR: &str = "kana-drill";

/// config.toml 示例：
///
/// ```toml
/// data_dir = "/home/me/.kana"
/// feedback_ms = 800
///
/// [schedule]
/// kind = "fsrs"            # 或 "ladder"
/// request_retention = 0.85
/// # 以下两项只对 ladder 生效
/// again_minutes = [1, 10, 60]
/// good_minutes = [10, 1440, 4320]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub feedback_ms: Option<u64>,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerKind {
    #[default]
    Fsrs,
    Ladder,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub kind: SchedulerKind,
    pub request_retention: Option<f64>,
    pub again_minutes: Option<Vec<f64>>,
    pub good_minutes: Option<Vec<f64>>,
}

impl ScheduleConfig {
    pub fn fsrs(&self) -> FsrsScheduler {
        FsrsScheduler::new(self.request_retention.unwrap_or(DEFAULT_RETENTION))
    }

    pub fn ladder(&self) -> LadderScheduler {
        LadderScheduler::new(
            self.again_minutes
                .clone()
                .unwrap_or_else(|| DEFAULT_AGAIN_MINUTES.to_vec()),
            self.good_minutes
                .clone()
                .unwrap_or_else(|| DEFAULT_GOOD_MINUTES.to_vec()),
        )
    }
}

impl Config {
    /// 文件不存在时返回默认配置；存在但解析失败时报错
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("配置文件 {} 不存在，使用默认配置", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let cfg: Config = toml::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        Ok(cfg)
    }

    pub fn feedback_ms(&self, cli: Option<u64>) -> u64 {
        cli.or(self.feedback_ms).unwrap_or(DEFAULT_FEEDBACK_MS)
    }
}

/// `<config_dir>/kana-drill/config.toml`，取不到系统配置目录时用当前目录
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".").join(format!(".{}", APP_DIR)))
        .join("config.toml")
}

/// 优先级：命令行 > 环境变量 > 配置文件 > 系统数据目录 > ./.kana-drill
pub fn resolve_data_dir(cli: Option<&Path>, env: Option<String>, cfg: &Config) -> PathBuf {
    if let Some(p) = cli {
        return p.to_path_buf();
    }
    if let Some(p) = env.filter(|s| !s.trim().is_empty()) {
        return PathBuf::from(p);
    }
    if let Some(p) = &cfg.data_dir {
        return p.clone();
    }
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_DIR)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{Grade, Scheduler};
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = Config::load(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.feedback_ms(None), DEFAULT_FEEDBACK_MS);
    }

    #[test]
    fn parses_schedule_section() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            "feedback_ms = 500\n[schedule]\ngood_minutes = [5.0, 30.0]\n",
        )
        .unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.feedback_ms(None), 500);
        assert_eq!(cfg.feedback_ms(Some(200)), 200);
        assert_eq!(cfg.schedule.again_minutes, None);
        assert_eq!(cfg.schedule.kind, SchedulerKind::Fsrs);

        let s = cfg.schedule.ladder();
        let now = Utc::now();
        let c = s.advance(&s.new_card(now), Grade::Good, now);
        assert_eq!(s.due(&c).unwrap() - now, Duration::minutes(5));
    }

    #[test]
    fn picks_scheduler_kind_and_retention() {
        let cfg: Config =
            toml::from_str("[schedule]\nkind = \"ladder\"\nrequest_retention = 0.9\n").unwrap();
        assert_eq!(cfg.schedule.kind, SchedulerKind::Ladder);
        assert_eq!(cfg.schedule.fsrs().retention(), 0.9);
        assert_eq!(Config::default().schedule.fsrs().retention(), DEFAULT_RETENTION);
    }

    #[test]
    fn huge_ladder_rung_does_not_break_grading() {
        let cfg: Config = toml::from_str("[schedule]\ngood_minutes = [1e13]\n").unwrap();
        let s = cfg.schedule.ladder();
        let now = Utc::now();
        let c = s.advance(&s.new_card(now), Grade::Good, now);
        assert_eq!(s.due(&c).unwrap() - now, Duration::minutes(10));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "feedback_ms = \"soon\"").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("解析配置文件失败"));
    }

    #[test]
    fn data_dir_precedence() {
        let cfg = Config {
            data_dir: Some(PathBuf::from("/from/config")),
            ..Default::default()
        };
        assert_eq!(
            resolve_data_dir(Some(Path::new("/from/cli")), Some("/from/env".into()), &cfg),
            PathBuf::from("/from/cli")
        );
        assert_eq!(
            resolve_data_dir(None, Some("/from/env".into()), &cfg),
            PathBuf::from("/from/env")
        );
        assert_eq!(
            resolve_data_dir(None, Some("  ".into()), &cfg),
            PathBuf::from("/from/config")
        );
        let fallback = resolve_data_dir(None, None, &Config::default());
        assert!(fallback.to_string_lossy().ends_with("kana-drill"));
    }
}
