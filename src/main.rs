// 基于 ratatui + crossterm 的假名读音练习 TUI
// 功能：
// - 平假名 / 片假名按行选择练习范围
// - 逐键判定罗马音输入，答对自动切题，答错显示正确读音后切题
// - FSRS 间隔复习（可在配置里换成固定阶梯），记忆与统计写回数据目录下的 JSON
// - 子命令 stats / reset 不进入 TUI

mod tui;

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kana_drill::{
    config,
    config::{Config, SchedulerKind},
    JsonDirStore, Scheduler, Session,
};

use tui::theme::ThemeKind;

#[derive(Debug, Clone, Parser)]
#[command(name = "kana-drill", about = "假名读音练习 TUI 工具", version)]
struct Cli {
    /// 数据目录，默认读取环境变量 KANA_DRILL_DATA、配置文件或系统数据目录
    #[arg(long = "data-dir", short = 'd')]
    data_dir: Option<PathBuf>,

    /// 配置文件路径，默认 <config_dir>/kana-drill/config.toml
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 主题（外观）：dark | light；设置里选了 light/dark 时以设置为准
    #[arg(long = "theme", value_enum, default_value_t = ThemeKind::Dark)]
    theme: ThemeKind,

    /// 答错后反馈停留的毫秒数，0 表示立即切题
    #[arg(long = "feedback-ms")]
    feedback_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// 打印累计统计与到期数量
    Stats,
    /// 清空全部记忆与统计（设置保留）
    Reset {
        /// 跳过确认
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let cfg = Config::load(&config_path)?;
    let data_dir = config::resolve_data_dir(
        cli.data_dir.as_deref(),
        std::env::var(config::DATA_ENV).ok(),
        &cfg,
    );
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("创建数据目录失败: {}", data_dir.display()))?;
    init_logger(&data_dir)?;

    let store = JsonDirStore::new(&data_dir);
    log::info!("数据目录 {}", store.dir().display());
    match cfg.schedule.kind {
        SchedulerKind::Fsrs => {
            launch(cli, &cfg, &data_dir, Session::new(cfg.schedule.fsrs(), store))
        }
        SchedulerKind::Ladder => {
            launch(cli, &cfg, &data_dir, Session::new(cfg.schedule.ladder(), store))
        }
    }
}

fn launch<S: Scheduler>(
    cli: Cli,
    cfg: &Config,
    data_dir: &Path,
    session: Session<S>,
) -> Result<()> {
    match cli.command {
        Some(Command::Stats) => print_stats(session),
        Some(Command::Reset { yes }) => reset(session, data_dir, yes),
        None => tui::run(
            session,
            cli.theme,
            Duration::from_millis(cfg.feedback_ms(cli.feedback_ms)),
        ),
    }
}

/// 日志写到数据目录下的文件，避免弄乱备用屏幕
fn init_logger(data_dir: &Path) -> Result<()> {
    let path = data_dir.join("kana-drill.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("打开日志文件失败: {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn print_stats<S: Scheduler>(mut session: Session<S>) -> Result<()> {
    session.init();
    let st = session.stats();
    let active = session.active_items().len();
    println!("正确      {}", st.correct);
    println!("错误      {}", st.incorrect);
    match st.accuracy() {
        Some(acc) => println!("准确率    {}%", acc),
        None => println!("准确率    -"),
    }
    match st.average_secs() {
        Some(avg) => println!("平均用时  {:.1}s", avg),
        None => println!("平均用时  -"),
    }
    println!("练习范围  {}", active);
    println!("已到期    {}/{}", session.due_count(), active);
    Ok(())
}

fn reset<S: Scheduler>(mut session: Session<S>, data_dir: &Path, yes: bool) -> Result<()> {
    if !yes {
        print!("清空 {} 下的全部记忆与统计？[y/N] ", data_dir.display());
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin()
            .read_line(&mut line)
            .context("读取确认输入失败")?;
        if !matches!(line.trim(), "y" | "Y") {
            println!("已取消");
            return Ok(());
        }
    }
    session.init();
    session.reset_progress();
    println!("已重置");
    Ok(())
}
