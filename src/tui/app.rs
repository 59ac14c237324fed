use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use kana_drill::{
    Feedback, FsrsScheduler, Group, JudgeState, Judgment, Prompt, Scheduler, Session, SettingsPatch,
};

use super::theme::{self, Theme, ThemeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Settings,
    ConfirmReset,
}

/// 最近一次判定的反馈
#[derive(Debug, Clone)]
pub struct Shown {
    pub glyph: &'static str,
    pub correct: bool,
    pub feedback: Feedback,
}

pub struct App<S: Scheduler = FsrsScheduler> {
    pub session: Session<S>,
    pub prompt: Option<Prompt>,
    pub input: String,
    pub last: Option<Shown>,
    /// 答错后自动切题的时间点
    pub advance_at: Option<Instant>,
    pub feedback_delay: Duration,
    pub overlay: Overlay,
    pub group_cursor: usize,
    pub base_theme: ThemeKind,
    pub theme: Theme,
    pub status: String,
    pub quit: bool,
}

impl<S: Scheduler> App<S> {
    pub fn new(mut session: Session<S>, base_theme: ThemeKind, feedback_delay: Duration) -> Self {
        session.init();
        let prompt = session.next();
        let theme = theme::theme_of(theme::resolve(session.settings().theme, base_theme));
        Self {
            session,
            prompt,
            input: String::new(),
            last: None,
            advance_at: None,
            feedback_delay,
            overlay: Overlay::None,
            group_cursor: 0,
            base_theme,
            theme,
            status: String::from("输入罗马音作答  [Tab]设置  [Esc]退出"),
            quit: false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit = true;
            return;
        }
        match self.overlay {
            Overlay::None => self.handle_drill_key(key, now),
            Overlay::Settings => self.handle_settings_key(key),
            Overlay::ConfirmReset => self.handle_confirm_key(key),
        }
    }

    /// 反馈停留时间到了就切到下一题；设置面板打开时暂停
    pub fn tick(&mut self, now: Instant) {
        if self.overlay != Overlay::None {
            return;
        }
        if let Some(at) = self.advance_at {
            if now >= at {
                self.advance();
            }
        }
    }

    /// 输入仍可能拼成某个读音（空输入也算）
    pub fn input_ok(&self) -> bool {
        self.input.is_empty() || self.session.is_valid_prefix(&self.input)
    }

    pub fn waiting_feedback(&self) -> bool {
        self.session.state() == JudgeState::Resolved
    }

    fn handle_drill_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Tab => {
                self.overlay = Overlay::Settings;
            }
            KeyCode::Enter if self.waiting_feedback() => self.advance(),
            KeyCode::Char(' ') if self.waiting_feedback() => self.advance(),
            KeyCode::Backspace if !self.waiting_feedback() => {
                self.input.pop();
            }
            KeyCode::Char(c) if !c.is_whitespace() => self.type_char(c, now),
            _ => {}
        }
    }

    fn type_char(&mut self, c: char, now: Instant) {
        if self.prompt.is_none() || self.waiting_feedback() {
            return;
        }
        self.input.push(c);
        let verdict = self.session.attempt(&self.input);
        let Some(feedback) = verdict.feedback else {
            return;
        };
        let glyph = self.prompt.map(|p| p.glyph).unwrap_or_default();
        match verdict.judgment {
            Judgment::Correct => {
                self.last = Some(Shown {
                    glyph,
                    correct: true,
                    feedback,
                });
                self.advance();
            }
            Judgment::Incorrect => {
                self.last = Some(Shown {
                    glyph,
                    correct: false,
                    feedback,
                });
                if self.feedback_delay.is_zero() {
                    self.advance();
                } else {
                    self.advance_at = Some(now + self.feedback_delay);
                }
            }
            Judgment::Pending => {}
        }
    }

    fn advance(&mut self) {
        self.input.clear();
        self.advance_at = None;
        self.prompt = self.session.next();
    }

    // ---------------- 设置面板 ----------------
    fn handle_settings_key(&mut self, key: KeyEvent) {
        let settings = self.session.settings().clone();
        match key.code {
            KeyCode::Esc | KeyCode::Tab | KeyCode::Char('q') => self.close_settings(),
            KeyCode::Char('h') => self
                .session
                .update_settings(SettingsPatch::hiragana(!settings.hiragana)),
            KeyCode::Char('k') => self
                .session
                .update_settings(SettingsPatch::katakana(!settings.katakana)),
            KeyCode::Up => {
                self.group_cursor = self.group_cursor.saturating_sub(1);
            }
            KeyCode::Down => {
                self.group_cursor = (self.group_cursor + 1).min(Group::ALL.len() - 1);
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let g = Group::ALL[self.group_cursor];
                let mut groups = settings.groups;
                if !groups.remove(&g) {
                    groups.insert(g);
                }
                self.session.update_settings(SettingsPatch::groups(groups));
            }
            KeyCode::Char('a') => {
                let groups: Vec<Group> = if settings.groups.len() == Group::ALL.len() {
                    Vec::new()
                } else {
                    Group::ALL.to_vec()
                };
                self.session.update_settings(SettingsPatch::groups(groups));
            }
            KeyCode::Char('t') => {
                self.session
                    .update_settings(SettingsPatch::theme(settings.theme.cycle()));
                self.refresh_theme();
            }
            KeyCode::Char('R') => {
                self.overlay = Overlay::ConfirmReset;
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.session.reset_progress();
                self.last = None;
                self.overlay = Overlay::None;
                self.status = String::from("进度已清空");
                self.advance();
            }
            _ => {
                self.overlay = Overlay::Settings;
            }
        }
    }

    /// 关闭面板时，若当前题已不在练习范围内就换题
    fn close_settings(&mut self) {
        self.overlay = Overlay::None;
        let active = self.session.active_items();
        let still_active = self
            .prompt
            .map(|p| active.iter().any(|i| i.glyph == p.glyph))
            .unwrap_or(false);
        if !still_active {
            self.advance();
        }
    }

    fn refresh_theme(&mut self) {
        self.theme = theme::theme_of(theme::resolve(
            self.session.settings().theme,
            self.base_theme,
        ));
    }
}
