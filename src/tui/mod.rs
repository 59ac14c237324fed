mod app;
pub mod theme;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use kana_drill::{Scheduler, Session};
use ratatui::prelude::*;

use app::App;
use theme::ThemeKind;

pub fn run<S: Scheduler>(
    session: Session<S>,
    theme: ThemeKind,
    feedback_delay: Duration,
) -> Result<()> {
    let mut app = App::new(session, theme, feedback_delay);

    // TUI 初始化
    enable_raw_mode().context("开启 raw mode 失败")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_loop(&mut terminal, &mut app);

    // 退出还原
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn run_loop<B: Backend, S: Scheduler>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;
        if app.quit {
            return Ok(());
        }

        // 轮询间隔要短于反馈停留时间
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Press {
                    app.handle_key(k, Instant::now());
                }
            }
        }
        app.tick(Instant::now());
    }
}
