use kana_drill::{Group, KanaSet, Scheduler};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::app::{App, Overlay};

pub fn draw<S: Scheduler>(f: &mut Frame, app: &App<S>) {
    // 顶栏 + 出题区 + 输入框 + 底栏
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, v[0], app);
    draw_prompt(f, v[1], app);
    draw_input(f, v[2], app);
    draw_footer(f, v[3], app);

    match app.overlay {
        Overlay::Settings => draw_settings(f, app),
        Overlay::ConfirmReset => draw_confirm(f, app),
        Overlay::None => {}
    }
}

fn draw_header<S: Scheduler>(f: &mut Frame, area: Rect, app: &App<S>) {
    let th = app.theme;
    let settings = app.session.settings();
    let sets = [KanaSet::Hiragana, KanaSet::Katakana]
        .into_iter()
        .filter(|s| settings.set_enabled(*s))
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join("+");
    let mut segs = vec![
        Span::styled(
            " Kana · Drill ",
            Style::default().fg(th.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | set:", Style::default().fg(th.muted)),
        Span::styled(
            if sets.is_empty() { "-".to_string() } else { sets },
            Style::default().fg(th.fg),
        ),
        Span::styled(" | groups:", Style::default().fg(th.muted)),
        Span::styled(
            format!("{}/{}", settings.groups.len(), Group::ALL.len()),
            Style::default().fg(th.fg),
        ),
        Span::styled(" | due:", Style::default().fg(th.muted)),
        Span::styled(
            format!("{}", app.session.due_count()),
            Style::default().fg(th.warn),
        ),
    ];

    // 作答前不显示统计
    let stats = app.session.stats();
    if stats.responses > 0 {
        segs.push(Span::styled(" | ", Style::default().fg(th.muted)));
        segs.push(Span::styled(
            format!("✓{} ", stats.correct),
            Style::default().fg(th.good),
        ));
        segs.push(Span::styled(
            format!("✗{} ", stats.incorrect),
            Style::default().fg(th.bad),
        ));
        if let Some(acc) = stats.accuracy() {
            segs.push(Span::styled(
                format!("{}% ", acc),
                Style::default().fg(th.fg),
            ));
        }
        if let Some(avg) = stats.average_secs() {
            segs.push(Span::styled(
                format!("avg {:.1}s", avg),
                Style::default().fg(th.muted),
            ));
        }
    }
    let para = Paragraph::new(Line::from(segs)).style(Style::default().bg(th.bar_bg).fg(th.fg));
    f.render_widget(para, area);
}

/// 按显示宽度补空格，让全角字符在窄终端里也能居中
fn pad_center(s: &str, width: u16) -> String {
    let w = UnicodeWidthStr::width(s);
    let left = (width as usize).saturating_sub(w) / 2;
    format!("{}{}", " ".repeat(left), s)
}

fn draw_prompt<S: Scheduler>(f: &mut Frame, area: Rect, app: &App<S>) {
    let th = app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(th.muted));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = Vec::new();
    let top = inner.height.saturating_sub(4) / 2;
    for _ in 0..top {
        lines.push(Line::from(""));
    }

    match app.prompt {
        Some(p) => {
            let color = if app.waiting_feedback() { th.bad } else { th.fg };
            lines.push(Line::from(Span::styled(
                pad_center(p.glyph, inner.width),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
        }
        None => {
            lines.push(Line::from(Span::styled(
                pad_center("没有可练习的假名，按 Tab 打开设置", inner.width),
                Style::default().fg(th.muted),
            )));
        }
    }
    lines.push(Line::from(""));

    if let Some(last) = &app.last {
        let fb = &last.feedback;
        let (text, color) = if last.correct {
            (
                format!("{} = {} · 下次 {} · {}ms", last.glyph, fb.answer, fb.interval, fb.latency_ms),
                th.good,
            )
        } else {
            (
                format!("{} = {} · 下次 {}", last.glyph, fb.answer, fb.interval),
                th.bad,
            )
        };
        let style = if app.waiting_feedback() {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(th.muted)
        };
        lines.push(Line::from(Span::styled(pad_center(&text, inner.width), style)));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_input<S: Scheduler>(f: &mut Frame, area: Rect, app: &App<S>) {
    let th = app.theme;
    // 已不可能答对时整行标红
    let color = if app.input_ok() { th.fg } else { th.bad };
    let block = Block::default()
        .title(Span::styled(" 罗马音 ", Style::default().fg(th.accent)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.input_ok() { th.muted } else { th.bad }));
    let line = Line::from(vec![
        Span::styled(app.input.as_str(), Style::default().fg(color)),
        Span::styled("▏", Style::default().fg(th.accent)),
    ]);
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_footer<S: Scheduler>(f: &mut Frame, area: Rect, app: &App<S>) {
    let th = app.theme;
    let tips = if app.waiting_feedback() {
        " [Enter/Space]下一题  [Tab]设置  [Esc]退出 "
    } else {
        " [a-z]作答  [Backspace]删除  [Tab]设置  [Esc]退出 "
    };
    let line = Line::from(vec![
        Span::styled(tips, Style::default().fg(th.muted)),
        Span::styled(format!(" {}", app.status), Style::default().fg(th.fg)),
    ]);
    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(th.bar_bg)),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1]);
    horiz[1]
}

fn check(on: bool) -> &'static str {
    if on {
        "[x]"
    } else {
        "[ ]"
    }
}

fn draw_settings<S: Scheduler>(f: &mut Frame, app: &App<S>) {
    let th = app.theme;
    let settings = app.session.settings();
    let area = centered_rect(60, 80, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(Span::styled(
            " 设置  [h/k]平/片假名 [↑/↓ Space]行 [a]全选 [t]主题 [R]重置 [Esc]关闭 ",
            Style::default().fg(th.accent),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(th.muted));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(inner);

    let head = vec![
        Line::from(format!("{} hiragana", check(settings.hiragana))),
        Line::from(format!("{} katakana", check(settings.katakana))),
        Line::from(Span::styled(
            format!("theme: {}", settings.theme.as_str()),
            Style::default().fg(th.muted),
        )),
        Line::from(Span::styled(
            format!("练习范围 {} 个", app.session.active_items().len()),
            Style::default().fg(th.muted),
        )),
    ];
    f.render_widget(Paragraph::new(head).style(Style::default().fg(th.fg)), parts[0]);

    let items: Vec<ListItem> = Group::ALL
        .iter()
        .map(|g| {
            ListItem::new(format!(
                "{} {}",
                check(settings.groups.contains(g)),
                g.as_str()
            ))
        })
        .collect();
    let list = List::new(items)
        .style(Style::default().fg(th.fg))
        .highlight_style(Style::default().bg(th.selection_bg).fg(th.accent));
    let mut state = ListState::default();
    state.select(Some(app.group_cursor));
    f.render_stateful_widget(list, parts[1], &mut state);
}

fn draw_confirm<S: Scheduler>(f: &mut Frame, app: &App<S>) {
    let th = app.theme;
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(Span::styled(" 重置进度 ", Style::default().fg(th.bad)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(th.bad));
    let para = Paragraph::new(vec![
        Line::from("清空全部记忆与统计，无法恢复。"),
        Line::from(Span::styled(
            "[y] 确认   其他键取消",
            Style::default().fg(th.warn),
        )),
    ])
    .alignment(Alignment::Center)
    .style(Style::default().fg(th.fg))
    .block(block);
    f.render_widget(para, area);
}
