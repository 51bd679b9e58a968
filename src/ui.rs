pub mod leaderboard;
pub mod theme;

use std::time::Instant;

use itertools::{EitherOrBoth, Itertools};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{
    app::{App, AppState, Notice},
    session::{Grading, Session},
    streak::STREAK_ACCURACY_THRESHOLD,
};
use theme::Palette;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;
const TITLE: &str = "AccuType ⌨️  Typing Speed Tester";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = Palette::for_theme(self.theme);
        buf.set_style(area, palette.base);

        match (self.state, self.controller.session()) {
            (AppState::Practice, Some(session)) => {
                render_practice(self, session, &palette, Instant::now(), area, buf)
            }
            _ => render_login(self, &palette, area, buf),
        }
    }
}

fn render_login(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Length(1), // difficulty / theme
            Constraint::Length(3), // username box
            Constraint::Length(1), // notice
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(TITLE, palette.title))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        format!("Difficulty: {}   Theme: {}", app.difficulty, app.theme),
        palette.muted,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let inner_width = chunks[2].width.saturating_sub(2) as usize;
    Paragraph::new(Span::styled(
        visible_tail(&app.login_buffer, inner_width.saturating_sub(1)).to_string() + "▏",
        palette.base,
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled("Enter your username", palette.title)),
    )
    .render(chunks[2], buf);

    render_notice(app.notice.as_ref(), palette, chunks[3], buf);

    Paragraph::new(Span::styled(
        "(enter) login / (tab) difficulty / (ctrl+t) theme / (esc) quit",
        palette.muted,
    ))
    .render(chunks[5], buf);
}

fn render_practice(
    app: &App,
    session: &Session,
    palette: &Palette,
    now: Instant,
    area: Rect,
    buf: &mut Buffer,
) {
    let inner_width = area.width.saturating_sub(HORIZONTAL_MARGIN * 2 + 2).max(1);
    let passage_lines = (session.passage.width() as f64 / inner_width as f64).ceil() as u16;
    let results_height = if session.last_grading.is_some() { 7 } else { 1 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),                  // title + status
            Constraint::Length(passage_lines + 2),  // passage
            Constraint::Length(3),                  // input
            Constraint::Length(results_height),     // progress or results
            Constraint::Length(1),                  // notice
            Constraint::Min(3),                     // leaderboard
            Constraint::Length(1),                  // legend
        ])
        .split(area);

    let status = Line::from(vec![
        Span::styled(TITLE, palette.title),
        Span::styled(
            format!(
                "   {} | {} | streak {} | {} theme",
                session.username, session.difficulty, session.streak, app.theme
            ),
            palette.muted,
        ),
    ]);
    Paragraph::new(status).render(chunks[0], buf);

    Paragraph::new(Line::from(passage_spans(&session.passage, &session.input, palette)))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(Span::styled(
            format!("Difficulty: {}", session.difficulty),
            palette.title,
        )))
        .render(chunks[1], buf);

    let input_width = chunks[2].width.saturating_sub(2) as usize;
    let input_title = if session.submitted {
        "Your Text (submitted)"
    } else {
        "Your Text (typing only, no paste)"
    };
    Paragraph::new(Span::styled(
        visible_tail(&session.input, input_width).to_string(),
        palette.base,
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(input_title, palette.title)),
    )
    .render(chunks[2], buf);

    match (&session.last_grading, session.progress(now)) {
        (Some(grading), _) => render_results(grading, palette, chunks[3], buf),
        (None, Some(ratio)) => {
            Gauge::default()
                .gauge_style(palette.gauge)
                .ratio(ratio)
                .label(format!("{:.0}s", session.elapsed(now).as_secs_f64()))
                .render(chunks[3], buf);
        }
        (None, None) => {
            Paragraph::new(Span::styled(
                "Start typing below to start the clock",
                palette.muted,
            ))
            .render(chunks[3], buf);
        }
    }

    render_notice(app.notice.as_ref(), palette, chunks[4], buf);

    leaderboard::render_leaderboard(
        &format!("🏆 Leaderboard - {}", session.difficulty),
        &app.leaderboard,
        Some(&session.username),
        palette,
        chunks[5],
        buf,
    );

    Paragraph::new(Span::styled(
        "(enter) submit / (ctrl+n) new passage / (tab) difficulty / (ctrl+t) theme / (ctrl+l) logout / (esc) quit",
        palette.muted,
    ))
    .render(chunks[6], buf);
}

fn render_results(grading: &Grading, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let lines = result_lines(grading)
        .into_iter()
        .map(|line| Line::from(Span::styled(line, palette.base)))
        .collect::<Vec<_>>();

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled("🎯 Results", palette.title)),
        )
        .render(area, buf);
}

fn render_notice(notice: Option<&Notice>, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let Some(notice) = notice else {
        return;
    };
    let (text, style) = match notice {
        Notice::Info(text) => (text, palette.info),
        Notice::Warning(text) => (text, palette.warning),
        Notice::Error(text) => (text, palette.error),
    };
    Paragraph::new(Span::styled(text.clone(), style)).render(area, buf);
}

/// Text lines of the results panel
pub fn result_lines(grading: &Grading) -> Vec<String> {
    vec![
        format!("Typing Speed: {:.2} WPM", grading.score.wpm),
        format!("Accuracy: {:.2}%", grading.score.accuracy),
        format!("Time Taken: {:.2} seconds", grading.score.elapsed_secs),
        format!("Badge Earned: {} {}", grading.badge.icon(), grading.badge.label()),
        format!(
            "Current Streak (accuracy ≥ {}%): {}",
            STREAK_ACCURACY_THRESHOLD, grading.streak
        ),
    ]
}

/// Passage characters colored by what was typed at the same position
pub fn passage_spans(passage: &str, input: &str, palette: &Palette) -> Vec<Span<'static>> {
    let cursor = input.chars().count();

    passage
        .chars()
        .zip_longest(input.chars())
        .enumerate()
        .filter_map(|(idx, pair)| match pair {
            EitherOrBoth::Both(expected, typed) if expected == typed => {
                Some(Span::styled(expected.to_string(), palette.correct))
            }
            EitherOrBoth::Both(expected, _) => Some(Span::styled(
                match expected {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                palette.incorrect,
            )),
            EitherOrBoth::Left(expected) if idx == cursor => {
                Some(Span::styled(expected.to_string(), palette.cursor))
            }
            EitherOrBoth::Left(expected) => Some(Span::styled(expected.to_string(), palette.pending)),
            EitherOrBoth::Right(_) => None,
        })
        .collect()
}

/// Longest suffix of `text` that fits in `width` terminal columns
pub fn visible_tail(text: &str, width: usize) -> &str {
    if text.width() <= width {
        return text;
    }
    let mut used = 0;
    let mut start = text.len();
    for (idx, c) in text.char_indices().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = idx;
    }
    &text[start..]
}
