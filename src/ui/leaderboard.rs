use crate::store::LeaderboardEntry;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use super::theme::Palette;

pub const EMPTY_LEADERBOARD: &str = "No scores yet. Be the first!";

/// `rank` is 1-based
pub fn format_entry(rank: usize, entry: &LeaderboardEntry) -> String {
    format!(
        "{}. {} - WPM: {:.2}, Accuracy: {:.2}%",
        rank, entry.username, entry.max_wpm, entry.max_accuracy
    )
}

pub fn format_leaderboard(entries: &[LeaderboardEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec![EMPTY_LEADERBOARD.to_string()];
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format_entry(i + 1, entry))
        .collect()
}

pub fn render_leaderboard(
    title: &str,
    entries: &[LeaderboardEntry],
    highlight: Option<&str>,
    palette: &Palette,
    area: Rect,
    buf: &mut Buffer,
) {
    let lines: Vec<Line> = if entries.is_empty() {
        vec![Line::from(Span::styled(EMPTY_LEADERBOARD, palette.muted))]
    } else {
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if highlight == Some(entry.username.as_str()) {
                    palette.title
                } else {
                    palette.base
                };
                Line::from(Span::styled(format_entry(i + 1, entry), style))
            })
            .collect()
    };

    Paragraph::new(lines)
        .style(palette.base)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title.to_string(), palette.title)),
        )
        .render(area, buf);
}
