// ui/header.rs

//! Header block showing the logo and title, colored by the configured mode.

use log::*;
use ratatui::layout::Alignment;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::block::{Block, BorderType};
use ratatui::widgets::{Borders, Paragraph};

use super::color::parse_color;
use crate::header::{ConfigAwareHeader, HeaderStyle, TITLE_TEXT};

/// Static logo drawn above the title.
pub(crate) const LOGO: [&str; 5] = [
    r"    __    ",
    r" __/  \__ ",
    r"/  \__/  \",
    r"\__/  \__/",
    r"   \__/   ",
];

/// Logo, an empty line, the title and the borders.
pub const HEADER_BLOCK_HEIGHT: u16 = LOGO.len() as u16 + 4;

/// Draw the header. The logo and title are always present, the background
/// is only painted once a mode has been received.
pub fn draw_header<'a>(header: &ConfigAwareHeader) -> Paragraph<'a> {
    let mut lines: Vec<Line> = LOGO.iter().map(|row| Line::from(*row)).collect();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        TITLE_TEXT,
        Style::default().add_modifier(Modifier::BOLD),
    )));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(terminal_style(header.style().as_ref()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
}

/// Terminal style for a computed header style.
/// A color the terminal cannot paint leaves the default style.
pub(crate) fn terminal_style(style: Option<&HeaderStyle>) -> Style {
    match style.map(|s| parse_color(&s.background_color)) {
        Some(Ok(color)) => Style::default().bg(color),
        Some(Err(_)) | None => Style::default(),
    }
}

/// Logs a warning if the header style cannot be painted in a terminal.
pub fn warn_if_unpaintable(style: Option<&HeaderStyle>) {
    if let Some(style) = style {
        if let Err(e) = parse_color(&style.background_color) {
            warn!(
                "Mode {:?} cannot be painted in the terminal: {}",
                style.background_color, e
            );
        }
    }
}
