//! Panel showing log messages

use ratatui::{
    style::{Color, Style},
    widgets::{Block, BorderType, Borders},
};
use tui_logger::TuiLoggerWidget;

pub(crate) const LOG_BLOCK_HEIGHT: u16 = 10;

// Draw the logs panel
pub(crate) fn draw_logs<'a>() -> TuiLoggerWidget<'a> {
    TuiLoggerWidget::default()
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Blue))
        .style_debug(Style::default().fg(Color::Green))
        .style_trace(Style::default().fg(Color::Gray))
        .block(
            Block::default()
                .title("Logs")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
}
