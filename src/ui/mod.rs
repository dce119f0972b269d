// ui/mod.rs

//! ratatui user interface

use log::*;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::block::{Block, BorderType};
use ratatui::widgets::{Borders, Paragraph};
use ratatui::Frame;

pub mod color;
pub mod header;
mod help;
mod logs;

use crate::app::state::AppState;
use header::{draw_header, HEADER_BLOCK_HEIGHT};
use help::{draw_help, HELP_WIDTH};
use logs::{draw_logs, LOG_BLOCK_HEIGHT};

/// Title of the block containing the whole application.
pub const APP_TITLE: &str = env!("CARGO_PKG_NAME");

const BODY_MIN_HEIGHT: u16 = 1;
const HINT: &str = "Press <h> for help";

/// Render all blocks.
pub fn render(rect: &mut Frame, state: &AppState) {
    let size = rect.area();
    check_size(&size, state);

    // Root container
    let app_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .title(APP_TITLE);
    let app_area = app_block.inner(size);
    rect.render_widget(app_block, size);

    let mut app_constraints = vec![
        Constraint::Length(HEADER_BLOCK_HEIGHT),
        Constraint::Min(BODY_MIN_HEIGHT),
    ];
    if state.show_logs {
        app_constraints.push(Constraint::Length(LOG_BLOCK_HEIGHT));
    }

    // Vertical layout
    let app_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(app_constraints)
        .split(app_area);

    // Header
    let header = draw_header(&state.header);
    rect.render_widget(header, app_rows[0]);

    // Body: hint, help
    let mut body_constraints = vec![Constraint::Min(0)];
    if state.show_help {
        body_constraints.push(Constraint::Length(HELP_WIDTH));
    }
    let body_columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(body_constraints)
        .split(app_rows[1]);

    let hint = Paragraph::new(HINT)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    rect.render_widget(hint, body_columns[0]);

    if state.show_help {
        let help = draw_help(&state.actions);
        rect.render_widget(help, body_columns[1]);
    }

    // Logs
    if state.show_logs {
        let logs = draw_logs();
        rect.render_widget(logs, app_rows[2]);
    }
}

/// Traces when terminal size constraints are not respected.
fn check_size(rect: &Rect, state: &AppState) {
    let mut min_height = HEADER_BLOCK_HEIGHT + BODY_MIN_HEIGHT + 2;
    if state.show_logs {
        min_height += LOG_BLOCK_HEIGHT
    };
    if rect.height < min_height {
        trace!("Require height >= {}, (got {})", min_height, rect.height);
    }
    if state.show_help && rect.width < HELP_WIDTH + 2 {
        trace!("Require width >= {}, (got {})", HELP_WIDTH + 2, rect.width);
    }
}
