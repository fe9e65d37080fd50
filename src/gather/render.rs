//! Status and help lines below the panels.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::Paragraph;
use ratzilla::ratatui::Frame;

use crate::input::ClickState;
use crate::scene::ActionId;

use super::actions::{LOAD_GAME, SAVE_GAME, START_OVER, TOGGLE_GATHER, UPGRADE_CARDS};

/// Rows reserved at the bottom of the screen.
pub const FOOTER_ROWS: u16 = 2;

const HELP_BUTTONS: [(&str, ActionId); 5] = [
    (" [G] Toggle ", TOGGLE_GATHER),
    (" [S] Save ", SAVE_GAME),
    (" [L] Load ", LOAD_GAME),
    (" [U] Upgrade ", UPGRADE_CARDS),
    (" [R] Restart ", START_OVER),
];

const HELP_KEYS: &str = " 1-9 gather  n reveal  x drop  j/k scroll";

pub fn render_footer(f: &mut Frame, area: Rect, status: Option<&str>, cs: &mut ClickState) {
    if area.height < FOOTER_ROWS {
        return;
    }
    let status_row = Rect::new(area.x, area.bottom() - 2, area.width, 1);
    let help_row = Rect::new(area.x, area.bottom() - 1, area.width, 1);

    let status = Paragraph::new(Line::from(Span::styled(
        format!(" {}", status.unwrap_or("")),
        Style::default().fg(Color::Yellow),
    )));
    f.render_widget(status, status_row);

    let button_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::new();
    let mut x = help_row.x;
    for (label, action) in HELP_BUTTONS {
        let width = label.chars().count() as u16;
        let visible = width.min(help_row.right().saturating_sub(x));
        if visible > 0 {
            cs.add_click_target(Rect::new(x, help_row.y, visible, 1), action);
        }
        x = x.saturating_add(width + 1);
        spans.push(Span::styled(label, button_style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(HELP_KEYS, Style::default().fg(Color::DarkGray)));
    f.render_widget(Paragraph::new(Line::from(spans)), help_row);
}
