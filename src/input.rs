//! Shared input handling: pixel-to-cell conversion, click targets, and event types.

use ratzilla::ratatui::layout::Rect;

use crate::scene::{ActionId, Point};

/// Input events normalized from keyboard, mouse and touch sources.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key press from keyboard.
    Key(char),
    /// A tap on a registered target, identified by its action ID.
    Click(ActionId),
}

/// A region on screen that can be tapped to trigger an action.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    /// Hit region in terminal cell coordinates.
    pub rect: Rect,
    pub action_id: ActionId,
}

/// Shared state between the render loop and the pointer handlers.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: ActionId) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Hit-test a cell against all registered targets.
    /// Later registrations are drawn on top, so they win on overlap.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<ActionId> {
        self.targets.iter().rev().find_map(|t| {
            let r = &t.rect;
            if col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height {
                Some(t.action_id)
            } else {
                None
            }
        })
    }

    /// Hit-test a fractional cell position.
    pub fn hit_test_point(&self, p: Point) -> Option<ActionId> {
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        self.hit_test(p.x.floor() as u16, p.y.floor() as u16)
    }
}

/// Pixel geometry of the DOM grid that hosts the terminal.
#[derive(Debug, Clone, Copy)]
pub struct GridMetrics {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub cols: u16,
    pub rows: u16,
}

impl GridMetrics {
    /// Convert client pixels to fractional cell coordinates.
    ///
    /// Positions outside the grid are still converted (a drag keeps tracking
    /// when the pointer leaves the grid). Returns `None` only for a grid with
    /// no measurable size.
    pub fn to_cell(&self, px: f64, py: f64) -> Option<Point> {
        if self.width <= 0.0 || self.height <= 0.0 || self.cols == 0 || self.rows == 0 {
            return None;
        }
        let cell_w = self.width / self.cols as f64;
        let cell_h = self.height / self.rows as f64;
        Some(Point::new((px - self.left) / cell_w, (py - self.top) / cell_h))
    }
}
