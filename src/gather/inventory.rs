//! Inventory panel: one row per gathered resource.
//!
//! Rows are shared with the cards that feed them through `Rc`/`Weak`; the
//! panel owns the strong references. Cards write counts into the row, and
//! [`InventoryPanel::refresh`] pushes changed text to the scene once a frame.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::scene::{Bounds, SceneHost, VisualId, VisualKind, VisualProps, VisualStyle};

use super::panel::{PanelFrame, TITLE_HEIGHT};

const ROW_PADDING: f64 = 1.0;
const ROW_SPACING: f64 = 0.0;

/// Where newly activated cards get their mirror row.
pub trait RowHost {
    fn create_row(
        &mut self,
        scene: &mut dyn SceneHost,
        id: &str,
        label: &str,
    ) -> Weak<RefCell<InventoryRow>>;
}

#[derive(Debug)]
pub struct InventoryRow {
    id: String,
    label: String,
    count: f64,
    visual: Option<VisualId>,
    shown: String,
}

impl InventoryRow {
    /// A row with no visual, for cards used outside a panel.
    pub fn detached(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            count: 0.0,
            visual: None,
            shown: String::new(),
        }
    }

    #[cfg(test)]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[cfg(test)]
    pub fn count(&self) -> f64 {
        self.count
    }

    pub fn set_count(&mut self, count: f64) {
        self.count = count;
    }

    pub fn text(&self) -> String {
        format!("{}: {}", self.label, self.count)
    }
}

pub struct InventoryPanel {
    frame: PanelFrame,
    content: VisualId,
    cursor_y: f64,
    rows: Vec<Rc<RefCell<InventoryRow>>>,
}

impl InventoryPanel {
    pub fn new(scene: &mut dyn SceneHost, bounds: Bounds, title: &str) -> Self {
        let frame = PanelFrame::new(scene, bounds, title);
        let content = scene.create_visual(
            VisualKind::Group,
            VisualProps::at(Some(frame.root()), 0.0, TITLE_HEIGHT),
        );
        scene.apply_clip(content, frame.content_geometry().clip_rect());
        Self {
            frame,
            content,
            cursor_y: 0.0,
            rows: Vec::new(),
        }
    }

    pub fn set_bounds(&mut self, scene: &mut dyn SceneHost, bounds: Bounds) {
        self.frame.set_bounds(scene, bounds);
        scene.apply_clip(self.content, self.frame.content_geometry().clip_rect());
        for row in &self.rows {
            if let Some(visual) = row.borrow().visual {
                scene.set_size(visual, (bounds.width - 2.0 * ROW_PADDING).max(1.0), 1.0);
            }
        }
    }

    /// Append a coloured row below the existing ones.
    pub fn add_row(
        &mut self,
        scene: &mut dyn SceneHost,
        id: &str,
        label: &str,
    ) -> Rc<RefCell<InventoryRow>> {
        let mut row = InventoryRow::detached(id, label);
        let text = row.text();
        let visual = scene.create_visual(
            VisualKind::Text,
            VisualProps::at(Some(self.content), ROW_PADDING, self.cursor_y)
                .size((self.frame.bounds().width - 2.0 * ROW_PADDING).max(1.0), 1.0)
                .text(text.as_str())
                .style(VisualStyle::InventoryRow),
        );
        row.visual = Some(visual);
        row.shown = text;
        self.cursor_y += 1.0 + ROW_SPACING;

        let row = Rc::new(RefCell::new(row));
        self.rows.push(Rc::clone(&row));
        row
    }

    /// Destroy the row for `id` and close the gap. Cards still pointing at it
    /// stop mirroring. False when absent.
    pub fn remove_row(&mut self, scene: &mut dyn SceneHost, id: &str) -> bool {
        let Some(pos) = self.rows.iter().position(|r| r.borrow().id == id) else {
            return false;
        };
        let row = self.rows.remove(pos);
        let visual = row.borrow().visual;
        if let Some(visual) = visual {
            scene.destroy(visual);
        }
        self.restack(scene);
        true
    }

    /// Destroy every row.
    pub fn clear(&mut self, scene: &mut dyn SceneHost) {
        for row in self.rows.drain(..) {
            let visual = row.borrow().visual;
            if let Some(visual) = visual {
                scene.destroy(visual);
            }
        }
        self.cursor_y = 0.0;
    }

    fn restack(&mut self, scene: &mut dyn SceneHost) {
        self.cursor_y = 0.0;
        for row in &self.rows {
            if let Some(visual) = row.borrow().visual {
                scene.set_position(visual, ROW_PADDING, self.cursor_y);
            }
            self.cursor_y += 1.0 + ROW_SPACING;
        }
    }

    pub fn row(&self, id: &str) -> Option<Rc<RefCell<InventoryRow>>> {
        self.rows.iter().find(|r| r.borrow().id == id).cloned()
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[Rc<RefCell<InventoryRow>>] {
        &self.rows
    }

    /// Push row text that changed since the last refresh.
    pub fn refresh(&self, scene: &mut dyn SceneHost) {
        for row in &self.rows {
            let mut row = row.borrow_mut();
            let text = row.text();
            if text == row.shown {
                continue;
            }
            if let Some(visual) = row.visual {
                scene.set_text(visual, &text);
            }
            row.shown = text;
        }
    }
}

impl RowHost for InventoryPanel {
    /// Reuses an existing row with the same id.
    fn create_row(
        &mut self,
        scene: &mut dyn SceneHost,
        id: &str,
        label: &str,
    ) -> Weak<RefCell<InventoryRow>> {
        let row = match self.row(id) {
            Some(existing) => existing,
            None => self.add_row(scene, id, label),
        };
        Rc::downgrade(&row)
    }
}
