//! Panel chrome: background, title bar and title text under one root group.

use crate::scene::{ActionId, Bounds, SceneHost, VisualId, VisualKind, VisualProps, VisualStyle};

/// Height of the title bar in cells (top border, text, bottom border).
pub const TITLE_HEIGHT: f64 = 3.0;

/// Where a scrollable area sits on screen: the panel rectangle and the band at
/// its top reserved for the title.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelGeometry {
    pub bounds: Bounds,
    pub title_height: f64,
}

impl PanelGeometry {
    pub fn new(bounds: Bounds, title_height: f64) -> Self {
        Self {
            bounds,
            title_height,
        }
    }

    /// Height available to content below the title.
    pub fn visible_height(&self) -> f64 {
        (self.bounds.height - self.title_height).max(0.0)
    }

    /// Screen rectangle content is clipped to.
    pub fn clip_rect(&self) -> Bounds {
        Bounds::new(
            self.bounds.x,
            self.bounds.y + self.title_height,
            self.bounds.width,
            self.visible_height(),
        )
    }
}

pub struct PanelFrame {
    root: VisualId,
    background: VisualId,
    title_bar: VisualId,
    title_text: VisualId,
    bounds: Bounds,
    title: String,
}

impl PanelFrame {
    pub fn new(scene: &mut dyn SceneHost, bounds: Bounds, title: &str) -> Self {
        let root = scene.create_visual(
            VisualKind::Group,
            VisualProps::at(None, bounds.x, bounds.y),
        );
        let background = scene.create_visual(
            VisualKind::Rect,
            VisualProps::at(Some(root), 0.0, 0.0)
                .size(bounds.width, bounds.height)
                .style(VisualStyle::Panel),
        );
        let title_bar = scene.create_visual(
            VisualKind::Rect,
            VisualProps::at(Some(root), 0.0, 0.0)
                .size(bounds.width, TITLE_HEIGHT)
                .style(VisualStyle::TitleBar),
        );
        let title_text = scene.create_visual(
            VisualKind::Text,
            VisualProps::at(Some(root), 1.0, 1.0)
                .size((bounds.width - 2.0).max(1.0), 1.0)
                .text(title)
                .style(VisualStyle::TitleBar)
                .centered(),
        );
        Self {
            root,
            background,
            title_bar,
            title_text,
            bounds,
            title: title.to_string(),
        }
    }

    /// Group that panel content is parented to. Its origin is the panel's top-left.
    pub fn root(&self) -> VisualId {
        self.root
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[cfg(test)]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, scene: &mut dyn SceneHost, title: &str) {
        if self.title == title {
            return;
        }
        self.title = title.to_string();
        scene.set_text(self.title_text, title);
    }

    /// Tapping the title bar dispatches `action`.
    pub fn on_title_tap(&self, scene: &mut dyn SceneHost, action: ActionId) {
        scene.on_pointer(self.title_bar, action);
    }

    pub fn set_bounds(&mut self, scene: &mut dyn SceneHost, bounds: Bounds) {
        self.bounds = bounds;
        scene.set_position(self.root, bounds.x, bounds.y);
        scene.set_size(self.background, bounds.width, bounds.height);
        scene.set_size(self.title_bar, bounds.width, TITLE_HEIGHT);
        scene.set_size(self.title_text, (bounds.width - 2.0).max(1.0), 1.0);
    }

    /// Geometry of the area inside the side and bottom borders.
    pub fn content_geometry(&self) -> PanelGeometry {
        let b = self.bounds;
        PanelGeometry::new(
            Bounds::new(
                b.x + 1.0,
                b.y,
                (b.width - 2.0).max(0.0),
                (b.height - 1.0).max(0.0),
            ),
            TITLE_HEIGHT,
        )
    }
}
