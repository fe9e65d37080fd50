//! Scene host abstraction: the narrow surface the card list needs from a renderer.
//!
//! The list and its cards never draw anything themselves. They create visuals,
//! move them, change their text and clip them through [`SceneHost`], and get
//! back opaque [`VisualId`] handles. [`crate::term_scene::TermScene`] is the
//! host used in the browser; tests drive the same host without a frame.

/// Semantic action ID dispatched when a pointer-registered visual is tapped.
pub type ActionId = u16;

/// Opaque handle to a visual owned by a [`SceneHost`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualId(pub u32);

/// A point in layout units (one unit = one terminal cell in the browser host).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in layout units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive on every edge, matching the panel hit test of the drag gesture.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Overlapping region, or `None` when the rectangles do not overlap.
    pub fn intersect(&self, other: &Bounds) -> Option<Bounds> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return None;
        }
        Some(Bounds::new(x, y, right - x, bottom - y))
    }
}

/// What a visual is. Groups only carry a position, clip and visibility for
/// their children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualKind {
    Group,
    Rect,
    Text,
    Button,
}

/// Semantic look of a visual. The host maps these to concrete colours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VisualStyle {
    #[default]
    Plain,
    Panel,
    TitleBar,
    CardBackground,
    CardTitle,
    Body,
    Gain,
    Button,
    InventoryRow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

/// Initial properties of a visual. Position is relative to `parent`.
#[derive(Clone, Debug, Default)]
pub struct VisualProps {
    pub parent: Option<VisualId>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub style: VisualStyle,
    pub align: TextAlign,
}

impl VisualProps {
    pub fn at(parent: Option<VisualId>, x: f64, y: f64) -> Self {
        Self {
            parent,
            x,
            y,
            ..Self::default()
        }
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn style(mut self, style: VisualStyle) -> Self {
        self.style = style;
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }
}

/// Rendering primitives the card list relies on.
///
/// Operations on a handle that was already destroyed are ignored.
pub trait SceneHost {
    fn create_visual(&mut self, kind: VisualKind, props: VisualProps) -> VisualId;

    fn set_position(&mut self, id: VisualId, x: f64, y: f64);

    fn set_size(&mut self, id: VisualId, width: f64, height: f64);

    fn set_text(&mut self, id: VisualId, text: &str);

    fn set_visible(&mut self, id: VisualId, visible: bool);

    /// Destroy a visual together with all of its descendants.
    fn destroy(&mut self, id: VisualId);

    /// Make the visual tappable. A tap dispatches `action`.
    fn on_pointer(&mut self, id: VisualId, action: ActionId);

    /// Restrict the visual and its descendants to `rect` (screen coordinates).
    fn apply_clip(&mut self, id: VisualId, rect: Bounds);
}
