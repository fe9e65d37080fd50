//! Retained scene graph drawn into a ratatui frame.
//!
//! Visuals live in a tree keyed by [`VisualId`]. Positions are relative to the
//! parent, clips are in screen coordinates and nest by intersection. One layout
//! unit is one terminal cell; fractional positions are rounded when drawn.

use std::collections::HashMap;

use ratzilla::ratatui::layout::{Alignment, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::ClickState;
use crate::scene::{
    ActionId, Bounds, SceneHost, TextAlign, VisualId, VisualKind, VisualProps, VisualStyle,
};

struct Node {
    kind: VisualKind,
    parent: Option<VisualId>,
    children: Vec<VisualId>,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    text: String,
    style: VisualStyle,
    align: TextAlign,
    visible: bool,
    clip: Option<Bounds>,
    action: Option<ActionId>,
}

pub struct TermScene {
    nodes: HashMap<VisualId, Node>,
    /// Top-level visuals in creation order (draw order).
    roots: Vec<VisualId>,
    next_id: u32,
}

impl TermScene {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
            next_id: 1,
        }
    }

    /// Draw every visible visual and register click targets for tappable ones.
    pub fn draw(&self, f: &mut Frame, cs: &mut ClickState) {
        let area = f.area();
        let screen = Bounds::new(
            area.x as f64,
            area.y as f64,
            area.width as f64,
            area.height as f64,
        );
        for &root in &self.roots {
            self.draw_node(f, cs, root, 0.0, 0.0, screen);
        }
    }

    fn draw_node(
        &self,
        f: &mut Frame,
        cs: &mut ClickState,
        id: VisualId,
        origin_x: f64,
        origin_y: f64,
        clip: Bounds,
    ) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !node.visible {
            return;
        }
        let clip = match node.clip {
            Some(own) => match clip.intersect(&own) {
                Some(c) => c,
                None => return,
            },
            None => clip,
        };
        let abs = Bounds::new(origin_x + node.x, origin_y + node.y, node.width, node.height);

        match node.kind {
            VisualKind::Group => {}
            VisualKind::Rect => draw_rect(f, node, abs, clip),
            VisualKind::Text | VisualKind::Button => draw_text(f, node, abs, clip),
        }

        if let Some(action) = node.action {
            if let Some(cells) = abs.intersect(&clip).and_then(to_cells) {
                cs.add_click_target(cells, action);
            }
        }

        for &child in &node.children {
            self.draw_node(f, cs, child, abs.x, abs.y, clip);
        }
    }
}

impl Default for TermScene {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-back of the retained graph, for tests.
#[cfg(test)]
impl TermScene {
    /// Number of live visuals.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: VisualId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn text(&self, id: VisualId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.text.as_str())
    }

    /// Position relative to the parent.
    pub fn position(&self, id: VisualId) -> Option<(f64, f64)> {
        self.nodes.get(&id).map(|n| (n.x, n.y))
    }

    pub fn children(&self, id: VisualId) -> &[VisualId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn action(&self, id: VisualId) -> Option<ActionId> {
        self.nodes.get(&id).and_then(|n| n.action)
    }

    pub fn clip(&self, id: VisualId) -> Option<Bounds> {
        self.nodes.get(&id).and_then(|n| n.clip)
    }

    /// Screen-space rectangle of a visual (parent offsets applied).
    pub fn absolute_bounds(&self, id: VisualId) -> Option<Bounds> {
        let node = self.nodes.get(&id)?;
        let (mut x, mut y) = (node.x, node.y);
        let mut parent = node.parent;
        while let Some(pid) = parent {
            let p = self.nodes.get(&pid)?;
            x += p.x;
            y += p.y;
            parent = p.parent;
        }
        Some(Bounds::new(x, y, node.width, node.height))
    }

    /// True when the visual and all of its ancestors are visible.
    pub fn is_shown(&self, id: VisualId) -> bool {
        let mut cursor = Some(id);
        while let Some(cid) = cursor {
            match self.nodes.get(&cid) {
                Some(n) if n.visible => cursor = n.parent,
                _ => return false,
            }
        }
        true
    }
}

impl SceneHost for TermScene {
    fn create_visual(&mut self, kind: VisualKind, props: VisualProps) -> VisualId {
        let id = VisualId(self.next_id);
        self.next_id += 1;

        let parent = match props.parent {
            Some(pid) => match self.nodes.get_mut(&pid) {
                Some(p) => {
                    p.children.push(id);
                    Some(pid)
                }
                None => {
                    log::warn!("visual {:?} attached to missing parent {:?}", id, pid);
                    self.roots.push(id);
                    None
                }
            },
            None => {
                self.roots.push(id);
                None
            }
        };

        self.nodes.insert(
            id,
            Node {
                kind,
                parent,
                children: Vec::new(),
                x: props.x,
                y: props.y,
                width: props.width,
                height: props.height,
                text: props.text,
                style: props.style,
                align: props.align,
                visible: true,
                clip: None,
                action: None,
            },
        );
        id
    }

    fn set_position(&mut self, id: VisualId, x: f64, y: f64) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.x = x;
            n.y = y;
        }
    }

    fn set_size(&mut self, id: VisualId, width: f64, height: f64) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.width = width;
            n.height = height;
        }
    }

    fn set_text(&mut self, id: VisualId, text: &str) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.text.clear();
            n.text.push_str(text);
        }
    }

    fn set_visible(&mut self, id: VisualId, visible: bool) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.visible = visible;
        }
    }

    fn destroy(&mut self, id: VisualId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        match node.parent.and_then(|pid| self.nodes.get_mut(&pid)) {
            Some(p) => p.children.retain(|c| *c != id),
            None => self.roots.retain(|r| *r != id),
        }
        let mut stack = node.children;
        while let Some(child) = stack.pop() {
            if let Some(n) = self.nodes.remove(&child) {
                stack.extend(n.children);
            }
        }
    }

    fn on_pointer(&mut self, id: VisualId, action: ActionId) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.action = Some(action);
        }
    }

    fn apply_clip(&mut self, id: VisualId, rect: Bounds) {
        if let Some(n) = self.nodes.get_mut(&id) {
            n.clip = Some(rect);
        }
    }
}

/// Round a layout rectangle to whole cells. `None` when nothing is left.
fn to_cells(b: Bounds) -> Option<Rect> {
    let x0 = b.x.round().max(0.0);
    let y0 = b.y.round().max(0.0);
    let x1 = b.right().round().min(u16::MAX as f64);
    let y1 = b.bottom().round().min(u16::MAX as f64);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Rect::new(
        x0 as u16,
        y0 as u16,
        (x1 - x0) as u16,
        (y1 - y0) as u16,
    ))
}

fn draw_rect(f: &mut Frame, node: &Node, abs: Bounds, clip: Bounds) {
    let Some(visible) = abs.intersect(&clip) else {
        return;
    };
    let Some(cells) = to_cells(visible) else {
        return;
    };

    // A clipped edge loses its border so the box reads as continuing off-panel.
    let mut borders = Borders::ALL;
    if visible.y > abs.y + 0.5 {
        borders.remove(Borders::TOP);
    }
    if visible.bottom() < abs.bottom() - 0.5 {
        borders.remove(Borders::BOTTOM);
    }
    if visible.x > abs.x + 0.5 {
        borders.remove(Borders::LEFT);
    }
    if visible.right() < abs.right() - 0.5 {
        borders.remove(Borders::RIGHT);
    }

    let mut block = Block::default()
        .borders(borders)
        .border_style(border_style(node.style))
        .style(fill_style(node.style));
    if borders.contains(Borders::TOP) && !node.text.is_empty() {
        block = block.title(format!(" {} ", node.text));
    }
    f.render_widget(block, cells);
}

fn draw_text(f: &mut Frame, node: &Node, abs: Bounds, clip: Bounds) {
    let Some(visible) = abs.intersect(&clip) else {
        return;
    };
    let Some(cells) = to_cells(visible) else {
        return;
    };
    let skip_rows = (visible.y - abs.y).round().max(0.0) as u16;

    let label = match node.kind {
        VisualKind::Button => format!("[{}]", node.text),
        _ => node.text.clone(),
    };
    let alignment = match node.align {
        TextAlign::Left => Alignment::Left,
        TextAlign::Center => Alignment::Center,
    };
    let widget = Paragraph::new(label)
        .style(text_style(node.style))
        .alignment(alignment)
        .wrap(Wrap { trim: true })
        .scroll((skip_rows, 0));
    f.render_widget(widget, cells);
}

fn text_style(style: VisualStyle) -> Style {
    match style {
        VisualStyle::CardTitle => Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
        VisualStyle::Gain => Style::default().fg(Color::LightGreen),
        VisualStyle::Button => Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD),
        VisualStyle::TitleBar => Style::default()
            .fg(Color::White)
            .bg(Color::Blue)
            .add_modifier(Modifier::BOLD),
        VisualStyle::InventoryRow => Style::default().fg(Color::White).bg(Color::DarkGray),
        VisualStyle::Body => Style::default().fg(Color::Gray),
        _ => Style::default().fg(Color::White),
    }
}

fn border_style(style: VisualStyle) -> Style {
    match style {
        VisualStyle::CardBackground => Style::default().fg(Color::DarkGray),
        _ => Style::default().fg(Color::White),
    }
}

fn fill_style(style: VisualStyle) -> Style {
    match style {
        VisualStyle::Panel => Style::default().bg(Color::Rgb(0x34, 0x49, 0x5e)),
        VisualStyle::TitleBar => Style::default().bg(Color::Blue),
        VisualStyle::CardBackground => Style::default().bg(Color::Black),
        _ => Style::default(),
    }
}
