//! Scrollable vertical list of cards inside a panel.
//!
//! Cards are stacked in insertion order inside a scroll container, which is
//! clipped to the panel area below the title. Dragging inside the panel moves
//! the container vertically. The offset always stays within
//! `[min(0, visible_height - content_height), 0]`.
//!
//! Each card holds a slot number while it is in the list; the card's button
//! dispatches `ACTIVATE_CARD_BASE + slot`. Slots of removed cards are reused.

use std::collections::HashMap;

use crate::pointer::{CaptureToken, PointerArbiter};
use crate::scene::{ActionId, Point, SceneHost, VisualId, VisualKind, VisualProps};

use super::actions::ACTIVATE_CARD_BASE;
use super::card::Card;
use super::catalog::SectionTemplates;
use super::config::CardConfig;
use super::inventory::RowHost;
use super::panel::{PanelGeometry, TITLE_HEIGHT};

type Slot = u16;

/// Highest slot whose action id still fits in an `ActionId`.
const MAX_SLOT: Slot = ActionId::MAX - ACTIVATE_CARD_BASE;

/// Placement of cards inside the scroll container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ListLayout {
    pub start_x: f64,
    pub start_y: f64,
    pub width: f64,
    pub card_height: f64,
    pub spacing: f64,
}

impl Default for ListLayout {
    fn default() -> Self {
        Self {
            start_x: 1.0,
            start_y: TITLE_HEIGHT,
            width: 38.0,
            card_height: 7.0,
            spacing: 1.0,
        }
    }
}

impl ListLayout {
    /// Distance between the tops of consecutive cards.
    pub fn step(&self) -> f64 {
        self.card_height + self.spacing
    }
}

struct Drag {
    start_y: f64,
    start_offset: f64,
    _capture: CaptureToken,
}

pub struct CardList {
    name: &'static str,
    layout: ListLayout,
    geometry: PanelGeometry,
    scroll: VisualId,
    offset: f64,
    expanded: bool,
    order: Vec<Slot>,
    cards: HashMap<Slot, Card>,
    index: HashMap<String, Slot>,
    templates: Option<SectionTemplates>,
    drag: Option<Drag>,
}

impl CardList {
    /// `name` identifies the list in logs and as the pointer-capture owner.
    pub fn new(
        scene: &mut dyn SceneHost,
        parent: VisualId,
        name: &'static str,
        layout: ListLayout,
        geometry: PanelGeometry,
    ) -> Self {
        let scroll = scene.create_visual(VisualKind::Group, VisualProps::at(Some(parent), 0.0, 0.0));
        scene.apply_clip(scroll, geometry.clip_rect());
        Self {
            name,
            layout,
            geometry,
            scroll,
            offset: 0.0,
            expanded: true,
            order: Vec::new(),
            cards: HashMap::new(),
            index: HashMap::new(),
            templates: None,
            drag: None,
        }
    }

    #[cfg(test)]
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn layout(&self) -> &ListLayout {
        &self.layout
    }

    #[cfg(test)]
    pub fn geometry(&self) -> &PanelGeometry {
        &self.geometry
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Cards in display order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.order.iter().filter_map(|slot| self.cards.get(slot))
    }

    /// Card positions inside the scroll container, in display order.
    #[cfg(test)]
    pub fn positions(&self) -> Vec<(f64, f64)> {
        self.cards().map(Card::position).collect()
    }

    // ── Membership ──────────────────────────────────────────────

    /// Append a card built from `config`. Returns `None` (and logs) when the
    /// id is already present or the config is invalid.
    pub fn add_card(&mut self, scene: &mut dyn SceneHost, config: CardConfig) -> Option<&mut Card> {
        if let Some(id) = config.id.as_deref() {
            if self.index.contains_key(id) {
                log::warn!("{}: card with id '{id}' already exists", self.name);
                return None;
            }
        }
        let Some(slot) = self.free_slot() else {
            log::error!("{}: out of card slots", self.name);
            return None;
        };
        let card = match Card::build(
            scene,
            self.scroll,
            self.layout.width,
            self.layout.card_height,
            config,
            ACTIVATE_CARD_BASE + slot,
        ) {
            Ok(card) => card,
            Err(e) => {
                log::warn!("{}: card rejected: {e}", self.name);
                return None;
            }
        };
        if let Some(id) = card.id() {
            self.index.insert(id.to_string(), slot);
        }
        self.order.push(slot);
        self.cards.insert(slot, card);
        self.reposition_layout(scene);
        self.cards.get_mut(&slot)
    }

    /// Lowest slot not held by a card.
    fn free_slot(&self) -> Option<Slot> {
        (0..=MAX_SLOT).find(|slot| !self.cards.contains_key(slot))
    }

    /// Destroy the card with `id` and close the gap. False when absent.
    pub fn remove_card_by_id(&mut self, scene: &mut dyn SceneHost, id: &str) -> bool {
        let Some(slot) = self.index.remove(id) else {
            return false;
        };
        self.order.retain(|s| *s != slot);
        if let Some(card) = self.cards.remove(&slot) {
            card.destroy(scene);
        }
        self.reposition_layout(scene);
        true
    }

    /// Destroy every card and reset the scroll offset.
    pub fn clear_all(&mut self, scene: &mut dyn SceneHost) {
        for slot in self.order.drain(..) {
            if let Some(card) = self.cards.remove(&slot) {
                card.destroy(scene);
            }
        }
        self.cards.clear();
        self.index.clear();
        self.drag = None;
        self.set_offset(scene, 0.0);
    }

    pub fn get_card_by_id(&self, id: &str) -> Option<&Card> {
        self.index.get(id).and_then(|slot| self.cards.get(slot))
    }

    pub fn get_card_by_id_mut(&mut self, id: &str) -> Option<&mut Card> {
        let slot = *self.index.get(id)?;
        self.cards.get_mut(&slot)
    }

    /// Apply `f` to the card with `id`. False (and nothing runs) when absent.
    pub fn update_card_by_id<F>(&mut self, scene: &mut dyn SceneHost, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Card, &mut dyn SceneHost),
    {
        let Some(slot) = self.index.get(id) else {
            log::warn!("{}: no card with id '{id}' to update", self.name);
            return false;
        };
        match self.cards.get_mut(slot) {
            Some(card) => {
                f(card, scene);
                true
            }
            None => false,
        }
    }

    /// Apply `f` to every card in display order.
    pub fn update_all_cards<F>(&mut self, scene: &mut dyn SceneHost, mut f: F)
    where
        F: FnMut(&mut Card, &mut dyn SceneHost),
    {
        for slot in &self.order {
            if let Some(card) = self.cards.get_mut(slot) {
                f(card, &mut *scene);
            }
        }
    }

    // ── Templates and activation ────────────────────────────────

    pub fn load_templates(&mut self, templates: SectionTemplates) {
        self.templates = Some(templates);
    }

    /// `None` until templates are loaded.
    pub fn templates(&self) -> Option<&SectionTemplates> {
        self.templates.as_ref()
    }

    /// Create the card described by template `id`, mark it active and give it
    /// an inventory row from `rows`. An already present card is returned as is.
    pub fn activate_card(
        &mut self,
        scene: &mut dyn SceneHost,
        id: &str,
        rows: &mut dyn RowHost,
    ) -> Option<&mut Card> {
        let Some(templates) = self.templates.as_ref() else {
            log::error!("{}: templates not loaded; cannot activate '{id}'", self.name);
            return None;
        };
        let config = match templates.config_for(id) {
            Some(Ok(config)) => config.active(true),
            Some(Err(e)) => {
                log::error!("{}: template '{id}' is invalid: {e}", self.name);
                return None;
            }
            None => {
                log::error!("{}: no template for '{id}'", self.name);
                return None;
            }
        };
        if self.index.contains_key(id) {
            log::warn!("{}: '{id}' is already active", self.name);
        } else {
            self.add_card(scene, config)?;
        }

        let card = self.get_card_by_id_mut(id)?;
        card.set_active();
        if !card.has_target_row() {
            let row = rows.create_row(scene, id, card.gain_label());
            card.bind_row(row);
        }
        Some(card)
    }

    /// Run the action of the card whose button dispatches `action`.
    pub fn activate_by_action(&mut self, action: ActionId) -> Option<&Card> {
        let slot = action.checked_sub(ACTIVATE_CARD_BASE)?;
        let card = self.cards.get_mut(&slot)?;
        card.activate();
        Some(card)
    }

    /// Run the action of the `n`-th card in display order.
    pub fn activate_nth(&mut self, n: usize) -> Option<&Card> {
        let slot = *self.order.get(n)?;
        let card = self.cards.get_mut(&slot)?;
        card.activate();
        Some(card)
    }

    /// First template id, in file order, that has no card yet.
    pub fn next_inactive_template(&self) -> Option<&str> {
        self.templates
            .as_ref()?
            .ids()
            .find(|id| !self.index.contains_key(*id))
    }

    // ── Layout and scrolling ────────────────────────────────────

    /// Stack cards from `start_y` in order, then re-clamp the offset.
    pub fn reposition_layout(&mut self, scene: &mut dyn SceneHost) {
        let step = self.layout.step();
        let mut y = self.layout.start_y;
        for slot in &self.order {
            if let Some(card) = self.cards.get_mut(slot) {
                card.set_position(scene, self.layout.start_x, y);
            }
            y += step;
        }
        let offset = self.offset;
        self.set_offset(scene, offset);
    }

    /// Height of the stacked cards including the gaps between them.
    pub fn content_height(&self) -> f64 {
        match self.order.len() {
            0 => 0.0,
            n => n as f64 * self.layout.card_height + (n - 1) as f64 * self.layout.spacing,
        }
    }

    pub fn visible_height(&self) -> f64 {
        self.geometry.visible_height()
    }

    /// Lowest allowed offset; zero when everything fits.
    pub fn min_offset(&self) -> f64 {
        (self.visible_height() - self.content_height()).min(0.0)
    }

    #[cfg(test)]
    pub fn scroll_offset(&self) -> f64 {
        self.offset
    }

    pub fn scroll_by(&mut self, scene: &mut dyn SceneHost, delta: f64) {
        let target = self.offset + delta;
        self.set_offset(scene, target);
    }

    fn set_offset(&mut self, scene: &mut dyn SceneHost, target: f64) {
        if !target.is_finite() {
            return;
        }
        self.offset = target.clamp(self.min_offset(), 0.0);
        scene.set_position(self.scroll, 0.0, self.offset);
    }

    /// Move or resize the panel area; re-clips and re-clamps.
    pub fn update_mask(&mut self, scene: &mut dyn SceneHost, geometry: PanelGeometry) {
        self.geometry = geometry;
        scene.apply_clip(self.scroll, geometry.clip_rect());
        let offset = self.offset;
        self.set_offset(scene, offset);
    }

    #[cfg(test)]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Show or hide the cards. Returns the new state.
    pub fn toggle_visibility(&mut self, scene: &mut dyn SceneHost) -> bool {
        self.expanded = !self.expanded;
        scene.set_visible(self.scroll, self.expanded);
        if !self.expanded {
            self.drag = None;
        }
        self.expanded
    }

    // ── Drag gesture ────────────────────────────────────────────

    #[cfg(test)]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Start a drag when `p` is inside the panel and the pointer is free.
    pub fn pointer_down(&mut self, p: Point, arbiter: &PointerArbiter) -> bool {
        // A press without a release in between restarts the gesture.
        self.drag = None;
        if !self.expanded || !self.geometry.bounds.contains(p) {
            return false;
        }
        let Some(capture) = arbiter.try_capture(self.name) else {
            return false;
        };
        self.drag = Some(Drag {
            start_y: p.y,
            start_offset: self.offset,
            _capture: capture,
        });
        true
    }

    pub fn pointer_move(&mut self, scene: &mut dyn SceneHost, p: Point) -> bool {
        let Some(drag) = &self.drag else {
            return false;
        };
        let target = drag.start_offset + (p.y - drag.start_y);
        self.set_offset(scene, target);
        true
    }

    /// End the drag and release the pointer. False when no drag was active.
    pub fn pointer_up(&mut self) -> bool {
        self.drag.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gather::inventory::InventoryPanel;
    use crate::scene::Bounds;
    use crate::term_scene::TermScene;
    use serde_json::{json, Map};

    /// Layout of the canvas-sized reference panel: 300x400 at (20, 20) with
    /// a 50-unit title, 150-unit cards and 4 units between them.
    fn reference_list(scene: &mut TermScene) -> CardList {
        let parent = scene.create_visual(VisualKind::Group, VisualProps::at(None, 20.0, 20.0));
        CardList::new(
            scene,
            parent,
            "gather",
            ListLayout {
                start_x: 10.0,
                start_y: 50.0,
                width: 280.0,
                card_height: 150.0,
                spacing: 4.0,
            },
            PanelGeometry::new(Bounds::new(20.0, 20.0, 300.0, 400.0), 50.0),
        )
    }

    fn add(list: &mut CardList, scene: &mut TermScene, id: &str) {
        assert!(list.add_card(scene, CardConfig::new(id)).is_some());
    }

    fn ids(list: &CardList) -> Vec<String> {
        list.cards()
            .filter_map(|c| c.id().map(str::to_string))
            .collect()
    }

    fn templates(value: serde_json::Value) -> SectionTemplates {
        let items = value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap());
        SectionTemplates::from_templates(items, &Map::new())
    }

    fn inventory(scene: &mut TermScene) -> InventoryPanel {
        InventoryPanel::new(scene, Bounds::new(400.0, 20.0, 30.0, 20.0), "Inventory")
    }

    #[test]
    fn three_cards_stack_and_clamp() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        for id in ["a", "b", "c"] {
            add(&mut list, &mut scene, id);
        }
        assert_eq!(
            list.positions(),
            vec![(10.0, 50.0), (10.0, 204.0), (10.0, 358.0)]
        );
        assert_eq!(list.content_height(), 458.0);
        assert_eq!(list.visible_height(), 350.0);
        assert_eq!(list.min_offset(), -108.0);
    }

    #[test]
    fn drag_past_end_stops_at_min_offset() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        list.update_mask(
            &mut scene,
            PanelGeometry::new(Bounds::new(20.0, 20.0, 300.0, 350.0), 50.0),
        );
        for id in ["a", "b", "c"] {
            add(&mut list, &mut scene, id);
        }
        assert_eq!(list.visible_height(), 300.0);
        assert_eq!(list.content_height(), 458.0);
        assert_eq!(list.min_offset(), -158.0);

        let arbiter = PointerArbiter::new();
        assert!(list.pointer_down(Point::new(100.0, 360.0), &arbiter));
        list.pointer_move(&mut scene, Point::new(100.0, -140.0));
        assert_eq!(list.scroll_offset(), -158.0);
        list.pointer_up();
    }

    #[test]
    fn twigs_accrue_without_changing_gain_text() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        list.add_card(
            &mut scene,
            CardConfig::new("twigs").gain(1.0).gain_label("Twig"),
        );
        let card = list.get_card_by_id_mut("twigs").unwrap();
        card.activate();
        card.activate();
        assert_eq!(card.count(), 2.0);
        assert_eq!(card.gain_text(), "+1 Twig");
        let gain_visual = card.visuals().gain_text;
        assert_eq!(scene.text(gain_visual), Some("+1 Twig"));
    }

    #[test]
    fn drag_is_clamped_to_content() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        for id in ["a", "b", "c"] {
            add(&mut list, &mut scene, id);
        }
        let arbiter = PointerArbiter::new();
        assert!(list.pointer_down(Point::new(100.0, 300.0), &arbiter));
        assert!(arbiter.is_captured());

        list.pointer_move(&mut scene, Point::new(100.0, 100.0));
        assert_eq!(list.scroll_offset(), -108.0);
        list.pointer_move(&mut scene, Point::new(100.0, 500.0));
        assert_eq!(list.scroll_offset(), 0.0);
        list.pointer_move(&mut scene, Point::new(100.0, 250.0));
        assert_eq!(list.scroll_offset(), -50.0);

        assert!(list.pointer_up());
        assert!(!arbiter.is_captured());
        assert!(!list.pointer_up());
    }

    #[test]
    fn fitting_content_never_scrolls() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        add(&mut list, &mut scene, "only");
        assert_eq!(list.min_offset(), 0.0);

        let arbiter = PointerArbiter::new();
        assert!(list.pointer_down(Point::new(50.0, 200.0), &arbiter));
        list.pointer_move(&mut scene, Point::new(50.0, 0.0));
        assert_eq!(list.scroll_offset(), 0.0);
    }

    #[test]
    fn press_outside_panel_or_when_captured_is_ignored() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        let arbiter = PointerArbiter::new();
        assert!(!list.pointer_down(Point::new(5.0, 5.0), &arbiter));

        let other = arbiter.try_capture("inventory").unwrap();
        assert!(!list.pointer_down(Point::new(100.0, 100.0), &arbiter));
        assert!(!list.pointer_move(&mut scene, Point::new(100.0, 0.0)));
        drop(other);
        assert!(list.pointer_down(Point::new(100.0, 100.0), &arbiter));
    }

    #[test]
    fn collapsed_list_ignores_drag() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        let arbiter = PointerArbiter::new();
        assert!(!list.toggle_visibility(&mut scene));
        assert!(!list.pointer_down(Point::new(100.0, 100.0), &arbiter));
        assert!(list.toggle_visibility(&mut scene));
        assert!(list.is_expanded());
    }

    #[test]
    fn collapsing_mid_drag_releases_pointer() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        let arbiter = PointerArbiter::new();
        assert!(list.pointer_down(Point::new(100.0, 100.0), &arbiter));
        list.toggle_visibility(&mut scene);
        assert!(!list.is_dragging());
        assert!(!arbiter.is_captured());
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        add(&mut list, &mut scene, "twigs");
        let before = scene.len();
        assert!(list
            .add_card(&mut scene, CardConfig::new("twigs").title("Again"))
            .is_none());
        assert_eq!(list.len(), 1);
        assert_eq!(scene.len(), before);
        assert_eq!(list.get_card_by_id("twigs").unwrap().title(), "Untitled");
    }

    #[test]
    fn anonymous_cards_are_allowed_repeatedly() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        assert!(list.add_card(&mut scene, CardConfig::default()).is_some());
        assert!(list.add_card(&mut scene, CardConfig::default()).is_some());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn invalid_config_is_not_added() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        assert!(list
            .add_card(&mut scene, CardConfig::new("x").count(f64::NAN))
            .is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn removal_closes_gap_and_reclamps() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        for id in ["a", "b", "c"] {
            add(&mut list, &mut scene, id);
        }
        list.scroll_by(&mut scene, -500.0);
        assert_eq!(list.scroll_offset(), -108.0);

        assert!(list.remove_card_by_id(&mut scene, "b"));
        assert_eq!(ids(&list), ["a", "c"]);
        assert_eq!(list.positions(), vec![(10.0, 50.0), (10.0, 204.0)]);
        // 304 of content now fits in 350.
        assert_eq!(list.scroll_offset(), 0.0);

        assert!(!list.remove_card_by_id(&mut scene, "b"));
    }

    #[test]
    fn update_card_by_id() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        list.add_card(
            &mut scene,
            CardConfig::new("twigs").gain_label("Twig").gain(1.0),
        );

        assert!(list.update_card_by_id(&mut scene, "twigs", |card, scene| {
            card.set_gain(scene, 2.0).unwrap();
        }));
        let card = list.get_card_by_id("twigs").unwrap();
        assert_eq!(card.gain_text(), "+2 Twigs");
        assert_eq!(scene.text(card.visuals().gain_text), Some("+2 Twigs"));

        let mut ran = false;
        assert!(!list.update_card_by_id(&mut scene, "missing", |_, _| ran = true));
        assert!(!ran);
    }

    #[test]
    fn update_all_cards_visits_in_order() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        for id in ["a", "b", "c"] {
            add(&mut list, &mut scene, id);
        }
        let mut seen = Vec::new();
        list.update_all_cards(&mut scene, |card, _| {
            seen.push(card.id().unwrap_or_default().to_string());
            card.set_count(5.0).unwrap();
        });
        assert_eq!(seen, ["a", "b", "c"]);
        assert!(list.cards().all(|c| c.count() == 5.0));
    }

    #[test]
    fn clear_all_destroys_cards() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        let baseline = scene.len();
        for id in ["a", "b", "c"] {
            add(&mut list, &mut scene, id);
        }
        list.scroll_by(&mut scene, -50.0);
        list.clear_all(&mut scene);
        assert!(list.is_empty());
        assert_eq!(scene.len(), baseline);
        assert_eq!(list.scroll_offset(), 0.0);
        assert!(list.get_card_by_id("a").is_none());
        add(&mut list, &mut scene, "a");
    }

    #[test]
    fn slots_are_reused_after_removal() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        for id in ["a", "b", "c"] {
            add(&mut list, &mut scene, id);
        }
        list.clear_all(&mut scene);
        assert_eq!(list.free_slot(), Some(0));

        let button = |id: &str| CardConfig::new(id).button("Go");
        list.add_card(&mut scene, button("a"));
        list.add_card(&mut scene, button("b"));
        list.add_card(&mut scene, button("c"));
        list.remove_card_by_id(&mut scene, "a");
        let d = list.add_card(&mut scene, button("d")).unwrap();
        let action = scene.action(d.visuals().button.unwrap()).unwrap();
        assert_eq!(action, ACTIVATE_CARD_BASE);
        assert_eq!(list.activate_by_action(action).and_then(Card::id), Some("d"));
    }

    #[test]
    fn activation_requires_templates() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        let mut inv = inventory(&mut scene);
        assert!(list.activate_card(&mut scene, "twigs", &mut inv).is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn activation_builds_card_and_row() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        let mut inv = inventory(&mut scene);
        list.load_templates(templates(json!([
            { "id": "twigs", "title": "Gather Twigs", "gainLabel": "Twig", "showButton": true, "buttonLabel": "Gather" },
            { "id": "pebbles", "gainLabel": "Pebble" }
        ])));

        let card = list.activate_card(&mut scene, "twigs", &mut inv).unwrap();
        assert!(card.is_active());
        assert_eq!(card.title(), "Gather Twigs");
        assert!(card.has_target_row());
        assert_eq!(inv.rows().len(), 1);

        // Second activation returns the same card and adds nothing.
        assert!(list.activate_card(&mut scene, "twigs", &mut inv).is_some());
        assert_eq!(list.len(), 1);
        assert_eq!(inv.rows().len(), 1);

        assert!(list.activate_card(&mut scene, "unknown", &mut inv).is_none());
        assert_eq!(list.next_inactive_template(), Some("pebbles"));
    }

    #[test]
    fn button_action_accrues_into_row() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        let mut inv = inventory(&mut scene);
        list.load_templates(templates(json!([
            { "id": "twigs", "gain": 2, "gainLabel": "Twig", "showButton": true }
        ])));
        let action = {
            let card = list.activate_card(&mut scene, "twigs", &mut inv).unwrap();
            scene.action(card.visuals().button.unwrap()).unwrap()
        };
        assert_eq!(action, ACTIVATE_CARD_BASE);

        list.activate_by_action(action);
        list.activate_nth(0);
        assert_eq!(list.get_card_by_id("twigs").unwrap().count(), 4.0);
        assert_eq!(inv.row("twigs").unwrap().borrow().count(), 4.0);

        assert!(list.activate_by_action(ACTIVATE_CARD_BASE + 9).is_none());
        assert!(list.activate_by_action(5).is_none());
        assert!(list.activate_nth(3).is_none());
    }

    #[test]
    fn update_mask_reclamps() {
        let mut scene = TermScene::new();
        let mut list = reference_list(&mut scene);
        for id in ["a", "b", "c"] {
            add(&mut list, &mut scene, id);
        }
        list.scroll_by(&mut scene, -108.0);
        list.update_mask(
            &mut scene,
            PanelGeometry::new(Bounds::new(20.0, 20.0, 300.0, 600.0), 50.0),
        );
        assert_eq!(list.min_offset(), 0.0);
        assert_eq!(list.scroll_offset(), 0.0);
        assert_eq!(
            scene.clip(list.scroll),
            Some(Bounds::new(20.0, 70.0, 300.0, 550.0))
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add(u8),
            Remove(u8),
            Scroll(i16),
            Drag(i16, i16),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u8..12).prop_map(Op::Add),
                (0u8..12).prop_map(Op::Remove),
                (-600i16..600).prop_map(Op::Scroll),
                (-600i16..600, -600i16..600).prop_map(|(a, b)| Op::Drag(a, b)),
            ]
        }

        proptest! {
            #[test]
            fn offset_stays_clamped_and_order_is_kept(ops in proptest::collection::vec(op(), 0..40)) {
                let mut scene = TermScene::new();
                let mut list = reference_list(&mut scene);
                let arbiter = PointerArbiter::new();
                let mut expected: Vec<String> = Vec::new();

                for op in ops {
                    match op {
                        Op::Add(n) => {
                            let id = format!("card{n}");
                            let added = list.add_card(&mut scene, CardConfig::new(id.as_str())).is_some();
                            prop_assert_eq!(added, !expected.contains(&id));
                            if added {
                                expected.push(id);
                            }
                        }
                        Op::Remove(n) => {
                            let id = format!("card{n}");
                            let removed = list.remove_card_by_id(&mut scene, &id);
                            prop_assert_eq!(removed, expected.contains(&id));
                            expected.retain(|e| *e != id);
                        }
                        Op::Scroll(d) => list.scroll_by(&mut scene, d as f64),
                        Op::Drag(from, to) => {
                            if list.pointer_down(Point::new(100.0, 200.0 + from as f64 / 4.0), &arbiter) {
                                list.pointer_move(&mut scene, Point::new(100.0, 200.0 + to as f64));
                                list.pointer_up();
                            }
                        }
                    }
                    let offset = list.scroll_offset();
                    prop_assert!(offset <= 0.0);
                    prop_assert!(offset >= list.min_offset());
                    prop_assert!(!arbiter.is_captured());
                }

                prop_assert_eq!(ids(&list), expected);
                let step = list.layout().step();
                for (i, (x, y)) in list.positions().into_iter().enumerate() {
                    prop_assert_eq!(x, 10.0);
                    prop_assert_eq!(y, 50.0 + i as f64 * step);
                }
            }

            #[test]
            fn reposition_is_idempotent(count in 0usize..8, scroll in -800.0f64..0.0) {
                let mut scene = TermScene::new();
                let mut list = reference_list(&mut scene);
                for i in 0..count {
                    list.add_card(&mut scene, CardConfig::new(format!("c{i}")));
                }
                list.scroll_by(&mut scene, scroll);
                list.reposition_layout(&mut scene);
                let positions = list.positions();
                let offset = list.scroll_offset();
                list.reposition_layout(&mut scene);
                prop_assert_eq!(list.positions(), positions);
                prop_assert_eq!(list.scroll_offset(), offset);
            }
        }
    }
}
