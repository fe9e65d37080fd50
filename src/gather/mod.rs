//! Gather screen: a scrollable panel of action cards next to an inventory panel.
//!
//! Cards come from the `gather` section of the layout catalog. Templates
//! marked active, and cards the save marks active, appear at startup; the rest
//! are revealed one by one. Progress is saved on demand and on a fixed
//! autosave interval. Upgrades are stored as template overrides, so they
//! survive starting over.

pub mod actions;
pub mod card;
pub mod catalog;
pub mod config;
pub mod inventory;
pub mod list;
pub mod panel;
pub mod render;
pub mod save;

use ratzilla::ratatui::Frame;
use serde_json::{Map, Value};

use crate::clock::Autosave;
use crate::input::{ClickState, InputEvent};
use crate::pointer::PointerArbiter;
use crate::scene::{ActionId, Bounds, Point};
use crate::storage::KeyValueStore;
use crate::term_scene::TermScene;

use actions::{LOAD_GAME, SAVE_GAME, START_OVER, TOGGLE_GATHER, UPGRADE_CARDS};
use catalog::TemplateCatalog;
use inventory::InventoryPanel;
use list::{CardList, ListLayout};
use panel::PanelFrame;

/// Catalog section shown on this screen.
pub const SECTION: &str = "gather";

/// Built-in layout catalog.
pub const LAYOUT_JSON: &str = include_str!("../../assets/data/layout.json");

/// Ticks between autosaves (30 s at 10 ticks/s).
pub const AUTOSAVE_INTERVAL: u32 = 300;

/// Resources spent per point of current gain to add one gain.
pub const UPGRADE_COST_PER_GAIN: f64 = 10.0;

const GATHER_TITLE: &str = "Gather Area";
const GATHER_TITLE_HIDDEN: &str = "Gather Area (hidden)";
const GATHER_WIDTH: f64 = 40.0;
const INVENTORY_WIDTH: f64 = 30.0;
const PANEL_GAP: f64 = 2.0;
const DEFAULT_SCREEN: (u16, u16) = (80, 24);
const MAX_LOG: usize = 30;

pub struct GatherGame {
    pub scene: TermScene,
    gather_panel: PanelFrame,
    pub list: CardList,
    pub inventory: InventoryPanel,
    pub arbiter: PointerArbiter,
    store: Box<dyn KeyValueStore>,
    catalog: Option<TemplateCatalog>,
    autosave: Autosave,
    screen: (u16, u16),
    pub log: Vec<String>,
}

fn gather_bounds(rows: u16) -> Bounds {
    let height = rows.saturating_sub(render::FOOTER_ROWS) as f64;
    Bounds::new(1.0, 0.0, GATHER_WIDTH, height)
}

/// "1 card", "3 cards".
fn cards_text(n: usize) -> String {
    if n == 1 {
        "1 card".to_string()
    } else {
        format!("{n} cards")
    }
}

fn inventory_bounds(rows: u16) -> Bounds {
    let height = rows.saturating_sub(render::FOOTER_ROWS) as f64;
    Bounds::new(1.0 + GATHER_WIDTH + PANEL_GAP, 0.0, INVENTORY_WIDTH, height)
}

impl GatherGame {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_catalog(store, LAYOUT_JSON)
    }

    pub fn with_catalog(store: Box<dyn KeyValueStore>, catalog_json: &str) -> Self {
        let (_, rows) = DEFAULT_SCREEN;
        let mut scene = TermScene::new();

        let gather_panel = PanelFrame::new(&mut scene, gather_bounds(rows), GATHER_TITLE);
        gather_panel.on_title_tap(&mut scene, TOGGLE_GATHER);
        let list = CardList::new(
            &mut scene,
            gather_panel.root(),
            SECTION,
            ListLayout {
                width: GATHER_WIDTH - 2.0,
                ..ListLayout::default()
            },
            gather_panel.content_geometry(),
        );
        let inventory = InventoryPanel::new(&mut scene, inventory_bounds(rows), "Inventory");

        let mut game = Self {
            scene,
            gather_panel,
            list,
            inventory,
            arbiter: PointerArbiter::new(),
            store,
            catalog: None,
            autosave: Autosave::new(AUTOSAVE_INTERVAL),
            screen: DEFAULT_SCREEN,
            log: Vec::new(),
        };
        game.load_catalog(catalog_json);
        let restored = save::restore_session(
            game.store.as_ref(),
            &mut game.list,
            &mut game.scene,
            &mut game.inventory,
        );
        if restored > 0 {
            game.add_log(&format!("Welcome back! Restored {}.", cards_text(restored)));
        }
        game
    }

    fn load_catalog(&mut self, json: &str) {
        match TemplateCatalog::from_json(json) {
            Ok(catalog) => {
                self.catalog = Some(catalog);
                self.load_templates();
            }
            Err(e) => {
                log::error!("{e}");
                self.add_log("Layout data is broken; nothing to gather.");
            }
        }
    }

    /// Resolve this screen's templates with the stored overrides applied.
    fn load_templates(&mut self) {
        let Some(catalog) = &self.catalog else {
            return;
        };
        let overrides = save::load_overrides(self.store.as_ref());
        match catalog.section(SECTION, &overrides) {
            Some(templates) => {
                log::info!("loaded {} '{SECTION}' templates", templates.len());
                self.list.load_templates(templates);
            }
            None => {
                log::error!("layout catalog has no '{SECTION}' section");
                self.add_log("No gather actions found.");
            }
        }
    }

    pub fn add_log(&mut self, text: &str) {
        self.log.push(text.to_string());
        if self.log.len() > MAX_LOG {
            self.log.remove(0);
        }
    }

    /// Lay the panels out for a `cols` x `rows` screen.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        if self.screen == (cols, rows) {
            return;
        }
        self.screen = (cols, rows);
        self.gather_panel.set_bounds(&mut self.scene, gather_bounds(rows));
        self.list
            .update_mask(&mut self.scene, self.gather_panel.content_geometry());
        self.inventory
            .set_bounds(&mut self.scene, inventory_bounds(rows));
    }

    // ── Input ───────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::Key(c) => self.handle_key(c),
            InputEvent::Click(action) => self.handle_click(action),
        }
    }

    fn handle_key(&mut self, key: char) -> bool {
        match key {
            'g' => self.handle_click(TOGGLE_GATHER),
            's' => self.handle_click(SAVE_GAME),
            'l' => self.handle_click(LOAD_GAME),
            'n' => self.reveal_next(),
            'u' => self.handle_click(UPGRADE_CARDS),
            'r' => self.handle_click(START_OVER),
            'x' => self.drop_last_card(),
            'j' => {
                let step = self.list.layout().step();
                self.list.scroll_by(&mut self.scene, -step);
                true
            }
            'k' => {
                let step = self.list.layout().step();
                self.list.scroll_by(&mut self.scene, step);
                true
            }
            '1'..='9' => {
                let n = key as usize - '1' as usize;
                self.list.activate_nth(n).is_some()
            }
            _ => false,
        }
    }

    fn handle_click(&mut self, action: ActionId) -> bool {
        match action {
            TOGGLE_GATHER => {
                let expanded = self.list.toggle_visibility(&mut self.scene);
                let title = if expanded { GATHER_TITLE } else { GATHER_TITLE_HIDDEN };
                self.gather_panel.set_title(&mut self.scene, title);
                log::debug!("gather list expanded: {expanded}");
                true
            }
            SAVE_GAME => {
                self.save();
                true
            }
            LOAD_GAME => {
                self.load();
                true
            }
            UPGRADE_CARDS => self.upgrade_cards(),
            START_OVER => {
                self.start_over();
                true
            }
            _ => self.list.activate_by_action(action).is_some(),
        }
    }

    /// Activate the first template without a card.
    pub fn reveal_next(&mut self) -> bool {
        let Some(id) = self.list.next_inactive_template().map(str::to_string) else {
            self.add_log("Nothing left to discover.");
            return false;
        };
        match self
            .list
            .activate_card(&mut self.scene, &id, &mut self.inventory)
        {
            Some(card) => {
                let title = card.title().to_string();
                self.add_log(&format!("New action: {title}"));
                true
            }
            None => false,
        }
    }

    /// Remove the last card in the list together with its inventory row.
    /// Its template can be revealed again, starting from zero.
    pub fn drop_last_card(&mut self) -> bool {
        let last = self
            .list
            .cards()
            .last()
            .and_then(|card| Some((card.id()?.to_string(), card.title().to_string())));
        let Some((id, title)) = last else {
            self.add_log("No card to drop.");
            return false;
        };
        self.list.remove_card_by_id(&mut self.scene, &id);
        self.inventory.remove_row(&mut self.scene, &id);
        self.add_log(&format!("Dropped {title}."));
        true
    }

    /// Change a live card and keep the change as a template override.
    pub fn update_card(&mut self, id: &str, changes: &Map<String, Value>) -> bool {
        let updated = self
            .list
            .update_card_by_id(&mut self.scene, id, |card, scene| {
                save::apply_changes(card, scene, changes)
            });
        if updated {
            if let Err(e) = save::update_override(self.store.as_mut(), id, changes) {
                log::warn!("override for '{id}' not stored: {e}");
            }
        }
        updated
    }

    /// Upgrade every card that can pay `UPGRADE_COST_PER_GAIN` per point of
    /// its current gain. Each upgrade adds one gain.
    pub fn upgrade_cards(&mut self) -> bool {
        let mut due = Vec::new();
        self.list.update_all_cards(&mut self.scene, |card, _| {
            let Some(id) = card.id().map(str::to_string) else {
                return;
            };
            let cost = card.gain() * UPGRADE_COST_PER_GAIN;
            if card.count() >= cost && card.set_count(card.count() - cost).is_ok() {
                due.push((id, card.title().to_string(), card.gain() + 1.0));
            }
        });
        if due.is_empty() {
            self.add_log("Nothing to upgrade yet.");
            return false;
        }
        for (id, title, gain) in due {
            let mut changes = Map::new();
            changes.insert("gain".to_string(), Value::from(gain));
            if self.update_card(&id, &changes) {
                self.add_log(&format!("Upgraded {title} to +{gain}."));
            }
        }
        true
    }

    /// Delete the save and rebuild the list from the templates alone.
    pub fn start_over(&mut self) {
        save::delete_save(self.store.as_mut());
        self.list.clear_all(&mut self.scene);
        self.inventory.clear(&mut self.scene);
        self.load_templates();
        save::restore_session(
            self.store.as_ref(),
            &mut self.list,
            &mut self.scene,
            &mut self.inventory,
        );
        self.autosave.reset();
        self.add_log("Started over.");
    }

    /// A press first hits click targets, then may start a list drag.
    pub fn pointer_down(&mut self, p: Point, targets: &ClickState) -> bool {
        let clicked = match targets.hit_test_point(p) {
            Some(action) => self.handle_input(&InputEvent::Click(action)),
            None => false,
        };
        let dragging = self.list.pointer_down(p, &self.arbiter);
        clicked || dragging
    }

    pub fn pointer_move(&mut self, p: Point) -> bool {
        self.list.pointer_move(&mut self.scene, p)
    }

    pub fn pointer_up(&mut self) -> bool {
        self.list.pointer_up()
    }

    // ── Time and persistence ────────────────────────────────────

    pub fn tick(&mut self, ticks: u32) {
        if ticks > 0 && self.autosave.tick(ticks) {
            if let Err(e) = save::save_game(self.store.as_mut(), &self.list) {
                log::warn!("autosave failed: {e}");
            }
        }
    }

    pub fn save(&mut self) {
        match save::save_game(self.store.as_mut(), &self.list) {
            Ok(n) => self.add_log(&format!("Saved {}.", cards_text(n))),
            Err(e) => {
                log::warn!("save failed: {e}");
                self.add_log("Save failed.");
            }
        }
        self.autosave.reset();
    }

    pub fn load(&mut self) {
        if !save::has_save(self.store.as_ref()) {
            self.add_log("No save found.");
            return;
        }
        let n = save::load_game(
            self.store.as_ref(),
            &mut self.list,
            &mut self.scene,
            &mut self.inventory,
        );
        self.add_log(&format!("Loaded {}.", cards_text(n)));
    }

    // ── Rendering ───────────────────────────────────────────────

    pub fn render(&mut self, f: &mut Frame, cs: &mut ClickState) {
        let area = f.area();
        self.resize(area.width, area.height);
        self.inventory.refresh(&mut self.scene);
        self.scene.draw(f, cs);
        render::render_footer(f, area, self.log.last().map(String::as_str), cs);
    }
}
