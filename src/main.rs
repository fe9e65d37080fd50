mod clock;
mod gather;
mod input;
mod logging;
mod pointer;
mod scene;
mod storage;
mod term_scene;

use std::{cell::RefCell, io, rc::Rc};

use clock::{TickClock, TICKS_PER_SEC};
use gather::GatherGame;
use input::{ClickState, GridMetrics, InputEvent};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use scene::Point;

/// Query the grid container's bounding rect and convert client pixels to cells.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<Point> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    GridMetrics {
        left: rect.left(),
        top: rect.top(),
        width: rect.width(),
        height: rect.height(),
        cols: cs.terminal_cols,
        rows: cs.terminal_rows,
    }
    .to_cell(mouse_x as f64, mouse_y as f64)
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);

    let game = Rc::new(RefCell::new(GatherGame::new(storage::open_default())));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Press taps buttons and may start a drag; move and release drive the drag.
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            // A release ends any drag, wherever the pointer is.
            if let MouseEventKind::Released = mouse_event.event {
                game.borrow_mut().pointer_up();
                return;
            }

            let cs = click_state.borrow();
            if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                return;
            }
            let Some(point) = dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs) else {
                return;
            };

            let mut game = game.borrow_mut();
            match mouse_event.event {
                MouseEventKind::Pressed if mouse_event.button == MouseButton::Left => {
                    game.pointer_down(point, &cs);
                }
                MouseEventKind::Moved => {
                    game.pointer_move(point);
                }
                _ => {}
            }
        }
    });

    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let KeyCode::Char(c) = key_event.code {
                game.borrow_mut().handle_input(&InputEvent::Key(c));
            }
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        let tick_clock = RefCell::new(TickClock::new(TICKS_PER_SEC));
        move |f| {
            let ticks = tick_clock.borrow_mut().advance(clock::now_ms());
            let mut game = game.borrow_mut();
            game.tick(ticks);

            let size = f.area();
            let mut cs = click_state.borrow_mut();
            cs.terminal_cols = size.width;
            cs.terminal_rows = size.height;
            cs.clear_targets();
            game.render(f, &mut cs);
        }
    });

    Ok(())
}
