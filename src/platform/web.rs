//! Browser driver
//!
//! Wires the DOM to a [`Game`]: arrow keys and buttons in, a frame loop and
//! two spawn intervals as scheduled tasks, and a [`Playfield`] view that
//! mirrors the simulation onto one `<div>` per live entity.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, KeyboardEvent, MouseEvent};

use super::{CancelToken, Scheduler};
use crate::audio::{AudioManager, SoundEffect};
use crate::consts::DEFAULT_PLAYFIELD_HEIGHT;
use crate::game::Game;
use crate::persistence::{LocalStorage, MemoryStorage, Storage, StorageError};
use crate::settings::Settings;
use crate::sim::{EntityId, EntityKind, FallingEntity, GameEvent};
use crate::tuning::Tuning;

/// LocalStorage when the browser allows it, memory otherwise
pub enum BrowserStorage {
    Local(LocalStorage),
    Memory(MemoryStorage),
}

impl BrowserStorage {
    pub fn open() -> Self {
        match LocalStorage::open() {
            Ok(storage) => BrowserStorage::Local(storage),
            Err(e) => {
                log::warn!("LocalStorage unavailable ({}), scores won't persist", e);
                BrowserStorage::Memory(MemoryStorage::new())
            }
        }
    }
}

impl Storage for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            BrowserStorage::Local(s) => s.get(key),
            BrowserStorage::Memory(s) => s.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            BrowserStorage::Local(s) => s.set(key, value),
            BrowserStorage::Memory(s) => s.set(key, value),
        }
    }
}

/// Self-rescheduling `requestAnimationFrame` loop
pub struct FrameTask {
    token: CancelToken,
    pending: Rc<Cell<Option<i32>>>,
}

impl Drop for FrameTask {
    fn drop(&mut self) {
        self.token.cancel();
        if let (Some(id), Some(window)) = (self.pending.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
    }
}

/// `setInterval` timer; the callback lives as long as the task
pub struct IntervalTask {
    handle: Option<i32>,
    _callback: Closure<dyn FnMut()>,
}

impl Drop for IntervalTask {
    fn drop(&mut self) {
        if let (Some(handle), Some(window)) = (self.handle, web_sys::window()) {
            window.clear_interval_with_handle(handle);
        }
    }
}

/// Held only for its `Drop`
#[allow(dead_code)]
pub enum WebTask {
    Frame(FrameTask),
    Interval(IntervalTask),
}

/// Schedules tasks that call back into the shared [`App`]
pub struct WebScheduler {
    app: Weak<RefCell<App>>,
}

impl Scheduler for WebScheduler {
    type Task = WebTask;

    fn frame_loop(&mut self) -> WebTask {
        let token = CancelToken::new();
        let pending = Rc::new(Cell::new(None));
        request_frame(self.app.clone(), token.clone(), pending.clone());
        WebTask::Frame(FrameTask { token, pending })
    }

    fn every(&mut self, period_ms: u32, kind: EntityKind) -> WebTask {
        let app = self.app.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            if let Some(app) = app.upgrade() {
                app.borrow_mut().on_spawn(kind);
            }
        });

        let handle = web_sys::window().and_then(|window| {
            window
                .set_interval_with_callback_and_timeout_and_arguments_0(
                    callback.as_ref().unchecked_ref(),
                    period_ms as i32,
                )
                .map_err(|e| log::error!("setInterval failed: {:?}", e))
                .ok()
        });

        WebTask::Interval(IntervalTask {
            handle,
            _callback: callback,
        })
    }
}

fn request_frame(app: Weak<RefCell<App>>, token: CancelToken, pending: Rc<Cell<Option<i32>>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let slot = pending.clone();
    let closure = Closure::once(move |_time: f64| {
        pending.set(None);
        if token.is_cancelled() {
            return;
        }
        let Some(strong) = app.upgrade() else {
            return;
        };
        strong.borrow_mut().on_frame();
        // Game over drops the task during on_frame: stop here
        if !token.is_cancelled() {
            request_frame(app, token, pending);
        }
    });
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(id) => slot.set(Some(id)),
        Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
    }
    closure.forget();
}

/// DOM mirror of the simulation
pub struct Playfield {
    document: Document,
    container: HtmlElement,
    router: HtmlElement,
    score: Element,
    start_screen: Element,
    game_over_screen: Element,
    final_score: Element,
    elements: HashMap<EntityId, HtmlElement>,
}

fn element(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))
}

fn html_element(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    element(document, id)?.dyn_into::<HtmlElement>().map_err(JsValue::from)
}

fn set_px(el: &HtmlElement, property: &str, value: f32) {
    let _ = el.style().set_property(property, &format!("{value}px"));
}

fn create_entity_element(
    document: &Document,
    container: &HtmlElement,
    entity: &FallingEntity,
) -> Result<HtmlElement, JsValue> {
    let el = document.create_element("div")?.dyn_into::<HtmlElement>()?;
    el.class_list().add_1(entity.kind.as_str())?;
    container.append_child(&el)?;
    Ok(el)
}

impl Playfield {
    pub fn new(document: Document, tuning: &Tuning) -> Result<Self, JsValue> {
        let container = html_element(&document, "game-container")?;
        set_px(&container, "width", tuning.playfield_width);
        set_px(&container, "height", tuning.playfield_height);

        Ok(Self {
            router: html_element(&document, "router")?,
            score: element(&document, "score")?,
            start_screen: element(&document, "start-screen")?,
            game_over_screen: element(&document, "game-over-screen")?,
            final_score: element(&document, "final-score")?,
            container,
            document,
            elements: HashMap::new(),
        })
    }

    /// Reconcile elements with the live entities and redraw the HUD
    pub fn sync<S: Storage, T>(&mut self, game: &Game<S, T>) {
        let mut live = HashSet::new();

        if let Some(session) = game.session() {
            for entity in session.packets.iter().chain(session.viruses.iter()) {
                live.insert(entity.id);
                if !self.elements.contains_key(&entity.id) {
                    match create_entity_element(&self.document, &self.container, entity) {
                        Ok(el) => {
                            self.elements.insert(entity.id, el);
                        }
                        Err(e) => {
                            log::warn!("Could not create {} element: {:?}", entity.kind.as_str(), e);
                            continue;
                        }
                    }
                }
                if let Some(el) = self.elements.get(&entity.id) {
                    set_px(el, "left", entity.pos.x);
                    set_px(el, "top", entity.pos.y);
                }
            }
        }

        self.elements.retain(|id, el| {
            let keep = live.contains(id);
            if !keep {
                el.remove();
            }
            keep
        });

        set_px(&self.router, "left", game.router().x);
        self.score.set_text_content(Some(&game.status_line()));
    }

    fn set_hidden(el: &Element, hidden: bool) {
        let classes = el.class_list();
        let _ = if hidden {
            classes.add_1("hidden")
        } else {
            classes.remove_1("hidden")
        };
    }

    pub fn show_running(&self) {
        Self::set_hidden(&self.start_screen, true);
        Self::set_hidden(&self.game_over_screen, true);
    }

    pub fn show_game_over(&self, final_score: u32) {
        self.final_score
            .set_text_content(Some(&final_score.to_string()));
        Self::set_hidden(&self.game_over_screen, false);
    }
}

/// Everything the browser callbacks share
pub struct App {
    game: Game<BrowserStorage, WebTask>,
    scheduler: WebScheduler,
    view: Playfield,
    audio: AudioManager,
    settings: Settings,
    /// High score fanfare already played this run
    celebrated: bool,
}

impl App {
    fn on_start(&mut self) {
        self.audio.resume();
        if self.game.start(&mut self.scheduler) {
            self.celebrated = false;
            self.view.show_running();
        }
        self.view.sync(&self.game);
    }

    fn on_restart(&mut self) {
        self.audio.resume();
        if self.game.restart(&mut self.scheduler) {
            self.celebrated = false;
            self.view.show_running();
        }
        self.view.sync(&self.game);
    }

    fn on_frame(&mut self) {
        let events = self.game.frame();
        self.handle_events(&events);
    }

    fn on_spawn(&mut self, kind: EntityKind) {
        let events: Vec<_> = self.game.spawn(kind).into_iter().collect();
        self.handle_events(&events);
    }

    fn on_key(&mut self, key: &str) -> bool {
        if key.eq_ignore_ascii_case("m") {
            self.settings.toggle_sound();
            self.audio.apply_settings(&self.settings);
            if let Err(e) = self.settings.save(&mut BrowserStorage::open()) {
                log::warn!("Could not save settings: {}", e);
            }
            log::info!("Sound {}", if self.settings.sound { "on" } else { "off" });
            return true;
        }
        if self.game.handle_key(key) {
            self.view.sync(&self.game);
            return true;
        }
        false
    }

    fn handle_events(&mut self, events: &[GameEvent]) {
        for event in events {
            if let GameEvent::NewHighScore { .. } = event {
                if self.celebrated {
                    continue;
                }
                self.celebrated = true;
            }
            if let Some(effect) = SoundEffect::for_event(event) {
                self.audio.play(effect);
            }
            if let GameEvent::GameOver { final_score } = event {
                self.view.show_game_over(*final_score);
            }
        }
        self.view.sync(&self.game);
    }
}

fn on_click(document: &Document, id: &str, app: Rc<RefCell<App>>, f: fn(&mut App)) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
        f(&mut app.borrow_mut());
    });
    element(document, id)?.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Build the game and hook it up to the page
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
    }

    log::info!("Packet Catcher starting...");

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // Height is fixed at load time, resizing does not re-derive it
    let viewport = window
        .inner_height()?
        .as_f64()
        .unwrap_or(DEFAULT_PLAYFIELD_HEIGHT as f64 / crate::consts::PLAYFIELD_VIEWPORT_FRACTION);
    let tuning = Tuning::for_viewport(viewport);

    let seed = js_sys::Date::now() as u64;
    let settings = Settings::load(&BrowserStorage::open());
    let view = Playfield::new(document.clone(), &tuning)?;
    let game = Game::new(tuning, BrowserStorage::open(), seed);
    log::info!("Game initialized with seed: {}", seed);

    let app = Rc::new_cyclic(|weak| {
        RefCell::new(App {
            game,
            scheduler: WebScheduler { app: weak.clone() },
            view,
            audio: AudioManager::new(&settings),
            settings,
            celebrated: false,
        })
    });
    {
        let mut guard = app.borrow_mut();
        let App { game, view, .. } = &mut *guard;
        view.sync(game);
    }

    // Keyboard
    {
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if app.borrow_mut().on_key(&event.key()) {
                event.prevent_default();
            }
        });
        document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    on_click(&document, "start-button", app.clone(), App::on_start)?;
    on_click(&document, "restart-button", app, App::on_restart)?;

    log::info!("Packet Catcher ready");
    Ok(())
}
