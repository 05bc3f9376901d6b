//! Moth Flight entry point
//!
//! The browser build drives the engine from `requestAnimationFrame` and
//! draws to a 2D canvas. The native build runs a headless autopilot session,
//! useful for balance checks and smoke testing tuning files.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent};

    use moth_flight::persistence::{KeyValueStore, LocalStorage};
    use moth_flight::sim::{GamePhase, ObstacleKind};
    use moth_flight::{
        CancelToken, Engine, FrameLoop, InputQueue, LocalLeaderboard, LoopControl, RenderError,
        RenderSink, Snapshot, Tuning,
    };

    const CANVAS_ID: &str = "canvas";

    /// 2D canvas sink, looked up each frame so a detached canvas skips frames
    struct CanvasSink;

    impl CanvasSink {
        fn context(&self) -> Option<CanvasRenderingContext2d> {
            let document = web_sys::window()?.document()?;
            let canvas = document
                .get_element_by_id(CANVAS_ID)?
                .dyn_into::<HtmlCanvasElement>()
                .ok()?;
            canvas
                .get_context("2d")
                .ok()??
                .dyn_into::<CanvasRenderingContext2d>()
                .ok()
        }
    }

    fn js_err(e: JsValue) -> RenderError {
        RenderError::Draw(format!("{e:?}"))
    }

    impl RenderSink for CanvasSink {
        fn is_available(&self) -> bool {
            self.context().is_some()
        }

        fn draw(&mut self, s: &Snapshot<'_>) -> Result<(), RenderError> {
            let ctx = self.context().ok_or(RenderError::SurfaceLost)?;
            let (w, h) = (s.field.0 as f64, s.field.1 as f64);

            ctx.set_global_alpha(1.0);
            ctx.set_fill_style_str("#0b0d1a");
            ctx.fill_rect(0.0, 0.0, w, h);

            for mote in s.motes {
                ctx.set_global_alpha(mote.opacity as f64);
                ctx.set_fill_style_str(&format!("hsl({}, 90%, 60%)", mote.hue));
                ctx.begin_path();
                ctx.arc(mote.pos.x as f64, mote.pos.y as f64, mote.size as f64, 0.0, TAU)
                    .map_err(js_err)?;
                ctx.fill();
            }
            ctx.set_global_alpha(1.0);

            if let Some(lamp) = s.lamp {
                let r = lamp.rect;
                ctx.set_fill_style_str("#ffd76a");
                ctx.fill_rect(r.pos.x as f64, r.pos.y as f64, r.size.x as f64, r.size.y as f64);
            }

            for obstacle in s.obstacles {
                let r = obstacle.rect;
                ctx.set_fill_style_str(match obstacle.kind {
                    ObstacleKind::Web => "#c8c8d8",
                    ObstacleKind::Wind => "#5fa8d3",
                });
                ctx.fill_rect(r.pos.x as f64, r.pos.y as f64, r.size.x as f64, r.size.y as f64);
            }

            ctx.set_fill_style_str("#ff9f43");
            for projectile in s.projectiles {
                let r = projectile.rect;
                ctx.fill_rect(r.pos.x as f64, r.pos.y as f64, r.size.x as f64, r.size.y as f64);
            }

            if s.phase != GamePhase::Menu {
                // Blink at ~7 Hz while invulnerable
                let blink = s.invulnerable && (js_sys::Date::now() / 70.0) as u64 % 2 == 0;
                if !blink {
                    let r = s.player.rect;
                    ctx.set_fill_style_str("#f5e6c8");
                    ctx.fill_rect(r.pos.x as f64, r.pos.y as f64, r.size.x as f64, r.size.y as f64);
                }
            }

            ctx.set_fill_style_str("#ffffff");
            ctx.set_font("18px sans-serif");
            match s.phase {
                GamePhase::Menu => {
                    ctx.fill_text("MOTH FLIGHT", w / 2.0 - 70.0, h / 2.0 - 20.0)
                        .map_err(js_err)?;
                    ctx.fill_text("Press Enter to fly", w / 2.0 - 80.0, h / 2.0 + 10.0)
                        .map_err(js_err)?;
                }
                GamePhase::Playing => {
                    let hud = format!("Score {}   Lives {}   Level {}", s.score, s.lives, s.level);
                    ctx.fill_text(&hud, 12.0, 24.0).map_err(js_err)?;
                }
                GamePhase::GameOver => {
                    let score = s.final_score.unwrap_or(s.score);
                    ctx.fill_text(&format!("Final score {score}"), w / 2.0 - 70.0, h / 2.0 - 20.0)
                        .map_err(js_err)?;
                    ctx.fill_text("R to retry, Esc for menu", w / 2.0 - 95.0, h / 2.0 + 10.0)
                        .map_err(js_err)?;
                }
            }
            Ok(())
        }
    }

    /// Everything the browser loop needs between frames
    struct Game {
        engine: Engine<LocalLeaderboard>,
        frames: FrameLoop,
        input: InputQueue,
        sink: CanvasSink,
        board_store: Option<LocalStorage>,
        last_phase: GamePhase,
    }

    impl Game {
        fn frame(&mut self, time: f64) -> LoopControl {
            let control = self
                .frames
                .run_frame(&mut self.engine, &mut self.input, &mut self.sink, time);

            // Cache the leaderboard whenever a run ends
            let phase = self.engine.phase();
            if phase != self.last_phase {
                if phase == GamePhase::GameOver {
                    if let Some(store) = self.board_store.as_mut() {
                        if let Err(e) = self.engine.reporter().save(store) {
                            log::warn!("Could not cache leaderboard: {}", e);
                        }
                    }
                }
                self.last_phase = phase;
            }
            control
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        let seed = js_sys::Date::now() as u64;
        log::info!("Moth Flight starting with seed {}", seed);

        let board_store = LocalStorage::open();
        let board = match board_store.as_ref() {
            Some(store) => LocalLeaderboard::load(store as &dyn KeyValueStore),
            None => LocalLeaderboard::new(),
        };

        let mut engine = match Engine::new(Tuning::default(), board, seed) {
            Ok(engine) => engine,
            Err(e) => {
                log::error!("Cannot start: {}", e);
                return;
            }
        };
        match LocalStorage::open() {
            Some(store) => engine = engine.with_store(Box::new(store)),
            None => log::warn!("localStorage unavailable, profile will not persist"),
        }

        let frames = FrameLoop::new();
        let cancel = frames.cancel_token();
        let game = Rc::new(RefCell::new(Game {
            engine,
            frames,
            input: InputQueue::new(),
            sink: CanvasSink,
            board_store,
            last_phase: GamePhase::Menu,
        }));

        setup_input_handlers(game.clone());
        setup_cancel_on_unload(cancel);
        request_animation_frame(game);

        log::info!("Moth Flight running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        for (event_name, pressed) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().input.on_key(&event.key(), pressed) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keys released while the page is unfocused never fire keyup
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().input.release_all();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_cancel_on_unload(cancel: CancelToken) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            log::info!("Page hidden, stopping frame loop");
            cancel.cancel();
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let control = game.borrow_mut().frame(time);
        if control != LoopControl::Stop {
            request_animation_frame(game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::fs;
    use std::path::PathBuf;

    use anyhow::Context;
    use clap::Parser;

    use moth_flight::consts::FRAME_MS;
    use moth_flight::render::LogSink;
    use moth_flight::sim::{GamePhase, TickInput};
    use moth_flight::{
        Command, Engine, FrameLoop, InputQueue, LeaderboardSource, LocalLeaderboard, LoopControl,
        Snapshot, Tuning,
    };

    #[derive(Parser)]
    #[command(name = "moth-flight")]
    #[command(about = "Run a headless Moth Flight session driven by a simple autopilot")]
    pub struct Args {
        /// RNG seed for obstacle placement
        #[arg(long, default_value_t = 0x4d07)]
        seed: u64,
        /// Maximum frames to simulate (60 per second)
        #[arg(long, default_value_t = 10_800)]
        frames: u64,
        /// Identifier the score is reported under
        #[arg(long, default_value = "guest")]
        identifier: String,
        /// Display name shown on the leaderboard
        #[arg(long, default_value = "")]
        name: String,
        /// JSON tuning file (defaults to the built-in balance)
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Play the lamp-goal rule set (added to the tuning file if one is given)
        #[arg(long)]
        lamp: bool,
    }

    fn load_tuning(args: &Args) -> anyhow::Result<Tuning> {
        let tuning = match &args.tuning {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Tuning::from_json(&json)
                    .with_context(|| format!("Invalid tuning in {}", path.display()))?
            }
            None => Tuning::default(),
        };
        if args.lamp {
            return Ok(tuning.with_lamp()?);
        }
        Ok(tuning)
    }

    /// Dodge the nearest threat in the player's lane, otherwise drift home
    fn autopilot(s: &Snapshot<'_>) -> TickInput {
        let player = s.player.rect;
        let center = player.center();
        let mut input = TickInput {
            fire: true,
            ..Default::default()
        };

        let threat = s
            .obstacles
            .iter()
            .filter(|o| {
                let r = o.rect;
                r.right() > player.left()
                    && r.left() - player.right() < 220.0
                    && r.top() < player.bottom() + 12.0
                    && r.bottom() > player.top() - 12.0
            })
            .min_by(|a, b| a.rect.left().total_cmp(&b.rect.left()));

        let target_y = match (threat, s.lamp) {
            (Some(o), _) => {
                let r = o.rect;
                let room_above = r.top();
                let room_below = s.field.1 - r.bottom();
                if room_above > room_below {
                    r.top() - player.size.y
                } else {
                    r.bottom() + player.size.y
                }
            }
            (None, Some(lamp)) => {
                input.move_right = true;
                lamp.rect.center().y
            }
            (None, None) => s.field.1 / 2.0,
        };

        if target_y < center.y - 2.0 {
            input.move_up = true;
        } else if target_y > center.y + 2.0 {
            input.move_down = true;
        }
        input
    }

    pub fn run(args: Args) -> anyhow::Result<()> {
        let tuning = load_tuning(&args)?;
        let mut engine = Engine::new(tuning, LocalLeaderboard::new(), args.seed)?;
        engine.set_identity(&args.identifier, &args.name);

        let mut frames = FrameLoop::new();
        let mut input = InputQueue::new();
        let mut sink = LogSink::default();
        input.push_command(Command::Start);

        log::info!("Simulating up to {} frames (seed {:#x})", args.frames, args.seed);
        for frame in 0..args.frames {
            input.set_flags(autopilot(&engine.snapshot()));
            let now = frame as f64 * FRAME_MS;
            match frames.run_frame(&mut engine, &mut input, &mut sink, now) {
                LoopControl::Continue => {}
                LoopControl::Idle | LoopControl::Stop => break,
            }
        }

        let session = engine.session();
        println!();
        println!("=== RESULTS ===");
        println!("  Seed:       {:#x}", args.seed);
        println!("  Frames:     {}", session.frame);
        println!("  Survived:   {:.1}s", session.survival_ms() / 1000.0);
        println!("  Score:      {}", session.score);
        println!("  Lives:      {}", session.lives);
        println!("  Level:      {}", session.level);
        match session.phase {
            GamePhase::GameOver => println!("  Outcome:    game over"),
            _ => println!("  Outcome:    still flying"),
        }

        let board = engine.reporter().get_leaderboard(5);
        if !board.is_empty() {
            println!();
            println!("=== LEADERBOARD ===");
            for (rank, entry) in board.iter().enumerate() {
                println!(
                    "  {:>2}. {:<12} {:>8}  {}",
                    rank + 1,
                    entry.identifier,
                    entry.score,
                    entry.display_name
                );
            }
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Moth Flight (native, headless) starting...");

    headless::run(headless::Args::parse())
}
