//! Packet Catcher entry point
//!
//! In the browser this wires the game to the page. Natively it plays one
//! headless run on a virtual clock with the router parked in the middle.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    packet_catcher::platform::web::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use packet_catcher::Game;
    use packet_catcher::Tuning;
    use packet_catcher::persistence::MemoryStorage;
    use packet_catcher::platform::clock::{TaskGuard, VirtualClock};
    use packet_catcher::sim::GameEvent;

    /// Give up on runs that outlast this much virtual time
    const MAX_RUN_MS: f64 = 30.0 * 60.0 * 1000.0;

    env_logger::init();
    log::info!("Packet Catcher (headless) starting...");
    log::info!("Run with `trunk serve` for the playable web version");

    // Usage: packet-catcher [tuning.json] [seed]
    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => Tuning::from_json(&std::fs::read_to_string(&path)?)?,
        None => Tuning::default(),
    };
    let seed: u64 = match args.next() {
        Some(seed) => seed.parse()?,
        None => 12345,
    };

    let mut clock = VirtualClock::new();
    let mut game: Game<MemoryStorage, TaskGuard> = Game::new(tuning, MemoryStorage::new(), seed);
    game.start(&mut clock);
    log::info!("Game initialized with seed: {}", seed);

    while game.is_running() && clock.now_ms() < MAX_RUN_MS {
        let until = clock.now_ms() + 1000.0;
        for event in game.run_until(&mut clock, until) {
            match event {
                GameEvent::LevelUp { level } => println!("Level {level}"),
                GameEvent::GameOver { final_score } => println!("Game over! Final score: {final_score}"),
                _ => {}
            }
        }
    }

    println!(
        "{} ({:.1}s simulated)",
        game.status_line(),
        clock.now_ms() / 1000.0
    );
    Ok(())
}
