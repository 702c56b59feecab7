//! Game state machine: Idle → Running → GameOver → (restart) → Running
//!
//! A [`Game`] owns everything that outlives a single run: tuning, the
//! router, the high score and its storage. The per-run [`Session`] and the
//! scheduled tasks driving it live inside [`Phase`], so leaving `Running`
//! releases the tasks by dropping them.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::highscores::HighScore;
use crate::persistence::Storage;
use crate::platform::clock::{TaskGuard, VirtualClock};
use crate::platform::{Scheduler, SessionTasks, Trigger};
use crate::sim::{self, Direction, EntityKind, GameEvent, Router, Session, TickOutcome};
use crate::status_line;
use crate::tuning::Tuning;

/// Current phase of the game
pub enum Phase<T> {
    /// Before the first start
    Idle,
    /// Frame loop and spawn timers are live
    Running {
        session: Session,
        tasks: SessionTasks<T>,
    },
    /// Run ended; the session is kept for display only
    GameOver { session: Session },
}

impl<T> Phase<T> {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Running { .. } => "running",
            Phase::GameOver { .. } => "game over",
        }
    }
}

/// The game controller
pub struct Game<S, T> {
    tuning: Tuning,
    phase: Phase<T>,
    router: Router,
    high_score: HighScore,
    storage: S,
    rng: Pcg32,
}

impl<S: Storage, T> Game<S, T> {
    /// Create an idle game, reading the stored high score
    pub fn new(tuning: Tuning, storage: S, seed: u64) -> Self {
        let high_score = HighScore::load(&storage);
        Self {
            router: Router::centered(&tuning),
            tuning,
            phase: Phase::Idle,
            high_score,
            storage,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> &Phase<T> {
        &self.phase
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver { .. })
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The current or just-finished run
    pub fn session(&self) -> Option<&Session> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Running { session, .. } | Phase::GameOver { session } => Some(session),
        }
    }

    pub fn score(&self) -> u32 {
        self.session().map_or(0, |s| s.score)
    }

    pub fn level(&self) -> u32 {
        self.session().map_or(1, |s| s.level)
    }

    pub fn high_score(&self) -> u32 {
        self.high_score.best()
    }

    /// Score shown on the game-over screen
    pub fn final_score(&self) -> Option<u32> {
        match &self.phase {
            Phase::GameOver { session } => Some(session.score),
            _ => None,
        }
    }

    pub fn status_line(&self) -> String {
        status_line(self.score(), self.level(), self.high_score())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Idle → Running. Returns false in any other phase.
    pub fn start<K: Scheduler<Task = T>>(&mut self, scheduler: &mut K) -> bool {
        if !matches!(self.phase, Phase::Idle) {
            log::warn!("Ignoring start while {}", self.phase.name());
            return false;
        }
        self.begin(scheduler);
        log::info!("Game started");
        true
    }

    /// GameOver → Running with a fresh session and a centered router
    pub fn restart<K: Scheduler<Task = T>>(&mut self, scheduler: &mut K) -> bool {
        if !self.is_game_over() {
            log::warn!("Ignoring restart while {}", self.phase.name());
            return false;
        }
        self.router = Router::centered(&self.tuning);
        self.begin(scheduler);
        log::info!("Game restarted");
        true
    }

    fn begin<K: Scheduler<Task = T>>(&mut self, scheduler: &mut K) {
        let tasks = SessionTasks::acquire(scheduler, &self.tuning);
        self.phase = Phase::Running {
            session: Session::new(),
            tasks,
        };
    }

    /// Running → GameOver, dropping the frame loop and both spawn timers
    fn end(&mut self) -> u32 {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Running { session, tasks } => {
                drop(tasks);
                let final_score = session.score;
                log::info!(
                    "Game over: score {} at level {} after {} frames",
                    final_score,
                    session.level,
                    session.time_ticks
                );
                self.phase = Phase::GameOver { session };
                final_score
            }
            other => {
                self.phase = other;
                self.score()
            }
        }
    }

    /// One display frame: motion, collisions, scoring, maybe game over
    pub fn frame(&mut self) -> Vec<GameEvent> {
        let Phase::Running { session, .. } = &mut self.phase else {
            return Vec::new();
        };

        let mut events = Vec::new();
        let outcome = sim::tick(session, &self.router, &self.tuning, &mut events);

        let mut out = Vec::with_capacity(events.len());
        for event in events {
            out.push(event);
            if let GameEvent::Caught { score, .. } = event {
                if self.high_score.record(score, &mut self.storage) {
                    log::info!("New high score: {}", score);
                    out.push(GameEvent::NewHighScore { score });
                }
            }
        }

        if let TickOutcome::VirusHit(_) = outcome {
            let final_score = self.end();
            out.push(GameEvent::GameOver { final_score });
        }
        out
    }

    /// A spawn timer fired
    pub fn spawn(&mut self, kind: EntityKind) -> Option<GameEvent> {
        let Phase::Running { session, .. } = &mut self.phase else {
            return None;
        };
        session.spawn(kind, &self.tuning, &mut self.rng)
    }

    pub fn dispatch(&mut self, trigger: Trigger) -> Vec<GameEvent> {
        match trigger {
            Trigger::Frame => self.frame(),
            Trigger::Spawn(kind) => self.spawn(kind).into_iter().collect(),
        }
    }

    /// Move the router. Accepted in every phase, not only while running.
    pub fn move_router(&mut self, direction: Direction) {
        self.router.nudge(direction, &self.tuning);
    }

    /// Handle a `KeyboardEvent.key`; returns true if it moved the router
    pub fn handle_key(&mut self, key: &str) -> bool {
        match Direction::from_key(key) {
            Some(direction) => {
                self.move_router(direction);
                true
            }
            None => false,
        }
    }
}

impl<S: Storage> Game<S, TaskGuard> {
    /// Handle every trigger the clock has due up to `until_ms`
    pub fn run_until(&mut self, clock: &mut VirtualClock, until_ms: f64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while let Some(trigger) = clock.pop_due(until_ms) {
            events.extend(self.dispatch(trigger));
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::STORAGE_KEY;
    use crate::persistence::MemoryStorage;
    use crate::sim::FallingEntity;
    use glam::Vec2;
    use proptest::prelude::*;

    type TestGame = Game<MemoryStorage, TaskGuard>;

    fn new_game() -> TestGame {
        Game::new(Tuning::default(), MemoryStorage::new(), 42)
    }

    fn running_session(game: &mut TestGame) -> &mut Session {
        match &mut game.phase {
            Phase::Running { session, .. } => session,
            _ => panic!("game is not running"),
        }
    }

    /// Place an entity so that the next frame lands it on the router
    fn drop_on_router(game: &mut TestGame, kind: EntityKind, id: u32) {
        let tuning = game.tuning.clone();
        let x = game.router.x;
        let session = running_session(game);
        let speed = tuning.base_speed(kind) + session.level;
        session.entities_mut(kind).push(FallingEntity {
            id,
            kind,
            pos: Vec2::new(x, tuning.router_top() - tuning.entity_size - speed as f32),
            speed,
        });
    }

    #[test]
    fn test_idle_game() {
        let mut game = new_game();
        assert!(matches!(game.phase(), Phase::Idle));
        assert_eq!(game.status_line(), "Score: 0 | Level: 1 | High Score: 0");
        assert!(game.frame().is_empty());
        assert_eq!(game.spawn(EntityKind::Packet), None);
        assert_eq!(game.final_score(), None);
    }

    #[test]
    fn test_start_acquires_tasks_and_spawns() {
        let mut clock = VirtualClock::new();
        let mut game = new_game();

        assert!(game.start(&mut clock));
        assert!(game.is_running());
        assert_eq!(clock.active_tasks(), 3);
        assert!(!game.start(&mut clock));
        assert_eq!(clock.active_tasks(), 3);

        let events = game.run_until(&mut clock, 2100.0);
        assert!(events.contains(&GameEvent::Spawned { id: 1, kind: EntityKind::Packet }));
        assert!(events.contains(&GameEvent::Spawned { id: 2, kind: EntityKind::Virus }));
        let session = game.session().expect("running");
        assert!(session.time_ticks >= 125);
    }

    #[test]
    fn test_tenth_catch_levels_up() {
        let mut clock = VirtualClock::new();
        let mut game = new_game();
        game.start(&mut clock);

        for id in 1..=9 {
            drop_on_router(&mut game, EntityKind::Packet, 1000 + id);
            game.frame();
        }
        assert_eq!((game.score(), game.level()), (9, 1));

        drop_on_router(&mut game, EntityKind::Packet, 2000);
        let events = game.frame();
        assert_eq!((game.score(), game.level()), (10, 2));
        assert!(events.contains(&GameEvent::LevelUp { level: 2 }));
        assert_eq!(game.status_line(), "Score: 10 | Level: 2 | High Score: 10");
    }

    #[test]
    fn test_virus_hit_stops_everything() {
        let mut clock = VirtualClock::new();
        let mut game = new_game();
        game.start(&mut clock);
        game.run_until(&mut clock, 3000.0);

        drop_on_router(&mut game, EntityKind::Packet, 900);
        drop_on_router(&mut game, EntityKind::Virus, 901);
        let events = game.frame();

        assert!(game.is_game_over());
        assert_eq!(game.final_score(), Some(1));
        assert_eq!(events.last(), Some(&GameEvent::GameOver { final_score: 1 }));
        assert_eq!(clock.active_tasks(), 0);

        // Nothing moves or spawns any more
        let frozen = game.session().expect("kept for display").clone();
        assert!(game.run_until(&mut clock, 20_000.0).is_empty());
        let after = game.session().expect("kept for display");
        assert_eq!(after.time_ticks, frozen.time_ticks);
        assert_eq!(after.live_count(), frozen.live_count());
        assert_eq!(game.spawn(EntityKind::Virus), None);
    }

    #[test]
    fn test_restart_resets_run() {
        let mut clock = VirtualClock::new();
        let mut game = new_game();
        assert!(!game.restart(&mut clock));
        game.start(&mut clock);
        // Early enough that nothing spawned has reached the router yet
        game.run_until(&mut clock, 3500.0);

        for id in 0..3 {
            drop_on_router(&mut game, EntityKind::Packet, 500 + id);
            game.frame();
        }
        game.move_router(Direction::Left);
        drop_on_router(&mut game, EntityKind::Virus, 600);
        game.frame();
        assert!(game.is_game_over());

        assert!(game.restart(&mut clock));
        assert!(game.is_running());
        assert_eq!((game.score(), game.level()), (0, 1));
        assert_eq!(game.router().x, (500.0 - 60.0) / 2.0);
        let session = game.session().expect("running");
        assert!(session.packets.is_empty() && session.viruses.is_empty());
        assert_eq!(game.high_score(), 3);
        assert_eq!(clock.active_tasks(), 3);

        // Fresh spawns start from base speed + level 1
        let until = clock.now_ms() + 2100.0;
        game.run_until(&mut clock, until);
        let session = game.session().expect("running");
        for packet in &session.packets {
            assert_eq!(packet.speed, 3 + 1);
        }
        for virus in &session.viruses {
            assert_eq!(virus.speed, 4 + 1);
        }
    }

    #[test]
    fn test_high_score_persists_across_games() {
        let mut clock = VirtualClock::new();
        let mut game = new_game();
        game.start(&mut clock);
        for id in 0..4 {
            drop_on_router(&mut game, EntityKind::Packet, 10 + id);
            let events = game.frame();
            assert!(events.contains(&GameEvent::NewHighScore { score: id + 1 }));
        }

        let storage = game.into_storage();
        assert_eq!(storage.get(STORAGE_KEY).unwrap().as_deref(), Some("4"));
        let reloaded: TestGame = Game::new(Tuning::default(), storage, 1);
        assert_eq!(reloaded.high_score(), 4);
    }

    #[test]
    fn test_lower_score_keeps_high_score() {
        let mut storage = MemoryStorage::new();
        storage.set(STORAGE_KEY, "50").unwrap();
        let mut clock = VirtualClock::new();
        let mut game: TestGame = Game::new(Tuning::default(), storage, 1);
        game.start(&mut clock);

        drop_on_router(&mut game, EntityKind::Packet, 1);
        let events = game.frame();
        assert!(!events.iter().any(|e| matches!(e, GameEvent::NewHighScore { .. })));
        assert_eq!(game.high_score(), 50);
    }

    // The router also moves outside a run.
    #[test]
    fn test_router_moves_while_not_running() {
        let mut clock = VirtualClock::new();
        let mut game = new_game();
        let centered = game.router().x;

        assert!(game.handle_key("ArrowLeft"));
        assert_eq!(game.router().x, centered - 20.0);
        assert!(!game.handle_key("Enter"));

        game.start(&mut clock);
        drop_on_router(&mut game, EntityKind::Virus, 1);
        game.frame();
        assert!(game.is_game_over());

        let before = game.router().x;
        game.handle_key("ArrowRight");
        assert_eq!(game.router().x, before + 20.0);
    }

    #[derive(Debug, Clone)]
    enum Action {
        Key(Direction),
        Wait(u32),
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            Just(Action::Key(Direction::Left)),
            Just(Action::Key(Direction::Right)),
            (10u32..3000).prop_map(Action::Wait),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_scores_and_bounds_hold(
            seed in any::<u64>(),
            actions in proptest::collection::vec(action(), 1..80),
        ) {
            let mut clock = VirtualClock::new();
            let mut game: TestGame = Game::new(Tuning::default(), MemoryStorage::new(), seed);
            game.start(&mut clock);
            let mut last_high = game.high_score();
            let mut last_score = 0;

            for action in actions {
                match action {
                    Action::Key(direction) => game.move_router(direction),
                    Action::Wait(ms) => {
                        let until = clock.now_ms() + ms as f64;
                        game.run_until(&mut clock, until);
                    }
                }

                let tuning = game.tuning().clone();
                prop_assert!(game.router().x >= 0.0 && game.router().x <= tuning.router_max_x());
                prop_assert!(game.high_score() >= last_high);
                prop_assert!(game.score() >= last_score);
                prop_assert!(game.high_score() >= game.score());
                prop_assert_eq!(game.level(), 1 + game.score() / tuning.points_per_level);
                if let Some(session) = game.session() {
                    for entity in session.packets.iter().chain(session.viruses.iter()) {
                        prop_assert!(entity.pos.y <= tuning.playfield_height);
                    }
                    prop_assert!(session.packets.len() <= tuning.max_packets);
                    prop_assert!(session.viruses.len() <= tuning.max_viruses);
                }
                last_high = game.high_score();
                last_score = game.score();

                if game.is_game_over() {
                    prop_assert_eq!(clock.active_tasks(), 0);
                    game.restart(&mut clock);
                    prop_assert_eq!(game.score(), 0);
                    last_score = 0;
                }
            }
        }
    }
}
