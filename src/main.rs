//! Bomb Jack headless driver
//!
//! Loads the settings, the level files and the high score, then plays the
//! simulation at a fixed step with a seeded autopilot standing in for a
//! player. Rendering and audio belong to other front ends.

use std::path::PathBuf;

use anyhow::Result;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use bombjack::sim::{
    GameEvent, GamePhase, GameState, LevelLayout, SequenceClock, TickInput, tick,
};
use bombjack::{HighScore, Settings};

/// Seconds between autopilot decisions
const DECISION_TIME: f32 = 0.4;

/// End-of-run report
#[derive(Debug, Default, Serialize)]
struct Summary {
    ticks: u64,
    score: u64,
    high_score: u64,
    round: u32,
    lives: u8,
    rounds_cleared: u32,
    lives_lost: u32,
    games_over: u32,
    power_ups: u32,
    transformations: u32,
}

/// Game instance holding all state
struct Game {
    state: GameState,
    input: TickInput,
    /// Dance or death sequence being played
    sequence: Option<SequenceClock>,
    rng: Pcg32,
    decision_timer: f32,
    high: HighScore,
    high_score_path: PathBuf,
    summary: Summary,
}

impl Game {
    fn new(settings: &Settings, levels: Vec<LevelLayout>, high: HighScore) -> Self {
        Self {
            state: GameState::new(levels, settings.effective_lives(), high.score),
            input: TickInput::default(),
            sequence: None,
            rng: Pcg32::seed_from_u64(settings.demo_seed),
            decision_timer: DECISION_TIME,
            high,
            high_score_path: settings.high_score_path.clone(),
            summary: Summary::default(),
        }
    }

    /// Run one simulation tick and handle what it reported
    fn step(&mut self, dt: f32) -> Result<()> {
        self.steer(dt);
        tick(&mut self.state, &self.input, dt);

        // Clear one-shot inputs after processing
        self.input.jump = false;
        self.input.sequence_done = false;

        for event in self.state.drain_events() {
            self.handle(event)?;
        }

        match self.state.phase {
            GamePhase::Won | GamePhase::Dying => {
                let clock = self.sequence.get_or_insert_with(|| {
                    if self.state.phase == GamePhase::Won {
                        SequenceClock::dance()
                    } else {
                        SequenceClock::death()
                    }
                });
                if clock.advance(dt) {
                    self.input.sequence_done = true;
                    self.sequence = None;
                }
            }
            GamePhase::Ready | GamePhase::Playing => self.sequence = None,
        }
        self.summary.ticks += 1;
        Ok(())
    }

    fn handle(&mut self, event: GameEvent) -> Result<()> {
        match event {
            GameEvent::Points { amount, pos } => {
                log::trace!("+{} at ({:.0}, {:.0})", amount, pos.x, pos.y);
            }
            GameEvent::RoundStarted { round } => log::debug!("Round {} ready", round),
            GameEvent::RoundAdvanced { .. } => self.summary.rounds_cleared += 1,
            GameEvent::LifeLost { .. } => self.summary.lives_lost += 1,
            GameEvent::GameOver { .. } => self.summary.games_over += 1,
            GameEvent::NewHighScore { score } => {
                if self.high.submit(score) {
                    self.high.save(&self.high_score_path)?;
                }
            }
            GameEvent::PoweredUp => self.summary.power_ups += 1,
            GameEvent::EnemyTransformed => self.summary.transformations += 1,
        }
        Ok(())
    }

    /// Autopilot: head for the nearest cherry most of the time, wander otherwise
    fn steer(&mut self, dt: f32) {
        self.decision_timer += dt;
        if self.decision_timer < DECISION_TIME {
            return;
        }
        self.decision_timer = 0.0;

        let player = self.state.player.center();
        let nearest = self
            .state
            .cherries
            .iter()
            .map(|c| c.pos)
            .min_by(|a, b| {
                a.distance_squared(player)
                    .partial_cmp(&b.distance_squared(player))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        let controls = &mut self.input.controls;
        match nearest {
            Some(target) if self.rng.random_bool(0.7) => {
                controls.left = target.x < player.x - 2.0;
                controls.right = target.x > player.x + 2.0;
                controls.up = target.y < player.y;
                controls.down = false;
                self.input.jump = target.y < player.y - 10.0;
            }
            _ => {
                let dir = self.rng.random_range(0..3);
                controls.left = dir == 0;
                controls.right = dir == 1;
                controls.up = self.rng.random_bool(0.5);
                controls.down = !controls.up && self.rng.random_bool(0.2);
                self.input.jump = self.rng.random_bool(0.25);
            }
        }
    }

    fn finish(mut self) -> Summary {
        let session = &self.state.session;
        self.summary.score = session.score;
        self.summary.high_score = session.high_score.max(self.high.score);
        self.summary.round = session.round;
        self.summary.lives = session.lives;
        self.summary
    }
}

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Bomb Jack (headless) starting...");

    let settings_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(Settings::FILE_NAME));
    let settings = Settings::load(&settings_path)?;

    let levels = (0..settings.level_count)
        .map(|i| LevelLayout::load(&settings.level_path(i)))
        .collect::<Result<Vec<_>, _>>()?;
    let high = HighScore::load(&settings.high_score_path)?;

    let mut game = Game::new(&settings, levels, high);
    let dt = settings.sim_dt();
    for _ in 0..settings.demo_ticks() {
        game.step(dt)?;
    }

    let summary = game.finish();
    log::info!(
        "Finished: {} points over {} ticks",
        summary.score,
        summary.ticks
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
