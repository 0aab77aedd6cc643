//! Game state and round setup
//!
//! Everything a tick reads or writes lives in `GameState`, including the
//! score/round/level/lives counters (`Session`) that a driver would
//! otherwise keep as globals.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::PlatformSet;
use super::layout::LevelLayout;
use super::pickups::{CherryGroup, PowerCoin};
use super::player::Player;
use super::spawner::EnemyGroup;
use crate::consts::*;

/// Where the player and the power coin start every round
pub const ROUND_START: Vec2 = Vec2::new(
    (NCOLS / 2) as f32 * TILE_W,
    (NROWS / 2) as f32 * TILE_H,
);

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Short pause after a round starts
    Ready,
    /// Active gameplay
    Playing,
    /// All cherries eaten, player dancing
    Won,
    /// Touched a hostile enemy, player dying
    Dying,
}

/// Notifications for the scoring/HUD side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Points scored at a position (floating score text)
    Points { amount: u64, pos: Vec2 },
    RoundStarted { round: u32 },
    RoundAdvanced { round: u32 },
    LifeLost { lives_left: u8 },
    GameOver { score: u64 },
    NewHighScore { score: u64 },
    PoweredUp,
    EnemyTransformed,
}

/// Counters that outlive a single round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub score: u64,
    /// 1-based round number
    pub round: u32,
    /// Index into the level list
    pub level: usize,
    pub lives: u8,
    pub high_score: u64,
    /// Lives granted by a new game
    pub start_lives: u8,
}

impl Session {
    pub fn new(lives: u8, high_score: u64) -> Self {
        Self {
            score: 0,
            round: 1,
            level: 0,
            lives,
            high_score,
            start_lives: lives,
        }
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub session: Session,
    pub phase: GamePhase,
    /// Time spent in `Ready`
    pub ready_timer: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Level descriptions, cycled by round
    levels: Vec<LevelLayout>,
    pub platforms: PlatformSet,
    pub player: Player,
    pub enemies: EnemyGroup,
    pub cherries: CherryGroup,
    pub coin: PowerCoin,
    /// Next entry of the capture points table
    pub capture_index: usize,
    /// Events since the last drain
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl GameState {
    /// New game on the first level. An empty level list plays an empty arena.
    pub fn new(mut levels: Vec<LevelLayout>, lives: u8, high_score: u64) -> Self {
        if levels.is_empty() {
            levels.push(LevelLayout::default());
        }
        let mut state = Self {
            session: Session::new(lives, high_score),
            phase: GamePhase::Ready,
            ready_timer: 0.0,
            time_ticks: 0,
            levels,
            platforms: PlatformSet::default(),
            player: Player::default(),
            enemies: EnemyGroup::default(),
            cherries: CherryGroup::default(),
            coin: PowerCoin::default(),
            capture_index: 0,
            events: Vec::new(),
        };
        state.start_round(true);
        state
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn current_level(&self) -> &LevelLayout {
        let index = self.session.level % self.levels.len();
        &self.levels[index]
    }

    /// Rebuild the level's platforms and enemies and reset the actors. A
    /// retry keeps the remaining cherries but drops the light.
    pub fn start_round(&mut self, refresh_cherries: bool) {
        let layout = self.current_level().clone();
        self.platforms = PlatformSet::from_layout(&layout);
        self.enemies = EnemyGroup::from_layout(&layout);
        if refresh_cherries {
            self.cherries = CherryGroup::from_layout(&layout);
        } else {
            self.cherries.clear_lit();
        }

        self.coin.hide_at(ROUND_START);
        self.coin.timer = 0.0;
        self.player.powered_up = false;
        self.player.respawn_at(ROUND_START);

        self.phase = GamePhase::Ready;
        self.ready_timer = 0.0;
        log::info!(
            "Round {} on level {} ({} cherries)",
            self.session.round,
            self.session.level,
            self.cherries.len()
        );
        self.push_event(GameEvent::RoundStarted {
            round: self.session.round,
        });
    }

    pub fn add_points(&mut self, amount: u64, pos: Vec2) {
        if amount == 0 {
            return;
        }
        self.session.score += amount;
        self.push_event(GameEvent::Points { amount, pos });
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all events since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
