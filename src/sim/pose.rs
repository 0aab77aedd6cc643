//! Pose selection for renderers
//!
//! Pure functions of actor state; nothing here feeds back into the
//! simulation. `SequenceClock` lets a driver time the dance and death
//! sequences and report `sequence_done`.

use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyKind, Status};
use super::player::{Facing, Player};

/// Time each sequence frame is shown
pub const FRAME_TIME: f32 = 0.1;
/// Eight poses, four times over
pub const DANCE_FRAMES: u32 = 32;
/// Thirteen poses, twice over
pub const DEATH_FRAMES: u32 = 26;
pub const DANCE_TIME: f32 = DANCE_FRAMES as f32 * FRAME_TIME;
pub const DEATH_TIME: f32 = DEATH_FRAMES as f32 * FRAME_TIME;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerPose {
    Standing,
    Walking(Facing),
    Rising(Facing),
    Falling(Facing),
    Dancing,
    Dying,
}

pub fn player_pose(player: &Player) -> PlayerPose {
    if player.dancing {
        return PlayerPose::Dancing;
    }
    if player.dying {
        return PlayerPose::Dying;
    }
    match (player.jumped, player.facing) {
        (false, Facing::Neutral) => PlayerPose::Standing,
        (false, facing) => PlayerPose::Walking(facing),
        (true, facing) if player.vel.y < 0.0 => PlayerPose::Rising(facing),
        (true, facing) => PlayerPose::Falling(facing),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyPose {
    /// Off phase of the end-of-freeze flashing
    Hidden,
    /// Frozen, collectable
    Coin,
    /// Grace period after entering or transforming
    Friendly(EnemyKind),
    Moving(EnemyKind, Facing),
}

pub fn enemy_pose(enemy: &Enemy) -> EnemyPose {
    match enemy.status {
        Status::Frozen { visible: false, .. } => EnemyPose::Hidden,
        Status::Frozen { .. } => EnemyPose::Coin,
        Status::Friendly { .. } => EnemyPose::Friendly(enemy.kind()),
        Status::Hostile => {
            let vx = enemy.body.vel.x;
            let facing = if vx > 0.0 {
                Facing::Right
            } else if vx < 0.0 {
                Facing::Left
            } else {
                Facing::Neutral
            };
            EnemyPose::Moving(enemy.kind(), facing)
        }
    }
}

/// Frame counter for a fixed-length sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SequenceClock {
    timer: f32,
    frame: u32,
    frames: u32,
}

impl SequenceClock {
    pub fn new(frames: u32) -> Self {
        Self {
            timer: 0.0,
            frame: 0,
            frames,
        }
    }

    pub fn dance() -> Self {
        Self::new(DANCE_FRAMES)
    }

    pub fn death() -> Self {
        Self::new(DEATH_FRAMES)
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn is_done(&self) -> bool {
        self.frame >= self.frames
    }

    /// Returns true once every frame has been shown
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.is_done() {
            return true;
        }
        self.timer += dt;
        if self.timer >= FRAME_TIME {
            self.timer = 0.0;
            self.frame += 1;
        }
        self.is_done()
    }
}
