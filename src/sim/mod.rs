//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, every timer is an accumulator fed by `dt`
//! - Stable iteration order (roster and level scan order)
//! - No rendering, audio or file access

pub mod collision;
pub mod enemy;
pub mod geometry;
pub mod layout;
pub mod pickups;
pub mod player;
pub mod pose;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Contact, VerticalHit, VerticalResponse, apply_gravity, move_against};
pub use enemy::{Enemy, EnemyKind, Status};
pub use geometry::{Orientation, Platform, PlatformSet, Rect};
pub use layout::{CherryTag, EnemyTag, LevelLayout, SatelliteKind};
pub use pickups::{Cherry, CherryGroup, PowerCoin};
pub use player::{Controls, Facing, Player};
pub use pose::{EnemyPose, PlayerPose, SequenceClock, enemy_pose, player_pose};
pub use spawner::EnemyGroup;
pub use state::{GameEvent, GamePhase, GameState, Session};
pub use tick::{TickInput, tick};
