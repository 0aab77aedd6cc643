//! Actor physics shared by the player, the enemies and the power coin
//!
//! Collisions are resolved per axis: the horizontally shifted box and the
//! vertically shifted box are tested against every platform independently.
//! There is no swept 2D test, so a very fast actor can clip a corner
//! diagonally; tile-scale velocities never get there.

use glam::Vec2;

use super::geometry::{Platform, Rect};
use crate::consts::*;

/// How a vertical overlap is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalResponse {
    /// Cancel the vertical displacement
    Stop,
    /// Move flush against the platform edge facing the actor
    Snap { rising: bool },
}

/// Platform edge the actor ended up flush against
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerticalHit {
    /// Standing on a platform whose top edge is at this y
    Floor(f32),
    /// Head against a platform whose bottom edge is at this y
    Ceiling(f32),
}

/// Result of resolving one tick of displacement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Displacement after resolution
    pub delta: Vec2,
    pub blocked_x: bool,
    pub blocked_y: bool,
    /// Set when the vertical response snapped to an edge
    pub vertical: Option<VerticalHit>,
}

impl Contact {
    /// New bottom-centre anchor for an actor of the given height
    pub fn apply_to_bottom_anchor(&self, anchor: Vec2, height: f32) -> Vec2 {
        let x = anchor.x + self.delta.x;
        let y = match self.vertical {
            Some(VerticalHit::Floor(top)) => top,
            Some(VerticalHit::Ceiling(bottom)) => bottom + height,
            None => anchor.y + self.delta.y,
        };
        Vec2::new(x, y)
    }
}

/// Add one tick of gravity to a vertical velocity, clamped to terminal speed
#[inline]
pub fn apply_gravity(vy: f32, dt: f32) -> f32 {
    (vy + GRAVITY * dt).min(MAX_FALL)
}

/// Resolve a proposed displacement of `bounds` against `platforms`
pub fn move_against(
    bounds: Rect,
    delta: Vec2,
    platforms: &[Platform],
    response: VerticalResponse,
) -> Contact {
    let mut contact = Contact {
        delta,
        blocked_x: false,
        blocked_y: false,
        vertical: None,
    };

    for platform in platforms {
        let rect = platform.get_rect();

        if rect.overlaps(&bounds.translated(Vec2::new(contact.delta.x, 0.0))) {
            contact.delta.x = 0.0;
            contact.blocked_x = true;
        }

        if rect.overlaps(&bounds.translated(Vec2::new(0.0, contact.delta.y))) {
            contact.blocked_y = true;
            match response {
                VerticalResponse::Stop => contact.delta.y = 0.0,
                VerticalResponse::Snap { rising: true } => {
                    contact.delta.y = rect.bottom() - bounds.top();
                    contact.vertical = Some(VerticalHit::Ceiling(rect.bottom()));
                }
                VerticalResponse::Snap { rising: false } => {
                    contact.delta.y = rect.top() - bounds.bottom();
                    contact.vertical = Some(VerticalHit::Floor(rect.top()));
                }
            }
        }
    }

    contact
}

/// Index of the first platform overlapping `bounds`
pub fn first_overlap(bounds: Rect, platforms: &[Platform]) -> Option<usize> {
    platforms.iter().position(|p| p.get_rect().overlaps(&bounds))
}

/// Invert the velocity components whose axis was blocked
#[inline]
pub fn bounce(velocity: Vec2, contact: &Contact) -> Vec2 {
    Vec2::new(
        if contact.blocked_x { -velocity.x } else { velocity.x },
        if contact.blocked_y { -velocity.y } else { velocity.y },
    )
}
