//! Player controller
//!
//! Normal -> Jumping -> (Gliding) -> Normal, plus Dancing (round won) and
//! Dying (life lost). While dancing or dying the physics is suspended until
//! the driver reports the sequence finished.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{self, VerticalHit, VerticalResponse};
use super::geometry::{Platform, Rect};
use crate::consts::*;

/// Player box size
pub const PLAYER_SIZE: Vec2 = Vec2::new(TILE_W * SPRITE_FACTOR / 2.0, TILE_H * SPRITE_FACTOR / 2.0);

/// Held directional inputs for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Facing used for animation only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Neutral,
    Right,
}

/// The player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Bottom-centre anchor
    pub pos: Vec2,
    /// `x` is this tick's walking velocity, `y` the vertical velocity
    pub vel: Vec2,
    pub size: Vec2,
    pub collide_radius: f32,
    pub facing: Facing,
    /// Airborne; the jump action becomes a glide
    pub jumped: bool,
    pub gliding: bool,
    pub glide_timer: f32,
    pub dancing: bool,
    pub dying: bool,
    pub powered_up: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size: PLAYER_SIZE,
            collide_radius: PLAYER_SIZE.x.min(PLAYER_SIZE.y) / 2.0,
            facing: Facing::Neutral,
            jumped: true,
            gliding: false,
            glide_timer: 0.0,
            dancing: false,
            dying: false,
            powered_up: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_bottom_center(self.pos, self.size)
    }

    /// Centre of the body, used for circle contact tests
    pub fn center(&self) -> Vec2 {
        self.pos - Vec2::new(0.0, self.size.y / 2.0)
    }

    /// Circle contact with something centred at `pos`
    pub fn touches(&self, pos: Vec2, radius: f32) -> bool {
        crate::circles_touch(self.center(), self.collide_radius, pos, radius)
    }

    /// Physics is suspended while a win or loss sequence plays
    pub fn is_suspended(&self) -> bool {
        self.dancing || self.dying
    }

    /// Place at the start of a round
    pub fn respawn_at(&mut self, pos: Vec2) {
        let powered_up = self.powered_up;
        *self = Self::new(pos);
        self.powered_up = powered_up;
    }

    pub fn start_dancing(&mut self) {
        self.dying = false;
        self.dancing = true;
        self.gliding = false;
    }

    pub fn start_dying(&mut self) {
        self.dancing = false;
        self.dying = true;
        self.gliding = false;
    }

    /// Jump action. Grounded: jump and earn points. Airborne: start gliding.
    pub fn jump(&mut self) -> u64 {
        if self.is_suspended() {
            return 0;
        }
        if self.jumped {
            self.gliding = true;
            0
        } else {
            self.vel.y = JUMP_VELOCITY;
            self.jumped = true;
            JUMP_POINTS
        }
    }

    /// Advance one tick. Returns points earned by hitting a platform from below.
    pub fn update(&mut self, controls: &Controls, dt: f32, platforms: &[Platform]) -> u64 {
        if self.is_suspended() {
            return 0;
        }

        if controls.up && self.jumped && self.vel.y < 0.0 && self.vel.y > -2.0 * MAX_FALL {
            self.vel.y -= 2.0 * GRAVITY * dt;
        }

        let mut dx = 0.0;
        if controls.left {
            self.facing = Facing::Left;
            dx -= PLAYER_SPEED * dt;
        }
        if controls.right {
            self.facing = Facing::Right;
            dx += PLAYER_SPEED * dt;
        }
        if dx == 0.0 {
            self.facing = Facing::Neutral;
        }
        self.vel.x = if dt > 0.0 { dx / dt } else { 0.0 };

        // Fast-fall cancel
        if controls.down && self.jumped && self.vel.y < 0.0 {
            self.vel.y = 0.0;
        }

        self.vel.y = collision::apply_gravity(self.vel.y, dt);
        // Airborne until a floor says otherwise
        self.jumped = true;

        if self.gliding {
            self.glide_timer += dt;
            if self.glide_timer <= GLIDE_TIME {
                self.vel.y = GLIDE_VELOCITY;
            } else {
                self.gliding = false;
                self.glide_timer = 0.0;
            }
        }

        let delta = Vec2::new(dx, self.vel.y * dt);
        let contact = collision::move_against(
            self.bounds(),
            delta,
            platforms,
            VerticalResponse::Snap {
                rising: self.vel.y < 0.0,
            },
        );

        let mut points = 0;
        match contact.vertical {
            Some(VerticalHit::Ceiling(_)) => {
                self.vel.y = 0.0;
                points = CEILING_POINTS;
            }
            Some(VerticalHit::Floor(_)) => {
                self.vel.y = 0.0;
                self.jumped = false;
            }
            None => {}
        }
        self.pos = contact.apply_to_bottom_anchor(self.pos, self.size.y);
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::Orientation;

    const DT: f32 = 1.0 / 30.0;

    fn slab(y: f32) -> Vec<Platform> {
        vec![Platform::new(
            Rect::new(0.0, y, 400.0, 20.0),
            Orientation::Interior,
        )]
    }

    fn grounded_on(platforms: &[Platform]) -> Player {
        let mut p = Player::new(Vec2::new(100.0, platforms[0].get_rect().top()));
        p.update(&Controls::default(), DT, platforms);
        assert!(!p.jumped);
        p
    }

    #[test]
    fn test_lands_on_floor() {
        let floor = slab(100.0);
        let mut p = Player::new(Vec2::new(100.0, 95.0));
        p.vel.y = 200.0;
        let points = p.update(&Controls::default(), DT, &floor);
        assert_eq!(points, 0);
        assert_eq!(p.pos.y, 100.0);
        assert_eq!(p.vel.y, 0.0);
        assert!(!p.jumped);
    }

    #[test]
    fn test_head_hit_scores_and_snaps() {
        let ceiling = slab(100.0);
        let dt = 0.001;
        let mut p = Player::new(Vec2::new(100.0, 120.0005 + PLAYER_SIZE.y));
        p.vel.y = -1.0;
        let points = p.update(&Controls::default(), dt, &ceiling);
        assert_eq!(points, CEILING_POINTS);
        assert_eq!(p.vel.y, 0.0);
        assert_eq!(p.pos.y, 120.0 + PLAYER_SIZE.y);
        // Still airborne after a ceiling hit
        assert!(p.jumped);
    }

    #[test]
    fn test_jump_only_when_grounded_then_glide() {
        let floor = slab(300.0);
        let mut p = grounded_on(&floor);

        assert_eq!(p.jump(), JUMP_POINTS);
        assert!(p.jumped);
        assert_eq!(p.vel.y, JUMP_VELOCITY);
        p.update(&Controls::default(), DT, &floor);
        assert!(p.pos.y < 300.0);

        // Second press while airborne glides instead
        assert_eq!(p.jump(), 0);
        assert!(p.gliding);
        p.update(&Controls::default(), DT, &floor);
        assert_eq!(p.vel.y, GLIDE_VELOCITY);

        // Glide ends after its duration
        for _ in 0..12 {
            p.update(&Controls::default(), DT, &floor);
        }
        assert!(!p.gliding);
        assert_eq!(p.glide_timer, 0.0);
    }

    #[test]
    fn test_up_accelerates_ascent() {
        let floor = slab(500.0);
        let mut held = grounded_on(&floor);
        let mut free = held.clone();
        held.jump();
        free.jump();
        let up = Controls {
            up: true,
            ..Default::default()
        };
        held.update(&up, DT, &floor);
        free.update(&Controls::default(), DT, &floor);
        assert!(held.vel.y < free.vel.y);
    }

    #[test]
    fn test_down_cancels_ascent_only() {
        let floor = slab(500.0);
        let down = Controls {
            down: true,
            ..Default::default()
        };

        let mut p = Player::new(Vec2::new(100.0, 200.0));
        p.vel.y = -150.0;
        p.update(&down, DT, &floor);
        // Cancelled, then one tick of gravity
        assert!((p.vel.y - GRAVITY * DT).abs() < 1e-3);

        // Falling speed is untouched
        let mut q = Player::new(Vec2::new(100.0, 200.0));
        q.vel.y = 300.0;
        q.update(&down, DT, &floor);
        assert!((q.vel.y - (300.0 + GRAVITY * DT)).abs() < 1e-3);
    }

    #[test]
    fn test_facing_follows_input() {
        let floor = slab(300.0);
        let mut p = grounded_on(&floor);
        let x0 = p.pos.x;
        p.update(
            &Controls {
                left: true,
                ..Default::default()
            },
            DT,
            &floor,
        );
        assert_eq!(p.facing, Facing::Left);
        assert!(p.pos.x < x0);
        p.update(&Controls::default(), DT, &floor);
        assert_eq!(p.facing, Facing::Neutral);
        assert_eq!(p.vel.x, 0.0);
    }

    #[test]
    fn test_suspended_while_dancing() {
        let floor = slab(300.0);
        let mut p = Player::new(Vec2::new(100.0, 100.0));
        p.start_dancing();
        let before = p.pos;
        assert_eq!(p.update(&Controls::default(), DT, &floor), 0);
        assert_eq!(p.pos, before);
        assert_eq!(p.jump(), 0);
        p.start_dying();
        assert!(p.dying && !p.dancing);
    }
}
