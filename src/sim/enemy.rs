//! Enemy behaviours
//!
//! Every kind shares one status machine, `Hostile -> Frozen -> Friendly ->
//! Hostile`, which runs before any kind-specific motion. Motion only happens
//! while hostile.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{self, VerticalResponse};
use super::geometry::{PlatformSet, Rect};
use super::layout::SatelliteKind;
use crate::consts::*;

/// Enemy box size
pub const ENEMY_SIZE: Vec2 = Vec2::new(
    TILE_W * SPRITE_FACTOR / 2.0,
    TILE_H * SPRITE_FACTOR / 2.0 - 1.0,
);
pub const ENEMY_RADIUS: f32 = TILE_W / 2.0;

pub const DEFAULT_SPEED: f32 = 100.0;
pub const MUMMY_SPEED: f32 = 50.0;
pub const SWEEP_SPEED: f32 = 150.0;

const CLUB_PERIOD: f32 = 0.5;
const BIRD_PERIOD: f32 = 1.0;
const ORB_PERIOD: f32 = 1.0;
const SPHERE_PERIOD: f32 = 2.0 / 30.0;
/// Offset (pixels) that yields a full-speed proportional correction
const SWEEP_FALLOFF: f32 = 200.0;
/// Slack used when deciding a mummy has walked off its platform
const EDGE_MARGIN: f32 = 1.0;

/// Enemy kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Mummy,
    Club,
    Bird,
    Ufo,
    Orb,
    Sphere,
}

impl From<SatelliteKind> for EnemyKind {
    fn from(kind: SatelliteKind) -> Self {
        match kind {
            SatelliteKind::Club => EnemyKind::Club,
            SatelliteKind::Ufo => EnemyKind::Ufo,
            SatelliteKind::Orb => EnemyKind::Orb,
            SatelliteKind::Sphere => EnemyKind::Sphere,
        }
    }
}

/// Shared freeze/friendly state machine
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Status {
    /// Moving and dangerous
    #[default]
    Hostile,
    /// Shown as a coin that the player can collect
    Frozen {
        timer: f32,
        flash_timer: f32,
        flash_time: f32,
        visible: bool,
    },
    /// Harmless grace period
    Friendly { timer: f32 },
}

impl Status {
    pub fn frozen() -> Self {
        Status::Frozen {
            timer: 0.0,
            flash_timer: 0.0,
            flash_time: FLASH_TIME,
            visible: true,
        }
    }

    pub fn friendly() -> Self {
        Status::Friendly { timer: 0.0 }
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self, Status::Frozen { .. })
    }

    pub fn is_friendly(&self) -> bool {
        matches!(self, Status::Friendly { .. })
    }

    pub fn is_hostile(&self) -> bool {
        matches!(self, Status::Hostile)
    }

    pub fn visible(&self) -> bool {
        match self {
            Status::Frozen { visible, .. } => *visible,
            _ => true,
        }
    }

    /// Advance the timers. Returns true if the enemy was hostile this tick
    /// and should run its motion.
    pub fn advance(&mut self, dt: f32) -> bool {
        match self {
            Status::Hostile => true,
            Status::Frozen {
                timer,
                flash_timer,
                flash_time,
                visible,
            } => {
                *timer += dt;
                if FREEZE_TIME - *timer <= NUM_FLASHES * FLASH_TIME {
                    *flash_timer += dt;
                }
                if *flash_timer >= *flash_time {
                    *visible = !*visible;
                    *flash_timer = 0.0;
                    *flash_time /= FLASH_ACCEL;
                }
                if *timer >= FREEZE_TIME {
                    *self = Status::friendly();
                }
                false
            }
            Status::Friendly { timer } => {
                *timer += dt;
                if *timer >= SAFE_TIME {
                    *self = Status::Hostile;
                }
                false
            }
        }
    }
}

/// Position and motion shared by all kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Bottom-centre anchor
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Kind speed; for the UFO, the distance to the player at the last retarget
    pub speed: f32,
}

impl Body {
    fn new(pos: Vec2, speed: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size: ENEMY_SIZE,
            speed,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_bottom_center(self.pos, self.size)
    }

    /// Move by `vel * dt`, stopping on blocked axes
    fn step(&mut self, dt: f32, platforms: &PlatformSet) -> collision::Contact {
        let contact = collision::move_against(
            self.bounds(),
            self.vel * dt,
            platforms.as_slice(),
            VerticalResponse::Stop,
        );
        self.pos += contact.delta;
        contact
    }
}

/// Mummy: walks laps along one platform, then drops off the edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patrol {
    /// Platform it last stood on. While falling this is the one it left,
    /// which it may not land on again.
    pub platform: Option<usize>,
    pub falling: bool,
    /// Turns made on the current platform, saturating at `MUMMY_LAPS`
    pub laps: u32,
    pub direction: f32,
    /// Roster index of the enemy it turns into on the ground
    pub next: Option<usize>,
}

/// Club, Bird: periodic retarget timer
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pursuit {
    pub timer: f32,
}

/// Orb, Sphere: constant sweep plus a proportional pull toward the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sweep {
    pub timer: f32,
    pub direction: f32,
}

impl Default for Sweep {
    fn default() -> Self {
        Self {
            timer: 0.0,
            direction: 1.0,
        }
    }
}

/// Per-kind motion state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    Mummy(Patrol),
    Club(Pursuit),
    Bird(Pursuit),
    Ufo,
    Orb(Sweep),
    Sphere(Sweep),
}

/// A single enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub body: Body,
    pub collide_radius: f32,
    pub status: Status,
    /// Where a rebuilt copy starts
    pub spawn: Vec2,
    /// Roster index of the mummy this satellite emerged from
    pub origin: Option<usize>,
    pub behavior: Behavior,
}

impl Enemy {
    fn with(kind: EnemyKind, spawn: Vec2, next: Option<usize>, origin: Option<usize>) -> Self {
        let (speed, behavior) = match kind {
            EnemyKind::Mummy => (
                MUMMY_SPEED,
                Behavior::Mummy(Patrol {
                    platform: None,
                    falling: true,
                    laps: 0,
                    direction: 1.0,
                    next,
                }),
            ),
            EnemyKind::Club => (DEFAULT_SPEED, Behavior::Club(Pursuit::default())),
            EnemyKind::Bird => (DEFAULT_SPEED, Behavior::Bird(Pursuit::default())),
            EnemyKind::Ufo => (DEFAULT_SPEED, Behavior::Ufo),
            EnemyKind::Orb => (SWEEP_SPEED, Behavior::Orb(Sweep::default())),
            EnemyKind::Sphere => (SWEEP_SPEED, Behavior::Sphere(Sweep::default())),
        };
        Self {
            body: Body::new(spawn, speed),
            collide_radius: ENEMY_RADIUS,
            status: Status::Hostile,
            spawn,
            origin,
            behavior,
        }
    }

    /// A mummy that falls from `spawn` and later turns into roster entry `next`
    pub fn mummy(spawn: Vec2, next: Option<usize>) -> Self {
        Self::with(EnemyKind::Mummy, spawn, next, None)
    }

    pub fn bird(spawn: Vec2) -> Self {
        Self::with(EnemyKind::Bird, spawn, None, None)
    }

    /// A dormant satellite belonging to the mummy at roster index `origin`
    pub fn satellite(kind: SatelliteKind, origin: usize) -> Self {
        Self::with(kind.into(), Vec2::ZERO, None, Some(origin))
    }

    pub fn kind(&self) -> EnemyKind {
        match self.behavior {
            Behavior::Mummy(_) => EnemyKind::Mummy,
            Behavior::Club(_) => EnemyKind::Club,
            Behavior::Bird(_) => EnemyKind::Bird,
            Behavior::Ufo => EnemyKind::Ufo,
            Behavior::Orb(_) => EnemyKind::Orb,
            Behavior::Sphere(_) => EnemyKind::Sphere,
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    pub fn bounds(&self) -> Rect {
        self.body.bounds()
    }

    /// Centre of the body, used for circle contact tests
    pub fn center(&self) -> Vec2 {
        self.body.pos - Vec2::new(0.0, self.body.size.y / 2.0)
    }

    pub fn is_frozen(&self) -> bool {
        self.status.is_frozen()
    }

    pub fn is_friendly(&self) -> bool {
        self.status.is_friendly()
    }

    pub fn visible(&self) -> bool {
        self.status.visible()
    }

    /// Mummy successor link
    pub fn next(&self) -> Option<usize> {
        match self.behavior {
            Behavior::Mummy(patrol) => patrol.next,
            _ => None,
        }
    }

    /// Platform a mummy is standing on; `None` while it falls
    pub fn platform(&self) -> Option<usize> {
        match self.behavior {
            Behavior::Mummy(patrol) if !patrol.falling => patrol.platform,
            _ => None,
        }
    }

    /// Turn into a coin (power-up collected)
    pub fn freeze(&mut self) {
        self.status = Status::frozen();
    }

    /// Rebuild at the spawn point with fresh motion state, keeping chain links
    pub fn reset(&mut self) {
        *self = Self::with(self.kind(), self.spawn, self.next(), self.origin);
    }

    /// Appear at `pos` as a friendly satellite, aiming relative to `target`
    pub fn emerge(&mut self, pos: Vec2, target: Vec2) {
        *self = Self::with(self.kind(), pos, None, self.origin);
        self.status = Status::friendly();
        if let Behavior::Ufo = self.behavior {
            retarget_away(&mut self.body, Vec2::ONE, target);
        }
    }

    /// Advance one tick. `target` is the player's anchor.
    pub fn update(&mut self, dt: f32, target: Vec2, platforms: &PlatformSet) {
        if !self.status.advance(dt) {
            return;
        }
        let body = &mut self.body;
        match &mut self.behavior {
            Behavior::Mummy(patrol) => walk_patrol(body, patrol, dt, platforms),
            Behavior::Club(pursuit) => home_in(body, pursuit, dt, target, platforms),
            Behavior::Bird(pursuit) => stalk(body, pursuit, dt, target, platforms),
            Behavior::Ufo => evade(body, dt, target, platforms),
            Behavior::Orb(sweep) => sweep_horizontal(body, sweep, dt, target, platforms),
            Behavior::Sphere(sweep) => sweep_vertical(body, sweep, dt, target, platforms),
        }
    }
}

fn walk_patrol(body: &mut Body, patrol: &mut Patrol, dt: f32, platforms: &PlatformSet) {
    if !patrol.falling {
        let current = patrol
            .platform
            .and_then(|i| platforms.get(i))
            .map(|p| p.get_rect());
        match current {
            Some(r) => {
                let half_w = body.size.x / 2.0;
                let next_x = body.pos.x + body.vel.x * dt;
                if patrol.laps < MUMMY_LAPS {
                    if next_x - half_w < r.left() || next_x + half_w > r.right() {
                        turn(body, patrol);
                    }
                } else if off_edge(next_x, &r) {
                    patrol.falling = true;
                    log::trace!("Mummy dropped off platform {:?}", patrol.platform);
                }
            }
            None => patrol.falling = true,
        }
    }

    if patrol.falling {
        fall(body, patrol, dt, platforms);
    } else {
        walk(body, patrol, dt, platforms);
    }
}

fn walk(body: &mut Body, patrol: &mut Patrol, dt: f32, platforms: &PlatformSet) {
    let bounds = body.bounds();
    let mut dx = body.vel.x * dt;
    if collision::first_overlap(bounds.translated(Vec2::new(dx, 0.0)), platforms.as_slice())
        .is_some()
    {
        turn(body, patrol);
        dx = body.vel.x * dt;
        // A reversal can point straight into another wall
        if collision::first_overlap(bounds.translated(Vec2::new(dx, 0.0)), platforms.as_slice())
            .is_some()
        {
            dx = 0.0;
        }
    }
    body.pos.x += dx;
}

/// Drop straight down until landing on a platform other than the one left
fn fall(body: &mut Body, patrol: &mut Patrol, dt: f32, platforms: &PlatformSet) {
    body.vel.x = 0.0;
    body.vel.y = collision::apply_gravity(body.vel.y, dt);
    let dy = body.vel.y * dt;
    let bounds = body.bounds();
    let moved = bounds.translated(Vec2::new(0.0, dy));

    let landing = platforms.iter().enumerate().find(|(i, platform)| {
        let r = platform.get_rect();
        patrol.platform != Some(*i)
            && body.vel.y >= 0.0
            && bounds.bottom() <= r.top()
            && r.overlaps(&moved)
    });

    match landing {
        Some((i, platform)) => {
            let r = platform.get_rect();
            let inset = (body.size.x / 2.0).min(r.w / 2.0);
            body.pos.x = body.pos.x.clamp(r.left() + inset, r.right() - inset);
            body.pos.y = r.top();
            body.vel = Vec2::new(body.speed, 0.0);
            patrol.direction = 1.0;
            patrol.laps = 0;
            patrol.platform = Some(i);
            patrol.falling = false;
            log::trace!("Mummy landed on platform {}", i);
        }
        None => body.pos.y += dy,
    }
}

fn off_edge(x: f32, r: &Rect) -> bool {
    x - EDGE_MARGIN > r.right() || x + EDGE_MARGIN < r.left()
}

fn turn(body: &mut Body, patrol: &mut Patrol) {
    body.vel.x = -body.vel.x;
    patrol.direction = -patrol.direction;
    patrol.laps = (patrol.laps + 1).min(MUMMY_LAPS);
}

fn home_in(body: &mut Body, pursuit: &mut Pursuit, dt: f32, target: Vec2, platforms: &PlatformSet) {
    pursuit.timer += dt;
    if pursuit.timer > CLUB_PERIOD {
        body.vel = crate::direction_to(body.pos, target) * body.speed;
        pursuit.timer = 0.0;
    }
    let contact = body.step(dt, platforms);
    if contact.blocked_x || contact.blocked_y {
        body.vel = collision::bounce(body.vel, &contact);
        pursuit.timer = 0.0;
    }
}

fn stalk(body: &mut Body, pursuit: &mut Pursuit, dt: f32, target: Vec2, platforms: &PlatformSet) {
    pursuit.timer += dt;
    if pursuit.timer >= BIRD_PERIOD {
        body.vel = Vec2::ZERO;
        if pursuit.timer >= 1.5 * BIRD_PERIOD {
            // One axis at a time; a diagonal chase would be faster than `speed`
            let diff = target - body.pos;
            if diff.x.abs() > diff.y.abs() {
                body.vel.x = body.speed * diff.x.signum();
            } else if diff.y != 0.0 {
                body.vel.y = body.speed * diff.y.signum();
            }
            pursuit.timer = 0.0;
        }
    }
    body.step(dt, platforms);
}

/// Aim away from `target` on the first axis whose hint points toward it.
/// A zero hint component leaves that axis alone.
fn retarget_away(body: &mut Body, hint: Vec2, target: Vec2) {
    let mut diff = target - body.pos;
    if hint.x * diff.x > 0.0 {
        diff.x = -diff.x;
    } else if hint.y * diff.y > 0.0 {
        diff.y = -diff.y;
    }
    body.speed = diff.length();
    // speed * diff / dist, with a coincident target giving zero
    body.vel = diff.normalize_or_zero() * body.speed;
}

fn evade(body: &mut Body, dt: f32, target: Vec2, platforms: &PlatformSet) {
    let delta = body.vel * dt;
    let bounds = body.bounds();
    for platform in platforms.iter() {
        let r = platform.get_rect();
        if r.overlaps(&bounds.translated(Vec2::new(delta.x, 0.0))) {
            retarget_away(body, Vec2::new(delta.x, 0.0), target);
        } else if r.overlaps(&bounds.translated(Vec2::new(0.0, delta.y))) {
            retarget_away(body, Vec2::new(0.0, delta.y), target);
        }
    }
    body.step(dt, platforms);
}

fn sweep_horizontal(
    body: &mut Body,
    sweep: &mut Sweep,
    dt: f32,
    target: Vec2,
    platforms: &PlatformSet,
) {
    sweep.timer += dt;
    if sweep.timer >= ORB_PERIOD {
        body.vel.x = body.speed * sweep.direction;
        body.vel.y = body.speed * (target.y - body.pos.y) / SWEEP_FALLOFF;
        sweep.timer = 0.0;
    }
    let contact = body.step(dt, platforms);
    if contact.blocked_x {
        sweep.direction = -sweep.direction;
        body.vel.x = -body.vel.x;
    }
    if contact.blocked_y {
        body.vel.y = -body.vel.y;
        sweep.timer = 0.0;
    }
}

fn sweep_vertical(
    body: &mut Body,
    sweep: &mut Sweep,
    dt: f32,
    target: Vec2,
    platforms: &PlatformSet,
) {
    sweep.timer += dt;
    if sweep.timer >= SPHERE_PERIOD {
        body.vel.x = body.speed * (target.x - body.pos.x) / SWEEP_FALLOFF;
        body.vel.y = body.speed * sweep.direction;
        sweep.timer = 0.0;
    }
    let contact = body.step(dt, platforms);
    if contact.blocked_x {
        body.vel.x = -body.vel.x;
        sweep.timer = 0.0;
    }
    if contact.blocked_y {
        sweep.direction = -sweep.direction;
        body.vel.y = -body.vel.y;
        sweep.timer = 0.0;
    }
}
