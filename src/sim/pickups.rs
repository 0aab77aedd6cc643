//! Cherries and the power coin

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{self, VerticalResponse};
use super::geometry::{PlatformSet, Rect};
use super::layout::{CherryTag, LevelLayout};
use super::player::PLAYER_SIZE;
use crate::consts::*;

pub const CHERRY_RADIUS: f32 = ((TILE_W * SPRITE_FACTOR / 4.0) as i32) as f32;

/// Where a fresh power coin appears
pub const COIN_START: Vec2 = Vec2::new(TILE_W * (NCOLS as f32 - 3.0), 3.0 * TILE_H);
const COIN_VELOCITY: Vec2 = Vec2::new(100.0, 100.0);

/// A single cherry, centre anchored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cherry {
    pub pos: Vec2,
    pub bunch: u8,
    pub is_lit: bool,
    pub collide_radius: f32,
}

impl Cherry {
    pub fn new(row: usize, col: usize, bunch: u8) -> Self {
        Self {
            pos: crate::cell_origin(row, col) + Vec2::new(TILE_W, TILE_H) / 2.0,
            bunch,
            is_lit: false,
            collide_radius: CHERRY_RADIUS,
        }
    }
}

/// What eating one cherry produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eaten {
    pub points: u64,
    /// It was the lit cherry
    pub was_lit: bool,
    /// The eaten count reached the power coin threshold
    pub coin_ready: bool,
}

/// Cherries of a round, in lighting order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CherryGroup {
    cherries: Vec<Cherry>,
    /// Progress toward the next power coin
    pub num_eaten: u32,
    /// Lit cherries eaten this round
    pub lit_count: u32,
    pub has_lit: bool,
}

impl CherryGroup {
    pub fn from_layout(layout: &LevelLayout) -> Self {
        let mut group = Self::default();
        for (row, col, symbol) in layout.cells() {
            if let Some(tag) = CherryTag::from_symbol(symbol) {
                group.insert(Cherry::new(row, col, tag.bunch), tag.reversed);
            }
        }
        log::debug!("{} cherries", group.len());
        group
    }

    /// Plain tags go after every cherry of the same or lower bunch (encounter
    /// order); reversed tags go in front of their own bunch (reverse order).
    pub fn insert(&mut self, cherry: Cherry, reversed: bool) {
        let at = if reversed {
            self.cherries.iter().take_while(|c| c.bunch < cherry.bunch).count()
        } else {
            self.cherries.iter().take_while(|c| c.bunch <= cherry.bunch).count()
        };
        self.cherries.insert(at, cherry);
    }

    pub fn len(&self) -> usize {
        self.cherries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cherries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cherry> {
        self.cherries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Cherry> {
        self.cherries.get(index)
    }

    pub fn lit_index(&self) -> Option<usize> {
        self.cherries.iter().position(|c| c.is_lit)
    }

    /// Unlight whichever cherry is lit
    pub fn clear_lit(&mut self) {
        for cherry in &mut self.cherries {
            cherry.is_lit = false;
        }
        self.has_lit = false;
    }

    /// Move the light from `index` to the next cherry, wrapping around
    pub fn advance_lit(&mut self, index: usize) {
        if self.cherries.is_empty() {
            return;
        }
        if let Some(cherry) = self.cherries.get_mut(index) {
            cherry.is_lit = false;
        }
        let next = (index + 1) % self.cherries.len();
        self.cherries[next].is_lit = true;
        self.has_lit = true;
    }

    /// First cherry the player at `center` with `radius` touches
    pub fn touching(&self, center: Vec2, radius: f32) -> Option<usize> {
        self.cherries
            .iter()
            .position(|c| crate::circles_touch(center, radius, c.pos, c.collide_radius))
    }

    /// Eat the cherry at `index`. `counting` is false while the power is
    /// active or the coin is already out.
    pub fn eat(&mut self, index: usize, counting: bool) -> Option<(Cherry, Eaten)> {
        let cherry = *self.cherries.get(index)?;
        let mut points = CHERRY_POINTS;
        let mut increment = 0;

        if cherry.is_lit || !self.has_lit {
            if cherry.is_lit {
                points += LIT_CHERRY_BONUS;
                self.lit_count += 1;
                // Lit cherries count double
                increment += 1;
            }
            self.advance_lit(index);
        }
        if counting {
            increment += 1;
            self.num_eaten += increment;
        }

        self.cherries.remove(index);

        let coin_ready = self.num_eaten >= POWER_COIN_CHERRIES;
        if coin_ready {
            self.num_eaten = 0;
        }

        Some((
            cherry,
            Eaten {
                points,
                was_lit: cherry.is_lit,
                coin_ready,
            },
        ))
    }
}

/// The power coin. Keeps bouncing around the arena whether shown or not,
/// and times the power-up once collected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerCoin {
    /// Centre anchor
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub collide_radius: f32,
    pub visible: bool,
    /// Time the power-up has been active
    pub timer: f32,
}

impl Default for PowerCoin {
    fn default() -> Self {
        Self {
            pos: COIN_START,
            vel: COIN_VELOCITY,
            size: PLAYER_SIZE,
            collide_radius: PLAYER_SIZE.x.min(PLAYER_SIZE.y) / 2.0,
            visible: false,
            timer: 0.0,
        }
    }
}

impl PowerCoin {
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.pos, self.size)
    }

    /// Hide and move to `pos`
    pub fn hide_at(&mut self, pos: Vec2) {
        self.visible = false;
        self.pos = pos;
    }

    /// Advance the power timer, then bounce. Returns the new powered state.
    pub fn update(&mut self, dt: f32, powered_up: bool, platforms: &PlatformSet) -> bool {
        let powered_up = self.update_power(dt, powered_up);

        let contact = collision::move_against(
            self.bounds(),
            self.vel * dt,
            platforms.as_slice(),
            VerticalResponse::Stop,
        );
        self.vel = collision::bounce(self.vel, &contact);
        self.pos += contact.delta;
        powered_up
    }

    fn update_power(&mut self, dt: f32, powered_up: bool) -> bool {
        if powered_up {
            self.timer += dt;
        }
        if self.timer >= FREEZE_TIME {
            self.timer = 0.0;
            log::debug!("Power up expired");
            return false;
        }
        powered_up
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn group(text: &str) -> CherryGroup {
        CherryGroup::from_layout(&LevelLayout::parse("c", text))
    }

    fn bunches(g: &CherryGroup) -> Vec<(u8, f32)> {
        g.iter().map(|c| (c.bunch, c.pos.x)).collect()
    }

    #[test]
    fn test_plain_and_reversed_bunches() {
        // Row: 1 3 ! #  (columns 0..3)
        let g = group("1 3 ! #");
        let x = |col: f32| col * TILE_W + TILE_W / 2.0;
        assert_eq!(
            bunches(&g),
            vec![(1, x(2.0)), (1, x(0.0)), (3, x(3.0)), (3, x(1.0))]
        );
    }

    #[test]
    fn test_plain_bunch_keeps_encounter_order() {
        let g = group("2 2 2\n1 . .");
        let cols: Vec<f32> = g.iter().map(|c| c.pos.x).collect();
        let x = |col: f32| col * TILE_W + TILE_W / 2.0;
        assert_eq!(cols, vec![x(0.0), x(0.0), x(1.0), x(2.0)]);
        assert_eq!(g.get(0).unwrap().bunch, 1);
    }

    #[test]
    fn test_reversed_bunch_runs_backwards() {
        let g = group("@ @ @");
        let cols: Vec<f32> = g.iter().map(|c| c.pos.x).collect();
        let x = |col: f32| col * TILE_W + TILE_W / 2.0;
        assert_eq!(cols, vec![x(2.0), x(1.0), x(0.0)]);
    }

    #[test]
    fn test_first_cherry_lights_the_next() {
        let mut g = group("0 0 0");
        let (_, eaten) = g.eat(0, true).unwrap();
        assert_eq!(eaten.points, CHERRY_POINTS);
        assert!(!eaten.was_lit);
        assert_eq!(g.lit_index(), Some(0));
        assert!(g.has_lit);
        assert_eq!(g.num_eaten, 1);
    }

    #[test]
    fn test_lit_cherry_scores_double_and_counts_twice() {
        let mut g = group("0 0 0");
        g.eat(0, true);
        let (_, eaten) = g.eat(0, true).unwrap();
        assert_eq!(eaten.points, CHERRY_POINTS + LIT_CHERRY_BONUS);
        assert!(eaten.was_lit);
        assert_eq!(g.lit_count, 1);
        assert_eq!(g.num_eaten, 3);
        assert_eq!(g.lit_index(), Some(0));
    }

    #[test]
    fn test_not_counting_while_powered() {
        let mut g = group("0 0 0");
        g.eat(0, false);
        assert_eq!(g.num_eaten, 0);
    }

    #[test]
    fn test_coin_ready_after_twenty() {
        let mut g = group(&"0 ".repeat(25));
        // Eat from the back so the light never gets hit
        let mut ready_at = None;
        for n in 1..=21 {
            let last = g.len() - 1;
            let (_, eaten) = g.eat(last, true).unwrap();
            if eaten.coin_ready {
                ready_at = Some(n);
                break;
            }
        }
        assert_eq!(ready_at, Some(20));
        assert_eq!(g.num_eaten, 0);
    }

    #[test]
    fn test_clear_lit() {
        let mut g = group("0 0 0");
        g.eat(1, true);
        assert!(g.lit_index().is_some());
        g.clear_lit();
        assert_eq!(g.lit_index(), None);
        assert!(!g.has_lit);
    }

    #[test]
    fn test_coin_bounces_off_borders() {
        let arena = PlatformSet::with_borders(Vec::new());
        let mut coin = PowerCoin::default();
        for _ in 0..3000 {
            coin.update(1.0 / 30.0, false, &arena);
            let b = coin.bounds();
            assert!(b.left() >= PLATFORM_SIZE);
            assert!(b.right() <= SCREEN_W - PLATFORM_SIZE);
            assert!(b.top() >= PLATFORM_SIZE);
        }
        assert_eq!(coin.vel.abs(), COIN_VELOCITY);
    }

    #[test]
    fn test_power_expires() {
        let arena = PlatformSet::with_borders(Vec::new());
        let mut coin = PowerCoin::default();
        let mut powered = true;
        let mut ticks = 0;
        while powered {
            powered = coin.update(0.1, powered, &arena);
            ticks += 1;
        }
        assert!((59..=61).contains(&ticks));
        assert_eq!(coin.timer, 0.0);
    }

    proptest! {
        #[test]
        fn prop_eating_lit_advances_one(n in 2usize..12, pick in 0usize..12) {
            let mut g = group(&"5 ".repeat(n + 1));
            // Light something first
            g.eat(0, true);
            let lit = g.lit_index().unwrap();
            let len = g.len();
            let target = pick % len;
            let before: Vec<Vec2> = g.iter().map(|c| c.pos).collect();

            g.eat(target, true);
            if target == lit {
                // The cherry after the eaten one is now lit
                let expected = before[(lit + 1) % len];
                prop_assert_eq!(g.get(g.lit_index().unwrap()).unwrap().pos, expected);
            } else {
                // Pointer unchanged
                prop_assert_eq!(g.get(g.lit_index().unwrap()).unwrap().pos, before[lit]);
            }
        }
    }
}
