//! Enemy roster and respawn scheduling
//!
//! Every enemy of a round lives in one roster. The active set and the
//! pending queue hold roster indices, and the mummy -> satellite chain is an
//! index link in both directions, so rebuilding a chain never touches
//! ownership.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyKind, Status};
use super::geometry::PlatformSet;
use super::layout::{EnemyTag, LevelLayout, SOLID};
use crate::consts::*;

/// Bottom-centre spawn point of a grid cell
pub fn cell_spawn(row: usize, col: usize) -> Vec2 {
    Vec2::new(
        col as f32 * TILE_W + TILE_W / 2.0,
        (row + 1) as f32 * TILE_H,
    )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyGroup {
    roster: Vec<Enemy>,
    /// Roster indices of enemies being simulated, oldest first
    active: Vec<usize>,
    /// Roster indices waiting to enter, in order
    pending: VecDeque<usize>,
    respawn_timer: f32,
}

impl Default for EnemyGroup {
    fn default() -> Self {
        Self {
            roster: Vec::new(),
            active: Vec::new(),
            pending: VecDeque::new(),
            // The first pending enemy enters on the first tick
            respawn_timer: RESPAWN_TIME,
        }
    }
}

impl EnemyGroup {
    /// Scan the level in row-major order. `s` moves the mummy origin, `b`
    /// places an active bird, chained markers queue a mummy at the current
    /// origin.
    pub fn from_layout(layout: &LevelLayout) -> Self {
        let mut group = Self::default();
        let mut origin = cell_spawn(0, 0);

        for (row, col, symbol) in layout.cells() {
            match EnemyTag::from_symbol(symbol) {
                Some(EnemyTag::Origin) => origin = cell_spawn(row, col),
                Some(EnemyTag::Bird) => {
                    let index = group.roster.len();
                    group.roster.push(Enemy::bird(cell_spawn(row, col)));
                    group.active.push(index);
                }
                Some(EnemyTag::Chained(kind)) => {
                    let mummy = group.roster.len();
                    let satellite = mummy + 1;
                    group.roster.push(Enemy::mummy(origin, Some(satellite)));
                    group.roster.push(Enemy::satellite(kind, mummy));
                    group.pending.push_back(mummy);
                }
                None if symbol != SOLID => {
                    log::trace!("Skipping symbol {:?} at ({}, {})", symbol, row, col);
                }
                None => {}
            }
        }

        log::debug!(
            "Enemy roster: {} active, {} pending",
            group.active.len(),
            group.pending.len()
        );
        group
    }

    pub fn roster(&self) -> &[Enemy] {
        &self.roster
    }

    pub fn get(&self, index: usize) -> Option<&Enemy> {
        self.roster.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Enemy> {
        self.roster.get_mut(index)
    }

    /// Roster indices of the active enemies
    pub fn active_indices(&self) -> &[usize] {
        &self.active
    }

    pub fn active(&self) -> impl Iterator<Item = &Enemy> {
        self.active.iter().filter_map(|&i| self.roster.get(i))
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// No active enemies
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Respawn scheduling, then every active enemy
    pub fn update(&mut self, dt: f32, target: Vec2, platforms: &PlatformSet) {
        self.update_respawn(dt);
        let roster = &mut self.roster;
        for &i in &self.active {
            if let Some(enemy) = roster.get_mut(i) {
                enemy.update(dt, target, platforms);
            }
        }
    }

    /// Let the next pending enemy in once the interval has elapsed. Paused
    /// while the oldest active enemy is frozen.
    pub fn update_respawn(&mut self, dt: f32) {
        if self
            .active
            .first()
            .and_then(|&i| self.roster.get(i))
            .is_some_and(Enemy::is_frozen)
        {
            return;
        }
        if self.pending.is_empty() {
            return;
        }
        self.respawn_timer += dt;
        if self.respawn_timer >= RESPAWN_TIME {
            if let Some(index) = self.pending.pop_front() {
                if let Some(enemy) = self.roster.get_mut(index) {
                    enemy.status = Status::friendly();
                    log::debug!("{:?} entered at {}", enemy.kind(), enemy.pos());
                }
                self.active.push(index);
            }
            self.respawn_timer = 0.0;
        }
    }

    /// Turn every active enemy into a coin
    pub fn freeze(&mut self) {
        for &i in &self.active {
            if let Some(enemy) = self.roster.get_mut(i) {
                enemy.freeze();
            }
        }
    }

    /// Queue a defeated enemy again, rebuilt at its spawn point. A satellite
    /// is replaced by a fresh copy of the mummy it came from.
    pub fn respawn(&mut self, index: usize) {
        let Some(enemy) = self.roster.get_mut(index) else {
            return;
        };
        enemy.status = Status::Hostile;
        let queued = match enemy.origin {
            Some(mummy) => mummy,
            None => index,
        };
        if let Some(enemy) = self.roster.get_mut(queued) {
            enemy.reset();
        }
        self.pending.push_back(queued);
    }

    /// Remove an active enemy the player collected and queue it again
    pub fn capture(&mut self, index: usize) {
        if let Some(slot) = self.active.iter().position(|&i| i == index) {
            self.active.remove(slot);
            self.respawn(index);
        }
    }

    /// Replace every active mummy standing on the ground with its satellite.
    /// Returns how many transformed.
    pub fn transform_grounded(&mut self, ground: usize, target: Vec2) -> usize {
        let mut count = 0;
        for slot in 0..self.active.len() {
            let index = self.active[slot];
            let Some(mummy) = self.roster.get(index) else {
                continue;
            };
            if mummy.kind() != EnemyKind::Mummy || mummy.platform() != Some(ground) {
                continue;
            }
            let Some(next) = mummy.next() else {
                continue;
            };
            let pos = mummy.pos();
            if let Some(satellite) = self.roster.get_mut(next) {
                satellite.emerge(pos, target);
                log::debug!("Mummy {} became {:?} at {}", index, satellite.kind(), pos);
                self.active[slot] = next;
                count += 1;
            }
        }
        count
    }

    /// Drop everything active and pending
    pub fn clear(&mut self) {
        self.active.clear();
        self.pending.clear();
        self.respawn_timer = RESPAWN_TIME;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::Behavior;
    use crate::sim::geometry::{Orientation, Platform, Rect};
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 30.0;

    #[test]
    fn test_scan_builds_roster() {
        let layout = LevelLayout::parse("l", ". b . s\n- - c u\n. x . b");
        let group = EnemyGroup::from_layout(&layout);

        // Two birds active from the start
        assert_eq!(group.active_indices().len(), 2);
        assert!(group.active().all(|e| e.kind() == EnemyKind::Bird));
        assert_eq!(group.get(0).unwrap().pos(), cell_spawn(0, 1));

        // Two mummies queued at the origin, each linked to its satellite
        assert_eq!(group.pending_len(), 2);
        let mummy = group.get(1).unwrap();
        assert_eq!(mummy.kind(), EnemyKind::Mummy);
        assert_eq!(mummy.pos(), cell_spawn(0, 3));
        assert_eq!(mummy.next(), Some(2));
        let club = group.get(2).unwrap();
        assert_eq!(club.kind(), EnemyKind::Club);
        assert_eq!(club.origin, Some(1));
        assert_eq!(group.get(4).unwrap().kind(), EnemyKind::Ufo);
    }

    #[test]
    fn test_origin_defaults_to_first_cell() {
        let group = EnemyGroup::from_layout(&LevelLayout::parse("l", "o . s"));
        assert_eq!(group.get(0).unwrap().pos(), cell_spawn(0, 0));
    }

    #[test]
    fn test_first_pending_enters_immediately_as_friendly() {
        let mut group = EnemyGroup::from_layout(&LevelLayout::parse("l", "s c o"));
        group.update_respawn(DT);
        assert_eq!(group.active_indices(), &[0]);
        assert!(group.get(0).unwrap().is_friendly());
        assert_eq!(group.pending_len(), 1);

        group.update_respawn(DT);
        assert_eq!(group.active_indices().len(), 1);
    }

    #[test]
    fn test_respawn_paused_while_oldest_is_frozen() {
        let layout = LevelLayout::parse("l", ". . . .\n. . b .\n. s c .");
        let mut group = EnemyGroup::from_layout(&layout);
        group.freeze();
        for _ in 0..600 {
            group.update_respawn(DT);
        }
        assert_eq!(group.pending_len(), 1);

        // The bird thaws after the freeze, then the queue moves again
        let arena = PlatformSet::with_borders(Vec::new());
        let ticks = ((FREEZE_TIME + 1.0) / DT).round() as usize;
        for _ in 0..ticks {
            group.update(DT, Vec2::new(300.0, 300.0), &arena);
        }
        assert!(!group.get(0).unwrap().is_frozen());
        assert_eq!(group.pending_len(), 0);
        assert_eq!(group.active_indices(), &[0, 1]);
    }

    fn mummy_laps(enemy: &Enemy) -> Option<u32> {
        match enemy.behavior {
            Behavior::Mummy(patrol) => Some(patrol.laps),
            _ => None,
        }
    }

    #[test]
    fn test_mummy_on_a_ledge_reaches_the_ground() {
        let layout = LevelLayout::parse(
            "ledge",
            ". . . s c . . .\n. . . . . . . .\n. . - - - . . .",
        );
        let plats = PlatformSet::from_layout(&layout);
        let mut group = EnemyGroup::from_layout(&layout);
        let target = Vec2::new(300.0, 300.0);

        let mut stood_on_ledge = false;
        let mut transformed = 0;
        for _ in 0..(30.0 / DT) as usize {
            group.update(DT, target, &plats);
            if let Some(mummy) = group.get(0) {
                stood_on_ledge |= mummy.platform() == Some(0);
                assert!(mummy_laps(mummy).unwrap() <= MUMMY_LAPS);
            }
            transformed += group.transform_grounded(plats.ground_index(), target);
            if transformed > 0 {
                break;
            }
        }
        assert!(stood_on_ledge);
        assert_eq!(transformed, 1);
        assert_eq!(group.active_indices(), &[1]);
        let club = group.get(1).unwrap();
        assert_eq!(club.kind(), EnemyKind::Club);
        assert_eq!(club.pos().y, plats.get(plats.ground_index()).unwrap().get_rect().top());
    }

    #[test]
    fn test_sample_level_mummies_all_transform() {
        let layout = LevelLayout::parse("level0", include_str!("../../levels/level0.txt"));
        let plats = PlatformSet::from_layout(&layout);
        let mut group = EnemyGroup::from_layout(&layout);
        let mummies = group.pending_len();
        assert_eq!(mummies, 4);
        let target = Vec2::new(225.0, 270.0);

        let mut transformed = 0;
        for _ in 0..(120.0 / DT) as usize {
            group.update(DT, target, &plats);
            for enemy in group.active() {
                if let Some(laps) = mummy_laps(enemy) {
                    assert!(laps <= MUMMY_LAPS);
                }
            }
            transformed += group.transform_grounded(plats.ground_index(), target);
        }
        assert_eq!(transformed, mummies);
        assert!(group.active().all(|e| e.kind() != EnemyKind::Mummy));
    }

    #[test]
    fn test_capture_satellite_requeues_its_mummy() {
        let mut group = EnemyGroup::from_layout(&LevelLayout::parse("l", "s p"));
        group.update_respawn(DT);
        let ground = Platform::new(Rect::new(0.0, 200.0, 400.0, 18.0), Orientation::Edge);
        let plats = PlatformSet::from_platforms(vec![ground], 0);

        // Drop onto the ground and transform
        for _ in 0..120 {
            group.update(DT, Vec2::ZERO, &plats);
            if group.transform_grounded(plats.ground_index(), Vec2::ZERO) > 0 {
                break;
            }
        }
        assert_eq!(group.active_indices(), &[1]);
        let sphere = group.get(1).unwrap();
        assert_eq!(sphere.kind(), EnemyKind::Sphere);
        assert!(sphere.is_friendly());
        assert_eq!(sphere.pos().y, 200.0);

        group.freeze();
        group.capture(1);
        assert!(group.is_empty());
        assert_eq!(group.pending_len(), 1);
        let mummy = group.get(0).unwrap();
        assert_eq!(mummy.pos(), cell_spawn(0, 0));
        assert!(matches!(
            mummy.behavior,
            Behavior::Mummy(patrol) if patrol.platform.is_none() && patrol.next == Some(1)
        ));
        assert!(!group.get(1).unwrap().is_frozen());
    }

    #[test]
    fn test_capture_bird_rebuilds_at_spawn() {
        let mut group = EnemyGroup::from_layout(&LevelLayout::parse("l", ". b"));
        group.get_mut(0).unwrap().body.pos = Vec2::new(300.0, 300.0);
        group.freeze();
        group.capture(0);
        assert_eq!(group.pending_len(), 1);
        assert_eq!(group.get(0).unwrap().pos(), cell_spawn(0, 1));
        assert_eq!(group.get(0).unwrap().status, Status::Hostile);
    }

    #[test]
    fn test_satellite_kinds_follow_markers() {
        let group = EnemyGroup::from_layout(&LevelLayout::parse("l", "c u o p"));
        let kinds: Vec<_> = group
            .roster()
            .iter()
            .filter(|e| e.origin.is_some())
            .map(Enemy::kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EnemyKind::Club,
                EnemyKind::Ufo,
                EnemyKind::Orb,
                EnemyKind::Sphere,
            ]
        );
    }

    #[test]
    fn test_clear() {
        let mut group = EnemyGroup::from_layout(&LevelLayout::parse("l", "b s c"));
        group.clear();
        assert!(group.is_empty());
        assert_eq!(group.pending_len(), 0);
    }

    proptest! {
        #[test]
        fn prop_all_pending_active_after_n_intervals(n in 1usize..6) {
            let text = "s ".to_string() + &"c ".repeat(n);
            let mut group = EnemyGroup::from_layout(&LevelLayout::parse("l", &text));
            prop_assert_eq!(group.pending_len(), n);
            let ticks = (n as f32 * RESPAWN_TIME / DT).round() as usize;
            for _ in 0..ticks {
                group.update_respawn(DT);
            }
            prop_assert_eq!(group.pending_len(), 0);
            prop_assert_eq!(group.active_indices().len(), n);
        }
    }
}
