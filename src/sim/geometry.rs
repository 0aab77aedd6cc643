//! Platform geometry
//!
//! Platforms are axis-aligned bars built once per level from the tile grid:
//! contiguous solid runs are merged along each row, then independently along
//! each column, and four border bars frame the play area. Nothing mutates a
//! platform after construction.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::layout::LevelLayout;
use crate::consts::*;

/// Axis-aligned rectangle, y grows downward
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Box of size `size` whose bottom edge is centred on `anchor`
    pub fn from_bottom_center(anchor: Vec2, size: Vec2) -> Self {
        Self::new(anchor.x - size.x / 2.0, anchor.y - size.y, size.x, size.y)
    }

    /// Box of size `size` centred on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(center.x - size.x / 2.0, center.y - size.y / 2.0, size.x, size.y)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.w, self.h)
    }

    /// Strict overlap: shared edges do not count, empty rects never overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.w > 0.0
            && self.h > 0.0
            && other.w > 0.0
            && other.h > 0.0
            && self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }
}

/// Rendering hint only; collision ignores it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// A bar inside the map
    #[default]
    Interior,
    /// Left border wall
    Left,
    /// Right border wall
    Right,
    /// Top or bottom border
    Edge,
}

impl Orientation {
    /// Numeric code used by the original art pipeline
    pub fn code(self) -> i8 {
        match self {
            Orientation::Interior => 0,
            Orientation::Left => -1,
            Orientation::Right => 1,
            Orientation::Edge => 2,
        }
    }
}

/// A single immutable platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    rect: Rect,
    pub orientation: Orientation,
}

impl Platform {
    pub fn new(rect: Rect, orientation: Orientation) -> Self {
        Self { rect, orientation }
    }

    pub fn get_rect(&self) -> Rect {
        self.rect
    }
}

/// All platforms of the current level.
///
/// Order: merged row runs, merged column runs, then top, bottom, left and
/// right borders. The bottom border is the designated ground.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformSet {
    platforms: Vec<Platform>,
    ground: usize,
}

impl PlatformSet {
    /// Build from a level grid
    pub fn from_layout(layout: &LevelLayout) -> Self {
        let mut interior = Vec::new();

        // Row runs
        for row in 0..layout.row_count() {
            let mut run: Option<(usize, usize)> = None;
            for col in 0..=layout.col_count() {
                if layout.is_solid(row, col) {
                    run = Some(match run {
                        Some((start, len)) => (start, len + 1),
                        None => (col, 1),
                    });
                } else if let Some((start, len)) = run.take() {
                    interior.push(row_bar(row, start, len));
                }
            }
        }

        // Column runs; single cells are already covered by their row bar
        for col in 0..layout.col_count() {
            let mut run: Option<(usize, usize)> = None;
            for row in 0..=layout.row_count() {
                if layout.is_solid(row, col) {
                    run = Some(match run {
                        Some((start, len)) => (start, len + 1),
                        None => (row, 1),
                    });
                } else if let Some((start, len)) = run.take() {
                    if len >= 2 {
                        interior.push(column_bar(col, start, len));
                    }
                }
            }
        }

        let set = Self::with_borders(interior);
        log::debug!(
            "Built {} platforms for {}",
            set.len(),
            if layout.name.is_empty() { "<unnamed>" } else { &layout.name }
        );
        set
    }

    /// Interior platforms plus the four arena borders
    pub fn with_borders(mut platforms: Vec<Platform>) -> Self {
        let border_h = SCREEN_H - PLATFORM_SIZE;
        platforms.push(Platform::new(
            Rect::new(0.0, 0.0, SCREEN_W, PLATFORM_SIZE),
            Orientation::Edge,
        ));
        let ground = platforms.len();
        platforms.push(Platform::new(
            Rect::new(0.0, SCREEN_H - 2.0 * PLATFORM_SIZE, SCREEN_W, PLATFORM_SIZE),
            Orientation::Edge,
        ));
        platforms.push(Platform::new(
            Rect::new(0.0, 0.0, PLATFORM_SIZE, border_h),
            Orientation::Left,
        ));
        platforms.push(Platform::new(
            Rect::new(SCREEN_W - PLATFORM_SIZE, 0.0, PLATFORM_SIZE, border_h),
            Orientation::Right,
        ));
        Self { platforms, ground }
    }

    /// Exactly the given platforms, with `ground` as the designated ground
    pub fn from_platforms(platforms: Vec<Platform>, ground: usize) -> Self {
        Self { platforms, ground }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    pub fn as_slice(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn get(&self, index: usize) -> Option<&Platform> {
        self.platforms.get(index)
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Index of the ground platform that triggers mummy transformation
    pub fn ground_index(&self) -> usize {
        self.ground
    }
}

fn row_bar(row: usize, start: usize, len: usize) -> Platform {
    let origin = crate::cell_origin(row, start);
    Platform::new(
        Rect::new(origin.x, origin.y, len as f32 * TILE_W, PLATFORM_SIZE),
        Orientation::Interior,
    )
}

fn column_bar(col: usize, start: usize, len: usize) -> Platform {
    let origin = crate::cell_origin(start, col);
    Platform::new(
        Rect::new(
            origin.x,
            origin.y,
            PLATFORM_SIZE,
            (len - 1) as f32 * TILE_H + PLATFORM_SIZE,
        ),
        Orientation::Interior,
    )
}
