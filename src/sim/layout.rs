//! Level description grids
//!
//! A level is a character grid, one cell per tile. The same grid carries the
//! solid tiles, the enemy markers and the cherry tags; each consumer only
//! looks at the symbols it recognises and skips everything else.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Symbol marking a solid platform tile
pub const SOLID: char = '-';

/// Cherry tags: digits run in encounter order, their shifted counterparts
/// (same position on a US keyboard) run in reverse.
const CHERRY_TAGS: &str = "0123456789)!@#$%^&*(";

/// Static per-level description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub name: String,
    rows: Vec<Vec<char>>,
}

impl LevelLayout {
    /// Parse a grid. Cells may be whitespace separated (`- - 1`) or packed
    /// (`--1`); blank lines are ignored.
    pub fn parse(name: impl Into<String>, text: &str) -> Self {
        let rows = text
            .lines()
            .map(|line| {
                line.split_whitespace()
                    .flat_map(|token| token.chars())
                    .collect::<Vec<_>>()
            })
            .filter(|row| !row.is_empty())
            .collect();
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Read a level file from disk
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        let layout = Self::parse(path.display().to_string(), &text);
        if layout.is_empty() {
            return Err(LoadError::EmptyLevel {
                path: path.to_path_buf(),
            });
        }
        log::info!(
            "Loaded level {} ({}x{})",
            layout.name,
            layout.row_count(),
            layout.col_count()
        );
        Ok(layout)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<char> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn is_solid(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == Some(SOLID)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, &ch)| (r, c, ch)))
    }
}

/// Which enemy a chained marker turns its mummy into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SatelliteKind {
    Club,
    Ufo,
    Orb,
    Sphere,
}

/// Enemy markers recognised in a level grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyTag {
    /// Spawn point for every mummy that follows in scan order
    Origin,
    /// A bird, spawned in place and active from the start
    Bird,
    /// A mummy queued at the origin that transforms into the given kind
    Chained(SatelliteKind),
}

impl EnemyTag {
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            's' => Some(EnemyTag::Origin),
            'b' => Some(EnemyTag::Bird),
            'c' => Some(EnemyTag::Chained(SatelliteKind::Club)),
            'u' => Some(EnemyTag::Chained(SatelliteKind::Ufo)),
            'p' => Some(EnemyTag::Chained(SatelliteKind::Sphere)),
            'o' => Some(EnemyTag::Chained(SatelliteKind::Orb)),
            _ => None,
        }
    }
}

/// Cherry tag: bunch id plus traversal direction within the bunch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CherryTag {
    pub bunch: u8,
    /// Shifted symbol: this bunch is traversed in reverse encounter order
    pub reversed: bool,
}

impl CherryTag {
    pub fn from_symbol(c: char) -> Option<Self> {
        let index = CHERRY_TAGS.chars().position(|t| t == c)?;
        Some(Self {
            bunch: (index % 10) as u8,
            reversed: index > 9,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spaced_and_packed_rows() {
        let spaced = LevelLayout::parse("a", "- - .\n. 1 -\n");
        let packed = LevelLayout::parse("b", "--.\n.1-\n\n");
        assert_eq!(spaced.row_count(), 2);
        assert_eq!(spaced.col_count(), 3);
        for (r, c) in [(0, 0), (0, 1), (1, 2)] {
            assert!(spaced.is_solid(r, c));
            assert!(packed.is_solid(r, c));
        }
        assert_eq!(spaced.get(1, 1), Some('1'));
        assert_eq!(packed.get(5, 5), None);
    }

    #[test]
    fn test_enemy_tags() {
        assert_eq!(EnemyTag::from_symbol('s'), Some(EnemyTag::Origin));
        assert_eq!(EnemyTag::from_symbol('b'), Some(EnemyTag::Bird));
        assert_eq!(
            EnemyTag::from_symbol('p'),
            Some(EnemyTag::Chained(SatelliteKind::Sphere))
        );
        assert_eq!(
            EnemyTag::from_symbol('o'),
            Some(EnemyTag::Chained(SatelliteKind::Orb))
        );
        assert_eq!(EnemyTag::from_symbol('-'), None);
        assert_eq!(EnemyTag::from_symbol('x'), None);
    }

    #[test]
    fn test_cherry_tags() {
        assert_eq!(
            CherryTag::from_symbol('3'),
            Some(CherryTag { bunch: 3, reversed: false })
        );
        assert_eq!(
            CherryTag::from_symbol('#'),
            Some(CherryTag { bunch: 3, reversed: true })
        );
        assert_eq!(
            CherryTag::from_symbol(')'),
            Some(CherryTag { bunch: 0, reversed: true })
        );
        assert_eq!(CherryTag::from_symbol('-'), None);
        assert_eq!(CherryTag::from_symbol('s'), None);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let err = LevelLayout::load(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_load_empty_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"\n\n").unwrap();
        let err = LevelLayout::load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::EmptyLevel { .. }));
    }
}
