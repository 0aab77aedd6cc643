//! Startup load errors
//!
//! Anything that can go wrong before the first tick. Ticks themselves never fail.

use std::fmt;
use std::path::PathBuf;

/// Failure loading a level, the high score, or the settings file
#[derive(Debug)]
pub enum LoadError {
    /// File could not be read or written
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Level file contained no cells
    EmptyLevel { path: PathBuf },
    /// High score file did not start with a number
    BadHighScore { path: PathBuf, text: String },
    /// Settings file was not valid JSON for `Settings`
    Settings {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            LoadError::EmptyLevel { path } => write!(f, "{}: level has no cells", path.display()),
            LoadError::BadHighScore { path, text } => {
                write!(f, "{}: not a high score: {:?}", path.display(), text)
            }
            LoadError::Settings { path, source } => {
                write!(f, "{}: bad settings: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Settings { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_names_path() {
        let err = LoadError::EmptyLevel {
            path: PathBuf::from("levels/level3.txt"),
        };
        assert!(err.to_string().contains("levels/level3.txt"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_io_error_has_source() {
        let err = LoadError::io(
            "highscore.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("highscore.txt"));
    }
}
