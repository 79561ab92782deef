//! Window placement for opening a counterpart buffer.

use std::fmt;
use std::str::FromStr;

use crate::error::MappingError;

/// Where the counterpart window is split off, relative to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPlacement {
    Top,
    Left,
    Right,
    Bottom,
    /// Replace the current window's buffer.
    No,
}

impl SplitPlacement {
    /// Mirror image, used when going from a test back to its source.
    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::No => Self::No,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Left => "left",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::No => "no",
        }
    }

    /// Vim command modifier placing the new window.
    pub fn vim_modifier(self) -> &'static str {
        match self {
            Self::Top => "lefta",
            Self::Left => "vert lefta",
            Self::Right => "vert rightb",
            Self::Bottom => "rightb",
            Self::No => "",
        }
    }
}

impl fmt::Display for SplitPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitPlacement {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Self::Top),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "bottom" => Ok(Self::Bottom),
            "no" => Ok(Self::No),
            other => Err(MappingError::UnknownSplit(other.to_string())),
        }
    }
}

/// Vim ex command opening `path` with `placement`.
///
/// An already loaded buffer is reused with `sbuffer` instead of `split`.
pub fn vim_open_command(path: &str, placement: SplitPlacement, buffer_exists: bool) -> String {
    match placement {
        SplitPlacement::No => format!("edit {path}"),
        _ if buffer_exists => format!("{} sbuffer {path}", placement.vim_modifier()),
        _ => format!("{} split {path}", placement.vim_modifier()),
    }
}
