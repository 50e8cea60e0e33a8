//! Input validation layer for detector counts.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::domain::{CountSnapshot, Direction};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing count for direction {0}")]
    MissingDirection(Direction),
    #[error("negative count {value} for direction {direction}")]
    NegativeCount { direction: Direction, value: i64 },
    #[error("count {value} for direction {direction} does not fit in u32")]
    CountOverflow { direction: Direction, value: i64 },
    #[error("unknown direction name {0:?}")]
    UnknownDirection(String),
    #[error("direction {0} given more than once")]
    DuplicateDirection(Direction),
}

fn check_count(direction: Direction, value: i64) -> Result<u32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeCount { direction, value });
    }
    u32::try_from(value).map_err(|_| ValidationError::CountOverflow { direction, value })
}

/// Validate raw detector counts before they reach the history.
///
/// All four directions must be present and non-negative; nothing is
/// returned unless every entry passes.
pub fn validate_counts(raw: &HashMap<Direction, i64>) -> Result<CountSnapshot, ValidationError> {
    let mut out = [0u32; 4];
    for dir in Direction::ALL {
        let value = raw
            .get(&dir)
            .copied()
            .ok_or(ValidationError::MissingDirection(dir))?;
        out[dir.index()] = check_count(dir, value)?;
    }
    Ok(CountSnapshot::new(out[0], out[1], out[2], out[3]))
}

/// Same as [`validate_counts`], keyed by direction name (`north`, `n`, ...).
pub fn parse_named_counts(raw: &BTreeMap<String, i64>) -> Result<CountSnapshot, ValidationError> {
    let mut by_dir = HashMap::with_capacity(4);
    for (name, value) in raw {
        let dir = Direction::from_name(name)
            .ok_or_else(|| ValidationError::UnknownDirection(name.clone()))?;
        if by_dir.insert(dir, *value).is_some() {
            return Err(ValidationError::DuplicateDirection(dir));
        }
    }
    validate_counts(&by_dir)
}
