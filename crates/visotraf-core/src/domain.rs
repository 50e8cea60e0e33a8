use serde::{Deserialize, Serialize};
use std::fmt;

/// One leg of the four-way intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Fixed column order used everywhere counts are laid out.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::West => 3,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::North | Direction::South => Axis::NorthSouth,
            Direction::East | Direction::West => Axis::EastWest,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }

    /// Accepts full names and single-letter forms (`o` is west).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "north" | "n" => Some(Direction::North),
            "south" | "s" => Some(Direction::South),
            "east" | "e" => Some(Direction::East),
            "west" | "w" | "o" => Some(Direction::West),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A pair of opposing legs that move together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    NorthSouth,
    EastWest,
}

impl Axis {
    pub fn directions(self) -> [Direction; 2] {
        match self {
            Axis::NorthSouth => [Direction::North, Direction::South],
            Axis::EastWest => [Direction::East, Direction::West],
        }
    }

    pub fn opposing(self) -> Axis {
        match self {
            Axis::NorthSouth => Axis::EastWest,
            Axis::EastWest => Axis::NorthSouth,
        }
    }
}

/// Vehicles observed per direction during the latest detector interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountSnapshot {
    pub north: u32,
    pub south: u32,
    pub east: u32,
    pub west: u32,
}

impl CountSnapshot {
    pub fn new(north: u32, south: u32, east: u32, west: u32) -> Self {
        Self { north, south, east, west }
    }

    pub fn get(&self, dir: Direction) -> u32 {
        match dir {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }

    pub fn axis_total(&self, axis: Axis) -> u32 {
        axis.directions().iter().map(|d| self.get(*d)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, u32)> + '_ {
        Direction::ALL.into_iter().map(move |d| (d, self.get(d)))
    }
}

/// A timestamped snapshot, as handed to the count log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRecord {
    pub ts_us: i64,
    pub counts: CountSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalState {
    Green,
    Yellow,
    Red,
}

/// Logical signal heads driven by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalGroup {
    NsMain,
    NsTurn,
    EoMain,
    EoTurn,
}

impl SignalGroup {
    pub const ALL: [SignalGroup; 4] = [
        SignalGroup::NsMain,
        SignalGroup::NsTurn,
        SignalGroup::EoMain,
        SignalGroup::EoTurn,
    ];

    pub fn axis(self) -> Axis {
        match self {
            SignalGroup::NsMain | SignalGroup::NsTurn => Axis::NorthSouth,
            SignalGroup::EoMain | SignalGroup::EoTurn => Axis::EastWest,
        }
    }
}

/// State of every signal group during one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStates {
    pub ns_main: SignalState,
    pub ns_turn: SignalState,
    pub eo_main: SignalState,
    pub eo_turn: SignalState,
}

impl GroupStates {
    pub const ALL_RED: GroupStates = GroupStates {
        ns_main: SignalState::Red,
        ns_turn: SignalState::Red,
        eo_main: SignalState::Red,
        eo_turn: SignalState::Red,
    };

    /// Both groups of `axis` show `state`, the opposing axis is red.
    pub fn axis_only(axis: Axis, state: SignalState) -> Self {
        let mut out = Self::ALL_RED;
        match axis {
            Axis::NorthSouth => {
                out.ns_main = state;
                out.ns_turn = state;
            }
            Axis::EastWest => {
                out.eo_main = state;
                out.eo_turn = state;
            }
        }
        out
    }

    pub fn get(&self, group: SignalGroup) -> SignalState {
        match group {
            SignalGroup::NsMain => self.ns_main,
            SignalGroup::NsTurn => self.ns_turn,
            SignalGroup::EoMain => self.eo_main,
            SignalGroup::EoTurn => self.eo_turn,
        }
    }

    pub fn any_on_axis(&self, axis: Axis, state: SignalState) -> bool {
        SignalGroup::ALL
            .iter()
            .any(|g| g.axis() == axis && self.get(*g) == state)
    }

    pub fn any(&self, state: SignalState) -> bool {
        SignalGroup::ALL.iter().any(|g| self.get(*g) == state)
    }

    pub fn is_all_red(&self) -> bool {
        *self == Self::ALL_RED
    }
}
