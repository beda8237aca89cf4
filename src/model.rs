use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Grid cell addressed by (row, col). Identity is the coordinate itself.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn neighbor(self, dir: Direction) -> Cell {
        let (dr, dc) = dir.offset();
        Cell::new(self.row + dr, self.col + dc)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Wall-mask bit assignment used by the simulation service:
/// bit0 (1) = left, bit1 (2) = down, bit2 (4) = right, bit3 (8) = up.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Left,
    Down,
    Right,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Down,
        Direction::Right,
        Direction::Up,
    ];

    pub fn bit(self) -> u8 {
        match self {
            Direction::Left => 1,
            Direction::Down => 2,
            Direction::Right => 4,
            Direction::Up => 8,
        }
    }

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Left => (0, -1),
            Direction::Down => (1, 0),
            Direction::Right => (0, 1),
            Direction::Up => (-1, 0),
        }
    }
}

/// Unordered pair of cells sharing a boundary. The constructor stores the
/// lexicographically smaller cell first so the same physical wall produces
/// the same key no matter which side reported it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Edge {
    a: Cell,
    b: Cell,
}

impl Edge {
    pub fn new(a: Cell, b: Cell) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    pub fn a(&self) -> Cell {
        self.a
    }

    pub fn b(&self) -> Cell {
        self.b
    }

    /// Cells one step apart on exactly one axis.
    pub fn is_adjacent(&self) -> bool {
        let dr = (self.a.row - self.b.row).abs();
        let dc = (self.a.col - self.b.col).abs();
        dr + dc == 1
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WallState {
    Okay,
    Damaged,
    Destroyed,
}

impl WallState {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "okay" => Some(WallState::Okay),
            "damaged" => Some(WallState::Damaged),
            "destroyed" => Some(WallState::Destroyed),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DoorState {
    Closed,
    Open,
    Removed,
}

impl DoorState {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "closed" => Some(DoorState::Closed),
            "open" => Some(DoorState::Open),
            // Older captures say "removed", newer feeds say "broken".
            "removed" | "broken" => Some(DoorState::Removed),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PoiKind {
    Fake,
    Real,
}

impl PoiKind {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            3 => Some(PoiKind::Fake),
            4 => Some(PoiKind::Real),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ThreatKind {
    Droplets,
    Hazard,
}

impl ThreatKind {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ThreatKind::Droplets),
            2 => Some(ThreatKind::Hazard),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum AgentKind {
    Worker,
    Scavenger,
}

impl AgentKind {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            6 => Some(AgentKind::Worker),
            7 => Some(AgentKind::Scavenger),
            _ => None,
        }
    }
}

/// Agent identity. The grid feed carries no ids, so identity degrades to
/// the occupied cell plus kind; two same-kind agents swapping cells between
/// frames read as a remove+add pair under `Anon` keys.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum AgentKey {
    Id(u64),
    Anon(Cell, AgentKind),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AgentState {
    pub cell: Cell,
    pub kind: AgentKind,
    pub carrying: bool,
}

/// Scalar per-step counters. Rescued/lost only grow and the collapsed flag
/// is one-way; violations are flagged by the diff engine, not corrected.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct FrameSummary {
    pub rescued: u32,
    pub lost: u32,
    pub collapsed: bool,
}

/// Full decoded state of one simulation step. Built once by the codec,
/// never mutated; the next step's topology supersedes it as diff baseline.
#[derive(Clone, Debug, Default)]
pub struct Topology {
    pub walls: BTreeMap<Edge, WallState>,
    pub doors: BTreeMap<Edge, DoorState>,
    pub pois: BTreeMap<Cell, PoiKind>,
    pub threats: BTreeMap<Cell, ThreatKind>,
    pub agents: BTreeMap<AgentKey, AgentState>,
    pub entry_points: BTreeSet<Cell>,
    pub nests: BTreeSet<Cell>,
    pub summary: FrameSummary,
}
