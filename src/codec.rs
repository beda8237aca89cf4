use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::config::AxisConvention;
use crate::model::{
    AgentKey, AgentKind, AgentState, Cell, Direction, DoorState, Edge, FrameSummary, PoiKind,
    ThreatKind, Topology, WallState,
};

/// Numeric grid as it arrives on the wire. The service serializes numpy
/// matrices, so cells may come through as floats; rows or cells may be null
/// in partial frames.
pub type RawGrid = Vec<Option<Vec<Option<f64>>>>;

/// One step record as reported by the simulation service. Field names vary
/// less than shapes do: walls arrive either as a bitmask grid or as an
/// edge-keyed state map depending on feed version, agents either as a code
/// grid or as an id'd info list.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct RawStep {
    #[serde(default)]
    pub walls: Option<RawGrid>,
    #[serde(default)]
    pub wall_states: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub door_states: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub doors_entries: Option<RawGrid>,
    #[serde(default)]
    pub poi: Option<RawGrid>,
    #[serde(default)]
    pub threat_markers: Option<RawGrid>,
    #[serde(default)]
    pub agents: Option<RawGrid>,
    #[serde(default)]
    pub agent_info: Option<Vec<RawAgent>>,
    #[serde(default)]
    pub saved_victims: u32,
    #[serde(default)]
    pub lost_victims: u32,
    #[serde(default)]
    pub collapsed_building: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RawAgent {
    pub id: u64,
    pub row: i32,
    pub col: i32,
    pub kind: i64,
    #[serde(default)]
    pub carrying: bool,
}

/// Rejects the whole frame; the sequencer treats this like a failed fetch.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum DecodeError {
    #[error("step record has no wall data (neither `walls` grid nor `wall_states` map)")]
    MissingWalls,
    #[error("`walls` grid is present but empty")]
    EmptyWalls,
}

/// Recoverable, single-entry decode problems. The offending entry is
/// skipped and the rest of the frame decodes normally.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum DecodeWarning {
    #[error("malformed edge key {key:?} in `{map}`")]
    MalformedEdgeKey { map: &'static str, key: String },
    #[error("unknown state {value:?} for edge {key:?} in `{map}`")]
    UnknownEdgeState { map: &'static str, key: String, value: String },
    #[error("edge {edge} in `{map}` joins non-adjacent cells")]
    NonAdjacentEdge { map: &'static str, edge: Edge },
    #[error("unknown code {code} at {cell} in `{grid}` grid")]
    UnknownCode { grid: &'static str, cell: Cell, code: i64 },
    #[error("non-integer value at {cell} in `{grid}` grid")]
    NonIntegerCell { grid: &'static str, cell: Cell },
    #[error("mask {value} at {cell} in `{grid}` grid outside 0-15")]
    MaskOutOfRange { grid: &'static str, cell: Cell, value: i64 },
    #[error("null row {row} in `{grid}` grid skipped")]
    NullRow { grid: &'static str, row: usize },
    #[error("edge {edge} reported as both wall and door; door kept")]
    DoorOverridesWall { edge: Edge },
    #[error("duplicate agent id {id}; later entry kept")]
    DuplicateAgentId { id: u64 },
}

#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub topology: Topology,
    pub warnings: Vec<DecodeWarning>,
}

/// Decode one raw step record into an immutable Topology.
pub fn decode_step(raw: &RawStep, axis: AxisConvention) -> Result<DecodedFrame, DecodeError> {
    if raw.walls.is_none() && raw.wall_states.is_none() {
        return Err(DecodeError::MissingWalls);
    }
    if let Some(grid) = &raw.walls {
        if grid.is_empty() && raw.wall_states.is_none() {
            return Err(DecodeError::EmptyWalls);
        }
    }

    let mut topo = Topology::default();
    let mut warnings = Vec::new();

    if let Some(grid) = &raw.walls {
        decode_wall_grid(grid, &mut topo.walls, &mut warnings);
    }
    if let Some(map) = &raw.wall_states {
        decode_wall_states(map, axis, &mut topo.walls, &mut warnings);
    }
    if let Some(map) = &raw.door_states {
        decode_door_states(map, axis, &mut topo.doors, &mut warnings);
    }
    if let Some(grid) = &raw.doors_entries {
        // When an edge-keyed door map is present it is authoritative; the
        // grid then only contributes entry-point markers (value >= 16).
        decode_doors_entries(grid, raw.door_states.is_none(), &mut topo, &mut warnings);
    }

    // A boundary reported as both wall and door keeps the door state only.
    let overlapping: Vec<Edge> = topo
        .walls
        .keys()
        .filter(|e| topo.doors.contains_key(e))
        .copied()
        .collect();
    for edge in overlapping {
        topo.walls.remove(&edge);
        warnings.push(DecodeWarning::DoorOverridesWall { edge });
    }

    if let Some(grid) = &raw.poi {
        decode_cell_grid(grid, "poi", &mut warnings, |cell, code| {
            PoiKind::from_code(code).map(|kind| {
                topo.pois.insert(cell, kind);
            })
        });
    }
    if let Some(grid) = &raw.threat_markers {
        decode_cell_grid(grid, "threat_markers", &mut warnings, |cell, code| {
            ThreatKind::from_code(code).map(|kind| {
                topo.threats.insert(cell, kind);
            })
        });
    }

    if let Some(list) = &raw.agent_info {
        decode_agent_info(list, &mut topo.agents, &mut warnings);
    } else if let Some(grid) = &raw.agents {
        decode_cell_grid(grid, "agents", &mut warnings, |cell, code| {
            AgentKind::from_code(code).map(|kind| {
                topo.agents.insert(
                    AgentKey::Anon(cell, kind),
                    AgentState { cell, kind, carrying: false },
                );
            })
        });
    }

    topo.summary = FrameSummary {
        rescued: raw.saved_victims,
        lost: raw.lost_victims,
        collapsed: raw.collapsed_building,
    };

    Ok(DecodedFrame { topology: topo, warnings })
}

/// Parse an edge key of the form `"((a, b), (c, d))"` into a canonical
/// Edge. Returns None on malformed keys (wrong token count, non-integer
/// tokens); the caller records the warning.
pub fn parse_edge_key(key: &str, axis: AxisConvention) -> Option<Edge> {
    let cleaned: String = key
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | ' '))
        .collect();
    let parts: Vec<&str> = cleaned.split(',').collect();
    if parts.len() != 4 {
        return None;
    }
    let mut nums = [0i32; 4];
    for (i, p) in parts.iter().enumerate() {
        nums[i] = p.trim().parse::<i32>().ok()?;
    }
    let (c1, c2) = match axis {
        AxisConvention::RowMajor => (
            Cell::new(nums[0], nums[1]),
            Cell::new(nums[2], nums[3]),
        ),
        AxisConvention::Swapped => (
            Cell::new(nums[1], nums[0]),
            Cell::new(nums[3], nums[2]),
        ),
    };
    Some(Edge::new(c1, c2))
}

/// Re-encode a wall set back into per-cell direction masks. Used to check
/// the bitmask decode round-trips; handy for debugging captures too.
pub fn encode_wall_mask(walls: &BTreeMap<Edge, WallState>, cell: Cell) -> u8 {
    let mut mask = 0u8;
    for dir in Direction::ALL {
        let edge = Edge::new(cell, cell.neighbor(dir));
        if walls.contains_key(&edge) {
            mask |= dir.bit();
        }
    }
    mask
}

fn grid_dims(grid: &RawGrid) -> (i32, i32) {
    let rows = grid.len() as i32;
    let cols = grid
        .iter()
        .flatten()
        .map(|r| r.len())
        .max()
        .unwrap_or(0) as i32;
    (rows, cols)
}

fn decode_wall_grid(
    grid: &RawGrid,
    walls: &mut BTreeMap<Edge, WallState>,
    warnings: &mut Vec<DecodeWarning>,
) {
    let (rows, cols) = grid_dims(grid);
    for (r, row) in grid.iter().enumerate() {
        let Some(row) = row else {
            warnings.push(DecodeWarning::NullRow { grid: "walls", row: r });
            continue;
        };
        for (c, value) in row.iter().enumerate() {
            let Some(v) = value else { continue };
            let cell = Cell::new(r as i32, c as i32);
            let Some(mut mask) = int_code(*v) else {
                warnings.push(DecodeWarning::NonIntegerCell { grid: "walls", cell });
                continue;
            };
            if !(0..=15).contains(&mask) {
                warnings.push(DecodeWarning::MaskOutOfRange { grid: "walls", cell, value: mask });
                if mask < 0 {
                    continue;
                }
                mask &= 15;
            }
            for dir in Direction::ALL {
                if mask & dir.bit() as i64 == 0 {
                    continue;
                }
                let other = cell.neighbor(dir);
                // Perimeter bits point outside the grid; both cells of an
                // interior wall report it, canonical Edge dedupes them.
                if other.row < 0 || other.row >= rows || other.col < 0 || other.col >= cols {
                    continue;
                }
                walls.entry(Edge::new(cell, other)).or_insert(WallState::Okay);
            }
        }
    }
}

fn decode_wall_states(
    map: &BTreeMap<String, String>,
    axis: AxisConvention,
    walls: &mut BTreeMap<Edge, WallState>,
    warnings: &mut Vec<DecodeWarning>,
) {
    for (key, value) in map {
        let Some(edge) = parse_edge_key(key, axis) else {
            warnings.push(DecodeWarning::MalformedEdgeKey { map: "wall_states", key: key.clone() });
            continue;
        };
        if !edge.is_adjacent() {
            warnings.push(DecodeWarning::NonAdjacentEdge { map: "wall_states", edge });
        }
        let Some(state) = WallState::parse(value) else {
            warnings.push(DecodeWarning::UnknownEdgeState {
                map: "wall_states",
                key: key.clone(),
                value: value.clone(),
            });
            continue;
        };
        walls.insert(edge, state);
    }
}

fn decode_door_states(
    map: &BTreeMap<String, String>,
    axis: AxisConvention,
    doors: &mut BTreeMap<Edge, DoorState>,
    warnings: &mut Vec<DecodeWarning>,
) {
    for (key, value) in map {
        let Some(edge) = parse_edge_key(key, axis) else {
            warnings.push(DecodeWarning::MalformedEdgeKey { map: "door_states", key: key.clone() });
            continue;
        };
        if !edge.is_adjacent() {
            warnings.push(DecodeWarning::NonAdjacentEdge { map: "door_states", edge });
        }
        let Some(state) = DoorState::parse(value) else {
            warnings.push(DecodeWarning::UnknownEdgeState {
                map: "door_states",
                key: key.clone(),
                value: value.clone(),
            });
            continue;
        };
        doors.insert(edge, state);
    }
}

fn decode_doors_entries(
    grid: &RawGrid,
    decode_door_bits: bool,
    topo: &mut Topology,
    warnings: &mut Vec<DecodeWarning>,
) {
    let (rows, cols) = grid_dims(grid);
    for (r, row) in grid.iter().enumerate() {
        let Some(row) = row else {
            warnings.push(DecodeWarning::NullRow { grid: "doors_entries", row: r });
            continue;
        };
        for (c, value) in row.iter().enumerate() {
            let Some(v) = value else { continue };
            let cell = Cell::new(r as i32, c as i32);
            let Some(mask) = int_code(*v) else {
                warnings.push(DecodeWarning::NonIntegerCell { grid: "doors_entries", cell });
                continue;
            };
            // The service overlays entry points as 16 and the scavenger
            // nest as 32 on the door mask.
            if mask >= 32 {
                topo.nests.insert(cell);
            } else if mask >= 16 {
                topo.entry_points.insert(cell);
            }
            if !decode_door_bits {
                continue;
            }
            if mask < 0 {
                warnings.push(DecodeWarning::MaskOutOfRange {
                    grid: "doors_entries",
                    cell,
                    value: mask,
                });
                continue;
            }
            let mask = mask & 15;
            for dir in Direction::ALL {
                if mask & dir.bit() as i64 == 0 {
                    continue;
                }
                let other = cell.neighbor(dir);
                if other.row < 0 || other.row >= rows || other.col < 0 || other.col >= cols {
                    continue;
                }
                topo.doors
                    .entry(Edge::new(cell, other))
                    .or_insert(DoorState::Closed);
            }
        }
    }
}

fn decode_cell_grid<F>(
    grid: &RawGrid,
    name: &'static str,
    warnings: &mut Vec<DecodeWarning>,
    mut place: F,
) where
    F: FnMut(Cell, i64) -> Option<()>,
{
    for (r, row) in grid.iter().enumerate() {
        let Some(row) = row else {
            warnings.push(DecodeWarning::NullRow { grid: name, row: r });
            continue;
        };
        for (c, value) in row.iter().enumerate() {
            let Some(v) = value else { continue };
            let cell = Cell::new(r as i32, c as i32);
            let Some(code) = int_code(*v) else {
                warnings.push(DecodeWarning::NonIntegerCell { grid: name, cell });
                continue;
            };
            if code == 0 {
                continue;
            }
            if place(cell, code).is_none() {
                warnings.push(DecodeWarning::UnknownCode { grid: name, cell, code });
            }
        }
    }
}

fn decode_agent_info(
    list: &[RawAgent],
    agents: &mut BTreeMap<AgentKey, AgentState>,
    warnings: &mut Vec<DecodeWarning>,
) {
    for raw in list {
        let cell = Cell::new(raw.row, raw.col);
        let Some(kind) = AgentKind::from_code(raw.kind) else {
            warnings.push(DecodeWarning::UnknownCode { grid: "agent_info", cell, code: raw.kind });
            continue;
        };
        let key = AgentKey::Id(raw.id);
        let state = AgentState { cell, kind, carrying: raw.carrying };
        if agents.insert(key, state).is_some() {
            warnings.push(DecodeWarning::DuplicateAgentId { id: raw.id });
        }
    }
}

fn int_code(v: f64) -> Option<i64> {
    if v.fract() != 0.0 {
        return None;
    }
    Some(v as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[f64]]) -> RawGrid {
        rows.iter()
            .map(|r| Some(r.iter().map(|v| Some(*v)).collect()))
            .collect()
    }

    fn step_with_walls(walls: RawGrid) -> RawStep {
        RawStep { walls: Some(walls), ..Default::default() }
    }

    #[test]
    fn wall_bitmask_round_trips_all_values() {
        // 3x3 grid with the probe cell in the middle so every direction
        // has an in-bounds neighbor.
        for mask in 0u8..=15 {
            let g = grid(&[
                &[0.0, 0.0, 0.0],
                &[0.0, mask as f64, 0.0],
                &[0.0, 0.0, 0.0],
            ]);
            let frame = decode_step(&step_with_walls(g), AxisConvention::RowMajor).unwrap();
            assert_eq!(
                encode_wall_mask(&frame.topology.walls, Cell::new(1, 1)),
                mask,
                "mask {} did not round-trip",
                mask
            );
        }
    }

    #[test]
    fn shared_wall_reported_by_both_cells_dedupes() {
        // (0,0) has a wall right (4), (0,1) has a wall left (1): one edge.
        let g = grid(&[&[4.0, 1.0]]);
        let frame = decode_step(&step_with_walls(g), AxisConvention::RowMajor).unwrap();
        assert_eq!(frame.topology.walls.len(), 1);
        let edge = Edge::new(Cell::new(0, 0), Cell::new(0, 1));
        assert_eq!(frame.topology.walls.get(&edge), Some(&WallState::Okay));
    }

    #[test]
    fn perimeter_bits_are_dropped() {
        // Single cell, all four bits set: every neighbor is out of bounds.
        let g = grid(&[&[15.0]]);
        let frame = decode_step(&step_with_walls(g), AxisConvention::RowMajor).unwrap();
        assert!(frame.topology.walls.is_empty());
    }

    #[test]
    fn wall_mask_high_bits_ignored_with_warning() {
        let g = grid(&[&[20.0, 0.0]]);
        let frame = decode_step(&step_with_walls(g), AxisConvention::RowMajor).unwrap();
        // 20 & 15 == 4 (right): edge to (0,1).
        assert_eq!(frame.topology.walls.len(), 1);
        assert!(matches!(
            frame.warnings[0],
            DecodeWarning::MaskOutOfRange { grid: "walls", value: 20, .. }
        ));
    }

    #[test]
    fn negative_wall_mask_skips_the_cell() {
        let g = grid(&[&[-1.0, 0.0]]);
        let frame = decode_step(&step_with_walls(g), AxisConvention::RowMajor).unwrap();
        assert!(frame.topology.walls.is_empty());
        assert!(matches!(
            frame.warnings[0],
            DecodeWarning::MaskOutOfRange { grid: "walls", value: -1, .. }
        ));
    }

    #[test]
    fn edge_key_parses_and_canonicalizes() {
        let a = parse_edge_key("((0, 1), (0, 2))", AxisConvention::RowMajor).unwrap();
        let b = parse_edge_key("((0, 2), (0, 1))", AxisConvention::RowMajor).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Edge::new(Cell::new(0, 1), Cell::new(0, 2)));
    }

    #[test]
    fn edge_key_axis_swap() {
        let e = parse_edge_key("((1, 2), (1, 3))", AxisConvention::Swapped).unwrap();
        assert_eq!(e, Edge::new(Cell::new(2, 1), Cell::new(3, 1)));
    }

    #[test]
    fn malformed_edge_key_is_skipped_not_fatal() {
        let mut wall_states = BTreeMap::new();
        wall_states.insert("((0, 0), (0, 1))".to_string(), "okay".to_string());
        wall_states.insert("((0, 0), (0,))".to_string(), "okay".to_string());
        wall_states.insert("garbage".to_string(), "okay".to_string());
        let raw = RawStep { wall_states: Some(wall_states), ..Default::default() };
        let frame = decode_step(&raw, AxisConvention::RowMajor).unwrap();
        assert_eq!(frame.topology.walls.len(), 1);
        assert_eq!(
            frame
                .warnings
                .iter()
                .filter(|w| matches!(w, DecodeWarning::MalformedEdgeKey { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn unknown_wall_state_is_skipped() {
        let mut wall_states = BTreeMap::new();
        wall_states.insert("((0, 0), (0, 1))".to_string(), "melted".to_string());
        let raw = RawStep { wall_states: Some(wall_states), ..Default::default() };
        let frame = decode_step(&raw, AxisConvention::RowMajor).unwrap();
        assert!(frame.topology.walls.is_empty());
        assert!(matches!(frame.warnings[0], DecodeWarning::UnknownEdgeState { .. }));
    }

    #[test]
    fn destroyed_wall_is_retained_in_topology() {
        let mut wall_states = BTreeMap::new();
        wall_states.insert("((2, 2), (2, 3))".to_string(), "destroyed".to_string());
        let raw = RawStep { wall_states: Some(wall_states), ..Default::default() };
        let frame = decode_step(&raw, AxisConvention::RowMajor).unwrap();
        let edge = Edge::new(Cell::new(2, 2), Cell::new(2, 3));
        assert_eq!(frame.topology.walls.get(&edge), Some(&WallState::Destroyed));
    }

    #[test]
    fn door_takes_precedence_over_wall_on_same_edge() {
        let mut wall_states = BTreeMap::new();
        wall_states.insert("((0, 0), (0, 1))".to_string(), "okay".to_string());
        let mut door_states = BTreeMap::new();
        door_states.insert("((0, 0), (0, 1))".to_string(), "closed".to_string());
        let raw = RawStep {
            wall_states: Some(wall_states),
            door_states: Some(door_states),
            ..Default::default()
        };
        let frame = decode_step(&raw, AxisConvention::RowMajor).unwrap();
        let edge = Edge::new(Cell::new(0, 0), Cell::new(0, 1));
        assert!(frame.topology.walls.is_empty());
        assert_eq!(frame.topology.doors.get(&edge), Some(&DoorState::Closed));
        assert!(frame
            .warnings
            .iter()
            .any(|w| matches!(w, DecodeWarning::DoorOverridesWall { .. })));
    }

    #[test]
    fn poi_threat_and_agent_codes() {
        let raw = RawStep {
            walls: Some(grid(&[&[0.0, 0.0, 0.0]])),
            poi: Some(grid(&[&[0.0, 3.0, 4.0]])),
            threat_markers: Some(grid(&[&[1.0, 2.0, 0.0]])),
            agents: Some(grid(&[&[6.0, 0.0, 7.0]])),
            ..Default::default()
        };
        let frame = decode_step(&raw, AxisConvention::RowMajor).unwrap();
        let t = &frame.topology;
        assert_eq!(t.pois.get(&Cell::new(0, 1)), Some(&PoiKind::Fake));
        assert_eq!(t.pois.get(&Cell::new(0, 2)), Some(&PoiKind::Real));
        assert_eq!(t.threats.get(&Cell::new(0, 0)), Some(&ThreatKind::Droplets));
        assert_eq!(t.threats.get(&Cell::new(0, 1)), Some(&ThreatKind::Hazard));
        assert_eq!(t.agents.len(), 2);
        assert!(t
            .agents
            .contains_key(&AgentKey::Anon(Cell::new(0, 0), AgentKind::Worker)));
        assert!(t
            .agents
            .contains_key(&AgentKey::Anon(Cell::new(0, 2), AgentKind::Scavenger)));
        assert!(frame.warnings.is_empty());
    }

    #[test]
    fn unknown_code_warns_and_continues() {
        let raw = RawStep {
            walls: Some(grid(&[&[0.0, 0.0]])),
            poi: Some(grid(&[&[9.0, 4.0]])),
            ..Default::default()
        };
        let frame = decode_step(&raw, AxisConvention::RowMajor).unwrap();
        assert_eq!(frame.topology.pois.len(), 1);
        assert!(matches!(
            frame.warnings[0],
            DecodeWarning::UnknownCode { grid: "poi", code: 9, .. }
        ));
    }

    #[test]
    fn null_row_is_skipped_not_fatal() {
        let raw = RawStep {
            walls: Some(vec![
                None,
                Some(vec![Some(0.0), Some(1.0)]),
            ]),
            ..Default::default()
        };
        let frame = decode_step(&raw, AxisConvention::RowMajor).unwrap();
        assert_eq!(frame.topology.walls.len(), 1);
        assert!(matches!(frame.warnings[0], DecodeWarning::NullRow { grid: "walls", row: 0 }));
    }

    #[test]
    fn missing_wall_data_rejects_frame() {
        let raw = RawStep { poi: Some(grid(&[&[4.0]])), ..Default::default() };
        assert_eq!(
            decode_step(&raw, AxisConvention::RowMajor).unwrap_err(),
            DecodeError::MissingWalls
        );
    }

    #[test]
    fn entry_points_from_doors_entries_overlay() {
        let raw = RawStep {
            walls: Some(grid(&[&[0.0, 0.0]])),
            doors_entries: Some(grid(&[&[16.0, 1.0]])),
            ..Default::default()
        };
        let frame = decode_step(&raw, AxisConvention::RowMajor).unwrap();
        assert!(frame.topology.entry_points.contains(&Cell::new(0, 0)));
        // No door_states map, so door bits decode with default state.
        let edge = Edge::new(Cell::new(0, 1), Cell::new(0, 0));
        assert_eq!(frame.topology.doors.get(&edge), Some(&DoorState::Closed));
    }

    #[test]
    fn nest_overlay_is_not_an_entry_point() {
        // The service overlays entry points as 16 and the scavenger nest
        // as 32 on the same grid.
        let raw = RawStep {
            walls: Some(grid(&[&[0.0, 0.0]])),
            doors_entries: Some(grid(&[&[32.0, 16.0]])),
            ..Default::default()
        };
        let frame = decode_step(&raw, AxisConvention::RowMajor).unwrap();
        assert!(frame.topology.nests.contains(&Cell::new(0, 0)));
        assert!(!frame.topology.entry_points.contains(&Cell::new(0, 0)));
        assert!(frame.topology.entry_points.contains(&Cell::new(0, 1)));
        assert!(!frame.topology.nests.contains(&Cell::new(0, 1)));
    }

    #[test]
    fn negative_doors_entries_mask_skips_door_bits() {
        let raw = RawStep {
            walls: Some(grid(&[&[0.0, 0.0]])),
            doors_entries: Some(grid(&[&[-3.0, 0.0]])),
            ..Default::default()
        };
        let frame = decode_step(&raw, AxisConvention::RowMajor).unwrap();
        assert!(frame.topology.doors.is_empty());
        assert!(frame.topology.entry_points.is_empty());
        assert!(matches!(
            frame.warnings[0],
            DecodeWarning::MaskOutOfRange { grid: "doors_entries", value: -3, .. }
        ));
    }

    #[test]
    fn agent_info_list_uses_stable_ids() {
        let raw = RawStep {
            walls: Some(grid(&[&[0.0]])),
            agent_info: Some(vec![
                RawAgent { id: 1, row: 0, col: 0, kind: 6, carrying: true },
                RawAgent { id: 2, row: 2, col: 3, kind: 7, carrying: false },
            ]),
            ..Default::default()
        };
        let frame = decode_step(&raw, AxisConvention::RowMajor).unwrap();
        let a1 = frame.topology.agents.get(&AgentKey::Id(1)).unwrap();
        assert_eq!(a1.cell, Cell::new(0, 0));
        assert_eq!(a1.kind, AgentKind::Worker);
        assert!(a1.carrying);
        assert!(frame.topology.agents.contains_key(&AgentKey::Id(2)));
    }
}
