use std::collections::BTreeMap;

use crate::model::{
    AgentKey, AgentState, Cell, DoorState, Edge, FrameSummary, PoiKind, ThreatKind, Topology,
    WallState,
};

/// Added/updated/removed entries for one entity category. `updated` carries
/// the new value; the renderer already holds the handle keyed by identity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CategoryDelta<K: Ord, V> {
    pub added: Vec<(K, V)>,
    pub updated: Vec<(K, V)>,
    pub removed: Vec<K>,
}

impl<K: Ord, V> Default for CategoryDelta<K, V> {
    fn default() -> Self {
        Self { added: Vec::new(), updated: Vec::new(), removed: Vec::new() }
    }
}

impl<K: Ord, V> CategoryDelta<K, V> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.updated.len() + self.removed.len()
    }
}

/// Monotonicity violations in the reported counters. The reported values
/// are kept as-is; these only mark the frame as suspect.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SummaryAnomaly {
    RescuedDecreased { from: u32, to: u32 },
    LostDecreased { from: u32, to: u32 },
    CollapseReverted,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SummaryDelta {
    pub rescued: u32,
    pub lost: u32,
    pub collapsed: bool,
    /// True when any counter or the flag differs from the baseline (always
    /// true for the first frame).
    pub changed: bool,
    pub anomalies: Vec<SummaryAnomaly>,
}

/// Everything that changed between two consecutive topologies.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChangeSet {
    pub walls: CategoryDelta<Edge, WallState>,
    pub doors: CategoryDelta<Edge, DoorState>,
    pub pois: CategoryDelta<Cell, PoiKind>,
    pub threats: CategoryDelta<Cell, ThreatKind>,
    pub agents: CategoryDelta<AgentKey, AgentState>,
    pub entry_points: CategoryDelta<Cell, ()>,
    pub nests: CategoryDelta<Cell, ()>,
    pub summary: SummaryDelta,
}

impl ChangeSet {
    /// True when no entity changed; the summary delta may still be flagged.
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
            && self.doors.is_empty()
            && self.pois.is_empty()
            && self.threats.is_empty()
            && self.agents.is_empty()
            && self.entry_points.is_empty()
            && self.nests.is_empty()
    }

    pub fn entity_count(&self) -> usize {
        self.walls.len()
            + self.doors.len()
            + self.pois.len()
            + self.threats.len()
            + self.agents.len()
            + self.entry_points.len()
            + self.nests.len()
    }
}

/// Compare two topologies. Pure function of its inputs: same (prev, cur)
/// always produces the same ChangeSet. `prev = None` means first frame and
/// marks everything in `cur` as added.
pub fn diff(prev: Option<&Topology>, cur: &Topology) -> ChangeSet {
    let empty = Topology::default();
    let base = prev.unwrap_or(&empty);

    let entry_prev: BTreeMap<Cell, ()> = base.entry_points.iter().map(|c| (*c, ())).collect();
    let entry_cur: BTreeMap<Cell, ()> = cur.entry_points.iter().map(|c| (*c, ())).collect();
    let nest_prev: BTreeMap<Cell, ()> = base.nests.iter().map(|c| (*c, ())).collect();
    let nest_cur: BTreeMap<Cell, ()> = cur.nests.iter().map(|c| (*c, ())).collect();

    ChangeSet {
        walls: diff_maps(&base.walls, &cur.walls),
        doors: diff_maps(&base.doors, &cur.doors),
        pois: diff_maps(&base.pois, &cur.pois),
        threats: diff_maps(&base.threats, &cur.threats),
        agents: diff_maps(&base.agents, &cur.agents),
        entry_points: diff_maps(&entry_prev, &entry_cur),
        nests: diff_maps(&nest_prev, &nest_cur),
        summary: diff_summary(prev.map(|p| p.summary), cur.summary),
    }
}

fn diff_maps<K, V>(prev: &BTreeMap<K, V>, cur: &BTreeMap<K, V>) -> CategoryDelta<K, V>
where
    K: Ord + Copy,
    V: PartialEq + Copy,
{
    let mut delta = CategoryDelta::default();
    for (k, v) in cur {
        match prev.get(k) {
            None => delta.added.push((*k, *v)),
            Some(old) if old != v => delta.updated.push((*k, *v)),
            Some(_) => {}
        }
    }
    for k in prev.keys() {
        if !cur.contains_key(k) {
            delta.removed.push(*k);
        }
    }
    delta
}

fn diff_summary(prev: Option<FrameSummary>, cur: FrameSummary) -> SummaryDelta {
    let mut anomalies = Vec::new();
    let changed = match prev {
        None => true,
        Some(p) => {
            if cur.rescued < p.rescued {
                anomalies.push(SummaryAnomaly::RescuedDecreased { from: p.rescued, to: cur.rescued });
            }
            if cur.lost < p.lost {
                anomalies.push(SummaryAnomaly::LostDecreased { from: p.lost, to: cur.lost });
            }
            if p.collapsed && !cur.collapsed {
                anomalies.push(SummaryAnomaly::CollapseReverted);
            }
            p != cur
        }
    };
    SummaryDelta {
        rescued: cur.rescued,
        lost: cur.lost,
        collapsed: cur.collapsed,
        changed,
        anomalies,
    }
}
