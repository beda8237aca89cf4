use log::info;

use crate::diff::ChangeSet;

/// Hand-off boundary to the scene renderer. No rendering decisions are
/// made on this side; the renderer owns the identity-to-handle mapping and
/// creates/updates/releases handles from the change set.
pub trait FrameSink {
    fn on_frame_ready(&mut self, step: u32, changes: &ChangeSet);
    fn on_summary_update(&mut self, rescued: u32, lost: u32, collapsed: bool);
}

/// Sink for the CLI: reports what a renderer would have done.
#[derive(Default)]
pub struct ConsoleSink;

impl FrameSink for ConsoleSink {
    fn on_frame_ready(&mut self, step: u32, changes: &ChangeSet) {
        println!(
            "step {}: walls +{}/~{}/-{} doors +{}/~{}/-{} poi +{}/~{}/-{} threats +{}/~{}/-{} agents +{}/~{}/-{}",
            step,
            changes.walls.added.len(),
            changes.walls.updated.len(),
            changes.walls.removed.len(),
            changes.doors.added.len(),
            changes.doors.updated.len(),
            changes.doors.removed.len(),
            changes.pois.added.len(),
            changes.pois.updated.len(),
            changes.pois.removed.len(),
            changes.threats.added.len(),
            changes.threats.updated.len(),
            changes.threats.removed.len(),
            changes.agents.added.len(),
            changes.agents.updated.len(),
            changes.agents.removed.len(),
        );
    }

    fn on_summary_update(&mut self, rescued: u32, lost: u32, collapsed: bool) {
        info!("summary: rescued={} lost={} collapsed={}", rescued, lost, collapsed);
    }
}

/// Captures every emission; integration tests assert against it.
#[derive(Default)]
pub struct RecordingSink {
    pub frames: Vec<(u32, ChangeSet)>,
    pub summaries: Vec<(u32, u32, bool)>,
}

impl FrameSink for RecordingSink {
    fn on_frame_ready(&mut self, step: u32, changes: &ChangeSet) {
        self.frames.push((step, changes.clone()));
    }

    fn on_summary_update(&mut self, rescued: u32, lost: u32, collapsed: bool) {
        self.summaries.push((rescued, lost, collapsed));
    }
}
