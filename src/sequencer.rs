use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::codec::{self, DecodedFrame};
use crate::config::{AxisConvention, Config};
use crate::diff;
use crate::model::Topology;
use crate::sink::FrameSink;
use crate::source::StepSource;

/// Result of one `advance` call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StepOutcome {
    /// Frame decoded, diffed against the baseline and emitted.
    Applied {
        step: u32,
        attempts: u32,
        backoff_waits: u32,
        warnings: usize,
    },
    /// All attempts exhausted; the step is skipped, the baseline untouched.
    Failed {
        step: u32,
        attempts: u32,
        backoff_waits: u32,
    },
    /// Source signalled end-of-steps or `max_steps` was reached.
    Finished,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunStats {
    pub applied: u32,
    pub failed: u32,
    pub decode_warnings: usize,
}

/// Drives the codec+diff pipeline across the step sequence. Owns the
/// retained baseline topology and the step counter; nothing else in the
/// pipeline holds state. Pacing is external: whoever owns real time (a
/// timer, a key press, a test) calls `advance`.
pub struct Sequencer {
    retry_limit: u32,
    retry_backoff: Duration,
    max_steps: Option<u32>,
    axis: AxisConvention,
    next_step: u32,
    baseline: Option<Topology>,
    finished: bool,
}

impl Sequencer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            retry_limit: cfg.retry_limit.max(1),
            retry_backoff: cfg.retry_backoff,
            max_steps: cfg.max_steps,
            axis: cfg.axis,
            next_step: 1,
            baseline: None,
            finished: false,
        }
    }

    pub fn baseline(&self) -> Option<&Topology> {
        self.baseline.as_ref()
    }

    pub fn next_step(&self) -> u32 {
        self.next_step
    }

    /// Acquire, decode, diff and emit one step. Makes up to `retry_limit`
    /// fetch attempts with a fixed backoff between them; a frame the codec
    /// rejects outright counts as a failed attempt just like a transport
    /// error. On exhaustion the step is skipped and the run continues; the
    /// baseline is only replaced by a fully decoded frame.
    pub fn advance(
        &mut self,
        source: &mut dyn StepSource,
        sink: &mut dyn FrameSink,
    ) -> StepOutcome {
        if self.finished {
            return StepOutcome::Finished;
        }
        if let Some(max) = self.max_steps {
            if self.next_step > max {
                info!("reached max step count {}", max);
                self.finished = true;
                return StepOutcome::Finished;
            }
        }

        let step = self.next_step;
        let mut backoff_waits = 0u32;

        for attempt in 1..=self.retry_limit {
            if attempt > 1 {
                thread::sleep(self.retry_backoff);
                backoff_waits += 1;
            }
            match self.try_fetch_decode(source, step, attempt) {
                FetchResult::Frame(frame) => {
                    let changes = diff::diff(self.baseline.as_ref(), &frame.topology);
                    for w in &frame.warnings {
                        warn!("step {}: {}", step, w);
                    }
                    for a in &changes.summary.anomalies {
                        warn!("step {}: summary anomaly: {:?}", step, a);
                    }
                    debug!(
                        "step {}: {} entity changes",
                        step,
                        changes.entity_count()
                    );
                    sink.on_frame_ready(step, &changes);
                    if changes.summary.changed {
                        sink.on_summary_update(
                            changes.summary.rescued,
                            changes.summary.lost,
                            changes.summary.collapsed,
                        );
                    }
                    let warnings = frame.warnings.len();
                    self.baseline = Some(frame.topology);
                    self.next_step += 1;
                    return StepOutcome::Applied { step, attempts: attempt, backoff_waits, warnings };
                }
                FetchResult::Exhausted => {
                    info!("source has no step {}; run complete", step);
                    self.finished = true;
                    return StepOutcome::Finished;
                }
                FetchResult::AttemptFailed => {}
            }
        }

        warn!(
            "step {}: abandoned after {} attempts; skipping",
            step, self.retry_limit
        );
        self.next_step += 1;
        StepOutcome::Failed { step, attempts: self.retry_limit, backoff_waits }
    }

    /// Advance until the source runs out of steps; per-step failures only
    /// skip that step.
    pub fn run(&mut self, source: &mut dyn StepSource, sink: &mut dyn FrameSink) -> RunStats {
        let mut stats = RunStats::default();
        loop {
            match self.advance(source, sink) {
                StepOutcome::Applied { warnings, .. } => {
                    stats.applied += 1;
                    stats.decode_warnings += warnings;
                }
                StepOutcome::Failed { .. } => stats.failed += 1,
                StepOutcome::Finished => return stats,
            }
        }
    }

    fn try_fetch_decode(
        &self,
        source: &mut dyn StepSource,
        step: u32,
        attempt: u32,
    ) -> FetchResult {
        match source.fetch(step) {
            Ok(None) => FetchResult::Exhausted,
            Ok(Some(raw)) => match codec::decode_step(&raw, self.axis) {
                Ok(frame) => FetchResult::Frame(frame),
                Err(e) => {
                    warn!("step {} attempt {}: frame rejected: {}", step, attempt, e);
                    FetchResult::AttemptFailed
                }
            },
            Err(e) => {
                warn!("step {} attempt {}: {}", step, attempt, e);
                FetchResult::AttemptFailed
            }
        }
    }
}

enum FetchResult {
    Frame(DecodedFrame),
    Exhausted,
    AttemptFailed,
}
