//! Progress milestones (spec §4.8, §5) and the cooperative cancellation
//! signal.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProgressMilestone {
    Initializing,
    LoadingRules,
    ParsingSignatures { discovered_count: usize },
    BuildingBlocks,
    ComputingLayout { page_count: u32 },
    WritingPage { page_number: u32, total_pages: u32 },
    Finalizing,
}

/// A pure callback; the pipeline makes no assumption about where events
/// travel (spec §4.8). Invoked synchronously, in strict pipeline order,
/// before the pipeline returns (spec §5).
pub trait ProgressListener {
    fn on_milestone(&mut self, milestone: ProgressMilestone);
}

/// No-op listener used when the host passes no `options.progress` callback.
pub struct NoopProgressListener;

impl ProgressListener for NoopProgressListener {
    fn on_milestone(&mut self, _milestone: ProgressMilestone) {}
}

impl<F: FnMut(ProgressMilestone)> ProgressListener for F {
    fn on_milestone(&mut self, milestone: ProgressMilestone) {
        self(milestone)
    }
}

/// Cooperative cancellation signal (spec §5, §6 `options.cancel`). Checked
/// between milestones: after parsing, after layout, and between pages
/// during writing.
pub trait CancelSignal {
    fn is_cancelled(&self) -> bool;
}

pub struct NeverCancel;

impl CancelSignal for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F: Fn() -> bool> CancelSignal for F {
    fn is_cancelled(&self) -> bool {
        self()
    }
}
