//! Verdict history
//!
//! Growing record of scenario verdicts, newest first. Verdicts are never
//! edited after they are recorded.

use gemsim_core::Verdict;
use std::collections::VecDeque;

/// Ordered verdict history, newest first
#[derive(Debug, Clone, Default)]
pub struct VerdictHistory {
    verdicts: VecDeque<Verdict>,
}

impl VerdictHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a verdict as the newest entry
    pub fn record(&mut self, verdict: Verdict) {
        self.verdicts.push_front(verdict);
    }

    /// Most recent verdict
    pub fn latest(&self) -> Option<&Verdict> {
        self.verdicts.front()
    }

    /// Iterate newest first
    pub fn iter(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter()
    }

    /// Owned copy, newest first
    pub fn to_vec(&self) -> Vec<Verdict> {
        self.verdicts.iter().cloned().collect()
    }

    /// Number of recorded verdicts
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    /// Whether no verdict has been recorded
    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    /// Drop every verdict
    pub fn clear(&mut self) {
        self.verdicts.clear();
    }
}
