//! System-wide behavioral modes.
//!
//! Exactly one mode is active at any time; the controller fully exits the
//! previous mode (cancelling every per-unit task) before entering a new one.

use serde::{Deserialize, Serialize};

/// Behavioral phase all units currently obey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeState {
    /// Terminal "off" state: all units hidden, no tasks run.
    Default,
    /// Holding formation with a persistent watch/fire loop per unit.
    StandBy,
    /// One full attack choreography per unit, then auto-revert to standby.
    AttackPattern,
    /// AttackPattern plus phase counters for scripted boss sequencing.
    Activate,
}

impl ModeState {
    /// Transient modes end on their own once every per-unit task finishes;
    /// the controller then requests standby autonomously.
    #[inline]
    pub fn is_transient(self) -> bool {
        matches!(self, ModeState::AttackPattern | ModeState::Activate)
    }

    /// Whether entering this mode spawns per-unit tasks.
    #[inline]
    pub fn spawns_tasks(self) -> bool {
        !matches!(self, ModeState::Default)
    }
}
