use crate::FaultCode;

/// Execution-state machine for host-observable core control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Not executing; single steps or a new run may start.
    #[default]
    Idle,
    /// A continuous run loop currently owns the core.
    Running,
    /// The last step retired a `halt` or `breakp` instruction.
    Halted,
    /// The last step faulted; the host decides whether to resume or reset.
    Faulted(FaultCode),
}

impl RunState {
    /// Returns the latched fault, if this state is faulted.
    #[must_use]
    pub const fn latched_fault(self) -> Option<FaultCode> {
        match self {
            Self::Faulted(cause) => Some(cause),
            Self::Idle | Self::Running | Self::Halted => None,
        }
    }
}
