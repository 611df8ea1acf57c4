//! Engine fault reporting
//!
//! The engines validate their preconditions and the responses they receive
//! from state handlers. A violation indicates a bug in a handler or in the
//! machine configuration, so it is never recovered from: the engine reports
//! it through a host-provided hook that must not return.
//!
//! The hook receives an [`Error`](crate::core::Error) in the engine-owned
//! category obtained from [`fault_category`]. Hosts that want to branch on
//! the kind can recover it with [`Fault::classify`].

use crate::core::{Error, ErrorCategory, ErrorId};

/// Host fault hook
///
/// Invoked on a detected precondition violation. The host must halt, reset,
/// trap, or otherwise not return; test code typically panics.
pub type OnFault = fn(Error) -> !;

/// Engine misuse kinds
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Fault {
    /// The engine was driven out of order: a dispatch before the initial
    /// transition, a repeated initial transition, a nested initial
    /// transition that does not target a proper descendant, or a state
    /// nesting depth exceeding the engine's capacity
    LogicError = 0,
    /// A handler answered a pseudo event (or the initial pseudostate
    /// answered its trigger) with a response inconsistent with it
    UnexpectedEventHandlingResult = 1,
}

impl Fault {
    pub const fn id(self) -> ErrorId {
        ErrorId::new(self as u16)
    }

    /// Recovers the fault kind from a reported error
    ///
    /// Returns None for errors outside the engine-owned category.
    pub fn classify(error: Error) -> Option<Fault> {
        if !error.belongs_to(&FAULT_CATEGORY) {
            return None;
        }
        match error.id().into_u16() {
            0 => Some(Fault::LogicError),
            1 => Some(Fault::UnexpectedEventHandlingResult),
            _ => None,
        }
    }
}

impl From<Fault> for Error {
    fn from(fault: Fault) -> Self {
        Error::new(&FAULT_CATEGORY, fault.id())
    }
}

struct FaultCategory {
    name: &'static str,
}

static FAULT_CATEGORY: FaultCategory = FaultCategory { name: "emstate" };

impl ErrorCategory for FaultCategory {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self, id: ErrorId) -> &str {
        #[cfg(feature = "descriptions")]
        match id.into_u16() {
            0 => return "LOGIC_ERROR",
            1 => return "UNEXPECTED_EVENT_HANDLING_RESULT",
            _ => {}
        }
        let _ = id;
        ""
    }
}

/// Static accessor for the engine-owned error category
pub fn fault_category() -> &'static dyn ErrorCategory {
    &FAULT_CATEGORY
}
