//! Flat state machine engine
//!
//! A single-level event-driven machine with entry and exit actions. The
//! machine is configured with an initial pseudostate handler whose only job
//! is to pick the first concrete state; afterwards every dispatched event
//! goes to the current state's handler, which either handles it or requests
//! a transition. On a transition the engine dispatches [`PseudoEvent::Exit`]
//! to the departed state and [`PseudoEvent::Entry`] to the target; a
//! transition to the current state itself re-executes the exit/entry pair.
//!
//! State handlers are plain functions over an application context type `A`.
//! All mutable application state lives in the context; the engine holds only
//! control state and is trivially copyable.
//!
//! ## Examples
//!
//! ```
//! use emstate::core::{Category, Error, Event, EventId};
//! use emstate::machine::{Machine, PseudoEvent, Response};
//!
//! struct Controls(&'static str);
//!
//! impl Category for Controls {
//!     fn name(&self) -> &str {
//!         self.0
//!     }
//! }
//!
//! static CONTROLS: Controls = Controls("controls");
//! const TOGGLE: EventId = EventId::new(0);
//!
//! #[derive(Default)]
//! struct Lamp {
//!     switched_on: u32,
//! }
//!
//! fn initial(_lamp: &mut Lamp, _event: Event<'_>) -> Response<Lamp> {
//!     Response::Transition(off)
//! }
//!
//! fn off(_lamp: &mut Lamp, event: Event<'_>) -> Response<Lamp> {
//!     match PseudoEvent::classify(event) {
//!         Some(_) => Response::Handled,
//!         None if event.id() == TOGGLE => Response::Transition(on),
//!         None => Response::Handled,
//!     }
//! }
//!
//! fn on(lamp: &mut Lamp, event: Event<'_>) -> Response<Lamp> {
//!     match PseudoEvent::classify(event) {
//!         Some(PseudoEvent::Entry) => {
//!             lamp.switched_on += 1;
//!             Response::Handled
//!         }
//!         Some(_) => Response::Handled,
//!         None if event.id() == TOGGLE => Response::Transition(off),
//!         None => Response::Handled,
//!     }
//! }
//!
//! fn halt(error: Error) -> ! {
//!     panic!("{error:?}")
//! }
//!
//! let mut lamp = Lamp::default();
//! let mut machine = Machine::new(initial, halt);
//!
//! machine.execute_initial_transition(&mut lamp, Event::new(&CONTROLS, TOGGLE));
//! assert!(machine.is_in(off));
//!
//! machine.dispatch(&mut lamp, Event::new(&CONTROLS, TOGGLE));
//! assert!(machine.is_in(on));
//! assert_eq!(lamp.switched_on, 1);
//! ```

use core::ptr;

use crate::core::{Category, Event, EventId};
use crate::fault::{Fault, OnFault};

/// State event handler
///
/// Handlers are compared by function address; two states must not share one
/// function. A handler receives the application context and the dispatched
/// event, classifies engine pseudo events via [`PseudoEvent::classify`], and
/// answers with a [`Response`].
pub type State<A> = fn(&mut A, Event<'_>) -> Response<A>;

/// Event handling result returned by state handlers
///
/// A transition cannot be requested without naming its target, so the
/// engine never observes a result with a missing state pointer.
pub enum Response<A> {
    /// The handler acted on (or deliberately ignored) the event
    Handled,
    /// The handler requests a transition to the named state
    Transition(State<A>),
}

/// Pseudo event category owned by the flat machine engine
///
/// Distinct, by address, from every application category.
pub struct PseudoEventCategory {
    name: &'static str,
}

static PSEUDO_EVENT_CATEGORY: PseudoEventCategory = PseudoEventCategory {
    name: "emstate::machine",
};

impl Category for PseudoEventCategory {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self, id: EventId) -> &str {
        #[cfg(feature = "descriptions")]
        match id.into_u16() {
            0 => return "ENTRY",
            1 => return "EXIT",
            _ => {}
        }
        let _ = id;
        ""
    }
}

/// Static accessor for the engine-owned pseudo event category
pub fn pseudo_event_category() -> &'static dyn Category {
    &PSEUDO_EVENT_CATEGORY
}

/// Pseudo events synthesized by the engine
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum PseudoEvent {
    /// Execute the state's entry actions
    Entry = 0,
    /// Execute the state's exit actions
    Exit = 1,
}

impl PseudoEvent {
    pub const fn id(self) -> EventId {
        EventId::new(self as u16)
    }

    /// Identifies an engine pseudo event
    ///
    /// Compares the event category against the engine-owned category by
    /// address, then branches on the id. Application events yield None.
    pub fn classify(event: Event<'_>) -> Option<PseudoEvent> {
        if !event.belongs_to(&PSEUDO_EVENT_CATEGORY) {
            return None;
        }
        match event.id().into_u16() {
            0 => Some(PseudoEvent::Entry),
            1 => Some(PseudoEvent::Exit),
            _ => None,
        }
    }

    fn event(self) -> Event<'static> {
        Event::new(&PSEUDO_EVENT_CATEGORY, self.id())
    }
}

enum Stage<A> {
    /// Holds the initial pseudostate until startup
    Initial(State<A>),
    /// Holds the current state afterwards
    Started(State<A>),
}

impl<A> Clone for Stage<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for Stage<A> {}

/// Flat state machine engine
///
/// `A` is the application context threaded through every handler call.
/// Dispatch runs to completion before returning; the engine never observes
/// time and performs no I/O beyond the fault hook.
pub struct Machine<A> {
    stage: Stage<A>,
    on_fault: OnFault,
}

impl<A> Machine<A> {
    /// Creates an engine with the designated initial pseudostate
    ///
    /// The initial pseudostate's only legal response is
    /// [`Response::Transition`] naming the first concrete state. `on_fault`
    /// is invoked on detected misuse and must not return.
    pub const fn new(initial_pseudostate: State<A>, on_fault: OnFault) -> Self {
        Self {
            stage: Stage::Initial(initial_pseudostate),
            on_fault,
        }
    }

    /// Executes the initial transition
    ///
    /// Invokes the initial pseudostate with the trigger `event` and enters
    /// the state it names. Must be called exactly once, before any dispatch.
    pub fn execute_initial_transition(&mut self, context: &mut A, event: Event<'_>) {
        let initial = match self.stage {
            Stage::Initial(initial) => initial,
            Stage::Started(_) => self.fault(Fault::LogicError),
        };

        let target = match initial(context, event) {
            Response::Transition(target) => target,
            Response::Handled => self.fault(Fault::UnexpectedEventHandlingResult),
        };

        self.enter(context, target);
        self.stage = Stage::Started(target);

        trace!("initial transition complete");
    }

    /// Dispatches an application event to the current state
    ///
    /// On a requested transition the departed state receives
    /// [`PseudoEvent::Exit`] and the target receives [`PseudoEvent::Entry`],
    /// in that order, before the call returns.
    pub fn dispatch(&mut self, context: &mut A, event: Event<'_>) {
        let current = match self.stage {
            Stage::Started(current) => current,
            Stage::Initial(_) => self.fault(Fault::LogicError),
        };

        trace!("dispatch: event {}", event.id().into_u16());

        match current(context, event) {
            Response::Handled => {}
            Response::Transition(target) => {
                self.exit(context, current);
                self.enter(context, target);
                self.stage = Stage::Started(target);
            }
        }
    }

    /// Returns the current state handler, or None before startup
    pub fn current_state(&self) -> Option<State<A>> {
        match self.stage {
            Stage::Started(current) => Some(current),
            Stage::Initial(_) => None,
        }
    }

    /// Checks whether `state` is the current state, by handler address
    pub fn is_in(&self, state: State<A>) -> bool {
        match self.stage {
            Stage::Started(current) => ptr::fn_addr_eq(current, state),
            Stage::Initial(_) => false,
        }
    }

    fn enter(&self, context: &mut A, state: State<A>) {
        match state(context, PseudoEvent::Entry.event()) {
            Response::Handled => {}
            Response::Transition(_) => self.fault(Fault::UnexpectedEventHandlingResult),
        }
    }

    fn exit(&self, context: &mut A, state: State<A>) {
        match state(context, PseudoEvent::Exit.event()) {
            Response::Handled => {}
            Response::Transition(_) => self.fault(Fault::UnexpectedEventHandlingResult),
        }
    }

    fn fault(&self, fault: Fault) -> ! {
        error!("flat machine fault: {:?}", fault);
        (self.on_fault)(fault.into())
    }
}

impl<A> Clone for Machine<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for Machine<A> {}
