//! Hierarchical state machine engine
//!
//! States form a tree rooted at the engine-provided [`top`] state. An event
//! is offered to the innermost active state first; a handler that does not
//! handle the event defers it to its immediate superstate with
//! [`Response::Super`], and `top` discards whatever reaches it. A requested
//! transition may cross an arbitrary number of nesting levels: the engine
//! exits states from the innermost active state up to (but excluding) the
//! least common ancestor of the transition source and target, then enters
//! states down to the target, then gives the target the opportunity to
//! cascade further down through nested initial transitions.
//!
//! ```text
//! top
//!  └ running
//!     ├ idle
//!     └ busy
//! ```
//!
//! The engine learns the tree shape from the handlers themselves: a
//! [`PseudoEvent::Discovery`] probe asks a state for its superstate, which
//! the state names with [`Response::Super`]. Handlers therefore stay plain
//! monomorphic functions and no state table is required.
//!
//! The transition machinery is iterative and allocation free. Superstate
//! chains are collected into a buffer of `DEPTH` entries, where `DEPTH` is
//! the maximum nesting depth of the tree, excluding `top`; exceeding it is
//! reported as a fault.
//!
//! Handlers are compared by function address; two states must not share one
//! function.
//!
//! ## Examples
//!
//! ```
//! use emstate::core::{Category, Error, Event, EventId};
//! use emstate::hsm::{self, Hsm, PseudoEvent, Response};
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
//! const START: EventId = EventId::new(0);
//!
//! #[derive(Default)]
//! struct Pump {
//!     starts: u32,
//! }
//!
//! fn initial(_pump: &mut Pump, _event: Event<'_>) -> Response<Pump> {
//!     Response::Transition(running)
//! }
//!
//! fn running(_pump: &mut Pump, event: Event<'_>) -> Response<Pump> {
//!     match PseudoEvent::classify(event) {
//!         Some(PseudoEvent::Discovery) => Response::Super(hsm::top),
//!         // Entering `running` without a more specific target lands in `idle`.
//!         Some(PseudoEvent::NestedInitialTransition) => Response::Transition(idle),
//!         Some(_) => Response::Handled,
//!         None => Response::Handled,
//!     }
//! }
//!
//! fn idle(pump: &mut Pump, event: Event<'_>) -> Response<Pump> {
//!     match PseudoEvent::classify(event) {
//!         Some(PseudoEvent::Discovery) => Response::Super(running),
//!         Some(_) => Response::Handled,
//!         None if event.id() == START => {
//!             pump.starts += 1;
//!             Response::Transition(busy)
//!         }
//!         None => Response::Super(running),
//!     }
//! }
//!
//! fn busy(_pump: &mut Pump, event: Event<'_>) -> Response<Pump> {
//!     match PseudoEvent::classify(event) {
//!         Some(PseudoEvent::Discovery) => Response::Super(running),
//!         Some(_) => Response::Handled,
//!         None => Response::Super(running),
//!     }
//! }
//!
//! fn halt(error: Error) -> ! {
//!     panic!("{error:?}")
//! }
//!
//! let mut pump = Pump::default();
//! let mut engine: Hsm<Pump, 4> = Hsm::new(initial, halt);
//!
//! engine.execute_topmost_initial_transition(&mut pump, Event::new(&CONTROLS, START));
//! assert!(engine.is_in(&mut pump, idle));
//! assert!(engine.is_in(&mut pump, running));
//!
//! engine.dispatch(&mut pump, Event::new(&CONTROLS, START));
//! assert!(engine.is_in(&mut pump, busy));
//! assert_eq!(pump.starts, 1);
//! ```
//!
//! Static allocation is typically used to obtain a `'static` engine that
//! can be shared with spawned tasks:
//!
//! ```
//! # use emstate::core::{Error, Event};
//! # use emstate::hsm::{self, Hsm, PseudoEvent, Response};
//! # struct Pump;
//! # fn idle(_pump: &mut Pump, event: Event<'_>) -> Response<Pump> {
//! #     match PseudoEvent::classify(event) {
//! #         Some(PseudoEvent::Discovery) => Response::Super(hsm::top),
//! #         _ => Response::Handled,
//! #     }
//! # }
//! # fn initial(_pump: &mut Pump, _event: Event<'_>) -> Response<Pump> {
//! #     Response::Transition(idle)
//! # }
//! # fn halt(error: Error) -> ! {
//! #     panic!("{error:?}")
//! # }
//! use static_cell::StaticCell;
//!
//! static ENGINE: StaticCell<Hsm<Pump, 8>> = StaticCell::new();
//! let engine = ENGINE.init(Hsm::new(initial, halt));
//! assert!(engine.current_state().is_none());
//! ```

use core::ptr;

use heapless::Vec;

use crate::core::{Category, Event, EventId};
use crate::fault::{Fault, OnFault};

/// State event handler
///
/// A handler receives the application context and the dispatched event,
/// classifies engine pseudo events via [`PseudoEvent::classify`], and
/// answers with a [`Response`]. Every concrete state must answer
/// [`PseudoEvent::Discovery`] with `Response::Super` naming its immediate
/// superstate ([`top`] for first-level states).
pub type State<A> = fn(&mut A, Event<'_>) -> Response<A>;

/// Event handling result returned by state handlers
///
/// A transition or a deferral cannot be requested without naming the
/// target or superstate, so the engine never observes a result with a
/// missing state pointer.
pub enum Response<A> {
    /// The handler acted on (or deliberately ignored) the event
    Handled,
    /// The handler requests a transition to the named state
    Transition(State<A>),
    /// The handler defers the event to the named superstate
    Super(State<A>),
}

/// The universal root state
///
/// `top` handles, by discarding, every event that reaches it and never
/// defers further. First-level states name it as their superstate. The
/// engine never dispatches pseudo events to `top`: superstate walks
/// terminate on its address, it has no entry or exit actions, and it
/// cannot declare a nested initial transition.
pub fn top<A>(_context: &mut A, _event: Event<'_>) -> Response<A> {
    Response::Handled
}

fn is_top<A>(state: State<A>) -> bool {
    ptr::fn_addr_eq(state, top::<A> as State<A>)
}

/// Pseudo event category owned by the hierarchical engine
///
/// Distinct, by address, from every application category and from the flat
/// machine's category.
pub struct PseudoEventCategory {
    name: &'static str,
}

static PSEUDO_EVENT_CATEGORY: PseudoEventCategory = PseudoEventCategory {
    name: "emstate::hsm",
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
            2 => return "NESTED_INITIAL_TRANSITION",
            3 => return "DISCOVERY",
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
    /// The state may cascade into a default substate with
    /// [`Response::Transition`]; a state without one answers
    /// [`Response::Handled`]
    NestedInitialTransition = 2,
    /// Engine probe walking the superstate chain; must be answered with
    /// [`Response::Super`]
    Discovery = 3,
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
            2 => Some(PseudoEvent::NestedInitialTransition),
            3 => Some(PseudoEvent::Discovery),
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
    /// Holds the innermost active state afterwards
    Started(State<A>),
}

impl<A> Clone for Stage<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for Stage<A> {}

/// Hierarchical state machine engine
///
/// `A` is the application context threaded through every handler call.
/// `DEPTH` bounds the nesting depth of the state tree, excluding [`top`].
/// Dispatch runs to completion (all exits, all entries, all resolved
/// nested initial transitions) before returning.
pub struct Hsm<A, const DEPTH: usize> {
    stage: Stage<A>,
    on_fault: OnFault,
}

/// Hierarchical engine for trees up to 4 levels deep
pub type Hsm4<A> = Hsm<A, 4>;

/// Hierarchical engine for trees up to 8 levels deep
pub type Hsm8<A> = Hsm<A, 8>;

/// Hierarchical engine for trees up to 16 levels deep
pub type Hsm16<A> = Hsm<A, 16>;

impl<A, const DEPTH: usize> Hsm<A, DEPTH> {
    /// Creates an engine with the designated initial pseudostate
    ///
    /// The initial pseudostate's only legal response is
    /// [`Response::Transition`] naming the first concrete target. `on_fault`
    /// is invoked on detected misuse and must not return.
    pub const fn new(initial_pseudostate: State<A>, on_fault: OnFault) -> Self {
        Self {
            stage: Stage::Initial(initial_pseudostate),
            on_fault,
        }
    }

    /// Executes the topmost initial transition
    ///
    /// Invokes the initial pseudostate with the trigger `event`, enters the
    /// named target from just below [`top`] downward, and resolves nested
    /// initial transitions until a leaf of the default configuration is
    /// reached. Must be called exactly once, before any dispatch.
    pub fn execute_topmost_initial_transition(&mut self, context: &mut A, event: Event<'_>) {
        let initial = match self.stage {
            Stage::Initial(initial) => initial,
            Stage::Started(_) => self.fault(Fault::LogicError),
        };

        let target = match initial(context, event) {
            Response::Transition(target) => target,
            _ => self.fault(Fault::UnexpectedEventHandlingResult),
        };

        let mut path = Vec::<State<A>, DEPTH>::new();
        let mut state = target;
        while !is_top(state) {
            if path.push(state).is_err() {
                self.fault(Fault::LogicError);
            }
            state = self.superstate(context, state);
        }
        for &state in path.iter().rev() {
            self.enter(context, state);
        }

        self.stage = Stage::Started(target);
        self.resolve_nested_initial_transitions(context, target);

        trace!("topmost initial transition complete");
    }

    /// Dispatches an application event
    ///
    /// The event is offered to the innermost active state; deferrals walk
    /// it outward until some ancestor handles it or requests a transition,
    /// with [`top`] discarding whatever reaches it. A requested transition
    /// executes exits up to the least common ancestor of the accepting
    /// state and the target, entries down to the target, and any nested
    /// initial transitions, before the call returns.
    pub fn dispatch(&mut self, context: &mut A, event: Event<'_>) {
        let current = match self.stage {
            Stage::Started(current) => current,
            Stage::Initial(_) => self.fault(Fault::LogicError),
        };

        trace!("dispatch: event {}", event.id().into_u16());

        let mut source = current;
        loop {
            match source(context, event) {
                Response::Handled => return,
                Response::Super(superstate) => source = superstate,
                Response::Transition(target) => {
                    self.transition(context, current, source, target);
                    return;
                }
            }
        }
    }

    /// Returns the innermost active state handler, or None before startup
    pub fn current_state(&self) -> Option<State<A>> {
        match self.stage {
            Stage::Started(current) => Some(current),
            Stage::Initial(_) => None,
        }
    }

    /// Checks whether `state` is in the active state configuration
    ///
    /// The active configuration is the innermost active state together with
    /// its superstate chain up to and including [`top`]. Before startup
    /// nothing is active. The superstate chain is walked with
    /// [`PseudoEvent::Discovery`] probes, hence the context parameter.
    pub fn is_in(&self, context: &mut A, state: State<A>) -> bool {
        let mut active = match self.stage {
            Stage::Started(current) => current,
            Stage::Initial(_) => return false,
        };
        loop {
            if ptr::fn_addr_eq(active, state) {
                return true;
            }
            if is_top(active) {
                return false;
            }
            active = self.superstate(context, active);
        }
    }

    /// Executes a transition accepted by `source` while `current` was the
    /// innermost active state
    fn transition(
        &mut self,
        context: &mut A,
        current: State<A>,
        mut source: State<A>,
        target: State<A>,
    ) {
        // Exit from the innermost active state up to the accepting state.
        let mut state = current;
        while !ptr::fn_addr_eq(state, source) {
            let superstate = self.superstate(context, state);
            self.exit(context, state);
            state = superstate;
        }

        // Superstate chain of the target, innermost first, excluding top.
        let mut target_path = Vec::<State<A>, DEPTH>::new();
        let mut state = target;
        while !is_top(state) {
            if target_path.push(state).is_err() {
                self.fault(Fault::LogicError);
            }
            state = self.superstate(context, state);
        }

        // A transition to self exits and re-enters the state.
        if ptr::fn_addr_eq(source, target) {
            let superstate = self.superstate(context, source);
            self.exit(context, source);
            source = superstate;
        }

        // Walk the source chain rootward; the first state also on the target
        // chain is the least common ancestor, with top as the fallback. The
        // ancestor itself is neither exited nor entered.
        let mut state = source;
        let lca_index = loop {
            if let Some(index) = target_path
                .iter()
                .position(|&ancestor| ptr::fn_addr_eq(ancestor, state))
            {
                break index;
            }
            if is_top(state) {
                break target_path.len();
            }
            let superstate = self.superstate(context, state);
            self.exit(context, state);
            state = superstate;
        };

        // Enter from just below the least common ancestor down to the target.
        for &state in target_path[..lca_index].iter().rev() {
            self.enter(context, state);
        }

        self.stage = Stage::Started(target);
        self.resolve_nested_initial_transitions(context, target);
    }

    /// Cascades into default substates until a state without a nested
    /// initial transition is reached
    fn resolve_nested_initial_transitions(&mut self, context: &mut A, mut target: State<A>) {
        loop {
            match target(context, PseudoEvent::NestedInitialTransition.event()) {
                Response::Handled => break,
                Response::Transition(substate) => {
                    self.enter_descendants(context, target, substate);
                    target = substate;
                    self.stage = Stage::Started(target);
                }
                Response::Super(_) => self.fault(Fault::UnexpectedEventHandlingResult),
            }
        }
    }

    /// Enters the chain from just below `ancestor` down to `target`
    ///
    /// `target` must be a proper descendant of `ancestor`.
    fn enter_descendants(&mut self, context: &mut A, ancestor: State<A>, target: State<A>) {
        if ptr::fn_addr_eq(ancestor, target) {
            self.fault(Fault::LogicError);
        }

        let mut path = Vec::<State<A>, DEPTH>::new();
        let mut state = target;
        while !ptr::fn_addr_eq(state, ancestor) {
            if is_top(state) {
                // Ran past the root: target is not a descendant.
                self.fault(Fault::LogicError);
            }
            if path.push(state).is_err() {
                self.fault(Fault::LogicError);
            }
            state = self.superstate(context, state);
        }
        for &state in path.iter().rev() {
            self.enter(context, state);
        }
    }

    /// Asks a state for its immediate superstate
    fn superstate(&self, context: &mut A, state: State<A>) -> State<A> {
        match state(context, PseudoEvent::Discovery.event()) {
            Response::Super(superstate) => superstate,
            _ => self.fault(Fault::UnexpectedEventHandlingResult),
        }
    }

    fn enter(&self, context: &mut A, state: State<A>) {
        match state(context, PseudoEvent::Entry.event()) {
            Response::Handled => {}
            _ => self.fault(Fault::UnexpectedEventHandlingResult),
        }
    }

    fn exit(&self, context: &mut A, state: State<A>) {
        match state(context, PseudoEvent::Exit.event()) {
            Response::Handled => {}
            _ => self.fault(Fault::UnexpectedEventHandlingResult),
        }
    }

    fn fault(&self, fault: Fault) -> ! {
        error!("hsm fault: {:?}", fault);
        (self.on_fault)(fault.into())
    }
}

impl<A, const DEPTH: usize> Clone for Hsm<A, DEPTH> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, const DEPTH: usize> Copy for Hsm<A, DEPTH> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;

    struct TestCategory(&'static str);

    impl Category for TestCategory {
        fn name(&self) -> &str {
            self.0
        }
    }

    static EVENTS: TestCategory = TestCategory("test");

    const GO: EventId = EventId::new(0);
    const STOP: EventId = EventId::new(1);

    #[derive(Default)]
    struct App {
        actions: heapless::Vec<&'static str, 32>,
    }

    impl App {
        fn record(&mut self, action: &'static str) {
            self.actions.push(action).unwrap();
        }
    }

    fn abort(error: Error) -> ! {
        match Fault::classify(error) {
            Some(Fault::LogicError) => panic!("logic error"),
            Some(Fault::UnexpectedEventHandlingResult) => {
                panic!("unexpected event handling result")
            }
            None => panic!("foreign error"),
        }
    }

    // Test tree:
    //
    // top
    //  └ outer
    //     ├ left   (default)
    //     └ right
    fn initial(_app: &mut App, _event: Event<'_>) -> Response<App> {
        Response::Transition(outer)
    }

    fn outer(app: &mut App, event: Event<'_>) -> Response<App> {
        match PseudoEvent::classify(event) {
            Some(PseudoEvent::Discovery) => Response::Super(top),
            Some(PseudoEvent::Entry) => {
                app.record("outer-ENTRY");
                Response::Handled
            }
            Some(PseudoEvent::Exit) => {
                app.record("outer-EXIT");
                Response::Handled
            }
            Some(PseudoEvent::NestedInitialTransition) => Response::Transition(left),
            None if event.id() == STOP => {
                app.record("outer-STOP");
                Response::Handled
            }
            None => Response::Super(top),
        }
    }

    fn left(app: &mut App, event: Event<'_>) -> Response<App> {
        match PseudoEvent::classify(event) {
            Some(PseudoEvent::Discovery) => Response::Super(outer),
            Some(PseudoEvent::Entry) => {
                app.record("left-ENTRY");
                Response::Handled
            }
            Some(PseudoEvent::Exit) => {
                app.record("left-EXIT");
                Response::Handled
            }
            Some(PseudoEvent::NestedInitialTransition) => Response::Handled,
            None if event.id() == GO => {
                app.record("left-GO");
                Response::Transition(right)
            }
            None => Response::Super(outer),
        }
    }

    fn right(app: &mut App, event: Event<'_>) -> Response<App> {
        match PseudoEvent::classify(event) {
            Some(PseudoEvent::Discovery) => Response::Super(outer),
            Some(PseudoEvent::Entry) => {
                app.record("right-ENTRY");
                Response::Handled
            }
            Some(PseudoEvent::Exit) => {
                app.record("right-EXIT");
                Response::Handled
            }
            Some(PseudoEvent::NestedInitialTransition) => Response::Handled,
            None => Response::Super(outer),
        }
    }

    fn trigger() -> Event<'static> {
        Event::new(&EVENTS, GO)
    }

    fn started() -> (App, Hsm<App, 4>) {
        let mut app = App::default();
        let mut engine = Hsm::new(initial, abort);
        engine.execute_topmost_initial_transition(&mut app, trigger());
        (app, engine)
    }

    #[test]
    fn test_not_started() {
        let mut app = App::default();
        let engine: Hsm<App, 4> = Hsm::new(initial, abort);
        assert!(engine.current_state().is_none());
        assert!(!engine.is_in(&mut app, outer));
        assert!(!engine.is_in(&mut app, top));
    }

    #[test]
    fn test_topmost_initial_transition() {
        let (app, engine) = started();

        assert_eq!(&app.actions[..], &["outer-ENTRY", "left-ENTRY"]);
        assert!(engine.current_state().is_some());
    }

    #[test]
    fn test_active_configuration() {
        let (mut app, engine) = started();

        assert!(engine.is_in(&mut app, left));
        assert!(engine.is_in(&mut app, outer));
        assert!(engine.is_in(&mut app, top));
        assert!(!engine.is_in(&mut app, right));
    }

    #[test]
    fn test_unhandled_event_reaches_top() {
        let (mut app, mut engine) = started();
        app.actions.clear();

        // Nobody handles id 9; it must fall off the tree without actions.
        engine.dispatch(&mut app, Event::new(&EVENTS, EventId::new(9)));

        assert!(app.actions.is_empty());
        assert!(engine.is_in(&mut app, left));
    }

    #[test]
    fn test_sibling_transition() {
        let (mut app, mut engine) = started();
        app.actions.clear();

        engine.dispatch(&mut app, Event::new(&EVENTS, GO));

        assert_eq!(
            &app.actions[..],
            &["left-GO", "left-EXIT", "right-ENTRY"]
        );
        assert!(engine.is_in(&mut app, right));
        assert!(!engine.is_in(&mut app, left));
    }

    #[test]
    fn test_event_deferred_to_superstate() {
        let (mut app, mut engine) = started();
        app.actions.clear();

        engine.dispatch(&mut app, Event::new(&EVENTS, STOP));

        assert_eq!(&app.actions[..], &["outer-STOP"]);
        assert!(engine.is_in(&mut app, left));
    }

    #[test]
    fn test_engine_is_copyable_before_startup() {
        let engine: Hsm<App, 4> = Hsm::new(initial, abort);
        let copy = engine;
        assert!(copy.current_state().is_none());
        assert!(engine.current_state().is_none());
    }

    #[test]
    #[should_panic(expected = "logic error")]
    fn test_dispatch_before_initial_transition() {
        let mut app = App::default();
        let mut engine: Hsm<App, 4> = Hsm::new(initial, abort);
        engine.dispatch(&mut app, trigger());
    }

    #[test]
    #[should_panic(expected = "logic error")]
    fn test_repeated_initial_transition() {
        let (mut app, mut engine) = started();
        engine.execute_topmost_initial_transition(&mut app, trigger());
    }

    #[test]
    #[should_panic(expected = "unexpected event handling result")]
    fn test_initial_pseudostate_must_transition() {
        fn stuck_initial(_app: &mut App, _event: Event<'_>) -> Response<App> {
            Response::Handled
        }

        let mut app = App::default();
        let mut engine: Hsm<App, 4> = Hsm::new(stuck_initial, abort);
        engine.execute_topmost_initial_transition(&mut app, trigger());
    }

    #[test]
    #[should_panic(expected = "logic error")]
    fn test_nesting_depth_overflow() {
        // `left` sits two levels below top, one more than the engine holds.
        fn deep_initial(_app: &mut App, _event: Event<'_>) -> Response<App> {
            Response::Transition(left)
        }

        let mut app = App::default();
        let mut engine: Hsm<App, 1> = Hsm::new(deep_initial, abort);
        engine.execute_topmost_initial_transition(&mut app, trigger());
    }

    #[test]
    #[should_panic(expected = "logic error")]
    fn test_nested_initial_target_must_descend() {
        // `wanderer` declares a nested initial transition to its sibling.
        fn wanderer_initial(_app: &mut App, _event: Event<'_>) -> Response<App> {
            Response::Transition(wanderer)
        }

        fn wanderer(_app: &mut App, event: Event<'_>) -> Response<App> {
            match PseudoEvent::classify(event) {
                Some(PseudoEvent::Discovery) => Response::Super(top),
                Some(PseudoEvent::NestedInitialTransition) => Response::Transition(bystander),
                _ => Response::Handled,
            }
        }

        fn bystander(_app: &mut App, event: Event<'_>) -> Response<App> {
            match PseudoEvent::classify(event) {
                Some(PseudoEvent::Discovery) => Response::Super(top),
                _ => Response::Handled,
            }
        }

        let mut app = App::default();
        let mut engine: Hsm<App, 4> = Hsm::new(wanderer_initial, abort);
        engine.execute_topmost_initial_transition(&mut app, trigger());
    }

    #[test]
    #[should_panic(expected = "unexpected event handling result")]
    fn test_discovery_must_be_deferred() {
        // `opaque` mishandles the discovery probe.
        fn opaque_initial(_app: &mut App, _event: Event<'_>) -> Response<App> {
            Response::Transition(opaque)
        }

        fn opaque(_app: &mut App, _event: Event<'_>) -> Response<App> {
            Response::Handled
        }

        let mut app = App::default();
        let mut engine: Hsm<App, 4> = Hsm::new(opaque_initial, abort);
        engine.execute_topmost_initial_transition(&mut app, trigger());
    }
}
