//! # Emstate
//!
//! This library provides event-driven execution engines for deeply embedded
//! firmware in no_std environments: a flat state machine and a UML-style
//! hierarchical state machine (HSM). It uses no dynamic memory allocation;
//! the transition machinery of the hierarchical engine runs on a bounded
//! buffer whose depth the embedder fixes at compile time.
//!
//! ## Architecture
//!
//! ```text
//!  ┌─────────────┐  events   ┌────────────────────┐
//!  │ Application ├──────────►│ Machine / Hsm      │
//!  │ (embedder)  │           │                    │
//!  └──────┬──────┘           │  pseudo events     │
//!         │ context          │  ENTRY / EXIT /    │
//!         ▼                  │  NESTED_INITIAL /  │
//!  ┌─────────────┐ responses │  DISCOVERY         │
//!  │ State       │◄──────────┤                    │
//!  │ handlers    ├──────────►│                    │
//!  └─────────────┘           └─────────┬──────────┘
//!                                      │ faults
//!                                      ▼
//!                            ┌────────────────────┐
//!                            │ Host fault hook    │
//!                            │ (must not return)  │
//!                            └────────────────────┘
//! ```
//!
//! Components:
//! * _Events_ are `(category, id)` values ([`Event`](emstate_core::Event));
//!   the engines compare categories by address and ids by value, nothing
//!   else.
//! * _State handlers_ are plain functions over an application context type.
//!   They answer dispatched events with a response sum: handled, transition
//!   to a named state, or (hierarchical only) defer to a named superstate.
//! * _Pseudo events_ are synthesized by an engine to drive entry actions,
//!   exit actions, nested initial transitions, and superstate discovery.
//!   Each engine owns a dedicated category for them.
//! * _Faults_ report engine misuse through a host hook that must not
//!   return ([`fault`]); the engines never attempt recovery.
//!
//! ## Engines
//!
//! * [`machine::Machine`] is a single-level machine with entry and exit
//!   actions.
//! * [`hsm::Hsm`] adds nested states with transitions that may cross an
//!   arbitrary number of levels, executing exit actions up to the least
//!   common ancestor and entry actions down into the target, including
//!   nested initial transitions.
//!
//! ## Concurrency model
//!
//! The engines are single-threaded and run to completion: a dispatch call
//! performs every exit action, entry action, and nested initial transition
//! of the resulting transition before returning. There is no internal event
//! queue and no suspension point; the embedder supplies whatever queueing or
//! ISR-to-mainloop handoff it needs and serializes access to each engine.
//! Handlers never receive a reference to the engine, so they cannot
//! re-enter it. Independent engines share nothing.
//!
//! ## Feature flags
//!
//! * `defmt` routes engine logging to `defmt` and derives `defmt::Format`
//!   for public types.
//! * `log` routes engine logging to `log`.
//! * `descriptions` compiles in long-form description strings for the
//!   engine-owned event and error categories; without it the accessors
//!   return `""`.
#![no_std]

pub use emstate_core as core;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod fault;
pub mod hsm;
pub mod machine;
