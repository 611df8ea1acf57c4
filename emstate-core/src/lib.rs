//! Emstate identity data types
//!
//! This crate provides the event and error identity types used by the Emstate
//! engine crates. Emstate users should not depend on this crate directly.
//! Use the `emstate::core` reexport instead.
//!
//! An identity is a pair of a long-lived category reference and a numeric id.
//! Engines and handlers never compare identities structurally: the category
//! is compared by address and the id by value, each on its own.
#![no_std]

use core::any::Any;
use core::fmt;

/// Numeric event id, meaningful only within its category
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventId(u16);

impl EventId {
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    pub const fn into_u16(self) -> u16 {
        self.0
    }
}

impl From<EventId> for u16 {
    fn from(value: EventId) -> Self {
        value.into_u16()
    }
}

impl From<u16> for EventId {
    fn from(value: u16) -> Self {
        Self::new(value)
    }
}

/// An event category
///
/// A category instance is expected to be long-lived (typically a static) so
/// that events can hold references to it and engines can compare those
/// references by address.
///
/// The string accessors exist for diagnostics only and may return `""`.
pub trait Category {
    /// Human-readable category name
    fn name(&self) -> &str {
        ""
    }

    /// Human-readable description of an event id within this category
    fn description(&self, id: EventId) -> &str {
        let _ = id;
        ""
    }
}

/// A dispatched stimulus: an event category paired with an event id
///
/// Events are plain values and carry no behavior. An optional payload
/// reference rides along untouched; the engines only ever inspect the
/// category address and the id.
#[derive(Clone, Copy)]
pub struct Event<'a> {
    category: &'a dyn Category,
    id: EventId,
    payload: Option<&'a dyn Any>,
}

impl<'a> Event<'a> {
    pub const fn new(category: &'a dyn Category, id: EventId) -> Self {
        Self {
            category,
            id,
            payload: None,
        }
    }

    pub const fn with_payload(
        category: &'a dyn Category,
        id: EventId,
        payload: &'a dyn Any,
    ) -> Self {
        Self {
            category,
            id,
            payload: Some(payload),
        }
    }

    pub fn category(&self) -> &'a dyn Category {
        self.category
    }

    pub const fn id(&self) -> EventId {
        self.id
    }

    pub const fn payload(&self) -> Option<&'a dyn Any> {
        self.payload
    }

    /// Checks whether the event belongs to `category`, by address
    pub fn belongs_to(&self, category: &dyn Category) -> bool {
        core::ptr::addr_eq(
            self.category as *const dyn Category,
            category as *const dyn Category,
        )
    }

    pub fn description(&self) -> &'a str {
        self.category.description(self.id)
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("category", &self.category.name())
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Event<'_> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "Event {{ category: {}, id: {} }}",
            self.category.name(),
            self.id
        );
    }
}

/// Numeric error id, meaningful only within its category
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorId(u16);

impl ErrorId {
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    pub const fn into_u16(self) -> u16 {
        self.0
    }
}

impl From<ErrorId> for u16 {
    fn from(value: ErrorId) -> Self {
        value.into_u16()
    }
}

impl From<u16> for ErrorId {
    fn from(value: u16) -> Self {
        Self::new(value)
    }
}

/// An error category
///
/// Error categories are process-wide statics reached through accessors, so
/// errors hold `'static` references and remain `Copy`.
pub trait ErrorCategory {
    /// Human-readable category name
    fn name(&self) -> &str {
        ""
    }

    /// Human-readable description of an error id within this category
    fn description(&self, id: ErrorId) -> &str {
        let _ = id;
        ""
    }
}

/// A reported error: an error category paired with an error id
#[derive(Clone, Copy)]
pub struct Error {
    category: &'static dyn ErrorCategory,
    id: ErrorId,
}

impl Error {
    pub const fn new(category: &'static dyn ErrorCategory, id: ErrorId) -> Self {
        Self { category, id }
    }

    pub fn category(&self) -> &'static dyn ErrorCategory {
        self.category
    }

    pub const fn id(&self) -> ErrorId {
        self.id
    }

    /// Checks whether the error belongs to `category`, by address
    pub fn belongs_to(&self, category: &dyn ErrorCategory) -> bool {
        core::ptr::addr_eq(
            self.category as *const dyn ErrorCategory,
            category as *const dyn ErrorCategory,
        )
    }

    pub fn description(&self) -> &'static str {
        self.category.description(self.id)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("category", &self.category.name())
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "Error {{ category: {}, id: {} }}",
            self.category.name(),
            self.id
        );
    }
}
