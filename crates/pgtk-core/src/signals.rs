//! Input-method signals and the table that routes them to handlers

use std::str::FromStr;

use crate::error::PgtkError;
use crate::session::{Host, ImSession};
use crate::traits::Toolkit;

/// Composition signals emitted by a toolkit input-method context
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImSignal {
    Commit,
    RetrieveSurrounding,
    DeleteSurrounding,
    PreeditChanged,
    PreeditStart,
    PreeditEnd,
}

impl ImSignal {
    pub const ALL: [ImSignal; 6] = [
        ImSignal::Commit,
        ImSignal::RetrieveSurrounding,
        ImSignal::DeleteSurrounding,
        ImSignal::PreeditChanged,
        ImSignal::PreeditStart,
        ImSignal::PreeditEnd,
    ];

    /// Toolkit signal name
    pub fn name(self) -> &'static str {
        match self {
            ImSignal::Commit => "commit",
            ImSignal::RetrieveSurrounding => "retrieve-surrounding",
            ImSignal::DeleteSurrounding => "delete-surrounding",
            ImSignal::PreeditChanged => "preedit-changed",
            ImSignal::PreeditStart => "preedit-start",
            ImSignal::PreeditEnd => "preedit-end",
        }
    }
}

impl FromStr for ImSignal {
    type Err = PgtkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImSignal::ALL
            .into_iter()
            .find(|signal| signal.name() == s)
            .ok_or_else(|| PgtkError::UnknownSignal { name: s.to_string() })
    }
}

impl std::fmt::Display for ImSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One signal emission with its arguments
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImEvent {
    Commit(String),
    RetrieveSurrounding,
    DeleteSurrounding { offset: i32, n_chars: i32 },
    PreeditChanged,
    PreeditStart,
    PreeditEnd,
}

impl ImEvent {
    pub fn signal(&self) -> ImSignal {
        match self {
            ImEvent::Commit(_) => ImSignal::Commit,
            ImEvent::RetrieveSurrounding => ImSignal::RetrieveSurrounding,
            ImEvent::DeleteSurrounding { .. } => ImSignal::DeleteSurrounding,
            ImEvent::PreeditChanged => ImSignal::PreeditChanged,
            ImEvent::PreeditStart => ImSignal::PreeditStart,
            ImEvent::PreeditEnd => ImSignal::PreeditEnd,
        }
    }
}

/// What a handler hands back to the toolkit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalResponse {
    /// Preconditions missing, event dropped
    Ignored,
    /// Handled, signal has no return value
    Done,
    /// Handled, with the boolean the toolkit expects
    Handled(bool),
}

impl SignalResponse {
    pub fn as_bool(self) -> bool {
        matches!(self, SignalResponse::Handled(true))
    }
}

pub type Handler<T> = fn(&mut ImSession<T>, &ImEvent, &mut Host<'_>) -> SignalResponse;

/// Signal → handler table, installed on a session when its context is created
pub struct HandlerTable<T: Toolkit> {
    entries: [(ImSignal, Handler<T>); 6],
}

impl<T: Toolkit> Clone for HandlerTable<T> {
    fn clone(&self) -> Self {
        Self { entries: self.entries }
    }
}

impl<T: Toolkit> HandlerTable<T> {
    pub fn new(entries: [(ImSignal, Handler<T>); 6]) -> Self {
        Self { entries }
    }

    pub fn get(&self, signal: ImSignal) -> Option<Handler<T>> {
        self.entries
            .iter()
            .find(|(s, _)| *s == signal)
            .map(|(_, handler)| *handler)
    }

    pub fn signals(&self) -> Vec<ImSignal> {
        self.entries.iter().map(|(s, _)| *s).collect()
    }
}
