/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error type for malformed or inconsistent solve input.
//!
//! A [`ModelError`] is raised before any search work begins and is never
//! retried: the caller must fix the request.  At the process boundary every
//! variant maps to the `model_error` response status.
//!
//! Every variant carries the offending ids/values so the message can be shown
//! to the person editing the timetable without further parsing.

use thiserror::Error;

use crate::domain::ResourceKind;

/// Why a request could not be turned into a solver model.
///
/// | Group | Variants |
/// |---|---|
/// | Request shape | `InvalidRequest`, `InvalidTimeBudget` |
/// | Term | `EmptyTerm`, `EmptyDay`, `UnnamedDay`, `DuplicateDay`, `InvalidSlot`, `OverlappingSlots` |
/// | Entities | `DuplicateResource`, `DuplicateTemplate`, `NoLessonTemplates`, `NoClassrooms` |
/// | References | `UnknownResource`, `WrongResourceKind`, `UnknownTemplate`, `UnknownOccurrence`, `UnknownDay`, `UnknownSlot` |
/// | Templates | `InvalidSessionCount`, `InvalidSessionLength`, `SessionTooLong` |
/// | Constraints | `InvalidConstraint`, `DuplicateFixedAssignment` |
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The request body is not a well-formed solve request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// `timeBudgetSeconds` is zero, negative or not finite.
    #[error("time budget must be a positive number of seconds, got {value}")]
    InvalidTimeBudget { value: f64 },

    #[error("term has no school days")]
    EmptyTerm,

    #[error("day '{day}' has no time slots")]
    EmptyDay { day: String },

    /// Day at `index` has an empty or blank name.
    #[error("day {index} has no name")]
    UnnamedDay { index: usize },

    #[error("day '{day}' is listed more than once")]
    DuplicateDay { day: String },

    /// A slot whose end is not after its start.
    #[error("slot {slot} on '{day}' does not end after it starts ({start} - {end})")]
    InvalidSlot {
        day: String,
        slot: usize,
        start: String,
        end: String,
    },

    /// A slot starting before the previous slot of the same day ended.
    #[error("slot {slot} on '{day}' overlaps the previous slot or is out of order")]
    OverlappingSlots { day: String, slot: usize },

    #[error("resource id '{id}' is used more than once")]
    DuplicateResource { id: String },

    #[error("lesson template id '{id}' is used more than once")]
    DuplicateTemplate { id: String },

    #[error("no lesson templates provided, nothing to schedule")]
    NoLessonTemplates,

    #[error("no classroom resources provided, every lesson needs a room")]
    NoClassrooms,

    #[error("{referrer} references unknown resource '{id}'")]
    UnknownResource { referrer: String, id: String },

    #[error("{referrer} references '{id}' as a {expected}, but it is a {found}")]
    WrongResourceKind {
        referrer: String,
        id: String,
        expected: ResourceKind,
        found: ResourceKind,
    },

    #[error("{referrer} references unknown lesson template '{id}'")]
    UnknownTemplate { referrer: String, id: String },

    #[error("fixed assignment references unknown lesson occurrence '{id}'")]
    UnknownOccurrence { id: String },

    #[error("{referrer} references unknown day '{day}'")]
    UnknownDay { referrer: String, day: String },

    #[error("{referrer} references slot {slot} on '{day}', which does not exist")]
    UnknownSlot {
        referrer: String,
        day: String,
        slot: usize,
    },

    #[error("lesson template '{template}' must have at least one session per week")]
    InvalidSessionCount { template: String },

    #[error("lesson template '{template}' must have a session length of at least one slot")]
    InvalidSessionLength { template: String },

    /// The session block is longer than every day of the term.
    #[error("lesson template '{template}' needs {length} consecutive slots but the longest day has {longest_day}")]
    SessionTooLong {
        template: String,
        length: u32,
        longest_day: usize,
    },

    /// A constraint with out-of-range parameters (e.g. `max = 0`).
    #[error("invalid {kind} constraint: {reason}")]
    InvalidConstraint { kind: &'static str, reason: String },

    #[error("lesson occurrence '{occurrence}' is pinned more than once")]
    DuplicateFixedAssignment { occurrence: String },
}
