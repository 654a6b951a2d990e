/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Hard and soft scheduling rules.
//!
//! | Constraint | Strength |
//! |---|---|
//! | `NoResourceDoubleBooking` | hard (implicit for every resource) |
//! | `AvailabilityWindow` | hard |
//! | `MaxConsecutiveSlots` | hard or soft (per constraint, else engine config) |
//! | `PreferredTimeOfDay` | soft |
//! | `MinimumGapBetweenSessions` | soft |
//! | `FixedAssignment` | hard |
//! | `MaxSessionsPerDay` | hard |
//! | `SpreadAcrossDays` | soft |
//! | `StartWindow` | hard |
//! | `MaxIdleSlots` | hard |
//! | `BreakWindow` | hard |
//! | `BufferAfter` | hard |
//!
//! All slot numbers are indices within a day.
//!
//! Constraints reference resources and templates by id; they never own them.

use serde::{Deserialize, Serialize};

use crate::domain::SlotRef;

fn default_weight() -> u32 {
    1
}

/// Whether a rule must hold or only adds a weighted penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    Hard,
    Soft,
}

/// A scheduling rule as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Constraint {
    /// Explicit form of the built-in no-double-booking rule.
    #[serde(rename_all = "camelCase")]
    NoResourceDoubleBooking { resource: String },

    /// The resource may only be used in `allowed_slots`.
    #[serde(rename_all = "camelCase")]
    AvailabilityWindow {
        resource: String,
        allowed_slots: Vec<SlotRef>,
    },

    /// At most `max` back-to-back occupied slots for the resource on a day.
    #[serde(rename_all = "camelCase")]
    MaxConsecutiveSlots {
        resource: String,
        max: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hard: Option<bool>,
        #[serde(default = "default_weight")]
        weight: u32,
    },

    /// Occurrences of `template` should lie within slots `from_slot..=to_slot`.
    #[serde(rename_all = "camelCase")]
    PreferredTimeOfDay {
        template: String,
        from_slot: usize,
        to_slot: usize,
        #[serde(default = "default_weight")]
        weight: u32,
    },

    /// Same-day occurrences of `template` should be at least
    /// `min_gap_slots` free slots apart.
    #[serde(rename_all = "camelCase")]
    MinimumGapBetweenSessions {
        template: String,
        min_gap_slots: u32,
        #[serde(default = "default_weight")]
        weight: u32,
    },

    /// Pin an occurrence to a start slot (and optionally a room).
    #[serde(rename_all = "camelCase")]
    FixedAssignment {
        occurrence: String,
        day: String,
        slot: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room: Option<String>,
    },

    /// At most `max` sessions per day for the resource.
    #[serde(rename_all = "camelCase")]
    MaxSessionsPerDay { resource: String, max: u32 },

    /// Occurrences of `template` should fall on distinct days.
    #[serde(rename_all = "camelCase")]
    SpreadAcrossDays {
        template: String,
        #[serde(default = "default_weight")]
        weight: u32,
    },

    /// Sessions of a teacher or group start no earlier than `earliest_slot`
    /// and no later than `latest_slot`.  A missing bound is open.
    #[serde(rename_all = "camelCase")]
    StartWindow {
        resource: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        earliest_slot: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        latest_slot: Option<usize>,
    },

    /// At most `max` free slots between two consecutive same-day sessions
    /// of a teacher or group.
    #[serde(rename_all = "camelCase")]
    MaxIdleSlots { resource: String, max: u32 },

    /// Every day the resource keeps `length` consecutive free slots inside
    /// `from_slot..=to_slot`, e.g. a lunch break.
    #[serde(rename_all = "camelCase")]
    BreakWindow {
        resource: String,
        from_slot: usize,
        to_slot: usize,
        length: u32,
    },

    /// After each occurrence of `template` its teacher and group stay free
    /// for the next `slots` slots of that day.
    #[serde(rename_all = "camelCase")]
    BufferAfter { template: String, slots: u32 },
}

impl Constraint {
    /// Strength of this rule; `max_consecutive_hard` decides a
    /// `MaxConsecutiveSlots` that does not say.
    pub fn strength(&self, max_consecutive_hard: bool) -> Strength {
        match self {
            Constraint::MaxConsecutiveSlots { hard, .. } => {
                if hard.unwrap_or(max_consecutive_hard) {
                    Strength::Hard
                } else {
                    Strength::Soft
                }
            }
            Constraint::PreferredTimeOfDay { .. }
            | Constraint::MinimumGapBetweenSessions { .. }
            | Constraint::SpreadAcrossDays { .. } => Strength::Soft,
            Constraint::NoResourceDoubleBooking { .. }
            | Constraint::AvailabilityWindow { .. }
            | Constraint::FixedAssignment { .. }
            | Constraint::MaxSessionsPerDay { .. }
            | Constraint::StartWindow { .. }
            | Constraint::MaxIdleSlots { .. }
            | Constraint::BreakWindow { .. }
            | Constraint::BufferAfter { .. } => Strength::Hard,
        }
    }

    /// Wire tag, used in logs and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Constraint::NoResourceDoubleBooking { .. } => "noResourceDoubleBooking",
            Constraint::AvailabilityWindow { .. } => "availabilityWindow",
            Constraint::MaxConsecutiveSlots { .. } => "maxConsecutiveSlots",
            Constraint::PreferredTimeOfDay { .. } => "preferredTimeOfDay",
            Constraint::MinimumGapBetweenSessions { .. } => "minimumGapBetweenSessions",
            Constraint::FixedAssignment { .. } => "fixedAssignment",
            Constraint::MaxSessionsPerDay { .. } => "maxSessionsPerDay",
            Constraint::SpreadAcrossDays { .. } => "spreadAcrossDays",
            Constraint::StartWindow { .. } => "startWindow",
            Constraint::MaxIdleSlots { .. } => "maxIdleSlots",
            Constraint::BreakWindow { .. } => "breakWindow",
            Constraint::BufferAfter { .. } => "bufferAfter",
        }
    }
}
