/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Shared fixtures for unit tests across the crate.

use crate::domain::{
    ClockTime, DailySlot, LessonTemplate, ProblemSpec, Resource, TermSpec,
};

pub(crate) fn hm(hour: u16, minute: u16) -> ClockTime {
    ClockTime::from_hm(hour, minute).unwrap()
}

/// Three 45-minute periods starting at 08:00, 09:00 and 10:00.
pub(crate) fn three_slot_day() -> Vec<DailySlot> {
    (0..3)
        .map(|i| DailySlot::new(hm(8 + i, 0), hm(8 + i, 45)))
        .collect()
}

/// One day with three slots, teacher T1, group G1, room R1 and two
/// single-slot MATH sessions.
pub(crate) fn base_spec() -> ProblemSpec {
    ProblemSpec {
        term: TermSpec::uniform(["Monday"], three_slot_day()),
        resources: vec![
            Resource::teacher("T1").with_name("Ms. Smith"),
            Resource::group("G1").with_name("7A"),
            Resource::classroom("R1").with_name("Room 101"),
        ],
        lesson_templates: vec![LessonTemplate::new("MATH", "Mathematics", "T1", "G1").sessions(2)],
        constraints: Vec::new(),
    }
}

/// `days` uniform days of `slots` one-hour periods from 08:00.
pub(crate) fn grid(days: &[&str], slots: u16) -> TermSpec {
    let daily = (0..slots)
        .map(|i| DailySlot::new(hm(8 + i, 0), hm(8 + i, 50)))
        .collect();
    TermSpec::uniform(days.iter().copied(), daily)
}
