/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Lesson demand: templates and their weekly occurrences.
//!
//! ```text
//! LessonTemplate (sessions_per_week = 3) ──► "MATH-7A#1", "MATH-7A#2", "MATH-7A#3"
//! ```

use serde::{Deserialize, Serialize};

fn default_session_length() -> u32 {
    1
}

/// A required lesson: subject + teacher + group + room need + weekly frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonTemplate {
    pub id: String,
    pub subject: String,
    /// Teacher resource id.
    pub teacher: String,
    /// Student group resource id.
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_room_type: Option<String>,
    /// Restricts candidate rooms to these ids when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_rooms: Vec<String>,
    pub sessions_per_week: u32,
    /// Contiguous slots per session.
    #[serde(default = "default_session_length")]
    pub session_length: u32,
}

impl LessonTemplate {
    /// One single-slot session per week; adjust with the builder methods.
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        teacher: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            teacher: teacher.into(),
            group: group.into(),
            required_room_type: None,
            allowed_rooms: Vec::new(),
            sessions_per_week: 1,
            session_length: 1,
        }
    }

    pub fn sessions(mut self, per_week: u32) -> Self {
        self.sessions_per_week = per_week;
        self
    }

    pub fn length(mut self, slots: u32) -> Self {
        self.session_length = slots;
        self
    }

    pub fn room_type(mut self, room_type: impl Into<String>) -> Self {
        self.required_room_type = Some(room_type.into());
        self
    }

    pub fn rooms<I, S>(mut self, rooms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_rooms = rooms.into_iter().map(Into::into).collect();
        self
    }
}

/// Identifier of the `ordinal`-th (1-based) occurrence of `template_id`.
pub fn occurrence_id(template_id: &str, ordinal: u32) -> String {
    format!("{template_id}#{ordinal}")
}

/// One weekly instance of a [`LessonTemplate`].
///
/// Created by the compiler, never by callers.  `template` indexes the
/// owning [`Problem`](crate::domain::Problem)'s template list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonOccurrence {
    pub id: String,
    pub template: usize,
    /// 1-based position within the template's weekly sessions.
    pub ordinal: u32,
}
