/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Schedulable resources: teachers, student groups and classrooms.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── ResourceKind ──────────────────────────────────────────────────────────────

/// What a [`Resource`] is.
///
/// Every lesson occurrence consumes exactly one resource of each kind for the
/// duration of its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Teacher,
    /// A student group ("class").
    #[serde(alias = "class", alias = "student_group")]
    Group,
    #[serde(alias = "room")]
    Classroom,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Teacher => write!(f, "teacher"),
            ResourceKind::Group => write!(f, "group"),
            ResourceKind::Classroom => write!(f, "classroom"),
        }
    }
}

// ── SlotRef ───────────────────────────────────────────────────────────────────

/// Reference to a term slot by day name and slot index.
///
/// Omitting `slot` refers to every slot of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRef {
    pub day: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<usize>,
}

impl SlotRef {
    pub fn at(day: impl Into<String>, slot: usize) -> Self {
        Self {
            day: day.into(),
            slot: Some(slot),
        }
    }

    pub fn whole_day(day: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            slot: None,
        }
    }
}

// ── Resource ──────────────────────────────────────────────────────────────────

/// A teacher, student group or classroom with a stable identifier.
///
/// `available` lists the slots the resource may be used in; `None` means
/// fully available.  `room_type` only matters for classrooms and is matched
/// against [`LessonTemplate::required_room_type`](crate::domain::LessonTemplate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub kind: ResourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<Vec<SlotRef>>,
}

impl Resource {
    pub fn new(id: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: None,
            room_type: None,
            available: None,
        }
    }

    pub fn teacher(id: impl Into<String>) -> Self {
        Self::new(id, ResourceKind::Teacher)
    }

    pub fn group(id: impl Into<String>) -> Self {
        Self::new(id, ResourceKind::Group)
    }

    pub fn classroom(id: impl Into<String>) -> Self {
        Self::new(id, ResourceKind::Classroom)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_room_type(mut self, room_type: impl Into<String>) -> Self {
        self.room_type = Some(room_type.into());
        self
    }

    pub fn with_availability(mut self, slots: Vec<SlotRef>) -> Self {
        self.available = Some(slots);
        self
    }

    /// Human-facing name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// `true` if this is a classroom whose type matches `required`
    /// (case-insensitive).  `None` matches every classroom.
    pub fn matches_room_type(&self, required: Option<&str>) -> bool {
        if self.kind != ResourceKind::Classroom {
            return false;
        }
        match required {
            None => true,
            Some(req) => self
                .room_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case(req)),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
