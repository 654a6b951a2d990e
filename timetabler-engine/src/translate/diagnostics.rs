/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Best-effort explanations for an infeasible timetable.
//!
//! Two independent checks run over the compiled model:
//!
//! 1. **Empty domains**: a lesson with no candidate at all.  The reason that
//!    rejected the most blocks (see
//!    [`DomainReport`](crate::compiler::DomainReport)) becomes the message.
//!    Occurrences of one template share one diagnostic.
//! 2. **Capacity**: a teacher or group whose demanded slots exceed its
//!    available slots, or whose sessions exceed what `maxSessionsPerDay`
//!    allows; the same for the classroom pool as a whole.
//!
//! Both are necessary conditions only.  When neither fires, the conflict
//! lies in the interaction of several constraints and a generic
//! diagnostic is returned.

use std::collections::BTreeSet;

use tracing::debug;

use crate::compiler::{Model, RejectReason};
use crate::contract::{Diagnostic, DiagnosticCategory};
use crate::domain::{Problem, ResourceKind};

/// Explain why `problem` has no timetable.  Never empty.
pub fn explain(problem: &Problem, model: &Model) -> Vec<Diagnostic> {
    let mut out = empty_domains(problem, model);
    out.extend(capacity(problem, model));

    if out.is_empty() {
        out.push(Diagnostic {
            category: DiagnosticCategory::ConflictingConstraints,
            message: "hard constraints conflict with each other; no single lesson or resource \
                      explains it (check availability, fixed assignments, per-day limits, idle limits, \
                      breaks and buffers together)"
                .to_string(),
            lesson: None,
            resource: None,
        });
    }
    debug!(count = out.len(), "infeasibility diagnostics built");
    out
}

// ── Empty domains ─────────────────────────────────────────────────────────────

fn empty_domains(problem: &Problem, model: &Model) -> Vec<Diagnostic> {
    let mut seen: BTreeSet<(usize, RejectReason)> = BTreeSet::new();
    let mut out = Vec::new();

    for (var, occ) in problem.occurrences().iter().enumerate() {
        if model.domain_size(var) > 0 {
            continue;
        }
        let report = model.report(var);
        let Some(reason) = report.dominant() else {
            continue;
        };
        let template = problem.template_of(occ);

        if report.pinned {
            out.push(Diagnostic {
                category: DiagnosticCategory::PinnedSlotUnavailable,
                message: format!(
                    "fixed assignment of {} cannot be honoured: {}",
                    occ.id,
                    pinned_cause(problem, occ.template, reason)
                ),
                lesson: Some(occ.id.clone()),
                resource: None,
            });
            continue;
        }
        if !seen.insert((occ.template, reason)) {
            continue;
        }

        let teacher = &problem.resources()[problem.teacher_of(template)];
        let group = &problem.resources()[problem.group_of(template)];
        let (category, message, resource) = match reason {
            RejectReason::TeacherUnavailable => (
                DiagnosticCategory::TeacherUnavailable,
                format!(
                    "no teacher availability for any session of lesson {} (teacher {})",
                    template.id,
                    teacher.display_name()
                ),
                Some(teacher.id.clone()),
            ),
            RejectReason::GroupUnavailable => (
                DiagnosticCategory::GroupUnavailable,
                format!(
                    "group {} is not available for any session of lesson {}",
                    group.display_name(),
                    template.id
                ),
                Some(group.id.clone()),
            ),
            RejectReason::OutsideStartWindow => (
                DiagnosticCategory::OutsideStartWindow,
                format!(
                    "every free start slot of lesson {} lies outside the start window of \
                     teacher {} or group {}",
                    template.id,
                    teacher.display_name(),
                    group.display_name()
                ),
                None,
            ),
            RejectReason::NoMatchingRoom => (
                DiagnosticCategory::NoMatchingRoom,
                format!("no classroom matches the room requirements of lesson {}", template.id),
                None,
            ),
            RejectReason::RoomsUnavailable | RejectReason::PinnedElsewhere => (
                DiagnosticCategory::RoomUnavailable,
                format!(
                    "no suitable classroom is free for any session of lesson {}",
                    template.id
                ),
                None,
            ),
        };
        out.push(Diagnostic {
            category,
            message,
            lesson: Some(template.id.clone()),
            resource,
        });
    }
    out
}

fn pinned_cause(problem: &Problem, template: usize, reason: RejectReason) -> String {
    let template = &problem.templates()[template];
    match reason {
        RejectReason::TeacherUnavailable => format!(
            "teacher {} is unavailable then",
            problem.resources()[problem.teacher_of(template)].display_name()
        ),
        RejectReason::GroupUnavailable => format!(
            "group {} is unavailable then",
            problem.resources()[problem.group_of(template)].display_name()
        ),
        RejectReason::OutsideStartWindow => {
            "the slot lies outside the start window of its teacher or group".to_string()
        }
        RejectReason::NoMatchingRoom => "the pinned room does not suit the lesson".to_string(),
        RejectReason::RoomsUnavailable => "no suitable classroom is free then".to_string(),
        RejectReason::PinnedElsewhere => format!(
            "a {}-slot session does not fit at that slot",
            template.session_length
        ),
    }
}

// ── Capacity ──────────────────────────────────────────────────────────────────

fn capacity(problem: &Problem, model: &Model) -> Vec<Diagnostic> {
    let term = problem.term();
    let mut out = Vec::new();

    for (idx, res) in problem.resources().iter().enumerate() {
        if res.kind == ResourceKind::Classroom {
            continue;
        }
        let (sessions, demand) = problem
            .occurrences()
            .iter()
            .map(|o| problem.template_of(o))
            .filter(|t| problem.teacher_of(t) == idx || problem.group_of(t) == idx)
            .fold((0usize, 0usize), |(n, d), t| (n + 1, d + t.session_length as usize));
        if sessions == 0 {
            continue;
        }

        let available = problem.availability(idx).count();
        if demand > available {
            out.push(overload(
                res.id.clone(),
                format!(
                    "{} {} needs {demand} slots per week but is available for only {available}",
                    res.kind,
                    res.display_name()
                ),
            ));
            continue;
        }
        if let Some(max) = model.day_limits[idx] {
            let allowed = max as usize * term.day_count();
            if sessions > allowed {
                out.push(overload(
                    res.id.clone(),
                    format!(
                        "{} {} has {sessions} sessions per week but at most {max} per day \
                         allows only {allowed}",
                        res.kind,
                        res.display_name()
                    ),
                ));
            }
        }
    }

    let room_demand: usize = problem
        .occurrences()
        .iter()
        .map(|o| problem.template_of(o).session_length as usize)
        .sum();
    let room_supply: usize = problem
        .resources()
        .iter()
        .enumerate()
        .filter(|(_, r)| r.kind == ResourceKind::Classroom)
        .map(|(i, _)| problem.availability(i).count())
        .sum();
    if room_demand > room_supply {
        out.push(Diagnostic {
            category: DiagnosticCategory::ResourceOverloaded,
            message: format!(
                "lessons need {room_demand} room slots per week but classrooms offer only {room_supply}"
            ),
            lesson: None,
            resource: None,
        });
    }
    out
}

fn overload(resource: String, message: String) -> Diagnostic {
    Diagnostic {
        category: DiagnosticCategory::ResourceOverloaded,
        message,
        lesson: None,
        resource: Some(resource),
    }
}
