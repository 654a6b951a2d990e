/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Validation of a [`ProblemSpec`] into a [`Problem`].
//!
//! Checks run in a fixed order and stop at the first failure; a request
//! either validates completely or produces exactly one [`ModelError`].
//!
//! 1. Term grid (see [`Term::from_spec`]).
//! 2. Unique resource ids, at least one classroom.
//! 3. At least one template, unique template ids, references of the right
//!    kind, positive counts, session length fits the longest day.
//! 4. Availability masks.
//! 5. Every constraint reference and parameter.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::ModelError;
use crate::domain::{
    occurrence_id, Constraint, LessonOccurrence, Problem, ProblemSpec, Resource, ResourceKind,
    SlotMask, Term,
};

/// Validate `spec` and build the immutable [`Problem`].
///
/// # Errors
/// The first [`ModelError`] found; no partial problem is returned.
pub fn build_problem(spec: ProblemSpec) -> Result<Problem, ModelError> {
    let ProblemSpec {
        term,
        mut resources,
        mut lesson_templates,
        constraints,
    } = spec;

    // ── 1. Term ───────────────────────────────────────────────────────────────
    let term = Term::from_spec(&term)?;

    // ── 2. Resources ──────────────────────────────────────────────────────────
    resources.sort_by(|a, b| a.id.cmp(&b.id));
    let mut resource_index = HashMap::with_capacity(resources.len());
    for (pos, r) in resources.iter().enumerate() {
        if resource_index.insert(r.id.clone(), pos).is_some() {
            return Err(ModelError::DuplicateResource { id: r.id.clone() });
        }
    }

    // ── 3. Templates ──────────────────────────────────────────────────────────
    if lesson_templates.is_empty() {
        return Err(ModelError::NoLessonTemplates);
    }
    if !resources.iter().any(|r| r.kind == ResourceKind::Classroom) {
        return Err(ModelError::NoClassrooms);
    }

    lesson_templates.sort_by(|a, b| a.id.cmp(&b.id));
    let mut template_index = HashMap::with_capacity(lesson_templates.len());
    for (pos, t) in lesson_templates.iter().enumerate() {
        if template_index.insert(t.id.clone(), pos).is_some() {
            return Err(ModelError::DuplicateTemplate { id: t.id.clone() });
        }

        let referrer = format!("lesson template '{}'", t.id);
        resolve(&resource_index, &resources, &t.teacher, Some(ResourceKind::Teacher), &referrer)?;
        resolve(&resource_index, &resources, &t.group, Some(ResourceKind::Group), &referrer)?;
        for room in &t.allowed_rooms {
            resolve(&resource_index, &resources, room, Some(ResourceKind::Classroom), &referrer)?;
        }

        if t.sessions_per_week == 0 {
            return Err(ModelError::InvalidSessionCount {
                template: t.id.clone(),
            });
        }
        if t.session_length == 0 {
            return Err(ModelError::InvalidSessionLength {
                template: t.id.clone(),
            });
        }
        if t.session_length as usize > term.longest_day() {
            return Err(ModelError::SessionTooLong {
                template: t.id.clone(),
                length: t.session_length,
                longest_day: term.longest_day(),
            });
        }
    }

    let mut occurrences = Vec::new();
    let mut occurrence_index = HashMap::new();
    for (pos, t) in lesson_templates.iter().enumerate() {
        for ordinal in 1..=t.sessions_per_week {
            let id = occurrence_id(&t.id, ordinal);
            occurrence_index.insert(id.clone(), occurrences.len());
            occurrences.push(LessonOccurrence {
                id,
                template: pos,
                ordinal,
            });
        }
    }

    // ── 4. Availability ───────────────────────────────────────────────────────
    let mut availability = Vec::with_capacity(resources.len());
    for r in &resources {
        let mask = match &r.available {
            None => SlotMask::full(term.total_slots()),
            Some(refs) => term.mask_from_refs(refs, &format!("resource '{}'", r.id))?,
        };
        availability.push(mask);
    }

    // ── 5. Constraints ────────────────────────────────────────────────────────
    let mut pinned: HashSet<&str> = HashSet::new();
    for c in &constraints {
        let kind = c.kind_name();
        let referrer = format!("{kind} constraint");
        match c {
            Constraint::NoResourceDoubleBooking { resource } => {
                resolve(&resource_index, &resources, resource, None, &referrer)?;
            }
            Constraint::AvailabilityWindow {
                resource,
                allowed_slots,
            } => {
                let pos = resolve(&resource_index, &resources, resource, None, &referrer)?;
                let window = term.mask_from_refs(allowed_slots, &referrer)?;
                availability[pos].intersect(&window);
            }
            Constraint::MaxConsecutiveSlots { resource, max, .. }
            | Constraint::MaxSessionsPerDay { resource, max } => {
                resolve(&resource_index, &resources, resource, None, &referrer)?;
                if *max == 0 {
                    return Err(ModelError::InvalidConstraint {
                        kind,
                        reason: format!("max for '{resource}' must be at least 1"),
                    });
                }
            }
            Constraint::PreferredTimeOfDay {
                template,
                from_slot,
                to_slot,
                ..
            } => {
                resolve_template(&template_index, template, &referrer)?;
                if from_slot > to_slot {
                    return Err(ModelError::InvalidConstraint {
                        kind,
                        reason: format!(
                            "fromSlot {from_slot} is after toSlot {to_slot} for '{template}'"
                        ),
                    });
                }
            }
            Constraint::MinimumGapBetweenSessions { template, .. }
            | Constraint::SpreadAcrossDays { template, .. } => {
                resolve_template(&template_index, template, &referrer)?;
            }
            Constraint::StartWindow {
                resource,
                earliest_slot,
                latest_slot,
            } => {
                let pos = resolve(&resource_index, &resources, resource, None, &referrer)?;
                require_person(kind, &resources[pos])?;
                match (earliest_slot, latest_slot) {
                    (None, None) => {
                        return Err(ModelError::InvalidConstraint {
                            kind,
                            reason: format!("window for '{resource}' has neither bound"),
                        });
                    }
                    (Some(from), Some(to)) if from > to => {
                        return Err(ModelError::InvalidConstraint {
                            kind,
                            reason: format!(
                                "earliestSlot {from} is after latestSlot {to} for '{resource}'"
                            ),
                        });
                    }
                    _ => {}
                }
            }
            Constraint::MaxIdleSlots { resource, .. } => {
                let pos = resolve(&resource_index, &resources, resource, None, &referrer)?;
                require_person(kind, &resources[pos])?;
            }
            Constraint::BreakWindow {
                resource,
                from_slot,
                to_slot,
                length,
            } => {
                resolve(&resource_index, &resources, resource, None, &referrer)?;
                if from_slot > to_slot {
                    return Err(ModelError::InvalidConstraint {
                        kind,
                        reason: format!(
                            "fromSlot {from_slot} is after toSlot {to_slot} for '{resource}'"
                        ),
                    });
                }
                let width = to_slot - from_slot + 1;
                if *length == 0 || *length as usize > width {
                    return Err(ModelError::InvalidConstraint {
                        kind,
                        reason: format!(
                            "length {length} for '{resource}' must be between 1 and the \
                             window width {width}"
                        ),
                    });
                }
            }
            Constraint::BufferAfter { template, slots } => {
                resolve_template(&template_index, template, &referrer)?;
                if *slots == 0 {
                    return Err(ModelError::InvalidConstraint {
                        kind,
                        reason: format!("slots for '{template}' must be at least 1"),
                    });
                }
            }
            Constraint::FixedAssignment {
                occurrence,
                day,
                slot,
                room,
            } => {
                if !occurrence_index.contains_key(occurrence) {
                    return Err(ModelError::UnknownOccurrence {
                        id: occurrence.clone(),
                    });
                }
                if !pinned.insert(occurrence.as_str()) {
                    return Err(ModelError::DuplicateFixedAssignment {
                        occurrence: occurrence.clone(),
                    });
                }
                let referrer = format!("fixed assignment of '{occurrence}'");
                let d = term.day_index(day).ok_or_else(|| ModelError::UnknownDay {
                    referrer: referrer.clone(),
                    day: day.clone(),
                })?;
                if *slot >= term.slot_count(d) {
                    return Err(ModelError::UnknownSlot {
                        referrer,
                        day: day.clone(),
                        slot: *slot,
                    });
                }
                if let Some(room) = room {
                    resolve(
                        &resource_index,
                        &resources,
                        room,
                        Some(ResourceKind::Classroom),
                        &referrer,
                    )?;
                }
            }
        }
    }

    debug!(
        days = term.day_count(),
        slots = term.total_slots(),
        resources = resources.len(),
        templates = lesson_templates.len(),
        occurrences = occurrences.len(),
        constraints = constraints.len(),
        "problem validated"
    );

    Ok(Problem {
        term,
        resources,
        templates: lesson_templates,
        occurrences,
        constraints,
        availability,
        resource_index,
        template_index,
        occurrence_index,
    })
}

/// Look up resource `id`, optionally requiring a kind.
fn resolve(
    index: &HashMap<String, usize>,
    resources: &[Resource],
    id: &str,
    expected: Option<ResourceKind>,
    referrer: &str,
) -> Result<usize, ModelError> {
    let pos = *index.get(id).ok_or_else(|| ModelError::UnknownResource {
        referrer: referrer.to_string(),
        id: id.to_string(),
    })?;
    if let Some(expected) = expected {
        let found = resources[pos].kind;
        if found != expected {
            return Err(ModelError::WrongResourceKind {
                referrer: referrer.to_string(),
                id: id.to_string(),
                expected,
                found,
            });
        }
    }
    Ok(pos)
}

/// Day-shape rules bind teachers and groups, never classrooms.
fn require_person(kind: &'static str, resource: &Resource) -> Result<(), ModelError> {
    if resource.kind == ResourceKind::Classroom {
        return Err(ModelError::InvalidConstraint {
            kind,
            reason: format!("'{}' is a classroom, expected a teacher or group", resource.id),
        });
    }
    Ok(())
}

fn resolve_template(
    index: &HashMap<String, usize>,
    id: &str,
    referrer: &str,
) -> Result<usize, ModelError> {
    index
        .get(id)
        .copied()
        .ok_or_else(|| ModelError::UnknownTemplate {
            referrer: referrer.to_string(),
            id: id.to_string(),
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
