/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Constraint compiler: validated [`Problem`] → solver-ready [`Model`].
//!
//! ```text
//! ProblemSpec ──build_problem──► Problem ──compile──► Model ──► solver
//!      │                            │                   │
//!      └─ ModelError (fail fast)    └─ immutable        └─ domains, limits, soft terms
//! ```
//!
//! # What the model holds
//!
//! | Part | Source constraints |
//! |---|---|
//! | `variables[i].domain` | term grid, availability, `fixedAssignment`, `startWindow`, room type / allowed rooms |
//! | `variables[i].buffer` | `bufferAfter` |
//! | `Candidate::cost` | `preferredTimeOfDay` |
//! | `neighbours` | implicit `noResourceDoubleBooking` |
//! | `day_limits` | `maxSessionsPerDay` |
//! | `run_limits` | hard `maxConsecutiveSlots` |
//! | `idle_limits` | `maxIdleSlots` |
//! | `break_windows` | `breakWindow` |
//! | `soft_terms` | `minimumGapBetweenSessions`, `spreadAcrossDays`, soft `maxConsecutiveSlots` |
//!
//! Variable `i` always corresponds to `problem.occurrences()[i]`.  The
//! compiler never searches; it only enumerates.

pub mod error;
#[cfg(test)]
pub(crate) mod testing;
mod validate;

pub use error::ModelError;
pub use validate::build_problem;

use tracing::debug;

use crate::domain::{Constraint, Problem, ResourceKind, Strength};

// ── Options ───────────────────────────────────────────────────────────────────

/// Knobs that change how constraints compile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Strength of a `maxConsecutiveSlots` constraint without a `hard` flag.
    pub max_consecutive_hard: bool,
}

// ── Model types ───────────────────────────────────────────────────────────────

/// One placement option for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub day: usize,
    /// Slot index within `day` of the block's first slot.
    pub start: usize,
    /// Resource position of the room.
    pub room: usize,
    /// Unary soft cost of choosing this candidate.
    pub cost: u64,
}

/// One lesson occurrence as the solver sees it.
#[derive(Debug, Clone)]
pub(crate) struct Variable {
    pub(crate) teacher: usize,
    pub(crate) group: usize,
    pub(crate) length: usize,
    /// Slots after the session that teacher and group must keep free.
    pub(crate) buffer: usize,
    /// Ordered by day, start, room.
    pub(crate) domain: Vec<Candidate>,
    pub(crate) min_cost: u64,
}

/// Free run a resource keeps inside `from..=to` on every day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BreakWindow {
    pub(crate) from: usize,
    pub(crate) to: usize,
    pub(crate) length: usize,
}

/// Soft penalty terms that involve more than one candidate choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SoftTerm {
    /// `weight` per same-day pair with fewer than `min_gap` free slots between.
    MinimumGap {
        vars: Vec<usize>,
        min_gap: usize,
        weight: u64,
    },
    /// `weight` per pair sharing a day.
    SpreadAcrossDays { vars: Vec<usize>, weight: u64 },
    /// `weight × (run − max)` per maximal run of occupied slots on a day.
    MaxConsecutive {
        resource: usize,
        max: usize,
        weight: u64,
    },
}

/// Why a `(day, start)` block was left out of a variable's domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RejectReason {
    PinnedElsewhere,
    TeacherUnavailable,
    GroupUnavailable,
    OutsideStartWindow,
    NoMatchingRoom,
    RoomsUnavailable,
}

/// Per-variable account of domain construction.
///
/// Every block that fits in its day is counted exactly once: either in the
/// first reason that rejected it or in `accepted_blocks`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainReport {
    pub pinned: bool,
    pub blocks: usize,
    pub pinned_elsewhere: usize,
    pub teacher_unavailable: usize,
    pub group_unavailable: usize,
    pub outside_start_window: usize,
    pub no_matching_room: usize,
    pub rooms_unavailable: usize,
    pub accepted_blocks: usize,
    pub candidates: usize,
}

impl DomainReport {
    /// Reason that rejected the most blocks.
    ///
    /// For a pinned occurrence the rejection of the pinned block wins, since
    /// every other block is trivially "pinned elsewhere".
    pub fn dominant(&self) -> Option<RejectReason> {
        if self.candidates > 0 {
            return None;
        }
        let counts = [
            (RejectReason::TeacherUnavailable, self.teacher_unavailable),
            (RejectReason::GroupUnavailable, self.group_unavailable),
            (RejectReason::OutsideStartWindow, self.outside_start_window),
            (RejectReason::NoMatchingRoom, self.no_matching_room),
            (RejectReason::RoomsUnavailable, self.rooms_unavailable),
        ];
        // Ties keep the earlier reason.
        let best = counts
            .iter()
            .fold(None, |best: Option<(RejectReason, usize)>, &(r, n)| match best {
                Some((_, m)) if m >= n => best,
                _ if n > 0 => Some((r, n)),
                _ => best,
            })
            .map(|(r, _)| r);
        match best {
            Some(r) => Some(r),
            None if self.pinned => Some(RejectReason::PinnedElsewhere),
            None => None,
        }
    }
}

/// Solver-ready form of one problem.
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) day_lengths: Vec<usize>,
    pub(crate) day_offsets: Vec<usize>,
    pub(crate) total_slots: usize,
    pub(crate) resource_count: usize,
    pub(crate) variables: Vec<Variable>,
    /// Variables that can conflict on a resource, ascending, excluding self.
    pub(crate) neighbours: Vec<Vec<usize>>,
    /// Hard sessions-per-day cap per resource.
    pub(crate) day_limits: Vec<Option<u32>>,
    /// Hard consecutive-slot cap per resource.
    pub(crate) run_limits: Vec<Option<usize>>,
    /// Hard cap on free slots between same-day sessions per resource.
    pub(crate) idle_limits: Vec<Option<usize>>,
    pub(crate) break_windows: Vec<Vec<BreakWindow>>,
    pub(crate) soft_terms: Vec<SoftTerm>,
    /// Pair terms (`MinimumGap`, `SpreadAcrossDays`) per variable.
    pub(crate) var_terms: Vec<Vec<usize>>,
    /// `MaxConsecutive` terms per resource.
    pub(crate) resource_terms: Vec<Vec<usize>>,
    pub(crate) reports: Vec<DomainReport>,
}

impl Model {
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn domain_size(&self, var: usize) -> usize {
        self.variables[var].domain.len()
    }

    /// Sum of all domain sizes.
    pub fn total_candidates(&self) -> usize {
        self.variables.iter().map(|v| v.domain.len()).sum()
    }

    pub fn soft_term_count(&self) -> usize {
        self.soft_terms.len()
    }

    /// Candidate `choice` of variable `var`.
    pub fn candidate(&self, var: usize, choice: usize) -> &Candidate {
        &self.variables[var].domain[choice]
    }

    /// Slots per session of variable `var`.
    pub fn session_length(&self, var: usize) -> usize {
        self.variables[var].length
    }

    /// Objective lower bound before any choice: sum of cheapest unary costs.
    pub fn root_lower_bound(&self) -> u64 {
        self.variables.iter().map(|v| v.min_cost).sum()
    }

    pub fn report(&self, var: usize) -> &DomainReport {
        &self.reports[var]
    }

    /// First variable with no candidates; such a model is infeasible.
    pub fn first_empty_domain(&self) -> Option<usize> {
        self.variables.iter().position(|v| v.domain.is_empty())
    }

    pub(crate) fn flat(&self, day: usize, slot: usize) -> usize {
        self.day_offsets[day] + slot
    }
}

// ── Compilation ───────────────────────────────────────────────────────────────

/// Expand `problem` into a [`Model`].  Deterministic for identical input.
pub fn compile(problem: &Problem, options: &CompileOptions) -> Model {
    let term = problem.term();
    let day_lengths: Vec<usize> = (0..term.day_count()).map(|d| term.slot_count(d)).collect();
    let resource_count = problem.resources().len();

    let classrooms: Vec<usize> = problem
        .resources()
        .iter()
        .enumerate()
        .filter(|(_, r)| r.kind == ResourceKind::Classroom)
        .map(|(i, _)| i)
        .collect();

    let mut start_windows: Vec<Option<(usize, usize)>> = vec![None; resource_count];
    for c in problem.constraints() {
        if let Constraint::StartWindow {
            resource,
            earliest_slot,
            latest_slot,
        } = c
        {
            if let Some(r) = problem.resource_position(resource) {
                let (lo, hi) = (earliest_slot.unwrap_or(0), latest_slot.unwrap_or(usize::MAX));
                start_windows[r] = Some(match start_windows[r] {
                    Some((a, b)) => (a.max(lo), b.min(hi)),
                    None => (lo, hi),
                });
            }
        }
    }
    let outside_window =
        |r: usize, start: usize| start_windows[r].is_some_and(|(lo, hi)| start < lo || start > hi);

    let mut variables = Vec::with_capacity(problem.occurrences().len());
    let mut reports = Vec::with_capacity(problem.occurrences().len());
    let mut room_sets: Vec<Vec<usize>> = Vec::with_capacity(problem.occurrences().len());

    for occ in problem.occurrences() {
        let template = problem.template_of(occ);
        let teacher = problem.teacher_of(template);
        let group = problem.group_of(template);
        let length = template.session_length as usize;

        let pin = problem.constraints().iter().find_map(|c| match c {
            Constraint::FixedAssignment {
                occurrence,
                day,
                slot,
                room,
            } if *occurrence == occ.id => Some((
                term.day_index(day),
                *slot,
                room.as_deref().and_then(|r| problem.resource_position(r)),
            )),
            _ => None,
        });

        let rooms: Vec<usize> = classrooms
            .iter()
            .copied()
            .filter(|&r| {
                let res = &problem.resources()[r];
                res.matches_room_type(template.required_room_type.as_deref())
                    && (template.allowed_rooms.is_empty()
                        || template.allowed_rooms.iter().any(|a| *a == res.id))
                    && pin.map_or(true, |(_, _, pinned_room)| {
                        pinned_room.map_or(true, |p| p == r)
                    })
            })
            .collect();

        let preferences: Vec<(usize, usize, u64)> = problem
            .constraints()
            .iter()
            .filter_map(|c| match c {
                Constraint::PreferredTimeOfDay {
                    template: t,
                    from_slot,
                    to_slot,
                    weight,
                } if *t == template.id => Some((*from_slot, *to_slot, u64::from(*weight))),
                _ => None,
            })
            .collect();

        let buffer = problem
            .constraints()
            .iter()
            .filter_map(|c| match c {
                Constraint::BufferAfter { template: t, slots } if *t == template.id => {
                    Some(*slots as usize)
                }
                _ => None,
            })
            .max()
            .unwrap_or(0);

        let mut report = DomainReport {
            pinned: pin.is_some(),
            ..DomainReport::default()
        };
        let mut domain = Vec::new();

        for (day, &day_len) in day_lengths.iter().enumerate() {
            if length > day_len {
                continue;
            }
            for start in 0..=(day_len - length) {
                report.blocks += 1;
                let flat = term.flat_index(day, start);

                if let Some((pin_day, pin_slot, _)) = pin {
                    if pin_day != Some(day) || pin_slot != start {
                        report.pinned_elsewhere += 1;
                        continue;
                    }
                }
                if !problem.availability(teacher).contains_block(flat, length) {
                    report.teacher_unavailable += 1;
                    continue;
                }
                if !problem.availability(group).contains_block(flat, length) {
                    report.group_unavailable += 1;
                    continue;
                }
                if outside_window(teacher, start) || outside_window(group, start) {
                    report.outside_start_window += 1;
                    continue;
                }
                if rooms.is_empty() {
                    report.no_matching_room += 1;
                    continue;
                }

                let cost: u64 = preferences
                    .iter()
                    .filter(|(from, to, _)| start < *from || start + length - 1 > *to)
                    .map(|(_, _, w)| *w)
                    .sum();

                let before = domain.len();
                for &room in &rooms {
                    if problem.availability(room).contains_block(flat, length) {
                        domain.push(Candidate {
                            day,
                            start,
                            room,
                            cost,
                        });
                    }
                }
                if domain.len() == before {
                    report.rooms_unavailable += 1;
                } else {
                    report.accepted_blocks += 1;
                }
            }
        }

        report.candidates = domain.len();
        let min_cost = domain.iter().map(|c| c.cost).min().unwrap_or(0);

        debug!(
            occurrence = %occ.id,
            candidates = domain.len(),
            rooms = rooms.len(),
            min_cost,
            "domain built"
        );

        room_sets.push(rooms);
        reports.push(report);
        variables.push(Variable {
            teacher,
            group,
            length,
            buffer,
            domain,
            min_cost,
        });
    }

    let neighbours = build_neighbours(&variables, &room_sets);

    // ── Resource limits and soft terms ────────────────────────────────────────
    let mut day_limits: Vec<Option<u32>> = vec![None; resource_count];
    let mut run_limits: Vec<Option<usize>> = vec![None; resource_count];
    let mut idle_limits: Vec<Option<usize>> = vec![None; resource_count];
    let mut break_windows: Vec<Vec<BreakWindow>> = vec![Vec::new(); resource_count];
    let mut soft_terms = Vec::new();

    let template_vars = |template_id: &str| -> Vec<usize> {
        problem
            .occurrences()
            .iter()
            .enumerate()
            .filter(|(_, o)| problem.templates()[o.template].id == template_id)
            .map(|(i, _)| i)
            .collect()
    };

    for c in problem.constraints() {
        match c {
            Constraint::MaxSessionsPerDay { resource, max } => {
                if let Some(r) = problem.resource_position(resource) {
                    tighten(&mut day_limits[r], *max);
                }
            }
            Constraint::MaxConsecutiveSlots {
                resource,
                max,
                weight,
                ..
            } => {
                let Some(r) = problem.resource_position(resource) else {
                    continue;
                };
                match c.strength(options.max_consecutive_hard) {
                    Strength::Hard => tighten(&mut run_limits[r], *max as usize),
                    Strength::Soft if *weight > 0 => soft_terms.push(SoftTerm::MaxConsecutive {
                        resource: r,
                        max: *max as usize,
                        weight: u64::from(*weight),
                    }),
                    Strength::Soft => {}
                }
            }
            Constraint::MinimumGapBetweenSessions {
                template,
                min_gap_slots,
                weight,
            } => {
                let vars = template_vars(template);
                if vars.len() >= 2 && *min_gap_slots > 0 && *weight > 0 {
                    soft_terms.push(SoftTerm::MinimumGap {
                        vars,
                        min_gap: *min_gap_slots as usize,
                        weight: u64::from(*weight),
                    });
                }
            }
            Constraint::SpreadAcrossDays { template, weight } => {
                let vars = template_vars(template);
                if vars.len() >= 2 && *weight > 0 {
                    soft_terms.push(SoftTerm::SpreadAcrossDays {
                        vars,
                        weight: u64::from(*weight),
                    });
                }
            }
            Constraint::MaxIdleSlots { resource, max } => {
                if let Some(r) = problem.resource_position(resource) {
                    tighten(&mut idle_limits[r], *max as usize);
                }
            }
            Constraint::BreakWindow {
                resource,
                from_slot,
                to_slot,
                length,
            } => {
                if let Some(r) = problem.resource_position(resource) {
                    break_windows[r].push(BreakWindow {
                        from: *from_slot,
                        to: *to_slot,
                        length: *length as usize,
                    });
                }
            }
            // Folded into domains, costs and buffers above.
            Constraint::NoResourceDoubleBooking { .. }
            | Constraint::AvailabilityWindow { .. }
            | Constraint::PreferredTimeOfDay { .. }
            | Constraint::FixedAssignment { .. }
            | Constraint::StartWindow { .. }
            | Constraint::BufferAfter { .. } => {}
        }
    }

    let mut var_terms = vec![Vec::new(); variables.len()];
    let mut resource_terms = vec![Vec::new(); resource_count];
    for (idx, term) in soft_terms.iter().enumerate() {
        match term {
            SoftTerm::MinimumGap { vars, .. } | SoftTerm::SpreadAcrossDays { vars, .. } => {
                for &v in vars {
                    var_terms[v].push(idx);
                }
            }
            SoftTerm::MaxConsecutive { resource, .. } => resource_terms[*resource].push(idx),
        }
    }

    let model = Model {
        day_lengths,
        day_offsets: term.day_offsets().to_vec(),
        total_slots: term.total_slots(),
        resource_count,
        variables,
        neighbours,
        day_limits,
        run_limits,
        idle_limits,
        break_windows,
        soft_terms,
        var_terms,
        resource_terms,
        reports,
    };

    debug!(
        variables = model.variable_count(),
        candidates = model.total_candidates(),
        soft_terms = model.soft_term_count(),
        root_bound = model.root_lower_bound(),
        "model compiled"
    );
    model
}

fn tighten<T: Ord + Copy>(slot: &mut Option<T>, value: T) {
    *slot = Some(slot.map_or(value, |cur| cur.min(value)));
}

/// Two variables are neighbours when they share a teacher, a group or any
/// candidate room.
fn build_neighbours(variables: &[Variable], room_sets: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let n = variables.len();
    let mut neighbours = vec![Vec::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (&variables[i], &variables[j]);
            let shared = a.teacher == b.teacher
                || a.group == b.group
                || room_sets[i].iter().any(|r| room_sets[j].contains(r));
            if shared {
                neighbours[i].push(j);
                neighbours[j].push(i);
            }
        }
    }
    neighbours
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::testing::{base_spec, grid};
    use super::*;
    use crate::domain::{LessonTemplate, Resource, SlotRef};

    fn compiled(spec: crate::domain::ProblemSpec) -> Model {
        let problem = build_problem(spec).unwrap();
        compile(&problem, &CompileOptions::default())
    }

    #[test]
    fn domain_enumerates_day_start_room_in_order() {
        let mut spec = base_spec();
        spec.resources.push(Resource::classroom("R2"));
        let model = compiled(spec);

        assert_eq!(model.variable_count(), 2);
        assert_eq!(model.domain_size(0), 6);
        let order: Vec<(usize, usize)> = (0..6)
            .map(|c| {
                let cand = model.candidate(0, c);
                (cand.start, cand.room)
            })
            .collect();
        // Resources sort as G1, R1, R2, T1.
        assert_eq!(order, vec![(0, 1), (0, 2), (1, 1), (1, 2), (2, 1), (2, 2)]);
        assert_eq!(model.neighbours[0], vec![1]);
    }

    #[test]
    fn long_sessions_only_start_where_they_fit() {
        let mut spec = base_spec();
        spec.lesson_templates[0] = LessonTemplate::new("MATH", "Math", "T1", "G1").length(2);
        let model = compiled(spec);

        let starts: Vec<usize> = (0..model.domain_size(0))
            .map(|c| model.candidate(0, c).start)
            .collect();
        assert_eq!(starts, vec![0, 1]);
        assert_eq!(model.session_length(0), 2);
    }

    #[test]
    fn unavailable_teacher_removes_blocks_and_is_reported() {
        let mut spec = base_spec();
        spec.resources[0] =
            Resource::teacher("T1").with_availability(vec![SlotRef::at("Monday", 2)]);
        let model = compiled(spec);

        assert_eq!(model.domain_size(0), 1);
        assert_eq!(model.candidate(0, 0).start, 2);
        let report = model.report(0);
        assert_eq!(report.blocks, 3);
        assert_eq!(report.teacher_unavailable, 2);
        assert_eq!(report.dominant(), None);
    }

    #[test]
    fn room_type_without_match_empties_domain() {
        let mut spec = base_spec();
        spec.lesson_templates[0] = LessonTemplate::new("MATH", "Math", "T1", "G1").room_type("lab");
        let model = compiled(spec);

        assert_eq!(model.first_empty_domain(), Some(0));
        assert_eq!(model.report(0).dominant(), Some(RejectReason::NoMatchingRoom));
    }

    #[test]
    fn allowed_rooms_restrict_candidates() {
        let mut spec = base_spec();
        spec.resources.push(Resource::classroom("R2").with_room_type("lab"));
        spec.lesson_templates[0] = LessonTemplate::new("MATH", "Math", "T1", "G1").rooms(["R2"]);
        let model = compiled(spec);

        let r2 = 2;
        assert!((0..model.domain_size(0)).all(|c| model.candidate(0, c).room == r2));
    }

    #[test]
    fn pinned_occurrence_has_single_block() {
        let mut spec = base_spec();
        spec.constraints = vec![Constraint::FixedAssignment {
            occurrence: "MATH#2".into(),
            day: "monday".into(),
            slot: 1,
            room: Some("R1".into()),
        }];
        let model = compiled(spec);

        assert_eq!(model.domain_size(0), 3);
        assert_eq!(model.domain_size(1), 1);
        assert_eq!(model.candidate(1, 0).start, 1);
        assert_eq!(model.report(1).pinned_elsewhere, 2);
    }

    #[test]
    fn pin_on_unavailable_slot_reports_the_pinned_block() {
        let mut spec = base_spec();
        spec.resources[0] =
            Resource::teacher("T1").with_availability(vec![SlotRef::at("Monday", 0)]);
        spec.constraints = vec![Constraint::FixedAssignment {
            occurrence: "MATH#1".into(),
            day: "Monday".into(),
            slot: 2,
            room: None,
        }];
        let model = compiled(spec);

        assert_eq!(model.domain_size(0), 0);
        assert_eq!(model.report(0).dominant(), Some(RejectReason::TeacherUnavailable));
    }

    #[test]
    fn preferred_time_sets_unary_costs_and_root_bound() {
        let mut spec = base_spec();
        spec.constraints = vec![Constraint::PreferredTimeOfDay {
            template: "MATH".into(),
            from_slot: 0,
            to_slot: 0,
            weight: 3,
        }];
        let model = compiled(spec);

        let costs: Vec<u64> = (0..3).map(|c| model.candidate(0, c).cost).collect();
        assert_eq!(costs, vec![0, 3, 3]);
        assert_eq!(model.root_lower_bound(), 0);
    }

    #[test]
    fn limits_and_soft_terms_are_compiled() {
        let mut spec = base_spec();
        spec.term = grid(&["Mon", "Tue"], 4);
        spec.constraints = vec![
            Constraint::MaxSessionsPerDay {
                resource: "G1".into(),
                max: 3,
            },
            Constraint::MaxSessionsPerDay {
                resource: "G1".into(),
                max: 2,
            },
            Constraint::MaxConsecutiveSlots {
                resource: "T1".into(),
                max: 2,
                hard: Some(true),
                weight: 1,
            },
            Constraint::MaxConsecutiveSlots {
                resource: "G1".into(),
                max: 1,
                hard: None,
                weight: 4,
            },
            Constraint::SpreadAcrossDays {
                template: "MATH".into(),
                weight: 2,
            },
        ];
        let model = compiled(spec);

        // Sorted resources: G1, R1, T1.
        assert_eq!(model.day_limits[0], Some(2));
        assert_eq!(model.run_limits[2], Some(2));
        assert_eq!(model.soft_term_count(), 2);
        assert_eq!(model.resource_terms[0], vec![0]);
        assert_eq!(model.var_terms[0], vec![1]);
        assert_eq!(model.var_terms[1], vec![1]);
    }

    #[test]
    fn start_windows_of_teacher_and_group_intersect() {
        let mut spec = base_spec();
        spec.term = grid(&["Mon"], 6);
        spec.constraints = vec![
            Constraint::StartWindow {
                resource: "T1".into(),
                earliest_slot: Some(1),
                latest_slot: None,
            },
            Constraint::StartWindow {
                resource: "G1".into(),
                earliest_slot: None,
                latest_slot: Some(3),
            },
            Constraint::StartWindow {
                resource: "G1".into(),
                earliest_slot: Some(2),
                latest_slot: Some(4),
            },
        ];
        let model = compiled(spec);

        let starts: Vec<usize> = (0..model.domain_size(0))
            .map(|c| model.candidate(0, c).start)
            .collect();
        assert_eq!(starts, vec![2, 3]);
        assert_eq!(model.report(0).outside_start_window, 4);
    }

    #[test]
    fn day_shape_rules_compile_to_limits_and_buffers() {
        let mut spec = base_spec();
        spec.lesson_templates.push(LessonTemplate::new("PE", "Sports", "T1", "G1"));
        spec.constraints = vec![
            Constraint::MaxIdleSlots {
                resource: "T1".into(),
                max: 2,
            },
            Constraint::MaxIdleSlots {
                resource: "T1".into(),
                max: 1,
            },
            Constraint::BreakWindow {
                resource: "R1".into(),
                from_slot: 1,
                to_slot: 2,
                length: 1,
            },
            Constraint::BufferAfter {
                template: "PE".into(),
                slots: 1,
            },
        ];
        let model = compiled(spec);

        // Sorted resources: G1, R1, T1.  Variables: MATH#1, MATH#2, PE#1.
        assert_eq!(model.idle_limits[2], Some(1));
        assert_eq!(model.idle_limits[0], None);
        assert_eq!(
            model.break_windows[1],
            vec![BreakWindow {
                from: 1,
                to: 2,
                length: 1
            }]
        );
        assert_eq!(model.variables[0].buffer, 0);
        assert_eq!(model.variables[2].buffer, 1);
    }

    #[test]
    fn max_consecutive_default_strength_comes_from_options() {
        let mut spec = base_spec();
        spec.constraints = vec![Constraint::MaxConsecutiveSlots {
            resource: "T1".into(),
            max: 1,
            hard: None,
            weight: 1,
        }];
        let problem = build_problem(spec).unwrap();

        let hard = compile(
            &problem,
            &CompileOptions {
                max_consecutive_hard: true,
            },
        );
        assert_eq!(hard.run_limits[2], Some(1));
        assert_eq!(hard.soft_term_count(), 0);

        let soft = compile(&problem, &CompileOptions::default());
        assert_eq!(soft.run_limits[2], None);
        assert_eq!(soft.soft_term_count(), 1);
    }

    #[test]
    fn unrelated_lessons_are_not_neighbours() {
        let mut spec = base_spec();
        spec.resources.extend([
            Resource::teacher("T2"),
            Resource::group("G2"),
            Resource::classroom("R2").with_room_type("lab"),
        ]);
        spec.lesson_templates = vec![
            LessonTemplate::new("A", "Art", "T1", "G1").rooms(["R1"]),
            LessonTemplate::new("B", "Biology", "T2", "G2").room_type("lab"),
        ];
        let model = compiled(spec);

        assert!(model.neighbours[0].is_empty());
        assert!(model.neighbours[1].is_empty());
    }
}
