/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Mutable search state shared by both backends.
//!
//! [`Occupancy`] tracks which `(resource, slot)` cells are taken, how many
//! sessions each resource has per day, and the objective of the current
//! (possibly partial) assignment.  `place` and `remove` are exact inverses,
//! so a backend can walk the search tree without ever recomputing the cost
//! from scratch.
//!
//! Every cost delta is non-negative: adding a session never lowers the
//! objective.  Branch-and-bound relies on this for its bound.
//!
//! Hard checks must never reject a partial assignment that some completion
//! satisfies.  Buffers and break windows only get harder as sessions are
//! added, so they are checked on every placement.  An idle gap can still be
//! filled later, so `maxIdleSlots` is checked only when the last session of
//! the teacher or group is placed.

use crate::compiler::{BreakWindow, Candidate, Model, SoftTerm};

use super::objective::pair_penalty;

pub(crate) struct Occupancy<'m> {
    model: &'m Model,
    /// `resource * total_slots + flat`
    grid: Vec<bool>,
    /// `resource * day_count + day`
    day_counts: Vec<u32>,
    /// Buffer claims per cell, same layout as `grid`.
    reserved: Vec<u32>,
    /// Unassigned variables per teacher or group.
    pending: Vec<u32>,
    choices: Vec<Option<usize>>,
    assigned: usize,
    cost: u64,
}

impl<'m> Occupancy<'m> {
    pub(crate) fn new(model: &'m Model) -> Self {
        let mut pending = vec![0; model.resource_count];
        for v in &model.variables {
            pending[v.teacher] += 1;
            pending[v.group] += 1;
        }
        Self {
            model,
            grid: vec![false; model.resource_count * model.total_slots],
            day_counts: vec![0; model.resource_count * model.day_lengths.len()],
            reserved: vec![0; model.resource_count * model.total_slots],
            pending,
            choices: vec![None; model.variables.len()],
            assigned: 0,
            cost: 0,
        }
    }

    pub(crate) fn model(&self) -> &'m Model {
        self.model
    }

    pub(crate) fn choices(&self) -> &[Option<usize>] {
        &self.choices
    }

    pub(crate) fn choice(&self, var: usize) -> Option<usize> {
        self.choices[var]
    }

    pub(crate) fn cost(&self) -> u64 {
        self.cost
    }

    pub(crate) fn assigned(&self) -> usize {
        self.assigned
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.assigned == self.choices.len()
    }

    fn resources_of(&self, var: usize, cand: &Candidate) -> [usize; 3] {
        let v = &self.model.variables[var];
        [v.teacher, v.group, cand.room]
    }

    fn cell(&self, resource: usize, day: usize, slot: usize) -> usize {
        resource * self.model.total_slots + self.model.flat(day, slot)
    }

    fn occupied(&self, resource: usize, day: usize, slot: usize) -> bool {
        self.grid[self.cell(resource, day, slot)]
    }

    /// Occupied run lengths directly left and right of `[start, start+len)`.
    fn neighbouring_runs(
        &self,
        resource: usize,
        day: usize,
        start: usize,
        len: usize,
    ) -> (usize, usize) {
        let left = (0..start)
            .rev()
            .take_while(|&s| self.occupied(resource, day, s))
            .count();
        let right = (start + len..self.model.day_lengths[day])
            .take_while(|&s| self.occupied(resource, day, s))
            .count();
        (left, right)
    }

    fn busy(&self, resource: usize, day: usize, slot: usize, block: (usize, usize)) -> bool {
        (slot >= block.0 && slot < block.0 + block.1) || self.occupied(resource, day, slot)
    }

    /// `resource` keeps a long enough free run inside `window` on `day`
    /// once `block` (start, length) is occupied too.  A day too short to
    /// hold the break is exempt.
    fn break_kept(
        &self,
        resource: usize,
        day: usize,
        window: &BreakWindow,
        block: (usize, usize),
    ) -> bool {
        let day_len = self.model.day_lengths[day];
        if window.from >= day_len {
            return true;
        }
        let to = window.to.min(day_len - 1);
        if to + 1 - window.from < window.length {
            return true;
        }
        let mut run = 0;
        for s in window.from..=to {
            if self.busy(resource, day, s, block) {
                run = 0;
            } else {
                run += 1;
                if run >= window.length {
                    return true;
                }
            }
        }
        false
    }

    /// No same-day gap of `resource` exceeds `max` free slots once `block`
    /// is occupied on `block_day`.
    fn idle_kept(
        &self,
        resource: usize,
        max: usize,
        block_day: usize,
        block: (usize, usize),
    ) -> bool {
        for (day, &day_len) in self.model.day_lengths.iter().enumerate() {
            let extra = if day == block_day { block } else { (0, 0) };
            let mut last_busy: Option<usize> = None;
            for s in 0..day_len {
                if !self.busy(resource, day, s, extra) {
                    continue;
                }
                if let Some(prev) = last_busy {
                    if s - prev - 1 > max {
                        return false;
                    }
                }
                last_busy = Some(s);
            }
        }
        true
    }

    /// `true` if `choice` for unassigned `var` violates no hard constraint
    /// given the current assignment.
    pub(crate) fn fits(&self, var: usize, choice: usize) -> bool {
        debug_assert!(self.choices[var].is_none());
        let model = self.model;
        let v = &model.variables[var];
        let len = v.length;
        let cand = &v.domain[choice];
        let days = model.day_lengths.len();
        let block = (cand.start, len);
        let end = cand.start + len;

        for r in self.resources_of(var, cand) {
            if (cand.start..end).any(|s| self.occupied(r, cand.day, s)) {
                return false;
            }
            if (cand.start..end).any(|s| self.reserved[self.cell(r, cand.day, s)] > 0) {
                return false;
            }
            if let Some(limit) = model.day_limits[r] {
                if self.day_counts[r * days + cand.day] + 1 > limit {
                    return false;
                }
            }
            if let Some(limit) = model.run_limits[r] {
                let (left, right) = self.neighbouring_runs(r, cand.day, cand.start, len);
                if left + len + right > limit {
                    return false;
                }
            }
            if !model.break_windows[r]
                .iter()
                .all(|w| self.break_kept(r, cand.day, w, block))
            {
                return false;
            }
        }

        let buffer_end = (end + v.buffer).min(model.day_lengths[cand.day]);
        for r in [v.teacher, v.group] {
            if (end..buffer_end).any(|s| self.occupied(r, cand.day, s)) {
                return false;
            }
            if let Some(max) = model.idle_limits[r] {
                if self.pending[r] == 1 && !self.idle_kept(r, max, cand.day, block) {
                    return false;
                }
            }
        }
        true
    }

    /// Objective increase from placing `var` at `choice` on top of the
    /// current assignment.  `var` itself must be unassigned.
    pub(crate) fn delta(&self, var: usize, choice: usize) -> u64 {
        let model = self.model;
        let v = &model.variables[var];
        let cand = &v.domain[choice];
        let mut delta = cand.cost;

        for &t in &model.var_terms[var] {
            let (SoftTerm::MinimumGap { vars, .. } | SoftTerm::SpreadAcrossDays { vars, .. }) =
                &model.soft_terms[t]
            else {
                continue;
            };
            for &p in vars {
                if p == var {
                    continue;
                }
                if let Some(pc) = self.choices[p] {
                    let other = &model.variables[p];
                    delta += pair_penalty(
                        &model.soft_terms[t],
                        cand,
                        v.length,
                        &other.domain[pc],
                        other.length,
                    );
                }
            }
        }

        for r in self.resources_of(var, cand) {
            if model.resource_terms[r].is_empty() {
                continue;
            }
            let (left, right) = self.neighbouring_runs(r, cand.day, cand.start, v.length);
            for &t in &model.resource_terms[r] {
                if let SoftTerm::MaxConsecutive { max, weight, .. } = model.soft_terms[t] {
                    let excess = |run: usize| run.saturating_sub(max) as u64;
                    let merged = excess(left + v.length + right);
                    delta += weight * (merged - excess(left) - excess(right));
                }
            }
        }
        delta
    }

    fn mark(&mut self, var: usize, choice: usize, value: bool) {
        let model = self.model;
        let v = &model.variables[var];
        let len = v.length;
        let cand = v.domain[choice];
        let days = model.day_lengths.len();
        let end = cand.start + len;
        let buffer_end = (end + v.buffer).min(model.day_lengths[cand.day]);
        for r in [v.teacher, v.group] {
            for s in end..buffer_end {
                let cell = self.cell(r, cand.day, s);
                if value {
                    self.reserved[cell] += 1;
                } else {
                    self.reserved[cell] -= 1;
                }
            }
            if value {
                self.pending[r] -= 1;
            } else {
                self.pending[r] += 1;
            }
        }
        for r in self.resources_of(var, &cand) {
            for s in cand.start..cand.start + len {
                let cell = self.cell(r, cand.day, s);
                debug_assert_ne!(self.grid[cell], value);
                self.grid[cell] = value;
            }
            let count = &mut self.day_counts[r * days + cand.day];
            if value {
                *count += 1;
            } else {
                *count -= 1;
            }
        }
    }

    /// Assign `var := choice`; returns the objective increase.
    pub(crate) fn place(&mut self, var: usize, choice: usize) -> u64 {
        debug_assert!(self.choices[var].is_none());
        let delta = self.delta(var, choice);
        self.mark(var, choice, true);
        self.choices[var] = Some(choice);
        self.assigned += 1;
        self.cost += delta;
        delta
    }

    /// Undo the assignment of `var`; returns the objective decrease.
    pub(crate) fn remove(&mut self, var: usize) -> u64 {
        let Some(choice) = self.choices[var] else {
            return 0;
        };
        self.mark(var, choice, false);
        self.choices[var] = None;
        self.assigned -= 1;
        let delta = self.delta(var, choice);
        self.cost -= delta;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::testing::{base_spec, grid};
    use crate::compiler::{build_problem, compile, CompileOptions};
    use crate::domain::{Constraint, LessonTemplate, ProblemSpec};
    use crate::solver::objective::evaluate;

    fn model(spec: ProblemSpec) -> Model {
        compile(&build_problem(spec).unwrap(), &CompileOptions::default())
    }

    fn choice_at(model: &Model, var: usize, start: usize) -> usize {
        (0..model.domain_size(var))
            .find(|&c| model.candidate(var, c).start == start)
            .unwrap()
    }

    #[test]
    fn placed_lesson_blocks_overlapping_neighbour() {
        let model = model(base_spec());
        let mut occ = Occupancy::new(&model);

        occ.place(0, 0);
        assert!(!occ.fits(1, 0));
        assert!(occ.fits(1, 1));

        occ.remove(0);
        assert!(occ.fits(1, 0));
        assert_eq!(occ.assigned(), 0);
    }

    #[test]
    fn day_limit_is_enforced() {
        let mut spec = base_spec();
        spec.constraints = vec![Constraint::MaxSessionsPerDay {
            resource: "G1".into(),
            max: 1,
        }];
        let model = model(spec);
        let mut occ = Occupancy::new(&model);

        occ.place(0, 0);
        assert!(!occ.fits(1, 2));
    }

    #[test]
    fn hard_run_limit_counts_runs_on_both_sides() {
        let mut spec = base_spec();
        spec.lesson_templates[0] = LessonTemplate::new("MATH", "Math", "T1", "G1").sessions(3);
        spec.constraints = vec![Constraint::MaxConsecutiveSlots {
            resource: "T1".into(),
            max: 2,
            hard: Some(true),
            weight: 1,
        }];
        let model = model(spec);
        let mut occ = Occupancy::new(&model);

        occ.place(0, 0);
        occ.place(1, 2);
        // Slot 1 would join both into a run of three.
        assert!(!occ.fits(2, 1));
    }

    #[test]
    fn buffer_keeps_the_following_slots_free() {
        let mut spec = base_spec();
        spec.term = grid(&["Mon"], 4);
        spec.lesson_templates = vec![
            LessonTemplate::new("MATH", "Math", "T1", "G1"),
            LessonTemplate::new("PE", "Sports", "T1", "G1"),
        ];
        spec.constraints = vec![Constraint::BufferAfter {
            template: "PE".into(),
            slots: 1,
        }];
        let model = model(spec);
        // MATH#1 = 0, PE#1 = 1.
        let mut occ = Occupancy::new(&model);

        occ.place(1, choice_at(&model, 1, 0));
        assert!(!occ.fits(0, choice_at(&model, 0, 1)));
        assert!(occ.fits(0, choice_at(&model, 0, 2)));
        occ.remove(1);

        occ.place(0, choice_at(&model, 0, 1));
        assert!(!occ.fits(1, choice_at(&model, 1, 0)));
        assert!(occ.fits(1, choice_at(&model, 1, 2)));
        occ.remove(0);

        // The buffer is cut at the end of the day.
        occ.place(0, choice_at(&model, 0, 0));
        assert!(occ.fits(1, choice_at(&model, 1, 3)));
    }

    #[test]
    fn break_window_keeps_a_free_run() {
        let mut spec = base_spec();
        spec.term = grid(&["Mon"], 4);
        spec.constraints = vec![Constraint::BreakWindow {
            resource: "G1".into(),
            from_slot: 1,
            to_slot: 2,
            length: 1,
        }];
        let model = model(spec);
        let mut occ = Occupancy::new(&model);

        assert!(occ.fits(0, choice_at(&model, 0, 1)));
        occ.place(0, choice_at(&model, 0, 1));
        assert!(!occ.fits(1, choice_at(&model, 1, 2)));
        assert!(occ.fits(1, choice_at(&model, 1, 3)));
        assert!(occ.fits(1, choice_at(&model, 1, 0)));
    }

    #[test]
    fn break_window_longer_than_the_day_does_not_bind() {
        let mut spec = base_spec();
        spec.constraints = vec![Constraint::BreakWindow {
            resource: "T1".into(),
            from_slot: 2,
            to_slot: 5,
            length: 2,
        }];
        let model = model(spec);
        let mut occ = Occupancy::new(&model);

        occ.place(0, choice_at(&model, 0, 2));
        assert!(occ.fits(1, choice_at(&model, 1, 1)));
    }

    #[test]
    fn idle_limit_is_checked_when_the_last_session_is_placed() {
        let mut spec = base_spec();
        spec.term = grid(&["Mon"], 5);
        spec.lesson_templates[0] = LessonTemplate::new("MATH", "Math", "T1", "G1").sessions(3);
        spec.constraints = vec![Constraint::MaxIdleSlots {
            resource: "T1".into(),
            max: 0,
        }];
        let model = model(spec);
        let mut occ = Occupancy::new(&model);

        occ.place(0, choice_at(&model, 0, 0));
        // The gap at slot 1 can still be filled.
        assert!(occ.fits(1, choice_at(&model, 1, 2)));
        occ.place(1, choice_at(&model, 1, 2));
        assert!(occ.fits(2, choice_at(&model, 2, 1)));
        assert!(!occ.fits(2, choice_at(&model, 2, 3)));

        occ.place(2, choice_at(&model, 2, 1));
        occ.remove(0);
        assert!(occ.fits(0, choice_at(&model, 0, 3)));
        assert!(!occ.fits(0, choice_at(&model, 0, 4)));
    }

    #[test]
    fn incremental_cost_matches_full_evaluation() {
        let mut spec = base_spec();
        spec.term = grid(&["Mon", "Tue"], 4);
        spec.lesson_templates[0] = LessonTemplate::new("MATH", "Math", "T1", "G1").sessions(4);
        spec.constraints = vec![
            Constraint::PreferredTimeOfDay {
                template: "MATH".into(),
                from_slot: 0,
                to_slot: 1,
                weight: 2,
            },
            Constraint::MinimumGapBetweenSessions {
                template: "MATH".into(),
                min_gap_slots: 1,
                weight: 3,
            },
            Constraint::SpreadAcrossDays {
                template: "MATH".into(),
                weight: 5,
            },
            Constraint::MaxConsecutiveSlots {
                resource: "G1".into(),
                max: 1,
                hard: Some(false),
                weight: 7,
            },
        ];
        let model = model(spec);
        let mut occ = Occupancy::new(&model);

        // Monday 0,1,2 and Tuesday 3.
        let placements = [(0, 0), (1, 1), (2, 2), (3, 7)];
        for &(var, start) in &placements {
            let c = (0..model.domain_size(var))
                .find(|&c| {
                    let cand = model.candidate(var, c);
                    cand.day * 4 + cand.start == start
                })
                .unwrap();
            occ.place(var, c);
            assert_eq!(occ.cost(), evaluate(&model, occ.choices()));
        }
        assert!(occ.cost() > 0);

        occ.remove(1);
        assert_eq!(occ.cost(), evaluate(&model, occ.choices()));
        occ.remove(0);
        occ.remove(3);
        occ.remove(2);
        assert_eq!(occ.cost(), 0);
    }

    #[test]
    fn soft_run_excess_is_charged_once_per_extra_slot() {
        let mut spec = base_spec();
        spec.lesson_templates[0] = LessonTemplate::new("MATH", "Math", "T1", "G1").sessions(3);
        spec.constraints = vec![Constraint::MaxConsecutiveSlots {
            resource: "T1".into(),
            max: 1,
            hard: Some(false),
            weight: 2,
        }];
        let model = model(spec);
        let mut occ = Occupancy::new(&model);

        occ.place(0, choice_at(&model, 0, 0));
        occ.place(1, choice_at(&model, 1, 2));
        assert_eq!(occ.cost(), 0);
        assert_eq!(occ.place(2, choice_at(&model, 2, 1)), 4);
    }
}
