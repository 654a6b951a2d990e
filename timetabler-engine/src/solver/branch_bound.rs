/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Depth-first branch-and-bound.
//!
//! ```text
//! select variable ──► order values by (Δcost, index) ──► prune on bound
//!        ▲                                                   │
//!        └──── forward check neighbours ◄──── place ◄────────┘
//! ```
//!
//! Bound: `cost so far + Δ + Σ min unary cost of still unassigned variables`.
//! Every Δ is at least the candidate's unary cost, so the bound never
//! overestimates and pruning with `>= incumbent` keeps optimality.

use tracing::{debug, info, warn};

use super::state::Occupancy;
use super::{Assignment, Deadline, SolveResult, SolverBackend, VariableOrder};
use crate::compiler::Model;

/// Feasibility checks between two deadline polls.
const POLL_INTERVAL: u64 = 1024;

/// Exact backend; proves optimality when the search completes in time.
#[derive(Debug, Clone, Default)]
pub struct BranchAndBound {
    order: VariableOrder,
}

impl BranchAndBound {
    pub fn new(order: VariableOrder) -> Self {
        Self { order }
    }
}

impl SolverBackend for BranchAndBound {
    fn name(&self) -> &'static str {
        "branch_and_bound"
    }

    fn solve(&self, model: &Model, deadline: &Deadline) -> SolveResult {
        if let Some(var) = model.first_empty_domain() {
            info!(variable = var, "empty domain, model infeasible without search");
            return SolveResult::Infeasible;
        }

        let mut search = Search::new(model, deadline, self.order);
        info!(
            variables = model.variable_count(),
            candidates = model.total_candidates(),
            root_bound = search.root_bound,
            order = ?self.order,
            "branch-and-bound started"
        );
        search.dfs();

        info!(
            nodes = search.nodes,
            elapsed_ms = deadline.elapsed().as_millis() as u64,
            timed_out = search.timed_out,
            best = ?search.best.as_ref().map(|(_, c)| *c),
            "branch-and-bound finished"
        );

        match (search.best, search.timed_out && !search.proven) {
            (Some((choices, objective)), false) => SolveResult::Optimal {
                assignment: Assignment { choices },
                objective,
            },
            (Some((choices, objective)), true) => SolveResult::Feasible {
                assignment: Assignment { choices },
                objective,
            },
            (None, true) => {
                warn!(
                    assigned = search.deepest_count,
                    total = model.variable_count(),
                    "deadline reached before a complete timetable was found"
                );
                SolveResult::Unknown {
                    partial: search.deepest.map(|choices| Assignment { choices }),
                }
            }
            (None, false) => SolveResult::Infeasible,
        }
    }
}

// ── Search state ──────────────────────────────────────────────────────────────

struct Search<'m, 'd> {
    model: &'m Model,
    deadline: &'d Deadline,
    order: VariableOrder,
    occ: Occupancy<'m>,
    /// Σ min unary cost over unassigned variables.
    remaining_min: u64,
    root_bound: u64,
    best: Option<(Vec<Option<usize>>, u64)>,
    deepest: Option<Vec<Option<usize>>>,
    deepest_count: usize,
    nodes: u64,
    /// `fits` calls so far; drives deadline polling.
    checks: u64,
    timed_out: bool,
    /// Incumbent matches the root bound; nothing better can exist.
    proven: bool,
}

impl<'m, 'd> Search<'m, 'd> {
    fn new(model: &'m Model, deadline: &'d Deadline, order: VariableOrder) -> Self {
        let root_bound = model.root_lower_bound();
        Self {
            model,
            deadline,
            order,
            occ: Occupancy::new(model),
            remaining_min: root_bound,
            root_bound,
            best: None,
            deepest: None,
            deepest_count: 0,
            nodes: 0,
            checks: 0,
            timed_out: deadline.expired(),
            proven: false,
        }
    }

    fn stopped(&self) -> bool {
        self.timed_out || self.proven
    }

    /// Hard-constraint check that also polls the deadline.
    fn fits(&mut self, var: usize, choice: usize) -> bool {
        self.checks += 1;
        if self.checks % POLL_INTERVAL == 0 && self.deadline.expired() {
            self.timed_out = true;
        }
        self.occ.fits(var, choice)
    }

    fn incumbent_cost(&self) -> Option<u64> {
        self.best.as_ref().map(|(_, c)| *c)
    }

    /// Number of candidates of `var` that fit, cut short on timeout.
    fn support(&mut self, var: usize) -> usize {
        let mut count = 0;
        for c in 0..self.model.variables[var].domain.len() {
            if self.timed_out {
                break;
            }
            if self.fits(var, c) {
                count += 1;
            }
        }
        count
    }

    fn has_support(&mut self, var: usize) -> bool {
        for c in 0..self.model.variables[var].domain.len() {
            if self.timed_out {
                return false;
            }
            if self.fits(var, c) {
                return true;
            }
        }
        false
    }

    /// Next variable to branch on, or `None` when some unassigned variable
    /// has no feasible candidate left or the deadline passed.
    fn select(&mut self) -> Option<usize> {
        let count = self.model.variables.len();
        match self.order {
            VariableOrder::Compiled => (0..count).find(|&v| self.occ.choice(v).is_none()),
            VariableOrder::FirstFail => {
                let mut best: Option<(usize, usize)> = None;
                for v in 0..count {
                    if self.occ.choice(v).is_some() {
                        continue;
                    }
                    let support = self.support(v);
                    if support == 0 || self.timed_out {
                        return None;
                    }
                    if best.map_or(true, |(_, s)| support < s) {
                        best = Some((v, support));
                    }
                }
                best.map(|(v, _)| v)
            }
        }
    }

    /// Unassigned neighbours of `var` still have at least one candidate.
    fn forward_check(&mut self, var: usize) -> bool {
        let model = self.model;
        for &n in &model.neighbours[var] {
            if self.occ.choice(n).is_none() && !self.has_support(n) {
                return false;
            }
        }
        !self.timed_out
    }

    fn record_depth(&mut self) {
        if self.occ.assigned() > self.deepest_count {
            self.deepest_count = self.occ.assigned();
            self.deepest = Some(self.occ.choices().to_vec());
        }
    }

    fn dfs(&mut self) {
        if self.stopped() {
            return;
        }
        if self.occ.is_complete() {
            let cost = self.occ.cost();
            if self.incumbent_cost().map_or(true, |b| cost < b) {
                debug!(objective = cost, nodes = self.nodes, "new incumbent");
                self.best = Some((self.occ.choices().to_vec(), cost));
                self.proven = cost == self.root_bound;
            }
            return;
        }

        let Some(var) = self.select() else {
            return;
        };
        let min_cost = self.model.variables[var].min_cost;

        let mut values: Vec<(u64, usize)> = Vec::new();
        for c in 0..self.model.variables[var].domain.len() {
            if self.fits(var, c) {
                values.push((self.occ.delta(var, c), c));
            }
        }
        if self.timed_out {
            return;
        }
        values.sort_unstable();

        let rest = self.remaining_min - min_cost;
        for (delta, choice) in values {
            if let Some(best) = self.incumbent_cost() {
                if self.occ.cost() + delta + rest >= best {
                    break;
                }
            }

            self.occ.place(var, choice);
            self.remaining_min = rest;
            self.nodes += 1;
            self.record_depth();

            if self.forward_check(var) {
                self.dfs();
            }

            self.occ.remove(var);
            self.remaining_min = rest + min_cost;

            if self.stopped() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::compiler::testing::{base_spec, grid};
    use crate::compiler::{build_problem, compile, CompileOptions};
    use crate::domain::{Constraint, LessonTemplate, ProblemSpec, Resource, SlotRef};
    use crate::solver::objective::evaluate;

    fn model(spec: ProblemSpec) -> Model {
        compile(&build_problem(spec).unwrap(), &CompileOptions::default())
    }

    fn solve(spec: ProblemSpec, order: VariableOrder) -> SolveResult {
        BranchAndBound::new(order).solve(&model(spec), &Deadline::new(Duration::from_secs(10)))
    }

    /// Sixteen lessons for one group in fifteen slots: infeasible, but not
    /// provably so without enumerating every permutation.
    fn pigeonhole() -> ProblemSpec {
        let mut spec = base_spec();
        spec.term = grid(&["Mon", "Tue", "Wed"], 5);
        spec.lesson_templates = vec![LessonTemplate::new("MATH", "Math", "T1", "G1").sessions(16)];
        spec
    }

    #[test]
    fn two_math_lessons_in_three_slots_is_optimal() {
        let result = solve(base_spec(), VariableOrder::Compiled);
        let SolveResult::Optimal {
            assignment,
            objective,
        } = result
        else {
            panic!("expected optimal, got {result:?}");
        };
        assert_eq!(objective, 0);
        assert!(assignment.is_complete());
        assert_ne!(assignment.choices[0], assignment.choices[1]);
    }

    #[test]
    fn perfect_packing_fills_every_slot() {
        let mut spec = base_spec();
        spec.term = grid(&["Mon", "Tue"], 3);
        spec.lesson_templates = vec![LessonTemplate::new("MATH", "Math", "T1", "G1").sessions(6)];
        let m = model(spec);
        let result = BranchAndBound::default().solve(&m, &Deadline::new(Duration::from_secs(10)));

        let SolveResult::Optimal { assignment, .. } = result else {
            panic!("expected optimal, got {result:?}");
        };
        let mut slots: Vec<(usize, usize)> = assignment
            .choices
            .iter()
            .enumerate()
            .map(|(v, c)| {
                let cand = m.candidate(v, c.unwrap());
                (cand.day, cand.start)
            })
            .collect();
        slots.sort();
        slots.dedup();
        assert_eq!(slots.len(), 6);
    }

    #[test]
    fn shared_teacher_with_one_slot_is_infeasible() {
        let mut spec = base_spec();
        spec.resources[0] =
            Resource::teacher("T1").with_availability(vec![SlotRef::at("Monday", 1)]);
        spec.resources.push(Resource::group("G2"));
        spec.lesson_templates = vec![
            LessonTemplate::new("ART", "Art", "T1", "G1"),
            LessonTemplate::new("BIO", "Biology", "T1", "G2"),
        ];
        assert_eq!(solve(spec, VariableOrder::Compiled), SolveResult::Infeasible);
    }

    #[test]
    fn empty_domain_is_infeasible_without_search() {
        let mut spec = base_spec();
        spec.lesson_templates[0] = LessonTemplate::new("MATH", "Math", "T1", "G1").room_type("gym");
        assert_eq!(solve(spec, VariableOrder::FirstFail), SolveResult::Infeasible);
    }

    #[test]
    fn soft_preferences_are_minimised() {
        let mut spec = base_spec();
        spec.term = grid(&["Mon", "Tue"], 4);
        spec.constraints = vec![
            Constraint::PreferredTimeOfDay {
                template: "MATH".into(),
                from_slot: 0,
                to_slot: 1,
                weight: 4,
            },
            Constraint::SpreadAcrossDays {
                template: "MATH".into(),
                weight: 10,
            },
        ];
        let m = model(spec);

        for order in [VariableOrder::Compiled, VariableOrder::FirstFail] {
            let result = BranchAndBound::new(order).solve(&m, &Deadline::new(Duration::from_secs(10)));
            let SolveResult::Optimal {
                assignment,
                objective,
            } = result
            else {
                panic!("expected optimal, got {result:?}");
            };
            assert_eq!(objective, 0);
            assert_eq!(evaluate(&m, &assignment.choices), 0);
            let days: Vec<usize> = assignment
                .choices
                .iter()
                .enumerate()
                .map(|(v, c)| m.candidate(v, c.unwrap()).day)
                .collect();
            assert_ne!(days[0], days[1]);
        }
    }

    #[test]
    fn unavoidable_penalty_is_still_proven_optimal() {
        let mut spec = base_spec();
        spec.constraints = vec![Constraint::MinimumGapBetweenSessions {
            template: "MATH".into(),
            min_gap_slots: 2,
            weight: 3,
        }];
        let result = solve(spec, VariableOrder::Compiled);
        assert!(matches!(result, SolveResult::Optimal { objective: 3, .. }));
    }

    #[test]
    fn idle_limit_with_late_pin_backtracks_to_a_compact_day() {
        let mut spec = base_spec();
        spec.term = grid(&["Mon"], 5);
        spec.lesson_templates[0] = LessonTemplate::new("MATH", "Math", "T1", "G1").sessions(3);
        spec.constraints = vec![
            Constraint::MaxIdleSlots {
                resource: "G1".into(),
                max: 0,
            },
            Constraint::FixedAssignment {
                occurrence: "MATH#3".into(),
                day: "Mon".into(),
                slot: 4,
                room: None,
            },
        ];
        let m = model(spec);

        for order in [VariableOrder::Compiled, VariableOrder::FirstFail] {
            let result = BranchAndBound::new(order).solve(&m, &Deadline::new(Duration::from_secs(10)));
            let SolveResult::Optimal { assignment, .. } = result else {
                panic!("expected optimal, got {result:?}");
            };
            let mut starts: Vec<usize> = assignment
                .choices
                .iter()
                .enumerate()
                .map(|(v, c)| m.candidate(v, c.unwrap()).start)
                .collect();
            starts.sort_unstable();
            assert_eq!(starts, vec![2, 3, 4]);
        }
    }

    #[test]
    fn identical_input_gives_identical_result() {
        let mut spec = base_spec();
        spec.term = grid(&["Mon", "Tue"], 4);
        spec.lesson_templates[0] = LessonTemplate::new("MATH", "Math", "T1", "G1").sessions(5);
        spec.constraints = vec![Constraint::MaxConsecutiveSlots {
            resource: "G1".into(),
            max: 2,
            hard: Some(false),
            weight: 1,
        }];
        let first = solve(spec.clone(), VariableOrder::Compiled);
        let second = solve(spec, VariableOrder::Compiled);
        assert_eq!(first, second);
    }

    #[test]
    fn deadline_yields_unknown_with_partial() {
        let m = model(pigeonhole());
        let budget = Duration::from_millis(500);
        let started = Instant::now();
        let result = BranchAndBound::default().solve(&m, &Deadline::new(budget));

        assert!(started.elapsed() < budget + Duration::from_secs(2));
        let SolveResult::Unknown { partial: Some(partial) } = result else {
            panic!("expected unknown with partial, got {result:?}");
        };
        assert_eq!(partial.assigned_count(), 15);
    }

    #[test]
    fn first_fail_on_a_large_model_stops_near_the_deadline() {
        // Every group is one session over capacity; each first-fail node
        // scans hundreds of thousands of candidates.
        let mut spec = base_spec();
        spec.term = grid(&["Mon", "Tue", "Wed", "Thu", "Fri"], 8);
        spec.resources = (0..20).map(|r| Resource::classroom(format!("R{r}"))).collect();
        spec.lesson_templates.clear();
        for g in 0..12 {
            spec.resources.push(Resource::teacher(format!("T{g}")));
            spec.resources.push(Resource::group(format!("G{g}")));
            spec.lesson_templates.push(
                LessonTemplate::new(format!("L{g}"), "Study", format!("T{g}"), format!("G{g}"))
                    .sessions(41),
            );
        }
        let m = model(spec);

        let budget = Duration::from_millis(500);
        let started = Instant::now();
        let result = BranchAndBound::new(VariableOrder::FirstFail).solve(&m, &Deadline::new(budget));

        assert!(
            started.elapsed() < budget + Duration::from_millis(750),
            "took {:?}",
            started.elapsed()
        );
        assert!(matches!(result, SolveResult::Unknown { .. }), "{result:?}");
    }

    #[test]
    fn cancel_flag_stops_search() {
        let flag = Arc::new(AtomicBool::new(true));
        let deadline = Deadline::new(Duration::from_secs(3600)).with_cancel(flag);
        let result = BranchAndBound::default().solve(&model(pigeonhole()), &deadline);
        assert!(matches!(result, SolveResult::Unknown { .. }));
    }
}
