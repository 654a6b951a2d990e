/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Randomized greedy construction followed by hill climbing.
//!
//! 1. Construct: walk the variable order and give each variable its cheapest
//!    fitting candidate (ties broken by the seeded RNG).
//! 2. On a dead end, move the stuck variable to the front of the order and
//!    restart; every fifth restart also shuffles the order.
//! 3. Once complete, repeat single-variable moves while any of them lowers
//!    the objective.
//!
//! The backend cannot prove infeasibility by search.  Apart from an empty
//! domain it keeps restarting until the deadline and then answers
//! `Unknown` with the deepest partial assignment it built.

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::state::Occupancy;
use super::{Assignment, Deadline, SolveResult, SolverBackend};
use crate::compiler::Model;

/// Restarts between two shuffles of the variable order.
const SHUFFLE_EVERY: u64 = 5;

/// Heuristic backend; deterministic for a given seed and budget-independent
/// until the deadline interrupts it.
#[derive(Debug, Clone)]
pub struct LocalSearch {
    seed: u64,
}

impl LocalSearch {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for LocalSearch {
    fn default() -> Self {
        Self::new(42)
    }
}

impl SolverBackend for LocalSearch {
    fn name(&self) -> &'static str {
        "local_search"
    }

    fn solve(&self, model: &Model, deadline: &Deadline) -> SolveResult {
        if let Some(var) = model.first_empty_domain() {
            info!(variable = var, "empty domain, model infeasible without search");
            return SolveResult::Infeasible;
        }

        let root_bound = model.root_lower_bound();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut order: Vec<usize> = (0..model.variable_count()).collect();
        let mut deepest: Option<Vec<Option<usize>>> = None;
        let mut deepest_count = 0;
        let mut restarts = 0u64;

        info!(
            variables = model.variable_count(),
            seed = self.seed,
            root_bound,
            "local search started"
        );

        while !deadline.expired() {
            let mut occ = Occupancy::new(model);
            match construct(&mut occ, &order, &mut rng, deadline) {
                Ok(()) => {
                    let constructed = occ.cost();
                    let moves = improve(&mut occ, root_bound, deadline);
                    let objective = occ.cost();
                    info!(
                        restarts,
                        constructed,
                        objective,
                        moves,
                        elapsed_ms = deadline.elapsed().as_millis() as u64,
                        "local search finished"
                    );
                    let assignment = Assignment {
                        choices: occ.choices().to_vec(),
                    };
                    return if objective == root_bound {
                        SolveResult::Optimal {
                            assignment,
                            objective,
                        }
                    } else {
                        SolveResult::Feasible {
                            assignment,
                            objective,
                        }
                    };
                }
                Err(stuck) => {
                    if occ.assigned() > deepest_count {
                        deepest_count = occ.assigned();
                        deepest = Some(occ.choices().to_vec());
                    }
                    restarts += 1;
                    debug!(restarts, stuck, assigned = occ.assigned(), "construction dead end");

                    if let Some(pos) = order.iter().position(|&v| v == stuck) {
                        let var = order.remove(pos);
                        order.insert(0, var);
                    }
                    if restarts % SHUFFLE_EVERY == 0 {
                        order.shuffle(&mut rng);
                    }
                }
            }
        }

        warn!(
            restarts,
            assigned = deepest_count,
            total = model.variable_count(),
            "deadline reached before a complete timetable was found"
        );
        SolveResult::Unknown {
            partial: deepest.map(|choices| Assignment { choices }),
        }
    }
}

/// Greedy pass over `order`.  `Err(var)` names the first variable left
/// without a fitting candidate (or the one reached when the deadline hit).
fn construct(
    occ: &mut Occupancy<'_>,
    order: &[usize],
    rng: &mut StdRng,
    deadline: &Deadline,
) -> Result<(), usize> {
    let mut ties = Vec::new();
    for &var in order {
        if deadline.expired() {
            return Err(var);
        }
        ties.clear();
        let mut best = u64::MAX;
        for c in 0..occ.model().domain_size(var) {
            if !occ.fits(var, c) {
                continue;
            }
            let delta = occ.delta(var, c);
            if delta < best {
                best = delta;
                ties.clear();
            }
            if delta == best {
                ties.push(c);
            }
        }
        match ties.choose(rng) {
            Some(&c) => {
                occ.place(var, c);
            }
            None => return Err(var),
        }
    }
    Ok(())
}

/// Hill climbing with single-variable moves.  Returns the number of
/// improving moves applied.
fn improve(occ: &mut Occupancy<'_>, root_bound: u64, deadline: &Deadline) -> u64 {
    let n = occ.choices().len();
    let mut moves = 0;
    loop {
        let mut improved = false;
        for var in 0..n {
            if occ.cost() == root_bound || deadline.expired() {
                return moves;
            }
            let Some(current) = occ.choice(var) else {
                continue;
            };
            let contribution = occ.remove(var);

            let mut best = (contribution, current);
            for c in 0..occ.model().domain_size(var) {
                if c != current && occ.fits(var, c) {
                    let delta = occ.delta(var, c);
                    if delta < best.0 {
                        best = (delta, c);
                    }
                }
            }
            occ.place(var, best.1);
            if best.1 != current {
                moves += 1;
                improved = true;
            }
        }
        if !improved {
            return moves;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::compiler::testing::{base_spec, grid};
    use crate::compiler::{build_problem, compile, CompileOptions};
    use crate::domain::{Constraint, LessonTemplate, ProblemSpec, Resource, SlotRef};
    use crate::solver::objective::evaluate;

    fn model(spec: ProblemSpec) -> Model {
        compile(&build_problem(spec).unwrap(), &CompileOptions::default())
    }

    fn budget(ms: u64) -> Deadline {
        Deadline::new(Duration::from_millis(ms))
    }

    #[test]
    fn two_math_lessons_in_three_slots_is_optimal() {
        let result = LocalSearch::default().solve(&model(base_spec()), &budget(5_000));
        let SolveResult::Optimal { assignment, .. } = result else {
            panic!("expected optimal, got {result:?}");
        };
        assert_ne!(assignment.choices[0], assignment.choices[1]);
    }

    #[test]
    fn restarts_find_a_perfect_packing() {
        let mut spec = base_spec();
        spec.term = grid(&["Mon", "Tue"], 4);
        spec.resources.push(Resource::group("G2"));
        spec.lesson_templates = vec![
            LessonTemplate::new("LONG", "Lab", "T1", "G1").length(2).sessions(3),
            LessonTemplate::new("SHORT", "Reading", "T1", "G2").sessions(2),
        ];
        let m = model(spec);
        let result = LocalSearch::new(7).solve(&m, &budget(5_000));
        let (SolveResult::Optimal { assignment, .. } | SolveResult::Feasible { assignment, .. }) =
            result
        else {
            panic!("expected a complete timetable, got {result:?}");
        };
        assert!(assignment.is_complete());
    }

    #[test]
    fn improvement_reaches_zero_penalty() {
        let mut spec = base_spec();
        spec.term = grid(&["Mon", "Tue"], 4);
        spec.constraints = vec![
            Constraint::PreferredTimeOfDay {
                template: "MATH".into(),
                from_slot: 2,
                to_slot: 3,
                weight: 2,
            },
            Constraint::SpreadAcrossDays {
                template: "MATH".into(),
                weight: 10,
            },
        ];
        let m = model(spec);
        let result = LocalSearch::default().solve(&m, &budget(5_000));
        let SolveResult::Optimal {
            assignment,
            objective,
        } = result
        else {
            panic!("expected optimal, got {result:?}");
        };
        assert_eq!(objective, 0);
        assert_eq!(evaluate(&m, &assignment.choices), 0);
    }

    #[test]
    fn same_seed_gives_same_result() {
        let mut spec = base_spec();
        spec.term = grid(&["Mon", "Tue", "Wed"], 4);
        spec.lesson_templates[0] = LessonTemplate::new("MATH", "Math", "T1", "G1").sessions(7);
        spec.constraints = vec![Constraint::MinimumGapBetweenSessions {
            template: "MATH".into(),
            min_gap_slots: 1,
            weight: 1,
        }];
        let m = model(spec);
        let a = LocalSearch::new(3).solve(&m, &budget(5_000));
        let b = LocalSearch::new(3).solve(&m, &budget(5_000));
        assert_eq!(a, b);
    }

    #[test]
    fn empty_domain_is_infeasible() {
        let mut spec = base_spec();
        spec.resources[1] = Resource::group("G1").with_availability(Vec::<SlotRef>::new());
        assert_eq!(
            LocalSearch::default().solve(&model(spec), &budget(1_000)),
            SolveResult::Infeasible
        );
    }

    #[test]
    fn over_demand_ends_unknown_at_deadline() {
        let mut spec = base_spec();
        spec.lesson_templates[0] = LessonTemplate::new("MATH", "Math", "T1", "G1").sessions(4);
        let result = LocalSearch::default().solve(&model(spec), &budget(200));
        let SolveResult::Unknown { partial: Some(p) } = result else {
            panic!("expected unknown, got {result:?}");
        };
        assert_eq!(p.assigned_count(), 3);
    }
}
