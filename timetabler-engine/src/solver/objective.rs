/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Objective function.
//!
//! ```text
//! objective = Σ unary cost of each chosen candidate
//!           + Σ pair terms (minimum gap, spread) over assigned pairs
//!           + Σ weight × (run − max) over maximal occupied runs per resource/day
//! ```
//!
//! [`evaluate`] is the reference implementation; the backends maintain the
//! same value incrementally through [`Occupancy`](super::state::Occupancy).

use crate::compiler::{Candidate, Model, SoftTerm};

/// Free slots between two blocks on the same day (0 when they overlap).
fn gap_between(a: &Candidate, len_a: usize, b: &Candidate, len_b: usize) -> usize {
    if a.start + len_a <= b.start {
        b.start - (a.start + len_a)
    } else if b.start + len_b <= a.start {
        a.start - (b.start + len_b)
    } else {
        0
    }
}

/// Penalty a pair term charges for one pair of placed sessions.
pub(crate) fn pair_penalty(
    term: &SoftTerm,
    a: &Candidate,
    len_a: usize,
    b: &Candidate,
    len_b: usize,
) -> u64 {
    if a.day != b.day {
        return 0;
    }
    match *term {
        SoftTerm::MinimumGap { min_gap, weight, .. } => {
            if gap_between(a, len_a, b, len_b) < min_gap {
                weight
            } else {
                0
            }
        }
        SoftTerm::SpreadAcrossDays { weight, .. } => weight,
        SoftTerm::MaxConsecutive { .. } => 0,
    }
}

/// Objective of `choices` computed from scratch.  Unassigned variables
/// contribute nothing.
pub fn evaluate(model: &Model, choices: &[Option<usize>]) -> u64 {
    let chosen = |var: usize| choices[var].map(|c| &model.variables[var].domain[c]);

    let unary: u64 = (0..choices.len())
        .filter_map(|v| chosen(v))
        .map(|c| c.cost)
        .sum();

    let mut total = unary;
    for term in &model.soft_terms {
        match term {
            SoftTerm::MinimumGap { vars, .. } | SoftTerm::SpreadAcrossDays { vars, .. } => {
                for (i, &a) in vars.iter().enumerate() {
                    for &b in &vars[i + 1..] {
                        if let (Some(ca), Some(cb)) = (chosen(a), chosen(b)) {
                            total += pair_penalty(
                                term,
                                ca,
                                model.variables[a].length,
                                cb,
                                model.variables[b].length,
                            );
                        }
                    }
                }
            }
            SoftTerm::MaxConsecutive {
                resource,
                max,
                weight,
            } => {
                for (day, &day_len) in model.day_lengths.iter().enumerate() {
                    let mut busy = vec![false; day_len];
                    for (var, v) in model.variables.iter().enumerate() {
                        let Some(c) = chosen(var) else { continue };
                        let uses = v.teacher == *resource
                            || v.group == *resource
                            || c.room == *resource;
                        if c.day == day && uses {
                            busy[c.start..c.start + v.length].fill(true);
                        }
                    }
                    let mut run = 0usize;
                    for &b in busy.iter().chain(std::iter::once(&false)) {
                        if b {
                            run += 1;
                        } else {
                            total += weight * run.saturating_sub(*max) as u64;
                            run = 0;
                        }
                    }
                }
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: usize, start: usize) -> Candidate {
        Candidate {
            day,
            start,
            room: 0,
            cost: 0,
        }
    }

    #[test]
    fn gap_counts_free_slots_between_blocks() {
        assert_eq!(gap_between(&at(0, 0), 1, &at(0, 3), 1), 2);
        assert_eq!(gap_between(&at(0, 3), 1, &at(0, 0), 2), 1);
        assert_eq!(gap_between(&at(0, 0), 2, &at(0, 1), 1), 0);
    }

    #[test]
    fn pair_terms_only_apply_on_the_same_day() {
        let gap = SoftTerm::MinimumGap {
            vars: vec![0, 1],
            min_gap: 2,
            weight: 3,
        };
        let spread = SoftTerm::SpreadAcrossDays {
            vars: vec![0, 1],
            weight: 5,
        };

        assert_eq!(pair_penalty(&gap, &at(0, 0), 1, &at(0, 2), 1), 3);
        assert_eq!(pair_penalty(&gap, &at(0, 0), 1, &at(0, 3), 1), 0);
        assert_eq!(pair_penalty(&gap, &at(0, 0), 1, &at(1, 1), 1), 0);
        assert_eq!(pair_penalty(&spread, &at(1, 0), 1, &at(1, 4), 1), 5);
        assert_eq!(pair_penalty(&spread, &at(0, 0), 1, &at(1, 0), 1), 0);
    }
}
