/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Result translator: [`SolveResult`] → [`SolveResponse`].
//!
//! Maps candidate indices back to domain ids and clock times.  The lesson
//! list is sorted by day, start slot, then occurrence id so identical
//! results always serialize identically.

pub mod diagnostics;

use tracing::debug;

use crate::compiler::Model;
use crate::contract::{ScheduledLesson, SolveResponse, Status};
use crate::domain::Problem;
use crate::solver::SolveResult;

/// Build the caller-facing response for `result`.
///
/// `allow_partial` decides whether an `Unknown` result carries the best
/// partial timetable and the list of unplaced occurrences.
pub fn translate(
    problem: &Problem,
    model: &Model,
    result: &SolveResult,
    allow_partial: bool,
) -> SolveResponse {
    match result {
        SolveResult::Optimal {
            assignment,
            objective,
        } => SolveResponse::solved(
            Status::Optimal,
            lessons(problem, model, &assignment.choices),
            *objective,
        ),
        SolveResult::Feasible {
            assignment,
            objective,
        } => SolveResponse::solved(
            Status::Feasible,
            lessons(problem, model, &assignment.choices),
            *objective,
        ),
        SolveResult::Infeasible => SolveResponse::infeasible(diagnostics::explain(problem, model)),
        SolveResult::Unknown { partial } => {
            let mut resp = SolveResponse::unknown(
                "time budget exhausted before a complete timetable was found",
            );
            if allow_partial {
                match partial {
                    Some(p) => {
                        resp.assignments = lessons(problem, model, &p.choices);
                        resp.unassigned = problem
                            .occurrences()
                            .iter()
                            .zip(&p.choices)
                            .filter(|(_, c)| c.is_none())
                            .map(|(o, _)| o.id.clone())
                            .collect();
                    }
                    None => {
                        resp.unassigned =
                            problem.occurrences().iter().map(|o| o.id.clone()).collect();
                    }
                }
            }
            resp
        }
    }
}

/// Placed occurrences of `choices` as wire lessons, in timetable order.
pub fn lessons(
    problem: &Problem,
    model: &Model,
    choices: &[Option<usize>],
) -> Vec<ScheduledLesson> {
    let term = problem.term();
    let mut out: Vec<ScheduledLesson> = problem
        .occurrences()
        .iter()
        .enumerate()
        .filter_map(|(var, occ)| {
            let cand = model.candidate(var, choices[var]?);
            let len = model.session_length(var);
            let first = term.slot(cand.day, cand.start)?;
            let last = term.slot(cand.day, cand.start + len - 1)?;

            let template = problem.template_of(occ);
            let teacher = &problem.resources()[problem.teacher_of(template)];
            let group = &problem.resources()[problem.group_of(template)];
            let room = &problem.resources()[cand.room];

            Some(ScheduledLesson {
                occurrence_id: occ.id.clone(),
                template_id: template.id.clone(),
                subject: template.subject.clone(),
                teacher_id: teacher.id.clone(),
                teacher_name: teacher.display_name().to_string(),
                group_id: group.id.clone(),
                group_name: group.display_name().to_string(),
                room_id: room.id.clone(),
                room_name: room.display_name().to_string(),
                day: term.days()[cand.day].name.clone(),
                day_index: cand.day,
                start_slot: cand.start,
                slot_count: len,
                start: first.start,
                end: last.end,
            })
        })
        .collect();

    out.sort_by(|a, b| {
        (a.day_index, a.start_slot, &a.occurrence_id).cmp(&(
            b.day_index,
            b.start_slot,
            &b.occurrence_id,
        ))
    });
    debug!(lessons = out.len(), "assignment translated");
    out
}
