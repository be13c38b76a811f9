//! Canonical form of requisite trees
//!
//! Two rewrites, applied bottom-up:
//! - a single-child `AND`/`OR` is replaced by its child
//! - an `OR`/`N_OF` whose choices are all `COURSE` leaves stores them as a
//!   flat `courses` list (`N_OF` keeps its `count`)
//!
//! `canonicalize` is idempotent.

use crate::requisite::ast::{Choices, RequisiteExpression};

/// Rewrite a tree into its canonical form
pub fn canonicalize(node: RequisiteExpression) -> RequisiteExpression {
    match node {
        RequisiteExpression::And { operands } => {
            match <[RequisiteExpression; 1]>::try_from(canonicalize_all(operands)) {
                Ok([only]) => only,
                Err(operands) => RequisiteExpression::And { operands },
            }
        }
        RequisiteExpression::Or { choices } => match choices {
            Choices::Operands(operands) => {
                match <[RequisiteExpression; 1]>::try_from(canonicalize_all(operands)) {
                    Ok([only]) => only,
                    Err(operands) => RequisiteExpression::Or {
                        choices: flatten_courses(operands),
                    },
                }
            }
            Choices::Courses(courses) => match <[String; 1]>::try_from(courses) {
                Ok([code]) => RequisiteExpression::Course { code },
                Err(courses) => RequisiteExpression::Or {
                    choices: Choices::Courses(courses),
                },
            },
        },
        RequisiteExpression::NOf { count, choices } => {
            let choices = match choices {
                Choices::Operands(operands) => flatten_courses(canonicalize_all(operands)),
                courses @ Choices::Courses(_) => courses,
            };
            RequisiteExpression::NOf { count, choices }
        }
        leaf => leaf,
    }
}

/// Whether `node` is already in canonical form
pub fn is_canonical(node: &RequisiteExpression) -> bool {
    canonicalize(node.clone()) == *node
}

fn canonicalize_all(operands: Vec<RequisiteExpression>) -> Vec<RequisiteExpression> {
    operands.into_iter().map(canonicalize).collect()
}

fn flatten_courses(operands: Vec<RequisiteExpression>) -> Choices {
    let all_courses = !operands.is_empty()
        && operands
            .iter()
            .all(|op| matches!(op, RequisiteExpression::Course { .. }));
    if !all_courses {
        return Choices::Operands(operands);
    }

    Choices::Courses(
        operands
            .into_iter()
            .filter_map(|op| match op {
                RequisiteExpression::Course { code } => Some(code),
                _ => None,
            })
            .collect(),
    )
}
