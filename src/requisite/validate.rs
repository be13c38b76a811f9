//! Structural checks for canonical requisite trees

use crate::error::{RequisiteError, Result};
use crate::requisite::ast::{Choices, RequisiteExpression};

/// Check the structural invariants of a canonical tree
///
/// `AND`/`OR`/`N_OF` need at least two operands, `N_OF` needs
/// `1 <= count <= choices`, course codes and exclusion lists must be non-empty.
pub fn validate(node: &RequisiteExpression) -> Result<()> {
    match node {
        RequisiteExpression::And { operands } => {
            if operands.len() < 2 {
                return Err(invalid(format!("AND with {} operand(s)", operands.len())));
            }
            operands.iter().try_for_each(validate)
        }
        RequisiteExpression::Or { choices } => {
            if choices.len() < 2 {
                return Err(invalid(format!("OR with {} choice(s)", choices.len())));
            }
            validate_choices(choices)
        }
        RequisiteExpression::NOf { count, choices } => {
            if choices.len() < 2 {
                return Err(invalid(format!("N_OF with {} choice(s)", choices.len())));
            }
            if *count == 0 || *count as usize > choices.len() {
                return Err(RequisiteError::InvalidCount {
                    count: u64::from(*count),
                    choices: choices.len(),
                });
            }
            validate_choices(choices)
        }
        RequisiteExpression::Course { code } => validate_code(code),
        RequisiteExpression::MinGrade { course, .. } => validate_code(course),
        RequisiteExpression::ExcludeCourse { courses } => {
            if courses.is_empty() {
                return Err(invalid("EXCLUDE_COURSE without courses".to_string()));
            }
            courses.iter().try_for_each(|c| validate_code(c))
        }
        _ => Ok(()),
    }
}

fn validate_choices(choices: &Choices) -> Result<()> {
    match choices {
        Choices::Operands(operands) => operands.iter().try_for_each(validate),
        Choices::Courses(courses) => courses.iter().try_for_each(|c| validate_code(c)),
    }
}

fn validate_code(code: &str) -> Result<()> {
    if code.trim().is_empty() {
        return Err(invalid("empty course code".to_string()));
    }
    Ok(())
}

fn invalid(msg: String) -> RequisiteError {
    RequisiteError::InvalidExpression(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(code: &str) -> RequisiteExpression {
        RequisiteExpression::course(code)
    }

    #[test]
    fn test_valid_tree() {
        let node = RequisiteExpression::and(vec![
            course("BIOC*2580"),
            RequisiteExpression::n_of_courses(1, ["HK*3810", "ZOO*3600"]),
        ]);
        assert!(validate(&node).is_ok());
    }

    #[test]
    fn test_single_operand_and_invalid() {
        let node = RequisiteExpression::and(vec![course("A*100")]);
        assert!(matches!(
            validate(&node),
            Err(RequisiteError::InvalidExpression(_))
        ));
    }

    #[test]
    fn test_n_of_count_bounds() {
        let zero = RequisiteExpression::n_of_courses(0, ["A*100", "B*200"]);
        let over = RequisiteExpression::n_of_courses(3, ["A*100", "B*200"]);
        let ok = RequisiteExpression::n_of_courses(2, ["A*100", "B*200"]);
        assert!(matches!(
            validate(&zero),
            Err(RequisiteError::InvalidCount { count: 0, choices: 2 })
        ));
        assert!(matches!(
            validate(&over),
            Err(RequisiteError::InvalidCount { count: 3, choices: 2 })
        ));
        assert!(validate(&ok).is_ok());
    }

    #[test]
    fn test_single_choice_n_of_invalid() {
        let flat = RequisiteExpression::n_of_courses(1, ["CIS*1910"]);
        let nested = RequisiteExpression::n_of(
            1,
            vec![RequisiteExpression::and(vec![course("A*100"), course("B*200")])],
        );
        for node in [flat, nested] {
            assert!(matches!(
                validate(&node),
                Err(RequisiteError::InvalidExpression(_))
            ));
        }
    }

    #[test]
    fn test_nested_error_found() {
        let node = RequisiteExpression::or(vec![
            course("A*100"),
            RequisiteExpression::and(vec![course("B*200"), course("  ")]),
        ]);
        assert!(validate(&node).is_err());
    }

    #[test]
    fn test_empty_exclusion_invalid() {
        let node = RequisiteExpression::ExcludeCourse { courses: vec![] };
        assert!(validate(&node).is_err());
    }

    #[test]
    fn test_markers_valid() {
        assert!(validate(&RequisiteExpression::no_requisites()).is_ok());
        assert!(validate(&RequisiteExpression::Equivalent).is_ok());
    }
}
