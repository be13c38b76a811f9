//! Render requisite trees back into requirement text

use crate::requisite::ast::{Choices, RequisiteExpression};

/// Render a tree as text accepted by the requisite grammar
///
/// Returns `None` for nodes the grammar cannot express (credits, notes,
/// markers) or for empty containers. Compound operands are always bracketed,
/// so parsing the output reproduces the tree's shape.
pub fn render(node: &RequisiteExpression) -> Option<String> {
    match node {
        RequisiteExpression::Course { code } => Some(code.clone()),
        RequisiteExpression::And { operands } => join(operands, ", "),
        RequisiteExpression::Or { choices } => join_choices(choices, " OR "),
        RequisiteExpression::NOf { count, choices } => {
            Some(format!("[{} OF {}]", count, join_choices(choices, ", ")?))
        }
        _ => None,
    }
}

fn join_choices(choices: &Choices, sep: &str) -> Option<String> {
    match choices {
        Choices::Operands(operands) => join(operands, sep),
        Choices::Courses(courses) if !courses.is_empty() => Some(courses.join(sep)),
        Choices::Courses(_) => None,
    }
}

fn join(operands: &[RequisiteExpression], sep: &str) -> Option<String> {
    if operands.is_empty() {
        return None;
    }
    let parts = operands
        .iter()
        .map(render_operand)
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join(sep))
}

fn render_operand(node: &RequisiteExpression) -> Option<String> {
    let text = render(node)?;
    match node {
        RequisiteExpression::And { .. } | RequisiteExpression::Or { .. } => {
            Some(format!("({})", text))
        }
        _ => Some(text),
    }
}
