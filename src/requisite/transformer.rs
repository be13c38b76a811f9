//! Parse tree to requisite expression
//!
//! Dispatches on rule identity. Right-recursive chains (`disjunction`,
//! `conjunction`, `choice_list`) are flattened into n-ary operand lists and
//! groups pass their single child through without a wrapper node.

use std::rc::Rc;

use crate::error::{RequisiteError, Result};
use crate::requisite::ast::RequisiteExpression;
use crate::requisite::grammar::Rule;
use crate::requisite::lexer::TokenKind;
use crate::requisite::parser::ParseTree;

/// Transform a parse tree into a (not yet canonical) expression
pub fn transform(tree: &ParseTree) -> Result<RequisiteExpression> {
    match tree {
        ParseTree::Leaf(token) if token.kind == TokenKind::CourseCode => {
            Ok(RequisiteExpression::course(token.text.clone()))
        }
        ParseTree::Leaf(token) => Err(RequisiteError::MalformedTree(format!(
            "unexpected {} leaf '{}'",
            token.kind, token.text
        ))),
        ParseTree::Node { rule, children, .. } => match rule {
            Rule::Start | Rule::GroupBody | Rule::Atom => transform(child(children, 0)?),
            Rule::Group => transform(child(children, 1)?),
            Rule::Disjunction => {
                let operands = transform_chain(tree, Rule::Disjunction)?;
                Ok(collapse(operands, RequisiteExpression::or))
            }
            Rule::Conjunction => {
                let operands = transform_chain(tree, Rule::Conjunction)?;
                Ok(collapse(operands, RequisiteExpression::and))
            }
            Rule::NOfList => transform_n_of(children),
            Rule::ChoiceList | Rule::ListSep => Err(RequisiteError::MalformedTree(format!(
                "{:?} outside of an N_OF list",
                rule
            ))),
        },
    }
}

fn child(children: &[Rc<ParseTree>], index: usize) -> Result<&ParseTree> {
    children
        .get(index)
        .map(|c| c.as_ref())
        .ok_or_else(|| RequisiteError::MalformedTree(format!("missing child {}", index)))
}

/// Walk the right spine of a `head sep rest | head` chain
fn transform_chain(tree: &ParseTree, rule: Rule) -> Result<Vec<RequisiteExpression>> {
    let mut operands = Vec::new();
    let mut current = tree;

    loop {
        let ParseTree::Node { children, .. } = current else {
            return Err(RequisiteError::MalformedTree(format!(
                "expected {:?} node",
                rule
            )));
        };
        operands.push(transform(child(children, 0)?)?);

        match children.last() {
            Some(rest) if children.len() == 3 && rest.rule() == Some(rule) => {
                current = rest.as_ref()
            }
            _ => break,
        }
    }

    Ok(operands)
}

/// A chain of one element is its element
fn collapse(
    mut operands: Vec<RequisiteExpression>,
    build: fn(Vec<RequisiteExpression>) -> RequisiteExpression,
) -> RequisiteExpression {
    if operands.len() == 1 {
        if let Some(only) = operands.pop() {
            return only;
        }
    }
    build(operands)
}

fn transform_n_of(children: &[Rc<ParseTree>]) -> Result<RequisiteExpression> {
    let count_token = child(children, 0)?
        .token()
        .filter(|t| t.kind == TokenKind::Integer)
        .ok_or_else(|| RequisiteError::MalformedTree("N_OF without a count".to_string()))?;

    let choices = transform_chain(child(children, 2)?, Rule::ChoiceList)?;
    if choices.len() < 2 {
        return Err(RequisiteError::InvalidExpression(format!(
            "N_OF with {} choice(s)",
            choices.len()
        )));
    }

    // Digits only, so the sole failure mode is overflow
    let count = count_token.text.parse::<u64>().unwrap_or(u64::MAX);
    if count == 0 || count > choices.len() as u64 {
        return Err(RequisiteError::InvalidCount {
            count,
            choices: choices.len(),
        });
    }

    Ok(RequisiteExpression::n_of(count as u32, choices))
}
