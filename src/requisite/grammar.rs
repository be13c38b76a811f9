//! Requisite grammar
//!
//! Productions, in priority order (first listed alternative wins when several
//! derivations span the whole chunk):
//!
//! ```text
//! start        := n_of_list | disjunction
//! disjunction  := conjunction OR disjunction | conjunction
//! conjunction  := atom "," conjunction | atom
//! atom         := COURSE_CODE | group
//! group        := "(" group_body ")" | "[" group_body "]"
//! group_body   := n_of_list | disjunction
//! n_of_list    := INTEGER OF choice_list
//! choice_list  := atom list_sep choice_list | atom
//! list_sep     := "," OR | "," | OR
//! ```
//!
//! Comma binds tighter than `OR`. Inside an `n_of_list` both act as plain
//! list separators unless a nested group overrides that.

use once_cell::sync::Lazy;

use crate::requisite::lexer::TokenKind;

/// Non-terminal symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Start,
    Disjunction,
    Conjunction,
    Atom,
    Group,
    GroupBody,
    NOfList,
    ChoiceList,
    ListSep,
}

impl Rule {
    pub const ALL: [Rule; 9] = [
        Rule::Start,
        Rule::Disjunction,
        Rule::Conjunction,
        Rule::Atom,
        Rule::Group,
        Rule::GroupBody,
        Rule::NOfList,
        Rule::ChoiceList,
        Rule::ListSep,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Rule(Rule),
    Token(TokenKind),
}

pub type Alternative = &'static [Symbol];

use Rule as R;
use Symbol::{Rule as N, Token as T};
use TokenKind as K;

const START: &[Alternative] = &[&[N(R::NOfList)], &[N(R::Disjunction)]];

const DISJUNCTION: &[Alternative] = &[
    &[N(R::Conjunction), T(K::Or), N(R::Disjunction)],
    &[N(R::Conjunction)],
];

const CONJUNCTION: &[Alternative] = &[
    &[N(R::Atom), T(K::Comma), N(R::Conjunction)],
    &[N(R::Atom)],
];

const ATOM: &[Alternative] = &[&[T(K::CourseCode)], &[N(R::Group)]];

const GROUP: &[Alternative] = &[
    &[T(K::OpenParen), N(R::GroupBody), T(K::CloseParen)],
    &[T(K::OpenBracket), N(R::GroupBody), T(K::CloseBracket)],
];

const GROUP_BODY: &[Alternative] = &[&[N(R::NOfList)], &[N(R::Disjunction)]];

const N_OF_LIST: &[Alternative] = &[&[T(K::Integer), T(K::Of), N(R::ChoiceList)]];

const CHOICE_LIST: &[Alternative] = &[
    &[N(R::Atom), N(R::ListSep), N(R::ChoiceList)],
    &[N(R::Atom)],
];

const LIST_SEP: &[Alternative] = &[&[T(K::Comma), T(K::Or)], &[T(K::Comma)], &[T(K::Or)]];

/// Immutable production table indexed by rule
#[derive(Debug)]
pub struct Grammar {
    productions: Vec<&'static [Alternative]>,
}

impl Grammar {
    fn build() -> Self {
        let productions = Rule::ALL
            .iter()
            .map(|rule| match rule {
                Rule::Start => START,
                Rule::Disjunction => DISJUNCTION,
                Rule::Conjunction => CONJUNCTION,
                Rule::Atom => ATOM,
                Rule::Group => GROUP,
                Rule::GroupBody => GROUP_BODY,
                Rule::NOfList => N_OF_LIST,
                Rule::ChoiceList => CHOICE_LIST,
                Rule::ListSep => LIST_SEP,
            })
            .collect();
        Grammar { productions }
    }

    /// Alternatives of `rule`, in priority order
    #[inline]
    pub fn alternatives(&self, rule: Rule) -> &'static [Alternative] {
        self.productions[rule.index()]
    }
}

static GRAMMAR: Lazy<Grammar> = Lazy::new(Grammar::build);

/// The process-wide requisite grammar
pub fn grammar() -> &'static Grammar {
    &GRAMMAR
}
