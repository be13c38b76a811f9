//! General chart parser for the requisite grammar
//!
//! Every (rule, position) pair is expanded into all of its derivations, in
//! grammar priority order, and memoized for the duration of one parse. The
//! first derivation of `start` that spans the whole chunk is selected, so
//! ambiguous text still yields one stable tree.

use ahash::AHashMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use thiserror::Error;

use crate::requisite::grammar::{grammar, Grammar, Rule, Symbol};
use crate::requisite::lexer::{tokenize, Token, TokenKind};

/// Chunks that lex to more tokens than this are rejected
pub const DEFAULT_MAX_TOKENS: usize = 512;

/// Chunks whose groups nest deeper than this are rejected
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Recursion budget for one chart; exceeding it rejects the chunk
const MAX_DERIVE_DEPTH: usize = 640;

/// Size bounds applied before and during a parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_tokens: usize,
    /// Deepest allowed `(`/`[` nesting
    pub max_depth: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        ParseLimits {
            max_tokens: DEFAULT_MAX_TOKENS,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// The chunk has no derivation under the grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct GrammarRejection {
    pub reason: String,
    /// Byte offset (into the upper-cased chunk) of the furthest failure
    pub offset: Option<usize>,
}

/// Concrete parse tree
///
/// Subtrees are shared between alternative derivations while the chart is
/// alive, hence `Rc`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseTree {
    Node {
        rule: Rule,
        alternative: usize,
        children: Vec<Rc<ParseTree>>,
    },
    Leaf(Token),
}

impl ParseTree {
    pub fn rule(&self) -> Option<Rule> {
        match self {
            ParseTree::Node { rule, .. } => Some(*rule),
            ParseTree::Leaf(_) => None,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            ParseTree::Leaf(token) => Some(token),
            ParseTree::Node { .. } => None,
        }
    }
}

/// Parse an upper-cased chunk
pub fn parse(chunk: &str) -> Result<ParseTree, GrammarRejection> {
    parse_with_limits(chunk, ParseLimits::default())
}

/// Parse an upper-cased chunk, rejecting it when it exceeds `limits`
pub fn parse_with_limits(chunk: &str, limits: ParseLimits) -> Result<ParseTree, GrammarRejection> {
    let tokens = tokenize(chunk)?;

    if tokens.is_empty() {
        return Err(GrammarRejection {
            reason: "empty chunk".to_string(),
            offset: None,
        });
    }
    if tokens.len() > limits.max_tokens {
        return Err(GrammarRejection {
            reason: format!(
                "chunk has {} tokens, limit is {}",
                tokens.len(),
                limits.max_tokens
            ),
            offset: None,
        });
    }
    check_nesting(&tokens, limits.max_depth)?;

    let chart = Chart::new(grammar(), &tokens);
    let derivations = chart.derive(Rule::Start, 0);
    tracing::trace!(
        tokens = tokens.len(),
        entries = chart.memo.borrow().len(),
        "requisite chart filled"
    );

    if chart.exhausted.get() {
        return Err(GrammarRejection {
            reason: format!("chunk nests too deeply to parse ({} tokens)", tokens.len()),
            offset: None,
        });
    }

    derivations
        .iter()
        .find(|d| d.end == tokens.len())
        .map(|d| (*d.tree).clone())
        .ok_or_else(|| chart.rejection(chunk))
}

/// Reject bracket nesting deeper than `max_depth`
fn check_nesting(tokens: &[Token], max_depth: usize) -> Result<(), GrammarRejection> {
    let mut depth = 0usize;
    for token in tokens {
        match token.kind {
            TokenKind::OpenParen | TokenKind::OpenBracket => {
                depth += 1;
                if depth > max_depth {
                    return Err(GrammarRejection {
                        reason: format!(
                            "groups nest deeper than {} levels at offset {}",
                            max_depth, token.offset
                        ),
                        offset: Some(token.offset),
                    });
                }
            }
            TokenKind::CloseParen | TokenKind::CloseBracket => {
                depth = depth.saturating_sub(1)
            }
            _ => {}
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct Derivation {
    tree: Rc<ParseTree>,
    end: usize,
}

type Partial = (Vec<Rc<ParseTree>>, usize);

struct Chart<'a> {
    grammar: &'a Grammar,
    tokens: &'a [Token],
    memo: RefCell<AHashMap<(Rule, usize), Rc<Vec<Derivation>>>>,
    furthest: Cell<usize>,
    expected: RefCell<Vec<TokenKind>>,
    depth: Cell<usize>,
    exhausted: Cell<bool>,
}

impl<'a> Chart<'a> {
    fn new(grammar: &'a Grammar, tokens: &'a [Token]) -> Self {
        Chart {
            grammar,
            tokens,
            memo: RefCell::new(AHashMap::with_capacity(tokens.len() * 4)),
            furthest: Cell::new(0),
            expected: RefCell::new(Vec::new()),
            depth: Cell::new(0),
            exhausted: Cell::new(false),
        }
    }

    /// All derivations of `rule` starting at `start`, in priority order
    fn derive(&self, rule: Rule, start: usize) -> Rc<Vec<Derivation>> {
        if let Some(done) = self.memo.borrow().get(&(rule, start)) {
            return Rc::clone(done);
        }
        if self.depth.get() >= MAX_DERIVE_DEPTH {
            self.exhausted.set(true);
            return Rc::new(Vec::new());
        }
        // Placeholder so a left-recursive cycle terminates with no derivations
        self.memo
            .borrow_mut()
            .insert((rule, start), Rc::new(Vec::new()));

        self.depth.set(self.depth.get() + 1);
        let mut derivations = Vec::new();
        for (alternative, symbols) in self.grammar.alternatives(rule).iter().enumerate() {
            for (children, end) in self.match_sequence(symbols, start) {
                derivations.push(Derivation {
                    tree: Rc::new(ParseTree::Node {
                        rule,
                        alternative,
                        children,
                    }),
                    end,
                });
            }
        }

        self.depth.set(self.depth.get() - 1);

        let derivations = Rc::new(derivations);
        self.memo
            .borrow_mut()
            .insert((rule, start), Rc::clone(&derivations));
        derivations
    }

    fn match_sequence(&self, symbols: &[Symbol], start: usize) -> Vec<Partial> {
        let mut partials: Vec<Partial> = vec![(Vec::with_capacity(symbols.len()), start)];

        for symbol in symbols {
            let mut next = Vec::new();
            for (mut children, pos) in partials {
                match *symbol {
                    Symbol::Token(kind) => match self.tokens.get(pos) {
                        Some(token) if token.kind == kind => {
                            children.push(Rc::new(ParseTree::Leaf(token.clone())));
                            next.push((children, pos + 1));
                        }
                        _ => self.record_miss(pos, kind),
                    },
                    Symbol::Rule(rule) => {
                        for d in self.derive(rule, pos).iter() {
                            let mut extended = children.clone();
                            extended.push(Rc::clone(&d.tree));
                            next.push((extended, d.end));
                        }
                    }
                }
            }
            if next.is_empty() {
                return next;
            }
            partials = next;
        }

        partials
    }

    fn record_miss(&self, pos: usize, kind: TokenKind) {
        let furthest = self.furthest.get();
        if pos > furthest {
            self.furthest.set(pos);
            let mut expected = self.expected.borrow_mut();
            expected.clear();
            expected.push(kind);
        } else if pos == furthest {
            let mut expected = self.expected.borrow_mut();
            if !expected.contains(&kind) {
                expected.push(kind);
            }
        }
    }

    fn rejection(&self, chunk: &str) -> GrammarRejection {
        let pos = self.furthest.get();
        let mut expected = self.expected.borrow().clone();
        expected.sort();
        let expected = expected
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        match self.tokens.get(pos) {
            Some(token) => GrammarRejection {
                reason: format!(
                    "unexpected '{}' at offset {}; expected one of: {}",
                    token.text, token.offset, expected
                ),
                offset: Some(token.offset),
            },
            None => GrammarRejection {
                reason: format!("unexpected end of input; expected one of: {}", expected),
                offset: Some(chunk.len()),
            },
        }
    }
}
