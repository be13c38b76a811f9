//! Tokenizer for upper-cased requisite chunks

use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;
use std::fmt;

use crate::requisite::parser::GrammarRejection;

/// Terminal symbols of the requisite grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    /// 2-5 letters, `*`, then at least 3 digits
    CourseCode,
    Integer,
    Or,
    Of,
    Comma,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::CourseCode => "COURSE_CODE",
            TokenKind::Integer => "INTEGER",
            TokenKind::Or => "'OR'",
            TokenKind::Of => "'OF'",
            TokenKind::Comma => "','",
            TokenKind::OpenParen => "'('",
            TokenKind::CloseParen => "')'",
            TokenKind::OpenBracket => "'['",
            TokenKind::CloseBracket => "']'",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset into the upper-cased chunk
    pub offset: usize,
}

pub type TokenStream = SmallVec<[Token; 16]>;

/// Word-like token patterns, tried in order at each position
static WORD_PATTERNS: Lazy<Vec<(TokenKind, Regex)>> = Lazy::new(|| {
    [
        (TokenKind::CourseCode, r"^[A-Z]{2,5}\*[0-9]{3,}\b"),
        (TokenKind::Integer, r"^[0-9]+\b"),
        (TokenKind::Or, r"^OR\b"),
        (TokenKind::Of, r"^OF\b"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("static token pattern")))
    .collect()
});

fn punctuation(c: char) -> Option<TokenKind> {
    match c {
        ',' => Some(TokenKind::Comma),
        '(' => Some(TokenKind::OpenParen),
        ')' => Some(TokenKind::CloseParen),
        '[' => Some(TokenKind::OpenBracket),
        ']' => Some(TokenKind::CloseBracket),
        _ => None,
    }
}

/// Split an upper-cased chunk into grammar tokens
pub fn tokenize(chunk: &str) -> Result<TokenStream, GrammarRejection> {
    let mut tokens = TokenStream::new();
    let mut pos = 0;

    while pos < chunk.len() {
        let rest = &chunk[pos..];
        let Some(c) = rest.chars().next() else {
            break;
        };

        if c.is_whitespace() {
            pos += c.len_utf8();
            continue;
        }

        if let Some(kind) = punctuation(c) {
            tokens.push(Token {
                kind,
                text: c.to_string(),
                offset: pos,
            });
            pos += c.len_utf8();
            continue;
        }

        let matched = WORD_PATTERNS
            .iter()
            .find_map(|(kind, re)| re.find(rest).map(|m| (*kind, m.as_str())));

        match matched {
            Some((kind, text)) => {
                tokens.push(Token {
                    kind,
                    text: text.to_string(),
                    offset: pos,
                });
                pos += text.len();
            }
            None => {
                let word: String = rest
                    .chars()
                    .take_while(|c| !c.is_whitespace() && punctuation(*c).is_none())
                    .collect();
                return Err(GrammarRejection {
                    reason: format!("unrecognised text '{}' at offset {}", word, pos),
                    offset: Some(pos),
                });
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(chunk: &str) -> Vec<TokenKind> {
        tokenize(chunk).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_course_list() {
        assert_eq!(
            kinds("CIS*1910, CIS*2500 OR MATH*1200"),
            vec![
                TokenKind::CourseCode,
                TokenKind::Comma,
                TokenKind::CourseCode,
                TokenKind::Or,
                TokenKind::CourseCode,
            ]
        );
    }

    #[test]
    fn test_tokenize_n_of() {
        assert_eq!(
            kinds("[1 OF HK*3810, ZOO*3600]"),
            vec![
                TokenKind::OpenBracket,
                TokenKind::Integer,
                TokenKind::Of,
                TokenKind::CourseCode,
                TokenKind::Comma,
                TokenKind::CourseCode,
                TokenKind::CloseBracket,
            ]
        );
    }

    #[test]
    fn test_token_offsets_and_text() {
        let tokens = tokenize("(HK*3810)").unwrap();
        assert_eq!(tokens[1].text, "HK*3810");
        assert_eq!(tokens[1].offset, 1);
        assert_eq!(tokens[2].offset, 8);
    }

    #[test]
    fn test_course_code_bounds() {
        // Too few digits
        assert!(tokenize("CIS*19").is_err());
        // Too many letters
        assert!(tokenize("ABCDEF*1000").is_err());
        // Trailing letters are not part of a code
        assert!(tokenize("CIS*1910A").is_err());
        assert_eq!(kinds("HK*381"), vec![TokenKind::CourseCode]);
    }

    #[test]
    fn test_keyword_needs_word_boundary() {
        assert!(tokenize("ORANGE").is_err());
        assert_eq!(kinds("OR OF"), vec![TokenKind::Or, TokenKind::Of]);
    }

    #[test]
    fn test_unrecognised_word_reports_offset() {
        let err = tokenize("THIS IS NOT VALID").unwrap_err();
        assert_eq!(err.offset, Some(0));
        assert!(err.reason.contains("'THIS'"));
    }

    #[test]
    fn test_empty_chunk_has_no_tokens() {
        assert!(tokenize("   ").unwrap().is_empty());
    }
}
