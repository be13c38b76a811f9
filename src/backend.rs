//! Normalization of replies from the API-based requisite parser
//!
//! The external backend answers with loosely shaped JSON: `expressions`
//! instead of `operands`, `COURSE` leaves written as `{"courses": [code]}`,
//! sometimes wrapped in a markdown code fence. Replies are decoded into the
//! typed tree, canonicalized and validated with the same rules as the grammar
//! path.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{RequisiteError, Result};
use crate::requisite::{canonicalize, validate, Choices, RequisiteExpression};

static LEADING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*```(?:json)?\s*").expect("static fence pattern"));
static TRAILING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*```\s*$").expect("static fence pattern"));

/// Permissive wire shape of one backend node
#[derive(Debug, Deserialize)]
struct WireExpression {
    #[serde(rename = "type")]
    kind: String,
    #[serde(alias = "expressions")]
    operands: Option<Vec<WireExpression>>,
    courses: Option<Vec<String>>,
    code: Option<String>,
    count: Option<i64>,
    credits: Option<f64>,
    subject: Option<String>,
    level: Option<u32>,
    percentage: Option<f64>,
    course: Option<String>,
    program: Option<String>,
    phase: Option<String>,
    description: Option<String>,
    value: Option<String>,
    chunk: Option<String>,
    error: Option<String>,
}

/// Strip a surrounding markdown code fence
pub fn strip_code_fence(reply: &str) -> String {
    let reply = LEADING_FENCE.replace(reply, "");
    TRAILING_FENCE.replace(&reply, "").trim().to_string()
}

/// Decode, canonicalize and validate one backend reply
pub fn decode_reply(reply: &str) -> Result<RequisiteExpression> {
    let body = strip_code_fence(reply);
    if body.is_empty() {
        return Err(RequisiteError::Backend("empty reply".to_string()));
    }

    let value: serde_json::Value = serde_json::from_str(&body)?;
    if value.as_object().is_some_and(|obj| obj.is_empty()) {
        return Ok(RequisiteExpression::no_requisites());
    }

    let wire: WireExpression = serde_json::from_value(value)?;
    let node = canonicalize(wire.into_expression()?);
    validate(&node)?;
    Ok(node)
}

/// Decode a reply, falling back to `RAW_UNPARSED` carrying the original text
pub fn normalize_reply(raw_text: &str, reply: &str) -> RequisiteExpression {
    match decode_reply(reply) {
        Ok(node) => node,
        Err(e) => {
            tracing::warn!(raw_text, error = %e, "backend reply could not be normalized");
            RequisiteExpression::RawUnparsed {
                value: format!("PARSING_FAILED: {}", raw_text),
            }
        }
    }
}

impl WireExpression {
    fn into_expression(self) -> Result<RequisiteExpression> {
        let kind = self.kind.trim().to_ascii_uppercase();
        let node = match kind.as_str() {
            "AND" => RequisiteExpression::And {
                operands: self.into_operand_list("AND")?,
            },
            "OR" => RequisiteExpression::Or {
                choices: self.into_choices("OR")?,
            },
            "N_OF" => {
                let count = self.count.ok_or_else(|| missing("N_OF", "count"))?;
                let count = u32::try_from(count).map_err(|_| {
                    RequisiteError::Backend(format!("N_OF count {} out of range", count))
                })?;
                RequisiteExpression::NOf {
                    count,
                    choices: self.into_choices("N_OF")?,
                }
            }
            "COURSE" => RequisiteExpression::Course {
                code: self.into_course_code()?,
            },
            "CREDITS" => RequisiteExpression::Credits {
                credits: self.credits.ok_or_else(|| missing("CREDITS", "credits"))?,
            },
            "SUBJECT_CREDITS" => RequisiteExpression::SubjectCredits {
                credits: self.credits.ok_or_else(|| missing(&kind, "credits"))?,
                subject: self.subject.ok_or_else(|| missing(&kind, "subject"))?,
            },
            "SUBJECT_CREDITS_AT_LEVEL" => RequisiteExpression::SubjectCreditsAtLevel {
                credits: self.credits.ok_or_else(|| missing(&kind, "credits"))?,
                subject: self.subject.ok_or_else(|| missing(&kind, "subject"))?,
                level: self.level,
            },
            "MIN_AVERAGE" => RequisiteExpression::MinAverage {
                percentage: self.percentage.ok_or_else(|| missing(&kind, "percentage"))?,
            },
            "MIN_GRADE" => RequisiteExpression::MinGrade {
                course: self.course.ok_or_else(|| missing(&kind, "course"))?,
                percentage: self.percentage.ok_or_else(|| missing(&kind, "percentage"))?,
            },
            "PROGRAM_REGISTRATION" => RequisiteExpression::ProgramRegistration {
                program: self.program.ok_or_else(|| missing(&kind, "program"))?,
            },
            "PHASE_REQUIREMENT" => RequisiteExpression::PhaseRequirement {
                phase: self.phase.ok_or_else(|| missing(&kind, "phase"))?,
            },
            "HIGHSCHOOL_REQUIREMENT" => RequisiteExpression::HighschoolRequirement {
                description: self.description.ok_or_else(|| missing(&kind, "description"))?,
            },
            "MIN_EXPERIENCE" => RequisiteExpression::MinExperience {
                description: self.description.ok_or_else(|| missing(&kind, "description"))?,
            },
            "PROGRESSION_STATUS" => RequisiteExpression::ProgressionStatus {
                description: self.description.ok_or_else(|| missing(&kind, "description"))?,
            },
            "EXCLUDE_COURSE" => RequisiteExpression::ExcludeCourse {
                courses: self.courses.ok_or_else(|| missing(&kind, "courses"))?,
            },
            "EQUIVALENT" => RequisiteExpression::Equivalent,
            "RAW_UNPARSED" => RequisiteExpression::RawUnparsed {
                value: self.value.ok_or_else(|| missing(&kind, "value"))?,
            },
            "NO_REQUISITES" => RequisiteExpression::NoRequisites {
                chunk: self.chunk.unwrap_or_default(),
            },
            "PARSE_ERROR" => RequisiteExpression::ParseError {
                error: self.error.unwrap_or_default(),
                chunk: self.chunk.unwrap_or_default(),
            },
            other => {
                return Err(RequisiteError::Backend(format!("unknown node type '{}'", other)));
            }
        };
        Ok(node)
    }

    /// `AND` operands; a bare `courses` list becomes course leaves
    fn into_operand_list(self, kind: &str) -> Result<Vec<RequisiteExpression>> {
        match (self.operands, self.courses) {
            (Some(operands), _) => operands
                .into_iter()
                .map(WireExpression::into_expression)
                .collect(),
            (None, Some(courses)) => Ok(courses.into_iter().map(RequisiteExpression::course).collect()),
            (None, None) => Err(missing(kind, "operands")),
        }
    }

    fn into_choices(self, kind: &str) -> Result<Choices> {
        match (self.operands, self.courses) {
            (Some(operands), _) => Ok(Choices::Operands(
                operands
                    .into_iter()
                    .map(WireExpression::into_expression)
                    .collect::<Result<Vec<_>>>()?,
            )),
            (None, Some(courses)) => Ok(Choices::Courses(courses)),
            (None, None) => Err(missing(kind, "operands")),
        }
    }

    fn into_course_code(self) -> Result<String> {
        if let Some(code) = self.code {
            return Ok(code);
        }
        match self.courses {
            Some(courses) => match <[String; 1]>::try_from(courses) {
                Ok([code]) => Ok(code),
                Err(courses) => Err(RequisiteError::Backend(format!(
                    "COURSE with {} codes",
                    courses.len()
                ))),
            },
            None => Err(missing("COURSE", "code")),
        }
    }
}

fn missing(kind: &str, field: &str) -> RequisiteError {
    RequisiteError::Backend(format!("{} node without '{}'", kind, field))
}
