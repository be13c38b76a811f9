//! Requisite expression tree
//!
//! `RequisiteExpression` is the typed form of one logical requirement node.
//! It serializes to the JSON object shape consumed by the course schema,
//! e.g. `{"type": "N_OF", "count": 1, "courses": ["HK*3810", "ZOO*3600"]}`.

use serde::{Deserialize, Serialize};

/// One logical requirement node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RequisiteExpression {
    /// All operands required
    #[serde(rename = "AND")]
    And { operands: Vec<RequisiteExpression> },
    /// Any one choice required
    #[serde(rename = "OR")]
    Or {
        #[serde(flatten)]
        choices: Choices,
    },
    /// `count` of the choices required
    #[serde(rename = "N_OF")]
    NOf {
        count: u32,
        #[serde(flatten)]
        choices: Choices,
    },
    /// Single course, e.g. "CIS*1910"
    #[serde(rename = "COURSE")]
    Course { code: String },
    #[serde(rename = "CREDITS")]
    Credits { credits: f64 },
    #[serde(rename = "SUBJECT_CREDITS")]
    SubjectCredits { credits: f64, subject: String },
    #[serde(rename = "SUBJECT_CREDITS_AT_LEVEL")]
    SubjectCreditsAtLevel {
        credits: f64,
        subject: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level: Option<u32>,
    },
    #[serde(rename = "MIN_AVERAGE")]
    MinAverage { percentage: f64 },
    #[serde(rename = "MIN_GRADE")]
    MinGrade { course: String, percentage: f64 },
    #[serde(rename = "PROGRAM_REGISTRATION")]
    ProgramRegistration { program: String },
    #[serde(rename = "PHASE_REQUIREMENT")]
    PhaseRequirement { phase: String },
    #[serde(rename = "HIGHSCHOOL_REQUIREMENT")]
    HighschoolRequirement { description: String },
    #[serde(rename = "MIN_EXPERIENCE")]
    MinExperience { description: String },
    #[serde(rename = "PROGRESSION_STATUS")]
    ProgressionStatus { description: String },
    /// Antirequisite list
    #[serde(rename = "EXCLUDE_COURSE")]
    ExcludeCourse { courses: Vec<String> },
    /// "or equivalent" marker
    #[serde(rename = "EQUIVALENT")]
    Equivalent,
    /// Original text that could not be structured
    #[serde(rename = "RAW_UNPARSED")]
    RawUnparsed { value: String },
    /// Explicit absence of any requirement
    #[serde(rename = "NO_REQUISITES")]
    NoRequisites { chunk: String },
    /// The grammar rejected `chunk`
    #[serde(rename = "PARSE_ERROR")]
    ParseError { error: String, chunk: String },
}

/// Choice list of an `OR` / `N_OF` node
///
/// Course-only lists are stored flat as `courses` once canonicalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choices {
    Operands(Vec<RequisiteExpression>),
    Courses(Vec<String>),
}

impl Choices {
    pub fn len(&self) -> usize {
        match self {
            Choices::Operands(operands) => operands.len(),
            Choices::Courses(courses) => courses.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RequisiteExpression {
    pub fn course(code: impl Into<String>) -> Self {
        RequisiteExpression::Course { code: code.into() }
    }

    pub fn and(operands: Vec<RequisiteExpression>) -> Self {
        RequisiteExpression::And { operands }
    }

    pub fn or(operands: Vec<RequisiteExpression>) -> Self {
        RequisiteExpression::Or {
            choices: Choices::Operands(operands),
        }
    }

    pub fn or_courses<S: Into<String>>(courses: impl IntoIterator<Item = S>) -> Self {
        RequisiteExpression::Or {
            choices: Choices::Courses(courses.into_iter().map(Into::into).collect()),
        }
    }

    pub fn n_of(count: u32, operands: Vec<RequisiteExpression>) -> Self {
        RequisiteExpression::NOf {
            count,
            choices: Choices::Operands(operands),
        }
    }

    pub fn n_of_courses<S: Into<String>>(count: u32, courses: impl IntoIterator<Item = S>) -> Self {
        RequisiteExpression::NOf {
            count,
            choices: Choices::Courses(courses.into_iter().map(Into::into).collect()),
        }
    }

    pub fn no_requisites() -> Self {
        RequisiteExpression::NoRequisites {
            chunk: String::new(),
        }
    }

    pub fn parse_error(error: impl Into<String>, chunk: impl Into<String>) -> Self {
        RequisiteExpression::ParseError {
            error: error.into(),
            chunk: chunk.into(),
        }
    }

    /// The serialized `type` tag of this node
    pub fn kind(&self) -> &'static str {
        match self {
            RequisiteExpression::And { .. } => "AND",
            RequisiteExpression::Or { .. } => "OR",
            RequisiteExpression::NOf { .. } => "N_OF",
            RequisiteExpression::Course { .. } => "COURSE",
            RequisiteExpression::Credits { .. } => "CREDITS",
            RequisiteExpression::SubjectCredits { .. } => "SUBJECT_CREDITS",
            RequisiteExpression::SubjectCreditsAtLevel { .. } => "SUBJECT_CREDITS_AT_LEVEL",
            RequisiteExpression::MinAverage { .. } => "MIN_AVERAGE",
            RequisiteExpression::MinGrade { .. } => "MIN_GRADE",
            RequisiteExpression::ProgramRegistration { .. } => "PROGRAM_REGISTRATION",
            RequisiteExpression::PhaseRequirement { .. } => "PHASE_REQUIREMENT",
            RequisiteExpression::HighschoolRequirement { .. } => "HIGHSCHOOL_REQUIREMENT",
            RequisiteExpression::MinExperience { .. } => "MIN_EXPERIENCE",
            RequisiteExpression::ProgressionStatus { .. } => "PROGRESSION_STATUS",
            RequisiteExpression::ExcludeCourse { .. } => "EXCLUDE_COURSE",
            RequisiteExpression::Equivalent => "EQUIVALENT",
            RequisiteExpression::RawUnparsed { .. } => "RAW_UNPARSED",
            RequisiteExpression::NoRequisites { .. } => "NO_REQUISITES",
            RequisiteExpression::ParseError { .. } => "PARSE_ERROR",
        }
    }

    /// Course code if this node is a `COURSE` leaf
    pub fn as_course_code(&self) -> Option<&str> {
        match self {
            RequisiteExpression::Course { code } => Some(code),
            _ => None,
        }
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, RequisiteExpression::ParseError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_course() {
        let value = serde_json::to_value(RequisiteExpression::course("CIS*1910")).unwrap();
        assert_eq!(value, json!({"type": "COURSE", "code": "CIS*1910"}));
    }

    #[test]
    fn test_serialize_flat_n_of() {
        let node = RequisiteExpression::n_of_courses(1, ["HK*3810", "ZOO*3600"]);
        let value = serde_json::to_value(node).unwrap();
        assert_eq!(
            value,
            json!({"type": "N_OF", "count": 1, "courses": ["HK*3810", "ZOO*3600"]})
        );
    }

    #[test]
    fn test_serialize_nested_or() {
        let node = RequisiteExpression::or(vec![
            RequisiteExpression::and(vec![
                RequisiteExpression::course("CIS*1910"),
                RequisiteExpression::course("CIS*2500"),
            ]),
            RequisiteExpression::course("MATH*1200"),
        ]);
        let value = serde_json::to_value(node).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "OR",
                "operands": [
                    {"type": "AND", "operands": [
                        {"type": "COURSE", "code": "CIS*1910"},
                        {"type": "COURSE", "code": "CIS*2500"}
                    ]},
                    {"type": "COURSE", "code": "MATH*1200"}
                ]
            })
        );
    }

    #[test]
    fn test_serialize_markers() {
        assert_eq!(
            serde_json::to_value(RequisiteExpression::no_requisites()).unwrap(),
            json!({"type": "NO_REQUISITES", "chunk": ""})
        );
        assert_eq!(
            serde_json::to_value(RequisiteExpression::Equivalent).unwrap(),
            json!({"type": "EQUIVALENT"})
        );
    }

    #[test]
    fn test_deserialize_or_with_operands() {
        let node: RequisiteExpression = serde_json::from_value(json!({
            "type": "OR",
            "operands": [
                {"type": "COURSE", "code": "A*100"},
                {"type": "CREDITS", "credits": 2.0}
            ]
        }))
        .unwrap();
        assert_eq!(
            node,
            RequisiteExpression::or(vec![
                RequisiteExpression::course("A*100"),
                RequisiteExpression::Credits { credits: 2.0 },
            ])
        );
    }

    #[test]
    fn test_kind_and_choices_len() {
        let node = RequisiteExpression::n_of_courses(2, ["A*100", "B*200", "C*300"]);
        assert_eq!(node.kind(), "N_OF");
        if let RequisiteExpression::NOf { choices, .. } = node {
            assert_eq!(choices.len(), 3);
            assert!(!choices.is_empty());
        }
        assert_eq!(RequisiteExpression::course("A*100").as_course_code(), Some("A*100"));
    }
}
