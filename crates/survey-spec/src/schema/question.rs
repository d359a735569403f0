use serde::{Deserialize, Serialize};

/// Numeric identifier of a question; doubles as its sort key.
pub type QuestionId = u32;

/// Question type tag as it appears in the bundled schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "User Input")]
    UserInput,
    #[serde(rename = "Single Choice")]
    SingleChoice,
    Matrix,
    Image,
}

/// Input flavour for free-text questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Datatype {
    Number,
    #[default]
    Text,
}

/// Presentation of a matrix question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatrixType {
    #[default]
    DropDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
enum Mandatory {
    Yes,
    #[default]
    No,
}

/// One selectable option of a choice or matrix question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(rename = "ChoiceText")]
    pub text: String,
}

impl Choice {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Shape-specific part of a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    UserInput { datatype: Datatype },
    SingleChoice { choices: Vec<Choice> },
    Matrix { matrix_type: MatrixType, choices: Vec<Choice> },
    Image,
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            Self::UserInput { .. } => QuestionType::UserInput,
            Self::SingleChoice { .. } => QuestionType::SingleChoice,
            Self::Matrix { .. } => QuestionType::Matrix,
            Self::Image => QuestionType::Image,
        }
    }
}

/// Definition of a single survey question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "QuestionRecord", into = "QuestionRecord")]
pub struct Question {
    pub id: QuestionId,
    pub label: String,
    pub mandatory: bool,
    pub kind: QuestionKind,
}

impl Question {
    pub fn new(id: QuestionId, label: impl Into<String>, mandatory: bool, kind: QuestionKind) -> Self {
        Self {
            id,
            label: label.into(),
            mandatory,
            kind,
        }
    }

    /// Options offered by the question; empty for free-text and image questions.
    pub fn choices(&self) -> &[Choice] {
        match &self.kind {
            QuestionKind::SingleChoice { choices } | QuestionKind::Matrix { choices, .. } => {
                choices
            }
            QuestionKind::UserInput { .. } | QuestionKind::Image => &[],
        }
    }

    /// 1-based position of the choice whose text equals `value` exactly.
    pub fn choice_position(&self, value: &str) -> Option<usize> {
        self.choices()
            .iter()
            .position(|choice| choice.text == value)
            .map(|idx| idx + 1)
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, QuestionKind::Image)
    }
}

/// Flat wire representation used by the bundled schema files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QuestionRecord {
    #[serde(rename = "QuestionID")]
    question_id: QuestionId,
    question: String,
    questiontype: QuestionType,
    #[serde(default)]
    mandatory: Mandatory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    datatype: Option<Datatype>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    matrixtype: Option<MatrixType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    choices: Vec<Choice>,
}

impl From<QuestionRecord> for Question {
    fn from(record: QuestionRecord) -> Self {
        let kind = match record.questiontype {
            QuestionType::UserInput => QuestionKind::UserInput {
                datatype: record.datatype.unwrap_or_default(),
            },
            QuestionType::SingleChoice => QuestionKind::SingleChoice {
                choices: record.choices,
            },
            QuestionType::Matrix => QuestionKind::Matrix {
                matrix_type: record.matrixtype.unwrap_or_default(),
                choices: record.choices,
            },
            QuestionType::Image => QuestionKind::Image,
        };
        Self {
            id: record.question_id,
            label: record.question,
            mandatory: record.mandatory == Mandatory::Yes,
            kind,
        }
    }
}

impl From<Question> for QuestionRecord {
    fn from(question: Question) -> Self {
        let questiontype = question.kind.question_type();
        let (datatype, matrixtype, choices) = match question.kind {
            QuestionKind::UserInput { datatype } => (Some(datatype), None, Vec::new()),
            QuestionKind::SingleChoice { choices } => (None, None, choices),
            QuestionKind::Matrix {
                matrix_type,
                choices,
            } => (None, Some(matrix_type), choices),
            QuestionKind::Image => (None, None, Vec::new()),
        };
        Self {
            question_id: question.id,
            question: question.label,
            questiontype,
            mandatory: if question.mandatory {
                Mandatory::Yes
            } else {
                Mandatory::No
            },
            datatype,
            matrixtype,
            choices,
        }
    }
}
