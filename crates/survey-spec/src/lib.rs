#![allow(missing_docs)]

pub mod accumulator;
pub mod answers;
pub mod loader;
pub mod payload;
pub mod result_id;
pub mod schema;
pub mod validate;
pub mod visibility;

pub use accumulator::{AnswerAccumulator, DEFAULT_TRIGGER_QUESTION_ID};
pub use answers::{
    AnswerSet, AnswerValue, ImageAttachments, ImageLocator, ValidationError, ValidationResult,
};
pub use loader::{
    SchemaError, load_questions, load_questions_value, parse_questions, parse_questions_value,
};
pub use payload::{
    AnsweredQuestion, EncodedImages, NO_CHOICE_ANSWER_ID, PreSurveyDetails, SubmissionPayload,
    SurveyTarget, answer_id, build_payload,
};
pub use result_id::ResultId;
pub use schema::{Choice, Datatype, MatrixType, Question, QuestionId, QuestionKind, QuestionType};
pub use validate::{ValidationScope, validate, validate_scoped};
pub use visibility::{VisibilityMap, render_order, resolve_visibility, visible_answers};
