pub mod question;

pub use question::{Choice, Datatype, MatrixType, Question, QuestionId, QuestionKind, QuestionType};
