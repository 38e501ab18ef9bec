//! Rule analyzer implementations

mod openai;

pub use openai::OpenAiRuleAnalyzer;
