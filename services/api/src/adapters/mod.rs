pub mod db;
pub mod prompt_llm;

pub use db::DbAdapter;
pub use prompt_llm::OpenAiPromptAdapter;
