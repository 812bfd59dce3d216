pub mod answer;
pub mod providers;
pub mod recommendations;
pub mod session;

pub use answer::{Answer, AnswerRule, AnswerSource, QuestionAnswerer};
pub use providers::{ChatProvider, OpenAiProvider};
pub use recommendations::{recommend, Recommendation};
pub use session::{ChatSession, SessionStore};
