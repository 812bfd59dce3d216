mod chat;
mod place;

pub use chat::{
    ApiChoice, ApiChoiceMessage, ApiCompletionResponse, ChatMessage, CompletionMessage,
    CompletionRequest, Speaker,
};
pub use place::{Place, TimeBucket, KM_PER_DRIVE_MINUTE};
