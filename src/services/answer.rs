//! Free-text question answering
//!
//! Replies come from an ordered rule list: the locality gate first, then the
//! canned keyword replies, and only then the hosted chat-completion API. The
//! first rule that produces a reply wins. API failures are folded into the
//! reply text and never reach the caller as errors.

use serde::Serialize;
use std::sync::Arc;

use crate::{models::CompletionMessage, services::providers::ChatProvider};

pub const CHATBOT_NAME: &str = "성실당 챗봇";

/// Substrings that mark a question as being about the served area
pub const LOCALITY_KEYWORDS: [&str; 2] = ["대전", "중구"];

pub const REFUSAL_MESSAGE: &str =
    "이 서비스는 대전 중구 관련 정보만 제공합니다. 대전 중구와 관련된 질문을 해주세요.";

pub fn welcome_message() -> String {
    format!(
        "안녕하세요! 저는 대전 중구 지역경제 활성화를 위해 노력하는 {CHATBOT_NAME}입니다. \
         관광 명소, 소상공인 정보, 장소 추천 등 궁금한 점이 있다면 편하게 질문해주세요! \
         좌측 상단 추천 필터의 카테고리와 여유 시간을 선택하여 추천을 받을 수 있습니다.\n\n\
         주의: 이 챗봇은 오직 **대전 중구 관련 정보**만 제공합니다."
    )
}

pub fn system_preamble() -> String {
    format!("당신은 대전 중구 관련 도움을 제공하는 {CHATBOT_NAME}입니다.")
}

/// Question sent when the user asks for more about a recommended place
pub fn place_search_question(name: &str) -> String {
    format!("대전 중구 {name}에 대해 알려주세요.")
}

/// One step of the rule list
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerRule {
    /// Refuses unless the text contains at least one keyword
    LocalityGate {
        keywords: Vec<String>,
        refusal: String,
    },
    /// Replies with `reply` when the text contains any keyword
    Canned {
        name: String,
        keywords: Vec<String>,
        reply: String,
    },
}

impl AnswerRule {
    fn reply_for(&self, text: &str) -> Option<&str> {
        match self {
            AnswerRule::LocalityGate { keywords, refusal } => {
                let in_scope = keywords.iter().any(|k| text.contains(k.as_str()));
                (!in_scope).then_some(refusal.as_str())
            }
            AnswerRule::Canned {
                keywords, reply, ..
            } => keywords
                .iter()
                .any(|k| text.contains(k.as_str()))
                .then_some(reply.as_str()),
        }
    }

    fn source(&self) -> AnswerSource {
        match self {
            AnswerRule::LocalityGate { .. } => AnswerSource::LocalityRefusal,
            AnswerRule::Canned { name, .. } => AnswerSource::Canned(name.clone()),
        }
    }
}

/// Default ordering: locality gate, then canned replies
pub fn default_rules() -> Vec<AnswerRule> {
    vec![
        AnswerRule::LocalityGate {
            keywords: LOCALITY_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            refusal: REFUSAL_MESSAGE.to_string(),
        },
        AnswerRule::Canned {
            name: "recommendation_filter".to_string(),
            keywords: vec!["추천".to_string()],
            reply: "장소 추천은 추천 필터에서 카테고리와 여유 시간을 선택한 뒤 \
                    '추천받기'를 눌러주세요. 조건에 맞는 장소를 최대 3곳까지 알려드립니다."
                .to_string(),
        },
        AnswerRule::Canned {
            name: "chatbot_intro".to_string(),
            keywords: vec!["누구".to_string(), "자기소개".to_string()],
            reply: format!(
                "저는 대전 중구의 관광 명소와 소상공인 정보를 안내하는 {CHATBOT_NAME}입니다."
            ),
        },
    ]
}

/// Which rule produced a reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rule", rename_all = "snake_case")]
pub enum AnswerSource {
    LocalityRefusal,
    Canned(String),
    Completion,
    CompletionError,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    pub source: AnswerSource,
}

/// Runs the rule list and falls back to the chat provider
#[derive(Clone)]
pub struct QuestionAnswerer {
    rules: Vec<AnswerRule>,
    provider: Arc<dyn ChatProvider>,
    system_prompt: String,
}

impl QuestionAnswerer {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self::with_rules(provider, default_rules())
    }

    pub fn with_rules(provider: Arc<dyn ChatProvider>, rules: Vec<AnswerRule>) -> Self {
        Self {
            rules,
            provider,
            system_prompt: system_preamble(),
        }
    }

    /// Evaluates only the local rules; `None` means the API would be called.
    pub fn match_rules(&self, text: &str) -> Option<Answer> {
        self.rules.iter().find_map(|rule| {
            rule.reply_for(text).map(|reply| Answer {
                text: reply.to_string(),
                source: rule.source(),
            })
        })
    }

    /// Always returns something displayable
    pub async fn answer(&self, text: &str) -> Answer {
        if let Some(answer) = self.match_rules(text) {
            tracing::debug!(source = ?answer.source, "Answered by local rule");
            return answer;
        }

        self.complete(text).await
    }

    /// Asks the API about a recommended place. Canned rules are not consulted.
    pub async fn answer_place_search(&self, name: &str) -> (String, Answer) {
        let question = place_search_question(name);
        let answer = self.complete(&question).await;
        (question, answer)
    }

    async fn complete(&self, text: &str) -> Answer {
        let messages = vec![
            CompletionMessage::system(self.system_prompt.clone()),
            CompletionMessage::user(text),
        ];

        match self.provider.complete(messages).await {
            Ok(content) => Answer {
                text: content,
                source: AnswerSource::Completion,
            },
            Err(e) => {
                tracing::warn!(error = %e, provider = self.provider.name(), "Chat completion failed");
                Answer {
                    text: format!("오류 발생: {}", e),
                    source: AnswerSource::CompletionError,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::providers::MockChatProvider;

    fn answerer_with(mock: MockChatProvider) -> QuestionAnswerer {
        QuestionAnswerer::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_out_of_area_question_is_refused_without_api_call() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete().never();

        let answer = answerer_with(mock).answer("오늘 날씨 어때?").await;

        assert_eq!(answer.text, REFUSAL_MESSAGE);
        assert_eq!(answer.source, AnswerSource::LocalityRefusal);
    }

    #[tokio::test]
    async fn test_locality_gate_runs_before_canned_rules() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete().never();

        // "추천" alone would hit a canned rule, but the gate comes first
        let answer = answerer_with(mock).answer("맛집 추천해줘").await;
        assert_eq!(answer.source, AnswerSource::LocalityRefusal);
    }

    #[tokio::test]
    async fn test_canned_rule_short_circuits_the_api() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete().never();

        let answer = answerer_with(mock).answer("대전 중구 카페 추천해줘").await;
        assert_eq!(
            answer.source,
            AnswerSource::Canned("recommendation_filter".to_string())
        );
    }

    #[tokio::test]
    async fn test_in_area_question_is_forwarded_with_preamble() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete()
            .withf(|messages| {
                messages.len() == 2
                    && messages[0].role == "system"
                    && messages[0].content == system_preamble()
                    && messages[1].role == "user"
                    && messages[1].content == "중구 은행동은 어떤 곳이야?"
            })
            .times(1)
            .returning(|_| Ok("은행동은 대전 중구의 번화가입니다.".to_string()));
        mock.expect_name().return_const("mock");

        let answer = answerer_with(mock).answer("중구 은행동은 어떤 곳이야?").await;

        assert_eq!(answer.text, "은행동은 대전 중구의 번화가입니다.");
        assert_eq!(answer.source, AnswerSource::Completion);
    }

    #[tokio::test]
    async fn test_api_error_becomes_reply_text() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete()
            .returning(|_| Err(AppError::ExternalApi("rate limited".to_string())));
        mock.expect_name().return_const("mock");

        let answer = answerer_with(mock).answer("대전 역사 알려줘").await;

        assert_eq!(answer.text, "오류 발생: External API error: rate limited");
        assert_eq!(answer.source, AnswerSource::CompletionError);
    }

    #[tokio::test]
    async fn test_place_search_skips_canned_rules() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete()
            .withf(|messages| messages[1].content == "대전 중구 추천빵집에 대해 알려주세요.")
            .times(1)
            .returning(|_| Ok("추천빵집은 은행동의 빵집입니다.".to_string()));
        mock.expect_name().return_const("mock");

        let (question, answer) = answerer_with(mock).answer_place_search("추천빵집").await;

        assert_eq!(question, "대전 중구 추천빵집에 대해 알려주세요.");
        assert_eq!(answer.text, "추천빵집은 은행동의 빵집입니다.");
        assert_eq!(answer.source, AnswerSource::Completion);
    }

    #[test]
    fn test_custom_rule_order_is_respected() {
        let rules = vec![
            AnswerRule::Canned {
                name: "first".to_string(),
                keywords: vec!["빵".to_string()],
                reply: "one".to_string(),
            },
            AnswerRule::Canned {
                name: "second".to_string(),
                keywords: vec!["빵".to_string()],
                reply: "two".to_string(),
            },
        ];
        let answerer = QuestionAnswerer::with_rules(Arc::new(MockChatProvider::new()), rules);

        let answer = answerer.match_rules("빵집").unwrap();
        assert_eq!(answer.text, "one");
        assert!(answerer.match_rules("커피").is_none());
    }
}
