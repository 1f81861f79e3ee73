use std::sync::Arc;
use tracing::{error, info};

use crate::context::build_context;
use crate::db::models::Match;
use crate::llm::{CompletionError, CompletionProvider};

/// Fixed grounding instruction sent as the system message on every call.
const SYSTEM_PROMPT: &str = "You are a football match results assistant. \
Answer only using the match data supplied in the context. \
If the answer is not in the context, say you don't know. \
Be concise. Never invent scores, teams or facts.";

/// Returned without touching the network when the store is empty.
pub const NO_DATA_ANSWER: &str =
    "I don't have any match data for that date. Try `update` to fetch the latest results.";

/// Returned before any network call when the question is blank.
pub const EMPTY_QUESTION_ANSWER: &str = "Please ask a question about the matches.";

/// Combines a user question with the serialized match context and asks the
/// completion source for an answer. Never fails outward: every error becomes
/// a user-facing string that says which kind of failure occurred.
#[derive(Clone)]
pub struct AnswerService {
    completion: Arc<dyn CompletionProvider>,
    max_context_matches: usize,
}

impl AnswerService {
    pub fn new(completion: Arc<dyn CompletionProvider>, max_context_matches: usize) -> Self {
        AnswerService {
            completion,
            max_context_matches,
        }
    }

    /// Full question flow: validate, short-circuit the no-data case, build
    /// the context and run one completion attempt.
    pub async fn ask(&self, question: &str, matches: &[Match]) -> String {
        let question = question.trim();
        if question.is_empty() {
            return EMPTY_QUESTION_ANSWER.to_string();
        }
        if matches.is_empty() {
            return NO_DATA_ANSWER.to_string();
        }

        let context = build_context(matches, self.max_context_matches);
        self.answer(question, &context).await
    }

    /// Single completion attempt against a pre-built context.
    pub async fn answer(&self, question: &str, context: &str) -> String {
        let user_message = format!(
            "Here are the stored football match results:\n\n{}\n\nQuestion: {}",
            context, question
        );

        match self.completion.complete(SYSTEM_PROMPT, &user_message).await {
            Ok(text) => {
                info!("Answer generated via '{}'", self.completion.name());
                text
            }
            Err(e) => {
                error!("Completion via '{}' failed: {}", self.completion.name(), e);
                describe_failure(&e)
            }
        }
    }
}

/// Map a completion failure to user-facing text that keeps the failure class
/// visible ("service unavailable" must stay distinguishable from "no data").
fn describe_failure(err: &CompletionError) -> String {
    match err {
        CompletionError::Auth(_) => {
            "The answer service rejected our API key. Check the OPENAI_API_KEY setting.".to_string()
        }
        CompletionError::RateLimited(_) => {
            "The answer service is rate limiting us right now. Please try again in a moment."
                .to_string()
        }
        CompletionError::Http(e) => format!(
            "The answer service is unreachable right now ({}). The match data itself is fine; please try again.",
            e
        ),
        CompletionError::Status(s) => format!(
            "The answer service returned an error ({}). Please try again later.",
            s
        ),
        CompletionError::Schema(d) => format!(
            "The answer service sent back something we couldn't read ({}).",
            d
        ),
    }
}
