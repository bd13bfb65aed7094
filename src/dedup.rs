//! Follow-up question deduplication
//!
//! Asks the generation service for a follow-up question until it returns one
//! that does not overlap any question already asked in the session. The
//! number of attempts is bounded; past the bound a canned clarifying question
//! is used instead.

use crate::llm::{LlmError, LlmRequest, LlmService};
use crate::prompt;
use crate::similarity;
use crate::state_machine::SessionState;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Asked when every attempt came back as a repeat
pub const CLARIFYING_QUESTION: &str = "Is there anything else about your symptoms you haven't mentioned yet, such as when they started or what makes them better or worse?";

const FOLLOW_UP_MAX_TOKENS: u32 = 256;

/// Outcome of a deduplicated follow-up request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// A question distinct from everything asked so far
    Accepted { question: String, attempts: u32 },
    /// Every attempt was a repeat
    Exhausted { attempts: u32 },
}

impl FollowUp {
    pub fn attempts(&self) -> u32 {
        match self {
            FollowUp::Accepted { attempts, .. } | FollowUp::Exhausted { attempts } => *attempts,
        }
    }

    /// Text to show the user and whether it should be remembered for dedup
    pub fn into_question(self) -> (String, bool) {
        match self {
            FollowUp::Accepted { question, .. } => (question, true),
            FollowUp::Exhausted { .. } => (CLARIFYING_QUESTION.to_string(), false),
        }
    }
}

/// Bounded retry loop around follow-up generation
#[derive(Debug, Clone)]
pub struct QuestionDeduper {
    max_attempts: u32,
}

impl Default for QuestionDeduper {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl QuestionDeduper {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Generate the next follow-up question for `state`.
    ///
    /// Transport failures and empty output end the loop at once with an
    /// error; only repeats are retried.
    pub async fn next_question(
        &self,
        llm: &dyn LlmService,
        state: &SessionState,
    ) -> Result<FollowUp, LlmError> {
        let request =
            LlmRequest::new(prompt::follow_up_prompt(state)).with_max_tokens(FOLLOW_UP_MAX_TOKENS);

        for attempt in 1..=self.max_attempts {
            let response = llm.complete(&request).await?;
            let question = response.text.trim();
            if question.is_empty() {
                return Err(LlmError::malformed("Generated follow-up question is empty"));
            }

            if similarity::is_repeat(question, &state.asked_questions) {
                tracing::debug!(attempt, question, "Rejected follow-up question as a repeat");
                continue;
            }

            return Ok(FollowUp::Accepted {
                question: question.to_string(),
                attempts: attempt,
            });
        }

        tracing::warn!(
            attempts = self.max_attempts,
            "No distinct follow-up question generated, using clarifying question"
        );
        Ok(FollowUp::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Specialty;
    use crate::llm::LlmErrorKind;
    use crate::runtime::testing::MockLlmService;
    use crate::state_machine::IntakeStep;
    use proptest::prelude::*;

    fn state_with(asked: &[&str]) -> SessionState {
        SessionState {
            step: IntakeStep::AskQuestions,
            specialty: Specialty::Dentist,
            name: Some("Ana".to_string()),
            age: Some("34".to_string()),
            address: Some("Lisbon".to_string()),
            symptoms: Some("tooth pain".to_string()),
            asked_questions: asked.iter().map(|q| (*q).to_string()).collect(),
            ..SessionState::default()
        }
    }

    #[tokio::test]
    async fn test_accepts_distinct_question_first_try() {
        let mock = MockLlmService::new();
        mock.queue_text("  Is the gum around the tooth swollen?\n");
        let state = state_with(&["How long has the pain lasted?"]);

        let outcome = QuestionDeduper::default()
            .next_question(&mock, &state)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            FollowUp::Accepted {
                question: "Is the gum around the tooth swollen?".to_string(),
                attempts: 1
            }
        );
        let prompts = mock.recorded_prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("How long has the pain lasted?"));
    }

    #[tokio::test]
    async fn test_retries_after_repeat() {
        let mock = MockLlmService::new();
        mock.queue_text("how long has the pain lasted");
        mock.queue_text("Does cold water trigger the pain?");
        let state = state_with(&["How long has the pain lasted?"]);

        let outcome = QuestionDeduper::default()
            .next_question(&mock, &state)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            FollowUp::Accepted {
                question: "Does cold water trigger the pain?".to_string(),
                attempts: 2
            }
        );
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_same_answer_forever_stops_at_bound() {
        let mock = MockLlmService::repeating("How long has the pain lasted?");
        let state = state_with(&["How long has the pain lasted?"]);

        let outcome = QuestionDeduper::default()
            .next_question(&mock, &state)
            .await
            .unwrap();

        assert_eq!(outcome, FollowUp::Exhausted { attempts: 5 });
        assert_eq!(mock.call_count(), DEFAULT_MAX_ATTEMPTS as usize);
        assert_eq!(
            outcome.into_question(),
            (CLARIFYING_QUESTION.to_string(), false)
        );
    }

    #[tokio::test]
    async fn test_first_question_has_nothing_to_repeat() {
        let mock = MockLlmService::repeating("How long has the pain lasted?");
        let outcome = QuestionDeduper::default()
            .next_question(&mock, &state_with(&[]))
            .await
            .unwrap();
        assert!(matches!(outcome, FollowUp::Accepted { attempts: 1, .. }));
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_retried() {
        let mock = MockLlmService::new();
        mock.queue_error(LlmError::server_error("unavailable"));
        mock.queue_text("never reached");

        let err = QuestionDeduper::default()
            .next_question(&mock, &state_with(&[]))
            .await
            .unwrap_err();

        assert_eq!(err.kind, LlmErrorKind::ServerError);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_output_is_malformed() {
        let mock = MockLlmService::new();
        mock.queue_text("   \n ");
        let err = QuestionDeduper::default()
            .next_question(&mock, &state_with(&[]))
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::MalformedResponse);
    }

    #[test]
    fn test_zero_attempts_is_clamped() {
        assert_eq!(QuestionDeduper::new(0).max_attempts(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        // Whatever the service produces, accepted questions never overlap
        #[test]
        fn prop_accepted_questions_stay_distinct(
            outputs in proptest::collection::vec("[a-e]{1,2}( [a-e]{1,2}){0,3}", 1..30)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let mock = MockLlmService::new();
            for output in &outputs {
                mock.queue_text(output.clone());
            }
            let deduper = QuestionDeduper::default();
            let mut state = state_with(&[]);

            for _ in 0..3 {
                match runtime.block_on(deduper.next_question(&mock, &state)) {
                    Ok(outcome) => {
                        let (question, novel) = outcome.into_question();
                        if novel {
                            state.asked_questions.push(question);
                        }
                    }
                    Err(_) => break,
                }
            }

            for (i, a) in state.asked_questions.iter().enumerate() {
                for b in state.asked_questions.iter().skip(i + 1) {
                    prop_assert!(similarity::score(a, b) <= similarity::SIMILARITY_THRESHOLD);
                }
            }
        }
    }
}
