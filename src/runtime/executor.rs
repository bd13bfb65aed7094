//! Intake engine: drives the pure state machine and executes its effects

use crate::catalog::Specialty;
use crate::dedup::QuestionDeduper;
use crate::llm::LlmService;
use crate::state_machine::transition::EMPTY_MESSAGE_REPLY;
use crate::state_machine::{transition, Effect, Event, SessionState, TransitionError};
use std::sync::Arc;

/// Shown when the follow-up question could not be generated at all
pub const FOLLOW_UP_UNAVAILABLE: &str = "I'm having trouble generating the next question. Could you provide more details about your symptoms or any specific concerns you have?";

/// Shown when a session had to be discarded
pub const SESSION_RESET_REPLY: &str = "Something went wrong with this consultation and it has been reset. Please start a new consultation by sending any message.";

/// Stateless engine shared by all sessions. Owns the generation service
/// handle and the dedup policy; session state is passed in and handed back.
pub struct IntakeEngine {
    llm: Arc<dyn LlmService>,
    deduper: QuestionDeduper,
}

impl IntakeEngine {
    pub fn new(llm: Arc<dyn LlmService>, deduper: QuestionDeduper) -> Self {
        Self { llm, deduper }
    }

    /// Process one user message.
    ///
    /// Returns the reply text and the state to keep for the session. A state
    /// equal to `SessionState::new()` after a started session means the
    /// consultation is over.
    pub async fn advance(
        &self,
        state: SessionState,
        specialty: Option<Specialty>,
        message: &str,
    ) -> (String, SessionState) {
        let event = Event::UserMessage {
            text: message.to_string(),
            specialty,
        };

        match self.process_event(state.clone(), event).await {
            Ok((replies, new_state)) => (replies.join("\n\n"), new_state),
            Err(e) if !e.is_fatal() => (EMPTY_MESSAGE_REPLY.to_string(), state),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    step = state.step.as_str(),
                    "Discarding session after failed transition"
                );
                (SESSION_RESET_REPLY.to_string(), SessionState::new())
            }
        }
    }

    async fn process_event(
        &self,
        mut state: SessionState,
        event: Event,
    ) -> Result<(Vec<String>, SessionState), TransitionError> {
        let mut replies = Vec::new();
        // We need to process events in a loop to handle chained effects
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            let kind = current_event.kind();
            let result = transition(&state, current_event)?;

            if result.new_state.step != state.step {
                tracing::debug!(
                    event = kind,
                    from = state.step.as_str(),
                    to = result.new_state.step.as_str(),
                    "Intake step changed"
                );
            }
            state = result.new_state;

            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(&state, effect, &mut replies).await
                {
                    events_to_process.push(generated_event);
                }
            }
        }

        Ok((replies, state))
    }

    async fn execute_effect(
        &self,
        state: &SessionState,
        effect: Effect,
        replies: &mut Vec<String>,
    ) -> Option<Event> {
        match effect {
            Effect::Reply { text } => {
                replies.push(text);
                None
            }

            Effect::RequestFollowUp => {
                let event = match self.deduper.next_question(self.llm.as_ref(), state).await {
                    Ok(outcome) => {
                        tracing::debug!(attempts = outcome.attempts(), "Follow-up question ready");
                        let (question, novel) = outcome.into_question();
                        Event::FollowUpReady { question, novel }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, kind = ?e.kind, "Follow-up generation failed");
                        Event::FollowUpReady {
                            question: FOLLOW_UP_UNAVAILABLE.to_string(),
                            novel: false,
                        }
                    }
                };
                Some(event)
            }

            Effect::RequestAssessment {
                assessment_prompt,
                facilities_prompt,
            } => {
                let assessment = match self.llm.generate(&assessment_prompt).await {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!(error = %e, kind = ?e.kind, "Assessment generation failed");
                        return Some(Event::AssessmentFailed);
                    }
                };

                let facilities = match self.llm.generate(&facilities_prompt).await {
                    Ok(text) => Some(text),
                    Err(e) => {
                        tracing::warn!(error = %e, kind = ?e.kind, "Facility lookup failed");
                        None
                    }
                };

                Some(Event::AssessmentReady {
                    assessment,
                    facilities,
                })
            }
        }
    }
}
