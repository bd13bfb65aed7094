//! Pure state transition function
//!
//! Given the same state and event this always produces the same result. All
//! generation work is requested through effects and comes back as events.

use super::state::MAX_FOLLOW_UP_QUESTIONS;
use super::{Effect, Event, IntakeStep, SessionState};
use crate::catalog::Specialty;
use crate::prompt;
use std::fmt::Write;
use thiserror::Error;

pub const EMPTY_MESSAGE_REPLY: &str = "Please enter a message.";
const ASK_ADDRESS_REPLY: &str = "Could you tell me your location/address?";
const ASK_SYMPTOMS_REPLY: &str =
    "Please describe the symptoms or health concerns you are experiencing?";
const QUESTIONS_INTRO_REPLY: &str = "I understand. Let me ask you a few more specific questions to provide you with the best possible assessment.";
const ANALYSIS_STARTING_REPLY: &str = "Thank you for providing all the information. Let me analyze your symptoms and provide you with a comprehensive assessment.";
const FACILITIES_UNAVAILABLE: &str =
    "Please consult your local medical directory for nearby healthcare facilities.";
const DISCLAIMER: &str = "**Disclaimer:** This assessment is for informational purposes only. Please consult with a qualified healthcare professional for proper diagnosis and treatment.";
pub const ASSESSMENT_UNAVAILABLE_REPLY: &str = "I apologize, but I'm experiencing technical difficulties. Please consult with a healthcare professional directly for proper medical advice. You may also try starting a new consultation.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Session state is corrupted: {0}")]
    CorruptState(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl TransitionError {
    /// Whether the session must be discarded after this error
    pub fn is_fatal(&self) -> bool {
        !matches!(self, TransitionError::EmptyMessage)
    }
}

/// Pure transition function
pub fn transition(state: &SessionState, event: Event) -> Result<TransitionResult, TransitionError> {
    if let Event::UserMessage { text, .. } = &event {
        // The very first message only opens the session, so it may be blank
        if state.is_started() && text.trim().is_empty() {
            return Err(TransitionError::EmptyMessage);
        }
    }
    state.validate().map_err(TransitionError::CorruptState)?;

    match (state.step, event) {
        // ============================================================
        // Identity collection
        // ============================================================
        (IntakeStep::NotStarted, Event::UserMessage { specialty, .. }) => {
            let specialty = specialty.unwrap_or_default();
            let new_state = SessionState {
                step: IntakeStep::AskName,
                specialty,
                ..SessionState::default()
            };
            Ok(TransitionResult::new(new_state).with_effect(Effect::reply(greeting(specialty))))
        }

        (IntakeStep::AskName, Event::UserMessage { text, .. }) => {
            let name = text.trim().to_string();
            let reply = format!("Hello {name}, what's your age?");
            let new_state = SessionState {
                step: IntakeStep::AskAge,
                name: Some(name),
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state).with_effect(Effect::reply(reply)))
        }

        (IntakeStep::AskAge, Event::UserMessage { text, .. }) => {
            let new_state = SessionState {
                step: IntakeStep::AskAddress,
                age: Some(text.trim().to_string()),
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state).with_effect(Effect::reply(ASK_ADDRESS_REPLY)))
        }

        (IntakeStep::AskAddress, Event::UserMessage { text, .. }) => {
            let new_state = SessionState {
                step: IntakeStep::AskSymptoms,
                address: Some(text.trim().to_string()),
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state).with_effect(Effect::reply(ASK_SYMPTOMS_REPLY)))
        }

        (IntakeStep::AskSymptoms, Event::UserMessage { text, .. }) => {
            let new_state = SessionState {
                step: IntakeStep::AskQuestions,
                symptoms: Some(text.trim().to_string()),
                questions_asked: 0,
                responses: Default::default(),
                asked_questions: vec![],
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state).with_effect(Effect::reply(QUESTIONS_INTRO_REPLY)))
        }

        // ============================================================
        // Follow-up question loop
        // ============================================================

        // Record the answer to the previous question, then ask for the next one
        (IntakeStep::AskQuestions, Event::UserMessage { text, .. })
            if state.questions_asked < MAX_FOLLOW_UP_QUESTIONS =>
        {
            let mut new_state = state.clone();
            if new_state.questions_asked > 0 {
                new_state
                    .responses
                    .insert(new_state.questions_asked, text.trim().to_string());
            }
            Ok(TransitionResult::new(new_state).with_effect(Effect::RequestFollowUp))
        }

        // Answer to the last question: no more generation until the assessment
        (IntakeStep::AskQuestions, Event::UserMessage { text, .. }) => {
            let mut new_state = state.clone();
            new_state
                .responses
                .insert(MAX_FOLLOW_UP_QUESTIONS, text.trim().to_string());
            new_state.step = IntakeStep::FinalResponse;
            Ok(TransitionResult::new(new_state).with_effect(Effect::reply(ANALYSIS_STARTING_REPLY)))
        }

        (IntakeStep::AskQuestions, Event::FollowUpReady { question, novel })
            if state.questions_asked < MAX_FOLLOW_UP_QUESTIONS =>
        {
            let mut new_state = state.clone();
            new_state.questions_asked += 1;
            if novel {
                new_state.asked_questions.push(question.clone());
            }
            Ok(TransitionResult::new(new_state).with_effect(Effect::Reply { text: question }))
        }

        // ============================================================
        // Final assessment
        // ============================================================
        (IntakeStep::FinalResponse, Event::UserMessage { .. }) => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::RequestAssessment {
                assessment_prompt: prompt::assessment_prompt(state),
                facilities_prompt: prompt::facilities_prompt(state),
            }))
        }

        // Either outcome ends the consultation
        (IntakeStep::FinalResponse, Event::AssessmentReady { assessment, facilities }) => {
            let reply = compose_assessment(state.specialty, &assessment, facilities.as_deref());
            Ok(TransitionResult::new(SessionState::new()).with_effect(Effect::Reply { text: reply }))
        }

        (IntakeStep::FinalResponse, Event::AssessmentFailed) => {
            Ok(TransitionResult::new(SessionState::new())
                .with_effect(Effect::reply(ASSESSMENT_UNAVAILABLE_REPLY)))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (step, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {} with event {}",
            step.as_str(),
            event.kind()
        ))),
    }
}

fn greeting(specialty: Specialty) -> String {
    format!(
        "Hello! I am your AI {} specialist. {} What's your name?",
        specialty.display_name(),
        specialty.role()
    )
}

/// Final answer: cleaned assessment, facilities, disclaimer and sign-off
fn compose_assessment(specialty: Specialty, assessment: &str, facilities: Option<&str>) -> String {
    let mut reply = assessment.replace("**", "");
    let _ = write!(
        reply,
        "\n\n**Recommended Healthcare Facilities:**\n{}",
        facilities.unwrap_or(FACILITIES_UNAVAILABLE)
    );
    let _ = write!(reply, "\n\n{DISCLAIMER}");
    let _ = write!(
        reply,
        "\n\nThank you for using our AI {} consultation service. Take care!",
        specialty.display_name()
    );
    reply
}
