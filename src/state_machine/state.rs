//! Intake session state types

use crate::catalog::Specialty;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of follow-up questions asked before the assessment
pub const MAX_FOLLOW_UP_QUESTIONS: u8 = 3;

/// Stage of the intake interview, in the order a session passes through them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStep {
    /// No message received yet
    #[default]
    NotStarted,
    AskName,
    AskAge,
    AskAddress,
    AskSymptoms,
    /// Follow-up question loop
    AskQuestions,
    /// All answers collected, next message triggers the assessment
    FinalResponse,
}

impl IntakeStep {
    pub fn as_str(self) -> &'static str {
        match self {
            IntakeStep::NotStarted => "not_started",
            IntakeStep::AskName => "ask_name",
            IntakeStep::AskAge => "ask_age",
            IntakeStep::AskAddress => "ask_address",
            IntakeStep::AskSymptoms => "ask_symptoms",
            IntakeStep::AskQuestions => "ask_questions",
            IntakeStep::FinalResponse => "final_response",
        }
    }
}

/// Everything collected for one consultation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub step: IntakeStep,
    pub specialty: Specialty,
    pub name: Option<String>,
    pub age: Option<String>,
    pub address: Option<String>,
    pub symptoms: Option<String>,
    /// Follow-up questions emitted so far (0..=3)
    pub questions_asked: u8,
    /// Answers keyed by the index of the question they reply to (1..=3)
    pub responses: BTreeMap<u8, String>,
    /// Accepted follow-up questions, most recent last. Only used for deduplication.
    pub asked_questions: Vec<String>,
}

impl SessionState {
    /// Fresh state for a session that has not received any message
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.step != IntakeStep::NotStarted
    }

    /// Check that the fields required by the current step are present.
    ///
    /// A state that fails this check cannot be advanced and the session has
    /// to be restarted.
    pub fn validate(&self) -> Result<(), String> {
        let missing = |field: &str| {
            Err(format!(
                "step {} requires `{field}` but it is not set",
                self.step.as_str()
            ))
        };

        if self.step >= IntakeStep::AskAge && self.name.is_none() {
            return missing("name");
        }
        if self.step >= IntakeStep::AskAddress && self.age.is_none() {
            return missing("age");
        }
        if self.step >= IntakeStep::AskSymptoms && self.address.is_none() {
            return missing("address");
        }
        if self.step >= IntakeStep::AskQuestions && self.symptoms.is_none() {
            return missing("symptoms");
        }
        if self.questions_asked > MAX_FOLLOW_UP_QUESTIONS {
            return Err(format!(
                "questions_asked is {} (max {MAX_FOLLOW_UP_QUESTIONS})",
                self.questions_asked
            ));
        }
        if self.step == IntakeStep::FinalResponse && self.questions_asked != MAX_FOLLOW_UP_QUESTIONS
        {
            return Err(format!(
                "final_response reached after {} follow-up questions",
                self.questions_asked
            ));
        }
        if self.step < IntakeStep::AskQuestions
            && (self.questions_asked > 0 || !self.responses.is_empty())
        {
            return Err(format!(
                "follow-up data present before ask_questions (step {})",
                self.step.as_str()
            ));
        }
        Ok(())
    }
}
