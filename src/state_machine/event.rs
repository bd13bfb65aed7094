//! Events that can occur in an intake session

use crate::catalog::Specialty;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // User events
    UserMessage {
        text: String,
        /// Only honoured when the session starts
        specialty: Option<Specialty>,
    },

    // Generation events
    FollowUpReady {
        question: String,
        /// False for fallback texts, which are shown but not remembered for dedup
        novel: bool,
    },
    AssessmentReady {
        assessment: String,
        /// `None` when the facility lookup failed
        facilities: Option<String>,
    },
    AssessmentFailed,
}

impl Event {
    #[allow(dead_code)] // Used by tests
    pub fn user_message(text: impl Into<String>) -> Self {
        Event::UserMessage {
            text: text.into(),
            specialty: None,
        }
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Event::UserMessage { .. } => "user_message",
            Event::FollowUpReady { .. } => "follow_up_ready",
            Event::AssessmentReady { .. } => "assessment_ready",
            Event::AssessmentFailed => "assessment_failed",
        }
    }
}
