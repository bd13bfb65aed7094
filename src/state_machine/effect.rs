//! Effects produced by state transitions

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Text to show the user for this turn
    Reply { text: String },

    /// Generate the next follow-up question through the deduper
    RequestFollowUp,

    /// Generate the final assessment, then the facility list
    RequestAssessment {
        assessment_prompt: String,
        facilities_prompt: String,
    },
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply { text: text.into() }
    }
}
