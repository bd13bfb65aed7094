//! Prompt construction for the generation service
//!
//! Every prompt is a pure function of the session state and the specialty
//! role text, so formatting can be checked without a live model.

use crate::state_machine::SessionState;
use std::fmt::Write;

/// Prompt asking for one new follow-up question.
///
/// Lists every question already asked in the session so the model avoids
/// repeating them.
pub fn follow_up_prompt(state: &SessionState) -> String {
    let specialty = state.specialty;
    let mut prompt = format!(
        "{role} The patient reported these symptoms: {symptoms}. \
         Ask ONE specific, clear follow-up question to gather more diagnostic information. \
         Keep it professional and concise. Reply with the question only.",
        role = specialty.role(),
        symptoms = field(state.symptoms.as_deref()),
    );

    if state.asked_questions.is_empty() {
        prompt.push_str(" No follow-up questions have been asked yet.");
    } else {
        prompt.push_str(" Avoid asking questions similar to these already asked:");
        for question in &state.asked_questions {
            let _ = write!(prompt, "\n- {question}");
        }
        prompt.push('\n');
    }

    let _ = write!(prompt, " Focus on {} specialty areas.", specialty.key());
    prompt
}

/// Prompt for the four-part final assessment
pub fn assessment_prompt(state: &SessionState) -> String {
    let specialty = state.specialty.key();
    let mut answers = String::new();
    if state.responses.is_empty() {
        answers.push_str("none");
    } else {
        for (index, answer) in &state.responses {
            let _ = write!(answers, "\n- question_{index}: {answer}");
        }
    }

    format!(
        "{role} Patient Details - Name: {name}, Age: {age}, Location: {address}. \
         Primary Symptoms: {symptoms}. \
         Additional Information: {answers}\n\
         As a {specialty} specialist, provide a professional assessment with: \
         1. **Possible Diagnosis**: Brief assessment based on symptoms \
         2. **Recommended Treatment**: Professional recommendations \
         3. **Important Precautions**: Key safety measures \
         4. **Next Steps**: When to seek immediate care \
         Keep the response professional, clear, and within your {specialty} specialty.",
        role = state.specialty.role(),
        name = field(state.name.as_deref()),
        age = field(state.age.as_deref()),
        address = field(state.address.as_deref()),
        symptoms = field(state.symptoms.as_deref()),
    )
}

/// Prompt for a short list of nearby facilities
pub fn facilities_prompt(state: &SessionState) -> String {
    format!(
        "List 3-5 reputable hospitals or medical centers near {address} that have {specialty} specialists.",
        address = field(state.address.as_deref()),
        specialty = state.specialty.key(),
    )
}

fn field(value: Option<&str>) -> &str {
    value.unwrap_or("not provided")
}
