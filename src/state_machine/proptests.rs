//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::catalog::Specialty;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_specialty() -> impl Strategy<Value = Option<Specialty>> {
    prop_oneof![
        Just(None),
        proptest::sample::select(Specialty::ALL.to_vec()).prop_map(Some),
    ]
}

fn arb_user_message_event() -> impl Strategy<Value = Event> {
    (
        prop_oneof![
            3 => "[a-zA-Z0-9 ]{1,30}",
            1 => "[ \t]{0,3}",
        ],
        arb_specialty(),
    )
        .prop_map(|(text, specialty)| Event::UserMessage { text, specialty })
}

fn arb_follow_up_event() -> impl Strategy<Value = Event> {
    ("[a-z]{2,8}( [a-z]{2,8}){1,5}\\?", any::<bool>())
        .prop_map(|(question, novel)| Event::FollowUpReady { question, novel })
}

fn arb_assessment_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        ("[a-zA-Z* ]{1,40}", proptest::option::of("[a-zA-Z ]{1,30}")).prop_map(
            |(assessment, facilities)| Event::AssessmentReady {
                assessment,
                facilities
            }
        ),
        Just(Event::AssessmentFailed),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        4 => arb_user_message_event(),
        2 => arb_follow_up_event(),
        1 => arb_assessment_event(),
    ]
}

// ============================================================================
// Helpers
// ============================================================================

/// Answer every effect the way the executor would, with a canned question
fn settle(state: &SessionState, event: Event) -> Result<SessionState, TransitionError> {
    let mut state = state.clone();
    let mut pending = vec![event];
    while let Some(event) = pending.pop() {
        let result = transition(&state, event)?;
        state = result.new_state;
        for effect in result.effects {
            match effect {
                Effect::RequestFollowUp => pending.push(Event::FollowUpReady {
                    question: format!("question number {}", state.questions_asked + 1),
                    novel: true,
                }),
                Effect::RequestAssessment { .. } => pending.push(Event::AssessmentReady {
                    assessment: "assessment".to_string(),
                    facilities: None,
                }),
                Effect::Reply { .. } => {}
            }
        }
    }
    Ok(state)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: Valid state after any transition, counter bounded
    #[test]
    fn prop_transitions_preserve_validity(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut state = SessionState::new();

        for event in events {
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
                prop_assert!(state.validate().is_ok(), "Invalid state: {:?}", state);
                prop_assert!(state.questions_asked <= MAX_FOLLOW_UP_QUESTIONS);
            }
        }
    }

    // Invariant 2: Steps only move forward; the only way back is a full reset
    #[test]
    fn prop_steps_never_regress(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut state = SessionState::new();

        for event in events {
            if let Ok(result) = transition(&state, event) {
                let next = result.new_state;
                if next.step < state.step {
                    prop_assert_eq!(state.step, IntakeStep::FinalResponse);
                    prop_assert_eq!(&next, &SessionState::new());
                }
                if next.step == IntakeStep::AskQuestions && state.step == IntakeStep::AskQuestions {
                    prop_assert!(next.questions_asked >= state.questions_asked);
                }
                state = next;
            }
        }
    }

    // Invariant 3: Blank messages never change a started session
    #[test]
    fn prop_blank_message_changes_nothing(
        messages in proptest::collection::vec("[a-zA-Z]{1,10}", 0..9),
        blank in "[ \t\n]{0,4}",
    ) {
        let mut state = settle(&SessionState::new(), Event::user_message("hi")).unwrap();
        for message in messages {
            state = settle(&state, Event::user_message(message)).unwrap();
            if !state.is_started() {
                break;
            }
            let result = transition(&state, Event::user_message(blank.clone()));
            prop_assert_eq!(result.unwrap_err(), TransitionError::EmptyMessage);
        }
    }

    // Invariant 4: Exactly three follow-up questions before the final step
    #[test]
    fn prop_three_questions_before_final(
        specialty in arb_specialty(),
        answers in proptest::collection::vec("[a-zA-Z]{1,12}", 8),
    ) {
        let mut state = settle(
            &SessionState::new(),
            Event::UserMessage { text: "hi".to_string(), specialty },
        ).unwrap();

        // name, age, address, symptoms, then the loop
        for answer in answers {
            let before = state.clone();
            state = settle(&state, Event::user_message(answer)).unwrap();
            if state.step == IntakeStep::FinalResponse {
                prop_assert_eq!(before.questions_asked, MAX_FOLLOW_UP_QUESTIONS);
                prop_assert_eq!(state.asked_questions.len(), 3);
                prop_assert_eq!(state.responses.len(), 3);
                break;
            }
        }
        prop_assert_eq!(state.step, IntakeStep::FinalResponse);
        prop_assert_eq!(state.specialty, specialty.unwrap_or_default());
    }
}
