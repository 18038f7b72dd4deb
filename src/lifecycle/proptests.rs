//! Property-based tests for the render state machine
//!
//! Whatever the platform answers, a render ends in a terminal state within
//! the attempt bound, and the simulated ledger holds exactly the live
//! message (or nothing, on failure).

use super::*;
use crate::ids::MessageId;
use proptest::prelude::*;
use std::time::Duration;

/// Platform answer to a create or edit call
#[derive(Debug, Clone, Copy)]
enum Answer {
    Ok,
    NotModified,
    NotFound,
    Transient,
    Permanent,
}

fn arb_answer() -> impl Strategy<Value = Answer> {
    prop_oneof![
        Just(Answer::Ok),
        Just(Answer::NotModified),
        Just(Answer::NotFound),
        Just(Answer::Transient),
        Just(Answer::Permanent),
    ]
}

fn arb_start() -> impl Strategy<Value = RenderEvent> {
    (proptest::option::of(1i64..1000), any::<bool>()).prop_map(|(live, same_kind)| RenderEvent::Start {
        live: live.map(MessageId),
        same_kind,
    })
}

fn create_event(answer: Answer, next_id: &mut i64) -> RenderEvent {
    match answer {
        Answer::Ok | Answer::NotModified | Answer::NotFound => {
            *next_id += 1;
            RenderEvent::Created {
                message_id: MessageId(*next_id),
            }
        }
        Answer::Transient => RenderEvent::CreateFailed {
            transient: true,
            retry_after: None,
        },
        Answer::Permanent => RenderEvent::CreateFailed {
            transient: false,
            retry_after: None,
        },
    }
}

fn edit_event(answer: Answer) -> RenderEvent {
    match answer {
        Answer::Ok => RenderEvent::Edited,
        Answer::NotModified => RenderEvent::NotModified,
        Answer::NotFound => RenderEvent::EditFailed {
            reason: EditFailure::NotFound,
        },
        Answer::Transient | Answer::Permanent => RenderEvent::EditFailed {
            reason: EditFailure::Error {
                transient: matches!(answer, Answer::Transient),
                retry_after: None,
            },
        },
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_render_terminates_with_single_live_message(
        start in arb_start(),
        answers in proptest::collection::vec(arb_answer(), 0..12),
        max_attempts in 1u32..5,
    ) {
        let policy = RetryPolicy { max_attempts, backoff: Duration::ZERO };
        let mut ledger: Vec<MessageId> = match &start {
            RenderEvent::Start { live: Some(id), .. } => vec![*id],
            _ => vec![],
        };
        let mut answers = answers.into_iter();
        let mut next_id = 1000;
        let mut state = RenderState::Idle;
        let mut pending = vec![start];
        let mut steps = 0;

        while let Some(event) = pending.pop() {
            steps += 1;
            prop_assert!(steps <= 2 * max_attempts + 2, "Render did not terminate");

            let result = transition(&state, &policy, event);
            prop_assert!(result.is_ok(), "Unexpected rejection: {:?}", result);
            let result = result.unwrap();
            state = result.new_state;
            prop_assert!(state.attempt() <= max_attempts);

            for effect in result.effects {
                let answer = answers.next().unwrap_or(Answer::Ok);
                match effect {
                    RenderEffect::Create => pending.push(create_event(answer, &mut next_id)),
                    RenderEffect::Edit { .. } => pending.push(edit_event(answer)),
                    RenderEffect::Discard { message_id } => ledger.retain(|id| *id != message_id),
                    RenderEffect::Record { message_id } => ledger.push(message_id),
                    RenderEffect::Backoff { .. } | RenderEffect::ScheduleCleanup { .. } => {}
                }
            }
        }

        prop_assert!(state.is_terminal(), "Stopped in {:?}", state);
        match state {
            RenderState::Live { message_id } => prop_assert_eq!(ledger, vec![message_id]),
            RenderState::Failed { .. } => prop_assert!(ledger.is_empty(), "Leaked {:?}", ledger),
            _ => unreachable!(),
        }
    }

    #[test]
    fn prop_only_create_and_edit_produce_events(start in arb_start()) {
        let result = transition(&RenderState::Idle, &RetryPolicy::default(), start).unwrap();
        let producing = result.effects.iter().filter(|e| e.produces_event()).count();
        prop_assert_eq!(producing, 1);
    }
}
