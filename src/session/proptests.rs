//! Property tests for the session reducer.

use super::*;
use proptest::prelude::*;

fn arb_mode() -> impl Strategy<Value = ConversationMode> {
    prop_oneof![
        Just(ConversationMode::Standard),
        Just(ConversationMode::SearchGrounded),
        Just(ConversationMode::FastResponse),
    ]
}

fn arb_event() -> impl Strategy<Value = SessionEvent> {
    prop_oneof![
        "[a-z ]{0,12}".prop_map(|text| SessionEvent::TurnStarted {
            user: TurnDraft::user(text, None),
        }),
        "[a-z ]{0,12}".prop_map(|text| SessionEvent::TurnResolved {
            reply: TurnDraft::ai(text),
        }),
        ("[a-z ]{0,12}", "[a-z ]{0,12}").prop_map(|(user, advisory)| {
            SessionEvent::TurnAdvised {
                user: TurnDraft::user(user, None),
                advisory: TurnDraft::ai(advisory),
            }
        }),
        arb_mode().prop_map(SessionEvent::ModeChanged),
    ]
}

proptest! {
    #[test]
    fn flight_never_overlaps(events in prop::collection::vec(arb_event(), 0..40)) {
        let mut state = SessionState::default();
        for event in events {
            let was_in_flight = state.is_flight_active();
            let is_start = matches!(event, SessionEvent::TurnStarted { .. });
            match transition(&state, event) {
                Ok(next) => {
                    if is_start {
                        prop_assert!(!was_in_flight);
                        prop_assert!(next.is_flight_active());
                    }
                    state = next;
                }
                Err(TransitionError::FlightActive) => prop_assert!(was_in_flight),
                Err(TransitionError::NoFlight) => prop_assert!(!was_in_flight),
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }
    }

    #[test]
    fn history_is_append_only(events in prop::collection::vec(arb_event(), 0..40)) {
        let mut state = SessionState::default();
        for event in events {
            if let Ok(next) = transition(&state, event) {
                prop_assert!(next.len() >= state.len());
                prop_assert_eq!(&next.turns()[..state.len()], state.turns());
                state = next;
            }
        }
        let ids: Vec<u64> = state.turns().iter().map(|m| m.id).collect();
        prop_assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn resolved_reply_follows_its_user_turn(events in prop::collection::vec(arb_event(), 0..40)) {
        let mut state = SessionState::default();
        for event in events {
            let is_resolve = matches!(event, SessionEvent::TurnResolved { .. });
            if let Ok(next) = transition(&state, event) {
                if is_resolve {
                    let turns = next.turns();
                    let last = turns.len() - 1;
                    prop_assert_eq!(turns[last].role, Role::Ai);
                    prop_assert_eq!(turns[last - 1].role, Role::User);
                }
                state = next;
            }
        }
    }
}
