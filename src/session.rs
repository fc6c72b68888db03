//! Conversation state and its pure transitions.
//!
//! The message log, the selected mode and the in-flight flag live in one
//! [`SessionState`] value. Every change goes through [`transition`], which
//! never touches its input; callers swap the returned value into a
//! [`SessionStore`].

use crate::policy::ConversationMode;
use crate::types::{Message, Role, TurnDraft};
use thiserror::Error;

#[cfg(test)]
mod proptests;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    turns: Vec<Message>,
    mode: ConversationMode,
    in_flight: bool,
    next_id: u64,
}

impl SessionState {
    pub fn new(mode: ConversationMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn turns(&self) -> &[Message] {
        &self.turns
    }

    pub fn mode(&self) -> ConversationMode {
        self.mode
    }

    pub fn is_flight_active(&self) -> bool {
        self.in_flight
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last_turn(&self) -> Option<&Message> {
        self.turns.last()
    }

    fn append(&mut self, draft: TurnDraft) {
        let message = draft.into_message(self.next_id);
        self.next_id += 1;
        self.turns.push(message);
    }
}

#[derive(Clone, Debug)]
pub enum SessionEvent {
    /// User turn accepted and dispatched to the gateway.
    TurnStarted { user: TurnDraft },
    /// The in-flight turn got its AI reply (answer or diagnostic).
    TurnResolved { reply: TurnDraft },
    /// User turn answered locally, without a gateway call.
    TurnAdvised { user: TurnDraft, advisory: TurnDraft },
    ModeChanged(ConversationMode),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A response is already in flight")]
    FlightActive,
    #[error("No response is in flight")]
    NoFlight,
    #[error("Expected a {expected:?} turn, got {actual:?}")]
    WrongRole { expected: Role, actual: Role },
}

fn expect_role(draft: &TurnDraft, expected: Role) -> Result<(), TransitionError> {
    if draft.role == expected {
        Ok(())
    } else {
        Err(TransitionError::WrongRole {
            expected,
            actual: draft.role,
        })
    }
}

pub fn transition(
    state: &SessionState,
    event: SessionEvent,
) -> Result<SessionState, TransitionError> {
    match event {
        SessionEvent::TurnStarted { user } => {
            if state.in_flight {
                return Err(TransitionError::FlightActive);
            }
            expect_role(&user, Role::User)?;
            let mut next = state.clone();
            next.append(user);
            next.in_flight = true;
            Ok(next)
        }
        SessionEvent::TurnResolved { reply } => {
            if !state.in_flight {
                return Err(TransitionError::NoFlight);
            }
            expect_role(&reply, Role::Ai)?;
            let mut next = state.clone();
            next.append(reply);
            next.in_flight = false;
            Ok(next)
        }
        SessionEvent::TurnAdvised { user, advisory } => {
            if state.in_flight {
                return Err(TransitionError::FlightActive);
            }
            expect_role(&user, Role::User)?;
            expect_role(&advisory, Role::Ai)?;
            let mut next = state.clone();
            next.append(user);
            next.append(advisory);
            Ok(next)
        }
        SessionEvent::ModeChanged(mode) => {
            let mut next = state.clone();
            next.mode = mode;
            Ok(next)
        }
    }
}

/// Where the live session state is kept between transitions.
pub trait SessionStore {
    fn current(&self) -> SessionState;
    fn replace(&mut self, state: SessionState);

    /// Applies one event to the stored state.
    fn apply(&mut self, event: SessionEvent) -> Result<(), TransitionError> {
        let next = transition(&self.current(), event)?;
        self.replace(next);
        Ok(())
    }
}

/// Plain in-memory session holder used by the terminal front end and tests.
#[derive(Clone, Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new(mode: ConversationMode) -> Self {
        Self {
            state: SessionState::new(mode),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }
}

impl SessionStore for Session {
    fn current(&self) -> SessionState {
        self.state.clone()
    }

    fn replace(&mut self, state: SessionState) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(state: &SessionState, text: &str) -> SessionState {
        transition(
            state,
            SessionEvent::TurnStarted {
                user: TurnDraft::user(text, None),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_new_session_is_empty_and_idle() {
        let state = SessionState::new(ConversationMode::FastResponse);
        assert!(state.is_empty());
        assert!(!state.is_flight_active());
        assert_eq!(state.mode(), ConversationMode::FastResponse);
    }

    #[test]
    fn test_turn_start_and_resolve() {
        let idle = SessionState::default();
        let busy = started(&idle, "hello");
        assert!(busy.is_flight_active());
        assert_eq!(busy.len(), 1);
        // input left untouched
        assert!(idle.is_empty());

        let done = transition(
            &busy,
            SessionEvent::TurnResolved {
                reply: TurnDraft::ai("hi there"),
            },
        )
        .unwrap();
        assert!(!done.is_flight_active());
        assert_eq!(done.turns()[0].role, Role::User);
        assert_eq!(done.turns()[1].role, Role::Ai);
        assert_eq!(done.turns()[1].content, "hi there");
    }

    #[test]
    fn test_second_start_while_in_flight_is_rejected() {
        let busy = started(&SessionState::default(), "one");
        let err = transition(
            &busy,
            SessionEvent::TurnStarted {
                user: TurnDraft::user("two", None),
            },
        )
        .unwrap_err();
        assert_eq!(err, TransitionError::FlightActive);
    }

    #[test]
    fn test_resolve_without_flight_is_rejected() {
        let err = transition(
            &SessionState::default(),
            SessionEvent::TurnResolved {
                reply: TurnDraft::ai("orphan"),
            },
        )
        .unwrap_err();
        assert_eq!(err, TransitionError::NoFlight);
    }

    #[test]
    fn test_advised_appends_pair_without_flight() {
        let state = transition(
            &SessionState::default(),
            SessionEvent::TurnAdvised {
                user: TurnDraft::user("look", None),
                advisory: TurnDraft::ai("not here"),
            },
        )
        .unwrap();
        assert_eq!(state.len(), 2);
        assert!(!state.is_flight_active());
    }

    #[test]
    fn test_roles_are_checked() {
        let err = transition(
            &SessionState::default(),
            SessionEvent::TurnStarted {
                user: TurnDraft::ai("pretending"),
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            TransitionError::WrongRole {
                expected: Role::User,
                actual: Role::Ai
            }
        );
    }

    #[test]
    fn test_ids_follow_append_order() {
        let mut state = SessionState::default();
        for text in ["a", "b", "c"] {
            state = started(&state, text);
            state = transition(
                &state,
                SessionEvent::TurnResolved {
                    reply: TurnDraft::ai("ok"),
                },
            )
            .unwrap();
        }
        let ids: Vec<u64> = state.turns().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_mode_change_keeps_history() {
        let busy = started(&SessionState::default(), "hello");
        let switched = transition(
            &busy,
            SessionEvent::ModeChanged(ConversationMode::SearchGrounded),
        )
        .unwrap();
        assert_eq!(switched.turns(), busy.turns());
        assert_eq!(switched.mode(), ConversationMode::SearchGrounded);
        assert!(switched.is_flight_active());
    }

    #[test]
    fn test_store_apply() {
        let mut session = Session::new(ConversationMode::Standard);
        session
            .apply(SessionEvent::TurnStarted {
                user: TurnDraft::user("hi", None),
            })
            .unwrap();
        assert!(session.state().is_flight_active());
        assert!(
            session
                .apply(SessionEvent::TurnStarted {
                    user: TurnDraft::user("again", None),
                })
                .is_err()
        );
        assert_eq!(session.state().len(), 1);
    }

    #[test]
    fn test_store_mode_change_goes_through_transition() {
        let mut session = Session::new(ConversationMode::Standard);
        session
            .apply(SessionEvent::TurnAdvised {
                user: TurnDraft::user("q", None),
                advisory: TurnDraft::ai("a"),
            })
            .unwrap();
        let before = session.current();

        session
            .apply(SessionEvent::ModeChanged(ConversationMode::FastResponse))
            .unwrap();

        let after = session.current();
        assert_eq!(after.mode(), ConversationMode::FastResponse);
        assert_eq!(after.turns(), before.turns());
        let expected = transition(
            &before,
            SessionEvent::ModeChanged(ConversationMode::FastResponse),
        )
        .unwrap();
        assert_eq!(after, expected);
    }
}
