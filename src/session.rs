use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::message::{Role, Turn};
use crate::persona::PersonaKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingResponse,
}

/// How much of the transcript is sent to the model on each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TranscriptPolicy {
    #[default]
    Unbounded,
    LastTurns(usize),
}

impl From<Option<usize>> for TranscriptPolicy {
    fn from(window: Option<usize>) -> Self {
        match window {
            Some(turns) => TranscriptPolicy::LastTurns(turns),
            None => TranscriptPolicy::Unbounded,
        }
    }
}

/// Conversation state of one player session.
///
/// The host owns it and hands it to every handler call; nothing keeps a global copy.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: Uuid,
    transcript: Vec<Turn>,
    active_persona: Option<PersonaKind>,
    state: TurnState,
    policy: TranscriptPolicy,
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new(TranscriptPolicy::default())
    }
}

impl ConversationSession {
    pub fn new(policy: TranscriptPolicy) -> Self {
        Self {
            id: Uuid::new_v4(),
            transcript: Vec::new(),
            active_persona: None,
            state: TurnState::Idle,
            policy,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.transcript.push(Turn::user(text));
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.transcript.push(Turn::assistant(text));
    }

    pub fn snapshot(&self) -> &[Turn] {
        &self.transcript
    }

    /// Turns to send as model context under the session's policy.
    pub fn context(&self) -> &[Turn] {
        match self.policy {
            TranscriptPolicy::Unbounded => &self.transcript,
            TranscriptPolicy::LastTurns(turns) => {
                // The latest turn is always sent, even for a zero window.
                let mut start = self.transcript.len().saturating_sub(turns.max(1));
                // A window never opens on an answer whose question was cut off.
                while start < self.transcript.len() && self.transcript[start].role != Role::User {
                    start += 1;
                }
                &self.transcript[start..]
            }
        }
    }

    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    pub fn policy(&self) -> TranscriptPolicy {
        self.policy
    }

    pub fn active_persona(&self) -> Option<PersonaKind> {
        self.active_persona
    }

    pub fn set_active_persona(&mut self, persona: PersonaKind) {
        self.active_persona = Some(persona);
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn begin_turn(&mut self) -> Result<()> {
        match self.state {
            TurnState::AwaitingResponse => Err(AppError::SessionBusy),
            TurnState::Idle => {
                self.state = TurnState::AwaitingResponse;
                Ok(())
            }
        }
    }

    pub fn end_turn(&mut self) {
        self.state = TurnState::Idle;
    }
}
