//! Conversation log — bounded in-memory chat history.
//!
//! Keeps the pinned system turn plus the most recent turns, trimming the
//! oldest non-system turns when either the turn count or the estimated
//! token size grows past its bound.

use chrono::{DateTime, Utc};

/// Maximum number of non-system turns kept per conversation.
pub const MAX_TURNS: usize = 50;
/// Estimated-token ceiling, with headroom left for the model's reply.
pub const MAX_ESTIMATED_TOKENS: usize = 100_000;

const SYSTEM_OVERHEAD_TOKENS: usize = 200;
const PER_TURN_OVERHEAD_TOKENS: usize = 4;
/// Rough English-text ratio used for estimation; the remote tokenizer counts
/// differently, but this keeps us safely under the model's context limit.
const CHARS_PER_TOKEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    /// Starts a conversation with a pinned system turn.
    pub fn with_system(system: &str) -> Self {
        let mut log = Self::default();
        log.push(Role::System, system);
        log
    }

    /// Appends a turn, then trims by count and by estimated size. The system
    /// turn is never trimmed.
    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.push(role, content);
        self.trim_by_count();
        self.trim_by_tokens();
    }

    /// All turns, oldest first.
    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    pub fn estimated_tokens(&self) -> usize {
        let content_chars: usize = self.turns.iter().map(|t| t.content.len()).sum();
        let per_turn = self.turns.len() * PER_TURN_OVERHEAD_TOKENS;
        let system = if self.turns.iter().any(|t| t.role == Role::System) {
            SYSTEM_OVERHEAD_TOKENS
        } else {
            0
        };
        content_chars / CHARS_PER_TOKEN + per_turn + system
    }

    fn push(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(Turn {
            role,
            content: content.into(),
            at: Utc::now(),
        });
    }

    fn non_system_count(&self) -> usize {
        self.turns.iter().filter(|t| t.role != Role::System).count()
    }

    fn drop_oldest_non_system(&mut self) -> bool {
        match self.turns.iter().position(|t| t.role != Role::System) {
            Some(index) => {
                self.turns.remove(index);
                true
            }
            None => false,
        }
    }

    fn trim_by_count(&mut self) {
        while self.non_system_count() > MAX_TURNS {
            if !self.drop_oldest_non_system() {
                break;
            }
        }
    }

    fn trim_by_tokens(&mut self) {
        while self.estimated_tokens() > MAX_ESTIMATED_TOKENS {
            if !self.drop_oldest_non_system() {
                break;
            }
        }
    }
}
