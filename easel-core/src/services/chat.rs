//! Chat service - credit-metered conversation with the assistant
//!
//! A session owns the conversation context and lives only as long as the
//! caller keeps it; nothing about the conversation is persisted. Each send
//! debits one credit up front and refunds it if the delegate fails.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::GenerationKind;
use crate::ports::{ChatTurn, MediaGenerator};
use crate::repository::UserRepository;
use crate::services::credit::CreditService;

/// Result of one completed chat exchange
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub text: String,
    pub cost: i64,
    pub remaining_credits: i64,
}

/// Service handing out chat sessions
pub struct ChatService {
    repository: Arc<UserRepository>,
}

impl ChatService {
    pub fn new(repository: Arc<UserRepository>) -> Self {
        Self { repository }
    }

    /// Start a fresh conversation
    pub fn session(&self) -> ChatSession {
        ChatSession {
            credits: CreditService::new(self.repository.clone()),
            turns: Vec::new(),
        }
    }
}

/// One in-memory conversation
pub struct ChatSession {
    credits: CreditService,
    turns: Vec<ChatTurn>,
}

impl ChatSession {
    /// The conversation so far, oldest first
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Send a message and stream the reply through `on_chunk`
    ///
    /// The credit is debited before the delegate call and refunded on
    /// failure. A failed send leaves the conversation context untouched, so
    /// retrying carries the same history.
    pub async fn send(
        &mut self,
        generator: &dyn MediaGenerator,
        message: &str,
        on_chunk: &mut (dyn FnMut(&str) + Send),
    ) -> Result<ChatReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::validation("Message cannot be empty."));
        }

        let balance = self.credits.balance()?;
        let cost = GenerationKind::Chat.cost_for(balance.is_admin);
        if balance.credits < cost {
            return Err(Error::InsufficientCredits {
                required: cost,
                available: balance.credits,
            });
        }

        self.credits.adjust(-cost)?;

        match generator.stream_chat(&self.turns, message, on_chunk).await {
            Ok(reply) => {
                self.turns.push(ChatTurn::user(message));
                self.turns.push(ChatTurn::model(reply.clone()));
                let remaining = self.credits.balance()?.credits;
                Ok(ChatReply {
                    text: reply,
                    cost,
                    remaining_credits: remaining,
                })
            }
            Err(e) => {
                self.credits.adjust(cost)?;
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::local::LocalStore;
    use crate::domain::pricing::SIGNUP_GRANT;
    use crate::domain::result::GenerateError;
    use crate::ports::{Artifact, AspectRatio, ChatRole};
    use crate::services::account::AccountService;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Delegate stub: echoes the message back in two chunks, records the
    /// history length it was called with
    #[derive(Debug)]
    struct EchoGenerator {
        fail: bool,
        seen_history_lens: Mutex<Vec<usize>>,
    }

    impl EchoGenerator {
        fn ok() -> Self {
            Self {
                fail: false,
                seen_history_lens: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                seen_history_lens: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MediaGenerator for EchoGenerator {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate_image(
            &self,
            _prompt: &str,
            _ratio: AspectRatio,
        ) -> std::result::Result<Artifact, GenerateError> {
            unreachable!("chat tests never generate images")
        }

        async fn stream_chat(
            &self,
            history: &[ChatTurn],
            message: &str,
            on_chunk: &mut (dyn for<'a> FnMut(&'a str) + Send),
        ) -> std::result::Result<String, GenerateError> {
            self.seen_history_lens.lock().unwrap().push(history.len());
            if self.fail {
                return Err(GenerateError::Failed("stub chat failure".into()));
            }
            on_chunk("echo: ");
            on_chunk(message);
            Ok(format!("echo: {}", message))
        }

        async fn animate_image(
            &self,
            _image: &[u8],
            _mime_type: &str,
        ) -> std::result::Result<Artifact, GenerateError> {
            unreachable!("chat tests never animate")
        }
    }

    fn session() -> (TempDir, ChatSession, Arc<UserRepository>) {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        let repository = Arc::new(UserRepository::new(Arc::new(store)));
        AccountService::new(repository.clone())
            .signup("Ada", "ada@example.com", "password123")
            .unwrap();
        let session = ChatService::new(repository.clone()).session();
        (dir, session, repository)
    }

    #[tokio::test]
    async fn test_send_streams_and_debits_one_credit() {
        let (_dir, mut session, repository) = session();
        let generator = EchoGenerator::ok();

        let mut streamed = String::new();
        let reply = session
            .send(&generator, "hello", &mut |chunk| streamed.push_str(chunk))
            .await
            .unwrap();

        assert_eq!(reply.text, "echo: hello");
        assert_eq!(streamed, "echo: hello");
        assert_eq!(reply.cost, 1);
        assert_eq!(reply.remaining_credits, SIGNUP_GRANT - 1);

        let user = repository.current_user().unwrap().unwrap();
        assert_eq!(user.credits, SIGNUP_GRANT - 1);
    }

    #[tokio::test]
    async fn test_failed_send_refunds_and_keeps_context_clean() {
        let (_dir, mut session, repository) = session();
        let generator = EchoGenerator::failing();

        let err = session
            .send(&generator, "hello", &mut |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));

        assert!(session.turns().is_empty());
        let user = repository.current_user().unwrap().unwrap();
        assert_eq!(user.credits, SIGNUP_GRANT);
    }

    #[tokio::test]
    async fn test_context_accumulates_across_sends() {
        let (_dir, mut session, _repository) = session();
        let generator = EchoGenerator::ok();

        session.send(&generator, "one", &mut |_| {}).await.unwrap();
        session.send(&generator, "two", &mut |_| {}).await.unwrap();

        // Second call saw the first exchange as context
        assert_eq!(*generator.seen_history_lens.lock().unwrap(), vec![0, 2]);

        let turns = session.turns();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].role, ChatRole::User);
        assert_eq!(turns[0].text, "one");
        assert_eq!(turns[3].role, ChatRole::Model);
        assert_eq!(turns[3].text, "echo: two");
    }

    #[tokio::test]
    async fn test_empty_message_rejected_without_debit() {
        let (_dir, mut session, repository) = session();
        let generator = EchoGenerator::ok();

        let err = session.send(&generator, "   ", &mut |_| {}).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let user = repository.current_user().unwrap().unwrap();
        assert_eq!(user.credits, SIGNUP_GRANT);
    }

    #[tokio::test]
    async fn test_send_blocked_at_zero_credits() {
        let (_dir, mut session, repository) = session();
        let mut user = repository.current_user().unwrap().unwrap();
        user.credits = 0;
        repository.update_user(&user).unwrap();

        let generator = EchoGenerator::ok();
        let err = session.send(&generator, "hello", &mut |_| {}).await.unwrap_err();
        assert!(matches!(err, Error::InsufficientCredits { .. }));
        assert!(generator.seen_history_lens.lock().unwrap().is_empty());
    }
}
