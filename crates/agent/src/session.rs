//! The single conversational thread.

use climactl_core::error::Error;
use climactl_core::hardware::Board;
use climactl_core::message::{Conversation, Message};
use tracing::{debug, warn};

use crate::loop_runner::InferenceDriver;
use crate::status::StatusReport;

/// Outcome of one completed turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// The assistant's final reply, as appended to the history
    pub reply: String,

    /// Board state right after the turn, with the model's timings
    pub status: StatusReport,
}

/// Owns the conversation history for the whole process run.
pub struct Session {
    driver: InferenceDriver,
    conversation: Conversation,
    max_history: usize,
    board: Board,
}

impl Session {
    pub fn new(
        driver: InferenceDriver,
        system_prompt: impl Into<String>,
        max_history: usize,
        board: Board,
    ) -> Self {
        Self {
            driver,
            conversation: Conversation::new(system_prompt),
            max_history,
            board,
        }
    }

    /// Run one turn for `prompt`.
    ///
    /// On success the final reply is appended as a plain assistant message
    /// (any leftover tool requests dropped). On failure nothing more is
    /// appended. Either way the history is capped afterwards, so a tool
    /// round is never split mid-turn.
    pub async fn run_turn(&mut self, prompt: impl Into<String>) -> Result<TurnReport, Error> {
        self.conversation.push(Message::user(prompt));

        let outcome = self.driver.run(&mut self.conversation).await;
        let result = match outcome {
            Ok(response) => {
                let reply = response.message.content;
                self.conversation.push(Message::assistant(reply.clone()));
                Ok(TurnReport {
                    reply,
                    status: StatusReport::capture(&self.board, Some(response.timings)),
                })
            }
            Err(e) => {
                warn!(error = %e, "Turn failed");
                Err(e.into())
            }
        };

        let evicted = self.conversation.truncate(self.max_history);
        if evicted > 0 {
            debug!(evicted, kept = self.conversation.len(), "History truncated");
        }
        result
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use climactl_core::error::ProviderError;
    use climactl_core::hardware::LedState;
    use climactl_core::message::{Role, ToolRequest};
    use climactl_core::provider::Provider;
    use climactl_hardware::SimulatedRig;
    use std::sync::Arc;

    fn session_with(provider: Arc<dyn Provider>, rig: &SimulatedRig, max_history: usize) -> Session {
        let tools = Arc::new(climactl_tools::default_registry(&rig.board));
        let driver = InferenceDriver::new(provider, "mock-model", tools);
        Session::new(driver, "You are an IoT assistant.", max_history, rig.board.clone())
    }

    #[tokio::test]
    async fn turn_on_red_light_end_to_end() {
        let rig = SimulatedRig::comfortable();
        let provider = Arc::new(SequentialMockProvider::tool_then_answer(
            vec![ToolRequest::new(
                "set_led_state",
                serde_json::json!({"color": "red", "state": "on"}),
            )],
            "The red light is now on.",
        ));
        let mut session = session_with(provider.clone(), &rig, 9);

        let report = session.run_turn("turn on red light").await.unwrap();

        assert_eq!(report.reply, "The red light is now on.");
        assert_eq!(report.status.leds.red_led_status, LedState::On);
        assert_eq!(provider.call_count(), 2);

        let roles: Vec<_> = session.conversation().messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [Role::System, Role::User, Role::Assistant, Role::Tool, Role::Assistant]
        );
        let tool_msg = &session.conversation().messages()[3];
        assert_eq!(tool_msg.content, "\"LED RED turned on successfully.\"");
        assert_eq!(
            session.conversation().last().unwrap().content,
            "The red light is now on."
        );
    }

    #[tokio::test]
    async fn leftover_tool_requests_are_dropped_from_final_message() {
        let rig = SimulatedRig::comfortable();
        let provider = Arc::new(AlwaysToolProvider::default());
        let mut session = session_with(provider, &rig, 9);

        session.run_turn("status").await.unwrap();
        let last = session.conversation().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert!(!last.has_tool_calls());
    }

    #[tokio::test]
    async fn history_is_capped_and_keeps_system() {
        let rig = SimulatedRig::comfortable();
        let outcomes = (0..6).map(|i| Ok(make_text_response(&format!("reply {i}")))).collect();
        let provider = Arc::new(SequentialMockProvider::new(outcomes));
        let mut session = session_with(provider, &rig, 9);

        for i in 0..6 {
            session.run_turn(format!("question {i}")).await.unwrap();
            assert!(session.conversation().len() <= 9);
        }

        let messages = session.conversation().messages();
        assert_eq!(messages.len(), 9);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].content, "question 2");
        assert_eq!(messages[8].content, "reply 5");
    }

    #[tokio::test]
    async fn failed_turn_keeps_user_message_only() {
        let rig = SimulatedRig::comfortable();
        let provider = Arc::new(SequentialMockProvider::new(vec![
            Err(ProviderError::Network("connection refused".into())),
            Ok(make_text_response("back online")),
        ]));
        let mut session = session_with(provider, &rig, 9);

        let err = session.run_turn("hello").await.unwrap_err();
        assert!(matches!(err, Error::Provider(ProviderError::Network(_))));
        assert_eq!(session.conversation().len(), 2);
        assert_eq!(session.conversation().last().unwrap().role, Role::User);

        // The next turn still works.
        let report = session.run_turn("hello again").await.unwrap();
        assert_eq!(report.reply, "back online");
        assert_eq!(session.conversation().len(), 4);
    }

    #[tokio::test]
    async fn failed_turns_are_still_truncated() {
        let rig = SimulatedRig::comfortable();
        let outcomes = (0..5)
            .map(|_| Err(ProviderError::Timeout("120s".into())))
            .collect();
        let provider = Arc::new(SequentialMockProvider::new(outcomes));
        let mut session = session_with(provider, &rig, 3);

        for _ in 0..5 {
            assert!(session.run_turn("ping").await.is_err());
        }
        assert_eq!(session.conversation().len(), 3);
        assert_eq!(session.conversation().system().role, Role::System);
    }
}
