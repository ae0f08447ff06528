use std::sync::Arc;

use askdocs_core::{ConversationRecord, LLMProvider, Message, PipelineState, Result};
use async_trait::async_trait;

use crate::Stage;

/// One `User: ...` / `Assistant: ...` line per message, oldest first
pub fn render_history(messages: &[Message]) -> String {
    messages
        .iter()
        .map(Message::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Produces the final answer from history, summary and the newest question
pub struct ResponderStage {
    llm: Arc<dyn LLMProvider>,
}

impl ResponderStage {
    pub fn new(llm: Arc<dyn LLMProvider>) -> Self {
        Self { llm }
    }

    pub fn build_prompt(history: &str, summary: &str, question: &str) -> String {
        format!(
            "
You are a helpful company knowledge assistant.

You answer based on internal documents and past conversation context.
If unsure, say you don't have enough information.

Conversation so far:
{history}

Relevant Context:
{summary}

User Question:
{question}

Provide the best continuation response.
"
        )
    }
}

#[async_trait]
impl Stage for ResponderStage {
    fn name(&self) -> &'static str {
        "responder"
    }

    fn entry_state(&self) -> PipelineState {
        PipelineState::Synthesized
    }

    fn exit_state(&self) -> PipelineState {
        PipelineState::Responded
    }

    async fn run(&self, record: &mut ConversationRecord) -> Result<()> {
        let history = render_history(&record.messages);
        let question = record.latest()?.content();
        let prompt = Self::build_prompt(&history, record.context_text(), question);

        let answer = self.llm.generate(&prompt).await?;
        record.messages.push(Message::assistant(answer.text));
        record.context = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdocs_core::Role;
    use askdocs_test_utils::{FixedLLM, RecordingLLM};

    fn synthesized(history: Vec<Message>, message: &str) -> ConversationRecord {
        let mut record = ConversationRecord::new(history, message);
        record.context = Some("Deploys go through CI.".to_string());
        record.state = PipelineState::Synthesized;
        record
    }

    #[test]
    fn test_render_history_one_line_per_message() {
        let messages = vec![
            Message::user("hi"),
            Message::assistant("hello"),
            Message::user("what is our deploy process"),
        ];

        let rendered = render_history(&messages);

        assert_eq!(rendered.lines().count(), messages.len());
        assert_eq!(
            rendered,
            "User: hi\nAssistant: hello\nUser: what is our deploy process"
        );
    }

    #[tokio::test]
    async fn test_appends_assistant_reply_and_clears_context() {
        let stage = ResponderStage::new(Arc::new(FixedLLM::new("Use the CI pipeline.")));
        let mut record = synthesized(vec![Message::user("hi"), Message::assistant("hello")], "deploy?");
        let before = record.messages.len();

        stage.run(&mut record).await.unwrap();

        assert_eq!(record.messages.len(), before + 1);
        let last = record.last_message().unwrap();
        assert_eq!(last.role(), Role::Assistant);
        assert_eq!(last.content(), "Use the CI pipeline.");
        assert_eq!(record.context, None);
    }

    #[tokio::test]
    async fn test_prompt_layout() {
        let llm = Arc::new(RecordingLLM::new());
        let stage = ResponderStage::new(llm.clone());
        let mut record = synthesized(
            vec![Message::user("hi"), Message::assistant("hello")],
            "what is our deploy process",
        );

        stage.run(&mut record).await.unwrap();

        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.starts_with('\n') && prompt.ends_with('\n'));
        insta::assert_snapshot!(prompt.trim(), @r###"
        You are a helpful company knowledge assistant.

        You answer based on internal documents and past conversation context.
        If unsure, say you don't have enough information.

        Conversation so far:
        User: hi
        Assistant: hello
        User: what is our deploy process

        Relevant Context:
        Deploys go through CI.

        User Question:
        what is our deploy process

        Provide the best continuation response.
        "###);
    }
}
