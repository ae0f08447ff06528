//! End-to-end pipeline scenarios against test doubles

#[cfg(test)]
mod pipeline_tests {
    use std::sync::Arc;

    use askdocs_core::{ConversationRecord, Error, Message, PipelineState, Role};
    use askdocs_test_utils::{FailingLLM, RecordingLLM, StaticRAGEngine};

    use crate::{Pipeline, PipelineConfig};

    fn pipeline(llm: Arc<RecordingLLM>, rag: Arc<StaticRAGEngine>) -> Pipeline {
        Pipeline::new(llm, rag, PipelineConfig::default())
    }

    #[tokio::test]
    async fn test_remote_leave_question() {
        let llm = Arc::new(RecordingLLM::with_responses([
            "Remote leave needs approval.",
            "Yes, with manager approval two weeks ahead.",
        ]));
        let rag = Arc::new(StaticRAGEngine::new([
            "Remote work requires manager approval.",
            "Leave requests are filed two weeks in advance.",
        ]));

        let record = pipeline(llm.clone(), rag.clone())
            .invoke(ConversationRecord::new(Vec::new(), "Can I take remote leave next week?"))
            .await
            .unwrap();

        assert_eq!(record.state, PipelineState::Responded);
        assert_eq!(record.messages.len(), 2);
        assert_eq!(record.answer(), Some("Yes, with manager approval two weeks ahead."));
        assert_eq!(record.context, None);

        assert_eq!(rag.queries()[0].query, "Can I take remote leave next week?");
        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].ends_with(
            "Remote work requires manager approval.\n\nLeave requests are filed two weeks in advance."
        ));
        assert!(prompts[1].contains("Relevant Context:\nRemote leave needs approval.\n"));
    }

    #[tokio::test]
    async fn test_history_is_rendered_before_new_question() {
        let llm = Arc::new(RecordingLLM::new());
        let rag = Arc::new(StaticRAGEngine::new(["Deploys run through the CI pipeline."]));

        let history = vec![Message::user("hi"), Message::assistant("hello")];
        let answer = pipeline(llm.clone(), rag)
            .chat(history, "what is our deploy process")
            .await
            .unwrap();

        assert_eq!(answer, "response #2");
        let responder_prompt = llm.last_prompt().unwrap();
        assert!(responder_prompt.contains(
            "Conversation so far:\nUser: hi\nAssistant: hello\nUser: what is our deploy process\n"
        ));
        assert!(responder_prompt.contains("User Question:\nwhat is our deploy process\n"));
    }

    #[tokio::test]
    async fn test_empty_index_still_answers() {
        let llm = Arc::new(RecordingLLM::new());
        let answer = pipeline(llm.clone(), Arc::new(StaticRAGEngine::empty()))
            .chat(Vec::new(), "Who founded the company?")
            .await
            .unwrap();

        assert_eq!(answer, "response #2");
        assert_eq!(
            llm.prompts()[0],
            "Summarize the following context clearly and concisely:\n\n"
        );
    }

    #[tokio::test]
    async fn test_top_k_comes_from_config() {
        let llm = Arc::new(RecordingLLM::new());
        let rag = Arc::new(StaticRAGEngine::new(["a", "b", "c"]));
        let config = PipelineConfig {
            top_k: 2,
            score_threshold: None,
        };

        Pipeline::new(llm, rag.clone(), config)
            .chat(Vec::new(), "docker")
            .await
            .unwrap();

        assert_eq!(rag.queries()[0].top_k, 2);
    }

    #[tokio::test]
    async fn test_score_threshold_reaches_retrieval() {
        let rag = Arc::new(StaticRAGEngine::new(["a"]));
        let config = PipelineConfig {
            top_k: 4,
            score_threshold: Some(0.35),
        };

        Pipeline::new(Arc::new(RecordingLLM::new()), rag.clone(), config)
            .chat(Vec::new(), "remote work")
            .await
            .unwrap();

        assert_eq!(rag.queries()[0].score_threshold, Some(0.35));
    }

    #[tokio::test]
    async fn test_retrieval_failure_skips_model_calls() {
        let llm = Arc::new(RecordingLLM::new());
        let err = pipeline(llm.clone(), Arc::new(StaticRAGEngine::unreachable()))
            .chat(Vec::new(), "holiday calendar")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::VectorStore(_)));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_model_failure_fails_request() {
        let pipeline = Pipeline::new(
            Arc::new(FailingLLM::new("service unavailable")),
            Arc::new(StaticRAGEngine::new(["chunk"])),
            PipelineConfig::default(),
        );

        let err = pipeline.chat(Vec::new(), "api docs").await.unwrap_err();
        assert!(matches!(err, Error::LLMProvider(_)));
    }

    #[tokio::test]
    async fn test_rejects_record_not_ending_with_user() {
        let llm = Arc::new(RecordingLLM::new());
        let record = ConversationRecord {
            messages: vec![Message::user("hi"), Message::new(Role::Assistant, "hello")],
            context: None,
            state: PipelineState::Start,
        };

        let err = pipeline(llm.clone(), Arc::new(StaticRAGEngine::empty()))
            .invoke(record)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_rejects_record_already_in_flight() {
        let mut record = ConversationRecord::new(Vec::new(), "hi");
        record.state = PipelineState::Retrieved;

        let err = pipeline(Arc::new(RecordingLLM::new()), Arc::new(StaticRAGEngine::empty()))
            .invoke(record)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[test]
    fn test_stage_order() {
        let pipeline = pipeline(Arc::new(RecordingLLM::new()), Arc::new(StaticRAGEngine::empty()));
        assert_eq!(
            pipeline.stage_names(),
            vec!["router", "retriever", "synthesizer", "responder"]
        );
    }
}
