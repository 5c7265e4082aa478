//! Tests for questionnaire generation, assistance and answer handling.

use std::sync::Arc;

use rstest::rstest;
use serde_json::json;

use super::*;
use crate::domain::ErrorKind;
use crate::domain::founder_answers::load_answers;
use crate::domain::ports::{AgentError, MockQuestionnaireAgent};
use crate::outbound::memory::InMemoryDocumentStore;
use crate::test_support::{SteppingClock, object};

fn service_with(agent: MockQuestionnaireAgent) -> (QuestionnaireService, Arc<InMemoryDocumentStore>) {
    let store = Arc::new(InMemoryDocumentStore::new());
    let service = QuestionnaireService::new(
        store.clone(),
        Arc::new(agent),
        Arc::new(SteppingClock::default()),
    );
    (service, store)
}

fn two_question_agent() -> MockQuestionnaireAgent {
    let mut agent = MockQuestionnaireAgent::new();
    agent.expect_generate().returning(|_| {
        Ok(vec![
            json!({"id": "q1", "text": "TAM?", "category": "market", "type": "open"}),
            json!({"id": "q2", "text": "MRR?", "category": "traction", "type": "open"}),
        ])
    });
    agent
}

fn context(startup: &str) -> QuestionnaireContext {
    QuestionnaireContext {
        startup_id: startup.to_owned(),
        pitch_deck_id: Some("deck-1".to_owned()),
        ..QuestionnaireContext::default()
    }
}

#[tokio::test]
async fn generated_questionnaires_are_stored_ready() {
    let (service, _) = service_with(two_question_agent());
    let generated = service
        .generate_questionnaire(context("s1"))
        .await
        .expect("generate");
    assert_eq!(generated.questions.len(), 2);

    let stored = service.get(&generated.questionnaire_id).await.expect("get");
    assert_eq!(stored.record.status, "ready");
    assert_eq!(stored.record.version, Some(1));
    assert_eq!(stored.record.pitch_deck_id.as_deref(), Some("deck-1"));
    assert!(stored.record.note_id.is_none());
}

#[tokio::test]
async fn generation_failures_carry_the_agent_message() {
    let mut agent = MockQuestionnaireAgent::new();
    agent
        .expect_generate()
        .returning(|_| Err(AgentError::timeout("30s elapsed")));
    let (service, store) = service_with(agent);
    let err = service
        .generate_questionnaire(context("s1"))
        .await
        .expect_err("agent failure");
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(
        err.message(),
        Some("Questionnaire generation failed: request timed out: 30s elapsed")
    );
    assert_eq!(store.count(Collection::Questionnaires).await, 0);
}

#[tokio::test]
async fn assistance_requires_an_existing_questionnaire() {
    let mut agent = MockQuestionnaireAgent::new();
    agent.expect_assist().never();
    let (service, _) = service_with(agent);
    let err = service
        .get_questionnaire_assistance("ghost", "What is the TAM?")
        .await
        .expect_err("missing questionnaire");
    assert_eq!(err.code(), "questionnaire_not_found");
}

#[tokio::test]
async fn save_answers_writes_canonical_record_and_links_it() {
    let (service, store) = service_with(two_question_agent());
    let generated = service
        .generate_questionnaire(context("s1"))
        .await
        .expect("generate");

    let saved = service
        .save_answers("s1", Some(&json!({"q1": "$40B", "q2": 120000})))
        .await
        .expect("save");
    assert_eq!(saved.questionnaire_id, generated.questionnaire_id);

    let questionnaire = service.get(&saved.questionnaire_id).await.expect("get");
    assert_eq!(questionnaire.record.status, "completed");
    assert_eq!(
        questionnaire.record.founder_answers_id.as_deref(),
        Some(saved.answer_id.as_str())
    );

    let answers = load_answers(store.as_ref(), &questionnaire)
        .await
        .expect("load")
        .expect("present");
    assert_eq!(answers.answers.len(), 2);
    assert_eq!(answers.status, "complete");
}

#[rstest]
#[case::absent(None)]
#[case::scalar(Some(json!("just text")))]
#[tokio::test]
async fn save_answers_rejects_missing_answers(#[case] answers: Option<Value>) {
    let (service, _) = service_with(MockQuestionnaireAgent::new());
    let err = service
        .save_answers("s1", answers.as_ref())
        .await
        .expect_err("invalid answers");
    assert_eq!(err.code(), "answers_required");
}

#[tokio::test]
async fn legacy_embedded_answers_are_read_through_the_accessor() {
    let (service, store) = service_with(MockQuestionnaireAgent::new());
    store
        .set(
            Collection::Questionnaires,
            "legacy",
            object(json!({
                "startupId": "s1",
                "questions": [],
                "status": "completed",
                "answers": {"q1": "legacy answer"},
                "createdAt": "2023-01-01T00:00:00.000Z",
                "updatedAt": "2023-01-02T00:00:00.000Z",
            })),
        )
        .await
        .expect("seed");
    let questionnaire = service.get("legacy").await.expect("get");
    let answers = load_answers(store.as_ref(), &questionnaire)
        .await
        .expect("load")
        .expect("embedded answers");
    assert_eq!(answers.questionnaire_id, "legacy");
    assert_eq!(
        answers.answers,
        vec![AnswerEntry::Question {
            question_id: "q1".to_owned(),
            question_text: None,
            answer_text: "legacy answer".to_owned(),
        }]
    );
}
