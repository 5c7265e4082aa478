//! Questionnaire handlers under `/v1/questionnaires`.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ports::{QuestionnaireContext, Stored};
use crate::domain::{Error, NewQuestionnaire, Questionnaire, entries_from_value};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{optional_text, required_text};

/// Agent-backed generation request.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionnaireRequest {
    pub startup_id: Option<String>,
    pub note_id: Option<String>,
    pub pitch_deck_id: Option<String>,
    pub pitch_deck_gcs_uri: Option<String>,
}

/// `{questionnaireId}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireIdResponse {
    pub questionnaire_id: String,
}

/// Manually authored questionnaire.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateQuestionnaireRequest {
    pub startup_id: Option<String>,
    pub pitch_deck_id: Option<String>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub questions: Option<Value>,
}

/// Identifier of a created questionnaire.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedQuestionnaireResponse {
    pub id: String,
    pub status: &'static str,
}

/// Answers submitted against a questionnaire.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswersRequest {
    pub startup_id: Option<String>,
    /// List of `{questionId, answerText}`.
    #[schema(value_type = Option<Vec<Object>>)]
    pub answers: Option<Value>,
    pub transcript_uri: Option<String>,
}

/// `{answerId, status}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswersResponse {
    pub answer_id: String,
    pub status: &'static str,
}

/// Generate and store a questionnaire through the questionnaire agent.
#[utoipa::path(
    post,
    path = "/v1/questionnaires/generate",
    request_body = GenerateQuestionnaireRequest,
    responses(
        (status = 200, description = "Questionnaire stored", body = QuestionnaireIdResponse),
        (status = 400, description = "startupId_required", body = Error),
        (status = 500, description = "Questionnaire generation failed", body = Error)
    ),
    tags = ["questionnaires"],
    operation_id = "generateQuestionnaire"
)]
#[post("/generate")]
pub async fn generate_questionnaire(
    state: web::Data<HttpState>,
    payload: web::Json<GenerateQuestionnaireRequest>,
) -> ApiResult<web::Json<QuestionnaireIdResponse>> {
    let GenerateQuestionnaireRequest {
        startup_id,
        note_id,
        pitch_deck_id,
        pitch_deck_gcs_uri,
    } = payload.into_inner();
    let context = QuestionnaireContext {
        startup_id: required_text(startup_id, "startupId_required")?,
        note_id: optional_text(note_id),
        pitch_deck_id: optional_text(pitch_deck_id),
        pitch_deck_gcs_uri: optional_text(pitch_deck_gcs_uri),
    };
    let generated = state.questionnaires.generate_questionnaire(context).await?;
    Ok(web::Json(QuestionnaireIdResponse {
        questionnaire_id: generated.questionnaire_id,
    }))
}

/// Store a questionnaire authored outside the agent.
#[utoipa::path(
    post,
    path = "/v1/questionnaires",
    request_body = CreateQuestionnaireRequest,
    responses(
        (status = 200, description = "Questionnaire stored", body = CreatedQuestionnaireResponse),
        (status = 400, description = "startup_id_pitch_deck_id_and_questions_required", body = Error)
    ),
    tags = ["questionnaires"],
    operation_id = "createQuestionnaire"
)]
#[post("")]
pub async fn create_questionnaire(
    state: web::Data<HttpState>,
    payload: web::Json<CreateQuestionnaireRequest>,
) -> ApiResult<web::Json<CreatedQuestionnaireResponse>> {
    const CODE: &str = "startup_id_pitch_deck_id_and_questions_required";
    let CreateQuestionnaireRequest {
        startup_id,
        pitch_deck_id,
        questions,
    } = payload.into_inner();
    let questionnaire = NewQuestionnaire {
        startup_id: required_text(startup_id, CODE)?,
        pitch_deck_id: required_text(pitch_deck_id, CODE)?,
        questions: questions
            .filter(Value::is_array)
            .ok_or_else(|| Error::invalid_request(CODE))?,
    };
    let id = state.questionnaires.create(questionnaire).await?;
    Ok(web::Json(CreatedQuestionnaireResponse {
        id,
        status: "generated",
    }))
}

/// Newest questionnaire of a startup.
#[utoipa::path(
    get,
    path = "/v1/questionnaires/startup/{startupId}",
    params(("startupId" = String, Path, description = "Startup identifier")),
    responses(
        (status = 200, description = "Latest questionnaire", body = serde_json::Value),
        (status = 404, description = "questionnaire_not_found", body = Error)
    ),
    tags = ["questionnaires"],
    operation_id = "latestQuestionnaireForStartup"
)]
#[get("/startup/{startup_id}")]
pub async fn questionnaire_for_startup(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Stored<Questionnaire>>> {
    state
        .questionnaires
        .require_latest(&path.into_inner())
        .await
        .map(web::Json)
}

/// Questionnaire by identifier.
#[utoipa::path(
    get,
    path = "/v1/questionnaires/{id}",
    params(("id" = String, Path, description = "Questionnaire identifier")),
    responses(
        (status = 200, description = "Questionnaire", body = serde_json::Value),
        (status = 404, description = "questionnaire_not_found", body = Error)
    ),
    tags = ["questionnaires"],
    operation_id = "getQuestionnaire"
)]
#[get("/{id}")]
pub async fn get_questionnaire(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Stored<Questionnaire>>> {
    state
        .questionnaires
        .get(&path.into_inner())
        .await
        .map(web::Json)
}

/// Record founder answers and complete the questionnaire.
#[utoipa::path(
    post,
    path = "/v1/questionnaires/{id}/answers",
    params(("id" = String, Path, description = "Questionnaire identifier")),
    request_body = SubmitAnswersRequest,
    responses(
        (status = 200, description = "Answers stored", body = SubmitAnswersResponse),
        (status = 400, description = "invalid_request", body = Error)
    ),
    tags = ["questionnaires"],
    operation_id = "submitAnswers"
)]
#[post("/{id}/answers")]
pub async fn submit_answers(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<SubmitAnswersRequest>,
) -> ApiResult<web::Json<SubmitAnswersResponse>> {
    let SubmitAnswersRequest {
        startup_id,
        answers,
        transcript_uri,
    } = payload.into_inner();
    let startup_id = required_text(startup_id, "invalid_request")?;
    let entries = answers
        .filter(Value::is_array)
        .as_ref()
        .and_then(entries_from_value)
        .ok_or_else(|| Error::invalid_request("invalid_request"))?;
    let answer_id = state
        .questionnaires
        .submit_answers(
            &path.into_inner(),
            &startup_id,
            entries,
            optional_text(transcript_uri),
        )
        .await?;
    Ok(web::Json(SubmitAnswersResponse {
        answer_id,
        status: "complete",
    }))
}

/// Register every `/v1/questionnaires` handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/questionnaires")
            .service(create_questionnaire)
            .service(generate_questionnaire)
            .service(questionnaire_for_startup)
            .service(get_questionnaire)
            .service(submit_answers),
    );
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{Collection, DocumentQuery, DocumentStore};
    use crate::inbound::http::test_utils::{into_status_and_json, test_app};
    use crate::test_support::TestPorts;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::json;

    async fn call(ports: &TestPorts, request: test::TestRequest) -> (StatusCode, Value) {
        let app = test::init_service(
            test_app(ports.state()).service(web::scope("/v1").configure(configure)),
        )
        .await;
        into_status_and_json(test::call_service(&app, request.to_request()).await).await
    }

    async fn generate(ports: &TestPorts) -> String {
        let (status, body) = call(
            ports,
            test::TestRequest::post()
                .uri("/v1/questionnaires/generate")
                .set_json(json!({"startupId": "s1", "noteId": "n1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["questionnaireId"].as_str().expect("id").to_owned()
    }

    #[actix_web::test]
    async fn generated_questionnaire_is_readable() {
        let ports = TestPorts::new();
        let id = generate(&ports).await;

        let (status, body) =
            call(&ports, test::TestRequest::get().uri(&format!("/v1/questionnaires/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["noteId"], "n1");
        assert_eq!(body["questions"].as_array().map(Vec::len), Some(7));

        let (_, latest) =
            call(&ports, test::TestRequest::get().uri("/v1/questionnaires/startup/s1")).await;
        assert_eq!(latest["id"], id.as_str());
    }

    #[actix_web::test]
    async fn generation_requires_a_startup() {
        let ports = TestPorts::new();
        let (status, body) = call(
            &ports,
            test::TestRequest::post()
                .uri("/v1/questionnaires/generate")
                .set_json(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "startupId_required");
    }

    #[actix_web::test]
    async fn answers_complete_the_questionnaire() {
        let ports = TestPorts::new();
        let id = generate(&ports).await;
        let (status, body) = call(
            &ports,
            test::TestRequest::post()
                .uri(&format!("/v1/questionnaires/{id}/answers"))
                .set_json(json!({
                    "startupId": "s1",
                    "answers": [{"questionId": "q1", "answerText": "Tractors"}],
                })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "complete");

        let answers = ports
            .store
            .query(
                Collection::FounderAnswers,
                &DocumentQuery::new().where_eq("questionnaireId", id.as_str()),
            )
            .await
            .expect("query");
        assert_eq!(answers.len(), 1);
    }

    #[rstest]
    #[case::no_startup(json!({"answers": [{"questionId": "q1", "answer": "x"}]}))]
    #[case::map_answers(json!({"startupId": "s1", "answers": {"q1": "x"}}))]
    #[case::no_answers(json!({"startupId": "s1"}))]
    #[actix_web::test]
    async fn malformed_answers_are_invalid_requests(#[case] body: Value) {
        let ports = TestPorts::new();
        let (status, error) = call(
            &ports,
            test::TestRequest::post()
                .uri("/v1/questionnaires/q1/answers")
                .set_json(body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "invalid_request");
    }

    #[actix_web::test]
    async fn manual_questionnaires_are_generated_status() {
        let ports = TestPorts::new();
        let (status, body) = call(
            &ports,
            test::TestRequest::post().uri("/v1/questionnaires").set_json(json!({
                "startup_id": "s1",
                "pitch_deck_id": "p1",
                "questions": [{"id": "q1", "text": "Why now?"}],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "generated");

        let (status, error) = call(
            &ports,
            test::TestRequest::post()
                .uri("/v1/questionnaires")
                .set_json(json!({"startup_id": "s1", "pitch_deck_id": "p1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "startup_id_pitch_deck_id_and_questions_required");
    }
}
