//! Reqwest-backed agent adapters.
//!
//! These adapters own transport details only: request bodies, the timeout,
//! HTTP status mapping and JSON decoding. Persistence stays in the domain
//! services.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::ports::{
    AgentError, AnalysedDealNote, AnalystAgent, ChatbotAgent, FullAnalysisRequest, IngestedNote,
    IngestionRequest, NoteProvenance, QuestionnaireAgent, QuestionnaireContext,
};

use super::AgentSetupError;

/// JSON-over-HTTP client bound to one agent server.
#[derive(Clone)]
pub struct AgentClient {
    client: Client,
    base_url: String,
}

impl AgentClient {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Fails when `base_url` is not an absolute URL or the reqwest client
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AgentSetupError> {
        Url::parse(base_url).map_err(|err| AgentSetupError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            message: err.to_string(),
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AgentSetupError::Client {
                message: err.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST `body` to `path` and decode the JSON reply.
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, AgentError> {
        let endpoint = self.endpoint(path);
        debug!(%endpoint, "calling agent");
        let response = self
            .client
            .post(&endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }
        serde_json::from_slice(bytes.as_ref())
            .map_err(|err| AgentError::decode(format!("{endpoint}: {err}")))
    }
}

fn map_transport_error(error: reqwest::Error) -> AgentError {
    if error.is_timeout() {
        AgentError::timeout(error.to_string())
    } else {
        AgentError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> AgentError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        status.as_u16().to_string()
    } else {
        format!("{}: {preview}", status.as_u16())
    };
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => AgentError::timeout(message),
        _ => AgentError::status(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteReply {
    #[serde(default)]
    note_id: Option<String>,
    note: Value,
}

#[derive(Deserialize)]
struct VerificationReply {
    verification: Value,
}

#[derive(Deserialize)]
struct ScoreReply {
    score: Value,
}

#[derive(Deserialize)]
struct QuestionnaireReply {
    questionnaire: QuestionList,
}

#[derive(Deserialize)]
struct QuestionList {
    questions: Vec<Value>,
}

#[derive(Deserialize)]
struct AnswerReply {
    answer: String,
}

#[derive(Deserialize)]
struct ChatReplyBody {
    reply: String,
}

/// Remote analyst.
pub struct HttpAnalystAgent {
    client: AgentClient,
}

impl HttpAnalystAgent {
    pub fn new(client: AgentClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AnalystAgent for HttpAnalystAgent {
    async fn ingest(&self, request: &IngestionRequest) -> Result<IngestedNote, AgentError> {
        let body = json!({
            "startupId": request.startup_id,
            "gcsUri": request.gcs_uri,
            "uploadId": request.upload_id,
        });
        let reply: NoteReply = self.client.post("api/ingestion", &body).await?;
        Ok(IngestedNote {
            note_id: reply.note_id,
            note: reply.note,
        })
    }

    async fn research(&self, note_id: &str, note: &Value) -> Result<Value, AgentError> {
        let body = json!({"noteId": note_id, "note": note});
        let reply: VerificationReply = self.client.post("api/deep-research", &body).await?;
        Ok(reply.verification)
    }

    async fn score(&self, note_id: &str, note: &Value) -> Result<Value, AgentError> {
        let body = json!({"noteId": note_id, "note": note});
        let reply: ScoreReply = self.client.post("api/deal-scoring", &body).await?;
        Ok(reply.score)
    }

    async fn analyse_startup(
        &self,
        request: &FullAnalysisRequest,
    ) -> Result<AnalysedDealNote, AgentError> {
        let body = json!({
            "startupId": request.startup_id,
            "pitchDeckGcsUri": request.pitch_deck_gcs_uri,
            "questionnaireAnswers": request.questionnaire_answers,
        });
        let reply: NoteReply = self.client.post("api/full-analysis", &body).await?;
        Ok(AnalysedDealNote {
            note: reply.note,
            provenance: NoteProvenance::Agent,
        })
    }
}

/// Remote questionnaire agent.
pub struct HttpQuestionnaireAgent {
    client: AgentClient,
}

impl HttpQuestionnaireAgent {
    pub fn new(client: AgentClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QuestionnaireAgent for HttpQuestionnaireAgent {
    async fn generate(&self, context: &QuestionnaireContext) -> Result<Vec<Value>, AgentError> {
        let body = json!({
            "startupId": context.startup_id,
            "noteId": context.note_id,
            "pitchDeckId": context.pitch_deck_id,
            "pitchDeckGcsUri": context.pitch_deck_gcs_uri,
        });
        let reply: QuestionnaireReply = self.client.post("api/questionnaire", &body).await?;
        Ok(reply.questionnaire.questions)
    }

    async fn assist(&self, questionnaire_id: &str, question: &str) -> Result<String, AgentError> {
        let body = json!({"questionnaireId": questionnaire_id, "question": question});
        let reply: AnswerReply = self.client.post("api/questionnaire/assist", &body).await?;
        Ok(reply.answer)
    }
}

/// Remote chatbot server.
pub struct HttpChatbotAgent {
    client: AgentClient,
}

impl HttpChatbotAgent {
    pub fn new(client: AgentClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatbotAgent for HttpChatbotAgent {
    async fn screen(&self, session_id: &str, message: &str) -> Result<String, AgentError> {
        let body = json!({"message": message, "sessionId": session_id});
        let reply: ChatReplyBody = self.client.post("api/bots/screener", &body).await?;
        Ok(reply.reply)
    }

    async fn deep_dive(
        &self,
        session_id: &str,
        message: &str,
        deal_note_id: Option<String>,
    ) -> Result<String, AgentError> {
        let body = json!({
            "message": message,
            "sessionId": session_id,
            "dealNoteId": deal_note_id,
        });
        let reply: ChatReplyBody = self.client.post("api/bots/deep-dive", &body).await?;
        Ok(reply.reply)
    }

    async fn questionnaire(
        &self,
        questionnaire_id: &str,
        message: &str,
    ) -> Result<String, AgentError> {
        let body = json!({"question": message, "questionnaireId": questionnaire_id});
        let reply: AnswerReply = self.client.post("api/questionnaire/assist", &body).await?;
        Ok(reply.answer)
    }
}
