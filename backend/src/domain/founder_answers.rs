//! Canonical founder answer records.
//!
//! Answers are stored in the `founder_answers` collection. Older questionnaire
//! documents carry an embedded `answers` field instead; [`entries_from_value`]
//! normalises both the object-map and the array form so readers only ever
//! see [`AnswerEntry`] values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::domain::Error;
use crate::domain::ports::{Collection, DocumentQuery, DocumentStore, Stored};
use crate::domain::questionnaire::Questionnaire;
use crate::domain::service_support::map_store_error;

/// One answer entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerEntry {
    /// Typed answer to a questionnaire question.
    Question {
        #[serde(rename = "questionId")]
        question_id: String,
        #[serde(
            rename = "questionText",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        question_text: Option<String>,
        #[serde(rename = "answerText")]
        answer_text: String,
    },
    /// Transcript turn from a call.
    Turn { role: String, text: String },
    /// Anything else, kept verbatim.
    Other(Value),
}

/// Stored answer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FounderAnswers {
    pub startup_id: String,
    pub questionnaire_id: String,
    pub answers: Vec<AnswerEntry>,
    #[serde(default)]
    pub transcript_uri: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

fn answer_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Normalise raw answers into entries.
///
/// An object map `{questionId: answer}` becomes question entries; an array is
/// parsed element by element. Any other shape yields `None`.
///
/// # Examples
/// ```
/// use dealroom::domain::{AnswerEntry, entries_from_value};
/// use serde_json::json;
///
/// let entries = entries_from_value(&json!({"q1": "About $4B"})).expect("map form");
/// assert_eq!(
///     entries,
///     vec![AnswerEntry::Question {
///         question_id: "q1".to_owned(),
///         question_text: None,
///         answer_text: "About $4B".to_owned(),
///     }]
/// );
/// ```
pub fn entries_from_value(raw: &Value) -> Option<Vec<AnswerEntry>> {
    match raw {
        Value::Object(map) => Some(
            map.iter()
                .map(|(question_id, answer)| AnswerEntry::Question {
                    question_id: question_id.clone(),
                    question_text: None,
                    answer_text: answer_text(answer),
                })
                .collect(),
        ),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| {
                    serde_json::from_value(item.clone())
                        .unwrap_or_else(|_| AnswerEntry::Other(item.clone()))
                })
                .collect(),
        ),
        _ => None,
    }
}

impl FounderAnswers {
    /// Answers as the `{questionId: answerText}` object sent to the analyst.
    ///
    /// Transcript turns and unrecognised entries have no question id and are
    /// keyed by position instead (`turn_1`, `entry_2`, ...).
    pub fn answer_map(&self) -> Map<String, Value> {
        self.answers
            .iter()
            .enumerate()
            .map(|(index, entry)| match entry {
                AnswerEntry::Question {
                    question_id,
                    answer_text,
                    ..
                } => (question_id.clone(), Value::String(answer_text.clone())),
                AnswerEntry::Turn { role, text } => (
                    format!("turn_{}", index + 1),
                    json!({"role": role, "text": text}),
                ),
                AnswerEntry::Other(value) => (format!("entry_{}", index + 1), value.clone()),
            })
            .collect()
    }

    /// View a legacy questionnaire's embedded `answers` as a record.
    pub fn from_embedded(questionnaire: &Stored<Questionnaire>) -> Option<Self> {
        let answers = entries_from_value(questionnaire.record.answers.as_ref()?)?;
        Some(Self {
            startup_id: questionnaire.record.startup_id.clone(),
            questionnaire_id: questionnaire.id.clone(),
            answers,
            transcript_uri: None,
            status: "complete".to_owned(),
            created_at: questionnaire.record.updated_at.clone(),
            updated_at: questionnaire.record.updated_at.clone(),
        })
    }
}

/// Answers for a questionnaire through the canonical accessor.
///
/// Looks up the linked record first, then the newest record for the
/// questionnaire, then embedded legacy answers.
pub async fn load_answers(
    store: &dyn DocumentStore,
    questionnaire: &Stored<Questionnaire>,
) -> Result<Option<FounderAnswers>, Error> {
    if let Some(answers_id) = &questionnaire.record.founder_answers_id {
        let linked = store
            .get(Collection::FounderAnswers, answers_id)
            .await
            .map_err(map_store_error)?;
        if let Some(document) = linked {
            return document
                .into_record::<FounderAnswers>()
                .map(|stored| Some(stored.record))
                .map_err(map_store_error);
        }
    }

    let query = DocumentQuery::new()
        .where_eq("questionnaireId", questionnaire.id.as_str())
        .newest_first()
        .limit(1);
    let mut found = store
        .query(Collection::FounderAnswers, &query)
        .await
        .map_err(map_store_error)?;
    if let Some(document) = found.pop() {
        return document
            .into_record::<FounderAnswers>()
            .map(|stored| Some(stored.record))
            .map_err(map_store_error);
    }
    Ok(FounderAnswers::from_embedded(questionnaire))
}
