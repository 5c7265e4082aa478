//! Follow-up call scheduling.

use std::sync::Arc;

use chrono::{Days, NaiveTime};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::{Collection, DocumentQuery, DocumentStore};
use crate::domain::service_support::{documents_json, map_store_error, nullable, object, stamped};
use crate::domain::{Error, format_timestamp, now_timestamp};

/// Hours of the day (UTC) offered for calls.
pub const SLOT_HOURS: [u32; 6] = [9, 10, 11, 14, 15, 16];

/// Call booking request.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleCallForm {
    pub startup_id: Option<String>,
    pub questionnaire_id: Option<String>,
    pub scheduled_time: Option<String>,
    pub phone_number: Option<String>,
}

/// Stored call as returned to the booker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledCall {
    pub call_id: String,
    pub status: &'static str,
    pub scheduled_time: String,
    pub phone_number: Option<String>,
}

/// Books calls and lists them.
pub struct SchedulerService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl SchedulerService {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Fixed slots for tomorrow, UTC.
    pub fn available_slots(&self) -> Vec<String> {
        let now = self.clock.utc();
        let tomorrow = now
            .date_naive()
            .checked_add_days(Days::new(1))
            .unwrap_or_else(|| now.date_naive());
        SLOT_HOURS
            .iter()
            .filter_map(|hour| NaiveTime::from_hms_opt(*hour, 0, 0))
            .map(|time| format_timestamp(tomorrow.and_time(time).and_utc()))
            .collect()
    }

    /// Record a call with `status = "scheduled"`.
    ///
    /// `code` is reported when the startup, questionnaire or time is missing;
    /// routes that take the startup from the path supply their own code.
    pub async fn schedule(&self, form: ScheduleCallForm, code: &str) -> Result<ScheduledCall, Error> {
        let present = |value: Option<String>| value.filter(|text| !text.is_empty());
        let (Some(startup_id), Some(questionnaire_id), Some(scheduled_time)) = (
            present(form.startup_id),
            present(form.questionnaire_id),
            present(form.scheduled_time),
        ) else {
            return Err(Error::invalid_request(code));
        };
        let phone_number = present(form.phone_number);
        let data = stamped(
            object(json!({
                "startupId": startup_id,
                "questionnaireId": questionnaire_id,
                "scheduledTime": scheduled_time,
                "phoneNumber": nullable(phone_number.as_deref()),
                "status": "scheduled",
            })),
            &now_timestamp(self.clock.as_ref()),
        );
        let call_id = self
            .store
            .add(Collection::ScheduledCalls, data)
            .await
            .map_err(map_store_error)?;
        info!(%startup_id, %call_id, %scheduled_time, "call scheduled");
        Ok(ScheduledCall {
            call_id,
            status: "scheduled",
            scheduled_time,
            phone_number,
        })
    }

    /// Calls booked by a startup, newest first.
    pub async fn calls_for_startup(&self, startup_id: &str) -> Result<Vec<Value>, Error> {
        let query = DocumentQuery::new()
            .where_eq("startupId", startup_id)
            .newest_first();
        let documents = self
            .store
            .query(Collection::ScheduledCalls, &query)
            .await
            .map_err(map_store_error)?;
        Ok(documents_json(documents))
    }
}
