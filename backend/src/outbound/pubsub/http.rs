//! Pub/Sub REST publisher.
//!
//! Posts to `v1/projects/{project}/topics/{topic}:publish` with the payload
//! base64-encoded in `messages[0].data`. Against the emulator no credential is
//! sent; otherwise a bearer access token is attached when configured.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::domain::ports::{EventPublisher, EventPublisherError};

const PUBSUB_API: &str = "https://pubsub.googleapis.com";

/// Where and how to publish.
#[derive(Clone)]
pub struct PubSubConfig {
    pub project_id: String,
    /// `host:port` of a local emulator.
    pub emulator_host: Option<String>,
    pub access_token: Option<Zeroizing<String>>,
    pub timeout: Duration,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishReply {
    #[serde(default)]
    message_ids: Vec<String>,
}

/// [`EventPublisher`] speaking the Pub/Sub REST API.
pub struct PubSubPublisher {
    client: Client,
    base_url: String,
    project_id: String,
    access_token: Option<Zeroizing<String>>,
}

impl PubSubPublisher {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: PubSubConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let (base_url, access_token) = match config.emulator_host {
            Some(host) => {
                info!(%host, "publishing to the pub/sub emulator");
                (format!("http://{}", host.trim_end_matches('/')), None)
            }
            None => (PUBSUB_API.to_owned(), config.access_token),
        };
        Ok(Self {
            client,
            base_url,
            project_id: config.project_id,
            access_token,
        })
    }

    fn publish_url(&self, topic: &str) -> String {
        format!(
            "{}/v1/projects/{}/topics/{topic}:publish",
            self.base_url, self.project_id
        )
    }
}

/// Request body carrying one base64-encoded JSON message.
fn publish_body(payload: &Value) -> Value {
    json!({"messages": [{"data": STANDARD.encode(payload.to_string())}]})
}

#[async_trait]
impl EventPublisher for PubSubPublisher {
    async fn publish(&self, topic: &str, payload: &Value) -> Result<String, EventPublisherError> {
        let mut request = self
            .client
            .post(self.publish_url(topic))
            .json(&publish_body(payload));
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token.as_str());
        }
        let response = request
            .send()
            .await
            .map_err(|err| EventPublisherError::transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| EventPublisherError::transport(err.to_string()))?;
        if !status.is_success() {
            return Err(EventPublisherError::rejected(format!(
                "status {}: {}",
                status.as_u16(),
                String::from_utf8_lossy(&body).trim()
            )));
        }
        let reply: PublishReply = serde_json::from_slice(&body)
            .map_err(|err| EventPublisherError::decode(err.to_string()))?;
        let message_id = reply
            .message_ids
            .into_iter()
            .next()
            .ok_or_else(|| EventPublisherError::decode("reply carried no message ids"))?;
        debug!(%topic, %message_id, "event published");
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn config(emulator_host: Option<&str>) -> PubSubConfig {
        PubSubConfig {
            project_id: "dealroom-dev".to_owned(),
            emulator_host: emulator_host.map(str::to_owned),
            access_token: Some(Zeroizing::new("token".to_owned())),
            timeout: Duration::from_secs(5),
        }
    }

    #[rstest]
    #[case::emulator(Some("localhost:8085"), "http://localhost:8085/v1/projects/dealroom-dev/topics/ingest:publish")]
    #[case::cloud(None, "https://pubsub.googleapis.com/v1/projects/dealroom-dev/topics/ingest:publish")]
    fn publish_urls_target_the_topic(#[case] emulator: Option<&str>, #[case] expected: &str) {
        let publisher = PubSubPublisher::new(config(emulator)).expect("client");
        assert_eq!(publisher.publish_url("ingest"), expected);
    }

    #[test]
    fn emulator_publishing_drops_the_token() {
        let publisher = PubSubPublisher::new(config(Some("localhost:8085"))).expect("client");
        assert!(publisher.access_token.is_none());
    }

    #[test]
    fn payload_is_base64_json() {
        let payload = json!({"type": "startup.pitch_uploaded", "uploadId": "u1"});
        let body = publish_body(&payload);
        let data = body["messages"][0]["data"].as_str().expect("data");
        let decoded = STANDARD.decode(data).expect("base64");
        let round: Value = serde_json::from_slice(&decoded).expect("json");
        assert_eq!(round, payload);
    }
}
