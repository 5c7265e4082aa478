//! Canned analyst output with seeded randomness.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value, json};

use crate::domain::fallback_deal_note;
use crate::domain::ports::{
    AgentError, AnalysedDealNote, AnalystAgent, FullAnalysisRequest, IngestedNote,
    IngestionRequest, NoteProvenance,
};

/// Probability that a claim of the given confidence is verified.
///
/// Unknown or missing confidence counts as medium.
pub fn verification_probability(confidence: Option<&str>) -> f64 {
    match confidence {
        Some("high") => 0.8,
        Some("low") => 0.3,
        _ => 0.5,
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Analyst stand-in used when the agent base URL is `mock`.
pub struct SyntheticAnalystAgent {
    rng: Mutex<SmallRng>,
}

impl SyntheticAnalystAgent {
    /// Agent seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    /// Deterministic agent for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, draw: impl FnOnce(&mut SmallRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        draw(&mut rng)
    }

    fn verify_claim(&self, claim: &Value) -> Value {
        let probability = verification_probability(claim.get("confidence").and_then(Value::as_str));
        let verified = self.with_rng(|rng| rng.r#gen::<f64>() < probability);
        let text = claim.get("claim").and_then(Value::as_str).unwrap_or_default();

        let mut entry = claim.as_object().cloned().unwrap_or_else(Map::new);
        entry.insert("verified".to_owned(), Value::Bool(verified));
        let (evidence, analysis) = if verified {
            (
                json!([{
                    "source": "web",
                    "url": "https://example.com/evidence",
                    "text": format!("Evidence supporting the claim that {text}"),
                }]),
                "This claim appears to be accurate based on our research.",
            )
        } else {
            (
                json!([]),
                "We could not fully verify this claim with available data.",
            )
        };
        entry.insert("evidence".to_owned(), evidence);
        entry.insert("analysis".to_owned(), Value::String(analysis.to_owned()));
        Value::Object(entry)
    }

    /// Component scores in tenths, risk in hundredths.
    fn draw_score(&self) -> Value {
        let (team, market, product, traction, risk) = self.with_rng(|rng| {
            (
                f64::from(rng.gen_range(70_u32..100)) / 10.0,
                f64::from(rng.gen_range(60_u32..100)) / 10.0,
                f64::from(rng.gen_range(70_u32..100)) / 10.0,
                f64::from(rng.gen_range(60_u32..90)) / 10.0,
                f64::from(rng.gen_range(20_u32..50)) / 100.0,
            )
        });
        let mean = (team + market + product + traction) / 4.0;
        json!({
            "team": team,
            "market": market,
            "product": product,
            "traction": traction,
            "risk": risk,
            "overall": round_to(mean * (1.0 - risk), 1),
        })
    }
}

impl Default for SyntheticAnalystAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalystAgent for SyntheticAnalystAgent {
    async fn ingest(&self, request: &IngestionRequest) -> Result<IngestedNote, AgentError> {
        let note = json!({
            "title": "Deal Note",
            "inputs": {"gcsUri": request.gcs_uri, "uploadId": request.upload_id},
            "company": request.startup_id,
            "sector": "tech",
            "facts": {
                "name": request.startup_id,
                "description": "An AI-powered startup focused on enterprise automation",
                "founders": [
                    {"name": "Jane Smith", "role": "CEO", "background": "Ex-Google AI researcher"},
                    {"name": "John Doe", "role": "CTO", "background": "PhD in Machine Learning from Stanford"},
                ],
                "traction": {
                    "revenue": {"Y1": 500_000, "Y2": 1_200_000},
                    "customers": 25,
                    "growth": "140% YoY",
                },
                "funding": {
                    "raised": "$2.5M",
                    "round": "Seed",
                    "investors": ["TechVC", "Angel Group"],
                },
                "product": {
                    "stage": "Growth",
                    "description": "AI platform for business process automation",
                },
                "market": {"size": "$45B by 2027", "cagr": "32%"},
            },
            "claims": [
                {"claim": "40% cost reduction for customers", "source": "slide 12", "confidence": "high"},
                {"claim": "Proprietary ML algorithm with 2 patents pending", "source": "slide 8", "confidence": "high"},
                {"claim": "85% customer satisfaction rate", "source": "slide 15", "confidence": "medium"},
                {"claim": "Market leader in their segment", "source": "slide 5", "confidence": "low"},
            ],
        });
        Ok(IngestedNote {
            note_id: None,
            note,
        })
    }

    async fn research(&self, _note_id: &str, note: &Value) -> Result<Value, AgentError> {
        let claims = note
            .get("claims")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(Value::Array(
            claims.iter().map(|claim| self.verify_claim(claim)).collect(),
        ))
    }

    async fn score(&self, _note_id: &str, _note: &Value) -> Result<Value, AgentError> {
        Ok(self.draw_score())
    }

    async fn analyse_startup(
        &self,
        _request: &FullAnalysisRequest,
    ) -> Result<AnalysedDealNote, AgentError> {
        Ok(AnalysedDealNote {
            note: fallback_deal_note(),
            provenance: NoteProvenance::Synthetic,
        })
    }
}
