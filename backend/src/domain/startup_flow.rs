//! Founder-facing flow: deck upload, then questionnaire generation.

use std::sync::Arc;

use tracing::warn;

use crate::domain::Error;
use crate::domain::pitch_deck::{PitchDeck, PitchDeckForm, PitchDeckService};
use crate::domain::ports::{QuestionnaireContext, Stored};
use crate::domain::questionnaire::{GeneratedQuestionnaire, QuestionnaireService};

/// Result of a founder deck upload.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchUploadOutcome {
    pub pitch_deck_id: String,
    /// `None` when questionnaire generation failed.
    pub questionnaire: Option<GeneratedQuestionnaire>,
}

impl PitchUploadOutcome {
    /// Human-readable confirmation.
    pub fn message(&self) -> &'static str {
        match self.questionnaire {
            Some(_) => "Pitch deck uploaded and questionnaire generated",
            None => "Pitch deck uploaded (questionnaire generation failed)",
        }
    }
}

/// Chains deck registration and questionnaire generation.
pub struct StartupFlowService {
    pitch_decks: Arc<PitchDeckService>,
    questionnaires: Arc<QuestionnaireService>,
}

impl StartupFlowService {
    pub fn new(pitch_decks: Arc<PitchDeckService>, questionnaires: Arc<QuestionnaireService>) -> Self {
        Self {
            pitch_decks,
            questionnaires,
        }
    }

    /// Register a deck and try to generate its questionnaire.
    ///
    /// Questionnaire failures are logged and reported as `None`.
    ///
    /// # Errors
    /// `startupId_fileName_gcsUri_required` for incomplete forms.
    pub async fn upload_pitch(&self, form: PitchDeckForm) -> Result<PitchUploadOutcome, Error> {
        let deck = form.validate("startupId_fileName_gcsUri_required")?;
        let deck = self.pitch_decks.create(deck).await?;
        let questionnaire = match self
            .questionnaires
            .generate_questionnaire(context_for(&deck))
            .await
        {
            Ok(generated) => Some(generated),
            Err(err) => {
                warn!(
                    startup_id = %deck.record.startup_id,
                    pitch_deck_id = %deck.id,
                    error = %err,
                    "questionnaire generation after upload failed"
                );
                None
            }
        };
        Ok(PitchUploadOutcome {
            pitch_deck_id: deck.id,
            questionnaire,
        })
    }

    /// Generate a questionnaire from the startup's newest deck.
    ///
    /// # Errors
    /// `pitch_deck_not_found`, or the generation failure.
    pub async fn generate_questionnaire(
        &self,
        startup_id: &str,
    ) -> Result<GeneratedQuestionnaire, Error> {
        let deck = self.pitch_decks.require_latest(startup_id).await?;
        self.questionnaires
            .generate_questionnaire(context_for(&deck))
            .await
    }
}

fn context_for(deck: &Stored<PitchDeck>) -> QuestionnaireContext {
    QuestionnaireContext {
        startup_id: deck.record.startup_id.clone(),
        note_id: None,
        pitch_deck_id: Some(deck.id.clone()),
        pitch_deck_gcs_uri: Some(deck.record.gcs_uri.clone()),
    }
}
