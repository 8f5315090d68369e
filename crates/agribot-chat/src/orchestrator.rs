//! Request orchestrator: central coordinator wiring router, specialists,
//! and synthesis.
//!
//! Owns the per-session user profile and conversation log. One query is
//! fully classified, dispatched, synthesized, and recorded before the next
//! is accepted; every external call is awaited in sequence with no retry.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use agribot_agents::SpecialistSet;
use agribot_core::types::{
    ConversationTurn, ExtractedParameters, ImageAttachment, PrimaryTask, Query, SpecialistKind,
    UserProfile,
};
use agribot_llm::LanguageModel;

use crate::error::ChatError;
use crate::router::IntentRouter;

/// One processed reply plus the routing metadata the presentation boundary
/// displays alongside it.
#[derive(Clone, Debug)]
pub struct ChatReply {
    pub response: String,
    /// The classifier's intent description, before any routing override.
    pub intent: String,
    pub primary_task: PrimaryTask,
    /// The validated agent list actually dispatched.
    pub agents_called: Vec<String>,
}

/// Session counters for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionStats {
    pub total_queries: usize,
    pub image_queries: usize,
}

/// Central coordinator for one chat session.
pub struct Orchestrator {
    router: IntentRouter,
    specialists: SpecialistSet,
    llm: Arc<dyn LanguageModel>,
    profile: UserProfile,
    history: Vec<ConversationTurn>,
}

impl Orchestrator {
    /// Create an orchestrator around an already-wired specialist set.
    pub fn new(llm: Arc<dyn LanguageModel>, specialists: SpecialistSet) -> Self {
        Self {
            router: IntentRouter::new(llm.clone()),
            specialists,
            llm,
            profile: UserProfile::default(),
            history: Vec::new(),
        }
    }

    /// Process one query end to end.
    ///
    /// Classifies, validates the routing, extracts parameters, dispatches
    /// the validated specialists in order, synthesizes a reply, and only
    /// then updates the profile and conversation log. Specialist and
    /// synthesis failures are recovered locally; the only error returned is
    /// a query with neither text nor image, raised before any state is
    /// touched.
    pub async fn process(&mut self, query: &Query) -> Result<ChatReply, ChatError> {
        if query.text.trim().is_empty() && !query.has_image() {
            return Err(ChatError::EmptyQuery);
        }
        let has_image = query.has_image();

        let classification = self.router.classify(&query.text, has_image).await;
        info!(
            intent = %classification.intent,
            primary_task = classification.primary_task.as_str(),
            confidence = classification.confidence,
            "Query classified"
        );

        let validated =
            self.router
                .validate(&classification.agents_suggested, has_image, &query.text);
        if validated != classification.agents_suggested {
            info!(agents = ?validated, "Routing corrected by keyword override");
        }

        let parameters = self.router.extract_parameters(&query.text).await;
        debug!(?parameters, "Parameters extracted");

        let results = self
            .dispatch(&validated, &parameters, query.image.as_ref())
            .await;

        let response = if results.is_empty() {
            fallback_response(classification.primary_task)
        } else {
            self.synthesize(&query.text, &classification.intent, &results)
                .await
        };

        // State mutation happens only after a response exists, so a failed
        // pipeline never leaves the session partially updated.
        self.profile.absorb(&parameters);
        self.profile.record_interest(classification.primary_task);
        self.history.push(ConversationTurn {
            timestamp: Utc::now(),
            user_input: query.text.clone(),
            intent: classification.intent.clone(),
            primary_task: classification.primary_task,
            agents_called: validated.clone(),
            response: response.clone(),
            had_image: has_image,
        });

        Ok(ChatReply {
            response,
            intent: classification.intent,
            primary_task: classification.primary_task,
            agents_called: validated,
        })
    }

    /// Call each validated agent in order, collecting `(name, result)` pairs.
    ///
    /// A failing specialist records its error string as the result and the
    /// loop continues; names outside the closed enum are skipped silently.
    async fn dispatch(
        &self,
        validated: &[String],
        parameters: &ExtractedParameters,
        image: Option<&ImageAttachment>,
    ) -> Vec<(String, String)> {
        let mut results = Vec::new();
        for name in validated {
            let Some(kind) = SpecialistKind::from_name(name) else {
                debug!(agent = %name, "Skipping unknown agent name");
                continue;
            };
            info!(agent = %name, "Calling specialist");

            let outcome = match kind {
                SpecialistKind::CropAdvisor => {
                    let soil = parameters.soil_type.as_deref().unwrap_or("mixed");
                    let location = parameters.location.as_deref().unwrap_or("India");
                    self.specialists
                        .crop_advisor
                        .advise(soil, location)
                        .await
                        .map(|advice| format!("Weather: {}\n\n{}", advice.weather, advice.advice))
                }
                SpecialistKind::MarketBroker => {
                    let crop = parameters.crop.as_deref().unwrap_or("wheat");
                    let location = parameters.location.as_deref().unwrap_or("India");
                    self.specialists
                        .market_broker
                        .broker(crop, location, parameters.quantity.as_deref())
                        .await
                }
                SpecialistKind::DiseaseDetector => {
                    self.specialists.disease_detector.detect(image).await
                }
                SpecialistKind::AlertSystem => {
                    let crop = parameters.crop.as_deref().unwrap_or("wheat");
                    let location = parameters.location.as_deref().unwrap_or("India");
                    self.specialists.alert_system.check_alert(crop, location).await
                }
            };

            let text = outcome.unwrap_or_else(|e| {
                warn!(agent = %name, error = %e, "Specialist failed");
                format!("Error calling {name}: {e}")
            });
            results.push((name.clone(), text));
        }
        results
    }

    /// Merge the collected specialist outputs into one reply.
    ///
    /// On synthesis failure the fallback reproduces every collected result
    /// verbatim, in dispatch order, under a header naming the agent.
    async fn synthesize(
        &self,
        user_input: &str,
        intent: &str,
        results: &[(String, String)],
    ) -> String {
        let prompt = synthesis_prompt(user_input, intent, results);
        match self.llm.generate_text(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Synthesis failed, concatenating agent results");
                concatenate_results(results)
            }
        }
    }

    // -- Presentation-boundary accessors --

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn specialists(&self) -> &SpecialistSet {
        &self.specialists
    }

    /// Reset the session: profile and conversation log.
    pub fn clear_session(&mut self) {
        self.profile.clear();
        self.history.clear();
    }

    pub fn session_stats(&self) -> SessionStats {
        SessionStats {
            total_queries: self.history.len(),
            image_queries: self.history.iter().filter(|t| t.had_image).count(),
        }
    }
}

fn synthesis_prompt(user_input: &str, intent: &str, results: &[(String, String)]) -> String {
    let mut agent_results = String::new();
    for (name, text) in results {
        let _ = writeln!(agent_results, "{name}:\n{text}\n");
    }
    format!(
        "User asked: \"{user_input}\"\n\
         Intent: {intent}\n\
         \n\
         Agent results:\n\
         {agent_results}\n\
         Create a helpful, comprehensive response that:\n\
         1. Directly answers the user's question\n\
         2. Integrates all agent outputs naturally\n\
         3. Uses a friendly, professional tone\n\
         4. Provides actionable advice\n\
         5. Includes both English and Hindi where appropriate\n\
         \n\
         Make it conversational and helpful."
    )
}

/// Deterministic synthesis fallback: every result verbatim, in order.
fn concatenate_results(results: &[(String, String)]) -> String {
    let mut out = String::from("Here's what I found for your query:\n");
    for (name, text) in results {
        let title = SpecialistKind::from_name(name)
            .map(|k| k.display_name().to_string())
            .unwrap_or_else(|| name.clone());
        let _ = write!(out, "\n**{title}:**\n{text}\n");
    }
    out
}

/// Fixed reply when no agent produced a result.
fn fallback_response(primary_task: PrimaryTask) -> String {
    match primary_task {
        PrimaryTask::DiseaseDetection => {
            "I understand you want disease analysis. Please upload an image of \
             your crop leaves and I'll analyze them for diseases and suggest \
             treatments."
                .to_string()
        }
        PrimaryTask::CropSelection => {
            "I can help suggest the best crops for your area! Please share your \
             soil type and location for personalized recommendations."
                .to_string()
        }
        PrimaryTask::MarketInfo => {
            "I can help you find the best places to sell your crops! Please tell \
             me what crop you have and your location."
                .to_string()
        }
        PrimaryTask::AlertCheck => {
            "I can check for disease alerts in your area. Please specify your \
             location and the crop you're concerned about."
                .to_string()
        }
        PrimaryTask::General => {
            "I understand your agricultural question. Could you be more specific \
             about what you need help with? I can assist with:\n\
             - Crop selection and growing advice\n\
             - Disease detection (with images)\n\
             - Market information and selling platforms\n\
             - Disease alerts and warnings"
                .to_string()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
