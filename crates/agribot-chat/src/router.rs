//! Intent classification and deterministic agent routing.
//!
//! The classifier is a language model and therefore unreliable; the keyword
//! ladder in [`IntentRouter::validate`] is the trust boundary that guarantees
//! predictable routing for clearly-signaled intents while leaving the model
//! discretion on ambiguous queries.

use std::sync::Arc;

use tracing::{debug, warn};

use agribot_core::types::{ExtractedParameters, IntentClassification, PrimaryTask, SpecialistKind};
use agribot_llm::{parse_fenced, LanguageModel};

// =============================================================================
// Keyword tables (priority order; earlier rules win)
// =============================================================================

/// Disease vocabulary. Together with an attached image, the strongest signal.
const DISEASE_KEYWORDS: &[&str] = &[
    "disease", "pest", "sick", "dying", "spots", "leaf", "problem", "analyze", "check",
    "diagnose", "health",
];

/// Crop-selection vocabulary; only routes when "soil" is also present.
const CROP_KEYWORDS: &[&str] = &[
    "grow",
    "plant",
    "suggest crops",
    "which crop",
    "best crop",
    "suitable crop",
    "recommend",
];

const MARKET_KEYWORDS: &[&str] = &["sell", "buyer", "market", "price", "selling", "purchase", "buy"];

const ALERT_KEYWORDS: &[&str] = &["alert", "warning", "outbreak", "recent", "area", "nearby"];

/// Fallback-classification vocabulary (used only when the classifier fails).
const FALLBACK_CROP_WORDS: &[&str] = &["crop", "grow", "plant"];

// =============================================================================
// IntentRouter
// =============================================================================

/// Classifies queries and corrects the classifier's agent proposal.
pub struct IntentRouter {
    llm: Arc<dyn LanguageModel>,
}

impl IntentRouter {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Classify a query into an intent, a primary task, and proposed agents.
    ///
    /// Never fails: a model error or unparseable response substitutes the
    /// deterministic fallback classification.
    pub async fn classify(&self, text: &str, has_image: bool) -> IntentClassification {
        let prompt = classification_prompt(text, has_image);
        match self.llm.generate_text(&prompt).await {
            Ok(response) => match parse_fenced::<IntentClassification>(&response) {
                Ok(classification) => classification,
                Err(e) => {
                    warn!(error = %e, "Unparseable classification, using fallback");
                    fallback_classification(text)
                }
            },
            Err(e) => {
                warn!(error = %e, "Classification call failed, using fallback");
                fallback_classification(text)
            }
        }
    }

    /// Extract agricultural parameters from free text.
    ///
    /// A second, independent model call with its own JSON-or-fallback
    /// contract; on any failure all fields are `None`. Decoupled from
    /// [`IntentRouter::classify`] so one parse failure never poisons the
    /// other. Results are normalized at the boundary.
    pub async fn extract_parameters(&self, text: &str) -> ExtractedParameters {
        let prompt = extraction_prompt(text);
        let parameters = match self.llm.generate_text(&prompt).await {
            Ok(response) => match parse_fenced::<ExtractedParameters>(&response) {
                Ok(parameters) => parameters,
                Err(e) => {
                    warn!(error = %e, "Unparseable parameters, using empty set");
                    ExtractedParameters::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "Parameter extraction call failed, using empty set");
                ExtractedParameters::default()
            }
        };
        parameters.normalize()
    }

    /// Correct the classifier's agent proposal with the keyword ladder.
    ///
    /// First match wins:
    /// 1. image attached or disease vocabulary -> disease detector
    /// 2. crop-selection keyword and "soil" -> crop advisor
    /// 3. market keyword -> market broker
    /// 4. alert keyword -> alert system
    /// 5. at most the first proposed agent
    /// 6. crop advisor as the unconditional default
    ///
    /// An image attachment always wins routing to disease detection,
    /// regardless of what the classifier said.
    pub fn validate(&self, suggested: &[String], has_image: bool, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let contains_any = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

        if has_image || contains_any(DISEASE_KEYWORDS) {
            return vec![SpecialistKind::DiseaseDetector.name().to_string()];
        }
        if contains_any(CROP_KEYWORDS) && lower.contains("soil") {
            return vec![SpecialistKind::CropAdvisor.name().to_string()];
        }
        if contains_any(MARKET_KEYWORDS) {
            return vec![SpecialistKind::MarketBroker.name().to_string()];
        }
        if contains_any(ALERT_KEYWORDS) {
            return vec![SpecialistKind::AlertSystem.name().to_string()];
        }
        if let Some(first) = suggested.first() {
            // Multi-agent fan-out is not supported: keep the first proposal.
            debug!(agent = %first, "No keyword override, keeping first suggestion");
            return vec![first.clone()];
        }
        vec![SpecialistKind::CropAdvisor.name().to_string()]
    }
}

/// Deterministic classification used when the model cannot be trusted.
fn fallback_classification(text: &str) -> IntentClassification {
    let lower = text.to_lowercase();
    let agents_suggested = if FALLBACK_CROP_WORDS.iter().any(|w| lower.contains(w)) {
        vec![SpecialistKind::CropAdvisor.name().to_string()]
    } else {
        Vec::new()
    };
    IntentClassification {
        intent: "general agricultural query".to_string(),
        agents_suggested,
        primary_task: PrimaryTask::General,
        confidence: 0.5,
        reasoning: String::new(),
    }
}

fn classification_prompt(text: &str, has_image: bool) -> String {
    format!(
        "You are an expert agricultural AI classifier. Analyze this query and \
         classify it precisely:\n\
         \n\
         Query: \"{text}\"\n\
         Has Image Attached: {has_image}\n\
         \n\
         CLASSIFICATION RULES:\n\
         - disease_detector: ONLY for disease, pests, leaf problems, image \
         analysis, crop health issues, or when an image is attached\n\
         - crop_advisor: ONLY for what crops to grow, crop suggestions, \
         planting advice\n\
         - market_broker: ONLY for where to sell, market prices, buyers, \
         selling platforms\n\
         - alert_system: ONLY for disease alerts, area warnings, recent \
         outbreaks\n\
         \n\
         Return JSON:\n\
         {{\n\
           \"intent\": \"specific intent description\",\n\
           \"agents_suggested\": [\"only the most relevant agent(s)\"],\n\
           \"primary_task\": \"disease_detection|crop_selection|market_info|alert_check|general\",\n\
           \"confidence\": 0.9,\n\
           \"reasoning\": \"why you chose these agents\"\n\
         }}\n\
         \n\
         BE STRICT: choose only ONE primary agent unless clearly multiple \
         tasks are requested."
    )
}

fn extraction_prompt(text: &str) -> String {
    format!(
        "Extract agricultural parameters from: \"{text}\"\n\
         \n\
         Return JSON:\n\
         {{\n\
           \"crop\": \"crop name or null\",\n\
           \"location\": \"city/region or null\",\n\
           \"soil_type\": \"soil type or null\",\n\
           \"quantity\": \"quantity mentioned or null\"\n\
         }}"
    )
}
