use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// The primary task a query was classified into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryTask {
    /// Leaf/crop health analysis, usually with an image.
    DiseaseDetection,
    /// What to grow for a given soil and location.
    CropSelection,
    /// Where and at what price to sell a crop.
    MarketInfo,
    /// Disease outbreak alerts for an area.
    AlertCheck,
    /// Anything the classifier could not pin down.
    #[default]
    #[serde(other)]
    General,
}

impl PrimaryTask {
    /// Canonical snake_case name, matching the classifier's vocabulary.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimaryTask::DiseaseDetection => "disease_detection",
            PrimaryTask::CropSelection => "crop_selection",
            PrimaryTask::MarketInfo => "market_info",
            PrimaryTask::AlertCheck => "alert_check",
            PrimaryTask::General => "general",
        }
    }
}

/// The closed set of specialist advice generators.
///
/// The classifier proposes agents by name; only names resolving through
/// [`SpecialistKind::from_name`] are ever dispatched. Anything else is a
/// hallucinated name and is skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialistKind {
    CropAdvisor,
    MarketBroker,
    DiseaseDetector,
    AlertSystem,
}

impl SpecialistKind {
    /// Resolve a classifier-proposed agent name to a known specialist.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "crop_advisor" => Some(SpecialistKind::CropAdvisor),
            "market_broker" => Some(SpecialistKind::MarketBroker),
            "disease_detector" => Some(SpecialistKind::DiseaseDetector),
            "alert_system" => Some(SpecialistKind::AlertSystem),
            _ => None,
        }
    }

    /// Canonical snake_case agent name.
    pub fn name(&self) -> &'static str {
        match self {
            SpecialistKind::CropAdvisor => "crop_advisor",
            SpecialistKind::MarketBroker => "market_broker",
            SpecialistKind::DiseaseDetector => "disease_detector",
            SpecialistKind::AlertSystem => "alert_system",
        }
    }

    /// Human-readable title used in response headers.
    pub fn display_name(&self) -> &'static str {
        match self {
            SpecialistKind::CropAdvisor => "Crop Advisor",
            SpecialistKind::MarketBroker => "Market Broker",
            SpecialistKind::DiseaseDetector => "Disease Detector",
            SpecialistKind::AlertSystem => "Alert System",
        }
    }
}

// =============================================================================
// Query
// =============================================================================

/// An image payload attached to a query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageAttachment {
    /// Declared MIME type, e.g. `image/jpeg`.
    pub mime_type: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

/// One incoming user request. Immutable once received; the source of all
/// downstream derivations.
#[derive(Clone, Debug)]
pub struct Query {
    /// Free-text user input.
    pub text: String,
    /// Optional attached image.
    pub image: Option<ImageAttachment>,
}

impl Query {
    /// A text-only query.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    /// A query with an attached image.
    pub fn with_image(text: impl Into<String>, image: ImageAttachment) -> Self {
        Self {
            text: text.into(),
            image: Some(image),
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Output of the intent classifier.
///
/// Produced once per query by the language model; every field is
/// default-tolerant because the producer is an unreliable free-text model.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentClassification {
    /// Free-text description of the detected intent.
    pub intent: String,
    /// Agents the classifier proposes, in priority order.
    pub agents_suggested: Vec<String>,
    /// Enumerated primary task.
    pub primary_task: PrimaryTask,
    /// Classifier self-reported confidence in [0, 1].
    pub confidence: f32,
    /// Why the classifier chose these agents.
    pub reasoning: String,
}

/// Parameters extracted from free text by a second, independent model call.
///
/// An inherently lossy oracle: each field is independently nullable and
/// independently defaulted by the specialist that consumes it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedParameters {
    pub crop: Option<String>,
    pub location: Option<String>,
    pub soil_type: Option<String>,
    pub quantity: Option<String>,
}

impl ExtractedParameters {
    /// Boundary normalization: trim, lowercase, and fold empty strings to
    /// `None`. No invariant may assume extracted fields are well-formed.
    pub fn normalize(self) -> Self {
        fn clean(field: Option<String>) -> Option<String> {
            field
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
        }
        Self {
            crop: clean(self.crop),
            location: clean(self.location),
            soil_type: clean(self.soil_type),
            quantity: clean(self.quantity),
        }
    }
}

// =============================================================================
// Session state
// =============================================================================

/// Session-scoped accumulator of facts and interest counters derived from
/// prior queries. Last-write-wins for scalars; counters only increment.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub location: Option<String>,
    pub current_crop: Option<String>,
    pub soil_type: Option<String>,
    /// Occurrence count per primary task.
    pub interests: HashMap<PrimaryTask, u32>,
}

impl UserProfile {
    /// Overwrite scalar fields from the non-null extracted parameters.
    pub fn absorb(&mut self, params: &ExtractedParameters) {
        if let Some(ref location) = params.location {
            self.location = Some(location.clone());
        }
        if let Some(ref crop) = params.crop {
            self.current_crop = Some(crop.clone());
        }
        if let Some(ref soil) = params.soil_type {
            self.soil_type = Some(soil.clone());
        }
    }

    /// Count one more query against the given primary task.
    pub fn record_interest(&mut self, task: PrimaryTask) {
        *self.interests.entry(task).or_insert(0) += 1;
    }

    /// Reset the profile to its initial empty state.
    pub fn clear(&mut self) {
        *self = UserProfile::default();
    }
}

/// One completed request, appended to the conversation log. Read-only
/// history, never mutated after append.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub timestamp: DateTime<Utc>,
    pub user_input: String,
    /// The classifier's intent description, before any routing override.
    pub intent: String,
    pub primary_task: PrimaryTask,
    /// The validated agent list actually dispatched.
    pub agents_called: Vec<String>,
    pub response: String,
    pub had_image: bool,
}

// =============================================================================
// Disease reports
// =============================================================================

/// A farmer-submitted (or seeded historical) disease sighting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseReport {
    pub crop: String,
    pub disease: String,
    pub location: String,
    pub report_date: NaiveDate,
}
