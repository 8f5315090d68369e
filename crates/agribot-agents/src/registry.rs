//! Static specialist registry.
//!
//! All four specialists are constructed at startup; a missing specialist is
//! unrepresentable rather than a per-call condition. The orchestrator still
//! skips agent names outside the closed enum, since a classifier can
//! hallucinate names.

use std::sync::Arc;

use agribot_llm::LanguageModel;
use agribot_weather::WeatherClient;

use crate::alert_system::AlertSystem;
use crate::crop_advisor::CropAdvisor;
use crate::disease_detector::DiseaseDetector;
use crate::market_broker::MarketBroker;
use crate::reports::ReportStore;

/// The full set of specialists, wired to their collaborators.
pub struct SpecialistSet {
    pub crop_advisor: CropAdvisor,
    pub market_broker: MarketBroker,
    pub disease_detector: DiseaseDetector,
    pub alert_system: AlertSystem,
}

impl SpecialistSet {
    /// Wire all specialists to the shared model client, weather client, and
    /// process-wide report store.
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        weather: Arc<WeatherClient>,
        reports: Arc<ReportStore>,
    ) -> Self {
        Self {
            crop_advisor: CropAdvisor::new(llm.clone(), weather),
            market_broker: MarketBroker::new(llm.clone()),
            disease_detector: DiseaseDetector::new(llm.clone()),
            alert_system: AlertSystem::new(llm, reports),
        }
    }
}
