//! Specialist advice generators for AgriBot.
//!
//! Four independent generators (crop advisor, market broker, disease
//! detector, alert system), each a thin wrapper around one language-model
//! call, plus the process-wide disease report store the alert system reads.

pub mod alert_system;
pub mod crop_advisor;
pub mod disease_detector;
pub mod error;
pub mod market_broker;
pub mod registry;
pub mod reports;

pub use alert_system::AlertSystem;
pub use crop_advisor::{CropAdvice, CropAdvisor};
pub use disease_detector::DiseaseDetector;
pub use error::AgentError;
pub use market_broker::MarketBroker;
pub use registry::SpecialistSet;
pub use reports::ReportStore;
