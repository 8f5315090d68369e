//! Disease outbreak alerts backed by the report store.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::Local;
use tracing::debug;

use agribot_core::types::DiseaseReport;
use agribot_llm::LanguageModel;

use crate::error::AgentError;
use crate::reports::ReportStore;

/// Generates outbreak alerts from stored disease reports.
pub struct AlertSystem {
    llm: Arc<dyn LanguageModel>,
    reports: Arc<ReportStore>,
}

impl AlertSystem {
    pub fn new(llm: Arc<dyn LanguageModel>, reports: Arc<ReportStore>) -> Self {
        Self { llm, reports }
    }

    /// Check for alerts relevant to a crop and location.
    ///
    /// Any stored report matching the crop or the location selects the
    /// alert-toned message; otherwise the farmer gets the all-clear.
    pub async fn check_alert(&self, crop: &str, location: &str) -> Result<String, AgentError> {
        let matches = self.reports.matching(crop, location);
        debug!(crop, location, matches = matches.len(), "Checking disease alerts");

        let prompt = if matches.is_empty() {
            all_clear_prompt(crop, location)
        } else {
            alert_prompt(crop, location, &matches)
        };
        Ok(self.llm.generate_text(&prompt).await?)
    }

    /// Record a farmer-submitted disease sighting, then generate the alert
    /// message for that submission.
    pub async fn submit_report(
        &self,
        crop: &str,
        disease: &str,
        location: &str,
    ) -> Result<String, AgentError> {
        let report = DiseaseReport {
            crop: crop.to_lowercase(),
            disease: disease.to_lowercase(),
            location: location.to_lowercase(),
            report_date: Local::now().date_naive(),
        };
        self.reports.submit(report.clone());
        debug!(crop, disease, location, "Disease report recorded");

        let prompt = alert_prompt(crop, location, std::slice::from_ref(&report));
        Ok(self.llm.generate_text(&prompt).await?)
    }
}

fn alert_prompt(crop: &str, location: &str, reports: &[DiseaseReport]) -> String {
    let mut context = String::new();
    for report in reports {
        let _ = writeln!(
            context,
            "- {} on {} near {} (reported {})",
            report.disease, report.crop, report.location, report.report_date
        );
    }
    format!(
        "You are an agricultural assistant. Note this alert for the farmer.\n\
         - Recent crop disease reports relevant to {crop} in {location}:\n\
         {context}\
         - Write a serious but helpful message for the farmer.\n\
         - Mention the disease name and its symptoms.\n\
         - Give the solution for the crop disease and suggest \
         medicines/pesticides.\n\
         - Encourage them to inspect the field or consult experts.\n\
         - Provide clear and actionable advice, concise and informative.\n\
         - First in English, then in Hindi.\n\
         \n\
         Do not answer in report format, just write a message."
    )
}

fn all_clear_prompt(crop: &str, location: &str) -> String {
    format!(
        "You are an agricultural assistant. Note this for the farmer.\n\
         - No recent disease reports for {crop} in {location}.\n\
         - Write a cheerful and motivating message for the farmer.\n\
         - Encourage them to keep monitoring their fields and to report any \
         sightings through the app.\n\
         - First in English, then in Hindi.\n\
         \n\
         Do not answer in report format, just write a message."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;
    use agribot_core::types::ImageAttachment;
    use agribot_llm::LlmError;

    struct ScriptedModel {
        response: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.response.clone().map_err(LlmError::Http)
        }

        async fn generate_vision(
            &self,
            prompt: &str,
            _image: &ImageAttachment,
        ) -> Result<String, LlmError> {
            self.generate_text(prompt).await
        }
    }

    fn model(response: Result<&str, &str>) -> Arc<ScriptedModel> {
        Arc::new(ScriptedModel {
            response: response.map(str::to_string).map_err(str::to_string),
            prompts: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_check_alert_with_matching_report() {
        let m = model(Ok("Rust reported near you."));
        let alerts = AlertSystem::new(m.clone(), Arc::new(ReportStore::new()));

        let text = alerts.check_alert("wheat", "pune").await.unwrap();
        assert_eq!(text, "Rust reported near you.");

        let prompts = m.prompts.lock().unwrap();
        assert!(prompts[0].contains("rust on wheat near udaipur"));
        assert!(prompts[0].contains("serious but helpful"));
    }

    #[tokio::test]
    async fn test_check_alert_no_match_uses_all_clear() {
        let m = model(Ok("All clear, happy farming!"));
        let alerts = AlertSystem::new(m.clone(), Arc::new(ReportStore::new()));

        let text = alerts.check_alert("barley", "pune").await.unwrap();
        assert_eq!(text, "All clear, happy farming!");

        let prompts = m.prompts.lock().unwrap();
        assert!(prompts[0].contains("No recent disease reports"));
        assert!(prompts[0].contains("cheerful"));
    }

    #[tokio::test]
    async fn test_check_alert_matches_by_location() {
        let m = model(Ok("alert"));
        let alerts = AlertSystem::new(m.clone(), Arc::new(ReportStore::new()));

        alerts.check_alert("barley", "Jaipur").await.unwrap();

        let prompts = m.prompts.lock().unwrap();
        assert!(prompts[0].contains("false smut on rice"));
    }

    #[tokio::test]
    async fn test_submit_report_appends_and_alerts() {
        let store = Arc::new(ReportStore::empty());
        let m = model(Ok("Noted. Inspect your field."));
        let alerts = AlertSystem::new(m.clone(), store.clone());

        let text = alerts.submit_report("Wheat", "Rust", "Udaipur").await.unwrap();
        assert_eq!(text, "Noted. Inspect your field.");

        let all = store.all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].crop, "wheat");
        assert_eq!(all[0].disease, "rust");
        assert_eq!(all[0].location, "udaipur");
        assert_eq!(all[0].report_date, Local::now().date_naive());

        let prompts = m.prompts.lock().unwrap();
        assert!(prompts[0].contains("rust on wheat near udaipur"));
    }

    #[tokio::test]
    async fn test_submit_report_stores_even_when_alert_fails() {
        let store = Arc::new(ReportStore::empty());
        let alerts = AlertSystem::new(model(Err("down")), store.clone());

        let result = alerts.submit_report("rice", "blast", "kota").await;
        assert!(result.is_err());
        // The report is appended before the model call.
        assert_eq!(store.len(), 1);
    }
}
