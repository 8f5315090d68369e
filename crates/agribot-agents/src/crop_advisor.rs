//! Crop selection advice from soil, location, and the day's forecast.

use std::sync::Arc;

use tracing::debug;

use agribot_llm::LanguageModel;
use agribot_weather::WeatherClient;

use crate::error::AgentError;

/// Crop advice plus the weather summary it was based on.
///
/// The only two-part specialist result: callers may show the forecast
/// alongside the advice.
#[derive(Clone, Debug)]
pub struct CropAdvice {
    pub advice: String,
    pub weather: String,
}

/// Suggests crops suited to a soil type, location, and forecast.
pub struct CropAdvisor {
    llm: Arc<dyn LanguageModel>,
    weather: Arc<WeatherClient>,
}

impl CropAdvisor {
    pub fn new(llm: Arc<dyn LanguageModel>, weather: Arc<WeatherClient>) -> Self {
        Self { llm, weather }
    }

    /// Generate crop suggestions.
    ///
    /// The forecast is fetched first and embedded in the prompt; a weather
    /// failure degrades to the sentinel summary, never to an error.
    pub async fn advise(&self, soil_type: &str, location: &str) -> Result<CropAdvice, AgentError> {
        let weather = self.weather.fetch_weather(location).await;
        debug!(soil_type, location, weather = %weather, "Generating crop advice");

        let prompt = build_prompt(soil_type, location, &weather);
        let advice = self.llm.generate_text(&prompt).await?;

        Ok(CropAdvice { advice, weather })
    }
}

fn build_prompt(soil_type: &str, location: &str, weather: &str) -> String {
    format!(
        "You are an agriculture expert.\n\
         \n\
         Soil Type: {soil_type}\n\
         Weather: {weather}\n\
         Location: {location}\n\
         \n\
         Suggest the 3 most suitable crops to grow for this weather and soil, and \
         explain in 5-6 lines why each crop is suitable. Give every suggestion in \
         two languages, English and Hindi.\n\
         \n\
         Format the response as a numbered list:\n\
         1. Crop Name: [name] in English and Hindi.\n\
            Reason: English, then Hindi.\n\
         2. Crop Name: [name] in English and Hindi.\n\
            Reason: English, then Hindi.\n\
         3. Crop Name: [name] in English and Hindi.\n\
            Reason: English, then Hindi.\n\
         \n\
         If no crops are suitable, respond with \"No suitable crops found for the \
         given conditions.\"\n\
         \n\
         End with a short motivational message about farming, first in English, \
         then in Hindi. Keep the tone friendly and informative."
    )
}
