//! Leaf-image disease diagnosis.

use std::sync::Arc;

use tracing::debug;

use agribot_core::types::ImageAttachment;
use agribot_llm::LanguageModel;

use crate::error::AgentError;

/// Fixed guidance returned when no image is attached. Routing normally
/// guarantees an image reaches this agent only via disease keywords, so a
/// missing image is answered with instructions rather than an error.
pub const NO_IMAGE_GUIDANCE: &str = "Disease detection requires an image upload. \
    Please attach a clear photo of the affected crop leaves.";

/// Fixed message for an attached-but-empty image payload.
pub const EMPTY_IMAGE_MESSAGE: &str =
    "The uploaded image data is empty. Please upload a valid image.";

/// Analyzes a crop leaf image for visible disease or pest signs.
pub struct DiseaseDetector {
    llm: Arc<dyn LanguageModel>,
}

impl DiseaseDetector {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Diagnose the attached image, or return fixed guidance without one.
    pub async fn detect(&self, image: Option<&ImageAttachment>) -> Result<String, AgentError> {
        let Some(image) = image else {
            return Ok(NO_IMAGE_GUIDANCE.to_string());
        };
        if image.bytes.is_empty() {
            return Ok(EMPTY_IMAGE_MESSAGE.to_string());
        }

        debug!(
            mime_type = %image.mime_type,
            image_bytes = image.bytes.len(),
            "Analyzing crop image"
        );
        Ok(self.llm.generate_vision(PROMPT, image).await?)
    }
}

const PROMPT: &str = "\
This is a crop leaf image taken by a farmer.\n\
Analyze whether there are any visible signs of plant disease or pest.\n\
If yes:\n\
- Name the crop disease, if possible.\n\
- Mention the symptoms seen in the image.\n\
- Suggest a treatment or preventive remedy.\n\
- Mention whether it is serious or mild.\n\
- Mention whether it can be treated at home or needs professional help.\n\
- Help the farmer understand the issue clearly.\n\
If the image is not clear, ask for a clearer image. If no disease is \
detected, say the crop looks healthy.\n\
Provide a friendly and informative response, in both English and Hindi.";

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;
    use agribot_llm::LlmError;

    struct ScriptedModel {
        response: Result<String, String>,
        vision_calls: Mutex<u32>,
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn generate_text(&self, _prompt: &str) -> Result<String, LlmError> {
            panic!("disease detector must use the vision endpoint");
        }

        async fn generate_vision(
            &self,
            _prompt: &str,
            _image: &ImageAttachment,
        ) -> Result<String, LlmError> {
            *self.vision_calls.lock().unwrap() += 1;
            self.response.clone().map_err(LlmError::Http)
        }
    }

    fn model(response: Result<&str, &str>) -> Arc<ScriptedModel> {
        Arc::new(ScriptedModel {
            response: response.map(str::to_string).map_err(str::to_string),
            vision_calls: Mutex::new(0),
        })
    }

    fn leaf_image() -> ImageAttachment {
        ImageAttachment {
            mime_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[tokio::test]
    async fn test_detect_without_image_returns_guidance() {
        let m = model(Ok("unused"));
        let detector = DiseaseDetector::new(m.clone());

        let result = detector.detect(None).await.unwrap();
        assert_eq!(result, NO_IMAGE_GUIDANCE);
        assert_eq!(*m.vision_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_detect_empty_image_returns_fixed_message() {
        let m = model(Ok("unused"));
        let detector = DiseaseDetector::new(m.clone());

        let empty = ImageAttachment {
            mime_type: "image/png".to_string(),
            bytes: vec![],
        };
        let result = detector.detect(Some(&empty)).await.unwrap();
        assert_eq!(result, EMPTY_IMAGE_MESSAGE);
        assert_eq!(*m.vision_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_detect_with_image_calls_vision() {
        let m = model(Ok("Leaf rust, treat with propiconazole."));
        let detector = DiseaseDetector::new(m.clone());

        let image = leaf_image();
        let result = detector.detect(Some(&image)).await.unwrap();
        assert_eq!(result, "Leaf rust, treat with propiconazole.");
        assert_eq!(*m.vision_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_detect_propagates_model_failure() {
        let detector = DiseaseDetector::new(model(Err("vision down")));
        let image = leaf_image();
        assert!(detector.detect(Some(&image)).await.is_err());
    }
}
