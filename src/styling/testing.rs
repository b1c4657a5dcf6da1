// Scripted generation backend for workflow tests

use super::backend::{ContentPart, ContentRequest, ContentResponse, GenerationBackend};
use super::codec::EncodedImage;
use super::error::BackendError;
use super::types::OutfitStyle;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Clone)]
enum Behavior {
    Gate(Arc<Notify>),
    Fail,
    TextOnly,
    Respond(EncodedImage),
}

#[derive(Default)]
struct Script {
    rules: Vec<(String, Behavior)>,
    requests: Vec<ContentRequest>,
    completed: Vec<String>,
}

/// Backend whose replies are chosen by substring rules on the instruction.
///
/// Without a matching rule, a generation request for style `X` answers with
/// `image_for("X")` and an edit answers with `image_for("edited:<instruction>")`.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(&self) -> Arc<dyn GenerationBackend> {
        Arc::new(self.clone())
    }

    /// Deterministic PNG payload for a label
    pub fn image_for(label: &str) -> EncodedImage {
        EncodedImage::new("image/png", STANDARD.encode(label))
    }

    fn rule(self, needle: &str, behavior: Behavior) -> Self {
        self.script
            .lock()
            .unwrap()
            .rules
            .push((needle.to_string(), behavior));
        self
    }

    /// Hold matching requests until the gate is notified
    pub fn with_gate(self, needle: &str, gate: Arc<Notify>) -> Self {
        self.rule(needle, Behavior::Gate(gate))
    }

    pub fn with_failure(self, needle: &str) -> Self {
        self.rule(needle, Behavior::Fail)
    }

    pub fn with_text_only(self, needle: &str) -> Self {
        self.rule(needle, Behavior::TextOnly)
    }

    pub fn with_image(self, needle: &str, image: EncodedImage) -> Self {
        self.rule(needle, Behavior::Respond(image))
    }

    pub fn requests(&self) -> Vec<ContentRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.script.lock().unwrap().requests.len()
    }

    /// Instructions in the order their requests settled
    pub fn completed(&self) -> Vec<String> {
        self.script.lock().unwrap().completed.clone()
    }

    fn style_of(instruction: &str) -> Option<OutfitStyle> {
        OutfitStyle::ALL
            .into_iter()
            .find(|style| instruction.contains(&format!("'{}'", style)))
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate_content(&self, request: ContentRequest) -> Result<ContentResponse, BackendError> {
        let instruction = request.instruction.clone();
        let behaviors: Vec<Behavior> = {
            let mut script = self.script.lock().unwrap();
            script.requests.push(request);
            let matching = script
                .rules
                .iter()
                .filter(|(needle, _)| instruction.contains(needle.as_str()))
                .map(|(_, behavior)| behavior.clone())
                .collect();
            matching
        };

        let mut outcome = None;
        for behavior in behaviors {
            match behavior {
                Behavior::Gate(gate) => gate.notified().await,
                Behavior::Fail => {
                    outcome = Some(Err(BackendError::Http("HTTP 500: scripted failure".to_string())));
                    break;
                }
                Behavior::TextOnly => {
                    outcome = Some(Ok(ContentResponse::new(vec![ContentPart::Text(
                        "I can only describe this outfit.".to_string(),
                    )])));
                    break;
                }
                Behavior::Respond(image) => {
                    outcome = Some(Ok(ContentResponse::new(vec![ContentPart::Image(image)])));
                    break;
                }
            }
        }

        let outcome = outcome.unwrap_or_else(|| {
            let image = match Self::style_of(&instruction) {
                Some(style) => Self::image_for(style.as_str()),
                None => Self::image_for(&format!("edited:{}", instruction)),
            };
            Ok(ContentResponse::new(vec![
                ContentPart::Text("Here is the result.".to_string()),
                ContentPart::Image(image),
            ]))
        });

        self.script.lock().unwrap().completed.push(instruction);
        outcome
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
