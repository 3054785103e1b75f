//! Mock provider for local runs and tests.

use super::{GenerationParams, ProviderError, ProviderResponse, TextProvider};
use crate::services::prompts::Prompt;
use async_trait::async_trait;
use secrecy::Secret;
use std::sync::Mutex;

/// What the mock answers with.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Echo the phrase back inside a canned sentence.
    Echo,
    /// Always return this text verbatim.
    Reply(String),
    /// Succeed with no text at all.
    Empty,
    /// Fail with this error.
    Fail(ProviderError),
}

/// Mock text provider. Records the prompts it receives.
pub struct MockTextProvider {
    behavior: MockBehavior,
    prompts: Mutex<Vec<Prompt>>,
}

impl MockTextProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Reply(text.into()))
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::new(MockBehavior::Fail(error))
    }

    /// Prompts seen so far, oldest first.
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl Default for MockTextProvider {
    fn default() -> Self {
        Self::new(MockBehavior::Echo)
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        _credential: &Secret<String>,
        prompt: &Prompt,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }

        match &self.behavior {
            MockBehavior::Echo => Ok(ProviderResponse::text(format!(
                "Mock explanation for: {}",
                prompt.user
            ))),
            MockBehavior::Reply(text) => Ok(ProviderResponse::text(text.clone())),
            MockBehavior::Empty => Ok(ProviderResponse::empty()),
            MockBehavior::Fail(err) => Err(err.clone()),
        }
    }
}
