//! Scripted text generator for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{GenerationError, TextGenerator};

/// A generator that replays scripted outcomes in order.
///
/// Once the script runs out every call fails with [`GenerationError::Failed`].
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    outcomes: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    /// A generator returning the given outcomes in order.
    #[must_use]
    pub fn new(outcomes: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator answering with each response once, in order.
    #[must_use]
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(responses.into_iter().map(|r| Ok(r.into())).collect())
    }

    /// Prompts received so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.outcomes
            .lock()
            .map_err(|_| GenerationError::Failed("script lock poisoned".to_string()))?
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Failed("script exhausted".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_generator_replays_in_order() {
        let generator = ScriptedGenerator::new(vec![
            Ok("first".to_string()),
            Err(GenerationError::Network("offline".to_string())),
        ]);

        assert_eq!(generator.generate("a").await.unwrap(), "first");
        assert!(matches!(
            generator.generate("b").await,
            Err(GenerationError::Network(_))
        ));
        assert!(matches!(
            generator.generate("c").await,
            Err(GenerationError::Failed(_))
        ));
        assert_eq!(generator.prompts(), vec!["a", "b", "c"]);
    }
}
