//! IntentClassifier -- maps a user message to a closed [`Intent`].
//!
//! Runs the `parse_intent` chain once and parses its output with
//! [`Intent::from_model_output`], so the result is always a known variant.

use tracing::debug;

use dobi_types::error::OrchestratorError;
use dobi_types::intent::Intent;
use dobi_types::prompt::{ContextBag, keys};

use crate::prompt::chain::LlmChain;

pub struct IntentClassifier {
    chain: LlmChain,
}

impl IntentClassifier {
    /// `chain` must be bound to the `parse_intent` template.
    pub fn new(chain: LlmChain) -> Self {
        Self { chain }
    }

    pub async fn classify(
        &self,
        user_message: &str,
        intent_list: &str,
        chat_history: &str,
    ) -> Result<Intent, OrchestratorError> {
        let bag = ContextBag::new()
            .with(keys::USER_MESSAGE, user_message)
            .with(keys::INPUT, user_message)
            .with(keys::INTENT_LIST, intent_list)
            .with(keys::CHAT_HISTORY, chat_history);
        self.classify_bag(&bag).await
    }

    /// Classify using a request bag that already holds the classifier inputs.
    pub async fn classify_bag(&self, bag: &ContextBag) -> Result<Intent, OrchestratorError> {
        let raw = self.chain.run(bag).await?;
        let intent = Intent::from_model_output(&raw);
        if intent == Intent::Unknown {
            debug!(raw_label = %raw, "unrecognised intent label");
        }
        Ok(intent)
    }
}
