//! LlmChain -- one template bound to the model with fixed parameters.
//!
//! `run` renders the template and invokes the model once with the rendered
//! text as a single user message. `call` also stores the trimmed output in
//! the context bag under the template's output key.

use std::sync::Arc;

use tracing::{Instrument, debug, info_span};

use dobi_types::error::OrchestratorError;
use dobi_types::llm::CompletionRequest;
use dobi_types::prompt::ContextBag;

use crate::llm::box_provider::BoxLlmProvider;

use super::template::PromptTemplate;

/// Model parameters shared by every chain.
#[derive(Debug, Clone)]
pub struct ChainParams {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Clone)]
pub struct LlmChain {
    template: Arc<PromptTemplate>,
    provider: Arc<BoxLlmProvider>,
    params: ChainParams,
}

impl LlmChain {
    pub fn new(
        template: Arc<PromptTemplate>,
        provider: Arc<BoxLlmProvider>,
        params: ChainParams,
    ) -> Self {
        Self {
            template,
            provider,
            params,
        }
    }

    pub fn name(&self) -> &str {
        self.template.name()
    }

    pub fn output_key(&self) -> &str {
        self.template.output_key()
    }

    fn build_request(&self, prompt: String) -> CompletionRequest {
        CompletionRequest {
            model: self.params.model.clone(),
            prompt,
            max_tokens: self.params.max_tokens,
            temperature: Some(self.params.temperature),
        }
    }

    /// Render the template against `bag` without calling the model.
    pub fn render(&self, bag: &ContextBag) -> Result<String, OrchestratorError> {
        Ok(self.template.render(bag)?)
    }

    /// Invoke the model once with an already rendered prompt.
    pub async fn generate(&self, prompt: String) -> Result<String, OrchestratorError> {
        let request = self.build_request(prompt);

        let span = info_span!(
            "gen_ai.chain",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            chain = %self.template.name(),
        );

        let response = self.provider.complete(&request).instrument(span).await?;
        debug!(
            chain = %self.template.name(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = %response.stop_reason,
            "chain completed"
        );
        Ok(response.content.trim().to_string())
    }

    /// Render and generate; returns the trimmed completion text.
    pub async fn run(&self, bag: &ContextBag) -> Result<String, OrchestratorError> {
        let prompt = self.render(bag)?;
        self.generate(prompt).await
    }

    /// Like [`run`](Self::run), and stores the output under the output key.
    pub async fn call(&self, bag: &mut ContextBag) -> Result<String, OrchestratorError> {
        let output = self.run(bag).await?;
        bag.insert(self.template.output_key(), output.clone());
        Ok(output)
    }
}
