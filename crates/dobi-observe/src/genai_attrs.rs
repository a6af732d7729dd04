//! OpenTelemetry GenAI Semantic Convention attribute names.
//!
//! `tracing` macros need literal field names, so spans declare these fields
//! inline and the constants are used with `Span::record` once a response
//! arrives.
//!
//! Span naming convention: `"{operation}"` with the model as an attribute.

/// The unique response ID from the provider.
pub const GEN_AI_RESPONSE_ID: &str = "gen_ai.response.id";

/// Why generation stopped (e.g., "EndTurn", "MaxTokens").
pub const GEN_AI_RESPONSE_FINISH_REASONS: &str = "gen_ai.response.finish_reasons";

pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";
pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";

/// Chat completion operation.
pub const OP_CHAT: &str = "chat";
