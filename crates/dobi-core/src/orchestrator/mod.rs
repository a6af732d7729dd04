//! Response orchestration: intent routing, context gathering, generation,
//! and history persistence for one user message.

pub mod service;
pub mod stage;

pub use service::{Answer, Orchestrator, OrchestratorSettings, supplied_keys};
pub use stage::Stage;
