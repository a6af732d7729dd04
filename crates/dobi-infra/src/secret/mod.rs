//! Credentials read from environment variables.
//!
//! Secrets never come from `dobi.toml`. Values are wrapped in
//! `SecretString` as soon as they are read so they cannot end up in logs.

pub mod env;

pub use env::EnvCredentials;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const GOOGLE_CSE_ID: &str = "GOOGLE_CSE_ID";
