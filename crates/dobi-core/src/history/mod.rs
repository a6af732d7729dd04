//! Conversation history: repository port, in-memory adapter, and service.

pub mod memory;
pub mod repository;
pub mod service;
