//! Intent classification.

pub mod classifier;
