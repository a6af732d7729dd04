use std::fmt;

/// Progress of a single request through the answer pipeline.
///
/// Recorded on the request span at every transition. `Answered` is terminal;
/// any error before it aborts the request without touching history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Classified,
    ContextGathered,
    Rendered,
    Answered,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Classified => write!(f, "classified"),
            Stage::ContextGathered => write!(f, "context_gathered"),
            Stage::Rendered => write!(f, "rendered"),
            Stage::Answered => write!(f, "answered"),
        }
    }
}
