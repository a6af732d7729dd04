//! Intent labels produced by the classifier.
//!
//! The model's raw output is never used for control flow directly: it is
//! normalised and parsed into this closed enum, and anything unrecognised
//! becomes [`Intent::Unknown`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// The purpose of a user message, used to pick a response strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Questions about Kakao Social (login, friends, profile APIs).
    KakaoSocial,
    /// Questions about Kakao Sync (sign-up and consent integration).
    KakaoSync,
    /// Questions about Kakao Talk Channel.
    KakaoTalkChannel,
    /// Anything else; handled by the fallback strategy.
    Unknown,
}

impl Intent {
    /// All intents that answer from the document store alone.
    pub const INFORMATIONAL: [Intent; 3] = [
        Intent::KakaoSocial,
        Intent::KakaoSync,
        Intent::KakaoTalkChannel,
    ];

    /// Stable label as it appears in the intent list and in model output.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::KakaoSocial => "kakao_social",
            Intent::KakaoSync => "kakao_sync",
            Intent::KakaoTalkChannel => "kakao_talk_channel",
            Intent::Unknown => "unknown",
        }
    }

    /// Whether this intent is served by the document-only strategy.
    pub fn is_informational(&self) -> bool {
        Self::INFORMATIONAL.contains(self)
    }

    /// Parse raw model output into an intent.
    ///
    /// Total: trims whitespace, quotes, and backticks, drops a leading
    /// `intent:` label, lowercases, and folds spaces and hyphens into
    /// underscores. Unrecognised labels map to `Unknown`.
    pub fn from_model_output(raw: &str) -> Self {
        let mut label = raw
            .trim()
            .trim_matches(|c| c == '"' || c == '\'' || c == '`')
            .trim()
            .to_lowercase();

        if let Some(rest) = label.strip_prefix("intent:") {
            label = rest.trim().to_string();
        }

        let label: String = label
            .trim_matches(|c| c == '"' || c == '\'' || c == '`' || c == '.')
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        match label.as_str() {
            "kakao_social" => Intent::KakaoSocial,
            "kakao_sync" => Intent::KakaoSync,
            "kakao_talk_channel" => Intent::KakaoTalkChannel,
            _ => Intent::Unknown,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_labels_parse() {
        assert_eq!(Intent::from_model_output("kakao_social"), Intent::KakaoSocial);
        assert_eq!(Intent::from_model_output("kakao_sync"), Intent::KakaoSync);
        assert_eq!(
            Intent::from_model_output("kakao_talk_channel"),
            Intent::KakaoTalkChannel
        );
    }

    #[test]
    fn test_noisy_labels_normalise() {
        assert_eq!(Intent::from_model_output("  \"kakao_sync\"\n"), Intent::KakaoSync);
        assert_eq!(Intent::from_model_output("Intent: Kakao Social"), Intent::KakaoSocial);
        assert_eq!(
            Intent::from_model_output("`kakao-talk-channel`."),
            Intent::KakaoTalkChannel
        );
    }

    #[test]
    fn test_unrecognised_is_unknown() {
        for raw in ["", "weather", "kakao_social and kakao_sync", "환불"] {
            assert_eq!(Intent::from_model_output(raw), Intent::Unknown);
        }
    }

    #[test]
    fn test_label_roundtrip() {
        for intent in Intent::INFORMATIONAL {
            assert_eq!(Intent::from_model_output(intent.label()), intent);
            assert!(intent.is_informational());
        }
        assert!(!Intent::Unknown.is_informational());
    }
}
