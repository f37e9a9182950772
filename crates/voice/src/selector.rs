use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A voice a caller can pick for one response.
///
/// The six named voices are OpenAI voices; `Custom` is the cloned voice
/// served by ElevenLabs when it is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceSelector {
    #[default]
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown voice '{0}'")]
pub struct UnknownVoice(pub String);

impl VoiceSelector {
    /// Every selectable voice, default first.
    pub const ALL: [VoiceSelector; 7] = [
        Self::Alloy,
        Self::Echo,
        Self::Fable,
        Self::Onyx,
        Self::Nova,
        Self::Shimmer,
        Self::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Echo => "echo",
            Self::Fable => "fable",
            Self::Onyx => "onyx",
            Self::Nova => "nova",
            Self::Shimmer => "shimmer",
            Self::Custom => "custom",
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom)
    }
}

impl fmt::Display for VoiceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoiceSelector {
    type Err = UnknownVoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|voice| voice.as_str() == wanted)
            .ok_or_else(|| UnknownVoice(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Nova".parse::<VoiceSelector>().unwrap(), VoiceSelector::Nova);
        assert_eq!(" custom ".parse::<VoiceSelector>().unwrap(), VoiceSelector::Custom);
    }

    #[test]
    fn rejects_unknown() {
        assert_eq!(
            "baritone".parse::<VoiceSelector>().unwrap_err(),
            UnknownVoice("baritone".into())
        );
    }

    #[test]
    fn default_is_alloy() {
        assert_eq!(VoiceSelector::default(), VoiceSelector::Alloy);
        assert_eq!(VoiceSelector::ALL[0], VoiceSelector::default());
    }

    #[test]
    fn display_round_trips_names() {
        for voice in VoiceSelector::ALL {
            assert_eq!(voice.to_string().parse::<VoiceSelector>().unwrap(), voice);
        }
    }
}
