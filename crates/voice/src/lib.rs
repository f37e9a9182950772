//! Voice output for Vitae.
//!
//! The caller passes a [`VoiceSelector`] with every request; there is no
//! process-wide "current voice".

pub mod adapter;
pub mod selector;

pub use adapter::{AudioArtifact, DEFAULT_MAX_ARTIFACTS, FALLBACK_VOICE, VoiceAdapter};
pub use selector::{UnknownVoice, VoiceSelector};
