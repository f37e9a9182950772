//! Provider implementations for Vitae.
//!
//! - [`OpenAiCompatProvider`]: chat completions with tool calling
//! - [`OpenAiSpeech`]: `tts-1` synthesis and `whisper-1` transcription
//! - [`ElevenLabsSynthesizer`]: custom (cloned) voice synthesis
//!
//! All of them share one `reqwest::Client` built by [`http_client`], whose
//! timeout bounds every external call.

pub mod elevenlabs;
pub mod http;
pub mod openai_compat;
pub mod openai_speech;

pub use elevenlabs::ElevenLabsSynthesizer;
pub use http::http_client;
pub use openai_compat::OpenAiCompatProvider;
pub use openai_speech::OpenAiSpeech;
