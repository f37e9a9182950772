//! Outbound notification channels for Vitae.
//!
//! Tools report contact requests and unanswered questions to the persona's
//! owner through a [`NotificationSink`](vitae_core::NotificationSink). The
//! only backend is Pushover.

pub mod pushover;

pub use pushover::{PushoverCredentials, PushoverNotifier};
