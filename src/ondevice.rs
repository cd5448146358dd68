//! On-device inference collaborator.
//!
//! Mirrors the browser Prompt API surface: a capability probe that answers
//! readily / after-download / unavailable, and single-shot prompt sessions.
//! The server deployment ships without an on-device model, so the default
//! implementation always reports `Unavailable`; tests and embedded builds
//! can plug in their own model behind the trait.

use async_trait::async_trait;

/// Result of the capability probe, taken once at session start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
  Readily,
  AfterDownload,
  Unavailable,
}

#[async_trait]
pub trait OnDeviceModel: Send + Sync {
  /// Probe whether the model can serve prompts right now.
  async fn availability(&self) -> Availability;

  /// Open a single-shot prompt session. Only called when the probe
  /// answered `Readily`.
  async fn create_session(&self) -> Result<Box<dyn OnDeviceSession>, String>;
}

#[async_trait]
pub trait OnDeviceSession: Send + Sync {
  /// Run one prompt to completion (no streaming).
  async fn prompt(&mut self, text: &str) -> Result<String, String>;

  /// Release model resources. Sessions are not reused after this.
  fn destroy(&mut self) {}
}

/// The no-model default: every probe answers `Unavailable`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOnDevice;

#[async_trait]
impl OnDeviceModel for NoOnDevice {
  async fn availability(&self) -> Availability {
    Availability::Unavailable
  }

  async fn create_session(&self) -> Result<Box<dyn OnDeviceSession>, String> {
    Err("no on-device model in this deployment".to_string())
  }
}
