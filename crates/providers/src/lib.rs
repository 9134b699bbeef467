//! Model backend implementations for climactl.
//!
//! All providers implement the `climactl_core::Provider` trait.
//! [`build_from_config`] constructs the configured backend at startup.

pub mod ollama;

pub use ollama::OllamaProvider;

use climactl_core::error::ProviderError;

/// Build the model backend described by the `[slm]` configuration section.
pub fn build_from_config(
    config: &climactl_config::AppConfig,
) -> Result<OllamaProvider, ProviderError> {
    OllamaProvider::new(&config.slm.base_url, config.slm.request_timeout())
}
