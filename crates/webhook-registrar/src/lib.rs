pub mod ca_bundle;
pub mod cli;
pub mod client_tls;
pub mod config;
pub mod constants;
pub mod errors;
pub mod ownership;
pub mod registration;
pub mod settings;
pub mod tracing;
pub mod webhook_config;

#[cfg(test)]
mod test_utils;

pub use registration::{RegistrarConfig, WebhookRegistrar};
