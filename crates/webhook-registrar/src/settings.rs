use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use crate::constants::*;

/// Names and path of one of the two webhook configurations
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookNames {
    /// Name of the configuration object when the webhook is reached through
    /// the in-cluster Service
    pub configuration_name: String,
    /// Name of the configuration object when the webhook is reached through
    /// a debug address
    pub debug_configuration_name: String,
    /// Name of the single webhook entry held by the configuration
    pub webhook_name: String,
    /// HTTP path served by the controller for this webhook
    pub service_path: String,
}

impl WebhookNames {
    pub fn configuration_name(&self, debug: bool) -> &str {
        if debug {
            &self.debug_configuration_name
        } else {
            &self.configuration_name
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeyRef {
    pub name: String,
    pub key: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OwnerKind {
    pub api_version: String,
    pub kind: String,
}

/// Static configuration of the registration: everything that names or
/// locates an object. Every top-level key is optional when read from a file.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookSettings {
    pub namespace: String,
    pub service_name: String,
    pub deployment_name: String,
    pub labels: BTreeMap<String, String>,
    pub mutating: WebhookNames,
    pub validating: WebhookNames,
    pub root_ca_secret: SecretKeyRef,
    pub owner: OwnerKind,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            namespace: CONTROLLER_NAMESPACE.to_string(),
            service_name: WEBHOOK_SERVICE_NAME.to_string(),
            deployment_name: CONTROLLER_DEPLOYMENT_NAME.to_string(),
            labels: BTreeMap::from([(APP_LABEL_KEY.to_string(), CONTROLLER_NAME.to_string())]),
            mutating: WebhookNames {
                configuration_name: MUTATING_WEBHOOK_CONFIGURATION_NAME.to_string(),
                debug_configuration_name: MUTATING_WEBHOOK_CONFIGURATION_DEBUG_NAME.to_string(),
                webhook_name: MUTATING_WEBHOOK_NAME.to_string(),
                service_path: MUTATING_WEBHOOK_SERVICE_PATH.to_string(),
            },
            validating: WebhookNames {
                configuration_name: VALIDATING_WEBHOOK_CONFIGURATION_NAME.to_string(),
                debug_configuration_name: VALIDATING_WEBHOOK_CONFIGURATION_DEBUG_NAME.to_string(),
                webhook_name: VALIDATING_WEBHOOK_NAME.to_string(),
                service_path: VALIDATING_WEBHOOK_SERVICE_PATH.to_string(),
            },
            root_ca_secret: SecretKeyRef {
                name: ROOT_CA_SECRET_NAME.to_string(),
                key: ROOT_CA_SECRET_KEY.to_string(),
            },
            owner: OwnerKind {
                api_version: DEPLOYMENT_API_VERSION.to_string(),
                kind: DEPLOYMENT_KIND.to_string(),
            },
        }
    }
}

/// Reads a YAML file overriding some of the default settings
pub fn read_settings_file(path: &Path) -> Result<WebhookSettings> {
    let settings_file = File::open(path)?;
    let settings: WebhookSettings = serde_yaml::from_reader(&settings_file)?;
    Ok(settings)
}
