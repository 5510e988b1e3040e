use k8s_openapi::ByteString;
use k8s_openapi::api::admissionregistration::v1::{
    MutatingWebhook, MutatingWebhookConfiguration, RuleWithOperations, ServiceReference,
    ValidatingWebhook, ValidatingWebhookConfiguration, WebhookClientConfig,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::debug;

use crate::ca_bundle::CaBundle;
use crate::constants::*;
use crate::errors::BuildError;
use crate::ownership::Ownership;
use crate::settings::{WebhookNames, WebhookSettings};

/// How the API server reaches the controller webhook endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointMode {
    /// Through the in-cluster Service of the controller
    Service,
    /// Through an address reachable from the API server, used when the
    /// controller runs outside of the cluster
    Debug { address: String },
}

impl EndpointMode {
    /// A missing or blank address selects the in-cluster Service. Surrounding
    /// whitespace is not part of the address.
    pub fn from_server_address(address: Option<&str>) -> Self {
        match address.map(str::trim) {
            Some(address) if !address.is_empty() => EndpointMode::Debug {
                address: address.to_string(),
            },
            _ => EndpointMode::Service,
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, EndpointMode::Debug { .. })
    }
}

pub fn debug_url(address: &str, service_path: &str) -> String {
    format!("https://{address}{service_path}")
}

/// Assembles the mutating and validating webhook configurations. Both hold a
/// single webhook that intercepts the creation of any resource.
pub struct WebhookConfigBuilder<'a> {
    settings: &'a WebhookSettings,
    mode: &'a EndpointMode,
    ca_bundle: &'a CaBundle,
    ownership: &'a Ownership,
}

impl<'a> WebhookConfigBuilder<'a> {
    pub fn new(
        settings: &'a WebhookSettings,
        mode: &'a EndpointMode,
        ca_bundle: &'a CaBundle,
        ownership: &'a Ownership,
    ) -> Self {
        Self {
            settings,
            mode,
            ca_bundle,
            ownership,
        }
    }

    pub fn mutating(&self) -> Result<MutatingWebhookConfiguration, BuildError> {
        let names = &self.settings.mutating;
        let client_config = self.client_config(
            <MutatingWebhookConfiguration as k8s_openapi::Resource>::KIND,
            names,
        )?;

        Ok(MutatingWebhookConfiguration {
            metadata: self.metadata(names),
            webhooks: Some(vec![MutatingWebhook {
                name: names.webhook_name.clone(),
                client_config,
                rules: Some(create_only_rules()),
                admission_review_versions: vec![WEBHOOK_ADMISSION_REVIEW_VERSION.to_string()],
                side_effects: WEBHOOK_SIDE_EFFECTS.to_string(),
                failure_policy: Some(WEBHOOK_FAILURE_POLICY.to_string()),
                ..Default::default()
            }]),
        })
    }

    pub fn validating(&self) -> Result<ValidatingWebhookConfiguration, BuildError> {
        let names = &self.settings.validating;
        let client_config = self.client_config(
            <ValidatingWebhookConfiguration as k8s_openapi::Resource>::KIND,
            names,
        )?;

        Ok(ValidatingWebhookConfiguration {
            metadata: self.metadata(names),
            webhooks: Some(vec![ValidatingWebhook {
                name: names.webhook_name.clone(),
                client_config,
                rules: Some(create_only_rules()),
                admission_review_versions: vec![WEBHOOK_ADMISSION_REVIEW_VERSION.to_string()],
                side_effects: WEBHOOK_SIDE_EFFECTS.to_string(),
                failure_policy: Some(WEBHOOK_FAILURE_POLICY.to_string()),
                ..Default::default()
            }]),
        })
    }

    fn metadata(&self, names: &WebhookNames) -> ObjectMeta {
        let owner_references = match self.mode {
            EndpointMode::Service => Some(self.ownership.owner_references().unwrap_or_default()),
            EndpointMode::Debug { .. } => None,
        };

        ObjectMeta {
            name: Some(names.configuration_name(self.mode.is_debug()).to_string()),
            labels: Some(self.settings.labels.clone()),
            owner_references,
            ..Default::default()
        }
    }

    fn client_config(
        &self,
        kind: &'static str,
        names: &WebhookNames,
    ) -> Result<WebhookClientConfig, BuildError> {
        let ca_bundle = Some(ByteString(self.ca_bundle.as_bytes().to_vec()));

        match self.mode {
            EndpointMode::Service => Ok(WebhookClientConfig {
                service: Some(ServiceReference {
                    namespace: self.settings.namespace.clone(),
                    name: self.settings.service_name.clone(),
                    path: Some(names.service_path.clone()),
                    port: None,
                }),
                ca_bundle,
                url: None,
            }),
            EndpointMode::Debug { address } => {
                let url = debug_url(address, &names.service_path);
                if let Err(source) = url::Url::parse(&url) {
                    return Err(BuildError::InvalidDebugUrl {
                        kind,
                        name: names.debug_configuration_name.clone(),
                        url,
                        source,
                    });
                }
                debug!(kind, url = url.as_str(), "debug webhook configuration");

                Ok(WebhookClientConfig {
                    service: None,
                    ca_bundle,
                    url: Some(url),
                })
            }
        }
    }
}

fn create_only_rules() -> Vec<RuleWithOperations> {
    vec![RuleWithOperations {
        operations: Some(vec![WEBHOOK_OPERATION_CREATE.to_string()]),
        api_groups: Some(vec![WEBHOOK_MATCH_ALL.to_string()]),
        api_versions: Some(vec![WEBHOOK_MATCH_ALL.to_string()]),
        resources: Some(vec![WEBHOOK_MATCH_ALL_RESOURCES.to_string()]),
        scope: None,
    }]
}
