use k8s_openapi::api::admissionregistration::v1::{
    MutatingWebhookConfiguration, ValidatingWebhookConfiguration,
};
use kube::api::{DeleteParams, PostParams};
use kube::{Api, Resource};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::{debug, info, warn};

use crate::ca_bundle::CaResolver;
use crate::client_tls::ClientTlsConfig;
use crate::errors::RegistrationError;
use crate::ownership::resolve_ownership;
use crate::settings::WebhookSettings;
use crate::webhook_config::{EndpointMode, WebhookConfigBuilder, debug_url};

/// Everything the registrar needs besides the API client
#[derive(Debug, Clone, Default)]
pub struct RegistrarConfig {
    pub settings: WebhookSettings,
    pub client_tls: ClientTlsConfig,
    /// Address of a controller running outside of the cluster. When set, the
    /// webhooks point straight at it instead of the in-cluster Service.
    pub server_address: Option<String>,
}

/// Registers the admission webhooks of the controller with the API server and
/// removes them on shutdown
pub struct WebhookRegistrar {
    client: kube::Client,
    settings: WebhookSettings,
    client_tls: ClientTlsConfig,
    mode: EndpointMode,
}

impl WebhookRegistrar {
    pub fn new(client: kube::Client, config: RegistrarConfig) -> Self {
        let mode = EndpointMode::from_server_address(config.server_address.as_deref());

        Self {
            client,
            settings: config.settings,
            client_tls: config.client_tls,
            mode,
        }
    }

    pub fn mode(&self) -> &EndpointMode {
        &self.mode
    }

    /// Replace any previously registered configuration with fresh ones. There
    /// is no rollback: when the validating configuration cannot be created the
    /// mutating one stays registered.
    pub async fn register(&self) -> Result<(), RegistrationError> {
        if let EndpointMode::Debug { address } = &self.mode {
            info!(
                mutating = debug_url(address, &self.settings.mutating.service_path).as_str(),
                validating = debug_url(address, &self.settings.validating.service_path).as_str(),
                "registering webhooks in debug mode"
            );
        }

        // stale configurations left behind by a previous run
        let _ = self.deregister().await;

        let ca_bundle = CaResolver::new(
            self.client.clone(),
            &self.settings.namespace,
            &self.settings.root_ca_secret,
            &self.client_tls,
        )
        .resolve()
        .await?;
        let ownership = resolve_ownership(self.client.clone(), &self.settings, &self.mode).await;
        let builder = WebhookConfigBuilder::new(&self.settings, &self.mode, &ca_bundle, &ownership);

        self.create(builder.mutating()?).await?;
        self.create(builder.validating()?).await?;

        info!(
            mutating = self.mutating_name(),
            validating = self.validating_name(),
            "webhooks registered"
        );
        Ok(())
    }

    /// Best effort removal of both configurations. Never fails: objects that
    /// are already gone are ignored, every other error is logged and returned.
    pub async fn deregister(&self) -> Vec<RegistrationError> {
        let mut errors = Vec::new();

        if let Err(e) = self
            .delete::<MutatingWebhookConfiguration>(self.mutating_name())
            .await
        {
            errors.push(e);
        }
        if let Err(e) = self
            .delete::<ValidatingWebhookConfiguration>(self.validating_name())
            .await
        {
            errors.push(e);
        }

        errors
    }

    fn mutating_name(&self) -> &str {
        self.settings
            .mutating
            .configuration_name(self.mode.is_debug())
    }

    fn validating_name(&self) -> &str {
        self.settings
            .validating
            .configuration_name(self.mode.is_debug())
    }

    async fn create<K>(&self, object: K) -> Result<(), RegistrationError>
    where
        K: k8s_openapi::Resource
            + Resource<DynamicType = ()>
            + Clone
            + Debug
            + Serialize
            + DeserializeOwned,
    {
        let name = object.meta().name.clone().unwrap_or_default();
        let api: Api<K> = Api::all(self.client.clone());

        match api.create(&PostParams::default(), &object).await {
            Ok(_) => {
                debug!(kind = K::KIND, name = name.as_str(), "created");
                Ok(())
            }
            Err(source) => Err(RegistrationError::Api {
                verb: "create",
                kind: K::KIND,
                name,
                source,
            }),
        }
    }

    async fn delete<K>(&self, name: &str) -> Result<(), RegistrationError>
    where
        K: k8s_openapi::Resource + Resource<DynamicType = ()> + Clone + Debug + DeserializeOwned,
    {
        let api: Api<K> = Api::all(self.client.clone());
        let error = match api.delete(name, &DeleteParams::default()).await {
            Ok(_) => {
                debug!(kind = K::KIND, name, "deleted");
                return Ok(());
            }
            Err(source) => RegistrationError::Api {
                verb: "delete",
                kind: K::KIND,
                name: name.to_string(),
                source,
            },
        };

        if error.is_api_status(404) {
            debug!(kind = K::KIND, name, "nothing to delete");
            return Ok(());
        }

        warn!(
            kind = K::KIND,
            name,
            error = error.to_string().as_str(),
            "cannot delete webhook configuration"
        );
        Err(error)
    }
}
