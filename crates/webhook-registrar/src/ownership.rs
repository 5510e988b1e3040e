use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::Api;
use tracing::{debug, warn};

use crate::settings::WebhookSettings;
use crate::webhook_config::EndpointMode;

/// Outcome of the owner lookup for the webhook configurations
#[derive(Debug, Clone, PartialEq)]
pub enum Ownership {
    /// The configurations are garbage collected together with the controller
    /// Deployment
    Owned(OwnerReference),
    /// Debug configurations are not tied to any Deployment
    NotApplicable,
    /// The controller Deployment could not be looked up. Registration goes
    /// on without ownership metadata.
    LookupFailed(String),
}

impl Ownership {
    /// Value of `metadata.ownerReferences`. Debug configurations do not have
    /// the field at all, service configurations always have it, empty when the
    /// lookup failed.
    pub fn owner_references(&self) -> Option<Vec<OwnerReference>> {
        match self {
            Ownership::Owned(owner) => Some(vec![owner.clone()]),
            Ownership::NotApplicable => None,
            Ownership::LookupFailed(_) => Some(Vec::new()),
        }
    }
}

/// Look up the Deployment running the controller. Failures are logged and
/// turned into `Ownership::LookupFailed`, they never abort the registration.
/// The cluster is not queried in debug mode.
pub async fn resolve_ownership(
    client: kube::Client,
    settings: &WebhookSettings,
    mode: &EndpointMode,
) -> Ownership {
    if let EndpointMode::Debug { .. } = mode {
        return Ownership::NotApplicable;
    }

    let deployments: Api<Deployment> = Api::namespaced(client, &settings.namespace);
    let ownership = match deployments.get(&settings.deployment_name).await {
        Ok(deployment) => owner_from_deployment(&deployment, settings),
        Err(e) => Ownership::LookupFailed(e.to_string()),
    };

    match &ownership {
        Ownership::Owned(owner) => debug!(
            kind = owner.kind.as_str(),
            name = owner.name.as_str(),
            uid = owner.uid.as_str(),
            "webhook configurations owner"
        ),
        Ownership::LookupFailed(reason) => warn!(
            namespace = settings.namespace.as_str(),
            deployment = settings.deployment_name.as_str(),
            error = reason.as_str(),
            "cannot find controller deployment, webhook configurations are registered without owner"
        ),
        Ownership::NotApplicable => {}
    }

    ownership
}

fn owner_from_deployment(deployment: &Deployment, settings: &WebhookSettings) -> Ownership {
    let name = deployment.metadata.name.clone().unwrap_or_default();
    let uid = deployment.metadata.uid.clone().unwrap_or_default();
    if name.is_empty() || uid.is_empty() {
        return Ownership::LookupFailed("deployment has no name or uid".to_string());
    }

    Ownership::Owned(OwnerReference {
        api_version: settings.owner.api_version.clone(),
        kind: settings.owner.kind.clone(),
        name,
        uid,
        ..Default::default()
    })
}
