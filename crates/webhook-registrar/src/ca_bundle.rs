use k8s_openapi::api::core::v1::Secret;
use kube::Api;
use tracing::{debug, info, warn};

use crate::client_tls::ClientTlsConfig;
use crate::errors::CaResolutionError;
use crate::settings::SecretKeyRef;

/// Certificate authority the API server uses to validate the webhook
/// endpoint. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaBundle(Vec<u8>);

impl CaBundle {
    pub fn new(data: Vec<u8>) -> Option<Self> {
        if data.is_empty() { None } else { Some(Self(data)) }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Finds the CA bundle: the root CA secret held by the cluster wins, the CA
/// trusted by the local API client is the fallback.
pub struct CaResolver<'a> {
    client: kube::Client,
    namespace: &'a str,
    secret: &'a SecretKeyRef,
    client_tls: &'a ClientTlsConfig,
}

impl<'a> CaResolver<'a> {
    pub fn new(
        client: kube::Client,
        namespace: &'a str,
        secret: &'a SecretKeyRef,
        client_tls: &'a ClientTlsConfig,
    ) -> Self {
        Self {
            client,
            namespace,
            secret,
            client_tls,
        }
    }

    pub async fn resolve(&self) -> Result<CaBundle, CaResolutionError> {
        if let Some(bundle) = CaBundle::new(self.read_root_ca_secret().await) {
            info!(
                source = "secret",
                namespace = self.namespace,
                secret = self.secret.name.as_str(),
                "CA bundle resolved"
            );
            return Ok(bundle);
        }

        if let Some(bundle) = CaBundle::new(self.read_client_ca().await) {
            info!(source = "client configuration", "CA bundle resolved");
            return Ok(bundle);
        }

        Err(CaResolutionError::NoCaData {
            namespace: self.namespace.to_string(),
            secret: self.secret.name.clone(),
            key: self.secret.key.clone(),
        })
    }

    /// Any failure reading the secret is reported as empty data
    async fn read_root_ca_secret(&self) -> Vec<u8> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), self.namespace);
        let secret = match secrets.get_opt(&self.secret.name).await {
            Ok(Some(secret)) => secret,
            Ok(None) => {
                debug!(
                    namespace = self.namespace,
                    secret = self.secret.name.as_str(),
                    "root CA secret not found"
                );
                return Vec::new();
            }
            Err(e) => {
                warn!(
                    namespace = self.namespace,
                    secret = self.secret.name.as_str(),
                    error = e.to_string().as_str(),
                    "cannot read root CA secret"
                );
                return Vec::new();
            }
        };

        secret
            .data
            .and_then(|mut data| data.remove(&self.secret.key))
            .map(|value| value.0)
            .unwrap_or_else(|| {
                debug!(
                    secret = self.secret.name.as_str(),
                    key = self.secret.key.as_str(),
                    "root CA secret has no CA entry"
                );
                Vec::new()
            })
    }

    /// A configured CA file takes precedence over inline data, even when it
    /// cannot be read
    async fn read_client_ca(&self) -> Vec<u8> {
        if let Some(ca_file) = &self.client_tls.ca_file {
            return match tokio::fs::read(ca_file).await {
                Ok(data) => data,
                Err(e) => {
                    warn!(
                        path = ca_file.to_string_lossy().as_ref(),
                        error = e.to_string().as_str(),
                        "cannot read client CA file"
                    );
                    Vec::new()
                }
            };
        }

        self.client_tls.ca_data.clone().unwrap_or_default()
    }
}
