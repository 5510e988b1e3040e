use base64::{Engine, engine::general_purpose::STANDARD};
use kube::config::{Kubeconfig, KubeconfigError};
use std::path::PathBuf;
use tracing::debug;

use crate::constants::{IN_CLUSTER_CA_FILE, IN_CLUSTER_HOST_ENV_VAR};
use crate::errors::ClientTlsError;

/// CA material the local API client trusts. Used as fallback when the
/// cluster does not hold the root CA secret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientTlsConfig {
    pub ca_file: Option<PathBuf>,
    pub ca_data: Option<Vec<u8>>,
}

impl ClientTlsConfig {
    /// Build the configuration the same way the API client finds its
    /// credentials: the active kubeconfig context first, the service account
    /// CA when no kubeconfig is available and the process runs inside of a Pod.
    pub fn infer() -> Result<Self, ClientTlsError> {
        Self::infer_from(
            Kubeconfig::read(),
            std::env::var_os(IN_CLUSTER_HOST_ENV_VAR).is_some(),
        )
    }

    fn infer_from(
        kubeconfig: Result<Kubeconfig, KubeconfigError>,
        in_cluster: bool,
    ) -> Result<Self, ClientTlsError> {
        match kubeconfig {
            Ok(kubeconfig) => Self::from_kubeconfig(&kubeconfig),
            Err(e) if in_cluster => {
                debug!(
                    ca_file = IN_CLUSTER_CA_FILE,
                    kubeconfig_error = e.to_string().as_str(),
                    "using in-cluster client configuration"
                );
                Ok(Self::in_cluster())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn in_cluster() -> Self {
        Self {
            ca_file: Some(PathBuf::from(IN_CLUSTER_CA_FILE)),
            ca_data: None,
        }
    }

    pub fn from_kubeconfig(kubeconfig: &Kubeconfig) -> Result<Self, ClientTlsError> {
        let context_name = kubeconfig
            .current_context
            .as_deref()
            .ok_or(ClientTlsError::NoCurrentContext)?;
        let context = kubeconfig
            .contexts
            .iter()
            .find(|c| c.name == context_name)
            .and_then(|c| c.context.as_ref())
            .ok_or_else(|| ClientTlsError::MissingContext(context_name.to_string()))?;
        let cluster = kubeconfig
            .clusters
            .iter()
            .find(|c| c.name == context.cluster)
            .and_then(|c| c.cluster.as_ref())
            .ok_or_else(|| ClientTlsError::MissingCluster(context.cluster.clone()))?;

        let ca_data = cluster
            .certificate_authority_data
            .as_deref()
            .map(|data| STANDARD.decode(data.trim()))
            .transpose()
            .map_err(|source| ClientTlsError::InvalidCaData {
                cluster: context.cluster.clone(),
                source,
            })?;

        debug!(
            context = context_name,
            cluster = context.cluster.as_str(),
            ca_file = cluster.certificate_authority.as_deref(),
            ca_data = ca_data.is_some(),
            "using kubeconfig client configuration"
        );

        Ok(Self {
            ca_file: cluster.certificate_authority.as_ref().map(PathBuf::from),
            ca_data,
        })
    }
}
