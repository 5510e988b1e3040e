use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaResolutionError {
    #[error(
        "unable to extract CA data: secret {namespace}/{secret} holds no '{key}' entry and the local client configuration has no usable CA"
    )]
    NoCaData {
        namespace: String,
        secret: String,
        key: String,
    },
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("cannot build {kind} '{name}': '{url}' is not a valid webhook URL: {source}")]
    InvalidDebugUrl {
        kind: &'static str,
        name: String,
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error(transparent)]
    CaResolution(#[from] CaResolutionError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("cannot {verb} {kind} '{name}': {source}")]
    Api {
        verb: &'static str,
        kind: &'static str,
        name: String,
        #[source]
        source: kube::Error,
    },
}

impl RegistrationError {
    /// Returns true when the control plane answered with an HTTP status code
    /// equal to `code`
    pub fn is_api_status(&self, code: u16) -> bool {
        matches!(self, RegistrationError::Api { source: kube::Error::Api(status), .. } if status.code == code)
    }
}

#[derive(Error, Debug)]
pub enum ClientTlsError {
    #[error("cannot read kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("kubeconfig has no current context")]
    NoCurrentContext,

    #[error("kubeconfig context '{0}' does not exist")]
    MissingContext(String),

    #[error("kubeconfig cluster '{0}' does not exist")]
    MissingCluster(String),

    #[error("certificate-authority-data of cluster '{cluster}' is not valid base64: {source}")]
    InvalidCaData {
        cluster: String,
        #[source]
        source: base64::DecodeError,
    },
}
