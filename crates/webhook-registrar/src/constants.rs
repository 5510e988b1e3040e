pub const CONTROLLER_NAME: &str = "policy-controller";
pub const CONTROLLER_NAMESPACE: &str = "policy-controller";
pub const CONTROLLER_DEPLOYMENT_NAME: &str = "policy-controller";
pub const WEBHOOK_SERVICE_NAME: &str = "policy-controller-svc";

pub const MUTATING_WEBHOOK_CONFIGURATION_NAME: &str = "policy-controller-mutating-webhook-cfg";
pub const MUTATING_WEBHOOK_CONFIGURATION_DEBUG_NAME: &str =
    "policy-controller-mutating-webhook-cfg-debug";
pub const MUTATING_WEBHOOK_NAME: &str = "mutate.policy-controller.svc";
pub const MUTATING_WEBHOOK_SERVICE_PATH: &str = "/mutate";

pub const VALIDATING_WEBHOOK_CONFIGURATION_NAME: &str = "policy-controller-validating-webhook-cfg";
pub const VALIDATING_WEBHOOK_CONFIGURATION_DEBUG_NAME: &str =
    "policy-controller-validating-webhook-cfg-debug";
pub const VALIDATING_WEBHOOK_NAME: &str = "validate.policy-controller.svc";
pub const VALIDATING_WEBHOOK_SERVICE_PATH: &str = "/validate";

pub const ROOT_CA_SECRET_NAME: &str = "policy-controller-svc.policy-controller.svc.tls-ca";
pub const ROOT_CA_SECRET_KEY: &str = "rootCA.crt";

pub const DEPLOYMENT_API_VERSION: &str = "apps/v1";
pub const DEPLOYMENT_KIND: &str = "Deployment";

pub const APP_LABEL_KEY: &str = "app";

/// Operation intercepted by the registered webhooks. UPDATE and DELETE are
/// not forwarded to the controller.
pub const WEBHOOK_OPERATION_CREATE: &str = "CREATE";
pub const WEBHOOK_MATCH_ALL: &str = "*";
pub const WEBHOOK_MATCH_ALL_RESOURCES: &str = "*/*";
pub const WEBHOOK_ADMISSION_REVIEW_VERSION: &str = "v1";
pub const WEBHOOK_SIDE_EFFECTS: &str = "None";
pub const WEBHOOK_FAILURE_POLICY: &str = "Ignore";

pub const IN_CLUSTER_CA_FILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";
pub const IN_CLUSTER_HOST_ENV_VAR: &str = "KUBERNETES_SERVICE_HOST";
