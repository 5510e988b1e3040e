//! A fake Kubernetes API server, good enough for the plain REST calls issued
//! by the registration code: get, create and delete of single objects.

use http_body_util::BodyExt;
use hyper::{Method, Request, Response, StatusCode};
use k8s_openapi::ByteString;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;
use kube::client::Body;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tower_test::mock::Handle;

use crate::settings::WebhookSettings;

pub(crate) const DEPLOYMENT_UID: &str = "5a3c8e2b-7f14-4d0a-9b6e-1c2d3e4f5a6b";

#[derive(Default)]
struct ClusterState {
    objects: BTreeMap<String, Value>,
    failures: Vec<(Method, String, u16)>,
    requests: Vec<String>,
    next_uid: u64,
}

impl ClusterState {
    fn failure_for(&self, method: &Method, path: &str) -> Option<u16> {
        self.failures
            .iter()
            .find(|(m, prefix, _)| m == method && path.starts_with(prefix.as_str()))
            .map(|(_, _, code)| *code)
    }
}

pub(crate) struct FakeCluster {
    state: Arc<Mutex<ClusterState>>,
    client: kube::Client,
}

impl FakeCluster {
    /// Must be invoked from within a tokio runtime
    pub(crate) fn start() -> Self {
        let (mocksvc, handle) = tower_test::mock::pair::<Request<Body>, Response<Body>>();
        let state = Arc::new(Mutex::new(ClusterState::default()));
        serve(handle, state.clone());

        Self {
            state,
            client: kube::Client::new(mocksvc, "default"),
        }
    }

    pub(crate) fn client(&self) -> kube::Client {
        self.client.clone()
    }

    pub(crate) fn insert<K>(&self, object: K)
    where
        K: Resource<DynamicType = ()> + Serialize,
    {
        let path = object_path::<K>(
            object.meta().namespace.as_deref(),
            object.meta().name.as_deref().unwrap_or_default(),
        );
        let value = serde_json::to_value(&object).unwrap();
        self.state.lock().unwrap().objects.insert(path, value);
    }

    pub(crate) fn add_secret(&self, secret: Secret) {
        self.insert(secret);
    }

    pub(crate) fn add_deployment(&self, deployment: Deployment) {
        self.insert(deployment);
    }

    /// All the objects of kind `K` currently stored, sorted by name
    pub(crate) fn list<K>(&self) -> Vec<K>
    where
        K: Resource<DynamicType = ()> + DeserializeOwned,
    {
        let prefix = format!("{}/", K::url_path(&(), None));
        self.state
            .lock()
            .unwrap()
            .objects
            .iter()
            .filter(|(path, _)| path.starts_with(&prefix))
            .map(|(_, value)| serde_json::from_value(value.clone()).unwrap())
            .collect()
    }

    /// Answer every request of the given method whose path starts with
    /// `path_prefix` with an error status
    pub(crate) fn fail(&self, method: Method, path_prefix: String, code: u16) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((method, path_prefix, code));
    }

    pub(crate) fn fail_secret_reads(&self) {
        let settings = WebhookSettings::default();
        self.fail(
            Method::GET,
            Secret::url_path(&(), Some(&settings.namespace)),
            403,
        );
    }

    pub(crate) fn fail_deployment_reads(&self) {
        let settings = WebhookSettings::default();
        self.fail(
            Method::GET,
            Deployment::url_path(&(), Some(&settings.namespace)),
            403,
        );
    }

    pub(crate) fn fail_creates<K>(&self)
    where
        K: Resource<DynamicType = ()>,
    {
        self.fail(Method::POST, K::url_path(&(), None), 500);
    }

    pub(crate) fn fail_deletes<K>(&self)
    where
        K: Resource<DynamicType = ()>,
    {
        self.fail(Method::DELETE, K::url_path(&(), None), 500);
    }

    /// The requests served so far, formatted as "METHOD path"
    pub(crate) fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }
}

fn object_path<K>(namespace: Option<&str>, name: &str) -> String
where
    K: Resource<DynamicType = ()>,
{
    format!("{}/{}", K::url_path(&(), namespace), name)
}

fn serve(handle: Handle<Request<Body>, Response<Body>>, state: Arc<Mutex<ClusterState>>) {
    tokio::spawn(async move {
        let mut handle = handle;

        while let Some((request, send)) = handle.next_request().await {
            let method = request.method().clone();
            let path = request.uri().path().to_owned();
            let body = request
                .into_body()
                .collect()
                .await
                .expect("cannot read request body")
                .to_bytes();

            let response = {
                let mut state = state.lock().unwrap();
                handle_request(&mut state, method, path, &body)
            };
            send.send_response(response);
        }
    });
}

fn handle_request(
    state: &mut ClusterState,
    method: Method,
    path: String,
    body: &[u8],
) -> Response<Body> {
    state.requests.push(format!("{method} {path}"));

    if let Some(code) = state.failure_for(&method, &path) {
        return status_response(code, format!("injected failure for {method} {path}"));
    }

    match method {
        Method::GET => match state.objects.get(&path) {
            Some(object) => json_response(StatusCode::OK, object),
            None => status_response(404, format!("{path} not found")),
        },
        Method::DELETE => match state.objects.remove(&path) {
            Some(object) => json_response(StatusCode::OK, &object),
            None => status_response(404, format!("{path} not found")),
        },
        Method::POST => {
            let mut object: Value =
                serde_json::from_slice(body).expect("cannot decode created object");
            let name = object["metadata"]["name"]
                .as_str()
                .expect("created object has no name")
                .to_owned();
            let object_path = format!("{path}/{name}");
            if state.objects.contains_key(&object_path) {
                return status_response(409, format!("{object_path} already exists"));
            }

            state.next_uid += 1;
            object["metadata"]["uid"] = json!(format!("uid-{}", state.next_uid));
            state.objects.insert(object_path, object.clone());
            json_response(StatusCode::CREATED, &object)
        }
        _ => panic!("unexpected request: {method} {path}"),
    }
}

fn json_response(status: StatusCode, body: &Value) -> Response<Body> {
    Response::builder()
        .status(status)
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn status_response(code: u16, message: String) -> Response<Body> {
    let reason = match code {
        403 => "Forbidden",
        404 => "NotFound",
        409 => "AlreadyExists",
        _ => "InternalError",
    };
    let status = json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code,
    });

    Response::builder()
        .status(code)
        .body(Body::from(serde_json::to_vec(&status).unwrap()))
        .unwrap()
}

pub(crate) fn root_ca_secret(ca: &[u8]) -> Secret {
    let settings = WebhookSettings::default();
    Secret {
        metadata: ObjectMeta {
            name: Some(settings.root_ca_secret.name.clone()),
            namespace: Some(settings.namespace.clone()),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            settings.root_ca_secret.key.clone(),
            ByteString(ca.to_vec()),
        )])),
        ..Default::default()
    }
}

pub(crate) fn controller_deployment() -> Deployment {
    let settings = WebhookSettings::default();
    Deployment {
        metadata: ObjectMeta {
            name: Some(settings.deployment_name.clone()),
            namespace: Some(settings.namespace.clone()),
            uid: Some(DEPLOYMENT_UID.to_owned()),
            ..Default::default()
        },
        ..Default::default()
    }
}
