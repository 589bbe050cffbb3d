/**
* Copyright 2019 Comcast Cable Communications Management, LLC
*
* Licensed under the Apache License, Version 2.0 (the "License");
* you may not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
* http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing, software
* distributed under the License is distributed on an "AS IS" BASIS,
* WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
* See the License for the specific language governing permissions and
* limitations under the License.
*
* SPDX-License-Identifier: Apache-2.0
*/

// Shared request plumbing for the array clients.  Each vendor session owns
// a `RestClient` parameterized by how it authenticates.

use crate::error::{MetricsResult, StorageError};

use std::fmt::Debug;
use std::fs;
use std::time::Duration;

use log::{debug, error, trace, warn};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Certificate, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Header every Unisphere and Unity request carries
pub const REST_CLIENT_HEADER: &str = "X-EMC-REST-CLIENT";
/// Unity session token header
pub const CSRF_TOKEN_HEADER: &str = "EMC-CSRF-TOKEN";

fn default_scheme() -> String {
    "https".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Transport settings shared by both array clients
#[derive(Clone, Deserialize, Debug)]
pub struct HttpOptions {
    /// http or https.  Management interfaces are https only, plain http is
    /// useful against simulators.
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Skip certificate validation.  Array management interfaces usually
    /// ship self-signed certificates; this must be turned on explicitly.
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Optional root certificate file to trust, der encoded
    pub certificate: Option<String>,
    /// Per request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpOptions {
    fn default() -> Self {
        HttpOptions {
            scheme: default_scheme(),
            accept_invalid_certs: false,
            certificate: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Build a blocking client with a cookie store and the requested TLS policy
pub fn build_client(options: &HttpOptions) -> MetricsResult<Client> {
    let mut builder = Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(options.timeout_secs));
    if options.accept_invalid_certs {
        warn!("TLS certificate validation is disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }
    if let Some(ref path) = options.certificate {
        let buf = fs::read(path)?;
        builder = builder.add_root_certificate(Certificate::from_der(&buf)?);
    }
    Ok(builder.build()?)
}

/// Compose a url out of its parts.  The port is left off when not given.
pub fn url(scheme: &str, host: &str, port: Option<u16>, path: &str) -> String {
    let mut url = if scheme.is_empty() {
        host.to_string()
    } else {
        format!("{}://{}", scheme, host)
    };
    if let Some(p) = port {
        url.push_str(&format!(":{}", p));
    }
    url.push_str(path);
    url
}

/// How a request proves who it is
pub trait AuthStrategy {
    fn authorize(&self, method: &Method, req: RequestBuilder) -> MetricsResult<RequestBuilder>;
}

/// Credentials resent on every request
#[derive(Clone)]
pub struct BasicAuth {
    user: String,
    password: String,
}

impl BasicAuth {
    pub fn new(user: &str, password: &str) -> Self {
        BasicAuth {
            user: user.to_string(),
            password: password.to_string(),
        }
    }
}

impl Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("user", &self.user)
            .finish()
    }
}

impl AuthStrategy for BasicAuth {
    fn authorize(&self, _method: &Method, req: RequestBuilder) -> MetricsResult<RequestBuilder> {
        Ok(req.basic_auth(&self.user, Some(&self.password)))
    }
}

/// Token captured at login.  The session cookie rides along in the client's
/// cookie store, the token itself is only required on mutating requests.
#[derive(Clone)]
pub struct CsrfToken {
    token: String,
}

impl CsrfToken {
    pub fn new(token: &str) -> Self {
        CsrfToken {
            token: token.to_string(),
        }
    }
}

impl Debug for CsrfToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CsrfToken(..)")
    }
}

pub fn is_mutating(method: &Method) -> bool {
    *method == Method::POST
        || *method == Method::PUT
        || *method == Method::PATCH
        || *method == Method::DELETE
}

impl AuthStrategy for CsrfToken {
    fn authorize(&self, method: &Method, req: RequestBuilder) -> MetricsResult<RequestBuilder> {
        if is_mutating(method) {
            return Ok(req.header(CSRF_TOKEN_HEADER, HeaderValue::from_str(&self.token)?));
        }
        Ok(req)
    }
}

#[derive(Clone, Debug)]
pub struct RestClient<A> {
    client: Client,
    scheme: String,
    host: String,
    port: Option<u16>,
    auth: A,
}

impl<A: AuthStrategy> RestClient<A> {
    pub fn new(client: &Client, scheme: &str, host: &str, port: Option<u16>, auth: A) -> Self {
        RestClient {
            client: client.clone(),
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
            auth,
        }
    }

    /// Same client and cookie store, different credentials
    pub fn with_auth<B: AuthStrategy>(&self, auth: B) -> RestClient<B> {
        RestClient {
            client: self.client.clone(),
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            port: self.port,
            auth,
        }
    }

    pub fn url(&self, path: &str) -> String {
        url(&self.scheme, &self.host, self.port, path)
    }

    /// Build the request with common headers, auth, query and optional body
    pub fn build(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        payload: Option<&Value>,
    ) -> MetricsResult<RequestBuilder> {
        if path.trim().is_empty() {
            return Err(StorageError::ValidationError(
                "request path must be specified".into(),
            ));
        }
        let mut req = self
            .client
            .request(method.clone(), &self.url(path))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(REST_CLIENT_HEADER, "true");
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = payload {
            req = req.body(serde_json::to_vec(body)?);
        }
        self.auth.authorize(&method, req)
    }

    /// Send without looking at the status code
    pub fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        payload: Option<&Value>,
    ) -> MetricsResult<Response> {
        debug!(
            "method: {}, path: {}, query: {:?}, payload: {:?}",
            method, path, query, payload
        );
        let req = self.build(method, path, query, payload)?;
        let resp = req.send()?;
        debug!("{} returned {}", path, resp.status());
        Ok(resp)
    }

    /// Send and fail on anything outside of 2xx
    pub fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        payload: Option<&Value>,
    ) -> MetricsResult<Response> {
        let resp = self.send(method.clone(), path, query, payload)?;
        let status = resp.status().as_u16();
        if !(200..=299).contains(&status) {
            error!("{} {} failed with status {}", method, path, status);
            return Err(StorageError::RequestError {
                method: method.to_string(),
                path: path.to_string(),
                payload: payload.map(|p| p.to_string()),
                status,
            });
        }
        Ok(resp)
    }

    /// Send and decode the json body into T
    pub fn request<T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        payload: Option<&Value>,
    ) -> MetricsResult<T>
    where
        T: DeserializeOwned + Debug,
    {
        let body = self.execute(method, path, query, payload)?.text()?;
        trace!("server returned: {}", body);
        let json: Result<T, serde_json::Error> = serde_json::from_str(&body);
        trace!("json result: {:?}", json);
        Ok(json?)
    }

    /// Send and discard whatever comes back
    pub fn request_no_content(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        payload: Option<&Value>,
    ) -> MetricsResult<()> {
        self.execute(method, path, query, payload)?;
        Ok(())
    }
}

#[test]
fn test_url() {
    assert_eq!(
        url("https", "10.228.234.200", Some(8443), "/univmax/restapi/system/symmetrix/000197900151"),
        "https://10.228.234.200:8443/univmax/restapi/system/symmetrix/000197900151"
    );
    assert_eq!(
        url("https", "unity.example.com", None, "/api/types/loginSessionInfo/instances"),
        "https://unity.example.com/api/types/loginSessionInfo/instances"
    );
    assert_eq!(url("", "unity.example.com", None, "/api"), "unity.example.com/api");
}

#[test]
fn test_common_headers_and_basic_auth() {
    let client = Client::new();
    let rest = RestClient::new(&client, "https", "array", None, BasicAuth::new("smc", "smc"));
    let req = rest
        .build(Method::GET, "/univmax/restapi/system/symmetrix/1", &[], None)
        .unwrap()
        .build()
        .unwrap();
    let headers = req.headers();
    assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
    assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    assert_eq!(headers.get(REST_CLIENT_HEADER).unwrap(), "true");
    // base64("smc:smc")
    assert_eq!(
        headers.get(reqwest::header::AUTHORIZATION).unwrap(),
        "Basic c21jOnNtYw=="
    );
    assert!(req.body().is_none());
}

#[test]
fn test_csrf_token_on_mutating_requests_only() {
    let client = Client::new();
    let rest = RestClient::new(&client, "https", "unity", None, CsrfToken::new("abc123"));
    for method in &[Method::POST, Method::DELETE] {
        let req = rest
            .build(method.clone(), "/api/instances/metricRealTimeQuery/5", &[], None)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(req.headers().get(CSRF_TOKEN_HEADER).unwrap(), "abc123");
        assert!(req.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }
    let req = rest
        .build(Method::GET, "/api/instances/metricRealTimeQuery/5", &[], None)
        .unwrap()
        .build()
        .unwrap();
    assert!(req.headers().get(CSRF_TOKEN_HEADER).is_none());
}

#[test]
fn test_payload_only_when_present() {
    let client = Client::new();
    let rest = RestClient::new(&client, "https", "array", None, BasicAuth::new("u", "p"));
    let payload = serde_json::json!({ "symmetrixId": "000197900151" });
    let req = rest
        .build(Method::POST, "/univmax/restapi/performance/FEDirector/keys", &[], Some(&payload))
        .unwrap()
        .build()
        .unwrap();
    let body = req.body().and_then(|b| b.as_bytes()).unwrap();
    let sent: Value = serde_json::from_slice(body).unwrap();
    assert_eq!(sent, payload);
}

#[test]
fn test_empty_path_rejected() {
    let client = Client::new();
    let rest = RestClient::new(&client, "https", "array", None, BasicAuth::new("u", "p"));
    match rest.build(Method::GET, " ", &[], None) {
        Err(StorageError::ValidationError(_)) => {}
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_non_2xx_is_request_error() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/univmax/restapi/performance/Array/metrics")
        .with_status(500)
        .with_body(r#"{"message": "internal"}"#)
        .create();

    let client = Client::new();
    let rest = RestClient::new(
        &client,
        "http",
        &server.host_with_port(),
        None,
        BasicAuth::new("u", "p"),
    );
    let payload = serde_json::json!({ "symmetrixId": "1" });
    let res: MetricsResult<Value> = rest.request(
        Method::POST,
        "/univmax/restapi/performance/Array/metrics",
        &[],
        Some(&payload),
    );
    mock.assert();
    match res {
        Err(StorageError::RequestError {
            method,
            path,
            payload,
            status,
        }) => {
            assert_eq!(method, "POST");
            assert_eq!(path, "/univmax/restapi/performance/Array/metrics");
            assert_eq!(payload.as_deref(), Some(r#"{"symmetrixId":"1"}"#));
            assert_eq!(status, 500);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_malformed_success_body_is_json_error() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("GET", "/api/types/metricValue/instances")
        .with_status(200)
        .with_body("{not json")
        .create();

    let client = Client::new();
    let rest = RestClient::new(
        &client,
        "http",
        &server.host_with_port(),
        None,
        BasicAuth::new("u", "p"),
    );
    let res: MetricsResult<Value> =
        rest.request(Method::GET, "/api/types/metricValue/instances", &[], None);
    assert!(matches!(res, Err(StorageError::JsonError(_))));
}

#[test]
fn test_insecure_client_builds() {
    let options = HttpOptions {
        accept_invalid_certs: true,
        timeout_secs: 5,
        ..HttpOptions::default()
    };
    assert!(build_client(&options).is_ok());

    let missing = HttpOptions {
        certificate: Some("/nonexistent/array.der".into()),
        ..HttpOptions::default()
    };
    assert!(matches!(build_client(&missing), Err(StorageError::IoError(_))));
}
