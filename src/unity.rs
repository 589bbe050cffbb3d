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
use crate::error::{MetricsResult, StorageError};
use crate::ir::{TsPoint, TsValue};
use crate::rest::{build_client, BasicAuth, CsrfToken, HttpOptions, RestClient, CSRF_TOKEN_HEADER};
use crate::{require_non_blank, IntoPoint};

use std::collections::BTreeMap;
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use reqwest::Method;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use serde_json::{json, Value};

const LOGIN_PATH: &str = "/api/types/loginSessionInfo/instances";
const LOGOUT_PATH: &str = "/api/types/loginSessionInfo/action/logout";
const REAL_TIME_QUERY_TYPE: &str = "/api/types/metricRealTimeQuery/instances";
const REAL_TIME_QUERY_INSTANCE: &str = "/api/instances/metricRealTimeQuery";
const QUERY_RESULT_TYPE: &str = "/api/types/metricQueryResult/instances";
const METRIC_VALUE_TYPE: &str = "/api/types/metricValue/instances";

#[derive(Clone, Deserialize, Debug)]
pub struct UnityConfig {
    /// The Unity management address
    pub endpoint: String,
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
    #[serde(flatten)]
    pub http: HttpOptions,
}

/// A logged in Unity session.  The login cookie lives in the http client's
/// cookie store and the CSRF token goes out with every mutating request.
#[derive(Debug)]
pub struct Unity {
    rest: RestClient<CsrfToken>,
}

impl Unity {
    pub fn connect(config: &UnityConfig) -> MetricsResult<Self> {
        validate(config)?;
        let client = build_client(&config.http)?;
        Unity::login(&client, config)
    }

    /// The client must keep cookies or every request after login is rejected
    pub fn connect_with_client(
        client: &reqwest::blocking::Client,
        config: &UnityConfig,
    ) -> MetricsResult<Self> {
        validate(config)?;
        Unity::login(client, config)
    }

    fn login(client: &reqwest::blocking::Client, config: &UnityConfig) -> MetricsResult<Self> {
        debug!("server: {}, user: {}", config.endpoint, config.user);
        let basic = RestClient::new(
            client,
            &config.http.scheme,
            &config.endpoint,
            config.port,
            BasicAuth::new(&config.user, &config.password),
        );
        let resp = basic.send(Method::GET, LOGIN_PATH, &[], None)?;
        if resp.status().as_u16() != 200 {
            let message = format!(
                "Login to {} as {} failed: server returned {}",
                config.endpoint,
                config.user,
                resp.status()
            );
            error!("{}", message);
            return Err(StorageError::ConnectionError(message));
        }

        // From here we should get back a token
        let token = match resp.headers().get(CSRF_TOKEN_HEADER) {
            Some(t) => t.to_str()?.to_string(),
            None => {
                return Err(StorageError::ConnectionError(format!(
                    "Server responded 200 OK but {} not set.  Cannot proceed further",
                    CSRF_TOKEN_HEADER
                )));
            }
        };
        Ok(Unity {
            rest: basic.with_auth(CsrfToken::new(&token)),
        })
    }

    /// Log out of the session
    pub fn disconnect(&self) -> MetricsResult<()> {
        debug!("Logout");
        self.request_no_content(Method::POST, LOGOUT_PATH, None, None, None)
    }

    /// Send a request and decode the response.  `fields` and `filter` are
    /// only added to the query string when given.
    pub fn request<T>(
        &self,
        method: Method,
        path: &str,
        fields: Option<&str>,
        filter: Option<&str>,
        payload: Option<&Value>,
    ) -> MetricsResult<T>
    where
        T: DeserializeOwned + Debug,
    {
        let params = query_params(&method, fields, filter);
        self.rest.request(method, path, &params, payload)
    }

    pub fn request_no_content(
        &self,
        method: Method,
        path: &str,
        fields: Option<&str>,
        filter: Option<&str>,
        payload: Option<&Value>,
    ) -> MetricsResult<()> {
        let params = query_params(&method, fields, filter);
        self.rest.request_no_content(method, path, &params, payload)
    }

    /// Register metric paths to be sampled every `interval` seconds.
    /// Returns the query id.  The caller owns deleting it.
    pub fn create_real_time_query<S: AsRef<str>>(
        &self,
        paths: &[S],
        interval: u64,
    ) -> MetricsResult<u64> {
        let paths: Vec<&str> = paths.iter().map(|p| p.as_ref()).collect();
        if paths.is_empty() {
            return Err(StorageError::ValidationError(
                "at least one metric path must be specified".into(),
            ));
        }
        for path in &paths {
            require_non_blank(&[("metric path", *path)])?;
        }
        if interval == 0 {
            return Err(StorageError::ValidationError(
                "query interval must be greater than zero".into(),
            ));
        }
        let payload = json!({
            "paths": paths,
            "interval": interval,
        });
        let query: MetricRealTimeQuery = self
            .request(Method::POST, REAL_TIME_QUERY_TYPE, None, None, Some(&payload))
            .map_err(|e| {
                error!("Fail to create a new metric real time query: {}", e);
                e
            })?;
        debug!("New metric real time query id: {}", query.content.id);
        Ok(query.content.id)
    }

    /// Look up a real time query registration
    pub fn real_time_query(&self, id: u64) -> MetricsResult<MetricRealTimeQuery> {
        self.request(
            Method::GET,
            &format!("{}/{}", REAL_TIME_QUERY_INSTANCE, id),
            None,
            None,
            None,
        )
    }

    /// Whether the query is still registered.  Decided by status code alone,
    /// deleted and expired queries both come back as not found.
    pub fn query_exists(&self, id: u64) -> MetricsResult<bool> {
        let method = Method::GET;
        let params = query_params(&method, None, None);
        let resp = self.rest.send(
            method,
            &format!("{}/{}", REAL_TIME_QUERY_INSTANCE, id),
            &params,
            None,
        )?;
        if resp.status().is_success() {
            info!("The query id {} exists", id);
            Ok(true)
        } else {
            warn!("The query id {} does not exist: {}", id, resp.status());
            Ok(false)
        }
    }

    pub fn delete_real_time_query(&self, id: u64) -> MetricsResult<()> {
        debug!("Delete metric real time query {}", id);
        self.request_no_content(
            Method::DELETE,
            &format!("{}/{}", REAL_TIME_QUERY_INSTANCE, id),
            None,
            None,
            None,
        )
    }

    /// Samples collected so far for a real time query.  The entry list stays
    /// empty until at least one interval has passed since the query was
    /// created; that is not an error.
    pub fn fetch_result(&self, id: u64) -> MetricsResult<Metric> {
        debug!("Get metric result with id {}", id);
        self.request(
            Method::GET,
            QUERY_RESULT_TYPE,
            None,
            Some(&format!("queryId eq {}", id)),
            None,
        )
    }

    /// Historical samples for one exact metric path
    pub fn historical_metric(&self, path: &str) -> MetricsResult<Metric> {
        require_non_blank(&[("metric path", path)])?;
        debug!("Get historical metric data with path {}", path);
        self.request(
            Method::GET,
            METRIC_VALUE_TYPE,
            None,
            Some(&format!("path eq \"{}\"", path)),
            None,
        )
    }
}

fn validate(config: &UnityConfig) -> MetricsResult<()> {
    require_non_blank(&[
        ("Unity server address", config.endpoint.as_str()),
        ("username", config.user.as_str()),
        ("password", config.password.as_str()),
    ])
}

/// Every call but DELETE asks for compact output
pub fn query_params(
    method: &Method,
    fields: Option<&str>,
    filter: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if *method != Method::DELETE {
        params.push(("compact", "true".to_string()));
    }
    if let Some(f) = fields.filter(|f| !f.is_empty()) {
        params.push(("fields", f.to_string()));
    }
    if let Some(f) = filter.filter(|f| !f.is_empty()) {
        params.push(("filter", f.to_string()));
    }
    params
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MetricRealTimeQuery {
    pub content: RealTimeQueryContent,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealTimeQueryContent {
    pub id: u64,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub interval: u64,
    pub maximum_samples: Option<u64>,
    pub expiration: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

/// Collection envelope shared by metricQueryResult and metricValue
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Metric {
    #[serde(rename = "@base")]
    pub base: Option<String>,
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub entries: Vec<MetricEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MetricEntry {
    pub content: MetricContent,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricContent {
    /// Only set on real time query results
    pub query_id: Option<u64>,
    pub path: String,
    pub timestamp: DateTime<Utc>,
    pub interval: Option<u64>,
    /// Keyed by storage processor, e.g. spa and spb
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_values")]
    pub values: BTreeMap<String, MetricValue>,
}

/// A sample is either a plain number or, for paths with more than one
/// wildcard, a breakdown keyed by the extra object (lun, port, pool, ...).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Breakdown(BTreeMap<String, MetricValue>),
}

// Unity reports large counters as strings
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMetricValue {
    Number(f64),
    Text(String),
    Breakdown(BTreeMap<String, Option<MetricValue>>),
}

// Controllers without a sample report null, those entries are dropped
fn without_nulls(values: BTreeMap<String, Option<MetricValue>>) -> BTreeMap<String, MetricValue> {
    values
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect()
}

fn deserialize_values<'de, D>(deserializer: D) -> Result<BTreeMap<String, MetricValue>, D::Error>
where
    D: Deserializer<'de>,
{
    BTreeMap::<String, Option<MetricValue>>::deserialize(deserializer).map(without_nulls)
}

impl<'de> Deserialize<'de> for MetricValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        match RawMetricValue::deserialize(deserializer)? {
            RawMetricValue::Number(n) => Ok(MetricValue::Number(n)),
            RawMetricValue::Text(s) => s.parse().map(MetricValue::Number).map_err(D::Error::custom),
            RawMetricValue::Breakdown(b) => Ok(MetricValue::Breakdown(without_nulls(b))),
        }
    }
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            MetricValue::Number(n) => Some(n),
            MetricValue::Breakdown(_) => None,
        }
    }

    /// Sum of every number under this value
    pub fn total(&self) -> f64 {
        match *self {
            MetricValue::Number(n) => n,
            MetricValue::Breakdown(ref b) => b.values().map(|v| v.total()).sum(),
        }
    }

    fn add_fields(&self, prefix: &str, p: &mut TsPoint) {
        match *self {
            MetricValue::Number(n) => p.add_field(prefix, TsValue::Float(n)),
            MetricValue::Breakdown(ref b) => {
                for (key, value) in b {
                    value.add_fields(&format!("{}.{}", prefix, key), p);
                }
            }
        }
    }
}

impl IntoPoint for Metric {
    fn into_point(&self, name: Option<&str>) -> Vec<TsPoint> {
        self.entries
            .iter()
            .map(|e| {
                let c = &e.content;
                let mut p = TsPoint::new(name.unwrap_or("unity_metric"));
                p.add_tag("path", TsValue::String(c.path.clone()));
                if let Some(id) = c.query_id {
                    p.add_tag("query_id", TsValue::Long(id));
                }
                for (sp, value) in &c.values {
                    value.add_fields(sp, &mut p);
                }
                p.set_time(c.timestamp)
            })
            .collect()
    }
}

#[cfg(test)]
fn read_fixture(name: &str) -> String {
    use std::fs::File;
    use std::io::Read;

    let mut f = File::open(format!("tests/unity/{}", name)).unwrap();
    let mut buff = String::new();
    f.read_to_string(&mut buff).unwrap();
    buff
}

#[cfg(test)]
fn test_config(server: &mockito::Server) -> UnityConfig {
    UnityConfig {
        endpoint: server.host_with_port(),
        port: None,
        user: "admin".into(),
        password: "Password123!".into(),
        http: HttpOptions {
            scheme: "http".into(),
            ..HttpOptions::default()
        },
    }
}

#[cfg(test)]
fn compact_with(extra: Vec<mockito::Matcher>) -> mockito::Matcher {
    let mut all = vec![mockito::Matcher::UrlEncoded(
        "compact".into(),
        "true".into(),
    )];
    all.extend(extra);
    mockito::Matcher::AllOf(all)
}

#[cfg(test)]
fn connected(server: &mut mockito::Server) -> Unity {
    let login = server
        .mock("GET", LOGIN_PATH)
        .with_status(200)
        .with_header("emc-csrf-token", "token-abc")
        .with_header("set-cookie", "mod_sec_emc=session1; Path=/")
        .with_body(read_fixture("login.json"))
        .create();
    let unity = Unity::connect(&test_config(server)).unwrap();
    login.remove();
    unity
}

#[test]
fn test_parse_real_time_query() {
    let i: MetricRealTimeQuery = serde_json::from_str(&read_fixture("real_time_query.json")).unwrap();
    println!("result: {:#?}", i);
    assert_eq!(i.content.id, 5);
    assert_eq!(i.content.interval, 10);
    assert_eq!(i.content.paths.len(), 2);
    assert!(i.content.expiration.is_some());
}

#[test]
fn test_parse_query_result() {
    let i: Metric = serde_json::from_str(&read_fixture("query_result.json")).unwrap();
    println!("result: {:#?}", i);
    assert_eq!(i.entries.len(), 2);
    let c = &i.entries[0].content;
    assert_eq!(c.query_id, Some(5));
    assert_eq!(c.values.get("spa"), Some(&MetricValue::Number(1_187_294_412.0)));
    assert_eq!(c.values.get("spb").and_then(|v| v.as_number()), Some(994_520_771.0));
}

#[test]
fn test_parse_breakdown_values() {
    let i: Metric = serde_json::from_str(&read_fixture("query_result_breakdown.json")).unwrap();
    let spa = &i.entries[0].content.values["spa"];
    match spa {
        MetricValue::Breakdown(b) => {
            assert_eq!(b.len(), 2);
            assert_eq!(b["sv_1"], MetricValue::Number(12.5));
        }
        other => panic!("expected breakdown, got {:?}", other),
    }
    assert_eq!(spa.total(), 20.0);

    let points = i.into_point(None);
    assert_eq!(points.len(), 1);
    assert_eq!(
        points[0].fields.get("spa.sv_1"),
        Some(&TsValue::Float(12.5))
    );
    assert_eq!(
        points[0].fields.get("spb.sv_2"),
        Some(&TsValue::Float(1.0))
    );
    assert_eq!(points[0].tags.get("query_id"), Some(&TsValue::Long(6)));
}

#[test]
fn test_parse_historical_metric() {
    let i: Metric = serde_json::from_str(&read_fixture("metric_value.json")).unwrap();
    assert_eq!(i.entries.len(), 3);
    for e in &i.entries {
        assert_eq!(e.content.path, "sp.*.cpu.summary.utilization");
        assert_eq!(e.content.query_id, None);
        assert_eq!(e.content.interval, Some(60));
    }
}

#[test]
fn test_null_values_are_dropped() {
    let i: Metric = serde_json::from_str(&read_fixture("query_result_null.json")).unwrap();
    assert_eq!(i.entries.len(), 2);

    let busy = &i.entries[0].content.values;
    assert_eq!(busy.len(), 1);
    assert_eq!(busy.get("spa"), Some(&MetricValue::Number(10.0)));
    assert!(busy.get("spb").is_none());

    let reads = &i.entries[1].content.values;
    assert_eq!(reads.len(), 1);
    assert_eq!(reads["spa"].total(), 4.0);

    let points = i.into_point(None);
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].fields.len(), 1);
    assert_eq!(points[0].fields.get("spa"), Some(&TsValue::Float(10.0)));
    assert_eq!(points[1].fields.get("spa.sv_1"), Some(&TsValue::Float(4.0)));
    assert!(points[1].fields.get("spa.sv_2").is_none());
}

#[test]
fn test_bad_metric_value_is_error() {
    let res: Result<MetricValue, _> = serde_json::from_str(r#""not a number""#);
    assert!(res.is_err());
    let res: MetricValue = serde_json::from_str(r#""42""#).unwrap();
    assert_eq!(res, MetricValue::Number(42.0));
}

#[test]
fn test_query_params() {
    assert_eq!(
        query_params(&Method::GET, None, None),
        vec![("compact", "true".to_string())]
    );
    assert_eq!(
        query_params(&Method::DELETE, None, None),
        Vec::<(&str, String)>::new()
    );
    assert_eq!(
        query_params(&Method::POST, Some("id,paths"), Some("")),
        vec![
            ("compact", "true".to_string()),
            ("fields", "id,paths".to_string())
        ]
    );
    assert_eq!(
        query_params(&Method::GET, None, Some("queryId eq 5")),
        vec![
            ("compact", "true".to_string()),
            ("filter", "queryId eq 5".to_string())
        ]
    );
}

#[test]
fn test_connect_rejects_blank_arguments() {
    let server = mockito::Server::new();
    let good = test_config(&server);
    let blanks = vec![
        UnityConfig {
            endpoint: " ".into(),
            ..good.clone()
        },
        UnityConfig {
            user: "".into(),
            ..good.clone()
        },
        UnityConfig {
            password: "".into(),
            ..good.clone()
        },
    ];
    for config in blanks {
        match Unity::connect(&config) {
            Err(StorageError::ValidationError(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

#[test]
fn test_login_failures() {
    let mut server = mockito::Server::new();
    let denied = server.mock("GET", LOGIN_PATH).with_status(401).create();
    match Unity::connect(&test_config(&server)) {
        Err(StorageError::ConnectionError(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    denied.remove();

    let _no_token = server
        .mock("GET", LOGIN_PATH)
        .with_status(200)
        .with_body(read_fixture("login.json"))
        .create();
    match Unity::connect(&test_config(&server)) {
        Err(StorageError::ConnectionError(msg)) => assert!(msg.contains(CSRF_TOKEN_HEADER)),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_login_sends_basic_auth() {
    let mut server = mockito::Server::new();
    let login = server
        .mock("GET", LOGIN_PATH)
        .match_header("authorization", mockito::Matcher::Regex("^Basic ".into()))
        .match_header("x-emc-rest-client", "true")
        .with_status(200)
        .with_header("emc-csrf-token", "token-abc")
        .with_body(read_fixture("login.json"))
        .create();
    assert!(Unity::connect(&test_config(&server)).is_ok());
    login.assert();
}

#[test]
fn test_real_time_query_sequence() {
    let mut server = mockito::Server::new();
    let unity = connected(&mut server);

    let create = server
        .mock("POST", REAL_TIME_QUERY_TYPE)
        .match_query(compact_with(vec![]))
        .match_header("emc-csrf-token", "token-abc")
        .match_header("cookie", mockito::Matcher::Regex("mod_sec_emc=session1".into()))
        .match_body(mockito::Matcher::Json(json!({
            "paths": ["sp.*.cpu.summary.busyTicks", "sp.*.cpu.summary.idleTicks"],
            "interval": 10,
        })))
        .with_status(201)
        .with_body(read_fixture("real_time_query.json"))
        .create();
    let id = unity
        .create_real_time_query(
            &["sp.*.cpu.summary.busyTicks", "sp.*.cpu.summary.idleTicks"],
            10,
        )
        .unwrap();
    create.assert();
    assert_eq!(id, 5);

    let exists = server
        .mock("GET", "/api/instances/metricRealTimeQuery/5")
        .match_query(compact_with(vec![]))
        .with_status(200)
        .with_body(read_fixture("real_time_query.json"))
        .create();
    assert!(unity.query_exists(id).unwrap());
    assert_eq!(unity.real_time_query(id).unwrap().content.interval, 10);

    // Nothing sampled before the first interval has passed
    let empty = server
        .mock("GET", QUERY_RESULT_TYPE)
        .match_query(compact_with(vec![mockito::Matcher::UrlEncoded(
            "filter".into(),
            "queryId eq 5".into(),
        )]))
        .with_status(200)
        .with_body(read_fixture("query_result_empty.json"))
        .create();
    let first = unity.fetch_result(id).unwrap();
    assert!(first.entries.is_empty());
    empty.remove();

    let _sampled = server
        .mock("GET", QUERY_RESULT_TYPE)
        .match_query(compact_with(vec![mockito::Matcher::UrlEncoded(
            "filter".into(),
            "queryId eq 5".into(),
        )]))
        .with_status(200)
        .with_body(read_fixture("query_result.json"))
        .create();
    let later = unity.fetch_result(id).unwrap();
    assert!(!later.entries.is_empty());
    assert!(later.entries.iter().all(|e| e.content.query_id == Some(id)));

    let delete = server
        .mock("DELETE", "/api/instances/metricRealTimeQuery/5")
        .match_header("emc-csrf-token", "token-abc")
        .with_status(204)
        .create();
    unity.delete_real_time_query(id).unwrap();
    delete.assert();

    exists.remove();
    let _gone = server
        .mock("GET", "/api/instances/metricRealTimeQuery/5")
        .match_query(compact_with(vec![]))
        .with_status(404)
        .with_body(r#"{"error": {"errorCode": 131149829, "httpStatusCode": 404}}"#)
        .create();
    assert!(!unity.query_exists(id).unwrap());
}

#[test]
fn test_create_real_time_query_validation() {
    let mut server = mockito::Server::new();
    let unity = connected(&mut server);
    let none: [&str; 0] = [];
    assert!(matches!(
        unity.create_real_time_query(&none, 10),
        Err(StorageError::ValidationError(_))
    ));
    assert!(matches!(
        unity.create_real_time_query(&["sp.*.cpu.summary.busyTicks"], 0),
        Err(StorageError::ValidationError(_))
    ));
    assert!(matches!(
        unity.create_real_time_query(&[""], 10),
        Err(StorageError::ValidationError(_))
    ));
}

#[test]
fn test_create_real_time_query_rejected() {
    let mut server = mockito::Server::new();
    let unity = connected(&mut server);
    let _m = server
        .mock("POST", REAL_TIME_QUERY_TYPE)
        .match_query(compact_with(vec![]))
        .with_status(422)
        .create();
    match unity.create_real_time_query(&["sp.*.bogus"], 10) {
        Err(StorageError::RequestError { method, status, payload, .. }) => {
            assert_eq!(method, "POST");
            assert_eq!(status, 422);
            assert!(payload.unwrap().contains("sp.*.bogus"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_historical_metric_and_logout() {
    let mut server = mockito::Server::new();
    let unity = connected(&mut server);
    let history = server
        .mock("GET", METRIC_VALUE_TYPE)
        .match_query(compact_with(vec![mockito::Matcher::UrlEncoded(
            "filter".into(),
            "path eq \"sp.*.cpu.summary.utilization\"".into(),
        )]))
        .with_status(200)
        .with_body(read_fixture("metric_value.json"))
        .create();
    let m = unity
        .historical_metric("sp.*.cpu.summary.utilization")
        .unwrap();
    history.assert();
    assert_eq!(m.entries.len(), 3);
    assert_eq!(m.into_point(Some("unity_cpu")).len(), 3);

    let logout = server
        .mock("POST", LOGOUT_PATH)
        .match_query(compact_with(vec![]))
        .match_header("emc-csrf-token", "token-abc")
        .with_status(200)
        .with_body("{}")
        .create();
    unity.disconnect().unwrap();
    logout.assert();
}
