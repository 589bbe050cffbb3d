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
use crate::deserialize_string_or_int;
use crate::error::{MetricsResult, StorageError};
use crate::ir::{TsPoint, TsValue};
use crate::rest::{build_client, BasicAuth, HttpOptions, RestClient};
use crate::{date_to_timestamp, require_non_blank, IntoPoint};

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::{debug, error};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

const API_PREFIX: &str = "/univmax/restapi";

#[derive(Clone, Deserialize, Debug)]
pub struct PowerMaxConfig {
    /// The Unisphere server address
    pub endpoint: String,
    /// Unisphere listens on 8443 by default
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
    /// The symmetrix id of the array to collect from
    pub symmetrix_id: String,
    #[serde(flatten)]
    pub http: HttpOptions,
}

/// A PowerMax array behind a Unisphere server.  Basic auth is resent with
/// every request, there is no session to tear down.
#[derive(Debug)]
pub struct PowerMax {
    rest: RestClient<BasicAuth>,
    symmetrix_id: String,
}

impl PowerMax {
    /// Validate the config and probe the array before handing back a session
    pub fn connect(config: &PowerMaxConfig) -> MetricsResult<Self> {
        validate(config)?;
        let client = build_client(&config.http)?;
        PowerMax::probe(&client, config)
    }

    /// Same as `connect` but with a caller supplied http client
    pub fn connect_with_client(
        client: &reqwest::blocking::Client,
        config: &PowerMaxConfig,
    ) -> MetricsResult<Self> {
        validate(config)?;
        PowerMax::probe(client, config)
    }

    fn probe(client: &reqwest::blocking::Client, config: &PowerMaxConfig) -> MetricsResult<Self> {
        debug!(
            "server: {}, port: {:?}, user: {}, symmetrix_id: {}",
            config.endpoint, config.port, config.user, config.symmetrix_id
        );
        let rest = RestClient::new(
            client,
            &config.http.scheme,
            &config.endpoint,
            config.port,
            BasicAuth::new(&config.user, &config.password),
        );
        let resp = rest.send(
            Method::GET,
            &format!("{}/system/symmetrix/{}", API_PREFIX, config.symmetrix_id),
            &[],
            None,
        )?;
        if resp.status().as_u16() != 200 {
            let message = format!(
                "Fail to query symmetrix with id {}: server returned {}",
                config.symmetrix_id,
                resp.status()
            );
            error!("{}", message);
            return Err(StorageError::ConnectionError(message));
        }
        Ok(PowerMax {
            rest,
            symmetrix_id: config.symmetrix_id.clone(),
        })
    }

    pub fn symmetrix_id(&self) -> &str {
        &self.symmetrix_id
    }

    /// Send a request to `/univmax/restapi/{api_endpoint}` and decode the
    /// response
    pub fn request<T>(
        &self,
        method: Method,
        api_endpoint: &str,
        payload: Option<&Value>,
    ) -> MetricsResult<T>
    where
        T: DeserializeOwned + Debug,
    {
        self.rest.request(
            method,
            &format!("{}/{}", API_PREFIX, api_endpoint),
            &[],
            payload,
        )
    }

    /// List the front end directors with performance data
    pub fn list_fe_directors(&self) -> MetricsResult<Vec<String>> {
        let payload = json!({
            "symmetrixId": self.symmetrix_id,
        });
        let keys: DirectorKeys =
            self.request(Method::POST, "performance/FEDirector/keys", Some(&payload))?;
        Ok(keys
            .fe_director_info
            .into_iter()
            .map(|d| d.director_id)
            .collect())
    }

    /// List the front end ports of one director
    pub fn list_director_ports(&self, director_id: &str) -> MetricsResult<Vec<String>> {
        require_non_blank(&[("director id", director_id)])?;
        let payload = json!({
            "symmetrixId": self.symmetrix_id,
            "directorId": director_id,
        });
        let keys: PortKeys = self.request(Method::POST, "performance/FEPort/keys", Some(&payload))?;
        Ok(keys.fe_port_info.into_iter().map(|p| p.port_id).collect())
    }

    pub fn list_storage_groups(&self) -> MetricsResult<Vec<String>> {
        let payload = json!({
            "symmetrixId": self.symmetrix_id,
        });
        let keys: StorageGroupKeys =
            self.request(Method::POST, "performance/StorageGroup/keys", Some(&payload))?;
        Ok(keys
            .storage_group_info
            .into_iter()
            .map(|s| s.storage_group_id)
            .collect())
    }

    /// Latest averaged sample for a storage group inside [from, to].  A window
    /// without samples gives back the zero value.
    pub fn storage_group_metric(
        &self,
        storage_group_id: &str,
        from: &DateTime<Utc>,
        to: &DateTime<Utc>,
    ) -> MetricsResult<StorageGroupMetric> {
        require_non_blank(&[("storage group id", storage_group_id)])?;
        let payload = json!({
            "symmetrixId": self.symmetrix_id,
            "storageGroupId": storage_group_id,
            "dataFormat": "Average",
            "startDate": date_to_timestamp(from),
            "endDate": date_to_timestamp(to),
            "metrics": STORAGE_GROUP_METRICS,
        });
        let result: MetricResponse<StorageGroupMetric> = self.request(
            Method::POST,
            "performance/StorageGroup/metrics",
            Some(&payload),
        )?;
        Ok(result.latest())
    }

    /// Latest averaged array wide sample inside [from, to]
    pub fn array_metric(
        &self,
        from: &DateTime<Utc>,
        to: &DateTime<Utc>,
    ) -> MetricsResult<ArrayMetric> {
        let payload = json!({
            "symmetrixId": self.symmetrix_id,
            "dataFormat": "Average",
            "startDate": date_to_timestamp(from),
            "endDate": date_to_timestamp(to),
            "metrics": ARRAY_METRICS,
        });
        let result: MetricResponse<ArrayMetric> =
            self.request(Method::POST, "performance/Array/metrics", Some(&payload))?;
        Ok(result.latest())
    }

    /// Latest averaged sample for one front end director inside [from, to]
    pub fn fe_director_metric(
        &self,
        director_id: &str,
        from: &DateTime<Utc>,
        to: &DateTime<Utc>,
    ) -> MetricsResult<DirectorMetric> {
        require_non_blank(&[("director id", director_id)])?;
        let payload = json!({
            "symmetrixId": self.symmetrix_id,
            "directorId": director_id,
            "dataFormat": "Average",
            "startDate": date_to_timestamp(from),
            "endDate": date_to_timestamp(to),
            "metrics": DIRECTOR_METRICS,
        });
        let result: MetricResponse<DirectorMetric> =
            self.request(Method::POST, "performance/FEDirector/metrics", Some(&payload))?;
        Ok(result.latest())
    }
}

fn validate(config: &PowerMaxConfig) -> MetricsResult<()> {
    require_non_blank(&[
        ("PowerMax server address", config.endpoint.as_str()),
        ("username", config.user.as_str()),
        ("password", config.password.as_str()),
        ("symmetrix id", config.symmetrix_id.as_str()),
    ])
}

const STORAGE_GROUP_METRICS: &[&str] = &[
    "HostReads",
    "HostWrites",
    "HostMBReads",
    "HostMBWritten",
    "ResponseTime",
    "ReadResponseTime",
    "WriteResponseTime",
    "AvgIOSize",
    "AvgReadSize",
    "AvgWriteSize",
];

const ARRAY_METRICS: &[&str] = &[
    "HostIOs",
    "HostReads",
    "HostWrites",
    "HostMBReads",
    "HostMBWritten",
    "FEReadReqs",
    "FEWriteReqs",
    "ReadResponseTime",
    "WriteResponseTime",
    "FEUtilization",
];

const DIRECTOR_METRICS: &[&str] = &[
    "HostIOs",
    "HostMBs",
    "ReadReqs",
    "WriteReqs",
    "PercentBusy",
    "QueueDepthUtilization",
    "ReadResponseTime",
    "WriteResponseTime",
];

/*
POST https://{server}/univmax/restapi/performance/FEDirector/keys
{
  "symmetrixId" : "000197900151"
}
*/
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorKeys {
    #[serde(default)]
    pub fe_director_info: Vec<DirectorInfo>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorInfo {
    pub director_id: String,
    #[serde(default, deserialize_with = "deserialize_string_or_int")]
    pub first_available_date: i64,
    #[serde(default, deserialize_with = "deserialize_string_or_int")]
    pub last_available_date: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortKeys {
    #[serde(default)]
    pub fe_port_info: Vec<PortInfo>,
}

// Unisphere hands port dates back as strings
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortInfo {
    pub port_id: String,
    #[serde(default, deserialize_with = "deserialize_string_or_int")]
    pub first_available_date: i64,
    #[serde(default, deserialize_with = "deserialize_string_or_int")]
    pub last_available_date: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageGroupKeys {
    #[serde(default)]
    pub storage_group_info: Vec<StorageGroupInfo>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageGroupInfo {
    pub storage_group_id: String,
    #[serde(default, deserialize_with = "deserialize_string_or_int")]
    pub first_available_date: i64,
    #[serde(default, deserialize_with = "deserialize_string_or_int")]
    pub last_available_date: i64,
}

//Since the returned value are an Object--> Object-Array of values, resultList-result
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricResponse<T> {
    #[serde(default)]
    pub result_list: ResultList<T>,
    pub id: Option<String>,
    pub count: Option<i64>,
    pub expiration_time: Option<i64>,
    pub max_page_size: Option<i64>,
    pub warning_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResultList<T> {
    #[serde(default = "Vec::new")]
    pub result: Vec<T>,
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl<T> Default for ResultList<T> {
    fn default() -> Self {
        ResultList {
            result: Vec::new(),
            from: None,
            to: None,
        }
    }
}

impl<T: Default> MetricResponse<T> {
    /// Samples come back oldest first, only the newest one is interesting
    pub fn latest(mut self) -> T {
        self.result_list.result.pop().unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct StorageGroupMetric {
    pub host_reads: f64,
    pub host_writes: f64,
    #[serde(rename = "HostMBReads")]
    pub host_mb_reads: f64,
    #[serde(rename = "HostMBWritten")]
    pub host_mb_written: f64,
    pub read_response_time: f64,
    pub write_response_time: f64,
    pub response_time: f64,
    #[serde(rename = "AvgIOSize")]
    pub avg_io_size: f64,
    pub avg_read_size: f64,
    pub avg_write_size: f64,
    #[serde(rename = "timestamp")]
    pub timestamp: i64,
}

impl IntoPoint for StorageGroupMetric {
    fn into_point(&self, name: Option<&str>) -> Vec<TsPoint> {
        let mut p = TsPoint::new(name.unwrap_or("powermax_storage_group"));
        p.add_field("host_reads", TsValue::Float(self.host_reads));
        p.add_field("host_writes", TsValue::Float(self.host_writes));
        p.add_field("host_mb_reads", TsValue::Float(self.host_mb_reads));
        p.add_field("host_mb_written", TsValue::Float(self.host_mb_written));
        p.add_field("read_response_time", TsValue::Float(self.read_response_time));
        p.add_field("write_response_time", TsValue::Float(self.write_response_time));
        p.add_field("response_time", TsValue::Float(self.response_time));
        p.add_field("avg_io_size", TsValue::Float(self.avg_io_size));
        p.add_field("avg_read_size", TsValue::Float(self.avg_read_size));
        p.add_field("avg_write_size", TsValue::Float(self.avg_write_size));
        vec![p.set_time_millis(self.timestamp)]
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ArrayMetric {
    #[serde(rename = "HostIOs")]
    pub host_ios: f64,
    pub host_reads: f64,
    pub host_writes: f64,
    #[serde(rename = "HostMBReads")]
    pub host_mb_reads: f64,
    #[serde(rename = "HostMBWritten")]
    pub host_mb_written: f64,
    #[serde(rename = "FEReadReqs")]
    pub fe_read_reqs: f64,
    #[serde(rename = "FEWriteReqs")]
    pub fe_write_reqs: f64,
    pub read_response_time: f64,
    pub write_response_time: f64,
    #[serde(rename = "FEUtilization")]
    pub fe_utilization: f64,
    #[serde(rename = "timestamp")]
    pub timestamp: i64,
}

impl IntoPoint for ArrayMetric {
    fn into_point(&self, name: Option<&str>) -> Vec<TsPoint> {
        let mut p = TsPoint::new(name.unwrap_or("powermax_array"));
        p.add_field("host_ios", TsValue::Float(self.host_ios));
        p.add_field("host_reads", TsValue::Float(self.host_reads));
        p.add_field("host_writes", TsValue::Float(self.host_writes));
        p.add_field("host_mb_reads", TsValue::Float(self.host_mb_reads));
        p.add_field("host_mb_written", TsValue::Float(self.host_mb_written));
        p.add_field("fe_read_reqs", TsValue::Float(self.fe_read_reqs));
        p.add_field("fe_write_reqs", TsValue::Float(self.fe_write_reqs));
        p.add_field("read_response_time", TsValue::Float(self.read_response_time));
        p.add_field("write_response_time", TsValue::Float(self.write_response_time));
        p.add_field("fe_utilization", TsValue::Float(self.fe_utilization));
        vec![p.set_time_millis(self.timestamp)]
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DirectorMetric {
    #[serde(rename = "HostIOs")]
    pub host_ios: f64,
    #[serde(rename = "HostMBs")]
    pub host_mbs: f64,
    pub read_reqs: f64,
    pub write_reqs: f64,
    pub percent_busy: f64,
    pub queue_depth_utilization: f64,
    pub read_response_time: f64,
    pub write_response_time: f64,
    #[serde(rename = "timestamp")]
    pub timestamp: i64,
}

impl IntoPoint for DirectorMetric {
    fn into_point(&self, name: Option<&str>) -> Vec<TsPoint> {
        let mut p = TsPoint::new(name.unwrap_or("powermax_fe_director"));
        p.add_field("host_ios", TsValue::Float(self.host_ios));
        p.add_field("host_mbs", TsValue::Float(self.host_mbs));
        p.add_field("read_reqs", TsValue::Float(self.read_reqs));
        p.add_field("write_reqs", TsValue::Float(self.write_reqs));
        p.add_field("percent_busy", TsValue::Float(self.percent_busy));
        p.add_field(
            "queue_depth_utilization",
            TsValue::Float(self.queue_depth_utilization),
        );
        p.add_field("read_response_time", TsValue::Float(self.read_response_time));
        p.add_field("write_response_time", TsValue::Float(self.write_response_time));
        vec![p.set_time_millis(self.timestamp)]
    }
}

#[cfg(test)]
fn read_fixture(name: &str) -> String {
    use std::fs::File;
    use std::io::Read;

    let mut f = File::open(format!("tests/powermax/{}", name)).unwrap();
    let mut buff = String::new();
    f.read_to_string(&mut buff).unwrap();
    buff
}

#[cfg(test)]
fn test_config(server: &mockito::Server) -> PowerMaxConfig {
    PowerMaxConfig {
        endpoint: server.host_with_port(),
        port: None,
        user: "smc".into(),
        password: "smc".into(),
        symmetrix_id: "000197900151".into(),
        http: HttpOptions {
            scheme: "http".into(),
            ..HttpOptions::default()
        },
    }
}

#[cfg(test)]
fn connected(server: &mut mockito::Server) -> PowerMax {
    let _probe = server
        .mock("GET", "/univmax/restapi/system/symmetrix/000197900151")
        .with_status(200)
        .with_body(read_fixture("symmetrix.json"))
        .create();
    PowerMax::connect(&test_config(server)).unwrap()
}

#[test]
fn test_parse_director_keys() {
    let i: DirectorKeys = serde_json::from_str(&read_fixture("fe_director_keys.json")).unwrap();
    println!("result: {:#?}", i);
    assert_eq!(i.fe_director_info.len(), 4);
    assert_eq!(i.fe_director_info[0].director_id, "FA-1D");
}

#[test]
fn test_parse_port_keys() {
    let i: PortKeys = serde_json::from_str(&read_fixture("fe_port_keys.json")).unwrap();
    println!("result: {:#?}", i);
    assert_eq!(i.fe_port_info[1].port_id, "28");
    assert_eq!(i.fe_port_info[1].last_available_date, 1_566_393_600_000);
}

#[test]
fn test_parse_storage_group_metrics() {
    let i: MetricResponse<StorageGroupMetric> =
        serde_json::from_str(&read_fixture("storage_group_metrics.json")).unwrap();
    println!("result: {:#?}", i);
    assert_eq!(i.result_list.result.len(), 3);
    let latest = i.latest();
    assert_eq!(latest.timestamp, 1_566_393_600_000);
    assert_eq!(latest.host_reads, 310.5);
}

#[test]
fn test_missing_metrics_decode_as_zero() {
    let i: MetricResponse<StorageGroupMetric> =
        serde_json::from_str(&read_fixture("storage_group_metrics_partial.json")).unwrap();
    assert_eq!(i.result_list.result.len(), 2);
    let latest = i.latest();
    assert_eq!(latest.timestamp, 1_566_393_000_000);
    assert_eq!(latest.host_reads, 15.5);
    assert_eq!(latest.host_writes, 0.0);
    assert_eq!(latest.avg_io_size, 0.0);

    let d: DirectorMetric =
        serde_json::from_str(r#"{"PercentBusy": 2.5, "timestamp": 1566393000000}"#).unwrap();
    assert_eq!(d.percent_busy, 2.5);
    assert_eq!(d.queue_depth_utilization, 0.0);
}

#[test]
fn test_latest_of_empty_result_is_zero_value() {
    let i: MetricResponse<ArrayMetric> =
        serde_json::from_str(r#"{"resultList": {"result": [], "from": 0, "to": 0}}"#).unwrap();
    assert_eq!(i.latest(), ArrayMetric::default());

    let i: MetricResponse<ArrayMetric> = serde_json::from_str("{}").unwrap();
    assert_eq!(i.latest(), ArrayMetric::default());
}

#[test]
fn test_metric_into_point() {
    let m = ArrayMetric {
        host_ios: 1200.0,
        fe_utilization: 12.5,
        timestamp: 1_566_393_600_000,
        ..ArrayMetric::default()
    };
    let points = m.into_point(None);
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].measurement, "powermax_array");
    assert_eq!(points[0].fields.get("host_ios"), Some(&TsValue::Float(1200.0)));
    assert_eq!(points[0].timestamp.map(|t| t.timestamp()), Some(1_566_393_600));
}

#[test]
fn test_connect_rejects_blank_arguments() {
    let server = mockito::Server::new();
    let good = test_config(&server);
    let blanks = vec![
        PowerMaxConfig {
            endpoint: "".into(),
            ..good.clone()
        },
        PowerMaxConfig {
            user: " ".into(),
            ..good.clone()
        },
        PowerMaxConfig {
            password: "".into(),
            ..good.clone()
        },
        PowerMaxConfig {
            symmetrix_id: "".into(),
            ..good.clone()
        },
    ];
    // No mock is registered, any request that slipped through would fail
    // with a status instead of a validation error.
    for config in blanks {
        match PowerMax::connect(&config) {
            Err(StorageError::ValidationError(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

#[test]
fn test_connect_probe() {
    let mut server = mockito::Server::new();
    let probe = server
        .mock("GET", "/univmax/restapi/system/symmetrix/000197900151")
        .match_header("authorization", "Basic c21jOnNtYw==")
        .match_header("x-emc-rest-client", "true")
        .with_status(200)
        .with_body(read_fixture("symmetrix.json"))
        .create();
    let pmax = PowerMax::connect(&test_config(&server)).unwrap();
    probe.assert();
    assert_eq!(pmax.symmetrix_id(), "000197900151");
}

#[test]
fn test_connect_probe_rejected() {
    let mut server = mockito::Server::new();
    let _probe = server
        .mock("GET", "/univmax/restapi/system/symmetrix/000197900151")
        .with_status(401)
        .create();
    match PowerMax::connect(&test_config(&server)) {
        Err(StorageError::ConnectionError(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_list_keys() {
    let mut server = mockito::Server::new();
    let pmax = connected(&mut server);

    let dirs = server
        .mock("POST", "/univmax/restapi/performance/FEDirector/keys")
        .match_header("authorization", "Basic c21jOnNtYw==")
        .match_body(mockito::Matcher::Json(json!({"symmetrixId": "000197900151"})))
        .with_status(200)
        .with_body(read_fixture("fe_director_keys.json"))
        .create();
    assert_eq!(
        pmax.list_fe_directors().unwrap(),
        vec!["FA-1D", "FA-2D", "FA-3D", "FA-4D"]
    );
    dirs.assert();

    let ports = server
        .mock("POST", "/univmax/restapi/performance/FEPort/keys")
        .match_body(mockito::Matcher::Json(
            json!({"symmetrixId": "000197900151", "directorId": "FA-1D"}),
        ))
        .with_status(200)
        .with_body(read_fixture("fe_port_keys.json"))
        .create();
    assert_eq!(pmax.list_director_ports("FA-1D").unwrap(), vec!["4", "28"]);
    ports.assert();

    let _groups = server
        .mock("POST", "/univmax/restapi/performance/StorageGroup/keys")
        .with_status(200)
        .with_body(read_fixture("storage_group_keys.json"))
        .create();
    assert_eq!(
        pmax.list_storage_groups().unwrap(),
        vec!["vmw-automation-ci", "oracle_prod_sg"]
    );
}

#[test]
fn test_storage_group_metric_returns_latest_sample() {
    use chrono::TimeZone;

    let mut server = mockito::Server::new();
    let pmax = connected(&mut server);
    let to = Utc.timestamp_opt(1_566_393_600, 0).single().unwrap();
    let from = Utc.timestamp_opt(1_566_393_240, 0).single().unwrap();

    let m = server
        .mock("POST", "/univmax/restapi/performance/StorageGroup/metrics")
        .match_body(mockito::Matcher::PartialJson(json!({
            "symmetrixId": "000197900151",
            "storageGroupId": "vmw-automation-ci",
            "dataFormat": "Average",
            "startDate": 1_566_393_240_000i64,
            "endDate": 1_566_393_600_000i64,
        })))
        .with_status(200)
        .with_body(read_fixture("storage_group_metrics.json"))
        .create();
    let metric = pmax
        .storage_group_metric("vmw-automation-ci", &from, &to)
        .unwrap();
    m.assert();
    assert_eq!(metric.timestamp, 1_566_393_600_000);
    assert_eq!(metric.response_time, 0.42);
}

#[test]
fn test_array_metric_without_samples() {
    let mut server = mockito::Server::new();
    let pmax = connected(&mut server);
    let _m = server
        .mock("POST", "/univmax/restapi/performance/Array/metrics")
        .with_status(200)
        .with_body(r#"{"resultList": {"result": [], "from": 1, "to": 1}, "count": 0}"#)
        .create();
    let now = Utc::now();
    assert_eq!(pmax.array_metric(&now, &now).unwrap(), ArrayMetric::default());
}

#[test]
fn test_array_metric_failure_is_error() {
    let mut server = mockito::Server::new();
    let pmax = connected(&mut server);
    let _m = server
        .mock("POST", "/univmax/restapi/performance/Array/metrics")
        .with_status(400)
        .with_body(read_fixture("array_metrics.json"))
        .create();
    let now = Utc::now();
    match pmax.array_metric(&now, &now) {
        Err(StorageError::RequestError { status, .. }) => assert_eq!(status, 400),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_array_and_director_metrics() {
    let mut server = mockito::Server::new();
    let pmax = connected(&mut server);
    let _a = server
        .mock("POST", "/univmax/restapi/performance/Array/metrics")
        .with_status(200)
        .with_body(read_fixture("array_metrics.json"))
        .create();
    let _d = server
        .mock("POST", "/univmax/restapi/performance/FEDirector/metrics")
        .match_body(mockito::Matcher::PartialJson(json!({"directorId": "FA-1D"})))
        .with_status(200)
        .with_body(read_fixture("fe_director_metrics.json"))
        .create();
    let now = Utc::now();
    let array = pmax.array_metric(&now, &now).unwrap();
    assert_eq!(array.host_ios, 5120.0);
    assert_eq!(array.fe_utilization, 7.25);

    let director = pmax.fe_director_metric("FA-1D", &now, &now).unwrap();
    assert_eq!(director.percent_busy, 3.5);
    assert_eq!(director.timestamp, 1_566_393_600_000);
}
