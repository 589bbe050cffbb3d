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

// Performance metric clients for Dell EMC PowerMax (Unisphere) and Unity
// storage arrays.
//
// Every call is a single blocking round trip.  Logging goes through the
// `log` facade; the hosting application installs a logger once.

#[macro_use]
extern crate serde_derive;

use crate::error::{MetricsResult, StorageError};

use chrono::{DateTime, TimeZone, Utc};
use serde::de::Deserialize;
use serde::Deserializer;

pub mod error;
pub mod ir;
pub mod powermax;
pub mod rest;
pub mod unity;

pub trait IntoPoint {
    fn into_point(&self, name: Option<&str>) -> Vec<ir::TsPoint>;
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum StringOrInt {
    String(String),
    Int(i64),
}

fn deserialize_string_or_int<'de, D>(deserializer: D) -> ::std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match StringOrInt::deserialize(deserializer)? {
        StringOrInt::String(s) => s.parse().map_err(D::Error::custom),
        StringOrInt::Int(i) => Ok(i),
    }
}

/// Convert a date to a UTC timestamp in milliseconds.  Sub-second precision
/// is dropped, the arrays only report whole seconds.
pub fn date_to_timestamp(tm: &DateTime<Utc>) -> i64 {
    tm.timestamp() * 1000
}

/// Convert a UTC timestamp in milliseconds back to a date
pub fn timestamp_to_date(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(ms.div_euclid(1000), 0).single()
}

/// Fails with a validation error naming the first blank argument
pub(crate) fn require_non_blank(args: &[(&str, &str)]) -> MetricsResult<()> {
    for (name, value) in args {
        if value.trim().is_empty() {
            return Err(StorageError::ValidationError(format!(
                "{} must be specified",
                name
            )));
        }
    }
    Ok(())
}

#[test]
fn test_timestamp_round_trip() {
    let now = Utc::now();
    let ms = date_to_timestamp(&now);
    assert_eq!(ms % 1000, 0);
    let back = timestamp_to_date(ms).unwrap();
    assert_eq!(back.timestamp(), now.timestamp());

    let fixed = Utc.timestamp_opt(1_566_390_123, 0).single().unwrap();
    assert_eq!(date_to_timestamp(&fixed), 1_566_390_123_000);
    assert_eq!(timestamp_to_date(1_566_390_123_999), Some(fixed));
}

#[test]
fn test_require_non_blank() {
    assert!(require_non_blank(&[("server", "10.0.0.1"), ("username", "smc")]).is_ok());
    match require_non_blank(&[("server", "10.0.0.1"), ("password", "  ")]) {
        Err(StorageError::ValidationError(msg)) => assert_eq!(msg, "password must be specified"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_string_or_int_dates() {
    #[derive(Deserialize)]
    struct Dates {
        #[serde(deserialize_with = "deserialize_string_or_int")]
        first: i64,
        #[serde(deserialize_with = "deserialize_string_or_int")]
        last: i64,
    }
    let d: Dates =
        serde_json::from_str(r#"{"first": "1566390000000", "last": 1566393600000}"#).unwrap();
    assert_eq!(d.first, 1_566_390_000_000);
    assert_eq!(d.last, 1_566_393_600_000);
}
