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

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// An intermediate representation of time series data points
#[derive(Clone, Debug, Serialize)]
pub struct TsPoint {
    pub measurement: String,
    pub tags: HashMap<String, TsValue>,
    pub fields: HashMap<String, TsValue>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl TsPoint {
    pub fn new(measurement: &str) -> TsPoint {
        TsPoint {
            measurement: String::from(measurement),
            tags: HashMap::new(),
            fields: HashMap::new(),
            timestamp: Some(Utc::now()),
        }
    }
    /// Add a tag and its value
    pub fn add_tag<T: ToString>(&mut self, tag: T, value: TsValue) {
        self.tags.insert(tag.to_string(), value);
    }

    /// Add a field and its value
    pub fn add_field<T: ToString>(&mut self, field: T, value: TsValue) {
        self.fields.insert(field.to_string(), value);
    }

    /// Set the timestamp for this time point
    pub fn set_time(mut self, t: DateTime<Utc>) -> Self {
        self.timestamp = Some(t);
        self
    }

    /// Set the timestamp from a millisecond UTC epoch value as the arrays
    /// report it.  Out of range values leave the collection time in place.
    pub fn set_time_millis(self, ms: i64) -> Self {
        match crate::timestamp_to_date(ms) {
            Some(t) => self.set_time(t),
            None => self,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TsValue {
    Float(f64),
    Long(u64),
    String(String),
}

#[test]
fn test_point_time_millis() {
    let p = TsPoint::new("unity_metric").set_time_millis(1_566_390_000_000);
    assert_eq!(
        p.timestamp.map(|t| t.timestamp()),
        Some(1_566_390_000)
    );

    let mut p = TsPoint::new("powermax_array");
    p.add_tag("symmetrix_id", TsValue::String("000197900151".into()));
    p.add_field("host_ios", TsValue::Float(12.5));
    assert_eq!(p.fields.get("host_ios"), Some(&TsValue::Float(12.5)));
    assert_eq!(p.tags.len(), 1);
}
