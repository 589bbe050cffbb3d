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
use std::error::Error as err;
use std::fmt;
use std::io::Error;

use reqwest::header::{InvalidHeaderValue, ToStrError};
use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;

pub type MetricsResult<T> = Result<T, StorageError>;

/// Custom error handling
#[derive(Debug)]
pub enum StorageError {
    /// The array refused the login probe
    ConnectionError(String),
    Error(String),
    HttpError(ReqwestError),
    InvalidHeaderValue(InvalidHeaderValue),
    IoError(Error),
    JsonError(JsonError),
    /// The server answered outside of the 2xx range.  The response body is
    /// intentionally not kept.
    RequestError {
        method: String,
        path: String,
        payload: Option<String>,
        status: u16,
    },
    ToStrError(ToStrError),
    /// A required argument was missing.  Raised before any network I/O.
    ValidationError(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StorageError::ConnectionError(ref e) => f.write_str(e),
            StorageError::Error(ref e) => f.write_str(e),
            StorageError::HttpError(ref e) => e.fmt(f),
            StorageError::InvalidHeaderValue(ref e) => e.fmt(f),
            StorageError::IoError(ref e) => e.fmt(f),
            StorageError::JsonError(ref e) => e.fmt(f),
            StorageError::RequestError {
                ref method,
                ref path,
                ref payload,
                status,
            } => write!(
                f,
                "{} {} failed with status {}, payload: {}",
                method,
                path,
                status,
                payload.as_deref().unwrap_or("none")
            ),
            StorageError::ToStrError(ref e) => e.fmt(f),
            StorageError::ValidationError(ref e) => f.write_str(e),
        }
    }
}

impl err for StorageError {
    fn source(&self) -> Option<&(dyn err + 'static)> {
        match *self {
            StorageError::ConnectionError(_) => None,
            StorageError::Error(_) => None,
            StorageError::HttpError(ref e) => e.source(),
            StorageError::InvalidHeaderValue(ref e) => e.source(),
            StorageError::IoError(ref e) => e.source(),
            StorageError::JsonError(ref e) => e.source(),
            StorageError::RequestError { .. } => None,
            StorageError::ToStrError(ref e) => e.source(),
            StorageError::ValidationError(_) => None,
        }
    }
}

impl StorageError {
    /// Create a new StorageError with a String message
    pub fn new(err: String) -> StorageError {
        StorageError::Error(err)
    }

    /// The HTTP status code for errors that came back from the array
    pub fn status(&self) -> Option<u16> {
        match *self {
            StorageError::RequestError { status, .. } => Some(status),
            StorageError::HttpError(ref e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<Error> for StorageError {
    fn from(err: Error) -> StorageError {
        StorageError::IoError(err)
    }
}

impl From<InvalidHeaderValue> for StorageError {
    fn from(err: InvalidHeaderValue) -> StorageError {
        StorageError::InvalidHeaderValue(err)
    }
}

impl From<JsonError> for StorageError {
    fn from(err: JsonError) -> StorageError {
        StorageError::JsonError(err)
    }
}

impl From<String> for StorageError {
    fn from(err: String) -> StorageError {
        StorageError::new(err)
    }
}

impl From<ToStrError> for StorageError {
    fn from(err: ToStrError) -> StorageError {
        StorageError::ToStrError(err)
    }
}

impl From<ReqwestError> for StorageError {
    fn from(err: ReqwestError) -> StorageError {
        StorageError::HttpError(err)
    }
}

#[test]
fn test_request_error_display() {
    let e = StorageError::RequestError {
        method: "POST".into(),
        path: "/api/types/metricRealTimeQuery/instances".into(),
        payload: Some(r#"{"interval":10}"#.into()),
        status: 422,
    };
    assert_eq!(
        e.to_string(),
        r#"POST /api/types/metricRealTimeQuery/instances failed with status 422, payload: {"interval":10}"#
    );
    assert_eq!(e.status(), Some(422));

    let v = StorageError::ValidationError("username must be specified".into());
    assert_eq!(v.status(), None);
    assert_eq!(v.to_string(), "username must be specified");
}
