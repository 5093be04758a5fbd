/* Licensed to the Apache Software Foundation (ASF) under one
 * or more contributor license agreements.  See the NOTICE file
 * distributed with this work for additional information
 * regarding copyright ownership.  The ASF licenses this file
 * to you under the Apache License, Version 2.0 (the
 * "License"); you may not use this file except in compliance
 * with the License.  You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing,
 * software distributed under the License is distributed on an
 * "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
 * KIND, either express or implied.  See the License for the
 * specific language governing permissions and limitations
 * under the License.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// The Destination trait defines the interface for a destination connector, responsible for writing the records of the configured streams into an external store.
/// The connector receives its connection configuration as a JSON mapping and is expected to validate it on its own.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Invoked to verify that the store is reachable with the provided configuration.
    /// Authentication and connectivity problems must be reported as `ConnectionStatus::Failed`, never as a panic.
    async fn check(&self, config: &serde_json::Value) -> ConnectionStatus;

    /// Invoked with the full set of records for a sync. Every stream of the catalog must exist
    /// in the store once this returns, including streams without any records.
    async fn write(
        &self,
        config: &serde_json::Value,
        catalog: &ConfiguredCatalog,
        records: Vec<DestinationRecord>,
    ) -> Result<(), Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display, IntoStaticStr)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    #[strum(to_string = "SUCCEEDED")]
    Succeeded,
    #[strum(to_string = "FAILED")]
    Failed { message: String },
}

impl ConnectionStatus {
    pub fn failed(message: impl Into<String>) -> Self {
        ConnectionStatus::Failed {
            message: message.into(),
        }
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, ConnectionStatus::Succeeded)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguredCatalog {
    pub streams: Vec<ConfiguredStream>,
}

impl ConfiguredCatalog {
    pub fn new(streams: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            streams: streams
                .into_iter()
                .map(|name| ConfiguredStream { name: name.into() })
                .collect(),
        }
    }

    pub fn stream_names(&self) -> impl Iterator<Item = &str> {
        self.streams.iter().map(|stream| stream.name.as_str())
    }

    pub fn contains(&self, stream: &str) -> bool {
        self.stream_names().any(|name| name == stream)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguredStream {
    pub name: String,
}

/// A single record emitted by a source for one stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationRecord {
    pub stream: String,
    pub data: serde_json::Value,
    pub emitted_at: DateTime<Utc>,
}

impl DestinationRecord {
    pub fn new(stream: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            stream: stream.into(),
            data,
            emitted_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Write error: {0}")]
    Write(String),
    #[error("Record for stream '{0}' is not part of the configured catalog")]
    UnknownStream(String),
}
