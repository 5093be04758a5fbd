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

use std::io;
use testcontainers_modules::testcontainers::TestcontainersError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Failed to load harness configuration: {0}")]
    Config(Box<figment::Error>),
    #[error("Invalid harness configuration for '{key}': {reason}")]
    InvalidConfig { key: &'static str, reason: String },
    #[error("Failed to start {image} container: {source}")]
    ContainerStart {
        image: String,
        #[source]
        source: TestcontainersError,
    },
    #[error("Failed to connect to database at {address}: {source}")]
    Connection {
        address: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("Failed to retrieve records of stream '{stream}': {source}")]
    DataAccess {
        stream: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("Invalid stream name {stream:?}: {reason}")]
    InvalidStreamName { stream: String, reason: &'static str },
    #[error("Teardown failed: {0}")]
    Teardown(String),
    #[error("Destination error: {0}")]
    Destination(#[from] destination_sdk::Error),
    #[error("Acceptance case {case} failed: {message}")]
    Assertion { case: String, message: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl HarnessError {
    /// Whether record retrieval failed, either in the database or because the
    /// stream name cannot name a table.
    pub fn is_data_access(&self) -> bool {
        matches!(
            self,
            HarnessError::DataAccess { .. } | HarnessError::InvalidStreamName { .. }
        )
    }
}

impl From<figment::Error> for HarnessError {
    fn from(error: figment::Error) -> Self {
        HarnessError::Config(Box::new(error))
    }
}
