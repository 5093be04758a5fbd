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

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use std::fmt::{Display, Formatter};

/// Connection configuration handed to the connector under test.
///
/// Serializes to the flat mapping `host`, `username`, `password`, `schema`,
/// `port`, `database` expected by destination connectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub schema: String,
    pub port: u16,
    pub database: String,
}

impl ConnectionConfig {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "host": self.host,
            "username": self.username,
            "password": self.password,
            "schema": self.schema,
            "port": self.port,
            "database": self.database,
        })
    }

    /// Same configuration with only the password replaced.
    pub fn with_password(&self, password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            ..self.clone()
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
    }
}

impl Display for ConnectionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ host: {}, username: {}, password: {}, schema: {}, port: {}, database: {} }}",
            self.host,
            self.username,
            if !self.password.is_empty() {
                "****"
            } else {
                ""
            },
            self.schema,
            self.port,
            self.database
        )
    }
}
