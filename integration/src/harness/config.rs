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

use crate::harness::error::HarnessError;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::value::{Dict, Map, Value};
use figment::{Figment, Metadata, Profile, Provider};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

/// Prefix of the environment variables overriding the harness configuration.
/// Nested keys are separated with `__`, e.g. `DESTINATION_HARNESS_POSTGRES__TAG`.
pub const ENV_PREFIX: &str = "DESTINATION_HARNESS_";

/// Annotated default configuration shipped with the crate.
pub const DEFAULT_CONFIG: &str = include_str!("../../config/harness.toml");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub postgres: PostgresConfig,
    pub pool: PoolConfig,
    /// Password placed in the invalid configuration. Must differ from `postgres.password`.
    pub invalid_password: String,
    /// Column holding the insertion timestamp; retrieved records are ordered by it.
    pub inserted_at_column: String,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub image: String,
    pub tag: String,
    pub username: String,
    pub password: String,
    pub database: String,
    pub schema: String,
    #[serde_as(as = "DisplayFromStr")]
    pub startup_timeout: humantime::Duration,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_connections: u32,
    #[serde_as(as = "DisplayFromStr")]
    pub acquire_timeout: humantime::Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            postgres: PostgresConfig::default(),
            pool: PoolConfig::default(),
            invalid_password: "wrong password".to_owned(),
            inserted_at_column: "inserted_at".to_owned(),
        }
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            image: "postgres".to_owned(),
            tag: "13-alpine".to_owned(),
            username: "test".to_owned(),
            password: "test".to_owned(),
            database: "test".to_owned(),
            schema: "public".to_owned(),
            startup_timeout: Duration::from_secs(60).into(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 2,
            acquire_timeout: Duration::from_secs(5).into(),
        }
    }
}

impl HarnessConfig {
    /// Loads the configuration from the built-in defaults, an optional TOML file
    /// and `DESTINATION_HARNESS_*` environment variables, in that order.
    pub fn load(path: Option<&Path>) -> Result<Self, HarnessError> {
        let mut figment = Figment::from(Serialized::defaults(HarnessConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file_exact(path));
        }
        let config: HarnessConfig = figment.merge(HarnessEnvProvider::new()?).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HarnessError> {
        let non_empty = [
            ("postgres.image", &self.postgres.image),
            ("postgres.tag", &self.postgres.tag),
            ("postgres.username", &self.postgres.username),
            ("postgres.database", &self.postgres.database),
            ("postgres.schema", &self.postgres.schema),
            ("inserted_at_column", &self.inserted_at_column),
        ];
        for (key, value) in non_empty {
            if value.trim().is_empty() {
                return Err(HarnessError::InvalidConfig {
                    key,
                    reason: "value cannot be empty".to_owned(),
                });
            }
        }

        if self.pool.max_connections == 0 {
            return Err(HarnessError::InvalidConfig {
                key: "pool.max_connections",
                reason: "at least one connection is required".to_owned(),
            });
        }

        if self.invalid_password == self.postgres.password {
            return Err(HarnessError::InvalidConfig {
                key: "invalid_password",
                reason: "must differ from postgres.password".to_owned(),
            });
        }

        Ok(())
    }

    /// Image reference in the `name:tag` form.
    pub fn image_reference(&self) -> String {
        format!("{}:{}", self.postgres.image, self.postgres.tag)
    }
}

/// `DESTINATION_HARNESS_*` overrides, each typed after the default at the same key,
/// so a numeric tag or password stays a string.
struct HarnessEnvProvider {
    defaults: Dict,
}

impl HarnessEnvProvider {
    fn new() -> Result<Self, figment::Error> {
        let defaults = Serialized::defaults(HarnessConfig::default())
            .data()?
            .remove(&Profile::Default)
            .unwrap_or_default();
        Ok(Self { defaults })
    }

    fn default_at<'a>(dict: &'a Dict, path: &[&str]) -> Option<&'a Value> {
        let (key, rest) = path.split_first()?;
        let value = dict.get(*key)?;
        if rest.is_empty() {
            return Some(value);
        }
        match value {
            Value::Dict(_, inner) => Self::default_at(inner, rest),
            _ => None,
        }
    }

    fn insert(dict: &mut Dict, path: &[&str], value: Value) {
        match path {
            [] => {}
            [key] => {
                dict.insert((*key).to_owned(), value);
            }
            [key, rest @ ..] => {
                let entry = dict
                    .entry((*key).to_owned())
                    .or_insert_with(|| Value::from(Dict::new()));
                if let Value::Dict(_, inner) = entry {
                    Self::insert(inner, rest, value);
                }
            }
        }
    }

    fn parse_value(value: &str) -> Value {
        if value == "true" {
            return Value::from(true);
        }
        if value == "false" {
            return Value::from(false);
        }
        if let Ok(int_val) = value.parse::<i64>() {
            return Value::from(int_val);
        }
        if let Ok(float_val) = value.parse::<f64>() {
            return Value::from(float_val);
        }
        Value::from(value.to_owned())
    }
}

impl Provider for HarnessEnvProvider {
    fn metadata(&self) -> Metadata {
        Metadata::named("destination harness environment variables")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let mut dict = Dict::new();
        for (key, value) in Env::prefixed(ENV_PREFIX).split("__").iter() {
            let key = key.as_str().to_ascii_lowercase();
            let path: Vec<&str> = key.split('.').collect();
            let value = match Self::default_at(&self.defaults, &path) {
                Some(Value::String(..)) => Value::from(value),
                _ => Self::parse_value(&value),
            };
            Self::insert(&mut dict, &path, value);
        }
        Ok(Profile::Default.collect(dict))
    }
}

/// Parses the annotated default configuration bundled with the crate.
pub fn parse_default_config() -> Result<HarnessConfig, HarnessError> {
    let config: HarnessConfig = Figment::from(Toml::string(DEFAULT_CONFIG)).extract()?;
    Ok(config)
}

impl Display for HarnessConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ postgres: {}, pool: {}, invalid_password: ****, inserted_at_column: {} }}",
            self.postgres, self.pool, self.inserted_at_column
        )
    }
}

impl Display for PostgresConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ image: {}:{}, username: {}, password: {}, database: {}, schema: {}, startup_timeout: {} }}",
            self.image,
            self.tag,
            self.username,
            if !self.password.is_empty() {
                "****"
            } else {
                ""
            },
            self.database,
            self.schema,
            self.startup_timeout
        )
    }
}

impl Display for PoolConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ max_connections: {}, acquire_timeout: {} }}",
            self.max_connections, self.acquire_timeout
        )
    }
}
