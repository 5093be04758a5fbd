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

use crate::harness::config::{HarnessConfig, PoolConfig};
use crate::harness::connection::ConnectionConfig;
use crate::harness::error::HarnessError;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use testcontainers_modules::{
    postgres,
    testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner},
};
use tracing::{info, warn};

const POSTGRES_PORT: u16 = 5432;

/// Disposable PostgreSQL container.
///
/// The container is removed when this value is dropped, `stop` only makes the
/// shutdown explicit and observable.
pub struct PostgresContainer {
    container: ContainerAsync<postgres::Postgres>,
    connection: ConnectionConfig,
}

impl PostgresContainer {
    /// Starts the pinned image and returns once PostgreSQL accepts connections.
    pub async fn start(config: &HarnessConfig) -> Result<Self, HarnessError> {
        let image_reference = config.image_reference();
        let postgres_config = &config.postgres;
        info!("Starting {image_reference} container...");

        let container = postgres::Postgres::default()
            .with_db_name(&postgres_config.database)
            .with_user(&postgres_config.username)
            .with_password(&postgres_config.password)
            .with_name(postgres_config.image.as_str())
            .with_tag(postgres_config.tag.as_str())
            .with_startup_timeout(*postgres_config.startup_timeout)
            .start()
            .await
            .map_err(|source| HarnessError::ContainerStart {
                image: image_reference.clone(),
                source,
            })?;

        let host = container
            .get_host()
            .await
            .map_err(|source| HarnessError::ContainerStart {
                image: image_reference.clone(),
                source,
            })?;
        let port = container
            .get_host_port_ipv4(POSTGRES_PORT)
            .await
            .map_err(|source| HarnessError::ContainerStart {
                image: image_reference.clone(),
                source,
            })?;

        let connection = ConnectionConfig {
            host: host.to_string(),
            username: postgres_config.username.clone(),
            password: postgres_config.password.clone(),
            schema: postgres_config.schema.clone(),
            port,
            database: postgres_config.database.clone(),
        };
        info!(
            "Container {image_reference} with ID: {} is ready at {}",
            container.id(),
            connection.address()
        );

        Ok(Self {
            container,
            connection,
        })
    }

    pub fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }

    pub async fn create_pool(&self, config: &PoolConfig) -> Result<Pool<Postgres>, HarnessError> {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(*config.acquire_timeout)
            .connect_with(self.connection.connect_options())
            .await
            .map_err(|source| HarnessError::Connection {
                address: self.connection.address(),
                source,
            })
    }

    /// Stops and removes the container.
    pub async fn stop(self) -> Result<(), HarnessError> {
        let id = self.container.id().to_owned();
        if let Err(error) = self.container.stop().await {
            warn!("Failed to stop container with ID: {id}: {error}");
        }
        self.container
            .rm()
            .await
            .map_err(|error| HarnessError::Teardown(format!("container {id}: {error}")))?;
        info!("Removed container with ID: {id}");
        Ok(())
    }
}
