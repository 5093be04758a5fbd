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

use super::container::PostgresContainer;
use crate::harness::config::HarnessConfig;
use crate::harness::connection::ConnectionConfig;
use crate::harness::env::TestDestinationEnv;
use crate::harness::error::HarnessError;
use crate::harness::fixture::DestinationTestEnvironment;
use crate::harness::records::{RetrievedRecord, fetch_records, retrieval_query};
use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::{debug, error, info};

/// PostgreSQL destination harness.
///
/// Owns one container and one connection pool. The pool is opened in `setup`,
/// reused by every retrieval and closed in `tear_down` before the container stops.
pub struct PostgresDestinationFixture {
    container: PostgresContainer,
    pool: Pool<Postgres>,
    invalid_password: String,
    inserted_at_column: String,
}

impl PostgresDestinationFixture {
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    pub fn schema(&self) -> &str {
        &self.container.connection().schema
    }

    /// Whether the stream's table exists in the configured schema.
    pub async fn table_exists(&self, stream: &str) -> Result<bool, HarnessError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_schema = $1 AND table_name = $2)",
        )
        .bind(self.schema())
        .bind(stream)
        .fetch_one(&self.pool)
        .await
        .map_err(|source| HarnessError::DataAccess {
            stream: stream.to_owned(),
            source,
        })?;
        Ok(exists)
    }
}

#[async_trait]
impl DestinationTestEnvironment for PostgresDestinationFixture {
    async fn setup(
        env: &TestDestinationEnv,
        config: &HarnessConfig,
    ) -> Result<Self, HarnessError> {
        config.validate()?;
        debug!(
            "Setting up PostgreSQL destination harness, local root: {}",
            env.local_root().display()
        );
        let container = PostgresContainer::start(config).await?;
        let pool = match container.create_pool(&config.pool).await {
            Ok(pool) => pool,
            Err(error) => {
                if let Err(teardown_error) = container.stop().await {
                    error!("Failed to release container after setup error: {teardown_error}");
                }
                return Err(error);
            }
        };

        info!(
            "PostgreSQL destination harness is running with config: {}",
            container.connection()
        );
        Ok(Self {
            container,
            pool,
            invalid_password: config.invalid_password.clone(),
            inserted_at_column: config.inserted_at_column.clone(),
        })
    }

    fn config(&self) -> ConnectionConfig {
        self.container.connection().clone()
    }

    fn invalid_config(&self) -> ConnectionConfig {
        self.container
            .connection()
            .with_password(self.invalid_password.as_str())
    }

    async fn retrieve_records(
        &self,
        _env: &TestDestinationEnv,
        stream: &str,
    ) -> Result<Vec<RetrievedRecord>, HarnessError> {
        let query = retrieval_query(self.schema(), stream, &self.inserted_at_column)?;
        let records = fetch_records(&self.pool, &query, stream).await?;
        debug!(
            "Retrieved {} records from {}.{}",
            records.len(),
            self.schema(),
            stream
        );
        Ok(records)
    }

    async fn tear_down(self, _env: &TestDestinationEnv) -> Result<(), HarnessError> {
        info!("Tearing down PostgreSQL destination harness...");
        self.pool.close().await;
        self.container.stop().await.inspect_err(|error| {
            error!("Failed to tear down PostgreSQL destination harness: {error}");
        })
    }
}
