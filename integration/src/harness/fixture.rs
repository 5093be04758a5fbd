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

use crate::harness::config::HarnessConfig;
use crate::harness::connection::ConnectionConfig;
use crate::harness::env::TestDestinationEnv;
use crate::harness::error::HarnessError;
use crate::harness::records::RetrievedRecord;
use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::error;

/// Contract between a destination harness and the runner driving it.
///
/// A value of the implementing type exists only while its database instance is
/// running: `setup` returns it once the instance accepts connections and
/// `tear_down` consumes it. Dropping it without `tear_down` must still release
/// the instance.
#[async_trait]
pub trait DestinationTestEnvironment: Sized + Send + Sync {
    /// Start the database instance and wait until it accepts connections.
    async fn setup(env: &TestDestinationEnv, config: &HarnessConfig)
    -> Result<Self, HarnessError>;

    /// Connection configuration with the live credentials of the instance.
    fn config(&self) -> ConnectionConfig;

    /// Connection configuration identical to `config` except for a wrong password.
    fn invalid_config(&self) -> ConnectionConfig;

    /// All rows of the stream's table, ordered by insertion time.
    async fn retrieve_records(
        &self,
        env: &TestDestinationEnv,
        stream: &str,
    ) -> Result<Vec<RetrievedRecord>, HarnessError>;

    /// Stop the instance and release everything the harness owns.
    async fn tear_down(self, env: &TestDestinationEnv) -> Result<(), HarnessError>;
}

/// Runs `test` against a freshly set up environment and always tears it down.
///
/// The error of `test` takes precedence over a teardown error, which is then only logged.
pub async fn with_environment<E, T, F>(config: &HarnessConfig, test: F) -> Result<T, HarnessError>
where
    E: DestinationTestEnvironment,
    F: for<'a> FnOnce(&'a E, &'a TestDestinationEnv) -> BoxFuture<'a, Result<T, HarnessError>>,
{
    with_environment_context::<_, E, _, _>(config, &(), move |_, environment, env| {
        test(environment, env)
    })
    .await
}

/// Same as [`with_environment`], lending `context` to `test` for the lifetime of the environment.
pub async fn with_environment_context<C, E, T, F>(
    config: &HarnessConfig,
    context: &C,
    test: F,
) -> Result<T, HarnessError>
where
    C: ?Sized,
    E: DestinationTestEnvironment,
    F: for<'a> FnOnce(
        &'a C,
        &'a E,
        &'a TestDestinationEnv,
    ) -> BoxFuture<'a, Result<T, HarnessError>>,
{
    let env = TestDestinationEnv::new()?;
    let environment = E::setup(&env, config).await?;
    let result = test(context, &environment, &env).await;
    let teardown = environment.tear_down(&env).await;
    finish(result, teardown)
}

fn finish<T>(
    result: Result<T, HarnessError>,
    teardown: Result<(), HarnessError>,
) -> Result<T, HarnessError> {
    match (result, teardown) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(teardown_error)) => Err(teardown_error),
        (Err(error), Ok(())) => Err(error),
        (Err(error), Err(teardown_error)) => {
            error!("Teardown failed after an earlier error: {teardown_error}");
            Err(error)
        }
    }
}
