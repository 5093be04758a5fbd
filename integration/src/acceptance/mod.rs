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

//! Acceptance runner driving a destination connector through a harness.
//!
//! Every case runs against its own freshly set up environment, which is torn
//! down again even when the case fails.

mod compare;
pub mod fixtures;
mod report;


pub use compare::AcceptanceConfig;
pub use fixtures::{TestCatalog, sample_catalog};
pub use report::{AcceptanceCase, AcceptanceReport, CaseOutcome, CaseResult};

use crate::harness::{
    DestinationTestEnvironment, HarnessConfig, HarnessError, TestDestinationEnv,
    with_environment_context,
};
use destination_sdk::{ConnectionStatus, Destination};
use futures::FutureExt;
use strum::IntoEnumIterator;
use tracing::{error, info, warn};

pub struct DestinationAcceptance<D: Destination> {
    destination: D,
    harness_config: HarnessConfig,
    config: AcceptanceConfig,
    catalog: TestCatalog,
}

impl<D: Destination> DestinationAcceptance<D> {
    pub fn new(destination: D, harness_config: HarnessConfig) -> Self {
        Self {
            destination,
            harness_config,
            config: AcceptanceConfig::default(),
            catalog: sample_catalog(),
        }
    }

    pub fn with_config(mut self, config: AcceptanceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_catalog(mut self, catalog: TestCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn destination(&self) -> &D {
        &self.destination
    }

    /// Runs every case, each against a fresh environment.
    pub async fn run_all<E: DestinationTestEnvironment>(&self) -> AcceptanceReport {
        let mut report = AcceptanceReport::default();
        for case in AcceptanceCase::iter() {
            let result = self.run::<E>(case).await;
            match &result {
                CaseResult::Passed => info!("Acceptance case {case} passed"),
                CaseResult::Skipped(reason) => warn!("Acceptance case {case} skipped: {reason}"),
                CaseResult::Failed(error) => error!("Acceptance case {case} failed: {error}"),
            }
            report.push(case, result);
        }
        info!(
            "Acceptance run finished, passed: {}, skipped: {}, failed: {}",
            report.passed(),
            report.skipped(),
            report.failed()
        );
        report
    }

    /// Runs a single case: setup, the case itself, and a teardown that always happens.
    pub async fn run<E: DestinationTestEnvironment>(&self, case: AcceptanceCase) -> CaseResult {
        let result = with_environment_context::<_, E, _, _>(
            &self.harness_config,
            self,
            move |acceptance, environment, env| {
                acceptance.execute(case, environment, env).boxed()
            },
        )
        .await;
        result.unwrap_or_else(CaseResult::Failed)
    }

    async fn execute<E: DestinationTestEnvironment>(
        &self,
        case: AcceptanceCase,
        environment: &E,
        env: &TestDestinationEnv,
    ) -> Result<CaseResult, HarnessError> {
        match case {
            AcceptanceCase::CheckConnection => {
                let status = self.destination.check(&environment.config().to_json()).await;
                match status {
                    ConnectionStatus::Succeeded => Ok(CaseResult::Passed),
                    ConnectionStatus::Failed { message } => Err(assertion(
                        case,
                        format!("valid configuration was rejected: {message}"),
                    )),
                }
            }
            AcceptanceCase::CheckConnectionInvalidCredentials => {
                let valid = environment.config();
                let invalid = environment.invalid_config();
                if invalid.password == valid.password
                    || invalid.with_password(valid.password.as_str()) != valid
                {
                    return Err(assertion(
                        case,
                        "invalid configuration must differ from the valid one only by password",
                    ));
                }

                match self.destination.check(&invalid.to_json()).await {
                    ConnectionStatus::Failed { .. } => Ok(CaseResult::Passed),
                    ConnectionStatus::Succeeded => Err(assertion(
                        case,
                        "connection with an invalid password succeeded",
                    )),
                }
            }
            AcceptanceCase::Sync => {
                self.write(environment).await?;
                for stream in self.catalog.catalog.stream_names() {
                    let actual = environment.retrieve_records(env, stream).await?;
                    let expected = self.catalog.expected(stream);
                    self.config
                        .compare(stream, &expected, &actual)
                        .map_err(|message| assertion(case, message))?;
                }
                Ok(CaseResult::Passed)
            }
            AcceptanceCase::EmptyStream => {
                let empty_streams = self.catalog.empty_streams();
                if empty_streams.is_empty() {
                    return Ok(CaseResult::Skipped(
                        "catalog has no stream without records".to_owned(),
                    ));
                }

                self.write(environment).await?;
                for stream in empty_streams {
                    let actual = environment.retrieve_records(env, stream).await?;
                    if !actual.is_empty() {
                        return Err(assertion(
                            case,
                            format!(
                                "stream '{stream}' should be empty but has {} records",
                                actual.len()
                            ),
                        ));
                    }
                }
                Ok(CaseResult::Passed)
            }
            AcceptanceCase::MissingStream => {
                let stream = &self.config.missing_stream;
                if self.catalog.catalog.contains(stream) {
                    return Err(assertion(
                        case,
                        format!("stream '{stream}' is part of the catalog"),
                    ));
                }

                self.write(environment).await?;
                match environment.retrieve_records(env, stream).await {
                    Err(error) if error.is_data_access() => Ok(CaseResult::Passed),
                    Err(error) => Err(error),
                    Ok(records) => Err(assertion(
                        case,
                        format!(
                            "retrieving missing stream '{stream}' returned {} records instead of failing",
                            records.len()
                        ),
                    )),
                }
            }
        }
    }

    async fn write<E: DestinationTestEnvironment>(
        &self,
        environment: &E,
    ) -> Result<(), HarnessError> {
        self.destination
            .write(
                &environment.config().to_json(),
                &self.catalog.catalog,
                self.catalog.records.clone(),
            )
            .await?;
        Ok(())
    }
}

fn assertion(case: AcceptanceCase, message: impl Into<String>) -> HarnessError {
    HarnessError::Assertion {
        case: case.to_string(),
        message: message.into(),
    }
}
