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

use super::{PostgresTestDestination, TEST_RECORD_COUNT, USERS_STREAM, user_records};
use destination_harness::acceptance::{AcceptanceCase, DestinationAcceptance};
use destination_harness::harness::{
    DestinationTestEnvironment, HarnessConfig, PostgresDestinationFixture, init_test_logging,
    with_environment,
};
use destination_sdk::{ConfiguredCatalog, Destination};
use futures::FutureExt;

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_postgres_destination_all_acceptance_cases_should_pass() {
    init_test_logging();
    let acceptance = DestinationAcceptance::new(PostgresTestDestination, HarnessConfig::default());

    let report = acceptance
        .run_all::<PostgresDestinationFixture>()
        .await;

    assert!(
        report.is_success(),
        "Failed cases: {:?}",
        report.failed_cases()
    );
    assert_eq!(report.passed(), 5);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_running_instance_invalid_credentials_case_should_pass() {
    init_test_logging();
    let acceptance = DestinationAcceptance::new(PostgresTestDestination, HarnessConfig::default());

    let result = acceptance
        .run::<PostgresDestinationFixture>(AcceptanceCase::CheckConnectionInvalidCredentials)
        .await;

    assert!(
        matches!(result, destination_harness::acceptance::CaseResult::Passed),
        "Unexpected result: {result:?}"
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_written_users_environment_should_retrieve_them() {
    init_test_logging();

    let rows = with_environment::<PostgresDestinationFixture, _, _>(
        &HarnessConfig::default(),
        |fixture, env| {
            async move {
                PostgresTestDestination
                    .write(
                        &fixture.config().to_json(),
                        &ConfiguredCatalog::new([USERS_STREAM]),
                        user_records(TEST_RECORD_COUNT),
                    )
                    .await?;
                fixture.retrieve_records(env, USERS_STREAM).await
            }
            .boxed()
        },
    )
    .await
    .expect("Environment test failed");

    assert_eq!(rows.len(), TEST_RECORD_COUNT);
    assert_eq!(rows[0]["data"]["name"], "user_1");
    assert_eq!(rows[2]["data"]["name"], "user_3");
}
