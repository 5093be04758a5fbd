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

use super::{
    PostgresTestDestination, TEST_RECORD_COUNT, USERS_STREAM, setup_fixture, user_records,
};
use destination_harness::harness::{DestinationTestEnvironment, HarnessError};
use destination_sdk::{ConfiguredCatalog, Destination};
use sqlx::{Connection, PgConnection};

const INVALID_PASSWORD_SQLSTATE: &str = "28P01";

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_running_instance_config_should_connect_with_live_credentials() {
    let (env, fixture) = setup_fixture().await;

    let config = fixture.config();
    assert_eq!(config, fixture.config(), "Config must be stable");
    assert_eq!(config.username, "test");
    assert_eq!(config.password, "test");
    assert_eq!(config.database, "test");
    assert_eq!(config.schema, "public");

    let mut connection = PgConnection::connect_with(&config.connect_options())
        .await
        .expect("Failed to connect with valid config");
    let one: i32 = sqlx::query_scalar("SELECT 1")
        .fetch_one(&mut connection)
        .await
        .expect("Failed to query");
    assert_eq!(one, 1);
    connection.close().await.expect("Failed to close connection");

    fixture.tear_down(&env).await.expect("Failed to tear down");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_invalid_config_connection_should_fail_authentication() {
    let (env, fixture) = setup_fixture().await;

    let valid = fixture.config();
    let invalid = fixture.invalid_config();
    assert_eq!(invalid.password, "wrong password");
    assert_eq!(invalid.with_password(valid.password.as_str()), valid);

    let error = PgConnection::connect_with(&invalid.connect_options())
        .await
        .expect_err("Connection with a wrong password must fail");
    let code = error
        .as_database_error()
        .and_then(|e| e.code())
        .map(|code| code.into_owned());
    assert_eq!(code.as_deref(), Some(INVALID_PASSWORD_SQLSTATE));

    let status = PostgresTestDestination.check(&invalid.to_json()).await;
    assert!(!status.is_succeeded());

    fixture.tear_down(&env).await.expect("Failed to tear down");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_written_rows_records_should_be_retrieved_in_insertion_order() {
    let (env, fixture) = setup_fixture().await;
    let records = user_records(TEST_RECORD_COUNT);

    PostgresTestDestination
        .write(
            &fixture.config().to_json(),
            &ConfiguredCatalog::new([USERS_STREAM]),
            records.clone(),
        )
        .await
        .expect("Failed to write records");

    let rows = fixture
        .retrieve_records(&env, USERS_STREAM)
        .await
        .expect("Failed to retrieve records");

    assert_eq!(
        rows.len(),
        TEST_RECORD_COUNT,
        "Expected {TEST_RECORD_COUNT} rows in PostgreSQL table"
    );
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row["data"], records[i].data, "Data mismatch at row {i}");
        for column in ["ab_id", "emitted_at", "inserted_at"] {
            assert!(row.contains_key(column), "Missing {column} at row {i}");
        }
    }

    fixture.tear_down(&env).await.expect("Failed to tear down");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_rows_inserted_out_of_order_records_should_be_sorted_by_inserted_at() {
    let (env, fixture) = setup_fixture().await;
    let pool = fixture.pool();

    sqlx::query(
        "CREATE TABLE public.events (
            name TEXT NOT NULL,
            inserted_at TIMESTAMP WITH TIME ZONE NOT NULL
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create table");
    sqlx::query(
        "INSERT INTO public.events (name, inserted_at) VALUES
            ('third', '2021-01-03T00:00:00Z'),
            ('first', '2021-01-01T00:00:00Z'),
            ('second', '2021-01-02T00:00:00Z')",
    )
    .execute(pool)
    .await
    .expect("Failed to insert rows");

    let rows = fixture
        .retrieve_records(&env, "events")
        .await
        .expect("Failed to retrieve records");

    let names: Vec<&str> = rows
        .iter()
        .map(|row| row["name"].as_str().expect("name must be a string"))
        .collect();
    assert_eq!(names, vec!["first", "second", "third"]);

    fixture.tear_down(&env).await.expect("Failed to tear down");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_column_named_like_row_alias_records_should_contain_whole_rows() {
    let (env, fixture) = setup_fixture().await;
    let pool = fixture.pool();

    sqlx::query(
        "CREATE TABLE public.measurements (
            t INTEGER NOT NULL,
            inserted_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT clock_timestamp()
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create table");
    sqlx::query("INSERT INTO public.measurements (t) VALUES (7), (8)")
        .execute(pool)
        .await
        .expect("Failed to insert rows");

    let rows = fixture
        .retrieve_records(&env, "measurements")
        .await
        .expect("Failed to retrieve records");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["t"], 7);
    assert_eq!(rows[1]["t"], 8);
    assert!(rows.iter().all(|row| row.contains_key("inserted_at")));

    fixture.tear_down(&env).await.expect("Failed to tear down");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_empty_table_records_should_be_empty() {
    let (env, fixture) = setup_fixture().await;

    PostgresTestDestination
        .write(
            &fixture.config().to_json(),
            &ConfiguredCatalog::new([USERS_STREAM]),
            Vec::new(),
        )
        .await
        .expect("Failed to write empty catalog");
    assert!(
        fixture
            .table_exists(USERS_STREAM)
            .await
            .expect("Failed to check table")
    );

    let rows = fixture
        .retrieve_records(&env, USERS_STREAM)
        .await
        .expect("Retrieving an empty table must not fail");
    assert!(rows.is_empty());

    fixture.tear_down(&env).await.expect("Failed to tear down");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_missing_table_retrieval_should_fail_with_data_access_error() {
    let (env, fixture) = setup_fixture().await;

    let error = fixture
        .retrieve_records(&env, "table_that_does_not_exist")
        .await
        .expect_err("Retrieving a missing table must fail");
    assert!(matches!(
        error,
        HarnessError::DataAccess { ref stream, .. } if stream == "table_that_does_not_exist"
    ));

    let error = fixture
        .retrieve_records(&env, "")
        .await
        .expect_err("Retrieving an empty stream name must fail");
    assert!(error.is_data_access(), "Unexpected error: {error}");

    fixture.tear_down(&env).await.expect("Failed to tear down");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_repeated_retrievals_pool_should_be_reused() {
    let (env, fixture) = setup_fixture().await;
    PostgresTestDestination
        .write(
            &fixture.config().to_json(),
            &ConfiguredCatalog::new([USERS_STREAM]),
            user_records(1),
        )
        .await
        .expect("Failed to write records");

    for _ in 0..20 {
        let rows = fixture
            .retrieve_records(&env, USERS_STREAM)
            .await
            .expect("Failed to retrieve records");
        assert_eq!(rows.len(), 1);
    }
    assert!(fixture.pool().size() <= 2, "Pool must stay within its bound");

    fixture.tear_down(&env).await.expect("Failed to tear down");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn given_torn_down_instance_connections_should_fail() {
    let (env, fixture) = setup_fixture().await;
    let config = fixture.config();

    fixture.tear_down(&env).await.expect("Failed to tear down");

    let result = PgConnection::connect_with(&config.connect_options()).await;
    assert!(result.is_err(), "Instance must be gone after teardown");
}
