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

//! Verification harness for database destination connectors.
//!
//! A harness owns one disposable database instance for the duration of a test,
//! hands out valid and invalid connection configuration for the connector under
//! test, and reads back whatever the connector wrote.
//!
//! # Example
//!
//! ```ignore
//! use destination_harness::harness::{
//!     DestinationTestEnvironment, HarnessConfig, PostgresDestinationFixture, TestDestinationEnv,
//! };
//!
//! #[tokio::test]
//! async fn connector_writes_users() {
//!     let env = TestDestinationEnv::new().unwrap();
//!     let config = HarnessConfig::default();
//!     let fixture = PostgresDestinationFixture::setup(&env, &config).await.unwrap();
//!
//!     // run the connector with fixture.config().to_json() ...
//!
//!     let rows = fixture.retrieve_records(&env, "users").await.unwrap();
//!     assert_eq!(rows.len(), 3);
//!
//!     fixture.tear_down(&env).await.unwrap();
//! }
//! ```

mod config;
mod connection;
mod env;
mod error;
mod fixture;
pub mod fixtures;
mod logging;
mod records;

pub use config::{
    DEFAULT_CONFIG, ENV_PREFIX, HarnessConfig, PoolConfig, PostgresConfig, parse_default_config,
};
pub use connection::ConnectionConfig;
pub use env::TestDestinationEnv;
pub use error::HarnessError;
pub use fixture::{DestinationTestEnvironment, with_environment, with_environment_context};
pub use fixtures::PostgresDestinationFixture;
pub use logging::init_test_logging;
pub use records::{RetrievedRecord, quote_identifier};
