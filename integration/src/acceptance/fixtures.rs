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

use destination_sdk::{ConfiguredCatalog, DestinationRecord};
use serde_json::{Value, json};

pub const EXCHANGE_RATE_STREAM: &str = "exchange_rate";
pub const USERS_STREAM: &str = "users";
pub const EMPTY_STREAM: &str = "empty_stream";

/// Catalog plus the records written for it during a sync.
#[derive(Debug, Clone)]
pub struct TestCatalog {
    pub catalog: ConfiguredCatalog,
    pub records: Vec<DestinationRecord>,
}

impl TestCatalog {
    pub fn new(catalog: ConfiguredCatalog, records: Vec<DestinationRecord>) -> Self {
        Self { catalog, records }
    }

    /// Data of the records written to `stream`, in write order.
    pub fn expected(&self, stream: &str) -> Vec<&Value> {
        self.records
            .iter()
            .filter(|record| record.stream == stream)
            .map(|record| &record.data)
            .collect()
    }

    /// Streams of the catalog without any record.
    pub fn empty_streams(&self) -> Vec<&str> {
        self.catalog
            .stream_names()
            .filter(|stream| !self.records.iter().any(|record| record.stream == *stream))
            .collect()
    }
}

/// Two populated streams and one stream without records.
pub fn sample_catalog() -> TestCatalog {
    let catalog = ConfiguredCatalog::new([EXCHANGE_RATE_STREAM, USERS_STREAM, EMPTY_STREAM]);
    let records = vec![
        DestinationRecord::new(
            EXCHANGE_RATE_STREAM,
            json!({"id": 1, "currency": "USD", "date": "2020-08-29", "HKD": 2.0, "NZD": 0.7}),
        ),
        DestinationRecord::new(
            USERS_STREAM,
            json!({"id": 1, "name": "Alice", "active": true}),
        ),
        DestinationRecord::new(
            EXCHANGE_RATE_STREAM,
            json!({"id": 2, "currency": "EUR", "date": "2020-08-30", "HKD": 10.5, "NZD": 1.14}),
        ),
        DestinationRecord::new(
            USERS_STREAM,
            json!({"id": 2, "name": "Bob", "active": false}),
        ),
        DestinationRecord::new(
            USERS_STREAM,
            json!({"id": 3, "name": "Carol", "active": true, "tags": ["admin", "ops"]}),
        ),
        DestinationRecord::new(
            EXCHANGE_RATE_STREAM,
            json!({"id": 3, "currency": "GBP", "date": "2020-08-31", "HKD": 11.2, "NZD": 1.9}),
        ),
    ];
    TestCatalog::new(catalog, records)
}
