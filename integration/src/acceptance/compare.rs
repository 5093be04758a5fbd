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

use crate::harness::RetrievedRecord;
use serde_json::Value;

/// How retrieved rows are matched against the records that were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceConfig {
    /// Column holding the record data as a JSON document. When unset the whole
    /// row minus `metadata_columns` is compared.
    pub data_column: Option<String>,
    /// Columns added by the connector that are never part of the record data.
    pub metadata_columns: Vec<String>,
    /// Stream that is never written; retrieving it must fail.
    pub missing_stream: String,
}

impl Default for AcceptanceConfig {
    fn default() -> Self {
        Self {
            data_column: Some("data".to_owned()),
            metadata_columns: vec![
                "ab_id".to_owned(),
                "emitted_at".to_owned(),
                "inserted_at".to_owned(),
            ],
            missing_stream: "stream_never_written".to_owned(),
        }
    }
}

impl AcceptanceConfig {
    /// Extracts the record data out of a retrieved row.
    pub fn project(&self, row: &RetrievedRecord) -> Value {
        match &self.data_column {
            Some(column) => row.get(column).cloned().unwrap_or(Value::Null),
            None => Value::Object(
                row.iter()
                    .filter(|(column, _)| !self.metadata_columns.contains(column))
                    .map(|(column, value)| (column.clone(), value.clone()))
                    .collect(),
            ),
        }
    }

    /// Checks that `actual` holds exactly the `expected` records, in the same order.
    pub fn compare(
        &self,
        stream: &str,
        expected: &[&Value],
        actual: &[RetrievedRecord],
    ) -> Result<(), String> {
        if expected.len() != actual.len() {
            return Err(format!(
                "stream '{stream}': expected {} records but retrieved {}",
                expected.len(),
                actual.len()
            ));
        }

        for (index, (expected, row)) in expected.iter().zip(actual).enumerate() {
            let projected = self.project(row);
            if projected != **expected {
                return Err(format!(
                    "stream '{stream}': record {index} mismatch, expected {expected} but retrieved {projected}"
                ));
            }
        }
        Ok(())
    }
}
