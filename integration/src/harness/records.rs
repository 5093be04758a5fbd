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
use sqlx::types::Json;
use sqlx::{Pool, Postgres};

/// Longest identifier PostgreSQL keeps intact (`NAMEDATALEN - 1`); longer ones are truncated.
const MAX_IDENTIFIER_BYTES: usize = 63;

/// One retrieved row: column name to value.
pub type RetrievedRecord = serde_json::Map<String, serde_json::Value>;

/// Double-quotes a PostgreSQL identifier, doubling any embedded quote.
pub fn quote_identifier(name: &str) -> Result<String, HarnessError> {
    if name.is_empty() {
        return Err(HarnessError::InvalidStreamName {
            stream: name.to_owned(),
            reason: "name cannot be empty",
        });
    }
    if name.contains('\0') {
        return Err(HarnessError::InvalidStreamName {
            stream: name.to_owned(),
            reason: "name cannot contain NUL characters",
        });
    }
    if name.len() > MAX_IDENTIFIER_BYTES {
        return Err(HarnessError::InvalidStreamName {
            stream: name.to_owned(),
            reason: "name is longer than 63 bytes",
        });
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Builds the query returning every row of `schema.table` as one flat JSON object,
/// oldest insertion first.
pub(crate) fn retrieval_query(
    schema: &str,
    table: &str,
    inserted_at_column: &str,
) -> Result<String, HarnessError> {
    let schema = quote_identifier(schema)?;
    let table = quote_identifier(table)?;
    let inserted_at = quote_identifier(inserted_at_column)?;
    Ok(format!(
        "SELECT row_to_json(t.*) FROM {schema}.{table} AS t ORDER BY t.{inserted_at} ASC"
    ))
}

pub(crate) async fn fetch_records(
    pool: &Pool<Postgres>,
    query: &str,
    stream: &str,
) -> Result<Vec<RetrievedRecord>, HarnessError> {
    let rows: Vec<Json<RetrievedRecord>> = sqlx::query_scalar(query)
        .fetch_all(pool)
        .await
        .map_err(|source| HarnessError::DataAccess {
            stream: stream.to_owned(),
            source,
        })?;
    Ok(rows.into_iter().map(|Json(record)| record).collect())
}
