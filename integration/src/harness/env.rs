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
use std::path::Path;
use tempfile::TempDir;

/// Per-test environment passed to every lifecycle call of a harness.
///
/// Owns a scratch directory the connector under test may write local output to.
/// The directory is removed when the environment is dropped.
#[derive(Debug)]
pub struct TestDestinationEnv {
    local_root: TempDir,
}

impl TestDestinationEnv {
    pub fn new() -> Result<Self, HarnessError> {
        let local_root = tempfile::Builder::new()
            .prefix("destination_test_")
            .tempdir()?;
        Ok(Self { local_root })
    }

    pub fn local_root(&self) -> &Path {
        self.local_root.path()
    }
}
