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

use crate::harness::HarnessError;
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum AcceptanceCase {
    CheckConnection,
    CheckConnectionInvalidCredentials,
    Sync,
    EmptyStream,
    MissingStream,
}

#[derive(Debug)]
pub enum CaseResult {
    Passed,
    Skipped(String),
    Failed(HarnessError),
}

#[derive(Debug)]
pub struct CaseOutcome {
    pub case: AcceptanceCase,
    pub result: CaseResult,
}

#[derive(Debug, Default)]
pub struct AcceptanceReport {
    pub outcomes: Vec<CaseOutcome>,
}

impl AcceptanceReport {
    pub fn push(&mut self, case: AcceptanceCase, result: CaseResult) {
        self.outcomes.push(CaseOutcome { case, result });
    }

    pub fn passed(&self) -> usize {
        self.count(|result| matches!(result, CaseResult::Passed))
    }

    pub fn skipped(&self) -> usize {
        self.count(|result| matches!(result, CaseResult::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|result| matches!(result, CaseResult::Failed(_)))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failed_cases(&self) -> Vec<AcceptanceCase> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.result, CaseResult::Failed(_)))
            .map(|outcome| outcome.case)
            .collect()
    }

    /// Returns the error of the first failed case, if any.
    pub fn into_result(self) -> Result<(), HarnessError> {
        match self
            .outcomes
            .into_iter()
            .find_map(|outcome| match outcome.result {
                CaseResult::Failed(error) => Some(error),
                _ => None,
            }) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn count(&self, predicate: impl Fn(&CaseResult) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| predicate(&outcome.result))
            .count()
    }
}
