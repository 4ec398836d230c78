// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use crate::command::Command;
use crate::command::RunnerResult;
use crate::command::SCLS;
use crate::error::RunnerError;
use crate::runners::CommandRunner;
use crate::runtime::Runtime;
use serde_json::Value;

/// `scl <op> <collection>...` runs its nested commands inside a software
/// collection scope.
///
/// The scope tokens are only known here, so the nested commands are taken
/// from the raw input and formatted again with [`SCLS`] extended by this
/// scope.
pub struct SclRunner;

impl SclRunner {
  fn scope_tokens(name: &str) -> Option<Vec<&str>> {
    let mut tokens = name.split_whitespace();
    if tokens.next() != Some("scl") {
      return None;
    }
    let scope: Vec<&str> = tokens.collect();
    (!scope.is_empty()).then_some(scope)
  }
}

impl CommandRunner for SclRunner {
  fn name(&self) -> &'static str {
    "scl"
  }

  fn matches(&self, command: &Command) -> bool {
    Self::scope_tokens(command.name()).is_some()
  }

  fn run(&self, command: &Command, runtime: &Runtime) -> Result<RunnerResult, RunnerError> {
    let scope = Self::scope_tokens(command.name())
      .ok_or_else(|| RunnerError::command(format!("Malformed scl command `{}`", command.name())))?;
    let Value::Array(section) = command.raw_input() else {
      return Err(RunnerError::command(format!(
        "`{}` expects a list of commands",
        command.name()
      )));
    };

    let mut kwargs = command.kwargs().clone();
    let mut scls = match kwargs.remove(SCLS) {
      Some(Value::Array(scls)) => scls,
      _ => Vec::new(),
    };
    scls.push(Value::from(scope));
    kwargs.insert(SCLS.to_string(), Value::Array(scls));

    tracing::debug!(scope = %command.name(), "Entering software collection");
    runtime.run_section(section, &kwargs)
  }
}
