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
use crate::command::Kwargs;
use crate::command::RunnerResult;
use crate::error::RunnerError;
use crate::runtime::Runtime;
use crate::vars::format_value;
use serde_json::Value;

/// Runs each entry of `section` in order, stopping at the first error.
///
/// Returns the last command's result, or `(false, "")` for an empty section.
pub fn run_section(
  runtime: &Runtime,
  section: &[Value],
  kwargs: &Kwargs,
) -> Result<RunnerResult, RunnerError> {
  let mut last = RunnerResult::new(false, "");
  for entry in section {
    let command = command_from_entry(entry, kwargs, false)?;
    last = runtime.dispatch(command)?;
  }
  Ok(last)
}

/// Builds a fresh [`Command`] from a `{<name>: <input>}` entry, formatting the
/// input with `kwargs`. Section entries run as statements; `as_condition` is
/// for callers that branch on the result.
pub fn command_from_entry(
  entry: &Value,
  kwargs: &Kwargs,
  as_condition: bool,
) -> Result<Command, RunnerError> {
  let Value::Object(map) = entry else {
    return Err(RunnerError::command(format!(
      "Expected a `{{command: input}}` mapping, got: {entry}"
    )));
  };
  let mut items = map.iter();
  let (Some((name, raw_input)), None) = (items.next(), items.next()) else {
    return Err(RunnerError::command(format!(
      "Expected exactly one command per entry, got: {entry}"
    )));
  };
  if name.is_empty() {
    return Err(RunnerError::command("Command name must not be empty"));
  }

  let comm = format_value(raw_input, kwargs);
  Ok(Command::new(
    name.clone(),
    raw_input.clone(),
    as_condition,
    comm,
    kwargs.clone(),
  ))
}
