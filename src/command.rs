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
use crate::error::RunnerError;
use crate::runtime::Runtime;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Side-channel context handed to a command: substitution variables plus
/// reserved keys such as [`FILES_DIR`] and [`SCLS`].
pub type Kwargs = BTreeMap<String, Value>;

/// Kwarg holding the template search path (a list of directory strings).
pub const FILES_DIR: &str = "__files_dir__";

/// Kwarg holding the active software-collection scopes (a list of token lists).
pub const SCLS: &str = "__scls__";

/// One unit of work, consumed by a single dispatch.
///
/// `raw_input` is the input before variable substitution and `comm` the
/// formatted input most runners act on. The two only ever differ in their
/// substituted string leaves.
#[derive(Debug, Clone)]
pub struct Command {
  name: String,
  raw_input: Value,
  as_condition: bool,
  comm: Value,
  kwargs: Kwargs,
}

impl Command {
  pub fn new(
    name: impl Into<String>,
    raw_input: Value,
    as_condition: bool,
    comm: Value,
    kwargs: Kwargs,
  ) -> Self {
    let name = name.into();
    debug_assert!(!name.is_empty(), "command name must not be empty");
    Command {
      name,
      raw_input,
      as_condition,
      comm,
      kwargs,
    }
  }

  /// The command verb, including modifier suffixes (`cl_i`) or scope tokens
  /// (`scl enable foo`).
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn raw_input(&self) -> &Value {
    &self.raw_input
  }

  /// Whether the caller evaluates this command as a condition. Runners with a
  /// boolean outcome (`ask_confirm`) then report it through `success`.
  pub fn as_condition(&self) -> bool {
    self.as_condition
  }

  pub fn comm(&self) -> &Value {
    &self.comm
  }

  pub fn kwargs(&self) -> &Kwargs {
    &self.kwargs
  }

  /// `comm` as a string. Scalars are rendered, structures are rejected.
  pub fn comm_str(&self) -> Result<String, RunnerError> {
    match &self.comm {
      Value::String(s) => Ok(s.clone()),
      Value::Number(n) => Ok(n.to_string()),
      Value::Bool(b) => Ok(b.to_string()),
      other => Err(RunnerError::command(format!(
        "Command `{}` expects a string input, got: {}",
        self.name, other
      ))),
    }
  }

  /// The template search path carried in [`FILES_DIR`].
  pub fn files_dir(&self) -> Vec<PathBuf> {
    match self.kwargs.get(FILES_DIR) {
      Some(Value::Array(dirs)) => dirs
        .iter()
        .filter_map(Value::as_str)
        .map(PathBuf::from)
        .collect(),
      Some(Value::String(dir)) => vec![PathBuf::from(dir)],
      _ => Vec::new(),
    }
  }

  /// The software-collection scopes carried in [`SCLS`], outermost first.
  pub fn scls(&self) -> Vec<Vec<String>> {
    let Some(Value::Array(scopes)) = self.kwargs.get(SCLS) else {
      return Vec::new();
    };
    scopes
      .iter()
      .filter_map(Value::as_array)
      .map(|tokens| {
        tokens
          .iter()
          .filter_map(Value::as_str)
          .map(str::to_string)
          .collect()
      })
      .collect()
  }

  /// Dispatches this command through the runtime's runner registry.
  pub fn run(self, runtime: &Runtime) -> Result<RunnerResult, RunnerError> {
    runtime.dispatch(self)
  }
}

/// The outcome of running a command: pass/fail plus a runner-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerResult {
  pub success: bool,
  pub value: Value,
}

impl RunnerResult {
  pub fn new(success: bool, value: impl Into<Value>) -> Self {
    RunnerResult {
      success,
      value: value.into(),
    }
  }

  pub fn ok(value: impl Into<Value>) -> Self {
    Self::new(true, value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn comm_str_rejects_structures() {
    let c = Command::new("cl", json!(["ls"]), true, json!(["ls"]), Kwargs::new());
    assert!(matches!(c.comm_str(), Err(RunnerError::Command(_))));
  }

  #[test]
  fn files_dir_accepts_list_or_single_string() {
    let mut kwargs = Kwargs::new();
    kwargs.insert(FILES_DIR.to_string(), json!(["/a", "/b"]));
    let c = Command::new("jinja_render", Value::Null, false, Value::Null, kwargs);
    assert_eq!(c.files_dir(), vec![PathBuf::from("/a"), PathBuf::from("/b")]);

    let mut kwargs = Kwargs::new();
    kwargs.insert(FILES_DIR.to_string(), json!("/only"));
    let c = Command::new("jinja_render", Value::Null, false, Value::Null, kwargs);
    assert_eq!(c.files_dir(), vec![PathBuf::from("/only")]);
  }

  #[test]
  fn scls_reads_nested_token_lists() {
    let mut kwargs = Kwargs::new();
    kwargs.insert(SCLS.to_string(), json!([["enable", "foo"], ["enable", "bar"]]));
    let c = Command::new("cl", json!("ls"), true, json!("ls"), kwargs);
    assert_eq!(
      c.scls(),
      vec![
        vec!["enable".to_string(), "foo".to_string()],
        vec!["enable".to_string(), "bar".to_string()]
      ]
    );
  }
}
