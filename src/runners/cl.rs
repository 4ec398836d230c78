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
use crate::error::RunnerError;
use crate::runners::CommandRunner;
use crate::runtime::Runtime;
use crate::shell::RunOptions;
use crate::shell::wrap_for_scls;
use tracing::Level;

/// `cl` runs a shell command logged at debug level.
///
/// Modifier letters after `cl_` adjust that: `i` logs at info level and `s`
/// keeps the command text out of the logs, e.g. `cl_i`, `cl_s`, `cl_is`.
pub struct ClRunner;

impl ClRunner {
  fn modifiers(name: &str) -> Option<&str> {
    match name.strip_prefix("cl")? {
      "" => Some(""),
      rest => rest
        .strip_prefix('_')
        .filter(|m| !m.is_empty() && m.chars().all(|c| matches!(c, 'i' | 's'))),
    }
  }
}

impl CommandRunner for ClRunner {
  fn name(&self) -> &'static str {
    "cl"
  }

  fn matches(&self, command: &Command) -> bool {
    Self::modifiers(command.name()).is_some()
  }

  fn run(&self, command: &Command, runtime: &Runtime) -> Result<RunnerResult, RunnerError> {
    let modifiers = Self::modifiers(command.name()).unwrap_or_default();
    let mut opts = RunOptions::at(if modifiers.contains('i') {
      Level::INFO
    } else {
      Level::DEBUG
    });
    if modifiers.contains('s') {
      opts = opts.secret();
    }
    let cmd = wrap_for_scls(&command.comm_str()?, &command.scls());

    let output = runtime.shell().run_command(&cmd, &opts)?;
    Ok(RunnerResult::ok(output))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::command::Kwargs;
  use crate::command::SCLS;
  use serde_json::json;
  use tracing_test::traced_test;

  fn cl(name: &str, cmd: &str) -> Command {
    Command::new(name, json!(cmd), true, json!(cmd), Kwargs::new())
  }

  #[test]
  fn command_passes() {
    let res = ClRunner.run(&cl("cl", "true"), &Runtime::default()).unwrap();
    assert_eq!(res, RunnerResult::ok(""));
  }

  #[test]
  fn command_fails_with_run_error() {
    let err = ClRunner
      .run(&cl("cl", "false"), &Runtime::default())
      .unwrap_err();
    assert!(matches!(err, RunnerError::Run(ref f) if f.status == 1));
  }

  #[test]
  #[traced_test]
  fn logs_command_at_debug() {
    ClRunner.run(&cl("cl", "id"), &Runtime::default()).unwrap();
    logs_assert(|lines: &[&str]| {
      lines
        .iter()
        .find(|l| l.contains("DEBUG") && l.ends_with(": id"))
        .map(|_| ())
        .ok_or_else(|| "no debug-level `id` line".to_string())
    });
  }

  #[test]
  #[traced_test]
  fn logs_command_at_info_if_asked() {
    ClRunner.run(&cl("cl_i", "id"), &Runtime::default()).unwrap();
    logs_assert(|lines: &[&str]| {
      lines
        .iter()
        .find(|l| l.contains(" INFO ") && l.ends_with(": id"))
        .map(|_| ())
        .ok_or_else(|| "no info-level `id` line".to_string())
    });
  }

  #[test]
  #[traced_test]
  fn wraps_command_for_active_scls() {
    let mut kwargs = Kwargs::new();
    kwargs.insert(SCLS.to_string(), json!([["enable", "foo"]]));
    let c = Command::new("cl", json!("ls"), true, json!("ls"), kwargs);
    // `scl` itself is usually not installed; only the wrapping matters here.
    let _ = ClRunner.run(&c, &Runtime::default());
    assert!(logs_contain("scl enable foo - << DA_SCL_EOF"));
  }

  #[test]
  fn modifier_letters() {
    for name in ["cl", "cl_i", "cl_s", "cl_is", "cl_si"] {
      assert!(ClRunner.matches(&cl(name, "true")), "{name}");
    }
    for name in ["cl_", "cl_x", "cl_ix", "clear", "c"] {
      assert!(!ClRunner.matches(&cl(name, "true")), "{name}");
    }
  }

  #[test]
  #[traced_test]
  fn secret_modifier_hides_command_text() {
    ClRunner
      .run(&cl("cl_is", "echo hunter2 > /dev/null"), &Runtime::default())
      .unwrap();
    assert!(logs_contain("LOGGING PREVENTED FOR SECURITY REASONS"));
    assert!(!logs_contain("hunter2"));
  }
}
