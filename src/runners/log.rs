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
use crate::logging::log_at;
use crate::runners::CommandRunner;
use crate::runtime::Runtime;
use crate::vars::to_display;
use tracing::Level;

/// `log_i`, `log_w`, `log_e` and `log_d` emit their input as a log record.
pub struct LogRunner;

impl CommandRunner for LogRunner {
  fn name(&self) -> &'static str {
    "log"
  }

  fn matches(&self, command: &Command) -> bool {
    command.name().starts_with("log_")
  }

  fn run(&self, command: &Command, _runtime: &Runtime) -> Result<RunnerResult, RunnerError> {
    let level = match command.name().strip_prefix("log_").unwrap_or_default() {
      "i" => Level::INFO,
      "w" => Level::WARN,
      "e" => Level::ERROR,
      "d" => Level::DEBUG,
      other => {
        return Err(RunnerError::command(format!(
          "Unknown logging level `{other}` in `{}`, expected one of i, w, e, d",
          command.name()
        )));
      }
    };

    let message = to_display(command.comm());
    log_at!(level, "{}", message);
    Ok(RunnerResult::ok(message))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::command::Kwargs;
  use serde_json::json;
  use tracing_test::traced_test;

  fn log(name: &str, msg: &str) -> Command {
    Command::new(name, json!(msg), true, json!(msg), Kwargs::new())
  }

  #[test]
  #[traced_test]
  fn emits_one_record_at_mapped_level() {
    let res = LogRunner.run(&log("log_w", "foo!"), &Runtime::default()).unwrap();
    assert_eq!(res, RunnerResult::ok("foo!"));
    logs_assert(|lines: &[&str]| {
      let hits: Vec<_> = lines.iter().filter(|l| l.ends_with("foo!")).collect();
      match hits.as_slice() {
        [line] if line.contains(" WARN ") => Ok(()),
        _ => Err(format!("expected one warning record, got {hits:?}")),
      }
    });
  }

  #[test]
  fn unknown_level_is_a_command_error() {
    let err = LogRunner
      .run(&log("log_b", "bar"), &Runtime::default())
      .unwrap_err();
    assert!(matches!(err, RunnerError::Command(_)));
  }
}
