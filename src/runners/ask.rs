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

//! `ask_password`, `ask_confirm` and `ask_input`.

use crate::command::Command;
use crate::command::RunnerResult;
use crate::error::RunnerError;
use crate::runners::CommandRunner;
use crate::runtime::Runtime;
use serde_json::Value;

pub struct AskRunner;

/// What to show the user, taken from a string input or a
/// `{prompt|title, message}` mapping.
struct Prompt {
  title: Option<String>,
  message: Option<String>,
}

impl Prompt {
  fn from_input(input: &Value) -> Self {
    match input {
      Value::String(s) => Prompt {
        title: None,
        message: Some(s.clone()),
      },
      Value::Object(map) => {
        let field = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
        Prompt {
          title: field("prompt").or_else(|| field("title")),
          message: field("message"),
        }
      }
      _ => Prompt {
        title: None,
        message: None,
      },
    }
  }

  /// Single-line prompt text, preferring the title.
  fn line(&self, default: &str) -> String {
    self
      .title
      .clone()
      .or_else(|| self.message.clone())
      .unwrap_or_else(|| default.to_string())
  }
}

impl CommandRunner for AskRunner {
  fn name(&self) -> &'static str {
    "ask"
  }

  fn matches(&self, command: &Command) -> bool {
    command.name().starts_with("ask_")
  }

  fn run(&self, command: &Command, runtime: &Runtime) -> Result<RunnerResult, RunnerError> {
    let prompt = Prompt::from_input(command.comm());
    let dialog = runtime.dialog();

    match command.name().strip_prefix("ask_").unwrap_or_default() {
      "password" => {
        let secret = dialog
          .ask_for_password(&prompt.line("Password"))
          .map_err(RunnerError::Dialog)?;
        Ok(match secret {
          Some(secret) => RunnerResult::ok(secret),
          None => RunnerResult::new(false, Value::Null),
        })
      }
      "confirm" => {
        let title = prompt.title.clone().unwrap_or_else(|| "Confirm".to_string());
        let message = prompt.message.clone().unwrap_or_default();
        let decision = dialog
          .ask_for_confirm_with_message(&title, &message)
          .map_err(RunnerError::Dialog)?;
        // Outside a condition, any answer is a successful prompt.
        let success = if command.as_condition() {
          decision == Some(true)
        } else {
          decision.is_some()
        };
        Ok(RunnerResult::new(
          success,
          decision.map_or(Value::Null, Value::Bool),
        ))
      }
      "input" => {
        let answer = dialog
          .ask_for_input_with_prompt(&prompt.line("Input"))
          .map_err(RunnerError::Dialog)?;
        Ok(RunnerResult::ok(answer))
      }
      other => Err(RunnerError::command(format!(
        "Unknown ask command `ask_{other}`, expected ask_password, ask_confirm or ask_input"
      ))),
    }
  }
}
