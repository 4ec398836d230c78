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

//! `call` and `use`: run another section of this assistant, a
//! superassistant, or a snippet.

use crate::command::Command;
use crate::command::RunnerResult;
use crate::error::RunnerError;
use crate::library::ASSISTANT_LEVEL;
use crate::library::DEFAULT_SECTION;
use crate::runners::CommandRunner;
use crate::runtime::Runtime;
use serde_json::Value;

/// Kwarg counting the `call`s enclosing the current command.
pub const CALL_DEPTH: &str = "__call_depth__";

/// Deepest allowed nesting of `call`s, which bounds recursive sections.
pub const MAX_CALL_DEPTH: u64 = 64;

pub struct CallRunner;

impl CallRunner {
  /// A bare name calls a snippet; `self`, `super` and anything qualified
  /// with them calls an assistant section.
  pub fn is_snippet_call(target: &str) -> bool {
    !["self", "super"]
      .iter()
      .any(|q| target == *q || target.strip_prefix(q).is_some_and(|rest| rest.starts_with('.')))
  }
}

impl CommandRunner for CallRunner {
  fn name(&self) -> &'static str {
    "call"
  }

  fn matches(&self, command: &Command) -> bool {
    matches!(command.name(), "call" | "use")
  }

  fn run(&self, command: &Command, runtime: &Runtime) -> Result<RunnerResult, RunnerError> {
    let target = command.comm_str()?;
    let target = target.trim();
    let library = runtime.library();
    let level = command
      .kwargs()
      .get(ASSISTANT_LEVEL)
      .and_then(Value::as_u64)
      .unwrap_or(0) as usize;

    let depth = command
      .kwargs()
      .get(CALL_DEPTH)
      .and_then(Value::as_u64)
      .unwrap_or(0);
    if depth >= MAX_CALL_DEPTH {
      return Err(RunnerError::command(format!(
        "Calls nested deeper than {MAX_CALL_DEPTH} levels at `{target}`, is a section calling itself?"
      )));
    }

    let not_found = || RunnerError::command(format!("Couldn't find section to call: `{target}`"));

    let (section, level) = if Self::is_snippet_call(target) {
      let (snippet, section) = target.split_once('.').unwrap_or((target, DEFAULT_SECTION));
      let section = library
        .snippet(snippet)
        .and_then(|s| s.section(section))
        .ok_or_else(not_found)?;
      (section, level)
    } else {
      let (qualifier, section) = target.split_once('.').unwrap_or((target, DEFAULT_SECTION));
      if qualifier == "self" {
        let section = library
          .assistant_section(level, section)
          .ok_or_else(not_found)?;
        (section, level)
      } else {
        let (level, section) = library.super_section(level, section).ok_or_else(not_found)?;
        (section, level)
      }
    };

    tracing::debug!(call = target, assistant_level = level, "Calling section");
    let mut kwargs = command.kwargs().clone();
    kwargs.insert(ASSISTANT_LEVEL.to_string(), Value::from(level));
    kwargs.insert(CALL_DEPTH.to_string(), Value::from(depth + 1));
    runtime.run_section(section, &kwargs)
  }
}
