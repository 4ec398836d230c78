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

//! Command runners and the ordered registry dispatch searches.
//!
//! Each runner lives in its own module. To add one:
//! 1. Implement [`CommandRunner`] for a new type.
//! 2. Register it with [`Runners::register`], or add it to
//!    [`Runners::default`] if it is built in.
//!
//! Dispatch picks the first registered runner whose
//! [`matches`](CommandRunner::matches) returns true, so registration order
//! decides between overlapping runners.

pub mod ask;
pub mod call;
pub mod cl;
pub mod dependencies;
pub mod jinja;
pub mod log;
pub mod scl;

use crate::command::Command;
use crate::command::RunnerResult;
use crate::error::RunnerError;
use crate::runtime::Runtime;
use std::fmt;

pub use ask::AskRunner;
pub use call::CallRunner;
pub use cl::ClRunner;
pub use dependencies::DependenciesRunner;
pub use dependencies::PackageManager;
pub use dependencies::ShellPackageManager;
pub use jinja::Jinja2Runner;
pub use log::LogRunner;
pub use scl::SclRunner;

/// A handler owning a subset of command names.
pub trait CommandRunner {
  /// Short name used in logs.
  fn name(&self) -> &'static str;

  fn matches(&self, command: &Command) -> bool;

  fn run(&self, command: &Command, runtime: &Runtime) -> Result<RunnerResult, RunnerError>;
}

/// Ordered runner registry.
pub struct Runners {
  runners: Vec<Box<dyn CommandRunner>>,
}

impl Runners {
  /// A registry with no runners at all.
  pub fn empty() -> Self {
    Runners {
      runners: Vec::new(),
    }
  }

  /// Appends `runner`; it only wins for names no earlier runner matches.
  pub fn register<R: CommandRunner + 'static>(&mut self, runner: R) {
    self.runners.push(Box::new(runner));
  }

  /// The first runner matching `command`.
  pub fn find(&self, command: &Command) -> Option<&dyn CommandRunner> {
    self
      .runners
      .iter()
      .find(|r| r.matches(command))
      .map(|r| r.as_ref())
  }

  pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.runners.iter().map(|r| r.name())
  }
}

impl Default for Runners {
  fn default() -> Self {
    let mut runners = Runners::empty();
    runners.register(AskRunner);
    runners.register(CallRunner);
    runners.register(ClRunner);
    runners.register(DependenciesRunner);
    runners.register(Jinja2Runner);
    runners.register(LogRunner);
    runners.register(SclRunner);
    runners
  }
}

impl fmt::Debug for Runners {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.names()).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::command::Kwargs;
  use serde_json::Value;

  struct Echo(&'static str);

  impl CommandRunner for Echo {
    fn name(&self) -> &'static str {
      self.0
    }

    fn matches(&self, command: &Command) -> bool {
      command.name().starts_with("echo")
    }

    fn run(&self, _: &Command, _: &Runtime) -> Result<RunnerResult, RunnerError> {
      Ok(RunnerResult::ok(self.0))
    }
  }

  fn command(name: &str) -> Command {
    Command::new(name, Value::Null, false, Value::Null, Kwargs::new())
  }

  #[test]
  fn first_registered_match_wins() {
    let mut runners = Runners::empty();
    runners.register(Echo("first"));
    runners.register(Echo("second"));
    assert_eq!(runners.find(&command("echo")).unwrap().name(), "first");
    assert!(runners.find(&command("other")).is_none());
  }

  #[test]
  fn builtin_order() {
    let names: Vec<_> = Runners::default().names().collect();
    assert_eq!(
      names,
      vec!["ask", "call", "cl", "dependencies", "jinja_render", "log", "scl"]
    );
  }
}
