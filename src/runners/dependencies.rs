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

//! `dependencies`: install packages through named package managers after
//! the user confirms the list.

use crate::command::Command;
use crate::command::RunnerResult;
use crate::error::RunnerError;
use crate::runners::CommandRunner;
use crate::runtime::Runtime;
use crate::shell::RunOptions;
use crate::shell::Shell;
use serde_json::Value;
use tracing::Level;

/// A package installation backend.
pub trait PackageManager {
  /// The subset of `packages` that is not installed yet.
  fn missing(&self, shell: &Shell, packages: &[String]) -> Result<Vec<String>, RunnerError>;

  fn install(&self, shell: &Shell, packages: &[String]) -> Result<(), RunnerError>;
}

/// A package manager driven by two shell command templates, where `{}` is
/// replaced by one package name (`check`) or the space-joined list (`install`).
#[derive(Debug, Clone)]
pub struct ShellPackageManager {
  check: String,
  install: String,
}

impl ShellPackageManager {
  pub fn new(check: impl Into<String>, install: impl Into<String>) -> Self {
    ShellPackageManager {
      check: check.into(),
      install: install.into(),
    }
  }
}

impl PackageManager for ShellPackageManager {
  fn missing(&self, shell: &Shell, packages: &[String]) -> Result<Vec<String>, RunnerError> {
    Ok(
      packages
        .iter()
        .filter(|pkg| {
          shell
            .run_command(&self.check.replace("{}", pkg), &RunOptions::default())
            .is_err()
        })
        .cloned()
        .collect(),
    )
  }

  fn install(&self, shell: &Shell, packages: &[String]) -> Result<(), RunnerError> {
    let cmd = self.install.replace("{}", &packages.join(" "));
    shell.run_command(&cmd, &RunOptions::at(Level::INFO))?;
    Ok(())
  }
}

pub struct DependenciesRunner;

impl DependenciesRunner {
  /// Flattens `{manager: [pkgs]}` or a list of such mappings into
  /// `(manager, pkgs)` pairs, preserving order.
  fn requests(input: &Value) -> Result<Vec<(String, Vec<String>)>, RunnerError> {
    let maps: Vec<&serde_json::Map<String, Value>> = match input {
      Value::Object(map) => vec![map],
      Value::Array(items) => items
        .iter()
        .map(|item| {
          item
            .as_object()
            .ok_or_else(|| RunnerError::command(format!("Invalid dependency entry: {item}")))
        })
        .collect::<Result<_, _>>()?,
      other => {
        return Err(RunnerError::command(format!(
          "`dependencies` expects a mapping of package managers, got: {other}"
        )));
      }
    };

    maps
      .into_iter()
      .flat_map(|map| map.iter())
      .map(|(manager, packages)| {
        let packages = match packages {
          Value::String(pkg) => vec![pkg.clone()],
          Value::Array(pkgs) => pkgs
            .iter()
            .map(|p| {
              p.as_str()
                .map(str::to_string)
                .ok_or_else(|| RunnerError::command(format!("Invalid package name: {p}")))
            })
            .collect::<Result<_, _>>()?,
          other => {
            return Err(RunnerError::command(format!(
              "Invalid package list for `{manager}`: {other}"
            )));
          }
        };
        Ok((manager.clone(), packages))
      })
      .collect()
  }
}

impl CommandRunner for DependenciesRunner {
  fn name(&self) -> &'static str {
    "dependencies"
  }

  fn matches(&self, command: &Command) -> bool {
    command.name() == "dependencies"
  }

  fn run(&self, command: &Command, runtime: &Runtime) -> Result<RunnerResult, RunnerError> {
    let mut installed = Vec::new();

    for (name, packages) in Self::requests(command.comm())? {
      let manager = runtime
        .package_manager(&name)
        .ok_or_else(|| RunnerError::command(format!("Unknown package manager `{name}`")))?;

      let missing = manager.missing(runtime.shell(), &packages)?;
      if missing.is_empty() {
        tracing::debug!(manager = %name, "All packages already installed");
        continue;
      }

      let confirmed = runtime
        .dialog()
        .ask_for_package_list_confirm(&format!("Installing packages via {name}"), &missing)
        .map_err(RunnerError::Dialog)?;
      if confirmed != Some(true) {
        return Err(RunnerError::Aborted(format!(
          "Installation of {} declined",
          missing.join(", ")
        )));
      }

      manager.install(runtime.shell(), &missing)?;
      tracing::info!(manager = %name, "Installed {}", missing.join(", "));
      installed.extend(missing);
    }

    Ok(RunnerResult::ok(installed))
  }
}
