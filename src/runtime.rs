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
use crate::config::Settings;
use crate::dialog::Dialog;
use crate::dialog::TerminalDialog;
use crate::error::RunnerError;
use crate::library::Library;
use crate::runners::PackageManager;
use crate::runners::Runners;
use crate::runners::ShellPackageManager;
use crate::section;
use crate::shell::Shell;
use crate::template::JinjaRenderer;
use crate::template::TemplateRenderer;
use serde_json::Value;
use std::collections::BTreeMap;

/// Owns the runner and processor registries and the collaborators runners
/// delegate to.
///
/// Configure it (register runners, processors, snippets) before dispatching.
/// Nothing here is synchronized; a runtime belongs to one thread.
pub struct Runtime {
  runners: Runners,
  shell: Shell,
  dialog: Box<dyn Dialog>,
  renderer: Box<dyn TemplateRenderer>,
  library: Library,
  package_managers: BTreeMap<String, Box<dyn PackageManager>>,
}

impl Default for Runtime {
  fn default() -> Self {
    Runtime {
      runners: Runners::default(),
      shell: Shell::default(),
      dialog: Box::new(TerminalDialog::default()),
      renderer: Box::new(JinjaRenderer::default()),
      library: Library::default(),
      package_managers: BTreeMap::new(),
    }
  }
}

impl Runtime {
  /// A runtime with the built-in runners, wired to `settings`.
  pub fn from_settings(settings: &Settings) -> Self {
    let mut runtime = Runtime {
      shell: Shell::with_env(settings.env.clone()),
      ..Default::default()
    };
    for (name, spec) in &settings.package_managers {
      runtime.register_package_manager(
        name.clone(),
        ShellPackageManager::new(spec.check.clone(), spec.install.clone()),
      );
    }
    runtime
  }

  pub fn with_dialog(mut self, dialog: impl Dialog + 'static) -> Self {
    self.dialog = Box::new(dialog);
    self
  }

  pub fn with_renderer(mut self, renderer: impl TemplateRenderer + 'static) -> Self {
    self.renderer = Box::new(renderer);
    self
  }

  pub fn runners_mut(&mut self) -> &mut Runners {
    &mut self.runners
  }

  pub fn shell(&self) -> &Shell {
    &self.shell
  }

  pub fn shell_mut(&mut self) -> &mut Shell {
    &mut self.shell
  }

  pub fn dialog(&self) -> &dyn Dialog {
    self.dialog.as_ref()
  }

  pub fn renderer(&self) -> &dyn TemplateRenderer {
    self.renderer.as_ref()
  }

  pub fn library(&self) -> &Library {
    &self.library
  }

  pub fn library_mut(&mut self) -> &mut Library {
    &mut self.library
  }

  pub fn register_package_manager(
    &mut self,
    name: impl Into<String>,
    manager: impl PackageManager + 'static,
  ) {
    self.package_managers.insert(name.into(), Box::new(manager));
  }

  pub fn package_manager(&self, name: &str) -> Option<&dyn PackageManager> {
    self.package_managers.get(name).map(|m| m.as_ref())
  }

  /// Runs `command` with the first runner that matches it.
  ///
  /// Runner errors are returned untouched.
  pub fn dispatch(&self, command: Command) -> Result<RunnerResult, RunnerError> {
    let Some(runner) = self.runners.find(&command) else {
      return Err(RunnerError::Dispatch {
        name: command.name().to_string(),
      });
    };

    let span = tracing::debug_span!("dispatch", command = %command.name(), runner = runner.name());
    let _enter = span.enter();
    runner.run(&command, self)
  }

  /// Formats and dispatches every entry of `section` with `kwargs` as the
  /// substitution context.
  pub fn run_section(&self, section: &[Value], kwargs: &Kwargs) -> Result<RunnerResult, RunnerError> {
    section::run_section(self, section, kwargs)
  }
}
