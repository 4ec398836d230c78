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
use Commands::Exec;
use Commands::Run;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use devrun::cli::Cli;
use devrun::cli::Commands;
use devrun::command::FILES_DIR;
use devrun::command::RunnerResult;
use devrun::config::Settings;
use devrun::config::load_sections;
use devrun::config::parse_input;
use devrun::config::parse_var;
use devrun::logging::setup_tracing;
use devrun::runtime::Runtime;
use devrun::section::command_from_entry;
use devrun::vars::to_display;
use serde_json::Value;
use serde_json::json;

fn main() -> Result<()> {
  let Cli {
    config,
    vars,
    files_dir,
    command,
  } = Cli::parse();

  let mut settings = Settings::load(config.as_deref()).context("Failed to load settings")?;
  let _guard = setup_tracing(settings.log_file.clone())?;

  let main_span = tracing::info_span!("devrun");
  let _enter = main_span.enter();

  let mut search_path = files_dir;
  search_path.append(&mut settings.files_dir);
  settings.files_dir = search_path;
  let mut kwargs = settings.kwargs();
  for var in &vars {
    let (key, value) = parse_var(var)?;
    kwargs.insert(key, value);
  }
  tracing::debug!(files_dir = ?kwargs.get(FILES_DIR), "Resolved settings");

  let mut runtime = Runtime::from_settings(&settings);

  let mut failed_condition = None;
  let result: RunnerResult = match command {
    Exec {
      name,
      input,
      condition,
    } => {
      let input = input.as_deref().map_or(Value::Null, parse_input);
      let command = command_from_entry(&json!({ &name: input }), &kwargs, condition)?;
      let result = runtime.dispatch(command)?;
      if condition && !result.success {
        failed_condition = Some(name);
      }
      result
    }
    Run { file, section } => {
      let assistant = load_sections(&file)?;
      tracing::info!("Running section `{}` of {}", section, assistant.name());

      let commands = assistant
        .section(&section)
        .cloned()
        .with_context(|| format!("No section `{}` in {}", section, file.display()))?;
      runtime.library_mut().set_assistant(assistant);

      runtime.run_section(&commands, &kwargs)?
    }
  };

  let output = to_display(&result.value);
  if !output.is_empty() {
    println!("{}", output);
  }

  if let Some(name) = failed_condition {
    anyhow::bail!("Condition `{}` did not hold", name);
  }
  Ok(())
}
