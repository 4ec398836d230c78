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
use std::path::PathBuf;
use thiserror::Error;

/// A spawned command exited with a non-zero status.
///
/// `output` is the combined stdout/stderr collected up to the failure,
/// newline-joined, with the trailing newline stripped.
#[derive(Error, Debug)]
#[error("Command `{command}` failed with exit status {status}:\n{output}")]
pub struct ExecutionFailure {
  pub command: String,
  pub status: i32,
  pub output: String,
}

/// Errors raised while dispatching or running a command.
///
/// Dispatch never rewraps these: whatever a runner returns reaches the caller
/// as-is.
#[derive(Error, Debug)]
pub enum RunnerError {
  #[error("No command runner matches command `{name}`")]
  Dispatch { name: String },

  #[error(transparent)]
  Run(#[from] ExecutionFailure),

  /// Malformed command data, such as an unknown log level letter.
  #[error("{0}")]
  Command(String),

  /// The user declined or walked away from a required confirmation.
  #[error("{0}")]
  Aborted(String),

  #[error("Dialog failed")]
  Dialog(#[source] std::io::Error),

  #[error("Template rendering failed")]
  Template(#[from] TemplateError),
}

impl RunnerError {
  pub(crate) fn command(msg: impl Into<String>) -> Self {
    RunnerError::Command(msg.into())
  }
}

/// Errors related to template lookup and rendering (src/template.rs).
#[derive(Error, Debug)]
pub enum TemplateError {
  #[error("Template `{name}` not found in search path {search_path:?}")]
  NotFound {
    name: String,
    search_path: Vec<PathBuf>,
  },

  #[error("Failed to render template")]
  Render(#[from] minijinja::Error),

  #[error("Failed to read template {path}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to write rendered template to {path}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Errors related to configuration resolution (src/config.rs).
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Failed to extract settings")]
  Extract(#[from] Box<figment::Error>),

  #[error("Failed to read section file: {path}")]
  ReadSections {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse section file: {path}")]
  ParseSections {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("Section `{section}` in {path} must be a list of commands")]
  SectionNotList { path: PathBuf, section: String },

  #[error("Invalid --var `{0}`, expected KEY=VALUE")]
  InvalidVar(String),
}
