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
use crate::command::FILES_DIR;
use crate::command::Kwargs;
use crate::error::ConfigError;
use crate::library::Assistant;
use figment::Figment;
use figment::providers::Env;
use figment::providers::Format;
use figment::providers::Json;
use figment::providers::Serialized;
use figment::providers::Toml;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Config file read when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "devrun.toml";

/// Prefix of environment variables overriding settings.
pub const ENV_PREFIX: &str = "DEVRUN_";

/// Shell command templates backing a package manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageManagerSpec {
  pub check: String,
  pub install: String,
}

/// Fully resolved settings.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub log_file: Option<PathBuf>,
  /// Template search path, in lookup order.
  pub files_dir: Vec<PathBuf>,
  /// Extra environment for every spawned command.
  pub env: BTreeMap<String, String>,
  /// Initial substitution variables.
  pub vars: BTreeMap<String, Value>,
  pub package_managers: BTreeMap<String, PackageManagerSpec>,
}

impl Settings {
  /// Layers defaults, the config file and `DEVRUN_*` environment variables.
  ///
  /// A missing config file is not an error; `.json` files are read as JSON,
  /// anything else as TOML.
  pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
    let path = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    let figment = Figment::from(Serialized::defaults(Settings::default()));
    let figment = if path.extension().is_some_and(|ext| ext == "json") {
      figment.merge(Json::file(path))
    } else {
      figment.merge(Toml::file(path))
    };

    figment
      .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
      .extract()
      .map_err(|e| ConfigError::Extract(Box::new(e)))
  }

  /// The initial kwargs for a command: configured variables plus the
  /// template search path.
  pub fn kwargs(&self) -> Kwargs {
    let mut kwargs: Kwargs = self.vars.clone().into_iter().collect();
    let files_dir = self
      .files_dir
      .iter()
      .map(|p| Value::String(p.display().to_string()))
      .collect();
    kwargs.insert(FILES_DIR.to_string(), Value::Array(files_dir));
    kwargs
  }
}

/// Parses a command-line input: JSON when it is valid JSON, otherwise the
/// literal string.
pub fn parse_input(input: &str) -> Value {
  serde_json::from_str(input).unwrap_or_else(|_| Value::String(input.to_string()))
}

/// Parses a `KEY=VALUE` variable.
pub fn parse_var(var: &str) -> Result<(String, Value), ConfigError> {
  match var.split_once('=') {
    Some((key, value)) if !key.is_empty() => Ok((key.to_string(), parse_input(value))),
    _ => Err(ConfigError::InvalidVar(var.to_string())),
  }
}

/// Loads a TOML section file as an assistant named after the file stem.
///
/// Every top-level key is a section: a list of `{<command>: <input>}` tables.
pub fn load_sections(path: &Path) -> Result<Assistant, ConfigError> {
  let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadSections {
    path: path.to_path_buf(),
    source,
  })?;
  let sections: BTreeMap<String, Value> =
    toml::from_str(&content).map_err(|source| ConfigError::ParseSections {
      path: path.to_path_buf(),
      source,
    })?;

  let name = path
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_default();
  sections
    .into_iter()
    .try_fold(Assistant::new(name), |assistant, (section, commands)| {
      match commands {
        Value::Array(commands) => Ok(assistant.with_section(section, commands)),
        _ => Err(ConfigError::SectionNotList {
          path: path.to_path_buf(),
          section,
        }),
      }
    })
}
