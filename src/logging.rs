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
use anyhow::Result;
use std::env;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Emits a `tracing` event at a level only known at runtime.
macro_rules! log_at {
  ($level:expr, $($arg:tt)+) => {
    match $level {
      ::tracing::Level::ERROR => ::tracing::error!($($arg)+),
      ::tracing::Level::WARN => ::tracing::warn!($($arg)+),
      ::tracing::Level::INFO => ::tracing::info!($($arg)+),
      ::tracing::Level::DEBUG => ::tracing::debug!($($arg)+),
      _ => ::tracing::trace!($($arg)+),
    }
  };
}
pub(crate) use log_at;

/// Sets up the global tracing subscriber.
///
/// Reads the `DEVRUN_LOG_FILE` env var, falling back to `log_file`.
/// - If either is set, logs to that file.
/// - Otherwise, logs to stderr.
///
/// Log level is controlled by the `RUST_LOG` env var (e.g., `RUST_LOG=debug`).
/// The returned guard must be held for as long as file logging should flush.
pub fn setup_tracing(log_file: Option<PathBuf>) -> Result<Option<WorkerGuard>> {
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  let log_file = match env::var("DEVRUN_LOG_FILE") {
    Ok(path) if !path.is_empty() => Some(PathBuf::from(path)),
    _ => log_file,
  };

  match log_file {
    Some(path) => {
      let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
      let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid log file path: {}", path.display()))?;

      let file_appender = tracing_appender::rolling::never(dir, file_name);
      let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

      tracing_subscriber::registry()
        .with(env_filter)
        .with(
          fmt::layer()
            .with_writer(non_blocking_writer)
            .with_ansi(false), // No ANSI colors in files
        )
        .try_init()?;
      Ok(Some(guard))
    }
    None => {
      tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
      Ok(None)
    }
  }
}
