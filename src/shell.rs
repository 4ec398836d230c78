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

//! The process execution engine.
//!
//! [`Shell::run_command`] spawns one shell command with stdout and stderr
//! merged into a single pipe, streams that pipe line by line while the process
//! runs, then drains whatever is left once it has exited.

use crate::error::ExecutionFailure;
use crate::logging::log_at;
use crate::processors::CommandProcessors;
use std::collections::BTreeMap;
use std::env;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::io::PipeReader;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::process::Child;
use std::process::ExitStatus;
use tracing::Level;

const SECRET_PLACEHOLDER: &str = "LOGGING PREVENTED FOR SECURITY REASONS";

/// Per-invocation options for [`Shell::run_command`].
#[derive(Debug, Clone)]
pub struct RunOptions {
  /// Level the command and its output are logged at.
  pub level: Level,
  /// Extra environment variables for the spawned process.
  pub env: BTreeMap<String, String>,
  /// Log a placeholder instead of the command text.
  pub log_secret: bool,
}

impl Default for RunOptions {
  fn default() -> Self {
    RunOptions {
      level: Level::DEBUG,
      env: BTreeMap::new(),
      log_secret: false,
    }
  }
}

impl RunOptions {
  pub fn at(level: Level) -> Self {
    RunOptions {
      level,
      ..Default::default()
    }
  }

  pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }

  pub fn secret(mut self) -> Self {
    self.log_secret = true;
    self
  }
}

/// Runs shell commands through the registered command processors.
#[derive(Debug, Default)]
pub struct Shell {
  processors: CommandProcessors,
  env: BTreeMap<String, String>,
}

/// Reader states of a running command. `Draining` is entered only once the
/// exit status is known, and performs exactly one residual read.
enum ReadState {
  Running,
  Draining(ExitStatus),
}

impl Shell {
  /// A shell whose spawned commands always receive `env`.
  pub fn with_env(env: BTreeMap<String, String>) -> Self {
    Shell {
      processors: CommandProcessors::default(),
      env,
    }
  }

  pub fn processors(&self) -> &CommandProcessors {
    &self.processors
  }

  pub fn processors_mut(&mut self) -> &mut CommandProcessors {
    &mut self.processors
  }

  /// Runs `cmd` and returns its combined, newline-joined output.
  ///
  /// If the processed command is a bare `cd <dir>`, it is performed in this
  /// process, so the working directory change outlives the call.
  pub fn run_command(&self, cmd: &str, opts: &RunOptions) -> Result<String, ExecutionFailure> {
    let cmd = self.processors.apply(cmd);
    self.log_command(&cmd, opts);

    if let Some(target) = parse_cd(&cmd) {
      return change_dir(&cmd, &target);
    }

    let (status, output) = self.spawn_and_collect(&cmd, opts).map_err(|e| ExecutionFailure {
      command: cmd.clone(),
      status: 127,
      output: e.to_string(),
    })?;

    if status.success() {
      Ok(output)
    } else {
      Err(ExecutionFailure {
        command: cmd,
        status: exit_code(status),
        output,
      })
    }
  }

  fn log_command(&self, cmd: &str, opts: &RunOptions) {
    if opts.log_secret {
      log_at!(opts.level, "{}", SECRET_PLACEHOLDER);
    } else {
      log_at!(opts.level, "{}", cmd);
    }
  }

  fn spawn_and_collect(&self, cmd: &str, opts: &RunOptions) -> io::Result<(ExitStatus, String)> {
    let (reader, writer) = io::pipe()?;

    let mut command = shell_command(cmd);
    command
      .envs(&self.env)
      .envs(&opts.env)
      .stdout(writer.try_clone()?)
      .stderr(writer);

    let mut child = command.spawn()?;
    // Drop our copies of the write end, otherwise the reader never sees EOF.
    drop(command);

    collect_output(&mut child, reader, opts.level)
  }
}

#[cfg(not(target_os = "windows"))]
fn shell_command(cmd: &str) -> std::process::Command {
  let mut command = std::process::Command::new("sh");
  command.arg("-c").arg(cmd);
  command
}

#[cfg(target_os = "windows")]
fn shell_command(cmd: &str) -> std::process::Command {
  let mut command = std::process::Command::new("cmd");
  command.arg("/C").arg(cmd);
  command
}

/// Reads the merged output of `child` until it exits.
///
/// An empty read while the process still looks alive means it closed its
/// output before exiting. That read is not output: we stop polling the pipe
/// and wait for the exit status instead of appending a blank line.
fn collect_output(
  child: &mut Child,
  reader: PipeReader,
  level: Level,
) -> io::Result<(ExitStatus, String)> {
  let mut reader = BufReader::new(reader);
  let mut chunks: Vec<String> = Vec::new();
  let mut state = ReadState::Running;

  let status = loop {
    match state {
      ReadState::Running => {
        if let Some(status) = child.try_wait()? {
          state = ReadState::Draining(status);
          continue;
        }

        let mut buf = Vec::new();
        if reader.read_until(b'\n', &mut buf)? == 0 {
          state = ReadState::Draining(child.wait()?);
          continue;
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.strip_suffix('\n').unwrap_or(&line);
        log_at!(level, "{}", line);
        chunks.push(line.to_string());
      }
      ReadState::Draining(status) => {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        if !buf.is_empty() {
          let rest = String::from_utf8_lossy(&buf);
          let rest = rest.strip_suffix('\n').unwrap_or(&rest);
          for line in rest.lines() {
            log_at!(level, "{}", line);
          }
          chunks.push(rest.to_string());
        }
        break status;
      }
    }
  };

  let mut output = chunks.join("\n");
  if output.ends_with('\n') {
    output.pop();
  }
  Ok((status, output))
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
  use std::os::unix::process::ExitStatusExt;
  status
    .code()
    .or_else(|| status.signal().map(|sig| 128 + sig))
    .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
  status.code().unwrap_or(-1)
}

/// Characters that make the shell expand or chain a command line.
const SHELL_SYNTAX: &[char] = &[
  '$', '`', '*', '?', '[', '{', '&', ';', '|', '<', '>', '(', ')', '\n',
];

/// Returns the target of a bare `cd` command.
///
/// Expansions (other than a leading `~`) and chained commands are left to
/// the shell.
fn parse_cd(cmd: &str) -> Option<PathBuf> {
  if cmd.contains(SHELL_SYNTAX) {
    return None;
  }
  let words = shlex::split(cmd)?;
  match words.as_slice() {
    [cd] if cd == "cd" => dirs::home_dir(),
    [cd, target] if cd == "cd" && target != "-" => expand_home(target),
    _ => None,
  }
}

fn expand_home(target: &str) -> Option<PathBuf> {
  match target.strip_prefix('~') {
    Some("") => dirs::home_dir(),
    Some(rest) if rest.starts_with('/') => {
      dirs::home_dir().map(|home| home.join(rest.trim_start_matches('/')))
    }
    // `~user` is left to the shell.
    Some(_) => None,
    None => Some(PathBuf::from(target)),
  }
}

fn change_dir(cmd: &str, target: &Path) -> Result<String, ExecutionFailure> {
  env::set_current_dir(target).map_err(|e| ExecutionFailure {
    command: cmd.to_string(),
    status: 1,
    output: format!("cd: {}: {}", target.display(), e),
  })?;
  Ok(String::new())
}

/// Wraps `cmd` so that it runs inside every software-collection scope in
/// `scls` (outermost first).
pub fn wrap_for_scls(cmd: &str, scls: &[Vec<String>]) -> String {
  scls.iter().rev().fold(cmd.to_string(), |inner, scope| {
    format!(
      "scl {} - << DA_SCL_EOF\n {} \nDA_SCL_EOF",
      scope.join(" "),
      inner
    )
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use tracing_test::traced_test;

  fn run(cmd: &str) -> Result<String, ExecutionFailure> {
    Shell::default().run_command(cmd, &RunOptions::default())
  }

  #[test]
  fn processors_rewrite_before_spawn() {
    let mut shell = Shell::default();
    shell
      .processors_mut()
      .register("foo", |cmd| format!("FOO=bar && {cmd}"));
    let out = shell.run_command("echo $FOO", &RunOptions::default()).unwrap();
    assert_eq!(out, "bar");

    shell.processors_mut().unregister("foo");
    let out = shell.run_command("echo $FOO", &RunOptions::default()).unwrap();
    assert_eq!(out, "");
  }

  #[test]
  fn failure_carries_command_status_and_output() {
    let err = run("echo out; echo err 1>&2; exit 3").unwrap_err();
    assert_eq!(err.status, 3);
    assert_eq!(err.command, "echo out; echo err 1>&2; exit 3");
    assert_eq!(err.output, "out\nerr");
  }

  #[test]
  fn closed_stdout_does_not_produce_blank_lines() {
    let err = run("echo 'script really ran'; exec 1>&- 2>&-; sleep 1; exit 1").unwrap_err();
    assert!(err.output.contains("script really ran"));
    assert!(!err.output.contains("\n\n"));
  }

  #[test]
  fn long_output_keeps_line_boundaries() {
    let out = run("yes ab | head -n 50000").unwrap();
    let lines: Vec<&str> = out.split('\n').collect();
    assert_eq!(lines.len(), 50000);
    assert!(lines.iter().all(|l| *l == "ab"));
  }

  #[test]
  fn legitimate_blank_lines_are_kept() {
    assert_eq!(run("printf 'a\\n\\nb\\n'").unwrap(), "a\n\nb");
  }

  #[test]
  fn env_is_passed_to_child() {
    let shell = Shell::with_env(BTreeMap::from([("BASE".to_string(), "1".to_string())]));
    let opts = RunOptions::default().with_env("EXTRA", "2");
    assert_eq!(shell.run_command("echo $BASE$EXTRA", &opts).unwrap(), "12");
  }

  #[test]
  #[traced_test]
  fn logs_command_at_requested_level() {
    let shell = Shell::default();
    shell.run_command("true", &RunOptions::default()).unwrap();
    shell.run_command(":", &RunOptions::at(Level::INFO)).unwrap();
    logs_assert(|lines: &[&str]| {
      let debug = lines
        .iter()
        .any(|l| l.contains("DEBUG") && l.ends_with(": true"));
      let info = lines.iter().any(|l| l.contains("INFO") && l.ends_with(": :"));
      if debug && info {
        Ok(())
      } else {
        Err(format!("missing command log lines in {lines:?}"))
      }
    });
  }

  #[test]
  #[traced_test]
  fn secret_commands_are_not_logged() {
    let opts = RunOptions::default().secret();
    Shell::default()
      .run_command("echo hunter2 > /dev/null", &opts)
      .unwrap();
    assert!(logs_contain(SECRET_PLACEHOLDER));
    assert!(!logs_contain("hunter2"));
  }

  #[test]
  fn parse_cd_forms() {
    assert_eq!(parse_cd("cd /tmp"), Some(PathBuf::from("/tmp")));
    assert_eq!(parse_cd("  cd /tmp  "), Some(PathBuf::from("/tmp")));
    assert_eq!(parse_cd("cd '/a b'"), Some(PathBuf::from("/a b")));
    assert_eq!(parse_cd(r"cd /a\ b"), Some(PathBuf::from("/a b")));
    assert_eq!(parse_cd("cd \"/a b\""), Some(PathBuf::from("/a b")));
    assert_eq!(parse_cd("cd"), dirs::home_dir());
    assert_eq!(parse_cd("cd ~"), dirs::home_dir());
    assert_eq!(parse_cd("cd ~/src"), dirs::home_dir().map(|h| h.join("src")));
  }

  #[test]
  fn parse_cd_leaves_shell_syntax_to_the_shell() {
    for cmd in [
      "cd /tmp && ls",
      "cd $HOME",
      "cd `pwd`",
      "cd /tm*",
      "cd -",
      "cd ~root",
      "cd /a /b",
      "cd 'unterminated",
      "cdrecord",
      "echo cd",
    ] {
      assert_eq!(parse_cd(cmd), None, "{cmd}");
    }
  }

  #[test]
  fn cd_through_a_prefixing_processor_runs_in_the_shell() {
    let mut shell = Shell::default();
    shell
      .processors_mut()
      .register("prefix", |cmd| format!("true && {cmd}"));
    let before = env::current_dir().unwrap();
    assert_eq!(
      shell
        .run_command("cd /definitely/not/here", &RunOptions::default())
        .unwrap_err()
        .command,
      "true && cd /definitely/not/here"
    );
    assert_eq!(env::current_dir().unwrap(), before);
  }

  #[test]
  fn cd_to_missing_dir_fails() {
    let err = run("cd /definitely/not/here").unwrap_err();
    assert_eq!(err.status, 1);
    assert!(err.output.contains("/definitely/not/here"));
  }

  #[test]
  fn wraps_nested_scls_outermost_first() {
    let scls = vec![
      vec!["enable".to_string(), "a".to_string()],
      vec!["enable".to_string(), "b".to_string()],
    ];
    assert_eq!(
      wrap_for_scls("ls", &scls),
      "scl enable a - << DA_SCL_EOF\n scl enable b - << DA_SCL_EOF\n ls \nDA_SCL_EOF \nDA_SCL_EOF"
    );
    assert_eq!(wrap_for_scls("ls", &[]), "ls");
  }
}
