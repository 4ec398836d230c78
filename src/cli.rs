use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Dispatch declarative commands to pluggable runners")]
pub struct Cli {
  /// Settings file (TOML, or JSON when it ends in `.json`).
  /// Defaults to `./devrun.toml` when present.
  #[arg(long, global = true, env = "DEVRUN_CONFIG")]
  pub config: Option<PathBuf>,

  /// Substitution variable, repeatable. VALUE is parsed as JSON when valid.
  /// Example: --var name=world --var 'tags=["a","b"]'
  #[arg(long = "var", value_name = "KEY=VALUE", global = true)]
  pub vars: Vec<String>,

  /// Directory searched for templates, repeatable. Searched before the
  /// configured `files_dir`.
  #[arg(long = "files-dir", value_name = "DIR", global = true)]
  pub files_dir: Vec<PathBuf>,

  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
  /// Dispatch a single command and print its result value.
  /// Example: devrun exec cl 'echo hello'
  Exec {
    /// Command name, e.g. `cl`, `log_i`, `jinja_render`.
    name: String,

    /// Command input. Parsed as JSON when valid, otherwise used as a string.
    input: Option<String>,

    /// Evaluate the command as a condition: exit non-zero unless it succeeds.
    /// Example: devrun exec --condition ask_confirm 'Deploy now?'
    #[arg(long)]
    condition: bool,
  },

  /// Run a section from a TOML section file and print the last result value.
  Run {
    /// File whose top-level keys are sections (lists of `{command = input}`).
    file: PathBuf,

    /// Section to run.
    #[arg(long, default_value = "run")]
    section: String,
  },
}
