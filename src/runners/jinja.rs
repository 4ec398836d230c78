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
use crate::command::RunnerResult;
use crate::error::RunnerError;
use crate::runners::CommandRunner;
use crate::runtime::Runtime;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;

/// Suffix stripped from a template name to derive its output name.
pub const TEMPLATE_SUFFIX: &str = ".tpl";

/// `jinja_render` renders a template from the files search path into a
/// destination directory.
pub struct Jinja2Runner;

#[derive(Debug, Deserialize)]
struct RenderArgs {
  template: TemplateRef,
  #[serde(default)]
  data: Value,
  destination: PathBuf,
  output: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TemplateRef {
  source: String,
}

impl Jinja2Runner {
  /// Output file name: `output` if given, else the source name without
  /// [`TEMPLATE_SUFFIX`], else the source name itself.
  pub fn output_name<'a>(source: &'a str, output: Option<&'a str>) -> &'a str {
    output.unwrap_or_else(|| source.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(source))
  }
}

impl CommandRunner for Jinja2Runner {
  fn name(&self) -> &'static str {
    "jinja_render"
  }

  fn matches(&self, command: &Command) -> bool {
    command.name() == "jinja_render"
  }

  fn run(&self, command: &Command, runtime: &Runtime) -> Result<RunnerResult, RunnerError> {
    let args: RenderArgs = serde_json::from_value(command.comm().clone()).map_err(|e| {
      RunnerError::command(format!("Invalid input for `{}`: {e}", command.name()))
    })?;

    let renderer = runtime.renderer();
    let template = renderer.find(&command.files_dir(), &args.template.source)?;
    let output = Self::output_name(&args.template.source, args.output.as_deref());
    let destination = args.destination.join(output);

    tracing::debug!(
      template = %template.display(),
      destination = %destination.display(),
      "Rendering template"
    );
    renderer.render_file(&template, &args.data, &destination)?;

    Ok(RunnerResult::ok(destination.display().to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::command::FILES_DIR;
  use crate::command::Kwargs;
  use serde_json::json;
  use std::fs;
  use tempfile::TempDir;

  struct Fixture {
    files: TempDir,
    dest: TempDir,
  }

  impl Fixture {
    fn new() -> Self {
      let files = tempfile::tempdir().unwrap();
      fs::write(files.path().join("script.py.tpl"), "print(\"{{ what }}\")\n").unwrap();
      fs::write(files.path().join("script.py"), "print(\"{{ what }}\")\n").unwrap();
      Fixture {
        files,
        dest: tempfile::tempdir().unwrap(),
      }
    }

    fn render(&self, mut input: Value) -> RunnerResult {
      input["data"] = json!({"what": "foo"});
      input["destination"] = json!(self.dest.path());
      let mut kwargs = Kwargs::new();
      kwargs.insert(FILES_DIR.to_string(), json!([self.files.path()]));
      let c = Command::new("jinja_render", input.clone(), true, input, kwargs);
      Jinja2Runner.run(&c, &Runtime::default()).unwrap()
    }

    fn read(&self, name: &str) -> String {
      fs::read_to_string(self.dest.path().join(name)).unwrap()
    }
  }

  #[test]
  fn output_name_resolution() {
    assert_eq!(Jinja2Runner::output_name("x.py.tpl", None), "x.py");
    assert_eq!(Jinja2Runner::output_name("x.py", None), "x.py");
    assert_eq!(Jinja2Runner::output_name("x.py.tpl", Some("y.py")), "y.py");
  }

  #[test]
  fn strips_template_suffix() {
    let f = Fixture::new();
    let res = f.render(json!({"template": {"source": "script.py.tpl"}}));
    assert_eq!(f.read("script.py"), "print(\"foo\")");
    assert_eq!(
      res,
      RunnerResult::ok(f.dest.path().join("script.py").display().to_string())
    );
  }

  #[test]
  fn keeps_name_without_suffix() {
    let f = Fixture::new();
    f.render(json!({"template": {"source": "script.py"}}));
    assert_eq!(f.read("script.py"), "print(\"foo\")");
    // The source template is untouched.
    assert_eq!(
      fs::read_to_string(f.files.path().join("script.py")).unwrap(),
      "print(\"{{ what }}\")\n"
    );
  }

  #[test]
  fn explicit_output_wins() {
    let f = Fixture::new();
    f.render(json!({"template": {"source": "script.py.tpl"}, "output": "rendered.py"}));
    assert_eq!(f.read("rendered.py"), "print(\"foo\")");
    assert!(!f.dest.path().join("script.py").exists());
  }

  #[test]
  fn filters_are_applied() {
    let f = Fixture::new();
    fs::write(f.files.path().join("shout.txt.tpl"), "{{ what|upper }}!\n").unwrap();
    f.render(json!({"template": {"source": "shout.txt.tpl"}}));
    assert_eq!(f.read("shout.txt"), "FOO!");
  }

  #[test]
  fn missing_template_and_bad_input_fail() {
    let f = Fixture::new();
    let input = json!({"template": {"source": "nope"}, "destination": f.dest.path()});
    let c = Command::new("jinja_render", input.clone(), true, input, Kwargs::new());
    assert!(matches!(
      Jinja2Runner.run(&c, &Runtime::default()),
      Err(RunnerError::Template(_))
    ));

    let c = Command::new("jinja_render", json!("x"), true, json!("x"), Kwargs::new());
    assert!(matches!(
      Jinja2Runner.run(&c, &Runtime::default()),
      Err(RunnerError::Command(_))
    ));
  }
}
