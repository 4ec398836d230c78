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

//! Template lookup and rendering used by the `jinja_render` runner.

use crate::error::TemplateError;
use minijinja::Environment;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Locates, renders and writes template files.
pub trait TemplateRenderer {
  /// Returns the first `search_path` entry containing a file called `name`.
  fn find(&self, search_path: &[PathBuf], name: &str) -> Result<PathBuf, TemplateError> {
    search_path
      .iter()
      .map(|dir| dir.join(name))
      .find(|candidate| candidate.is_file())
      .ok_or_else(|| TemplateError::NotFound {
        name: name.to_string(),
        search_path: search_path.to_vec(),
      })
  }

  /// Renders template text with `data` as its variable context.
  fn render_str(&self, source: &str, data: &Value) -> Result<String, TemplateError>;

  /// Renders the template at `template` into `destination`, replacing any
  /// existing file.
  fn render_file(&self, template: &Path, data: &Value, destination: &Path) -> Result<(), TemplateError> {
    let source = fs::read_to_string(template).map_err(|source| TemplateError::Read {
      path: template.to_path_buf(),
      source,
    })?;
    let rendered = self.render_str(&source, data)?;

    let write_err = |source| TemplateError::Write {
      path: destination.to_path_buf(),
      source,
    };
    if let Some(parent) = destination.parent() {
      fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(destination, rendered).map_err(write_err)
  }
}

/// Renders Jinja templates.
///
/// As with Jinja's defaults, an undefined value prints as nothing and a
/// single trailing newline of the result is dropped.
pub struct JinjaRenderer {
  env: Environment<'static>,
}

impl Default for JinjaRenderer {
  fn default() -> Self {
    JinjaRenderer {
      env: Environment::new(),
    }
  }
}

impl TemplateRenderer for JinjaRenderer {
  fn render_str(&self, source: &str, data: &Value) -> Result<String, TemplateError> {
    Ok(self.env.render_str(source, data)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn renders_nested_values() {
    let data = json!({"what": "foo", "user": {"name": "ann", "tags": ["x", "y"]}, "n": 2});
    let out = JinjaRenderer::default()
      .render_str("{{ what }} {{user.name}} {{ user.tags[1] }} {{ n }}", &data)
      .unwrap();
    assert_eq!(out, "foo ann y 2");
  }

  #[test]
  fn supports_filters_and_blocks() {
    let data = json!({"what": "foo", "items": ["a", "b"]});
    let out = JinjaRenderer::default()
      .render_str(
        "{% if what %}{{ what|upper }}{% endif %}:{% for i in items %}{{ i }}{% endfor %}",
        &data,
      )
      .unwrap();
    assert_eq!(out, "FOO:ab");
  }

  #[test]
  fn undefined_values_render_empty() {
    let out = JinjaRenderer::default()
      .render_str("[{{ nope }}]", &json!({}))
      .unwrap();
    assert_eq!(out, "[]");
  }

  #[test]
  fn strips_one_trailing_newline() {
    let out = JinjaRenderer::default()
      .render_str("a\n\n", &json!({}))
      .unwrap();
    assert_eq!(out, "a\n");
  }

  #[test]
  fn malformed_templates_are_errors() {
    let renderer = JinjaRenderer::default();
    for source in ["ab {{ x", "{% if x %}", "{{ x|no_such_filter }}"] {
      assert!(
        matches!(
          renderer.render_str(source, &json!({"x": 1})),
          Err(TemplateError::Render(_))
        ),
        "{source}"
      );
    }
  }

  #[test]
  fn find_uses_first_matching_directory() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    fs::write(second.path().join("t.tpl"), "x").unwrap();
    let search = vec![first.path().to_path_buf(), second.path().to_path_buf()];
    assert_eq!(
      JinjaRenderer::default().find(&search, "t.tpl").unwrap(),
      second.path().join("t.tpl")
    );
    assert!(matches!(
      JinjaRenderer::default().find(&search, "missing"),
      Err(TemplateError::NotFound { .. })
    ));
  }
}
