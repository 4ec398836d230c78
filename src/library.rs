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
use serde_json::Value;
use std::collections::BTreeMap;

/// A list of `{<command name>: <input>}` entries.
pub type Section = Vec<Value>;

/// Section run when a call target names no section.
pub const DEFAULT_SECTION: &str = "run";

/// Kwarg recording how far up the assistant chain the running section lives
/// (0 is the current assistant).
pub const ASSISTANT_LEVEL: &str = "__assistant_level__";

/// An assistant: named sections plus an optional superassistant whose
/// sections `super.<name>` calls resolve against.
#[derive(Debug, Clone, Default)]
pub struct Assistant {
  name: String,
  sections: BTreeMap<String, Section>,
  superassistant: Option<Box<Assistant>>,
}

impl Assistant {
  pub fn new(name: impl Into<String>) -> Self {
    Assistant {
      name: name.into(),
      ..Default::default()
    }
  }

  pub fn with_section(mut self, name: impl Into<String>, section: Section) -> Self {
    self.sections.insert(name.into(), section);
    self
  }

  pub fn with_superassistant(mut self, superassistant: Assistant) -> Self {
    self.superassistant = Some(Box::new(superassistant));
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn section(&self, name: &str) -> Option<&Section> {
    self.sections.get(name)
  }

  /// The assistant `level` steps up the superassistant chain.
  pub fn ancestor(&self, level: usize) -> Option<&Assistant> {
    let mut current = self;
    for _ in 0..level {
      current = current.superassistant.as_deref()?;
    }
    Some(current)
  }
}

/// A reusable set of sections, called by bare name.
#[derive(Debug, Clone, Default)]
pub struct Snippet {
  name: String,
  sections: BTreeMap<String, Section>,
}

impl Snippet {
  pub fn new(name: impl Into<String>) -> Self {
    Snippet {
      name: name.into(),
      ..Default::default()
    }
  }

  pub fn with_section(mut self, name: impl Into<String>, section: Section) -> Self {
    self.sections.insert(name.into(), section);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn section(&self, name: &str) -> Option<&Section> {
    self.sections.get(name)
  }
}

/// Everything the `call`/`use` runner can resolve a target against.
#[derive(Debug, Default)]
pub struct Library {
  assistant: Option<Assistant>,
  snippets: BTreeMap<String, Snippet>,
}

impl Library {
  pub fn set_assistant(&mut self, assistant: Assistant) {
    self.assistant = Some(assistant);
  }

  pub fn assistant(&self) -> Option<&Assistant> {
    self.assistant.as_ref()
  }

  pub fn add_snippet(&mut self, snippet: Snippet) {
    self.snippets.insert(snippet.name.clone(), snippet);
  }

  pub fn snippet(&self, name: &str) -> Option<&Snippet> {
    self.snippets.get(name)
  }

  /// Section `name` of the assistant at `level`.
  pub fn assistant_section(&self, level: usize, name: &str) -> Option<&Section> {
    self.assistant.as_ref()?.ancestor(level)?.section(name)
  }

  /// The nearest assistant above `level` that defines section `name`,
  /// together with that assistant's level.
  pub fn super_section(&self, level: usize, name: &str) -> Option<(usize, &Section)> {
    let assistant = self.assistant.as_ref()?;
    (level.checked_add(1)?..)
      .map_while(|l| assistant.ancestor(l).map(|a| (l, a)))
      .find_map(|(l, a)| a.section(name).map(|s| (l, s)))
  }
}
