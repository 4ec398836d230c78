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
use std::fmt;

/// A pure rewrite of a shell command string.
pub type Processor = Box<dyn Fn(String) -> String>;

/// Named command processors, applied in registration order before a command
/// string is spawned.
///
/// Not synchronized: register processors before dispatching commands.
#[derive(Default)]
pub struct CommandProcessors {
  entries: Vec<(String, Processor)>,
}

impl CommandProcessors {
  /// Registers `processor` under `name`.
  ///
  /// Re-registering an existing name replaces the processor but keeps its
  /// original position in the chain.
  pub fn register<F>(&mut self, name: impl Into<String>, processor: F)
  where
    F: Fn(String) -> String + 'static,
  {
    let name = name.into();
    match self.entries.iter_mut().find(|(n, _)| *n == name) {
      Some(entry) => entry.1 = Box::new(processor),
      None => self.entries.push((name, Box::new(processor))),
    }
  }

  /// Removes the processor registered under `name`, returning whether one existed.
  pub fn unregister(&mut self, name: &str) -> bool {
    let before = self.entries.len();
    self.entries.retain(|(n, _)| n != name);
    self.entries.len() != before
  }

  /// Runs `cmd` through every processor, left to right.
  pub fn apply(&self, cmd: &str) -> String {
    self
      .entries
      .iter()
      .fold(cmd.to_string(), |acc, (_, processor)| processor(acc))
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|(n, _)| n.as_str())
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl fmt::Debug for CommandProcessors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.names()).finish()
  }
}
