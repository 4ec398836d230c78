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

//! Variable substitution for command inputs.
//!
//! Supports `$name` and `${name}` references and the `$$` escape. Unknown
//! variables are left untouched so that a later pass (or the shell itself)
//! can still expand them.

use crate::command::Kwargs;
use serde_json::Value;

/// Substitutes variables in every string leaf of `value`. Mapping keys and the
/// overall shape are never changed.
pub fn format_value(value: &Value, vars: &Kwargs) -> Value {
  match value {
    Value::String(s) => Value::String(format_str(s, vars)),
    Value::Array(items) => Value::Array(items.iter().map(|v| format_value(v, vars)).collect()),
    Value::Object(map) => Value::Object(
      map
        .iter()
        .map(|(k, v)| (k.clone(), format_value(v, vars)))
        .collect(),
    ),
    other => other.clone(),
  }
}

/// Substitutes variables in a single string.
pub fn format_str(input: &str, vars: &Kwargs) -> String {
  let mut out = String::with_capacity(input.len());
  let mut rest = input;

  while let Some(pos) = rest.find('$') {
    out.push_str(&rest[..pos]);
    let after = &rest[pos + 1..];

    if let Some(tail) = after.strip_prefix('$') {
      out.push('$');
      rest = tail;
      continue;
    }

    if let Some(braced) = after.strip_prefix('{') {
      match braced.find('}') {
        Some(end) if is_identifier(&braced[..end]) => {
          let name = &braced[..end];
          match vars.get(name) {
            Some(v) => out.push_str(&to_display(v)),
            None => out.push_str(&rest[pos..pos + end + 3]),
          }
          rest = &braced[end + 1..];
        }
        // Unclosed or invalid `${` is kept literally.
        _ => {
          out.push('$');
          rest = after;
        }
      }
      continue;
    }

    let len = identifier_len(after);
    if len == 0 {
      out.push('$');
      rest = after;
      continue;
    }
    let name = &after[..len];
    match vars.get(name) {
      Some(v) => out.push_str(&to_display(v)),
      None => {
        out.push('$');
        out.push_str(name);
      }
    }
    rest = &after[len..];
  }

  out.push_str(rest);
  out
}

/// Renders a value for interpolation: strings verbatim, everything else as JSON.
pub fn to_display(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Null => String::new(),
    other => other.to_string(),
  }
}

fn identifier_len(s: &str) -> usize {
  let mut chars = s.char_indices();
  match chars.next() {
    Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
    _ => return 0,
  }
  chars
    .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
    .map(|(i, _)| i)
    .unwrap_or(s.len())
}

fn is_identifier(s: &str) -> bool {
  !s.is_empty() && identifier_len(s) == s.len()
}
