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
use std::cell::RefCell;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::io::IsTerminal;
use std::io::Write;

const YES: &[&str] = &["y", "yes"];
const NO: &[&str] = &["n", "no"];

/// Interactive prompts used by the `ask_*` and `dependencies` runners.
///
/// End of input is not an error: confirmations and passwords report it as
/// `Ok(None)` so the caller decides what "no answer" means.
pub trait Dialog {
  fn ask_for_confirm_with_message(&self, title: &str, message: &str) -> io::Result<Option<bool>>;

  /// Prints `items` before asking for confirmation.
  fn ask_for_package_list_confirm(&self, title: &str, items: &[String]) -> io::Result<Option<bool>>;

  /// Prints `message` and returns the raw line entered, which may be empty.
  fn ask_for_input_with_prompt(&self, message: &str) -> io::Result<String>;

  fn ask_for_password(&self, prompt: &str) -> io::Result<Option<String>>;
}

/// Line-based dialog over any reader/writer pair.
pub struct CliDialog<R, W> {
  inp: RefCell<R>,
  out: RefCell<W>,
}

impl<R: BufRead, W: Write> CliDialog<R, W> {
  pub fn new(inp: R, out: W) -> Self {
    CliDialog {
      inp: RefCell::new(inp),
      out: RefCell::new(out),
    }
  }

  pub fn into_parts(self) -> (R, W) {
    (self.inp.into_inner(), self.out.into_inner())
  }

  fn say(&self, text: &str) -> io::Result<()> {
    let mut out = self.out.borrow_mut();
    writeln!(out, "{text}")?;
    out.flush()
  }

  fn prompt(&self, text: &str) -> io::Result<()> {
    let mut out = self.out.borrow_mut();
    write!(out, "{text}")?;
    out.flush()
  }

  /// Reads one line without its line terminator; `None` at end of input.
  fn read_line(&self) -> io::Result<Option<String>> {
    let mut line = String::new();
    if self.inp.borrow_mut().read_line(&mut line)? == 0 {
      return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(Some(line))
  }

  fn ask_yes_no(&self) -> io::Result<Option<bool>> {
    loop {
      self.prompt("[y/n] ")?;
      let Some(choice) = self.read_line()? else {
        return Ok(None);
      };
      let choice = choice.trim().to_lowercase();
      if YES.contains(&choice.as_str()) {
        return Ok(Some(true));
      }
      if NO.contains(&choice.as_str()) {
        return Ok(Some(false));
      }
      self.say("You have to choose one of y/n.")?;
    }
  }
}

impl CliDialog<BufReader<io::Stdin>, io::Stdout> {
  pub fn stdio() -> Self {
    CliDialog::new(BufReader::new(io::stdin()), io::stdout())
  }
}

impl<R: BufRead, W: Write> Dialog for CliDialog<R, W> {
  fn ask_for_confirm_with_message(&self, title: &str, message: &str) -> io::Result<Option<bool>> {
    self.say(title)?;
    self.say(message)?;
    self.ask_yes_no()
  }

  fn ask_for_package_list_confirm(&self, title: &str, items: &[String]) -> io::Result<Option<bool>> {
    self.say(title)?;
    for item in items {
      self.say(&format!("  {item}"))?;
    }
    self.say(&format!("Install {} package(s)?", items.len()))?;
    self.ask_yes_no()
  }

  fn ask_for_input_with_prompt(&self, message: &str) -> io::Result<String> {
    self.say(message)?;
    Ok(self.read_line()?.unwrap_or_default())
  }

  fn ask_for_password(&self, prompt: &str) -> io::Result<Option<String>> {
    self.prompt(&format!("{prompt}: "))?;
    self.read_line()
  }
}

/// Dialog on the controlling terminal. Passwords are read without echo when
/// stdin is a terminal.
pub struct TerminalDialog {
  lines: CliDialog<BufReader<io::Stdin>, io::Stdout>,
}

impl Default for TerminalDialog {
  fn default() -> Self {
    TerminalDialog {
      lines: CliDialog::stdio(),
    }
  }
}

impl Dialog for TerminalDialog {
  fn ask_for_confirm_with_message(&self, title: &str, message: &str) -> io::Result<Option<bool>> {
    self.lines.ask_for_confirm_with_message(title, message)
  }

  fn ask_for_package_list_confirm(&self, title: &str, items: &[String]) -> io::Result<Option<bool>> {
    self.lines.ask_for_package_list_confirm(title, items)
  }

  fn ask_for_input_with_prompt(&self, message: &str) -> io::Result<String> {
    self.lines.ask_for_input_with_prompt(message)
  }

  fn ask_for_password(&self, prompt: &str) -> io::Result<Option<String>> {
    if !io::stdin().is_terminal() {
      return self.lines.ask_for_password(prompt);
    }
    password_answer(
      dialoguer::Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact(),
    )
  }
}

/// Maps a terminal password read to the `Dialog` contract: end of input is
/// `None`, not an error.
fn password_answer(answer: Result<String, dialoguer::Error>) -> io::Result<Option<String>> {
  match answer {
    Ok(secret) => Ok(Some(secret)),
    Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
    Err(dialoguer::Error::IO(e)) => Err(e),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  fn dialog(input: &str) -> CliDialog<Cursor<Vec<u8>>, Vec<u8>> {
    CliDialog::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
  }

  fn output(d: CliDialog<Cursor<Vec<u8>>, Vec<u8>>) -> String {
    String::from_utf8(d.into_parts().1).unwrap()
  }

  #[test]
  fn confirm_parses_answers_case_insensitively() {
    let cases = [
      ("y", true),
      ("n", false),
      ("yes", true),
      ("no", false),
      ("Yes", true),
      ("No", false),
      ("yEs", true),
      ("nO", false),
    ];
    for (choice, expected) in cases {
      let d = dialog(choice);
      assert_eq!(
        d.ask_for_confirm_with_message("foo", "bar").unwrap(),
        Some(expected),
        "choice {choice}"
      );
      let d = dialog(choice);
      assert_eq!(
        d.ask_for_package_list_confirm("foo", &["bar".to_string()]).unwrap(),
        Some(expected),
        "choice {choice}"
      );
    }
  }

  #[test]
  fn confirm_prints_title_and_message() {
    let d = dialog("y");
    d.ask_for_confirm_with_message("foo", "bar").unwrap();
    let out = output(d);
    assert!(out.contains("foo"));
    assert!(out.contains("bar"));
  }

  #[test]
  fn confirm_reprompts_on_invalid_answer() {
    let d = dialog("foo\nyes\n");
    assert_eq!(d.ask_for_confirm_with_message("bar", "baz").unwrap(), Some(true));
    assert!(output(d).contains("You have to choose"));
  }

  #[test]
  fn confirm_returns_none_at_end_of_input() {
    assert_eq!(dialog("").ask_for_confirm_with_message("bar", "baz").unwrap(), None);
    assert_eq!(
      dialog("maybe\n")
        .ask_for_package_list_confirm("asd", &["sdf".to_string()])
        .unwrap(),
      None
    );
  }

  #[test]
  fn package_list_is_printed() {
    let d = dialog("s\ny");
    assert_eq!(
      d.ask_for_package_list_confirm("foo", &["bar".to_string()]).unwrap(),
      Some(true)
    );
    assert!(output(d).contains("bar"));
  }

  #[test]
  fn input_returns_raw_line() {
    for (inp, message, expected) in [("foo", "bar", "foo"), ("", "baz", "")] {
      let d = dialog(inp);
      assert_eq!(d.ask_for_input_with_prompt(message).unwrap(), expected);
      assert!(output(d).contains(message));
    }
  }

  #[test]
  fn password_reads_a_line() {
    let d = dialog("s3cret\n");
    assert_eq!(d.ask_for_password("Password").unwrap(), Some("s3cret".to_string()));
    assert_eq!(dialog("").ask_for_password("Password").unwrap(), None);
  }

  #[test]
  fn terminal_password_end_of_input_is_no_answer() {
    let eof = dialoguer::Error::IO(io::Error::from(io::ErrorKind::UnexpectedEof));
    assert_eq!(password_answer(Err(eof)).unwrap(), None);

    let broken = dialoguer::Error::IO(io::Error::from(io::ErrorKind::BrokenPipe));
    assert_eq!(
      password_answer(Err(broken)).unwrap_err().kind(),
      io::ErrorKind::BrokenPipe
    );

    assert_eq!(
      password_answer(Ok("s3cret".to_string())).unwrap(),
      Some("s3cret".to_string())
    );
  }
}
