#![doc = r#"
Console as a capability interface.

Three implementations share one minimal contract: `readline`, `readchar`,
`write`, `writef`, `close`. Dependency injection through this trait is what
lets the integration tests drive a whole emulated BASIC session without a
real terminal (spec.md Design Notes, "Console as capability interface").
"#]

use std::io::{BufRead, Write as IoWrite};

pub trait Console {
    /// Read one line. Returns `(line, eof)`; `eof` is true once the input
    /// source is exhausted.
    fn readline(&mut self) -> (String, bool);

    /// Read one character: the first byte of the next line, discarding the
    /// rest (spec.md §4.D).
    fn readchar(&mut self) -> (u8, bool) {
        let (line, eof) = self.readline();
        let ch = line.as_bytes().first().copied().unwrap_or(b' ');
        (ch, eof)
    }

    fn write(&mut self, s: &str);

    fn writef(&mut self, args: std::fmt::Arguments) {
        self.write(&args.to_string());
    }

    fn close(&mut self) {}
}

/// Plain, non-interactive console: line-buffered stdin/stdout, no history.
pub struct PlainConsole {
    stdin: std::io::BufReader<std::io::Stdin>,
}

impl PlainConsole {
    pub fn new() -> Self {
        PlainConsole {
            stdin: std::io::BufReader::new(std::io::stdin()),
        }
    }
}

impl Default for PlainConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for PlainConsole {
    fn readline(&mut self) -> (String, bool) {
        let mut line = String::new();
        match self.stdin.read_line(&mut line) {
            Ok(0) => (String::new(), true),
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                (line, false)
            }
            Err(_) => (String::new(), true),
        }
    }

    fn write(&mut self, s: &str) {
        print!("{s}");
        let _ = std::io::stdout().flush();
    }
}

/// Interactive console with line history, backed by `rustyline`.
#[cfg(feature = "readline")]
pub struct InteractiveConsole {
    editor: rustyline::DefaultEditor,
    history_path: std::path::PathBuf,
}

#[cfg(feature = "readline")]
impl InteractiveConsole {
    pub fn new() -> Self {
        let mut editor = rustyline::DefaultEditor::new().expect("failed to initialize line editor");
        let history_path = std::path::PathBuf::from(".bbzhistory");
        let _ = editor.load_history(&history_path);
        InteractiveConsole {
            editor,
            history_path,
        }
    }
}

#[cfg(feature = "readline")]
impl Default for InteractiveConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "readline")]
impl Console for InteractiveConsole {
    fn readline(&mut self) -> (String, bool) {
        match self.editor.readline("") {
            Ok(line) => {
                let _ = self.editor.add_history_entry(line.as_str());
                (line, false)
            }
            Err(rustyline::error::ReadlineError::Eof)
            | Err(rustyline::error::ReadlineError::Interrupted) => (String::new(), true),
            Err(_) => (String::new(), true),
        }
    }

    fn write(&mut self, s: &str) {
        print!("{s}");
        let _ = std::io::stdout().flush();
    }

    fn close(&mut self) {
        let _ = self.editor.save_history(&self.history_path);
    }
}

/// Recorded-mock console: pre-seeded input lines, accumulates all written
/// output. Used by the test suite in place of a real terminal.
pub struct MockConsole {
    lines_in: Vec<String>,
    next_line: usize,
    output: String,
}

impl MockConsole {
    pub fn new(lines_in: Vec<String>) -> Self {
        MockConsole {
            lines_in,
            next_line: 0,
            output: String::new(),
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}

impl Console for MockConsole {
    fn readline(&mut self) -> (String, bool) {
        if self.next_line >= self.lines_in.len() {
            return (String::new(), true);
        }
        let line = self.lines_in[self.next_line].clone();
        self.next_line += 1;
        (line, false)
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readchar_takes_first_byte_and_discards_rest() {
        let mut con = MockConsole::new(vec!["hello".to_string()]);
        let (ch, eof) = con.readchar();
        assert_eq!(ch, b'h');
        assert!(!eof);
    }

    #[test]
    fn exhausted_mock_reports_eof() {
        let mut con = MockConsole::new(vec![]);
        let (_, eof) = con.readline();
        assert!(eof);
    }

    #[test]
    fn mock_accumulates_all_written_output() {
        let mut con = MockConsole::new(vec![]);
        con.write("a");
        con.write("b");
        assert_eq!(con.output(), "ab");
    }
}
