//! Line-based prompt/cancel primitive shared by every interactive flow

use crate::config::WalletConfig;
use crate::error::{QuillError, QuillResult};
use colored::*;
use std::io::{self, BufRead, Write};

/// Outcome of a single prompt. Every multi-step flow checks for `Cancelled`
/// after each prompt and aborts the whole flow, leaving no partial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompted {
    Line(String),
    Cancelled,
}

pub trait LineReader {
    /// Display `prompt` and block until a full line arrives. The raw line,
    /// untrimmed, is returned; trimming and cancel detection happen in
    /// [`prompt`].
    fn read_line(&mut self, prompt: &str) -> QuillResult<String>;
}

/// Prompt once: trim surrounding whitespace and map the reserved cancel
/// token to an explicit variant rather than leaking string comparison into
/// call sites.
pub fn prompt(reader: &mut dyn LineReader, msg: &str) -> QuillResult<Prompted> {
    let line = reader.read_line(msg)?;
    let line = line.trim();

    if line == WalletConfig::CANCEL_TOKEN {
        Ok(Prompted::Cancelled)
    } else {
        Ok(Prompted::Line(line.to_string()))
    }
}

/// Yes/no confirmation. Empty input counts as yes, matching the original
/// console convention. Re-prompts on anything unrecognized.
pub fn confirm(reader: &mut dyn LineReader, msg: &str) -> QuillResult<bool> {
    loop {
        let line = reader.read_line(&format!("{} (y/n): ", msg))?;

        match line.trim().to_lowercase().as_str() {
            "" | "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => {
                println!("{}", "请用 y 或 n 回答.".yellow());
            }
        }
    }
}

/// Stdin-backed reader for the live console session.
pub struct Console;

impl LineReader for Console {
    fn read_line(&mut self, prompt: &str) -> QuillResult<String> {
        print!("{}", prompt.cyan());
        io::stdout().flush()?;

        let mut line = String::new();
        let bytes = io::stdin().lock().read_line(&mut line)?;

        if bytes == 0 {
            return Err(QuillError::Input("stdin closed".to_string()));
        }

        Ok(line)
    }
}

/// Scripted reader used by flow tests: pops one pre-seeded line per prompt.
#[cfg(test)]
pub struct Scripted {
    lines: std::collections::VecDeque<String>,
}

#[cfg(test)]
impl Scripted {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
impl LineReader for Scripted {
    fn read_line(&mut self, _prompt: &str) -> QuillResult<String> {
        self.lines
            .pop_front()
            .ok_or_else(|| QuillError::Input("script exhausted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_trims_and_detects_cancel() {
        let mut reader = Scripted::new(["  Alice  ", "  取消 "]);

        assert_eq!(
            prompt(&mut reader, "name: ").unwrap(),
            Prompted::Line("Alice".to_string())
        );
        assert_eq!(prompt(&mut reader, "name: ").unwrap(), Prompted::Cancelled);
    }

    #[test]
    fn confirm_accepts_default_and_retries_garbage() {
        let mut reader = Scripted::new(["", "maybe", "no"]);

        assert!(confirm(&mut reader, "continue?").unwrap());
        assert!(!confirm(&mut reader, "continue?").unwrap());
    }
}
