use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::error::InstallerError;

/// Line-based questions on a terminal (or any reader/writer pair).
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `label` and returns the next line, trimmed.
    pub fn ask(&mut self, label: &str) -> Result<String, InstallerError> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            let what = label.trim().trim_end_matches(':').to_string();
            return Err(InstallerError::InputClosed(what));
        }
        Ok(line.trim().to_string())
    }

    /// Yes/no question defaulting to no.
    pub fn confirm(&mut self, question: &str) -> Result<bool, InstallerError> {
        let answer = self.ask(&format!("{question} (y/N): "))?;
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.output
    }
}
