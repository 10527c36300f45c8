//! Terminal input: confirmations and the interactive entry prompt.

use crate::core::workflow::{EntryPrompt, Input, Question, Step};
use crate::errors::AppResult;
use crate::ui::messages::warning;
use crate::utils::colors::{CYAN, GREY, RESET};
use std::io::{self, BufRead, Write};

/// Ask a yes/no confirmation from the user
pub fn ask_confirmation(prompt: &str) -> bool {
    warning(prompt);
    print!("Confirm [y/N]: ");
    let _ = io::stdout().flush();

    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        matches!(s.trim().to_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

/// Interactive prompt on stdin/stdout. `B` goes back one step, `Q` cancels,
/// an empty line accepts the shown default. End of input cancels.
pub struct TerminalPrompt<R: BufRead> {
    input: R,
}

impl TerminalPrompt<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self {
            input: io::stdin().lock(),
        }
    }
}

impl<R: BufRead> TerminalPrompt<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> EntryPrompt for TerminalPrompt<R> {
    fn ask(&mut self, question: &Question) -> AppResult<Input> {
        if !question.choices.is_empty() {
            println!();
            for (i, c) in question.choices.iter().enumerate() {
                println!("  {CYAN}{:>2}{RESET}. {}", i + 1, c);
            }
        }

        match &question.default {
            Some(d) => print!("{} {GREY}[{}]{RESET} (B=back, Q=cancel): ", question.step, d),
            None => print!("{} (B=back, Q=cancel): ", question.step),
        }
        io::stdout().flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(Input::Cancel);
        }

        let answer = line.trim();
        Ok(match answer.to_uppercase().as_str() {
            "B" => Input::Back,
            "Q" => Input::Cancel,
            _ => Input::Text(answer.to_string()),
        })
    }

    fn rejected(&mut self, _step: Step, reason: &str) -> AppResult<()> {
        warning(reason);
        Ok(())
    }
}
