use colored::Colorize;
use std::env;

use crate::builtins::{self, SessionControl};
use crate::command;
use crate::editor::LineEditor;
use crate::history::History;
use crate::launcher::ExecContext;
use crate::parser;
use crate::resolver;
use crate::tokenizer::{Tokenizer, WhitespaceTokenizer};

const PROMPT: &str = "% ";

pub struct Shell {
    tokenizer: Box<dyn Tokenizer>,
    editor: LineEditor,
    history: History,
    exec: ExecContext,
}

impl Shell {
    pub fn new() -> Self {
        // Executables are only searched under the served bin directory and
        // the working directory, never the inherited PATH.
        env::set_var("PATH", "bin:.");

        Self {
            tokenizer: Box::new(WhitespaceTokenizer),
            editor: LineEditor::new(),
            history: History::new(),
            exec: ExecContext::new(),
        }
    }

    pub fn run(&mut self) {
        self.print_banner();

        #[cfg(unix)]
        unsafe {
            use libc::{signal, SIGINT, SIG_IGN};
            signal(SIGINT, SIG_IGN);
        }

        loop {
            let line = match self.editor.read_line(PROMPT, &mut self.history) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    eprintln!("npshell: read error: {}", err);
                    break;
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            self.history.add(trimmed.to_string());

            if let SessionControl::Exit = self.run_line(trimmed) {
                break;
            }
        }
    }

    /// One full cycle: parse, build, resolve, dispatch builtins, launch.
    fn run_line(&mut self, line: &str) -> SessionControl {
        let Some(segments) = parser::parse_line(self.tokenizer.as_ref(), line) else {
            println!("Permission denied.");
            return SessionControl::Continue;
        };

        let mut commands = command::build_commands(segments);
        if commands.is_empty() {
            return SessionControl::Continue;
        }

        let path = env::var("PATH").unwrap_or_default();
        let dirs = self.tokenizer.split_on(&path, ':');
        resolver::resolve_commands(&mut commands, &dirs, &mut self.exec.next_index);

        if let SessionControl::Exit = builtins::dispatch(&mut commands) {
            return SessionControl::Exit;
        }

        self.exec.run_pipeline(commands);
        SessionControl::Continue
    }

    fn print_banner(&self) {
        let border = "****************************************";
        println!("{}", border.cyan());
        println!("{}", "** Welcome to the information server. **".cyan());
        println!("{}", border.cyan());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_ends_the_session_even_mid_line() {
        let mut shell = Shell::new();
        assert_eq!(shell.run_line("exit"), SessionControl::Exit);
        assert_eq!(shell.run_line("setenv A b exit c | exit"), SessionControl::Exit);
    }

    #[test]
    fn path_separator_rejects_without_consuming_indices() {
        let mut shell = Shell::new();
        let before = shell.exec.next_index;
        assert_eq!(shell.run_line("bin/ls"), SessionControl::Continue);
        assert_eq!(shell.exec.next_index, before);
    }

    #[test]
    fn builtin_only_line_launches_nothing() {
        let mut shell = Shell::new();
        assert_eq!(
            shell.run_line("setenv NPSHELL_SHELL_TEST value"),
            SessionControl::Continue
        );
        assert_eq!(env::var("NPSHELL_SHELL_TEST").as_deref(), Ok("value"));
        assert!(shell.exec.pipes.is_empty());
    }
}
