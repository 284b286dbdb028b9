use std::ffi::CString;
use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::process;

use nix::sys::wait::waitpid;
use nix::unistd::{dup2_stdin, dup2_stdout, execvp, fork, ForkResult};

use crate::command::Command;
use crate::pipes::PipeRegistry;

const REDIRECT_MODE: u32 = 0o664;

/// Per-session execution state: the open pipes and the process-index counter.
///
/// Both live here rather than in globals so that every pipeline run (and every
/// test) is fully isolated. The context persists across input lines, which is
/// what lets a numbered pipe target a process launched by a later line.
pub struct ExecContext {
    pub pipes: PipeRegistry,
    pub next_index: usize,
}

impl ExecContext {
    pub fn new() -> Self {
        Self {
            pipes: PipeRegistry::new(),
            next_index: 0,
        }
    }

    /// Launch a builtin-filtered pipeline, one stage at a time.
    ///
    /// Stages run strictly sequentially: fork, wire descriptors in the child,
    /// then wait in the parent before the next stage starts. The trade is
    /// pipeline parallelism for simple descriptor bookkeeping — each stage's
    /// inbound pipe is already closed in the parent before the next fork.
    pub fn run_pipeline(&mut self, commands: Vec<Command>) {
        for cmd in commands {
            let Some(index) = cmd.process_index else {
                eprintln!("Unknown command: [{}].", cmd.argv[0]);
                break;
            };
            self.launch(index, cmd);
        }
    }

    fn launch(&mut self, index: usize, cmd: Command) {
        // File redirection wins over pipe output, so a stage that redirects
        // to a file never creates a pipe of its own. It may still write into
        // a pipe another producer already registered under the same key.
        if cmd.pipe_offset > 0 && cmd.output_file.is_none() {
            if let Err(err) = self.pipes.register(index + cmd.pipe_offset - 1) {
                eprintln!("npshell: pipe failed: {}", err);
                process::exit(1);
            }
        }

        match unsafe { fork() } {
            Ok(ForkResult::Child) => self.exec_child(index, cmd),
            Ok(ForkResult::Parent { child }) => {
                // The consumer of this stage's inbound pipe has captured its
                // ends via fork; the parent's copies must go now or they leak.
                if let Some(prev) = index.checked_sub(1) {
                    drop(self.pipes.take(prev));
                }

                if let Err(err) = waitpid(child, None) {
                    eprintln!("npshell: wait failed: {}", err);
                    process::exit(1);
                }
            }
            Err(err) => {
                eprintln!("npshell: fork failed: {}", err);
                process::exit(1);
            }
        }
    }

    /// Child side of `launch`: wire stdin/stdout, then replace the image.
    /// Mutates only this process's copy of the registry.
    fn exec_child(&mut self, index: usize, cmd: Command) -> ! {
        if let Some(entry) = index.checked_sub(1).and_then(|id| self.pipes.take(id)) {
            if let Err(err) = dup2_stdin(&entry.read) {
                child_fail(&format!("stdin redirect failed: {}", err));
            }
            // Dropping the entry closes the child's copies of both ends; the
            // duplicate on stdin survives, and the write end must not stay
            // open here or this stage would never see EOF.
        }

        if cmd.pipe_offset > 0 {
            if let Some(entry) = self.pipes.take(index + cmd.pipe_offset - 1) {
                if let Err(err) = dup2_stdout(&entry.write) {
                    child_fail(&format!("stdout redirect failed: {}", err));
                }
            }
        }

        // File redirection supersedes any pipe wiring above.
        if let Some(path) = &cmd.output_file {
            match OpenOptions::new()
                .write(true)
                .create(true)
                .mode(REDIRECT_MODE)
                .open(path)
            {
                Ok(file) => {
                    if let Err(err) = dup2_stdout(&file) {
                        child_fail(&format!("stdout redirect failed: {}", err));
                    }
                }
                Err(err) => child_fail(&format!("cannot open {}: {}", path, err)),
            }
        }

        let mut argv = Vec::with_capacity(cmd.argv.len());
        for arg in &cmd.argv {
            match CString::new(arg.as_str()) {
                Ok(c) => argv.push(c),
                Err(_) => child_fail("argument contains a NUL byte"),
            }
        }

        match execvp(&argv[0], &argv) {
            Ok(infallible) => match infallible {},
            Err(err) => child_fail(&format!("exec {} failed: {}", cmd.argv[0], err)),
        }
    }
}

fn child_fail(msg: &str) -> ! {
    eprintln!("npshell: {}", msg);
    process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn cmd(argv: &[&str], index: usize, pipe_offset: usize, output_file: Option<&str>) -> Command {
        Command {
            process_index: Some(index),
            argv: argv.iter().map(|s| s.to_string()).collect(),
            pipe_offset,
            output_file: output_file.map(|s| s.to_string()),
        }
    }

    fn tmp(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("npshell-{}-{}", name, std::process::id()))
    }

    #[test]
    fn redirects_stdout_to_file() {
        let out = tmp("redirect");
        let out_str = out.to_str().unwrap();

        let mut ctx = ExecContext::new();
        ctx.run_pipeline(vec![cmd(&["/bin/echo", "redirected"], 0, 0, Some(out_str))]);

        assert_eq!(fs::read_to_string(&out).unwrap(), "redirected\n");
        assert!(ctx.pipes.is_empty());
        fs::remove_file(&out).unwrap();
    }

    #[test]
    fn pipes_between_adjacent_stages_and_drains_registry() {
        let out = tmp("adjacent");
        let out_str = out.to_str().unwrap();

        let mut ctx = ExecContext::new();
        ctx.run_pipeline(vec![
            cmd(&["/bin/echo", "through-pipe"], 0, 1, None),
            cmd(&["/bin/cat"], 1, 0, Some(out_str)),
        ]);

        assert_eq!(fs::read_to_string(&out).unwrap(), "through-pipe\n");
        assert!(ctx.pipes.is_empty());
        fs::remove_file(&out).unwrap();
    }

    #[test]
    fn skip_pipe_bypasses_the_middle_stage() {
        let out = tmp("skip");
        let out_str = out.to_str().unwrap();

        let mut ctx = ExecContext::new();
        ctx.run_pipeline(vec![
            cmd(&["/bin/echo", "skipped-ahead"], 0, 2, None),
            cmd(&["/bin/sh", "-c", ":"], 1, 0, None),
            cmd(&["/bin/cat"], 2, 0, Some(out_str)),
        ]);

        assert_eq!(fs::read_to_string(&out).unwrap(), "skipped-ahead\n");
        assert!(ctx.pipes.is_empty());
        fs::remove_file(&out).unwrap();
    }

    #[test]
    fn file_redirection_wins_over_pipe_output() {
        let out = tmp("wins");
        let out_str = out.to_str().unwrap();

        let mut ctx = ExecContext::new();
        ctx.run_pipeline(vec![cmd(&["/bin/echo", "to-file"], 0, 1, Some(out_str))]);

        // The redirecting stage must not have registered a pipe.
        assert!(ctx.pipes.is_empty());
        assert_eq!(fs::read_to_string(&out).unwrap(), "to-file\n");
        fs::remove_file(&out).unwrap();
    }

    #[test]
    fn unresolved_stage_aborts_the_remaining_pipeline() {
        let out = tmp("aborted");
        let out_str = out.to_str().unwrap();

        let unresolved = Command {
            process_index: None,
            argv: vec!["nosuch".to_string()],
            pipe_offset: 0,
            output_file: None,
        };

        let mut ctx = ExecContext::new();
        ctx.run_pipeline(vec![unresolved, cmd(&["/bin/echo", "never"], 0, 0, Some(out_str))]);

        assert!(!out.exists());
        assert!(ctx.pipes.is_empty());
    }
}
