use std::env;

use crate::command::Command;

/// What the read loop should do after builtin dispatch.
#[derive(Debug, PartialEq)]
pub enum SessionControl {
    Continue,
    /// `exit` was seen; the whole session ends, nothing further launches.
    Exit,
}

/// Intercept builtin commands before any process is spawned.
///
/// Builtins are matched on literal argv[0], resolved or not, executed
/// in-process and removed from the pipeline. Invocations with the wrong
/// argument count are swallowed without effect but still removed.
pub fn dispatch(commands: &mut Vec<Command>) -> SessionControl {
    let mut i = 0;
    while i < commands.len() {
        match commands[i].argv[0].as_str() {
            "printenv" => {
                if commands[i].argv.len() == 2 {
                    let name = &commands[i].argv[1];
                    if let Ok(value) = env::var(name) {
                        println!("{}={}", name, value);
                    }
                }
                commands.remove(i);
            }
            "setenv" => {
                if commands[i].argv.len() == 3 {
                    env::set_var(&commands[i].argv[1], &commands[i].argv[2]);
                }
                commands.remove(i);
            }
            "exit" => return SessionControl::Exit,
            _ => i += 1,
        }
    }
    SessionControl::Continue
}
