use nix::unistd::{access, AccessFlags};

use crate::command::Command;

/// Resolve each command's argv[0] against the PATH directories, in pipeline
/// order, rewriting argv[0] to `dir/name` on the first hit and assigning the
/// next sequential process index from `next_index`.
///
/// The first command that exhausts every directory stops resolution for the
/// whole pipeline: it and everything after it keep the unresolved sentinel,
/// and the index counter is left untouched for them. A broken stage
/// invalidates everything downstream of it.
pub fn resolve_commands(commands: &mut [Command], search_dirs: &[String], next_index: &mut usize) {
    for cmd in commands.iter_mut() {
        let mut found = false;

        for dir in search_dirs {
            let candidate = format!("{}/{}", dir, cmd.argv[0]);
            if access(candidate.as_str(), AccessFlags::F_OK).is_ok() {
                cmd.argv[0] = candidate;
                cmd.process_index = Some(*next_index);
                *next_index += 1;
                found = true;
                break;
            }
        }

        if !found {
            break;
        }
    }
}
