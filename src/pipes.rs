use std::collections::HashMap;
use std::os::fd::OwnedFd;

use nix::unistd::pipe;

/// Both ends of one OS pipe. Each descriptor is closed when its `OwnedFd`
/// drops, so removing an entry from the registry releases the pipe.
pub struct PipeEntry {
    pub write: OwnedFd,
    pub read: OwnedFd,
}

/// The set of currently open pipes, keyed by the process index of the stage
/// immediately before the one that reads from the pipe. An entry is created
/// lazily the first time a producer targets it, shared if a second producer
/// targets the same key, and dropped once the consumer has been forked.
pub struct PipeRegistry {
    entries: HashMap<usize, PipeEntry>,
}

impl PipeRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Ensure a pipe exists for `id`, creating one if absent.
    pub fn register(&mut self, id: usize) -> nix::Result<()> {
        if self.entries.contains_key(&id) {
            return Ok(());
        }

        let (read, write) = pipe()?;
        self.entries.insert(id, PipeEntry { write, read });
        Ok(())
    }

    pub fn get(&self, id: usize) -> Option<&PipeEntry> {
        self.entries.get(&id)
    }

    /// Remove the entry for `id`, transferring ownership of both descriptors
    /// to the caller. Dropping the returned entry closes them.
    pub fn take(&mut self, id: usize) -> Option<PipeEntry> {
        self.entries.remove(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
