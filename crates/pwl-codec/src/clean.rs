//! Post-pass that removes needless fragmentation from a command list.
//!
//! The cleaner walks the list one batch window at a time. Within a window,
//! adjacent commands that continue each other are merged. A window that ends
//! up as a single full-batch command is promoted to sparse and folded into a
//! preceding sparse run where possible. Merges never change a generated
//! sample, and cleaning a cleaned list is a no-op.

use tracing::debug;

use crate::command::{Command, Tag};
use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::Result;

/// Window-based command merger.
#[derive(Debug, Clone, Copy)]
pub struct PathCleaner {
    batch_size: u32,
    max_sparse: u32,
}

impl PathCleaner {
    /// Cleaner for `config`.
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            batch_size: config.batch_size(),
            max_sparse: config.max_sparse_duration(),
        }
    }

    /// Start an incremental cleaning run.
    pub fn pass(&self, capacity: usize) -> CleanPass {
        CleanPass {
            cleaner: *self,
            out: Vec::with_capacity(capacity),
            window: Vec::new(),
            fill: 0,
            index: 0,
        }
    }

    /// Clean `commands`.
    ///
    /// Zero-length commands are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BatchAlignmentViolation`] when the input breaks
    /// the batch grid.
    pub fn clean(&self, commands: &[Command]) -> Result<Vec<Command>> {
        let mut pass = self.pass(commands.len());
        for command in commands {
            pass.push(*command)?;
        }
        let out = pass.finish();

        debug!(
            before = commands.len(),
            after = out.len(),
            "cleaned command list"
        );
        Ok(out)
    }

    fn flush(&self, out: &mut Vec<Command>, window: &mut Vec<Command>) {
        match window.as_slice() {
            [only] => {
                let promoted = Command::sparse(only.x, only.slope, only.dt);
                window.clear();
                self.push_sparse(out, promoted);
            }
            _ => out.append(window),
        }
    }

    fn push_sparse(&self, out: &mut Vec<Command>, command: Command) {
        if let Some(last) = out.last_mut()
            && last.is_sparse()
            && u64::from(last.dt) + u64::from(command.dt) <= u64::from(self.max_sparse)
            && last.extends(&command)
        {
            last.dt += command.dt;
            return;
        }
        out.push(command);
    }
}

/// One cleaning run, fed a command at a time.
///
/// Only the open batch window is held back; everything before it is final.
#[derive(Debug, Clone)]
pub struct CleanPass {
    cleaner: PathCleaner,
    out: Vec<Command>,
    window: Vec<Command>,
    fill: u32,
    index: usize,
}

impl CleanPass {
    /// Feed the next command.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BatchAlignmentViolation`] when `command` breaks
    /// the batch grid. The index counts every command pushed so far.
    pub fn push(&mut self, command: Command) -> Result<()> {
        let index = self.index;
        self.index += 1;
        if command.dt == 0 {
            return Ok(());
        }
        let batch_size = self.cleaner.batch_size;
        match command.tag {
            Tag::Sparse => {
                if self.fill != 0 {
                    return Err(CodecError::BatchAlignmentViolation {
                        index,
                        reason: "sparse command starts inside a batch",
                    });
                }
                if command.dt % batch_size != 0 {
                    return Err(CodecError::BatchAlignmentViolation {
                        index,
                        reason: "sparse duration is not a whole number of batches",
                    });
                }
                self.cleaner.push_sparse(&mut self.out, command);
            }
            Tag::Dense => {
                if u64::from(self.fill) + u64::from(command.dt) > u64::from(batch_size) {
                    return Err(CodecError::BatchAlignmentViolation {
                        index,
                        reason: "dense command crosses a batch boundary",
                    });
                }
                self.fill += command.dt;
                match self.window.last_mut() {
                    Some(last) if last.extends(&command) => last.dt += command.dt,
                    _ => self.window.push(command),
                }
                if self.fill == batch_size {
                    self.cleaner.flush(&mut self.out, &mut self.window);
                    self.fill = 0;
                }
            }
        }
        Ok(())
    }

    /// Release the open window and return the cleaned list.
    pub fn finish(mut self) -> Vec<Command> {
        self.out.append(&mut self.window);
        self.out
    }
}
