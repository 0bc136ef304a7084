/*!
   Define wrapper type around [`std::process::Child`] to kill the
   child process when the value is dropped.
*/

use std::process::{Child, ExitStatus};

use crate::error::Error;

/**
   A wrapper around [`std::process::Child`] that ensures that the child
   process is killed when the value is dropped.
*/
pub struct ChildProcess {
    pub child: Child,
    waited: bool,
}

impl ChildProcess {
    /// Create a new [`ChildProcess`] from the primitive [`Child`] type.
    pub fn new(child: Child) -> Self {
        Self {
            child,
            waited: false,
        }
    }

    /// Wait for the child process to terminate.
    pub fn wait(&mut self) -> Result<ExitStatus, Error> {
        let status = self.child.wait()?;
        self.waited = true;
        Ok(status)
    }

    /// Kill the underlying child process and reap it.
    pub fn kill(&mut self) -> Result<(), Error> {
        if self.waited {
            return Ok(());
        }

        self.child.kill()?;
        self.wait()?;

        Ok(())
    }

    /// Whether the process exited on its own, e.g. after reaching a halt height.
    pub fn has_exited(&mut self) -> Result<bool, Error> {
        if !self.waited && self.child.try_wait()?.is_some() {
            self.waited = true;
        }

        Ok(self.waited)
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        if !self.waited {
            let _ = self.kill();
        }
    }
}
