//! Host Integration
//!
//! STRING_SYSTEM hands a register's text to the host's command shell. Bytecode
//! that reaches this channel can run arbitrary commands, so programs must be
//! trusted input. Embedders that want a different policy install their own
//! `Host`.

use std::cell::RefCell;
use std::io;
use std::process::Command;
use std::rc::Rc;

/// Host-provided command execution facility
pub trait Host {
    /// Run `command` and return its exit status when the host reports one
    fn system(&mut self, command: &[u8]) -> io::Result<Option<i32>>;
}

/// Runs commands through the platform shell and waits for them
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellHost;

impl Host for ShellHost {
    fn system(&mut self, command: &[u8]) -> io::Result<Option<i32>> {
        let status = shell(command).status()?;
        Ok(status.code())
    }
}

/// Unix shells take the register bytes as they are
#[cfg(unix)]
fn shell(command: &[u8]) -> Command {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(OsStr::from_bytes(command));
    cmd
}

#[cfg(not(unix))]
fn shell(command: &[u8]) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(String::from_utf8_lossy(command).into_owned());
    cmd
}

/// Records commands instead of running them. Clones share one log, so a
/// handle kept by the caller sees what the machine's copy recorded.
#[derive(Debug, Default, Clone)]
pub struct RecordingHost {
    log: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands received so far, oldest first
    pub fn commands(&self) -> Vec<Vec<u8>> {
        self.log.borrow().clone()
    }
}

impl Host for RecordingHost {
    fn system(&mut self, command: &[u8]) -> io::Result<Option<i32>> {
        self.log.borrow_mut().push(command.to_vec());
        Ok(Some(0))
    }
}
