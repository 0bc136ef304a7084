/*!
   Filesystem utilities.
*/

use std::fs;
use std::io;
use std::thread;
use tracing::warn;

use crate::error::Error;

/**
   Pipe a streaming source implementing [`std::io::Read`] to a file in
   append mode.

   This is used to pipe log output from a full node's child process
   to log files in the node's home directory.
*/
pub fn pipe_to_file(
    mut source: impl io::Read + Send + 'static,
    file_path: &str,
) -> Result<(), Error> {
    let mut file = fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(file_path)?;

    let file_path = file_path.to_string();

    thread::spawn(move || {
        if let Err(e) = io::copy(&mut source, &mut file) {
            warn!("stopped piping output to {}: {}", file_path, e);
        }
    });

    Ok(())
}
