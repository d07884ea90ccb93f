use std::{
    io::{self, Read, Write},
    thread::{self, JoinHandle},
};

use crossbeam_channel::Sender;
use log::warn;

use crate::models::message::{OutputMessage, Stream};

const CHUNK_SIZE: usize = 8 * 1024;

/// Drains one child pipe on its own thread until EOF.
///
/// Every chunk is reported to `sender` for capture as soon as `read` returns
/// it, partial lines included. When `forward` is set the chunk is also written
/// to our own stdout/stderr; a failed write turns forwarding off for the rest
/// of the stream but draining continues, so the child never blocks on a full
/// pipe.
pub fn spawn_pump<R>(
    stream: Stream,
    mut source: R,
    forward: bool,
    sender: Sender<OutputMessage>,
) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = [0u8; CHUNK_SIZE];
        let mut forwarding = forward;
        loop {
            match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    let chunk = &buf[..n];
                    if forwarding {
                        if let Err(e) = forward_chunk(stream, chunk) {
                            warn!("Stopped forwarding child {}: {}", stream, e);
                            forwarding = false;
                        }
                    }
                    // Receiver is gone once the owning task was dropped; keep draining.
                    let _ = sender.send(OutputMessage::new(stream, chunk.to_vec()));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Failed to read child {}: {}", stream, e);
                    break;
                }
            }
        }
    })
}

fn forward_chunk(stream: Stream, bytes: &[u8]) -> io::Result<()> {
    match stream {
        Stream::Stdout => {
            let mut out = io::stdout().lock();
            out.write_all(bytes)?;
            out.flush()
        }
        Stream::Stderr => {
            let mut err = io::stderr().lock();
            err.write_all(bytes)?;
            err.flush()
        }
    }
}
