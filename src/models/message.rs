use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Stdout => write!(f, "stdout"),
            Stream::Stderr => write!(f, "stderr"),
        }
    }
}

/// One chunk as returned by a single read of a child pipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputMessage {
    pub stream: Stream,
    pub bytes: Vec<u8>,
}

impl OutputMessage {
    pub fn new(stream: Stream, bytes: Vec<u8>) -> Self {
        Self { stream, bytes }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}
