#![allow(dead_code)]

use remtask::{CommandVector, Transport};

/// A remote shell that ignores the hostname and evaluates the quoted command
/// locally, the way the remote user's shell would.
pub fn stub_transport() -> Transport {
    Transport {
        remote_shell: strings(&["sh", "-c", "eval \"$2\"", "stub-ssh"]),
        // `rsync SRC DST` where either side may be HOST:PATH
        file_sync: strings(&[
            "sh",
            "-c",
            "cp \"${1#*:}\" \"${2#*:}\"",
            "stub-rsync",
        ]),
        ..Transport::default()
    }
}

pub fn cmd(args: &[&str]) -> CommandVector {
    CommandVector::new(args.iter().copied()).unwrap()
}

pub fn sh(script: &str) -> CommandVector {
    cmd(&["sh", "-c", script])
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}
