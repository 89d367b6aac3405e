use std::time::Duration;

use crate::state::ProbeScratch;

/// Deadline armed while waiting for a Device-Status-Report reply.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(100);

/// Upper bound on how many bytes of a probe reply we'll accumulate before
/// giving up and falling back to dumb-terminal mode.
const PROBE_BUF_CAP: usize = 32;

/// Appends `b` to the in-progress reply, discarding anything before the
/// leading `ESC` the way the source's probe loop does.
pub fn accumulate(probe: &mut ProbeScratch, b: u8) {
    if probe.buf.is_empty() && b != 0x1b {
        return;
    }
    if probe.buf.len() < PROBE_BUF_CAP {
        probe.buf.push(b);
    }
}

pub fn reply_terminated(probe: &ProbeScratch) -> bool {
    probe.buf.last() == Some(&b'R')
}

pub fn buffer_full(probe: &ProbeScratch) -> bool {
    probe.buf.len() >= PROBE_BUF_CAP
}

/// Parses an accumulated `ESC [ <rows> ; <cols> R` reply.
pub fn parse_reply(probe: &ProbeScratch) -> Option<(u16, u16)> {
    parse_dsr_reply(&probe.buf)
}

fn parse_dsr_reply(bytes: &[u8]) -> Option<(u16, u16)> {
    let start = bytes.iter().position(|&b| b == 0x1b)?;
    let rest = bytes.get(start..)?;
    if rest.len() < 2 || rest[1] != b'[' {
        return None;
    }
    let body = &rest[2..];
    let end = body.iter().position(|&b| b == b'R')?;
    let text = std::str::from_utf8(&body[..end]).ok()?;
    let mut parts = text.splitn(2, ';');
    let rows: u16 = parts.next()?.parse().ok()?;
    let cols: u16 = parts.next()?.parse().ok()?;
    Some((rows, cols))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_reply() {
        let mut probe = ProbeScratch::default();
        for &b in b"\x1b[24;80R" {
            accumulate(&mut probe, b);
        }
        assert!(reply_terminated(&probe));
        assert_eq!(parse_reply(&probe), Some((24, 80)));
    }

    #[test]
    fn discards_bytes_before_the_leading_escape() {
        let mut probe = ProbeScratch::default();
        for &b in b"garbage\x1b[1;40R" {
            accumulate(&mut probe, b);
        }
        assert_eq!(parse_reply(&probe), Some((1, 40)));
    }

    #[test]
    fn malformed_reply_fails_to_parse() {
        let mut probe = ProbeScratch::default();
        for &b in b"\x1b[nope;R" {
            accumulate(&mut probe, b);
        }
        assert_eq!(parse_reply(&probe), None);
    }
}
