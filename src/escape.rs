use crate::dispatch::Op;
use crate::state::EditorState;

/// Result of feeding one byte to the in-progress `ESC`-introduced sequence.
pub enum EscOutcome {
    /// The sequence is incomplete; stay in `ReadEsc`.
    NeedMore,
    /// The sequence resolved to an operation; the caller returns to
    /// `ReadRegular`.
    Resolved(Op),
    /// The sequence was consumed in full but matched nothing recognized;
    /// the caller returns to `ReadRegular` having done nothing.
    Unrecognized,
}

/// Feeds one byte into `state.seq`, per §4.6. Assumes `state.seq_idx` was
/// reset to 0 on entry to `ReadEsc` (the leading `ESC` itself is not part of
/// the accumulator).
pub fn feed(state: &mut EditorState, b: u8) -> EscOutcome {
    if state.seq_idx >= state.seq.len() {
        state.reset_escape_seq();
        return EscOutcome::Unrecognized;
    }
    state.seq[state.seq_idx] = b;
    state.seq_idx += 1;

    let outcome = match state.seq_idx {
        1 => {
            if state.seq[0] == b'[' || state.seq[0] == b'O' {
                EscOutcome::NeedMore
            } else {
                EscOutcome::Unrecognized
            }
        }
        2 => match (state.seq[0], state.seq[1]) {
            (b'[', b'A') => EscOutcome::Resolved(Op::HistoryPrev),
            (b'[', b'B') => EscOutcome::Resolved(Op::HistoryNext),
            (b'[', b'C') => EscOutcome::Resolved(Op::Right),
            (b'[', b'D') => EscOutcome::Resolved(Op::Left),
            (b'[', b'H') | (b'O', b'H') => EscOutcome::Resolved(Op::Home),
            (b'[', b'F') | (b'O', b'F') => EscOutcome::Resolved(Op::End),
            (b'[', b'0'..=b'9') => EscOutcome::NeedMore,
            _ => EscOutcome::NeedMore, // extended three-byte form: wait, then ignore
        },
        3 => {
            if state.seq[0] == b'[' && state.seq[1] == b'3' && state.seq[2] == b'~' {
                EscOutcome::Resolved(Op::DeleteRight)
            } else {
                EscOutcome::Unrecognized
            }
        }
        _ => unreachable!("seq_idx bounded by seq.len() above"),
    };

    if !matches!(outcome, EscOutcome::NeedMore) {
        state.reset_escape_seq();
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(bytes: &[u8]) -> EscOutcome {
        let mut state = EditorState::new();
        state.reset_escape_seq();
        let mut last = EscOutcome::NeedMore;
        for &b in bytes {
            last = feed(&mut state, b);
        }
        last
    }

    #[test]
    fn arrow_up_is_history_prev() {
        assert!(matches!(
            drive(b"[A"),
            EscOutcome::Resolved(Op::HistoryPrev)
        ));
    }

    #[test]
    fn delete_tilde_is_delete_right() {
        assert!(matches!(
            drive(b"[3~"),
            EscOutcome::Resolved(Op::DeleteRight)
        ));
    }

    #[test]
    fn ss3_home_and_end() {
        assert!(matches!(drive(b"OH"), EscOutcome::Resolved(Op::Home)));
        assert!(matches!(drive(b"OF"), EscOutcome::Resolved(Op::End)));
    }

    #[test]
    fn unknown_extended_sequence_is_consumed_and_ignored() {
        assert!(matches!(drive(b"[9~"), EscOutcome::Unrecognized));
    }

    #[test]
    fn garbage_introducer_is_unrecognized_immediately() {
        assert!(matches!(drive(b"Z"), EscOutcome::Unrecognized));
    }
}
