use crate::completion::CompletionSet;

/// Hard cap on edited-line length, independent of whatever capacity the host
/// hands the engine as `buf`.
pub const MAX_LINE_LEN: usize = 4096;

/// The engine's coarse-grained mode. `step` dispatches on this before
/// touching anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Init,
    GetColumns,
    GetColumns1,
    GetColumns2,
    ReadRegular,
    ReadEsc,
    Completion,
}

/// Scratch accumulator for the in-progress cursor-position report the
/// prober is waiting on.
#[derive(Default, Clone)]
pub struct ProbeScratch {
    pub buf: Vec<u8>,
    pub initial_col: Option<u16>,
}

impl ProbeScratch {
    pub fn reset(&mut self) {
        self.buf.clear();
        self.initial_col = None;
    }
}

/// The single long-lived record the engine owns for one editing session.
/// The host never mutates its interior; `len`/`pos` describe a window into
/// whatever `buf` slice the host passes to [`crate::engine::Engine::step`].
#[derive(Clone)]
pub struct EditorState {
    pub mode: Mode,
    pub len: usize,
    pub pos: usize,
    pub oldpos: usize,
    pub prompt: String,
    pub plen: usize,
    pub cols: u16,
    pub smart_term_connected: bool,
    pub maxrows: usize,
    pub history_index: usize,
    pub seq: [u8; 3],
    pub seq_idx: usize,
    pub completion_idx: usize,
    pub completions: CompletionSet,
    pub probe: ProbeScratch,
}

impl EditorState {
    pub fn new() -> Self {
        Self {
            mode: Mode::GetColumns,
            len: 0,
            pos: 0,
            oldpos: 0,
            prompt: String::new(),
            plen: 0,
            cols: 80,
            smart_term_connected: false,
            maxrows: 0,
            history_index: 0,
            seq: [0; 3],
            seq_idx: 0,
            completion_idx: 0,
            completions: CompletionSet::new(),
            probe: ProbeScratch::default(),
        }
    }

    pub fn set_prompt(&mut self, prompt: &str) {
        self.prompt = prompt.to_string();
        self.plen = self.prompt.len();
    }

    pub fn reset_escape_seq(&mut self) {
        self.seq = [0; 3];
        self.seq_idx = 0;
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}
