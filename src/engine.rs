use crate::append_buffer::AppendBuffer;
use crate::completion::{CompletionProducer, NoCompletions};
use crate::dispatch::{self, Op};
use crate::error::EditorError;
use crate::escape::{self, EscOutcome};
use crate::hints::{Hint, HintsProducer, NoHints};
use crate::history::{DEFAULT_HISTORY_MAX_LEN, HistoryStore};
use crate::host::{ByteSink, DeadlineTimer, KeySource, NeverTimer};
use crate::probe;
use crate::render;
use crate::state::{EditorState, MAX_LINE_LEN, Mode};

/// Outcome of one [`Engine::step`] call. Exactly one input byte of progress
/// is made before a `step` returns, whatever the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// No byte was available, or a sub-protocol hasn't finished yet.
    NeedMore,
    /// The user pressed Enter; the line is `len` bytes, fetch it with
    /// [`Engine::line`].
    Committed(usize),
    /// Ctrl-D on an empty buffer.
    Eof,
    /// Ctrl-C.
    Interrupted,
    /// The sink rejected a write.
    Error,
}

/// The engine: terminal probing, character dispatch, escape parsing,
/// completion browsing and redraw, all behind one [`Engine::step`] call per
/// input byte. Generic over the four host capability seams so hosts pay no
/// dynamic-dispatch cost; hosts that don't need completion, hints or a
/// timer can use [`NoCompletions`], [`NoHints`] and [`NeverTimer`].
pub struct Engine<K, S, C = NoCompletions, H = NoHints, T = NeverTimer> {
    key_source: K,
    sink: S,
    completions_producer: C,
    hints_producer: H,
    timer: T,

    buf: Vec<u8>,
    state: EditorState,
    history: HistoryStore,

    multiline: bool,
    bold_prompt: bool,
    probing_enabled: bool,
    probe_query_sent: bool,
    resume_after_probe: bool,
    pending_error: Option<EditorError>,
}

impl<K, S> Engine<K, S, NoCompletions, NoHints, NeverTimer>
where
    K: KeySource,
    S: ByteSink,
{
    /// Construct an engine with no completion, hints, or timer source.
    pub fn new(buf_capacity: usize, key_source: K, sink: S) -> Self {
        Engine::with_host(
            buf_capacity,
            key_source,
            sink,
            NoCompletions,
            NoHints,
            NeverTimer,
        )
    }
}

impl<K, S, C, H, T> Engine<K, S, C, H, T>
where
    K: KeySource,
    S: ByteSink,
    C: CompletionProducer,
    H: HintsProducer,
    T: DeadlineTimer,
{
    /// Construct an engine with every host capability supplied.
    pub fn with_host(
        buf_capacity: usize,
        key_source: K,
        sink: S,
        completions_producer: C,
        hints_producer: H,
        timer: T,
    ) -> Self {
        let cap = buf_capacity.clamp(2, MAX_LINE_LEN + 1);
        Self {
            key_source,
            sink,
            completions_producer,
            hints_producer,
            timer,
            buf: vec![0u8; cap],
            state: EditorState::new(),
            history: HistoryStore::new(DEFAULT_HISTORY_MAX_LEN),
            multiline: false,
            bold_prompt: true,
            probing_enabled: true,
            probe_query_sent: false,
            resume_after_probe: false,
            pending_error: None,
        }
    }

    /// Statically disable smart-terminal probing (§9 open question): the
    /// machine skips `GetColumns*` entirely and starts in `Init` with
    /// `cols = 80`, `smart_term_connected = false`.
    pub fn with_probing(mut self, enabled: bool) -> Self {
        self.probing_enabled = enabled;
        if !enabled {
            self.state.mode = Mode::Init;
        }
        self
    }

    pub fn set_multi_line(&mut self, multiline: bool) {
        self.multiline = multiline;
    }

    pub fn smart_terminal_connected(&self) -> bool {
        self.state.smart_term_connected
    }

    /// The line as of the last `Committed` result, or the in-progress edit.
    pub fn line(&self) -> &str {
        std::str::from_utf8(&self.buf[..self.state.len]).unwrap_or("")
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn history_add(&mut self, line: &str) -> Result<(), EditorError> {
        self.history.add(line)
    }

    pub fn history_set_max_len(&mut self, len: usize) {
        self.history.set_max_len(len);
    }

    pub fn history_save(&self, path: impl AsRef<std::path::Path>) -> Result<(), EditorError> {
        self.history.save(path)
    }

    pub fn history_load(&mut self, path: impl AsRef<std::path::Path>) -> Result<(), EditorError> {
        self.history.load(path)
    }

    /// `ESC [ H ESC [ 2 J` plus a forced re-probe; the in-progress line
    /// survives (only a *fresh session* clears the buffer, and this isn't
    /// one — `GetColumns*` falls through to `ReadRegular`, not `Init`, when
    /// it was entered this way).
    pub fn clear_screen(&mut self) {
        self.write_out(b"\x1b[H\x1b[2J");
        self.state.maxrows = 0;
        if self.probing_enabled {
            self.resume_after_probe = true;
            self.state.mode = Mode::GetColumns;
            self.probe_query_sent = false;
        }
    }

    pub fn update_prompt(&mut self, prompt: &str) {
        self.state.set_prompt(prompt);
        self.redraw();
    }

    pub fn refresh_editor(&mut self) {
        self.redraw();
    }

    /// Diagnostic loop: prints each incoming byte's value until the literal
    /// bytes `quit` have been typed in sequence.
    pub fn print_key_codes(&mut self) -> Result<(), EditorError> {
        let mut recent: Vec<u8> = Vec::new();
        loop {
            if let Some(b) = self.key_source.poll_byte() {
                let printable = if (0x20..0x7f).contains(&b) {
                    b as char
                } else {
                    '?'
                };
                self.sink
                    .write(format!("'{printable}' 0x{b:02x} ({b})\r\n").as_bytes())?;
                recent.push(b);
                if recent.len() > 4 {
                    recent.remove(0);
                }
                if recent.ends_with(b"quit") {
                    return Ok(());
                }
            }
        }
    }

    /// One step of progress: at most one input byte is consumed.
    pub fn step(&mut self, prompt: &str) -> StepResult {
        self.state.set_prompt(prompt);
        let result = self.step_inner();
        if self.pending_error.take().is_some() {
            return StepResult::Error;
        }
        result
    }

    /// C-shaped wrapper: positive length on commit, `-1` on need-more /
    /// interrupt / error, `-2` on EOF.
    pub fn edit(&mut self, out: &mut [u8], prompt: &str) -> i32 {
        match self.step(prompt) {
            StepResult::Committed(len) => {
                let n = len.min(out.len());
                out[..n].copy_from_slice(&self.buf[..n]);
                n as i32
            }
            StepResult::Eof => -2,
            StepResult::NeedMore | StepResult::Interrupted | StepResult::Error => -1,
        }
    }

    fn write_out(&mut self, bytes: &[u8]) {
        if let Err(e) = self.sink.write(bytes) {
            self.pending_error = Some(e);
        }
    }

    fn step_inner(&mut self) -> StepResult {
        match self.state.mode {
            Mode::GetColumns => self.step_get_columns(),
            Mode::GetColumns1 => self.step_get_columns1(),
            Mode::GetColumns2 => self.step_get_columns2(),
            Mode::Init => {
                self.do_init();
                self.step_read_regular()
            }
            Mode::ReadRegular => self.step_read_regular(),
            Mode::ReadEsc => self.step_read_esc(),
            Mode::Completion => self.step_completion(),
        }
    }

    // ── Terminal probing (§4.2) ────────────────────────────────────────────

    fn step_get_columns(&mut self) -> StepResult {
        if !self.probe_query_sent {
            self.state.probe.reset();
            self.write_out(b"\x1b[6n");
            self.timer.arm(probe::PROBE_TIMEOUT);
            self.probe_query_sent = true;
            return StepResult::NeedMore;
        }
        match self.key_source.poll_byte() {
            Some(b) => {
                probe::accumulate(&mut self.state.probe, b);
                if probe::reply_terminated(&self.state.probe) {
                    match probe::parse_reply(&self.state.probe) {
                        Some((_rows, cols)) => {
                            self.state.probe.initial_col = Some(cols);
                            self.state.mode = Mode::GetColumns1;
                            self.probe_query_sent = false;
                        }
                        None => self.fallback_dumb(),
                    }
                } else if probe::buffer_full(&self.state.probe) {
                    self.fallback_dumb();
                }
                StepResult::NeedMore
            }
            None => {
                if self.timer.elapsed() {
                    self.fallback_dumb();
                }
                StepResult::NeedMore
            }
        }
    }

    fn step_get_columns1(&mut self) -> StepResult {
        if !self.probe_query_sent {
            self.state.probe.buf.clear();
            self.write_out(b"\x1b[999C\x1b[6n");
            self.timer.arm(probe::PROBE_TIMEOUT);
            self.probe_query_sent = true;
            return StepResult::NeedMore;
        }
        match self.key_source.poll_byte() {
            Some(b) => {
                probe::accumulate(&mut self.state.probe, b);
                if probe::reply_terminated(&self.state.probe) {
                    match probe::parse_reply(&self.state.probe) {
                        Some((_rows, cols)) => {
                            self.state.cols = cols.max(1);
                            self.state.smart_term_connected = true;
                            self.state.mode = Mode::GetColumns2;
                            self.probe_query_sent = false;
                        }
                        None => self.fallback_dumb(),
                    }
                } else if probe::buffer_full(&self.state.probe) {
                    self.fallback_dumb();
                }
                StepResult::NeedMore
            }
            None => {
                if self.timer.elapsed() {
                    self.fallback_dumb();
                }
                StepResult::NeedMore
            }
        }
    }

    fn step_get_columns2(&mut self) -> StepResult {
        let initial = self.state.probe.initial_col.unwrap_or(self.state.cols);
        let n = self.state.cols.saturating_sub(initial);
        if n > 0 {
            self.write_out(format!("\x1b[{n}D").as_bytes());
        }
        self.state.probe.reset();
        if self.resume_after_probe {
            self.resume_after_probe = false;
            self.state.mode = Mode::ReadRegular;
            self.redraw();
            StepResult::NeedMore
        } else {
            self.do_init();
            self.step_read_regular()
        }
    }

    fn fallback_dumb(&mut self) {
        self.state.cols = 80;
        self.state.smart_term_connected = false;
        self.state.probe.reset();
        self.probe_query_sent = false;
        if self.resume_after_probe {
            self.resume_after_probe = false;
            self.state.mode = Mode::ReadRegular;
        } else {
            self.state.mode = Mode::Init;
        }
    }

    // ── Session bootstrap (§4.1 rule 2) ────────────────────────────────────

    fn do_init(&mut self) {
        self.buf.iter_mut().for_each(|b| *b = 0);
        self.state.len = 0;
        self.state.pos = 0;
        self.state.oldpos = 0;
        self.state.maxrows = 0;
        self.state.history_index = 0;
        self.history.push_scratch("");
        self.state.mode = Mode::ReadRegular;
        if self.state.smart_term_connected {
            self.redraw();
        } else {
            let prompt = self.state.prompt.clone();
            self.write_out(prompt.as_bytes());
        }
    }

    fn end_session(&mut self) {
        self.state.mode = if self.probing_enabled && self.state.smart_term_connected {
            Mode::GetColumns
        } else {
            Mode::Init
        };
        self.probe_query_sent = false;
    }

    // ── ReadRegular / dispatch (§4.5) ───────────────────────────────────────

    fn step_read_regular(&mut self) -> StepResult {
        let Some(b) = self.key_source.poll_byte() else {
            return StepResult::NeedMore;
        };
        let op = dispatch::dispatch_regular_byte(b);
        self.apply_op(op)
    }

    fn step_read_esc(&mut self) -> StepResult {
        let Some(b) = self.key_source.poll_byte() else {
            return StepResult::NeedMore;
        };
        match escape::feed(&mut self.state, b) {
            EscOutcome::NeedMore => StepResult::NeedMore,
            EscOutcome::Resolved(op) => {
                self.state.mode = Mode::ReadRegular;
                self.apply_op(op)
            }
            EscOutcome::Unrecognized => {
                self.state.mode = Mode::ReadRegular;
                StepResult::NeedMore
            }
        }
    }

    fn apply_op(&mut self, op: Op) -> StepResult {
        match op {
            Op::Home => {
                dispatch::move_home(&mut self.state);
                self.redraw();
                StepResult::NeedMore
            }
            Op::Left => {
                dispatch::move_left(&mut self.state);
                self.redraw();
                StepResult::NeedMore
            }
            Op::Right => {
                dispatch::move_right(&mut self.state);
                self.redraw();
                StepResult::NeedMore
            }
            Op::End => {
                dispatch::move_end(&mut self.state);
                self.redraw();
                StepResult::NeedMore
            }
            Op::Interrupted => StepResult::Interrupted,
            Op::CtrlDOrEof => {
                if self.state.len == 0 {
                    self.history.pop_scratch();
                    self.end_session();
                    StepResult::Eof
                } else {
                    dispatch::delete_right(&mut self.buf, &mut self.state);
                    self.redraw();
                    StepResult::NeedMore
                }
            }
            Op::DeleteRight => {
                dispatch::delete_right(&mut self.buf, &mut self.state);
                self.redraw();
                StepResult::NeedMore
            }
            Op::Backspace => {
                dispatch::backspace(&mut self.buf, &mut self.state);
                self.redraw();
                StepResult::NeedMore
            }
            Op::EnterCompletion => {
                self.enter_completion();
                StepResult::NeedMore
            }
            Op::DeleteToEnd => {
                dispatch::delete_to_end(&mut self.state);
                self.redraw();
                StepResult::NeedMore
            }
            Op::ClearScreen => {
                if self.state.smart_term_connected {
                    self.write_out(b"\x1b[H\x1b[2J");
                }
                self.state.maxrows = 0;
                self.redraw();
                StepResult::NeedMore
            }
            Op::Commit => {
                self.history.pop_scratch();
                let line = self.line().to_string();
                if let Err(e) = self.history.add(&line) {
                    eprintln!("history add failed: {e}");
                }
                if self.state.smart_term_connected {
                    self.redraw_with(false);
                }
                self.write_out(b"\r\n");
                self.end_session();
                StepResult::Committed(line.len())
            }
            Op::HistoryNext => {
                self.shift_history(-1);
                StepResult::NeedMore
            }
            Op::HistoryPrev => {
                self.shift_history(1);
                StepResult::NeedMore
            }
            Op::Transpose => {
                dispatch::transpose(&mut self.buf, &mut self.state);
                self.redraw();
                StepResult::NeedMore
            }
            Op::DeleteLine => {
                dispatch::delete_line(&mut self.state);
                self.redraw();
                StepResult::NeedMore
            }
            Op::DeleteWordBack => {
                dispatch::delete_word_back(&mut self.buf, &mut self.state);
                self.redraw();
                StepResult::NeedMore
            }
            Op::EnterEsc => {
                self.state.mode = Mode::ReadEsc;
                self.state.reset_escape_seq();
                StepResult::NeedMore
            }
            Op::Insert(b) => {
                self.insert_byte(b);
                StepResult::NeedMore
            }
            Op::Ignore => StepResult::NeedMore,
        }
    }

    fn insert_byte(&mut self, b: u8) {
        let before_len = self.state.len;
        dispatch::insert(&mut self.buf, &mut self.state, b);
        if self.state.len == before_len {
            return;
        }
        if !self.state.smart_term_connected {
            self.write_out(&[b]);
            return;
        }
        let appended_at_end = self.state.pos == self.state.len;
        let fits_one_row =
            !self.multiline && self.state.plen + self.state.len < self.state.cols as usize;
        if appended_at_end && fits_one_row && self.compute_hint().is_none() {
            self.write_out(&[b]);
        } else {
            self.redraw();
        }
    }

    // ── History navigation (§4.5, §4.8) ────────────────────────────────────

    fn shift_history(&mut self, dir: isize) {
        if self.history.len() <= 1 {
            return;
        }
        let current = self.line().to_string();
        self.history.set_newest(&current);

        let max_index = self.history.len() - 1;
        let new_index = if dir > 0 {
            (self.state.history_index + 1).min(max_index)
        } else {
            self.state.history_index.saturating_sub(1)
        };
        if new_index == self.state.history_index {
            return;
        }
        self.state.history_index = new_index;
        if let Some(entry) = self.history.from_newest(new_index).map(str::to_string) {
            self.load_into_buffer(&entry);
        }
        self.redraw();
    }

    fn load_into_buffer(&mut self, text: &str) {
        let bytes = text.as_bytes();
        let cap = self.buf.len().saturating_sub(1).min(MAX_LINE_LEN);
        let n = bytes.len().min(cap);
        self.buf[..n].copy_from_slice(&bytes[..n]);
        self.state.len = n;
        self.state.pos = n;
    }

    // ── Completion (§4.7) ───────────────────────────────────────────────────

    fn enter_completion(&mut self) {
        self.state.completions.clear();
        let current = self.line().to_string();
        self.completions_producer
            .complete(&current, &mut self.state.completions);

        let kept: Vec<String> = (0..self.state.completions.len())
            .filter_map(|i| self.state.completions.get(i).map(str::to_string))
            .filter(|c| c != &current)
            .collect();
        self.state.completions.clear();
        for c in kept {
            self.state.completions.add(&c);
        }

        if self.state.completions.is_empty() {
            self.write_out(b"\x07");
            return;
        }
        self.state.completion_idx = 0;
        self.state.mode = Mode::Completion;
        self.redraw();
    }

    fn step_completion(&mut self) -> StepResult {
        let Some(b) = self.key_source.poll_byte() else {
            return StepResult::NeedMore;
        };
        match b {
            0x09 => {
                let total = self.state.completions.len();
                let next = self.state.completion_idx + 1;
                if next > total {
                    self.write_out(b"\x07");
                    self.state.completion_idx = 0;
                } else {
                    self.state.completion_idx = next;
                }
                self.redraw();
                StepResult::NeedMore
            }
            0x1b => {
                self.exit_completion(false);
                self.redraw();
                StepResult::NeedMore
            }
            other => {
                self.exit_completion(true);
                self.redraw();
                let op = dispatch::dispatch_regular_byte(other);
                self.apply_op(op)
            }
        }
    }

    fn exit_completion(&mut self, accept: bool) {
        if accept
            && self.state.completion_idx < self.state.completions.len()
            && let Some(candidate) = self
                .state
                .completions
                .get(self.state.completion_idx)
                .map(str::to_string)
        {
            self.load_into_buffer(&candidate);
        }
        self.state.completions.clear();
        self.state.completion_idx = 0;
        self.state.mode = Mode::ReadRegular;
    }

    // ── Rendering (§4.3, §4.4) ──────────────────────────────────────────────

    fn compute_hint(&mut self) -> Option<Hint> {
        if self.state.plen + self.state.len + 1 >= self.state.cols as usize {
            return None;
        }
        let current = self.line().to_string();
        self.hints_producer.hint(&current)
    }

    /// Bytes currently on display: the highlighted completion candidate
    /// while browsing, or the real buffer otherwise.
    fn display_view(&self) -> (Vec<u8>, usize, usize) {
        if self.state.mode == Mode::Completion
            && self.state.completion_idx < self.state.completions.len()
        {
            let candidate = self
                .state
                .completions
                .get(self.state.completion_idx)
                .unwrap_or("");
            let bytes = candidate.as_bytes().to_vec();
            let len = bytes.len();
            (bytes, len, len)
        } else {
            (
                self.buf[..self.state.len].to_vec(),
                self.state.len,
                self.state.pos,
            )
        }
    }

    fn redraw(&mut self) {
        self.redraw_with(true);
    }

    fn redraw_with(&mut self, with_hints: bool) {
        if !self.state.smart_term_connected {
            return;
        }
        let (view_buf, view_len, view_pos) = self.display_view();
        let hint = if with_hints {
            self.compute_hint()
        } else {
            None
        };

        let mut scratch = self.state.clone();
        scratch.len = view_len;
        scratch.pos = view_pos;

        let mut out = AppendBuffer::new();
        if self.multiline {
            render::render_multi_line(
                &mut scratch,
                &view_buf,
                hint.as_ref(),
                self.bold_prompt,
                &mut out,
            );
        } else {
            render::render_single_line(
                &mut scratch,
                &view_buf,
                hint.as_ref(),
                self.bold_prompt,
                &mut out,
            );
        }
        self.state.oldpos = scratch.oldpos;
        self.state.maxrows = scratch.maxrows;
        self.write_out(out.as_bytes());
    }
}
