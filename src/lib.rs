//! A non-blocking, re-entrant single-line editor engine for embedded and
//! terminal contexts. The host drives the engine one input byte at a time
//! through [`engine::Engine::step`]; nothing in this crate blocks on I/O or
//! spawns a thread.

pub mod append_buffer;
pub mod completion;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod escape;
pub mod hints;
pub mod history;
pub mod host;
pub mod probe;
pub mod render;
pub mod state;

pub use completion::{CompletionProducer, CompletionSet, NoCompletions};
pub use engine::{Engine, StepResult};
pub use error::EditorError;
pub use hints::{Hint, HintsProducer, NoHints};
pub use history::HistoryStore;
pub use host::{ByteSink, DeadlineTimer, InstantTimer, KeySource, NeverTimer};
pub use state::{EditorState, Mode};
