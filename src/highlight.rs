//! Tokenizer for command-line and filtergraph samples
//!
//! This module turns a raw documentation sample into an ordered stream of
//! categorized substrings for syntax-highlighted rendering.
//!
//! Structure:
//!     The scan is driven by a stack of named states, each backed by a static
//! table of regex rules tried in declaration order. The first rule matching at
//! the cursor wins; its action emits tokens and may push or pop stack frames
//! or update the scan context (open quotes, detected program, pending
//! filtergraph input).
//!
//! The pipeline consists of:
//! 1. Sample detection ([detect]) - picks the initial state, or declines
//! 2. The driver loop ([lexer]) - applies rule tables until the input ends
//! 3. Token emission ([tokens]) - categorized spans, coalesced per category
//!
//! Quoting
//!
//!     Shell words may be wrapped in single or double quotes, and quotes of
//!     one kind may appear inside quotes of the other kind at a deeper
//!     nesting level. The scan records the stack depth at which each quote
//!     character was opened; re-encountering the same character closes it
//!     and unwinds the stack to the recorded depth. Whether a `,`/`;` is a
//!     filtergraph separator or literal text depends on how the deepest open
//!     quote relates to the nearest enclosing filtergraph frame.

mod context;
pub mod detect;
pub mod lexer;
mod rules;
pub mod states;
pub mod tokens;
pub mod trace;

pub use detect::{classify, initial_state, SampleKind};
pub use lexer::{tokenize, tokenize_from, tokenize_with_trace, InitialState};
pub use states::State;
pub use tokens::{detokenize, Token, TokenCategory};
pub use trace::{TraceEvent, TraceSink};
