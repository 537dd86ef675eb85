//! # fflex
//!
//! A syntax-highlighting tokenizer for the command-line examples embedded in
//! FFmpeg documentation.
//!
//! The tokenizer understands two nested grammars: the outer shell-like
//! invocation of `ffmpeg`/`ffplay`/`ffprobe`, and the filtergraph
//! mini-language that appears as the argument of filter flags (or as a bare
//! expression). It emits a flat stream of categorized text spans whose
//! concatenation reproduces the input exactly; rendering those spans as
//! styled markup is the consumer's job.

pub mod highlight;

pub use highlight::{
    classify, detokenize, initial_state, tokenize, tokenize_from, tokenize_with_trace,
    InitialState, SampleKind, Token, TokenCategory, TraceEvent, TraceSink,
};
