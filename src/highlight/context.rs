//! Mutable scan context threaded through the driver loop.
//!
//! One [ScanContext] is created per tokenization call and discarded at its
//! end; nothing survives across calls, so concurrent scans never share
//! mutable state.

use std::collections::HashMap;

use super::states::State;
use super::trace::{TraceEvent, TraceSink};

/// The three programs whose invocations the root state recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Program {
    Ffmpeg,
    Ffplay,
    Ffprobe,
}

impl Program {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "ffmpeg" => Some(Program::Ffmpeg),
            "ffplay" => Some(Program::Ffplay),
            "ffprobe" => Some(Program::Ffprobe),
            _ => None,
        }
    }

    /// ffplay and ffprobe read their input from a free argument, so a
    /// pending `-f lavfi` applies to the next free argument instead of a
    /// following `-i` flag.
    pub(crate) fn takes_free_input(self) -> bool {
        matches!(self, Program::Ffplay | Program::Ffprobe)
    }
}

/// Tracks which quote characters are open and at what stack depth.
///
/// At most one instance of a given quote character is open at a time: a
/// second occurrence always closes the first, never nests. When the caller
/// seeds a non-root initial state, the table is sealed to account for the
/// embedding quote the caller already consumed; a sealed table is never
/// empty, so whitespace does not unwind the stack to the bottom frame.
#[derive(Debug, Default)]
pub(crate) struct DelimiterTable {
    open: HashMap<char, usize>,
    sealed: bool,
}

impl DelimiterTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sealed() -> Self {
        Self {
            open: HashMap::new(),
            sealed: true,
        }
    }

    /// True when no quote is open and the table is not sealed.
    pub(crate) fn is_empty(&self) -> bool {
        !self.sealed && self.open.is_empty()
    }

    /// The greatest depth at which any quote is open. The sealed embedding
    /// quote sits at depth 0, same as "no quote".
    pub(crate) fn max_depth(&self) -> usize {
        self.open.values().copied().max().unwrap_or(0)
    }

    /// Record `delimiter` as opened at `depth`.
    pub(crate) fn open(&mut self, delimiter: char, depth: usize) {
        self.open.insert(delimiter, depth);
    }

    /// Close `delimiter` if open, returning the depth it was opened at.
    pub(crate) fn close(&mut self, delimiter: char) -> Option<usize> {
        self.open.remove(&delimiter)
    }
}

/// Everything the rule actions may read or mutate during one scan.
pub(crate) struct ScanContext<'a> {
    stack: Vec<State>,
    pub(crate) delimiters: DelimiterTable,
    pub(crate) program: Option<Program>,
    pub(crate) input_is_filtergraph: bool,
    trace: Option<&'a mut dyn TraceSink>,
}

impl<'a> ScanContext<'a> {
    pub(crate) fn new(
        initial: State,
        delimiters: DelimiterTable,
        trace: Option<&'a mut dyn TraceSink>,
    ) -> Self {
        Self {
            stack: vec![initial],
            delimiters,
            program: None,
            input_is_filtergraph: false,
            trace,
        }
    }

    pub(crate) fn current(&self) -> State {
        // The stack is never empty; the bottom frame is the initial state.
        *self.stack.last().expect("state stack is never empty")
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn push(&mut self, state: State) {
        self.stack.push(state);
        let depth = self.stack.len();
        self.record(TraceEvent::Pushed { state, depth });
    }

    /// Pop the current frame. The bottom frame stays: popping past it would
    /// leave the scanner without a mode.
    pub(crate) fn pop(&mut self) {
        if self.stack.len() > 1 {
            let state = self.stack.pop().expect("guarded by len check");
            let depth = self.stack.len();
            self.record(TraceEvent::Popped { state, depth });
        }
    }

    /// Drop frames until the stack is `depth` frames tall. Returns the
    /// number of frames discarded. The bottom frame always survives.
    pub(crate) fn unwind_to(&mut self, depth: usize) -> usize {
        let floor = depth.max(1);
        let mut discarded = 0;
        while self.stack.len() > floor {
            let state = self.stack.pop().expect("guarded by len check");
            discarded += 1;
            let remaining = self.stack.len();
            self.record(TraceEvent::Popped {
                state,
                depth: remaining,
            });
        }
        discarded
    }

    /// Stack index of the deepest filtergraph frame, if any.
    pub(crate) fn deepest_filtergraph(&self) -> Option<usize> {
        self.stack.iter().rposition(|s| *s == State::Filtergraph)
    }

    pub(crate) fn record(&mut self, event: TraceEvent) {
        if let Some(sink) = self.trace.as_mut() {
            sink.record(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_open_close() {
        let mut table = DelimiterTable::new();
        assert!(table.is_empty());

        table.open('"', 2);
        assert!(!table.is_empty());
        assert_eq!(table.max_depth(), 2);

        assert_eq!(table.close('"'), Some(2));
        assert!(table.is_empty());
        assert_eq!(table.close('"'), None);
    }

    #[test]
    fn test_delimiter_max_depth_across_kinds() {
        let mut table = DelimiterTable::new();
        table.open('"', 2);
        table.open('\'', 4);
        assert_eq!(table.max_depth(), 4);

        table.close('\'');
        assert_eq!(table.max_depth(), 2);
    }

    #[test]
    fn test_sealed_table_is_never_empty() {
        let table = DelimiterTable::sealed();
        assert!(!table.is_empty());
        // The embedding quote sits at depth 0.
        assert_eq!(table.max_depth(), 0);
    }

    #[test]
    fn test_unwind_keeps_bottom_frame() {
        let mut ctx = ScanContext::new(State::Root, DelimiterTable::new(), None);
        ctx.push(State::Filtergraph);
        ctx.push(State::FilterParams);

        assert_eq!(ctx.unwind_to(0), 2);
        assert_eq!(ctx.depth(), 1);
        assert_eq!(ctx.current(), State::Root);
    }

    #[test]
    fn test_deepest_filtergraph_index() {
        let mut ctx = ScanContext::new(State::Root, DelimiterTable::new(), None);
        assert_eq!(ctx.deepest_filtergraph(), None);

        ctx.push(State::Filtergraph);
        ctx.push(State::FilterParams);
        assert_eq!(ctx.deepest_filtergraph(), Some(1));
    }

    #[test]
    fn test_trace_records_stack_transitions() {
        let mut events: Vec<TraceEvent> = Vec::new();
        {
            let mut ctx = ScanContext::new(State::Root, DelimiterTable::new(), Some(&mut events));
            ctx.push(State::Filtergraph);
            ctx.pop();
        }
        assert_eq!(
            events,
            vec![
                TraceEvent::Pushed {
                    state: State::Filtergraph,
                    depth: 2
                },
                TraceEvent::Popped {
                    state: State::Filtergraph,
                    depth: 1
                },
            ]
        );
    }
}
