//! The closed set of scanner states.
//!
//! Each state resolves to a static, ordered rule table.
//! States that exist only to bridge two others (skipping the whitespace after
//! a flag, consuming the single character after a backslash, reading the
//! optional `@instance` label after a filter name) are explicit variants, not
//! ad hoc sub-modes, so the whole state machine is enumerable and the stack
//! contents are printable.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::rules::{self, Rule};

/// A named scanner mode. The active mode is the top of the state stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    /// The outer command-line invocation: program name, flags, free arguments
    Root,

    /// Whitespace bridge between a filter flag and its filtergraph argument
    SpacesBeforeFiltergraph,

    /// Whitespace bridge between `-f` and its format-name argument
    SpacesBeforeFormatName,

    /// The shell word following `-f`; recognizes the `lavfi` virtual demuxer
    FormatName,

    /// A free (non-flag) command-line argument
    FreeArgument,

    /// The single character following a backslash
    CharEscape,

    /// A chain of filter stages separated by `,`/`;`
    Filtergraph,

    /// The optional `@instance` label directly after a filter name
    FilterInstanceLabel,

    /// `key=value` parameter pairs inside a filter stage
    FilterParams,

    /// The value side of a filter parameter
    FilterParamValue,
}

impl State {
    /// The ordered rule table for this state. Tables are built once and
    /// shared; rule order is match priority.
    pub(crate) fn rules(self) -> &'static [Rule] {
        match self {
            State::Root => rules::root(),
            State::SpacesBeforeFiltergraph => rules::spaces_before_filtergraph(),
            State::SpacesBeforeFormatName => rules::spaces_before_format_name(),
            State::FormatName => rules::format_name(),
            State::FreeArgument => rules::free_argument(),
            State::CharEscape => rules::char_escape(),
            State::Filtergraph => rules::filtergraph(),
            State::FilterInstanceLabel => rules::filter_instance_label(),
            State::FilterParams => rules::filter_params(),
            State::FilterParamValue => rules::filter_param_value(),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Root => "root",
            State::SpacesBeforeFiltergraph => "spaces-before-filtergraph",
            State::SpacesBeforeFormatName => "spaces-before-format-name",
            State::FormatName => "format-name",
            State::FreeArgument => "free-argument",
            State::CharEscape => "char-escape",
            State::Filtergraph => "filtergraph",
            State::FilterInstanceLabel => "filter-instance-label",
            State::FilterParams => "filter-params",
            State::FilterParamValue => "filter-param-value",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_state_has_rules() {
        let all = [
            State::Root,
            State::SpacesBeforeFiltergraph,
            State::SpacesBeforeFormatName,
            State::FormatName,
            State::FreeArgument,
            State::CharEscape,
            State::Filtergraph,
            State::FilterInstanceLabel,
            State::FilterParams,
            State::FilterParamValue,
        ];
        for state in all {
            assert!(!state.rules().is_empty(), "{} has an empty rule table", state);
        }
    }

    #[test]
    fn test_display_names() {
        assert_eq!(State::Filtergraph.to_string(), "filtergraph");
        assert_eq!(State::FilterParamValue.to_string(), "filter-param-value");
    }
}
