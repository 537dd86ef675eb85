//! Sample detection.
//!
//! Documentation code blocks are not labeled with a language, so the kind of
//! a sample is guessed from its shape: a handful of prefix checks tried in
//! order, no execution and no full parse. The outcome picks the scanner's
//! initial state, or declines the sample entirely (C sources and shell
//! scripts are somebody else's lexer; prose is rendered unhighlighted).

use once_cell::sync::Lazy;
use regex::Regex;

use super::lexer::InitialState;

/// What a raw sample looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// An OpenCL/C kernel source snippet
    CSource,

    /// A shell script or `echo` command
    ShellScript,

    /// An invocation of ffmpeg/ffplay/ffprobe, optionally preceded by
    /// comment lines
    CommandLine,

    /// A bare filtergraph expression
    Filtergraph,

    /// None of the above
    Unknown,
}

static SHEBANG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#!.*/sh").expect("detection patterns are statically valid"));

static COMMAND_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-i|ffplay|ffmpeg|ffprobe)").expect("detection patterns are statically valid")
});

static COMMENTED_COMMAND_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#.+\n)*(\./)?(ffplay|ffmpeg|ffprobe)")
        .expect("detection patterns are statically valid")
});

static FILTERGRAPH_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\[(\w|-)+\]|\w+=)").expect("detection patterns are statically valid")
});

static FILTER_WITH_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+\[\w\]").expect("detection patterns are statically valid"));

/// Classify a raw sample by shape. Leading whitespace is ignored.
pub fn classify(sample: &str) -> SampleKind {
    let code = sample.trim_start();

    if code.starts_with("__kernel") {
        SampleKind::CSource
    } else if SHEBANG.is_match(code) || code.starts_with("echo ") {
        SampleKind::ShellScript
    } else if COMMAND_LINE.is_match(code) || COMMENTED_COMMAND_LINE.is_match(code) {
        SampleKind::CommandLine
    } else if FILTERGRAPH_HEAD.is_match(code) || FILTER_WITH_LABEL.is_match(code) {
        SampleKind::Filtergraph
    } else {
        SampleKind::Unknown
    }
}

/// Pick the scanner's initial state for a sample, or decline it.
pub fn initial_state(sample: &str) -> Option<InitialState> {
    match classify(sample) {
        SampleKind::CommandLine => Some(InitialState::Root),
        SampleKind::Filtergraph => Some(InitialState::Filtergraph),
        SampleKind::CSource | SampleKind::ShellScript | SampleKind::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ffmpeg -i in.mp4 out.mp4", SampleKind::CommandLine)]
    #[case("  ffplay -f lavfi testsrc", SampleKind::CommandLine)]
    #[case("./ffprobe -show_format in.mkv", SampleKind::CommandLine)]
    #[case("-i input.avi -r 24 output.avi", SampleKind::CommandLine)]
    #[case("# read the file\nffmpeg -i in.mp4 out.mp4", SampleKind::CommandLine)]
    #[case("[in] scale=320:240 [out]", SampleKind::Filtergraph)]
    #[case("scale=320:240,crop=100:100", SampleKind::Filtergraph)]
    #[case("split[a][b]", SampleKind::Filtergraph)]
    #[case("__kernel void blur(...)", SampleKind::CSource)]
    #[case("#!/bin/sh\nffmpeg -i x", SampleKind::ShellScript)]
    #[case("echo 'hello' > list.txt", SampleKind::ShellScript)]
    #[case("Just some prose about filters.", SampleKind::Unknown)]
    #[case("", SampleKind::Unknown)]
    fn test_classification(#[case] sample: &str, #[case] expected: SampleKind) {
        assert_eq!(classify(sample), expected);
    }

    #[test]
    fn test_initial_state_mapping() {
        assert_eq!(
            initial_state("ffmpeg -i a b"),
            Some(InitialState::Root)
        );
        assert_eq!(
            initial_state("scale=1:2"),
            Some(InitialState::Filtergraph)
        );
        assert_eq!(initial_state("#!/bin/sh\nls"), None);
        assert_eq!(initial_state("plain prose"), None);
    }

    #[test]
    fn test_shebang_requires_sh() {
        // A python shebang is not a shell script, and not a command line.
        assert_eq!(classify("#!/usr/bin/python\nprint(1)"), SampleKind::Unknown);
    }
}
