//! The driver loop.
//!
//! Holds the state stack, advances the scan cursor, applies the current
//! state's rule table, and interprets rule actions. All context mutation
//! happens here, in one match over the closed [Action] set; the rule tables
//! themselves are pure data.
//!
//! Totality
//!
//!     Tokenization cannot fail. Every zero-width rule changes the state
//!     stack (checked by the driver, which otherwise falls through), and when
//!     no rule matches at the cursor the driver classifies one character as
//!     plain text and moves on. Malformed input degrades to more Text and
//!     Operator tokens instead of an error.

use regex::Captures;

use super::context::{DelimiterTable, Program, ScanContext};
use super::rules::Action;
use super::states::State;
use super::tokens::{push_span, Token, TokenCategory};
use super::trace::{TraceEvent, TraceSink};

/// Where a scan starts. `Filtergraph` is for samples that are a bare filter
/// expression rather than a full command line; the driver then accounts for
/// the embedding quote the caller already consumed, so whitespace does not
/// unwind the scan out of the filtergraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialState {
    #[default]
    Root,
    Filtergraph,
}

/// Tokenize a command-line sample.
pub fn tokenize(source: &str) -> Vec<Token> {
    run(source, InitialState::Root, None)
}

/// Tokenize a sample starting from the given state.
pub fn tokenize_from(source: &str, initial: InitialState) -> Vec<Token> {
    run(source, initial, None)
}

/// Tokenize with a diagnostic sink observing stack and quoting transitions.
/// The sink never changes the emitted tokens.
pub fn tokenize_with_trace(
    source: &str,
    initial: InitialState,
    sink: &mut dyn TraceSink,
) -> Vec<Token> {
    run(source, initial, Some(sink))
}

fn run(source: &str, initial: InitialState, trace: Option<&mut dyn TraceSink>) -> Vec<Token> {
    let (state, delimiters) = match initial {
        InitialState::Root => (State::Root, DelimiterTable::new()),
        InitialState::Filtergraph => (State::Filtergraph, DelimiterTable::sealed()),
    };
    let mut ctx = ScanContext::new(state, delimiters, trace);
    let mut tokens = Vec::new();
    let mut cursor = 0;

    while cursor < source.len() {
        let rest = &source[cursor..];
        let mut advanced = None;

        for rule in ctx.current().rules() {
            let Some(caps) = rule.find(rest) else {
                continue;
            };
            let matched = caps.get(0).expect("group 0 always present");

            if matched.as_str().is_empty() {
                // Zero-width rules must move the stack; otherwise skip them
                // so the catch-all below keeps the scan advancing.
                let before = (ctx.depth(), ctx.current());
                apply(&mut ctx, &mut tokens, rule.action, &caps);
                if (ctx.depth(), ctx.current()) == before {
                    continue;
                }
                advanced = Some(0);
            } else {
                apply(&mut ctx, &mut tokens, rule.action, &caps);
                advanced = Some(matched.end());
            }
            break;
        }

        match advanced {
            Some(len) => cursor += len,
            None => {
                // No rule matched here: one character of plain text.
                let len = rest
                    .chars()
                    .next()
                    .map(|c| c.len_utf8())
                    .unwrap_or(rest.len());
                push_span(&mut tokens, TokenCategory::Text, &rest[..len]);
                cursor += len;
            }
        }
    }

    tokens
}

/// Interpret one rule action. `caps` is the rule's match at the cursor.
fn apply(ctx: &mut ScanContext, tokens: &mut Vec<Token>, action: Action, caps: &Captures) {
    let text = caps.get(0).expect("group 0 always present").as_str();

    match action {
        Action::Emit(category) => push_span(tokens, category, text),

        Action::ProgramName => {
            let name = caps.get(1).expect("program name capture").as_str();
            ctx.program = Program::from_name(name);
            push_span(tokens, TokenCategory::Namespace, text);
        }

        Action::FilterFlag => {
            push_span(tokens, TokenCategory::CliArgument, text);
            ctx.push(State::SpacesBeforeFiltergraph);
        }

        Action::FormatFlag => {
            push_span(tokens, TokenCategory::CliArgument, text);
            ctx.push(State::SpacesBeforeFormatName);
        }

        Action::InputFlag => {
            push_span(tokens, TokenCategory::CliArgument, text);
            if ctx.input_is_filtergraph {
                ctx.input_is_filtergraph = false;
                ctx.push(State::SpacesBeforeFiltergraph);
            }
        }

        Action::RootFallback => {
            // Free argument. For programs that read their input from a free
            // argument, a pending `-f lavfi` makes it a filtergraph.
            if ctx.input_is_filtergraph && ctx.program.is_some_and(Program::takes_free_input) {
                ctx.input_is_filtergraph = false;
                ctx.push(State::Filtergraph);
            } else {
                ctx.push(State::FreeArgument);
            }
        }

        Action::EnterAfterSpaces(target) => {
            ctx.pop();
            ctx.push(target);
        }

        Action::FormatSentinel => {
            push_span(tokens, TokenCategory::Constant, text);
            ctx.input_is_filtergraph = true;
            ctx.pop();
        }

        Action::FormatOther => {
            ctx.input_is_filtergraph = false;
            ctx.pop();
        }

        Action::Quote => {
            let delimiter = text.chars().next().expect("quote match is one char");
            push_span(tokens, TokenCategory::StringLiteral, text);
            if let Some(opened_at) = ctx.delimiters.close(delimiter) {
                let discarded = ctx.unwind_to(opened_at);
                ctx.record(TraceEvent::QuoteClosed {
                    delimiter,
                    opened_at,
                    discarded,
                });
            } else {
                let depth = ctx.depth();
                ctx.delimiters.open(delimiter, depth);
                ctx.record(TraceEvent::QuoteOpened { delimiter, depth });
            }
        }

        Action::WordBreak => {
            push_span(tokens, TokenCategory::Whitespace, text);
            // Whitespace outside any quote terminates the argument context.
            if ctx.delimiters.is_empty() {
                ctx.unwind_to(1);
            }
        }

        Action::BeginEscape => {
            push_span(tokens, TokenCategory::StringEscape, text);
            ctx.push(State::CharEscape);
        }

        Action::EscapedChar => {
            push_span(tokens, TokenCategory::StringEscape, text);
            ctx.pop();
        }

        Action::FilterName => {
            push_span(tokens, TokenCategory::NameFunction, text);
            ctx.push(State::FilterInstanceLabel);
        }

        Action::InstanceLabel => {
            push_span(tokens, TokenCategory::NameLabel, text);
            ctx.pop();
        }

        Action::InstanceLabelEnd => ctx.pop(),

        Action::BeginParams => {
            push_span(tokens, TokenCategory::Operator, text);
            ctx.push(State::FilterParams);
        }

        Action::ParamKey => {
            let key = caps.get(1).expect("param key capture").as_str();
            push_span(tokens, TokenCategory::NameAttribute, key);
            push_span(tokens, TokenCategory::Operator, "=");
            ctx.push(State::FilterParamValue);
        }

        Action::ParamValueFallback => ctx.push(State::FilterParamValue),

        Action::ParamNext => {
            push_span(tokens, TokenCategory::Operator, text);
            ctx.pop();
        }

        Action::Separator => separator(ctx, tokens, text),
    }
}

/// Decide whether a `,`/`;` is a structural separator or literal text.
///
/// The separator is literal only when the deepest open quote was opened
/// above the nearest enclosing filtergraph frame (a quoted span inside a
/// filter parameter). A quote at or below that frame is shell-level quoting
/// of the filtergraph itself and does not suspend the grammar. Without any
/// filtergraph frame the character is kept structural and the stack is left
/// alone.
fn separator(ctx: &mut ScanContext, tokens: &mut Vec<Token>, text: &str) {
    let separator = text.chars().next().expect("separator match is one char");
    let quote_depth = ctx.delimiters.max_depth();

    match ctx.deepest_filtergraph() {
        Some(index) if index + 1 < quote_depth => {
            push_span(tokens, TokenCategory::Text, text);
            ctx.record(TraceEvent::SeparatorLiteral {
                separator,
                quote_depth,
            });
        }
        Some(index) => {
            push_span(tokens, TokenCategory::Operator, text);
            ctx.unwind_to(index + 1);
            ctx.record(TraceEvent::SeparatorStructural {
                separator,
                unwound_to: index + 1,
            });
        }
        None => {
            push_span(tokens, TokenCategory::Operator, text);
            let depth = ctx.depth();
            ctx.record(TraceEvent::SeparatorStructural {
                separator,
                unwound_to: depth,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::tokens::detokenize;

    fn pairs(tokens: &[Token]) -> Vec<(TokenCategory, &str)> {
        tokens.iter().map(|t| (t.category, t.text.as_str())).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_program_and_flags() {
        let tokens = tokenize("ffmpeg -y -i in.mp4");
        assert_eq!(
            pairs(&tokens),
            vec![
                (TokenCategory::Namespace, "ffmpeg"),
                (TokenCategory::Whitespace, " "),
                (TokenCategory::CliArgument, "-y"),
                (TokenCategory::Whitespace, " "),
                (TokenCategory::CliArgument, "-i"),
                (TokenCategory::Whitespace, " "),
                (TokenCategory::Text, "in.mp4"),
            ]
        );
    }

    #[test]
    fn test_comment_line() {
        let tokens = tokenize("# transcode\nffmpeg -i x");
        assert_eq!(tokens[0], Token::new(TokenCategory::Comment, "# transcode"));
        assert_eq!(tokens[1], Token::new(TokenCategory::Whitespace, "\n"));
        assert_eq!(tokens[2], Token::new(TokenCategory::Namespace, "ffmpeg"));
    }

    #[test]
    fn test_line_continuation() {
        let tokens = tokenize("ffmpeg \\\n-i x");
        assert!(tokens.contains(&Token::new(TokenCategory::StringEscape, "\\\n")));
    }

    #[test]
    fn test_backslash_escape_in_free_argument() {
        let tokens = tokenize("echo a\\nb");
        // "\n" (backslash + n) is a two-character escape sequence.
        assert!(tokens.contains(&Token::new(TokenCategory::StringEscape, "\\n")));
        assert_eq!(detokenize(&tokens), "echo a\\nb");
    }

    #[test]
    fn test_unterminated_quote_is_lossless() {
        let source = "ffmpeg -vf \"scale=1:2";
        assert_eq!(detokenize(&tokenize(source)), source);
    }

    #[test]
    fn test_unknown_characters_degrade_to_text() {
        let source = "scale=(1+2)*3";
        let tokens = tokenize_from(source, InitialState::Filtergraph);
        assert_eq!(detokenize(&tokens), source);
    }

    #[test]
    fn test_seeded_scan_survives_whitespace() {
        // With the embedding quote accounted for, whitespace must not end
        // the filtergraph context.
        let tokens = tokenize_from("scale, crop", InitialState::Filtergraph);
        assert_eq!(
            pairs(&tokens),
            vec![
                (TokenCategory::NameFunction, "scale"),
                (TokenCategory::Operator, ","),
                (TokenCategory::Whitespace, " "),
                (TokenCategory::NameFunction, "crop"),
            ]
        );
    }

    #[test]
    fn test_trace_reports_quote_transitions() {
        let mut events: Vec<TraceEvent> = Vec::new();
        tokenize_with_trace("-vf 'a'", InitialState::Root, &mut events);
        assert!(events
            .iter()
            .any(|e| matches!(e, TraceEvent::QuoteOpened { delimiter: '\'', .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, TraceEvent::QuoteClosed { delimiter: '\'', .. })));
    }
}
