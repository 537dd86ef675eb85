//! Command-line interface for fflex
//! This binary tokenizes command-line / filtergraph samples the way the
//! documentation renderer does, for inspecting and debugging the scanner.
//!
//! Usage:
//!   fflex tokens `<path>` [--state `<state>`] [--format `<format>`]  - Print the token stream
//!   fflex highlight `<path>` [--state `<state>`]                   - ANSI-colored rendition
//!   fflex detect `<path>`                                        - Classify a sample
//!
//! `<path>` may be `-` to read the sample from stdin.

use clap::{Arg, ArgAction, Command};
use std::fmt;
use std::fs;
use std::io::Read;

use fflex::highlight::{
    classify, initial_state, tokenize_from, tokenize_with_trace, InitialState, SampleKind, Token,
    TokenCategory, TraceEvent, TraceSink,
};

fn main() {
    let matches = Command::new("fflex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for inspecting tokenized FFmpeg documentation samples")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("tokens")
                .about("Print the token stream for a sample")
                .arg(sample_arg())
                .arg(state_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format ('plain' or 'json')")
                        .default_value("plain"),
                )
                .arg(trace_arg()),
        )
        .subcommand(
            Command::new("highlight")
                .about("Print an ANSI-colored rendition of a sample")
                .arg(sample_arg())
                .arg(state_arg())
                .arg(trace_arg()),
        )
        .subcommand(
            Command::new("detect")
                .about("Classify a sample and report the chosen initial state")
                .arg(sample_arg()),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("tokens", sub)) => handle_tokens_command(
            sub.get_one::<String>("path").unwrap(),
            sub.get_one::<String>("state").unwrap(),
            sub.get_one::<String>("format").unwrap(),
            sub.get_flag("trace"),
        ),
        Some(("highlight", sub)) => handle_highlight_command(
            sub.get_one::<String>("path").unwrap(),
            sub.get_one::<String>("state").unwrap(),
            sub.get_flag("trace"),
        ),
        Some(("detect", sub)) => handle_detect_command(sub.get_one::<String>("path").unwrap()),
        _ => unreachable!(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn sample_arg() -> Arg {
    Arg::new("path")
        .help("Path to the sample, or '-' for stdin")
        .required(true)
        .index(1)
}

fn state_arg() -> Arg {
    Arg::new("state")
        .long("state")
        .help("Initial scanner state ('auto', 'root' or 'filtergraph')")
        .default_value("auto")
}

fn trace_arg() -> Arg {
    Arg::new("trace")
        .long("trace")
        .help("Report stack and quoting transitions on stderr")
        .action(ArgAction::SetTrue)
}

/// Errors reported by the CLI
#[derive(Debug)]
enum CliError {
    Read(String, std::io::Error),
    UnknownState(String),
    UnknownFormat(String),
    Declined,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Read(path, e) => write!(f, "Cannot read '{}': {}", path, e),
            CliError::UnknownState(name) => write!(
                f,
                "Unknown state '{}' (expected 'auto', 'root' or 'filtergraph')",
                name
            ),
            CliError::UnknownFormat(name) => {
                write!(f, "Unknown format '{}' (expected 'plain' or 'json')", name)
            }
            CliError::Declined => {
                write!(f, "Sample was not recognized; nothing to tokenize")
            }
        }
    }
}

impl std::error::Error for CliError {}

/// Read the sample, stripped of surrounding whitespace the way the
/// documentation renderer strips `<pre>` contents.
fn read_sample(path: &str) -> Result<String, CliError> {
    let raw = if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| CliError::Read(path.to_string(), e))?;
        buffer
    } else {
        fs::read_to_string(path).map_err(|e| CliError::Read(path.to_string(), e))?
    };
    Ok(raw.trim().to_string())
}

fn resolve_state(name: &str, sample: &str) -> Result<InitialState, CliError> {
    match name {
        "auto" => initial_state(sample).ok_or(CliError::Declined),
        "root" => Ok(InitialState::Root),
        "filtergraph" => Ok(InitialState::Filtergraph),
        other => Err(CliError::UnknownState(other.to_string())),
    }
}

/// Trace sink that reports every event on stderr.
struct StderrTrace;

impl TraceSink for StderrTrace {
    fn record(&mut self, event: TraceEvent) {
        eprintln!("[trace] {:?}", event);
    }
}

fn scan(sample: &str, state: InitialState, trace: bool) -> Vec<Token> {
    if trace {
        tokenize_with_trace(sample, state, &mut StderrTrace)
    } else {
        tokenize_from(sample, state)
    }
}

/// Handle the tokens command
fn handle_tokens_command(
    path: &str,
    state: &str,
    format: &str,
    trace: bool,
) -> Result<(), CliError> {
    let sample = read_sample(path)?;
    let state = resolve_state(state, &sample)?;
    let tokens = scan(&sample, state, trace);

    match format {
        "plain" => {
            for token in &tokens {
                println!("{}\t{:?}", token.category, token.text);
            }
        }
        "json" => {
            let json = serde_json::to_string_pretty(&tokens)
                .expect("token streams always serialize");
            println!("{}", json);
        }
        other => return Err(CliError::UnknownFormat(other.to_string())),
    }

    Ok(())
}

/// Handle the highlight command
fn handle_highlight_command(path: &str, state: &str, trace: bool) -> Result<(), CliError> {
    let sample = read_sample(path)?;

    // An unrecognized sample is printed unstyled, like the renderer's
    // plain preformatted fallback.
    let state = match resolve_state(state, &sample) {
        Ok(state) => state,
        Err(CliError::Declined) => {
            println!("{}", sample);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    for token in scan(&sample, state, trace) {
        print_styled(&token);
    }
    println!();

    Ok(())
}

/// Handle the detect command
fn handle_detect_command(path: &str) -> Result<(), CliError> {
    let sample = read_sample(path)?;
    let kind = classify(&sample);
    let state = match initial_state(&sample) {
        Some(InitialState::Root) => "root",
        Some(InitialState::Filtergraph) => "filtergraph",
        None => "none",
    };
    println!("kind: {:?}", kind);
    println!("initial state: {}", state);

    // The declined kinds are informational, not errors.
    if matches!(kind, SampleKind::CSource | SampleKind::ShellScript) {
        println!("note: this sample belongs to an external highlighter");
    }

    Ok(())
}

fn print_styled(token: &Token) {
    use crossterm::style::Stylize;

    let text = token.text.as_str();
    match token.category {
        TokenCategory::Namespace => print!("{}", text.dark_cyan().bold()),
        TokenCategory::Comment => print!("{}", text.dark_grey()),
        TokenCategory::CliArgument => print!("{}", text.dark_yellow()),
        TokenCategory::NameFunction => print!("{}", text.cyan()),
        TokenCategory::NameLabel => print!("{}", text.magenta()),
        TokenCategory::NameAttribute => print!("{}", text.green()),
        TokenCategory::LinkLabel => print!("{}", text.magenta().bold()),
        TokenCategory::StringLiteral => print!("{}", text.dark_green()),
        TokenCategory::StringEscape => print!("{}", text.dark_magenta()),
        TokenCategory::Operator => print!("{}", text.yellow()),
        TokenCategory::Constant => print!("{}", text.blue()),
        TokenCategory::Text | TokenCategory::Whitespace => print!("{}", text),
    }
}
