//! Static rule tables for every scanner state.
//!
//! Grammar is data, not code: each state owns an ordered list of
//! `(pattern, action)` rules, compiled once behind [Lazy] and shared by all
//! scans. Patterns are anchored at the cursor; the first rule that matches
//! wins. Actions are a closed enum interpreted by the driver loop, which
//! keeps every context mutation in one place.
//!
//! Three rule sets are shared between states and prepended in the order the
//! grammar requires:
//!
//! - shell word: quoting, whitespace word breaks, backslash escapes
//! - link label: `[name]` connection points between filter stages
//! - separator: `,`/`;` between filter stages, quoting-sensitive

use once_cell::sync::Lazy;
use regex::Regex;

use super::states::State;
use super::tokens::TokenCategory;

/// What to do when a rule's pattern matches at the cursor.
///
/// `Emit` covers every rule whose only effect is one token for the whole
/// match; the remaining variants name the context transitions of the
/// grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    /// Emit the whole match as one token of the given category
    Emit(TokenCategory),

    /// Program-name prefix: emit Namespace, remember which program
    ProgramName,

    /// A flag whose argument is a filtergraph: emit CliArgument, then skip
    /// whitespace and enter the filtergraph state
    FilterFlag,

    /// `-f`: emit CliArgument, then skip whitespace and read the format name
    FormatFlag,

    /// `-i`: emit CliArgument; when a `-f lavfi` is pending, its input is a
    /// filtergraph
    InputFlag,

    /// Root fallback (zero-width): free arguments, or a pending filtergraph
    /// input for programs that read their input from a free argument
    RootFallback,

    /// Whitespace-bridge fallback (zero-width): replace the bridge frame
    /// with the target state
    EnterAfterSpaces(State),

    /// The `lavfi` format name: emit Constant, mark the next input as a
    /// filtergraph, return to root
    FormatSentinel,

    /// Any other format name (zero-width): clear the mark, return to root
    FormatOther,

    /// Quote character: open, or close and unwind to the opening depth;
    /// always emitted as StringLiteral
    Quote,

    /// Whitespace inside a shell word: outside any quote it terminates the
    /// whole argument context
    WordBreak,

    /// Backslash: emit StringEscape and take the next character verbatim
    BeginEscape,

    /// The character following a backslash: emit StringEscape, return
    EscapedChar,

    /// A filter name: emit NameFunction, then look for an `@instance` label
    FilterName,

    /// `@instance` after a filter name: emit NameLabel, return
    InstanceLabel,

    /// No instance label present (zero-width): return
    InstanceLabelEnd,

    /// `=` after a filter name: emit Operator, enter parameter parsing
    BeginParams,

    /// `key=`: emit NameAttribute for the key, Operator for `=`, then parse
    /// the value
    ParamKey,

    /// Bare first value with no key (zero-width): parse the value
    ParamValueFallback,

    /// `:` between parameters: emit Operator, back to the next `key=value`
    ParamNext,

    /// `,`/`;`: structural separator or literal text, depending on quoting
    Separator,
}

/// One pattern-action rule. A `None` pattern is the zero-width fallback that
/// matches unconditionally (and must change the state stack).
pub(crate) struct Rule {
    pattern: Option<Regex>,
    pub(crate) action: Action,
}

impl Rule {
    fn new(pattern: &str, action: Action) -> Self {
        let anchored = format!("^(?:{})", pattern);
        Self {
            pattern: Some(Regex::new(&anchored).expect("rule patterns are statically valid")),
            action,
        }
    }

    fn fallback(action: Action) -> Self {
        Self {
            pattern: None,
            action,
        }
    }

    /// Match this rule at the start of `rest`. Fallback rules yield an
    /// empty match.
    pub(crate) fn find<'t>(&self, rest: &'t str) -> Option<regex::Captures<'t>> {
        match &self.pattern {
            Some(re) => re.captures(rest),
            None => EMPTY.captures(rest),
        }
    }
}

static EMPTY: Lazy<Regex> = Lazy::new(|| Regex::new("^").expect("empty pattern is valid"));

/// Quoting, word breaks, and backslash escapes, shared by every state that
/// scans shell-word content.
fn shell_word_rules() -> Vec<Rule> {
    vec![
        Rule::new(r#"['"]"#, Action::Quote),
        Rule::new(r"\s+", Action::WordBreak),
        Rule::new(r"\\", Action::BeginEscape),
    ]
}

/// `[label]` link labels, optionally chained with `:`/`+`/`-` suffixes.
fn link_label_rules() -> Vec<Rule> {
    vec![Rule::new(
        r"\[\w+([:+-]\w+)*\]",
        Action::Emit(TokenCategory::LinkLabel),
    )]
}

/// `,`/`;` between filter stages.
fn separator_rules() -> Vec<Rule> {
    vec![Rule::new(r"[,;]", Action::Separator)]
}

static ROOT: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(r"(?:\./)?(ffplay|ffmpeg|ffprobe)\b", Action::ProgramName),
        Rule::new(r"#[^\n]*", Action::Emit(TokenCategory::Comment)),
        Rule::new(r"(-vf|-af|-filter_complex|-lavfi)\b", Action::FilterFlag),
        Rule::new(r"-f\b", Action::FormatFlag),
        Rule::new(r"-i\b", Action::InputFlag),
        Rule::new(r"-\S+", Action::Emit(TokenCategory::CliArgument)),
        Rule::new(r"\s+", Action::Emit(TokenCategory::Whitespace)),
        Rule::new(r"\\\n", Action::Emit(TokenCategory::StringEscape)),
        Rule::fallback(Action::RootFallback),
    ]
});

static SPACES_BEFORE_FILTERGRAPH: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(r"\s+", Action::Emit(TokenCategory::Whitespace)),
        Rule::fallback(Action::EnterAfterSpaces(State::Filtergraph)),
    ]
});

static SPACES_BEFORE_FORMAT_NAME: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(r"\s+", Action::Emit(TokenCategory::Whitespace)),
        Rule::fallback(Action::EnterAfterSpaces(State::FormatName)),
    ]
});

static FORMAT_NAME: Lazy<Vec<Rule>> = Lazy::new(|| {
    let mut rules = shell_word_rules();
    rules.push(Rule::new(r"lavfi", Action::FormatSentinel));
    rules.push(Rule::fallback(Action::FormatOther));
    rules
});

static FREE_ARGUMENT: Lazy<Vec<Rule>> = Lazy::new(|| {
    let mut rules = shell_word_rules();
    rules.push(Rule::new(r"(?s).", Action::Emit(TokenCategory::Text)));
    rules
});

static CHAR_ESCAPE: Lazy<Vec<Rule>> =
    Lazy::new(|| vec![Rule::new(r"(?s).", Action::EscapedChar)]);

static FILTERGRAPH: Lazy<Vec<Rule>> = Lazy::new(|| {
    let mut rules = shell_word_rules();
    rules.extend(link_label_rules());
    rules.extend(separator_rules());
    rules.push(Rule::new(r"\w+", Action::FilterName));
    rules.push(Rule::new(r"=", Action::BeginParams));
    rules
});

static FILTER_INSTANCE_LABEL: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(r"@\w+", Action::InstanceLabel),
        Rule::fallback(Action::InstanceLabelEnd),
    ]
});

static FILTER_PARAMS: Lazy<Vec<Rule>> = Lazy::new(|| {
    let mut rules = link_label_rules();
    rules.extend(shell_word_rules());
    rules.extend(separator_rules());
    rules.push(Rule::new(r"(\w+)=", Action::ParamKey));
    rules.push(Rule::fallback(Action::ParamValueFallback));
    rules
});

static FILTER_PARAM_VALUE: Lazy<Vec<Rule>> = Lazy::new(|| {
    let mut rules = link_label_rules();
    rules.extend(shell_word_rules());
    rules.extend(separator_rules());
    rules.push(Rule::new(r"[()]", Action::Emit(TokenCategory::Operator)));
    rules.push(Rule::new(r":", Action::ParamNext));
    rules.push(Rule::new(r"(?s).", Action::Emit(TokenCategory::Text)));
    rules
});

pub(crate) fn root() -> &'static [Rule] {
    &ROOT
}

pub(crate) fn spaces_before_filtergraph() -> &'static [Rule] {
    &SPACES_BEFORE_FILTERGRAPH
}

pub(crate) fn spaces_before_format_name() -> &'static [Rule] {
    &SPACES_BEFORE_FORMAT_NAME
}

pub(crate) fn format_name() -> &'static [Rule] {
    &FORMAT_NAME
}

pub(crate) fn free_argument() -> &'static [Rule] {
    &FREE_ARGUMENT
}

pub(crate) fn char_escape() -> &'static [Rule] {
    &CHAR_ESCAPE
}

pub(crate) fn filtergraph() -> &'static [Rule] {
    &FILTERGRAPH
}

pub(crate) fn filter_instance_label() -> &'static [Rule] {
    &FILTER_INSTANCE_LABEL
}

pub(crate) fn filter_params() -> &'static [Rule] {
    &FILTER_PARAMS
}

pub(crate) fn filter_param_value() -> &'static [Rule] {
    &FILTER_PARAM_VALUE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_anchor_at_cursor() {
        let rule = Rule::new(r"\w+", Action::FilterName);
        // Must not match mid-string: the cursor is the start of `rest`.
        assert!(rule.find(",scale").is_none());
        assert_eq!(
            rule.find("scale,crop").unwrap().get(0).unwrap().as_str(),
            "scale"
        );
    }

    #[test]
    fn test_fallback_matches_empty() {
        let rule = Rule::fallback(Action::RootFallback);
        let caps = rule.find("anything").unwrap();
        assert_eq!(caps.get(0).unwrap().as_str(), "");
    }

    #[test]
    fn test_root_flag_priority() {
        // -filter_complex must be taken by the filter-flag rule, not -f.
        let rules = root();
        let hit = rules
            .iter()
            .find_map(|r| r.find("-filter_complex ...").map(|_| r.action))
            .unwrap();
        assert_eq!(hit, Action::FilterFlag);

        // -framerate is neither -f nor a filter flag.
        let hit = rules
            .iter()
            .find_map(|r| r.find("-framerate 25").map(|_| r.action))
            .unwrap();
        assert_eq!(hit, Action::Emit(TokenCategory::CliArgument));
    }

    #[test]
    fn test_program_rule_allows_dot_slash_prefix() {
        let rules = root();
        let caps = rules[0].find("./ffmpeg -i x").unwrap();
        assert_eq!(caps.get(0).unwrap().as_str(), "./ffmpeg");
        assert_eq!(caps.get(1).unwrap().as_str(), "ffmpeg");
    }

    #[test]
    fn test_link_label_pattern_accepts_chained_suffixes() {
        let rule = &link_label_rules()[0];
        assert_eq!(rule.find("[out0]").unwrap().get(0).unwrap().as_str(), "[out0]");
        assert_eq!(
            rule.find("[a:b+c-d] rest").unwrap().get(0).unwrap().as_str(),
            "[a:b+c-d]"
        );
        assert!(rule.find("[]").is_none());
    }
}
