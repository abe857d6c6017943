/*!
The escape engine: a character-by-character transducer that tracks escape
sequences, quoted regions and bracket depth.

An [`EscapeState`] is configured once per format and then fed one character
at a time through [`consider`].
Every call returns the text the character stands for (an escape sequence
collapses to its literal, an escape trigger on its own yields nothing) and
updates the state that [`should_consider`] reports on.
Scanning code uses that predicate to ignore delimiters that appear inside
quotes or brackets, or right after an escape.

# Examples

```
use pattern_token::escape::{self, EscapeState};

let mut state = EscapeState::new()
    .escape_char('\\')
    .escape('n', "\n")
    .brackets('(', ')')
    .quote('"');

let emitted: String = "a\\n(b)".chars().map(|c| state.consider(c)).collect();
assert_eq!(emitted, "a\n(b)");
assert!(state.should_consider());

assert_eq!(escape::escape("say \"hi\"\n"), "say \\\"hi\\\"\\n");
assert_eq!(escape::de_escape("say \\\"hi\\\"\\n"), "say \"hi\"\n");
```

[`EscapeState`]: struct.EscapeState.html
[`consider`]: struct.EscapeState.html#method.consider
[`should_consider`]: struct.EscapeState.html#method.should_consider
*/

use std::collections::HashMap;
use std::sync::Arc;

use crate::cursor::Cursor;

/// Configuration shared by an `EscapeState` and all of its resets.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Config {
    escape_char: Option<char>,
    unicode_escape_char: char,
    /// Escape code -> literal replacement.
    escapes: HashMap<char, String>,
    quotes: Vec<char>,
    brackets: Vec<(char, char)>,
}

/// At most one of these is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Plain,
    Escaped,
    Unicode,
}

/// The state of the escape engine.
///
/// The configuration (escape trigger, escape table, quotes and brackets) is
/// set up with the builder methods and shared between an `EscapeState` and
/// every copy made by [`reset`](#method.reset).
/// The runtime flags and counters only ever change through
/// [`consider`](#method.consider).
#[derive(Clone, Debug)]
pub struct EscapeState {
    config: Arc<Config>,
    mode: Mode,
    prev_escaped: bool,
    /// Hex digits collected after a unicode escape, at most 4.
    pending: Vec<char>,
    /// Open flag per configured quote, parallel to `config.quotes`.
    open_quotes: Vec<bool>,
    /// Left and right counts per configured pair, parallel to
    /// `config.brackets`.
    counts: Vec<(usize, usize)>,
}

impl Default for EscapeState {
    fn default() -> Self {
        EscapeState {
            config: Arc::new(Config {
                escape_char: None,
                unicode_escape_char: 'u',
                escapes: HashMap::new(),
                quotes: Vec::new(),
                brackets: Vec::new(),
            }),
            mode: Mode::Plain,
            prev_escaped: false,
            pending: Vec::with_capacity(4),
            open_quotes: Vec::new(),
            counts: Vec::new(),
        }
    }
}

/// Configuration.
impl EscapeState {
    /// Creates an engine without escapes, quotes or brackets.
    ///
    /// Such an engine emits every character unchanged and always considers.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the character that introduces an escape sequence.
    pub fn escape_char(mut self, escape_char: char) -> Self {
        Arc::make_mut(&mut self.config).escape_char = Some(escape_char);
        self
    }

    /// Sets the code that, following the escape trigger, starts a four digit
    /// hexadecimal unicode escape. Defaults to `u`.
    pub fn unicode_escape_char(mut self, unicode_escape_char: char) -> Self {
        Arc::make_mut(&mut self.config).unicode_escape_char =
            unicode_escape_char;
        self
    }

    /// Maps the escape code `code` to `literal`.
    pub fn escape(mut self, code: char, literal: &str) -> Self {
        Arc::make_mut(&mut self.config)
            .escapes
            .insert(code, literal.to_owned());
        self
    }

    /// Maps the escape code `code` to itself, e.g. `\"` to `"`.
    pub fn escape_self(self, code: char) -> Self {
        let mut buf = [0u8; 4];
        let literal: &str = code.encode_utf8(&mut buf);
        self.escape(code, literal)
    }

    /// Registers a quote character.
    ///
    /// Within an open quote, brackets and other quote characters are taken
    /// literally.
    pub fn quote(mut self, quote: char) -> Self {
        Arc::make_mut(&mut self.config).quotes.push(quote);
        self.open_quotes.push(false);
        self
    }

    /// Registers a bracket pair with its own depth counter.
    pub fn brackets(mut self, left: char, right: char) -> Self {
        Arc::make_mut(&mut self.config).brackets.push((left, right));
        self.counts.push((0, 0));
        self
    }

    /// Returns a fresh engine sharing this configuration, with all runtime
    /// state cleared.
    ///
    /// Take a reset copy before each independent scan so that counts never
    /// leak from one scan into the next.
    pub fn reset(&self) -> Self {
        EscapeState {
            config: Arc::clone(&self.config),
            mode: Mode::Plain,
            prev_escaped: false,
            pending: Vec::with_capacity(4),
            open_quotes: vec![false; self.config.quotes.len()],
            counts: vec![(0, 0); self.config.brackets.len()],
        }
    }

    /// Returns the configured escape trigger, if any.
    pub fn get_escape_char(&self) -> Option<char> {
        self.config.escape_char
    }

    /// Returns the escape table as (code, literal) pairs.
    pub fn escapes(&self) -> impl Iterator<Item = (char, &str)> + '_ {
        self.config.escapes.iter().map(|(&code, literal)| (code, &literal[..]))
    }
}

/// The transducer.
impl EscapeState {
    /// Feeds the next input character to the engine and returns the text it
    /// stands for.
    ///
    /// This is the only place runtime state changes.
    /// Characters must be given in their original order.
    pub fn consider(&mut self, c: char) -> String {
        match self.mode {
            Mode::Unicode => {
                self.pending.push(c);
                if self.pending.len() < 4 {
                    return String::new();
                }
                let digits: String = self.pending.drain(..).collect();
                self.mode = Mode::Plain;
                let decoded = if digits.chars().all(|d| d.is_ascii_hexdigit()) {
                    u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)
                } else {
                    None
                };
                match decoded {
                    Some(decoded) => decoded.to_string(),
                    None => self.unicode_prefix() + &digits,
                }
            }
            Mode::Escaped => {
                self.mode = Mode::Plain;
                self.prev_escaped = true;
                if c == self.config.unicode_escape_char {
                    self.mode = Mode::Unicode;
                    return String::new();
                }
                match self.config.escapes.get(&c) {
                    Some(literal) => literal.clone(),
                    None => {
                        let mut unmapped = String::with_capacity(2);
                        unmapped.extend(self.config.escape_char);
                        unmapped.push(c);
                        unmapped
                    }
                }
            }
            Mode::Plain => {
                self.prev_escaped = false;
                if Some(c) == self.config.escape_char {
                    self.mode = Mode::Escaped;
                    return String::new();
                }
                match self.open_quotes.iter().position(|&open| open) {
                    None => self.track_outside_quotes(c),
                    Some(i) => {
                        if self.config.quotes[i] == c {
                            self.open_quotes[i] = false;
                        }
                    }
                }
                c.to_string()
            }
        }
    }

    /// Whether a scanner may treat the last considered character as a
    /// boundary.
    ///
    /// True exactly when no quote is open, every bracket pair is balanced, no
    /// escape is in progress and the previous character was not escaped.
    pub fn should_consider(&self) -> bool {
        self.mode == Mode::Plain
            && !self.prev_escaped
            && !self.is_in_quotes()
            && !self.is_in_brackets()
    }

    /// Whether any bracket pair has more of one side than the other.
    pub fn is_in_brackets(&self) -> bool {
        self.counts.iter().any(|&(left, right)| left != right)
    }

    /// Whether a quote is currently open.
    pub fn is_in_quotes(&self) -> bool {
        self.open_quotes.iter().any(|&open| open)
    }

    /// Whether an escape sequence is in progress.
    pub fn is_escaped(&self) -> bool {
        self.mode != Mode::Plain
    }

    /// Whether the previously considered character was part of an escape
    /// sequence.
    pub fn is_prev_escaped(&self) -> bool {
        self.prev_escaped
    }

    /// Whether `c` would change the engine's state if considered now.
    pub fn is_significant(&self, c: char) -> bool {
        self.mode != Mode::Plain
            || self.config.escape_char == Some(c)
            || self.config.quotes.contains(&c)
            || self.config.brackets.iter().any(|&(l, r)| l == c || r == c)
    }

    /// Renders an unfinished escape sequence literally.
    ///
    /// Scans that run out of input mid-escape append this so that no input is
    /// lost. Returns an empty string when no escape is in progress.
    pub fn trailing(&self) -> String {
        match self.mode {
            Mode::Plain => String::new(),
            Mode::Escaped => self.config.escape_char.into_iter().collect(),
            Mode::Unicode => {
                let mut trailing = self.unicode_prefix();
                trailing.extend(&self.pending);
                trailing
            }
        }
    }

    fn track_outside_quotes(&mut self, c: char) {
        let brackets = &self.config.brackets;
        if let Some(i) = brackets.iter().position(|&(left, _)| left == c) {
            self.counts[i].0 += 1;
        } else if let Some(i) = brackets.iter().position(|&(_, right)| right == c) {
            self.counts[i].1 += 1;
        } else if let Some(i) = self.config.quotes.iter().position(|&q| q == c) {
            self.open_quotes[i] = true;
        }
    }

    fn unicode_prefix(&self) -> String {
        let mut prefix = String::with_capacity(2);
        prefix.extend(self.config.escape_char);
        prefix.push(self.config.unicode_escape_char);
        prefix
    }
}

/// Returns the default escape format.
///
/// The trigger is `\`, followed by one of `0 b t n f r " ' \` or by `u` and
/// four hexadecimal digits. No quotes or brackets are registered.
pub fn java_format() -> EscapeState {
    EscapeState::new()
        .escape_char('\\')
        .unicode_escape_char('u')
        .escape('0', "\0")
        .escape('b', "\u{8}")
        .escape('t', "\t")
        .escape('n', "\n")
        .escape('f', "\u{c}")
        .escape('r', "\r")
        .escape_self('"')
        .escape_self('\'')
        .escape_self('\\')
}

/// Escapes `string` using the default format.
///
/// See [`java_format`](fn.java_format.html).
pub fn escape(string: &str) -> String {
    escape_with(string, &java_format())
}

/// Escapes `string` using the escape table of `format`.
///
/// Every character that is the single-character literal of a table entry is
/// replaced by the escape trigger followed by that entry's code.
/// Without an escape trigger, `string` is returned unchanged.
pub fn escape_with(string: &str, format: &EscapeState) -> String {
    let trigger = match format.get_escape_char() {
        Some(trigger) => trigger,
        None => return string.to_owned(),
    };
    let mut reverse: HashMap<char, char> = HashMap::new();
    for (code, literal) in format.escapes() {
        let mut chars = literal.chars();
        if let (Some(literal), None) = (chars.next(), chars.next()) {
            let entry = reverse.entry(literal).or_insert(code);
            // Several codes for one literal: keep the output deterministic.
            if code < *entry {
                *entry = code;
            }
        }
    }
    let mut escaped = String::with_capacity(string.len());
    for c in string.chars() {
        match reverse.get(&c) {
            Some(&code) => {
                escaped.push(trigger);
                escaped.push(code);
            }
            None => escaped.push(c),
        }
    }
    escaped
}

/// Resolves escape sequences in `string` using the default format.
///
/// Invalid escape codes are kept literally, including the trigger.
pub fn de_escape(string: &str) -> String {
    de_escape_with(string, &java_format())
}

/// Resolves escape sequences in `string` using `format`.
pub fn de_escape_with(string: &str, format: &EscapeState) -> String {
    Cursor::complete(string, format.reset())
}

/// Whether `string` is already in its escaped form under the default format,
/// i.e. contains nothing that [`escape`](fn.escape.html) would change.
pub fn is_canonical(string: &str) -> bool {
    escape(string) == string
}
