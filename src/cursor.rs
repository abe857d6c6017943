/*!
A seekable cursor over a fixed character buffer.

The "current character" of a [`Cursor`] is the one [`next`] returns; the
index always points at it.
Moving past either end of the buffer is not an error: every operation clamps
silently and returns what it gathered so far.

Scans that take an [`EscapeState`] only stop at a character the engine
considers, so delimiters inside quotes, brackets or escape sequences are
skipped over.

# Examples

```
use pattern_token::Cursor;
use pattern_token::escape::{self, EscapeState};

let mut cursor = Cursor::new("key = \"a, b\", rest");
let key = cursor.read_until(|c| c == '=');
assert_eq!(key.trim_end(), "key");
cursor.next();
cursor.consume_all(|c| c == ' ');

let mut engine = escape::java_format().quote('"');
let value = cursor.read_until_considering(|c| c == ',', &mut engine);
assert_eq!(value, "\"a, b\"");
assert_eq!(cursor.peek(), Some(','));
```

[`Cursor`]: struct.Cursor.html
[`next`]: struct.Cursor.html#method.next
[`EscapeState`]: ../escape/struct.EscapeState.html
*/

use crate::context::Context;
use crate::escape::EscapeState;
use crate::rule::{self, Rule};

/// A cursor over the characters of a string.
///
/// Invariant: `0 <= index <= len`.
#[derive(Clone, Debug)]
pub struct Cursor {
    content: String,
    chars: Vec<char>,
    /// Byte offset of each character within `content`, followed by the total
    /// byte length.
    offsets: Vec<usize>,
    index: usize,
    /// Context used by rule-based scans.
    context: Context,
}

/// Basic functions.
impl Cursor {
    /// Creates a cursor at the start of `content`.
    pub fn new(content: &str) -> Self {
        let mut chars = Vec::with_capacity(content.len());
        let mut offsets = Vec::with_capacity(content.len() + 1);
        for (offset, c) in content.char_indices() {
            chars.push(c);
            offsets.push(offset);
        }
        offsets.push(content.len());
        Cursor {
            content: content.to_owned(),
            chars,
            offsets,
            index: 0,
            context: Context::new(),
        }
    }

    /// Streams all of `string` through `engine` and returns what it emits.
    ///
    /// This fully applies the engine's escape table. An escape left unfinished
    /// at the end of `string` is kept literally.
    pub fn complete(string: &str, mut engine: EscapeState) -> String {
        Cursor::new(string).remaining_considering(&mut engine)
    }

    /// The complete content this cursor runs over.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The number of characters in the buffer.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the buffer has no characters at all.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The current character index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The byte offset of the current character within `content()`.
    pub fn byte_offset(&self) -> usize {
        self.offsets[self.index]
    }

    /// The context rule-based scans match with.
    ///
    /// Names bound by `set` rules during those scans can be read from here.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Mutable access to the context rule-based scans match with.
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }
}

/// Movement.
impl Cursor {
    /// Moves to index `i`. Out of bounds indices leave the cursor unchanged.
    pub fn jump_to(&mut self, i: usize) {
        if i <= self.chars.len() {
            self.index = i;
        }
    }

    /// Whether there is a current character.
    pub fn has_next(&self) -> bool {
        self.index < self.chars.len()
    }

    /// Whether there are characters before the index.
    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    /// Returns the current character without moving.
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.index).cloned()
    }

    /// Returns the character before the index without moving.
    pub fn peek_previous(&self) -> Option<char> {
        if self.has_previous() {
            Some(self.chars[self.index - 1])
        } else {
            None
        }
    }

    /// Returns the current character and moves past it.
    pub fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.index += 1;
        Some(c)
    }

    /// Moves back one character and returns it.
    pub fn previous(&mut self) -> Option<char> {
        let c = self.peek_previous()?;
        self.index -= 1;
        Some(c)
    }

    /// Moves back one character, staying put at the start.
    pub fn back(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Moves back `n` characters, stopping at the start.
    pub fn back_n(&mut self, n: usize) {
        self.index = self.index.saturating_sub(n);
    }

    /// Returns the next `n` characters, or fewer at the end of input.
    pub fn next_n(&mut self, n: usize) -> String {
        let end = (self.index + n).min(self.chars.len());
        let taken: String = self.chars[self.index..end].iter().collect();
        self.index = end;
        taken
    }

    /// Returns the next `n` characters that are not in `ignore`, together with
    /// any ignored characters in between.
    ///
    /// For `ababa`, `next_n_ignoring(3, &['b'])` returns `ababa`.
    pub fn next_n_ignoring(&mut self, n: usize, ignore: &[char]) -> String {
        let mut taken = String::new();
        let mut counted = 0;
        while counted < n {
            match self.next() {
                Some(c) => {
                    taken.push(c);
                    if !ignore.contains(&c) {
                        counted += 1;
                    }
                }
                None => break,
            }
        }
        taken
    }

    /// Whether the current character exists and satisfies `pred`.
    pub fn is_next<F>(&self, pred: F) -> bool
    where
        F: Fn(char) -> bool,
    {
        self.peek().map_or(false, pred)
    }

    /// Moves forward one character if it satisfies `pred`.
    ///
    /// Returns whether the cursor moved.
    pub fn consume_if<F>(&mut self, pred: F) -> bool
    where
        F: Fn(char) -> bool,
    {
        if self.is_next(pred) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Moves forward while the current character satisfies `pred`.
    ///
    /// Returns the number of characters skipped.
    pub fn consume_all<F>(&mut self, pred: F) -> usize
    where
        F: Fn(char) -> bool,
    {
        let start = self.index;
        while self.is_next(&pred) {
            self.index += 1;
        }
        self.index - start
    }

    /// Moves back while the character before the index satisfies `pred`.
    ///
    /// Afterwards the current character is the leftmost of the matching run.
    pub fn back_while<F>(&mut self, pred: F)
    where
        F: Fn(char) -> bool,
    {
        while self.peek_previous().map_or(false, &pred) {
            self.index -= 1;
        }
    }
}

/// Plain scans.
impl Cursor {
    /// Returns characters up to, not including, the first one satisfying
    /// `pred`, which becomes the current character.
    pub fn read_until<F>(&mut self, pred: F) -> String
    where
        F: Fn(char) -> bool,
    {
        let mut taken = String::new();
        while let Some(c) = self.peek() {
            if pred(c) {
                break;
            }
            taken.push(c);
            self.index += 1;
        }
        taken
    }

    /// Like `read_until`, stopping at any character of `set`.
    pub fn read_until_any(&mut self, set: &[char]) -> String {
        self.read_until(|c| set.contains(&c))
    }

    /// Returns characters while they satisfy `pred`.
    pub fn read_while<F>(&mut self, pred: F) -> String
    where
        F: Fn(char) -> bool,
    {
        self.read_until(|c| !pred(c))
    }

    /// Returns the longest run of characters whose accumulated string
    /// satisfies `pred`, checking after each character.
    pub fn read_while_accumulated<F>(&mut self, mut pred: F) -> String
    where
        F: FnMut(&str) -> bool,
    {
        let mut taken = String::new();
        while let Some(c) = self.peek() {
            taken.push(c);
            if !pred(&taken) {
                taken.pop();
                break;
            }
            self.index += 1;
        }
        taken
    }

    /// Like `read_while_accumulated`, with the accumulated string required to
    /// match `rule` completely.
    pub fn read_while_rule(&mut self, rule: &Rule) -> String {
        let completed = rule::completed(rule.clone());
        self.read_while_accumulated(|candidate| {
            completed.matches(candidate).is_successful()
        })
    }

    /// Returns everything from the index to the end.
    pub fn remaining(&mut self) -> String {
        self.read_until(|_| false)
    }
}

/// Scans gated by an escape engine.
impl Cursor {
    /// Returns the engine's output for every character up to the first one
    /// that satisfies `pred` while the engine considers.
    ///
    /// The engine is not reset here.
    pub fn read_until_considering<F>(
        &mut self,
        pred: F,
        engine: &mut EscapeState,
    ) -> String
    where
        F: Fn(char) -> bool,
    {
        self.scan_considering(pred, engine, true)
    }

    /// Like `read_until_considering`, but returns the input characters
    /// unchanged instead of the engine's output.
    pub fn read_raw_until_considering<F>(
        &mut self,
        pred: F,
        engine: &mut EscapeState,
    ) -> String
    where
        F: Fn(char) -> bool,
    {
        self.scan_considering(pred, engine, false)
    }

    /// Returns the engine's output up to the first considered position at
    /// which `rule` matches.
    pub fn read_until_rule(
        &mut self,
        rule: &Rule,
        engine: &mut EscapeState,
    ) -> String {
        let mut taken = String::new();
        while let Some(c) = self.peek() {
            let offset = self.offsets[self.index];
            self.index += 1;
            let emitted = engine.consider(c);
            if engine.should_consider()
                && rule
                    .match_at(&self.content, offset, &mut self.context)
                    .is_successful()
            {
                self.index -= 1;
                break;
            }
            taken.push_str(&emitted);
        }
        taken.push_str(&engine.trailing());
        taken
    }

    /// Returns the engine's output up to the first considered character for
    /// which the output so far, followed by that character, satisfies `pred`.
    ///
    /// The engine is not reset here.
    pub fn read_until_accumulated_considering<F>(
        &mut self,
        mut pred: F,
        engine: &mut EscapeState,
    ) -> String
    where
        F: FnMut(&str) -> bool,
    {
        let mut taken = String::new();
        while let Some(c) = self.next() {
            let emitted = engine.consider(c);
            if engine.should_consider() {
                let mut candidate = taken.clone();
                candidate.push(c);
                if pred(&candidate) {
                    self.back();
                    break;
                }
            }
            taken.push_str(&emitted);
        }
        taken.push_str(&engine.trailing());
        taken
    }

    /// Like `read_until_accumulated_considering`, with the accumulated string
    /// required to match `rule` completely.
    pub fn read_until_accumulated_rule(
        &mut self,
        rule: &Rule,
        engine: &mut EscapeState,
    ) -> String {
        let completed = rule::completed(rule.clone());
        self.read_until_accumulated_considering(
            |candidate| completed.matches(candidate).is_successful(),
            engine,
        )
    }

    /// Reads raw characters until the engine considers again, including the
    /// character that balanced it.
    ///
    /// Starting on an opening bracket, this reads the whole bracketed region.
    /// If the input ends first, everything is returned and the engine is left
    /// unbalanced, which callers can check with `should_consider`.
    pub fn read_balanced(&mut self, engine: &mut EscapeState) -> String {
        let mut taken = String::new();
        while let Some(c) = self.next() {
            engine.consider(c);
            taken.push(c);
            if engine.should_consider() {
                break;
            }
        }
        taken
    }

    /// Streams the rest of the input through `engine`.
    pub fn remaining_considering(&mut self, engine: &mut EscapeState) -> String {
        self.read_until_considering(|_| false, engine)
    }

    fn scan_considering<F>(
        &mut self,
        pred: F,
        engine: &mut EscapeState,
        translate: bool,
    ) -> String
    where
        F: Fn(char) -> bool,
    {
        let mut taken = String::new();
        while let Some(c) = self.next() {
            let emitted = engine.consider(c);
            if engine.should_consider() && pred(c) {
                self.back();
                break;
            }
            if translate {
                taken.push_str(&emitted);
            } else {
                taken.push(c);
            }
        }
        if translate {
            taken.push_str(&engine.trailing());
        }
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::{self, EscapeState};
    use crate::rule::literal;
    use pretty_assertions::assert_eq;

    #[test]
    fn movement_clamps() {
        let mut cursor = Cursor::new("ab");
        assert!(!cursor.has_previous());
        assert_eq!(cursor.previous(), None);
        cursor.back();
        assert_eq!(cursor.index(), 0);
        assert_eq!(cursor.next(), Some('a'));
        assert_eq!(cursor.next(), Some('b'));
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.index(), 2);
        assert!(!cursor.has_next());
        cursor.back_n(10);
        assert_eq!(cursor.index(), 0);
        cursor.jump_to(7);
        assert_eq!(cursor.index(), 0);
        cursor.jump_to(2);
        assert_eq!(cursor.index(), 2);
        assert_eq!(cursor.peek_previous(), Some('b'));
    }

    #[test]
    fn next_n_stops_at_end() {
        let mut cursor = Cursor::new("abc");
        assert_eq!(cursor.next_n(2), "ab");
        assert_eq!(cursor.next_n(5), "c");
        assert_eq!(cursor.next_n(1), "");
    }

    #[test]
    fn next_n_ignoring() {
        let mut cursor = Cursor::new("ababa!");
        assert_eq!(cursor.next_n_ignoring(3, &['b']), "ababa");
        assert_eq!(cursor.peek(), Some('!'));
        let mut cursor = Cursor::new("bbb");
        assert_eq!(cursor.next_n_ignoring(1, &['b']), "bbb");
    }

    #[test]
    fn multibyte_offsets() {
        let mut cursor = Cursor::new("\u{e9}t\u{e9}");
        assert_eq!(cursor.len(), 3);
        cursor.next();
        assert_eq!(cursor.byte_offset(), 2);
        assert_eq!(cursor.remaining(), "t\u{e9}");
        assert_eq!(cursor.byte_offset(), 5);
    }

    #[test]
    fn consume() {
        let mut cursor = Cursor::new("   x");
        assert!(!cursor.consume_if(|c| c == 'x'));
        assert_eq!(cursor.consume_all(|c| c == ' '), 3);
        assert!(cursor.consume_if(|c| c == 'x'));
        assert!(!cursor.consume_if(|_| true));
    }

    #[test]
    fn back_while() {
        let mut cursor = Cursor::new("baabbbt");
        cursor.jump_to(6);
        cursor.back_while(|c| c == 'b');
        assert_eq!(cursor.index(), 3);
        cursor.back_while(|c| c == 'x');
        assert_eq!(cursor.index(), 3);
    }

    #[test]
    fn read_until_and_while() {
        let mut cursor = Cursor::new("abc;def");
        assert_eq!(cursor.read_until_any(&[';', ',']), "abc");
        assert_eq!(cursor.peek(), Some(';'));
        cursor.next();
        assert_eq!(cursor.read_while(|c| c == 'd' || c == 'e'), "de");
        assert_eq!(cursor.remaining(), "f");
        assert_eq!(cursor.read_until(|_| true), "");
    }

    #[test]
    fn read_while_accumulated_is_greedy_prefix() {
        let mut cursor = Cursor::new("12345");
        let taken = cursor.read_while_accumulated(|s| {
            s.parse::<u32>().map_or(false, |n| n < 1000)
        });
        assert_eq!(taken, "123");
        assert_eq!(cursor.peek(), Some('4'));
    }

    #[test]
    fn read_while_rule() {
        let mut cursor = Cursor::new("ababx");
        let ab = rule::repeating(rule::one_of(&["a", "b"]));
        assert_eq!(cursor.read_while_rule(&ab), "abab");
        assert_eq!(cursor.peek(), Some('x'));
    }

    #[test]
    fn considering_skips_quoted_and_bracketed_delimiters() {
        let mut engine = escape::java_format().quote('"').brackets('[', ']');
        let mut cursor = Cursor::new("\"a;b\"[c;d]\\;e;f");
        let taken = cursor.read_until_considering(|c| c == ';', &mut engine);
        assert_eq!(taken, "\"a;b\"[c;d]\\;e");
        assert_eq!(cursor.next(), Some(';'));
        assert_eq!(cursor.remaining(), "f");
    }

    #[test]
    fn raw_considering_keeps_escapes() {
        let mut engine = escape::java_format().quote('"');
        let mut cursor = Cursor::new("\"a\\\",b\",c");
        let taken = cursor.read_raw_until_considering(|c| c == ',', &mut engine);
        assert_eq!(taken, "\"a\\\",b\"");
        assert_eq!(cursor.peek(), Some(','));
    }

    #[test]
    fn considering_flushes_dangling_escape() {
        let mut engine = escape::java_format();
        let mut cursor = Cursor::new("ab\\");
        assert_eq!(cursor.remaining_considering(&mut engine), "ab\\");
    }

    #[test]
    fn read_until_rule() {
        let mut engine = EscapeState::new().brackets('(', ')');
        let mut cursor = Cursor::new("a(->)b->c");
        let taken = cursor.read_until_rule(&literal("->"), &mut engine);
        assert_eq!(taken, "a(->)b");
        assert_eq!(cursor.remaining(), "->c");
    }

    #[test]
    fn read_until_accumulated_considering() {
        let mut engine = escape::java_format();
        let mut cursor = Cursor::new("a\\tbc");
        let taken = cursor
            .read_until_accumulated_considering(|s| s.ends_with("\tb"), &mut engine);
        assert_eq!(taken, "a\t");
        assert_eq!(cursor.remaining(), "bc");

        let mut engine = escape::java_format();
        let mut cursor = Cursor::new("xyz");
        let taken = cursor.read_until_accumulated_considering(|_| false, &mut engine);
        assert_eq!(taken, "xyz");
        assert!(!cursor.has_next());
    }

    #[test]
    fn read_until_accumulated_rule() {
        let mut engine = escape::java_format().quote('"');
        let mut cursor = Cursor::new("\"1=\"2=rest");
        let assignment = rule::regex(".*=").unwrap();
        let taken = cursor.read_until_accumulated_rule(&assignment, &mut engine);
        assert_eq!(taken, "\"1=\"2");
        assert_eq!(cursor.remaining(), "=rest");
    }

    #[test]
    fn read_balanced() {
        let mut engine = escape::java_format().brackets('(', ')').quote('"');
        let mut cursor = Cursor::new("(a, (b), \")\")rest");
        assert_eq!(cursor.read_balanced(&mut engine), "(a, (b), \")\")");
        assert!(engine.should_consider());
        assert_eq!(cursor.remaining(), "rest");

        let mut engine = engine.reset();
        let mut cursor = Cursor::new("(open");
        assert_eq!(cursor.read_balanced(&mut engine), "(open");
        assert!(!engine.should_consider());
    }

    #[test]
    fn complete_applies_escapes() {
        assert_eq!(
            Cursor::complete("a\\tb\\u0043", escape::java_format()),
            "a\tbC"
        );
    }
}
