//! MarkdownV2 escaping tokenizer.
//!
//! Telegram's MarkdownV2 dialect requires a fixed set of punctuation
//! characters to be backslash-escaped everywhere they are not part of
//! recognized inline markup. This module walks the text once, left to right,
//! tracking which markup context is open and escaping literal punctuation
//! accordingly. Recognized markup is emphasis (`*bold*`, `_italic_`), inline
//! and fenced code, and `[text](url)` links.
//!
//! Malformed markup never fails: an unclosed emphasis span or half-written
//! link is closed (or copied through) in a way that keeps the message
//! readable. Code contexts are the exception — an unclosed code span or
//! fence is left open rather than closed synthetically.

use crate::error::FormatError;

/// Characters that must be escaped outside markup context, in the order the
/// dialect defines them.
pub const SPECIAL_CHARS: [char; 18] = [
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Whether `c` requires escaping outside markup context.
#[must_use]
pub fn is_special(c: char) -> bool {
    SPECIAL_CHARS.contains(&c)
}

/// Whether `c` requires escaping inside a link URL span.
///
/// Parentheses are structural there and dots pass through; query-string
/// delimiters are escaped even though they are not special elsewhere.
fn is_url_special(c: char) -> bool {
    match c {
        '(' | ')' | '.' => false,
        '?' | '&' => true,
        c => is_special(c),
    }
}

/// Tokenizer context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    InlineCode,
    FencedCode,
    Bold,
    Italic,
    LinkText,
    LinkUrl,
}

/// Escape `text` for the MarkdownV2 dialect.
///
/// Total over any input, including empty strings, unterminated markup, and
/// malformed link syntax. Running the result through `escape` again is *not*
/// an identity: backslashes already present are doubled on every pass.
///
/// # Errors
///
/// Returns [`FormatError::SaveSlotOccupied`] on a violated internal
/// invariant. No input reaches this through the public grammar.
pub fn escape(text: &str) -> Result<String, FormatError> {
    Tokenizer::new(text).run()
}

/// Escape every special character in `text` without interpreting markup.
///
/// Used for spans that must come out as literal text no matter what they
/// contain, such as restored email addresses. Follows the same
/// backslash-doubling rule as the tokenizer.
#[must_use]
pub fn escape_literal(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    escape_span(&chars, is_special)
}

struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    state: State,
    /// Single-slot stack holding the state to resume once link sub-states
    /// complete. Depth never exceeds one.
    saved: Option<State>,
    out: String,
}

impl Tokenizer {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            state: State::Normal,
            saved: None,
            out: String::with_capacity(text.len() + text.len() / 4),
        }
    }

    fn run(mut self) -> Result<String, FormatError> {
        while self.pos < self.chars.len() {
            match self.state {
                State::Normal => self.step_normal()?,
                State::InlineCode => self.step_inline_code(),
                State::FencedCode => self.step_fenced_code(),
                State::Bold => self.step_emphasis('*'),
                State::Italic => self.step_emphasis('_'),
                State::LinkText => self.step_link_text(),
                State::LinkUrl => self.step_link_url(),
            }
        }
        Ok(self.finish())
    }

    /// Close whatever is still open at end of input. Code contexts are left
    /// unterminated; everything else gets its closing character.
    fn finish(mut self) -> String {
        match self.state {
            State::Bold => self.out.push('*'),
            State::Italic => self.out.push('_'),
            State::LinkText => self.out.push(']'),
            State::LinkUrl => self.out.push(')'),
            State::Normal | State::InlineCode | State::FencedCode => {}
        }
        self.out
    }

    fn step_normal(&mut self) -> Result<(), FormatError> {
        let c = self.chars[self.pos];
        match c {
            '`' if self.at_fence() => {
                self.out.push_str("```");
                self.pos += 3;
                self.state = State::FencedCode;
            }
            '`' => {
                self.out.push('`');
                self.pos += 1;
                self.state = State::InlineCode;
            }
            '*' => {
                self.out.push('*');
                self.pos += 1;
                self.state = State::Bold;
            }
            '_' => {
                self.out.push('_');
                self.pos += 1;
                self.state = State::Italic;
            }
            '[' => self.open_link()?,
            '\\' if self.next_is_special() => self.copy_escape_pair(),
            c if is_special(c) => {
                self.out.push('\\');
                self.out.push(c);
                self.pos += 1;
            }
            c => {
                self.out.push(c);
                self.pos += 1;
            }
        }
        Ok(())
    }

    /// Inside `` ` `` spans only the closing backtick and backslash pairs
    /// matter; every other character, specials included, passes through.
    fn step_inline_code(&mut self) {
        let c = self.chars[self.pos];
        if c == '\\' && matches!(self.chars.get(self.pos + 1), Some('`' | '\\')) {
            self.out.push('\\');
            self.out.push(self.chars[self.pos + 1]);
            self.pos += 2;
        } else if c == '`' {
            self.out.push('`');
            self.pos += 1;
            self.state = State::Normal;
        } else {
            self.out.push(c);
            self.pos += 1;
        }
    }

    fn step_fenced_code(&mut self) {
        let c = self.chars[self.pos];
        if c == '\\' && matches!(self.chars.get(self.pos + 1), Some('`' | '\\')) {
            self.out.push('\\');
            self.out.push(self.chars[self.pos + 1]);
            self.pos += 2;
        } else if c == '`' && self.at_fence() {
            self.out.push_str("```");
            self.pos += 3;
            self.state = State::Normal;
        } else {
            self.out.push(c);
            self.pos += 1;
        }
    }

    /// Bold and italic share one rule set with the closer swapped. The other
    /// emphasis toggle is a plain special character here: emphasis does not
    /// nest, it flattens.
    fn step_emphasis(&mut self, closer: char) {
        let c = self.chars[self.pos];
        if c == closer {
            self.out.push(closer);
            self.pos += 1;
            self.state = State::Normal;
        } else if c == '\\' && self.next_is_special() {
            self.copy_escape_pair();
        } else if is_special(c) {
            self.out.push('\\');
            self.out.push(c);
            self.pos += 1;
        } else {
            self.out.push(c);
            self.pos += 1;
        }
    }

    /// Degraded link text: copied through without escaping until an
    /// unescaped `]` shows up or input runs out.
    fn step_link_text(&mut self) {
        let c = self.chars[self.pos];
        if c == '\\' && self.pos + 1 < self.chars.len() {
            self.out.push('\\');
            self.out.push(self.chars[self.pos + 1]);
            self.pos += 2;
        } else if c == ']' {
            self.out.push(']');
            self.pos += 1;
            if self.chars.get(self.pos) == Some(&'(') {
                self.out.push('(');
                self.pos += 1;
                self.state = State::LinkUrl;
            } else {
                self.state = self.restore();
            }
        } else {
            self.out.push(c);
            self.pos += 1;
        }
    }

    fn step_link_url(&mut self) {
        let c = self.chars[self.pos];
        if c == '\\' && self.next_is_special() {
            self.copy_escape_pair();
        } else if c == ')' {
            self.out.push(')');
            self.pos += 1;
            self.state = self.restore();
        } else if is_url_special(c) {
            self.out.push('\\');
            self.out.push(c);
            self.pos += 1;
        } else {
            self.out.push(c);
            self.pos += 1;
        }
    }

    /// Handle `[`: a syntactically complete `[text](url)` token is consumed
    /// whole and re-emitted with both spans escaped. Anything else enters the
    /// degraded link-text state, which copies through and closes at `]`.
    fn open_link(&mut self) -> Result<(), FormatError> {
        if let Some((text_end, url_end)) = self.lookahead_link() {
            self.out.push('[');
            self.out
                .push_str(&escape_span(&self.chars[self.pos + 1..text_end], is_special));
            self.out.push_str("](");
            self.out
                .push_str(&escape_span(&self.chars[text_end + 2..url_end], is_url_special));
            self.out.push(')');
            self.pos = url_end + 1;
        } else {
            self.save()?;
            self.out.push('[');
            self.pos += 1;
            self.state = State::LinkText;
        }
        Ok(())
    }

    /// Fixed lookahead for a complete `[text](url)` token starting at the
    /// current `[`. Returns the indices of the closing `]` and `)`.
    fn lookahead_link(&self) -> Option<(usize, usize)> {
        let text_end = self.find_unescaped(self.pos + 1, ']')?;
        if self.chars.get(text_end + 1) != Some(&'(') {
            return None;
        }
        let url_end = self.find_unescaped(text_end + 2, ')')?;
        Some((text_end, url_end))
    }

    fn find_unescaped(&self, from: usize, target: char) -> Option<usize> {
        let mut i = from;
        while i < self.chars.len() {
            match self.chars[i] {
                '\\' => i += 2,
                c if c == target => return Some(i),
                _ => i += 1,
            }
        }
        None
    }

    fn at_fence(&self) -> bool {
        self.chars.get(self.pos) == Some(&'`')
            && self.chars.get(self.pos + 1) == Some(&'`')
            && self.chars.get(self.pos + 2) == Some(&'`')
    }

    fn next_is_special(&self) -> bool {
        self.chars.get(self.pos + 1).copied().is_some_and(is_special)
    }

    /// A backslash already escaping a special character is doubled so the
    /// literal backslash survives; the special character itself is copied
    /// through unescaped. This is what makes `escape` non-idempotent.
    fn copy_escape_pair(&mut self) {
        self.out.push_str("\\\\");
        self.out.push(self.chars[self.pos + 1]);
        self.pos += 2;
    }

    fn save(&mut self) -> Result<(), FormatError> {
        if self.saved.is_some() {
            return Err(FormatError::SaveSlotOccupied { offset: self.pos });
        }
        self.saved = Some(self.state);
        Ok(())
    }

    fn restore(&mut self) -> State {
        self.saved.take().unwrap_or(State::Normal)
    }
}

/// Escape a span character by character with the given rule, honoring the
/// backslash-doubling behavior of the tokenizer.
fn escape_span(chars: &[char], needs_escape: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(chars.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && chars.get(i + 1).copied().is_some_and(is_special) {
            out.push_str("\\\\");
            out.push(chars[i + 1]);
            i += 2;
            continue;
        }
        if needs_escape(c) {
            out.push('\\');
        }
        out.push(c);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn esc(text: &str) -> String {
        escape(text).unwrap()
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(esc("Hello World"), "Hello World");
        assert_eq!(esc(""), "");
        assert_eq!(esc("no specials here, just text"), "no specials here, just text");
    }

    #[test]
    fn test_specials_escaped_in_normal_state() {
        assert_eq!(esc("Hello, World!"), "Hello, World\\!");
        assert_eq!(esc("1 + 1 = 2"), "1 \\+ 1 \\= 2");
        assert_eq!(esc("a.b"), "a\\.b");
        assert_eq!(esc("#tag"), "\\#tag");
        assert_eq!(esc("a > b"), "a \\> b");
        assert_eq!(esc("x | y"), "x \\| y");
        assert_eq!(esc("{braces}"), "\\{braces\\}");
        assert_eq!(esc("~tilde"), "\\~tilde");
    }

    #[test]
    fn test_bold_preserved_content_escaped() {
        assert_eq!(esc("*bold*"), "*bold*");
        assert_eq!(esc("*bold!*"), "*bold\\!*");
        assert_eq!(esc("before *mid* after."), "before *mid* after\\.");
    }

    #[test]
    fn test_italic_preserved_content_escaped() {
        assert_eq!(esc("_italic_"), "_italic_");
        assert_eq!(esc("_semi; colon. dot_"), "_semi; colon\\. dot_");
    }

    #[test]
    fn test_emphasis_does_not_nest() {
        // The inner toggle is flattened to a literal, not opened.
        assert_eq!(esc("*bold _inner_ bold*"), "*bold \\_inner\\_ bold*");
        assert_eq!(esc("_italic *inner* italic_"), "_italic \\*inner\\* italic_");
    }

    #[test]
    fn test_unclosed_bold_closed_at_eoi() {
        assert_eq!(esc("*dangling"), "*dangling*");
    }

    #[test]
    fn test_unclosed_italic_closed_at_eoi() {
        assert_eq!(esc("_dangling"), "_dangling_");
    }

    #[test]
    fn test_inline_code_content_not_escaped() {
        assert_eq!(esc("Code: `var x = 10;`"), "Code: `var x = 10;`");
        assert_eq!(esc("`a_b*c.d`"), "`a_b*c.d`");
    }

    #[test]
    fn test_inline_code_escape_pair_copied() {
        assert_eq!(esc("`a \\` b`"), "`a \\` b`");
        assert_eq!(esc("`a \\\\ b`"), "`a \\\\ b`");
    }

    #[test]
    fn test_unclosed_inline_code_left_open() {
        assert_eq!(esc("`code"), "`code");
    }

    #[test]
    fn test_fenced_code_preserved_verbatim() {
        assert_eq!(
            esc("```ruby\ndef f\nend\n```"),
            "```ruby\ndef f\nend\n```"
        );
    }

    #[test]
    fn test_fenced_code_inner_specials_untouched() {
        assert_eq!(esc("```\n_a_ *b* [c](d)\n```"), "```\n_a_ *b* [c](d)\n```");
    }

    #[test]
    fn test_unclosed_fence_left_open() {
        // No synthetic closing fence at end of input.
        assert_eq!(esc("```rust\nfn main() {}"), "```rust\nfn main() {}");
    }

    #[test]
    fn test_single_and_double_backtick_not_a_fence() {
        assert_eq!(esc("``"), "``");
        assert_eq!(esc("`a``b`"), "`a``b`");
    }

    #[test]
    fn test_complete_link_url_escaped() {
        assert_eq!(
            esc("[site](https://example.com/search?q=test&filter=123)"),
            "[site](https://example.com/search\\?q\\=test\\&filter\\=123)"
        );
    }

    #[test]
    fn test_complete_link_text_escaped() {
        assert_eq!(
            esc("[click here!](https://example.com)"),
            "[click here\\!](https://example.com)"
        );
    }

    #[test]
    fn test_link_url_dots_and_structure_kept() {
        assert_eq!(
            esc("[a](https://sub.example.com/p/q)"),
            "[a](https://sub.example.com/p/q)"
        );
        assert_eq!(
            esc("[a](https://example.com/a_b-c)"),
            "[a](https://example.com/a\\_b\\-c)"
        );
    }

    #[test]
    fn test_incomplete_link_degrades_verbatim() {
        // No `](...)` tail: text span copies through, bracket closed at EOI.
        assert_eq!(esc("[not a link"), "[not a link]");
        assert_eq!(esc("[text] trailing."), "[text] trailing\\.");
    }

    #[test]
    fn test_incomplete_link_unclosed_url() {
        assert_eq!(esc("[text](http://x"), "[text](http://x)");
    }

    #[test]
    fn test_link_followed_by_text() {
        assert_eq!(
            esc("see [docs](https://example.com/docs) now."),
            "see [docs](https://example.com/docs) now\\."
        );
    }

    #[test]
    fn test_escaped_bracket_is_literal() {
        assert_eq!(esc("\\[x\\]"), "\\\\[x\\\\]");
    }

    #[test]
    fn test_backslash_before_special_doubled() {
        assert_eq!(esc("a\\.b"), "a\\\\.b");
        assert_eq!(esc("\\!"), "\\\\!");
    }

    #[test]
    fn test_backslash_before_plain_char_copied() {
        assert_eq!(esc("a\\b"), "a\\b");
    }

    #[test]
    fn test_escape_not_idempotent() {
        // Documented behavior: backslashes introduced by a first pass are
        // doubled by a second one.
        let once = esc("Hello, World!");
        assert_eq!(once, "Hello, World\\!");
        let twice = esc(&once);
        assert_eq!(twice, "Hello, World\\\\!");
        assert_ne!(once, twice);
    }

    #[test]
    fn test_escape_literal_escapes_everything() {
        assert_eq!(escape_literal("a.b_c"), "a\\.b\\_c");
        assert_eq!(escape_literal("*not bold*"), "\\*not bold\\*");
    }

    #[test]
    fn test_special_char_set_is_complete() {
        assert_eq!(SPECIAL_CHARS.len(), 18);
        for c in "_*[]()~`>#+-=|{}.!".chars() {
            assert!(is_special(c), "{c} missing from special set");
        }
    }

    #[test]
    fn test_multiline_text() {
        assert_eq!(esc("line one.\nline two!"), "line one\\.\nline two\\!");
    }

    #[test]
    fn test_unicode_passthrough() {
        assert_eq!(esc("héllo wörld 漢字 🚀"), "héllo wörld 漢字 🚀");
        assert_eq!(esc("emoji! 🎉"), "emoji\\! 🎉");
    }
}
