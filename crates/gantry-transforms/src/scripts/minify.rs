//! Line-preserving comment and whitespace stripping
//!
//! Newlines are never removed, so automatic semicolon insertion behaves the
//! same before and after and every output line maps back to one input line.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    BlockComment,
    Template,
}

/// Strips a script one line at a time, carrying block comment and template
/// literal state across lines
#[derive(Debug, Clone)]
pub struct Minifier {
    collapse_whitespace: bool,
    keep_comments: bool,
    state: State,
}

impl Minifier {
    pub fn new(collapse_whitespace: bool, keep_comments: bool) -> Self {
        Self {
            collapse_whitespace,
            keep_comments,
            state: State::Code,
        }
    }

    /// Process the next line. `None` means the line can be dropped.
    ///
    /// A line that starts or ends inside a template literal is never dropped,
    /// and whitespace belonging to the literal is kept as is.
    pub fn line(&mut self, input: &str) -> Option<String> {
        let starts_in_literal = self.state == State::Template;
        let chars: Vec<char> = input.chars().collect();
        let mut out = String::with_capacity(input.len());
        let mut pending_space = false;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            match self.state {
                State::BlockComment => {
                    if c == '*' && chars.get(i + 1) == Some(&'/') {
                        if self.keep_comments {
                            out.push_str("*/");
                        }
                        self.state = State::Code;
                        i += 2;
                    } else {
                        if self.keep_comments {
                            out.push(c);
                        }
                        i += 1;
                    }
                    continue;
                }
                State::Template => {
                    out.push(c);
                    if c == '\\' {
                        if let Some(&next) = chars.get(i + 1) {
                            out.push(next);
                            i += 1;
                        }
                    } else if c == '`' {
                        self.state = State::Code;
                    }
                    i += 1;
                    continue;
                }
                State::Code => {}
            }

            if c.is_whitespace() {
                if self.collapse_whitespace {
                    pending_space = true;
                } else {
                    out.push(c);
                }
                i += 1;
                continue;
            }

            if pending_space {
                pending_space = false;
                if let Some(last) = out.chars().last() {
                    if needs_space(last, c) {
                        out.push(' ');
                    }
                }
            }

            match c {
                '/' if chars.get(i + 1) == Some(&'/') => {
                    if self.keep_comments {
                        if self.collapse_whitespace && !out.is_empty() {
                            out.push(' ');
                        }
                        out.extend(&chars[i..]);
                    }
                    break;
                }
                '/' if chars.get(i + 1) == Some(&'*') => {
                    if self.keep_comments {
                        out.push_str("/*");
                    }
                    self.state = State::BlockComment;
                    i += 2;
                }
                '/' if regex_allowed(out.trim_end().chars().last()) => {
                    i = copy_regex(&chars, i, &mut out);
                }
                '"' | '\'' => {
                    i = copy_string(&chars, i, c, &mut out);
                }
                '`' => {
                    out.push(c);
                    self.state = State::Template;
                    i += 1;
                }
                _ => {
                    out.push(c);
                    i += 1;
                }
            }
        }

        if self.state == State::Template {
            return Some(out);
        }

        let trimmed = if self.collapse_whitespace && !starts_in_literal {
            out.trim()
        } else {
            out.trim_end()
        };
        if trimmed.is_empty() && !starts_in_literal {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn needs_space(last: char, next: char) -> bool {
    (is_word(last) && is_word(next))
        || (last == next && matches!(last, '+' | '-' | '/'))
        || (last == '+' && next == '+')
        || (last == '-' && next == '-')
        || (is_word(last) && matches!(next, '"' | '\'' | '`' | '\\'))
}

/// Whether a `/` after `last` starts a regular expression literal
fn regex_allowed(last: Option<char>) -> bool {
    match last {
        None => true,
        Some(c) => "(,=:[!&|?{};+-*%<>~^".contains(c),
    }
}

fn copy_string(chars: &[char], start: usize, quote: char, out: &mut String) -> usize {
    out.push(quote);
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        i += 1;
        if c == '\\' {
            if let Some(&next) = chars.get(i) {
                out.push(next);
                i += 1;
            }
        } else if c == quote {
            break;
        }
    }
    i
}

fn copy_regex(chars: &[char], start: usize, out: &mut String) -> usize {
    out.push('/');
    let mut i = start + 1;
    let mut in_class = false;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        i += 1;
        match c {
            '\\' => {
                if let Some(&next) = chars.get(i) {
                    out.push(next);
                    i += 1;
                }
            }
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => break,
            _ => {}
        }
    }
    i
}
