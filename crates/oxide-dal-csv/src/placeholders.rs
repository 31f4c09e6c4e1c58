//! Named-placeholder rewriting.
//!
//! DuckDB binds by position. Statement text is scanned once at prepare time:
//! every `@name`, `:name` or `$name` outside string literals, quoted
//! identifiers and comments becomes `?`, and the names are kept in order so
//! a named binding can be routed to its positions.

/// Statement text with positional placeholders, plus the name behind each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    /// Text to prepare.
    pub text: String,
    /// Bare placeholder names, one per `?`, in order.
    pub names: Vec<String>,
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    out: String,
    names: Vec<String>,
}

impl<'a> Scanner<'a> {
    const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            out: String::new(),
            names: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Copies the current character to the output.
    fn copy(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        self.out.push(c);
        Some(c)
    }

    /// Copies a quoted run, honoring doubled quotes.
    fn copy_quoted(&mut self, quote: char) {
        self.copy();
        while let Some(c) = self.copy() {
            if c == quote {
                if self.peek() == Some(quote) {
                    self.copy();
                } else {
                    break;
                }
            }
        }
    }

    fn copy_line_comment(&mut self) {
        while self.peek().is_some_and(|c| c != '\n') {
            self.copy();
        }
    }

    fn copy_block_comment(&mut self) {
        self.copy(); // /
        self.copy(); // *
        loop {
            match self.copy() {
                Some('*') if self.peek() == Some('/') => {
                    self.copy();
                    break;
                }
                None => break,
                _ => {}
            }
        }
    }

    fn scan_placeholder(&mut self) {
        self.pos += 1; // sigil
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.pos += self.peek().map_or(0, char::len_utf8);
        }
        self.names.push(self.input[start..self.pos].to_string());
        self.out.push('?');
    }

    fn starts_placeholder(&self, sigil: char) -> bool {
        let named = self
            .peek_next()
            .is_some_and(|c| c.is_alphabetic() || c == '_');
        match sigil {
            '@' | '$' => named,
            // `::` is a cast.
            ':' => named && !self.out.ends_with(':'),
            _ => false,
        }
    }

    fn run(mut self) -> Rewritten {
        while let Some(c) = self.peek() {
            match c {
                '\'' | '"' => self.copy_quoted(c),
                '-' if self.peek_next() == Some('-') => self.copy_line_comment(),
                '/' if self.peek_next() == Some('*') => self.copy_block_comment(),
                '@' | ':' | '$' if self.starts_placeholder(c) => self.scan_placeholder(),
                _ => {
                    self.copy();
                }
            }
        }
        Rewritten {
            text: self.out,
            names: self.names,
        }
    }
}

/// Rewrites named placeholders to positional ones.
#[must_use]
pub fn rewrite(text: &str) -> Rewritten {
    Scanner::new(text).run()
}
