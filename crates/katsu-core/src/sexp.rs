//! S-expression reader for JUMAN-style grammar sources.
//!
//! Grammar files are nested lists of bare atoms such as
//! `(判定詞 ((語幹 *) (基本形 だ)))`. A `;` starts a comment that runs to
//! the end of the line. The reader builds plain `Sexp` trees; giving the
//! record shapes meaning is the table builder's job.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, thiserror::Error)]
pub enum SexpError {
    #[error("line {line}: ')' without a matching '('")]
    UnbalancedClose { line: usize },

    #[error("line {line}: '(' is never closed")]
    UnterminatedList { line: usize },
}

/// One expression: a bare atom or a parenthesized list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sexp {
    Atom(String),
    List(Vec<Sexp>),
}

impl Sexp {
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Sexp::Atom(s) => Some(s),
            Sexp::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Sexp]> {
        match self {
            Sexp::Atom(_) => None,
            Sexp::List(items) => Some(items),
        }
    }
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sexp::Atom(s) => f.write_str(s),
            Sexp::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Parse every top-level expression in `input`.
pub fn parse(input: &str) -> Result<Vec<Sexp>, SexpError> {
    let mut reader = Reader::new(input);
    let mut exprs = Vec::new();
    loop {
        reader.skip_blank();
        match reader.peek() {
            None => return Ok(exprs),
            Some(')') => return Err(SexpError::UnbalancedClose { line: reader.line }),
            Some('(') => exprs.push(reader.read_list()?),
            Some(_) => exprs.push(reader.read_atom()),
        }
    }
}

struct Reader<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        Reader {
            chars: input.chars().peekable(),
            line: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    /// Skip whitespace and `;` comments. Ideographic space (U+3000) counts
    /// as whitespace, which real grammar files use between atoms.
    fn skip_blank(&mut self) {
        while let Some(c) = self.peek() {
            if c == ';' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn read_list(&mut self) -> Result<Sexp, SexpError> {
        let open_line = self.line;
        self.bump(); // consume '('
        let mut items = Vec::new();
        loop {
            self.skip_blank();
            match self.peek() {
                None => return Err(SexpError::UnterminatedList { line: open_line }),
                Some(')') => {
                    self.bump();
                    return Ok(Sexp::List(items));
                }
                Some('(') => items.push(self.read_list()?),
                Some(_) => items.push(self.read_atom()),
            }
        }
    }

    fn read_atom(&mut self) -> Sexp {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '(' || c == ')' || c == ';' || c.is_whitespace() {
                break;
            }
            text.push(c);
            self.bump();
        }
        Sexp::Atom(text)
    }
}
