use crate::error::{Result, SyncError};
use std::ops::Range;

/// A parsed HJSON value together with the byte range it occupies in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Object(Vec<Member>),
    Array(Vec<Node>),
    /// Any string form: quoted, single-quoted, multiline or quoteless.
    String(String),
    /// Numbers, `true`, `false` and `null`, kept as written.
    Literal(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub key: String,
    pub value: Node,
}

impl Node {
    pub fn as_object(&self) -> Option<&[Member]> {
        match &self.kind {
            NodeKind::Object(members) => Some(members),
            _ => None,
        }
    }

    /// Scalar text of the node, decoded for strings and verbatim for literals.
    pub fn as_scalar(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::String(s) | NodeKind::Literal(s) => Some(s),
            _ => None,
        }
    }

    pub fn member(&self, key: &str) -> Option<&Node> {
        self.as_object()?
            .iter()
            .find(|m| m.key == key)
            .map(|m| &m.value)
    }
}

const PUNCTUATORS: &[char] = &['{', '}', '[', ']', ',', ':'];

/// Recursive descent parser that records spans instead of building a lossy tree.
pub struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    pub fn parse(mut self) -> Result<Node> {
        self.skip_trivia()?;
        let root = match self.peek() {
            Some('{') => self.parse_object()?,
            Some('[') => self.parse_array()?,
            None => Node {
                kind: NodeKind::Object(Vec::new()),
                span: 0..0,
            },
            Some(_) => {
                let start = self.pos;
                let members = self.parse_members(None)?;
                Node {
                    kind: NodeKind::Object(members),
                    span: start..self.pos,
                }
            }
        };

        self.skip_trivia()?;
        if self.peek().is_some() {
            return Err(self.error("unexpected content after root value"));
        }

        Ok(root)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(&format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(&format!("expected '{expected}', found end of input"))),
        }
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if trimmed.starts_with('#') || trimmed.starts_with("//") {
                self.skip_line();
            } else if trimmed.starts_with("/*") {
                let start = self.pos;
                match trimmed[2..].find("*/") {
                    Some(end) => self.pos += 2 + end + 2,
                    None => {
                        self.pos = start;
                        return Err(self.error("unterminated block comment"));
                    }
                }
            } else {
                return Ok(());
            }
        }
    }

    /// Skips spaces, tabs and comments without crossing a line break.
    fn skip_inline_trivia(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start_matches([' ', '\t']);
            self.pos += rest.len() - trimmed.len();

            if trimmed.starts_with('#') || trimmed.starts_with("//") {
                self.skip_line();
            } else if trimmed.starts_with("/*") {
                match trimmed[2..].find("*/") {
                    Some(end) if !trimmed[2..2 + end].contains('\n') => self.pos += 2 + end + 2,
                    _ => return,
                }
            } else {
                return;
            }
        }
    }

    fn skip_line(&mut self) {
        match self.rest().find('\n') {
            Some(idx) => self.pos += idx,
            None => self.pos = self.src.len(),
        }
    }

    fn parse_object(&mut self) -> Result<Node> {
        let start = self.pos;
        self.expect('{')?;
        let members = self.parse_members(Some('}'))?;
        Ok(Node {
            kind: NodeKind::Object(members),
            span: start..self.pos,
        })
    }

    fn parse_members(&mut self, closing: Option<char>) -> Result<Vec<Member>> {
        let mut members = Vec::new();

        loop {
            self.skip_trivia()?;
            match (self.peek(), closing) {
                (Some(c), Some(close)) if c == close => {
                    self.bump();
                    return Ok(members);
                }
                (None, Some(close)) => {
                    return Err(self.error(&format!("expected '{close}', found end of input")));
                }
                (None, None) => return Ok(members),
                _ => {}
            }

            let key = self.parse_key()?;
            self.skip_trivia()?;
            self.expect(':')?;
            self.skip_trivia()?;
            let value = self.parse_value()?;
            members.push(Member { key, value });

            self.skip_trivia()?;
            if self.peek() == Some(',') {
                self.bump();
            }
        }
    }

    fn parse_array(&mut self) -> Result<Node> {
        let start = self.pos;
        self.expect('[')?;
        let mut items = Vec::new();

        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some(']') => {
                    self.bump();
                    break;
                }
                None => return Err(self.error("expected ']', found end of input")),
                _ => {}
            }

            items.push(self.parse_value()?);

            self.skip_trivia()?;
            if self.peek() == Some(',') {
                self.bump();
            }
        }

        Ok(Node {
            kind: NodeKind::Array(items),
            span: start..self.pos,
        })
    }

    fn parse_key(&mut self) -> Result<String> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => self.parse_quoted(q).map(|(s, _)| s),
            _ => {
                let rest = self.rest();
                let len = rest
                    .find(|c: char| c.is_whitespace() || PUNCTUATORS.contains(&c))
                    .unwrap_or(rest.len());
                if len == 0 {
                    return Err(self.error("expected a member name"));
                }
                self.pos += len;
                Ok(rest[..len].to_string())
            }
        }
    }

    fn parse_value(&mut self) -> Result<Node> {
        match self.peek() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('\'') if self.rest().starts_with("'''") => self.parse_multiline(),
            Some(q @ ('"' | '\'')) => {
                let (value, span) = self.parse_quoted(q)?;
                Ok(Node {
                    kind: NodeKind::String(value),
                    span,
                })
            }
            Some(c) if PUNCTUATORS.contains(&c) => {
                Err(self.error(&format!("unexpected '{c}' where a value was expected")))
            }
            Some(_) => Ok(self.parse_quoteless()),
            None => Err(self.error("expected a value, found end of input")),
        }
    }

    fn parse_quoted(&mut self, quote: char) -> Result<(String, Range<usize>)> {
        let start = self.pos;
        self.bump();

        let mut escaped = false;
        loop {
            match self.bump() {
                Some('\\') if !escaped => escaped = true,
                Some(c) if c == quote && !escaped => break,
                Some('\n') => {
                    self.pos = start;
                    return Err(self.error("unterminated string"));
                }
                Some(_) => escaped = false,
                None => {
                    self.pos = start;
                    return Err(self.error("unterminated string"));
                }
            }
        }

        let raw = &self.src[start..self.pos];
        let decoded = decode_quoted(raw, quote).map_err(|e| {
            let (line, column) = line_column(self.src, start);
            SyncError::HjsonParsing {
                line,
                column,
                message: format!("invalid string escape: {e}"),
            }
        })?;

        Ok((decoded, start..self.pos))
    }

    fn parse_multiline(&mut self) -> Result<Node> {
        let start = self.pos;
        let (_, indent) = line_column(self.src, start);
        self.pos += 3;

        let body_len = match self.rest().find("'''") {
            Some(len) => len,
            None => {
                self.pos = start;
                return Err(self.error("unterminated multiline string"));
            }
        };
        let body = &self.rest()[..body_len];
        self.pos += body_len + 3;

        Ok(Node {
            kind: NodeKind::String(unindent(body, indent - 1)),
            span: start..self.pos,
        })
    }

    fn parse_quoteless(&mut self) -> Node {
        let start = self.pos;
        let line_end = self.rest().find('\n').unwrap_or(self.rest().len());
        let line = &self.rest()[..line_end];

        let token_len = line
            .find(|c: char| c.is_whitespace() || matches!(c, ',' | '}' | ']' | '#' | '/'))
            .unwrap_or(line.len());
        let token = &line[..token_len];

        if is_literal(token) {
            self.pos += token_len;
            let after = self.pos;
            self.skip_inline_trivia();
            let ends_value = matches!(self.peek(), None | Some('\n' | '\r' | ',' | '}' | ']'));
            if ends_value {
                self.pos = after;
                return Node {
                    kind: NodeKind::Literal(token.to_string()),
                    span: start..after,
                };
            }
            self.pos = start;
        }

        let text = line.trim_end();
        self.pos += text.len();
        Node {
            kind: NodeKind::String(text.to_string()),
            span: start..self.pos,
        }
    }

    fn error(&self, message: &str) -> SyncError {
        let (line, column) = line_column(self.src, self.pos);
        SyncError::HjsonParsing {
            line,
            column,
            message: message.to_string(),
        }
    }
}

fn is_literal(token: &str) -> bool {
    if matches!(token, "true" | "false" | "null") {
        return true;
    }

    token.starts_with(|c: char| c.is_ascii_digit() || c == '-') && token.parse::<f64>().is_ok()
}

/// One-based line and column of a byte offset.
pub fn line_column(src: &str, offset: usize) -> (usize, usize) {
    let before = &src[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map(|idx| before[idx + 1..].chars().count())
        .unwrap_or_else(|| before.chars().count())
        + 1;
    (line, column)
}

/// Decodes a quoted literal by rewriting it as a JSON string and letting serde_json unescape it.
///
/// HJSON is looser than JSON here: `\'` is a valid escape in either quote style and raw
/// control characters other than line breaks may appear inside the quotes.
fn decode_quoted(raw: &str, quote: char) -> std::result::Result<String, serde_json::Error> {
    let inner = &raw[quote.len_utf8()..raw.len() - quote.len_utf8()];
    let mut json = String::with_capacity(inner.len() + 2);
    json.push('"');

    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\'') => json.push('\''),
                Some(next) => {
                    json.push('\\');
                    json.push(next);
                }
                None => json.push('\\'),
            },
            '"' => json.push_str("\\\""),
            c if (c as u32) < 0x20 => {
                json.push_str(&format!("\\u{:04x}", c as u32));
            }
            other => json.push(other),
        }
    }

    json.push('"');
    serde_json::from_str(&json)
}

fn unindent(body: &str, indent: usize) -> String {
    let body = body.strip_prefix('\n').or_else(|| body.strip_prefix("\r\n")).unwrap_or(body);

    let mut lines: Vec<&str> = body.lines().collect();
    if lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    lines
        .iter()
        .map(|line| {
            let strip = line
                .char_indices()
                .take_while(|(i, c)| *i < indent && c.is_whitespace())
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(0);
            &line[strip..]
        })
        .collect::<Vec<_>>()
        .join("\n")
}
