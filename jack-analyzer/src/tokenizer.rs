//! Lexer for Jack source files.
//!
//! Comments and string contents are stripped from the whole file up front in
//! [`strip_comments`], then [`JackTokenizer`] scans the remaining lines
//! character by character with one token of lookahead (`current`/`next`),
//! matching keywords eagerly as each character is appended (no maximal-munch
//! backtracking: `classify` is only consulted once a delimiter or symbol
//! ends the run).

use std::fs;

use crate::error::JackError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Keyword,
    Symbol,
    Identifier,
    IntConst,
    StringConst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Class,
    Method,
    Function,
    Constructor,
    Int,
    Boolean,
    Char,
    Void,
    Var,
    Static,
    Field,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
    True,
    False,
    Null,
    This,
}

static KEYWORDS: phf::Map<&'static str, Keyword> = phf::phf_map! {
    "class" => Keyword::Class,
    "method" => Keyword::Method,
    "function" => Keyword::Function,
    "constructor" => Keyword::Constructor,
    "int" => Keyword::Int,
    "boolean" => Keyword::Boolean,
    "char" => Keyword::Char,
    "void" => Keyword::Void,
    "var" => Keyword::Var,
    "static" => Keyword::Static,
    "field" => Keyword::Field,
    "let" => Keyword::Let,
    "do" => Keyword::Do,
    "if" => Keyword::If,
    "else" => Keyword::Else,
    "while" => Keyword::While,
    "return" => Keyword::Return,
    "true" => Keyword::True,
    "false" => Keyword::False,
    "null" => Keyword::Null,
    "this" => Keyword::This,
};

static SYMBOLS: phf::Set<char> = phf::phf_set! {
    '{', '}', '(', ')', '[', ']', '.', ',', ';',
    '+', '-', '*', '/', '&', '|', '<', '>', '=', '~',
};

#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
    pub kind: TokenType,
}

impl Token {
    fn keyword(text: &str) -> Self {
        Token { text: text.to_string(), kind: TokenType::Keyword }
    }
    fn symbol(ch: char) -> Self {
        Token { text: ch.to_string(), kind: TokenType::Symbol }
    }
    fn identifier(text: String) -> Self {
        Token { text, kind: TokenType::Identifier }
    }
    fn int_const(text: String) -> Self {
        Token { text, kind: TokenType::IntConst }
    }
    fn string_const(text: String) -> Self {
        Token { text, kind: TokenType::StringConst }
    }
}

/// Strips `//` and `/* ... */` comments (including ones spanning multiple
/// lines) from the full file content, preserving line breaks so downstream
/// line/position bookkeeping stays meaningful. String literals are passed
/// through untouched so a `"//"` or `"/*"` inside a string is never mistaken
/// for a comment opener.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_block_comment = false;
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_block_comment {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_block_comment = false;
            } else if c == '\n' {
                out.push('\n');
            }
            continue;
        }

        if in_string {
            out.push(c);
            if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                in_block_comment = true;
            }
            other => out.push(other),
        }
    }

    out
}

fn is_symbol(c: char) -> bool {
    SYMBOLS.contains(&c)
}

pub struct JackTokenizer {
    lines: Vec<Vec<char>>,
    current_line: usize,
    current_pos: usize,
    current_token: Option<Token>,
    next_token: Option<Token>,
    next_line: usize,
}

impl JackTokenizer {
    pub fn new(path: &str) -> Result<Self, JackError> {
        let raw = fs::read_to_string(path)?;
        let cleaned = strip_comments(&raw);
        let lines: Vec<Vec<char>> = cleaned.lines().map(|l| l.chars().collect()).collect();

        let mut tokenizer = JackTokenizer {
            lines,
            current_line: 0,
            current_pos: 0,
            current_token: None,
            next_token: None,
            next_line: 0,
        };
        tokenizer.prime()?;
        Ok(tokenizer)
    }

    fn prime(&mut self) -> Result<(), JackError> {
        let (token, line) = self.retrieve_next_token()?;
        self.next_token = token;
        self.next_line = line;
        Ok(())
    }

    #[inline]
    pub fn has_more_tokens(&self) -> bool {
        self.next_token.is_some()
    }

    /// Advances past the current token. Once the stream is exhausted,
    /// further calls report `UnexpectedEndOfInput` instead of leaving
    /// `current_token` empty — a truncated file should surface as an error
    /// from whatever grammar production tried to keep consuming, not panic
    /// on the next token inspection.
    pub fn advance(&mut self) -> Result<(), JackError> {
        let token = self.next_token.take().ok_or_else(|| JackError::UnexpectedEndOfInput {
            while_compiling: "token stream".to_string(),
        })?;
        self.current_token = Some(token);
        self.prime()
    }

    #[inline]
    pub fn token_type(&self) -> TokenType {
        self.current_token
            .as_ref()
            .expect("advance() must be called before token_type()")
            .kind
    }

    pub fn keyword(&self) -> Result<Keyword, JackError> {
        let text = self.current_text();
        KEYWORDS.get(text).copied().ok_or_else(|| JackError::UnexpectedToken {
            expected: "keyword".to_string(),
            found: text.to_string(),
        })
    }

    #[inline]
    pub fn symbol(&self) -> &str {
        self.current_text()
    }

    #[inline]
    pub fn identifier(&self) -> &str {
        self.current_text()
    }

    pub fn int_val(&self) -> Result<i32, JackError> {
        self.current_text()
            .parse()
            .map_err(|_| JackError::UnexpectedToken {
                expected: "integer constant".to_string(),
                found: self.current_text().to_string(),
            })
    }

    #[inline]
    pub fn string_val(&self) -> &str {
        self.current_text()
    }

    #[inline]
    pub fn current_text(&self) -> &str {
        &self
            .current_token
            .as_ref()
            .expect("advance() must be called before reading the current token")
            .text
    }

    /// Writes the current token as a single XML element, escaping the four
    /// characters that are reserved in XML text content.
    pub fn write_token(&self, out: &mut impl std::io::Write) -> Result<(), JackError> {
        let token = self
            .current_token
            .as_ref()
            .expect("advance() must be called before write_token()");

        let tag = match token.kind {
            TokenType::Keyword => "keyword",
            TokenType::Symbol => "symbol",
            TokenType::Identifier => "identifier",
            TokenType::IntConst => "integerConstant",
            TokenType::StringConst => "stringConstant",
        };

        let text = escape_xml(&token.text);
        writeln!(out, "<{tag}> {text} </{tag}>")?;
        Ok(())
    }

    fn retrieve_next_token(&mut self) -> Result<(Option<Token>, usize), JackError> {
        let mut new_token = String::new();

        loop {
            if self.current_line >= self.lines.len() {
                return Ok((None, self.current_line));
            }

            let line = &self.lines[self.current_line];
            if self.current_pos >= line.len() {
                self.current_line += 1;
                self.current_pos = 0;
                continue;
            }

            let line_number = self.current_line;
            let ch = line[self.current_pos];
            self.current_pos += 1;

            if ch == ' ' || ch == '\t' {
                if !new_token.is_empty() {
                    return Ok((Some(classify(new_token)), line_number));
                }
                continue;
            }

            if ch == '"' {
                if !new_token.is_empty() {
                    return Err(JackError::UnrecognizedToken {
                        line: line_number,
                        position: self.current_pos,
                    });
                }
                let rest = &self.lines[self.current_line][self.current_pos..];
                let end = rest.iter().position(|&c| c == '"').ok_or(
                    JackError::UnterminatedString { line: line_number },
                )?;
                let text: String = rest[..end].iter().collect();
                self.current_pos += end + 1;
                return Ok((Some(Token::string_const(text)), line_number));
            }

            if is_symbol(ch) {
                if !new_token.is_empty() {
                    self.current_pos -= 1;
                    return Ok((Some(classify(new_token)), line_number));
                }
                return Ok((Some(Token::symbol(ch)), line_number));
            }

            new_token.push(ch);
            if KEYWORDS.contains_key(new_token.as_str()) {
                return Ok((Some(Token::keyword(&new_token)), line_number));
            }
        }
    }
}

fn classify(text: String) -> Token {
    if text.chars().all(|c| c.is_ascii_digit()) {
        Token::int_const(text)
    } else {
        Token::identifier(text)
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}
