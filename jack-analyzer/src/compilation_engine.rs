//! Recursive-descent parser over the Jack grammar.
//!
//! Each `compile_*` method corresponds to one grammar production and writes
//! its own open/close XML tag around whatever it consumes — there is no
//! intermediate AST, the parse tree is the XML stream itself.

use std::io::Write;

use crate::error::JackError;
use crate::tokenizer::{JackTokenizer, Keyword, TokenType};

const CLASS_VAR_KEYWORDS: [Keyword; 2] = [Keyword::Static, Keyword::Field];
const SUBROUTINE_KEYWORDS: [Keyword; 3] = [Keyword::Constructor, Keyword::Function, Keyword::Method];
const PRIMITIVE_TYPE_KEYWORDS: [Keyword; 3] = [Keyword::Int, Keyword::Boolean, Keyword::Char];
const STATEMENT_KEYWORDS: [Keyword; 5] =
    [Keyword::Let, Keyword::If, Keyword::While, Keyword::Do, Keyword::Return];
const KEYWORD_CONSTANTS: [Keyword; 4] = [Keyword::True, Keyword::False, Keyword::Null, Keyword::This];
const BINARY_OPS: [char; 9] = ['+', '-', '*', '/', '&', '|', '<', '>', '='];

pub struct CompilationEngine<'a, W: Write> {
    tokenizer: &'a mut JackTokenizer,
    out: W,
}

impl<'a, W: Write> CompilationEngine<'a, W> {
    pub fn new(tokenizer: &'a mut JackTokenizer, out: W) -> Self {
        CompilationEngine { tokenizer, out }
    }

    pub fn compile(&mut self) -> Result<(), JackError> {
        self.compile_class()
    }

    fn consume(&mut self) -> Result<(), JackError> {
        self.tokenizer.write_token(&mut self.out)?;
        self.tokenizer.advance()
    }

    fn expect_symbol(&mut self, expected: &str) -> Result<(), JackError> {
        if self.tokenizer.token_type() != TokenType::Symbol || self.tokenizer.symbol() != expected {
            return Err(JackError::UnexpectedToken {
                expected: format!("symbol '{expected}'"),
                found: self.tokenizer.symbol().to_string(),
            });
        }
        self.consume()
    }

    fn current_is_symbol(&self, value: &str) -> bool {
        self.tokenizer.token_type() == TokenType::Symbol && self.tokenizer.symbol() == value
    }

    fn current_is_keyword_in(&self, keywords: &[Keyword]) -> bool {
        self.tokenizer.token_type() == TokenType::Keyword
            && self.tokenizer.keyword().map(|k| keywords.contains(&k)).unwrap_or(false)
    }

    fn tag(&mut self, name: &str) -> Result<(), JackError> {
        writeln!(self.out, "<{name}>")?;
        Ok(())
    }

    fn close_tag(&mut self, name: &str) -> Result<(), JackError> {
        writeln!(self.out, "</{name}>")?;
        Ok(())
    }

    /// `'class' className '{' classVarDec* subroutineDec* '}'`
    fn compile_class(&mut self) -> Result<(), JackError> {
        self.tag("class")?;

        if self.tokenizer.token_type() != TokenType::Keyword
            || self.tokenizer.keyword()? != Keyword::Class
        {
            return Err(JackError::UnexpectedToken {
                expected: "keyword 'class'".to_string(),
                found: self.tokenizer.symbol().to_string(),
            });
        }
        self.consume()?;

        if self.tokenizer.token_type() != TokenType::Identifier {
            return Err(JackError::UnexpectedToken {
                expected: "class name".to_string(),
                found: self.tokenizer.symbol().to_string(),
            });
        }
        self.consume()?;

        self.expect_symbol("{")?;

        while self.tokenizer.token_type() == TokenType::Keyword {
            let keyword = self.tokenizer.keyword()?;
            if SUBROUTINE_KEYWORDS.contains(&keyword) {
                self.compile_subroutine()?;
            } else if CLASS_VAR_KEYWORDS.contains(&keyword) {
                self.compile_class_var_dec()?;
            } else {
                return Err(JackError::UnexpectedToken {
                    expected: "class member or subroutine declaration".to_string(),
                    found: self.tokenizer.symbol().to_string(),
                });
            }
        }

        self.expect_symbol("}")?;
        self.close_tag("class")
    }

    /// `('static'|'field') type varName (',' varName)* ';'`
    fn compile_class_var_dec(&mut self) -> Result<(), JackError> {
        self.tag("classVarDec")?;
        self.consume()?; // static | field
        self.compile_type()?;
        self.consume()?; // varName

        while self.current_is_symbol(",") {
            self.consume()?;
            self.consume()?; // varName
        }

        self.expect_symbol(";")?;
        self.close_tag("classVarDec")
    }

    fn compile_type(&mut self) -> Result<(), JackError> {
        if self.tokenizer.token_type() == TokenType::Keyword
            && !PRIMITIVE_TYPE_KEYWORDS.contains(&self.tokenizer.keyword()?)
        {
            return Err(JackError::UnexpectedToken {
                expected: "type (int, boolean, char, or a class name)".to_string(),
                found: self.tokenizer.symbol().to_string(),
            });
        }
        self.consume()
    }

    /// `('constructor'|'function'|'method') ('void'|type) subroutineName '(' parameterList ')' subroutineBody`
    fn compile_subroutine(&mut self) -> Result<(), JackError> {
        self.tag("subroutineDec")?;
        self.consume()?; // constructor | function | method

        if self.tokenizer.token_type() == TokenType::Keyword {
            let keyword = self.tokenizer.keyword()?;
            if keyword != Keyword::Void && !PRIMITIVE_TYPE_KEYWORDS.contains(&keyword) {
                return Err(JackError::UnexpectedToken {
                    expected: "return type (void, int, boolean, char, or a class name)".to_string(),
                    found: self.tokenizer.symbol().to_string(),
                });
            }
        }
        self.consume()?; // return type

        if self.tokenizer.token_type() != TokenType::Identifier {
            return Err(JackError::UnexpectedToken {
                expected: "subroutine name".to_string(),
                found: self.tokenizer.symbol().to_string(),
            });
        }
        self.consume()?;

        self.expect_symbol("(")?;
        self.compile_parameter_list()?;
        self.expect_symbol(")")?;

        self.compile_subroutine_body()?;
        self.close_tag("subroutineDec")
    }

    /// `((type varName) (',' type varName)*)?`
    fn compile_parameter_list(&mut self) -> Result<(), JackError> {
        self.tag("parameterList")?;

        if !self.current_is_symbol(")") {
            self.compile_type()?;
            self.consume()?; // varName

            while !self.current_is_symbol(")") {
                self.expect_symbol(",")?;
                self.compile_type()?;
                self.consume()?; // varName
            }
        }

        self.close_tag("parameterList")
    }

    /// `'{' varDec* statements '}'`
    fn compile_subroutine_body(&mut self) -> Result<(), JackError> {
        self.tag("subroutineBody")?;
        self.expect_symbol("{")?;

        while self.current_is_keyword_in(&[Keyword::Var]) {
            self.compile_var_dec()?;
        }

        self.compile_statements()?;
        self.expect_symbol("}")?;
        self.close_tag("subroutineBody")
    }

    /// `'var' type varName (',' varName)* ';'`
    fn compile_var_dec(&mut self) -> Result<(), JackError> {
        self.tag("varDec")?;
        self.consume()?; // var
        self.compile_type()?;
        self.consume()?; // varName

        while self.current_is_symbol(",") {
            self.consume()?;
            self.consume()?; // varName
        }

        self.expect_symbol(";")?;
        self.close_tag("varDec")
    }

    /// `statement*`
    fn compile_statements(&mut self) -> Result<(), JackError> {
        self.tag("statements")?;

        while self.tokenizer.token_type() == TokenType::Keyword {
            let keyword = self.tokenizer.keyword()?;
            if !STATEMENT_KEYWORDS.contains(&keyword) {
                break;
            }
            match keyword {
                Keyword::Let => self.compile_let()?,
                Keyword::If => self.compile_if()?,
                Keyword::While => self.compile_while()?,
                Keyword::Do => self.compile_do()?,
                Keyword::Return => self.compile_return()?,
                _ => unreachable!(),
            }
        }

        self.close_tag("statements")
    }

    /// `'let' varName ('[' expression ']')? '=' expression ';'`
    fn compile_let(&mut self) -> Result<(), JackError> {
        self.tag("letStatement")?;
        self.consume()?; // let
        self.consume()?; // varName

        if self.current_is_symbol("[") {
            self.consume()?;
            self.compile_expression()?;
            self.expect_symbol("]")?;
        }

        self.expect_symbol("=")?;
        self.compile_expression()?;
        self.expect_symbol(";")?;
        self.close_tag("letStatement")
    }

    /// `'if' '(' expression ')' '{' statements '}' ('else' '{' statements '}')?`
    fn compile_if(&mut self) -> Result<(), JackError> {
        self.tag("ifStatement")?;
        self.consume()?; // if
        self.expect_symbol("(")?;
        self.compile_expression()?;
        self.expect_symbol(")")?;
        self.expect_symbol("{")?;
        self.compile_statements()?;
        self.expect_symbol("}")?;

        if self.current_is_keyword_in(&[Keyword::Else]) {
            self.consume()?;
            self.expect_symbol("{")?;
            self.compile_statements()?;
            self.expect_symbol("}")?;
        }

        self.close_tag("ifStatement")
    }

    /// `'while' '(' expression ')' '{' statements '}'`
    fn compile_while(&mut self) -> Result<(), JackError> {
        self.tag("whileStatement")?;
        self.consume()?; // while
        self.expect_symbol("(")?;
        self.compile_expression()?;
        self.expect_symbol(")")?;
        self.expect_symbol("{")?;
        self.compile_statements()?;
        self.expect_symbol("}")?;
        self.close_tag("whileStatement")
    }

    /// `'do' subroutineCall ';'`
    fn compile_do(&mut self) -> Result<(), JackError> {
        self.tag("doStatement")?;
        self.consume()?; // do
        self.compile_subroutine_call(false)?;
        self.expect_symbol(";")?;
        self.close_tag("doStatement")
    }

    /// `'return' expression? ';'`
    fn compile_return(&mut self) -> Result<(), JackError> {
        self.tag("returnStatement")?;
        self.consume()?; // return

        if !self.current_is_symbol(";") {
            self.compile_expression()?;
        }

        self.expect_symbol(";")?;
        self.close_tag("returnStatement")
    }

    /// `subroutineName '(' expressionList ')' | (className|varName) '.' subroutineName '(' expressionList ')'`
    ///
    /// Not a grammar non-terminal of its own in the canonical syntax. When
    /// called from [`Self::compile_term`] the leading identifier has already
    /// been consumed as part of disambiguating a bare variable reference from
    /// a call, so `identifier_consumed` skips re-matching it.
    fn compile_subroutine_call(&mut self, identifier_consumed: bool) -> Result<(), JackError> {
        if !identifier_consumed {
            if self.tokenizer.token_type() != TokenType::Identifier {
                return Err(JackError::UnexpectedToken {
                    expected: "identifier".to_string(),
                    found: self.tokenizer.symbol().to_string(),
                });
            }
            self.consume()?; // identifier
        }

        if self.current_is_symbol(".") {
            self.consume()?;
            if self.tokenizer.token_type() != TokenType::Identifier {
                return Err(JackError::UnexpectedToken {
                    expected: "subroutine name".to_string(),
                    found: self.tokenizer.symbol().to_string(),
                });
            }
            self.consume()?;
        }

        self.expect_symbol("(")?;
        self.compile_expression_list()?;
        self.expect_symbol(")")
    }

    /// `term (op term)*`
    fn compile_expression(&mut self) -> Result<(), JackError> {
        self.tag("expression")?;
        self.compile_term()?;

        while self.tokenizer.token_type() == TokenType::Symbol
            && self.tokenizer.symbol().chars().next().map(|c| BINARY_OPS.contains(&c)).unwrap_or(false)
        {
            self.consume()?; // op
            self.compile_term()?;
        }

        self.close_tag("expression")
    }

    /// `integerConstant | stringConstant | keywordConstant | varName |
    ///  varName '[' expression ']' | subroutineCall | '(' expression ')' |
    ///  unaryOp term`
    fn compile_term(&mut self) -> Result<(), JackError> {
        self.tag("term")?;

        match self.tokenizer.token_type() {
            TokenType::IntConst | TokenType::StringConst => self.consume()?,
            TokenType::Keyword if self.current_is_keyword_in(&KEYWORD_CONSTANTS) => self.consume()?,
            TokenType::Symbol if self.current_is_symbol("-") || self.current_is_symbol("~") => {
                self.consume()?;
                self.compile_term()?;
            }
            TokenType::Symbol if self.current_is_symbol("(") => {
                self.consume()?;
                self.compile_expression()?;
                self.expect_symbol(")")?;
            }
            TokenType::Identifier => {
                self.consume()?; // identifier; current token is now whatever follows it

                if self.tokenizer.token_type() == TokenType::Symbol {
                    if self.current_is_symbol("[") {
                        self.consume()?;
                        self.compile_expression()?;
                        self.expect_symbol("]")?;
                    } else if self.current_is_symbol("(") || self.current_is_symbol(".") {
                        self.compile_subroutine_call(true)?;
                    }
                }
            }
            other => {
                return Err(JackError::UnexpectedToken {
                    expected: "term".to_string(),
                    found: format!("{other:?} '{}'", self.tokenizer.symbol()),
                });
            }
        }

        self.close_tag("term")
    }

    /// `(expression (',' expression)*)?`
    fn compile_expression_list(&mut self) -> Result<(), JackError> {
        self.tag("expressionList")?;

        if !self.current_is_symbol(")") {
            self.compile_expression()?;
            while self.current_is_symbol(",") {
                self.consume()?;
                self.compile_expression()?;
            }
        }

        self.close_tag("expressionList")
    }
}
