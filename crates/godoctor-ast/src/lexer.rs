use crate::token::{Keyword, Span, Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal starting at byte {0}")]
    UnterminatedString(usize),
    #[error("unexpected byte {0:?} at offset {1}")]
    UnexpectedByte(char, usize),
}

/// Hand-written scanner over UTF-8 source bytes, grounded on the teacher's lexer
/// structure (`raya-parser/src/lexer.rs`): a cursor over chars, peek/advance helpers,
/// and one `next_token` dispatch.
pub struct Lexer<'a> {
    src: &'a str,
    chars: std::str::CharIndices<'a>,
    lookahead: Option<(usize, char)>,
    comments: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        let mut chars = src.char_indices();
        let lookahead = chars.next();
        Lexer {
            src,
            chars,
            lookahead,
            comments: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.lookahead.map(|(_, c)| c)
    }

    fn peek_offset(&self) -> usize {
        self.lookahead.map(|(i, _)| i).unwrap_or(self.src.len())
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let cur = self.lookahead;
        self.lookahead = self.chars.next();
        cur
    }

    fn peek2(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    /// Tokenizes the whole input, stripping comments into a side list (returned
    /// separately so the parser can attach comment groups to the file node per §3).
    pub fn tokenize(mut self) -> Result<(Vec<Token>, Vec<Token>), LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let Some((start, c)) = self.lookahead else {
                tokens.push(Token::new(TokenKind::Eof, Span::new(self.src.len(), self.src.len())));
                break;
            };
            if c == '/' && self.peek2() == Some('/') {
                let tok = self.scan_line_comment(start);
                self.comments.push(tok);
                continue;
            }
            if c == '/' && self.peek2() == Some('*') {
                let tok = self.scan_block_comment(start)?;
                self.comments.push(tok);
                continue;
            }
            let tok = self.next_token(start, c)?;
            tokens.push(tok);
        }
        Ok((tokens, std::mem::take(&mut self.comments)))
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn scan_line_comment(&mut self, start: usize) -> Token {
        self.bump();
        self.bump();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
        let end = self.peek_offset();
        Token::new(TokenKind::Comment(self.src[start..end].to_string()), Span::new(start, end))
    }

    fn scan_block_comment(&mut self, start: usize) -> Result<Token, LexError> {
        self.bump();
        self.bump();
        loop {
            match self.bump() {
                Some((_, '*')) if self.peek() == Some('/') => {
                    self.bump();
                    break;
                }
                Some(_) => continue,
                None => return Err(LexError::UnterminatedString(start)),
            }
        }
        let end = self.peek_offset();
        Ok(Token::new(TokenKind::Comment(self.src[start..end].to_string()), Span::new(start, end)))
    }

    fn next_token(&mut self, start: usize, c: char) -> Result<Token, LexError> {
        if unicode_ident::is_xid_start(c) || c == '_' {
            return Ok(self.scan_ident(start));
        }
        if c.is_ascii_digit() {
            return Ok(self.scan_number(start));
        }
        if c == '"' || c == '`' {
            return self.scan_string(start, c);
        }
        self.scan_operator(start, c)
    }

    fn scan_ident(&mut self, start: usize) -> Token {
        self.bump();
        while let Some(c) = self.peek() {
            if unicode_ident::is_xid_continue(c) || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        let end = self.peek_offset();
        let text = &self.src[start..end];
        let kind = match Keyword::from_str(text) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Ident(text.to_string()),
        };
        Token::new(kind, Span::new(start, end))
    }

    fn scan_number(&mut self, start: usize) -> Token {
        self.bump();
        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.bump();
            } else if c == '.' && !is_float {
                is_float = true;
                self.bump();
            } else {
                break;
            }
        }
        let end = self.peek_offset();
        let text = self.src[start..end].to_string();
        let kind = if is_float { TokenKind::Float(text) } else { TokenKind::Int(text) };
        Token::new(kind, Span::new(start, end))
    }

    fn scan_string(&mut self, start: usize, quote: char) -> Result<Token, LexError> {
        self.bump();
        loop {
            match self.bump() {
                Some((_, c)) if c == quote => break,
                Some((_, '\\')) if quote == '"' => {
                    self.bump();
                }
                Some(_) => continue,
                None => return Err(LexError::UnterminatedString(start)),
            }
        }
        let end = self.peek_offset();
        Ok(Token::new(
            TokenKind::String(self.src[start..end].to_string()),
            Span::new(start, end),
        ))
    }

    fn scan_operator(&mut self, start: usize, c: char) -> Result<Token, LexError> {
        self.bump();
        let second = self.peek();
        macro_rules! two {
            ($expect:expr, $then:expr, $else_:expr) => {
                if second == Some($expect) {
                    self.bump();
                    $then
                } else {
                    $else_
                }
            };
        }
        let kind = match c {
            '+' => two!('+', TokenKind::Inc, two!('=', TokenKind::PlusAssign, TokenKind::Plus)),
            '-' => two!('-', TokenKind::Dec, two!('=', TokenKind::MinusAssign, TokenKind::Minus)),
            '*' => two!('=', TokenKind::StarAssign, TokenKind::Star),
            '/' => two!('=', TokenKind::SlashAssign, TokenKind::Slash),
            '%' => two!('=', TokenKind::PercentAssign, TokenKind::Percent),
            '^' => two!('=', TokenKind::CaretAssign, TokenKind::Caret),
            '=' => two!('=', TokenKind::Eq, TokenKind::Assign),
            '!' => two!('=', TokenKind::Ne, TokenKind::Not),
            '<' => {
                if second == Some('<') {
                    self.bump();
                    two!('=', TokenKind::ShlAssign, TokenKind::Shl)
                } else if second == Some('=') {
                    self.bump();
                    TokenKind::Le
                } else if second == Some('-') {
                    self.bump();
                    TokenKind::Arrow
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if second == Some('>') {
                    self.bump();
                    two!('=', TokenKind::ShrAssign, TokenKind::Shr)
                } else if second == Some('=') {
                    self.bump();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if second == Some('&') {
                    self.bump();
                    TokenKind::LAnd
                } else if second == Some('^') {
                    self.bump();
                    two!('=', TokenKind::AndNotAssign, TokenKind::AndNot)
                } else {
                    two!('=', TokenKind::AmpAssign, TokenKind::Amp)
                }
            }
            '|' => two!('|', TokenKind::LOr, two!('=', TokenKind::PipeAssign, TokenKind::Pipe)),
            ':' => two!('=', TokenKind::Define, TokenKind::Colon),
            '.' => {
                if second == Some('.') {
                    let mut lookahead2 = self.chars.clone();
                    if lookahead2.next().map(|(_, c)| c) == Some('.') {
                        self.bump();
                        self.bump();
                        TokenKind::Ellipsis
                    } else {
                        TokenKind::Dot
                    }
                } else {
                    TokenKind::Dot
                }
            }
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            other => return Err(LexError::UnexpectedByte(other, start)),
        };
        let end = self.peek_offset();
        Ok(Token::new(kind, Span::new(start, end)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_simple_func() {
        let (tokens, _) = Lexer::new("func main() {}").tokenize().unwrap();
        assert!(matches!(tokens[0].kind, TokenKind::Keyword(Keyword::Func)));
        assert!(matches!(tokens[1].kind, TokenKind::Ident(ref s) if s == "main"));
    }

    #[test]
    fn tokenizes_unicode_identifier() {
        let (tokens, _) = Lexer::new("var こんにちはmsg string").tokenize().unwrap();
        assert!(matches!(tokens[1].kind, TokenKind::Ident(ref s) if s == "こんにちはmsg"));
    }

    #[test]
    fn splits_comments_separately() {
        let (tokens, comments) = Lexer::new("// hi\nvar x int").tokenize().unwrap();
        assert_eq!(comments.len(), 1);
        assert!(matches!(tokens[0].kind, TokenKind::Keyword(Keyword::Var)));
    }

    #[test]
    fn recognizes_define_and_short_ops() {
        let (tokens, _) = Lexer::new("x := 1\nx += 2").tokenize().unwrap();
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Define));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::PlusAssign));
    }
}
