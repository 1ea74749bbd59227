//! # Lexer 模块
//!
//! 将源文本转换为 Token 的惰性序列。
//!
//! ## 设计说明
//!
//! - 空格 / 制表符 / 回车被静默跳过；换行是有意义的 Token（语句分隔符）
//! - 关键字在完整扫描标识符之后查表识别（`iffy` 不会被误认成 `if`）
//! - `else if` 通过纯字符前瞻在词法层融合为单个 [`TokenKind::Elif`]，
//!   不做游标回滚
//! - 读到输入末尾后，后续调用持续返回 EOF

use crate::error::LexError;
use crate::script::token::{Token, TokenKind};

/// 词法分析器
///
/// 维护一个指向源缓冲的游标，每次 [`next_token`](Lexer::next_token)
/// 产出一个 Token。
pub struct Lexer {
    /// 源文本（按字符存储，游标以字符为单位）
    chars: Vec<char>,
    /// 当前游标位置
    pos: usize,
}

impl Lexer {
    /// 从源文本创建词法分析器
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    /// 当前游标下的字符（到达末尾时为 None）
    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// 向前看第 n 个字符，不移动游标
    fn peek(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    /// 游标前进一个字符
    fn advance(&mut self) {
        self.pos += 1;
    }

    /// 跳过空格 / 制表符 / 回车（不跳过换行）
    fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(' ' | '\t' | '\r')) {
            self.advance();
        }
    }

    /// 读取数字字面量（允许小数，最多一个小数点）
    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let mut dots = 0usize;

        while let Some(c) = self.current() {
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '.' {
                dots += 1;
                self.advance();
            } else {
                break;
            }
        }

        let lexeme: String = self.chars[start..self.pos].iter().collect();
        if dots > 1 || lexeme.parse::<f64>().is_err() {
            return Err(LexError::InvalidNumber { lexeme });
        }
        Ok(Token::new(TokenKind::Number, lexeme))
    }

    /// 读取标识符 `[A-Za-z_][A-Za-z0-9_]*`
    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.current() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// 读取字符串字面量（处理转义序列）
    ///
    /// 支持 `\n` `\t` `\r` `\\` `\"`；未知转义原样保留被转义的字符。
    fn read_string(&mut self) -> Result<Token, LexError> {
        self.advance(); // 跳过开始引号
        let mut result = String::new();

        loop {
            match self.current() {
                None => return Err(LexError::UnterminatedString),
                Some('"') => {
                    self.advance(); // 跳过结束引号
                    return Ok(Token::new(TokenKind::String, result));
                }
                Some('\\') => {
                    self.advance();
                    let escaped = self.current().ok_or(LexError::UnterminatedString)?;
                    match escaped {
                        'n' => result.push('\n'),
                        't' => result.push('\t'),
                        'r' => result.push('\r'),
                        '\\' => result.push('\\'),
                        '"' => result.push('"'),
                        other => result.push(other),
                    }
                    self.advance();
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }
    }

    /// 判断 `else` 之后（跳过空白）是否紧跟完整的标识符 `if`
    ///
    /// 只做前瞻判断，匹配成功时由调用方决定消费多少字符。
    /// 返回匹配成功时 `if` 结束处的游标位置。
    fn peek_else_if(&self) -> Option<usize> {
        let mut p = self.pos;
        while matches!(self.chars.get(p), Some(c) if c.is_whitespace()) {
            p += 1;
        }
        if self.chars.get(p) == Some(&'i') && self.chars.get(p + 1) == Some(&'f') {
            // `if` 之后不能继续是标识符字符，否则是 `iffy` 之类的普通标识符
            match self.chars.get(p + 2) {
                Some(c) if c.is_ascii_alphanumeric() || *c == '_' => None,
                _ => Some(p + 2),
            }
        } else {
            None
        }
    }

    /// 扫描标识符并做关键字识别
    fn read_word(&mut self) -> Token {
        let word = self.read_identifier();
        match word.as_str() {
            "true" => Token::new(TokenKind::True, word),
            "false" => Token::new(TokenKind::False, word),
            "if" => Token::new(TokenKind::If, word),
            "else" => {
                // `else if` 融合为单个 Elif Token
                if let Some(end) = self.peek_else_if() {
                    self.pos = end;
                    Token::new(TokenKind::Elif, "else if")
                } else {
                    Token::new(TokenKind::Else, word)
                }
            }
            "while" => Token::new(TokenKind::While, word),
            "for" => Token::new(TokenKind::For, word),
            "in" => Token::new(TokenKind::In, word),
            "break" => Token::new(TokenKind::Break, word),
            "continue" => Token::new(TokenKind::Continue, word),
            "function" => Token::new(TokenKind::Function, word),
            "return" => Token::new(TokenKind::Return, word),
            _ => Token::new(TokenKind::Identifier, word),
        }
    }

    /// 产出下一个 Token
    ///
    /// 到达输入末尾后持续返回 EOF。
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            let Some(c) = self.current() else {
                return Ok(Token::eof());
            };

            match c {
                ' ' | '\t' | '\r' => {
                    self.skip_whitespace();
                    continue;
                }
                '\n' => {
                    self.advance();
                    return Ok(Token::new(TokenKind::Newline, "\n"));
                }
                '0'..='9' => return self.read_number(),
                '"' => return self.read_string(),
                'a'..='z' | 'A'..='Z' | '_' => return Ok(self.read_word()),
                '+' => return Ok(self.single(TokenKind::Plus, "+")),
                '-' => return Ok(self.single(TokenKind::Minus, "-")),
                '*' => return Ok(self.single(TokenKind::Multiply, "*")),
                '/' => return Ok(self.single(TokenKind::Divide, "/")),
                '(' => return Ok(self.single(TokenKind::LParen, "(")),
                ')' => return Ok(self.single(TokenKind::RParen, ")")),
                '{' => return Ok(self.single(TokenKind::LBrace, "{")),
                '}' => return Ok(self.single(TokenKind::RBrace, "}")),
                '[' => return Ok(self.single(TokenKind::LBracket, "[")),
                ']' => return Ok(self.single(TokenKind::RBracket, "]")),
                ',' => return Ok(self.single(TokenKind::Comma, ",")),
                ';' => return Ok(self.single(TokenKind::Semicolon, ";")),
                '.' => return Ok(self.single(TokenKind::Dot, ".")),
                '=' => {
                    if self.peek(1) == Some('=') {
                        self.advance();
                        return Ok(self.single(TokenKind::Equal, "=="));
                    }
                    return Ok(self.single(TokenKind::Assign, "="));
                }
                '!' => {
                    if self.peek(1) == Some('=') {
                        self.advance();
                        return Ok(self.single(TokenKind::NotEqual, "!="));
                    }
                    // 语言没有一元逻辑非，孤立的 `!` 是词法错误
                    return Err(LexError::InvalidCharacter { ch: '!' });
                }
                '<' => {
                    if self.peek(1) == Some('=') {
                        self.advance();
                        return Ok(self.single(TokenKind::LessEqual, "<="));
                    }
                    return Ok(self.single(TokenKind::LessThan, "<"));
                }
                '>' => {
                    if self.peek(1) == Some('=') {
                        self.advance();
                        return Ok(self.single(TokenKind::GreaterEqual, ">="));
                    }
                    return Ok(self.single(TokenKind::GreaterThan, ">"));
                }
                other => return Err(LexError::InvalidCharacter { ch: other }),
            }
        }
    }

    /// 消费当前字符并构造单字符（或已前瞻的双字符）Token
    fn single(&mut self, kind: TokenKind, lexeme: &str) -> Token {
        self.advance();
        Token::new(kind, lexeme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 把整段输入读成 Token 种类序列（不含 EOF）
    fn lex_kinds(text: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(text);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token.kind == TokenKind::Eof {
                break;
            }
            kinds.push(token.kind);
        }
        kinds
    }

    #[test]
    fn test_numbers_and_operators() {
        assert_eq!(
            lex_kinds("1 + 2.5 * 3 / 4 - 5"),
            vec![
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Multiply,
                TokenKind::Number,
                TokenKind::Divide,
                TokenKind::Number,
                TokenKind::Minus,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_number_lexeme() {
        let mut lexer = Lexer::new("3.14");
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::Number);
        assert_eq!(token.lexeme, "3.14");
    }

    #[test]
    fn test_invalid_number_two_dots() {
        let mut lexer = Lexer::new("1.2.3");
        assert!(matches!(
            lexer.next_token(),
            Err(LexError::InvalidNumber { lexeme }) if lexeme == "1.2.3"
        ));
    }

    #[test]
    fn test_string_with_escapes() {
        let mut lexer = Lexer::new(r#""a\nb\t\"c\\d\q""#);
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::String);
        // 未知转义 \q 原样保留 q
        assert_eq!(token.lexeme, "a\nb\t\"c\\dq");
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("\"abc");
        assert_eq!(lexer.next_token(), Err(LexError::UnterminatedString));

        // 反斜杠后直接结束
        let mut lexer = Lexer::new("\"abc\\");
        assert_eq!(lexer.next_token(), Err(LexError::UnterminatedString));
    }

    #[test]
    fn test_keywords_after_full_scan() {
        // iffy 是普通标识符，不是 if
        assert_eq!(lex_kinds("iffy"), vec![TokenKind::Identifier]);
        assert_eq!(lex_kinds("if"), vec![TokenKind::If]);
        assert_eq!(
            lex_kinds("while for in break continue function return"),
            vec![
                TokenKind::While,
                TokenKind::For,
                TokenKind::In,
                TokenKind::Break,
                TokenKind::Continue,
                TokenKind::Function,
                TokenKind::Return,
            ]
        );
    }

    #[test]
    fn test_else_if_fuses_to_elif() {
        assert_eq!(lex_kinds("else if"), vec![TokenKind::Elif]);
        assert_eq!(lex_kinds("else   if"), vec![TokenKind::Elif]);
        // 单独的 else 不融合
        assert_eq!(
            lex_kinds("else {"),
            vec![TokenKind::Else, TokenKind::LBrace]
        );
        // else iffy 不是 else if
        assert_eq!(
            lex_kinds("else iffy"),
            vec![TokenKind::Else, TokenKind::Identifier]
        );
        // 字面的 elif 只是普通标识符
        assert_eq!(lex_kinds("elif"), vec![TokenKind::Identifier]);
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            lex_kinds("== != <= >= < > ="),
            vec![
                TokenKind::Equal,
                TokenKind::NotEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::LessThan,
                TokenKind::GreaterThan,
                TokenKind::Assign,
            ]
        );
    }

    #[test]
    fn test_lone_bang_is_error() {
        let mut lexer = Lexer::new("!x");
        assert_eq!(
            lexer.next_token(),
            Err(LexError::InvalidCharacter { ch: '!' })
        );
    }

    #[test]
    fn test_newline_is_significant() {
        assert_eq!(
            lex_kinds("a\nb"),
            vec![
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_semicolon_is_separator_token() {
        // 分号是分隔符，不是输入结束信号
        assert_eq!(
            lex_kinds("a; b"),
            vec![
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_eof_is_idempotent() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Identifier);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_invalid_character() {
        let mut lexer = Lexer::new("@");
        assert_eq!(
            lexer.next_token(),
            Err(LexError::InvalidCharacter { ch: '@' })
        );
    }

    #[test]
    fn test_brackets_and_dot() {
        assert_eq!(
            lex_kinds("arr[0].length()"),
            vec![
                TokenKind::Identifier,
                TokenKind::LBracket,
                TokenKind::Number,
                TokenKind::RBracket,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::LParen,
                TokenKind::RParen,
            ]
        );
    }
}
