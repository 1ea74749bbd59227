//! # Token 模块
//!
//! 定义词法分析的最小单元。
//!
//! ## 设计说明
//!
//! Token 不可变，只携带种类和原始文本（lexeme），
//! 不携带行号/列号等位置信息。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token 种类
///
/// 封闭枚举，词法分析器只会产生这里列出的种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    // ── 字面量 ──
    /// 数字字面量（64 位浮点）
    Number,
    /// 字符串字面量（双引号，转义已处理）
    String,
    /// 布尔字面量 true
    True,
    /// 布尔字面量 false
    False,

    /// 标识符
    Identifier,

    // ── 运算符 ──
    Plus,
    Minus,
    Multiply,
    Divide,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `>`
    GreaterThan,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `=`
    Assign,

    // ── 标点 ──
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    /// 换行是语句分隔符，不是普通空白
    Newline,
    Semicolon,

    // ── 关键字 ──
    If,
    Else,
    /// `else if` 在词法层融合为单个 Token
    Elif,
    While,
    For,
    In,
    Break,
    Continue,
    Function,
    Return,

    /// 输入结束
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Multiply => "'*'",
            TokenKind::Divide => "'/'",
            TokenKind::Equal => "'=='",
            TokenKind::NotEqual => "'!='",
            TokenKind::LessThan => "'<'",
            TokenKind::GreaterThan => "'>'",
            TokenKind::LessEqual => "'<='",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::Assign => "'='",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Semicolon => "';'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::Elif => "'else if'",
            TokenKind::While => "'while'",
            TokenKind::For => "'for'",
            TokenKind::In => "'in'",
            TokenKind::Break => "'break'",
            TokenKind::Continue => "'continue'",
            TokenKind::Function => "'function'",
            TokenKind::Return => "'return'",
            TokenKind::Eof => "EOF",
        };
        f.write_str(name)
    }
}

/// 词法单元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Token 种类
    pub kind: TokenKind,
    /// 原始文本（字符串字面量为转义处理后的内容）
    pub lexeme: String,
}

impl Token {
    /// 创建新 Token
    pub fn new(kind: TokenKind, lexeme: impl Into<String>) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
        }
    }

    /// 创建 EOF Token
    pub fn eof() -> Self {
        Self::new(TokenKind::Eof, "")
    }

    /// 是否是语句分隔符（换行 / 逗号 / 分号）
    pub fn is_separator(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Newline | TokenKind::Comma | TokenKind::Semicolon
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "EOF"),
            TokenKind::Newline => write!(f, "NEWLINE"),
            TokenKind::Identifier | TokenKind::Number | TokenKind::String => {
                write!(f, "{} '{}'", self.kind, self.lexeme)
            }
            _ => write!(f, "{}", self.kind),
        }
    }
}
