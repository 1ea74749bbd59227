//! # Script 模块
//!
//! 源文本到 AST 的前端：Token 定义、词法分析器、解析器。
//!
//! ## 模块结构
//!
//! - [`token`]：Token 与 Token 种类定义
//! - [`lexer`]：词法分析器
//! - [`ast`]：抽象语法树定义
//! - [`parser`]：递归下降解析器

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{AstNode, BinOp, UnaryOp};
pub use lexer::Lexer;
pub use parser::{Parser, parse};
pub use token::{Token, TokenKind};
