//! # Mica Runtime
//!
//! Mica 脚本语言的核心运行时库。
//!
//! ## 架构概述
//!
//! `mica-runtime` 是纯逻辑核心，不依赖任何宿主环境。
//! 源码经过三级管线变成可观察的执行结果：
//!
//! ```text
//! 源文本 ──► Lexer ──► Token 流 ──► Parser ──► AST ──► Interpreter ──► Value / 输出
//! ```
//!
//! 宿主（CLI、嵌入方）只和 [`Interpreter`] 交互：注入输出句柄，
//! 喂入源码，读取变量或最终值。
//!
//! ## 核心类型
//!
//! - [`Interpreter`]：树遍历求值器，持有环境和内置函数注册表
//! - [`Value`]：运行时值（数字 / 文本 / 布尔 / 数组 / 区间 / Nil）
//! - [`AstNode`]：解析器输出、求值器输入的语法树节点
//! - [`MicaError`]：词法 / 语法 / 求值三级错误的统一包装
//!
//! ## 使用示例
//!
//! ```ignore
//! use mica_runtime::Interpreter;
//!
//! let mut interp = Interpreter::new();
//! interp.run_source(r#"
//!     function greet(name) {
//!         return "Hello, " + name
//!     }
//!     print(greet("world"))
//! "#)?;
//! ```
//!
//! ## 模块结构
//!
//! - [`script`]：前端（Token、词法分析器、AST、解析器）
//! - [`value`]：运行时值模型
//! - [`interpreter`]：树遍历求值器、环境、内置函数
//! - [`error`]：错误类型定义

pub mod error;
pub mod interpreter;
pub mod script;
pub mod value;

// 重导出核心类型
pub use error::{LexError, MicaError, MicaResult, ParseError, RuntimeError};
pub use interpreter::{Interpreter, Outcome};
pub use script::{AstNode, BinOp, Lexer, Parser, Token, TokenKind, UnaryOp, parse};
pub use value::Value;
