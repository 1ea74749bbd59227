//! # Error 模块
//!
//! 定义 mica-runtime 中使用的错误类型。
//!
//! ## 设计说明
//!
//! 管线的三个阶段各有一个错误枚举（词法 / 语法 / 求值），
//! 并由 [`MicaError`] 统一包装。所有错误对当前程序都是致命的：
//! 遇到第一个错误即中止，不做恢复或多错误收集。

use thiserror::Error;

/// 词法错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    /// 无法识别的字符
    #[error("无法识别的字符: '{ch}'")]
    InvalidCharacter { ch: char },

    /// 字符串字面量未闭合
    #[error("字符串字面量未闭合，缺少 '\"'")]
    UnterminatedString,

    /// 数字字面量格式错误（如多个小数点）
    #[error("无法解析数字: '{lexeme}'")]
    InvalidNumber { lexeme: String },
}

/// 语法错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// 遇到了与预期不符的 Token
    #[error("期望 {expected}，实际 {found}")]
    UnexpectedToken { expected: String, found: String },

    /// 赋值号左侧不是变量或索引表达式
    #[error("无效的赋值目标")]
    InvalidAssignmentTarget,

    /// 函数定义签名格式错误
    #[error("函数签名格式错误: {message}")]
    MalformedFunctionSignature { message: String },
}

/// 求值错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// 变量未定义
    #[error("变量 '{name}' 未定义")]
    UndefinedVariable { name: String },

    /// 类型不匹配
    #[error("类型不匹配: 期望 {expected}，实际 {actual} ({context})")]
    TypeMismatch {
        expected: &'static str,
        actual: String,
        context: String,
    },

    /// 除数为零
    #[error("除数为零")]
    DivisionByZero,

    /// 索引越界
    #[error("索引 {index} 越界，有效范围是 0..{len}")]
    IndexOutOfRange { index: i64, len: usize },

    /// 调用了未定义的函数或方法
    #[error("未知函数或方法 '{name}'")]
    UnknownCallable { name: String },

    /// 参数个数不符
    #[error("'{name}' 期望 {expected} 个参数，实际 {actual} 个")]
    ArityMismatch {
        name: String,
        expected: String,
        actual: usize,
    },

    /// 调用深度超过上限（疑似无限递归）
    #[error("调用深度超过上限 {limit}，疑似无限递归")]
    StackOverflow { limit: usize },

    /// break 出现在循环之外
    #[error("break 只能出现在循环内")]
    BreakOutsideLoop,

    /// continue 出现在循环之外
    #[error("continue 只能出现在循环内")]
    ContinueOutsideLoop,

    /// return 出现在函数之外
    #[error("return 只能出现在函数内")]
    ReturnOutsideFunction,

    /// 输出写入失败
    #[error("输出写入失败: {message}")]
    OutputFailed { message: String },
}

impl RuntimeError {
    /// 创建类型不匹配错误
    pub fn type_mismatch(
        expected: &'static str,
        actual: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            expected,
            actual: actual.into(),
            context: context.into(),
        }
    }
}

/// mica-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MicaError {
    /// 词法错误
    #[error("词法错误: {0}")]
    Lex(#[from] LexError),

    /// 语法错误
    #[error("语法错误: {0}")]
    Parse(#[from] ParseError),

    /// 求值错误
    #[error("求值错误: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Result 类型别名
pub type MicaResult<T> = Result<T, MicaError>;
