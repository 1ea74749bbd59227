//! # AST 模块
//!
//! 定义脚本的抽象语法树（Abstract Syntax Tree）。
//!
//! ## 设计说明
//!
//! AST 是解析器的输出、求值器的输入。节点集合是封闭枚举，
//! 求值器用穷尽 match 分派，编译器保证每种节点都有求值逻辑。
//! 每个节点独占其子节点（严格树形，无共享、无环）。

use serde::{Deserialize, Serialize};

use crate::script::token::TokenKind;

/// 二元运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
}

impl BinOp {
    /// 从 Token 种类转换（运算符标记是 AST 对 Token 定义的唯一依赖）
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(Self::Add),
            TokenKind::Minus => Some(Self::Sub),
            TokenKind::Multiply => Some(Self::Mul),
            TokenKind::Divide => Some(Self::Div),
            TokenKind::Equal => Some(Self::Eq),
            TokenKind::NotEqual => Some(Self::NotEq),
            TokenKind::LessThan => Some(Self::Lt),
            TokenKind::GreaterThan => Some(Self::Gt),
            TokenKind::LessEqual => Some(Self::LtEq),
            TokenKind::GreaterEqual => Some(Self::GtEq),
            _ => None,
        }
    }

    /// 运算符的源码写法（用于错误信息）
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
        }
    }

    /// 是否是比较运算符
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::Gt | Self::LtEq | Self::GtEq
        )
    }
}

/// 一元运算符（前缀正负号）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `+`
    Plus,
    /// `-`
    Minus,
}

/// AST 节点
///
/// 表达式和语句共用同一个节点集合，和动态语言的语法结构一一对应。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AstNode {
    /// 数字字面量
    Number(f64),

    /// 字符串字面量
    String(String),

    /// 布尔字面量
    Boolean(bool),

    /// 一元运算（前缀正负号）
    Unary {
        op: UnaryOp,
        operand: Box<AstNode>,
    },

    /// 二元运算
    Binary {
        left: Box<AstNode>,
        op: BinOp,
        right: Box<AstNode>,
    },

    /// 变量引用
    Variable { name: String },

    /// 变量赋值 `name = expr`
    Assignment { name: String, value: Box<AstNode> },

    /// 索引访问 `base[index]`
    Index {
        base: Box<AstNode>,
        index: Box<AstNode>,
    },

    /// 索引赋值 `base[index] = expr`
    IndexAssignment {
        base: Box<AstNode>,
        index: Box<AstNode>,
        value: Box<AstNode>,
    },

    /// 数组字面量 `[a, b, c]`
    Array { elements: Vec<AstNode> },

    /// 方法调用 `receiver.method(args)`
    ///
    /// 无括号的 `receiver.method` 解析为零参数方法调用。
    MethodCall {
        receiver: Box<AstNode>,
        method: String,
        args: Vec<AstNode>,
    },

    /// 函数调用 `name(args)`
    FunctionCall { name: String, args: Vec<AstNode> },

    /// 函数定义
    FunctionDef {
        name: String,
        params: Vec<String>,
        body: Box<AstNode>,
    },

    /// return 语句（可带返回值）
    Return { value: Option<Box<AstNode>> },

    /// if / else if / else
    ///
    /// elif 子句按出现顺序保存，第一个条件为真的分支生效。
    If {
        condition: Box<AstNode>,
        then_block: Box<AstNode>,
        elif_clauses: Vec<(AstNode, AstNode)>,
        else_block: Option<Box<AstNode>>,
    },

    /// while 循环
    While {
        condition: Box<AstNode>,
        body: Box<AstNode>,
    },

    /// for-in 循环
    For {
        variable: String,
        iterable: Box<AstNode>,
        body: Box<AstNode>,
    },

    /// break 语句
    Break,

    /// continue 语句
    Continue,

    /// 语句块（按顺序执行）
    Block { statements: Vec<AstNode> },
}

impl AstNode {
    /// 创建数字字面量
    pub fn number(n: f64) -> Self {
        Self::Number(n)
    }

    /// 创建字符串字面量
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// 创建布尔字面量
    pub fn boolean(b: bool) -> Self {
        Self::Boolean(b)
    }

    /// 创建变量引用
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable { name: name.into() }
    }

    /// 创建二元运算节点
    pub fn binary(left: AstNode, op: BinOp, right: AstNode) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// 创建一元运算节点
    pub fn unary(op: UnaryOp, operand: AstNode) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// 创建赋值节点
    pub fn assignment(name: impl Into<String>, value: AstNode) -> Self {
        Self::Assignment {
            name: name.into(),
            value: Box::new(value),
        }
    }

    /// 创建语句块
    pub fn block(statements: Vec<AstNode>) -> Self {
        Self::Block { statements }
    }

    /// 如果是语句块，返回其中的语句列表
    pub fn as_block(&self) -> Option<&[AstNode]> {
        match self {
            Self::Block { statements } => Some(statements),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binop_from_token() {
        assert_eq!(BinOp::from_token(TokenKind::Plus), Some(BinOp::Add));
        assert_eq!(BinOp::from_token(TokenKind::Equal), Some(BinOp::Eq));
        assert_eq!(BinOp::from_token(TokenKind::LessEqual), Some(BinOp::LtEq));
        assert_eq!(BinOp::from_token(TokenKind::LBrace), None);
    }

    #[test]
    fn test_binop_is_comparison() {
        assert!(BinOp::Eq.is_comparison());
        assert!(BinOp::GtEq.is_comparison());
        assert!(!BinOp::Add.is_comparison());
    }

    #[test]
    fn test_constructors() {
        let node = AstNode::binary(AstNode::number(1.0), BinOp::Add, AstNode::number(2.0));
        assert!(matches!(
            node,
            AstNode::Binary { op: BinOp::Add, .. }
        ));

        let block = AstNode::block(vec![AstNode::variable("x")]);
        assert_eq!(block.as_block().map(|s| s.len()), Some(1));
    }

    #[test]
    fn test_ast_serialization_round_trip() {
        // AST 节点可序列化（调试输出 / 结构化比对）
        let node = AstNode::If {
            condition: Box::new(AstNode::binary(
                AstNode::variable("age"),
                BinOp::GtEq,
                AstNode::number(18.0),
            )),
            then_block: Box::new(AstNode::block(vec![AstNode::assignment(
                "status",
                AstNode::string("adult"),
            )])),
            elif_clauses: vec![],
            else_block: None,
        };

        let json = serde_json::to_string(&node).unwrap();
        let back: AstNode = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }
}
