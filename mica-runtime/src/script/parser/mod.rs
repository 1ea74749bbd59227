//! # Parser 模块
//!
//! 手写递归下降解析器，单 Token 前瞻，二元运算用优先级爬升。
//!
//! ## 文法（表达式优先级从低到高）
//!
//! ```text
//! expression := arithmetic ( 比较运算符 arithmetic )*
//! arithmetic := term ( (+|-) term )*
//! term       := factor ( (*|/) factor )*
//! factor     := (+|-) factor | primary postfix*
//! primary    := NUMBER | STRING | true | false | 数组字面量
//!             | IDENTIFIER (调用参数)? | '(' expression ')'
//! postfix    := '[' expression ']' | '.' IDENTIFIER ( '(' 参数 ')' )?
//! ```
//!
//! ## 设计说明
//!
//! - 比较运算符沿用左结合链（`a < b < c` 会拿上一次比较的布尔结果
//!   继续比较，这是语言已有行为，按原样保留）
//! - 赋值语句采用试探式解析：先解析完整表达式，看到 `=` 再把左侧
//!   改写为赋值节点；左侧不是变量或索引表达式时报错
//! - 块内语句由换行 / 逗号 / 分号的任意组合分隔；参数列表内的换行
//!   被解析器丢弃
//! - 解析遇到第一个错误即停止，不做错误恢复

#[cfg(test)]
mod tests;

use crate::error::{MicaResult, ParseError};
use crate::script::ast::{AstNode, BinOp, UnaryOp};
use crate::script::lexer::Lexer;
use crate::script::token::{Token, TokenKind};

/// 解析源文本，返回整个程序的语句块
pub fn parse(text: &str) -> MicaResult<AstNode> {
    Parser::new(text)?.parse_program()
}

/// 脚本解析器
///
/// 持有词法分析器和一个已缓冲的当前 Token（单 Token 前瞻，
/// 不做词法游标回滚）。
pub struct Parser {
    lexer: Lexer,
    current: Token,
}

impl Parser {
    /// 创建解析器并预读第一个 Token
    pub fn new(text: &str) -> MicaResult<Self> {
        let mut lexer = Lexer::new(text);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// 前进到下一个 Token
    fn advance(&mut self) -> MicaResult<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    /// 当前 Token 必须是指定种类，否则报语法错误
    fn expect(&mut self, kind: TokenKind) -> MicaResult<Token> {
        if self.current.kind == kind {
            let token = self.current.clone();
            self.advance()?;
            Ok(token)
        } else {
            Err(ParseError::UnexpectedToken {
                expected: kind.to_string(),
                found: self.current.to_string(),
            }
            .into())
        }
    }

    /// 跳过连续的换行
    fn skip_newlines(&mut self) -> MicaResult<()> {
        while self.current.kind == TokenKind::Newline {
            self.advance()?;
        }
        Ok(())
    }

    /// 跳过连续的语句分隔符（换行 / 逗号 / 分号）
    fn skip_separators(&mut self) -> MicaResult<()> {
        while self.current.is_separator() {
            self.advance()?;
        }
        Ok(())
    }

    /// 解析完整程序
    ///
    /// 消费整个 Token 流，返回顶层语句块。
    pub fn parse_program(&mut self) -> MicaResult<AstNode> {
        let mut statements = Vec::new();

        self.skip_separators()?;
        while self.current.kind != TokenKind::Eof {
            statements.push(self.statement()?);
            self.skip_separators()?;
        }

        Ok(AstNode::block(statements))
    }

    /// 解析一条语句
    fn statement(&mut self) -> MicaResult<AstNode> {
        self.skip_newlines()?;

        match self.current.kind {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Break => {
                self.advance()?;
                Ok(AstNode::Break)
            }
            TokenKind::Continue => {
                self.advance()?;
                Ok(AstNode::Continue)
            }
            TokenKind::Function => self.parse_function_def(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Identifier => self.parse_assignment_or_expression(),
            _ => self.expression(),
        }
    }

    /// 试探式赋值解析
    ///
    /// 先解析完整表达式（可能是变量、索引表达式或任意别的形状），
    /// 看到 `=` 时把已解析的左侧改写为赋值节点。
    fn parse_assignment_or_expression(&mut self) -> MicaResult<AstNode> {
        let left = self.expression()?;

        if self.current.kind != TokenKind::Assign {
            return Ok(left);
        }
        self.advance()?;
        let value = self.expression()?;

        match left {
            AstNode::Variable { name } => Ok(AstNode::Assignment {
                name,
                value: Box::new(value),
            }),
            AstNode::Index { base, index } => Ok(AstNode::IndexAssignment {
                base,
                index,
                value: Box::new(value),
            }),
            _ => Err(ParseError::InvalidAssignmentTarget.into()),
        }
    }

    /// 最低优先级：比较运算符（左结合链）
    fn expression(&mut self) -> MicaResult<AstNode> {
        let mut node = self.arithmetic()?;

        while let Some(op) = BinOp::from_token(self.current.kind).filter(BinOp::is_comparison) {
            self.advance()?;
            let right = self.arithmetic()?;
            node = AstNode::binary(node, op, right);
        }

        Ok(node)
    }

    /// 加减（左结合）
    fn arithmetic(&mut self) -> MicaResult<AstNode> {
        let mut node = self.term()?;

        while matches!(self.current.kind, TokenKind::Plus | TokenKind::Minus) {
            let op = if self.current.kind == TokenKind::Plus {
                BinOp::Add
            } else {
                BinOp::Sub
            };
            self.advance()?;
            let right = self.term()?;
            node = AstNode::binary(node, op, right);
        }

        Ok(node)
    }

    /// 乘除（左结合）
    fn term(&mut self) -> MicaResult<AstNode> {
        let mut node = self.factor()?;

        while matches!(self.current.kind, TokenKind::Multiply | TokenKind::Divide) {
            let op = if self.current.kind == TokenKind::Multiply {
                BinOp::Mul
            } else {
                BinOp::Div
            };
            self.advance()?;
            let right = self.factor()?;
            node = AstNode::binary(node, op, right);
        }

        Ok(node)
    }

    /// 前缀正负号（右递归，`--5` 是双重取负）与基本表达式
    fn factor(&mut self) -> MicaResult<AstNode> {
        match self.current.kind {
            TokenKind::Plus => {
                self.advance()?;
                Ok(AstNode::unary(UnaryOp::Plus, self.factor()?))
            }
            TokenKind::Minus => {
                self.advance()?;
                Ok(AstNode::unary(UnaryOp::Minus, self.factor()?))
            }
            _ => {
                let primary = self.primary()?;
                self.parse_postfix(primary)
            }
        }
    }

    /// 基本表达式
    fn primary(&mut self) -> MicaResult<AstNode> {
        match self.current.kind {
            TokenKind::Number => {
                let token = self.expect(TokenKind::Number)?;
                let value = token.lexeme.parse::<f64>().map_err(|_| {
                    ParseError::UnexpectedToken {
                        expected: TokenKind::Number.to_string(),
                        found: token.to_string(),
                    }
                })?;
                Ok(AstNode::number(value))
            }
            TokenKind::String => {
                let token = self.expect(TokenKind::String)?;
                Ok(AstNode::string(token.lexeme))
            }
            TokenKind::True => {
                self.advance()?;
                Ok(AstNode::boolean(true))
            }
            TokenKind::False => {
                self.advance()?;
                Ok(AstNode::boolean(false))
            }
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::Identifier => {
                let name = self.expect(TokenKind::Identifier)?.lexeme;
                if self.current.kind == TokenKind::LParen {
                    // 函数调用
                    self.advance()?;
                    let args = self.parse_arguments()?;
                    self.expect(TokenKind::RParen)?;
                    Ok(AstNode::FunctionCall { name, args })
                } else {
                    Ok(AstNode::variable(name))
                }
            }
            TokenKind::LParen => {
                self.advance()?;
                let node = self.expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(node)
            }
            _ => Err(ParseError::UnexpectedToken {
                expected: "表达式".to_string(),
                found: self.current.to_string(),
            }
            .into()),
        }
    }

    /// 后缀链：索引和方法调用，从左到右反复应用
    ///
    /// `a[0].method().length()` 是合法的链。无括号的 `.name`
    /// 解析为零参数方法调用。
    fn parse_postfix(&mut self, mut base: AstNode) -> MicaResult<AstNode> {
        loop {
            match self.current.kind {
                TokenKind::LBracket => {
                    self.advance()?;
                    let index = self.expression()?;
                    self.expect(TokenKind::RBracket)?;
                    base = AstNode::Index {
                        base: Box::new(base),
                        index: Box::new(index),
                    };
                }
                TokenKind::Dot => {
                    self.advance()?;
                    let method = self.expect(TokenKind::Identifier)?.lexeme;

                    let args = if self.current.kind == TokenKind::LParen {
                        self.advance()?;
                        let args = self.parse_arguments()?;
                        self.expect(TokenKind::RParen)?;
                        args
                    } else {
                        Vec::new()
                    };

                    base = AstNode::MethodCall {
                        receiver: Box::new(base),
                        method,
                        args,
                    };
                }
                _ => return Ok(base),
            }
        }
    }

    /// 解析逗号分隔的参数列表（参数列表内部的换行被丢弃）
    ///
    /// 调用方负责消费左右括号。
    fn parse_arguments(&mut self) -> MicaResult<Vec<AstNode>> {
        let mut args = Vec::new();

        self.skip_newlines()?;
        if self.current.kind == TokenKind::RParen {
            return Ok(args);
        }

        args.push(self.expression()?);

        self.skip_newlines()?;
        while self.current.kind == TokenKind::Comma {
            self.advance()?;
            self.skip_newlines()?;
            args.push(self.expression()?);
            self.skip_newlines()?;
        }

        Ok(args)
    }

    /// 解析数组字面量 `[a, b, c]`
    fn parse_array_literal(&mut self) -> MicaResult<AstNode> {
        self.expect(TokenKind::LBracket)?;
        let mut elements = Vec::new();

        self.skip_newlines()?;
        if self.current.kind == TokenKind::RBracket {
            self.advance()?;
            return Ok(AstNode::Array { elements });
        }

        elements.push(self.expression()?);

        self.skip_newlines()?;
        while self.current.kind == TokenKind::Comma {
            self.advance()?;
            self.skip_newlines()?;
            elements.push(self.expression()?);
            self.skip_newlines()?;
        }

        self.expect(TokenKind::RBracket)?;
        Ok(AstNode::Array { elements })
    }

    /// 解析花括号语句块
    ///
    /// 块内语句由换行 / 逗号 / 分号的任意组合分隔。
    fn parse_block(&mut self) -> MicaResult<AstNode> {
        self.expect(TokenKind::LBrace)?;
        self.skip_separators()?;

        let mut statements = Vec::new();
        while self.current.kind != TokenKind::RBrace && self.current.kind != TokenKind::Eof {
            statements.push(self.statement()?);
            self.skip_separators()?;
        }

        self.expect(TokenKind::RBrace)?;
        Ok(AstNode::block(statements))
    }

    /// 解析 if / else if / else
    ///
    /// elif 子句按出现顺序收集，尾随的 else 可选。
    fn parse_if(&mut self) -> MicaResult<AstNode> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.expression()?;
        self.expect(TokenKind::RParen)?;

        self.skip_newlines()?;
        let then_block = self.parse_block()?;

        let mut elif_clauses = Vec::new();
        self.skip_newlines()?;
        while self.current.kind == TokenKind::Elif {
            self.advance()?;
            self.expect(TokenKind::LParen)?;
            let elif_condition = self.expression()?;
            self.expect(TokenKind::RParen)?;

            self.skip_newlines()?;
            let elif_block = self.parse_block()?;
            elif_clauses.push((elif_condition, elif_block));
            self.skip_newlines()?;
        }

        let else_block = if self.current.kind == TokenKind::Else {
            self.advance()?;
            self.skip_newlines()?;
            Some(Box::new(self.parse_block()?))
        } else {
            None
        };

        Ok(AstNode::If {
            condition: Box::new(condition),
            then_block: Box::new(then_block),
            elif_clauses,
            else_block,
        })
    }

    /// 解析 while 循环
    fn parse_while(&mut self) -> MicaResult<AstNode> {
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.expression()?;
        self.expect(TokenKind::RParen)?;

        self.skip_newlines()?;
        let body = self.parse_block()?;

        Ok(AstNode::While {
            condition: Box::new(condition),
            body: Box::new(body),
        })
    }

    /// 解析 for-in 循环
    fn parse_for(&mut self) -> MicaResult<AstNode> {
        self.expect(TokenKind::For)?;
        self.expect(TokenKind::LParen)?;
        let variable = self.expect(TokenKind::Identifier)?.lexeme;
        self.expect(TokenKind::In)?;
        let iterable = self.expression()?;
        self.expect(TokenKind::RParen)?;

        self.skip_newlines()?;
        let body = self.parse_block()?;

        Ok(AstNode::For {
            variable,
            iterable: Box::new(iterable),
            body: Box::new(body),
        })
    }

    /// 解析函数定义
    fn parse_function_def(&mut self) -> MicaResult<AstNode> {
        self.expect(TokenKind::Function)?;

        if self.current.kind != TokenKind::Identifier {
            return Err(ParseError::MalformedFunctionSignature {
                message: format!("期望函数名，实际 {}", self.current),
            }
            .into());
        }
        let name = self.current.lexeme.clone();
        self.advance()?;

        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if self.current.kind != TokenKind::RParen {
            params.push(self.expect_param()?);
            while self.current.kind == TokenKind::Comma {
                self.advance()?;
                params.push(self.expect_param()?);
            }
        }
        self.expect(TokenKind::RParen)?;

        self.skip_newlines()?;
        let body = self.parse_block()?;

        Ok(AstNode::FunctionDef {
            name,
            params,
            body: Box::new(body),
        })
    }

    /// 读取一个参数名
    fn expect_param(&mut self) -> MicaResult<String> {
        if self.current.kind != TokenKind::Identifier {
            return Err(ParseError::MalformedFunctionSignature {
                message: format!("期望参数名，实际 {}", self.current),
            }
            .into());
        }
        let name = self.current.lexeme.clone();
        self.advance()?;
        Ok(name)
    }

    /// 解析 return 语句（返回值可选）
    fn parse_return(&mut self) -> MicaResult<AstNode> {
        self.expect(TokenKind::Return)?;

        let value = match self.current.kind {
            TokenKind::Newline
            | TokenKind::Semicolon
            | TokenKind::Comma
            | TokenKind::RBrace
            | TokenKind::Eof => None,
            _ => Some(Box::new(self.expression()?)),
        };

        Ok(AstNode::Return { value })
    }
}
