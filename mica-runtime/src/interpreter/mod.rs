//! # Interpreter 模块
//!
//! 树遍历求值器：对 AST 做穷尽 match 分派，在可变环境和
//! 内置函数注册表之上执行程序。
//!
//! ## 控制流模型
//!
//! 每条语句的执行结果是 [`Outcome`]：要么正常完成并产出一个值，
//! 要么抛起 Break / Continue / Return 三种控制信号之一。信号沿
//! 求值栈向上传播，直到被最近的处理边界消费：
//!
//! ```text
//! Break / Continue  -> 最近的外层循环（Continue 重新检查条件，Break 退出循环）
//! Return(Value)     -> 最近的函数调用边界，成为该调用的结果
//! ```
//!
//! 除 Return 外，信号不允许跨越函数边界；逃逸到程序顶层的信号
//! 一律转换为求值错误。
//!
//! ## 模块结构
//!
//! - [`environment`]：变量环境（创建即赋值 + 遮蔽保存/恢复）
//! - [`builtins`]：内置函数注册表与方法分发

pub mod builtins;
pub mod environment;


use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use crate::error::{MicaError, MicaResult, RuntimeError};
use crate::script::ast::{AstNode, BinOp, UnaryOp};
use crate::script::parser;
use crate::value::{Value, format_number};

use builtins::Builtins;
use environment::Environment;

/// 调用深度上限
///
/// 失控的递归在耗尽宿主调用栈之前被转换为 StackOverflow 错误，
/// 而不是让进程静默崩溃。
pub const MAX_CALL_DEPTH: usize = 128;

/// 语句执行结果
///
/// 控制信号不是普通的值：它们沿求值栈向上传播，
/// 在匹配的边界被消费，绝不会出现在求值器外部。
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// 正常完成，产出一个值
    Normal(Value),
    /// break 信号，由最近的循环消费
    Break,
    /// continue 信号，由最近的循环消费
    Continue,
    /// return 信号，由最近的函数调用边界消费
    Return(Value),
}

/// 用户定义的函数
#[derive(Debug, Clone, PartialEq)]
struct UserFunction {
    params: Vec<String>,
    body: AstNode,
}

/// 树遍历求值器
///
/// 持有变量环境、用户函数表、内置函数注册表和输出句柄，
/// 生命周期覆盖一次程序执行。
pub struct Interpreter {
    env: Environment,
    functions: HashMap<String, Rc<UserFunction>>,
    builtins: Builtins,
    out: Box<dyn Write>,
    call_depth: usize,
}

impl Interpreter {
    /// 创建求值器，`print` 输出到标准输出
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// 创建求值器并指定输出句柄（测试时注入缓冲区）
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self {
            env: Environment::new(),
            functions: HashMap::new(),
            builtins: Builtins::new(),
            out,
            call_depth: 0,
        }
    }

    /// 读取变量当前的值（供宿主 / 测试检查执行结果）
    pub fn get_var(&self, name: &str) -> Option<&Value> {
        self.env.get(name)
    }

    /// 解析并执行一段源码，返回最后一条语句的值
    pub fn run_source(&mut self, text: &str) -> MicaResult<Value> {
        let program = parser::parse(text)?;
        self.run(&program).map_err(MicaError::from)
    }

    /// 执行一棵已解析的程序树
    ///
    /// 逃逸到顶层的控制信号是错误：break / continue 只能出现在
    /// 循环内，return 只能出现在函数内。
    pub fn run(&mut self, program: &AstNode) -> Result<Value, RuntimeError> {
        match self.execute(program)? {
            Outcome::Normal(value) => Ok(value),
            Outcome::Break => Err(RuntimeError::BreakOutsideLoop),
            Outcome::Continue => Err(RuntimeError::ContinueOutsideLoop),
            Outcome::Return(_) => Err(RuntimeError::ReturnOutsideFunction),
        }
    }

    // ── 语句执行 ──────────────────────────────────────────────

    /// 执行一条语句，返回 Outcome
    ///
    /// 表达式形状的节点走 [`evaluate`](Interpreter::evaluate)，
    /// 结果包装为 `Outcome::Normal`。
    fn execute(&mut self, node: &AstNode) -> Result<Outcome, RuntimeError> {
        match node {
            AstNode::Block { statements } => self.execute_block(statements),

            AstNode::Assignment { name, value } => {
                let value = self.evaluate(value)?;
                self.env.set(name.clone(), value.clone());
                // 赋值语句的值就是被赋的值
                Ok(Outcome::Normal(value))
            }

            AstNode::IndexAssignment { base, index, value } => {
                let outcome = self.index_assign(base, index, value)?;
                Ok(Outcome::Normal(outcome))
            }

            AstNode::FunctionDef { name, params, body } => {
                self.functions.insert(
                    name.clone(),
                    Rc::new(UserFunction {
                        params: params.clone(),
                        body: (**body).clone(),
                    }),
                );
                Ok(Outcome::Normal(Value::Nil))
            }

            AstNode::Return { value } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Outcome::Return(value))
            }

            AstNode::Break => Ok(Outcome::Break),
            AstNode::Continue => Ok(Outcome::Continue),

            AstNode::If {
                condition,
                then_block,
                elif_clauses,
                else_block,
            } => self.execute_if(condition, then_block, elif_clauses, else_block.as_deref()),

            AstNode::While { condition, body } => self.execute_while(condition, body),

            AstNode::For {
                variable,
                iterable,
                body,
            } => self.execute_for(variable, iterable, body),

            expr => Ok(Outcome::Normal(self.evaluate(expr)?)),
        }
    }

    /// 顺序执行语句块；信号立即向上传播，块的值是最后一条语句的值
    fn execute_block(&mut self, statements: &[AstNode]) -> Result<Outcome, RuntimeError> {
        let mut result = Value::Nil;
        for statement in statements {
            match self.execute(statement)? {
                Outcome::Normal(value) => result = value,
                signal => return Ok(signal),
            }
        }
        Ok(Outcome::Normal(result))
    }

    /// if / else if / else：按源码顺序取第一个条件为真的分支
    fn execute_if(
        &mut self,
        condition: &AstNode,
        then_block: &AstNode,
        elif_clauses: &[(AstNode, AstNode)],
        else_block: Option<&AstNode>,
    ) -> Result<Outcome, RuntimeError> {
        if self.evaluate(condition)?.is_truthy() {
            return self.execute(then_block);
        }

        for (elif_condition, elif_block) in elif_clauses {
            if self.evaluate(elif_condition)?.is_truthy() {
                return self.execute(elif_block);
            }
        }

        match else_block {
            Some(block) => self.execute(block),
            None => Ok(Outcome::Normal(Value::Nil)),
        }
    }

    /// while 循环：Break 退出，Continue 重新检查条件，Return 穿透
    fn execute_while(
        &mut self,
        condition: &AstNode,
        body: &AstNode,
    ) -> Result<Outcome, RuntimeError> {
        while self.evaluate(condition)?.is_truthy() {
            match self.execute(body)? {
                Outcome::Normal(_) | Outcome::Continue => {}
                Outcome::Break => break,
                ret @ Outcome::Return(_) => return Ok(ret),
            }
        }
        Ok(Outcome::Normal(Value::Nil))
    }

    /// for-in 循环
    ///
    /// 可迭代对象：数组（对元素列表的快照迭代）、文本（逐字符，
    /// 产出长度 1 的文本）、区间（惰性产出整数）。循环变量的旧绑定
    /// 在进入前保存，沿任何退出路径恢复。
    fn execute_for(
        &mut self,
        variable: &str,
        iterable: &AstNode,
        body: &AstNode,
    ) -> Result<Outcome, RuntimeError> {
        let value = self.evaluate(iterable)?;

        let items: Box<dyn Iterator<Item = Value>> = match value {
            Value::Array(cell) => Box::new(cell.borrow().clone().into_iter()),
            Value::Text(s) => Box::new(
                s.chars()
                    .map(|c| Value::text(c.to_string()))
                    .collect::<Vec<_>>()
                    .into_iter(),
            ),
            Value::Range { start, stop, step } => Box::new(range_iter(start, stop, step)),
            other => {
                return Err(RuntimeError::type_mismatch(
                    "Array / Text / Range",
                    other.type_name(),
                    "for 循环的可迭代对象",
                ));
            }
        };

        let prior = self.env.save(variable);
        let result = self.run_loop_body(variable, items, body);
        self.env.restore(variable, prior);
        result
    }

    fn run_loop_body(
        &mut self,
        variable: &str,
        items: impl Iterator<Item = Value>,
        body: &AstNode,
    ) -> Result<Outcome, RuntimeError> {
        for item in items {
            self.env.set(variable.to_string(), item);
            match self.execute(body)? {
                Outcome::Normal(_) | Outcome::Continue => {}
                Outcome::Break => break,
                ret @ Outcome::Return(_) => return Ok(ret),
            }
        }
        Ok(Outcome::Normal(Value::Nil))
    }

    // ── 表达式求值 ────────────────────────────────────────────

    /// 对表达式求值
    ///
    /// 表达式永远产出值；控制信号只会由语句产生。
    fn evaluate(&mut self, node: &AstNode) -> Result<Value, RuntimeError> {
        match node {
            AstNode::Number(n) => Ok(Value::Number(*n)),
            AstNode::String(s) => Ok(Value::text(s.clone())),
            AstNode::Boolean(b) => Ok(Value::Bool(*b)),

            AstNode::Variable { name } => {
                self.env
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UndefinedVariable { name: name.clone() })
            }

            AstNode::Unary { op, operand } => {
                let value = self.evaluate(operand)?;
                match (op, value) {
                    (UnaryOp::Plus, Value::Number(n)) => Ok(Value::Number(n)),
                    (UnaryOp::Minus, Value::Number(n)) => Ok(Value::Number(-n)),
                    (_, other) => Err(RuntimeError::type_mismatch(
                        "Number",
                        other.type_name(),
                        "一元正负号的操作数",
                    )),
                }
            }

            AstNode::Binary { left, op, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                apply_binary(*op, left, right)
            }

            AstNode::Index { base, index } => {
                let base = self.evaluate(base)?;
                let index = self.evaluate(index)?;
                index_value(&base, &index)
            }

            AstNode::Array { elements } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }
                Ok(Value::array(values))
            }

            AstNode::FunctionCall { name, args } => self.call_function(name, args),

            AstNode::MethodCall {
                receiver,
                method,
                args,
            } => {
                let receiver = self.evaluate(receiver)?;
                let args = self.evaluate_all(args)?;
                builtins::call_method(&receiver, method, &args)
            }

            // 语句形状的节点不会出现在表达式文法里；
            // 万一出现，按语句执行并要求正常完成
            stmt => match self.execute(stmt)? {
                Outcome::Normal(value) => Ok(value),
                Outcome::Break => Err(RuntimeError::BreakOutsideLoop),
                Outcome::Continue => Err(RuntimeError::ContinueOutsideLoop),
                Outcome::Return(_) => Err(RuntimeError::ReturnOutsideFunction),
            },
        }
    }

    fn evaluate_all(&mut self, nodes: &[AstNode]) -> Result<Vec<Value>, RuntimeError> {
        let mut values = Vec::with_capacity(nodes.len());
        for node in nodes {
            values.push(self.evaluate(node)?);
        }
        Ok(values)
    }

    /// 索引赋值：基必须是数组（文本不可变），原地写入
    fn index_assign(
        &mut self,
        base: &AstNode,
        index: &AstNode,
        value: &AstNode,
    ) -> Result<Value, RuntimeError> {
        let base = self.evaluate(base)?;
        let index = self.evaluate(index)?;
        let value = self.evaluate(value)?;

        let Value::Array(cell) = base else {
            return Err(RuntimeError::type_mismatch(
                "Array",
                base.type_name(),
                "索引赋值的目标",
            ));
        };

        let idx = expect_index(&index)?;
        let mut elements = cell.borrow_mut();
        if idx < 0 || idx as usize >= elements.len() {
            return Err(RuntimeError::IndexOutOfRange {
                index: idx,
                len: elements.len(),
            });
        }
        elements[idx as usize] = value.clone();
        Ok(value)
    }

    /// 函数调用：用户定义的函数优先于同名内置函数
    fn call_function(&mut self, name: &str, args: &[AstNode]) -> Result<Value, RuntimeError> {
        if let Some(function) = self.functions.get(name).cloned() {
            return self.call_user_function(name, &function, args);
        }

        if let Some(builtin) = self.builtins.get(name) {
            let args = self.evaluate_all(args)?;
            return builtin(&args, self.out.as_mut());
        }

        Err(RuntimeError::UnknownCallable {
            name: name.to_string(),
        })
    }

    /// 调用用户定义的函数
    ///
    /// 实参在调用方作用域求值；形参以遮蔽方式写入环境，调用结束后
    /// 沿任何路径恢复旧绑定。Return 在这里被消费，Break / Continue
    /// 不允许跨越调用边界。
    fn call_user_function(
        &mut self,
        name: &str,
        function: &UserFunction,
        args: &[AstNode],
    ) -> Result<Value, RuntimeError> {
        if args.len() != function.params.len() {
            return Err(RuntimeError::ArityMismatch {
                name: name.to_string(),
                expected: function.params.len().to_string(),
                actual: args.len(),
            });
        }

        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::StackOverflow {
                limit: MAX_CALL_DEPTH,
            });
        }

        let args = self.evaluate_all(args)?;

        let priors = self.env.save_all(&function.params);
        for (param, arg) in function.params.iter().zip(args) {
            self.env.set(param.clone(), arg);
        }

        self.call_depth += 1;
        let outcome = self.execute(&function.body);
        self.call_depth -= 1;

        self.env.restore_all(&function.params, priors);

        match outcome? {
            Outcome::Return(value) => Ok(value),
            // 函数体自然结束，结果是 Nil
            Outcome::Normal(_) => Ok(Value::Nil),
            Outcome::Break => Err(RuntimeError::BreakOutsideLoop),
            Outcome::Continue => Err(RuntimeError::ContinueOutsideLoop),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

// ── 运算符语义 ────────────────────────────────────────────────

/// 二元运算分派
fn apply_binary(op: BinOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add => apply_add(left, right),
        BinOp::Sub => {
            let (l, r) = numeric_operands("-", left, right)?;
            Ok(Value::Number(l - r))
        }
        BinOp::Mul => apply_mul(left, right),
        BinOp::Div => {
            let (l, r) = numeric_operands("/", left, right)?;
            if r == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Ok(Value::Number(l / r))
        }
        BinOp::Eq => Ok(Value::Bool(left == right)),
        BinOp::NotEq => Ok(Value::Bool(left != right)),
        BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq => apply_ordering(op, left, right),
    }
}

/// `+`：任一操作数是文本时做拼接（另一侧先字符串化），否则数字相加
fn apply_add(left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (&left, &right) {
        (Value::Text(_), _) | (_, Value::Text(_)) => {
            Ok(Value::text(format!("{}{}", left, right)))
        }
        (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
        _ => Err(mismatched_operand("+", &left, &right)),
    }
}

/// `*`：数字相乘；数字×文本（或反之）按 floor 次数重复文本，
/// 负数或小数次数向零截断；文本×文本是类型错误
fn apply_mul(left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (&left, &right) {
        (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l * r)),
        (Value::Text(s), Value::Number(n)) | (Value::Number(n), Value::Text(s)) => {
            let count = *n as i64;
            if count <= 0 {
                Ok(Value::text(""))
            } else {
                Ok(Value::text(s.repeat(count as usize)))
            }
        }
        _ => Err(mismatched_operand("*", &left, &right)),
    }
}

/// 排序比较：只允许相同且可排序的类型；跨类型是类型错误
/// （与 `==` / `!=` 不同，后者跨类型恒为 false / true）
fn apply_ordering(op: BinOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    let result = match (&left, &right) {
        (Value::Number(l), Value::Number(r)) => match op {
            BinOp::Lt => l < r,
            BinOp::Gt => l > r,
            BinOp::LtEq => l <= r,
            BinOp::GtEq => l >= r,
            _ => unreachable!("非排序运算符"),
        },
        (Value::Text(l), Value::Text(r)) => match op {
            BinOp::Lt => l < r,
            BinOp::Gt => l > r,
            BinOp::LtEq => l <= r,
            BinOp::GtEq => l >= r,
            _ => unreachable!("非排序运算符"),
        },
        (Value::Bool(l), Value::Bool(r)) => match op {
            BinOp::Lt => l < r,
            BinOp::Gt => l > r,
            BinOp::LtEq => l <= r,
            BinOp::GtEq => l >= r,
            _ => unreachable!("非排序运算符"),
        },
        _ => return Err(mismatched_operand(op.symbol(), &left, &right)),
    };
    Ok(Value::Bool(result))
}

/// 要求两侧都是数字
fn numeric_operands(
    symbol: &str,
    left: Value,
    right: Value,
) -> Result<(f64, f64), RuntimeError> {
    match (&left, &right) {
        (Value::Number(l), Value::Number(r)) => Ok((*l, *r)),
        _ => Err(mismatched_operand(symbol, &left, &right)),
    }
}

fn mismatched_operand(symbol: &str, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::type_mismatch(
        "Number",
        format!("{} 和 {}", left.type_name(), right.type_name()),
        format!("'{}' 的操作数", symbol),
    )
}

/// 索引必须是数字，向零截断
fn expect_index(value: &Value) -> Result<i64, RuntimeError> {
    match value {
        Value::Number(n) => Ok(*n as i64),
        other => Err(RuntimeError::type_mismatch(
            "Number",
            other.type_name(),
            "索引",
        )),
    }
}

/// 索引访问：数组取元素，文本取长度 1 的子串
fn index_value(base: &Value, index: &Value) -> Result<Value, RuntimeError> {
    let idx = expect_index(index)?;

    match base {
        Value::Array(cell) => {
            let elements = cell.borrow();
            if idx < 0 || idx as usize >= elements.len() {
                return Err(RuntimeError::IndexOutOfRange {
                    index: idx,
                    len: elements.len(),
                });
            }
            Ok(elements[idx as usize].clone())
        }
        Value::Text(s) => {
            let len = s.chars().count();
            if idx < 0 || idx as usize >= len {
                return Err(RuntimeError::IndexOutOfRange { index: idx, len });
            }
            let ch = s
                .chars()
                .nth(idx as usize)
                .ok_or(RuntimeError::IndexOutOfRange { index: idx, len })?;
            Ok(Value::text(ch.to_string()))
        }
        other => Err(RuntimeError::type_mismatch(
            "Array 或 Text",
            other.type_name(),
            format!("索引访问的基（索引 {}）", format_number(idx as f64)),
        )),
    }
}

/// 半开整数区间的惰性迭代
fn range_iter(start: i64, stop: i64, step: i64) -> impl Iterator<Item = Value> {
    std::iter::successors(Some(start), move |&i| Some(i + step))
        .take_while(move |&i| if step > 0 { i < stop } else { i > stop })
        .map(|i| Value::Number(i as f64))
}
