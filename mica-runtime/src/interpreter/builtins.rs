//! # Builtins 模块
//!
//! 内置函数注册表和内置方法分发。
//!
//! ## 设计说明
//!
//! - 注册表在求值器创建时初始化一次，之后不可变
//! - 内置函数统一签名 `fn(&[Value], &mut dyn Write)`，
//!   只有 `print` 真正使用输出句柄
//! - 数组方法通过共享存储原地修改接收者；文本方法是纯函数

use std::collections::HashMap;
use std::io::Write;

use crate::error::RuntimeError;
use crate::value::Value;

/// 内置函数的统一签名
pub type BuiltinFn = fn(&[Value], &mut dyn Write) -> Result<Value, RuntimeError>;

/// 内置函数注册表
///
/// 名字到原生实现的映射，初始化后不再变化。
pub struct Builtins {
    table: HashMap<&'static str, BuiltinFn>,
}

impl Builtins {
    /// 创建并填充注册表
    pub fn new() -> Self {
        let mut table: HashMap<&'static str, BuiltinFn> = HashMap::new();
        table.insert("print", builtin_print);
        table.insert("abs", builtin_abs);
        table.insert("min", builtin_min);
        table.insert("max", builtin_max);
        table.insert("len", builtin_len);
        table.insert("upper", builtin_upper);
        table.insert("lower", builtin_lower);
        table.insert("range", builtin_range);
        Self { table }
    }

    /// 按名字查找内置函数
    pub fn get(&self, name: &str) -> Option<BuiltinFn> {
        self.table.get(name).copied()
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

/// 要求恰好 n 个参数
fn expect_arity(name: &str, args: &[Value], n: usize) -> Result<(), RuntimeError> {
    if args.len() != n {
        return Err(RuntimeError::ArityMismatch {
            name: name.to_string(),
            expected: n.to_string(),
            actual: args.len(),
        });
    }
    Ok(())
}

/// 要求参数是数字
fn expect_number(name: &str, value: &Value) -> Result<f64, RuntimeError> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(RuntimeError::type_mismatch(
            "Number",
            other.type_name(),
            format!("{} 的参数", name),
        )),
    }
}

/// 要求参数是文本
fn expect_text<'a>(name: &str, value: &'a Value) -> Result<&'a str, RuntimeError> {
    match value {
        Value::Text(s) => Ok(s),
        other => Err(RuntimeError::type_mismatch(
            "Text",
            other.type_name(),
            format!("{} 的参数", name),
        )),
    }
}

/// `print(...)`：按空格拼接各参数的文本形式，输出一行
fn builtin_print(args: &[Value], out: &mut dyn Write) -> Result<Value, RuntimeError> {
    let line = args
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "{}", line).map_err(|e| RuntimeError::OutputFailed {
        message: e.to_string(),
    })?;
    Ok(Value::Nil)
}

/// `abs(n)`：绝对值，仅接受数字
fn builtin_abs(args: &[Value], _out: &mut dyn Write) -> Result<Value, RuntimeError> {
    expect_arity("abs", args, 1)?;
    let n = expect_number("abs", &args[0])?;
    Ok(Value::Number(n.abs()))
}

/// `min(...)`：数字最小值，至少 1 个参数
fn builtin_min(args: &[Value], _out: &mut dyn Write) -> Result<Value, RuntimeError> {
    fold_numbers("min", args, f64::min)
}

/// `max(...)`：数字最大值，至少 1 个参数
fn builtin_max(args: &[Value], _out: &mut dyn Write) -> Result<Value, RuntimeError> {
    fold_numbers("max", args, f64::max)
}

fn fold_numbers(
    name: &str,
    args: &[Value],
    combine: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    if args.is_empty() {
        return Err(RuntimeError::ArityMismatch {
            name: name.to_string(),
            expected: "至少 1".to_string(),
            actual: 0,
        });
    }

    let mut result = expect_number(name, &args[0])?;
    for arg in &args[1..] {
        result = combine(result, expect_number(name, arg)?);
    }
    Ok(Value::Number(result))
}

/// `len(s)`：文本长度（按字符计）
fn builtin_len(args: &[Value], _out: &mut dyn Write) -> Result<Value, RuntimeError> {
    expect_arity("len", args, 1)?;
    let s = expect_text("len", &args[0])?;
    Ok(Value::Number(s.chars().count() as f64))
}

/// `upper(s)`：转大写
fn builtin_upper(args: &[Value], _out: &mut dyn Write) -> Result<Value, RuntimeError> {
    expect_arity("upper", args, 1)?;
    let s = expect_text("upper", &args[0])?;
    Ok(Value::text(s.to_uppercase()))
}

/// `lower(s)`：转小写
fn builtin_lower(args: &[Value], _out: &mut dyn Write) -> Result<Value, RuntimeError> {
    expect_arity("lower", args, 1)?;
    let s = expect_text("lower", &args[0])?;
    Ok(Value::text(s.to_lowercase()))
}

/// `range(stop)` / `range(start, stop)` / `range(start, stop, step)`
///
/// 产出半开整数区间的惰性值；端点向零截断，step 不能为 0。
fn builtin_range(args: &[Value], _out: &mut dyn Write) -> Result<Value, RuntimeError> {
    let (start, stop, step) = match args.len() {
        1 => (0, expect_number("range", &args[0])? as i64, 1),
        2 => (
            expect_number("range", &args[0])? as i64,
            expect_number("range", &args[1])? as i64,
            1,
        ),
        3 => (
            expect_number("range", &args[0])? as i64,
            expect_number("range", &args[1])? as i64,
            expect_number("range", &args[2])? as i64,
        ),
        n => {
            return Err(RuntimeError::ArityMismatch {
                name: "range".to_string(),
                expected: "1 到 3".to_string(),
                actual: n,
            });
        }
    };

    if step == 0 {
        return Err(RuntimeError::type_mismatch(
            "非零整数",
            "0",
            "range 的 step",
        ));
    }

    Ok(Value::Range { start, stop, step })
}

/// 方法调用分发
///
/// 数组方法原地修改接收者（`push` / `pop` / `insert` / `remove`），
/// 文本方法是纯函数。接收者类型没有对应方法时是未知调用错误。
pub fn call_method(
    receiver: &Value,
    method: &str,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    match receiver {
        Value::Array(cell) => array_method(cell, method, args),
        Value::Text(s) => text_method(s, method, args),
        other => Err(RuntimeError::UnknownCallable {
            name: format!("{}.{}", other.type_name(), method),
        }),
    }
}

fn array_method(
    cell: &crate::value::ArrayRef,
    method: &str,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    match method {
        "push" => {
            expect_arity("push", args, 1)?;
            cell.borrow_mut().push(args[0].clone());
            Ok(Value::Nil)
        }
        "pop" => {
            expect_arity("pop", args, 0)?;
            let len = cell.borrow().len();
            cell.borrow_mut()
                .pop()
                .ok_or(RuntimeError::IndexOutOfRange { index: -1, len })
        }
        "insert" => {
            expect_arity("insert", args, 2)?;
            let index = expect_number("insert", &args[0])? as i64;
            let mut elements = cell.borrow_mut();
            // 允许插在末尾（index == len）
            if index < 0 || index as usize > elements.len() {
                return Err(RuntimeError::IndexOutOfRange {
                    index,
                    len: elements.len(),
                });
            }
            elements.insert(index as usize, args[1].clone());
            Ok(Value::Nil)
        }
        "remove" => {
            expect_arity("remove", args, 1)?;
            let index = expect_number("remove", &args[0])? as i64;
            let mut elements = cell.borrow_mut();
            if index < 0 || index as usize >= elements.len() {
                return Err(RuntimeError::IndexOutOfRange {
                    index,
                    len: elements.len(),
                });
            }
            Ok(elements.remove(index as usize))
        }
        "length" => {
            expect_arity("length", args, 0)?;
            Ok(Value::Number(cell.borrow().len() as f64))
        }
        _ => Err(RuntimeError::UnknownCallable {
            name: format!("Array.{}", method),
        }),
    }
}

fn text_method(s: &str, method: &str, args: &[Value]) -> Result<Value, RuntimeError> {
    match method {
        "length" => {
            expect_arity("length", args, 0)?;
            Ok(Value::Number(s.chars().count() as f64))
        }
        "charAt" => {
            expect_arity("charAt", args, 1)?;
            let index = expect_number("charAt", &args[0])? as i64;
            let len = s.chars().count();
            if index < 0 || index as usize >= len {
                return Err(RuntimeError::IndexOutOfRange { index, len });
            }
            let ch = s
                .chars()
                .nth(index as usize)
                .ok_or(RuntimeError::IndexOutOfRange { index, len })?;
            Ok(Value::text(ch.to_string()))
        }
        "upper" => {
            expect_arity("upper", args, 0)?;
            Ok(Value::text(s.to_uppercase()))
        }
        "lower" => {
            expect_arity("lower", args, 0)?;
            Ok(Value::text(s.to_lowercase()))
        }
        _ => Err(RuntimeError::UnknownCallable {
            name: format!("Text.{}", method),
        }),
    }
}
