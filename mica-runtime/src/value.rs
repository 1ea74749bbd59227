//! # Value 模块
//!
//! 定义脚本的运行时值模型。
//!
//! ## 设计说明
//!
//! - 值是封闭枚举：数字 / 文本 / 布尔 / 数组 / 区间 / Nil
//! - 数组按引用共享（`Rc<RefCell<…>>`），索引赋值和数组方法原地修改，
//!   所有持有同一数组的变量都能观察到变化
//! - 区间是惰性值：只保存端点和步长，迭代时才产出数字
//! - 相等比较是结构化的，跨类型相等恒为 false（`5 == "5"` 是 false 而非错误）

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// 数组的共享存储
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// 脚本运行时值
#[derive(Debug, Clone)]
pub enum Value {
    /// 数字（64 位浮点）
    Number(f64),
    /// 文本
    Text(String),
    /// 布尔值
    Bool(bool),
    /// 数组（有序、可变、按引用共享）
    Array(ArrayRef),
    /// 半开整数区间，由内置函数 `range` 产生
    Range { start: i64, stop: i64, step: i64 },
    /// 空值（如未执行循环体的循环、无显式 return 的函数调用）
    Nil,
}

impl Value {
    /// 从元素列表创建数组值
    pub fn array(elements: Vec<Value>) -> Self {
        Self::Array(Rc::new(RefCell::new(elements)))
    }

    /// 创建文本值
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// 值的类型名（用于错误信息）
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "Number",
            Self::Text(_) => "Text",
            Self::Bool(_) => "Bool",
            Self::Array(_) => "Array",
            Self::Range { .. } => "Range",
            Self::Nil => "Nil",
        }
    }

    /// 条件语境下的真值判定
    ///
    /// 布尔直接使用；数字非零为真；文本非空为真；Nil 为假；
    /// 其余值（数组、区间）一律为真。
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::Text(s) => !s.is_empty(),
            Self::Nil => false,
            _ => true,
        }
    }
}

impl PartialEq for Value {
    /// 结构化相等；跨类型比较恒为 false，不报错
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (
                Self::Range { start, stop, step },
                Self::Range {
                    start: s2,
                    stop: e2,
                    step: p2,
                },
            ) => start == s2 && stop == e2 && step == p2,
            (Self::Nil, Self::Nil) => true,
            _ => false,
        }
    }
}

/// 数字的脚本级文本形式
///
/// 整数值不带小数部分（`print(10 / 5)` 输出 `2` 而非 `2.0`）。
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Self::Range { start, stop, step } => {
                write!(f, "range({}, {}, {})", start, stop, step)
            }
            Self::Nil => f.write_str("nil"),
        }
    }
}
