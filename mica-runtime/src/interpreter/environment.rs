//! # Environment 模块
//!
//! 变量名到运行时值的映射。
//!
//! ## 设计说明
//!
//! 整个程序共用一个映射：向未声明的名字赋值即创建，读取未声明的
//! 名字是查找失败。for 循环变量和函数参数通过「保存-恢复」实现
//! 词法遮蔽：进入作用域前保存旧绑定（或不存在的事实），退出时
//! 沿任何路径都恢复。

use std::collections::HashMap;

use crate::value::Value;

/// 运行时环境
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
}

impl Environment {
    /// 创建空环境
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入变量（创建或覆盖）
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// 读取变量
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// 保存一个名字的当前绑定（不存在时为 None），用于之后恢复
    pub fn save(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    /// 恢复一个名字的旧绑定
    ///
    /// `prior` 为 None 表示进入作用域前该名字不存在，此时将其移除。
    pub fn restore(&mut self, name: &str, prior: Option<Value>) {
        match prior {
            Some(value) => {
                self.values.insert(name.to_string(), value);
            }
            None => {
                self.values.remove(name);
            }
        }
    }

    /// 批量保存一组名字的绑定（用于函数参数遮蔽）
    pub fn save_all(&self, names: &[String]) -> Vec<Option<Value>> {
        names.iter().map(|name| self.save(name)).collect()
    }

    /// 批量恢复一组名字的绑定，与 [`save_all`](Environment::save_all) 配对
    pub fn restore_all(&mut self, names: &[String], priors: Vec<Option<Value>>) {
        for (name, prior) in names.iter().zip(priors) {
            self.restore(name, prior);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut env = Environment::new();
        assert!(env.get("x").is_none());

        env.set("x", Value::Number(1.0));
        assert_eq!(env.get("x"), Some(&Value::Number(1.0)));

        // 赋值即覆盖
        env.set("x", Value::text("hi"));
        assert_eq!(env.get("x"), Some(&Value::text("hi")));
    }

    #[test]
    fn test_save_restore_existing_binding() {
        let mut env = Environment::new();
        env.set("i", Value::Number(10.0));

        let prior = env.save("i");
        env.set("i", Value::Number(0.0));
        env.restore("i", prior);

        assert_eq!(env.get("i"), Some(&Value::Number(10.0)));
    }

    #[test]
    fn test_save_restore_absent_binding() {
        let mut env = Environment::new();

        let prior = env.save("i");
        env.set("i", Value::Number(0.0));
        env.restore("i", prior);

        // 进入前不存在，恢复后同样不存在
        assert!(env.get("i").is_none());
    }

    #[test]
    fn test_save_all_restore_all() {
        let mut env = Environment::new();
        env.set("a", Value::Number(1.0));

        let names = vec!["a".to_string(), "b".to_string()];
        let priors = env.save_all(&names);

        env.set("a", Value::Number(100.0));
        env.set("b", Value::Number(200.0));

        env.restore_all(&names, priors);
        assert_eq!(env.get("a"), Some(&Value::Number(1.0)));
        assert!(env.get("b").is_none());
    }
}
