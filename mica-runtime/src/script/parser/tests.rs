//! Parser 单元测试：源码到 AST 形状的检查

use super::*;
use crate::error::MicaError;

/// 解析单条语句，返回顶层块里唯一的节点
fn parse_one(source: &str) -> AstNode {
    let program = parse(source).expect("解析失败");
    let statements = program.as_block().expect("顶层应是语句块");
    assert_eq!(statements.len(), 1, "预期单条语句: {:?}", statements);
    statements[0].clone()
}

fn parse_err(source: &str) -> ParseError {
    match parse(source) {
        Err(MicaError::Parse(e)) => e,
        Err(other) => panic!("预期语法错误，实际: {}", other),
        Ok(node) => panic!("预期失败，实际解析成功: {:?}", node),
    }
}

#[test]
fn test_empty_program() {
    let program = parse("").unwrap();
    assert_eq!(program, AstNode::block(vec![]));

    // 只有分隔符的程序同样是空块
    let program = parse("\n\n;;\n,").unwrap();
    assert_eq!(program, AstNode::block(vec![]));
}

#[test]
fn test_literals() {
    assert_eq!(parse_one("42"), AstNode::number(42.0));
    assert_eq!(parse_one("3.14"), AstNode::number(3.14));
    assert_eq!(parse_one(r#""hi""#), AstNode::string("hi"));
    assert_eq!(parse_one("true"), AstNode::boolean(true));
    assert_eq!(parse_one("false"), AstNode::boolean(false));
}

#[test]
fn test_operator_precedence() {
    // 1 + 2 * 3 解析为 1 + (2 * 3)
    assert_eq!(
        parse_one("1 + 2 * 3"),
        AstNode::binary(
            AstNode::number(1.0),
            BinOp::Add,
            AstNode::binary(AstNode::number(2.0), BinOp::Mul, AstNode::number(3.0)),
        )
    );

    // 括号覆盖优先级
    assert_eq!(
        parse_one("(1 + 2) * 3"),
        AstNode::binary(
            AstNode::binary(AstNode::number(1.0), BinOp::Add, AstNode::number(2.0)),
            BinOp::Mul,
            AstNode::number(3.0),
        )
    );
}

#[test]
fn test_left_associativity() {
    // 10 - 3 - 2 解析为 (10 - 3) - 2
    assert_eq!(
        parse_one("10 - 3 - 2"),
        AstNode::binary(
            AstNode::binary(AstNode::number(10.0), BinOp::Sub, AstNode::number(3.0)),
            BinOp::Sub,
            AstNode::number(2.0),
        )
    );
}

#[test]
fn test_comparison_binds_loosest_and_chains_left() {
    // a + 1 < b * 2 解析为 (a + 1) < (b * 2)
    assert_eq!(
        parse_one("a + 1 < b * 2"),
        AstNode::binary(
            AstNode::binary(AstNode::variable("a"), BinOp::Add, AstNode::number(1.0)),
            BinOp::Lt,
            AstNode::binary(AstNode::variable("b"), BinOp::Mul, AstNode::number(2.0)),
        )
    );

    // 比较链左结合：1 < 2 < 3 解析为 (1 < 2) < 3
    assert_eq!(
        parse_one("1 < 2 < 3"),
        AstNode::binary(
            AstNode::binary(AstNode::number(1.0), BinOp::Lt, AstNode::number(2.0)),
            BinOp::Lt,
            AstNode::number(3.0),
        )
    );
}

#[test]
fn test_unary_is_right_recursive() {
    // --5 是双重取负
    assert_eq!(
        parse_one("--5"),
        AstNode::unary(UnaryOp::Minus, AstNode::unary(UnaryOp::Minus, AstNode::number(5.0)))
    );
    assert_eq!(
        parse_one("-x + 1"),
        AstNode::binary(
            AstNode::unary(UnaryOp::Minus, AstNode::variable("x")),
            BinOp::Add,
            AstNode::number(1.0),
        )
    );
}

#[test]
fn test_assignment() {
    assert_eq!(
        parse_one("x = 1 + 2"),
        AstNode::assignment(
            "x",
            AstNode::binary(AstNode::number(1.0), BinOp::Add, AstNode::number(2.0))
        )
    );
}

#[test]
fn test_index_assignment() {
    let node = parse_one("arr[0] = 5");
    assert_eq!(
        node,
        AstNode::IndexAssignment {
            base: Box::new(AstNode::variable("arr")),
            index: Box::new(AstNode::number(0.0)),
            value: Box::new(AstNode::number(5.0)),
        }
    );
}

#[test]
fn test_invalid_assignment_target() {
    assert!(matches!(
        parse_err("1 + 2 = 3"),
        ParseError::UnexpectedToken { .. }
    ));
    // 标识符开头但左侧不是可赋值形状
    assert!(matches!(
        parse_err("f(1) = 3"),
        ParseError::InvalidAssignmentTarget
    ));
}

#[test]
fn test_array_literal_with_newlines() {
    let node = parse_one("[1,\n 2,\n 3]");
    assert_eq!(
        node,
        AstNode::Array {
            elements: vec![
                AstNode::number(1.0),
                AstNode::number(2.0),
                AstNode::number(3.0)
            ]
        }
    );

    assert_eq!(parse_one("[]"), AstNode::Array { elements: vec![] });
}

#[test]
fn test_function_call_and_arguments() {
    assert_eq!(
        parse_one("print(\"x\", 1 + 2)"),
        AstNode::FunctionCall {
            name: "print".to_string(),
            args: vec![
                AstNode::string("x"),
                AstNode::binary(AstNode::number(1.0), BinOp::Add, AstNode::number(2.0)),
            ],
        }
    );
    assert_eq!(
        parse_one("f()"),
        AstNode::FunctionCall {
            name: "f".to_string(),
            args: vec![],
        }
    );
}

#[test]
fn test_postfix_chain() {
    // 索引后接方法调用的链
    let node = parse_one("arr[0].upper()");
    assert_eq!(
        node,
        AstNode::MethodCall {
            receiver: Box::new(AstNode::Index {
                base: Box::new(AstNode::variable("arr")),
                index: Box::new(AstNode::number(0.0)),
            }),
            method: "upper".to_string(),
            args: vec![],
        }
    );
}

#[test]
fn test_bare_dot_access_is_zero_arg_method_call() {
    assert_eq!(
        parse_one("s.length"),
        AstNode::MethodCall {
            receiver: Box::new(AstNode::variable("s")),
            method: "length".to_string(),
            args: vec![],
        }
    );
}

#[test]
fn test_method_call_with_arguments() {
    assert_eq!(
        parse_one("arr.insert(0, x)"),
        AstNode::MethodCall {
            receiver: Box::new(AstNode::variable("arr")),
            method: "insert".to_string(),
            args: vec![AstNode::number(0.0), AstNode::variable("x")],
        }
    );
}

#[test]
fn test_if_else_if_else() {
    let node = parse_one(
        r#"if (a) {
    x = 1
} else if (b) {
    x = 2
} else if (c) {
    x = 3
} else {
    x = 4
}"#,
    );

    let AstNode::If {
        condition,
        elif_clauses,
        else_block,
        ..
    } = node
    else {
        panic!("预期 If 节点");
    };
    assert_eq!(*condition, AstNode::variable("a"));
    assert_eq!(elif_clauses.len(), 2);
    assert_eq!(elif_clauses[0].0, AstNode::variable("b"));
    assert_eq!(elif_clauses[1].0, AstNode::variable("c"));
    assert!(else_block.is_some());
}

#[test]
fn test_if_without_else() {
    let node = parse_one("if (x > 0) { y = 1 }");
    let AstNode::If {
        elif_clauses,
        else_block,
        ..
    } = node
    else {
        panic!("预期 If 节点");
    };
    assert!(elif_clauses.is_empty());
    assert!(else_block.is_none());
}

#[test]
fn test_while_loop() {
    let node = parse_one("while (i < 10) { i = i + 1 }");
    let AstNode::While { condition, body } = node else {
        panic!("预期 While 节点");
    };
    assert_eq!(
        *condition,
        AstNode::binary(AstNode::variable("i"), BinOp::Lt, AstNode::number(10.0))
    );
    assert_eq!(body.as_block().map(|s| s.len()), Some(1));
}

#[test]
fn test_for_loop() {
    let node = parse_one("for (i in range(10)) { print(i) }");
    let AstNode::For {
        variable, iterable, ..
    } = node
    else {
        panic!("预期 For 节点");
    };
    assert_eq!(variable, "i");
    assert!(matches!(*iterable, AstNode::FunctionCall { ref name, .. } if name == "range"));
}

#[test]
fn test_function_definition() {
    let node = parse_one("function add(a, b) {\n    return a + b\n}");
    let AstNode::FunctionDef { name, params, body } = node else {
        panic!("预期 FunctionDef 节点");
    };
    assert_eq!(name, "add");
    assert_eq!(params, vec!["a".to_string(), "b".to_string()]);

    let statements = body.as_block().unwrap();
    assert!(matches!(statements[0], AstNode::Return { value: Some(_) }));
}

#[test]
fn test_malformed_function_signature() {
    assert!(matches!(
        parse_err("function (a) { return a }"),
        ParseError::MalformedFunctionSignature { .. }
    ));
    assert!(matches!(
        parse_err("function f(1) { return 1 }"),
        ParseError::MalformedFunctionSignature { .. }
    ));
}

#[test]
fn test_return_without_value() {
    let node = parse_one("function f() {\n    return\n}");
    let AstNode::FunctionDef { body, .. } = node else {
        panic!("预期 FunctionDef 节点");
    };
    assert_eq!(
        body.as_block().unwrap()[0],
        AstNode::Return { value: None }
    );
}

#[test]
fn test_break_and_continue() {
    let node = parse_one("while (true) {\n    break\n    continue\n}");
    let AstNode::While { body, .. } = node else {
        panic!("预期 While 节点");
    };
    assert_eq!(
        body.as_block().unwrap(),
        &[AstNode::Break, AstNode::Continue]
    );
}

#[test]
fn test_statement_separators_mix() {
    // 换行 / 逗号 / 分号的任意组合都能分隔语句
    let program = parse("a = 1; b = 2, c = 3\nd = 4").unwrap();
    assert_eq!(program.as_block().map(|s| s.len()), Some(4));
}

#[test]
fn test_unclosed_block_is_error() {
    assert!(matches!(
        parse_err("if (x) {"),
        ParseError::UnexpectedToken { .. }
    ));
    assert!(matches!(
        parse_err("(1 + 2"),
        ParseError::UnexpectedToken { .. }
    ));
}

#[test]
fn test_consumes_entire_input() {
    // 表达式后残留的闭括号不会被静默吞掉
    assert!(parse("1 + 2)").is_err());
}
