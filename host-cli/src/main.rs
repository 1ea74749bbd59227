//! # mica - 命令行宿主
//!
//! 读取脚本文件，交给 `mica-runtime` 执行。
//!
//! ## 用法
//!
//! - `mica <script.mica>`: 执行脚本
//! - `mica --help`: 显示帮助

use std::path::Path;
use std::process::ExitCode;

use mica_runtime::Interpreter;

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("mica error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);

    let path = match args.next() {
        Some(arg) if arg == "-h" || arg == "--help" => {
            print_help();
            return Ok(());
        }
        Some(arg) => arg,
        None => {
            print_help();
            anyhow::bail!("缺少脚本路径");
        }
    };

    if let Some(extra) = args.next() {
        anyhow::bail!("多余的参数: {extra}");
    }

    let path = Path::new(&path);
    if path.extension().is_none_or(|ext| ext != "mica") {
        eprintln!("[WARN] {}: 扩展名不是 .mica", path.display());
    }

    let source = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("无法读取 {}: {}", path.display(), e))?;

    // 遇到第一个错误即中止，错误已带阶段前缀（词法/语法/求值）
    let mut interpreter = Interpreter::new();
    if let Err(e) = interpreter.run_source(&source) {
        anyhow::bail!("{}: {}", path.display(), e);
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"mica - Mica 脚本解释器

USAGE:
  mica <script.mica>

OPTIONS:
  -h, --help    显示本帮助

脚本由 mica-runtime 解释执行，print 输出写到标准输出，
错误写到标准错误并以非零状态码退出。
"#
    );
}
