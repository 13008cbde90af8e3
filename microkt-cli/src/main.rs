// microkt-cli/src/main.rs

use anyhow::Context;
use clap::Parser;
use microkt_core::error::LangError;
use microkt_java_codegen::naming::{class_name, output_path};
use microkt_java_codegen::transpile_source;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

/// コマンドライン引数を定義するための構造体
#[derive(Parser, Debug)]
#[command(version, about = "Translate a MicroKotlin program into Java source", long_about = None)]
struct Cli {
    /// 入力ファイル (.kt)
    input: PathBuf,
    /// 出力ファイル。省略時は入力の拡張子を .java に差し替える
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// ファイルに書き出さず標準出力に表示する
    #[arg(long)]
    stdout: bool,
    /// ログの詳細度 (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// 診断があったかどうか
enum Outcome {
    Clean,
    Diagnostics,
}

fn run(cli: &Cli) -> anyhow::Result<Outcome> {
    // --- 1. 入力コードの読み込み ---
    let bytes = fs::read(&cli.input)
        .with_context(|| format!("failed to read '{}'", cli.input.display()))?;
    let source = String::from_utf8_lossy(&bytes);

    // --- 2. 出力先とクラス名の決定 ---
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| output_path(&cli.input));
    let class = class_name(&output);
    info!(input = %cli.input.display(), output = %output.display(), %class, "transpiling");

    // --- 3. 変換 ---
    let generated = match transpile_source(&source, &class) {
        Ok(generated) => generated,
        Err(LangError::Parse(err)) => {
            for diagnostic in &err.diagnostics {
                eprintln!("{}", diagnostic);
            }
            return Ok(Outcome::Diagnostics);
        }
        Err(LangError::Compile(err)) => {
            // 生成の致命的エラーでは出力ファイルを作らない
            for diagnostic in err.diagnostics() {
                eprintln!("{}", diagnostic);
            }
            return Ok(Outcome::Diagnostics);
        }
    };
    for diagnostic in &generated.diagnostics {
        eprintln!("{}", diagnostic);
    }

    // --- 4. Javaファイルの書き出し ---
    if cli.stdout {
        print!("{}", generated.code);
    } else {
        fs::write(&output, &generated.code)
            .with_context(|| format!("failed to write '{}'", output.display()))?;
        info!(output = %output.display(), "wrote java source");
    }

    Ok(if generated.has_errors() {
        Outcome::Diagnostics
    } else {
        Outcome::Clean
    })
}

fn main() -> ExitCode {
    // コマンドライン引数をパース
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(Outcome::Clean) => ExitCode::SUCCESS,
        Ok(Outcome::Diagnostics) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(2)
        }
    }
}
