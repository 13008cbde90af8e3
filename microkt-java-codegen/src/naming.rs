//! 入力ファイルのパスから出力ファイルのパスとクラス名を決める。

use std::path::{Path, PathBuf};

/// 出力ファイルの拡張子
pub const OUTPUT_EXTENSION: &str = "java";

/// 入力パスの拡張子を`.java`に差し替えたパスを返す
pub fn output_path(input: &Path) -> PathBuf {
    input.with_extension(OUTPUT_EXTENSION)
}

/// 出力パスからディレクトリ部分と拡張子を取り除いたものをクラス名とする
pub fn class_name(output: &Path) -> String {
    output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "Main".to_string())
}
