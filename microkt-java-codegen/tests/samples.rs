use microkt_core::error::{DiagnosticKind, LangError};
use microkt_core::parse_source;
use microkt_java_codegen::naming::{class_name, output_path};
use microkt_java_codegen::{transpile_source, JavaGenerator};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct ErrorMetadata {
    variant: ErrorVariant,
    message_contains: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum ErrorVariant {
    Parse,
    Compile,
    Semantic,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "expect", rename_all = "lowercase")]
enum SampleMetadata {
    Ok {
        #[serde(default)]
        java_contains: Vec<String>,
    },
    Error {
        error: ErrorMetadata,
        #[serde(default)]
        diagnostic_count: Option<usize>,
    },
}

struct SampleCase {
    name: String,
    class: String,
    source: String,
    metadata: SampleMetadata,
}

fn samples_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("tests")
        .join("samples")
}

fn load_samples(subdir: &str) -> Vec<SampleCase> {
    let dir = samples_root().join(subdir);

    let mut entries: Vec<_> = fs::read_dir(&dir)
        .unwrap_or_else(|err| panic!("failed to read {:?}: {}", dir, err))
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if path.extension().map_or(false, |ext| ext == "kt") {
                Some(path)
            } else {
                None
            }
        })
        .collect();
    entries.sort();

    entries
        .into_iter()
        .map(|path| {
            let source = fs::read_to_string(&path)
                .unwrap_or_else(|err| panic!("failed to read {:?}: {}", path, err));
            let metadata_path = path.with_extension("kt.meta.json");
            let metadata_str = fs::read_to_string(&metadata_path)
                .unwrap_or_else(|err| panic!("failed to read {:?}: {}", metadata_path, err));
            let metadata: SampleMetadata = serde_json::from_str(&metadata_str)
                .unwrap_or_else(|err| {
                    panic!("failed to parse metadata JSON {:?}: {}", metadata_path, err)
                });
            SampleCase {
                name: path
                    .file_name()
                    .map(|os| os.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
                class: class_name(&output_path(&path)),
                source,
                metadata,
            }
        })
        .collect()
}

#[test]
fn passing_samples_generate_expected_java() {
    for sample in load_samples("passing") {
        let java_contains = match &sample.metadata {
            SampleMetadata::Ok { java_contains } => java_contains,
            SampleMetadata::Error { .. } => panic!(
                "sample {} is marked as error metadata but located in passing directory",
                sample.name
            ),
        };

        let generated = transpile_source(&sample.source, &sample.class)
            .unwrap_or_else(|err| panic!("expected Ok for {}, got Err:\n{}", sample.name, err));
        assert!(
            !generated.has_errors(),
            "unexpected diagnostics for {}: {:?}",
            sample.name,
            generated.diagnostics
        );

        assert!(generated.code.starts_with("import java.util.Scanner;\n\n"));
        assert!(generated
            .code
            .contains(&format!("public class {} {{", sample.class)));
        assert!(generated.code.ends_with("  }\n\n}\n"));
        for expected in java_contains {
            assert!(
                generated.code.contains(expected.as_str()),
                "output of {} did not contain {:?}:\n{}",
                sample.name,
                expected,
                generated.code
            );
        }
    }
}

#[test]
fn failing_samples_report_expected_errors() {
    for sample in load_samples("failing") {
        let (error, diagnostic_count) = match sample.metadata {
            SampleMetadata::Error {
                error,
                diagnostic_count,
            } => (error, diagnostic_count),
            SampleMetadata::Ok { .. } => panic!(
                "sample {} is marked as ok metadata but located in failing directory",
                sample.name
            ),
        };

        let result = transpile_source(&sample.source, &sample.class);
        let (messages, count) = match (result, error.variant) {
            (Err(LangError::Parse(err)), ErrorVariant::Parse) => {
                (err.to_string(), err.diagnostics.len())
            }
            (Err(LangError::Compile(err)), ErrorVariant::Compile) => {
                (err.to_string(), err.diagnostics().len())
            }
            (Ok(generated), ErrorVariant::Semantic) => {
                assert!(generated
                    .diagnostics
                    .iter()
                    .all(|d| d.kind == DiagnosticKind::Semantic));
                let messages = generated
                    .diagnostics
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join("\n");
                (messages, generated.diagnostics.len())
            }
            (actual, expected) => panic!(
                "error variant mismatch for {}: expected {:?}, got {:?}",
                sample.name, expected, actual
            ),
        };

        assert!(
            messages.contains(&error.message_contains),
            "errors for {} did not contain {:?}:\n{}",
            sample.name,
            error.message_contains,
            messages
        );
        if let Some(expected) = diagnostic_count {
            assert_eq!(count, expected, "diagnostic count mismatch for {}", sample.name);
        }
    }
}

#[test]
fn generation_is_deterministic() {
    for sample in load_samples("passing") {
        let parsed = parse_source(&sample.source)
            .unwrap_or_else(|err| panic!("expected Ok for {}, got Err:\n{}", sample.name, err));
        let mut generator = JavaGenerator::new(sample.class.clone());
        let first = generator.generate(&parsed.program).unwrap();
        let second = generator.generate(&parsed.program).unwrap();
        let fresh = JavaGenerator::new(sample.class.clone())
            .generate(&parsed.program)
            .unwrap();
        assert_eq!(first.code, second.code, "{} differs on reuse", sample.name);
        assert_eq!(first.code, fresh.code, "{} differs across generators", sample.name);
    }
}

#[test]
fn circle_area_matches_full_output() {
    let source = "val PI: Double = 3.14;\nfun main() { var r: Int = 5; printLn(PI * r * r); }";
    let generated = transpile_source(source, "CircleArea").unwrap();
    let expected = "\
import java.util.Scanner;

public class CircleArea {
  private static final double PI = 3.14;

  public static void main(String[] args) {
    Scanner scanner = new Scanner(System.in);
    int r = 5;
    System.out.println(PI * r * r);
    scanner.close();
  }

}
";
    assert_eq!(generated.code, expected);
}

#[test]
fn single_constant_print_emits_folded_literal() {
    let generated = transpile_source("val N: Double = 4.0; fun main() { print(N); }", "One").unwrap();
    assert!(generated
        .code
        .contains("  private static final double N = 4;"));
    assert!(generated.code.contains("    System.out.print(N);"));
}
