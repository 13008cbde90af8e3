use microkt_core::error::LangError;
use microkt_core::parse_source;
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
        #[allow(dead_code)]
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
                source,
                metadata,
            }
        })
        .collect()
}

#[test]
fn passing_samples_parse_without_diagnostics() {
    let samples = load_samples("passing");
    assert!(!samples.is_empty(), "no passing samples found");
    for sample in samples {
        assert!(
            matches!(sample.metadata, SampleMetadata::Ok { .. }),
            "sample {} is marked as error metadata but located in passing directory",
            sample.name
        );
        if let Err(err) = parse_source(&sample.source) {
            panic!("expected Ok for {}, got Err:\n{}", sample.name, err);
        }
    }
}

#[test]
fn failing_samples_report_front_end_errors() {
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

        let result = parse_source(&sample.source);
        if error.variant != ErrorVariant::Parse {
            // 意味エラーと生成エラーはフロントエンドを通過する
            assert!(
                result.is_ok(),
                "front-end should accept {}: {:?}",
                sample.name,
                result.err()
            );
            continue;
        }

        let err = match result {
            Err(LangError::Parse(err)) => err,
            other => panic!("expected parse error for {}, got {:?}", sample.name, other),
        };
        let message = err.to_string();
        assert!(
            message.contains(&error.message_contains),
            "error message for {} did not contain {:?}:\n{}",
            sample.name,
            error.message_contains,
            message
        );
        if let Some(count) = diagnostic_count {
            assert_eq!(
                err.diagnostics.len(),
                count,
                "diagnostic count mismatch for {}:\n{}",
                sample.name,
                message
            );
        }
    }
}
