//! Runs the built tools end to end. Each test gets its own working directory so
//! the default `searchkit.yaml` lookup never sees a developer's file.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const MODEL: &str = "4 3\n\
rust 1.0 0.0 0.0\n\
ownership 0.0 1.0 0.0\n\
borrow 0.0 0.9 0.1\n\
crab 0.5 0.5 0.5\n";

fn workdir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("vectors.vec"), MODEL).unwrap();
    dir
}

fn run(bin: &str, dir: &Path, args: &[&str]) -> Output {
    Command::new(bin)
        .args(args)
        .current_dir(dir)
        .env_remove("SEARCHKIT_CONFIG")
        .env("SEARCHKIT_WORDVEC_TEXT_PATH", dir.join("vectors.vec"))
        .env("SEARCHKIT_WORDVEC_BINARY_PATH", dir.join("model.bin"))
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn error_code(output: &Output) -> String {
    stdout_json(output)["error"]["code"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

#[test]
fn embed_prints_vectors_in_order_and_writes_cache() {
    let dir = workdir();
    let out = run(env!("CARGO_BIN_EXE_embed"), dir.path(), &["ownership", "rust", "ownership"]);

    assert!(out.status.success());
    let vectors = stdout_json(&out);
    assert_eq!(
        vectors,
        serde_json::json!([[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
    );
    assert!(dir.path().join("model.bin").is_file());

    // Second run reads the binary cache even with the text model gone.
    fs::remove_file(dir.path().join("vectors.vec")).unwrap();
    let again = run(env!("CARGO_BIN_EXE_embed"), dir.path(), &["ownership", "rust", "ownership"]);
    assert!(again.status.success());
    assert_eq!(stdout_json(&again), vectors);
}

#[test]
fn embed_unknown_term_fails_whole_batch() {
    let dir = workdir();
    let out = run(env!("CARGO_BIN_EXE_embed"), dir.path(), &["rust", "zyzzyva"]);

    assert_eq!(out.status.code(), Some(1));
    assert_eq!(error_code(&out), "TERM_NOT_FOUND");
    assert_eq!(stdout_json(&out)["error"]["reserved"], 2);
}

#[test]
fn embed_without_model_is_model_unavailable() {
    let dir = TempDir::new().unwrap();
    let out = run(env!("CARGO_BIN_EXE_embed"), dir.path(), &["rust"]);

    assert_eq!(out.status.code(), Some(1));
    assert_eq!(error_code(&out), "MODEL_UNAVAILABLE");
}

#[test]
fn missing_arguments_print_usage_string() {
    let dir = workdir();
    let out = run(env!("CARGO_BIN_EXE_embed"), dir.path(), &[]);

    assert_eq!(out.status.code(), Some(1));
    let usage = stdout_json(&out);
    assert!(usage.as_str().unwrap().contains("embed"));
}

#[test]
fn cluster_partitions_input() {
    let dir = workdir();
    let input = "[[0,0],[0,0.1],[10,10],[10,10.1],[0.1,0]]";
    let out = run(env!("CARGO_BIN_EXE_cluster"), dir.path(), &["-k", "2", input]);

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stdout));
    let clusters = stdout_json(&out);
    let clusters = clusters.as_array().unwrap();
    assert_eq!(clusters.len(), 2);

    let total: usize = clusters
        .iter()
        .map(|pair| {
            let pair = pair.as_array().unwrap();
            assert_eq!(pair.len(), 2);
            assert_eq!(pair[0].as_array().unwrap().len(), 2);
            pair[1].as_array().unwrap().len()
        })
        .sum();
    assert_eq!(total, 5);
}

#[test]
fn cluster_is_deterministic() {
    let dir = workdir();
    let input = "[[1,2],[2,1],[8,9],[9,8],[5,5],[0,1]]";
    let a = run(env!("CARGO_BIN_EXE_cluster"), dir.path(), &["--seed", "11", input]);
    let b = run(env!("CARGO_BIN_EXE_cluster"), dir.path(), &["--seed", "11", input]);
    assert!(a.status.success());
    assert_eq!(a.stdout, b.stdout);
}

#[test]
fn cluster_more_clusters_than_points() {
    let dir = workdir();
    let out = run(env!("CARGO_BIN_EXE_cluster"), dir.path(), &["-k", "5", "[[1,2],[3,4]]"]);

    assert_eq!(out.status.code(), Some(1));
    assert_eq!(error_code(&out), "NO_LABELS_FOUND");
}

#[test]
fn cluster_rejects_malformed_json() {
    let dir = workdir();
    for input in ["not json", "[[1,2],[3],[4,5],[6,7]]"] {
        let out = run(env!("CARGO_BIN_EXE_cluster"), dir.path(), &[input]);
        assert_eq!(out.status.code(), Some(1), "{input}");
        assert_eq!(error_code(&out), "INVALID_INPUT", "{input}");
    }
}

#[test]
fn sentence_embed_fast_mode_prints_one_vector() {
    let dir = workdir();
    fs::write(
        dir.path().join("searchkit.yaml"),
        "semantic:\n  mode: fast\n  stub_dim: 16\n",
    )
    .unwrap();
    let out = run(env!("CARGO_BIN_EXE_sentence-embed"), dir.path(), &["rust", "ownership"]);

    assert!(out.status.success());
    let value = stdout_json(&out);
    let outer = value.as_array().unwrap();
    assert_eq!(outer.len(), 1);
    assert_eq!(outer[0].as_array().unwrap().len(), 16);
}

#[test]
fn sentence_embed_without_model_is_model_unavailable() {
    let dir = workdir();
    let out = Command::new(env!("CARGO_BIN_EXE_sentence-embed"))
        .args(["rust"])
        .current_dir(dir.path())
        .env_remove("SEARCHKIT_CONFIG")
        .env("SEARCHKIT_SENTENCE_MODEL_PATH", dir.path().join("missing.onnx"))
        .env("SEARCHKIT_SENTENCE_TOKENIZER_PATH", dir.path().join("missing.json"))
        .env("RUST_LOG", "off")
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    assert_eq!(error_code(&out), "MODEL_UNAVAILABLE");
}
