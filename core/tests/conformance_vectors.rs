// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Golden test vectors shared by every Agent-Token implementation.
//!
//! Vectors live in `spec/test-vectors/v0/{valid,invalid,policy}` at the
//! repository root. Policy vectors are evaluated at a fixed `now` so they never
//! turn into time bombs.

use std::fs;
use std::path::{Path, PathBuf};

use agent_tokens_core::{
    decode_envelope, evaluate, extract_intent, AgentTokenError, Envelope, PackageRegistry,
    PolicyDecision, RequestContext,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ValidVector {
    id: String,
    token: String,
    expect: Envelope,
}

#[derive(Debug, Deserialize)]
struct InvalidVector {
    id: String,
    token: String,
    error: String,
}

#[derive(Debug, Deserialize)]
struct PolicyVector {
    id: String,
    token: String,
    context: RequestContext,
    expect_result: PolicyDecision,
    expect_error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    format: u32,
    suite: String,
    package: Option<String>,
    vectors: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    id: String,
    file: String,
    expect_result: PolicyDecision,
}

fn vectors_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../spec/test-vectors/v0")
}

fn vector_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", dir.display(), e))
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "json")
                && path.file_name().is_some_and(|name| name != "manifest.json")
        })
        .collect();
    files.sort();
    files
}

fn load_json<T: DeserializeOwned>(path: &Path) -> T {
    let raw = fs::read_to_string(path).unwrap();
    serde_json::from_str(&raw)
        .unwrap_or_else(|e| panic!("Failed to parse JSON test vector {}: {}", path.display(), e))
}

fn load_vectors<T: DeserializeOwned>(set: &str) -> Vec<T> {
    vector_files(&vectors_root().join(set))
        .iter()
        .map(|path| load_json(path))
        .collect()
}

fn decode_all(token: &str) -> Result<Envelope, AgentTokenError> {
    let envelope = decode_envelope(token)?;
    PackageRegistry::with_defaults().validate(&envelope)?;
    Ok(envelope)
}

fn policy_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

#[test]
fn test_has_valid_and_invalid_vectors() {
    assert!(!load_vectors::<ValidVector>("valid").is_empty());
    assert!(!load_vectors::<InvalidVector>("invalid").is_empty());
}

#[test]
fn test_valid_vectors_decode() {
    for v in load_vectors::<ValidVector>("valid") {
        let decoded = decode_all(&v.token)
            .unwrap_or_else(|e| panic!("valid vector {} failed: {}", v.id, e));
        assert_eq!(decoded, v.expect, "valid vector {}", v.id);
    }
}

#[test]
fn test_valid_vectors_reencode_to_equal_envelopes() {
    for v in load_vectors::<ValidVector>("valid") {
        let decoded = decode_envelope(&v.token).unwrap();
        let reencoded = decode_envelope(&decoded.encode()).unwrap();
        assert_eq!(reencoded, decoded, "valid vector {}", v.id);
    }
}

#[test]
fn test_invalid_vectors_are_rejected_with_code() {
    for v in load_vectors::<InvalidVector>("invalid") {
        match decode_all(&v.token) {
            Ok(_) => panic!("invalid vector {} decoded successfully", v.id),
            Err(e) => assert_eq!(e.code().as_str(), v.error, "invalid vector {}: {}", v.id, e),
        }
    }
}

#[test]
fn test_has_policy_vectors() {
    assert!(!load_vectors::<PolicyVector>("policy").is_empty());
}

#[test]
fn test_policy_vectors_evaluate() {
    for v in load_vectors::<PolicyVector>("policy") {
        let envelope = decode_envelope(&v.token).unwrap();
        let intent = extract_intent(&envelope)
            .unwrap()
            .unwrap_or_else(|| panic!("policy vector {} requires at.intent.v1", v.id));

        let out = evaluate(&v.context, &intent, policy_now());
        assert_eq!(out.decision, v.expect_result, "policy vector {}", v.id);
        assert_eq!(
            out.error.map(|code| code.as_str().to_string()),
            v.expect_error,
            "policy vector {}",
            v.id
        );
    }
}

#[test]
fn test_policy_manifest_lists_every_vector() {
    let dir = vectors_root().join("policy");
    let manifest: Manifest = load_json(&dir.join("manifest.json"));

    assert_eq!(manifest.format, 1);
    assert!(!manifest.suite.is_empty());
    assert_eq!(manifest.package.as_deref(), Some("at.intent.v1"));

    let actual: Vec<String> = vector_files(&dir)
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    let mut listed: Vec<String> = manifest.vectors.iter().map(|v| v.file.clone()).collect();
    listed.sort();
    assert_eq!(listed, actual);

    for entry in &manifest.vectors {
        let vector: PolicyVector = load_json(&dir.join(&entry.file));
        assert_eq!(vector.id, entry.id, "manifest entry {}", entry.file);
        assert_eq!(vector.expect_result, entry.expect_result, "manifest entry {}", entry.file);
    }
}
