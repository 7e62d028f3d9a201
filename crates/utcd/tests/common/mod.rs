// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for daemon integration tests.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Write `content` to a config file inside a fresh temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the path is used.
pub(crate) fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("simple-utcd.toml");
    fs::write(&path, content).expect("failed to write config");
    (dir, path)
}
