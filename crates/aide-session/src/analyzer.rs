//! Workspace analysis: a bounded, heuristic structural summary
//!
//! Extraction is line-oriented pattern matching, not parsing. It is
//! deliberately best-effort: multi-line imports, nested declarations, and
//! macro-generated items are missed, and that is acceptable. Do not extend
//! this into a real parser.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Extensions included in the scan
const EXTENSIONS: &[&str] = &["js", "ts", "py", "java", "cpp", "go", "rs"];

/// Directory names excluded from the scan (dependency and build output dirs)
const EXCLUDED_DIRS: &[&str] = &["node_modules", "target", ".git", "dist", "__pycache__"];

/// At most this many files are scanned for structural facts. Files beyond
/// the cap still count toward `total_files`.
const SCAN_LIMIT: usize = 100;

/// Cap on each extracted identifier list
const MAX_IDENTIFIERS: usize = 200;

/// Structural summary of a workspace. One current snapshot per session,
/// replaced wholesale on re-analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceAnalysis {
    /// All files matching the extension allow-list, including unscanned ones
    pub total_files: usize,
    /// Per-language file counts for scanned files
    pub files_by_language: HashMap<String, usize>,
    /// Imported module identifiers
    pub imports: Vec<String>,
    /// Top-level function names
    pub functions: Vec<String>,
    /// Class names
    pub classes: Vec<String>,
}

impl WorkspaceAnalysis {
    /// Render the analysis as the structured text block used in context
    /// bundles
    pub fn summary(&self) -> String {
        let mut out = format!("Total files: {}", self.total_files);

        if !self.files_by_language.is_empty() {
            let mut langs: Vec<_> = self.files_by_language.iter().collect();
            langs.sort_by(|a, b| a.0.cmp(b.0));
            let listed: Vec<String> =
                langs.iter().map(|(lang, n)| format!("{}: {}", lang, n)).collect();
            out.push_str(&format!("\nLanguages: {}", listed.join(", ")));
        }

        for (label, names) in [
            ("Imports", &self.imports),
            ("Functions", &self.functions),
            ("Classes", &self.classes),
        ] {
            if !names.is_empty() {
                out.push_str(&format!("\n{}: {}", label, preview(names)));
            }
        }

        out
    }
}

/// List up to 20 names, noting how many were omitted
fn preview(names: &[String]) -> String {
    const SHOWN: usize = 20;
    if names.len() <= SHOWN {
        names.join(", ")
    } else {
        format!(
            "{} (and {} more)",
            names[..SHOWN].join(", "),
            names.len() - SHOWN
        )
    }
}

/// Line patterns compiled once per analysis run
struct Patterns {
    imports: Vec<Regex>,
    functions: Vec<Regex>,
    classes: Regex,
}

impl Patterns {
    fn new() -> Self {
        // Literal patterns; compilation cannot fail at runtime.
        let compile = |p: &str| Regex::new(p).expect("invalid builtin pattern");
        Self {
            imports: vec![
                // JS/TS: import ... from 'x', require('x')
                compile(r#"^\s*import\s+.*?from\s+['"]([^'"]+)['"]"#),
                compile(r#"require\(\s*['"]([^'"]+)['"]\s*\)"#),
                // Python: import x / from x import
                compile(r"^\s*import\s+([\w.]+)"),
                compile(r"^\s*from\s+([\w.]+)\s+import"),
                // Java: import x.y.Z;
                compile(r"^\s*import\s+(?:static\s+)?([\w.]+)\s*;"),
                // Rust: use x::y
                compile(r"^\s*use\s+([\w:]+)"),
                // C/C++: #include <x> / "x"
                compile(r#"^\s*#include\s*[<"]([^>"]+)[>"]"#),
            ],
            functions: vec![
                compile(r"\bfunction\s+(\w+)"),
                compile(r"^\s*(?:async\s+)?def\s+(\w+)"),
                compile(r"\bfunc\s+(?:\([^)]*\)\s*)?(\w+)"),
            ],
            classes: compile(r"\bclass\s+(\w+)"),
        }
    }
}

/// Analyze the workspace rooted at `root`.
///
/// Enumerates source files on the extension allow-list, skipping dependency
/// directories, and scans at most the first [`SCAN_LIMIT`] of them for
/// structural facts. Unreadable files are skipped; partial results from
/// already-processed files are retained.
pub fn analyze(root: &Path) -> std::io::Result<WorkspaceAnalysis> {
    let files = enumerate_files(root)?;
    let mut analysis = WorkspaceAnalysis {
        total_files: files.len(),
        ..Default::default()
    };

    let patterns = Patterns::new();

    for path in files.iter().take(SCAN_LIMIT) {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!("Skipping unreadable file {}: {}", path.display(), e);
                continue;
            }
        };

        let language = crate::context::language_for_path(path).to_string();
        *analysis.files_by_language.entry(language).or_insert(0) += 1;

        scan_file(&content, &patterns, &mut analysis);
    }

    tracing::debug!(
        "Analyzed {} of {} files under {}",
        files.len().min(SCAN_LIMIT),
        analysis.total_files,
        root.display()
    );

    Ok(analysis)
}

/// Enumerate matching files in a stable order
fn enumerate_files(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for ext in EXTENSIONS {
        let pattern = format!("{}/**/*.{}", root.display(), ext);
        let entries = match glob::glob(&pattern) {
            Ok(e) => e,
            Err(e) => {
                return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
            }
        };
        for entry in entries.flatten() {
            if is_excluded(&entry) {
                continue;
            }
            files.push(entry);
        }
    }

    Ok(files)
}

fn is_excluded(path: &Path) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .map(|name| EXCLUDED_DIRS.contains(&name))
            .unwrap_or(false)
    })
}

fn scan_file(content: &str, patterns: &Patterns, analysis: &mut WorkspaceAnalysis) {
    for line in content.lines() {
        for re in &patterns.imports {
            if let Some(cap) = re.captures(line) {
                push_unique(&mut analysis.imports, &cap[1]);
                break;
            }
        }
        for re in &patterns.functions {
            if let Some(cap) = re.captures(line) {
                push_unique(&mut analysis.functions, &cap[1]);
                break;
            }
        }
        if let Some(cap) = patterns.classes.captures(line) {
            push_unique(&mut analysis.classes, &cap[1]);
        }
    }
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if list.len() < MAX_IDENTIFIERS && !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_extracts_python_structure() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "app.py",
            "import os\nfrom typing import Optional\n\nclass Engine:\n    def start(self):\n        pass\n\ndef main():\n    pass\n",
        );

        let analysis = analyze(dir.path()).unwrap();
        assert_eq!(analysis.total_files, 1);
        assert_eq!(analysis.files_by_language.get("python"), Some(&1));
        assert!(analysis.imports.contains(&"os".to_string()));
        assert!(analysis.imports.contains(&"typing".to_string()));
        assert!(analysis.functions.contains(&"start".to_string()));
        assert!(analysis.functions.contains(&"main".to_string()));
        assert!(analysis.classes.contains(&"Engine".to_string()));
    }

    #[test]
    fn test_extracts_js_and_go_structure() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "index.js",
            "import express from 'express';\nconst fs = require('fs');\n\nfunction handler(req, res) {}\nclass Server {}\n",
        );
        write(
            dir.path(),
            "main.go",
            "package main\n\nfunc Run() error {\n\treturn nil\n}\n",
        );

        let analysis = analyze(dir.path()).unwrap();
        assert_eq!(analysis.total_files, 2);
        assert!(analysis.imports.contains(&"express".to_string()));
        assert!(analysis.imports.contains(&"fs".to_string()));
        assert!(analysis.functions.contains(&"handler".to_string()));
        assert!(analysis.functions.contains(&"Run".to_string()));
        assert!(analysis.classes.contains(&"Server".to_string()));
    }

    #[test]
    fn test_dependency_dirs_excluded() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/app.ts", "function real() {}\n");
        write(
            dir.path(),
            "node_modules/pkg/index.js",
            "function vendored() {}\n",
        );
        write(dir.path(), "target/debug/build.rs", "fn generated() {}\n");

        let analysis = analyze(dir.path()).unwrap();
        assert_eq!(analysis.total_files, 1);
        assert!(analysis.functions.contains(&"real".to_string()));
        assert!(!analysis.functions.contains(&"vendored".to_string()));
    }

    #[test]
    fn test_scan_cap_counts_all_files() {
        let dir = TempDir::new().unwrap();
        for i in 0..120 {
            write(
                dir.path(),
                &format!("f{:03}.js", i),
                &format!("function f{}() {{}}\n", i),
            );
        }

        let analysis = analyze(dir.path()).unwrap();
        assert_eq!(analysis.total_files, 120);
        // Only the first 100 contribute structural facts
        let scanned: usize = analysis.files_by_language.values().sum();
        assert_eq!(scanned, 100);
        assert_eq!(analysis.functions.len(), 100);
    }

    #[test]
    fn test_empty_workspace() {
        let dir = TempDir::new().unwrap();
        let analysis = analyze(dir.path()).unwrap();
        assert_eq!(analysis.total_files, 0);
        assert!(analysis.files_by_language.is_empty());
    }

    #[test]
    fn test_summary_renders_counts() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "lib.py", "def solo():\n    pass\n");
        let analysis = analyze(dir.path()).unwrap();
        let summary = analysis.summary();
        assert!(summary.contains("Total files: 1"));
        assert!(summary.contains("python: 1"));
        assert!(summary.contains("solo"));
    }
}
