//! Strategy corpus loading

use std::path::Path;

use walkdir::WalkDir;

use crate::domain::matching::StrategyCorpus;

const DEFAULT_EXTENSION: &str = ".md";

/// Recursively load strategy files from a directory into a corpus.
///
/// Files are matched by extension (case-insensitive); the strategy name
/// is the file stem with underscores replaced by spaces and each word
/// title-cased. A missing directory, an unwalkable tree, or zero matching
/// files all yield a corpus holding only the built-in default strategy,
/// so callers always have something to match against. Unreadable files
/// are skipped.
pub fn load_strategy_corpus(root: impl AsRef<Path>, extension: &str) -> StrategyCorpus {
    let root = root.as_ref();
    let extension = normalize_extension(extension);

    if !root.is_dir() {
        tracing::warn!(root = %root.display(), "Strategy directory missing, using default strategy");
        return StrategyCorpus::with_default();
    }

    let mut corpus = StrategyCorpus::new();

    for entry in WalkDir::new(root).into_iter().filter_map(|entry| entry.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if !file_name.to_lowercase().ends_with(&extension) {
            continue;
        }

        let content = match std::fs::read_to_string(entry.path()) {
            Ok(content) => content,
            Err(error) => {
                tracing::warn!(path = %entry.path().display(), %error, "Skipping unreadable strategy file");
                continue;
            }
        };

        let name = strategy_name(entry.path());
        corpus.insert(name, entry.path().display().to_string(), content);
    }

    if corpus.is_empty() {
        tracing::warn!(root = %root.display(), "No strategy files found, using default strategy");
        return StrategyCorpus::with_default();
    }

    tracing::info!(root = %root.display(), count = corpus.len(), "Loaded strategy corpus");
    corpus
}

/// Lowercase the extension and ensure it carries a leading dot; empty
/// input falls back to `.md`.
fn normalize_extension(extension: &str) -> String {
    let extension = extension.trim();
    if extension.is_empty() {
        return DEFAULT_EXTENSION.to_string();
    }

    let lowered = extension.to_lowercase();
    if lowered.starts_with('.') {
        lowered
    } else {
        format!(".{}", lowered)
    }
}

/// Derive a strategy name from a file path: stem, underscores to spaces,
/// words title-cased.
fn strategy_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    stem.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
