//! Discovery of candidate documents below the configured roots.

use std::collections::HashSet;
use std::path::Path;

use glob::{glob_with, MatchOptions, Pattern};
use tracing::{debug, warn};

use crate::models::record::SourceDocument;

/// File name suffix of candidate documents. Matched case-sensitively.
pub const PDF_SUFFIX: &str = ".pdf";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

fn has_pdf_suffix(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(PDF_SUFFIX))
}

/// Collect `.pdf` files from files and directories (recursively).
///
/// Roots are visited in the given order, directory contents in `glob` order.
/// A path reachable from several roots is returned once.
pub fn discover<P: AsRef<Path>>(roots: &[P]) -> Vec<SourceDocument> {
    let mut seen = HashSet::new();
    let mut documents = Vec::new();

    for root in roots {
        let root = root.as_ref();

        if root.is_file() {
            if has_pdf_suffix(root) {
                if seen.insert(root.to_path_buf()) {
                    documents.push(SourceDocument::new(root));
                }
            } else {
                debug!("Skipping {}: not a {} file", root.display(), PDF_SUFFIX);
            }
            continue;
        }

        if !root.is_dir() {
            warn!("Source {} does not exist, skipping", root.display());
            continue;
        }

        let Some(root_str) = root.to_str() else {
            warn!("Source {} is not valid UTF-8, skipping", root.display());
            continue;
        };
        let pattern = format!("{}/**/*{}", Pattern::escape(root_str), PDF_SUFFIX);

        let entries = match glob_with(&pattern, MATCH_OPTIONS) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Invalid source pattern {}: {}", pattern, e);
                continue;
            }
        };

        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => {
                    if seen.insert(path.clone()) {
                        documents.push(SourceDocument::new(path));
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("Cannot read {}: {}", e.path().display(), e.error()),
            }
        }
    }

    debug!("Discovered {} documents", documents.len());
    documents
}
