//! Referential integrity validation.
//!
//! Scans raw text for embedded reference addresses and reports every one
//! that is malformed or does not resolve. Batch mode sweeps a whole content
//! root. The sweep follows each edge once; it does not expand chains of
//! references and does not detect cycles.

use crate::reference::ReferenceDescriptor;
use crate::resolver::{ContentResolver, ResolveError};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Why an embedded reference was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticReason {
    Syntax,
    CatalogNotFound,
    MalformedCatalog,
    CategoryNotFound,
    ItemNotFound,
    PropertyNotFound,
}

impl From<&ResolveError> for DiagnosticReason {
    fn from(error: &ResolveError) -> Self {
        match error {
            ResolveError::Syntax(_) => DiagnosticReason::Syntax,
            ResolveError::CatalogNotFound { .. } => DiagnosticReason::CatalogNotFound,
            ResolveError::MalformedCatalog { .. } => DiagnosticReason::MalformedCatalog,
            ResolveError::CategoryNotFound(_) => DiagnosticReason::CategoryNotFound,
            ResolveError::ItemNotFound(_) => DiagnosticReason::ItemNotFound,
            ResolveError::PropertyNotFound(_) => DiagnosticReason::PropertyNotFound,
        }
    }
}

/// One broken reference, with enough context for a content author to fix it.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// File (relative to the root in batch mode) the reference appears in.
    pub source_file: String,
    /// Best-effort 1-based line number: newlines counted before the match.
    pub line: usize,
    /// The reference text as written.
    pub reference_text: String,
    pub reason: DiagnosticReason,
    /// Human-readable failure description.
    pub detail: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} ({})",
            self.source_file, self.line, self.detail, self.reference_text
        )
    }
}

/// Characters that may appear inside a reference address.
fn is_reference_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '/' | ':' | '.' | '*' | '?')
}

/// Find reference candidates in arbitrary text: each `@` starts a run of
/// address characters, terminated by whitespace, quotes, or punctuation
/// outside the address alphabet. Trailing sentence punctuation is trimmed,
/// and a run is only a candidate if it looks like an address (contains `/`
/// or `:`), so bare mentions and e-mail local parts stay out of the sweep.
pub fn scan_references(text: &str) -> Vec<(usize, &str)> {
    let mut found = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c != '@' {
            continue;
        }
        let mut end = start + c.len_utf8();
        while let Some(&(i, next)) = chars.peek() {
            if !is_reference_char(next) {
                break;
            }
            end = i + next.len_utf8();
            chars.next();
        }
        let candidate = text[start..end].trim_end_matches(['.', ':', ',']);
        if candidate.len() > 1 && (candidate.contains('/') || candidate.contains(':')) {
            found.push((start, candidate));
        }
    }
    found
}

impl ContentResolver {
    /// Validate every reference embedded in one document. Failures on
    /// optional references are logged but not reported; the `?` marker is
    /// exactly the author's opt-out.
    pub fn validate_text(&self, source_file: &str, text: &str) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for (offset, raw) in scan_references(text) {
            let line = 1 + text[..offset].matches('\n').count();
            let Some(descriptor) = ReferenceDescriptor::parse(raw) else {
                diagnostics.push(Diagnostic {
                    source_file: source_file.to_string(),
                    line,
                    reference_text: raw.to_string(),
                    reason: DiagnosticReason::Syntax,
                    detail: "invalid reference syntax".to_string(),
                });
                continue;
            };
            // Resolution is attempted for optional references too, so gaps
            // still show up in the debug log.
            if let Err(error) =
                self.resolve_descriptor(&descriptor, &mut rand::thread_rng())
            {
                if descriptor.optional {
                    debug!(reference = raw, %error, "optional reference did not resolve");
                    continue;
                }
                diagnostics.push(Diagnostic {
                    source_file: source_file.to_string(),
                    line,
                    reference_text: raw.to_string(),
                    reason: DiagnosticReason::from(&error),
                    detail: error.to_string(),
                });
            }
        }
        diagnostics
    }

    /// Sweep every JSON file under the content root.
    pub async fn validate_root(&self) -> io::Result<Vec<Diagnostic>> {
        self.validate_root_with_cancel(&AtomicBool::new(false)).await
    }

    /// Sweep with cooperative cancellation, checked between file boundaries
    /// (never mid-parse). Returns the diagnostics gathered so far when
    /// cancelled.
    pub async fn validate_root_with_cancel(
        &self,
        cancel: &AtomicBool,
    ) -> io::Result<Vec<Diagnostic>> {
        // Warm the cache once so per-reference lookups during the sweep are
        // pure in-memory reads.
        self.cache().load_all();

        let mut files = Vec::new();
        let mut stack = vec![self.root().to_path_buf()];
        while let Some(dir) = stack.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    stack.push(path);
                } else if path.extension().map(|e| e == "json").unwrap_or(false) {
                    files.push(path);
                }
            }
        }
        files.sort();

        let mut diagnostics = Vec::new();
        for file in files {
            if cancel.load(Ordering::Relaxed) {
                debug!("validation cancelled");
                break;
            }
            let text = tokio::fs::read_to_string(&file).await?;
            let label = file
                .strip_prefix(self.root())
                .map(PathBuf::from)
                .unwrap_or_else(|_| file.clone())
                .display()
                .to_string();
            diagnostics.extend(self.validate_text(&label, &text));
        }
        Ok(diagnostics)
    }
}
