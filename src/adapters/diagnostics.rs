use crate::domain::ports::DiagnosticSink;
use crate::utils::error::{ComicError, ErrorCategory};
use std::sync::Mutex;

/// Writes caught failures to the `tracing` error channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, error: &ComicError) {
        tracing::error!(
            "❌ Comic load failed: {} (Category: {:?})",
            error,
            error.category()
        );
        tracing::error!("💡 Recovery suggestion: {}", error.recovery_suggestion());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEntry {
    pub category: ErrorCategory,
    pub message: String,
}

/// Keeps every recorded failure in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<DiagnosticEntry>>,
}

impl RecordingSink {
    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl DiagnosticSink for RecordingSink {
    fn record(&self, error: &ComicError) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(DiagnosticEntry {
                category: error.category(),
                message: error.to_string(),
            });
    }
}
