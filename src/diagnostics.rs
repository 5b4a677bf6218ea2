// ABOUTME: Diagnostics accumulator for non-fatal warnings while seeding resources.
// ABOUTME: Collects problems that should not fail a workflow but should be reported.

/// Collects non-fatal warnings during resource creation.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// An account lists a token symbol that no initial token defines.
    pub fn unknown_token(symbol: &str) -> Self {
        Self {
            kind: WarningKind::UnknownToken,
            message: format!("Token with symbol {symbol} is not defined, skipping association"),
        }
    }

    /// A single ledger operation failed and was skipped.
    pub fn skipped(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Skipped,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    UnknownToken,
    Skipped,
}
