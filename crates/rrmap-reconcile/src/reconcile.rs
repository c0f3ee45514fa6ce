//! # Number Reconciliation
//!
//! Finds the token in a raw log that a rounded table value came from.
//!
//! 1. The displayed value is parsed into a [`DisplayedNumber`]; its printed
//!    decimals fix the comparison precision `p`.
//! 2. Every numeric token of the log is a candidate.
//! 3. A candidate matches iff it rounds to the same value as the target at
//!    `p` decimals (round half away from zero, exact on the digits).
//! 4. Among matches the one closest to the unrounded target wins; on equal
//!    distance the earliest token wins.
//!
//! Reconciliation is a pure function of `(displayed, raw)`. It never
//! fails: a decoration-only cell or a log without a matching token yields
//! [`Reconciliation::NoMatch`] with the reason.

use serde::{Deserialize, Serialize};

use crate::number::{DecimalText, DisplayedNumber, ParenthesesPolicy};
use crate::scan::TokenScanner;

/// Span of the log token that produced a displayed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMatch {
    /// Token text as it appears in the log.
    pub text: String,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

/// Why no token was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoMatchReason {
    /// The displayed value holds no number.
    NotANumber,
    /// The log holds no numeric tokens.
    NoNumericTokens,
    /// Tokens exist, but none rounds to the displayed value.
    NoRoundedMatch,
}

/// Outcome of a reconciliation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Reconciliation {
    /// The best-matching token.
    Match(TokenMatch),
    /// Nothing matched.
    NoMatch {
        /// Reason no token was selected.
        reason: NoMatchReason,
    },
}

impl Reconciliation {
    fn no_match(reason: NoMatchReason) -> Self {
        Self::NoMatch { reason }
    }

    /// The matched span, if any.
    pub fn as_match(&self) -> Option<&TokenMatch> {
        match self {
            Self::Match(m) => Some(m),
            Self::NoMatch { .. } => None,
        }
    }

    /// True if a token was selected.
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match(_))
    }
}

/// Options controlling how displayed values are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOptions {
    /// Reading of values enclosed in parentheses.
    #[serde(default)]
    pub parentheses: ParenthesesPolicy,
}

/// Reconcile with default options.
pub fn reconcile(displayed: &str, raw: &str) -> Reconciliation {
    reconcile_with(displayed, raw, ReconcileOptions::default())
}

/// Reconcile a displayed value against raw text.
pub fn reconcile_with(displayed: &str, raw: &str, options: ReconcileOptions) -> Reconciliation {
    match DisplayedNumber::parse_with(displayed, options.parentheses) {
        Ok(target) => reconcile_number(&target, raw),
        Err(err) => {
            tracing::debug!(error = %err, "displayed value is not numeric");
            Reconciliation::no_match(NoMatchReason::NotANumber)
        }
    }
}

/// Reconcile an already parsed displayed value against raw text.
pub fn reconcile_number(target: &DisplayedNumber, raw: &str) -> Reconciliation {
    let places = target.decimal_places();
    let wanted = target.rounded();
    let mut seen_any = false;
    let mut best: Option<(f64, TokenMatch)> = None;

    for token in TokenScanner::new(raw) {
        seen_any = true;
        let Some(candidate) = DecimalText::parse(token.text) else {
            continue;
        };
        if candidate.round_to(places) != *wanted {
            continue;
        }
        let distance = (candidate.to_f64() - target.value()).abs();
        let closer = match &best {
            Some((best_distance, _)) => distance < *best_distance,
            None => true,
        };
        if closer {
            best = Some((
                distance,
                TokenMatch {
                    text: token.text.to_string(),
                    start: token.start,
                    end: token.end,
                },
            ));
        }
    }

    match best {
        Some((_, m)) => Reconciliation::Match(m),
        None if seen_any => Reconciliation::no_match(NoMatchReason::NoRoundedMatch),
        None => Reconciliation::no_match(NoMatchReason::NoNumericTokens),
    }
}
