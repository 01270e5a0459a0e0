//! Net total and read-time reconciliation against stored totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tolerance for comparing a stored total with a recomputed one (0.01).
pub const DEFAULT_RECONCILIATION_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// `subtotal − regular − senior`, floored at zero.
pub fn net_total(subtotal: Decimal, regular_discount: Decimal, senior_discount: Decimal) -> Decimal {
    subtotal
        .checked_sub(regular_discount)
        .and_then(|v| v.checked_sub(senior_discount))
        .unwrap_or(Decimal::ZERO)
        .max(Decimal::ZERO)
}

/// Where a displayed total came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TotalSource {
    /// Stored value agreed with the recomputed one
    Stored,
    /// Recomputed value (no stored value, or the stored value drifted)
    Recomputed,
}

/// Total to display after reconciling with a stored value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconciledTotal {
    /// Amount to display
    pub amount: Decimal,
    /// Which value was used
    pub source: TotalSource,
    /// `|stored − recomputed|`, zero when nothing was stored
    pub drift: Decimal,
}

impl ReconciledTotal {
    pub fn has_drift(&self) -> bool {
        self.source == TotalSource::Recomputed && self.drift > Decimal::ZERO
    }
}

/// Pick the total to display for a persisted record.
///
/// The recomputed value is authoritative whenever the stored one differs
/// by more than `epsilon`. This never touches the stored record.
pub fn reconcile_display_total(
    stored: Option<Decimal>,
    recomputed: Decimal,
    epsilon: Decimal,
) -> ReconciledTotal {
    let Some(stored) = stored else {
        return ReconciledTotal {
            amount: recomputed,
            source: TotalSource::Recomputed,
            drift: Decimal::ZERO,
        };
    };

    let drift = (stored - recomputed).abs();
    if drift > epsilon {
        warn!(
            stored = %stored,
            recomputed = %recomputed,
            drift = %drift,
            "stored total disagrees with recomputed total, displaying recomputed value"
        );
        ReconciledTotal {
            amount: recomputed,
            source: TotalSource::Recomputed,
            drift,
        }
    } else {
        ReconciledTotal {
            amount: stored,
            source: TotalSource::Stored,
            drift,
        }
    }
}
