//! Byte counts to percent conversion.

/// Percent value of a finished download.
pub const COMPLETE_PERCENT: u8 = 100;

/// Convert a `(written, expected)` pair reported by a transfer into a
/// whole percent.
///
/// Returns `floor(100 * written / expected)`, capped at 100. An unknown or
/// zero `expected` yields 0: the size is only known once the transfer
/// finishes.
#[must_use]
pub fn percent_of(written: u64, expected: Option<u64>) -> u8 {
    match expected {
        Some(total) if total > 0 => {
            let percent = (u128::from(written) * 100) / u128::from(total);
            u8::try_from(percent.min(u128::from(COMPLETE_PERCENT))).unwrap_or(COMPLETE_PERCENT)
        }
        _ => 0,
    }
}
