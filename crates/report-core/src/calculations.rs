use crate::models::Cell;

/// Percentage change from `old` to `new`.
///
/// A zero baseline never divides: no activity on either side is `0.0`, and
/// new activity from nothing saturates at `100.0`.
///
/// # Examples
///
/// ```
/// use report_core::calculations::percent_change;
///
/// assert_eq!(percent_change(0.0, 0.0), 0.0);
/// assert_eq!(percent_change(0.0, 5.0), 100.0);
/// assert_eq!(percent_change(10.0, 15.0), 50.0);
/// ```
pub fn percent_change(old: f64, new: f64) -> f64 {
    if old == 0.0 {
        if new == 0.0 {
            return 0.0;
        }
        return 100.0;
    }
    (new - old) / old * 100.0
}

/// `part / whole * 100` as a report cell.
///
/// A zero `whole` yields [`Cell::Undefined`] instead of a division.
pub fn percent_of(part: f64, whole: f64) -> Cell {
    if whole == 0.0 {
        return Cell::Undefined;
    }
    Cell::Number(part / whole * 100.0)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
