use crate::models::Cell;

/// Rendering of the not-applicable sentinel.
pub const NOT_APPLICABLE: &str = "N/A";

/// Rendering of the undefined-percentage sentinel.
pub const UNDEFINED: &str = "NaN";

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use report_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by half an ULP at the target precision so exact midpoints round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // `frac_str` starts with "0." (or "1." if rounding carried).
        let decimal_digits = &frac_str[1..];
        format!("{}{}", grouped, decimal_digits)
    };

    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Render a report cell as display text.
///
/// Numbers use [`format_number`]; sentinels use their fixed spellings and
/// blanks render as the empty string.
///
/// # Examples
///
/// ```
/// use report_core::formatting::format_cell;
/// use report_core::models::Cell;
///
/// assert_eq!(format_cell(&Cell::Number(12345.678), 2), "12,345.68");
/// assert_eq!(format_cell(&Cell::NotApplicable, 2), "N/A");
/// assert_eq!(format_cell(&Cell::Undefined, 2), "NaN");
/// assert_eq!(format_cell(&Cell::Blank, 2), "");
/// ```
pub fn format_cell(cell: &Cell, decimals: u32) -> String {
    match cell {
        Cell::Number(v) => format_number(*v, decimals),
        Cell::NotApplicable => NOT_APPLICABLE.to_string(),
        Cell::Undefined => UNDEFINED.to_string(),
        Cell::Blank => String::new(),
        Cell::Label(s) => s.clone(),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
