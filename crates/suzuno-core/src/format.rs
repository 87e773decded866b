//! Formatting utilities for display values.

const SIZE_UNITS: [&str; 5] = ["", "K", "M", "G", "T"];

/// Format a byte count for display (e.g., "512.0 B", "1.2 MB").
///
/// Steps up a unit every 1000 and stops at terabytes.
pub fn format_size(size: Option<u64>) -> String {
    let Some(bytes) = size else {
        return "-".to_string();
    };

    let mut base = 1.0_f64;
    let mut unit = 0;
    while bytes as f64 >= 1000.0 * base && unit + 1 < SIZE_UNITS.len() {
        base *= 1000.0;
        unit += 1;
    }
    format!("{:.1} {}B", bytes as f64 / base, SIZE_UNITS[unit])
}
