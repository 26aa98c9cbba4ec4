//! Human-readable size text for attachment rows.

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Formats a byte count the way the attachment table displays it
/// (1024 -> "1 KB", rounded to the nearest whole unit).
pub fn format_size(bytes: u64) -> String {
    if bytes >= GB {
        format!("{} GB", div_round(bytes, GB))
    } else if bytes >= MB {
        format!("{} MB", div_round(bytes, MB))
    } else if bytes >= KB {
        format!("{} KB", div_round(bytes, KB))
    } else {
        format!("{} b", bytes)
    }
}

fn div_round(numerator: u64, denominator: u64) -> u64 {
    (numerator + denominator / 2) / denominator
}
