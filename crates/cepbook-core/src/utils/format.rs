use chrono::{DateTime, Utc};

/// Number of digits in a complete CEP
pub const CEP_DIGITS: usize = 8;

/// Digits shown before the hyphen in the canonical CEP form
const CEP_PREFIX_DIGITS: usize = 5;

/// Strip everything that is not an ASCII digit.
/// This is the key used for lookups and the lookup cache.
pub fn normalize_cep(cep: &str) -> String {
    cep.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Reformat free-text CEP input as the user types.
/// Up to five digits are shown raw, anything longer becomes NNNNN-NNN
/// and digits past the eighth are dropped.
pub fn format_cep(cep: &str) -> String {
    let digits = normalize_cep(cep);

    if digits.len() <= CEP_PREFIX_DIGITS {
        digits
    } else {
        let end = digits.len().min(CEP_DIGITS);
        format!("{}-{}", &digits[..CEP_PREFIX_DIGITS], &digits[CEP_PREFIX_DIGITS..end])
    }
}

/// True when the input holds exactly one full CEP worth of digits
pub fn is_complete_cep(cep: &str) -> bool {
    normalize_cep(cep).len() == CEP_DIGITS
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Human-readable age of a timestamp ("just now", "5m ago", "2h ago", "3d ago")
pub fn age_display(at: DateTime<Utc>) -> String {
    let minutes = (Utc::now() - at).num_minutes();
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}
