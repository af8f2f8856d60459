//! Render-ready labels derived from a [`Profile`].
//!
//! Number and date formats follow the `id-ID` locale the page was built
//! for: `.` groups thousands and months use Indonesian abbreviations.

use chrono::{DateTime, Datelike, Utc};

use super::entity::profile::{DEFAULT_TOKENS, Profile};

const SHORT_UID_LEN: usize = 8;
const ID_MONTHS: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des"];

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub display_name: String,
    pub avatar_url: String,
    pub uid: String,
    pub tokens_label: String,
    pub token_percentage: f64,
    pub quota_label: String,
    pub plan_label: String,
    pub is_premium: bool,
    pub joined_label: String,
    pub provider_label: String,
}

impl From<&Profile> for ProfileView {
    fn from(profile: &Profile) -> Self {
        let token_percentage = token_percentage(profile.tokens);

        Self {
            display_name: profile.display_name().to_string(),
            avatar_url: profile.resolved_avatar_url(),
            uid: short_uid(&profile.id.to_string()),
            tokens_label: format_tokens(profile.tokens),
            token_percentage,
            quota_label: format!("{}% of {}", rounded_percentage(profile.tokens), format_tokens(DEFAULT_TOKENS)),
            plan_label: label_or(&profile.subscription_plan, "Free"),
            is_premium: profile.is_premium(),
            joined_label: format_join_date(&profile.created_at),
            provider_label: label_or(&profile.provider, "Email"),
        }
    }
}

/// Compact balance label: `1.0M`, `2.5K`, or a grouped integer below 1,000.
/// The decimal is rounded half up, so `1_250` reads `1.3K`.
pub fn format_tokens(tokens: i64) -> String {
    if tokens >= 1_000_000 {
        return one_decimal(tokens, 1_000_000, 'M');
    }
    if tokens >= 1_000 {
        return one_decimal(tokens, 1_000, 'K');
    }
    group_thousands(tokens)
}

fn one_decimal(value: i64, unit: i64, suffix: char) -> String {
    let tenths = div_round_half_up(value as i128 * 10, unit as i128);
    format!("{}.{}{}", tenths / 10, tenths % 10, suffix)
}

/// `numerator / denominator` rounded half up; both must be non-negative.
fn div_round_half_up(numerator: i128, denominator: i128) -> i128 {
    (numerator * 2 + denominator) / (denominator * 2)
}

/// Integer with `.` as the thousands separator.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

/// Share of the starting balance still available, clamped to `0..=100`.
pub fn token_percentage(tokens: i64) -> f64 {
    (tokens as f64 / DEFAULT_TOKENS as f64 * 100.0).clamp(0.0, 100.0)
}

/// Whole-number share used in the quota label, rounded half up.
pub fn rounded_percentage(tokens: i64) -> i64 {
    let clamped = tokens.clamp(0, DEFAULT_TOKENS);
    div_round_half_up(clamped as i128 * 100, DEFAULT_TOKENS as i128) as i64
}

pub fn short_uid(id: &str) -> String {
    id.chars().take(SHORT_UID_LEN).collect::<String>().to_uppercase()
}

/// `5 Jan 2025` style date.
pub fn format_join_date(created_at: &DateTime<Utc>) -> String {
    format!("{} {} {}", created_at.day(), ID_MONTHS[created_at.month0() as usize], created_at.year())
}

/// Capitalises each word, falling back to `default` for blank input.
fn label_or(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        return default.to_string();
    }

    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
