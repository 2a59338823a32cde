//! Display helpers shared by the dashboard cards

use chrono::{DateTime, Utc};
use num_bigint::{BigInt, BigUint, Sign};

const WEI_DECIMALS: u32 = 18;
const SHOWN_DECIMALS: u32 = 4;
const UNAVAILABLE: &str = "n/a";

fn parse_wei(wei: &str) -> Option<BigInt> {
    wei.trim().parse().ok()
}

/// Magnitude in ETH, rounded half away from zero to four decimals.
fn ether_digits(magnitude: &BigUint) -> (BigUint, BigUint) {
    let shown = BigUint::from(10u32).pow(SHOWN_DECIMALS);
    let unit = BigUint::from(10u32).pow(WEI_DECIMALS - SHOWN_DECIMALS);

    let mut scaled = magnitude / &unit;
    let remainder = magnitude % &unit;
    if remainder * 2u32 >= unit {
        scaled += 1u32;
    }
    (&scaled / &shown, &scaled % &shown)
}

fn render(value: &BigInt) -> (bool, String) {
    let (whole, fraction) = ether_digits(value.magnitude());
    let is_zero = whole == BigUint::default() && fraction == BigUint::default();
    let text = format!(
        "{}.{:0>width$}",
        whole,
        fraction.to_string(),
        width = SHOWN_DECIMALS as usize
    );
    (value.sign() == Sign::Minus && !is_zero, text)
}

/// Wei amount as ETH with four decimals.
///
/// ```
/// use graphite_trust::dashboard::format::format_wei;
/// assert_eq!(format_wei("1000000000000000000"), "1.0000");
/// assert_eq!(format_wei("not a number"), "n/a");
/// ```
pub fn format_wei(wei: &str) -> String {
    let Some(value) = parse_wei(wei) else {
        return UNAVAILABLE.to_string();
    };
    match render(&value) {
        (true, text) => format!("-{}", text),
        (false, text) => text,
    }
}

/// Like [`format_wei`], with a leading `+` for non-negative deltas.
pub fn format_signed_wei(delta: &str) -> String {
    let Some(value) = parse_wei(delta) else {
        return UNAVAILABLE.to_string();
    };
    if value.sign() == Sign::Minus {
        return format_wei(delta);
    }
    format!("+{}", render(&value).1)
}

pub fn format_relative_time(timestamp: i64, now: DateTime<Utc>) -> String {
    let elapsed = now.timestamp().saturating_sub(timestamp).max(0);

    let (count, unit) = match elapsed {
        0..=59 => return "just now".to_string(),
        60..=3_599 => (elapsed / 60, "minute"),
        3_600..=86_399 => (elapsed / 3_600, "hour"),
        _ => (elapsed / 86_400, "day"),
    };
    let plural = if count == 1 { "" } else { "s" };
    format!("{} {}{} ago", count, unit, plural)
}

/// Unix seconds as `YYYY-MM-DD HH:MM:SS` UTC; the raw text if it is not a
/// timestamp.
pub fn format_timestamp(timestamp: &str) -> String {
    timestamp
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

pub fn format_percentage(percentage: &str) -> String {
    match percentage.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => format!("{:.2}%", value),
        _ => UNAVAILABLE.to_string(),
    }
}
