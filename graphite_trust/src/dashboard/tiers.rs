//! Trust, compliance and KYC tiers derived from a wallet's trust score

use num_bigint::BigInt;
use serde::Serialize;
use std::fmt;

use crate::api::TrustScore;

/// Colour family a card uses for a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Caution,
    Negative,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Positive => "green",
            Tone::Caution => "yellow",
            Tone::Negative => "red",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrustTier {
    Low,
    Medium,
    High,
}

impl TrustTier {
    pub fn from_reputation(reputation: &BigInt) -> Self {
        if *reputation >= BigInt::from(200) {
            TrustTier::High
        } else if *reputation >= BigInt::from(100) {
            TrustTier::Medium
        } else {
            TrustTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrustTier::Low => "Low Trust",
            TrustTier::Medium => "Medium Trust",
            TrustTier::High => "High Trust",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            TrustTier::Low => Tone::Negative,
            TrustTier::Medium => Tone::Caution,
            TrustTier::High => Tone::Positive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComplianceTier {
    Low,
    Medium,
    High,
}

impl ComplianceTier {
    pub fn from_filter_level(level: u64) -> Self {
        if level >= 3 {
            ComplianceTier::High
        } else if level >= 1 {
            ComplianceTier::Medium
        } else {
            ComplianceTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ComplianceTier::Low => "Low Compliance",
            ComplianceTier::Medium => "Medium Compliance",
            ComplianceTier::High => "High Compliance",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            ComplianceTier::Low => Tone::Negative,
            ComplianceTier::Medium => Tone::Caution,
            ComplianceTier::High => Tone::Positive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KycTier {
    Unverified,
    Basic,
    Verified,
}

impl KycTier {
    pub fn from_kyc_level(level: u64) -> Self {
        match level {
            0 => KycTier::Unverified,
            1 => KycTier::Basic,
            _ => KycTier::Verified,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KycTier::Unverified => "Unverified",
            KycTier::Basic => "Basic",
            KycTier::Verified => "Verified",
        }
    }
}

macro_rules! display_label {
    ($($tier:ty),*) => {
        $(impl fmt::Display for $tier {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_label!(TrustTier, ComplianceTier, KycTier);

/// Numeric level carried as a decimal string; anything unreadable counts
/// as zero.
fn level(value: &str) -> u64 {
    value.trim().parse().unwrap_or(0)
}

/// Reputation is an unbounded decimal, possibly with a fraction. The
/// fraction never moves a value across a tier boundary, so only the whole
/// part is kept.
fn reputation_whole(value: &str) -> Option<BigInt> {
    let value = value.trim();
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match whole {
        "" | "+" | "-" if !fraction.is_empty() => Some(BigInt::default()),
        _ => whole.parse().ok(),
    }
}

/// Everything the trust and compliance cards show for one wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustAssessment {
    /// Reputation as received, or `"0"` when it is not a number
    pub reputation: String,
    pub trust: TrustTier,
    pub filter_level: u64,
    pub compliance: ComplianceTier,
    pub kyc_level: u64,
    pub kyc: KycTier,
    pub activated: bool,
}

impl TrustAssessment {
    pub fn assess(score: &TrustScore) -> Self {
        let (reputation, whole) = match reputation_whole(&score.reputation) {
            Some(whole) => (score.reputation.trim().to_string(), whole),
            None => ("0".to_string(), BigInt::default()),
        };
        let filter_level = level(&score.filter_level);
        let kyc_level = level(&score.kyc_level);

        Self {
            trust: TrustTier::from_reputation(&whole),
            reputation,
            filter_level,
            compliance: ComplianceTier::from_filter_level(filter_level),
            kyc_level,
            kyc: KycTier::from_kyc_level(kyc_level),
            activated: score.activated,
        }
    }
}
