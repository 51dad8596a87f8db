use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Pipeline stage of a tracked job.
///
/// Canonical wire form is SCREAMING_SNAKE_CASE. The title-case spellings used by
/// older dashboard builds (`"Applied"`, `"Offer Negotiations"`) are accepted on
/// input and never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStatus {
    #[serde(alias = "Saved")]
    Saved,
    #[serde(alias = "Applied")]
    Applied,
    #[serde(alias = "Interviewing")]
    Interviewing,
    #[serde(alias = "Offer Negotiations", alias = "Offer")]
    OfferNegotiations,
    #[serde(alias = "Rejected")]
    Rejected,
    #[serde(alias = "Withdrawn")]
    Withdrawn,
    #[serde(alias = "Accepted")]
    Accepted,
    #[serde(alias = "Expired")]
    Expired,
}

impl PipelineStatus {
    pub const ALL: [PipelineStatus; 8] = [
        PipelineStatus::Saved,
        PipelineStatus::Applied,
        PipelineStatus::Interviewing,
        PipelineStatus::OfferNegotiations,
        PipelineStatus::Rejected,
        PipelineStatus::Withdrawn,
        PipelineStatus::Accepted,
        PipelineStatus::Expired,
    ];

    pub const ACTIVE: [PipelineStatus; 4] = [
        PipelineStatus::Saved,
        PipelineStatus::Applied,
        PipelineStatus::Interviewing,
        PipelineStatus::OfferNegotiations,
    ];

    pub const TERMINAL: [PipelineStatus; 4] = [
        PipelineStatus::Rejected,
        PipelineStatus::Withdrawn,
        PipelineStatus::Accepted,
        PipelineStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStatus::Saved => "SAVED",
            PipelineStatus::Applied => "APPLIED",
            PipelineStatus::Interviewing => "INTERVIEWING",
            PipelineStatus::OfferNegotiations => "OFFER_NEGOTIATIONS",
            PipelineStatus::Rejected => "REJECTED",
            PipelineStatus::Withdrawn => "WITHDRAWN",
            PipelineStatus::Accepted => "ACCEPTED",
            PipelineStatus::Expired => "EXPIRED",
        }
    }

    /// Display-only classification; the server attaches no meaning to it.
    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        Self::TERMINAL.contains(self)
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineStatus {
    type Err = String;

    /// Accepts `APPLIED`, `applied`, `Offer Negotiations`, `offer-negotiations`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        if normalized == "OFFER" {
            return Ok(PipelineStatus::OfferNegotiations);
        }
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("unknown pipeline status '{s}'"))
    }
}

/// Status of the job posting itself, as reported by the backend's scraper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostingStatus {
    #[serde(alias = "Active")]
    Active,
    #[serde(alias = "Expired")]
    Expired,
    #[serde(alias = "Closed")]
    Closed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl PostingStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, PostingStatus::Active)
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, PostingStatus::Expired | PostingStatus::Closed)
    }
}

fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}
