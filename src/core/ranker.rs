use crate::domain::model::{AggregatedStudentScore, EntityId, MeritRow};
use crate::utils::error::{RankingError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Secondary ordering among students with equal grand totals.
///
/// `SortOrder` leaves equal totals in whatever order the sort produces, which
/// is the order the students first appeared in the entry data. Positions are
/// never shared either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    #[default]
    SortOrder,
    StudentId,
    Name,
}

impl TieBreak {
    pub const VALUES: [&'static str; 3] = ["sort_order", "student_id", "name"];
}

impl FromStr for TieBreak {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sort_order" => Ok(TieBreak::SortOrder),
            "student_id" => Ok(TieBreak::StudentId),
            "name" => Ok(TieBreak::Name),
            other => Err(RankingError::InvalidConfigValueError {
                field: "ranking.tie_break".to_string(),
                value: other.to_string(),
                reason: format!("Allowed values: {}", Self::VALUES.join(", ")),
            }),
        }
    }
}

/// How positions are turned into "1st", "2nd", ...
///
/// `Simplified` only special-cases 1, 2 and 3; everything else is "Nth",
/// so 21 is "21th".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrdinalStyle {
    #[default]
    Simplified,
    English,
}

impl OrdinalStyle {
    pub const VALUES: [&'static str; 2] = ["simplified", "english"];
}

impl FromStr for OrdinalStyle {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simplified" => Ok(OrdinalStyle::Simplified),
            "english" => Ok(OrdinalStyle::English),
            other => Err(RankingError::InvalidConfigValueError {
                field: "ranking.ordinal_style".to_string(),
                value: other.to_string(),
                reason: format!("Allowed values: {}", Self::VALUES.join(", ")),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingPolicy {
    pub tie_break: TieBreak,
    pub ordinal_style: OrdinalStyle,
}

pub fn ordinal_suffix(position: usize, style: OrdinalStyle) -> String {
    let suffix = match style {
        OrdinalStyle::Simplified => match position {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
        OrdinalStyle::English => match (position % 10, position % 100) {
            (_, 11..=13) => "th",
            (1, _) => "st",
            (2, _) => "nd",
            (3, _) => "rd",
            _ => "th",
        },
    };
    format!("{}{}", position, suffix)
}

fn compare_ids(a: &EntityId, b: &EntityId) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

fn tie_order(a: &AggregatedStudentScore, b: &AggregatedStudentScore, tie: TieBreak) -> Ordering {
    match tie {
        TieBreak::SortOrder => Ordering::Equal,
        TieBreak::StudentId => compare_ids(&a.student_id, &b.student_id),
        TieBreak::Name => a
            .name
            .cmp(&b.name)
            .then_with(|| compare_ids(&a.student_id, &b.student_id)),
    }
}

/// Sorts by grand total, highest first, and numbers the rows 1..=N.
pub fn rank(mut scores: Vec<AggregatedStudentScore>, policy: RankingPolicy) -> Vec<MeritRow> {
    scores.sort_by(|a, b| {
        b.grand_total
            .total_cmp(&a.grand_total)
            .then_with(|| tie_order(a, b, policy.tie_break))
    });

    scores
        .into_iter()
        .enumerate()
        .map(|(index, score)| {
            let position = index + 1;
            MeritRow {
                score,
                position,
                position_suffix: ordinal_suffix(position, policy.ordinal_style),
            }
        })
        .collect()
}
