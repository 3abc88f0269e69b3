use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use scout_logging::{scout_debug, scout_info, scout_warn};
use serde_json::{Map, Value};

use crate::bounty::{Bounty, UNKNOWN_TITLE};

/// Reward assumed when a listing has no reward field at all.
const DEFAULT_REWARD: &str = "$0";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Inputs shared by every record of one fetched batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeContext {
    /// Origin prefixed to links starting with `/`, without a trailing slash.
    pub site_origin: String,
    /// Substituted for missing or unparsable posting times.
    pub fetched_at: DateTime<Utc>,
}

impl NormalizeContext {
    pub fn new(site_origin: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            site_origin: site_origin.into(),
            fetched_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("field `{field}` has an unexpected type")]
    InvalidField { field: &'static str },
    #[error("record has no link")]
    MissingLink,
    #[error("link contains a line break: {link:?}")]
    InvalidLink { link: String },
    #[error("reward {reward:?} contains no digits")]
    RewardNotNumeric { reward: String },
    #[error("reward {reward:?} does not fit in an unsigned 64-bit value")]
    RewardOutOfRange { reward: String },
}

/// Converts one raw listing into a [`Bounty`].
pub fn normalize_record(raw: &Value, ctx: &NormalizeContext) -> Result<Bounty, RecordError> {
    let record = raw.as_object().ok_or(RecordError::NotAnObject)?;

    let title = title_of(record)?;
    let link = link_of(record, &ctx.site_origin)?;
    let value = value_of(record)?;
    let created_at = created_at_of(record, ctx.fetched_at);

    Ok(Bounty {
        title,
        value,
        link,
        created_at,
    })
}

/// Normalizes every record, keeping one result per input in input order.
pub fn normalize_batch(
    records: &[Value],
    ctx: &NormalizeContext,
) -> Vec<Result<Bounty, RecordError>> {
    records
        .iter()
        .map(|raw| normalize_record(raw, ctx))
        .collect()
}

/// Keeps the successfully normalized bounties and reports every dropped record.
pub fn successful(results: Vec<Result<Bounty, RecordError>>) -> Vec<Bounty> {
    let total = results.len();
    let bounties: Vec<Bounty> = results
        .into_iter()
        .enumerate()
        .filter_map(|(index, result)| match result {
            Ok(bounty) => Some(bounty),
            Err(err) => {
                scout_warn!("Dropping listing #{}: {}", index, err);
                None
            }
        })
        .collect();
    scout_info!("Parsed {} of {} listings", bounties.len(), total);
    bounties
}

/// Extracts the digits of a reward string, e.g. `"$1,500"` -> `1500`.
///
/// Every non-digit is discarded, so `"$12.50"` reads as `1250`.
pub fn parse_reward(reward: &str) -> Result<u64, RecordError> {
    let digits: String = reward.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(RecordError::RewardNotNumeric {
            reward: reward.to_string(),
        });
    }
    digits
        .parse::<u64>()
        .map_err(|_| RecordError::RewardOutOfRange {
            reward: reward.to_string(),
        })
}

/// Parses an ISO-8601 / RFC-3339 posting time. Times without an offset are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    let normalized = match trimmed.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{rest}+00:00"),
        None => trimmed.to_string(),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(&normalized, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

fn title_of(record: &Map<String, Value>) -> Result<String, RecordError> {
    match record.get("title") {
        None | Some(Value::Null) => Ok(UNKNOWN_TITLE.to_string()),
        Some(Value::String(title)) => Ok(title.clone()),
        Some(_) => Err(RecordError::InvalidField { field: "title" }),
    }
}

fn link_of(record: &Map<String, Value>, site_origin: &str) -> Result<String, RecordError> {
    let link = match record.get("link") {
        None | Some(Value::Null) => return Err(RecordError::MissingLink),
        Some(Value::String(link)) => link.trim(),
        Some(_) => return Err(RecordError::InvalidField { field: "link" }),
    };
    if link.is_empty() {
        return Err(RecordError::MissingLink);
    }
    if link.contains(['\n', '\r']) {
        return Err(RecordError::InvalidLink {
            link: link.to_string(),
        });
    }
    if link.starts_with('/') {
        Ok(format!("{site_origin}{link}"))
    } else {
        Ok(link.to_string())
    }
}

fn value_of(record: &Map<String, Value>) -> Result<u64, RecordError> {
    match record.get("reward") {
        None | Some(Value::Null) => parse_reward(DEFAULT_REWARD),
        Some(Value::String(reward)) => parse_reward(reward),
        Some(Value::Number(number)) => number
            .as_u64()
            .ok_or(RecordError::InvalidField { field: "reward" }),
        Some(_) => Err(RecordError::InvalidField { field: "reward" }),
    }
}

fn created_at_of(record: &Map<String, Value>, fetched_at: DateTime<Utc>) -> DateTime<Utc> {
    let parsed = match record.get("posted_time") {
        Some(Value::String(raw)) => {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                scout_debug!("Unparsable posted_time {:?}; using fetch time", raw);
            }
            parsed
        }
        _ => None,
    };
    parsed.unwrap_or(fetched_at)
}

#[cfg(test)]
mod tests {
    use super::{link_of, RecordError};
    use serde_json::json;

    fn record(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn relative_link_gets_origin() {
        let rec = record(json!({ "link": "/bounties/42" }));
        assert_eq!(
            link_of(&rec, "https://replit.com").unwrap(),
            "https://replit.com/bounties/42"
        );
    }

    #[test]
    fn absolute_link_passes_through_trimmed() {
        let rec = record(json!({ "link": "  https://example.com/b/1 " }));
        assert_eq!(
            link_of(&rec, "https://replit.com").unwrap(),
            "https://example.com/b/1"
        );
    }

    #[test]
    fn whitespace_only_link_is_missing() {
        let rec = record(json!({ "link": "   " }));
        assert_eq!(
            link_of(&rec, "https://replit.com"),
            Err(RecordError::MissingLink)
        );
    }
}
