use shared::VoteTime;
use crate::error::ApiError;

pub fn parse_since(raw: Option<&str>) -> Result<Option<VoteTime>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| ApiError::InvalidTimestamp),
    }
}

pub fn short_endpoint(endpoint: &str) -> String {
    let prefix: String = endpoint.chars().take(30).collect();
    if prefix.len() < endpoint.len() {
        format!("{}...", prefix)
    } else {
        prefix
    }
}

pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
