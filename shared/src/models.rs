use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub const DEFAULT_ICON: &str = "https://static.mediacdn.vn/fchoice/images/logo.svg";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NomineeId(String);

impl NomineeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NomineeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NomineeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NomineeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nominee {
    pub id: NomineeId,
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_owned()
}

/// The fixed, ordered set of nominees a contest tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nominees {
    entries: Vec<Nominee>,
}

impl Nominees {
    pub fn new(entries: Vec<Nominee>) -> Self {
        Self { entries }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|n| n.id.as_str() == id)
    }

    pub fn get(&self, id: &str) -> Option<&Nominee> {
        self.entries.iter().find(|n| n.id.as_str() == id)
    }

    pub fn ids(&self) -> Vec<NomineeId> {
        self.entries.iter().map(|n| n.id.clone()).collect()
    }

    pub fn id_set(&self) -> HashSet<NomineeId> {
        self.entries.iter().map(|n| n.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Nominee> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn display_name<'a>(&'a self, id: &'a NomineeId) -> &'a str {
        self.get(id.as_str()).map_or(id.as_str(), |n| n.name.as_str())
    }

    pub fn icon<'a>(&'a self, id: &NomineeId) -> &'a str {
        self.get(id.as_str()).map_or(DEFAULT_ICON, |n| n.icon.as_str())
    }
}

/// Second-precision local time in the contest's time zone, rendered as
/// `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VoteTime(PrimitiveDateTime);

impl VoteTime {
    pub fn now(offset: UtcOffset) -> Self {
        let now = OffsetDateTime::now_utc().to_offset(offset);
        Self::from(PrimitiveDateTime::new(now.date(), now.time()))
    }

    pub fn datetime(&self) -> PrimitiveDateTime {
        self.0
    }
}

impl From<PrimitiveDateTime> for VoteTime {
    fn from(datetime: PrimitiveDateTime) -> Self {
        Self(datetime.replace_nanosecond(0).unwrap_or(datetime))
    }
}

impl fmt::Display for VoteTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self
            .0
            .format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
            .map_err(|_| fmt::Error)?;
        f.write_str(&formatted)
    }
}

impl FromStr for VoteTime {
    type Err = time::error::Parse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrimitiveDateTime::parse(
            s.trim(),
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        )
        .map(Self)
    }
}

impl Serialize for VoteTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VoteTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSample {
    pub vote_count: u64,
    pub timestamp: VoteTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteHistory {
    #[serde(rename = "vote_history")]
    pub history: BTreeMap<NomineeId, Vec<VoteSample>>,
    pub last_update_time: VoteTime,
}

impl VoteHistory {
    pub fn empty(last_update_time: VoteTime) -> Self {
        Self {
            history: BTreeMap::new(),
            last_update_time,
        }
    }

    pub fn push(&mut self, nominee: NomineeId, sample: VoteSample) {
        self.history.entry(nominee).or_default().push(sample);
    }

    /// Samples strictly newer than `since`, dropping nominees left with none.
    pub fn since(&self, since: VoteTime) -> Self {
        let history = self
            .history
            .iter()
            .filter_map(|(id, samples)| {
                let newer: Vec<VoteSample> = samples
                    .iter()
                    .filter(|s| s.timestamp > since)
                    .copied()
                    .collect();
                (!newer.is_empty()).then(|| (id.clone(), newer))
            })
            .collect();

        Self {
            history,
            last_update_time: self.last_update_time,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.history.values().map(Vec::len).sum()
    }

    pub fn latest(&self) -> VoteSnapshot {
        self.history
            .iter()
            .filter_map(|(id, samples)| samples.last().map(|s| (id.clone(), s.vote_count)))
            .collect()
    }
}

/// Latest vote count per nominee. Nominees without samples read as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteSnapshot {
    counts: BTreeMap<NomineeId, u64>,
}

impl VoteSnapshot {
    pub fn get(&self, id: &str) -> u64 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.counts.contains_key(id)
    }

    pub fn insert(&mut self, id: NomineeId, votes: u64) {
        self.counts.insert(id, votes);
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NomineeId, u64)> {
        self.counts.iter().map(|(id, v)| (id, *v))
    }
}

impl FromIterator<(NomineeId, u64)> for VoteSnapshot {
    fn from_iter<I: IntoIterator<Item = (NomineeId, u64)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, u64)> for VoteSnapshot {
    fn from_iter<I: IntoIterator<Item = (&'a str, u64)>>(iter: I) -> Self {
        iter.into_iter().map(|(id, v)| (NomineeId::from(id), v)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
