use std::cmp::Ordering;
use std::num::NonZeroU64;
use std::time::{Duration, Instant};
use crate::models::{NomineeId, VoteSnapshot};

pub const DEFAULT_SUMMARY_INTERVAL: Duration = Duration::from_secs(600);
pub const DEFAULT_MILESTONE_UNIT: NonZeroU64 = match NonZeroU64::new(100_000) {
    Some(unit) => unit,
    None => unreachable!(),
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceEvent {
    Summary { leader: NomineeId, votes: u64, gap: u64 },
    /// `rank` is the 0-based index in the current ranking.
    RankChange { nominee: NomineeId, rank: usize, leadership: bool },
    Milestone { nominee: NomineeId, thousands: u64 },
}

impl RaceEvent {
    pub fn nominee(&self) -> &NomineeId {
        match self {
            RaceEvent::Summary { leader, .. } => leader,
            RaceEvent::RankChange { nominee, .. } | RaceEvent::Milestone { nominee, .. } => nominee,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceRules {
    pub summary_interval: Duration,
    pub milestone_unit: NonZeroU64,
}

impl Default for RaceRules {
    fn default() -> Self {
        Self {
            summary_interval: DEFAULT_SUMMARY_INTERVAL,
            milestone_unit: DEFAULT_MILESTONE_UNIT,
        }
    }
}

/// Nominees present in `snapshot`, most votes first. Equal counts fall back to
/// ascending id so identical inputs always rank identically.
pub fn rank(snapshot: &VoteSnapshot, nominees: &[NomineeId]) -> Vec<NomineeId> {
    let mut ranked: Vec<(&NomineeId, u64)> = nominees
        .iter()
        .filter(|id| snapshot.contains(id.as_str()))
        .map(|id| (id, snapshot.get(id.as_str())))
        .collect();

    ranked.sort_unstable_by(|a, b| match b.1.cmp(&a.1) {
        Ordering::Equal => a.0.cmp(b.0),
        other => other,
    });
    ranked.into_iter().map(|(id, _)| id.clone()).collect()
}

pub fn rank_changes(previous: &[NomineeId], current: &[NomineeId]) -> Vec<RaceEvent> {
    current
        .iter()
        .enumerate()
        .filter_map(|(rank, id)| {
            let prev_rank = previous.iter().position(|p| p == id)?;
            (rank < prev_rank).then(|| RaceEvent::RankChange {
                nominee: id.clone(),
                rank,
                leadership: rank == 0,
            })
        })
        .collect()
}

pub fn milestones(
    previous: &VoteSnapshot,
    current: &VoteSnapshot,
    nominees: &[NomineeId],
    unit: NonZeroU64,
) -> Vec<RaceEvent> {
    let unit = unit.get();
    nominees
        .iter()
        .filter_map(|id| {
            let now = current.get(id.as_str()) / unit;
            let before = previous.get(id.as_str()) / unit;
            (now > before).then(|| RaceEvent::Milestone {
                nominee: id.clone(),
                thousands: now * unit / 1000,
            })
        })
        .collect()
}

pub fn summary(current: &VoteSnapshot, ranking: &[NomineeId]) -> Option<RaceEvent> {
    let [first, second, ..] = ranking else {
        return None;
    };
    let votes = current.get(first.as_str());
    Some(RaceEvent::Summary {
        leader: first.clone(),
        votes,
        gap: votes.saturating_sub(current.get(second.as_str())),
    })
}

/// Compares successive snapshots and decides which race events to announce.
///
/// Holds the previous snapshot and the time of the last summary; time is
/// always supplied by the caller.
#[derive(Debug)]
pub struct RankingEngine {
    nominees: Vec<NomineeId>,
    rules: RaceRules,
    previous: Option<VoteSnapshot>,
    last_summary_at: Instant,
}

impl RankingEngine {
    pub fn new(nominees: Vec<NomineeId>, rules: RaceRules, started_at: Instant) -> Self {
        Self { nominees, rules, previous: None, last_summary_at: started_at }
    }

    pub fn previous(&self) -> Option<&VoteSnapshot> {
        self.previous.as_ref()
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Events for the transition from the stored snapshot to `current`, in
    /// announcement order: summary, rank changes by current rank, milestones
    /// by nominee order. The first snapshot after construction or `reset` is
    /// only remembered.
    pub fn evaluate(&mut self, current: VoteSnapshot, now: Instant) -> Vec<RaceEvent> {
        let previous = match self.previous.take() {
            Some(previous) if !previous.is_empty() => previous,
            _ => {
                self.previous = Some(current);
                return Vec::new();
            }
        };

        let curr_ranking = rank(&current, &self.nominees);
        let prev_ranking = rank(&previous, &self.nominees);
        let mut events = Vec::new();

        if now.saturating_duration_since(self.last_summary_at) >= self.rules.summary_interval {
            if let Some(event) = summary(&current, &curr_ranking) {
                events.push(event);
                self.last_summary_at = now;
            }
        }

        events.extend(rank_changes(&prev_ranking, &curr_ranking));
        events.extend(milestones(&previous, &current, &self.nominees, self.rules.milestone_unit));

        self.previous = Some(current);
        events
    }
}
