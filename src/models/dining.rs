use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::votes::capped::{CappedList, NewestFirst, OldestFirst};

use super::{Campus, CrowdLevel};

pub const RECENT_LIMIT: usize = 5;

pub type ReactionHistory = CappedList<Reaction, NewestFirst, RECENT_LIMIT>;
pub type FeedbackLog = CappedList<String, OldestFirst, RECENT_LIMIT>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub reaction: String,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiningData {
    pub count: u32,
    pub percentage: u32,
    pub likes: FeedbackLog,
    pub dislikes: FeedbackLog,
    pub crowd_level: CrowdLevel,
    pub recent_reactions: ReactionHistory,
}

impl Default for DiningData {
    fn default() -> Self {
        Self {
            count: 0,
            percentage: 50,
            likes: FeedbackLog::new(),
            dislikes: FeedbackLog::new(),
            crowd_level: CrowdLevel::Unknown,
            recent_reactions: ReactionHistory::new(),
        }
    }
}

/// Both campuses' tallies. This pair is what gets persisted and what the
/// percentages are normalised over.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VotesState {
    pub csb: DiningData,
    pub sju: DiningData,
}

impl VotesState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, campus: Campus) -> &DiningData {
        match campus {
            Campus::Csb => &self.csb,
            Campus::Sju => &self.sju,
        }
    }

    pub fn get_mut(&mut self, campus: Campus) -> &mut DiningData {
        match campus {
            Campus::Csb => &mut self.csb,
            Campus::Sju => &mut self.sju,
        }
    }

    pub fn total_votes(&self) -> u32 {
        self.csb.count.saturating_add(self.sju.count)
    }
}
