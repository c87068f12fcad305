use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{
    hours::is_open,
    models::{Campus, CrowdLevel, Reaction, VotesState},
};

pub const FEEDBACK_MAX_CHARS: usize = 200;

/// Why an intent left the state untouched.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "reason", content = "campus")]
pub enum Rejection {
    CampusClosed(Campus),
    EmptyFeedback,
    EmptyReaction,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::CampusClosed(campus) => {
                write!(f, "{} is closed right now", campus.display_name())
            }
            Rejection::EmptyFeedback => f.write_str("feedback text is empty"),
            Rejection::EmptyReaction => f.write_str("reaction is empty"),
        }
    }
}

impl std::error::Error for Rejection {}

fn ensure_open(campus: Campus, now: NaiveDateTime) -> Result<(), Rejection> {
    if is_open(campus, now) {
        Ok(())
    } else {
        Err(Rejection::CampusClosed(campus))
    }
}

fn share(count: u32, total: u32) -> u32 {
    (100.0 * count as f64 / total as f64).round() as u32
}

impl VotesState {
    /// Each side is rounded on its own, so the pair can land one off 100.
    pub fn record_vote(&mut self, campus: Campus, now: NaiveDateTime) -> Result<(), Rejection> {
        ensure_open(campus, now)?;

        let data = self.get_mut(campus);
        data.count = data.count.saturating_add(1);
        self.recompute_percentages();
        Ok(())
    }

    pub fn record_reaction(
        &mut self,
        campus: Campus,
        token: &str,
        now: NaiveDateTime,
    ) -> Result<(), Rejection> {
        ensure_open(campus, now)?;
        if token.trim().is_empty() {
            return Err(Rejection::EmptyReaction);
        }

        self.get_mut(campus).recent_reactions.push(Reaction {
            reaction: token.to_string(),
            timestamp: now,
        });
        Ok(())
    }

    /// Last writer wins.
    pub fn report_crowd(
        &mut self,
        campus: Campus,
        level: CrowdLevel,
        now: NaiveDateTime,
    ) -> Result<(), Rejection> {
        ensure_open(campus, now)?;

        self.get_mut(campus).crowd_level = level;
        Ok(())
    }

    pub fn submit_feedback(
        &mut self,
        campus: Campus,
        text: &str,
        is_positive: bool,
        now: NaiveDateTime,
    ) -> Result<(), Rejection> {
        ensure_open(campus, now)?;
        if text.trim().is_empty() {
            return Err(Rejection::EmptyFeedback);
        }

        let text: String = text.chars().take(FEEDBACK_MAX_CHARS).collect();
        let data = self.get_mut(campus);
        if is_positive {
            data.likes.push(text);
        } else {
            data.dislikes.push(text);
        }
        Ok(())
    }

    pub fn reset_crowd_levels(&mut self) {
        for campus in Campus::ALL {
            self.get_mut(campus).crowd_level = CrowdLevel::Unknown;
        }
    }

    pub fn recompute_percentages(&mut self) {
        let total = self.total_votes();
        if total == 0 {
            return;
        }
        self.csb.percentage = share(self.csb.count, total);
        self.sju.percentage = share(self.sju.count, total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn monday_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 14)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn monday_night() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 14)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap()
    }

    #[test]
    fn vote_recomputes_both_percentages() {
        let mut votes = VotesState::new();
        votes.record_vote(Campus::Csb, monday_noon()).unwrap();
        assert_eq!((votes.csb.percentage, votes.sju.percentage), (100, 0));

        votes.record_vote(Campus::Sju, monday_noon()).unwrap();
        votes.record_vote(Campus::Sju, monday_noon()).unwrap();
        assert_eq!(votes.csb.count, 1);
        assert_eq!(votes.sju.count, 2);
        assert_eq!((votes.csb.percentage, votes.sju.percentage), (33, 67));
    }

    #[test]
    fn independent_rounding_can_overshoot_one_hundred() {
        let mut votes = VotesState::new();
        votes.csb.count = 1;
        votes.sju.count = 7;
        votes.recompute_percentages();
        // 12.5 and 87.5 both round up.
        assert_eq!((votes.csb.percentage, votes.sju.percentage), (13, 88));
    }

    #[test]
    fn every_intent_is_a_no_op_while_closed() {
        let mut votes = VotesState::new();
        let before = votes.clone();
        let night = monday_night();

        for campus in Campus::ALL {
            let closed = Err(Rejection::CampusClosed(campus));
            assert_eq!(votes.record_vote(campus, night), closed);
            assert_eq!(votes.record_reaction(campus, "👍", night), closed);
            assert_eq!(votes.report_crowd(campus, CrowdLevel::High, night), closed);
            assert_eq!(votes.submit_feedback(campus, "great", true, night), closed);
        }
        assert_eq!(votes, before);
    }

    #[test]
    fn blank_feedback_is_rejected() {
        let mut votes = VotesState::new();
        assert_eq!(
            votes.submit_feedback(Campus::Csb, "   \n", true, monday_noon()),
            Err(Rejection::EmptyFeedback)
        );
        assert!(votes.csb.likes.is_empty());
    }

    #[test]
    fn blank_reaction_is_rejected() {
        let mut votes = VotesState::new();
        for token in ["", "   "] {
            assert_eq!(
                votes.record_reaction(Campus::Sju, token, monday_noon()),
                Err(Rejection::EmptyReaction)
            );
        }
        assert!(votes.sju.recent_reactions.is_empty());
    }

    #[test]
    fn feedback_is_stored_as_given_but_capped_in_length() {
        let mut votes = VotesState::new();
        votes
            .submit_feedback(Campus::Sju, " soup was cold ", false, monday_noon())
            .unwrap();
        assert_eq!(votes.sju.dislikes.to_vec(), vec![" soup was cold ".to_string()]);

        let long = "é".repeat(FEEDBACK_MAX_CHARS + 20);
        votes.submit_feedback(Campus::Sju, &long, true, monday_noon()).unwrap();
        assert_eq!(votes.sju.likes.get(0).unwrap().chars().count(), FEEDBACK_MAX_CHARS);
    }

    #[test]
    fn reactions_and_feedback_evict_from_opposite_ends() {
        let mut votes = VotesState::new();
        for n in 0..7 {
            let label = n.to_string();
            votes.record_reaction(Campus::Csb, &label, monday_noon()).unwrap();
            votes.submit_feedback(Campus::Csb, &label, true, monday_noon()).unwrap();
        }

        let reactions: Vec<_> = votes
            .csb
            .recent_reactions
            .iter()
            .map(|r| r.reaction.as_str())
            .collect();
        assert_eq!(reactions, vec!["6", "5", "4", "3", "2"]);
        assert_eq!(votes.csb.likes.to_vec(), vec!["2", "3", "4", "5", "6"]);
    }

    #[test]
    fn crowd_report_overwrites_and_reset_clears_both() {
        let mut votes = VotesState::new();
        votes.report_crowd(Campus::Csb, CrowdLevel::High, monday_noon()).unwrap();
        votes.report_crowd(Campus::Csb, CrowdLevel::Low, monday_noon()).unwrap();
        votes.report_crowd(Campus::Sju, CrowdLevel::Medium, monday_noon()).unwrap();
        assert_eq!(votes.csb.crowd_level, CrowdLevel::Low);

        votes.reset_crowd_levels();
        assert_eq!(votes.csb.crowd_level, CrowdLevel::Unknown);
        assert_eq!(votes.sju.crowd_level, CrowdLevel::Unknown);
    }

    proptest! {
        #[test]
        fn percentages_stay_within_one_of_one_hundred(ballots in proptest::collection::vec(any::<bool>(), 1..300)) {
            let mut votes = VotesState::new();
            for to_csb in ballots {
                let campus = if to_csb { Campus::Csb } else { Campus::Sju };
                votes.record_vote(campus, monday_noon()).unwrap();
                let sum = votes.csb.percentage as i64 + votes.sju.percentage as i64;
                prop_assert!((sum - 100).abs() <= 1, "sum {}", sum);
            }
        }
    }
}
