//! Reviewer selection.
//!
//! Candidates are drawn uniformly at random from the active members of a
//! team. The store returns candidate pools in id order; the shuffle below is
//! what removes that ordering from the outcome.

use std::sync::Arc;

use super::ports::{RandomSource, ReviewTransaction};
use super::review_service::map_store_error;
use super::{Error, TeamName, UserId};

/// Default upper bound on reviewers assigned to a new pull request.
pub const DEFAULT_MAX_REVIEWERS: usize = 2;

/// Picks initial reviewers and replacements from a team's active members.
#[derive(Clone)]
pub struct ReviewerSelector {
    random: Arc<dyn RandomSource>,
    max_reviewers: usize,
}

impl ReviewerSelector {
    pub fn new(random: Arc<dyn RandomSource>, max_reviewers: usize) -> Self {
        Self {
            random,
            max_reviewers,
        }
    }

    /// Upper bound on reviewers assigned to a new pull request.
    pub fn max_reviewers(&self) -> usize {
        self.max_reviewers
    }

    /// Choose up to `max_reviewers` active members of `team`, never the
    /// author. An empty pool yields an empty selection.
    pub async fn select_initial_reviewers(
        &self,
        tx: &mut dyn ReviewTransaction,
        team: &TeamName,
        author: &UserId,
    ) -> Result<Vec<UserId>, Error> {
        let pool = tx
            .active_team_members_excluding(team, std::slice::from_ref(author))
            .await
            .map_err(map_store_error)?;
        Ok(self.sample(pool, self.max_reviewers))
    }

    /// Choose one active member of `team` outside `exclude`.
    ///
    /// # Errors
    /// Returns [`super::ErrorCode::NoCandidate`] when the pool is empty.
    pub async fn select_replacement(
        &self,
        tx: &mut dyn ReviewTransaction,
        team: &TeamName,
        exclude: &[UserId],
    ) -> Result<UserId, Error> {
        let pool = tx
            .active_team_members_excluding(team, exclude)
            .await
            .map_err(map_store_error)?;
        self.sample(pool, 1)
            .pop()
            .ok_or_else(|| Error::no_candidate("no active replacement candidate in team"))
    }

    /// Uniform random subset of size `min(count, pool.len())` via a partial
    /// Fisher-Yates shuffle.
    pub fn sample(&self, mut pool: Vec<UserId>, count: usize) -> Vec<UserId> {
        let take = count.min(pool.len());
        for i in 0..take {
            let remaining = pool.len() - i;
            let offset = self.random.next_index(remaining).min(remaining - 1);
            pool.swap(i, i + offset);
        }
        pool.truncate(take);
        pool
    }
}
