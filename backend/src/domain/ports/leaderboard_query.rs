//! Driving port for the leaderboard read model.

use async_trait::async_trait;
use pagination::PageWindow;

use crate::domain::{Error, LeaderboardEntry, RequestContext};

/// Domain use-case port listing users by points.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaderboardQuery: Send + Sync {
    /// One page of the leaderboard, highest points first.
    async fn leaderboard(
        &self,
        ctx: &RequestContext,
        window: PageWindow,
    ) -> Result<Vec<LeaderboardEntry>, Error>;
}
