//! Driving port for linking a referrer to a user.

use async_trait::async_trait;

use crate::domain::{Error, RequestContext, UserId};

/// Request to credit `referrer_id` with referring `user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferralRequest {
    /// User being referred.
    pub user_id: UserId,
    /// User receiving the credit.
    pub referrer_id: UserId,
}

/// Domain use-case port for one-shot referrer linking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferralCommand: Send + Sync {
    /// Set the referrer; fails if one is already set.
    async fn set_referrer(&self, ctx: &RequestContext, request: &ReferralRequest)
    -> Result<(), Error>;
}
