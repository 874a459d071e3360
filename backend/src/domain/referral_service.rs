//! One-shot referrer linking.
//!
//! The user is fetched and the referrer's existence checked concurrently.
//! The write itself is a conditional update that only matches while the
//! referrer is still unset, so concurrent requests cannot overwrite a link.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{ReferralCommand, ReferralRequest, UserPersistenceError, UserRepository};
use crate::domain::{Error, RequestContext, User, UserId};

/// Referral service implementing [`ReferralCommand`].
#[derive(Clone)]
pub struct ReferralService<U> {
    users: Arc<U>,
}

impl<U> ReferralService<U> {
    /// Create a new service over the user repository.
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

impl<U> ReferralService<U>
where
    U: UserRepository,
{
    fn map_user_error(error: UserPersistenceError) -> Error {
        Error::internal(format!("user repository error: {error}"))
    }

    async fn fetch_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Error::user_not_found(format!("user {id} not found")))
    }

    async fn require_referrer(&self, id: &UserId) -> Result<(), Error> {
        if self.users.exists(id).await.map_err(Self::map_user_error)? {
            Ok(())
        } else {
            Err(Error::user_not_found(format!("referrer {id} not found")))
        }
    }

    /// Explain why the conditional update matched no row.
    async fn classify_missed_update(&self, request: &ReferralRequest) -> Error {
        match self.users.find_by_id(&request.user_id).await {
            Ok(None) => Error::user_not_found(format!("user {} not found", request.user_id)),
            Ok(Some(user)) if user.referrer_id.is_some() => Error::referrer_already_set(),
            Ok(Some(_)) => Error::internal("referrer update matched no rows"),
            Err(err) => Self::map_user_error(err),
        }
    }
}

#[async_trait]
impl<U> ReferralCommand for ReferralService<U>
where
    U: UserRepository,
{
    async fn set_referrer(
        &self,
        ctx: &RequestContext,
        request: &ReferralRequest,
    ) -> Result<(), Error> {
        if request.user_id == request.referrer_id {
            warn!(
                trace_id = %ctx.trace_id(),
                method = ctx.method(),
                path = ctx.path(),
                user_id = %request.user_id,
                "self-referral rejected"
            );
            return Err(Error::invalid_request("a user cannot refer themselves"));
        }

        let (user, ()) = tokio::try_join!(
            self.fetch_user(&request.user_id),
            self.require_referrer(&request.referrer_id)
        )?;

        if user.referrer_id.is_some() {
            warn!(
                trace_id = %ctx.trace_id(),
                method = ctx.method(),
                path = ctx.path(),
                user_id = %request.user_id,
                "referrer already set"
            );
            return Err(Error::referrer_already_set());
        }

        let linked = self
            .users
            .set_referrer_if_unset(&request.user_id, &request.referrer_id)
            .await
            .map_err(Self::map_user_error)?;
        if !linked {
            let err = self.classify_missed_update(request).await;
            warn!(
                trace_id = %ctx.trace_id(),
                method = ctx.method(),
                path = ctx.path(),
                user_id = %request.user_id,
                code = ?err.code(),
                "referrer update matched no rows"
            );
            return Err(err);
        }

        info!(
            trace_id = %ctx.trace_id(),
            method = ctx.method(),
            path = ctx.path(),
            user_id = %request.user_id,
            referrer_id = %request.referrer_id,
            "referrer linked"
        );
        Ok(())
    }
}
