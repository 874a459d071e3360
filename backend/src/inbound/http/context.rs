//! Extractor building the per-request [`RequestContext`].
//!
//! The trace identifier comes from the request extensions populated by the
//! [`Trace`](crate::middleware::Trace) middleware. Requests served without the
//! middleware get a fresh identifier so handlers never have to special-case
//! its absence.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{Ready, ready};

use crate::domain::{RequestContext, TraceId};

impl FromRequest for RequestContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let trace_id = req
            .extensions()
            .get::<TraceId>()
            .copied()
            .unwrap_or_else(TraceId::generate);
        ready(Ok(Self::new(trace_id, req.method().as_str(), req.path())))
    }
}
