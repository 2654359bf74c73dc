//! Bearer-token extractors for handlers

use std::future::{Ready, ready};
use std::sync::Arc;

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header::AUTHORIZATION, web};

use crate::api::jwt::{Identity, JwtService};
use crate::errors::ShortlyError;

/// Requires `Authorization: Bearer <token>`. Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

/// Identity when a bearer token is sent, `None` when the header is absent.
/// A header carrying a bad token is still rejected.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<Identity>);

fn jwt_service(req: &HttpRequest) -> Result<&Arc<JwtService>, ShortlyError> {
    req.app_data::<web::Data<Arc<JwtService>>>()
        .map(|data| data.get_ref())
        .ok_or_else(|| ShortlyError::internal("JwtService not registered as app data"))
}

fn authorization_header(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

impl FromRequest for AuthenticatedUser {
    type Error = ShortlyError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = jwt_service(req)
            .and_then(|jwt| jwt.verify_bearer(authorization_header(req)))
            .map(AuthenticatedUser);
        ready(result)
    }
}

impl FromRequest for OptionalUser {
    type Error = ShortlyError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(header) = authorization_header(req) else {
            return ready(Ok(OptionalUser(None)));
        };
        let result = jwt_service(req)
            .and_then(|jwt| jwt.verify_bearer(Some(header)))
            .map(|identity| OptionalUser(Some(identity)));
        ready(result)
    }
}
