use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use log::debug;

use crate::user;

use super::Session;

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned)
}

/// Resolves the session cookie (or bearer token) into the logged-in user and
/// attaches it as a request extension.
pub async fn authenticate(
    auth_service: State<super::Service>,
    user_service: State<user::Service>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> crate::Result<Response> {
    let session = jar
        .get(Session::ID)
        .map(Session::from)
        .or_else(|| bearer_token(&req).map(Session::new))
        .ok_or(super::Error::Unauthorized)?;

    debug!("active {session:?} found");

    let sub = auth_service.validate(crate::Raw::raw(&session))?;
    let info = user_service.find_user_info(&sub).await?;

    req.extensions_mut()
        .insert(super::User::new(sub, info.name, info.email));

    Ok(next.run(req).await)
}
