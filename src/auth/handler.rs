use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use crate::user;
use crate::Raw;

use super::service::{SignInRequest, SignUpRequest};
use super::Session;

#[derive(Serialize)]
pub struct AuthResponse {
    sub: user::Sub,
    name: String,
    email: String,
    token: String,
}

fn session_cookie(session: &Session) -> Cookie<'static> {
    Cookie::build((Session::ID, session.raw().to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn respond(user: super::User, session: Session, jar: CookieJar) -> (CookieJar, Json<AuthResponse>) {
    let jar = jar.add(session_cookie(&session));
    let response = AuthResponse {
        sub: user.sub().to_owned(),
        name: user.name().to_owned(),
        email: user.email().to_owned(),
        token: session.raw().to_owned(),
    };
    (jar, Json(response))
}

pub async fn sign_up(
    auth_service: State<super::Service>,
    jar: CookieJar,
    Json(request): Json<SignUpRequest>,
) -> crate::Result<(CookieJar, Json<AuthResponse>)> {
    let (user, session) = auth_service.sign_up(request).await?;
    Ok(respond(user, session, jar))
}

pub async fn sign_in(
    auth_service: State<super::Service>,
    jar: CookieJar,
    Json(request): Json<SignInRequest>,
) -> crate::Result<(CookieJar, Json<AuthResponse>)> {
    let (user, session) = auth_service.sign_in(request).await?;
    Ok(respond(user, session, jar))
}

pub async fn sign_out(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(Session::ID).path("/").build())
}
