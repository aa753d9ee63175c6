use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use email_address::EmailAddress;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::Deserialize;

use crate::integration::TokenConfig;
use crate::user;
use crate::user::model::User as UserRecord;

use super::{Session, TokenClaims};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[async_trait]
pub trait AuthService {
    async fn sign_up(&self, request: SignUpRequest) -> super::Result<(super::User, Session)>;

    async fn sign_in(&self, request: SignInRequest) -> super::Result<(super::User, Session)>;

    fn validate(&self, token: &str) -> super::Result<user::Sub>;
}

#[derive(Clone)]
pub struct AuthServiceImpl {
    users: user::Repository,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
    token_ttl: std::time::Duration,
}

impl AuthServiceImpl {
    pub fn new(users: user::Repository, config: &TokenConfig) -> Self {
        let validation = Validation::new(jsonwebtoken::Algorithm::HS256);

        Self {
            users,
            encoding_key: Arc::new(EncodingKey::from_secret(config.secret.as_bytes())),
            decoding_key: Arc::new(DecodingKey::from_secret(config.secret.as_bytes())),
            validation: Arc::new(validation),
            token_ttl: config.ttl,
        }
    }

    fn issue_session(&self, sub: &user::Sub) -> super::Result<Session> {
        let iat = chrono::Utc::now().timestamp() as usize;
        let claims = TokenClaims {
            sub: sub.to_owned(),
            exp: iat + self.token_ttl.as_secs() as usize,
            iat,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(Session::new(token))
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn sign_up(&self, request: SignUpRequest) -> super::Result<(super::User, Session)> {
        if !EmailAddress::is_valid(&request.email) {
            return Err(super::Error::InvalidEmail(request.email));
        }
        if request.password.len() < MIN_PASSWORD_LEN {
            return Err(super::Error::PasswordTooShort(MIN_PASSWORD_LEN));
        }
        if let Some(existing) = self.users.find_by_email(&request.email).await? {
            return Err(user::Error::AlreadyExists(existing.email).into());
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(request.password.as_bytes(), &salt)?
            .to_string();

        let record = UserRecord::new(&request.email, &request.name, password_hash);
        self.users.insert(&record).await?;

        debug!("registered new user {}", record.sub);

        let session = self.issue_session(&record.sub)?;
        let user = super::User::new(record.sub, record.name, record.email);
        Ok((user, session))
    }

    async fn sign_in(&self, request: SignInRequest) -> super::Result<(super::User, Session)> {
        let record = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(super::Error::InvalidCredentials)?;

        let parsed_hash = PasswordHash::new(&record.password_hash)?;
        Argon2::default()
            .verify_password(request.password.as_bytes(), &parsed_hash)
            .map_err(|_| super::Error::InvalidCredentials)?;

        let session = self.issue_session(&record.sub)?;
        let user = super::User::new(record.sub, record.name, record.email);
        Ok((user, session))
    }

    fn validate(&self, token: &str) -> super::Result<user::Sub> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tokio::sync::Mutex;

    use super::*;
    use crate::auth::Error as AuthError;
    use crate::user::model::User as UserRecord;
    use crate::user::repository::UserRepository;
    use crate::user::Sub;
    use crate::Raw;

    #[derive(Default)]
    struct InMemoryUsers {
        by_email: Mutex<HashMap<String, UserRecord>>,
    }

    #[async_trait]
    impl UserRepository for InMemoryUsers {
        async fn insert(&self, user: &UserRecord) -> user::Result<()> {
            self.by_email
                .lock()
                .await
                .insert(user.email.clone(), user.clone());
            Ok(())
        }

        async fn find_by_sub(&self, sub: &Sub) -> user::Result<UserRecord> {
            self.by_email
                .lock()
                .await
                .values()
                .find(|u| u.sub == *sub)
                .cloned()
                .ok_or(user::Error::NotFound(sub.to_owned()))
        }

        async fn find_by_email(&self, email: &str) -> user::Result<Option<UserRecord>> {
            Ok(self.by_email.lock().await.get(email).cloned())
        }
    }

    fn service() -> AuthServiceImpl {
        AuthServiceImpl::new(Arc::new(InMemoryUsers::default()), &TokenConfig::default())
    }

    fn sign_up_request() -> SignUpRequest {
        SignUpRequest {
            email: "reader@example.com".into(),
            name: "Reader".into(),
            password: "correct horse".into(),
        }
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let service = service();

        let (user, _) = service.sign_up(sign_up_request()).await.unwrap();
        assert_eq!(user.email(), "reader@example.com");

        let (user, session) = service
            .sign_in(SignInRequest {
                email: "reader@example.com".into(),
                password: "correct horse".into(),
            })
            .await
            .unwrap();
        assert_eq!(user.name(), "Reader");

        let sub = service.validate(session.raw()).unwrap();
        assert_eq!(&sub, user.sub());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let service = service();
        service.sign_up(sign_up_request()).await.unwrap();

        let result = service
            .sign_in(SignInRequest {
                email: "reader@example.com".into(),
                password: "wrong horse".into(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn duplicate_sign_up_is_rejected() {
        let service = service();
        service.sign_up(sign_up_request()).await.unwrap();

        let result = service.sign_up(sign_up_request()).await;
        assert!(matches!(
            result,
            Err(AuthError::_User(user::Error::AlreadyExists(_)))
        ));
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let service = service();
        let result = service
            .sign_up(SignUpRequest {
                email: "not-an-email".into(),
                name: "X".into(),
                password: "long enough".into(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::InvalidEmail(_))));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let service = service();
        assert!(service.validate("not.a.token").is_err());
    }
}
