use std::sync::Arc;

use axum::extract::FromRef;
use log::info;
use tokio::sync::OnceCell;

use crate::auth;
use crate::auth::service::AuthServiceImpl;
use crate::book::repository::MongoBookRepository;
use crate::book::service::BookService;
use crate::conversation::repository::MongoConversationRepository;
use crate::conversation::service::ConversationService;
use crate::integration;
use crate::integration::storage::MediaStorage;
use crate::message::repository::MongoMessageRepository;
use crate::message::service::MessageService;
use crate::user;
use crate::user::repository::MongoUserRepository;
use crate::user::service::UserServiceImpl;

static APP_STATE: OnceCell<AppState> = OnceCell::const_new();

#[derive(Clone, FromRef)]
pub struct AppState {
    mongo_client: mongodb::Client,

    pub auth_service: auth::Service,
    pub user_service: user::Service,
    pub book_service: BookService,
    pub conversation_service: ConversationService,
    pub message_service: MessageService,
    pub media_storage: MediaStorage,
}

impl AppState {
    /// Process-wide instance. Concurrent first callers await the same
    /// initialization instead of racing duplicate clients.
    pub async fn get(config: &integration::Config) -> crate::Result<Self> {
        APP_STATE
            .get_or_try_init(|| Self::init(config))
            .await
            .cloned()
    }

    async fn init(config: &integration::Config) -> crate::Result<Self> {
        let (mongo_client, database) = integration::mongo::init(&config.mongo)
            .await
            .map_err(crate::error::Error::from)?;

        let user_repository: user::Repository = Arc::new(MongoUserRepository::new(&database));
        let user_service: user::Service =
            Arc::new(UserServiceImpl::new(user_repository.clone()));
        let auth_service: auth::Service =
            Arc::new(AuthServiceImpl::new(user_repository, &config.token));

        let conversation_service =
            ConversationService::new(Arc::new(MongoConversationRepository::new(&database)));
        let message_service = MessageService::new(
            Arc::new(MongoMessageRepository::new(&database)),
            conversation_service.clone(),
            user_service.clone(),
        );
        let book_service = BookService::new(Arc::new(MongoBookRepository::new(&database)));
        let media_storage = MediaStorage::new(integration::init_http_client(), config.media.clone());

        Ok(Self {
            mongo_client,
            auth_service,
            user_service,
            book_service,
            conversation_service,
            message_service,
            media_storage,
        })
    }

    /// Releases the store connections. Live subscriptions abort on drop.
    pub async fn shutdown(self) {
        info!("shutting down");
        self.mongo_client.shutdown().await;
    }
}
