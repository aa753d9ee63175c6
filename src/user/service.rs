use async_trait::async_trait;

use super::model::UserInfo;
use super::{Repository, Sub};

#[async_trait]
pub trait UserService {
    async fn find_user_info(&self, sub: &Sub) -> super::Result<UserInfo>;
}

#[derive(Clone)]
pub struct UserServiceImpl {
    repository: Repository,
}

impl UserServiceImpl {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn find_user_info(&self, sub: &Sub) -> super::Result<UserInfo> {
        self.repository.find_by_sub(sub).await.map(UserInfo::from)
    }
}
