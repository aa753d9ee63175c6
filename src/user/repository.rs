use async_trait::async_trait;
use mongodb::bson::doc;

use super::model::User;
use super::Sub;

const USERS_COLLECTION: &str = "users";

#[async_trait]
pub trait UserRepository {
    async fn insert(&self, user: &User) -> super::Result<()>;

    async fn find_by_sub(&self, sub: &Sub) -> super::Result<User>;

    async fn find_by_email(&self, email: &str) -> super::Result<Option<User>>;
}

pub struct MongoUserRepository {
    collection: mongodb::Collection<User>,
}

impl MongoUserRepository {
    pub fn new(database: &mongodb::Database) -> Self {
        Self {
            collection: database.collection(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, user: &User) -> super::Result<()> {
        self.collection.insert_one(user).await?;
        Ok(())
    }

    async fn find_by_sub(&self, sub: &Sub) -> super::Result<User> {
        self.collection
            .find_one(doc! { "sub": sub })
            .await?
            .ok_or(super::Error::NotFound(sub.to_owned()))
    }

    async fn find_by_email(&self, email: &str) -> super::Result<Option<User>> {
        let user = self.collection.find_one(doc! { "email": email }).await?;
        Ok(user)
    }
}
