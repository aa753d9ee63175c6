use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;

use crate::conversation;
use crate::live::Subscription;

use super::model::Message;

const MESSAGES_COLLECTION: &str = "messages";

#[async_trait]
pub trait MessageRepository {
    async fn insert(&self, message: &Message) -> super::Result<ObjectId>;

    /// Unordered; callers order snapshots themselves since the store makes no
    /// ordering guarantee.
    async fn find_by_conversation_id(
        &self,
        conversation_id: &conversation::Id,
    ) -> super::Result<Vec<Message>>;

    async fn subscribe(
        &self,
        conversation_id: &conversation::Id,
    ) -> super::Result<Subscription<Message>>;
}

pub struct MongoMessageRepository {
    collection: mongodb::Collection<Message>,
}

impl MongoMessageRepository {
    pub fn new(database: &mongodb::Database) -> Self {
        Self {
            collection: database.collection(MESSAGES_COLLECTION),
        }
    }

    async fn fetch(
        collection: &mongodb::Collection<Message>,
        conversation_id: &conversation::Id,
    ) -> super::Result<Vec<Message>> {
        let cursor = collection
            .find(doc! { "conversation_id": conversation_id })
            .await?;

        let messages = cursor.try_collect::<Vec<Message>>().await?;
        Ok(messages)
    }
}

#[async_trait]
impl MessageRepository for MongoMessageRepository {
    async fn insert(&self, message: &Message) -> super::Result<ObjectId> {
        self.collection
            .insert_one(message)
            .await?
            .inserted_id
            .as_object_id()
            .ok_or(super::Error::IdNotPresent)
    }

    async fn find_by_conversation_id(
        &self,
        conversation_id: &conversation::Id,
    ) -> super::Result<Vec<Message>> {
        Self::fetch(&self.collection, conversation_id).await
    }

    async fn subscribe(
        &self,
        conversation_id: &conversation::Id,
    ) -> super::Result<Subscription<Message>> {
        // messages are never updated in place, so insert events (which always
        // carry the full document) are the only ones this stream sees
        let changes = self
            .collection
            .watch()
            .pipeline(vec![doc! { "$match": {
                "fullDocument.conversation_id": conversation_id,
            }}])
            .await?
            .map_ok(|_| ());

        let collection = self.collection.clone();
        let conversation_id = conversation_id.to_owned();

        Ok(Subscription::run(
            move || {
                let collection = collection.clone();
                let conversation_id = conversation_id.clone();
                async move { Self::fetch(&collection, &conversation_id).await }
            },
            changes,
        ))
    }
}
