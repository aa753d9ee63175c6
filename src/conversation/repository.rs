use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::FullDocumentType;

use crate::live::Subscription;
use crate::user::Sub;

use super::model::Conversation;
use super::Id;

const CONVERSATIONS_COLLECTION: &str = "conversations";

#[async_trait]
pub trait ConversationRepository {
    /// Updates the summary record of an existing conversation. Reports
    /// [`Error::NotFound`](super::Error::NotFound) when no record matches,
    /// which is the only failure callers may treat as "create instead".
    async fn update_on_message(
        &self,
        id: &Id,
        last_message: &str,
        recipient: &Sub,
    ) -> super::Result<()>;

    async fn insert(&self, conversation: &Conversation) -> super::Result<()>;

    async fn find_by_participant(&self, sub: &Sub) -> super::Result<Vec<Conversation>>;

    async fn mark_read(&self, id: &Id, sub: &Sub) -> super::Result<()>;

    /// Live view of the user's conversations: the current set immediately,
    /// then a fresh snapshot on every change.
    async fn subscribe(&self, sub: &Sub) -> super::Result<Subscription<Conversation>>;
}

pub struct MongoConversationRepository {
    collection: mongodb::Collection<Conversation>,
}

impl MongoConversationRepository {
    pub fn new(database: &mongodb::Database) -> Self {
        Self {
            collection: database.collection(CONVERSATIONS_COLLECTION),
        }
    }

    async fn fetch_by_participant(
        collection: &mongodb::Collection<Conversation>,
        sub: &Sub,
    ) -> super::Result<Vec<Conversation>> {
        let cursor = collection
            .find(doc! { "participants": sub })
            .sort(doc! { "last_message_time": -1 })
            .await?;

        let conversations = cursor.try_collect::<Vec<Conversation>>().await?;
        Ok(conversations)
    }
}

#[async_trait]
impl ConversationRepository for MongoConversationRepository {
    async fn update_on_message(
        &self,
        id: &Id,
        last_message: &str,
        recipient: &Sub,
    ) -> super::Result<()> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "last_message": last_message,
                    "last_message_time": chrono::Utc::now().timestamp_millis(),
                    "unread_by": [recipient],
                }},
            )
            .await?;

        if result.matched_count == 0 {
            return Err(super::Error::NotFound(Some(id.to_owned())));
        }

        Ok(())
    }

    async fn insert(&self, conversation: &Conversation) -> super::Result<()> {
        self.collection.insert_one(conversation).await?;
        Ok(())
    }

    async fn find_by_participant(&self, sub: &Sub) -> super::Result<Vec<Conversation>> {
        Self::fetch_by_participant(&self.collection, sub).await
    }

    async fn mark_read(&self, id: &Id, sub: &Sub) -> super::Result<()> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id, "participants": sub },
                doc! { "$pull": { "unread_by": sub } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(super::Error::NotFound(Some(id.to_owned())));
        }

        Ok(())
    }

    async fn subscribe(&self, sub: &Sub) -> super::Result<Subscription<Conversation>> {
        // update events carry the full document only when looked up; without
        // this the $match drops them and the view goes stale after the record
        // is first inserted.
        let changes = self
            .collection
            .watch()
            .full_document(FullDocumentType::UpdateLookup)
            .pipeline(vec![doc! { "$match": {
                "fullDocument.participants": sub,
            }}])
            .await?
            .map_ok(|_| ());

        let collection = self.collection.clone();
        let sub = sub.to_owned();

        Ok(Subscription::run(
            move || {
                let collection = collection.clone();
                let sub = sub.clone();
                async move { Self::fetch_by_participant(&collection, &sub).await }
            },
            changes,
        ))
    }
}
