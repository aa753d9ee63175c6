use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;

use crate::user::Sub;

use super::model::Book;
use super::Id;

const BOOKS_COLLECTION: &str = "books";

#[async_trait]
pub trait BookRepository {
    async fn insert(&self, book: &Book) -> super::Result<ObjectId>;

    async fn find_all(&self) -> super::Result<Vec<Book>>;

    async fn find_by_id(&self, id: &Id) -> super::Result<Book>;

    async fn find_by_seller(&self, seller_id: &Sub) -> super::Result<Vec<Book>>;

    async fn delete(&self, id: &Id) -> super::Result<()>;
}

pub struct MongoBookRepository {
    collection: mongodb::Collection<Book>,
}

impl MongoBookRepository {
    pub fn new(database: &mongodb::Database) -> Self {
        Self {
            collection: database.collection(BOOKS_COLLECTION),
        }
    }
}

#[async_trait]
impl BookRepository for MongoBookRepository {
    async fn insert(&self, book: &Book) -> super::Result<ObjectId> {
        self.collection
            .insert_one(book)
            .await?
            .inserted_id
            .as_object_id()
            .ok_or(super::Error::IdNotPresent)
    }

    async fn find_all(&self) -> super::Result<Vec<Book>> {
        let cursor = self.collection.find(doc! {}).await?;
        let books = cursor.try_collect::<Vec<Book>>().await?;
        Ok(books)
    }

    async fn find_by_id(&self, id: &Id) -> super::Result<Book> {
        self.collection
            .find_one(doc! { "_id": id.oid()? })
            .await?
            .ok_or(super::Error::NotFound(Some(id.to_owned())))
    }

    async fn find_by_seller(&self, seller_id: &Sub) -> super::Result<Vec<Book>> {
        let cursor = self
            .collection
            .find(doc! { "seller_id": seller_id })
            .sort(doc! { "created_at": -1 })
            .await?;

        let books = cursor.try_collect::<Vec<Book>>().await?;
        Ok(books)
    }

    async fn delete(&self, id: &Id) -> super::Result<()> {
        let result = self.collection.delete_one(doc! { "_id": id.oid()? }).await?;

        if result.deleted_count == 0 {
            return Err(super::Error::NotFound(Some(id.to_owned())));
        }

        Ok(())
    }
}
