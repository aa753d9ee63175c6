use log::debug;

use crate::auth;

use super::model::{Book, BookDto, BookFilter, CreateBookRequest};
use super::{Id, Repository};

#[derive(Clone)]
pub struct BookService {
    repository: Repository,
}

impl BookService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }
}

impl BookService {
    pub async fn create(
        &self,
        auth_user: &auth::User,
        request: CreateBookRequest,
    ) -> super::Result<BookDto> {
        if request.title.trim().is_empty() {
            return Err(super::Error::MissingField("title"));
        }
        if request.author.trim().is_empty() {
            return Err(super::Error::MissingField("author"));
        }
        if !request.price.is_finite() || request.price < 0.0 {
            return Err(super::Error::InvalidPrice(request.price));
        }

        let book = Book::new(request, auth_user.label(), auth_user.sub().to_owned());
        let id = self.repository.insert(&book).await?;

        debug!("{} listed book {id}", auth_user.sub());

        Ok(BookDto::from(Book {
            id: Some(id),
            ..book
        }))
    }

    pub async fn find(&self, filter: &BookFilter) -> super::Result<Vec<BookDto>> {
        let books = self.repository.find_all().await?;
        Ok(filter.apply(books).into_iter().map(BookDto::from).collect())
    }

    pub async fn find_by_id(&self, id: &Id) -> super::Result<BookDto> {
        self.repository.find_by_id(id).await.map(BookDto::from)
    }

    pub async fn find_by_seller(&self, auth_user: &auth::User) -> super::Result<Vec<BookDto>> {
        let books = self.repository.find_by_seller(auth_user.sub()).await?;
        Ok(books.into_iter().map(BookDto::from).collect())
    }

    /// Only the seller may remove their listing; enforced here, not in any UI.
    pub async fn delete(&self, auth_user: &auth::User, id: &Id) -> super::Result<()> {
        let book = self.repository.find_by_id(id).await?;

        if book.seller_id != *auth_user.sub() {
            return Err(super::Error::NotOwner);
        }

        self.repository.delete(id).await
    }
}
