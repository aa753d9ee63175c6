use axum::extract::{Path, State};
use axum::{Extension, Json};
use axum_extra::extract::Query;

use crate::auth;

use super::model::{BookDto, BookFilter, CreateBookRequest};
use super::service::BookService;
use super::Id;

pub async fn create(
    Extension(auth_user): Extension<auth::User>,
    book_service: State<BookService>,
    Json(request): Json<CreateBookRequest>,
) -> crate::Result<Json<BookDto>> {
    let book = book_service.create(&auth_user, request).await?;
    Ok(Json(book))
}

pub async fn find_all(
    Query(filter): Query<BookFilter>,
    book_service: State<BookService>,
) -> crate::Result<Json<Vec<BookDto>>> {
    let books = book_service.find(&filter).await?;
    Ok(Json(books))
}

pub async fn find_one(
    Path(id): Path<Id>,
    book_service: State<BookService>,
) -> crate::Result<Json<BookDto>> {
    let book = book_service.find_by_id(&id).await?;
    Ok(Json(book))
}

pub async fn find_mine(
    Extension(auth_user): Extension<auth::User>,
    book_service: State<BookService>,
) -> crate::Result<Json<Vec<BookDto>>> {
    let books = book_service.find_by_seller(&auth_user).await?;
    Ok(Json(books))
}

pub async fn delete(
    Extension(auth_user): Extension<auth::User>,
    Path(id): Path<Id>,
    book_service: State<BookService>,
) -> crate::Result<()> {
    book_service.delete(&auth_user, &id).await?;
    Ok(())
}
