use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::user::Sub;

use super::Condition;

#[derive(Clone, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub author: String,
    pub price: f64,
    pub condition: Condition,
    pub image: Option<String>,
    pub description: String,
    pub seller: String,
    pub seller_id: Sub,
    pub created_at: i64,
}

impl Book {
    pub fn new(request: CreateBookRequest, seller: &str, seller_id: Sub) -> Self {
        Self {
            id: None,
            title: request.title,
            author: request.author,
            price: request.price,
            condition: request.condition,
            image: request.image,
            description: request.description,
            seller: seller.to_owned(),
            seller_id,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub price: f64,
    pub condition: Condition,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize, Debug)]
pub struct BookDto {
    pub id: String,
    pub title: String,
    pub author: String,
    pub price: f64,
    pub condition: Condition,
    pub image: Option<String>,
    pub description: String,
    pub seller: String,
    pub seller_id: Sub,
    pub created_at: i64,
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: book.title,
            author: book.author,
            price: book.price,
            condition: book.condition,
            image: book.image,
            description: book.description,
            seller: book.seller,
            seller_id: book.seller_id,
            created_at: book.created_at,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "price-low")]
    PriceLowToHigh,
    #[serde(rename = "price-high")]
    PriceHighToLow,
    #[serde(rename = "title")]
    Title,
}

/// Browse filter. All criteria are optional and combined with AND; the
/// condition list is an OR within itself.
#[derive(Debug, Default, Deserialize)]
pub struct BookFilter {
    pub q: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    #[serde(default)]
    pub condition: Vec<Condition>,
    #[serde(default)]
    pub sort: SortBy,
}

impl BookFilter {
    pub fn apply(&self, books: Vec<Book>) -> Vec<Book> {
        let query = self.q.as_deref().unwrap_or_default().to_lowercase();
        let min = self.min_price.unwrap_or(0.0);
        let max = self.max_price.unwrap_or(f64::INFINITY);

        let mut books: Vec<Book> = books
            .into_iter()
            .filter(|b| {
                query.is_empty()
                    || b.title.to_lowercase().contains(&query)
                    || b.author.to_lowercase().contains(&query)
            })
            .filter(|b| b.price >= min && b.price <= max)
            .filter(|b| self.condition.is_empty() || self.condition.contains(&b.condition))
            .collect();

        match self.sort {
            SortBy::Newest => books.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortBy::PriceLowToHigh => books.sort_by(|a, b| a.price.total_cmp(&b.price)),
            SortBy::PriceHighToLow => books.sort_by(|a, b| b.price.total_cmp(&a.price)),
            SortBy::Title => books.sort_by(|a, b| a.title.cmp(&b.title)),
        }

        books
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, author: &str, price: f64, condition: Condition) -> Book {
        Book {
            id: Some(ObjectId::new()),
            title: title.to_owned(),
            author: author.to_owned(),
            price,
            condition,
            image: None,
            description: String::new(),
            seller: "Sam".into(),
            seller_id: Sub("local|sam".into()),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    fn shelf() -> Vec<Book> {
        vec![
            book("Dune", "Frank Herbert", 12.0, Condition::Good),
            book("Neuromancer", "William Gibson", 8.5, Condition::Fair),
            book("The Dispossessed", "Ursula K. Le Guin", 19.5, Condition::LikeNew),
        ]
    }

    #[test]
    fn search_matches_title_and_author_case_insensitively() {
        let filter = BookFilter {
            q: Some("gibson".into()),
            ..Default::default()
        };
        let found = filter.apply(shelf());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Neuromancer");
    }

    #[test]
    fn price_range_and_conditions_combine() {
        let filter = BookFilter {
            min_price: Some(10.0),
            condition: vec![Condition::Good, Condition::LikeNew],
            ..Default::default()
        };
        let found = filter.apply(shelf());
        let titles: Vec<_> = found.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles.len(), 2);
        assert!(titles.contains(&"Dune"));
        assert!(titles.contains(&"The Dispossessed"));
    }

    #[test]
    fn sorts_by_price_both_ways() {
        let filter = BookFilter {
            sort: SortBy::PriceLowToHigh,
            ..Default::default()
        };
        let prices: Vec<_> = filter.apply(shelf()).iter().map(|b| b.price).collect();
        assert_eq!(prices, vec![8.5, 12.0, 19.5]);

        let filter = BookFilter {
            sort: SortBy::PriceHighToLow,
            ..Default::default()
        };
        let prices: Vec<_> = filter.apply(shelf()).iter().map(|b| b.price).collect();
        assert_eq!(prices, vec![19.5, 12.0, 8.5]);
    }

    #[test]
    fn price_stays_numeric_through_deserialization() {
        let request: CreateBookRequest = serde_json::from_str(
            r#"{"title":"Dune","author":"Frank Herbert","price":19.5,"condition":"Like New"}"#,
        )
        .unwrap();

        assert_eq!(request.price, 19.5);
        assert_eq!(request.condition, Condition::LikeNew);
    }
}
