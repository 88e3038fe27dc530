//! Menu reads: categories, dishes and search. Public endpoints.

use shared::models::{Category, Dish, SearchResults};

use crate::ClientResult;
use crate::client::HttpClient;

const CATEGORIES_PATH: &str = "/api/categorias";
const DISHES_PATH: &str = "/api/pratos";
const SEARCH_PATH: &str = "/api/search";

#[derive(Debug, Clone)]
pub struct MenuService<C> {
    http: C,
}

impl<C: HttpClient> MenuService<C> {
    pub fn new(http: C) -> Self {
        Self { http }
    }

    pub async fn categories(&self) -> ClientResult<Vec<Category>> {
        self.http.get(CATEGORIES_PATH).await
    }

    /// Dishes, optionally restricted to one category
    pub async fn dishes(&self, category_id: Option<i64>) -> ClientResult<Vec<Dish>> {
        let path = match category_id {
            Some(id) => format!("{}?categoriaId={}", DISHES_PATH, id),
            None => DISHES_PATH.to_string(),
        };
        self.http.get(&path).await
    }

    pub async fn dish(&self, id: i64) -> ClientResult<Dish> {
        self.http.get(&format!("{}/{}", DISHES_PATH, id)).await
    }

    /// Global search. A blank term returns nothing without asking the backend.
    pub async fn search(&self, term: &str) -> ClientResult<SearchResults> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(SearchResults::default());
        }
        let path = format!("{}?q={}", SEARCH_PATH, urlencoding::encode(term));
        self.http.get(&path).await
    }
}

