//! Catalog endpoints: albums, books, tracks, categories, products, shops.
//!
//! Lists are public; creates, updates, and deletes require a bearer token.
//! Updates are full replacements, matching the backend's PUT semantics.

use tracing::{info, instrument};

use crate::client::BackendClient;
use crate::error::Result;
use crate::types::{
    Album, AlbumDraft, AlbumListResponse, Book, BookDraft, BookListResponse, Category,
    CategoryDraft, CategoryListResponse, Listing, Product, ProductDraft, ProductListResponse,
    Shop, ShopDraft, ShopListResponse, Track, TrackDraft, TrackListResponse,
};

impl BackendClient {
    // -------------------------------------------------------------------------
    // Albums
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn list_albums(&self) -> Result<Listing<Album>> {
        let response: AlbumListResponse = self.get_json("/albums", None).await?;
        info!(count = response.albums.len(), "Listed albums");
        Ok(Listing::new(response.albums, response.total_albums))
    }

    #[instrument(skip(self, token, draft), fields(title = %draft.title))]
    pub async fn create_album(&self, token: &str, draft: &AlbumDraft) -> Result<Album> {
        self.post_json("/albums", Some(token), draft).await
    }

    #[instrument(skip(self, token, draft))]
    pub async fn update_album(&self, token: &str, id: u64, draft: &AlbumDraft) -> Result<Album> {
        self.put_json(&format!("/albums/{}", id), Some(token), draft)
            .await
    }

    #[instrument(skip(self, token))]
    pub async fn delete_album(&self, token: &str, id: u64) -> Result<()> {
        self.delete(&format!("/albums/{}", id), Some(token)).await
    }

    // -------------------------------------------------------------------------
    // Books
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn list_books(&self) -> Result<Listing<Book>> {
        let response: BookListResponse = self.get_json("/books", None).await?;
        info!(count = response.books.len(), "Listed books");
        Ok(Listing::new(response.books, response.total_books))
    }

    #[instrument(skip(self, token, draft), fields(title = %draft.title))]
    pub async fn create_book(&self, token: &str, draft: &BookDraft) -> Result<Book> {
        self.post_json("/books", Some(token), draft).await
    }

    #[instrument(skip(self, token, draft))]
    pub async fn update_book(&self, token: &str, id: u64, draft: &BookDraft) -> Result<Book> {
        self.put_json(&format!("/books/{}", id), Some(token), draft)
            .await
    }

    #[instrument(skip(self, token))]
    pub async fn delete_book(&self, token: &str, id: u64) -> Result<()> {
        self.delete(&format!("/books/{}", id), Some(token)).await
    }

    // -------------------------------------------------------------------------
    // Tracks
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn list_tracks(&self) -> Result<Listing<Track>> {
        let response: TrackListResponse = self.get_json("/tracks", None).await?;
        info!(count = response.tracks.len(), "Listed tracks");
        Ok(Listing::new(response.tracks, response.total_tracks))
    }

    #[instrument(skip(self, token, draft), fields(title = %draft.title))]
    pub async fn create_track(&self, token: &str, draft: &TrackDraft) -> Result<Track> {
        self.post_json("/tracks", Some(token), draft).await
    }

    #[instrument(skip(self, token, draft))]
    pub async fn update_track(&self, token: &str, id: u64, draft: &TrackDraft) -> Result<Track> {
        self.put_json(&format!("/tracks/{}", id), Some(token), draft)
            .await
    }

    #[instrument(skip(self, token))]
    pub async fn delete_track(&self, token: &str, id: u64) -> Result<()> {
        self.delete(&format!("/tracks/{}", id), Some(token)).await
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Listing<Category>> {
        let response: CategoryListResponse = self.get_json("/categories", None).await?;
        info!(count = response.categories.len(), "Listed categories");
        Ok(Listing::new(response.categories, response.total_categories))
    }

    #[instrument(skip(self, token, draft), fields(name = %draft.name))]
    pub async fn create_category(&self, token: &str, draft: &CategoryDraft) -> Result<Category> {
        self.post_json("/categories", Some(token), draft).await
    }

    #[instrument(skip(self, token, draft))]
    pub async fn update_category(
        &self,
        token: &str,
        id: u64,
        draft: &CategoryDraft,
    ) -> Result<Category> {
        self.put_json(&format!("/categories/{}", id), Some(token), draft)
            .await
    }

    #[instrument(skip(self, token))]
    pub async fn delete_category(&self, token: &str, id: u64) -> Result<()> {
        self.delete(&format!("/categories/{}", id), Some(token))
            .await
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// List products, optionally narrowed server-side by a search term.
    #[instrument(skip(self))]
    pub async fn list_products(&self, search: Option<&str>) -> Result<Listing<Product>> {
        let path = match search {
            Some(term) => format!("/products?search={}", urlencoding::encode(term)),
            None => "/products".to_string(),
        };

        let response: ProductListResponse = self.get_json(&path, None).await?;
        info!(count = response.products.len(), "Listed products");
        Ok(Listing::new(response.products, response.total_products))
    }

    #[instrument(skip(self, token, draft), fields(name = %draft.name))]
    pub async fn create_product(&self, token: &str, draft: &ProductDraft) -> Result<Product> {
        self.post_json("/products", Some(token), draft).await
    }

    #[instrument(skip(self, token, draft))]
    pub async fn update_product(
        &self,
        token: &str,
        id: u64,
        draft: &ProductDraft,
    ) -> Result<Product> {
        self.put_json(&format!("/products/{}", id), Some(token), draft)
            .await
    }

    #[instrument(skip(self, token))]
    pub async fn delete_product(&self, token: &str, id: u64) -> Result<()> {
        self.delete(&format!("/products/{}", id), Some(token)).await
    }

    // -------------------------------------------------------------------------
    // Shops
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn list_shops(&self) -> Result<Listing<Shop>> {
        let response: ShopListResponse = self.get_json("/shops", None).await?;
        info!(count = response.shops.len(), "Listed shops");
        Ok(Listing::new(response.shops, response.total_shops))
    }

    #[instrument(skip(self, token, draft), fields(name = %draft.name))]
    pub async fn create_shop(&self, token: &str, draft: &ShopDraft) -> Result<Shop> {
        self.post_json("/shops", Some(token), draft).await
    }

    #[instrument(skip(self, token, draft))]
    pub async fn update_shop(&self, token: &str, id: u64, draft: &ShopDraft) -> Result<Shop> {
        self.put_json(&format!("/shops/{}", id), Some(token), draft)
            .await
    }

    #[instrument(skip(self, token))]
    pub async fn delete_shop(&self, token: &str, id: u64) -> Result<()> {
        self.delete(&format!("/shops/{}", id), Some(token)).await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::test_support::{json_response, MockHttpClient};
    use crate::client::BackendClient;
    use crate::types::{CategoryDraft, ProductDraft};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_albums_converts_envelope() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.ends_with("/albums"));
            Ok(json_response(
                200,
                r#"{
                    "albums": [
                        {"id": 1, "title": "Night Signals", "artist": "Mara Voss", "price": 18.5}
                    ],
                    "totalAlbums": 1
                }"#,
            ))
        });

        let client = BackendClient::new(Arc::new(mock_http), "https://api.shop.example.com");
        let listing = client.list_albums().await.unwrap();

        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.items[0].title, "Night Signals");
        assert_eq!(listing.total, 1);
    }

    #[tokio::test]
    async fn test_list_products_encodes_search_term() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.ends_with("/products?search=blue%20vinyl"));
            Ok(json_response(200, r#"{"products": [], "totalProducts": 0}"#))
        });

        let client = BackendClient::new(Arc::new(mock_http), "https://api.shop.example.com");
        let listing = client.list_products(Some("blue vinyl")).await.unwrap();

        assert!(listing.items.is_empty());
    }

    #[tokio::test]
    async fn test_create_category_posts_with_token() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.ends_with("/categories"));
            assert!(req.headers.contains_key("Authorization"));

            let body = req.body.expect("body present");
            let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(value["name"], "Vinyl");

            Ok(json_response(200, r#"{"id": 7, "name": "Vinyl"}"#))
        });

        let client = BackendClient::new(Arc::new(mock_http), "https://api.shop.example.com");
        let category = client
            .create_category(
                "tok",
                &CategoryDraft {
                    name: "Vinyl".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(category.id, 7);
    }

    #[tokio::test]
    async fn test_update_product_puts_to_id_path() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.ends_with("/products/5"));
            Ok(json_response(
                200,
                r#"{"id": 5, "name": "Tote Bag", "price": 12.0}"#,
            ))
        });

        let client = BackendClient::new(Arc::new(mock_http), "https://api.shop.example.com");
        let product = client
            .update_product(
                "tok",
                5,
                &ProductDraft {
                    name: "Tote Bag".to_string(),
                    price: 12.0,
                    description: None,
                    category_id: None,
                    shop_id: None,
                    image_url: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(product.name, "Tote Bag");
    }

    #[tokio::test]
    async fn test_delete_category_issues_delete() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.ends_with("/categories/3"));
            assert_eq!(req.method, bridge_traits::http::HttpMethod::Delete);
            Ok(json_response(200, "{}"))
        });

        let client = BackendClient::new(Arc::new(mock_http), "https://api.shop.example.com");
        client.delete_category("tok", 3).await.unwrap();
    }
}
