use anyhow::Context as AnyhowContext;
use async_trait::async_trait;
use catalog_types::product::{Product, ProductWithImages};
use derive_more::Constructor;
use reqwest::Url;

pub mod gallery;
pub mod listing;
pub mod trigger;

/// Read operations of the catalog API, as seen from a page.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn fetch_page(&self, category: Option<&str>, page: u32)
        -> anyhow::Result<Vec<Product>>;
    async fn fetch_product(&self, id: &str) -> anyhow::Result<ProductWithImages>;
}

#[derive(Clone, Constructor)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base: Url,
}

#[derive(serde::Deserialize)]
struct ProductsPage {
    products: Vec<Product>,
}

impl HttpCatalogClient {
    pub fn products_url(&self, category: Option<&str>, page: u32) -> anyhow::Result<Url> {
        let mut url = self.base.join("/api/products")?;
        url.query_pairs_mut()
            .append_pair("category", category.unwrap_or_default())
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    pub fn product_url(&self, id: &str) -> anyhow::Result<Url> {
        Ok(self.base.join(&format!("/api/product/{id}"))?)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn fetch_page(
        &self,
        category: Option<&str>,
        page: u32,
    ) -> anyhow::Result<Vec<Product>> {
        let url = self.products_url(category, page)?;
        let page: ProductsPage = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("Unable to decode {url}"))?;
        Ok(page.products)
    }

    async fn fetch_product(&self, id: &str) -> anyhow::Result<ProductWithImages> {
        let url = self.product_url(id)?;
        self.client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("Unable to decode {url}"))
    }
}

/// Product id from a `/product/<id>` page path: the last segment, digits only.
pub fn product_id_from_path(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next()?;
    if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
        Some(segment)
    } else {
        None
    }
}
