use crate::product::{ByQcImageGroup, Page, Product, ProductRepository, ProductWithImages};
use actix::prelude::*;
use anyhow::Context as AnyhowContext;
use std::sync::Arc;
use typesafe_repository::IdentityOf;

/// Read-only query layer over the product store.
pub struct CatalogService {
    repo: Arc<dyn ProductRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }
}

impl Actor for CatalogService {
    type Context = Context<Self>;
}

/// Listing page request. An empty result means there are no more pages.
#[derive(Message)]
#[rtype(result = "Result<Vec<Product>, anyhow::Error>")]
pub struct ListProducts {
    pub category: Option<i64>,
    pub page: u32,
}

/// Single product lookup; `None` when no row has the given id.
#[derive(Message)]
#[rtype(result = "Result<Option<ProductWithImages>, anyhow::Error>")]
pub struct GetProduct(pub IdentityOf<Product>);

impl Handler<ListProducts> for CatalogService {
    type Result = ResponseActFuture<Self, Result<Vec<Product>, anyhow::Error>>;

    fn handle(
        &mut self,
        ListProducts { category, page }: ListProducts,
        _: &mut Self::Context,
    ) -> Self::Result {
        let repo = self.repo.clone();
        Box::pin(
            async move {
                repo.select(&Page::number(page, category))
                    .await
                    .with_context(|| format!("Unable to list products on page {page}"))
            }
            .into_actor(self),
        )
    }
}

impl Handler<GetProduct> for CatalogService {
    type Result = ResponseActFuture<Self, Result<Option<ProductWithImages>, anyhow::Error>>;

    fn handle(&mut self, GetProduct(id): GetProduct, _: &mut Self::Context) -> Self::Result {
        let repo = self.repo.clone();
        Box::pin(
            async move {
                let product = match repo
                    .get_one(&id)
                    .await
                    .with_context(|| format!("Unable to get product {id}"))?
                {
                    Some(p) => p,
                    None => return Ok(None),
                };
                let group = match product.qc_image_group() {
                    Some(group) => repo
                        .select(&ByQcImageGroup(group))
                        .await
                        .with_context(|| format!("Unable to load QC images for product {id}"))?,
                    None => vec![],
                };
                log::debug!("Product {id} has {} QC images", group.len());
                Ok(Some(ProductWithImages::new(product, group)))
            }
            .into_actor(self),
        )
    }
}
