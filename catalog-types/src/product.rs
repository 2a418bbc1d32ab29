use crate::PAGE_SIZE;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use typesafe_repository::async_ops::{Get, Select};
use typesafe_repository::macros::Id;
use typesafe_repository::prelude::*;
use typesafe_repository::{SelectBy, Selector};

pub mod service;

/// Catalog row. Rows are provisioned by bulk load and never mutated through the service.
#[derive(Id, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[Id(ref_id, get_id)]
pub struct Product {
    #[id]
    pub item_id: i64,
    pub title: Option<String>,
    /// Pre-formatted currency string, e.g. `"¥129.00"`.
    pub price: Option<String>,
    pub main_image: Option<String>,
    pub category: Option<i64>,
    pub shop_name: Option<String>,
    /// Products sharing this value form one QC image gallery.
    pub qc_image_group_map: Option<i64>,
    pub item_id_base: Option<i64>,
}

impl Product {
    pub fn qc_image_group(&self) -> Option<QcImageGroup> {
        self.qc_image_group_map.map(QcImageGroup)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductWithImages {
    #[serde(flatten)]
    pub product: Product,
    pub qc_images: Vec<String>,
}

impl ProductWithImages {
    /// Builds the gallery from every member of the product's QC group.
    /// Members without an image contribute an empty string so positions are kept.
    pub fn new(product: Product, group: Vec<Product>) -> Self {
        let qc_images = group
            .into_iter()
            .map(|p| p.main_image.unwrap_or_default())
            .collect();
        Self { product, qc_images }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QcImageGroup(pub i64);

/// One listing page, optionally restricted to a category code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub category: Option<i64>,
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    /// Page numbers start at 1; anything lower is treated as the first page.
    pub fn number(page: u32, category: Option<i64>) -> Self {
        let page = page.max(1);
        Self {
            category,
            limit: PAGE_SIZE,
            offset: (page - 1).saturating_mul(PAGE_SIZE),
        }
    }
}

pub struct ByQcImageGroup(pub QcImageGroup);

impl Selector for Page {}
impl Selector for ByQcImageGroup {}

impl SelectBy<Page> for Product {}
impl SelectBy<ByQcImageGroup> for Product {}

#[async_trait]
pub trait ProductRepository:
    Repository<Product, Error = anyhow::Error>
    + Get<Product>
    + Select<Product, Page>
    + Select<Product, ByQcImageGroup>
    + Send
    + Sync
{
}
