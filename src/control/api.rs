use crate::control::{ControllerError, Response};
use crate::{empty_string_as_none, empty_string_as_none_parse};
use actix::Addr;
use actix_web::get;
use actix_web::web::{Data, Path, Query};
use actix_web::HttpResponse;
use catalog_types::product::service::{CatalogService, GetProduct, ListProducts};
use catalog_types::product::Product;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none_parse")]
    pub page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProductsPage {
    pub products: Vec<Product>,
}

fn parse_category(raw: Option<&str>) -> Result<Option<i64>, ControllerError> {
    raw.map(|c| {
        c.trim().parse::<i64>().map_err(|_| ControllerError::InvalidInput {
            field: "category".to_string(),
            msg: format!("Unknown category {c}"),
        })
    })
    .transpose()
}

#[get("/api/products")]
pub async fn list_products(
    catalog: Data<Addr<CatalogService>>,
    params: Query<ProductsQuery>,
) -> Response {
    let category = parse_category(params.category.as_deref())?;
    let page = u32::try_from(params.page.unwrap_or(1).max(1)).unwrap_or(u32::MAX);
    let products = catalog.send(ListProducts { category, page }).await??;
    Ok(HttpResponse::Ok().json(ProductsPage { products }))
}

#[get("/api/product/{id:.*}")]
pub async fn get_product(catalog: Data<Addr<CatalogService>>, id: Path<String>) -> Response {
    let id = id.into_inner();
    let segment = id.rsplit('/').next().unwrap_or_default().trim();
    if segment.is_empty() {
        return Err(ControllerError::InvalidInput {
            field: "id".to_string(),
            msg: "Invalid product ID".to_string(),
        });
    }
    let id = segment
        .parse::<i64>()
        .map_err(|_| ControllerError::NotFound)?;
    let product = catalog
        .send(GetProduct(id))
        .await??
        .ok_or(ControllerError::NotFound)?;
    Ok(HttpResponse::Ok().json(product))
}
