use crate::control::{ControllerError, Response};
use actix_web::get;
use actix_web::web::Path;
use actix_web::HttpResponse;
use mime::Mime;

const INDEX_HTML: &str = include_str!("../../static/index.html");
const PRODUCT_HTML: &str = include_str!("../../static/product.html");

static ASSETS: &[(&str, &str)] = &[
    ("/styles.css", include_str!("../../static/styles.css")),
    ("/app.js", include_str!("../../static/app.js")),
    ("/product.js", include_str!("../../static/product.js")),
    ("/index.html", INDEX_HTML),
    ("/product.html", PRODUCT_HTML),
];

pub fn content_type(path: &str) -> Mime {
    if path.ends_with(".css") {
        mime::TEXT_CSS
    } else if path.ends_with(".js") {
        mime::APPLICATION_JAVASCRIPT
    } else {
        mime::TEXT_HTML
    }
}

fn lookup(path: &str) -> Option<&'static str> {
    ASSETS
        .iter()
        .find(|(p, _)| *p == path)
        .map(|(_, body)| *body)
}

fn html(body: &'static str) -> HttpResponse {
    HttpResponse::Ok().content_type(mime::TEXT_HTML).body(body)
}

#[get("/")]
pub async fn index() -> Response {
    Ok(html(INDEX_HTML))
}

/// The id is parsed by `product.js`, the server only hands out the page.
#[get("/product/{id:.*}")]
pub async fn product_page() -> Response {
    Ok(html(PRODUCT_HTML))
}

#[get("/{file}")]
pub async fn asset(file: Path<String>) -> Response {
    let path = format!("/{}", file.into_inner());
    let body = lookup(&path).ok_or(ControllerError::NotFound)?;
    Ok(HttpResponse::Ok().content_type(content_type(&path)).body(body))
}
