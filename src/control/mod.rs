use actix_web::http::header::ContentType;
use actix_web::web::ServiceConfig;
use actix_web::HttpResponse;
use anyhow::anyhow;
use derive_more::{Display, Error};

pub mod api;
pub mod assets;

pub type Response = Result<HttpResponse, ControllerError>;

#[derive(Debug, Display, Error)]
pub enum ControllerError {
    NotFound,
    #[error(ignore)]
    InternalServerError(anyhow::Error),
    #[error(ignore)]
    #[display("Invalid field {field}")]
    InvalidInput {
        field: String,
        msg: String,
    },
}

impl From<anyhow::Error> for ControllerError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalServerError(err)
    }
}

impl From<actix::MailboxError> for ControllerError {
    fn from(err: actix::MailboxError) -> Self {
        Self::InternalServerError(anyhow!(err))
    }
}

impl actix_web::error::ResponseError for ControllerError {
    fn error_response(&self) -> HttpResponse {
        use ControllerError::*;
        match self {
            NotFound => {
                log::warn!("{self}");
                HttpResponse::NotFound()
                    .content_type(ContentType::plaintext())
                    .body("Not found")
            }
            InternalServerError(err) => {
                log::error!("{err:?}");
                HttpResponse::InternalServerError()
                    .content_type(ContentType::plaintext())
                    .body("Internal Server Error")
            }
            InvalidInput { field, msg } => {
                log::warn!("Invalid field {field}: {msg}");
                HttpResponse::BadRequest()
                    .content_type(ContentType::plaintext())
                    .body(msg.clone())
            }
        }
    }
}

pub async fn not_found() -> Response {
    Err(ControllerError::NotFound)
}

/// Registers every catalog route. Unmatched paths fall through to [`not_found`].
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(api::list_products)
        .service(api::get_product)
        .service(assets::index)
        .service(assets::product_page)
        .service(assets::asset)
        .default_service(actix_web::web::route().to(not_found));
}
