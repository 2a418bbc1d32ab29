use actix::prelude::*;
use actix_web::{web::Data, App, HttpServer};
use anyhow::Context as AnyhowContext;
use catalog_types::product::service::CatalogService;
use catalog_types::product::ProductRepository;
use fashion_guide::{config, control, product};
use log_error::LogError;
use std::env;
use std::sync::Arc;
use tokio_rusqlite::Connection;

#[actix_web::main]
async fn main() -> Result<(), anyhow::Error> {
    if let Err(env::VarError::NotPresent) = env::var("RUST_LOG") {
        env::set_var("RUST_LOG", "INFO");
    }
    pretty_env_logger::formatted_timed_builder()
        .parse_default_env()
        .init();

    config::load_dotenv()?;
    let settings = config::Settings::from_env();

    if let Some(dir) = settings.database.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Unable to create {}", dir.display()))?;
    }
    let conn = Connection::open(&settings.database)
        .await
        .with_context(|| format!("Unable to open {}", settings.database.display()))?;
    let repo = Arc::new(product::SqliteProductRepository::init(conn).await?);

    if let Some(path) = &settings.import_csv {
        let count = product::import_products(path, repo.clone())
            .await
            .with_context(|| format!("Unable to import products from {}", path.display()))
            .log_error("Product import failed");
        if let Some(count) = count {
            log::info!("Imported {count} products from {}", path.display());
        }
    }

    let repo: Arc<dyn ProductRepository> = repo;
    let catalog = CatalogService::new(repo).start();

    log::info!(
        "Serving catalog from {} on {}:{}",
        settings.database.display(),
        settings.bind_addr,
        settings.port
    );
    let addr = (settings.bind_addr.clone(), settings.port);
    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(Data::new(catalog.clone()))
            .configure(control::configure)
    })
    .bind(addr)
    .with_context(|| {
        format!(
            "Failed to bind server to {}:{}. Is the port already in use?",
            settings.bind_addr, settings.port
        )
    })?
    .run()
    .await?;
    Ok(())
}
