use async_trait::async_trait;
use catalog_types::product::{ByQcImageGroup, Page, Product, ProductRepository, QcImageGroup};
use futures::stream::StreamExt;
use rusqlite::{params, Transaction, TransactionBehavior};
use std::sync::Arc;
use tokio_rusqlite::Connection;
use typesafe_repository::async_ops::{Get, Save, Select};
use typesafe_repository::prelude::*;
use typesafe_repository::IdentityOf;

const COLUMNS: &str =
    "item_id, title, price, main_image, category, shop_name, qc_image_group_map, item_id_base";

fn row_to_product(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        item_id: row.get(0)?,
        title: row.get(1)?,
        price: row.get(2)?,
        main_image: row.get(3)?,
        category: row.get(4)?,
        shop_name: row.get(5)?,
        qc_image_group_map: row.get(6)?,
        item_id_base: row.get(7)?,
    })
}

pub struct SqliteProductRepository {
    conn: Connection,
}

impl SqliteProductRepository {
    pub async fn init(conn: Connection) -> Result<Self, tokio_rusqlite::Error> {
        conn.call(|conn| {
            let _ = conn.pragma_update(None, "journal_mode", &"WAL");
            let _ = conn.pragma_update(None, "busy_timeout", &5000i64);
            let conn = Transaction::new(conn, TransactionBehavior::Deferred)?;
            conn.execute(
                "CREATE TABLE IF NOT EXISTS product (
                    item_id INTEGER PRIMARY KEY,
                    title TEXT,
                    price TEXT,
                    main_image TEXT,
                    category INTEGER,
                    shop_name TEXT,
                    qc_image_group_map INTEGER,
                    item_id_base INTEGER
                )",
                [],
            )?;
            conn.execute(
                "CREATE INDEX IF NOT EXISTS product_category_idx ON product(category)",
                [],
            )?;
            conn.execute(
                "CREATE INDEX IF NOT EXISTS product_qc_group_idx ON product(qc_image_group_map)",
                [],
            )?;
            conn.commit()?;
            Ok(())
        })
        .await?;
        Ok(Self { conn })
    }
}

impl Repository<Product> for SqliteProductRepository {
    type Error = anyhow::Error;
}

#[async_trait]
impl Get<Product> for SqliteProductRepository {
    async fn get_one(&self, id: &IdentityOf<Product>) -> Result<Option<Product>, Self::Error> {
        let id = *id;
        Ok(self
            .conn
            .call(move |conn| {
                let mut stmt =
                    conn.prepare(&format!("SELECT {COLUMNS} FROM product WHERE item_id = ?1"))?;
                let mut p = stmt
                    .query_map([id], row_to_product)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(p.pop())
            })
            .await?)
    }
}

#[async_trait]
impl Select<Product, Page> for SqliteProductRepository {
    async fn select(&self, page: &Page) -> Result<Vec<Product>, Self::Error> {
        let Page {
            category,
            limit,
            offset,
        } = page.clone();
        Ok(self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM product
                     WHERE ?1 IS NULL OR category = ?1
                     ORDER BY item_id
                     LIMIT ?2 OFFSET ?3"
                ))?;
                let p = stmt
                    .query_map(params![category, limit, offset], row_to_product)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(p)
            })
            .await?)
    }
}

#[async_trait]
impl Select<Product, ByQcImageGroup> for SqliteProductRepository {
    async fn select(
        &self,
        ByQcImageGroup(QcImageGroup(group)): &ByQcImageGroup,
    ) -> Result<Vec<Product>, Self::Error> {
        let group = *group;
        Ok(self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM product WHERE qc_image_group_map = ?1 ORDER BY item_id"
                ))?;
                let p = stmt
                    .query_map([group], row_to_product)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(p)
            })
            .await?)
    }
}

#[async_trait]
impl Save<Product> for SqliteProductRepository {
    async fn save(&self, p: Product) -> Result<(), Self::Error> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    &format!(
                        "INSERT OR REPLACE INTO product ({COLUMNS})
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                    ),
                    params![
                        p.item_id,
                        p.title,
                        p.price,
                        p.main_image,
                        p.category,
                        p.shop_name,
                        p.qc_image_group_map,
                        p.item_id_base,
                    ],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

impl ProductRepository for SqliteProductRepository {}

/// Upserts every row of a product CSV export into the store.
/// Headers must match the product column names. Returns the number of rows written.
pub async fn import_products(
    path: &std::path::Path,
    repo: Arc<SqliteProductRepository>,
) -> Result<usize, anyhow::Error> {
    let data = tokio::fs::read_to_string(path).await?;
    let mut rdr = csv_async::AsyncReaderBuilder::new()
        .delimiter(b',')
        .create_deserializer(data.as_bytes());
    let mut records = rdr.deserialize::<Product>();
    let mut count = 0;
    while let Some(product) = records.next().await.transpose()? {
        repo.save(product).await?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(item_id: i64, category: Option<i64>, group: Option<i64>, image: &str) -> Product {
        Product {
            item_id,
            title: Some(format!("Item {item_id}")),
            price: Some("¥120.00".to_string()),
            main_image: Some(image.to_string()),
            category,
            shop_name: Some("Shop".to_string()),
            qc_image_group_map: group,
            item_id_base: Some(item_id * 10),
        }
    }

    async fn repo() -> SqliteProductRepository {
        let conn = Connection::open_in_memory().await.unwrap();
        SqliteProductRepository::init(conn).await.unwrap()
    }

    #[tokio::test]
    async fn pages_are_ordered_by_item_id() {
        let repo = repo().await;
        for i in (1..=45).rev() {
            repo.save(product(i, Some(1), None, "x.jpg")).await.unwrap();
        }
        let first = repo.select(&Page::number(1, None)).await.unwrap();
        assert_eq!(first.len(), 20);
        assert_eq!(first[0].item_id, 1);
        assert_eq!(first[19].item_id, 20);
        assert_eq!(repo.select(&Page::number(3, None)).await.unwrap().len(), 5);
        assert!(repo.select(&Page::number(4, None)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn category_filter_is_applied() {
        let repo = repo().await;
        repo.save(product(1, Some(2), None, "a.jpg")).await.unwrap();
        repo.save(product(2, Some(3), None, "b.jpg")).await.unwrap();
        repo.save(product(3, None, None, "c.jpg")).await.unwrap();
        let ids: Vec<_> = repo
            .select(&Page::number(1, Some(3)))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.item_id)
            .collect();
        assert_eq!(ids, vec![2]);
        assert_eq!(repo.select(&Page::number(1, None)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn qc_group_and_lookup() {
        let repo = repo().await;
        repo.save(product(1, Some(1), Some(5), "a.jpg")).await.unwrap();
        repo.save(product(2, Some(1), Some(5), "b.jpg")).await.unwrap();
        repo.save(product(3, Some(1), None, "c.jpg")).await.unwrap();

        let group = repo.select(&ByQcImageGroup(QcImageGroup(5))).await.unwrap();
        let images: Vec<_> = group.into_iter().filter_map(|p| p.main_image).collect();
        assert_eq!(images, vec!["a.jpg".to_string(), "b.jpg".to_string()]);

        assert_eq!(repo.get_one(&3).await.unwrap().unwrap().qc_image_group_map, None);
        assert!(repo.get_one(&99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn imports_csv_rows() {
        let dir = std::env::temp_dir().join(format!("catalog-import-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("products.csv");
        std::fs::write(
            &path,
            "item_id,title,price,main_image,category,shop_name,qc_image_group_map,item_id_base\n\
             1,Jacket,¥300.00,a.jpg,4,Shop A,5,100\n\
             2,Hoodie,¥200.00,,4,Shop B,,\n",
        )
        .unwrap();
        let repo = Arc::new(repo().await);
        assert_eq!(import_products(&path, repo.clone()).await.unwrap(), 2);

        let hoodie = repo.get_one(&2).await.unwrap().unwrap();
        assert_eq!(hoodie.title.as_deref(), Some("Hoodie"));
        assert_eq!(hoodie.qc_image_group_map, None);
        assert_eq!(hoodie.main_image, None);
        assert_eq!(repo.get_one(&1).await.unwrap().unwrap().item_id_base, Some(100));
        let _ = std::fs::remove_dir_all(dir);
    }
}
