use crate::trigger::NearBottom;
use crate::CatalogApi;
use catalog_types::product::Product;
use log_error::LogError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Appended(usize),
    /// An empty page came back; no further loads will be issued.
    Exhausted,
    /// The fetch failed. State is left as it was before the load.
    Failed,
    /// A load was already in flight or the pages ran out.
    Skipped,
}

/// Pagination state of one listing page instance.
#[derive(Debug, Clone)]
pub struct Listing {
    category: Option<String>,
    current_page: u32,
    loaded: bool,
    is_loading: bool,
    has_more: bool,
    cards: Vec<Product>,
}

impl Listing {
    pub fn new(category: Option<String>) -> Self {
        Self {
            category,
            current_page: 1,
            loaded: false,
            is_loading: false,
            has_more: true,
            cards: vec![],
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn cards(&self) -> &[Product] {
        &self.cards
    }

    /// Claims the next load. Returns the page to request, or `None` while a load is
    /// in flight or after the last page.
    pub fn begin_load(&mut self) -> Option<u32> {
        if self.is_loading || !self.has_more {
            return None;
        }
        self.is_loading = true;
        Some(if self.loaded {
            self.current_page + 1
        } else {
            self.current_page
        })
    }

    pub fn finish_load(
        &mut self,
        page: u32,
        result: anyhow::Result<Vec<Product>>,
    ) -> LoadOutcome {
        self.is_loading = false;
        let Some(products) = result.log_error("Error loading products") else {
            return LoadOutcome::Failed;
        };
        if products.is_empty() {
            self.has_more = false;
            return LoadOutcome::Exhausted;
        }
        let count = products.len();
        self.cards.extend(products);
        self.current_page = page;
        self.loaded = true;
        LoadOutcome::Appended(count)
    }

    pub async fn load_next(&mut self, api: &dyn CatalogApi) -> LoadOutcome {
        let Some(page) = self.begin_load() else {
            return LoadOutcome::Skipped;
        };
        let result = api.fetch_page(self.category.as_deref(), page).await;
        self.finish_load(page, result)
    }

    /// Loads the first page, then one more page per trigger event until the
    /// listing is exhausted or the trigger closes.
    pub async fn run<T: NearBottom>(&mut self, api: &dyn CatalogApi, trigger: &mut T) {
        if let LoadOutcome::Appended(_) = self.load_next(api).await {
            trigger.rewatch();
        }
        while self.has_more && trigger.wait().await {
            if let LoadOutcome::Appended(_) = self.load_next(api).await {
                trigger.rewatch();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::{ManualTrigger, Proximity, ScrollPosition, ScrollTrigger};
    use async_trait::async_trait;
    use catalog_types::product::ProductWithImages;
    use catalog_types::PAGE_SIZE;
    use std::sync::Mutex;

    struct FakeApi {
        total: i64,
        requests: Mutex<Vec<(Option<String>, u32)>>,
        fail_next: Mutex<bool>,
    }

    impl FakeApi {
        fn new(total: i64) -> Self {
            Self {
                total,
                requests: Mutex::new(vec![]),
                fail_next: Mutex::new(false),
            }
        }

        fn pages(&self) -> Vec<u32> {
            self.requests.lock().unwrap().iter().map(|(_, p)| *p).collect()
        }
    }

    fn product(item_id: i64) -> Product {
        Product {
            item_id,
            title: Some(format!("Item {item_id}")),
            price: None,
            main_image: None,
            category: None,
            shop_name: None,
            qc_image_group_map: None,
            item_id_base: None,
        }
    }

    #[async_trait]
    impl CatalogApi for FakeApi {
        async fn fetch_page(
            &self,
            category: Option<&str>,
            page: u32,
        ) -> anyhow::Result<Vec<Product>> {
            self.requests
                .lock()
                .unwrap()
                .push((category.map(ToString::to_string), page));
            if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
                anyhow::bail!("network down");
            }
            let size = PAGE_SIZE as i64;
            let start = (page as i64 - 1) * size + 1;
            Ok((start..=self.total.min(start + size - 1))
                .map(product)
                .collect())
        }

        async fn fetch_product(&self, _: &str) -> anyhow::Result<ProductWithImages> {
            anyhow::bail!("not used")
        }
    }

    #[test]
    fn in_flight_load_blocks_second_claim() {
        let mut listing = Listing::new(None);
        assert_eq!(listing.begin_load(), Some(1));
        assert!(listing.is_loading());
        assert_eq!(listing.begin_load(), None);
        listing.finish_load(1, Ok(vec![product(1)]));
        assert_eq!(listing.begin_load(), Some(2));
    }

    #[tokio::test]
    async fn stops_after_empty_page() {
        let api = FakeApi::new(45);
        let (load_more, mut trigger) = ManualTrigger::new();
        for _ in 0..10 {
            load_more.fire();
        }
        drop(load_more);

        let mut listing = Listing::new(None);
        listing.run(&api, &mut trigger).await;

        assert_eq!(api.pages(), vec![1, 2, 3, 4]);
        assert_eq!(listing.cards().len(), 45);
        assert_eq!(listing.current_page(), 3);
        assert!(!listing.has_more());
        assert_eq!(listing.load_next(&api).await, LoadOutcome::Skipped);
        assert_eq!(api.pages().len(), 4);
    }

    #[tokio::test]
    async fn failed_load_keeps_state() {
        let api = FakeApi::new(45);
        let mut listing = Listing::new(Some("4".to_string()));
        assert_eq!(listing.load_next(&api).await, LoadOutcome::Appended(20));

        *api.fail_next.lock().unwrap() = true;
        assert_eq!(listing.load_next(&api).await, LoadOutcome::Failed);
        assert!(!listing.is_loading());
        assert_eq!(listing.current_page(), 1);
        assert_eq!(listing.cards().len(), 20);

        assert_eq!(listing.load_next(&api).await, LoadOutcome::Appended(20));
        assert_eq!(api.pages(), vec![1, 2, 2]);
        let requests = api.requests.lock().unwrap();
        assert!(requests.iter().all(|(c, _)| c.as_deref() == Some("4")));
    }

    #[tokio::test]
    async fn scroll_events_drive_loads() {
        let api = FakeApi::new(30);
        let (tx, mut trigger) = ScrollTrigger::new(Proximity::default());
        let at = |top: f64| ScrollPosition {
            target_top: top,
            target_bottom: top + 300.0,
            viewport_height: 800.0,
        };
        // page 1 on start, page 2 once the card comes near, page 3 after the rewatch
        for pos in [at(3000.0), at(850.0), at(800.0)] {
            tx.send(pos).unwrap();
        }
        drop(tx);

        let mut listing = Listing::new(None);
        listing.run(&api, &mut trigger).await;
        assert_eq!(api.pages(), vec![1, 2, 3]);
        assert!(!listing.has_more());
        assert_eq!(listing.cards().len(), 30);
    }
}
