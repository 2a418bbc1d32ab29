use catalog_types::product::ProductWithImages;

/// Horizontal travel, in pixels, a touch must cover to count as a swipe.
pub const SWIPE_THRESHOLD: f64 = 50.0;
/// Pixels the thumbnail strip moves per button press.
pub const STRIP_SCROLL_STEP: i32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    /// Strip scroll offset for this direction. The strip never changes the selected image.
    pub fn strip_offset(self) -> i32 {
        match self {
            Direction::Prev => -STRIP_SCROLL_STEP,
            Direction::Next => STRIP_SCROLL_STEP,
        }
    }
}

/// Left swipe means next, right swipe means previous; short moves are ignored.
pub fn swipe_direction(start_x: f64, end_x: f64) -> Option<Direction> {
    if end_x < start_x - SWIPE_THRESHOLD {
        Some(Direction::Next)
    } else if end_x > start_x + SWIPE_THRESHOLD {
        Some(Direction::Prev)
    } else {
        None
    }
}

/// Main image selection over a product's QC images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gallery {
    images: Vec<String>,
    current: String,
}

impl Gallery {
    pub fn new(images: Vec<String>, current: String) -> Self {
        Self { images, current }
    }

    pub fn for_product(product: &ProductWithImages) -> Self {
        Self::new(
            product.qc_images.clone(),
            product.product.main_image.clone().unwrap_or_default(),
        )
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Steps through the images with wraparound. With no images the selection stays put.
    /// A current image outside the list steps to the first (next) or last (prev) image.
    pub fn step(&mut self, direction: Direction) -> &str {
        let len = self.images.len();
        if len == 0 {
            return &self.current;
        }
        let index = match (self.images.iter().position(|i| *i == self.current), direction) {
            (Some(i), Direction::Next) => (i + 1) % len,
            (Some(i), Direction::Prev) => (i + len - 1) % len,
            (None, Direction::Next) => 0,
            (None, Direction::Prev) => len - 1,
        };
        self.current = self.images[index].clone();
        &self.current
    }

    pub fn next(&mut self) -> &str {
        self.step(Direction::Next)
    }

    pub fn prev(&mut self) -> &str {
        self.step(Direction::Prev)
    }

    /// Promotes a strip image to the main image.
    pub fn select(&mut self, image: &str) -> &str {
        self.current = image.to_string();
        &self.current
    }

    pub fn swipe(&mut self, start_x: f64, end_x: f64) -> &str {
        match swipe_direction(start_x, end_x) {
            Some(direction) => self.step(direction),
            None => &self.current,
        }
    }
}
