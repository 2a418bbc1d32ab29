pub mod product;

/// Number of products returned by one listing page.
pub const PAGE_SIZE: u32 = 20;
