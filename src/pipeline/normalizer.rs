//! Raw provider entries to canonical product records

use super::models::{ProductRecord, RawProductEntry};

impl From<RawProductEntry> for ProductRecord {
    fn from(entry: RawProductEntry) -> Self {
        Self {
            seller: entry.source,
            product_name: entry.title,
            image: entry.thumbnail,
            price: entry.extracted_price,
            rating: entry.rating,
            location: entry.location,
        }
    }
}

/// Map every raw entry to a record, keeping order and count
pub fn normalize(entries: Vec<RawProductEntry>) -> Vec<ProductRecord> {
    entries.into_iter().map(ProductRecord::from).collect()
}
