pub mod brands;
pub mod config;
pub mod dates;
pub mod lock;
pub mod merge;
pub mod paths;
pub mod query;
pub mod record;
pub mod slug;
pub mod stats;
pub mod store;
pub mod util;
pub mod warn;

use crate::archive::brands::BrandCatalog;
use crate::archive::config::QueryConfig;
use crate::archive::record::PhotoRecord;
use std::collections::BTreeMap;

/// In-memory photo archive: the deduplicated record set plus the immutable
/// tables used to derive and query it.
#[derive(Debug, Clone)]
pub struct Archive {
    photos: BTreeMap<String, PhotoRecord>,
    brands: BrandCatalog,
    query: QueryConfig,
}

impl Archive {
    pub fn new(brands: BrandCatalog, query: QueryConfig) -> Self {
        Self::from_photos(BTreeMap::new(), brands, query)
    }

    pub fn from_photos(
        photos: BTreeMap<String, PhotoRecord>,
        brands: BrandCatalog,
        query: QueryConfig,
    ) -> Self {
        Self {
            photos,
            brands,
            query,
        }
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PhotoRecord> {
        self.photos.get(id)
    }

    pub fn photos(&self) -> &BTreeMap<String, PhotoRecord> {
        &self.photos
    }

    pub fn query_config(&self) -> &QueryConfig {
        &self.query
    }
}

impl Default for Archive {
    fn default() -> Self {
        Self::new(BrandCatalog::default(), QueryConfig::default())
    }
}
