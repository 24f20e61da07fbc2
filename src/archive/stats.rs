use crate::archive::Archive;
use crate::archive::brands::OTHER_BRAND_SLUG;
use crate::archive::query::{BrandSummary, PlayerSummary, WeekSummary};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveStats {
    pub total_photos: usize,
    pub total_players: usize,
    /// Identified brands only; the `other` bucket is not a brand.
    pub total_brands: usize,
    pub total_weeks: usize,
    pub top_players: Vec<PlayerSummary>,
    /// Identified brands only, consistent with `total_brands`.
    pub top_brands: Vec<BrandSummary>,
    pub recent_weeks: Vec<WeekSummary>,
}

impl Archive {
    pub fn stats(&self) -> ArchiveStats {
        let limits = &self.query;
        let players = self.all_players();
        let brands: Vec<BrandSummary> = self
            .all_brands()
            .into_iter()
            .filter(|brand| brand.slug != OTHER_BRAND_SLUG)
            .collect();
        let weeks = self.all_weeks();

        ArchiveStats {
            total_photos: self.photos.len(),
            total_players: players.len(),
            total_brands: brands.len(),
            total_weeks: weeks.len(),
            top_players: players.into_iter().take(limits.top_players).collect(),
            top_brands: brands.into_iter().take(limits.top_brands).collect(),
            recent_weeks: weeks.into_iter().take(limits.recent_weeks).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::brands::BrandCatalog;
    use crate::archive::config::QueryConfig;
    use crate::archive::record::PhotoRecord;

    fn photo(id: usize, player: &str, headline: &str, date: &str) -> PhotoRecord {
        PhotoRecord {
            player_name: player.to_string(),
            headline: headline.to_string(),
            photo_date: date.to_string(),
            ..PhotoRecord::new(id.to_string())
        }
    }

    #[test]
    fn empty_archive_has_zero_stats() {
        let stats = Archive::default().stats();
        assert_eq!(stats.total_photos, 0);
        assert_eq!(stats.total_players, 0);
        assert_eq!(stats.total_brands, 0);
        assert_eq!(stats.total_weeks, 0);
        assert!(stats.top_players.is_empty());
        assert!(stats.top_brands.is_empty());
        assert!(stats.recent_weeks.is_empty());
    }

    #[test]
    fn other_bucket_is_excluded_from_brand_stats() {
        let mut archive = Archive::default();
        archive.add_photos([
            photo(1, "Ja Morant", "Nike Ja 1", "2024-01-01"),
            photo(2, "Ja Morant", "courtside", "2024-01-02"),
            photo(3, "", "random", "2024-01-03"),
        ]);
        let stats = archive.stats();
        assert_eq!(stats.total_photos, 3);
        assert_eq!(stats.total_players, 1);
        assert_eq!(stats.total_brands, 1);
        assert_eq!(stats.top_brands.len(), 1);
        assert_eq!(stats.top_brands[0].slug, "nike");
        assert!(archive.all_brands().iter().any(|b| b.slug == "other" && b.count == 2));
    }

    #[test]
    fn top_lists_respect_configured_limits() {
        let query = QueryConfig {
            top_players: 2,
            top_brands: 1,
            recent_weeks: 1,
            ..QueryConfig::default()
        };
        let mut archive = Archive::new(BrandCatalog::default(), query);
        archive.add_photos([
            photo(1, "Player A", "Nike", "2024-01-01"),
            photo(2, "Player A", "Nike", "2024-01-08"),
            photo(3, "Player B", "Adidas", "2024-01-15"),
            photo(4, "Player C", "Puma", "2024-01-22"),
        ]);
        let stats = archive.stats();
        assert_eq!(stats.total_players, 3);
        assert_eq!(stats.total_brands, 3);
        assert_eq!(stats.total_weeks, 4);
        let top: Vec<&str> = stats.top_players.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(top, vec!["player-a", "player-b"]);
        assert_eq!(stats.top_brands.len(), 1);
        assert_eq!(stats.top_brands[0].slug, "nike");
        assert_eq!(stats.recent_weeks.len(), 1);
        assert_eq!(stats.recent_weeks[0].week, "2024-W04");
    }
}
