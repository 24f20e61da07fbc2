use anyhow::Result;

use crate::archive::config::load_config;
use crate::archive::paths::resolve_paths;
use crate::commands::{CommandReport, describe_load, load_archive};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Players,
    Brands,
    Weeks,
}

impl Listing {
    fn command_name(self) -> &'static str {
        match self {
            Self::Players => "players",
            Self::Brands => "brands",
            Self::Weeks => "weeks",
        }
    }
}

pub fn run(listing: Listing, limit: Option<usize>) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let config = load_config(&paths)?;
    let mut report = CommandReport::new(listing.command_name());

    let loaded = load_archive(&paths, &config)?;
    describe_load(&loaded.outcome, &mut report);
    let archive = &loaded.archive;
    let take = limit.unwrap_or(usize::MAX);

    match listing {
        Listing::Players => {
            let players = archive.all_players();
            report.detail(format!("players={}", players.len()));
            let shown: Vec<_> = players.into_iter().take(take).collect();
            report.set_data(&shown)?;
        }
        Listing::Brands => {
            let brands = archive.all_brands();
            report.detail(format!("brands={}", brands.len()));
            let shown: Vec<_> = brands.into_iter().take(take).collect();
            report.set_data(&shown)?;
        }
        Listing::Weeks => {
            let weeks = archive.all_weeks();
            report.detail(format!("weeks={}", weeks.len()));
            let shown: Vec<_> = weeks.into_iter().take(take).collect();
            report.set_data(&shown)?;
        }
    }

    Ok(report)
}
