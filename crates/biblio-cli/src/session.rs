//! The library a command works on, opened from the data file.

use std::convert::Infallible;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use biblio_adapters::{InMemoryStore, SystemClock};
use biblio_core::{application::Library, domain::MemberId};

use crate::{
    cli::GlobalArgs,
    config::AppConfig,
    error::{CliError, CliResult},
};

pub struct Session {
    pub library: Library,
    pub data_file: PathBuf,
}

impl Session {
    /// Open `--data`, or `storage.data_file` from the config. A missing file
    /// starts an empty library.
    pub fn open(global: &GlobalArgs, config: &AppConfig) -> CliResult<Self> {
        let data_file = global
            .data
            .clone()
            .unwrap_or_else(|| config.storage.data_file.clone());
        let store = InMemoryStore::open(&data_file)?;
        debug!(path = %data_file.display(), "Library opened");

        Ok(Self {
            library: biblio_adapters::library(
                store,
                Arc::new(SystemClock),
                config.library.clone(),
            ),
            data_file,
        })
    }

    /// Resolve a member given by id or card number.
    pub fn member_id(&self, member: &MemberRef) -> CliResult<MemberId> {
        match member {
            MemberRef::Id(id) => Ok(*id),
            MemberRef::Card(card) => self
                .library
                .members
                .find_by_card(card)?
                .map(|profile| profile.member.id)
                .ok_or_else(|| CliError::UnknownCard { card: card.clone() }),
        }
    }
}

/// A member on the command line: `3`, `#3` or a card number like `MBR-0003`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRef {
    Id(MemberId),
    Card(String),
}

impl FromStr for MemberRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<MemberId>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Card(s.trim().to_uppercase()),
        })
    }
}
