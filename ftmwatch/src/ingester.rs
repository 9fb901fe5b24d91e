//! Ingestion worker for <https://ftmscan.com/contractsVerified>
//!
//! Polls the verified-contracts listing, fetches ABI and source artifacts for every
//! address not yet in the database and persists them, handing the addresses added
//! during a cycle to the alert dispatcher before sleeping. Pages are walked from the
//! highest page number down to page 1 so the most recently listed contracts receive
//! the latest ingest timestamps, keeping the stored recency order independent of the
//! upstream pagination direction.

use crate::alert;
use anyhow::Error;
use ftmwatch_lib::api::ftmscan::FtmscanClient;
use ftmwatch_lib::api::telegram::TelegramClient;
use ftmwatch_lib::config::Config;
use ftmwatch_lib::database::handler::DatabaseClient;
use ftmwatch_lib::model::NetworkId;
use ftmwatch_lib::model::ScrapeCandidate;
use ftmwatch_lib::template;
use log::error;
use log::info;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Each page lists 100 contracts; 20 pages cover the whole scrapeable listing window.
const VERIFIED_CONTRACTS_MAX_PAGE: u32 = 20;

pub struct Ingester {
    config: Config,
    shutdown: Arc<AtomicBool>,
}

#[derive(Default)]
struct CycleOutcome {
    added: usize,
    skipped: usize,
    new_addresses: Vec<String>,
}

impl Ingester {
    pub fn new(config: Config, shutdown: Arc<AtomicBool>) -> Self {
        Ingester { config, shutdown }
    }

    /// Starts the ingestion loop; only the shutdown flag terminates it.
    pub fn start(&self) -> Result<(), Error> {
        let dbc = DatabaseClient::new(&self.config)?;
        let ftm = FtmscanClient::new(&self.config);
        let tgc = TelegramClient::new(&self.config);
        let templates = template::load(&self.config.template_dir)?;

        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                return Ok(());
            }

            let outcome = self.run_cycle(&dbc, &ftm);
            info!("Added {}, skipped {} contracts", outcome.added, outcome.skipped);

            // Alerting only ever considers the addresses added during this cycle; a
            // partial cycle still alerts on whatever it managed to persist
            alert::dispatch(&dbc, &tgc, &templates, &outcome.new_addresses);

            std::thread::sleep(std::time::Duration::from_secs(self.config.scrape_sleep_sec));
        }
    }

    /// One ingestion cycle over the page window. A page that fails to scrape is logged
    /// and skipped; a contract whose artifacts fail to fetch is logged and skipped; the
    /// cycle itself always runs to completion with whatever progress it made.
    fn run_cycle(&self, dbc: &DatabaseClient, ftm: &FtmscanClient) -> CycleOutcome {
        let mut outcome = CycleOutcome::default();

        for page in (1..=VERIFIED_CONTRACTS_MAX_PAGE).rev() {
            if self.shutdown.load(Ordering::Relaxed) {
                return outcome;
            }

            let candidates = match ftm.get_verified_contracts_page(page, NetworkId::Fantom) {
                Ok(candidates) => candidates,
                Err(why) => {
                    error!("Failed to scrape verified contracts page {page}; {why}");
                    continue;
                }
            };

            for candidate in candidates {
                match dbc.contract().get(&candidate.address) {
                    // Already ingested during an earlier cycle; no re-fetch
                    Some(_) => outcome.skipped += 1,

                    None => match ingest_candidate(dbc, ftm, &candidate) {
                        Ok(address) => {
                            outcome.new_addresses.push(address);
                            outcome.added += 1;
                        }
                        Err(why) => {
                            error!("Failed to ingest contract '{}'; {why}", candidate.address)
                        }
                    },
                }
            }
        }

        outcome
    }
}

/// Fetches both artifacts and persists the candidate, returning the stored address.
/// The source fetch is not attempted if the ABI fetch fails.
fn ingest_candidate(
    dbc: &DatabaseClient,
    ftm: &FtmscanClient,
    candidate: &ScrapeCandidate,
) -> Result<String, ftmwatch_lib::error::Error> {
    let abi = ftm.get_abi(&candidate.address)?;
    let source_code = ftm.get_source_code(&candidate.address)?;

    let contract = dbc.contract().insert(&candidate.to_contract(abi, source_code));
    Ok(contract.address)
}
