//! Structs that are both used by the FTMScan API clients as well as the database schema / bindings.

#![allow(clippy::extra_unused_lifetimes)] // Clippy complains about the Insertable proc-macro

use crate::database::schema::*;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use diesel::Insertable;
use diesel::Queryable;
use diesel_derive_enum::DbEnum;
use serde::Deserialize;
use serde::Serialize;

/// Network a verified contract was scraped from; currently only Fantom is polled but the
/// column exists so other chains can be ingested into the same corpus.
#[derive(Serialize, Deserialize, DbEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[DieselType = "Network_id"]
pub enum NetworkId {
    Fantom,
}

/// A verified contract as persisted, including its fetched artifacts.
///
/// `address` is the primary identity and always stored lowercase; `added_at` is assigned
/// at persist time so listing order in storage follows ingestion order.
#[derive(Queryable, Insertable, QueryableByName, Serialize, Debug, Clone)]
#[table_name = "contract"]
pub struct Contract {
    pub address: String,
    pub name: String,
    pub compiler: String,
    pub version: String,
    pub verified_date: NaiveDate,
    pub license: Option<String>,
    pub abi: Option<String>,
    pub source_code: Option<String>,
    pub network_id: NetworkId,
    pub added_at: DateTime<Utc>,
}

/// One row of the verified-contracts listing; becomes a [`Contract`] only after its
/// ABI and source artifacts have been fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeCandidate {
    pub address: String,
    pub name: String,
    pub compiler: String,
    pub version: String,
    pub verified_date: NaiveDate,
    pub license: Option<String>,
    pub network_id: NetworkId,
}

impl ScrapeCandidate {
    pub fn to_contract(&self, abi: String, source_code: String) -> Contract {
        Contract {
            address: self.address.to_lowercase(),
            name: self.name.clone(),
            compiler: self.compiler.clone(),
            version: self.version.clone(),
            verified_date: self.verified_date,
            license: self.license.clone(),
            abi: Some(abi),
            source_code: Some(source_code),
            network_id: self.network_id,
            added_at: Utc::now(),
        }
    }
}

/// Keyword subscription; one row per keyword, `chat_ids` holds every subscribed chat.
///
/// Removing the last subscriber leaves an empty-but-present row, never a deleted one.
#[derive(Queryable, Serialize, Debug, Clone)]
pub struct ContractAlert {
    pub id: i32,
    pub keyword: String,
    pub chat_ids: Vec<i64>,
}

#[derive(Insertable)]
#[table_name = "contract_alert"]
pub struct ContractAlertInsert<'a> {
    pub keyword: &'a str,
    pub chat_ids: Vec<i64>,
}
