//! Client for <https://ftmscan.com/>, covering both the JSON contract API (ABI / source
//! artifacts, keyed by the API token) and the HTML verified-contracts listing.

use crate::config::Config;
use crate::error::Error;
use crate::model::NetworkId;
use crate::model::ScrapeCandidate;
use chrono::NaiveDate;
use select::document::Document;
use select::predicate::Name;
use select::predicate::Predicate;

use super::FtmscanResponseHandler;
use super::GenericResponseHandler;
use super::RequestHandler;

pub struct FtmscanClient {
    request_handler: RequestHandler,
    token: String,
}

/// Columns of the verified-contracts listing we persist; their position in the markup is
/// resolved dynamically from the header row, never assumed fixed.
const COLUMN_ADDRESS: &str = "Address";
const COLUMN_NAME: &str = "Contract Name";
const COLUMN_COMPILER: &str = "Compiler";
const COLUMN_VERSION: &str = "Version";
const COLUMN_VERIFIED: &str = "Verified";
const COLUMN_LICENSE: &str = "License";

impl FtmscanClient {
    pub fn new(config: &Config) -> Self {
        FtmscanClient {
            request_handler: RequestHandler::new(),
            token: config.token_ftmscan.clone(),
        }
    }

    /// Returns the serialized `result` payload of the `getabi` endpoint, transparently
    /// retrying for as long as FTMScan reports its rate limit.
    pub fn get_abi(&self, address: &str) -> Result<String, Error> {
        self.fetch_contract_artifact(address, "getabi")
    }

    /// Same as [`Self::get_abi`] but for the `getsourcecode` endpoint.
    pub fn get_source_code(&self, address: &str) -> Result<String, Error> {
        self.fetch_contract_artifact(address, "getsourcecode")
    }

    fn fetch_contract_artifact(&self, address: &str, action: &str) -> Result<String, Error> {
        let url = format!(
            "https://api.ftmscan.com/api?module=contract&action={}&address={}&apikey={}",
            action, address, self.token
        );

        self.request_handler.execute_text::<FtmscanResponseHandler>(&url)
    }

    /// Returns one page of <https://ftmscan.com/contractsVerified>, parsed into candidates.
    pub fn get_verified_contracts_page(
        &self,
        page: u32,
        network_id: NetworkId,
    ) -> Result<Vec<ScrapeCandidate>, Error> {
        let url = format!("https://ftmscan.com/contractsVerified/{page}?ps=100");
        let response = self.request_handler.execute_resp::<GenericResponseHandler>(&url)?;

        parse_listing(response.text().unwrap().as_ref(), network_id)
    }
}

/// Parses the listing table into [`ScrapeCandidate`]s, resolving each column's index from
/// the header text first.
fn parse_listing(html: &str, network_id: NetworkId) -> Result<Vec<ScrapeCandidate>, Error> {
    let document = Document::from(html);

    let header = document
        .find(Name("thead").child(Name("tr")))
        .next()
        .ok_or(Error::ScrapeMissingTableElement("thead"))?;
    let header_names: Vec<String> = header.find(Name("th")).map(|x| x.text().trim().to_string()).collect();

    let column_index = |column: &'static str| -> Result<usize, Error> {
        header_names.iter().position(|x| x == column).ok_or(Error::ScrapeMissingColumn(column))
    };

    let idx_address = column_index(COLUMN_ADDRESS)?;
    let idx_name = column_index(COLUMN_NAME)?;
    let idx_compiler = column_index(COLUMN_COMPILER)?;
    let idx_version = column_index(COLUMN_VERSION)?;
    let idx_verified = column_index(COLUMN_VERIFIED)?;
    let idx_license = column_index(COLUMN_LICENSE)?;

    if document.find(Name("tbody")).next().is_none() {
        return Err(Error::ScrapeMissingTableElement("tbody"));
    }

    let mut candidates = Vec::new();
    for row in document.find(Name("tbody").child(Name("tr"))) {
        let cells: Vec<String> = row.find(Name("td")).map(|x| x.text().trim().to_string()).collect();

        if cells.len() != header_names.len() {
            return Err(Error::ScrapeMalformedRow(format!(
                "expected {} cells per row, found {}",
                header_names.len(),
                cells.len()
            )));
        }

        candidates.push(ScrapeCandidate {
            address: cells[idx_address].to_lowercase(),
            name: cells[idx_name].clone(),
            compiler: cells[idx_compiler].clone(),
            version: cells[idx_version].clone(),
            verified_date: NaiveDate::parse_from_str(&cells[idx_verified], "%m/%d/%Y")?,
            license: match cells[idx_license].as_str() {
                "-" => None,
                license => Some(license.to_string()),
            },
            network_id,
        });
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use crate::api::ftmscan::parse_listing;
    use crate::error::Error;
    use crate::model::NetworkId;
    use chrono::NaiveDate;

    fn listing(header: &str, rows: &str) -> String {
        format!("<table><thead><tr>{header}</tr></thead><tbody>{rows}</tbody></table>")
    }

    #[test]
    fn parse_listing_row() {
        let html = listing(
            "<th>Address</th><th>Contract Name</th><th>Compiler</th><th>Version</th><th>Balance</th><th>Txns</th><th>Verified</th><th>License</th>",
            "<tr><td> 0xABCDEF0123456789abcdef0123456789ABCDEF01 </td><td>Token</td><td>Solidity</td><td>v0.8.4</td><td>0 FTM</td><td>3</td><td>04/17/2022</td><td>MIT</td></tr>",
        );

        let candidates = parse_listing(&html, NetworkId::Fantom).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].address, "0xabcdef0123456789abcdef0123456789abcdef01");
        assert_eq!(candidates[0].name, "Token");
        assert_eq!(candidates[0].compiler, "Solidity");
        assert_eq!(candidates[0].version, "v0.8.4");
        assert_eq!(candidates[0].verified_date, NaiveDate::from_ymd(2022, 4, 17));
        assert_eq!(candidates[0].license, Some("MIT".to_string()));
    }

    #[test]
    fn parse_listing_resolves_columns_by_header() {
        // Same data, shuffled column order
        let html = listing(
            "<th>License</th><th>Verified</th><th>Contract Name</th><th>Address</th><th>Compiler</th><th>Version</th>",
            "<tr><td>-</td><td>01/02/2021</td><td>Vault</td><td>0xFF</td><td>Solidity</td><td>v0.6.12</td></tr>",
        );

        let candidates = parse_listing(&html, NetworkId::Fantom).unwrap();
        assert_eq!(candidates[0].address, "0xff");
        assert_eq!(candidates[0].name, "Vault");
        assert_eq!(candidates[0].verified_date, NaiveDate::from_ymd(2021, 1, 2));
    }

    #[test]
    fn parse_listing_dash_license_is_absent() {
        let html = listing(
            "<th>Address</th><th>Contract Name</th><th>Compiler</th><th>Version</th><th>Verified</th><th>License</th>",
            "<tr><td>0xff</td><td>Vault</td><td>Solidity</td><td>v0.6.12</td><td>01/02/2021</td><td>-</td></tr>",
        );

        assert_eq!(parse_listing(&html, NetworkId::Fantom).unwrap()[0].license, None);
    }

    #[test]
    fn parse_listing_missing_body_is_an_error() {
        let html = "<table><thead><tr><th>Address</th><th>Contract Name</th><th>Compiler</th>\
                    <th>Version</th><th>Verified</th><th>License</th></tr></thead></table>";

        assert!(matches!(
            parse_listing(html, NetworkId::Fantom),
            Err(Error::ScrapeMissingTableElement("tbody"))
        ));
    }

    #[test]
    fn parse_listing_missing_column_is_an_error() {
        let html = listing("<th>Address</th><th>Compiler</th>", "");

        assert!(matches!(
            parse_listing(&html, NetworkId::Fantom),
            Err(Error::ScrapeMissingColumn("Contract Name"))
        ));
    }

    #[test]
    fn parse_listing_empty_body_yields_no_candidates() {
        let html = listing(
            "<th>Address</th><th>Contract Name</th><th>Compiler</th><th>Version</th><th>Verified</th><th>License</th>",
            "",
        );

        assert!(parse_listing(&html, NetworkId::Fantom).unwrap().is_empty());
    }
}
