//! Builds and delivers the per-subscriber Telegram batches for contracts added during
//! an ingestion cycle.
//!
//! For every registered keyword the newly-added addresses are matched through the
//! database's full-text search; each match is resolved to its closest template so the
//! message can link both the contract page and the diff view against that template.
//! Failures are isolated per alert, per match and per chat, never aborting the rest of
//! the dispatch.

use anyhow::Context;
use ftmwatch_lib::api::telegram::TelegramClient;
use ftmwatch_lib::database::handler::DatabaseClient;
use ftmwatch_lib::extractor;
use ftmwatch_lib::model::Contract;
use ftmwatch_lib::similarity;
use ftmwatch_lib::template::Template;
use log::error;
use log::info;
use log::warn;
use std::collections::HashMap;

const FTMSCAN_ADDRESS_URL: &str = "https://ftmscan.com/address/";
const DIFF_BASE_URL: &str = "https://ftmwatch.io/diff";

#[derive(Debug, Clone)]
struct MatchLinks {
    contract: String,
    diff: String,
}

/// Delivers one combined message per subscriber with every keyword that matched a
/// newly-added contract.
pub fn dispatch(
    dbc: &DatabaseClient,
    tgc: &TelegramClient,
    templates: &[Template],
    new_addresses: &[String],
) {
    if new_addresses.is_empty() {
        return;
    }

    let mut chat_batches: HashMap<i64, Vec<(String, Vec<MatchLinks>)>> = HashMap::new();

    for alert in dbc.contract_alert().get_with_subscribers() {
        let matches = dbc.contract().search_within(new_addresses, &alert.keyword);
        if matches.is_empty() {
            continue;
        }

        let mut links = Vec::new();
        for contract in &matches {
            match resolve_links(contract, templates) {
                Ok(resolved) => links.push(resolved),
                Err(why) => warn!(
                    "Skipping match '{}' for keyword '{}'; {why:#}",
                    contract.address, alert.keyword
                ),
            }
        }

        if links.is_empty() {
            continue;
        }

        info!("Matches for '{}': {links:?}", alert.keyword);

        for chat_id in &alert.chat_ids {
            chat_batches.entry(*chat_id).or_default().push((alert.keyword.clone(), links.clone()));
        }
    }

    if chat_batches.is_empty() {
        return;
    }

    info!("Sending alerts to {:?}", chat_batches.keys().collect::<Vec<&i64>>());
    for (chat_id, batches) in &chat_batches {
        if let Err(why) = tgc.send_message(*chat_id, &render_message(batches)) {
            error!("{why}");
        }
    }
}

/// Resolves a match to its contract page link and its diff link against the closest
/// template.
fn resolve_links(contract: &Contract, templates: &[Template]) -> Result<MatchLinks, anyhow::Error> {
    let source_code = contract
        .source_code
        .as_deref()
        .context("no source payload stored for contract")?;

    let source_text = extractor::resolve_source_payload(source_code)?.text();

    let code = extractor::extract_blocks(&source_text)
        .get(&contract.name)
        .cloned()
        .flatten()
        .with_context(|| format!("no balanced '{}' declaration in source", contract.name))?;

    let closest = similarity::closest_template(&code, templates).context("template set is empty")?;

    Ok(MatchLinks {
        contract: format_contract_link(&contract.name, &contract.address),
        diff: format_diff_link(&contract.address, &closest.name),
    })
}

fn format_contract_link(name: &str, address: &str) -> String {
    let short_address = match address.len() > 10 {
        true => format!("{}...{}", &address[..6], &address[address.len() - 4..]),
        false => address.to_string(),
    };

    format!("[{name} ({short_address})]({FTMSCAN_ADDRESS_URL}{address})")
}

fn format_diff_link(address: &str, template_name: &str) -> String {
    format!("[Diff]({DIFF_BASE_URL}?diff_name={template_name}&addr={address}) with {template_name}")
}

/// Renders the combined Markdown message for one subscriber.
fn render_message(batches: &[(String, Vec<MatchLinks>)]) -> String {
    let mut message = String::from("*New contracts matching alerts*\n");

    for (keyword, links) in batches {
        message.push_str(&format!("`{keyword}`\n"));
        for link in links {
            message.push_str(&format!("  * {} -- {}\n", link.contract, link.diff));
        }
    }

    message
}

#[cfg(test)]
mod tests {
    use crate::alert::format_contract_link;
    use crate::alert::format_diff_link;
    use crate::alert::render_message;
    use crate::alert::MatchLinks;

    #[test]
    fn contract_link_shortens_address() {
        assert_eq!(
            format_contract_link("Token", "0xabcdef0123456789abcdef0123456789abcdef01"),
            "[Token (0xabcd...ef01)](https://ftmscan.com/address/0xabcdef0123456789abcdef0123456789abcdef01)"
        );
    }

    #[test]
    fn diff_link_names_the_matched_template() {
        assert_eq!(
            format_diff_link("0xabc", "Vault"),
            "[Diff](https://ftmwatch.io/diff?diff_name=Vault&addr=0xabc) with Vault"
        );
    }

    #[test]
    fn message_batches_one_block_per_keyword() {
        let batches = vec![
            (
                "Token".to_string(),
                vec![
                    MatchLinks {
                        contract: "[A](a)".to_string(),
                        diff: "[Diff](a-diff) with Token".to_string(),
                    },
                    MatchLinks {
                        contract: "[B](b)".to_string(),
                        diff: "[Diff](b-diff) with Vault".to_string(),
                    },
                ],
            ),
            (
                "Vault".to_string(),
                vec![MatchLinks {
                    contract: "[C](c)".to_string(),
                    diff: "[Diff](c-diff) with Vault".to_string(),
                }],
            ),
        ];

        assert_eq!(
            render_message(&batches),
            "*New contracts matching alerts*\n\
             `Token`\n\
             \x20 * [A](a) -- [Diff](a-diff) with Token\n\
             \x20 * [B](b) -- [Diff](b-diff) with Vault\n\
             `Vault`\n\
             \x20 * [C](c) -- [Diff](c-diff) with Vault\n"
        );
    }
}
