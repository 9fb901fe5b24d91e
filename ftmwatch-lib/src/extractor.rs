//! Extracts the verbatim text of top-level `contract` / `interface` / `library`
//! declarations from raw (possibly JSON-bundled) verified source code.
//!
//! This is a structural scan, not a Solidity parser: declarations are found with a RegEx
//! pattern and delimited by walking the brace nesting from the declaration's opening
//! brace to its matching closing brace. E.g. from
//! ```text
//! pragma solidity 0.8.14;
//! contract Example {
//!     // ...
//! }
//! ```
//! the scan yields an `Example` entry holding everything from the `contract` keyword
//! through the closing brace.

use crate::error::Error;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

lazy_static! {
    static ref REGEX_DECLARATION: Regex = Regex::new(
        r"(?x)
            (?P<kind>library|interface|contract)    # Top-level declaration kind
            \s+                                     # 1 to n characters between kind and name
            (?P<name>\S+)                           # Declaration name
            \s*                                     # 0 to n characters between name and opening brace
            \{                                      # Opening brace of the declaration body
        ")
    .unwrap();
}

/// A verified source payload, resolved exactly once at the extraction boundary; FTMScan
/// serves either the source text directly or a standard-JSON multi-file bundle.
#[derive(Debug, PartialEq, Eq)]
pub enum SourcePayload {
    Plain(String),
    Bundle(Vec<SourceFile>),
}

#[derive(Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub filename: String,
    pub content: String,
}

impl SourcePayload {
    /// Returns the full source text; bundle files are concatenated in listing order.
    pub fn text(&self) -> String {
        match self {
            SourcePayload::Plain(text) => text.clone(),
            SourcePayload::Bundle(files) => {
                files.iter().map(|file| file.content.as_str()).collect::<Vec<&str>>().join("\n")
            }
        }
    }
}

/// One entry of the `getsourcecode` result array.
#[derive(Deserialize)]
struct ApiSourceEntry {
    #[serde(rename = "SourceCode")]
    source_code: String,
}

#[derive(Deserialize)]
struct BundleJson {
    sources: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct BundleSource {
    content: String,
}

/// Resolves a persisted `source_code` field into a [`SourcePayload`].
///
/// The field is either the serialized `getsourcecode` result (a JSON array whose first
/// entry carries the `SourceCode` string) or already the bare source text. A `SourceCode`
/// string starting with a brace is a standard-JSON bundle, by FTMScan convention wrapped
/// in one extra brace pair.
pub fn resolve_source_payload(raw: &str) -> Result<SourcePayload, Error> {
    let source = match raw.trim_start().starts_with('[') {
        true => {
            let entries: Vec<ApiSourceEntry> = serde_json::from_str(raw)?;
            match entries.into_iter().next() {
                Some(entry) => entry.source_code,
                None => String::new(),
            }
        }
        false => raw.to_string(),
    };

    let trimmed = source.trim();
    if !trimmed.starts_with('{') {
        return Ok(SourcePayload::Plain(source));
    }

    let inner = match trimmed.starts_with("{{") && trimmed.ends_with("}}") {
        true => &trimmed[1..trimmed.len() - 1],
        false => trimmed,
    };

    let bundle: BundleJson = serde_json::from_str(inner)?;

    let mut files = Vec::new();
    for (filename, value) in bundle.sources {
        let source: BundleSource = serde_json::from_value(value)?;
        files.push(SourceFile {
            filename,
            content: source.content,
        });
    }

    Ok(SourcePayload::Bundle(files))
}

/// Returns a mapping from declaration name to its verbatim block text, from the
/// declaration keyword through the matching closing brace inclusive.
///
/// A declaration whose body never closes before end of input (malformed or truncated
/// source) maps to `None`; declarations sharing a name overwrite each other, last wins.
pub fn extract_blocks(source: &str) -> HashMap<String, Option<String>> {
    let mut blocks = HashMap::new();

    for capture in REGEX_DECLARATION.captures_iter(source) {
        let name = capture.name("name").unwrap().as_str().to_string();
        let declaration = capture.get(0).unwrap();

        blocks.insert(name, extract_balanced(source, declaration.start(), declaration.end() - 1));
    }

    blocks
}

/// Walks the brace nesting starting at `brace_idx` (the declaration's opening brace) and
/// returns the span from `start_idx` through the matching closing brace, or `None` if the
/// braces never balance out.
fn extract_balanced(source: &str, start_idx: usize, brace_idx: usize) -> Option<String> {
    let mut depth = 0usize;

    for (offset, byte) in source.as_bytes()[brace_idx..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(unescape(&source[start_idx..=brace_idx + offset]));
                }
            }
            _ => (),
        }
    }

    None
}

/// Verified sources occasionally arrive double-JSON-encoded; undo the leftover escape
/// sequences so diffs run against the actual code lines.
fn unescape(block: &str) -> String {
    block.trim_matches('\\').replace("\\\\n", "\n").replace("\\\\\"", "\"")
}

#[cfg(test)]
mod tests {
    use crate::extractor::extract_blocks;
    use crate::extractor::resolve_source_payload;
    use crate::extractor::SourceFile;
    use crate::extractor::SourcePayload;

    #[test]
    fn extract_verbatim_block() {
        let source = "pragma solidity 0.8.4;\ncontract Foo {\n    uint256 bar;\n}\n// trailer";

        let blocks = extract_blocks(source);
        assert_eq!(
            blocks.get("Foo"),
            Some(&Some("contract Foo {\n    uint256 bar;\n}".to_string()))
        );
    }

    #[test]
    fn extract_handles_nested_braces() {
        let source = "contract Foo {\n    function bar() public {\n        if (true) { baz(); }\n    }\n}";

        let blocks = extract_blocks(source);
        assert_eq!(blocks.get("Foo"), Some(&Some(source.to_string())));
    }

    #[test]
    fn extract_all_declaration_kinds() {
        let source = "library SafeMath { function add() internal {} }\n\
                      interface IERC20 { function totalSupply() external; }\n\
                      contract Token { uint256 supply; }";

        let blocks = extract_blocks(source);
        assert_eq!(blocks.len(), 3);
        assert!(blocks["SafeMath"].as_ref().unwrap().starts_with("library SafeMath {"));
        assert!(blocks["IERC20"].as_ref().unwrap().starts_with("interface IERC20 {"));
        assert!(blocks["Token"].as_ref().unwrap().ends_with("{ uint256 supply; }"));
    }

    #[test]
    fn extract_truncated_block_yields_none() {
        let source = "contract Foo {\n    function bar() public {\n"; // Never closed

        let blocks = extract_blocks(source);
        assert_eq!(blocks.get("Foo"), Some(&None));
    }

    #[test]
    fn extract_duplicate_names_last_wins() {
        let source = "contract Foo { uint256 a; }\ncontract Foo { uint256 b; }";

        let blocks = extract_blocks(source);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks["Foo"], Some("contract Foo { uint256 b; }".to_string()));
    }

    #[test]
    fn extract_unescapes_double_encoded_source() {
        let source = "contract Foo {\\\\n    string s = \\\\\"bar\\\\\";\\\\n}";

        let blocks = extract_blocks(source);
        assert_eq!(blocks["Foo"], Some("contract Foo {\n    string s = \"bar\";\n}".to_string()));
    }

    #[test]
    fn resolve_plain_source() {
        let raw = "pragma solidity 0.8.4;\ncontract Foo {}";

        assert_eq!(resolve_source_payload(raw).unwrap(), SourcePayload::Plain(raw.to_string()));
    }

    #[test]
    fn resolve_api_envelope_with_plain_source() {
        let raw = r#"[{"SourceCode": "contract Foo {}", "ABI": "[]"}]"#;

        assert_eq!(
            resolve_source_payload(raw).unwrap(),
            SourcePayload::Plain("contract Foo {}".to_string())
        );
    }

    #[test]
    fn resolve_double_braced_bundle_preserves_listing_order() {
        let inner = r#"{{"language": "Solidity", "sources": {"b.sol": {"content": "contract B {}"}, "a.sol": {"content": "contract A {}"}}}}"#;
        let raw = serde_json::to_string(&vec![serde_json::json!({ "SourceCode": inner })]).unwrap();

        assert_eq!(
            resolve_source_payload(&raw).unwrap(),
            SourcePayload::Bundle(vec![
                SourceFile {
                    filename: "b.sol".to_string(),
                    content: "contract B {}".to_string(),
                },
                SourceFile {
                    filename: "a.sol".to_string(),
                    content: "contract A {}".to_string(),
                },
            ])
        );
    }

    #[test]
    fn resolve_bundle_text_concatenates_contents() {
        let payload = SourcePayload::Bundle(vec![
            SourceFile {
                filename: "a.sol".to_string(),
                content: "contract A {}".to_string(),
            },
            SourceFile {
                filename: "b.sol".to_string(),
                content: "contract B {}".to_string(),
            },
        ]);

        assert_eq!(payload.text(), "contract A {}\ncontract B {}");
    }

    #[test]
    fn resolve_malformed_bundle_is_an_error() {
        let raw = r#"[{"SourceCode": "{\"sources\": oops"}]"#;

        assert!(resolve_source_payload(raw).is_err());
    }
}
