//! Loads the reference template contracts the similarity matcher scores against.
//!
//! The template directory holds one sub-directory per template; the sub-directory name is
//! the template name and must match a declaration inside its source files. Templates are
//! read once at process start and never mutated for the lifetime of the run.

use crate::error::Error;
use crate::extractor;
use log::warn;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// A reference contract, reduced to the extracted body of its primary declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub code: String,
}

/// Reads every template from `dir`, sorted by name so the similarity tie-break order is
/// stable across runs. A sub-directory without an extractable declaration matching its
/// name is logged and ignored; a directory yielding no templates at all is an error.
pub fn load(dir: &Path) -> Result<Vec<Template>, Error> {
    let mut templates = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();

        let mut file_contents = Vec::new();
        for file in WalkDir::new(entry.path()).min_depth(1).sort_by_file_name() {
            let file = file.map_err(std::io::Error::from)?;
            if file.file_type().is_file() {
                file_contents.push(fs::read_to_string(file.path())?);
            }
        }

        match extractor::extract_blocks(&file_contents.join("\n")).get(&name).cloned().flatten() {
            Some(code) => templates.push(Template { name, code }),
            None => warn!("Template directory '{name}' contains no balanced '{name}' declaration, skipping"),
        }
    }

    templates.sort_by(|a, b| a.name.cmp(&b.name));

    match templates.is_empty() {
        true => Err(Error::TemplateDirEmpty(dir.display().to_string())),
        false => Ok(templates),
    }
}

#[cfg(test)]
mod tests {
    use crate::template;
    use std::path::Path;

    #[test]
    fn load_fixture_templates() {
        let templates = template::load(Path::new("../res/templates")).unwrap();

        // Sorted by name, each reduced to its own declaration block
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].name, "Token");
        assert!(templates[0].code.starts_with("contract Token {"));
        assert!(templates[0].code.ends_with('}'));
        assert_eq!(templates[1].name, "Vault");
        assert!(templates[1].code.starts_with("contract Vault {"));
    }

    #[test]
    fn load_missing_directory_is_an_error() {
        assert!(template::load(Path::new("../res/does-not-exist")).is_err());
    }
}
