//! Implementation of `lpm add`, plus dependency removal from
//! `packages.toml`.
//!
//! Edits go through `toml_edit` so comments and layout in the project
//! manifest survive.

use std::path::Path;

use anyhow::{bail, Context, Result};
use toml_edit::{value, DocumentMut, Item, Table};

use crate::core::dependency::{VersionRequest, LATEST};
use crate::util::fs;

/// What `add_dependency` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddResult {
    Added { name: String, version: String },
    Updated { name: String, from: String, to: String },
    Unchanged { name: String, version: String },
}

fn load_document(manifest_path: &Path) -> Result<DocumentMut> {
    if !manifest_path.exists() {
        return Ok(DocumentMut::new());
    }
    let content = fs::read_to_string(manifest_path)?;
    content
        .parse()
        .with_context(|| format!("failed to parse {}", manifest_path.display()))
}

/// Add `name = "<version>"` to `[dependencies]`, creating the file or
/// table if needed. The version defaults to `latest`.
pub fn add_dependency(manifest_path: &Path, name: &str, version: Option<&str>) -> Result<AddResult> {
    if name.trim().is_empty() {
        bail!("package name must not be empty");
    }
    let request = VersionRequest::parse(version.unwrap_or(LATEST)).to_string();
    if request.is_empty() {
        bail!("version for `{}` must not be empty", name);
    }

    let mut doc = load_document(manifest_path)?;

    if !doc.contains_key("dependencies") {
        doc["dependencies"] = Item::Table(Table::new());
    }
    let deps = doc["dependencies"]
        .as_table_like_mut()
        .context("`dependencies` in packages.toml is not a table")?;

    let previous = deps
        .get(name)
        .and_then(|item| item.as_str())
        .map(str::to_string);

    let result = match previous {
        Some(ref from) if *from == request => {
            return Ok(AddResult::Unchanged {
                name: name.to_string(),
                version: request,
            });
        }
        Some(from) => AddResult::Updated {
            name: name.to_string(),
            from,
            to: request.clone(),
        },
        None => AddResult::Added {
            name: name.to_string(),
            version: request.clone(),
        },
    };

    deps.insert(name, value(request));
    fs::write_string(manifest_path, &doc.to_string())?;

    Ok(result)
}

/// Remove a dependency from `[dependencies]`.
pub fn remove_dependency(manifest_path: &Path, name: &str) -> Result<()> {
    let mut doc = load_document(manifest_path)?;

    let Some(deps) = doc
        .get_mut("dependencies")
        .and_then(|item| item.as_table_like_mut())
    else {
        bail!("no dependencies in {}", manifest_path.display());
    };

    if deps.remove(name).is_none() {
        bail!(
            "dependency `{}` not found in {}",
            name,
            manifest_path.display()
        );
    }

    fs::write_string(manifest_path, &doc.to_string())?;
    Ok(())
}
