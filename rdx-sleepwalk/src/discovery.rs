//! Lists the templates in a directory by file-name suffix.

use crate::common::{TemplateName, TEMPLATE_SUFFIX};
use crate::error::DiscoveryError;
use std::path::Path;
use tracing::{debug, warn};

/// Returns the names of all regular files in `dir` ending in `.conf`, sorted.
///
/// Only the directory listing itself can fail; entries that cannot be
/// inspected are skipped with a warning.
pub async fn discover_templates(dir: &Path) -> Result<Vec<TemplateName>, DiscoveryError> {
    let to_error = |source: std::io::Error| DiscoveryError {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(to_error)?;
    let mut templates = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(to_error)? {
        let Ok(name) = entry.file_name().into_string() else {
            warn!(path = %entry.path().display(), "Skipping non UTF-8 file name");
            continue;
        };
        if !name.ends_with(TEMPLATE_SUFFIX) {
            continue;
        }
        match entry.file_type().await {
            Ok(kind) if kind.is_dir() => continue,
            Ok(_) => {}
            Err(e) => {
                warn!(template = %name, error = %e, "Skipping unreadable entry");
                continue;
            }
        }
        templates.push(TemplateName::new(name));
    }

    templates.sort();
    debug!(dir = %dir.display(), count = templates.len(), "Discovered templates");
    Ok(templates)
}
