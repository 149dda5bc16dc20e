//! Desired design document set.
//!
//! The application describes the design documents it wants either in one
//! file or as a directory tree.
//!
//! A file is a JSON array, or a YAML sequence when the extension is
//! `.yaml`/`.yml`. Each entry uses the server document shape (`_id`,
//! `language`, `views`, `filters`). A `_rev` in the file is accepted but has
//! no effect on reconciliation.
//!
//! A directory holds one subdirectory per design document and one
//! subdirectory per view below that:
//!
//! ```text
//! design
//! ├── player
//! │   ├── byAge
//! │   │   ├── map.js
//! │   │   └── reduce.js
//! │   └── byName
//! │       └── map.js
//! └── user
//!     └── byEmail
//!         └── map.js
//! ```

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::DesiredError;
use crate::types::{DesignDocument, View, DESIGN_PREFIX};

const MAP_FILE: &str = "map.js";
const REDUCE_FILE: &str = "reduce.js";

/// Load and validate the desired set at `path`, a file or a design
/// directory tree.
pub fn load_desired_at(path: &Path) -> Result<Vec<DesignDocument>, DesiredError> {
    if path.is_dir() {
        return load_desired_dir_at(path);
    }

    let contents = read_source(path)?;

    let docs: Vec<DesignDocument> = if is_yaml(path) {
        serde_yaml::from_str(&contents).map_err(|source| DesiredError::Yaml {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        serde_json::from_str(&contents).map_err(|source| DesiredError::Json {
            path: path.to_path_buf(),
            source,
        })?
    };

    validate(&docs)?;
    Ok(docs)
}

/// Load and validate the desired set from the directory tree at `dir`.
///
/// `<doc>/<view>/map.js` is required. `reduce.js` is optional; only its
/// absence is tolerated, any other error reading it is returned.
pub fn load_desired_dir_at(dir: &Path) -> Result<Vec<DesignDocument>, DesiredError> {
    let mut docs = Vec::new();
    for doc_dir in sorted_entries(dir)? {
        let mut doc = DesignDocument::new(&entry_name(&doc_dir));
        for view_dir in sorted_entries(&doc_dir)? {
            let map = read_source(&view_dir.join(MAP_FILE))?;
            let reduce_path = view_dir.join(REDUCE_FILE);
            let view = match std::fs::read_to_string(&reduce_path) {
                Ok(reduce) => View::map_reduce(map, reduce),
                Err(e) if e.kind() == io::ErrorKind::NotFound => View::map(map),
                Err(source) => {
                    return Err(DesiredError::Io {
                        path: reduce_path,
                        source,
                    })
                }
            };
            doc = doc.with_view(entry_name(&view_dir), view);
        }
        docs.push(doc);
    }

    validate(&docs)?;
    Ok(docs)
}

/// Check the collection invariants: `_design/<name>` ids, unique ids.
pub fn validate(docs: &[DesignDocument]) -> Result<(), DesiredError> {
    let mut seen = HashSet::new();
    for doc in docs {
        let id = doc.id();
        let Some(name) = id.strip_prefix(DESIGN_PREFIX) else {
            return Err(DesiredError::MissingPrefix { id: id.to_string() });
        };
        if name.is_empty() {
            return Err(DesiredError::EmptyName { id: id.to_string() });
        }
        if !seen.insert(id) {
            return Err(DesiredError::DuplicateId { id: id.to_string() });
        }
    }
    Ok(())
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, DesiredError> {
    let io_err = |source: io::Error| DesiredError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = std::fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    paths.sort();
    Ok(paths)
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_source(path: &Path) -> Result<String, DesiredError> {
    std::fs::read_to_string(path).map_err(|source| DesiredError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
