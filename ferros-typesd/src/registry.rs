//! Type registry.
//!
//! Loads every interface definition (`.msg`/`.srv`/`.action` with a sibling
//! `HashedTypeDescription` JSON file) found under the ament share trees and
//! answers wildcard lookups by key-expression intersection.

use crate::descriptor::HashedTypeDescription;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use thiserror::Error;
use zenoh::key_expr::{OwnedKeyExpr, keyexpr};

/// Separator rosbag2 puts between concatenated schema sections.
const MCAP_SCHEMA_SEPARATOR: &str =
    "\n================================================================================\n";

/// Interface definition kind, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// A `.msg` message definition.
    Msg,
    /// A `.srv` service definition.
    Srv,
    /// An `.action` definition.
    Action,
}

impl TypeKind {
    /// Map a file extension to a kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "msg" => Some(Self::Msg),
            "srv" => Some(Self::Srv),
            "action" => Some(Self::Action),
            _ => None,
        }
    }

    /// The uppercase tag used in MCAP schema headers and type names.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Msg => "MSG",
            Self::Srv => "SRV",
            Self::Action => "ACTION",
        }
    }

    /// The name segment (`msg`/`srv`/`action`) inside a full type name.
    pub fn segment(&self) -> &'static str {
        match self {
            Self::Msg => "msg",
            Self::Srv => "srv",
            Self::Action => "action",
        }
    }
}

/// Errors raised while loading one definition into the registry.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The definition has no sibling JSON description.
    #[error("no JSON description found for {0}")]
    MissingDescription(PathBuf),

    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The JSON description did not parse.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The described type name is malformed.
    #[error("invalid type name '{name}': {reason}")]
    InvalidTypeName {
        /// The offending name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The type name's kind segment does not match the definition file.
    #[error("type '{name}' declares kind '{found}', expected '{expected}'")]
    KindMismatch {
        /// The offending name.
        name: String,
        /// Kind implied by the file extension.
        expected: &'static str,
        /// Kind segment found in the name.
        found: String,
    },

    /// No hash entry exists for the described type.
    #[error("no hash found for type '{name}' in {path}")]
    MissingHash {
        /// The type missing its hash.
        name: String,
        /// Description file that was searched.
        path: PathBuf,
    },

    /// The same type name was already loaded with a different hash.
    #[error("conflicting hash for '{name}': loaded from {existing}, now found in {incoming}")]
    HashConflict {
        /// The conflicting type name.
        name: String,
        /// Description file of the first load.
        existing: PathBuf,
        /// Description file of the rejected load.
        incoming: PathBuf,
    },
}

/// Everything known about one loaded interface type.
#[derive(Debug)]
pub struct TypeInfo {
    /// Full type name as a key expression, e.g. `std_msgs/msg/String`.
    pub full_name: OwnedKeyExpr,
    /// Package segment, e.g. `std_msgs`.
    pub package: String,
    /// Final name segment, e.g. `String`.
    pub short_name: String,
    /// Definition kind.
    pub kind: TypeKind,
    /// The parsed hashed type description.
    pub description: HashedTypeDescription,
    /// The type's own RIHS01 hash.
    pub type_hash: String,
    /// Path of the JSON description file.
    pub json_path: PathBuf,
    /// Path of the `.msg`/`.srv`/`.action` file.
    pub definition_path: PathBuf,
    /// Raw content of the definition file.
    pub definition_content: String,
}

impl TypeInfo {
    /// `<package>/<Short>`, the spelling rosbag2 uses for dependencies.
    pub fn short_type_name(&self) -> String {
        format!("{}/{}", self.package, self.short_name)
    }
}

/// Registry of every loaded interface type, keyed by full type name.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeInfo>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of loaded types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Walk `dir` and load every interface definition found beneath it.
    ///
    /// Returns the number of newly loaded types; individual failures are
    /// logged and skipped.
    pub fn load_dir(&mut self, dir: &Path) -> usize {
        tracing::debug!("loading types from {}", dir.display());

        let mut count = 0usize;
        for entry in walkdir::WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| {
                if let Err(err) = &entry {
                    tracing::warn!("error walking {}: {err}", dir.display());
                }
                entry.ok()
            })
            .filter(|e| e.path().is_file())
        {
            let Some(kind) = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .and_then(TypeKind::from_extension)
            else {
                continue;
            };

            match self.load_file(entry.path(), kind) {
                Ok(true) => count += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!("  {e}"),
            }
        }

        tracing::info!("{count} types loaded from {}", dir.display());
        count
    }

    /// Load one definition file and its sibling JSON description.
    ///
    /// Returns `Ok(false)` when the same type with the same hash was
    /// already loaded (harmless duplicate across overlay prefixes).
    ///
    /// # Errors
    ///
    /// See [`LoadError`]; a conflicting hash for an already-loaded name is
    /// rejected, the first load wins.
    pub fn load_file(&mut self, definition_path: &Path, kind: TypeKind) -> Result<bool, LoadError> {
        let json_path = definition_path.with_extension("json");
        if !json_path.exists() {
            return Err(LoadError::MissingDescription(definition_path.to_path_buf()));
        }

        let json = std::fs::read_to_string(&json_path).map_err(|source| LoadError::Io {
            path: json_path.clone(),
            source,
        })?;
        let description: HashedTypeDescription =
            serde_json::from_str(&json).map_err(|source| LoadError::Parse {
                path: json_path.clone(),
                source,
            })?;

        let type_name = description
            .type_description_msg
            .type_description
            .type_name
            .clone();
        let full_name = OwnedKeyExpr::try_from(type_name.clone()).map_err(|e| {
            LoadError::InvalidTypeName {
                name: type_name.clone(),
                reason: e.to_string(),
            }
        })?;

        let segments: Vec<&str> = full_name.as_str().split('/').collect();
        if segments.len() != 3 {
            return Err(LoadError::InvalidTypeName {
                name: type_name,
                reason: "expected <package>/<kind>/<name>".to_string(),
            });
        }
        let (package, kind_segment, short_name) = (segments[0], segments[1], segments[2]);
        if kind_segment != kind.segment() {
            return Err(LoadError::KindMismatch {
                name: type_name,
                expected: kind.segment(),
                found: kind_segment.to_string(),
            });
        }

        let type_hash = description
            .hash_for(full_name.as_str())
            .ok_or_else(|| LoadError::MissingHash {
                name: type_name.clone(),
                path: json_path.clone(),
            })?
            .to_string();

        if let Some(existing) = self.types.get(full_name.as_str()) {
            if existing.type_hash == type_hash {
                return Ok(false);
            }
            return Err(LoadError::HashConflict {
                name: type_name,
                existing: existing.json_path.clone(),
                incoming: json_path,
            });
        }

        let definition_content =
            std::fs::read_to_string(definition_path).map_err(|source| LoadError::Io {
                path: definition_path.to_path_buf(),
                source,
            })?;

        tracing::debug!("{} loaded from {}", full_name, json_path.display());

        let info = TypeInfo {
            package: package.to_string(),
            short_name: short_name.to_string(),
            kind,
            description,
            type_hash,
            json_path,
            definition_path: definition_path.to_path_buf(),
            definition_content,
            full_name,
        };
        self.types.insert(info.full_name.to_string(), info);

        Ok(true)
    }

    /// Every loaded type whose full name intersects `pattern`.
    pub fn matching(&self, pattern: &keyexpr) -> Vec<&TypeInfo> {
        self.types
            .values()
            .filter(|info| pattern.intersects(&info.full_name))
            .collect()
    }

    /// Look a single type up by its exact full name.
    pub fn get(&self, full_name: &str) -> Option<&TypeInfo> {
        self.types.get(full_name)
    }

    /// Concatenated schema for MCAP recording, in the same shape as
    /// rosbag2's `local_message_definition_source`: the type's own
    /// definition followed by each referenced definition behind a separator
    /// line. Missing dependencies are logged and skipped.
    pub fn mcap_schema(&self, info: &TypeInfo) -> String {
        let mut schema = info.definition_content.clone();

        for dep in &info.description.type_description_msg.referenced_type_descriptions {
            let Some(dep_info) = self.get(&dep.type_name) else {
                tracing::warn!(
                    "dependency {} of {} is not in the registry",
                    dep.type_name,
                    info.full_name
                );
                continue;
            };

            schema.push_str(MCAP_SCHEMA_SEPARATOR);
            schema.push_str(dep_info.kind.tag());
            schema.push_str(": ");
            schema.push_str(&dep_info.short_type_name());
            schema.push('\n');
            schema.push_str(&dep_info.definition_content);
        }

        schema
    }
}
