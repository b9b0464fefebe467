//! Secret snapshots and their on-disk form.
//!
//! A [`SecretSnapshot`] is validated at construction: names are non-empty and
//! unique, every secret has a value. Once built it is read-only.
//!
//! The persisted file is pretty-printed JSON holding the secrets as an array,
//! so that a duplicated name in a hand-edited file is rejected instead of
//! being silently collapsed by a map parser.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::btree_map::{self, BTreeMap};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::errors::{Error, Result};
use crate::secrets::{SecretScope, SecretString};

/// Version of the persisted snapshot layout
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Optional metadata reported by the provider for a secret
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretMetadata {
    /// Secret version, if the provider versions secrets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,

    /// When this version was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One secret in a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretEntry {
    pub value: SecretString,
    pub metadata: SecretMetadata,
}

impl SecretEntry {
    pub fn new(value: impl Into<SecretString>) -> Self {
        Self { value: value.into(), metadata: SecretMetadata::default() }
    }

    pub fn with_metadata(mut self, metadata: SecretMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.metadata.version = Some(version);
        self
    }
}

/// Secret names mapped to values, captured at one point in time
#[derive(Debug, Clone)]
pub struct SecretSnapshot {
    captured_at: DateTime<Utc>,
    scope: Option<SecretScope>,
    secrets: BTreeMap<String, SecretEntry>,
}

impl SecretSnapshot {
    /// A snapshot with no secrets, used as "no prior state"
    pub fn empty() -> Self {
        Self { captured_at: Utc::now(), scope: None, secrets: BTreeMap::new() }
    }

    /// Build a snapshot, rejecting empty and duplicate names
    pub fn from_entries<I, N>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, SecretEntry)>,
        N: Into<String>,
    {
        let mut secrets = BTreeMap::new();
        for (name, entry) in entries {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(Error::invalid_snapshot("secret with an empty name"));
            }
            match secrets.entry(name) {
                btree_map::Entry::Occupied(slot) => {
                    return Err(Error::invalid_secret(slot.key().clone(), "name appears more than once"));
                }
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
            }
        }

        Ok(Self { captured_at: Utc::now(), scope: None, secrets })
    }

    /// Shorthand for tests and callers holding plain name/value pairs
    pub fn from_values<I, N, V>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<SecretString>,
    {
        Self::from_entries(values.into_iter().map(|(name, value)| (name, SecretEntry::new(value))))
    }

    pub fn with_scope(mut self, scope: SecretScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_captured_at(mut self, captured_at: DateTime<Utc>) -> Self {
        self.captured_at = captured_at;
        self
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn scope(&self) -> Option<&SecretScope> {
        self.scope.as_ref()
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SecretEntry> {
        self.secrets.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.secrets.contains_key(name)
    }

    /// Secret names in ascending order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.secrets.keys().map(String::as_str)
    }

    /// Entries in ascending name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SecretEntry)> {
        self.secrets.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// SHA-256 over the sorted name/value pairs, hex encoded.
    ///
    /// Two snapshots with the same fingerprint hold the same secrets, so the
    /// fingerprint can be shown or compared without exposing any value.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (name, entry) in &self.secrets {
            let value = entry.value.expose_secret();
            hasher.update((name.len() as u64).to_be_bytes());
            hasher.update(name.as_bytes());
            hasher.update((value.len() as u64).to_be_bytes());
            hasher.update(value.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Parse a persisted snapshot document
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let file: SnapshotFile = serde_json::from_str(contents)
            .map_err(|e| Error::serialization(e, "parsing snapshot document"))?;
        file.into_snapshot()
    }

    /// Render the persisted snapshot document, secret values included
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&SnapshotFile::from_snapshot(self))
            .map_err(|e| Error::serialization(e, "serializing snapshot document"))
    }

    /// Load a snapshot file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::io(e, format!("reading snapshot file {}", path.display())))?;
        let snapshot = Self::from_json_str(&contents).map_err(|e| match e {
            Error::Serialization { source, .. } => {
                Error::serialization(source, format!("parsing snapshot file {}", path.display()))
            }
            other => other,
        })?;

        debug!(path = %path.display(), secrets = snapshot.len(), "Loaded snapshot");
        Ok(snapshot)
    }

    /// Write the snapshot to `path`, replacing any previous file.
    ///
    /// The document goes to a uniquely named temporary file in the same
    /// directory, which is then renamed into place. The temporary file is
    /// created with mode `0600` on Unix and removed if any step fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = self.to_json_string()?;

        let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)
                    .map_err(|e| Error::io(e, format!("creating directory {}", parent.display())))?;
                parent
            }
            None => Path::new("."),
        };

        let mut file = tempfile::Builder::new()
            .prefix(".hcvss-snapshot-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| Error::io(e, format!("creating temporary file in {}", dir.display())))?;

        file.write_all(contents.as_bytes())
            .and_then(|_| file.write_all(b"\n"))
            .and_then(|_| file.as_file().sync_all())
            .map_err(|e| Error::io(e, format!("writing {}", file.path().display())))?;

        file.persist(path).map_err(|e| {
            Error::io(e.error, format!("replacing snapshot file {}", path.display()))
        })?;

        info!(path = %path.display(), secrets = self.len(), "Saved snapshot");
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    format_version: u32,
    captured_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<SecretScope>,
    #[serde(default)]
    secrets: Vec<SnapshotFileEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFileEntry {
    name: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(flatten)]
    metadata: SecretMetadata,
}

impl SnapshotFile {
    fn from_snapshot(snapshot: &SecretSnapshot) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            captured_at: snapshot.captured_at,
            scope: snapshot.scope.clone(),
            secrets: snapshot
                .iter()
                .map(|(name, entry)| SnapshotFileEntry {
                    name: name.to_string(),
                    value: Some(entry.value.expose_secret().to_string()),
                    metadata: entry.metadata.clone(),
                })
                .collect(),
        }
    }

    fn into_snapshot(self) -> Result<SecretSnapshot> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(Error::invalid_snapshot(format!(
                "unsupported snapshot format version {} (expected {})",
                self.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        let mut entries = Vec::with_capacity(self.secrets.len());
        for secret in self.secrets {
            let Some(value) = secret.value else {
                return Err(Error::invalid_secret(secret.name, "value is missing or null"));
            };
            entries.push((secret.name, SecretEntry::new(value).with_metadata(secret.metadata)));
        }

        let mut snapshot = SecretSnapshot::from_entries(entries)?.with_captured_at(self.captured_at);
        snapshot.scope = self.scope;
        Ok(snapshot)
    }
}
