// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory stand-ins for the external services.

use {
    crate::{
        document::{DocumentService, ExportFormat, SignatureSlot},
        identity::{IdentityProfile, IdentityResolver},
        persist::ConfigStore,
    },
    anyhow::{anyhow, Result},
    std::{
        collections::BTreeMap,
        path::{Path, PathBuf},
    },
};

/// A [DocumentService] that treats documents as UTF-8 text.
///
/// Every call is recorded so tests can inspect what the pipeline did.
#[derive(Clone, Debug, Default)]
pub struct TextDocumentService {
    pub(crate) content: Option<String>,
    /// Path of the most recently opened document.
    pub opened_path: Option<PathBuf>,
    /// Every `(path, format)` exported, in order.
    pub exports: Vec<(PathBuf, ExportFormat)>,
    /// Every `(slot, name)` assignment, in order.
    pub assignments: Vec<(SignatureSlot, String)>,
    pub close_count: usize,
    /// Refuse to open any document.
    pub fail_open: bool,
    /// Fail when exporting this format.
    pub fail_export: Option<ExportFormat>,
}

impl TextDocumentService {
    pub fn is_open(&self) -> bool {
        self.content.is_some()
    }

    /// The signature currently assigned to a slot.
    pub fn assigned(&self, slot: SignatureSlot) -> Option<&str> {
        self.assignments
            .iter()
            .rev()
            .find(|(s, _)| *s == slot)
            .map(|(_, name)| name.as_str())
    }

    fn active(&mut self) -> Result<&mut String> {
        self.content
            .as_mut()
            .ok_or_else(|| anyhow!("no active document"))
    }
}

impl DocumentService for TextDocumentService {
    fn open(&mut self, path: &Path) -> Result<()> {
        if self.fail_open {
            return Err(anyhow!("document service is unavailable"));
        }

        self.content = Some(std::fs::read_to_string(path)?);
        self.opened_path = Some(path.to_path_buf());

        Ok(())
    }

    fn find_and_replace(&mut self, token: &str, replacement: &str) -> Result<()> {
        let content = self.active()?;
        *content = content.replace(token, replacement);

        Ok(())
    }

    fn export_as(&mut self, path: &Path, format: ExportFormat) -> Result<()> {
        if self.fail_export == Some(format) {
            return Err(anyhow!("refusing to save {}", format));
        }

        let text = self.active()?.clone();
        let rendered = match format {
            ExportFormat::Html => format!("<html>\n<body>\n<p>{}</p>\n</body>\n</html>\n", text),
            ExportFormat::RichText => format!("{{\\rtf1\\ansi {}}}\n", text),
            ExportFormat::PlainText => text,
        };

        std::fs::write(path, rendered)?;
        self.exports.push((path.to_path_buf(), format));

        Ok(())
    }

    fn set_default_signature(&mut self, slot: SignatureSlot, name: &str) -> Result<()> {
        self.active()?;
        self.assignments.push((slot, name.to_string()));

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.content = None;
        self.close_count += 1;

        Ok(())
    }
}

/// An [IdentityResolver] returning a fixed profile.
#[derive(Clone, Debug, Default)]
pub struct StaticIdentityResolver(pub IdentityProfile);

impl IdentityResolver for StaticIdentityResolver {
    fn resolve(&self, _user_name: &str) -> Result<IdentityProfile> {
        Ok(self.0.clone())
    }
}

/// An [IdentityResolver] that always fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingIdentityResolver;

impl IdentityResolver for FailingIdentityResolver {
    fn resolve(&self, user_name: &str) -> Result<IdentityProfile> {
        Err(anyhow!("no directory record for {}", user_name))
    }
}

/// A [ConfigStore] backed by nested maps.
#[derive(Clone, Debug, Default)]
pub struct MemoryConfigStore {
    pub namespaces: BTreeMap<String, BTreeMap<String, String>>,
    /// Reject every write.
    pub deny_writes: bool,
}

impl MemoryConfigStore {
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl ToString) -> Self {
        self.namespaces.entry(namespace.to_string()).or_default();
        self
    }

    pub fn value(&self, namespace: &str, key: &str) -> Option<&str> {
        self.namespaces
            .get(namespace)
            .and_then(|values| values.get(key))
            .map(|v| v.as_str())
    }

    /// Total number of values written across all namespaces.
    pub fn value_count(&self) -> usize {
        self.namespaces.values().map(|values| values.len()).sum()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn namespace_exists(&self, namespace: &str) -> Result<bool> {
        Ok(self.namespaces.contains_key(namespace))
    }

    fn set_string(&mut self, namespace: &str, key: &str, value: &str) -> Result<()> {
        if self.deny_writes {
            return Err(anyhow!("access denied"));
        }

        self.namespaces
            .get_mut(namespace)
            .ok_or_else(|| anyhow!("{} does not exist", namespace))?
            .insert(key.to_string(), value.to_string());

        Ok(())
    }
}
