// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Locking signature assignments in the Office configuration. */

use {
    crate::{
        error::{Result, SignatureError},
        render::ArtifactSet,
        slot::SignatureType,
    },
    log::info,
    std::fmt::{Display, Formatter},
};

/// Value holding the locked new message signature.
pub const NEW_SIGNATURE_KEY: &str = "NewSignature";

/// Value holding the locked reply signature.
pub const REPLY_SIGNATURE_KEY: &str = "ReplySignature";

/// Value holding the signature used for all mail.
///
/// Written alongside both per-slot values so the aggregate stays in sync.
pub const AGGREGATE_SIGNATURE_KEY: &str = "NewSignature, ReplySignature";

/// A supported Microsoft Office release.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum OfficeVersion {
    Office2010,
    Office2013,
    Office2016,
}

impl OfficeVersion {
    /// Selectors in order of precedence.
    pub const ALL: [OfficeVersion; 3] = [Self::Office2010, Self::Office2013, Self::Office2016];

    /// Resolve a command line selector (`10`, `13` or `16`).
    pub fn from_selector(value: &str) -> Option<Self> {
        match value {
            "10" => Some(Self::Office2010),
            "13" => Some(Self::Office2013),
            "16" => Some(Self::Office2016),
            _ => None,
        }
    }

    pub fn selector(&self) -> &'static str {
        match self {
            Self::Office2010 => "10",
            Self::Office2013 => "13",
            Self::Office2016 => "16",
        }
    }

    /// The internal major version used in registry paths.
    pub fn major_version(&self) -> u32 {
        match self {
            Self::Office2010 => 14,
            Self::Office2013 => 15,
            Self::Office2016 => 16,
        }
    }

    /// The configuration namespace holding mail settings for this release.
    pub fn mail_settings_namespace(&self) -> String {
        format!(
            "Software\\Microsoft\\Office\\{}.0\\Common\\MailSettings",
            self.major_version()
        )
    }
}

impl Display for OfficeVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Office2010 => "Office 2010",
            Self::Office2013 => "Office 2013",
            Self::Office2016 => "Office 2016",
        })
    }
}

/// A persistent store of string values grouped into namespaces.
pub trait ConfigStore {
    fn namespace_exists(&self, namespace: &str) -> anyhow::Result<bool>;

    fn set_string(&mut self, namespace: &str, key: &str, value: &str) -> anyhow::Result<()>;
}

/// The keys written to lock a signature of the given type.
pub fn lock_keys(signature_type: SignatureType) -> &'static [&'static str] {
    match signature_type {
        SignatureType::New => &[NEW_SIGNATURE_KEY],
        SignatureType::Reply => &[REPLY_SIGNATURE_KEY],
        SignatureType::Both => &[
            NEW_SIGNATURE_KEY,
            REPLY_SIGNATURE_KEY,
            AGGREGATE_SIGNATURE_KEY,
        ],
    }
}

/// Write the lock configuration for a provisioned signature.
///
/// Fails without writing anything when no Office version is known or its
/// namespace does not exist. Returns the keys written.
pub fn persist_lock<C: ConfigStore + ?Sized>(
    store: &mut C,
    version: Option<OfficeVersion>,
    signature_type: SignatureType,
    artifacts: &ArtifactSet,
) -> Result<Vec<&'static str>> {
    let version = version.ok_or(SignatureError::MissingClientVersion)?;
    let namespace = version.mail_settings_namespace();

    let exists = store
        .namespace_exists(&namespace)
        .map_err(|error| SignatureError::ConfigNamespaceUnavailable {
            namespace: namespace.clone(),
            error,
        })?;
    if !exists {
        return Err(SignatureError::ConfigNamespaceMissing(namespace));
    }

    let keys = lock_keys(signature_type);
    for key in keys {
        info!(
            "locking {} to \"{}\" for {}",
            key,
            artifacts.base_name(),
            version
        );
        store
            .set_string(&namespace, key, artifacts.base_name())
            .map_err(|error| SignatureError::ConfigWrite {
                namespace: namespace.clone(),
                key: key.to_string(),
                error,
            })?;
    }

    Ok(keys.to_vec())
}
