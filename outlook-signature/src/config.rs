// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    crate::error::{Result, SignatureError},
    serde::Deserialize,
    std::path::{Path, PathBuf},
};

/// Substituted for `{Email}` when the directory has no address.
pub const DEFAULT_FALLBACK_EMAIL: &str = "help@example-default.com";

/// Substituted for `{Title}` when the directory has no title.
pub const DEFAULT_FALLBACK_TITLE: &str = "Junior Employee";

/// Settings controlling how signatures are provisioned.
///
/// Instances are typically parsed from a YAML file, where every key is optional:
///
/// ```yaml
/// fallback_display_name: ""
/// fallback_email: help@example-default.com
/// fallback_title: Junior Employee
/// signatures_dir: C:\Users\me\AppData\Roaming\Microsoft\Signatures
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisioningConfig {
    /// Value for `{DisplayName}` when the profile has none.
    pub fallback_display_name: String,

    /// Value for `{Email}` when the profile has none.
    pub fallback_email: String,

    /// Value for `{Title}` when the profile has none.
    pub fallback_title: String,

    /// Directory rendered signatures are written to.
    ///
    /// Defaults to the per-user Outlook signatures directory.
    pub signatures_dir: Option<PathBuf>,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            fallback_display_name: String::new(),
            fallback_email: DEFAULT_FALLBACK_EMAIL.to_string(),
            fallback_title: DEFAULT_FALLBACK_TITLE.to_string(),
            signatures_dir: None,
        }
    }
}

impl ProvisioningConfig {
    /// Parse an instance from YAML text.
    pub fn from_yaml_str(data: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(data)
    }

    /// Parse an instance from a YAML file.
    pub fn from_yaml_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(SignatureError::ConfigNotFound(path.to_path_buf()));
        }

        let data = std::fs::read_to_string(path)?;

        Self::from_yaml_str(&data).map_err(|e| SignatureError::ConfigParse(path.to_path_buf(), e))
    }

    /// Resolve the directory rendered signatures should be written to.
    pub fn signatures_directory(&self) -> Result<PathBuf> {
        match &self.signatures_dir {
            Some(path) => Ok(path.clone()),
            None => default_signatures_directory(),
        }
    }
}

/// The directory Outlook reads signatures from for the current user.
///
/// This is `Microsoft\Signatures` under the roaming application data directory.
pub fn default_signatures_directory() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join("Microsoft").join("Signatures"))
        .ok_or(SignatureError::AppDataUnavailable)
}
