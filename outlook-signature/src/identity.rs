// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Resolution of the current user's directory profile. */

use {
    crate::{
        error::SignatureError,
        util::{ldap_filter_escape, powershell_quote, POWERSHELL, POWERSHELL_ARGS},
    },
    anyhow::{anyhow, Context, Result},
    log::{debug, warn},
    std::path::Path,
};

/// Attributes of a user that can be merged into a signature.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IdentityProfile {
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub title: Option<String>,
}

/// Something that can look up the profile of a user by account name.
pub trait IdentityResolver {
    fn resolve(&self, user_name: &str) -> Result<IdentityProfile>;
}

/// Obtain the account name of the user running this process.
pub fn current_user_name() -> std::result::Result<String, SignatureError> {
    ["USERNAME", "USER"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .ok_or(SignatureError::UnknownUser)
}

/// Resolves profiles from Active Directory.
///
/// The query is performed by a PowerShell `[adsisearcher]` against the domain
/// of the current machine. The `displayname`, `mail` and `description`
/// attributes are read. A profile missing any of them is a lookup failure.
#[derive(Clone, Debug, Default)]
pub struct DirectoryIdentityResolver {}

impl DirectoryIdentityResolver {
    fn query_script(user_name: &str) -> String {
        let filter = format!(
            "(&(objectCategory=User)(samAccountName={}))",
            ldap_filter_escape(user_name)
        );

        format!(
            "$ErrorActionPreference = 'Stop'; \
             $user = ([adsisearcher]{}).FindOne(); \
             if ($user -eq $null) {{ throw 'no directory record found' }}; \
             foreach ($name in 'displayname', 'mail', 'description') {{ \
             $values = $user.Properties[$name]; \
             if ($values.Count -gt 0) {{ [string]$values[0] }} else {{ '' }} }}",
            powershell_quote(&filter)
        )
    }
}

impl IdentityResolver for DirectoryIdentityResolver {
    fn resolve(&self, user_name: &str) -> Result<IdentityProfile> {
        let mut args = POWERSHELL_ARGS
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        args.push(Self::query_script(user_name));

        debug!("querying directory for {}", user_name);
        let output = duct::cmd(POWERSHELL, args)
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .with_context(|| format!("running {}", POWERSHELL))?;

        if !output.status.success() {
            return Err(anyhow!(
                "directory query failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        parse_directory_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse the three attribute lines emitted by the directory query.
fn parse_directory_output(output: &str) -> Result<IdentityProfile> {
    let mut lines = output.lines().map(str::trim);

    let mut next = |attribute: &str| match lines.next() {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(anyhow!("directory attribute {} is missing", attribute)),
    };

    let display_name = next("displayname")?;
    let email_address = next("mail")?;
    let title = next("description")?;

    Ok(IdentityProfile {
        display_name: Some(display_name),
        email_address: Some(email_address),
        title: Some(title),
    })
}

/// Profile values supplied by the user that take precedence over the directory.
///
/// Parsed from `key=value` lines. Recognized keys are `DisplayName`, `Email`
/// and `Title`, matched case-insensitively.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProfileOverrides {
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub title: Option<String>,
}

impl ProfileOverrides {
    pub fn parse(data: &str) -> Self {
        let mut overrides = Self::default();

        for line in data.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // A key without a value maps to an empty value.
            let (key, value) = match line.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (line, ""),
            };

            let slot = match key.to_ascii_lowercase().as_str() {
                "displayname" => &mut overrides.display_name,
                "email" | "emailaddress" => &mut overrides.email_address,
                "title" => &mut overrides.title,
                _ => {
                    warn!("ignoring unknown variable {}", key);
                    continue;
                }
            };

            *slot = Some(value.to_string());
        }

        overrides
    }

    /// Read overrides from a file.
    pub fn from_path(path: &Path) -> std::result::Result<Self, SignatureError> {
        if !path.is_file() {
            return Err(SignatureError::VariablesNotFound(path.to_path_buf()));
        }

        Ok(Self::parse(&std::fs::read_to_string(path)?))
    }

    /// Whether every profile attribute is overridden.
    pub fn is_complete(&self) -> bool {
        self.display_name.is_some() && self.email_address.is_some() && self.title.is_some()
    }

    pub fn apply(&self, profile: IdentityProfile) -> IdentityProfile {
        IdentityProfile {
            display_name: self.display_name.clone().or(profile.display_name),
            email_address: self.email_address.clone().or(profile.email_address),
            title: self.title.clone().or(profile.title),
        }
    }
}

/// An [IdentityResolver] layering [ProfileOverrides] over another resolver.
///
/// The inner resolver is not consulted when the overrides are complete.
#[derive(Clone, Debug)]
pub struct OverlayIdentityResolver<R> {
    inner: R,
    overrides: ProfileOverrides,
}

impl<R: IdentityResolver> OverlayIdentityResolver<R> {
    pub fn new(inner: R, overrides: ProfileOverrides) -> Self {
        Self { inner, overrides }
    }
}

impl<R: IdentityResolver> IdentityResolver for OverlayIdentityResolver<R> {
    fn resolve(&self, user_name: &str) -> Result<IdentityProfile> {
        if self.overrides.is_complete() {
            debug!("all profile attributes overridden; skipping directory lookup");
            return Ok(self.overrides.apply(IdentityProfile::default()));
        }

        Ok(self.overrides.apply(self.inner.resolve(user_name)?))
    }
}
