// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Placeholder substitution. */

use {
    crate::{
        config::ProvisioningConfig,
        document::DocumentService,
        error::{Result, SignatureError},
        identity::IdentityProfile,
    },
    log::info,
};

/// A named placeholder recognized in signature templates.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Placeholder {
    DisplayName,
    Email,
    Title,
}

impl Placeholder {
    pub const ALL: [Placeholder; 3] = [Self::DisplayName, Self::Email, Self::Title];

    /// The literal token marking this placeholder in a template.
    pub fn token(&self) -> &'static str {
        match self {
            Self::DisplayName => "{DisplayName}",
            Self::Email => "{Email}",
            Self::Title => "{Title}",
        }
    }
}

/// Replacement values for every [Placeholder].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlaceholderBindings {
    display_name: String,
    email: String,
    title: String,
}

impl PlaceholderBindings {
    /// Resolve bindings from a profile, falling back to configured defaults.
    ///
    /// Empty profile values are treated the same as missing ones.
    pub fn resolve(profile: &IdentityProfile, config: &ProvisioningConfig) -> Self {
        fn pick(value: &Option<String>, fallback: &str) -> String {
            match value.as_deref() {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => fallback.to_string(),
            }
        }

        Self {
            display_name: pick(&profile.display_name, &config.fallback_display_name),
            email: pick(&profile.email_address, &config.fallback_email),
            title: pick(&profile.title, &config.fallback_title),
        }
    }

    pub fn value(&self, placeholder: Placeholder) -> &str {
        match placeholder {
            Placeholder::DisplayName => &self.display_name,
            Placeholder::Email => &self.email,
            Placeholder::Title => &self.title,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Placeholder, &str)> + '_ {
        Placeholder::ALL.into_iter().map(move |p| (p, self.value(p)))
    }
}

/// Replace every placeholder in the active document.
pub fn substitute_placeholders<S: DocumentService + ?Sized>(
    document: &mut S,
    bindings: &PlaceholderBindings,
) -> Result<()> {
    for (placeholder, value) in bindings.iter() {
        info!("replacing {} with \"{}\"", placeholder.token(), value);
        document
            .find_and_replace(placeholder.token(), value)
            .map_err(SignatureError::DocumentService)?;
    }

    Ok(())
}
