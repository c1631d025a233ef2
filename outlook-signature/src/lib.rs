// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Provision Microsoft Outlook e-mail signatures from document templates.

A template containing the `{DisplayName}`, `{Email}` and `{Title}` placeholders
is filled in with the current user's directory profile, saved as HTML, RTF and
plain text into the Outlook signatures directory, and registered as the default
signature for new messages and/or replies. The assignment can optionally be
locked in the Office registry settings.

The external services involved are abstracted behind [IdentityResolver],
[DocumentService] and [ConfigStore] so [Provisioner] can run against any
implementation.
*/

mod config;
pub use config::{
    default_signatures_directory, ProvisioningConfig, DEFAULT_FALLBACK_EMAIL,
    DEFAULT_FALLBACK_TITLE,
};
mod document;
pub use document::{DocumentService, ExportFormat, OpenDocument, SignatureSlot};
mod error;
pub use error::{ErrorKind, Result, SignatureError};
mod identity;
pub use identity::{
    current_user_name, DirectoryIdentityResolver, IdentityProfile, IdentityResolver,
    OverlayIdentityResolver, ProfileOverrides,
};
mod persist;
pub use persist::{
    lock_keys, persist_lock, ConfigStore, OfficeVersion, AGGREGATE_SIGNATURE_KEY,
    NEW_SIGNATURE_KEY, REPLY_SIGNATURE_KEY,
};
mod pipeline;
pub use pipeline::{ProvisioningOutcome, ProvisioningRequest, Provisioner};
mod registry;
pub use registry::RegistryConfigStore;
mod render;
pub use render::{ensure_signatures_directory, render_artifacts, ArtifactSet};
mod slot;
pub use slot::{assign_slots, SignatureType};
mod substitution;
pub use substitution::{substitute_placeholders, Placeholder, PlaceholderBindings};
mod template;
pub use template::{TemplateSource, WorkingCopy, TEMPLATE_EXTENSION};
#[cfg(test)]
mod testutil;
mod util;
mod word;
pub use word::WordDocumentService;
