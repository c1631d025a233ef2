// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    crate::{
        document::{DocumentService, SignatureSlot},
        error::{Result, SignatureError},
        render::ArtifactSet,
    },
    log::info,
};

/// Which default signatures a provisioned signature is used for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SignatureType {
    /// New messages only.
    New,
    /// Replies and forwards only.
    Reply,
    /// New messages and replies.
    Both,
}

impl SignatureType {
    /// Derive the type from the "new messages only" and "replies only" options.
    ///
    /// Neither option means both slots. If both are set, new messages win.
    pub fn from_options(new_only: bool, replies_only: bool) -> Self {
        if new_only {
            Self::New
        } else if replies_only {
            Self::Reply
        } else {
            Self::Both
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "New Message",
            Self::Reply => "Replies",
            Self::Both => "All Mail",
        }
    }

    /// The client slots this type occupies.
    pub fn slots(&self) -> &'static [SignatureSlot] {
        match self {
            Self::New => &[SignatureSlot::NewMessage],
            Self::Reply => &[SignatureSlot::Reply],
            Self::Both => &[SignatureSlot::NewMessage, SignatureSlot::Reply],
        }
    }

    /// The name shared by the signature files and the client registration.
    pub fn artifact_base_name(&self, user_name: &str) -> String {
        format!("{} - {}", user_name, self.label())
    }
}

/// Register rendered signatures as the client defaults.
///
/// Returns the slots that were assigned.
pub fn assign_slots<S: DocumentService + ?Sized>(
    document: &mut S,
    signature_type: SignatureType,
    artifacts: &ArtifactSet,
) -> Result<Vec<SignatureSlot>> {
    let name = artifacts.base_name();

    for slot in signature_type.slots() {
        info!("setting {} signature to \"{}\"", slot, name);
        document
            .set_default_signature(*slot, name)
            .map_err(|error| SignatureError::SlotAssignment {
                slot: *slot,
                name: name.to_string(),
                error,
            })?;
    }

    Ok(signature_type.slots().to_vec())
}
