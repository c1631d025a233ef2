// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Interface to the document editing service. */

use {
    anyhow::Result,
    log::warn,
    std::{
        fmt::{Display, Formatter},
        ops::{Deref, DerefMut},
        path::Path,
    },
};

/// An output format a signature document can be saved as.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ExportFormat {
    Html,
    RichText,
    PlainText,
}

impl ExportFormat {
    /// Every format a signature is rendered to, in rendering order.
    pub const ALL: [ExportFormat; 3] = [Self::Html, Self::RichText, Self::PlainText];

    /// The filename extension Outlook expects for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "htm",
            Self::RichText => "rtf",
            Self::PlainText => "txt",
        }
    }

    /// The `WdSaveFormat` constant Word uses for this format.
    pub fn word_save_format(&self) -> u32 {
        match self {
            Self::Html => 8,
            Self::RichText => 6,
            Self::PlainText => 2,
        }
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Html => "HTML",
            Self::RichText => "RTF",
            Self::PlainText => "plain text",
        })
    }
}

/// A default signature assignment of the e-mail client.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum SignatureSlot {
    NewMessage,
    Reply,
}

impl Display for SignatureSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NewMessage => "new message",
            Self::Reply => "reply",
        })
    }
}

/// A service capable of editing a document and exporting it.
///
/// A service has at most one active document at a time. Every operation other
/// than [DocumentService::open] acts on the active document.
pub trait DocumentService {
    /// Open the document at `path`, making it the active document.
    fn open(&mut self, path: &Path) -> Result<()>;

    /// Replace every case-sensitive, whole-word occurrence of `token`.
    ///
    /// A token that does not occur in the document is not an error.
    fn find_and_replace(&mut self, token: &str, replacement: &str) -> Result<()>;

    /// Save the active document to `path` in the given format.
    fn export_as(&mut self, path: &Path, format: ExportFormat) -> Result<()>;

    /// Register the named signature as the client default for `slot`.
    fn set_default_signature(&mut self, slot: SignatureSlot, name: &str) -> Result<()>;

    /// Close the active document and release the service.
    fn close(&mut self) -> Result<()>;
}

/// A document opened on a [DocumentService].
///
/// The document is closed when this value is dropped, unless [OpenDocument::close]
/// was called first.
pub struct OpenDocument<'a, S: DocumentService + ?Sized> {
    service: &'a mut S,
    closed: bool,
}

impl<'a, S: DocumentService + ?Sized> OpenDocument<'a, S> {
    pub fn open(service: &'a mut S, path: &Path) -> Result<Self> {
        service.open(path)?;

        Ok(Self {
            service,
            closed: false,
        })
    }

    /// Close the document, surfacing any error from the service.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.service.close()
    }
}

impl<'a, S: DocumentService + ?Sized> Deref for OpenDocument<'a, S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        self.service
    }
}

impl<'a, S: DocumentService + ?Sized> DerefMut for OpenDocument<'a, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.service
    }
}

impl<'a, S: DocumentService + ?Sized> Drop for OpenDocument<'a, S> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.service.close() {
                warn!("error closing document: {:#}", e);
            }
        }
    }
}
