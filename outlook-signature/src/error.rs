// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    crate::document::{ExportFormat, SignatureSlot},
    std::path::PathBuf,
    thiserror::Error,
};

/// Broad classification of a [SignatureError].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Bad or missing user input.
    InputValidation,
    /// The directory profile of the current user could not be resolved.
    IdentityLookup,
    /// The document service failed or artifacts could not be written.
    Rendering,
    /// The lock configuration could not be written.
    Persistence,
    /// The argument list could not be parsed.
    MalformedInvocation,
}

/// Unified error type for signature provisioning.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("The path to the e-mail signature template file was not provided.")]
    TemplateMissingPath,

    #[error("Invalid template file format. The file must be a .DOCX document.")]
    TemplateBadExtension(PathBuf),

    #[error("Failed to locate e-mail signature template file: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("Failed to locate variables file: {}", .0.display())]
    VariablesNotFound(PathBuf),

    #[error("Failed to locate configuration file: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Error parsing configuration file {}: {}", .0.display(), .1)]
    ConfigParse(PathBuf, serde_yaml::Error),

    #[error("No Microsoft Office version was specified.")]
    MissingClientVersion,

    #[error("Unable to determine the name of the current user.")]
    UnknownUser,

    #[error("Failed to retrieve one or more directory attributes for the current user: {0:#}")]
    IdentityLookup(anyhow::Error),

    #[error("Document service error: {0:#}")]
    DocumentService(anyhow::Error),

    #[error("Unable to determine the application data directory of the current user.")]
    AppDataUnavailable,

    #[error("One or more directories in the path \"{}\" was not found. This could mean Microsoft Office is not installed or has not completed first-run tasks.", .0.display())]
    SignaturesDirectoryMissing(PathBuf),

    #[error("Failed to save {format} signature to {}: {error:#}", .path.display())]
    Export {
        format: ExportFormat,
        path: PathBuf,
        error: anyhow::Error,
    },

    #[error("Failed to assign signature \"{name}\" to the {slot} slot: {error:#}")]
    SlotAssignment {
        slot: SignatureSlot,
        name: String,
        error: anyhow::Error,
    },

    #[error("The key HKCU:\\{0} was not found.")]
    ConfigNamespaceMissing(String),

    #[error("Unable to open HKCU:\\{namespace}: {error:#}")]
    ConfigNamespaceUnavailable {
        namespace: String,
        error: anyhow::Error,
    },

    #[error("Failed to write {key} under HKCU:\\{namespace}: {error:#}")]
    ConfigWrite {
        namespace: String,
        key: String,
        error: anyhow::Error,
    },

    #[error("One or more arguments were typed incorrectly. See -? for usage syntax.")]
    MalformedInvocation,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SignatureError {
    /// Obtain the broad category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TemplateMissingPath
            | Self::TemplateBadExtension(_)
            | Self::TemplateNotFound(_)
            | Self::VariablesNotFound(_)
            | Self::ConfigNotFound(_)
            | Self::ConfigParse(..)
            | Self::MissingClientVersion
            | Self::UnknownUser => ErrorKind::InputValidation,
            Self::IdentityLookup(_) => ErrorKind::IdentityLookup,
            Self::DocumentService(_)
            | Self::AppDataUnavailable
            | Self::SignaturesDirectoryMissing(_)
            | Self::Export { .. }
            | Self::SlotAssignment { .. }
            | Self::Io(_) => ErrorKind::Rendering,
            Self::ConfigNamespaceMissing(_)
            | Self::ConfigNamespaceUnavailable { .. }
            | Self::ConfigWrite { .. } => ErrorKind::Persistence,
            Self::MalformedInvocation => ErrorKind::MalformedInvocation,
        }
    }
}

pub type Result<T> = std::result::Result<T, SignatureError>;
