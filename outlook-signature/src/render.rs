// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Rendering a substituted document to signature files. */

use {
    crate::{
        document::{DocumentService, ExportFormat},
        error::{Result, SignatureError},
    },
    log::{info, warn},
    std::path::{Path, PathBuf},
};

/// The files of a successfully rendered signature.
///
/// Instances only come from [render_artifacts], so holding one means every
/// format was written.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArtifactSet {
    directory: PathBuf,
    base_name: String,
}

impl ArtifactSet {
    /// The shared file stem, which is also the signature name in the client.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path(&self, format: ExportFormat) -> PathBuf {
        artifact_path(&self.directory, &self.base_name, format)
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        ExportFormat::ALL.iter().map(|f| self.path(*f)).collect()
    }
}

fn artifact_path(directory: &Path, base_name: &str, format: ExportFormat) -> PathBuf {
    directory.join(format!("{}.{}", base_name, format.extension()))
}

/// Make sure the signatures directory exists.
///
/// Only the final path component is created. A missing parent means the
/// e-mail client was never set up for this user.
pub fn ensure_signatures_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }

    match path.parent() {
        Some(parent) if parent.is_dir() => {
            info!("creating {}", path.display());
            std::fs::create_dir(path)?;
            Ok(())
        }
        _ => Err(SignatureError::SignaturesDirectoryMissing(path.to_path_buf())),
    }
}

/// Save the active document in every [ExportFormat].
///
/// Existing files are replaced. Formats are written in order and the first
/// failure is returned; files written before it are left in place.
pub fn render_artifacts<S: DocumentService + ?Sized>(
    document: &mut S,
    directory: &Path,
    base_name: &str,
) -> Result<ArtifactSet> {
    for format in ExportFormat::ALL {
        let path = artifact_path(directory, base_name, format);

        if path.exists() {
            warn!("replacing {}", path.display());
            std::fs::remove_file(&path)?;
        }

        info!("saving {} signature to {}", format, path.display());
        document
            .export_as(&path, format)
            .map_err(|error| SignatureError::Export {
                format,
                path: path.clone(),
                error,
            })?;
    }

    Ok(ArtifactSet {
        directory: directory.to_path_buf(),
        base_name: base_name.to_string(),
    })
}
