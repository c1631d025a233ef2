// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    crate::error::{Result, SignatureError},
    log::debug,
    std::{
        ffi::OsStr,
        path::{Path, PathBuf},
    },
};

/// Filename extension a signature template must have.
pub const TEMPLATE_EXTENSION: &str = "docx";

/// A validated path to a user-supplied signature template.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TemplateSource {
    path: PathBuf,
}

impl TemplateSource {
    /// Validate a template path.
    ///
    /// The path must carry a `.docx` extension (in any case) and refer to an
    /// existing file.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let extension_ok = path
            .extension()
            .and_then(OsStr::to_str)
            .map(|ext| ext.eq_ignore_ascii_case(TEMPLATE_EXTENSION))
            .unwrap_or(false);

        if !extension_ok {
            return Err(SignatureError::TemplateBadExtension(path.to_path_buf()));
        }

        if !path.is_file() {
            return Err(SignatureError::TemplateNotFound(path.to_path_buf()));
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A private, disposable copy of a template.
///
/// The copy lives in its own temporary directory, which is removed when this
/// value is dropped or [WorkingCopy::close] is called.
#[derive(Debug)]
pub struct WorkingCopy {
    dir: tempfile::TempDir,
    path: PathBuf,
}

impl WorkingCopy {
    /// Copy a template into the system temporary directory.
    pub fn create(template: &TemplateSource) -> Result<Self> {
        Self::create_in(template, std::env::temp_dir())
    }

    /// Copy a template into a new directory under `temp_root`.
    pub fn create_in(template: &TemplateSource, temp_root: impl AsRef<Path>) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("esig-")
            .tempdir_in(temp_root)?;

        let file_name = template
            .path()
            .file_name()
            .ok_or_else(|| SignatureError::TemplateNotFound(template.path().to_path_buf()))?;
        let path = dir.path().join(file_name);

        debug!(
            "copying {} to {}",
            template.path().display(),
            path.display()
        );
        std::fs::copy(template.path(), &path)?;

        Ok(Self { dir, path })
    }

    /// Path of the copied template.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the copy, surfacing any error.
    pub fn close(self) -> Result<()> {
        debug!("removing {}", self.dir.path().display());
        self.dir.close()?;

        Ok(())
    }
}
