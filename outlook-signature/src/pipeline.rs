// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! End-to-end signature provisioning. */

use {
    crate::{
        config::ProvisioningConfig,
        document::{DocumentService, OpenDocument, SignatureSlot},
        error::{Result, SignatureError},
        identity::IdentityResolver,
        persist::{persist_lock, ConfigStore, OfficeVersion},
        render::{ensure_signatures_directory, render_artifacts, ArtifactSet},
        slot::{assign_slots, SignatureType},
        substitution::{substitute_placeholders, PlaceholderBindings},
        template::{TemplateSource, WorkingCopy},
    },
    log::{info, warn},
    std::path::{Path, PathBuf},
};

/// What to provision.
#[derive(Clone, Debug)]
pub struct ProvisioningRequest {
    pub template: TemplateSource,
    pub signature_type: SignatureType,
    /// Lock the assignment in the Office configuration.
    pub persist: bool,
    /// Required when `persist` is set.
    pub office_version: Option<OfficeVersion>,
}

/// The result of a successful run.
#[derive(Clone, Debug)]
pub struct ProvisioningOutcome {
    pub artifacts: ArtifactSet,
    pub assigned_slots: Vec<SignatureSlot>,
    /// Configuration keys written. Empty unless locking was requested.
    pub persisted_keys: Vec<&'static str>,
}

/// Drives a template through substitution, rendering, slot assignment and locking.
///
/// Stages run strictly in that order and the first failure aborts the run.
/// The working copy of the template is removed on every path.
pub struct Provisioner<I, D, C> {
    config: ProvisioningConfig,
    identity: I,
    documents: D,
    config_store: C,
    temp_root: Option<PathBuf>,
}

impl<I, D, C> Provisioner<I, D, C>
where
    I: IdentityResolver,
    D: DocumentService,
    C: ConfigStore,
{
    pub fn new(config: ProvisioningConfig, identity: I, documents: D, config_store: C) -> Self {
        Self {
            config,
            identity,
            documents,
            config_store,
            temp_root: None,
        }
    }

    /// Create working copies under `path` instead of the system temporary directory.
    #[must_use]
    pub fn with_temp_root(mut self, path: impl AsRef<Path>) -> Self {
        self.temp_root = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn document_service(&self) -> &D {
        &self.documents
    }

    pub fn config_store(&self) -> &C {
        &self.config_store
    }

    /// Provision a signature for `user_name`.
    pub fn provision(
        &mut self,
        user_name: &str,
        request: &ProvisioningRequest,
    ) -> Result<ProvisioningOutcome> {
        info!("resolving directory profile of {}", user_name);
        let profile = self
            .identity
            .resolve(user_name)
            .map_err(SignatureError::IdentityLookup)?;
        let bindings = PlaceholderBindings::resolve(&profile, &self.config);

        let working_copy = match &self.temp_root {
            Some(root) => WorkingCopy::create_in(&request.template, root)?,
            None => WorkingCopy::create(&request.template)?,
        };

        let res = self.provision_working_copy(&working_copy, &bindings, user_name, request);

        match (res, working_copy.close()) {
            (Ok(outcome), Ok(())) => Ok(outcome),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), cleanup) => {
                if let Err(cleanup_err) = cleanup {
                    warn!("error removing working copy: {}", cleanup_err);
                }
                Err(e)
            }
        }
    }

    fn provision_working_copy(
        &mut self,
        working_copy: &WorkingCopy,
        bindings: &PlaceholderBindings,
        user_name: &str,
        request: &ProvisioningRequest,
    ) -> Result<ProvisioningOutcome> {
        let signatures_dir = self.config.signatures_directory()?;

        let mut document = OpenDocument::open(&mut self.documents, working_copy.path())
            .map_err(SignatureError::DocumentService)?;

        substitute_placeholders(&mut *document, bindings)?;

        ensure_signatures_directory(&signatures_dir)?;
        let base_name = request.signature_type.artifact_base_name(user_name);
        let artifacts = render_artifacts(&mut *document, &signatures_dir, &base_name)?;

        let assigned_slots = assign_slots(&mut *document, request.signature_type, &artifacts)?;

        let persisted_keys = if request.persist {
            persist_lock(
                &mut self.config_store,
                request.office_version,
                request.signature_type,
                &artifacts,
            )?
        } else {
            vec![]
        };

        document.close().map_err(SignatureError::DocumentService)?;

        Ok(ProvisioningOutcome {
            artifacts,
            assigned_slots,
            persisted_keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            document::ExportFormat, identity::IdentityProfile, testutil::*, ErrorKind,
        },
        tempfile::TempDir,
    };

    const OFFICE16: &str = "Software\\Microsoft\\Office\\16.0\\Common\\MailSettings";

    struct Fixture {
        _source: TempDir,
        app_data: TempDir,
        temp_root: TempDir,
        template: TemplateSource,
    }

    impl Fixture {
        fn new(content: &str) -> Result<Self> {
            let source = tempfile::tempdir()?;
            let path = source.path().join("signature.docx");
            std::fs::write(&path, content)?;

            Ok(Self {
                template: TemplateSource::new(&path)?,
                _source: source,
                app_data: tempfile::tempdir()?,
                temp_root: tempfile::tempdir()?,
            })
        }

        fn signatures_dir(&self) -> PathBuf {
            self.app_data.path().join("Signatures")
        }

        fn provisioner<I: IdentityResolver>(
            &self,
            identity: I,
            documents: TextDocumentService,
        ) -> Provisioner<I, TextDocumentService, MemoryConfigStore> {
            let config = ProvisioningConfig {
                signatures_dir: Some(self.signatures_dir()),
                ..Default::default()
            };

            Provisioner::new(
                config,
                identity,
                documents,
                MemoryConfigStore::default().with_namespace(OFFICE16),
            )
            .with_temp_root(self.temp_root.path())
        }

        fn request(&self, signature_type: SignatureType) -> ProvisioningRequest {
            ProvisioningRequest {
                template: self.template.clone(),
                signature_type,
                persist: false,
                office_version: None,
            }
        }

        fn temp_entries(&self) -> usize {
            std::fs::read_dir(self.temp_root.path()).unwrap().count()
        }

        fn signature_files(&self) -> usize {
            match std::fs::read_dir(self.signatures_dir()) {
                Ok(entries) => entries.count(),
                Err(_) => 0,
            }
        }
    }

    fn jane() -> StaticIdentityResolver {
        StaticIdentityResolver(IdentityProfile {
            display_name: Some("Jane Doe".into()),
            email_address: Some("jdoe@example.com".into()),
            title: Some("Accountant".into()),
        })
    }

    #[test]
    fn provisions_both_slots() -> Result<()> {
        let fixture = Fixture::new("{DisplayName}\n{Title}\n{Email}")?;
        let mut provisioner = fixture.provisioner(jane(), TextDocumentService::default());

        let outcome = provisioner.provision("jdoe", &fixture.request(SignatureType::Both))?;

        assert_eq!(outcome.artifacts.base_name(), "jdoe - All Mail");
        assert_eq!(
            outcome.assigned_slots,
            vec![SignatureSlot::NewMessage, SignatureSlot::Reply]
        );
        assert!(outcome.persisted_keys.is_empty());
        assert_eq!(
            std::fs::read_to_string(outcome.artifacts.path(ExportFormat::PlainText))?,
            "Jane Doe\nAccountant\njdoe@example.com"
        );
        assert_eq!(fixture.signature_files(), 3);

        let documents = provisioner.document_service();
        assert_eq!(documents.assigned(SignatureSlot::NewMessage), Some("jdoe - All Mail"));
        assert_eq!(documents.assigned(SignatureSlot::Reply), Some("jdoe - All Mail"));
        assert_eq!(documents.close_count, 1);
        assert_eq!(provisioner.config_store().value_count(), 0);

        // The source template is untouched and the working copy is gone.
        assert_eq!(
            std::fs::read_to_string(fixture.template.path())?,
            "{DisplayName}\n{Title}\n{Email}"
        );
        assert_ne!(
            documents.opened_path.as_deref(),
            Some(fixture.template.path())
        );
        assert_eq!(fixture.temp_entries(), 0);

        Ok(())
    }

    #[test]
    fn provisions_and_locks_new_only() -> Result<()> {
        let fixture = Fixture::new("{DisplayName}")?;
        let mut provisioner = fixture.provisioner(jane(), TextDocumentService::default());
        let request = ProvisioningRequest {
            persist: true,
            office_version: Some(OfficeVersion::Office2016),
            ..fixture.request(SignatureType::New)
        };

        let outcome = provisioner.provision("jdoe", &request)?;

        assert_eq!(outcome.persisted_keys, vec!["NewSignature"]);
        let store = provisioner.config_store();
        assert_eq!(store.value(OFFICE16, "NewSignature"), Some("jdoe - New Message"));
        assert_eq!(store.value(OFFICE16, "ReplySignature"), None);
        assert_eq!(
            provisioner.document_service().assigned(SignatureSlot::Reply),
            None
        );

        Ok(())
    }

    #[test]
    fn locks_both_with_aggregate() -> Result<()> {
        let fixture = Fixture::new("{DisplayName}")?;
        let mut provisioner = fixture.provisioner(jane(), TextDocumentService::default());
        let request = ProvisioningRequest {
            persist: true,
            office_version: Some(OfficeVersion::Office2016),
            ..fixture.request(SignatureType::Both)
        };

        provisioner.provision("jdoe", &request)?;

        let store = provisioner.config_store();
        for key in ["NewSignature", "ReplySignature", "NewSignature, ReplySignature"] {
            assert_eq!(store.value(OFFICE16, key), Some("jdoe - All Mail"));
        }

        Ok(())
    }

    #[test]
    fn identity_failure_has_no_side_effects() -> Result<()> {
        let fixture = Fixture::new("{DisplayName}")?;
        let mut provisioner =
            fixture.provisioner(FailingIdentityResolver, TextDocumentService::default());

        let err = provisioner
            .provision("jdoe", &fixture.request(SignatureType::Both))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::IdentityLookup);
        assert_eq!(fixture.signature_files(), 0);
        assert!(provisioner.document_service().assignments.is_empty());
        assert!(provisioner.document_service().opened_path.is_none());
        assert_eq!(fixture.temp_entries(), 0);

        Ok(())
    }

    #[test]
    fn missing_version_after_assignment() -> Result<()> {
        let fixture = Fixture::new("{DisplayName}")?;
        let mut provisioner = fixture.provisioner(jane(), TextDocumentService::default());
        let request = ProvisioningRequest {
            persist: true,
            ..fixture.request(SignatureType::Both)
        };

        let err = provisioner.provision("jdoe", &request).unwrap_err();

        assert!(matches!(err, SignatureError::MissingClientVersion));
        assert_eq!(fixture.signature_files(), 3);
        assert_eq!(
            provisioner
                .document_service()
                .assigned(SignatureSlot::NewMessage),
            Some("jdoe - All Mail")
        );
        assert_eq!(provisioner.config_store().value_count(), 0);
        assert_eq!(provisioner.document_service().close_count, 1);
        assert_eq!(fixture.temp_entries(), 0);

        Ok(())
    }

    #[test]
    fn export_failure_skips_assignment() -> Result<()> {
        let fixture = Fixture::new("{DisplayName}")?;
        let documents = TextDocumentService {
            fail_export: Some(ExportFormat::PlainText),
            ..Default::default()
        };
        let mut provisioner = fixture.provisioner(jane(), documents);

        let err = provisioner
            .provision("jdoe", &fixture.request(SignatureType::Reply))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Rendering);
        assert!(provisioner.document_service().assignments.is_empty());
        assert_eq!(provisioner.document_service().close_count, 1);
        assert_eq!(fixture.temp_entries(), 0);

        Ok(())
    }

    #[test]
    fn unreachable_document_service() -> Result<()> {
        let fixture = Fixture::new("{DisplayName}")?;
        let documents = TextDocumentService {
            fail_open: true,
            ..Default::default()
        };
        let mut provisioner = fixture.provisioner(jane(), documents);

        let err = provisioner
            .provision("jdoe", &fixture.request(SignatureType::New))
            .unwrap_err();

        assert!(matches!(err, SignatureError::DocumentService(_)));
        assert_eq!(fixture.signature_files(), 0);
        assert_eq!(fixture.temp_entries(), 0);

        Ok(())
    }

    #[test]
    fn missing_signatures_parent() -> Result<()> {
        let fixture = Fixture::new("{DisplayName}")?;
        let config = ProvisioningConfig {
            signatures_dir: Some(fixture.app_data.path().join("Microsoft").join("Signatures")),
            ..Default::default()
        };
        let mut provisioner = Provisioner::new(
            config,
            jane(),
            TextDocumentService::default(),
            MemoryConfigStore::default(),
        )
        .with_temp_root(fixture.temp_root.path());

        let err = provisioner
            .provision("jdoe", &fixture.request(SignatureType::Both))
            .unwrap_err();

        assert!(matches!(err, SignatureError::SignaturesDirectoryMissing(_)));
        assert!(provisioner.document_service().exports.is_empty());
        assert_eq!(fixture.temp_entries(), 0);

        Ok(())
    }
}
