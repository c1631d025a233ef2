// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    crate::persist::ConfigStore,
    anyhow::{anyhow, Context, Result},
    log::debug,
};

const REG: &str = "reg.exe";

/// A [ConfigStore] backed by the current user's Windows registry hive.
///
/// Namespaces are key paths relative to `HKEY_CURRENT_USER`. Values are
/// written as `REG_SZ`. All access goes through `reg.exe`.
#[derive(Clone, Debug)]
pub struct RegistryConfigStore {
    root: String,
}

impl Default for RegistryConfigStore {
    fn default() -> Self {
        Self {
            root: "HKCU".to_string(),
        }
    }
}

impl RegistryConfigStore {
    fn key_path(&self, namespace: &str) -> String {
        format!("{}\\{}", self.root, namespace)
    }

    fn add_args(&self, namespace: &str, key: &str, value: &str) -> Vec<String> {
        vec![
            "add".to_string(),
            self.key_path(namespace),
            "/v".to_string(),
            key.to_string(),
            "/t".to_string(),
            "REG_SZ".to_string(),
            "/d".to_string(),
            value.to_string(),
            "/f".to_string(),
        ]
    }
}

impl ConfigStore for RegistryConfigStore {
    fn namespace_exists(&self, namespace: &str) -> Result<bool> {
        let key_path = self.key_path(namespace);
        debug!("{} query {}", REG, key_path);

        let output = duct::cmd(REG, vec!["query".to_string(), key_path])
            .stdout_null()
            .stderr_null()
            .unchecked()
            .run()
            .with_context(|| format!("running {}", REG))?;

        Ok(output.status.success())
    }

    fn set_string(&mut self, namespace: &str, key: &str, value: &str) -> Result<()> {
        let args = self.add_args(namespace, key, value);
        debug!("{} {:?}", REG, args);

        let output = duct::cmd(REG, args)
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .with_context(|| format!("running {}", REG))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(anyhow!(
                "{} add failed: {}",
                REG,
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        }
    }
}
