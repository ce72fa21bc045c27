use std::fmt;
use std::path::Path;
use std::str::FromStr;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// File name of the build manifest inside a project directory.
pub const BUILD_INFO_FILE: &str = "build-info.yaml";

/// Represents the contents of a `build-info.yaml` file.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct BuildInfo {
    /// Where the payload is copied on the target machine. Required when `payload/` has files.
    #[serde(default)]
    pub install_location: String,
    /// `none`, `logout` or `restart`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub postinstall_action: String,
    /// Subject name of the code signing certificate passed to `signtool /n`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signing_certificate: String,
    pub product: Product,
}

/// Package metadata from the `product` section.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Product {
    /// Package id.
    pub identifier: String,
    pub version: String,
    /// Display name, also used for the `.nuspec` and output file names.
    pub name: String,
    pub developer: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Action run at the end of the install script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostInstallAction {
    None,
    Logout,
    Restart,
}

impl FromStr for PostInstallAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(PostInstallAction::None),
            "logout" => Ok(PostInstallAction::Logout),
            "restart" => Ok(PostInstallAction::Restart),
            _ => bail!("unsupported post-install action: {}", s),
        }
    }
}

impl fmt::Display for PostInstallAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PostInstallAction::None => "none",
            PostInstallAction::Logout => "logout",
            PostInstallAction::Restart => "restart",
        };
        write!(f, "{name}")
    }
}

impl BuildInfo {
    /// Loads `build-info.yaml` from a project directory.
    ///
    /// # Errors
    /// Returns an error if the file can't be read or isn't valid YAML for this schema.
    pub fn load<P: AsRef<Path>>(project_dir: P) -> Result<BuildInfo> {
        let path = project_dir.as_ref().join(BUILD_INFO_FILE);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("error reading {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<BuildInfo> {
        serde_yaml::from_str(content).context("error parsing YAML")
    }

    /// Saves the manifest as YAML.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Starter manifest written by `init`.
    pub fn template(name: &str) -> BuildInfo {
        BuildInfo {
            install_location: format!("C:/Program Files/{name}"),
            postinstall_action: "none".to_string(),
            signing_certificate: String::new(),
            product: Product {
                identifier: name.to_lowercase().replace(' ', "-"),
                version: "1.0.0".to_string(),
                name: name.to_string(),
                developer: "Unknown".to_string(),
                description: String::new(),
            },
        }
    }

    /// Parsed `postinstall_action`; `None` when the field is empty.
    pub fn post_install_action(&self) -> Result<Option<PostInstallAction>> {
        if self.postinstall_action.is_empty() {
            return Ok(None);
        }
        self.postinstall_action.parse().map(Some)
    }

    /// `product.description`, or a generated one when it is empty.
    pub fn description(&self, version: &str) -> String {
        let product = &self.product;
        if !product.description.is_empty() {
            return product.description.clone();
        }
        format!(
            "{} version {} for {} by {}",
            product.name, version, product.identifier, product.developer
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
install_location: C:/Program Files/Foo
postinstall_action: Restart
signing_certificate: ACME Code Signing
product:
  identifier: acme-foo
  version: 2024.10.11
  name: Foo
  developer: ACME
"#;

    #[test]
    fn test_parse_sample() {
        let info = BuildInfo::parse(SAMPLE).unwrap();
        assert_eq!(info.install_location, "C:/Program Files/Foo");
        assert_eq!(info.signing_certificate, "ACME Code Signing");
        assert_eq!(info.product.identifier, "acme-foo");
        assert_eq!(info.product.version, "2024.10.11");
        assert_eq!(info.post_install_action().unwrap(), Some(PostInstallAction::Restart));
    }

    #[test]
    fn test_optional_fields_default() {
        let info = BuildInfo::parse(
            "product:\n  identifier: x\n  version: '1.0.0'\n  name: X\n  developer: Me\n",
        )
        .unwrap();
        assert!(info.install_location.is_empty());
        assert_eq!(info.post_install_action().unwrap(), None);
        assert_eq!(info.description("1.0.0"), "X version 1.0.0 for x by Me");
    }

    #[test]
    fn test_missing_product_fails() {
        assert!(BuildInfo::parse("install_location: C:/Foo\n").is_err());
    }

    #[test]
    fn test_unknown_action_rejected() {
        let info = BuildInfo {
            postinstall_action: "shutdown".to_string(),
            ..BuildInfo::template("Foo")
        };
        let err = info.post_install_action().unwrap_err();
        assert!(err.to_string().contains("unsupported post-install action: shutdown"));
    }

    #[test]
    fn test_template_round_trips_through_yaml() {
        let dir = tempfile::tempdir().unwrap();
        BuildInfo::template("My Tool").save(dir.path().join(BUILD_INFO_FILE)).unwrap();
        let info = BuildInfo::load(dir.path()).unwrap();
        assert_eq!(info.product.identifier, "my-tool");
        assert_eq!(info.install_location, "C:/Program Files/My Tool");
        assert_eq!(info.post_install_action().unwrap(), Some(PostInstallAction::None));
    }
}
