use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use quick_xml::se::Serializer;
use serde::Serialize;
use tracing::warn;
use crate::config::BuildInfo;
use crate::project::{payload_files, TOOLS_DIR};
use crate::scripts::{BEFORE_MODIFY_SCRIPT, INSTALL_SCRIPT};

/// Root of a `.nuspec` document.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename = "package")]
pub struct Package {
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Files::is_empty")]
    pub files: Files,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Metadata {
    pub id: String,
    pub version: String,
    pub authors: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Default)]
pub struct Files {
    #[serde(rename = "file")]
    pub entries: Vec<FileRef>,
}

impl Files {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A `<file src=".." target=".."/>` entry.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct FileRef {
    #[serde(rename = "@src")]
    pub src: String,
    #[serde(rename = "@target")]
    pub target: String,
}

impl FileRef {
    /// An entry packed at the same relative location it has in the project.
    pub fn same_path(path: &str) -> Self {
        FileRef {
            src: path.to_string(),
            target: path.to_string(),
        }
    }
}

impl Package {
    /// Builds the manifest for a project.
    ///
    /// Lists every payload file, then the install script, then the before-modify
    /// script when `has_before_modify` is set.
    pub fn for_project<P: AsRef<Path>>(
        project_dir: P,
        info: &BuildInfo,
        version: &str,
        has_before_modify: bool,
    ) -> Result<Package> {
        let mut entries: Vec<FileRef> = payload_files(project_dir)?
            .iter()
            .map(|path| FileRef::same_path(path))
            .collect();
        entries.push(FileRef::same_path(&format!("{TOOLS_DIR}/{INSTALL_SCRIPT}")));
        if has_before_modify {
            entries.push(FileRef::same_path(&format!("{TOOLS_DIR}/{BEFORE_MODIFY_SCRIPT}")));
        }

        Ok(Package {
            metadata: Metadata {
                id: info.product.identifier.clone(),
                version: version.to_string(),
                authors: info.product.developer.clone(),
                description: info.description(version),
                tags: Some("admin".to_string()),
            },
            files: Files { entries },
        })
    }

    /// Serializes the manifest with two-space indentation.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::new();
        let mut ser = Serializer::new(&mut xml);
        ser.indent(' ', 2);
        self.serialize(ser).context("failed to encode .nuspec")?;
        Ok(xml)
    }
}

/// A written `.nuspec` file, removed again when dropped.
#[derive(Debug)]
pub struct NuspecFile {
    path: PathBuf,
}

impl NuspecFile {
    /// Writes `<project>/<name>.nuspec`.
    pub fn write<P: AsRef<Path>>(project_dir: P, name: &str, package: &Package) -> Result<Self> {
        let path = project_dir.as_ref().join(format!("{name}.nuspec"));
        std::fs::write(&path, package.to_xml()?)
            .with_context(|| format!("failed to create .nuspec file {}", path.display()))?;
        Ok(NuspecFile { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for NuspecFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Failed to remove {}: {}", self.path.display(), e);
        }
    }
}
