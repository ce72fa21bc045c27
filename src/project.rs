use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use anyhow::{bail, Context, Result};
use regex::Regex;
use walkdir::WalkDir;
use crate::config::BUILD_INFO_FILE;

pub const PAYLOAD_DIR: &str = "payload";
pub const SCRIPTS_DIR: &str = "scripts";
pub const BUILD_DIR: &str = "build";
pub const TOOLS_DIR: &str = "tools";

/// Which user scripts to collect from `scripts/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    PreInstall,
    PostInstall,
}

impl ScriptKind {
    fn pattern(self) -> &'static str {
        match self {
            ScriptKind::PreInstall => r"(?i)^preinstall.*\.ps1$",
            ScriptKind::PostInstall => r"(?i)^postinstall.*\.ps1$",
        }
    }
}

/// Converts both `/` and `\` to the host separator.
pub fn normalize_project_path(raw: &str) -> PathBuf {
    let path: String = raw
        .chars()
        .map(|c| if c == '/' || c == '\\' { MAIN_SEPARATOR } else { c })
        .collect();
    PathBuf::from(path)
}

/// Checks that the project has `payload/` or `scripts/`, and a `build-info.yaml`.
pub fn verify_project_structure<P: AsRef<Path>>(project_dir: P) -> Result<()> {
    let project_dir = project_dir.as_ref();
    let payload_exists = project_dir.join(PAYLOAD_DIR).exists();
    let scripts_exists = project_dir.join(SCRIPTS_DIR).exists();
    if !payload_exists && !scripts_exists {
        bail!("either 'payload' or 'scripts' directory must exist in the project directory");
    }
    if !project_dir.join(BUILD_INFO_FILE).exists() {
        bail!("'{}' file is missing in the project directory", BUILD_INFO_FILE);
    }
    Ok(())
}

/// Ensures `payload/`, `scripts/`, `build/` and `tools/` exist under the project root.
pub fn ensure_project_dirs<P: AsRef<Path>>(project_dir: P) -> Result<()> {
    for sub_dir in [PAYLOAD_DIR, SCRIPTS_DIR, BUILD_DIR, TOOLS_DIR] {
        let full_path = project_dir.as_ref().join(sub_dir);
        std::fs::create_dir_all(&full_path)
            .with_context(|| format!("failed to create directory {}", full_path.display()))?;
    }
    Ok(())
}

/// True if `payload/` exists and holds at least one file somewhere below it.
pub fn payload_has_files<P: AsRef<Path>>(project_dir: P) -> Result<bool> {
    let payload = project_dir.as_ref().join(PAYLOAD_DIR);
    if !payload.exists() {
        return Ok(false);
    }
    for entry in WalkDir::new(&payload) {
        if entry?.file_type().is_file() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Project-relative, `/`-separated paths of every payload file, sorted.
pub fn payload_files<P: AsRef<Path>>(project_dir: P) -> Result<Vec<String>> {
    let project_dir = project_dir.as_ref();
    let payload = project_dir.join(PAYLOAD_DIR);
    let mut files = Vec::new();
    if !payload.exists() {
        return Ok(files);
    }
    for entry in WalkDir::new(&payload).sort_by_file_name() {
        let entry = entry.context("error walking payload directory")?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(project_dir)?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        files.push(parts.join("/"));
    }
    files.sort();
    Ok(files)
}

/// Names of the scripts in `scripts/` matching `kind`, sorted by name.
///
/// A missing `scripts/` directory yields an empty list.
pub fn find_scripts<P: AsRef<Path>>(project_dir: P, kind: ScriptKind) -> Result<Vec<String>> {
    let scripts_dir = project_dir.as_ref().join(SCRIPTS_DIR);
    let mut scripts = Vec::new();
    if !scripts_dir.exists() {
        return Ok(scripts);
    }
    let re = Regex::new(kind.pattern())?;
    for entry in std::fs::read_dir(&scripts_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if re.is_match(&name) {
            scripts.push(name);
        }
    }
    scripts.sort();
    Ok(scripts)
}
