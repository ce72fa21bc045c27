use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use tracing::info;
use zip::ZipArchive;

/// Canonical output name of a built package.
pub fn package_file_name(name: &str, version: &str) -> String {
    format!("{name}-{version}.nupkg")
}

/// Finds the most recently written `<identifier>*.nupkg` in `build_dir`.
pub fn locate_built_package<P: AsRef<Path>>(build_dir: P, identifier: &str) -> Result<Option<PathBuf>> {
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
    for entry in std::fs::read_dir(build_dir.as_ref())? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.starts_with(identifier) || !name.ends_with(".nupkg") {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        match &newest {
            Some((time, _)) if *time >= modified => {}
            _ => newest = Some((modified, entry.path())),
        }
    }
    Ok(newest.map(|(_, path)| path))
}

/// Renames whatever `nuget pack` produced to `<build_dir>/<name>-<version>.nupkg`.
///
/// Falls back to the canonical path when nothing matched.
pub fn finalize_package<P: AsRef<Path>>(
    build_dir: P,
    identifier: &str,
    name: &str,
    version: &str,
) -> Result<PathBuf> {
    let build_dir = build_dir.as_ref();
    let final_path = build_dir.join(package_file_name(name, version));
    match locate_built_package(build_dir, identifier)? {
        Some(built) if built == final_path => {}
        Some(built) => {
            info!("Renaming package: {} to {}", built.display(), final_path.display());
            std::fs::rename(&built, &final_path).context("failed to rename package")?;
        }
        None => {
            info!("Package matching pattern not found, using: {}", final_path.display());
        }
    }
    Ok(final_path)
}

/// Checks that the package archive contains every entry in `expected`.
pub fn verify_package<P: AsRef<Path>>(package: P, expected: &[String]) -> Result<()> {
    let package = package.as_ref();
    let file = File::open(package)
        .with_context(|| format!("failed to open package {}", package.display()))?;
    let archive = ZipArchive::new(file)
        .with_context(|| format!("{} is not a valid package archive", package.display()))?;
    let names: Vec<&str> = archive.file_names().collect();
    let missing: Vec<&String> = expected
        .iter()
        .filter(|entry| !names.iter().any(|name| name.eq_ignore_ascii_case(entry)))
        .collect();
    if !missing.is_empty() {
        bail!("package {} is missing {:?}", package.display(), missing);
    }
    Ok(())
}

/// Hex encoded SHA-256 of a file.
pub fn sha256_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut file = File::open(path.as_ref())?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
