use std::path::{Path, PathBuf};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};
use crate::config::{BuildInfo, PostInstallAction};
use crate::location::{join_install_path, resolve_install_location, InstallRoot, WellKnownDirs};
use crate::nuspec::{NuspecFile, Package};
use crate::package::{finalize_package, package_file_name, sha256_file, verify_package};
use crate::project::{
    ensure_project_dirs, find_scripts, payload_files, payload_has_files, verify_project_structure,
    ScriptKind, BUILD_DIR, PAYLOAD_DIR, TOOLS_DIR,
};
use crate::scripts::{write_before_modify_script, write_install_script, BEFORE_MODIFY_SCRIPT, INSTALL_SCRIPT};
use crate::tools::{ensure_nuget, ensure_signtool, nuget_pack, sign_package};
use crate::version::VersionPolicy;

/// Knobs for a package build that don't come from `build-info.yaml`.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub version_policy: VersionPolicy,
    /// Leave the generated `tools/` directory in place after packing.
    pub keep_tools: bool,
}

/// A payload file and where the install script puts it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlannedFile {
    pub source: String,
    pub destination: String,
}

/// Everything a build would produce, computed without writing anything.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    pub identifier: String,
    pub name: String,
    pub raw_version: String,
    pub version: String,
    pub version_policy: String,
    pub install_root: Option<InstallRoot>,
    pub package_file: String,
    pub pre_install_scripts: Vec<String>,
    pub post_install_scripts: Vec<String>,
    pub post_install_action: Option<String>,
    pub signing_certificate: Option<String>,
    pub files: Vec<PlannedFile>,
}

/// Validated inputs shared by [`build_package`] and [`plan_package`].
struct Prepared {
    info: BuildInfo,
    has_payload: bool,
    version: String,
    action: Option<PostInstallAction>,
}

fn prepare(project_dir: &Path, policy: VersionPolicy) -> Result<Prepared> {
    verify_project_structure(project_dir).context("Error verifying project structure")?;
    debug!("Project structure verified");

    let info = BuildInfo::load(project_dir)?;
    let has_payload = payload_has_files(project_dir).context("Error checking payload folder")?;
    if has_payload && info.install_location.is_empty() {
        bail!(
            "'install_location' must be specified in build-info.yaml because your payload folder is not empty."
        );
    }

    let version = policy
        .apply(&info.product.version)
        .context("Error parsing version")?;
    if version != info.product.version {
        info!("Normalized version {} to {}", info.product.version, version);
    }
    let action = info.post_install_action()?;

    Ok(Prepared { info, has_payload, version, action })
}

fn resolve_root(prepared: &Prepared, dirs: &WellKnownDirs) -> Option<InstallRoot> {
    if !prepared.has_payload {
        return None;
    }
    let root = resolve_install_location(&prepared.info.install_location, dirs);
    debug!("Install root: {}", root);
    Some(root)
}

/// Computes the [`BuildPlan`] for a project without touching it.
pub fn plan_package<P: AsRef<Path>>(
    project_dir: P,
    policy: VersionPolicy,
    dirs: &WellKnownDirs,
) -> Result<BuildPlan> {
    let project_dir = project_dir.as_ref();
    let prepared = prepare(project_dir, policy)?;
    let root = resolve_root(&prepared, dirs);

    let mut files = Vec::new();
    if let Some(root) = &root {
        let payload_prefix = format!("{PAYLOAD_DIR}/");
        for source in payload_files(project_dir)? {
            let rel = source.strip_prefix(&payload_prefix).unwrap_or(&source);
            files.push(PlannedFile {
                destination: join_install_path(root, rel),
                source,
            });
        }
    }

    let info = &prepared.info;
    Ok(BuildPlan {
        identifier: info.product.identifier.clone(),
        name: info.product.name.clone(),
        raw_version: info.product.version.clone(),
        version: prepared.version.clone(),
        version_policy: policy.to_string(),
        install_root: root,
        package_file: package_file_name(&info.product.name, &prepared.version),
        pre_install_scripts: find_scripts(project_dir, ScriptKind::PreInstall)?,
        post_install_scripts: find_scripts(project_dir, ScriptKind::PostInstall)?,
        post_install_action: prepared.action.map(|a| a.to_string()),
        signing_certificate: (!info.signing_certificate.is_empty())
            .then(|| info.signing_certificate.clone()),
        files,
    })
}

/// Generates the scripts and `.nuspec` into the project, ready for `nuget pack`.
///
/// Returns the manifest guard (the `.nuspec` is deleted when it drops) and the
/// archive entries the packed result must contain.
pub fn stage_package<P: AsRef<Path>>(
    project_dir: P,
    options: &BuildOptions,
    dirs: &WellKnownDirs,
) -> Result<(BuildInfo, String, NuspecFile, Vec<String>)> {
    let project_dir = project_dir.as_ref();
    let prepared = prepare(project_dir, options.version_policy)?;

    ensure_project_dirs(project_dir).context("Error creating directories")?;
    info!("Directories created successfully.");

    let root = resolve_root(&prepared, dirs).unwrap_or_else(|| InstallRoot::Literal(String::new()));

    let has_before_modify = write_before_modify_script(project_dir)
        .context("Error including preinstall scripts")?;
    write_install_script(project_dir, &root, prepared.has_payload, prepared.action)
        .with_context(|| format!("Error generating {}", INSTALL_SCRIPT))?;

    let package = Package::for_project(project_dir, &prepared.info, &prepared.version, has_before_modify)?;
    let nuspec = NuspecFile::write(project_dir, &prepared.info.product.name, &package)
        .context("Error generating .nuspec")?;
    info!(".nuspec generated at: {}", nuspec.path().display());

    let mut expected = vec![format!("{TOOLS_DIR}/{INSTALL_SCRIPT}")];
    if has_before_modify {
        expected.push(format!("{TOOLS_DIR}/{BEFORE_MODIFY_SCRIPT}"));
    }
    Ok((prepared.info, prepared.version, nuspec, expected))
}

/// Builds (and, when configured, signs) the package for a project directory.
///
/// Returns the path of the final `.nupkg`.
pub fn build_package<P: AsRef<Path>>(project_dir: P, options: &BuildOptions) -> Result<PathBuf> {
    let project_dir = project_dir.as_ref();
    info!("Using project directory: {}", project_dir.display());

    let dirs = WellKnownDirs::for_current_user()?;
    let (info, version, nuspec, expected) = stage_package(project_dir, options, &dirs)?;

    ensure_nuget()?;
    let build_dir = project_dir.join(BUILD_DIR);
    nuget_pack(nuspec.path(), &build_dir).context("Error creating package")?;
    drop(nuspec);

    let package = finalize_package(&build_dir, &info.product.identifier, &info.product.name, &version)?;
    verify_package(&package, &expected)?;

    if info.signing_certificate.is_empty() {
        info!("No signing certificate provided. Skipping signing.");
    } else {
        ensure_signtool()?;
        sign_package(&package, &info.signing_certificate)?;
    }

    if !options.keep_tools {
        match std::fs::remove_dir_all(project_dir.join(TOOLS_DIR)) {
            Ok(()) => info!("Tools directory removed successfully."),
            Err(e) => warn!("Failed to remove tools directory: {}", e),
        }
    }

    info!("SHA-256: {}", sha256_file(&package)?);
    info!("Package created successfully: {}", package.display());
    Ok(package)
}
