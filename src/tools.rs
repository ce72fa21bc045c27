use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

pub const NUGET: &str = "nuget";
pub const SIGNTOOL: &str = "signtool";
pub const TIMESTAMP_URL: &str = "http://timestamp.digicert.com";

const NUGET_HINT: &str = "NuGet is not installed or not in PATH.
You can install it via Chocolatey:
  choco install nuget.commandline";
const SIGNTOOL_HINT: &str = "SignTool is not installed or not available.
It ships with the Windows SDK; make sure its bin directory is in PATH.";

/// Runs an external program with inherited stdio.
///
/// # Errors
/// Returns an error if the program can't be started or exits unsuccessfully.
pub fn run_command<S: AsRef<OsStr>>(program: &str, args: &[S]) -> Result<()> {
    let shown: Vec<String> = args
        .iter()
        .map(|a| a.as_ref().to_string_lossy().to_string())
        .collect();
    info!("Running: {} {:?}", program, shown);
    let status = Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("failed to start {}", program))?;
    if !status.success() {
        bail!("{} exited with {}", program, status);
    }
    Ok(())
}

/// Locates `program` on `PATH`, failing with `hint` when it is missing.
pub fn ensure_tool(program: &str, hint: &str) -> Result<PathBuf> {
    which::which(program).map_err(|e| anyhow!("{}\n({}: {})", hint, program, e))
}

pub fn ensure_nuget() -> Result<PathBuf> {
    ensure_tool(NUGET, NUGET_HINT)
}

pub fn ensure_signtool() -> Result<PathBuf> {
    ensure_tool(SIGNTOOL, SIGNTOOL_HINT)
}

/// Arguments for `nuget pack`.
pub fn nuget_pack_args(nuspec: &Path, out_dir: &Path) -> Vec<PathBuf> {
    vec![
        PathBuf::from("pack"),
        nuspec.to_path_buf(),
        PathBuf::from("-OutputDirectory"),
        out_dir.to_path_buf(),
        PathBuf::from("-NoPackageAnalysis"),
    ]
}

/// Packs a `.nuspec` into `out_dir`.
pub fn nuget_pack(nuspec: &Path, out_dir: &Path) -> Result<()> {
    run_command(NUGET, &nuget_pack_args(nuspec, out_dir))
}

/// Arguments for `signtool sign` with a SHA-256 digest and RFC 3161 timestamp.
pub fn sign_args(package: &Path, certificate: &str) -> Vec<PathBuf> {
    let mut args: Vec<PathBuf> = [
        "sign", "/n", certificate, "/fd", "SHA256", "/tr", TIMESTAMP_URL, "/td", "SHA256",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();
    args.push(package.to_path_buf());
    args
}

/// Signs the package with the certificate whose subject is `certificate`.
pub fn sign_package(package: &Path, certificate: &str) -> Result<()> {
    info!("Signing package: {} with certificate: {}", package.display(), certificate);
    run_command(SIGNTOOL, &sign_args(package, certificate))
        .with_context(|| format!("failed to sign package {}", package.display()))
}
