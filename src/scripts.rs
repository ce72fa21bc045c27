use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use tracing::debug;
use crate::config::PostInstallAction;
use crate::location::{InstallRoot, INSTALL_SEPARATOR};
use crate::project::{find_scripts, ScriptKind, SCRIPTS_DIR, TOOLS_DIR};

pub const INSTALL_SCRIPT: &str = "chocolateyInstall.ps1";
pub const BEFORE_MODIFY_SCRIPT: &str = "chocolateyBeforeModify.ps1";

const COPY_PAYLOAD_BLOCK: &str = r#"if ($installLocation -and $installLocation -ne '') {
    try {
        New-Item -ItemType Directory -Force -Path $installLocation | Out-Null
        Write-Host "Created or verified install location: $installLocation"
    } catch {
        Write-Error "Failed to create or access: $installLocation"
        exit 1
    }
} else {
    Write-Host "No install location specified, skipping creation of directories."
}

$payloadPath = "$PSScriptRoot\..\payload"
$payloadPath = [System.IO.Path]::GetFullPath($payloadPath)
$payloadPath = $payloadPath.TrimEnd('\', '/')

Write-Host "Payload path: $payloadPath"
Get-ChildItem -Path $payloadPath -Recurse | ForEach-Object {
    $fullName = $_.FullName
    $relativePath = $fullName.Substring($payloadPath.Length)
    $relativePath = $relativePath.TrimStart('\', '/')
    $destinationPath = Join-Path $installLocation $relativePath

    if ($_.PSIsContainer) {
        New-Item -ItemType Directory -Force -Path $destinationPath | Out-Null
        Write-Host "Created directory: $destinationPath"
    } else {
        Copy-Item -Path $fullName -Destination $destinationPath -Force
        Write-Host "Copied: $($fullName) -> $destinationPath"

        if (-not (Test-Path -Path $destinationPath)) {
            Write-Error "Failed to copy: $($fullName)"
            exit 1
        }
    }
}
"#;

const SCRIPT_ONLY_NOTICE: &str = "Write-Host \"No payload files found. Script-only install - skipping directory creation and file copy.\"\n";

/// Quotes a string as a PowerShell single-quoted literal.
fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// PowerShell expression that evaluates to the install root on the target machine.
///
/// Symbolic roots are looked up through `[Environment]::GetFolderPath` so the
/// script and the plan agree on a single trailing separator.
pub fn install_location_expr(root: &InstallRoot) -> String {
    match root.special_folder() {
        Some(folder) => format!(
            "[Environment]::GetFolderPath('{folder}') + '{INSTALL_SEPARATOR}'"
        ),
        None => ps_quote(&root.to_string()),
    }
}

/// Renders the body of `chocolateyInstall.ps1`, without the appended post-install scripts.
pub fn render_install_script(
    root: &InstallRoot,
    has_payload: bool,
    action: Option<PostInstallAction>,
) -> String {
    let mut script = String::new();
    script.push_str("$ErrorActionPreference = 'Stop'\n\n");
    let _ = writeln!(script, "$installLocation = {}\n", install_location_expr(root));

    if has_payload {
        script.push_str(COPY_PAYLOAD_BLOCK);
    } else {
        script.push_str(SCRIPT_ONLY_NOTICE);
    }

    if let Some(action) = action {
        script.push_str("\n# Executing post-install action\n");
        match action {
            PostInstallAction::Logout => {
                script.push_str("Write-Host 'Logging out...'\nshutdown /l\n");
            }
            PostInstallAction::Restart => {
                script.push_str("Write-Host 'Restarting system...'\nshutdown /r /t 0\n");
            }
            PostInstallAction::None => {
                script.push_str("Write-Host 'No post-install action required.'\n");
            }
        }
    }
    script
}

fn read_script(project_dir: &Path, name: &str) -> Result<Vec<u8>> {
    std::fs::read(project_dir.join(SCRIPTS_DIR).join(name))
        .with_context(|| format!("failed to read {}", name))
}

/// Concatenates every `preinstall*.ps1` into `tools/chocolateyBeforeModify.ps1`.
///
/// Returns `false` without touching the file system when there are no pre-install scripts.
pub fn write_before_modify_script<P: AsRef<Path>>(project_dir: P) -> Result<bool> {
    let project_dir = project_dir.as_ref();
    let scripts = find_scripts(project_dir, ScriptKind::PreInstall)?;
    if scripts.is_empty() {
        return Ok(false);
    }

    let mut combined = Vec::new();
    for name in &scripts {
        debug!("Including pre-install script {}", name);
        combined.extend_from_slice(format!("# Contents of {name}\n").as_bytes());
        combined.extend_from_slice(&read_script(project_dir, name)?);
        combined.push(b'\n');
    }

    let tools_dir = project_dir.join(TOOLS_DIR);
    std::fs::create_dir_all(&tools_dir).context("failed to create tools directory")?;
    std::fs::write(tools_dir.join(BEFORE_MODIFY_SCRIPT), combined)
        .with_context(|| format!("failed to write {}", BEFORE_MODIFY_SCRIPT))?;
    Ok(true)
}

/// Writes `tools/chocolateyInstall.ps1` and appends every `postinstall*.ps1` to it.
pub fn write_install_script<P: AsRef<Path>>(
    project_dir: P,
    root: &InstallRoot,
    has_payload: bool,
    action: Option<PostInstallAction>,
) -> Result<PathBuf> {
    let project_dir = project_dir.as_ref();
    let tools_dir = project_dir.join(TOOLS_DIR);
    std::fs::create_dir_all(&tools_dir).context("failed to create tools directory")?;

    let script_path = tools_dir.join(INSTALL_SCRIPT);
    let mut file = std::fs::File::create(&script_path)
        .with_context(|| format!("failed to write {}", INSTALL_SCRIPT))?;
    file.write_all(render_install_script(root, has_payload, action).as_bytes())?;

    for name in find_scripts(project_dir, ScriptKind::PostInstall)? {
        debug!("Appending post-install script {}", name);
        let content = read_script(project_dir, &name)?;
        write!(file, "\n# Post-install script: {name}\n")?;
        file.write_all(&content)?;
        file.write_all(b"\n")?;
    }
    Ok(script_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn literal(path: &str) -> InstallRoot {
        InstallRoot::Literal(path.to_string())
    }

    #[test]
    fn test_literal_root_is_quoted() {
        let script = render_install_script(&literal(r"C:\Tools\Foo\"), true, None);
        assert!(script.starts_with("$ErrorActionPreference = 'Stop'\n\n"));
        assert!(script.contains("$installLocation = 'C:\\Tools\\Foo\\'\n"));
        assert!(script.contains("Get-ChildItem -Path $payloadPath -Recurse"));
        assert!(!script.contains("Executing post-install action"));
    }

    #[test]
    fn test_single_quotes_are_escaped() {
        assert_eq!(install_location_expr(&literal(r"C:\Bob's\")), r"'C:\Bob''s\'");
    }

    #[test]
    fn test_symbolic_root_uses_special_folder() {
        let expr = install_location_expr(&InstallRoot::Symbolic("DesktopFolder"));
        assert_eq!(expr, r"[Environment]::GetFolderPath('Desktop') + '\'");
    }

    #[test]
    fn test_script_only_install() {
        let script = render_install_script(&literal(""), false, Some(PostInstallAction::Restart));
        assert!(script.contains("$installLocation = ''\n"));
        assert!(script.contains("Script-only install"));
        assert!(!script.contains("Copy-Item"));
        assert!(script.ends_with("shutdown /r /t 0\n"));
    }

    #[test]
    fn test_post_install_actions() {
        let root = literal(r"C:\Foo\");
        let logout = render_install_script(&root, true, Some(PostInstallAction::Logout));
        assert!(logout.contains("shutdown /l\n"));
        let none = render_install_script(&root, true, Some(PostInstallAction::None));
        assert!(none.contains("No post-install action required."));
    }

    #[test]
    fn test_before_modify_concatenates_in_order() {
        let dir = tempdir().unwrap();
        let scripts = dir.path().join(SCRIPTS_DIR);
        fs::create_dir_all(&scripts).unwrap();
        fs::write(scripts.join("preinstall_2.ps1"), "Write-Host two").unwrap();
        fs::write(scripts.join("preinstall_1.ps1"), "Write-Host one").unwrap();

        assert!(write_before_modify_script(dir.path()).unwrap());
        let content = fs::read_to_string(dir.path().join(TOOLS_DIR).join(BEFORE_MODIFY_SCRIPT)).unwrap();
        assert_eq!(
            content,
            "# Contents of preinstall_1.ps1\nWrite-Host one\n# Contents of preinstall_2.ps1\nWrite-Host two\n"
        );
    }

    #[test]
    fn test_before_modify_skipped_without_scripts() {
        let dir = tempdir().unwrap();
        assert!(!write_before_modify_script(dir.path()).unwrap());
        assert!(!dir.path().join(TOOLS_DIR).exists());
    }

    #[test]
    fn test_install_script_appends_post_install() {
        let dir = tempdir().unwrap();
        let scripts = dir.path().join(SCRIPTS_DIR);
        fs::create_dir_all(&scripts).unwrap();
        fs::write(scripts.join("postinstall.ps1"), "Write-Host done").unwrap();

        let path = write_install_script(dir.path(), &literal(""), false, None).unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.ends_with("\n# Post-install script: postinstall.ps1\nWrite-Host done\n"));
    }
}
