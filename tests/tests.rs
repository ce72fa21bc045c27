use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup_tests(install_location: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("payload").join("docs")).unwrap();
    fs::create_dir_all(root.join("scripts")).unwrap();
    fs::write(root.join("payload").join("docs").join("readme.txt"), "hello").unwrap();
    fs::write(root.join("scripts").join("postinstall_10.ps1"), "Write-Host ten").unwrap();
    fs::write(root.join("scripts").join("postinstall_01.ps1"), "Write-Host one").unwrap();
    fs::write(
        root.join("build-info.yaml"),
        format!(
            "install_location: '{install_location}'\npostinstall_action: logout\nproduct:\n  identifier: acme-docs\n  version: 3.300.70000\n  name: Docs\n  developer: ACME\n  description: ACME documentation\n"
        ),
    )
    .unwrap();
    temp_dir
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[cfg(test)]
mod tests {
    use chocopack::{plan_package, stage_package, BuildOptions, InstallRoot, VersionPolicy, WellKnownDirs};
    use crate::{read, setup_tests};

    #[test]
    fn test_stage_and_plan_agree_on_install_root() {
        let dir = setup_tests(r"C:\Users\alice\Documents\Acme\");
        let dirs = WellKnownDirs::for_home(r"C:\Users\alice");

        let plan = plan_package(dir.path(), VersionPolicy::Reduce, &dirs).unwrap();
        assert_eq!(plan.version, "3.44.4464");
        assert_eq!(plan.files[0].destination, r"C:\Users\alice\Documents\Acme\docs\readme.txt");

        let root = plan.install_root.clone().unwrap();
        let InstallRoot::Literal(root_path) = &root else { panic!("expected a literal root") };

        let (_, version, nuspec, _) = stage_package(dir.path(), &BuildOptions::default(), &dirs).unwrap();
        assert_eq!(version, plan.version);

        let script = read(&dir.path().join("tools").join("chocolateyInstall.ps1"));
        assert!(script.contains(&format!("$installLocation = '{root_path}'")));
        assert!(script.contains("$destinationPath = Join-Path $installLocation $relativePath"));

        let one = script.find("postinstall_01.ps1").unwrap();
        let ten = script.find("postinstall_10.ps1").unwrap();
        assert!(one < ten);
        assert!(script.find("shutdown /l").unwrap() < one);

        let xml = read(nuspec.path());
        assert!(xml.contains("<description>ACME documentation</description>"));
        assert!(xml.contains(r#"<file src="payload/docs/readme.txt" target="payload/docs/readme.txt"/>"#));
        assert!(!dir.path().join("tools").join("chocolateyBeforeModify.ps1").exists());
    }

    #[test]
    fn test_symbolic_root_in_script() {
        let dir = setup_tests("C:/ProgramData");
        let dirs = WellKnownDirs::for_home(r"C:\Users\alice");

        stage_package(dir.path(), &BuildOptions::default(), &dirs).unwrap();
        let script = read(&dir.path().join("tools").join("chocolateyInstall.ps1"));
        assert!(script.contains(r"$installLocation = [Environment]::GetFolderPath('CommonApplicationData') + '\'"));
    }
}
