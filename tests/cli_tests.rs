#[cfg(test)]
mod cli_integration_tests {
    use assert_cmd::Command;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_project(dir: &Path, version: &str, install_location: &str) {
        fs::create_dir_all(dir.join("payload/bin")).unwrap();
        fs::create_dir_all(dir.join("scripts")).unwrap();
        fs::write(dir.join("payload/bin/foo.exe"), "binary").unwrap();
        fs::write(dir.join("scripts/preinstall.ps1"), "Write-Host pre").unwrap();
        fs::write(
            dir.join("build-info.yaml"),
            format!(
                "install_location: {install_location}\nproduct:\n  identifier: acme-foo\n  version: {version}\n  name: Foo\n  developer: ACME\n"
            ),
        )
        .unwrap();
    }

    #[test]
    fn test_execute_init_creates_layout() {
        let dir = tempdir().unwrap();
        let project = dir.path().join("my-tool");

        Command::cargo_bin("chocopack").unwrap()
            .arg("init")
            .arg(&project)
            .assert()
            .success();

        for sub in ["payload", "scripts", "build", "tools"] {
            assert!(project.join(sub).is_dir());
        }
        let content = fs::read_to_string(project.join("build-info.yaml")).unwrap();
        assert!(content.contains("identifier: my-tool"));
        assert!(content.contains("version: 1.0.0"));
    }

    #[test]
    fn test_execute_init_refuses_overwrite() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("build-info.yaml"), "keep me").unwrap();

        Command::cargo_bin("chocopack").unwrap()
            .arg("init")
            .arg(dir.path())
            .assert()
            .failure();

        assert_eq!(fs::read_to_string(dir.path().join("build-info.yaml")).unwrap(), "keep me");
    }

    #[test]
    fn test_execute_plan_json() {
        let dir = tempdir().unwrap();
        write_project(dir.path(), "1.2.3.456", "C:/Program Files");

        let output = Command::cargo_bin("chocopack").unwrap()
            .args(["plan", "--json"])
            .arg(dir.path())
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let plan: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(plan["version"], "1.2.3456");
        assert_eq!(plan["package_file"], "Foo-1.2.3456.nupkg");
        assert_eq!(plan["install_root"]["kind"], "symbolic");
        assert_eq!(plan["install_root"]["value"], "ProgramFiles64Folder");
        assert_eq!(plan["files"][0]["destination"], "ProgramFiles64Folder\\bin\\foo.exe");
        assert_eq!(plan["pre_install_scripts"][0], "preinstall.ps1");
        // a dry run leaves the project untouched
        assert!(!dir.path().join("tools").exists());
    }

    #[test]
    fn test_execute_plan_pass_through_policy() {
        let dir = tempdir().unwrap();
        write_project(dir.path(), "2024.10.11", "C:/Tools/Foo");

        let output = Command::cargo_bin("chocopack").unwrap()
            .args(["plan", "--version-policy", "pass-through"])
            .arg(dir.path())
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let output_str = String::from_utf8_lossy(&output);
        assert!(output_str.contains("Foo-2024.10.11.nupkg"));
        assert!(output_str.contains("C:\\Tools\\Foo\\bin\\foo.exe"));
    }

    #[test]
    fn test_execute_build_rejects_invalid_version() {
        let dir = tempdir().unwrap();
        write_project(dir.path(), "1.a.3", "C:/Tools/Foo");

        let output = Command::cargo_bin("chocopack").unwrap()
            .arg("build")
            .arg(dir.path())
            .assert()
            .failure()
            .get_output()
            .stderr
            .clone();

        let stderr = String::from_utf8_lossy(&output);
        assert!(stderr.contains("invalid version part: \"a\""));
        assert!(!dir.path().join("tools").exists());
        assert!(!dir.path().join("Foo.nuspec").exists());
    }

    #[test]
    fn test_execute_build_requires_project_files() {
        let dir = tempdir().unwrap();

        let output = Command::cargo_bin("chocopack").unwrap()
            .arg("build")
            .arg(dir.path())
            .assert()
            .failure()
            .get_output()
            .stderr
            .clone();

        assert!(String::from_utf8_lossy(&output).contains("'payload' or 'scripts'"));
    }
}
