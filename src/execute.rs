use std::path::Path;
use anyhow::{bail, Result};
use colored::Colorize;
use chocopack::{
    build_package, ensure_project_dirs, normalize_project_path, plan_package, BuildInfo,
    BuildOptions, BuildPlan, VersionPolicy, WellKnownDirs, BUILD_INFO_FILE,
};
use tracing::info;
use crate::cli::{ChocopackCommand, CLI};

pub fn execute(cli: CLI) -> Result<()> {
    match cli.command {
        ChocopackCommand::Build { project_dir, version_policy, keep_tools } => {
            execute_build(&project_dir, version_policy, keep_tools)
        }
        ChocopackCommand::Plan { project_dir, version_policy, json } => {
            execute_plan(&project_dir, version_policy, json)
        }
        ChocopackCommand::Init { project_dir } => {
            execute_init(&project_dir)
        }
    }
}

pub fn execute_build(project_dir: &str, version_policy: VersionPolicy, keep_tools: bool) -> Result<()> {
    let project_dir = normalize_project_path(project_dir);
    let options = BuildOptions { version_policy, keep_tools };
    let package = build_package(&project_dir, &options)?;
    println!("{} {}", "Built".green().bold(), package.display());
    Ok(())
}

pub fn execute_plan(project_dir: &str, version_policy: VersionPolicy, json: bool) -> Result<()> {
    let project_dir = normalize_project_path(project_dir);
    let dirs = WellKnownDirs::for_current_user()?;
    let plan = plan_package(&project_dir, version_policy, &dirs)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
    }
    Ok(())
}

fn print_plan(plan: &BuildPlan) {
    println!("{} {} ({})", "Package:".bold(), plan.name, plan.identifier);
    println!("{} {} -> {} [{}]", "Version:".bold(), plan.raw_version, plan.version.cyan(), plan.version_policy);
    println!("{} {}", "Output:".bold(), plan.package_file);
    match &plan.install_root {
        Some(root) => println!("{} {}", "Install root:".bold(), root.to_string().cyan()),
        None => println!("{} {}", "Install root:".bold(), "none (script-only package)".yellow()),
    }
    for file in &plan.files {
        println!("   {} -> {}", file.source, file.destination);
    }
    for script in &plan.pre_install_scripts {
        println!("   pre-install: {script}");
    }
    for script in &plan.post_install_scripts {
        println!("   post-install: {script}");
    }
    if let Some(action) = &plan.post_install_action {
        println!("{} {}", "Post-install action:".bold(), action);
    }
    match &plan.signing_certificate {
        Some(cert) => println!("{} {}", "Signed with:".bold(), cert),
        None => println!("{} {}", "Signed with:".bold(), "unsigned".yellow()),
    }
}

pub fn execute_init(project_dir: &str) -> Result<()> {
    let project_dir = normalize_project_path(project_dir);
    let build_info = project_dir.join(BUILD_INFO_FILE);
    if build_info.exists() {
        bail!("{} already exists in {}", BUILD_INFO_FILE, project_dir.display());
    }
    ensure_project_dirs(&project_dir)?;
    let name = project_name(&project_dir)?;
    BuildInfo::template(&name).save(&build_info)?;
    info!("Initialized project {} in {}", name, project_dir.display());
    Ok(())
}

fn project_name(project_dir: &Path) -> Result<String> {
    let absolute = if project_dir.is_absolute() {
        project_dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(project_dir)
    };
    let absolute = absolute.canonicalize().unwrap_or(absolute);
    let name = absolute.file_name().ok_or(anyhow::anyhow!("Could not get file name"))?
        .to_str().ok_or(anyhow::anyhow!("Invalid directory name"))?;
    Ok(name.to_string())
}
