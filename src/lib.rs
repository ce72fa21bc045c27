//! # Chocopack Core Library
//!
//! This crate contains the building blocks of `chocopack` – a tool that turns a project directory
//! (`payload/`, `scripts/`, `build-info.yaml`) into a signed Chocolatey package (`.nupkg`).
//!
//! The heavy lifting is done by `nuget` and `signtool`; this library prepares everything they need:
//! the install scripts, the `.nuspec` manifest, a normalized package version and the resolved
//! install location.
//!
//! ## Modules Overview
//! - [`version`] – Version normalization for the package format
//! - [`location`] – Install location normalization and well-known folder resolution
//! - [`config`] – Parsing of `build-info.yaml`
//! - [`project`] – Project layout checks, payload and script discovery
//! - [`scripts`] – Generation of `chocolateyInstall.ps1` / `chocolateyBeforeModify.ps1`
//! - [`nuspec`] – The `.nuspec` manifest
//! - [`tools`] – Running `nuget` and `signtool`
//! - [`package`] – Locating, verifying and hashing the built package
//! - [`build`] – The build driver and dry-run plan
//! - [`logging`] – Log subscriber setup

pub mod version;
pub mod location;
pub mod config;
pub mod project;
pub mod scripts;
pub mod nuspec;
pub mod tools;
pub mod package;
pub mod build;
pub mod logging;

pub use version::*;
pub use location::*;
pub use config::*;
pub use project::*;
pub use scripts::*;
pub use package::*;
pub use build::*;
