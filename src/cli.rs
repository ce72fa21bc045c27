use clap::{Parser, Subcommand};
use chocopack::VersionPolicy;

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct CLI {
    /// Enable verbose logging (debug level, written to stdout)
    #[clap(short, long, global = true)]
    pub(crate) verbose: bool,
    #[command(subcommand)]
    pub(crate) command: ChocopackCommand,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum ChocopackCommand {
    /// Builds the `.nupkg` into `<project_dir>/build/` and signs it if a certificate is configured
    Build {
        /// Project directory containing `build-info.yaml`
        project_dir: String,
        /// How `product.version` is turned into the package version
        #[clap(long, value_enum, default_value_t = VersionPolicy::Reduce)]
        version_policy: VersionPolicy,
        /// Keep the generated `tools/` directory after packing
        #[clap(long)]
        keep_tools: bool,
    },
    /// Shows what a build would produce without writing anything
    Plan {
        /// Project directory containing `build-info.yaml`
        project_dir: String,
        /// How `product.version` is turned into the package version
        #[clap(long, value_enum, default_value_t = VersionPolicy::Reduce)]
        version_policy: VersionPolicy,
        /// Print the plan as JSON
        #[clap(long)]
        json: bool,
    },
    /// Creates the project layout and a starter `build-info.yaml`
    Init {
        /// Directory to initialize (created if missing)
        project_dir: String,
    },
}
