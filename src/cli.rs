use clap::{ArgAction, Parser, Subcommand};
use projsync_config::OutputFormat;
use std::path::PathBuf;

/// Manipulate projects in various formats
#[derive(Parser, Debug)]
#[command(name = "projsync", version, about, long_about = None)]
#[command(subcommand_required = true, arg_required_else_help = true)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    /// Directory that listed paths are made relative to
    #[arg(short = 'C', long = "directory", value_name = "DIR", global = true)]
    pub directory: Option<PathBuf>,

    /// Log resolution steps to stderr (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the build source files and other referenced files of a target
    ListFiles {
        /// Path to an .xcodeproj bundle, project.pbxproj, .vcxproj or .sln
        project: PathBuf,

        /// Target name (exact, case-sensitive)
        target: String,

        /// Append the group or filter path of each file after a tab
        #[arg(short = 'b', long = "breadcrumbs")]
        breadcrumbs: bool,

        /// Output format: text or json
        #[arg(short = 'f', long = "format", value_name = "FORMAT")]
        format: Option<OutputFormat>,
    },
    /// List the targets a project defines
    ListTargets {
        /// Path to an .xcodeproj bundle, project.pbxproj, .vcxproj or .sln
        project: PathBuf,
    },
    /// Write a default .projsync/config.toml in the current directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(long = "force")]
        force: bool,
    },
}
