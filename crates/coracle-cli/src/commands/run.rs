//! `coracle run` — launch a command inside a fresh container.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use coracle_common::config::LauncherConfig;
use coracle_common::types::ImageName;
use coracle_runtime::supervisor::Supervisor;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Command to execute inside the container (searched along $PATH).
    pub command: String,

    /// Arguments passed to the command.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Base image name to construct the container root from.
    #[arg(long, default_value = coracle_common::constants::DEFAULT_IMAGE_NAME)]
    pub image: String,

    /// Image store root holding `<name>.tar` archives.
    #[arg(long, value_name = "DIR", default_value = coracle_common::constants::DEFAULT_IMAGE_DIR)]
    pub image_dir: PathBuf,

    /// Container store root for per-container overlay directories.
    #[arg(long, value_name = "DIR", default_value = coracle_common::constants::DEFAULT_CONTAINER_DIR)]
    pub container_dir: PathBuf,

    /// Exit with the contained command's status instead of 0.
    #[arg(long)]
    pub propagate_exit: bool,
}

/// Executes the `run` command.
///
/// # Errors
///
/// Returns an error if image resolution, overlay construction, or
/// supervision fails.
pub fn execute(args: RunArgs) -> anyhow::Result<ExitCode> {
    let config = LauncherConfig {
        image_dir: args.image_dir,
        container_dir: args.container_dir,
        image: ImageName::new(args.image),
    };

    tracing::debug!(command = %args.command, image = ?config.image, "run requested");

    let supervisor = Supervisor::new(config);
    let report = supervisor.run(&args.command, &args.args)?;

    eprintln!("{}", report.describe());
    Ok(to_exit_code(report.launcher_exit_code(args.propagate_exit)))
}

fn to_exit_code(code: i32) -> ExitCode {
    ExitCode::from(clamp_code(code))
}

fn clamp_code(code: i32) -> u8 {
    u8::try_from(code.clamp(0, 255)).unwrap_or(u8::MAX)
}
