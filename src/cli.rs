use std::path::PathBuf;

use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::builder::styling::Effects;

/// Styling for the CLI, matching the rest of the workspace's tools.
pub const CLAP_STYLING: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default())
    .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
    .valid(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .invalid(AnsiColor::Yellow.on_default().effects(Effects::BOLD));

/// Discovers an installation, runs every analyzer over its non-system
/// extensions, and prints a terse per-extension summary. Exists to
/// exercise discovery, inventory, and analysis end to end; a full
/// HTML/Markdown report is an external collaborator's job, not this
/// binary's.
#[derive(Parser, Debug)]
#[command(version, author, styles = CLAP_STYLING, about = "Estimate the effort and risk of upgrading a CMS installation to a target version.")]
pub struct CliArguments {
    /// Path to the installation to analyze.
    pub installation_path: PathBuf,

    /// The core version to evaluate the upgrade against, e.g. `12.4.8`.
    #[arg(long)]
    pub target: String,

    /// Name (or path) of the rewrite tool binary to shell out to.
    #[arg(long, default_value = "rector")]
    pub rewrite_tool: String,
}
