//! Build automation tasks for the eagle-sql workspace.
//!
//! Run with `cargo run -p xtask -- <command>`.
//!
//! ## Available Commands
//!
//! - `ci`: Run format, lint and test checks
//! - `fmt`: Check/apply code formatting
//! - `clippy`: Run clippy lints
//! - `test`: Run tests, optionally skipping the local HTTP suite
//! - `doc`: Generate documentation
//! - `fuzz`: Run a fuzz target (requires cargo-fuzz + nightly)
//! - `package`: Package the publishable crates

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use xshell::{Shell, cmd};

/// Crates published to crates.io, in dependency order.
const PUBLISHED_CRATES: &[&str] = &[
    "eagle-types",
    "eagle-protocol",
    "eagle-codec",
    "eagle-auth",
    "eagle-client",
];

#[derive(Parser)]
#[command(name = "xtask", about = "Build automation for eagle-sql")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run format, lint and test checks
    Ci,
    /// Run cargo fmt (--check by default, --fix to apply)
    Fmt {
        /// Apply formatting fixes
        #[arg(long)]
        fix: bool,
    },
    /// Run clippy over all targets
    Clippy {
        /// Apply clippy suggestions
        #[arg(long)]
        fix: bool,
    },
    /// Run tests
    Test {
        /// Test a specific package
        #[arg(short, long)]
        package: Option<String>,
        /// Skip tests that bind a local HTTP listener
        #[arg(long)]
        offline: bool,
    },
    /// Generate documentation
    Doc {
        /// Open documentation in browser
        #[arg(long)]
        open: bool,
    },
    /// Run a fuzz target (requires cargo-fuzz + nightly)
    Fuzz {
        /// Fuzz target to run
        #[arg(default_value = "parse_response")]
        target: String,
        /// Maximum runtime in seconds
        #[arg(long, default_value = "60")]
        max_time: u64,
        /// List available fuzz targets
        #[arg(long)]
        list: bool,
    },
    /// Package the publishable crates
    Package {
        /// Skip running tests first
        #[arg(long)]
        no_test: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    // Change to workspace root
    let workspace_root = workspace_root()?;
    sh.change_dir(&workspace_root);

    match cli.command {
        Command::Ci => {
            println!("Running CI checks...");
            fmt(&sh, false)?;
            clippy(&sh, false)?;
            test(&sh, None, false)?;
            println!("\nAll CI checks passed.");
        }
        Command::Fmt { fix } => fmt(&sh, fix)?,
        Command::Clippy { fix } => clippy(&sh, fix)?,
        Command::Test { package, offline } => test(&sh, package.as_deref(), offline)?,
        Command::Doc { open } => doc(&sh, open)?,
        Command::Fuzz {
            target,
            max_time,
            list,
        } => fuzz(&sh, &target, max_time, list)?,
        Command::Package { no_test } => package(&sh, no_test)?,
    }

    Ok(())
}

fn workspace_root() -> Result<PathBuf> {
    let output = std::process::Command::new("cargo")
        .args(["locate-project", "--workspace", "--message-format=plain"])
        .output()
        .context("failed to run cargo locate-project")?;

    let path = String::from_utf8(output.stdout)
        .context("invalid UTF-8 in cargo output")?
        .trim()
        .to_string();

    Ok(PathBuf::from(path)
        .parent()
        .context("failed to get workspace root")?
        .to_path_buf())
}

fn fmt(sh: &Shell, fix: bool) -> Result<()> {
    if fix {
        cmd!(sh, "cargo fmt --all").run()?;
    } else {
        cmd!(sh, "cargo fmt --all -- --check").run()?;
        println!("Format check passed.");
    }
    Ok(())
}

fn clippy(sh: &Shell, fix: bool) -> Result<()> {
    if fix {
        cmd!(sh, "cargo clippy --workspace --all-targets --fix --allow-dirty").run()?;
    } else {
        cmd!(sh, "cargo clippy --workspace --all-targets -- -D warnings").run()?;
        println!("Clippy check passed.");
    }
    Ok(())
}

fn test(sh: &Shell, package: Option<&str>, offline: bool) -> Result<()> {
    println!("Running tests...");

    let package_args: Vec<&str> = match package {
        Some(pkg) => vec!["-p", pkg],
        None => vec!["--workspace"],
    };

    // The http_transport suite and the mock server tests need a loopback listener
    let skip_args: &[&str] = if offline {
        &["--", "--skip", "over_http", "--skip", "mock_server"]
    } else {
        &[]
    };

    cmd!(sh, "cargo test {package_args...} {skip_args...}").run()?;
    println!("All tests passed.");
    Ok(())
}

fn doc(sh: &Shell, open: bool) -> Result<()> {
    println!("Generating documentation...");
    if open {
        cmd!(sh, "cargo doc --workspace --no-deps --open").run()?;
    } else {
        cmd!(sh, "cargo doc --workspace --no-deps").run()?;
    }
    Ok(())
}

fn fuzz(sh: &Shell, target: &str, max_time: u64, list: bool) -> Result<()> {
    let fuzz_dir = sh.current_dir().join("fuzz");
    let targets_dir = fuzz_dir.join("fuzz_targets");

    if !targets_dir.exists() {
        bail!("fuzz targets not found under {}", targets_dir.display());
    }

    if list {
        println!("Available fuzz targets:");
        for entry in fs::read_dir(&targets_dir)? {
            let entry = entry?;
            if let Some(name) = entry.path().file_stem() {
                println!("  - {}", name.to_string_lossy());
            }
        }
        return Ok(());
    }

    if !targets_dir.join(format!("{target}.rs")).exists() {
        bail!("unknown fuzz target: {target}");
    }

    println!("Running fuzz target: {target} for {max_time}s");

    // cargo-fuzz requires nightly
    let max_time_str = max_time.to_string();
    let _dir = sh.push_dir(&fuzz_dir);
    cmd!(
        sh,
        "cargo +nightly fuzz run {target} -- -max_total_time={max_time_str}"
    )
    .run()?;

    Ok(())
}

fn package(sh: &Shell, no_test: bool) -> Result<()> {
    if !no_test {
        test(sh, None, false)?;
    }

    for crate_name in PUBLISHED_CRATES {
        cmd!(sh, "cargo package -p {crate_name} --allow-dirty").run()?;
    }

    println!("Packages written to target/package/");
    Ok(())
}
