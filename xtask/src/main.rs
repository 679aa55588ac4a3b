use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for canvas-view")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks (fmt, clippy, build, test)
    Ci,
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Run tests, optionally limited to one module (geometry, canvas, presenter, ...)
    Test {
        module: Option<String>,
        #[arg(long)]
        doc: bool,
    },
    /// Run benchmarks
    Bench,
    /// Open the viewer on an image, or the fade demo without one
    Demo {
        image: Option<String>,
        #[arg(short, long)]
        policy: Option<String>,
        #[arg(long)]
        release: bool,
    },
    /// Install a git pre-commit hook running fmt, clippy and test
    InstallHooks,
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Commands::Ci => run_ci(),
        Commands::Fmt { check } => cargo(fmt_args(check)),
        Commands::Clippy { fix } => cargo(clippy_args(fix)),
        Commands::Test { module, doc } => cargo(test_args(module.as_deref(), doc)),
        Commands::Bench => cargo(vec!["bench".into()]),
        Commands::Demo {
            image,
            policy,
            release,
        } => run_demo(image, policy, release),
        Commands::InstallHooks => install_hooks(),
    }
}

fn fmt_args(check: bool) -> Vec<String> {
    let mut args = vec!["fmt".into(), "--all".into()];
    if check {
        args.extend(["--".into(), "--check".into()]);
    }
    args
}

fn clippy_args(fix: bool) -> Vec<String> {
    let mut args = vec!["clippy".into(), "--all-targets".into()];
    if fix {
        args.push("--fix".into());
    } else {
        args.extend(["--".into(), "-D".into(), "warnings".into()]);
    }
    args
}

fn test_args(module: Option<&str>, doc: bool) -> Vec<String> {
    let mut args = vec!["test".to_string()];
    if doc {
        args.push("--doc".into());
    } else if let Some(module) = module {
        args.extend(["--lib".into(), module.to_string()]);
    }
    args
}

fn run_ci() -> Result<()> {
    println!("{}", "=== Running CI Pipeline ===".bold().blue());
    let start = Instant::now();

    let steps = [
        ("Format Check", fmt_args(true)),
        ("Clippy", clippy_args(false)),
        ("Build", vec!["build".to_string()]),
        ("Test", test_args(None, false)),
    ];

    for (name, args) in steps {
        println!("{} {}", "→".blue(), name.bold());
        if let Err(e) = cargo(args) {
            println!("{} {}", "✗".red().bold(), name);
            return Err(e);
        }
    }

    println!(
        "\n{} {}",
        "✓ CI passed in".green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );
    Ok(())
}

fn run_demo(image: Option<String>, policy: Option<String>, release: bool) -> Result<()> {
    let mut args = vec!["run".to_string()];
    if release {
        args.push("--release".into());
    }
    args.push("--".into());
    if let Some(image) = image {
        if !std::path::Path::new(&image).exists() {
            anyhow::bail!("image not found: {}", image);
        }
        args.push(image);
    }
    if let Some(policy) = policy {
        args.extend(["--policy".into(), policy]);
    }
    cargo(args)
}

fn install_hooks() -> Result<()> {
    use std::fs;

    let hook_path = ".git/hooks/pre-commit";
    fs::write(
        hook_path,
        "#!/bin/sh\n# Auto-generated by cargo x install-hooks\nset -e\ncargo x ci\n",
    )?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(hook_path, fs::Permissions::from_mode(0o755))?;
    }

    println!("{}", "✓ Git hooks installed".green());
    Ok(())
}

fn cargo(args: Vec<String>) -> Result<()> {
    let status = Command::new("cargo")
        .args(&args)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("cargo {} failed with exit code: {}", args.join(" "), status);
    }
    Ok(())
}
