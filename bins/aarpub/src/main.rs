//! aarpub CLI
//!
//! Resolves repository credentials, synthesizes the runtime dependency
//! manifest, and publishes an Android library package.

use aarpub_cli::output::{format_count, format_duration, format_size, mask, Status};
use aarpub_cli::progress;
use aarpub_core::config::Config;
use aarpub_core::error::{exit_codes, Error};
use aarpub_publish::{
    assemble_from_config, gradle, pom, publisher_for, synthesize, BuildInputs, SecretResolver,
};
use aarpub_telemetry::{level_for_verbosity, TelemetryConfig, Timer};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aarpub")]
#[command(about = "Publish Android library packages to Maven repositories")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Gradle project root (overrides [project].root)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Library module directory (overrides [project].module)
    #[arg(long, global = true)]
    module: Option<String>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a secret through the configured layers
    Resolve {
        /// Key to look up, e.g. GITHUB_TOKEN
        key: String,
        /// Print the raw value instead of a masked summary
        #[arg(long)]
        reveal: bool,
    },

    /// Show the runtime dependency manifest
    Manifest,

    /// Render the complete POM for the package
    Pom,

    /// Show the assembled publish descriptor
    Descriptor,

    /// Publish the built artifact
    Publish {
        /// Report what would be published without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Run the Gradle release build first
        #[arg(long)]
        build: bool,
        /// Repository URL (overrides configuration and gradle.properties)
        #[arg(long)]
        repository: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let mut config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => std::process::exit(report_error(&err, cli.json)),
    };

    let level = level_for_verbosity(&config.schema.logging.level, cli.verbose, cli.quiet);
    aarpub_telemetry::init_with_config(TelemetryConfig::with_level(level))?;

    let outcome = match &cli.command {
        Commands::Resolve { key, reveal } => run_resolve(&config, key, *reveal, cli.json),
        Commands::Manifest => run_manifest(&config, cli.json),
        Commands::Pom => run_pom(&config),
        Commands::Descriptor => run_descriptor(&config),
        Commands::Publish {
            dry_run,
            build,
            repository,
        } => run_publish(&mut config, *dry_run, *build, repository.as_deref(), &cli),
    };

    let exit_code = match outcome {
        Ok(code) => code,
        Err(err) => report_error(&err, cli.json),
    };

    std::process::exit(exit_code);
}

fn load_config(cli: &Cli) -> Result<Config, Error> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(root) = &cli.root {
        config.schema.project.root = root.clone();
    }
    if let Some(module) = &cli.module {
        config.schema.project.module = module.clone();
    }
    Ok(config)
}

fn report_error(err: &Error, json: bool) -> i32 {
    if json {
        match serde_json::to_string_pretty(&err.to_report()) {
            Ok(report) => eprintln!("{}", report),
            Err(_) => Status::error(&err.to_string()),
        }
    } else {
        Status::error(&err.to_string());
    }
    err.exit_code()
}

fn run_resolve(config: &Config, key: &str, reveal: bool, json: bool) -> Result<i32, Error> {
    let resolver = SecretResolver::from_config(config);
    let value = resolver.resolve(key);

    if json {
        let shown = if reveal { value.clone() } else { value.as_deref().map(|v| mask(Some(v))) };
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "key": key,
                "found": value.is_some(),
                "value": shown,
            }))?
        );
    } else if reveal {
        if let Some(v) = &value {
            println!("{}", v);
        }
    } else {
        Status::field(key, &mask(value.as_deref()));
    }

    Ok(if value.is_some() {
        exit_codes::SUCCESS
    } else {
        exit_codes::FAILURE
    })
}

fn run_manifest(config: &Config, json: bool) -> Result<i32, Error> {
    let inputs = BuildInputs::load(config)?;
    let entries = synthesize(&inputs.declarations);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", pom::render_dependencies(&entries, 0));
        let skipped = inputs.declarations.len() - entries.len();
        if skipped > 0 {
            Status::warning(&format!(
                "Skipped {} without group or version",
                format_count(skipped, "declaration", "declarations")
            ));
        }
    }
    Ok(exit_codes::SUCCESS)
}

fn run_pom(config: &Config) -> Result<i32, Error> {
    let inputs = BuildInputs::load(config)?;
    let entries = synthesize(&inputs.declarations);
    print!("{}", pom::render_pom(&inputs.coordinates, &entries));
    Ok(exit_codes::SUCCESS)
}

fn run_descriptor(config: &Config) -> Result<i32, Error> {
    let descriptor = assemble_from_config(config)?;
    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    Ok(exit_codes::SUCCESS)
}

fn run_publish(
    config: &mut Config,
    dry_run: bool,
    build: bool,
    repository: Option<&str>,
    cli: &Cli,
) -> Result<i32, Error> {
    if let Some(url) = repository {
        config.schema.publish.repository_url = Some(url.to_string());
    }

    if build {
        let timer = Timer::start("assemble_release");
        let pb = progress::spinner("Building release artifact...");
        let result = gradle::assemble_release(config.project_root(), &config.schema.project.module);
        match result {
            Ok(r) if r.success => {
                progress::finish_success(&pb, &format!("Built in {}", format_duration(timer.stop())));
            }
            Ok(r) => {
                progress::finish_error(&pb, "Gradle build failed");
                eprintln!("{}", r.combined_output());
                return Ok(exit_codes::FAILURE);
            }
            Err(e) => {
                progress::finish_error(&pb, "Gradle build failed");
                return Err(e);
            }
        }
    }

    let descriptor = assemble_from_config(config)?;
    let publisher = publisher_for(&descriptor.repository.url, dry_run)?;

    let timer = Timer::start("publish");
    let report = publisher.publish(&descriptor, &descriptor.artifact_path)?;
    let elapsed = timer.stop();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(exit_codes::SUCCESS);
    }

    if !cli.quiet {
        Status::header(&format!(
            "{} {}",
            if report.dry_run { "Would publish" } else { "Published" },
            report.package
        ));
        Status::field("repository", &report.repository);
        let size = std::fs::metadata(&descriptor.artifact_path)
            .map(|m| format_size(m.len()))
            .unwrap_or_default();
        Status::field("artifact", &format!("{} ({})", descriptor.artifact_path.display(), size));
        Status::field(
            "dependencies",
            &format_count(descriptor.dependencies.len(), "runtime dependency", "runtime dependencies"),
        );
        Status::field("identity", &mask(descriptor.credentials.identity.as_deref()));
        Status::field("token", &mask(descriptor.credentials.token.as_deref()));
        for file in &report.files {
            println!("    {}", file.display());
        }
        Status::success(&format!("Done in {}", format_duration(elapsed)));
    }

    Ok(exit_codes::SUCCESS)
}
