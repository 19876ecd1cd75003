//! ra-descriptor CLI
//!
//! Entry point for the `ra-descriptor` command-line tool.

use clap::{Parser, Subcommand};
use ra_descriptor::{
    deploy, DeploymentError, DeploymentInput, DeploymentReport, FieldOverrides, MergeSchema,
    OverrideError, SchemaError,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Schema file picked up from the working directory when `--schema` is absent.
const DEFAULT_SCHEMA_PATH: &str = "ra-descriptor.toml";

#[derive(Parser)]
#[command(name = "ra-descriptor")]
#[command(about = "Resource adapter descriptor merge and validation", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a vendor descriptor into a specification descriptor and validate
    Merge {
        /// Specification descriptor (ra.xml)
        #[arg(long)]
        spec: PathBuf,

        /// Vendor override descriptor
        #[arg(long)]
        vendor: Option<PathBuf>,

        /// Merge schema (default: ./ra-descriptor.toml if present)
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Deployment-time override, PATH=VALUE (repeatable)
        #[arg(long = "set", value_name = "PATH=VALUE")]
        set: Vec<String>,

        /// Write the report here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Parse and validate a specification descriptor on its own
    Check {
        /// Specification descriptor (ra.xml)
        #[arg(long)]
        spec: PathBuf,

        /// Merge schema (default: ./ra-descriptor.toml if present)
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            spec,
            vendor,
            schema,
            set,
            output,
        } => run_merge(&spec, vendor.as_deref(), schema, &set, output.as_deref()),
        Commands::Check {
            spec,
            schema,
            human,
        } => run_check(&spec, schema, human),
    }
}

fn run_merge(
    spec: &Path,
    vendor: Option<&Path>,
    schema_path: Option<PathBuf>,
    assignments: &[String],
    output: Option<&Path>,
) {
    let schema = exit_on_schema_error(load_schema(schema_path));

    let mut overrides = FieldOverrides::new();
    for assignment in assignments {
        if let Err(e) = overrides.insert_assignment(assignment) {
            eprintln!("Invalid override: {}", e);
            process::exit(1);
        }
    }

    let input = exit_on_input_error(DeploymentInput::from_paths(spec, vendor));

    let outcome = deploy(&input, &schema).and_then(|mut deployment| {
        match deployment.configuration.with_overrides(&overrides) {
            Ok(derived) => {
                deployment.configuration = derived;
                Ok(deployment)
            }
            Err(OverrideError::Invalid(violations)) => Err(DeploymentError::Validation(violations)),
            Err(e) => {
                eprintln!("Override failed: {}", e);
                process::exit(1);
            }
        }
    });

    let report = DeploymentReport::new(&input, &outcome);
    emit_report(&report, output);

    if let Err(e) = outcome {
        print_rejection(&e);
        process::exit(1);
    }
}

fn run_check(spec: &Path, schema_path: Option<PathBuf>, human: bool) {
    let schema = exit_on_schema_error(load_schema(schema_path));
    let input = exit_on_input_error(DeploymentInput::from_paths(spec, None));
    let outcome = deploy(&input, &schema);

    if human {
        match &outcome {
            Ok(deployment) => {
                println!("Descriptor valid: {}", spec.display());
                println!("  Connectors: {}", deployment.configuration.connectors().len());
                for diagnostic in &deployment.diagnostics {
                    println!("  Note: {}", diagnostic);
                }
            }
            Err(e) => print_rejection(e),
        }
    } else {
        emit_report(&DeploymentReport::new(&input, &outcome), None);
    }

    if outcome.is_err() {
        process::exit(1);
    }
}

fn load_schema(schema_path: Option<PathBuf>) -> Result<MergeSchema, SchemaError> {
    match schema_path {
        Some(path) => MergeSchema::from_file(&path),
        None => {
            let path = PathBuf::from(DEFAULT_SCHEMA_PATH);
            if path.exists() {
                MergeSchema::from_file(&path)
            } else {
                Ok(MergeSchema::default())
            }
        }
    }
}

fn exit_on_schema_error(schema: Result<MergeSchema, SchemaError>) -> MergeSchema {
    match schema {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("Error loading schema: {}", e);
            process::exit(1);
        }
    }
}

fn exit_on_input_error(input: Result<DeploymentInput, DeploymentError>) -> DeploymentInput {
    match input {
        Ok(input) => input,
        Err(e) => {
            print_rejection(&e);
            process::exit(1);
        }
    }
}

fn emit_report(report: &DeploymentReport, output: Option<&Path>) {
    match output {
        Some(path) => {
            if let Err(e) = report.write_to_file(path) {
                eprintln!("Error writing report to {}: {}", path.display(), e);
                process::exit(1);
            }
        }
        None => match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        },
    }
}

fn print_rejection(error: &DeploymentError) {
    eprintln!("Deployment rejected at {} stage: {}", error.stage(), error);
    for message in error.messages() {
        eprintln!("  - {}", message);
    }
}
