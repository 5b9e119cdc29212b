//! graphql-autogen: Compile scanned domain descriptors into a GraphQL schema
//!
//! Reads descriptor documents produced by a scanner and generates:
//! - The schema as SDL (written to the output file, or stdout with `--dry-run`)
//! - Optional data-loader metadata as JSON
//!
//! Usage:
//!   graphql-autogen generate descriptors.json -p com.example.shop -o schema.graphqls
//!   graphql-autogen validate descriptors.json -p com.example.shop --fail-on-error

use clap::{Args, Parser, Subcommand};
use graphql_autogen::{CompiledSchema, CompilerConfig, JsonScanner, NamingStrategy, Scanner, SchemaCompiler};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{CliError, ConfigFile};

#[derive(Parser, Debug)]
#[command(name = "graphql-autogen", version)]
#[command(about = "Compile scanned domain descriptors into a GraphQL schema")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile and write the schema
    Generate(GenerateArgs),
    /// Compile and report diagnostics without writing anything
    Validate(ScopeArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct ScopeArgs {
    /// Descriptor documents (JSON) produced by a scanner
    descriptors: Vec<PathBuf>,

    /// Base packages to include (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    packages: Vec<String>,

    /// Packages to exclude (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Casing for auto-named types: PASCAL_CASE, CAMEL_CASE or SNAKE_CASE
    #[arg(long)]
    naming_strategy: Option<NamingStrategy>,

    /// Maximum package depth below a base package
    #[arg(long)]
    max_depth: Option<usize>,

    /// Only emit input types that operations reference
    #[arg(long)]
    no_inputs: bool,

    /// Skip fields declared on superclasses and interfaces
    #[arg(long)]
    no_inherited: bool,

    /// Fail when any issue was recovered during compilation
    #[arg(long)]
    fail_on_error: bool,

    /// Configuration file (defaults to graphql-autogen.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
struct GenerateArgs {
    #[command(flatten)]
    scope: ScopeArgs,

    /// Output SDL file path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write data-loader metadata (JSON) to this path
    #[arg(long)]
    data_loaders: Option<PathBuf>,

    /// Print the SDL to stdout instead of writing it
    #[arg(long)]
    dry_run: bool,
}

/// Effective settings after merging the config file and flags
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    compiler: CompilerConfig,
    descriptors: Vec<PathBuf>,
    data_loader_output: Option<PathBuf>,
}

impl ScopeArgs {
    /// Load the configuration file and apply flag overrides
    fn settings(&self) -> Result<Settings, CliError> {
        let file = ConfigFile::load(self.config.as_deref())?;
        Ok(self.apply(file))
    }

    fn apply(&self, file: ConfigFile) -> Settings {
        let mut compiler = file.compiler;
        if !self.packages.is_empty() {
            compiler.base_packages = self.packages.clone();
        }
        if !self.exclude.is_empty() {
            compiler.exclude_packages = self.exclude.clone();
        }
        if let Some(strategy) = self.naming_strategy {
            compiler.naming_strategy = strategy;
        }
        if let Some(depth) = self.max_depth {
            compiler.max_scan_depth = depth;
        }
        if self.no_inputs {
            compiler.generate_inputs = false;
        }
        if self.no_inherited {
            compiler.include_inherited_fields = false;
        }
        if self.fail_on_error {
            compiler.fail_on_error = true;
        }

        let descriptors = if self.descriptors.is_empty() {
            file.descriptors
        } else {
            self.descriptors.clone()
        };

        Settings {
            compiler,
            descriptors,
            data_loader_output: file.data_loader_output,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Scan, compile and report diagnostics
fn compile(settings: &Settings) -> Result<CompiledSchema, CliError> {
    if settings.descriptors.is_empty() {
        return Err(CliError::NoDescriptors);
    }

    let compiler = SchemaCompiler::new(settings.compiler.clone())?;
    let descriptors = JsonScanner::from_config(&settings.descriptors, compiler.config()).scan()?;
    let compiled = compiler.compile(&descriptors)?;

    for diagnostic in &compiled.diagnostics {
        warn!("{}", diagnostic);
    }
    Ok(compiled)
}

fn generate(args: &GenerateArgs) -> Result<(), CliError> {
    let mut settings = args.scope.settings()?;
    if let Some(output) = &args.output {
        settings.compiler.output_file = output.clone();
    }
    if let Some(path) = &args.data_loaders {
        settings.data_loader_output = Some(path.clone());
    }

    let compiled = compile(&settings)?;
    let sdl = compiled.to_sdl()?;

    if args.dry_run {
        print!("{}", sdl);
    } else {
        write_file(&settings.compiler.output_file, &sdl)?;
        info!(
            path = %settings.compiler.output_file.display(),
            types = compiled.schema.types.len(),
            "wrote schema"
        );

        if let Some(path) = &settings.data_loader_output {
            let metadata = serde_json::to_string_pretty(&compiled.data_loaders)?;
            write_file(path, &metadata)?;
            info!(path = %path.display(), loaders = compiled.data_loaders.len(), "wrote data-loader metadata");
        }
    }

    compiled.check(settings.compiler.fail_on_error)?;
    Ok(())
}

fn validate(args: &ScopeArgs) -> Result<(), CliError> {
    let settings = args.settings()?;
    let compiled = compile(&settings)?;
    info!(
        types = compiled.schema.types.len(),
        diagnostics = compiled.diagnostics.len(),
        "schema is valid"
    );
    compiled.check(settings.compiler.fail_on_error)?;
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| CliError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Generate(args) => generate(args)?,
        Command::Validate(args) => validate(args)?,
    }
    Ok(())
}
