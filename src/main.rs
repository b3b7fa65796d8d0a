use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use std::path::PathBuf;
use std::process::ExitCode;
use summit_upload::imaging::RustBackend;
use summit_upload::storage::{S3Store, StorageCredentials};
use summit_upload::upload::{self, RollbackPolicy, UploadReport, UploadRequest};
use summit_upload::{config, output};

#[derive(Parser)]
#[command(name = "summit-upload")]
#[command(about = "Upload a summit photo to S3 storage")]
#[command(long_about = "\
Upload a summit photo to S3 storage

Reads the summit YAML file, picks the image entry at --index, resizes the
photo to two JPEGs (main: 1600px wide, preview: 75px wide) and uploads them
to the keys in the entry's `url` and `preview_url` fields.

Summit file:

  images:
    - url: summits/elbrus/main.jpg            # main variant key
      preview_url: summits/elbrus/preview.jpg # preview variant key
    - ...

Credentials come from S3_ACCESS_KEY and S3_SECRET_KEY. Both must be set.")]
#[command(version)]
struct Cli {
    /// Path to the image file to upload
    #[arg(long, value_parser = existing_file)]
    image_path: PathBuf,

    /// Path to the summit YAML file
    #[arg(long, value_parser = existing_file)]
    summit_path: PathBuf,

    /// Index of the image in the summit file (zero-based)
    #[arg(long, allow_negative_numbers = true)]
    index: i64,

    /// S3 bucket name [default: storage.bucket from --config, else the site bucket]
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    bucket: Option<String>,

    /// TOML file overriding endpoint, bucket, variant widths or quality
    #[arg(long, value_parser = existing_file)]
    config: Option<PathBuf>,

    /// Delete the main image again if the preview upload fails
    #[arg(long)]
    rollback_on_failure: bool,

    /// Log diagnostics to stderr (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

/// Accept only paths to readable regular files.
fn existing_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.exists() {
        return Err(format!("'{}' does not exist", value));
    }
    if path.is_dir() {
        return Err(format!("'{}' is a directory", value));
    }
    std::fs::File::open(&path).map_err(|e| format!("'{}' is not readable: {}", value, e))?;
    Ok(path)
}

fn init_tracing(verbose: bool) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "summit_upload=debug".to_string()
        } else {
            "summit_upload=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version are "errors" that print to stdout
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(report) => {
            output::print_success(&report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            output::print_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<UploadReport, Box<dyn std::error::Error>> {
    let config = config::load_config(cli.config.as_deref())?;

    let request = UploadRequest {
        image_path: cli.image_path.clone(),
        manifest_path: cli.summit_path.clone(),
        index: cli.index,
        variants: config.variants.clone(),
        rollback: if cli.rollback_on_failure {
            RollbackPolicy::DeleteUploaded
        } else {
            RollbackPolicy::KeepUploaded
        },
    };

    let entry = upload::select_entry(&request, |event| output::print_upload_event(&event))?;

    // Manifest errors win over missing credentials; the photo is not touched
    // until both are in place.
    let credentials = StorageCredentials::from_env()?;
    let bucket = cli
        .bucket
        .clone()
        .unwrap_or_else(|| config.storage.bucket.clone());
    let store = S3Store::new(&config.storage, &bucket, &credentials)?;

    let report = upload::upload_entry(&request, entry, &RustBackend::new(), &store, |event| {
        output::print_upload_event(&event)
    })?;
    Ok(report)
}
