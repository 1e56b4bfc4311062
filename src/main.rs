//! webres CLI
//!
//! Entry point for the `webres` command-line tool.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use webres::config::Overrides;
use webres::server::{ResourceServer, ServeOutcome};
use webres::verify::verify_file;
use webres::{
    logging, markup, verify, Algorithm, AssetType, Checksum, DigestEncoding, FsCatalog,
    RenderOptions, ResourceDescriptor, ResourceRequest, Resolver, Settings, Verification,
};

#[derive(Parser)]
#[command(name = "webres")]
#[command(about = "Checksum-verified JavaScript/CSS resources", version)]
struct Cli {
    /// Path to settings file (default: ~/.config/webres/config.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Catalog root directory (overrides the settings file)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Log debug events
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a catalog resource's local file (exit 0 verified, 1 not verified, 2 indeterminate)
    Verify {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Verify any file against an algorithm:digest checksum
    VerifyFile {
        /// File to check
        file: PathBuf,

        /// Expected checksum, e.g. sha256:5891b5...
        #[arg(long)]
        checksum: String,
    },

    /// Print the algorithm:digest checksum of a file
    Checksum {
        file: PathBuf,

        /// Digest algorithm
        #[arg(long, short = 'a', default_value = "sha384", value_parser = parse_algorithm)]
        algorithm: Algorithm,

        /// Write the digest in base64 instead of hex
        #[arg(long)]
        base64: bool,
    },

    /// Print the script or link element for a catalog resource
    Tag {
        #[command(flatten)]
        request: RequestArgs,

        /// Self-closing XML style markup
        #[arg(long)]
        xml: bool,

        /// Content-Security-Policy nonce
        #[arg(long)]
        nonce: Option<String>,

        /// Path prefix for locally served resources
        #[arg(long)]
        prefix: Option<String>,

        /// Refuse to print unless the local file verifies
        #[arg(long)]
        verify: bool,
    },

    /// Write a verified catalog resource to stdout
    Serve {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Verify every record in the catalog
    Audit {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct RequestArgs {
    /// Vendor, lower case
    vendor: String,
    /// Product, lower case
    product: String,
    /// Resource name, e.g. jquery
    name: String,
    /// Version
    version: String,

    /// Variant, e.g. min
    #[arg(long)]
    variant: Option<String>,

    /// Request a stylesheet instead of a script
    #[arg(long)]
    css: bool,
}

impl RequestArgs {
    fn to_request(&self) -> ResourceRequest {
        let asset = if self.css {
            AssetType::Css
        } else {
            AssetType::JavaScript
        };
        let request = ResourceRequest::new(
            asset,
            &self.vendor,
            &self.product,
            &self.name,
            &self.version,
        );
        match &self.variant {
            Some(variant) => request.with_variant(variant),
            None => request,
        }
    }
}

fn parse_algorithm(s: &str) -> Result<Algorithm, String> {
    s.parse::<Algorithm>().map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let overrides = Overrides {
        catalog_root: cli.catalog.clone(),
        ..Default::default()
    };

    match cli.command {
        Commands::Verify { request } => {
            let settings = load_settings(cli.config, overrides);
            run_verify(&settings, &request.to_request());
        }
        Commands::VerifyFile { file, checksum } => {
            run_verify_file(&file, &checksum);
        }
        Commands::Checksum {
            file,
            algorithm,
            base64,
        } => {
            run_checksum(&file, algorithm, base64);
        }
        Commands::Tag {
            request,
            xml,
            nonce,
            prefix,
            verify,
        } => {
            let overrides = Overrides {
                src_prefix: prefix,
                xml: xml.then_some(true),
                ..overrides
            };
            let settings = load_settings(cli.config, overrides);
            run_tag(&settings, &request.to_request(), nonce, verify);
        }
        Commands::Serve { request } => {
            let settings = load_settings(cli.config, overrides);
            run_serve(&settings, &request.to_request());
        }
        Commands::Audit { json } => {
            let settings = load_settings(cli.config, overrides);
            run_audit(&settings, json);
        }
    }
}

fn load_settings(path: Option<PathBuf>, overrides: Overrides) -> Settings {
    match Settings::load_or_default(path.as_deref()) {
        Ok(settings) => settings.apply_overrides(overrides),
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    }
}

fn resolve_or_exit(settings: &Settings, request: &ResourceRequest) -> ResourceDescriptor {
    let catalog = FsCatalog::new(&settings.catalog_root);
    match catalog.resolve(request) {
        Ok(Some(descriptor)) => descriptor,
        Ok(None) => {
            eprintln!("Not found: {}", request);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error resolving {}: {}", request, e);
            process::exit(1);
        }
    }
}

fn exit_for(verification: &Verification) -> ! {
    match verification {
        Verification::Verified => process::exit(0),
        Verification::NotVerified => process::exit(1),
        Verification::Indeterminate(_) => process::exit(2),
    }
}

fn run_verify(settings: &Settings, request: &ResourceRequest) {
    let descriptor = resolve_or_exit(settings, request);
    let verification = verify(&descriptor);
    println!("{}", verification);
    exit_for(&verification);
}

fn run_verify_file(file: &std::path::Path, checksum: &str) {
    let verification = verify_file(file, checksum);
    println!("{}", verification);
    exit_for(&verification);
}

fn run_checksum(file: &std::path::Path, algorithm: Algorithm, base64: bool) {
    let encoding = if base64 {
        DigestEncoding::Base64
    } else {
        DigestEncoding::Hex
    };
    match Checksum::for_file(algorithm, file, encoding) {
        Ok(checksum) => println!("{}", checksum),
        Err(e) => {
            eprintln!("Error hashing {}: {}", file.display(), e);
            process::exit(1);
        }
    }
}

fn run_tag(
    settings: &Settings,
    request: &ResourceRequest,
    nonce: Option<String>,
    require_verified: bool,
) {
    let descriptor = resolve_or_exit(settings, request);

    if require_verified {
        let verification = verify(&descriptor);
        if !verification.is_trusted() {
            eprintln!("Refusing {}: {}", request, verification);
            process::exit(1);
        }
    }

    let options = RenderOptions {
        xml: settings.xml,
        nonce,
        prefix: settings.src_prefix.clone(),
    };
    match markup::render(&descriptor, &options) {
        Ok(rendered) => {
            for notice in &rendered.notices {
                tracing::warn!(%request, "{}", notice);
            }
            println!("{}", rendered.markup);
        }
        Err(e) => {
            eprintln!("Cannot render {}: {}", request, e);
            process::exit(1);
        }
    }
}

fn run_serve(settings: &Settings, request: &ResourceRequest) {
    let server = ResourceServer::new(FsCatalog::new(&settings.catalog_root));
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match server.serve(request, &mut out) {
        Ok(ServeOutcome::Served(head)) => {
            tracing::info!(
                content_type = %head.content_type,
                content_length = head.content_length,
                last_modified = head.last_modified.as_deref().unwrap_or("-"),
                "response head"
            );
        }
        Ok(ServeOutcome::NotFound) => {
            eprintln!("Not found: {}", request);
            process::exit(1);
        }
        Ok(ServeOutcome::NotLocal) => {
            eprintln!("{} has no local file to serve", request);
            process::exit(1);
        }
        Ok(ServeOutcome::Refused(verification)) => {
            eprintln!("Refusing {}: {}", request, verification);
            process::exit(1);
        }
        Err(e) => {
            let _ = out.flush();
            eprintln!("Error serving {}: {}", request, e);
            process::exit(1);
        }
    }
}

fn run_audit(settings: &Settings, json_output: bool) {
    let catalog = FsCatalog::new(&settings.catalog_root);
    let entries = match catalog.audit() {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error walking catalog {}: {}", settings.catalog_root.display(), e);
            process::exit(1);
        }
    };

    if json_output {
        let output: Vec<serde_json::Value> = entries
            .iter()
            .map(|e| match &e.outcome {
                Ok(v) => serde_json::json!({
                    "record": e.record.display().to_string(),
                    "asset": e.asset.to_string(),
                    "outcome": v.label(),
                    "detail": v.to_string(),
                }),
                Err(err) => serde_json::json!({
                    "record": e.record.display().to_string(),
                    "asset": e.asset.to_string(),
                    "outcome": "error",
                    "detail": err.to_string(),
                }),
            })
            .collect();
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        for e in &entries {
            match &e.outcome {
                Ok(v) => println!("{:<14} {}", v.label(), e.record.display()),
                Err(err) => println!("{:<14} {} ({})", "error", e.record.display(), err),
            }
        }
        let trusted = entries.iter().filter(|e| e.is_trusted()).count();
        println!();
        println!("{}/{} records verified", trusted, entries.len());
    }

    if entries.iter().all(|e| e.is_trusted()) {
        process::exit(0);
    } else {
        process::exit(1);
    }
}
