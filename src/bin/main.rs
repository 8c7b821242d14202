//! Descarga Signer CLI
//!
//! Signs bulk download requests with an e.firma certificate and key, and
//! optionally delivers them to the web services.

use clap::{Args, Parser, Subcommand};
use descarga_signer::{
    AccessToken, AuthenticationWindow, ConfigManager, DescargaConfiguration, HttpTransport,
    Passphrase, RequestError, RequestWorkflow, SignedRequest, SigningMaterial, Transport,
    TransportConfig,
};
use miette::{Context, IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "descarga-signer")]
#[command(about = "Sign SAT bulk download web service requests")]
#[command(long_about = "
Descarga Signer - builds signed SOAP requests for the SAT bulk invoice download services

EXAMPLES:
    # Authenticate and print the signed envelope
    descarga-signer authenticate --cert fiel.cer --key fiel.key

    # Request all invoices issued by a taxpayer in January, and send it
    descarga-signer query --cert fiel.cer --key fiel.key \\
        --from 2023-01-01 --to 2023-01-31 --rfc AAA010101AAA --send --token <TOKEN>

    # Check a request, then download one of its packages
    descarga-signer verify --cert fiel.cer --key fiel.key --rfc AAA010101AAA --request-id <ID>
    descarga-signer download --cert fiel.cer --key fiel.key --rfc AAA010101AAA --package-id <ID>

ENVIRONMENT VARIABLES:
    SAT_KEY_PASSPHRASE  Private key passphrase (name configurable)
    RUST_LOG            Logging level (debug, info, warn, error)
")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SigningArgs {
    /// Certificate file (.cer, DER or PEM)
    #[arg(long, value_name = "CERT_FILE")]
    cert: PathBuf,

    /// Encrypted private key file (.key, PKCS#8 DER or PEM)
    #[arg(long, value_name = "KEY_FILE")]
    key: PathBuf,

    /// Deliver the request and print the response instead of the request
    #[arg(long)]
    send: bool,

    /// Write the output to a file instead of stdout
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign an authentication request
    Authenticate {
        #[command(flatten)]
        signing: SigningArgs,

        /// Request id (random when omitted)
        #[arg(long)]
        request_id: Option<Uuid>,

        /// Window start, e.g. 2023-01-01T00:00:00.000Z (now when omitted)
        #[arg(long, requires = "expires")]
        created: Option<String>,

        /// Window end (start plus the configured lifetime when omitted)
        #[arg(long, requires = "created")]
        expires: Option<String>,
    },

    /// Sign a download query
    Query {
        #[command(flatten)]
        signing: SigningArgs,

        /// First day of the range
        #[arg(long = "from", value_name = "DATE")]
        date_from: String,

        /// Last day of the range
        #[arg(long = "to", value_name = "DATE")]
        date_to: String,

        /// Issuer RFC
        #[arg(long)]
        rfc: String,

        /// CFDI or Metadata (defaults to the configured type)
        #[arg(long)]
        request_type: Option<String>,

        /// Access token from a previous authentication
        #[arg(long)]
        token: Option<String>,
    },

    /// Sign a request status check
    Verify {
        #[command(flatten)]
        signing: SigningArgs,

        /// Requester RFC
        #[arg(long)]
        rfc: String,

        /// Request id returned by the query
        #[arg(long)]
        request_id: String,

        /// Access token from a previous authentication
        #[arg(long)]
        token: Option<String>,
    },

    /// Sign a package download request
    Download {
        #[command(flatten)]
        signing: SigningArgs,

        /// Requester RFC
        #[arg(long)]
        rfc: String,

        /// Package id returned by the status check
        #[arg(long)]
        package_id: String,

        /// Access token from a previous authentication
        #[arg(long)]
        token: Option<String>,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Create default configuration file
    Init,
}

/// Certificate, key and passphrase read for one command.
struct LoadedMaterial {
    certificate: Vec<u8>,
    key: Vec<u8>,
    passphrase: Passphrase,
}

impl LoadedMaterial {
    fn read(args: &SigningArgs, config: &DescargaConfiguration) -> Result<Self> {
        let certificate = std::fs::read(&args.cert)
            .into_diagnostic()
            .with_context(|| format!("Failed to read certificate {}", args.cert.display()))?;
        let key = std::fs::read(&args.key)
            .into_diagnostic()
            .with_context(|| format!("Failed to read private key {}", args.key.display()))?;
        let passphrase = std::env::var(&config.passphrase_env_var)
            .into_diagnostic()
            .with_context(|| {
                format!(
                    "{} environment variable not set",
                    config.passphrase_env_var
                )
            })?;
        Ok(Self {
            certificate,
            key,
            passphrase: Passphrase::new(passphrase),
        })
    }

    fn material(&self) -> SigningMaterial<'_> {
        SigningMaterial::new(&self.certificate, &self.key, &self.passphrase)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };

    let workflow = RequestWorkflow::default();

    match cli.command {
        Commands::Authenticate {
            signing,
            request_id,
            created,
            expires,
        } => {
            let config = config_manager.load_or_default()?;
            let loaded = LoadedMaterial::read(&signing, &config)?;
            let window = match (created, expires) {
                (Some(created), Some(expires)) => AuthenticationWindow::new(created, expires)?,
                _ => AuthenticationWindow::starting_now(config.token_lifetime())?,
            };
            let request = workflow.authenticate(
                request_id.unwrap_or_else(Uuid::new_v4),
                window.created(),
                window.expires(),
                loaded.material(),
            )?;
            emit(&signing, &config, request, None).await?;
        }

        Commands::Query {
            signing,
            date_from,
            date_to,
            rfc,
            request_type,
            token,
        } => {
            let config = config_manager.load_or_default()?;
            let loaded = LoadedMaterial::read(&signing, &config)?;
            let request_type = match request_type {
                Some(request_type) => request_type,
                None => config.request_type()?.to_string(),
            };
            let request = workflow.query(
                &date_from,
                &date_to,
                &rfc,
                &request_type,
                loaded.material(),
            )?;
            emit(&signing, &config, request, token).await?;
        }

        Commands::Verify {
            signing,
            rfc,
            request_id,
            token,
        } => {
            let config = config_manager.load_or_default()?;
            let loaded = LoadedMaterial::read(&signing, &config)?;
            let request = workflow.verify(&rfc, &request_id, loaded.material())?;
            emit(&signing, &config, request, token).await?;
        }

        Commands::Download {
            signing,
            rfc,
            package_id,
            token,
        } => {
            let config = config_manager.load_or_default()?;
            let loaded = LoadedMaterial::read(&signing, &config)?;
            let request = workflow.download(&rfc, &package_id, loaded.material())?;
            emit(&signing, &config, request, token).await?;
        }

        Commands::Config(config_cmd) => {
            handle_config_command(&config_manager, config_cmd)?;
        }
    }

    Ok(())
}

/// Print or send a signed request.
async fn emit(
    args: &SigningArgs,
    config: &DescargaConfiguration,
    request: SignedRequest,
    token: Option<String>,
) -> Result<()> {
    let output = if args.send {
        let token = token.map(AccessToken::new).transpose()?;
        let transport = HttpTransport::new(TransportConfig::from(config))?;
        log::info!(
            "Sending {} request to {}",
            request.kind(),
            transport.endpoint(request.kind())
        );
        transport.send(&request, token.as_ref()).await?
    } else {
        request.into_payload()
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, output)
                .into_diagnostic()
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("✅ Written to: {}", path.display());
        }
        None => println!("{output}"),
    }
    Ok(())
}

/// Message for `config show` when the configuration could not be loaded.
fn describe_load_failure(path: &Path, error: &RequestError) -> String {
    if path.exists() {
        format!("❌ Could not load {}: {error}", path.display())
    } else {
        "📋 No configuration file found. Use 'config init' to create one.".to_string()
    }
}

fn handle_config_command(config_manager: &ConfigManager, config_cmd: ConfigCommands) -> Result<()> {
    match config_cmd {
        ConfigCommands::Show => match config_manager.load() {
            Ok(config) => {
                println!("📋 Current Configuration:");
                println!("  Authentication endpoint: {}", config.endpoints.authentication);
                println!("  Query endpoint: {}", config.endpoints.query);
                println!("  Verification endpoint: {}", config.endpoints.verification);
                println!("  Download endpoint: {}", config.endpoints.download);
                println!("  Network timeout: {}s", config.network_timeout_seconds);
                println!("  Retry attempts: {}", config.retry_attempts);
                println!("  Token lifetime: {} min", config.token_lifetime_minutes);
                println!("  Default request type: {}", config.default_request_type);
                println!("  Passphrase variable: {}", config.passphrase_env_var);
                println!(
                    "  Configuration file: {}",
                    config_manager.config_path().display()
                );
            }
            Err(e) => {
                println!("{}", describe_load_failure(config_manager.config_path(), &e));
            }
        },

        ConfigCommands::Init => {
            let _config = config_manager.load_or_create_default()?;
            println!(
                "✅ Configuration initialized: {}",
                config_manager.config_path().display()
            );
        }
    }

    Ok(())
}
