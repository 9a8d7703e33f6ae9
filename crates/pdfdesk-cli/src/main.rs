//! pdfdesk CLI: upload, list, delete and search PDF documents.
//!
//! Configure with PDFDESK_API_URL and PDFDESK_COGNITO_CLIENT_ID (a `.env` file
//! is read when present). Log in once; the session is kept in
//! PDFDESK_SESSION_FILE.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pdfdesk_api_client::{ApiClient, IdentityClient, PresignedStorageClient};
use pdfdesk_cli::{
    init_tracing, parse_threshold, print_json, read_line, render_file_table, LogFormat,
    OutputFormat,
};
use pdfdesk_core::ClientConfig;
use pdfdesk_services::account::{self, PendingSignupStore, SignUpForm};
use pdfdesk_services::{
    load_selection, RefreshSignal, SearchSession, SessionState, SessionStore, UploadPipeline,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pdfdesk", about = "PDF document service client", version)]
struct Cli {
    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value = "text", env = "PDFDESK_LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account; a confirmation code is emailed
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// Prompted for when omitted
        #[arg(long, env = "PDFDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Confirm an account with the emailed code and register it
    Confirm {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
        /// Overrides the name given at sign-up
        #[arg(long, requires = "last_name")]
        first_name: Option<String>,
        #[arg(long, requires = "first_name")]
        last_name: Option<String>,
    },
    /// Send a new confirmation code
    ResendCode {
        #[arg(long)]
        email: String,
    },
    /// Request a password reset code
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password using the reset code
    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
        /// Prompted for when omitted
        #[arg(long, env = "PDFDESK_NEW_PASSWORD", hide_env_values = true)]
        new_password: Option<String>,
    },
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long, env = "PDFDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// End the session
    Logout,
    /// Show whether the stored session is valid
    Session,
    /// Upload a PDF file
    Upload {
        /// Path to the file to upload
        path: PathBuf,
        /// Declared media type (guessed from the extension by default)
        #[arg(long)]
        content_type: Option<String>,
    },
    /// List uploaded files
    List {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Delete an uploaded file by ID
    Delete {
        /// File UUID
        file_id: String,
    },
    /// Ask a question about the uploaded documents
    Search {
        query: String,
        /// Similarity threshold between 0 and 1 (presets: 0.90, 0.85, 0.80, 0.75, 0.65)
        #[arg(long, value_parser = parse_threshold)]
        threshold: Option<f64>,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

/// Password from the flag, or prompted twice on stdin.
fn password_with_confirmation(
    given: Option<String>,
    prompt: &str,
) -> anyhow::Result<(String, String)> {
    match given {
        Some(password) => Ok((password.clone(), password)),
        None => {
            let password = read_line(prompt)?;
            let confirmation = read_line("Confirm password: ")?;
            Ok((password, confirmation))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = ClientConfig::from_env().context("Invalid pdfdesk configuration")?;
    let api = ApiClient::from_config(&config).context("Failed to create API client")?;
    let session = SessionState::new(SessionStore::new(config.session_file.clone()));
    let pending = PendingSignupStore::beside(&config.session_file);
    let identity = || {
        IdentityClient::from_config(&config).context("Failed to create identity provider client")
    };

    match cli.command {
        Commands::Signup {
            email,
            first_name,
            last_name,
            password,
        } => {
            let (password, confirm_password) = password_with_confirmation(password, "Password: ")?;
            let form = SignUpForm {
                email,
                password,
                confirm_password,
                first_name,
                last_name,
            };
            let result = account::sign_up(&identity()?, &pending, &form)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            print_json(&result)?;
            if !result.user_confirmed {
                eprintln!("Check your email for the confirmation code, then run `pdfdesk confirm`.");
            }
        }
        Commands::Confirm {
            email,
            code,
            first_name,
            last_name,
        } => {
            let names = first_name.zip(last_name);
            let response =
                account::confirm_and_register(&identity()?, &api, &pending, &email, &code, names)
                    .await
                    .map_err(|e| anyhow::anyhow!("Confirmation failed: {}", e.user_message()))?;
            print_json(&response)?;
        }
        Commands::ResendCode { email } => {
            let delivery = identity()?
                .resend_confirmation_code(&email)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            print_json(&delivery)?;
        }
        Commands::ForgotPassword { email } => {
            let delivery = identity()?
                .forgot_password(&email)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            print_json(&delivery)?;
        }
        Commands::ResetPassword {
            email,
            code,
            new_password,
        } => {
            let (password, confirmation) =
                password_with_confirmation(new_password, "New password: ")?;
            if password != confirmation {
                anyhow::bail!("Passwords do not match");
            }
            identity()?
                .confirm_forgot_password(&email, &code, &password)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("Password reset. You can now log in.");
        }
        Commands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => read_line("Password: ")?,
            };
            let stored = session
                .login(&identity()?, &api, &email, &password)
                .await
                .map_err(|e| anyhow::anyhow!("Login failed: {}", e.user_message()))?;
            println!("Logged in as {}", stored.email);
        }
        Commands::Logout => {
            session.logout(&api).await.context("Failed to clear session")?;
            println!("Logged out");
        }
        Commands::Session => {
            let authenticated = session.initialize(&api).await?;
            print_json(&serde_json::json!({
                "authenticated": authenticated,
                "email": session.email().await,
            }))?;
        }
        Commands::Upload { path, content_type } => {
            session.initialize(&api).await?;
            let client = session.authorized_client(&api).await?;
            let store = PresignedStorageClient::from_config(&config)
                .context("Failed to create storage client")?;
            let pipeline = UploadPipeline::new(Arc::new(client), Arc::new(store), RefreshSignal::new());

            let file = load_selection(&path, content_type.as_deref())
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if let Err(e) = pipeline.select_file(file).await {
                tracing::debug!(error = ?e, "Selection refused");
                println!("{}", e);
                return Ok(ExitCode::FAILURE);
            }

            let outcome = pipeline.upload().await?;
            match outcome.cause() {
                None => tracing::info!(path = %path.display(), "Upload finished"),
                Some(cause) => tracing::warn!(path = %path.display(), cause, "Upload rejected"),
            }
            println!("{}", outcome.status_message());
            if !outcome.is_stored() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::List { format } => {
            session.initialize(&api).await?;
            let client = session.authorized_client(&api).await?;
            let files = client
                .list_files()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to fetch files: {}", e.user_message()))?;
            match format {
                OutputFormat::Json => print_json(&files)?,
                OutputFormat::Table => print!("{}", render_file_table(&files)),
            }
        }
        Commands::Delete { file_id } => {
            session.initialize(&api).await?;
            let client = session.authorized_client(&api).await?;
            client
                .delete_file(&file_id)
                .await
                .map_err(|e| anyhow::anyhow!("Delete failed: {}", e.user_message()))?;
            println!("Deleted {}", file_id.trim());
        }
        Commands::Search {
            query,
            threshold,
            format,
        } => {
            session.initialize(&api).await?;
            let client = session.authorized_client(&api).await?;
            let mut search = SearchSession::new(threshold.unwrap_or(config.search_threshold))?;
            let exchange = search
                .ask(&client, &query)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            match format {
                OutputFormat::Json => print_json(exchange)?,
                OutputFormat::Table => {
                    println!("{}", exchange.response);
                    match &exchange.file.cdn_url {
                        Some(url) => println!("\nSource: {} ({})", exchange.file.file_name, url),
                        None => println!("\nSource: {}", exchange.file.file_name),
                    }
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
