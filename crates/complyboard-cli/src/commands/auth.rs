//! Authentication commands.

use super::build_session;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use std::io::{self, Write};

use complyboard_auth::{AuthError, AuthGate, Credentials, GateDecision};
use complyboard_core::Config;
use complyboard_storage::TokenKind;

/// Sign in with username and password.
pub async fn login(config: &Config, format: &OutputFormat) -> Result<()> {
    let session = build_session(config)?;
    let store = session.client().token_store();

    if let Some(access) = store.get(TokenKind::Access)? {
        if !complyboard_auth::is_expired(&access) {
            output::print_success(
                "Already signed in. Run 'complyboard logout' to switch accounts",
                format,
            );
            return Ok(());
        }
    }

    print!("Username: ");
    io::stdout().flush()?;
    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    let username = username.trim().to_string();

    if username.is_empty() {
        output::print_error("Username is required", format);
        return Ok(());
    }

    // Prompt for password (hidden)
    let password = rpassword::prompt_password("Password: ")?;

    if password.is_empty() {
        output::print_error("Password is required", format);
        return Ok(());
    }

    println!("Signing in...");

    match session
        .authenticate(&Credentials { username, password })
        .await
    {
        Ok(user) => {
            output::print_success(&format!("Signed in as {}", user.username), format);
        }
        Err(AuthError::Rejected { status: 401 }) => {
            output::print_error("Invalid username or password", format);
        }
        Err(e) => {
            output::print_error(&format!("Sign-in failed: {}", e), format);
        }
    }

    Ok(())
}

/// Sign out and clear the stored session.
pub async fn logout(config: &Config, format: &OutputFormat) -> Result<()> {
    let session = build_session(config)?;
    session.logout()?;
    output::print_success("Signed out", format);
    Ok(())
}

/// Report session status, attempting the same silent refresh a protected
/// view would.
pub async fn status(config: &Config, format: &OutputFormat) -> Result<()> {
    let session = build_session(config)?;
    let client = session.client();
    let store = client.token_store();

    let gate = AuthGate::new(client.clone());
    let signed_in = matches!(gate.evaluate("/").await, GateDecision::Authenticated);

    // Re-read after evaluation; the gate may have refreshed the token
    let expires_at = store
        .get(TokenKind::Access)?
        .as_deref()
        .and_then(complyboard_auth::decode_expiry)
        .and_then(|exp| chrono::DateTime::from_timestamp(exp, 0))
        .map(|dt| dt.to_rfc3339());
    let has_refresh = store.get(TokenKind::Refresh)?.is_some();

    match format {
        OutputFormat::Text => {
            output::print_row("Backend", &config.api_base_url);
            output::print_row("Auth", if signed_in { "signed in" } else { "signed out" });
            if let Some(expires_at) = &expires_at {
                output::print_row("Expires", expires_at);
            }
            output::print_row("Refresh", if has_refresh { "stored" } else { "none" });
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "backend": config.api_base_url,
                "signed_in": signed_in,
                "expires_at": expires_at,
                "refresh_token_stored": has_refresh,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}

/// Fetch and print the current user's profile.
pub async fn whoami(config: &Config, format: &OutputFormat) -> Result<()> {
    let session = build_session(config)?;

    match session.fetch_current_user().await {
        Ok(user) => match format {
            OutputFormat::Text => {
                output::print_row("Username", &user.username);
                output::print_row("User ID", &user.id.to_string());
                if let Some(email) = &user.email {
                    output::print_row("Email", email);
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&user)?);
            }
        },
        Err(AuthError::Rejected { status: 401 }) => {
            output::print_error("Not signed in. Run 'complyboard login' first", format);
        }
        Err(e) => {
            output::print_error(&format!("Failed to fetch current user: {}", e), format);
        }
    }

    Ok(())
}
