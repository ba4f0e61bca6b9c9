//! Session commands.
//!
//! # Usage
//!
//! ```bash
//! desk login ops@example.com
//! desk status
//! desk logout
//! ```

use std::io::Write;

use product_desk_client::{ClientConfig, Desk};

use super::CommandError;

/// Log in and persist the token.
pub async fn login(desk: &Desk, email: &str) -> Result<(), CommandError> {
    desk.auth().login(email).await?;
    writeln!(std::io::stdout().lock(), "Logged in")?;
    Ok(())
}

pub fn logout(desk: &Desk) -> Result<(), CommandError> {
    desk.auth().logout()?;
    writeln!(std::io::stdout().lock(), "Logged out")?;
    Ok(())
}

/// Report the session state and where the API and token live.
pub fn status(desk: &Desk, config: &ClientConfig) -> Result<(), CommandError> {
    let mut out = std::io::stdout().lock();
    let session = if desk.auth().snapshot().is_authenticated() {
        "logged in"
    } else {
        "not logged in"
    };
    writeln!(out, "Session:    {session}")?;
    writeln!(out, "API:        {}", config.api.base_url)?;
    writeln!(out, "Token file: {}", config.token_file.display())?;
    writeln!(out, "Page size:  {}", config.page_size)?;
    Ok(())
}
