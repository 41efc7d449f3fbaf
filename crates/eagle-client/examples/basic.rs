//! Basic query example.
//!
//! This example runs one query against the EAGLE service and prints the
//! rows, then fetches the documentation page of the queried table.
//!
//! # Running
//!
//! ```bash
//! export EAGLE_USER=jdoe
//! export EAGLE_PASSWORD=secret   # prompted for if unset
//!
//! cargo run --example basic
//! ```

// Allow common patterns in example code
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::{self, BufRead, Write};

use eagle_client::{AuthError, Config, EnvPassword, Error, FnPassword, PasswordProvider, connect};

const TABLE: &str = "RefL0012N0188_Subhalo";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let user = std::env::var("EAGLE_USER").unwrap_or_else(|_| "guest".into());
    let conn_str = std::env::var("EAGLE_CONNECTION").unwrap_or_default();
    let config = Config::from_connection_string(&conn_str)?;

    // Environment first, then an interactive prompt
    let prompt = FnPassword::new(|username: &str| {
        if let Some(password) = EnvPassword::default().password(username)? {
            return Ok(Some(password));
        }
        print!("Password for {username}: ");
        io::stdout()
            .flush()
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        Ok(Some(line.trim_end().to_string()))
    });

    let client = connect(config, user, None, &prompt)?;

    let sql = format!("SELECT TOP 5 GalaxyID, SnapNum, Redshift FROM {TABLE} ORDER BY GalaxyID");
    let done = client.execute_query(&sql).await?;
    for warning in &done.warnings {
        eprintln!("warning: {warning}");
    }

    let result = done.into_value();
    println!("{} rows, query time {:?}", result.len(), result.query_time());
    for row in &result {
        let id: i64 = row.try_get("GalaxyID")?;
        let snap: i32 = row.try_get("SnapNum")?;
        let z: f32 = row.try_get("Redshift")?;
        println!("{id:>12} {snap:>4} {z:>8.4}");
    }

    let docs = client.fetch_docs(TABLE).await?.into_value();
    println!("\n{} lines of documentation for {TABLE}", docs.lines().len());

    Ok(())
}
