use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use clap::Parser;

use factory_api::config::{TOKEN_LIFETIME_SECONDS, secret_from_env};
use factory_api::services::auth::TokenService;
use factory_api::services::auth::clock::{Clock, FixedClock, SystemClock};

/// Mint a bearer credential for a user id, signed with the API's shared secret.
///
/// Used to bootstrap the first admin (POST /api/v1/tokens itself requires an
/// admin credential) and to hand-craft credentials while debugging.
/// - The credential is byte-for-byte what the API would issue (same TokenService)
/// - The user id is NOT checked against the database; the API does that per request
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Subject (user id) of the credential
    #[arg(long)]
    user_id: i64,

    /// Signing secret. Default: JWT_SECRET, then SECRET_KEY (.env is honored)
    #[arg(long)]
    secret: Option<String>,

    /// Override iat (unix seconds). Default: now.
    #[arg(long)]
    iat: Option<i64>,

    /// Print only the credential (no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let secret = match args.secret {
        Some(secret) => secret,
        None => secret_from_env()?,
    };

    let issued_at: DateTime<Utc> = match args.iat {
        Some(iat) => DateTime::from_timestamp(iat, 0).ok_or("iat out of range")?,
        None => SystemClock.now(),
    };

    let tokens = TokenService::with_clock(
        secret.as_bytes(),
        Duration::seconds(TOKEN_LIFETIME_SECONDS),
        Arc::new(FixedClock(issued_at)),
    )?;
    let token = tokens.issue(args.user_id)?;

    if args.quiet {
        println!("{}", token);
        return Ok(());
    }

    println!("Authorization: Bearer {}", token);
    println!("sub: {}", args.user_id);
    println!("iat: {}", issued_at.timestamp());
    println!("exp: {}", (issued_at + tokens.lifetime()).to_rfc3339());

    Ok(())
}
