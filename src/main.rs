use clap::Parser;
use tracing::{error, info};
use wordhoard::cli::{
    Args, build_config, handle_grant_admin, init_logging, load_signing_key, open_database,
    validate_public_origin, validate_ttl,
};
use wordhoard::run_server;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(signing_key) = load_signing_key(args.jwt_secret_file.as_deref()) else {
        std::process::exit(1);
    };

    let Some(ttl) = validate_ttl(args.access_ttl_secs, args.refresh_ttl_secs) else {
        std::process::exit(1);
    };

    let Some(public_origin) = validate_public_origin(&args.public_origin) else {
        std::process::exit(1);
    };

    let Some(db) = open_database(&args.database).await else {
        std::process::exit(1);
    };

    if let Some(email) = args.grant_admin.as_deref() {
        handle_grant_admin(&db, email).await;
    }

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let config = build_config(
        db,
        &public_origin,
        signing_key,
        ttl,
        args.app_path,
        args.error_path,
    );

    match listener.local_addr() {
        Ok(local_addr) => info!(
            address = %local_addr,
            access_ttl = ttl.access_secs(),
            refresh_ttl = ttl.refresh_secs(),
            secure_cookies = config.secure_cookies,
            "Listening"
        ),
        Err(e) => error!(error = %e, "Failed to read local address"),
    }

    if let Err(e) = run_server(config, listener).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
