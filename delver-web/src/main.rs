//! Delver Web Server
//!
//! HTTP and SSE front end for the Delver deep research agent.

use clap::Parser;
use delver_core::{init_logging, DelverConfig, LoggingConfig};
use delver_web::{DelverServer, WebConfig};

/// Delver Web Server - streaming deep research over HTTP
#[derive(Parser)]
#[command(name = "delver-web")]
#[command(about = "A web interface for Delver deep research")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let logging = LoggingConfig {
        level: args.log_level.clone(),
        ..Default::default()
    };
    if let Err(e) = init_logging(&logging) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let mut delver_config = match &args.config {
        Some(path) => match DelverConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config file {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => DelverConfig::default(),
    };
    delver_config.apply_env_overrides();

    let mut config = WebConfig::from_env();
    config.host = args.host;
    config.port = args.port;
    config.dev_mode = args.dev;

    println!("Starting Delver web server");
    println!("Server: http://{}:{}", config.host, config.port);

    let server = match DelverServer::new(config, delver_config).await {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        eprintln!("Server failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parsing() {
        let args = Args::parse_from(["delver-web"]);
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, 8080);
        assert!(!args.dev);

        let args = Args::parse_from(["delver-web", "--host", "0.0.0.0", "--port", "3000", "--dev"]);
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.port, 3000);
        assert!(args.dev);
    }
}
