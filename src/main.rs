//! rattend main entrypoint.

use rattend::run;
use std::io;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RATTEND_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    println!();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
