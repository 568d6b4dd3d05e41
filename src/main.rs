//! PixelPuritan server - rate-limited NSFW image classification
//!
//! Configuration comes from `PIXELPURITAN_*` environment variables, with a
//! `.env` file in the working directory loaded first when present.

#![allow(missing_docs)]

use pixelpuritan::server;
use pixelpuritan::utils::logging::{LogFormat, init_logging};
use std::process::ExitCode;
use tracing::Level;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_logging(Level::INFO, LogFormat::from_env());

    match server::run_server().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
