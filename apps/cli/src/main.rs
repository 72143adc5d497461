//! # BillBook CLI Entry Point
//!
//! All logic lives in the library crate so it can be tested; see `lib.rs`.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    billbook_cli::run().await
}
