//! # Torque Portal Entry Point
//!
//! The actual setup lives in `lib.rs` so the commands stay testable.

#[tokio::main]
async fn main() {
    std::process::exit(torque_portal::run().await);
}
