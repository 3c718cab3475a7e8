use anyhow::Result;

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    searchcode::cli::run().await
}
