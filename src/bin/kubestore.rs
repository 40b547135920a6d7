use kubestore::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; anything else is worth a warning.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    cli::run_cli().await
}
