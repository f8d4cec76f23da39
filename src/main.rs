#[tokio::main]
async fn main() {
    if let Err(e) = gas_estimate_eval::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
