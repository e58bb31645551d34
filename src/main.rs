#[tokio::main]
async fn main() {
    if let Err(e) = health_detective_lib::run().await {
        tracing::error!("{e}");
        eprintln!("health-detective: {e}");
        std::process::exit(1);
    }
}
