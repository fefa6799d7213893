#[tokio::main]
async fn main() {
    if let Err(e) = object_rating::start_server().await {
        eprintln!("Failed to start rating server: {}", e);
        std::process::exit(1);
    }
}
