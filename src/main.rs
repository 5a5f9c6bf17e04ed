#[tokio::main]
async fn main() -> std::io::Result<()> {
    arena_relay::run_with_config().await
}
