use miner::runtime::{boot, run};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    boot::init_logging();
    let (state, config) = boot::boot().await?;
    run::run(state, config).await
}
