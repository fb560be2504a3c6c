#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = examroom_rust::run().await {
        eprintln!("examroom-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
