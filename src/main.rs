#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = ecoly::run().await {
        eprintln!("ecoly fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
