#[tokio::main]
async fn main() -> anyhow::Result<()> {
    docseal_ledger::server::run().await
}
