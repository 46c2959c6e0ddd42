#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    datasync::app::run().await
}
