use anyhow::Result;

use feedsum::app::run;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    run().await
}
