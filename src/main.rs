#[tokio::main]
async fn main() {
    portfolio_api::run().await;
}
