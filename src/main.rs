#[tokio::main]
async fn main() {
    std::process::exit(mcm_lib::run().await);
}
