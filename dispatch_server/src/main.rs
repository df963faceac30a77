use dispatch_server::{config::ServerConfig, server::run_server};
use dotenvy::dotenv;
use log::info;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let config = ServerConfig::from_env_or_default();

    info!("🚀️ Starting the dispatch server");
    match run_server(config).await {
        Ok(_) => println!("Bye!"),
        Err(e) => eprintln!("{e}"),
    }
}
