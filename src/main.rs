use arcana::api::ApiService;
use arcana::config::Settings;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("arcana v{} starting", arcana::VERSION);

    let settings = Settings::load();
    let mut service = ApiService::new(settings);

    if let Err(e) = service.start().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    log::info!("Ready on {}", service.url());

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
    service.stop().await;
}
