use dotenv::dotenv;
use vodclip::api::{self, AppState};
use vodclip::{Config, ProgressRegistry};

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let addr = format!("{}:{}", config.addr, config.port);

    let state = AppState {
        registry: ProgressRegistry::new(),
        config,
    };

    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind TCP listener");
    println!("Listening at {}", addr);
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
