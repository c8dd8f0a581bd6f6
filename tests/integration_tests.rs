use cucumber::World;

pub mod common;
pub mod steps;

pub use common::world::HttpWorld;

/// Feature files, run one after another so mock servers and temp dirs of one
/// feature never overlap another
const FEATURES: &[&str] = &[
    "features/parser.feature",
    "features/directory.feature",
    "features/navigation.feature",
    "features/dispatch.feature",
    "features/application.feature",
];

/// Behaviour tests: `cargo test --test integration_tests`
///
/// Logging goes to stderr at the level given by `HTTUI_LOG` (default error).
#[tokio::main]
async fn main() {
    let filter = std::env::var("HTTUI_LOG").unwrap_or_else(|_| "error".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    for (i, feature) in FEATURES.iter().enumerate() {
        tracing::info!("[{}/{}] {}", i + 1, FEATURES.len(), feature);
        HttpWorld::run(*feature).await;
    }
}
