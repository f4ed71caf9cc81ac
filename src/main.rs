use movieweb::{app, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    movieweb::init_tracing();

    let app_state = AppState::init().await?;
    let (host, port) = (app_state.config.host.clone(), app_state.config.port);

    let router = app::build_app(app_state);
    app::serve(router, &host, port).await
}
