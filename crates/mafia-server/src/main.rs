//! Match service entry point

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use log::{debug, info, warn};
use mafia_core::{EngineRng, GameEngine};
use mafia_server::{handlers, Config, ServerState};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let engine = match config.shuffle_seed {
        Some(seed) => GameEngine::with_rng(EngineRng::new(seed)),
        None => GameEngine::new(),
    };

    let state = Arc::new(ServerState {
        engine,
        wait_timeout: config.wait_timeout(),
    });

    let listener = TcpListener::bind(&config.listen).await?;
    info!("listening on http://{}", config.listen);

    loop {
        let (stream, remote_addr) = match listener.accept().await {
            Ok(connection) => connection,
            Err(err) => {
                warn!("accept error: {err}");
                continue;
            }
        };

        let state = state.clone();
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |request| {
                let state = state.clone();
                async move {
                    Ok::<_, hyper::Error>(handlers::handle_request(state, request).await)
                }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                debug!("connection from {remote_addr} ended: {err}");
            }
        });
    }
}
