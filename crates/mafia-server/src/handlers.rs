//! Request handlers bridging HTTP to the match engine
//!
//! Each handler decodes its parameters, calls the engine, and encodes the
//! result. Engine errors map onto HTTP statuses so that client-caused
//! failures stay client-visible: conflicts with game state are 409,
//! unknown hosts are 404, an expired wait is 408, and a match destroyed
//! mid-wait is 410.

use crate::response::{PhaseExecutionResponse, PlayerResponse};
use crate::routes::{self, Route};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use log::{debug, error};
use mafia_core::{Error as EngineError, GameEngine};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Shared state handed to every connection
pub struct ServerState {
    /// The match engine
    pub engine: GameEngine,
    /// Deadline applied to the two wait endpoints
    pub wait_timeout: Duration,
}

/// Dispatch one request against the route table
///
/// Generic over the body type because no endpoint reads a request body;
/// everything arrives in the path and query string.
pub async fn handle_request<B>(state: Arc<ServerState>, request: Request<B>) -> Response<Full<Bytes>> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(|query| query.to_string());

    let Some(route) = routes::route(&method, &path) else {
        return status_response(StatusCode::NOT_FOUND);
    };
    debug!("{method} {path} -> {route:?}");

    match route {
        Route::InitializeGame { host } => empty_result(state.engine.initialize_game(&host).await),
        Route::CancelGame { host } => empty_result(state.engine.cancel_game(&host).await),
        Route::FinishGame { host } => empty_result(state.engine.finish_game(&host).await),
        Route::JoinGame { host } => {
            let Some(player) = routes::query_param(query.as_deref(), "playerAddress") else {
                return status_response(StatusCode::BAD_REQUEST);
            };
            let Some(nickname) = routes::query_param(query.as_deref(), "playerNickname") else {
                return status_response(StatusCode::BAD_REQUEST);
            };
            empty_result(state.engine.join_game(&host, &player, &nickname).await)
        }
        Route::StartGame { host } => empty_result(state.engine.start_game(&host).await),
        Route::WaitForGameStart { host } => empty_result(
            state
                .engine
                .wait_for_game_start(&host, sleep(state.wait_timeout))
                .await,
        ),
        Route::ExecutePhase { host } => {
            empty_result(state.engine.execute_phase(&host).await.map(|_| ()))
        }
        Route::WaitForPhaseExecution { host } => {
            match state
                .engine
                .wait_for_phase_execution(&host, sleep(state.wait_timeout))
                .await
            {
                Ok(execution) => json_response(&PhaseExecutionResponse::from(execution)),
                Err(err) => error_response(&err),
            }
        }
        Route::GetPlayers { host } => match state.engine.get_players(&host).await {
            Ok(players) => {
                let listing: Vec<PlayerResponse> =
                    players.iter().map(PlayerResponse::without_role).collect();
                json_response(&listing)
            }
            Err(err) => error_response(&err),
        },
        Route::GetPlayer { host, player } => match state.engine.get_player(&host, &player).await {
            Ok(Some(player)) => json_response(&PlayerResponse::with_role(&player)),
            Ok(None) => status_response(StatusCode::NOT_FOUND),
            Err(err) => error_response(&err),
        },
        Route::AccuseAsMafia { host, voter } => {
            let Some(accused) = routes::query_param(query.as_deref(), "playerAddress") else {
                return status_response(StatusCode::BAD_REQUEST);
            };
            empty_result(state.engine.accuse_as_mafia(&host, &voter, &accused).await)
        }
        Route::VoteToKill { host, voter } => {
            let Some(victim) = routes::query_param(query.as_deref(), "playerAddress") else {
                return status_response(StatusCode::BAD_REQUEST);
            };
            empty_result(state.engine.vote_to_kill(&host, &voter, &victim).await)
        }
    }
}

/// Map an engine error to its HTTP status
fn status_for(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::AlreadyExists(_)
        | EngineError::AlreadyStarted
        | EngineError::InProgress
        | EngineError::Duplicate(_)
        | EngineError::WrongPhase(_)
        | EngineError::NotMember(_)
        | EngineError::Incapacitated(_)
        | EngineError::Unauthorized(_) => StatusCode::CONFLICT,
        EngineError::Cancelled => StatusCode::REQUEST_TIMEOUT,
        EngineError::GameGone => StatusCode::GONE,
    }
}

fn empty_result(result: mafia_core::Result<()>) -> Response<Full<Bytes>> {
    match result {
        Ok(()) => status_response(StatusCode::OK),
        Err(err) => error_response(&err),
    }
}

fn error_response(err: &EngineError) -> Response<Full<Bytes>> {
    let status = status_for(err);
    debug!("request failed with {status}: {err}");
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(err.to_string())))
        .unwrap()
}

fn status_response(status: StatusCode) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn json_response<T: Serialize>(value: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .unwrap(),
        Err(err) => {
            error!("failed to encode response body: {err}");
            status_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
