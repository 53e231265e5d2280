//! URL routing for the match service
//!
//! The route table mirrors the engine's operation surface: every match
//! operation hangs off `/game/:hostAddress`, with voting nested under the
//! acting player.

use hyper::Method;
use percent_encoding::percent_decode_str;

/// A matched request, with its path parameters decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `POST /game/:host`
    InitializeGame { host: String },
    /// `DELETE /game/:host`
    CancelGame { host: String },
    /// `POST /game/:host/finish`
    FinishGame { host: String },
    /// `POST /game/:host/join?playerAddress=..&playerNickname=..`
    JoinGame { host: String },
    /// `POST /game/:host/start`
    StartGame { host: String },
    /// `GET /game/:host/start/wait`
    WaitForGameStart { host: String },
    /// `POST /game/:host/phase/execute`
    ExecutePhase { host: String },
    /// `GET /game/:host/phase/wait`
    WaitForPhaseExecution { host: String },
    /// `GET /game/:host/players`
    GetPlayers { host: String },
    /// `GET /game/:host/players/:player`
    GetPlayer { host: String, player: String },
    /// `POST /game/:host/players/:voter/vote/accuse?playerAddress=..`
    AccuseAsMafia { host: String, voter: String },
    /// `POST /game/:host/players/:voter/vote/kill?playerAddress=..`
    VoteToKill { host: String, voter: String },
}

/// Match a request method and path against the route table
pub fn route(method: &Method, path: &str) -> Option<Route> {
    let segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();

    match segments.as_slice() {
        ["game", host] if *method == Method::POST => Some(Route::InitializeGame {
            host: decode_segment(host)?,
        }),
        ["game", host] if *method == Method::DELETE => Some(Route::CancelGame {
            host: decode_segment(host)?,
        }),
        ["game", host, "finish"] if *method == Method::POST => Some(Route::FinishGame {
            host: decode_segment(host)?,
        }),
        ["game", host, "join"] if *method == Method::POST => Some(Route::JoinGame {
            host: decode_segment(host)?,
        }),
        ["game", host, "start"] if *method == Method::POST => Some(Route::StartGame {
            host: decode_segment(host)?,
        }),
        ["game", host, "start", "wait"] if *method == Method::GET => {
            Some(Route::WaitForGameStart {
                host: decode_segment(host)?,
            })
        }
        ["game", host, "phase", "execute"] if *method == Method::POST => {
            Some(Route::ExecutePhase {
                host: decode_segment(host)?,
            })
        }
        ["game", host, "phase", "wait"] if *method == Method::GET => {
            Some(Route::WaitForPhaseExecution {
                host: decode_segment(host)?,
            })
        }
        ["game", host, "players"] if *method == Method::GET => Some(Route::GetPlayers {
            host: decode_segment(host)?,
        }),
        ["game", host, "players", player] if *method == Method::GET => Some(Route::GetPlayer {
            host: decode_segment(host)?,
            player: decode_segment(player)?,
        }),
        ["game", host, "players", voter, "vote", "accuse"] if *method == Method::POST => {
            Some(Route::AccuseAsMafia {
                host: decode_segment(host)?,
                voter: decode_segment(voter)?,
            })
        }
        ["game", host, "players", voter, "vote", "kill"] if *method == Method::POST => {
            Some(Route::VoteToKill {
                host: decode_segment(host)?,
                voter: decode_segment(voter)?,
            })
        }
        _ => None,
    }
}

fn decode_segment(segment: &str) -> Option<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// Extract a non-empty query parameter, percent-decoded
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    for pair in query?.split('&') {
        let (key, value) = match pair.split_once('=') {
            Some((key, value)) => (key, value),
            None => (pair, ""),
        };
        if key == name && !value.is_empty() {
            return percent_decode_str(value)
                .decode_utf8()
                .ok()
                .map(|decoded| decoded.into_owned());
        }
    }
    None
}
