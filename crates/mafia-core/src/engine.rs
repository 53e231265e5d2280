//! The process-wide game registry and operation surface

use crate::error::{Error, Result};
use crate::game::GameState;
use crate::phase::PhaseExecution;
use crate::player::Player;
use crate::rng::EngineRng;
use log::info;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Hosts all concurrent matches and exposes every engine operation
///
/// The registry maps each host address to at most one live match. Lookups
/// run in parallel under a read lock; insert and delete are exclusive. The
/// registry lock is never held while a match operates - a lookup hands out
/// an `Arc` to the match, which stays alive for the duration of the
/// operation even if the match is destroyed concurrently.
pub struct GameEngine {
    games: RwLock<HashMap<String, Arc<GameState>>>,
    /// Seed stream for per-match shuffles
    rng: Mutex<EngineRng>,
}

impl GameEngine {
    /// Create an engine seeded from wall-clock entropy
    pub fn new() -> Self {
        Self::with_rng(EngineRng::from_entropy())
    }

    /// Create an engine with an explicit seed stream
    ///
    /// Each match's shuffle draws its own seed from this stream, so matches
    /// stay independent while the whole engine remains reproducible.
    pub fn with_rng(rng: EngineRng) -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
            rng: Mutex::new(rng),
        }
    }

    /// Convenience constructor for a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(EngineRng::new(seed))
    }

    /// Create an empty match owned by `host_address`
    pub async fn initialize_game(&self, host_address: &str) -> Result<()> {
        let mut games = self.games.write().await;
        if games.contains_key(host_address) {
            return Err(Error::AlreadyExists(host_address.to_string()));
        }
        games.insert(
            host_address.to_string(),
            Arc::new(GameState::new(host_address)),
        );
        info!("initialized game for host '{host_address}'");
        Ok(())
    }

    /// Destroy the match for `host_address`, releasing any waiters
    ///
    /// A no-op when no such match exists.
    pub async fn cancel_game(&self, host_address: &str) -> Result<()> {
        self.remove_game(host_address).await
    }

    /// Destroy the match for `host_address`, releasing any waiters
    ///
    /// Identical in effect to [`cancel_game`](Self::cancel_game); both
    /// names exist so callers can state their intent.
    pub async fn finish_game(&self, host_address: &str) -> Result<()> {
        self.remove_game(host_address).await
    }

    async fn remove_game(&self, host_address: &str) -> Result<()> {
        let removed = self.games.write().await.remove(host_address);
        if let Some(game) = removed {
            // Outstanding waiters observe the abandonment as GameGone.
            game.abandon().await;
            info!("removed game for host '{host_address}'");
        }
        Ok(())
    }

    async fn game(&self, host_address: &str) -> Result<Arc<GameState>> {
        self.games
            .read()
            .await
            .get(host_address)
            .cloned()
            .ok_or_else(|| Error::NotFound(host_address.to_string()))
    }

    /// Add a player to a not-yet-started match
    pub async fn join_game(
        &self,
        host_address: &str,
        player_address: &str,
        player_nickname: &str,
    ) -> Result<()> {
        self.game(host_address)
            .await?
            .join(player_address, player_nickname)
            .await
    }

    /// Assign roles and broadcast the start signal
    pub async fn start_game(&self, host_address: &str) -> Result<()> {
        let game = self.game(host_address).await?;
        let shuffle_seed = self.rng.lock().await.next_u64();
        game.start(shuffle_seed).await
    }

    /// Record a day-phase accusation
    pub async fn accuse_as_mafia(
        &self,
        host_address: &str,
        accuser_address: &str,
        accused_address: &str,
    ) -> Result<()> {
        self.game(host_address)
            .await?
            .accuse(accuser_address, accused_address)
            .await
    }

    /// Record a night-phase kill vote
    pub async fn vote_to_kill(
        &self,
        host_address: &str,
        killer_address: &str,
        victim_address: &str,
    ) -> Result<()> {
        self.game(host_address)
            .await?
            .vote_to_kill(killer_address, victim_address)
            .await
    }

    /// Drive the current phase to completion
    pub async fn execute_phase(&self, host_address: &str) -> Result<PhaseExecution> {
        self.game(host_address).await?.execute_phase().await
    }

    /// Suspend until the match starts, the caller cancels, or the match is
    /// destroyed
    ///
    /// `cancel` is a caller-supplied signal (typically a deadline sleep);
    /// when it completes first the wait returns [`Error::Cancelled`]. No
    /// match lock is held while suspended - only the brief registration
    /// takes one.
    pub async fn wait_for_game_start(
        &self,
        host_address: &str,
        cancel: impl Future<Output = ()>,
    ) -> Result<()> {
        let game = self.game(host_address).await?;
        let receiver = game.subscribe_to_start().await?;
        tokio::select! {
            delivery = receiver => match delivery {
                Ok(()) => Ok(()),
                Err(_) => Err(Error::GameGone),
            },
            () = cancel => Err(Error::Cancelled),
        }
    }

    /// Suspend until the next phase completes, the caller cancels, or the
    /// match is destroyed
    pub async fn wait_for_phase_execution(
        &self,
        host_address: &str,
        cancel: impl Future<Output = ()>,
    ) -> Result<PhaseExecution> {
        let game = self.game(host_address).await?;
        let receiver = game.subscribe_to_phase_execution().await?;
        tokio::select! {
            delivery = receiver => match delivery {
                Ok(execution) => Ok(execution),
                Err(_) => Err(Error::GameGone),
            },
            () = cancel => Err(Error::Cancelled),
        }
    }

    /// Look up one player record; `None` when the player never joined
    pub async fn get_player(
        &self,
        host_address: &str,
        player_address: &str,
    ) -> Result<Option<Player>> {
        Ok(self.game(host_address).await?.player(player_address).await)
    }

    /// Snapshot a match's roster in join order
    pub async fn get_players(&self, host_address: &str) -> Result<Vec<Player>> {
        Ok(self.game(host_address).await?.players().await)
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::{PhaseOutcome, TimeOfDay};
    use crate::player::PlayerRole;
    use std::time::Duration;

    /// A cancellation signal that never fires
    fn never() -> impl Future<Output = ()> {
        std::future::pending()
    }

    async fn short_sleep() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_initialize_twice_fails() {
        let engine = GameEngine::with_seed(1);
        engine.initialize_game("host").await.unwrap();
        let err = engine.initialize_game("host").await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(host) if host == "host"));
    }

    #[tokio::test]
    async fn test_cancel_then_initialize_succeeds() {
        let engine = GameEngine::with_seed(1);
        engine.initialize_game("host").await.unwrap();
        engine.cancel_game("host").await.unwrap();
        engine.initialize_game("host").await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let engine = GameEngine::with_seed(1);
        engine.cancel_game("nobody").await.unwrap();
        engine.cancel_game("nobody").await.unwrap();
    }

    #[tokio::test]
    async fn test_operations_on_unknown_hosts_fail() {
        let engine = GameEngine::with_seed(1);
        assert!(matches!(
            engine.join_game("missing", "p", "P").await.unwrap_err(),
            Error::NotFound(_)
        ));
        assert!(matches!(
            engine.start_game("missing").await.unwrap_err(),
            Error::NotFound(_)
        ));
        assert!(matches!(
            engine.execute_phase("missing").await.unwrap_err(),
            Error::NotFound(_)
        ));
        assert!(matches!(
            engine.get_players("missing").await.unwrap_err(),
            Error::NotFound(_)
        ));
        assert!(matches!(
            engine
                .wait_for_game_start("missing", never())
                .await
                .unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_matches_are_isolated_from_each_other() {
        let engine = GameEngine::with_seed(1);
        engine.initialize_game("first").await.unwrap();
        engine.initialize_game("second").await.unwrap();

        engine.join_game("first", "player0", "Zero").await.unwrap();
        assert_eq!(engine.get_players("first").await.unwrap().len(), 1);
        assert!(engine.get_players("second").await.unwrap().is_empty());

        // Destroying one match leaves the other untouched.
        engine.cancel_game("first").await.unwrap();
        assert!(engine.get_players("second").await.unwrap().is_empty());
        assert!(matches!(
            engine.get_players("first").await.unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_start_waiters_are_all_notified() {
        let engine = Arc::new(GameEngine::with_seed(7));
        engine.initialize_game("host").await.unwrap();
        for index in 0..4 {
            engine
                .join_game("host", &format!("player{index}"), "nick")
                .await
                .unwrap();
        }

        let mut waiters = Vec::new();
        for _ in 0..8 {
            let engine = engine.clone();
            waiters.push(tokio::spawn(async move {
                engine.wait_for_game_start("host", never()).await
            }));
        }

        // Give every waiter a chance to register before the broadcast.
        short_sleep().await;
        engine.start_game("host").await.unwrap();

        for waiter in waiters {
            waiter.await.unwrap().unwrap();
        }

        // A subscription arriving after the start is refused outright.
        let err = engine
            .wait_for_game_start("host", never())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyStarted));
    }

    #[tokio::test]
    async fn test_wait_for_phase_execution_observes_the_deadline() {
        let engine = GameEngine::with_seed(7);
        engine.initialize_game("host").await.unwrap();

        let started = std::time::Instant::now();
        let err = engine
            .wait_for_phase_execution("host", tokio::time::sleep(Duration::from_millis(100)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert!(started.elapsed() >= Duration::from_millis(100));
        assert!(started.elapsed() < Duration::from_secs(2));

        // No side effects: the next phase execution still finds day one.
        let execution = engine.execute_phase("host").await.unwrap();
        assert_eq!(execution.phase, TimeOfDay::Day);
    }

    #[tokio::test]
    async fn test_destruction_releases_phase_waiters_with_game_gone() {
        let engine = Arc::new(GameEngine::with_seed(7));
        engine.initialize_game("host").await.unwrap();

        let waiting_engine = engine.clone();
        let waiter = tokio::spawn(async move {
            waiting_engine
                .wait_for_phase_execution("host", never())
                .await
        });

        short_sleep().await;
        engine.cancel_game("host").await.unwrap();

        let err = waiter.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::GameGone));
    }

    #[tokio::test]
    async fn test_destruction_releases_start_waiters_with_game_gone() {
        let engine = Arc::new(GameEngine::with_seed(7));
        engine.initialize_game("host").await.unwrap();

        let waiting_engine = engine.clone();
        let waiter = tokio::spawn(async move {
            waiting_engine.wait_for_game_start("host", never()).await
        });

        short_sleep().await;
        engine.finish_game("host").await.unwrap();

        let err = waiter.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::GameGone));
    }

    #[tokio::test]
    async fn test_phase_waiters_receive_the_execution_payload() {
        let engine = Arc::new(GameEngine::with_seed(7));
        engine.initialize_game("host").await.unwrap();
        engine.join_game("host", "player0", "Zero").await.unwrap();
        engine.join_game("host", "player1", "One").await.unwrap();
        engine
            .accuse_as_mafia("host", "player0", "player1")
            .await
            .unwrap();

        let mut waiters = Vec::new();
        for _ in 0..3 {
            let engine = engine.clone();
            waiters.push(tokio::spawn(async move {
                engine.wait_for_phase_execution("host", never()).await
            }));
        }

        short_sleep().await;
        let execution = engine.execute_phase("host").await.unwrap();
        assert_eq!(execution.convicted_players, vec!["player1".to_string()]);

        for waiter in waiters {
            let delivered = waiter.await.unwrap().unwrap();
            assert_eq!(delivered, execution);
        }
    }

    /// Full eight-player game driven to a civilian victory
    ///
    /// Round for round: a civilian is convicted, a civilian is killed, one
    /// Mafia member is convicted, another civilian is killed, and the final
    /// Mafia member is convicted on a 2-to-1 vote.
    #[tokio::test]
    async fn test_eight_player_game_reaches_civilian_victory() {
        let engine = GameEngine::with_seed(1234);
        let host = "gamehost";
        engine.initialize_game(host).await.unwrap();

        let mut addresses = vec![host.to_string()];
        for index in 1..8 {
            addresses.push(format!("player000{index}"));
        }
        for address in &addresses {
            engine
                .join_game(host, address, &format!("{address}Nick"))
                .await
                .unwrap();
        }

        engine.start_game(host).await.unwrap();

        let players = engine.get_players(host).await.unwrap();
        let mafia: Vec<String> = players
            .iter()
            .filter(|player| player.role == Some(PlayerRole::Mafia))
            .map(|player| player.address.clone())
            .collect();
        let civilians: Vec<String> = players
            .iter()
            .filter(|player| player.role == Some(PlayerRole::Civilian))
            .map(|player| player.address.clone())
            .collect();
        assert_eq!(mafia.len(), 2);
        assert_eq!(civilians.len(), 6);

        // Day 1: five civilians and both Mafia accuse civilians[5]; the
        // accused fights back against mafia[0]. 7 votes to 1.
        for accuser in civilians[0..5].iter().chain(mafia.iter()) {
            engine
                .accuse_as_mafia(host, accuser, &civilians[5])
                .await
                .unwrap();
        }
        engine
            .accuse_as_mafia(host, &civilians[5], &mafia[0])
            .await
            .unwrap();
        let execution = engine.execute_phase(host).await.unwrap();
        assert_eq!(execution.phase, TimeOfDay::Day);
        assert_eq!(execution.convicted_players, vec![civilians[5].clone()]);
        assert_eq!(execution.outcome, PhaseOutcome::Continuation);

        // Night 1: both Mafia gang up on civilians[4].
        for killer in &mafia {
            engine
                .vote_to_kill(host, killer, &civilians[4])
                .await
                .unwrap();
        }
        let execution = engine.execute_phase(host).await.unwrap();
        assert_eq!(execution.phase, TimeOfDay::Night);
        assert_eq!(execution.killed_players, vec![civilians[4].clone()]);
        assert_eq!(execution.outcome, PhaseOutcome::Continuation);

        // Day 2: the four remaining civilians turn on mafia[1]; the Mafia
        // try to pin civilians[3]. 4 votes to 2.
        for accuser in &civilians[0..4] {
            engine
                .accuse_as_mafia(host, accuser, &mafia[1])
                .await
                .unwrap();
        }
        for accuser in &mafia {
            engine
                .accuse_as_mafia(host, accuser, &civilians[3])
                .await
                .unwrap();
        }
        let execution = engine.execute_phase(host).await.unwrap();
        assert_eq!(execution.convicted_players, vec![mafia[1].clone()]);
        assert_eq!(execution.outcome, PhaseOutcome::Continuation);

        // Night 2: the surviving Mafia member takes out civilians[3].
        engine
            .vote_to_kill(host, &mafia[0], &civilians[3])
            .await
            .unwrap();
        let execution = engine.execute_phase(host).await.unwrap();
        assert_eq!(execution.killed_players, vec![civilians[3].clone()]);
        assert_eq!(execution.outcome, PhaseOutcome::Continuation);

        // Day 3: two civilians accuse mafia[0]; mafia[0] deflects onto a
        // civilian. 2 votes to 1 ends the game.
        for accuser in &civilians[0..2] {
            engine
                .accuse_as_mafia(host, accuser, &mafia[0])
                .await
                .unwrap();
        }
        engine
            .accuse_as_mafia(host, &mafia[0], &civilians[0])
            .await
            .unwrap();
        let execution = engine.execute_phase(host).await.unwrap();
        assert_eq!(execution.convicted_players, vec![mafia[0].clone()]);
        assert_eq!(execution.outcome, PhaseOutcome::CivilianVictory);
    }
}
