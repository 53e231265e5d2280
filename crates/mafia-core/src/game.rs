//! A single match: roster, phases, voting, and event fan-out

use crate::broadcast::{Broadcast, Closed};
use crate::error::{Error, Result};
use crate::phase::{PhaseExecution, PhaseOutcome, TimeOfDay};
use crate::player::{Player, PlayerRole};
use crate::rng::EngineRng;
use indexmap::IndexMap;
use log::{debug, info};
use std::collections::HashMap;
use tokio::sync::{oneshot, RwLock};

/// Mutable state shared by all operations on one match
///
/// Kept behind a single reader-writer lock so that phase execution is
/// atomic with respect to vote recording: a vote observes either the
/// completing phase or the toggled one, never a half-finished transition.
#[derive(Default)]
struct World {
    started: bool,
    phase: TimeOfDay,
    /// Roster in join order; append-only for the match's life
    players: IndexMap<String, Player>,
    /// Day-phase votes: accuser address -> accused address
    accusations: HashMap<String, String>,
    /// Night-phase votes: killer address -> victim address
    kill_votes: HashMap<String, String>,
}

impl World {
    fn member(&self, address: &str) -> Result<&Player> {
        self.players
            .get(address)
            .ok_or_else(|| Error::NotMember(address.to_string()))
    }

    fn acting_member(&self, address: &str) -> Result<&Player> {
        let player = self.member(address)?;
        if !player.can_act() {
            return Err(Error::Incapacitated(address.to_string()));
        }
        Ok(player)
    }

    /// Victory state over the players still able to act
    fn outcome(&self) -> PhaseOutcome {
        let mut mafia = 0usize;
        let mut civilians = 0usize;
        for player in self.players.values().filter(|player| player.can_act()) {
            match player.role {
                Some(PlayerRole::Mafia) => mafia += 1,
                Some(PlayerRole::Civilian) => civilians += 1,
                None => {}
            }
        }

        if civilians <= mafia {
            PhaseOutcome::MafiaVictory
        } else if mafia == 0 {
            PhaseOutcome::CivilianVictory
        } else {
            PhaseOutcome::Continuation
        }
    }
}

/// Count the votes against each target and return the unique leader
///
/// A tie for the highest count, or an empty vote map, yields no leader and
/// therefore no conviction or kill.
fn find_highest_vote(votes: &HashMap<String, String>) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut highest = 0usize;
    for target in votes.values() {
        let count = counts.entry(target.as_str()).or_insert(0);
        *count += 1;
        if *count > highest {
            highest = *count;
        }
    }

    let mut leaders = counts.iter().filter(|(_, count)| **count == highest);
    match (leaders.next(), leaders.next()) {
        (Some((address, _)), None) => Some((*address).to_string()),
        _ => None,
    }
}

/// One live match
///
/// Created by [`GameEngine::initialize_game`](crate::GameEngine) and
/// destroyed by cancel or finish. All operations are short critical
/// sections; the two wait operations in the engine register a subscriber
/// here and await it without holding any match lock.
pub struct GameState {
    host_address: String,
    world: RwLock<World>,
    start_signal: Broadcast<()>,
    phase_signal: Broadcast<PhaseExecution>,
}

impl GameState {
    pub(crate) fn new(host_address: &str) -> Self {
        Self {
            host_address: host_address.to_string(),
            world: RwLock::new(World::default()),
            start_signal: Broadcast::new(),
            phase_signal: Broadcast::new(),
        }
    }

    /// Host address this match is registered under
    pub fn host_address(&self) -> &str {
        &self.host_address
    }

    /// Add a player to the roster
    pub async fn join(&self, address: &str, nickname: &str) -> Result<()> {
        let mut world = self.world.write().await;
        if world.started {
            return Err(Error::InProgress);
        }
        if world.players.contains_key(address) {
            return Err(Error::Duplicate(address.to_string()));
        }
        world
            .players
            .insert(address.to_string(), Player::new(address, nickname));
        Ok(())
    }

    /// Assign roles, mark the game started, and wake the start waiters
    ///
    /// One Mafia for every five players, rounded up; assignment follows a
    /// fair shuffle of the roster seeded by `shuffle_seed`.
    pub async fn start(&self, shuffle_seed: u64) -> Result<()> {
        let mut world = self.world.write().await;
        if world.started {
            return Err(Error::AlreadyStarted);
        }

        let mafia_count = (world.players.len() + 4) / 5;
        let mut addresses: Vec<String> = world.players.keys().cloned().collect();
        let mut rng = EngineRng::new(shuffle_seed);
        rng.shuffle(&mut addresses);
        for (index, address) in addresses.iter().enumerate() {
            let role = if index < mafia_count {
                PlayerRole::Mafia
            } else {
                PlayerRole::Civilian
            };
            if let Some(player) = world.players.get_mut(address) {
                player.role = Some(role);
            }
        }
        world.started = true;

        let notified = self.start_signal.broadcast((), true).await;
        info!(
            "game '{}' started with {} player(s) ({} mafia); notified {} start subscriber(s)",
            self.host_address,
            world.players.len(),
            mafia_count,
            notified
        );
        Ok(())
    }

    /// Record a day-phase accusation
    pub async fn accuse(&self, accuser: &str, accused: &str) -> Result<()> {
        let mut world = self.world.write().await;
        if world.phase != TimeOfDay::Day {
            return Err(Error::WrongPhase(world.phase));
        }
        world.acting_member(accuser)?;
        world.acting_member(accused)?;
        if world.accusations.contains_key(accuser) {
            return Err(Error::Duplicate(accuser.to_string()));
        }
        world
            .accusations
            .insert(accuser.to_string(), accused.to_string());
        Ok(())
    }

    /// Record a night-phase kill vote
    pub async fn vote_to_kill(&self, killer: &str, victim: &str) -> Result<()> {
        let mut world = self.world.write().await;
        if world.phase != TimeOfDay::Night {
            return Err(Error::WrongPhase(world.phase));
        }
        let killer_player = world.acting_member(killer)?;
        if killer_player.role != Some(PlayerRole::Mafia) {
            return Err(Error::Unauthorized(killer.to_string()));
        }
        world.acting_member(victim)?;
        if world.kill_votes.contains_key(killer) {
            return Err(Error::Duplicate(killer.to_string()));
        }
        world
            .kill_votes
            .insert(killer.to_string(), victim.to_string());
        Ok(())
    }

    /// Drive the current phase to completion and advance the state machine
    ///
    /// Tallies the phase's votes, applies the unique leader (conviction by
    /// day, death by night), computes the victory state, broadcasts the
    /// payload to every phase subscriber, then clears the vote map and
    /// toggles the phase. The whole sequence runs under the world write
    /// lock, so votes land wholly before or wholly after it.
    pub async fn execute_phase(&self) -> Result<PhaseExecution> {
        let mut world = self.world.write().await;
        let phase = world.phase;

        let mut killed_players = Vec::new();
        let mut convicted_players = Vec::new();
        match phase {
            TimeOfDay::Day => {
                if let Some(address) = find_highest_vote(&world.accusations) {
                    if let Some(player) = world.players.get_mut(&address) {
                        player.convicted = true;
                    }
                    convicted_players.push(address);
                }
            }
            TimeOfDay::Night => {
                if let Some(address) = find_highest_vote(&world.kill_votes) {
                    if let Some(player) = world.players.get_mut(&address) {
                        player.dead = true;
                    }
                    killed_players.push(address);
                }
            }
        }

        let execution = PhaseExecution {
            host_address: self.host_address.clone(),
            phase,
            outcome: world.outcome(),
            killed_players,
            convicted_players,
        };

        let notified = self.phase_signal.broadcast(execution.clone(), false).await;
        debug!(
            "game '{}' executed {} phase (outcome {:?}); notified {} phase subscriber(s)",
            self.host_address, phase, execution.outcome, notified
        );

        // Subscribers registering from here on are waiting on the next phase.
        match phase {
            TimeOfDay::Day => world.accusations.clear(),
            TimeOfDay::Night => world.kill_votes.clear(),
        }
        world.phase = phase.toggled();

        Ok(execution)
    }

    /// Register a waiter for the game-start signal
    pub async fn subscribe_to_start(&self) -> Result<oneshot::Receiver<()>> {
        self.start_signal.subscribe().await.map_err(|closed| match closed {
            Closed::Delivered => Error::AlreadyStarted,
            Closed::Abandoned => Error::GameGone,
        })
    }

    /// Register a waiter for the next phase-execution event
    pub async fn subscribe_to_phase_execution(&self) -> Result<oneshot::Receiver<PhaseExecution>> {
        self.phase_signal
            .subscribe()
            .await
            .map_err(|_| Error::GameGone)
    }

    /// Release every outstanding waiter; called when the match is destroyed
    pub(crate) async fn abandon(&self) {
        let outstanding = self.start_signal.abandon().await + self.phase_signal.abandon().await;
        if outstanding > 0 {
            debug!(
                "game '{}' destroyed with {} waiter(s) outstanding",
                self.host_address, outstanding
            );
        }
    }

    /// Look up one player by address
    pub async fn player(&self, address: &str) -> Option<Player> {
        self.world.read().await.players.get(address).cloned()
    }

    /// Snapshot the roster in join order
    pub async fn players(&self) -> Vec<Player> {
        self.world.read().await.players.values().cloned().collect()
    }

    /// The phase votes are currently validated against
    pub async fn current_phase(&self) -> TimeOfDay {
        self.world.read().await.phase
    }

    /// Whether roles have been assigned and the start signal fired
    pub async fn has_started(&self) -> bool {
        self.world.read().await.started
    }
}
