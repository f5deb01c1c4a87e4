//! The waiting pool: players who asked for a game and have no opponent yet.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use pairplay_protocol::{ConnectionId, Variant};

use crate::MatchError;

/// A queued player.
#[derive(Debug, Clone)]
pub struct Player {
    pub connection_id: ConnectionId,
    pub display_name: String,
    /// The game this player asked for.
    pub variant: Variant,
    /// When the player joined the queue.
    pub queued_at: Instant,
    /// Arrival order assigned by the pool; breaks `queued_at` ties.
    arrival: u64,
}

impl Player {
    /// Creates a player queued now.
    pub fn new(
        connection_id: ConnectionId,
        display_name: impl Into<String>,
        variant: Variant,
    ) -> Self {
        Self {
            connection_id,
            display_name: display_name.into(),
            variant,
            queued_at: Instant::now(),
            arrival: 0,
        }
    }

    /// Overrides the queue timestamp.
    pub fn with_queued_at(mut self, queued_at: Instant) -> Self {
        self.queued_at = queued_at;
        self
    }

    fn order_key(&self) -> (Instant, u64) {
        (self.queued_at, self.arrival)
    }
}

/// Players waiting for an opponent, one FIFO queue per variant.
///
/// Each queue is kept sorted by `(queued_at, arrival)`, so the front two
/// entries are always the pair to match next.
#[derive(Debug, Default)]
pub struct WaitingPool {
    queues: HashMap<Variant, VecDeque<Player>>,
    /// Which queue each connection sits in.
    index: HashMap<ConnectionId, Variant>,
    next_arrival: u64,
}

impl WaitingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a player to the queue for their variant.
    ///
    /// # Errors
    /// `AlreadyQueued` if the connection is already waiting.
    pub fn enqueue(&mut self, mut player: Player) -> Result<(), MatchError> {
        if self.index.contains_key(&player.connection_id) {
            return Err(MatchError::AlreadyQueued(player.connection_id));
        }

        player.arrival = self.next_arrival;
        self.next_arrival += 1;

        let queue = self.queues.entry(player.variant).or_default();
        let key = player.order_key();
        let at = queue.partition_point(|p| p.order_key() <= key);
        self.index.insert(player.connection_id, player.variant);
        tracing::debug!(
            connection_id = %player.connection_id,
            variant = %player.variant,
            position = at,
            "player queued"
        );
        queue.insert(at, player);
        Ok(())
    }

    /// Takes the two longest-waiting players of `variant`, earliest first.
    ///
    /// Returns `None` while fewer than two are waiting. That is a normal
    /// outcome, not an error.
    pub fn try_pair(&mut self, variant: Variant) -> Option<(Player, Player)> {
        let queue = self.queues.get_mut(&variant)?;
        if queue.len() < 2 {
            return None;
        }
        let first = queue.pop_front()?;
        let second = queue.pop_front()?;
        self.index.remove(&first.connection_id);
        self.index.remove(&second.connection_id);
        Some((first, second))
    }

    /// Removes a waiting player. Removing an absent connection is a no-op.
    pub fn remove(&mut self, connection_id: ConnectionId) -> Option<Player> {
        let variant = self.index.remove(&connection_id)?;
        let queue = self.queues.get_mut(&variant)?;
        let at = queue.iter().position(|p| p.connection_id == connection_id)?;
        queue.remove(at)
    }

    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.index.contains_key(&connection_id)
    }

    /// The variant a waiting connection asked for.
    pub fn variant_of(&self, connection_id: ConnectionId) -> Option<Variant> {
        self.index.get(&connection_id).copied()
    }

    /// Total waiting players across all variants.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn len_for(&self, variant: Variant) -> usize {
        self.queues.get(&variant).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
