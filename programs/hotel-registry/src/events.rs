use anchor_lang::prelude::*;

/// Emitted once per room, when `initialize` commits.
#[event]
pub struct RoomInitialized {
    pub room: Pubkey,
    pub room_id: u64,
    pub authority: Pubkey,
    pub capacity: u16,
    pub nightly_rate: u64,
}
