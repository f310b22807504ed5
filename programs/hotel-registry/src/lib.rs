use anchor_lang::prelude::*;

declare_id!("E26SowuKYen9ePnVirUyxq73hKaomHhwdPiRdVCKcu6d");

pub mod checks;
pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod lifecycle;
pub mod pda;
pub mod state;

pub use error::*;
pub use events::*;
pub use instructions::*;
pub use state::*;

#[program]
pub mod hotel_registry {
    use super::*;

    /// Creates the room account at `["hotel", room_id]` exactly once.
    ///
    /// `payload` is the versioned room layout produced by
    /// [`RoomPayload::encode`]. A second call for the same room, from anyone,
    /// fails with `AlreadyInitialized` and leaves the first room untouched.
    pub fn initialize(ctx: Context<Initialize>, room_id: u64, payload: Vec<u8>) -> Result<()> {
        instructions::initialize(ctx, room_id, payload)
    }
}
