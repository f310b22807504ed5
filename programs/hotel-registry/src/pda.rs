use anchor_lang::prelude::*;

use crate::constants::{MAX_SEEDS, MAX_SEED_LEN, ROOM_SEED};
use crate::error::InitError;

/// Finds the canonical program-derived address for `seeds`.
///
/// The bump search starts at 255 and walks down; the first bump whose hash
/// lands off the ed25519 curve wins, so no private key exists for the result.
/// Seeds the ledger can never accept are reported the same way as an
/// exhausted search: the caller has to pick different seeds.
///
/// The ledger hashes the seeds back to back, so `["ab", "c"]` and
/// `["a", "bc"]` land on the same address. Only typed derivations with a
/// fixed-width encoding, like [`derive_room_address`], are exported.
fn derive_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    require!(seeds.len() < MAX_SEEDS, InitError::DerivationExhausted);
    require!(
        seeds.iter().all(|seed| seed.len() <= MAX_SEED_LEN),
        InitError::DerivationExhausted
    );

    Pubkey::try_find_program_address(seeds, program_id)
        .ok_or_else(|| error!(InitError::DerivationExhausted))
}

/// Address of the room with the given id. The id is always eight bytes, so
/// distinct ids never share a seed stream.
pub fn derive_room_address(program_id: &Pubkey, room_id: u64) -> Result<(Pubkey, u8)> {
    derive_address(&[ROOM_SEED, &room_id.to_le_bytes()], program_id)
}

/// Re-derives a room address from a stored bump. Used by
/// [`RoomAccount::load_at`](crate::state::RoomAccount::load_at).
///
/// SECURITY: only the canonical bump recorded at initialization is accepted;
/// any other bump that happens to produce a valid address is rejected.
pub fn verify_room_address(
    program_id: &Pubkey,
    room_id: u64,
    bump: u8,
    address: &Pubkey,
) -> Result<()> {
    let (canonical, canonical_bump) = derive_room_address(program_id, room_id)?;
    require_eq!(bump, canonical_bump, InitError::Unauthorized);

    let derived =
        Pubkey::create_program_address(&[ROOM_SEED, &room_id.to_le_bytes(), &[bump]], program_id)
            .map_err(|_| error!(InitError::DerivationExhausted))?;
    require_keys_eq!(derived, canonical, InitError::Unauthorized);
    require_keys_eq!(*address, derived, InitError::Unauthorized);
    Ok(())
}
