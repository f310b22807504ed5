use anchor_lang::prelude::*;
use anchor_lang::system_program;

use crate::error::InitError;
use crate::state::{RoomAccount, DISCRIMINATOR_LEN};

/// Where an address sits in the room lifecycle.
///
/// Transitions only move forward:
/// `Absent -> AllocatedUninitialized -> Initialized`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountState {
    /// No storage: the address belongs to the system program and holds no
    /// data (it may hold lamports someone sent it)
    Absent,
    /// Owned by this program, sized for a room, every byte still zero
    AllocatedUninitialized,
    /// Owned by this program and carrying the room discriminator
    Initialized,
}

impl AccountState {
    /// Classifies raw account storage, failing closed on anything that is
    /// not one of the three states.
    pub fn classify(program_id: &Pubkey, owner: &Pubkey, data: &[u8]) -> Result<Self> {
        if *owner == system_program::ID {
            // System-owned storage with data (e.g. a nonce account) is not ours
            // to take over.
            require!(data.is_empty(), InitError::LayoutMismatch);
            return Ok(Self::Absent);
        }

        require_keys_eq!(*owner, *program_id, InitError::OwnerMismatch);
        require!(data.len() >= RoomAccount::LEN, InitError::LayoutMismatch);

        if RoomAccount::is_tagged(data) {
            return Ok(Self::Initialized);
        }

        // Any other record type of ours, or garbage
        require!(data.iter().all(|byte| *byte == 0), InitError::LayoutMismatch);
        Ok(Self::AllocatedUninitialized)
    }
}

/// The single transition `AllocatedUninitialized -> Initialized`.
///
/// Writes the discriminator, then the body (owner program first, payload
/// last). The caller must already have run the checker; this re-checks the
/// buffer itself so a stale or foreign buffer is never overwritten.
pub fn commit_initialized(data: &mut [u8], record: &RoomAccount) -> Result<()> {
    require!(data.len() >= RoomAccount::LEN, InitError::LayoutMismatch);
    require!(!RoomAccount::is_tagged(data), InitError::AlreadyInitialized);
    require!(data.iter().all(|byte| *byte == 0), InitError::LayoutMismatch);

    let (tag, body) = data.split_at_mut(DISCRIMINATOR_LEN);
    tag.copy_from_slice(&RoomAccount::DISCRIMINATOR[..]);

    let mut cursor = &mut body[..RoomAccount::LEN - DISCRIMINATOR_LEN];
    record
        .serialize(&mut cursor)
        .map_err(|_| error!(InitError::LayoutMismatch))?;
    require!(cursor.is_empty(), InitError::LayoutMismatch);
    Ok(())
}
