use anchor_lang::prelude::*;

use crate::constants::{LAYOUT_VERSION, MAX_FEE_BASIS_POINTS, PAYLOAD_VERSION};
use crate::error::InitError;
use crate::pda::verify_room_address;

/// Width of the type tag Anchor places in front of every `#[account]` body.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Persistent record for one hotel room, stored at `["hotel", room_id]`.
///
/// Layout (fixed offsets, little endian):
/// - 0..8:   discriminator (hash of "account:RoomAccount")
/// - 8..40:  owner_program
/// - 40..72: authority
/// - 72..80: room_id
/// - 80:     bump
/// - 81:     layout_version
/// - 82..94: payload
///
/// SECURITY: the discriminator is the only marker of initialization. Any read
/// path must go through [`RoomAccount::load`], which refuses the buffer unless
/// owner, size and tag all match.
#[account]
#[derive(Debug, PartialEq, Eq)]
pub struct RoomAccount {
    /// Program allowed to mutate this account, written once
    pub owner_program: Pubkey,
    /// Signer that funded the creation
    pub authority: Pubkey,
    pub room_id: u64,
    /// Canonical bump found at derivation time
    pub bump: u8,
    pub layout_version: u8,
    pub payload: RoomPayload,
}

impl RoomAccount {
    /// 8 discriminator + 32 + 32 + 8 + 1 + 1 + payload
    pub const LEN: usize = DISCRIMINATOR_LEN + 32 + 32 + 8 + 1 + 1 + RoomPayload::LEN;

    /// True when the buffer starts with this record's discriminator.
    pub fn is_tagged(data: &[u8]) -> bool {
        data.get(..DISCRIMINATOR_LEN)
            .is_some_and(|tag| tag == &Self::DISCRIMINATOR[..])
    }

    /// Fail-closed read of a room account.
    pub fn load(program_id: &Pubkey, owner: &Pubkey, data: &[u8]) -> Result<Self> {
        require_keys_eq!(*owner, *program_id, InitError::OwnerMismatch);
        require!(data.len() >= Self::LEN, InitError::LayoutMismatch);
        require!(Self::is_tagged(data), InitError::LayoutMismatch);

        let mut body = &data[DISCRIMINATOR_LEN..Self::LEN];
        let record = <Self as AnchorDeserialize>::deserialize(&mut body)
            .map_err(|_| error!(InitError::LayoutMismatch))?;

        require_keys_eq!(record.owner_program, *program_id, InitError::OwnerMismatch);
        require!(record.layout_version == LAYOUT_VERSION, InitError::LayoutMismatch);
        Ok(record)
    }

    /// [`RoomAccount::load`] for the account stored at `address`. The record's
    /// own `room_id` and `bump` must re-derive that address, so a room copied
    /// to some other account is refused.
    pub fn load_at(program_id: &Pubkey, address: &Pubkey, owner: &Pubkey, data: &[u8]) -> Result<Self> {
        let record = Self::load(program_id, owner, data)?;
        verify_room_address(program_id, record.room_id, record.bump, address)?;
        Ok(record)
    }
}

/// Application fields of a room. This is the extension point: the layout is
/// versioned by `PAYLOAD_VERSION` on the way in and `LAYOUT_VERSION` at rest.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomPayload {
    /// Guests the room holds
    pub capacity: u16,
    pub nightly_rate: u64,
    pub transfer_fee_basis_points: u16,
}

impl RoomPayload {
    pub const LEN: usize = 2 + 8 + 2;

    /// Version byte + body
    pub const ENCODED_LEN: usize = 1 + Self::LEN;

    /// Decodes the `initialize` payload argument.
    ///
    /// The argument must be exactly `ENCODED_LEN` bytes, start with
    /// `PAYLOAD_VERSION`, and describe a room that can hold at least one guest
    /// with a fee no larger than 100%.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (version, body) = bytes
            .split_first()
            .ok_or_else(|| error!(InitError::LayoutMismatch))?;
        require!(*version == PAYLOAD_VERSION, InitError::LayoutMismatch);
        require!(body.len() == Self::LEN, InitError::LayoutMismatch);

        let payload =
            Self::try_from_slice(body).map_err(|_| error!(InitError::LayoutMismatch))?;
        require!(payload.capacity > 0, InitError::LayoutMismatch);
        require!(
            payload.transfer_fee_basis_points <= MAX_FEE_BASIS_POINTS,
            InitError::LayoutMismatch
        );
        Ok(payload)
    }

    /// Client-side encoding of the payload argument.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::ENCODED_LEN);
        out.push(PAYLOAD_VERSION);
        out.extend_from_slice(&self.capacity.to_le_bytes());
        out.extend_from_slice(&self.nightly_rate.to_le_bytes());
        out.extend_from_slice(&self.transfer_fee_basis_points.to_le_bytes());
        out
    }
}
