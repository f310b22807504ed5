/// Seed prefix for every room account address: `["hotel", room_id.to_le_bytes()]`
pub const ROOM_SEED: &[u8] = b"hotel";

/// Version of the `RoomAccount` body written after the discriminator
pub const LAYOUT_VERSION: u8 = 1;

/// Version byte expected at the head of the `initialize` payload argument
pub const PAYLOAD_VERSION: u8 = 1;

/// Upper bound for `transfer_fee_basis_points` (100%)
pub const MAX_FEE_BASIS_POINTS: u16 = 10_000;

/// Ledger limits for program-derived addresses. The bump occupies one of the
/// `MAX_SEEDS` slots, so callers get `MAX_SEEDS - 1`.
pub const MAX_SEEDS: usize = 16;
pub const MAX_SEED_LEN: usize = 32;
