use anchor_lang::prelude::*;
use anchor_lang::system_program;

use crate::error::InitError;
use crate::lifecycle::AccountState;
use crate::state::RoomAccount;

/// What the checker needs to know about the funding account.
#[derive(Clone, Copy, Debug)]
pub struct FunderView<'a> {
    pub key: &'a Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
    pub lamports: u64,
}

/// What the checker needs to know about the account being initialized.
#[derive(Clone, Copy, Debug)]
pub struct TargetView<'a> {
    pub key: &'a Pubkey,
    pub is_writable: bool,
    pub owner: &'a Pubkey,
    pub lamports: u64,
    pub data: &'a [u8],
}

/// Storage the system program has to provide before the record is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allocation {
    pub space: usize,
    /// Rent-exempt minimum for `space`
    pub rent_exempt_lamports: u64,
    /// Lamports the funder moves to the target
    pub top_up: u64,
    /// Target holds no lamports yet, so a single `create_account` suffices.
    /// Otherwise someone pre-funded the address and the transfer / allocate /
    /// assign sequence is used instead.
    pub create: bool,
}

/// Everything `authorize_initialize` validates, gathered before any write.
#[derive(Clone, Copy, Debug)]
pub struct InitializeRequest<'a> {
    pub program_id: &'a Pubkey,
    pub funder: FunderView<'a>,
    pub target: TargetView<'a>,
    pub system_allocator: &'a Pubkey,
    pub program_self: &'a Pubkey,
    /// Address derived from the room seeds
    pub expected_address: &'a Pubkey,
}

/// Validation pass for `initialize`. Pure: reads views, writes nothing.
///
/// Order:
/// 1. funder signed the transaction, funder and target are writable
/// 2. the instruction points at accounts this program controls (derived
///    target, real system program, this program)
/// 3. target ownership and state (re-initialization guard)
/// 4. rent-exempt funding when storage has to be allocated, leaving the
///    funder either empty or still rent exempt
///
/// Returns the allocation still required, or `None` when the target is
/// already allocated to this program and zeroed.
pub fn authorize_initialize(request: &InitializeRequest, rent: &Rent) -> Result<Option<Allocation>> {
    let InitializeRequest {
        program_id,
        funder,
        target,
        system_allocator,
        program_self,
        expected_address,
    } = *request;

    // SECURITY: signer check
    if !funder.is_signer {
        return Err(deny("funding_signer", "missing signature"));
    }
    if !funder.is_writable {
        return Err(deny("funding_signer", "not writable"));
    }
    if !target.is_writable {
        return Err(deny("target_account", "not writable"));
    }

    // SECURITY: no arbitrary CPI target, no foreign program identity, no
    // address the program cannot sign for
    if *system_allocator != system_program::ID {
        return Err(deny("system_allocator", "not the system program"));
    }
    if *program_self != *program_id {
        return Err(deny("program_self", "not this program"));
    }
    if *target.key != *expected_address {
        return Err(deny("target_account", "not the derived room address"));
    }

    // SECURITY: ownership + re-initialization guard
    match AccountState::classify(program_id, target.owner, target.data)? {
        AccountState::Initialized => err!(InitError::AlreadyInitialized),
        AccountState::AllocatedUninitialized => {
            require!(
                rent.is_exempt(target.lamports, target.data.len()),
                InitError::InsufficientFunds
            );
            Ok(None)
        }
        AccountState::Absent => {
            let space = RoomAccount::LEN;
            let rent_exempt_lamports = rent.minimum_balance(space);
            let top_up = rent_exempt_lamports.saturating_sub(target.lamports);
            let remaining = funder
                .lamports
                .checked_sub(top_up)
                .ok_or_else(|| error!(InitError::InsufficientFunds))?;
            // The runtime refuses to leave a system wallet below its own rent
            // minimum unless it is drained to zero.
            require!(
                top_up == 0 || remaining == 0 || remaining >= rent.minimum_balance(0),
                InitError::InsufficientFunds
            );

            Ok(Some(Allocation {
                space,
                rent_exempt_lamports,
                top_up,
                create: target.lamports == 0,
            }))
        }
    }
}

fn deny(account: &str, reason: &str) -> anchor_lang::error::Error {
    msg!("Unauthorized: {} {}", account, reason);
    error!(InitError::Unauthorized)
}
