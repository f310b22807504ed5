use anchor_lang::prelude::*;
use anchor_lang::system_program;

use crate::checks::{authorize_initialize, Allocation, FunderView, InitializeRequest, TargetView};
use crate::constants::{LAYOUT_VERSION, ROOM_SEED};
use crate::events::RoomInitialized;
use crate::lifecycle::commit_initialized;
use crate::pda::derive_room_address;
use crate::state::{RoomAccount, RoomPayload};

/// Accounts for `initialize`.
///
/// Every account is taken unchecked, without `mut` or `signer` constraints,
/// and validated by [`authorize_initialize`] so that each rejection maps onto
/// one `InitError` and no write is staged before all checks pass. Clients mark
/// `funding_signer` as a writable signer and `target_account` as writable.
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// Pays rent for the room and becomes its `authority`
    /// CHECK: signature and writability verified in `authorize_initialize`
    pub funding_signer: UncheckedAccount<'info>,

    /// Room account at `["hotel", room_id]`
    /// CHECK: writability, address, owner and state verified in
    /// `authorize_initialize`
    pub target_account: UncheckedAccount<'info>,

    /// CHECK: must be the system program; compared by key before any CPI
    pub system_allocator: UncheckedAccount<'info>,

    /// CHECK: must be this program; compared against `program_id`
    pub program_self: UncheckedAccount<'info>,
}

/// Instruction inputs as seen by the planning pass.
#[derive(Clone, Copy, Debug)]
pub struct InitializeInputs<'a> {
    pub funder: FunderView<'a>,
    pub target: TargetView<'a>,
    pub system_allocator: &'a Pubkey,
    pub program_self: &'a Pubkey,
    pub room_id: u64,
    pub payload: &'a [u8],
}

/// Outcome of a successful planning pass: everything `initialize` will do,
/// decided before it does any of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitializePlan {
    pub address: Pubkey,
    pub bump: u8,
    pub allocation: Option<Allocation>,
    pub record: RoomAccount,
}

/// Derive, check, decode. Reads only.
pub fn plan_initialize(
    program_id: &Pubkey,
    inputs: &InitializeInputs,
    rent: &Rent,
) -> Result<InitializePlan> {
    let (address, bump) = derive_room_address(program_id, inputs.room_id)?;

    let allocation = authorize_initialize(
        &InitializeRequest {
            program_id,
            funder: inputs.funder,
            target: inputs.target,
            system_allocator: inputs.system_allocator,
            program_self: inputs.program_self,
            expected_address: &address,
        },
        rent,
    )?;

    let payload = RoomPayload::decode(inputs.payload)?;

    Ok(InitializePlan {
        address,
        bump,
        allocation,
        record: RoomAccount {
            owner_program: *program_id,
            authority: *inputs.funder.key,
            room_id: inputs.room_id,
            bump,
            layout_version: LAYOUT_VERSION,
            payload,
        },
    })
}

pub fn initialize(ctx: Context<Initialize>, room_id: u64, payload: Vec<u8>) -> Result<()> {
    let program_id = ctx.program_id;
    let accounts = &ctx.accounts;
    let rent = Rent::get()?;

    let plan = {
        let target_data = accounts.target_account.try_borrow_data()?;
        let inputs = InitializeInputs {
            funder: FunderView {
                key: accounts.funding_signer.key,
                is_signer: accounts.funding_signer.is_signer,
                is_writable: accounts.funding_signer.is_writable,
                lamports: accounts.funding_signer.lamports(),
            },
            target: TargetView {
                key: accounts.target_account.key,
                is_writable: accounts.target_account.is_writable,
                owner: accounts.target_account.owner,
                lamports: accounts.target_account.lamports(),
                data: &target_data,
            },
            system_allocator: accounts.system_allocator.key,
            program_self: accounts.program_self.key,
            room_id,
            payload: &payload,
        };
        plan_initialize(program_id, &inputs, &rent)?
    };

    if let Some(allocation) = &plan.allocation {
        let room_id_bytes = room_id.to_le_bytes();
        let bump_seed = [plan.bump];
        let seeds: &[&[u8]] = &[ROOM_SEED, &room_id_bytes, &bump_seed];
        allocate_room(accounts, program_id, allocation, &[seeds])?;
    }

    {
        let mut data = accounts.target_account.try_borrow_mut_data()?;
        commit_initialized(&mut data, &plan.record)?;
    }

    emit!(RoomInitialized {
        room: plan.address,
        room_id,
        authority: plan.record.authority,
        capacity: plan.record.payload.capacity,
        nightly_rate: plan.record.payload.nightly_rate,
    });
    msg!(
        "Room {} initialized at {} (capacity {})",
        room_id,
        plan.address,
        plan.record.payload.capacity
    );
    Ok(())
}

/// Gives the room address its storage, signing for it with the PDA seeds.
fn allocate_room<'info>(
    accounts: &Initialize<'info>,
    program_id: &Pubkey,
    allocation: &Allocation,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    let system = accounts.system_allocator.to_account_info();
    let funder = accounts.funding_signer.to_account_info();
    let target = accounts.target_account.to_account_info();
    let space = allocation.space as u64;

    if allocation.create {
        msg!("Creating room account ({} bytes)", space);
        return system_program::create_account(
            CpiContext::new_with_signer(
                system,
                system_program::CreateAccount {
                    from: funder,
                    to: target,
                },
                signer_seeds,
            ),
            allocation.rent_exempt_lamports,
            space,
            program_id,
        );
    }

    // Someone already sent lamports to the address, which makes
    // `create_account` fail. Top up, then allocate and assign separately.
    msg!("Room address pre-funded, topping up {} lamports", allocation.top_up);
    if allocation.top_up > 0 {
        system_program::transfer(
            CpiContext::new(
                system.clone(),
                system_program::Transfer {
                    from: funder,
                    to: target.clone(),
                },
            ),
            allocation.top_up,
        )?;
    }
    system_program::allocate(
        CpiContext::new_with_signer(
            system.clone(),
            system_program::Allocate {
                account_to_allocate: target.clone(),
            },
            signer_seeds,
        ),
        space,
    )?;
    system_program::assign(
        CpiContext::new_with_signer(
            system,
            system_program::Assign {
                account_to_assign: target,
            },
            signer_seeds,
        ),
        program_id,
    )
}
