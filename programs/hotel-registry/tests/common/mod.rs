#![allow(dead_code)]

use std::sync::Arc;

use anchor_lang::{InstructionData, ToAccountMetas};
use hotel_registry::pda::derive_room_address;
use hotel_registry::{InitError, RoomAccount, RoomPayload};
use solana_program_test::{processor, BanksClient, BanksClientError, ProgramTest, ProgramTestContext};
use solana_sdk::{
    account::Account,
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    hash::Hash,
    instruction::{Instruction, InstructionError},
    pubkey::Pubkey,
    rent::Rent,
    signature::{Keypair, Signature, Signer},
    system_instruction, system_program,
    transaction::{Transaction, TransactionError},
};
use tokio::sync::{Barrier, Mutex};

pub const WALLET_LAMPORTS: u64 = 10_000_000_000;

fn process_instruction(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    // `entry` ties the slice lifetime to the account lifetime.
    let accounts = Box::leak(Box::new(accounts.to_vec()));
    hotel_registry::entry(program_id, accounts, data)
}

/// Genesis setup: accounts that must exist before the bank starts, such as
/// program-owned or foreign-owned storage at a room address.
pub struct RegistryTest {
    program_test: ProgramTest,
}

impl Default for RegistryTest {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryTest {
    pub fn new() -> Self {
        let mut program_test = ProgramTest::new(
            "hotel_registry",
            hotel_registry::ID,
            processor!(process_instruction),
        );
        program_test.prefer_bpf(false);
        Self { program_test }
    }

    /// System wallet present at genesis. Any balance is accepted here,
    /// including one below the rent-exempt minimum.
    pub fn wallet(&mut self, lamports: u64) -> Keypair {
        let wallet = Keypair::new();
        self.program_test
            .add_account(wallet.pubkey(), Account::new(lamports, 0, &system_program::ID));
        wallet
    }

    pub fn account(&mut self, key: Pubkey, account: Account) {
        self.program_test.add_account(key, account);
    }

    pub async fn start(self) -> Registry {
        Registry {
            context: self.program_test.start_with_context().await,
        }
    }
}

pub fn raw_account(lamports: u64, owner: Pubkey, data: Vec<u8>) -> Account {
    Account {
        lamports,
        data,
        owner,
        executable: false,
        rent_epoch: 0,
    }
}

/// One `initialize` instruction as a client would assemble it.
#[derive(Clone, Debug)]
pub struct InitializeTx {
    pub funder: Pubkey,
    pub funder_signs: bool,
    pub funder_writable: bool,
    pub target: Pubkey,
    pub target_writable: bool,
    pub system_allocator: Pubkey,
    pub program_self: Pubkey,
    pub room_id: u64,
    pub payload: Vec<u8>,
}

impl InitializeTx {
    /// Well-formed instruction for `room_id` at its derived address.
    pub fn new(funder: Pubkey, room_id: u64, payload: &RoomPayload) -> Self {
        let (target, _) = derive_room_address(&hotel_registry::ID, room_id).unwrap();
        Self {
            funder,
            funder_signs: true,
            funder_writable: true,
            target,
            target_writable: true,
            system_allocator: system_program::ID,
            program_self: hotel_registry::ID,
            room_id,
            payload: payload.encode(),
        }
    }

    pub fn instruction(&self) -> Instruction {
        let mut accounts = hotel_registry::accounts::Initialize {
            funding_signer: self.funder,
            target_account: self.target,
            system_allocator: self.system_allocator,
            program_self: self.program_self,
        }
        .to_account_metas(None);
        // Unchecked accounts carry no signer or writable marker of their own.
        accounts[0].is_signer = self.funder_signs;
        accounts[0].is_writable = self.funder_writable;
        accounts[1].is_writable = self.target_writable;

        Instruction {
            program_id: hotel_registry::ID,
            accounts,
            data: hotel_registry::instruction::Initialize {
                room_id: self.room_id,
                payload: self.payload.clone(),
            }
            .data(),
        }
    }
}

/// A running bank with the registry program loaded.
pub struct Registry {
    pub context: ProgramTestContext,
}

impl Registry {
    pub async fn rent(&mut self) -> Rent {
        self.context.banks_client.get_rent().await.unwrap()
    }

    /// System wallet funded from the test payer.
    pub async fn wallet(&mut self, lamports: u64) -> Keypair {
        let wallet = Keypair::new();
        let payer = &self.context.payer;
        let transfer = system_instruction::transfer(&payer.pubkey(), &wallet.pubkey(), lamports);
        let tx = Transaction::new_signed_with_payer(
            &[transfer],
            Some(&payer.pubkey()),
            &[payer],
            self.context.last_blockhash,
        );
        self.context.banks_client.process_transaction(tx).await.unwrap();
        wallet
    }

    pub async fn account(&mut self, key: &Pubkey) -> Option<Account> {
        self.context.banks_client.get_account(*key).await.unwrap()
    }

    pub async fn lamports(&mut self, key: &Pubkey) -> u64 {
        self.account(key).await.map_or(0, |account| account.lamports)
    }

    /// Fail-closed read through the program's own loader.
    pub async fn room(&mut self, key: &Pubkey) -> anchor_lang::Result<RoomAccount> {
        let account = self
            .account(key)
            .await
            .ok_or_else(|| anchor_lang::error!(InitError::LayoutMismatch))?;
        RoomAccount::load_at(&hotel_registry::ID, key, &account.owner, &account.data)
    }

    /// Sends `tx` with the test payer covering fees. Returns the transaction
    /// signature on success.
    pub async fn submit(&mut self, funder: &Keypair, tx: &InitializeTx) -> Result<Signature, BanksClientError> {
        let blockhash = self.context.last_blockhash;
        send(
            &mut self.context.banks_client,
            &self.context.payer,
            funder,
            tx,
            blockhash,
        )
        .await
    }

    /// Moves to a fresh blockhash so a byte-identical transaction is not
    /// dropped as a duplicate.
    pub async fn next_blockhash(&mut self) {
        self.context.last_blockhash = self.context.get_new_latest_blockhash().await.unwrap();
    }

    /// Submits every transaction from its own task, all released at once.
    pub async fn race(
        &mut self,
        racers: Vec<(Keypair, InitializeTx)>,
    ) -> Vec<(InitializeTx, Result<Signature, BanksClientError>)> {
        // The bank serializes writers of one account; the lock keeps one
        // transaction in flight so the loser sees the winner's commit.
        let banks = Arc::new(Mutex::new(self.context.banks_client.clone()));
        let barrier = Arc::new(Barrier::new(racers.len()));
        let blockhash = self.context.last_blockhash;

        let handles: Vec<_> = racers
            .into_iter()
            .map(|(funder, tx)| {
                let banks = Arc::clone(&banks);
                let barrier = Arc::clone(&barrier);
                let payer = self.context.payer.insecure_clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    let mut banks = banks.lock().await;
                    let outcome = send(&mut *banks, &payer, &funder, &tx, blockhash).await;
                    (tx, outcome)
                })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            outcomes.push(handle.await.unwrap());
        }
        outcomes
    }
}

async fn send(
    banks: &mut BanksClient,
    payer: &Keypair,
    funder: &Keypair,
    tx: &InitializeTx,
    blockhash: Hash,
) -> Result<Signature, BanksClientError> {
    let mut signers = vec![payer];
    if tx.funder_signs {
        signers.push(funder);
    }
    let transaction = Transaction::new_signed_with_payer(
        &[tx.instruction()],
        Some(&payer.pubkey()),
        signers.as_slice(),
        blockhash,
    );
    let signature = transaction.signatures[0];
    banks.process_transaction(transaction).await?;
    Ok(signature)
}

pub fn transaction_error(err: BanksClientError) -> TransactionError {
    match err {
        BanksClientError::TransactionError(err) | BanksClientError::SimulationError { err, .. } => err,
        other => panic!("transaction did not reach the program: {other}"),
    }
}

/// True when `result` failed inside `initialize` with `expected`.
pub fn is_init_error<T>(result: &Result<T, BanksClientError>, expected: InitError) -> bool {
    let code = u32::from(expected);
    match result {
        Err(BanksClientError::TransactionError(err))
        | Err(BanksClientError::SimulationError { err, .. }) => {
            *err == TransactionError::InstructionError(0, InstructionError::Custom(code))
        }
        _ => false,
    }
}

pub fn assert_init_error<T: std::fmt::Debug>(result: Result<T, BanksClientError>, expected: InitError) {
    let code = u32::from(expected);
    match result.map_err(transaction_error) {
        Err(TransactionError::InstructionError(0, InstructionError::Custom(actual))) => {
            assert_eq!(actual, code)
        }
        other => panic!("expected custom error {code}, got {other:?}"),
    }
}

pub fn room_payload(capacity: u16) -> RoomPayload {
    RoomPayload {
        capacity,
        nightly_rate: 250_000_000,
        transfer_fee_basis_points: 150,
    }
}
