use anchor_lang::prelude::*;

/// Every way `initialize` can fail. All of them abort the whole transaction;
/// none are retried inside the program.
#[error_code]
pub enum InitError {
    #[msg("Funding account did not sign, or the instruction targets an address this program does not control")]
    Unauthorized,
    #[msg("Target account is owned by a different program")]
    OwnerMismatch,
    #[msg("Room account has already been initialized")]
    AlreadyInitialized,
    #[msg("Funding account cannot cover the rent-exempt minimum")]
    InsufficientFunds,
    #[msg("No valid bump exists for the supplied seeds")]
    DerivationExhausted,
    #[msg("Account data or payload does not match the expected layout")]
    LayoutMismatch,
}
