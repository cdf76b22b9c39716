//! Well-known program ids this adapter needs but doesn't pull a dedicated
//! crate in for — the same approach `r402-svm`'s `exact` module takes for
//! `ATA_PROGRAM_PUBKEY` rather than adding `spl-associated-token-account` as
//! a dependency for one constant.

use solana_pubkey::{pubkey, Pubkey};

/// The system program, used to build native-coin transfer instructions.
pub const SYSTEM_PROGRAM_ID: Pubkey = pubkey!("11111111111111111111111111111111111111111");

/// The associated-token-account program, used to derive a token account's
/// address from its owner and mint.
pub const ATA_PROGRAM_ID: Pubkey = pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Derives the associated token account address for `owner` holding `mint`.
#[must_use]
pub fn derive_ata(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), spl_token::ID.as_ref(), mint.as_ref()],
        &ATA_PROGRAM_ID,
    )
    .0
}
