//! Pure balance-delta computation, kept separate from the RPC response
//! parsing in [`crate::adapter`] so it can be tested without a network
//! connection.

use xpay_core::address::Address;
use xpay_core::chain::{AccountBalanceDelta, TokenBalanceDelta};

/// One token-account snapshot taken from a transaction's pre- or
/// post-balance list, already decoded out of the RPC response's string
/// fields.
#[derive(Debug, Clone, Copy)]
pub struct RawTokenBalance {
    /// Index into the transaction's static account list.
    pub account_index: usize,
    /// The token account owner.
    pub owner: [u8; 32],
    /// The token's mint address.
    pub mint: [u8; 32],
    /// Balance in base units at this snapshot.
    pub amount: u128,
}

/// Computes the signed per-(owner, mint) balance deltas between a
/// transaction's pre- and post-token-balance snapshots.
///
/// Account indices present in `pre` but absent from `post` (or vice versa)
/// are treated as a balance of zero on the missing side — an account that
/// only springs into existence, or is closed, during the transaction.
#[must_use]
pub fn compute_token_deltas(pre: &[RawTokenBalance], post: &[RawTokenBalance]) -> Vec<TokenBalanceDelta> {
    let mut deltas = Vec::new();
    for post_entry in post {
        let pre_amount = pre
            .iter()
            .find(|p| p.account_index == post_entry.account_index)
            .map_or(0, |p| p.amount);
        let delta = i128::try_from(post_entry.amount).unwrap_or(i128::MAX)
            - i128::try_from(pre_amount).unwrap_or(i128::MAX);
        if delta != 0 {
            deltas.push(TokenBalanceDelta {
                mint_or_contract: Address::Account(post_entry.mint),
                owner: Address::Account(post_entry.owner),
                delta,
            });
        }
    }
    for pre_entry in pre {
        let still_present = post.iter().any(|p| p.account_index == pre_entry.account_index);
        if !still_present && pre_entry.amount != 0 {
            deltas.push(TokenBalanceDelta {
                mint_or_contract: Address::Account(pre_entry.mint),
                owner: Address::Account(pre_entry.owner),
                delta: -i128::try_from(pre_entry.amount).unwrap_or(i128::MAX),
            });
        }
    }
    deltas
}

/// Computes the signed per-account native-balance deltas between a
/// transaction's pre- and post-balance lamport arrays, indexed in parallel
/// with the transaction's static account keys.
#[must_use]
pub fn compute_account_deltas(owners: &[[u8; 32]], pre: &[u64], post: &[u64]) -> Vec<AccountBalanceDelta> {
    owners
        .iter()
        .enumerate()
        .filter_map(|(i, owner)| {
            let before = pre.get(i).copied().unwrap_or(0);
            let after = post.get(i).copied().unwrap_or(0);
            let delta = i128::from(after) - i128::from(before);
            (delta != 0).then_some(AccountBalanceDelta {
                owner: Address::Account(*owner),
                delta,
            })
        })
        .collect()
}
