pub(super) mod balance;
pub(super) mod errors;
pub(super) mod token_info;

pub use self::{balance::Balance, errors::BRC20Error, token_info::TokenInfo};

/// Ticks are case-insensitive.
pub fn tick_key(tick: &str) -> String {
  tick.to_lowercase()
}

pub fn balance_key(tick: &str, address: &str) -> String {
  format!("{tick},{address}").to_lowercase()
}
