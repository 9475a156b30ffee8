//! Types that represent the upstream data model: `Account` and `Transaction`.
mod account;
mod amount;
mod transaction;

pub use account::{Account, AccountLinks, AccountSubtype, AccountType, Institution};
pub use amount::{Amount, AmountError};
pub use transaction::{Counterparty, Details, Transaction, TransactionLinks, TransactionStatus};
