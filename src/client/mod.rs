//! Buyer-side checkout flow: transaction fetch, wallet signing, and
//! confirmation polling.

pub mod checkout;
pub mod poller;

pub use checkout::{CheckoutClient, CheckoutOutcome};
pub use poller::{PollPolicy, await_confirmation};
