mod model;
pub mod postgres;
mod store;

#[cfg(test)]
pub mod memory;

pub use model::{Account, AccountView, NewAccount};
pub use store::{AccountStore, StoreError};
