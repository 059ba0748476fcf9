//! The main crate of the helper registration tool.
//!
//! This crate is used by all the services of the tool. It contains the environment setup,
//! the database handle, and the domain logic: shift bookkeeping, helper registration,
//! badge configuration and generation, and the spreadsheet export.
//!
//! If you wish to see the crate of the server program itself, take a look
//! at the [`helfer_api`](../helfer_api_lib/index.html) package.

#![warn(missing_docs)]

mod env;
mod pool;

pub mod badges;
pub mod error;
pub mod event;
pub mod export;
pub mod helper;
pub mod job;
pub mod mail;
pub mod must;
pub mod shift;
pub mod sync;
pub mod utils;

pub use env::*;
pub use pool::*;

/// Asserts that the provided future is [`Send`], and returns it unchanged.
///
/// This is useful with the transactions of the [`sync`] module, to get clearer
/// compiler errors.
pub fn assert_future_send<T, R>(t: T) -> impl Future<Output = R> + Send
where
    T: Future<Output = R> + Send,
{
    t
}
