//! Nested category totals for a CSV ledger export.
//!
//! Rows are placed in a tree keyed by the segments of their slash-delimited
//! `Category`; each node reports the sum of its own rows and of everything below it.

pub mod compute;
pub mod data;
pub mod read;
pub mod summary;
pub mod write;

pub use compute::{build, CategoryTree, Totals};
pub use data::{Amount, Error, Node, Transaction};
pub use read::{read_file, read_transactions, ReadError, TransactionUser};
pub use summary::{
    render, render_with, total_of, total_with, IgnoredCategories, Line, RenderOptions,
};
