use crate::data::{Error, Transaction};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::info;
use std::path::Path;
use thiserror::Error;

/// Trait for doing something with a `Transaction` read from a CSV file
/// (or received from elsewhere). Used to feed the category tree, but also used for
/// mock tests to check we get the correct rows from reading a CSV stream.
pub trait TransactionUser {
    fn use_tx(&mut self, tx: Transaction) -> Result<(), Error>;
}

#[derive(Error, Debug)]
pub enum ReadError {
    /// The file can't be opened or isn't well-formed CSV
    #[error("Input unavailable: {0}")]
    InputUnavailable(#[from] csv::Error),
    #[error("Transaction on line {line} rejected: {source}")]
    Transaction {
        line: u64,
        #[source]
        source: Error,
    },
}

fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.trim(Trim::All);
    builder
}

/// CSV importer for `Transaction`s. Stops at the first row the user rejects and
/// returns the number of rows used otherwise.
pub fn read_transactions<R: std::io::Read, U: TransactionUser>(
    reader: R,
    user: &mut U,
) -> Result<u64, ReadError> {
    import(reader_builder().from_reader(reader), user)
}

pub fn read_file<P: AsRef<Path>, U: TransactionUser>(
    path: P,
    user: &mut U,
) -> Result<u64, ReadError> {
    import(reader_builder().from_path(path)?, user)
}

fn import<R: std::io::Read, U: TransactionUser>(
    mut rdr: csv::Reader<R>,
    user: &mut U,
) -> Result<u64, ReadError> {
    let headers = rdr.headers()?.clone();
    let mut record = StringRecord::new();
    let mut count = 0;
    while rdr.read_record(&mut record)? {
        let line = record.position().map_or(0, |p| p.line());
        let tx: Transaction = record.deserialize(Some(&headers))?;
        user.use_tx(tx)
            .map_err(|source| ReadError::Transaction { line, source })?;
        count += 1;
    }
    info!("{count} transactions read");
    Ok(count)
}
