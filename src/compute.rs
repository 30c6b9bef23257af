use crate::{
    data::{checked_add, Amount, Error, Node, Side, Transaction},
    read::TransactionUser,
};
use log::debug;

/// Running totals per column, independent of categories.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub debits: Amount,
    pub credits: Amount,
}

impl Totals {
    pub fn total(&self) -> Result<Amount, Error> {
        checked_add(self.debits, self.credits)
    }

    fn add(self, side: Side, amount: Amount) -> Result<Totals, Error> {
        Ok(match side {
            Side::Debit => Totals {
                debits: checked_add(self.debits, amount)?,
                ..self
            },
            Side::Credit => Totals {
                credits: checked_add(self.credits, amount)?,
                ..self
            },
        })
    }
}

/// The category tree being built from the ledger rows. Single-threaded: to ingest in
/// parallel, build one tree per partition and `merge` them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CategoryTree {
    root: Node,
    totals: Totals,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// The synthetic root; its children are the top-level categories.
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// Folds `other` into this tree. Merging the trees built from consecutive
    /// partitions of the rows gives the tree built from all of them. On overflow
    /// this tree is left unchanged.
    pub fn merge(&mut self, other: CategoryTree) -> Result<(), Error> {
        let totals = Totals {
            debits: checked_add(self.totals.debits, other.totals.debits)?,
            credits: checked_add(self.totals.credits, other.totals.credits)?,
        };
        self.root.merge(other.root);
        self.totals = totals;
        Ok(())
    }
}

/// Every row lands on the node for its full path; ancestors only get a share of it
/// through rollup. A rejected row leaves the tree untouched.
impl TransactionUser for CategoryTree {
    fn use_tx(&mut self, tx: Transaction) -> Result<(), Error> {
        let (side, amount) = tx.entry()?;
        let path = tx.path()?;
        let totals = self.totals.add(side, amount)?;
        let mut node = &mut self.root;
        for segment in path {
            node = node.child_or_insert(segment);
        }
        node.push_item(amount);
        self.totals = totals;
        debug!(
            "{:?} {amount} placed under {:?}",
            side,
            tx.category.as_deref().unwrap_or_default()
        );
        Ok(())
    }
}

/// Builds the tree from an in-memory sequence of rows, stopping at the first bad one.
pub fn build(rows: impl IntoIterator<Item = Transaction>) -> Result<CategoryTree, Error> {
    let mut tree = CategoryTree::new();
    for tx in rows {
        tree.use_tx(tx)?;
    }
    Ok(tree)
}
