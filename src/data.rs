use rust_decimal::Decimal;
use serde::Deserialize;
use std::{collections::HashMap, str::FromStr};
use thiserror::Error;

/// Monetary amount. Decimal rather than float so that summing the same rows in any
/// order gives exactly the same totals.
pub type Amount = Decimal;

/// Separator between the segments of a category label (`Food/Groceries/Produce`).
pub const CATEGORY_SEPARATOR: char = '/';

/// One row of the exported ledger. Only the columns we need are kept, anything else
/// in the file is ignored by the deserializer.
///
/// Amounts are kept as raw strings: an unparseable amount is a domain error
/// (`MalformedAmount`), not a CSV error, so we parse them ourselves in `entry`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Transaction {
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "Debit Amount", default)]
    pub debit: String,
    #[serde(rename = "Credit Amount", default)]
    pub credit: String,
}

/// Which column an amount was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Debit,
    Credit,
}

impl Transaction {
    pub fn new(
        category: impl Into<String>,
        debit: impl Into<String>,
        credit: impl Into<String>,
    ) -> Self {
        Self {
            category: Some(category.into()),
            debit: debit.into(),
            credit: credit.into(),
        }
    }

    /// The debit amount if the debit column holds anything, otherwise the credit
    /// amount. A non-empty but unparseable debit is an error even when the credit
    /// column would parse.
    pub fn entry(&self) -> Result<(Side, Amount), Error> {
        let (side, raw) = if self.debit.is_empty() {
            (Side::Credit, &self.credit)
        } else {
            (Side::Debit, &self.debit)
        };
        match parse_amount(raw) {
            Ok(amount) => Ok((side, amount)),
            Err(AmountIssue::NotANumber) => Err(Error::MalformedAmount {
                debit: self.debit.clone(),
                credit: self.credit.clone(),
            }),
            Err(AmountIssue::OutOfRange) => Err(Error::AmountOutOfRange(raw.clone())),
        }
    }

    pub fn amount(&self) -> Result<Amount, Error> {
        self.entry().map(|(_, amount)| amount)
    }

    /// Category segments from the root down to the leaf. Segments are compared
    /// verbatim (case-sensitive); only an absent or empty label is rejected.
    pub fn path(&self) -> Result<impl Iterator<Item = &str>, Error> {
        self.category
            .as_deref()
            .filter(|category| !category.is_empty())
            .map(|category| category.split(CATEGORY_SEPARATOR))
            .ok_or(Error::MissingCategory)
    }
}

/// Why a raw amount was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountIssue {
    /// Not a number at all, or `nan`/`inf`
    NotANumber,
    /// A finite number too large for `Amount`, or so small it would round to zero
    OutOfRange,
}

/// Accepts what a float parser accepts (`-12.50`, `1.5e3`, `.5`, surrounding
/// whitespace) but keeps the exact decimal value whenever it fits.
pub fn parse_amount(raw: &str) -> Result<Amount, AmountIssue> {
    let raw = raw.trim();
    let float: f64 = match raw.parse() {
        Ok(float) if f64::is_finite(float) => float,
        Ok(_) => return Err(AmountIssue::NotANumber),
        // Digit separators (`1_000`) are only understood by `Decimal`
        Err(_) => return Decimal::from_str(raw).map_err(|_| AmountIssue::NotANumber),
    };
    let amount = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
        .or_else(|| Decimal::from_f64_retain(float));
    match amount {
        Some(amount) if amount.is_zero() && float != 0.0 => Err(AmountIssue::OutOfRange),
        Some(amount) => Ok(amount),
        None => Err(AmountIssue::OutOfRange),
    }
}

pub fn checked_add(left: Amount, right: Amount) -> Result<Amount, Error> {
    left.checked_add(right).ok_or(Error::AmountOverflow)
}

/// Sum that reports overflow instead of panicking.
pub fn checked_sum<'a>(amounts: impl IntoIterator<Item = &'a Amount>) -> Result<Amount, Error> {
    amounts
        .into_iter()
        .try_fold(Amount::ZERO, |acc, &amount| checked_add(acc, amount))
}

/// A point of the category tree. Children are kept in the order they were first
/// seen; `index` maps a child's category to its position in `children`.
///
/// `items` holds only the amounts classified exactly at this node, rollups are
/// computed on demand (see `summary`).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Node {
    category: String,
    children: Vec<Node>,
    index: HashMap<String, usize>,
    items: Vec<Amount>,
}

impl Node {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    /// Segment name of this node; empty for the root.
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn items(&self) -> &[Amount] {
        &self.items
    }

    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter()
    }

    pub fn child(&self, category: &str) -> Option<&Node> {
        self.index.get(category).map(|&i| &self.children[i])
    }

    /// Follows `path` from this node, `None` if any segment is missing.
    pub fn descendant<'a>(&self, path: impl IntoIterator<Item = &'a str>) -> Option<&Node> {
        path.into_iter()
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Number of nodes in this subtree, this one included.
    pub fn node_count(&self) -> usize {
        self.fold(&mut |_: &Node, children: Vec<(&Node, usize)>| {
            1 + children.into_iter().map(|(_, count)| count).sum::<usize>()
        })
    }

    pub(crate) fn child_or_insert(&mut self, category: &str) -> &mut Node {
        let i = match self.index.get(category) {
            Some(&i) => i,
            None => {
                self.children.push(Node::new(category));
                self.index
                    .insert(category.to_owned(), self.children.len() - 1);
                self.children.len() - 1
            }
        };
        &mut self.children[i]
    }

    pub(crate) fn push_item(&mut self, amount: Amount) {
        self.items.push(amount);
    }

    /// Union on child keys, concatenation of items. Children already present keep
    /// their position, new ones are appended in `other`'s order.
    pub(crate) fn merge(&mut self, other: Node) {
        self.items.extend(other.items);
        for child in other.children {
            match self.index.get(&child.category) {
                Some(&i) => self.children[i].merge(child),
                None => {
                    self.index
                        .insert(child.category.clone(), self.children.len());
                    self.children.push(child);
                }
            }
        }
    }

    /// Bottom-up fold: `f` receives a node together with the already folded value of
    /// each of its children, in display order.
    pub fn fold<'a, T, F>(&'a self, f: &mut F) -> T
    where
        F: FnMut(&'a Node, Vec<(&'a Node, T)>) -> T,
    {
        let mut folded = Vec::with_capacity(self.children.len());
        for child in &self.children {
            let value = child.fold(f);
            folded.push((child, value));
        }
        f(self, folded)
    }
}

/// Row-level errors. Any of them aborts the whole run: skipping a row would silently
/// give wrong totals.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Transaction has no category")]
    MissingCategory,
    #[error("Neither debit ({debit:?}) nor credit ({credit:?}) is a valid amount")]
    MalformedAmount { debit: String, credit: String },
    #[error("Amount {0:?} is outside the range an amount can hold")]
    AmountOutOfRange(String),
    #[error("Amount overflow while summing")]
    AmountOverflow,
}

#[cfg(test)]
mod tests {
    use super::{checked_sum, parse_amount, AmountIssue, Error, Node, Side, Transaction};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_debit_takes_precedence() {
        let tx = Transaction::new("Food", "10.00", "3.00");
        assert_eq!(tx.entry(), Ok((Side::Debit, dec!(10.00))));
    }

    #[test]
    fn test_credit_fallback() {
        let tx = Transaction::new("Rent", "", "800.00");
        assert_eq!(tx.entry(), Ok((Side::Credit, dec!(800))));
        let tx = Transaction::new("Rent", "", " 12.5 ");
        assert_eq!(tx.amount(), Ok(dec!(12.5)));
    }

    #[test]
    fn test_blank_debit_is_not_empty() {
        assert_eq!(
            Transaction::new("Rent", "   ", "12.5").amount(),
            Err(Error::MalformedAmount {
                debit: "   ".into(),
                credit: "12.5".into()
            })
        );
    }

    #[test]
    fn test_amount_notations() {
        assert_eq!(Transaction::new("A", "-4.20", "").amount(), Ok(dec!(-4.2)));
        assert_eq!(Transaction::new("A", "+7", "").amount(), Ok(dec!(7)));
        assert_eq!(Transaction::new("A", "1.5e3", "").amount(), Ok(dec!(1500)));
        assert_eq!(parse_amount(".5"), Ok(dec!(0.5)));
        assert_eq!(parse_amount("5."), Ok(dec!(5)));
        assert_eq!(parse_amount("2E2"), Ok(dec!(200)));
        assert_eq!(
            parse_amount("0.1e-27"),
            Ok(dec!(0.0000000000000000000000000001))
        );
    }

    #[test]
    fn test_amount_out_of_range() {
        assert_eq!(parse_amount("1e30"), Err(AmountIssue::OutOfRange));
        assert_eq!(parse_amount("-1e30"), Err(AmountIssue::OutOfRange));
        assert_eq!(parse_amount("1e-30"), Err(AmountIssue::OutOfRange));
        assert_eq!(parse_amount("0.1e-28"), Err(AmountIssue::OutOfRange));
        assert_eq!(
            Transaction::new("A", "", "1e30").amount(),
            Err(Error::AmountOutOfRange("1e30".into()))
        );
        assert_eq!(parse_amount("0e-5"), Ok(dec!(0)));
    }

    #[test]
    fn test_not_a_number() {
        for raw in ["", "ten", "nan", "inf", "-infinity", "1.2.3"] {
            assert_eq!(parse_amount(raw), Err(AmountIssue::NotANumber), "{raw}");
        }
    }

    #[test]
    fn test_checked_sum() {
        assert_eq!(checked_sum(&[dec!(1), dec!(2.5)]), Ok(dec!(3.5)));
        assert_eq!(
            checked_sum(&[Decimal::MAX, dec!(1)]),
            Err(Error::AmountOverflow)
        );
        assert_eq!(checked_sum(&[Decimal::MAX, Decimal::MIN]), Ok(dec!(0)));
    }

    #[test]
    fn test_malformed_amount() {
        assert_eq!(
            Transaction::new("Food", "", "").amount(),
            Err(Error::MalformedAmount {
                debit: "".into(),
                credit: "".into()
            })
        );
        assert_eq!(
            Transaction::new("Food", "ten", "10").amount(),
            Err(Error::MalformedAmount {
                debit: "ten".into(),
                credit: "10".into()
            })
        );
        assert_eq!(
            Transaction::new("Food", "", "nan").amount(),
            Err(Error::MalformedAmount {
                debit: "".into(),
                credit: "nan".into()
            })
        );
    }

    #[test]
    fn test_path() {
        let tx = Transaction::new("Food/Groceries/Produce", "1", "");
        assert_eq!(
            tx.path().unwrap().collect::<Vec<_>>(),
            ["Food", "Groceries", "Produce"]
        );
        let tx = Transaction::new("Rent", "1", "");
        assert_eq!(tx.path().unwrap().collect::<Vec<_>>(), ["Rent"]);
    }

    #[test]
    fn test_missing_category() {
        assert!(matches!(
            Transaction::new("", "1", "").path(),
            Err(Error::MissingCategory)
        ));
        let tx = Transaction {
            category: None,
            debit: "1".into(),
            credit: "".into(),
        };
        assert!(matches!(tx.path(), Err(Error::MissingCategory)));
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut root = Node::default();
        root.child_or_insert("Y");
        root.child_or_insert("X");
        root.child_or_insert("Y").push_item(dec!(1));
        assert_eq!(
            root.children().map(Node::category).collect::<Vec<_>>(),
            ["Y", "X"]
        );
        assert_eq!(root.child("Y").unwrap().items(), [dec!(1)]);
        assert!(root.child("y").is_none());
    }

    #[test]
    fn test_merge() {
        let mut left = Node::default();
        left.child_or_insert("A").child_or_insert("B").push_item(dec!(1));
        let mut right = Node::default();
        right.child_or_insert("C").push_item(dec!(2));
        right.child_or_insert("A").child_or_insert("B").push_item(dec!(3));
        right.child_or_insert("A").push_item(dec!(4));
        left.merge(right);

        assert_eq!(
            left.children().map(Node::category).collect::<Vec<_>>(),
            ["A", "C"]
        );
        assert_eq!(
            left.descendant(["A", "B"]).unwrap().items(),
            [dec!(1), dec!(3)]
        );
        assert_eq!(left.child("A").unwrap().items(), [dec!(4)]);
        assert_eq!(left.node_count(), 4);
    }

    #[test]
    fn test_fold_visits_children_in_order() {
        let mut root = Node::default();
        root.child_or_insert("A").child_or_insert("B");
        root.child_or_insert("C");
        let order = root.fold(&mut |node: &Node, children: Vec<(&Node, String)>| {
            let below: String = children.into_iter().map(|(_, s)| s).collect();
            format!("{}{below}", node.category())
        });
        assert_eq!(order, "ABC");
    }
}
