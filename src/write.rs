use crate::{data::Amount, summary::Line};
use std::fmt;

/// Shows an amount the way a float would print: normalised, but always with at
/// least one fractional digit (`15.0`, `10.5`).
pub struct FloatLike(pub Amount);

impl fmt::Display for FloatLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0.normalize();
        if value.scale() == 0 {
            write!(f, "{value}.0")
        } else {
            write!(f, "{value}")
        }
    }
}

/// Basic text exporter for the summary: one tab per level of depth, then
/// `label: total`. Ignored categories are marked, listed items go one level
/// deeper than their category.
pub fn write_summary<W: std::io::Write>(
    mut writer: W,
    lines: &[Line<'_>],
) -> Result<(), anyhow::Error> {
    for line in lines {
        let indent = "\t".repeat(line.depth);
        write!(writer, "{indent}{}: {}", line.label, FloatLike(line.total))?;
        if line.ignored {
            write!(writer, " (ignored)")?;
        }
        writeln!(writer)?;
        for item in line.items {
            writeln!(writer, "{indent}\t- {}", FloatLike(*item))?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{write_summary, FloatLike};
    use crate::{
        compute::build,
        data::Transaction,
        summary::{render, render_with, RenderOptions},
    };
    use rust_decimal_macros::dec;

    #[test]
    fn test_float_like() {
        assert_eq!(FloatLike(dec!(15.00)).to_string(), "15.0");
        assert_eq!(FloatLike(dec!(10.50)).to_string(), "10.5");
        assert_eq!(FloatLike(dec!(800)).to_string(), "800.0");
        assert_eq!(FloatLike(dec!(-0.125)).to_string(), "-0.125");
    }

    #[test]
    fn test_write_summary() {
        let tree = build([
            Transaction::new("Food/Groceries", "10.00", ""),
            Transaction::new("Food/Dining", "5.00", ""),
        ])
        .unwrap();
        let mut out = Vec::new();
        write_summary(&mut out, &render(tree.root(), 0).unwrap()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Food: 15.0\n\tGroceries: 10.0\n\tDining: 5.0\n"
        );
    }

    #[test]
    fn test_write_nothing() {
        let mut out = Vec::new();
        write_summary(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_ignored_and_items() {
        let tree = build([
            Transaction::new("Home/Energy", "2.5", ""),
            Transaction::new("Home", "1", ""),
            Transaction::new("Home", "2", ""),
            Transaction::new("Transfers", "100", ""),
        ])
        .unwrap();
        let options = RenderOptions {
            ignored: ["Transfers"].into_iter().collect(),
            print_items: true,
            ..RenderOptions::default()
        };
        let mut out = Vec::new();
        write_summary(&mut out, &render_with(tree.root(), 0, &options).unwrap()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Home: 5.5\n\t- 1.0\n\t- 2.0\n\tEnergy: 2.5\n\t\t- 2.5\nTransfers: 100.0 (ignored)\n\t- 100.0\n"
        );
    }
}
