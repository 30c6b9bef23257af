use anyhow::Context;
use category_totals::{read_file, render, write::write_summary, CategoryTree};
use log::info;

fn usage(args: &[String]) -> String {
    format!(
        "usage: {} ledger.csv",
        args.first().map_or("category-totals", String::as_str)
    )
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        anyhow::bail!(usage(&args));
    }
    let mut tree = CategoryTree::new();
    read_file(&args[1], &mut tree).with_context(|| format!("cannot summarise {}", args[1]))?;
    let totals = tree.totals();
    info!(
        "{} categories, debits {}, credits {}",
        tree.root().node_count() - 1,
        totals.debits,
        totals.credits
    );
    let lines = render(tree.root(), 0).context("cannot total categories")?;
    write_summary(std::io::stdout().lock(), &lines)?;
    Ok(())
}
