use crate::data::{checked_add, checked_sum, Amount, Error, Node};
use std::{collections::HashSet, fs, path::Path};

/// One line of the summary: a category at some nesting depth with its rollup total.
///
/// `items` is only filled in when `RenderOptions::print_items` is set, `ignored`
/// marks a category left out of its parents' totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    pub depth: usize,
    pub label: &'a str,
    pub total: Amount,
    pub items: &'a [Amount],
    pub ignored: bool,
}

impl<'a> Line<'a> {
    pub fn new(depth: usize, label: &'a str, total: Amount) -> Self {
        Self {
            depth,
            label,
            total,
            items: &[],
            ignored: false,
        }
    }
}

/// Category names whose subtree is left out of the totals of their parents. Matched
/// against a single segment, so `Transfers` ignores `Transfers` at any level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoredCategories(HashSet<String>);

impl IgnoredCategories {
    /// One category per line; surrounding blanks and empty lines are skipped.
    pub fn parse(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    pub fn contains(&self, category: &str) -> bool {
        self.0.contains(category)
    }
}

impl<S: Into<String>> FromIterator<S> for IgnoredCategories {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Tweaks to the listing. The default shows every category with its full rollup.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Number of levels to list below the rendered node; deeper rows still count
    /// towards the totals shown.
    pub max_depth: Option<usize>,
    pub ignored: IgnoredCategories,
    /// Drop ignored categories (and everything below them) from the listing
    pub hide_ignored: bool,
    /// Attach each category's own amounts to its line
    pub print_items: bool,
}

/// Own items plus everything below, recursively. An empty node totals zero.
pub fn total_of(node: &Node) -> Result<Amount, Error> {
    node.fold(
        &mut |node: &Node, children: Vec<(&Node, Result<Amount, Error>)>| {
            children
                .into_iter()
                .try_fold(checked_sum(node.items())?, |total, (_, child)| {
                    checked_add(total, child?)
                })
        },
    )
}

/// Like `total_of`, leaving out the subtrees of ignored categories.
pub fn total_with(node: &Node, options: &RenderOptions) -> Result<Amount, Error> {
    node.fold(&mut |node, children| rollup(node, children, options))
        .map(|rollup| rollup.total)
}

/// Pre-order listing of the descendants of `node` (not `node` itself), children in
/// first-seen order, the direct children at `depth`.
pub fn render(node: &Node, depth: usize) -> Result<Vec<Line<'_>>, Error> {
    render_with(node, depth, &RenderOptions::default())
}

pub fn render_with<'a>(
    node: &'a Node,
    depth: usize,
    options: &RenderOptions,
) -> Result<Vec<Line<'a>>, Error> {
    let rollup = node.fold(&mut |node, children| rollup(node, children, options))?;
    Ok(rollup
        .lines
        .into_iter()
        .filter(|line| options.max_depth.map_or(true, |max| line.depth < max))
        .map(|line| Line {
            depth: line.depth + depth,
            ..line
        })
        .collect())
}

struct Rollup<'a> {
    total: Amount,
    lines: Vec<Line<'a>>,
}

/// Total and lines of a subtree, with its direct children at depth 0.
fn rollup<'a>(
    node: &'a Node,
    children: Vec<(&'a Node, Result<Rollup<'a>, Error>)>,
    options: &RenderOptions,
) -> Result<Rollup<'a>, Error> {
    let mut total = checked_sum(node.items())?;
    let mut lines = Vec::new();
    for (child, below) in children {
        let below = below?;
        let ignored = options.ignored.contains(child.category());
        if !ignored {
            total = checked_add(total, below.total)?;
        } else if options.hide_ignored {
            continue;
        }
        lines.push(Line {
            items: if options.print_items {
                child.items()
            } else {
                &[]
            },
            ignored,
            ..Line::new(0, child.category(), below.total)
        });
        lines.extend(below.lines.into_iter().map(|line| Line {
            depth: line.depth + 1,
            ..line
        }));
    }
    Ok(Rollup { total, lines })
}
