//! Orders articles and resolves their prev/next neighbours. The rules live
//! behind the [`Policy`] trait: [`Sequential`] orders by folder, order key, and
//! date and links every article to its neighbours in the global sequence;
//! [`PinnedFolder`] additionally moves one folder to the front and gives its
//! articles folder-local navigation.

use crate::article::Article;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// The order key of files without a numeric prefix. They sort after every
/// numbered file in the same folder.
pub const UNORDERED: u32 = u32::MAX;

/// Splits a leading `\d+-` prefix off of `base_name`, returning the digits and
/// the remainder.
fn split_order_prefix(base_name: &str) -> Option<(&str, &str)> {
    let end = base_name.find(|c: char| !c.is_ascii_digit())?;
    if end == 0 {
        return None;
    }
    let (digits, rest) = base_name.split_at(end);
    Some((digits, rest.strip_prefix('-')?))
}

/// Derives the sort key from a file's base name: `01-intro` yields `1`,
/// `intro` yields [`UNORDERED`]. Prefixes too large for a `u32` are treated as
/// absent.
pub fn order_key(base_name: &str) -> u32 {
    split_order_prefix(base_name)
        .and_then(|(digits, _)| digits.parse().ok())
        .unwrap_or(UNORDERED)
}

/// Returns `base_name` without its numeric order prefix.
pub fn strip_order_prefix(base_name: &str) -> &str {
    match split_order_prefix(base_name) {
        Some((_, rest)) => rest,
        None => base_name,
    }
}

/// The neighbours of an article in reading order.
#[derive(Debug, Default)]
pub struct Navigation<'a> {
    pub prev: Option<&'a Article>,
    pub next: Option<&'a Article>,
}

/// Decides the reading order of articles and how they link to each other.
pub trait Policy {
    /// Compares two articles for [`sort`]. Implementations need not be a total
    /// order.
    fn compare(&self, a: &Article, b: &Article) -> Ordering;

    /// Resolves the neighbours of `articles[index]`. `articles` must already
    /// be sorted with this policy.
    fn navigation<'a>(&self, articles: &'a [Article], index: usize) -> Navigation<'a>;
}

/// Orders articles within a folder by order key, then newest first; articles
/// in different folders are ordered newest first. Navigation follows the
/// global sequence.
pub struct Sequential;

impl Policy for Sequential {
    fn compare(&self, a: &Article, b: &Article) -> Ordering {
        match a.folder == b.folder {
            true => a.order.cmp(&b.order).then_with(|| b.date.cmp(&a.date)),
            false => b.date.cmp(&a.date),
        }
    }

    fn navigation<'a>(&self, articles: &'a [Article], index: usize) -> Navigation<'a> {
        Navigation {
            prev: match index < 1 {
                true => None,
                false => articles.get(index - 1),
            },
            next: articles.get(index + 1),
        }
    }
}

/// [`Sequential`] ordering with one folder always placed first. Inside that
/// folder prev/next stay within the folder, except that the folder's last
/// article continues into the next article of the global sequence. The first
/// article of the folder has no `prev`.
pub struct PinnedFolder {
    folder: String,
}

impl PinnedFolder {
    pub fn new<S: Into<String>>(folder: S) -> PinnedFolder {
        PinnedFolder {
            folder: folder.into(),
        }
    }

    fn is_pinned(&self, article: &Article) -> bool {
        article.folder == self.folder
    }
}

impl Policy for PinnedFolder {
    fn compare(&self, a: &Article, b: &Article) -> Ordering {
        match (self.is_pinned(a), self.is_pinned(b)) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => Sequential.compare(a, b),
        }
    }

    fn navigation<'a>(&self, articles: &'a [Article], index: usize) -> Navigation<'a> {
        let current = match articles.get(index) {
            Some(article) => article,
            None => return Navigation::default(),
        };
        if !self.is_pinned(current) {
            return Sequential.navigation(articles, index);
        }

        let prev = articles[..index].iter().rev().find(|a| self.is_pinned(a));
        let next = articles[index + 1..]
            .iter()
            .find(|a| self.is_pinned(a))
            .or_else(|| articles.get(index + 1));
        Navigation { prev, next }
    }
}

/// Selects [`PinnedFolder`] when a folder is given and [`Sequential`]
/// otherwise.
pub fn policy(pinned_folder: Option<&str>) -> Box<dyn Policy> {
    match pinned_folder {
        Some(folder) => Box::new(PinnedFolder::new(folder)),
        None => Box::new(Sequential),
    }
}

/// Sorts `articles` in place with `policy`. The sort is stable and leaves no
/// adjacent pair that `policy` considers out of order, so sorting an already
/// sorted slice changes nothing. It does not require the comparator to be
/// transitive.
///
/// Articles of one folder needn't be contiguous on input (root files and
/// numbered subfolders interleave in name order), so each folder is first
/// ordered among the positions it occupies. The adjacent-swap pass never
/// swaps two articles of the same folder afterwards.
pub fn sort(articles: &mut [Article], policy: &dyn Policy) {
    order_within_folders(articles, policy);
    for i in 1..articles.len() {
        let mut j = i;
        while j > 0 && policy.compare(&articles[j - 1], &articles[j]) == Ordering::Greater {
            articles.swap(j - 1, j);
            j -= 1;
        }
    }
}

fn order_within_folders(articles: &mut [Article], policy: &dyn Policy) {
    let mut positions: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, article) in articles.iter().enumerate() {
        positions.entry(article.folder.clone()).or_default().push(i);
    }
    for indices in positions.values() {
        let mut group: Vec<Article> = indices.iter().map(|&i| articles[i].clone()).collect();
        group.sort_by(|a, b| policy.compare(a, b));
        for (&i, article) in indices.iter().zip(group) {
            articles[i] = article;
        }
    }
}
