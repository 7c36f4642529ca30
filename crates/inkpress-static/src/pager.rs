//! Fixed-size page windows over an ordered list.

use serde::Serialize;

/// Placeholder replaced by a page number in a layout.
const PAGE_PLACEHOLDER: &str = "{n}";

/// One page of a paginated listing; `begin..end` indexes the listed items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Pager {
    pub page: usize,
    pub total: usize,
    pub page_size: usize,
    pub begin: usize,
    pub end: usize,
    pub prev: Option<usize>,
    pub next: Option<usize>,
    pub layout: String,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

impl Pager {
    /// Attach a permalink layout such as `/posts/{n}.html`.
    pub fn set_layout(&mut self, layout: &str) {
        self.layout = layout.to_string();
        self.prev_url = self.prev.map(|n| self.url(n));
        self.next_url = self.next.map(|n| self.url(n));
    }

    /// URL of page `n` under the current layout.
    pub fn url(&self, n: usize) -> String {
        self.layout.replace(PAGE_PLACEHOLDER, &n.to_string())
    }
}

/// Computes [`Pager`] windows for a list of `total` items.
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    page_size: usize,
    total: usize,
}

impl Cursor {
    /// A zero page size is treated as one.
    pub fn new(page_size: usize, total: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            total,
        }
    }

    /// The window for 1-based page `n`, or `None` past the last page.
    pub fn page(&self, n: usize) -> Option<Pager> {
        let begin = n.checked_sub(1)? * self.page_size;
        if begin >= self.total {
            return None;
        }
        let end = (begin + self.page_size).min(self.total);

        Some(Pager {
            page: n,
            total: self.total,
            page_size: self.page_size,
            begin,
            end,
            prev: (n > 1).then(|| n - 1),
            next: (end < self.total).then(|| n + 1),
            layout: String::new(),
            prev_url: None,
            next_url: None,
        })
    }

    /// Number of pages needed for all items.
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn iterates_windows_until_exhausted() {
        let cursor = Cursor::new(4, 10);

        let mut windows = Vec::new();
        let mut page = 1;
        while let Some(pager) = cursor.page(page) {
            windows.push((pager.begin, pager.end));
            page += 1;
        }

        assert_eq!(windows, vec![(0, 4), (4, 8), (8, 10)]);
        assert_eq!(page - 1, 3);
        assert_eq!(cursor.page_count(), 3);
    }

    #[test]
    fn window_bounds_hold_for_small_grid() {
        for size in 1..=5 {
            for total in 0..=12 {
                let cursor = Cursor::new(size, total);
                for n in 1..=14 {
                    let begin = (n - 1) * size;
                    match cursor.page(n) {
                        None => assert!(begin >= total),
                        Some(p) => {
                            assert!(begin < total);
                            assert_eq!(p.begin, begin);
                            assert_eq!(p.end - p.begin, size.min(total - begin));
                            assert!(p.end <= total);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn empty_list_has_no_pages() {
        let cursor = Cursor::new(4, 0);

        assert!(cursor.page(1).is_none());
        assert_eq!(cursor.page_count(), 0);
    }

    #[test]
    fn page_zero_is_none() {
        assert!(Cursor::new(4, 10).page(0).is_none());
    }

    #[test]
    fn layout_builds_neighbour_urls() {
        let mut pager = Cursor::new(4, 10).page(2).unwrap();
        let window = (pager.begin, pager.end);

        pager.set_layout("/posts/{n}.html");

        assert_eq!((pager.begin, pager.end), window);
        assert_eq!(pager.prev_url.as_deref(), Some("/posts/1.html"));
        assert_eq!(pager.next_url.as_deref(), Some("/posts/3.html"));

        let mut last = Cursor::new(4, 10).page(3).unwrap();
        last.set_layout("/posts/{n}.html");
        assert_eq!(last.next, None);
        assert_eq!(last.next_url, None);
    }
}
