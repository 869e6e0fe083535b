/// One page of a view, borrowed from the view it was cut from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlice<'a, T> {
    pub items: &'a [T],
    /// 1-based page number after clamping.
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<'a, T> PageSlice<'a, T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 1-based position of the first item on this page, 0 for an empty page.
    pub fn first_position(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.page_size + 1
        }
    }

    pub fn last_position(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.first_position() + self.items.len() - 1
        }
    }
}

/// Cuts page `page` out of `view`.
///
/// Pages are 1-based; zero or negative requests are page 1. A zero page size
/// is treated as 1. Requests past the last page yield an empty slice.
pub fn paginate<T>(view: &[T], page: i64, page_size: usize) -> (PageSlice<'_, T>, usize) {
    let page_size = page_size.max(1);
    let total_items = view.len();
    let total_pages = total_items.div_ceil(page_size);
    let page = if page < 1 {
        1
    } else {
        usize::try_from(page).unwrap_or(usize::MAX)
    };

    let start = (page - 1).saturating_mul(page_size).min(total_items);
    let end = start.saturating_add(page_size).min(total_items);

    let slice = PageSlice {
        items: &view[start..end],
        page,
        page_size,
        total_pages,
        total_items,
    };
    (slice, total_pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifteen_records_split_into_ten_and_five() {
        let view: Vec<u32> = (1..=15).collect();

        let (first, total_pages) = paginate(&view, 1, 10);
        assert_eq!(total_pages, 2);
        assert_eq!(first.items, &view[0..10]);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let (second, _) = paginate(&view, 2, 10);
        assert_eq!(second.items, &[11, 12, 13, 14, 15]);
        assert_eq!(second.first_position(), 11);
        assert_eq!(second.last_position(), 15);
        assert!(!second.has_next());
    }

    #[test]
    fn zero_and_negative_pages_are_page_one() {
        let view: Vec<u32> = (1..=25).collect();
        let (page_one, _) = paginate(&view, 1, 10);
        assert_eq!(paginate(&view, 0, 10).0, page_one);
        assert_eq!(paginate(&view, -4, 10).0, page_one);
    }

    #[test]
    fn pages_past_the_end_are_empty() {
        let view: Vec<u32> = (1..=5).collect();
        let (slice, total_pages) = paginate(&view, 3, 10);
        assert!(slice.is_empty());
        assert_eq!(total_pages, 1);
        assert_eq!(slice.first_position(), 0);
        assert_eq!(paginate(&view, i64::MAX, 10).0.items.len(), 0);
    }

    #[test]
    fn empty_view_has_no_pages() {
        let view: Vec<u32> = Vec::new();
        let (slice, total_pages) = paginate(&view, 1, 10);
        assert_eq!(total_pages, 0);
        assert!(slice.is_empty());
        assert!(!slice.has_next());
    }

    #[test]
    fn zero_page_size_is_treated_as_one() {
        let view = vec!['a', 'b', 'c'];
        let (slice, total_pages) = paginate(&view, 2, 0);
        assert_eq!(total_pages, 3);
        assert_eq!(slice.items, &['b']);
    }

    #[test]
    fn concatenated_pages_rebuild_the_view() {
        for len in [0usize, 1, 7, 8, 9, 23] {
            for page_size in [1usize, 3, 8, 10] {
                let view: Vec<usize> = (0..len).collect();
                let (_, total_pages) = paginate(&view, 1, page_size);
                let rebuilt: Vec<usize> = (1..=total_pages as i64)
                    .flat_map(|page| paginate(&view, page, page_size).0.items.to_vec())
                    .collect();
                assert_eq!(rebuilt, view, "len={len} page_size={page_size}");
            }
        }
    }
}
