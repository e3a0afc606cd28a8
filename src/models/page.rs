use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

pub const PAGE_SIZE: u32 = 10;

/// 1-indexed page number coming from `?page=`. Anything missing, zero or
/// unparsable means the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PageToken(u32);

impl PageToken {
    pub fn first() -> Self {
        PageToken(1)
    }

    pub fn new(number: u32) -> Self {
        PageToken(number.max(1))
    }

    /// Numbers too large for `u32` saturate, so they still land past the
    /// last page.
    pub fn parse(raw: Option<&str>) -> Self {
        let parsed = raw.map(|s| s.trim().parse::<u32>());
        match parsed {
            Some(Ok(n)) => PageToken::new(n),
            Some(Err(e)) if *e.kind() == IntErrorKind::PosOverflow => PageToken::new(u32::MAX),
            _ => PageToken::first(),
        }
    }

    pub fn number(self) -> u32 {
        self.0
    }

    pub fn offset(self) -> u64 {
        u64::from(self.0 - 1) * u64::from(PAGE_SIZE)
    }

    pub fn limit(self) -> u64 {
        u64::from(PAGE_SIZE)
    }
}

impl Default for PageToken {
    fn default() -> Self {
        PageToken::first()
    }
}

/// `?page=` query string. Kept as raw text so that junk values fall back
/// to page 1 instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn token(&self) -> PageToken {
        PageToken::parse(self.page.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Page<T> {
    pub number: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub num_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(token: PageToken, total_count: u64, items: Vec<T>) -> Self {
        let num_pages = num_pages(total_count);
        let number = token.number();
        Self {
            number,
            page_size: PAGE_SIZE,
            total_count,
            num_pages,
            has_next: number < num_pages,
            has_previous: number > 1 && number <= num_pages,
            items,
        }
    }
}

/// Never below one, so an empty listing still has a (blank) first page.
pub fn num_pages(total_count: u64) -> u32 {
    let pages = total_count.div_ceil(u64::from(PAGE_SIZE)).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn junk_tokens_mean_first_page() {
        assert_eq!(PageToken::parse(None).number(), 1);
        assert_eq!(PageToken::parse(Some("0")).number(), 1);
        assert_eq!(PageToken::parse(Some("-3")).number(), 1);
        assert_eq!(PageToken::parse(Some("abc")).number(), 1);
        assert_eq!(PageToken::parse(Some(" 4 ")).number(), 4);
    }

    #[test]
    fn oversized_tokens_saturate() {
        assert_eq!(PageToken::parse(Some("5000000000")).number(), u32::MAX);
        assert_eq!(
            PageToken::parse(Some("99999999999999999999999")).number(),
            u32::MAX
        );
        assert_eq!(PageToken::parse(Some("-5000000000")).number(), 1);
        assert_eq!(PageToken::new(u32::MAX).offset(), u64::from(u32::MAX - 1) * 10);
    }

    #[test]
    fn offsets_step_by_page_size() {
        assert_eq!(PageToken::new(1).offset(), 0);
        assert_eq!(PageToken::new(3).offset(), 20);
        assert_eq!(PageToken::new(3).limit(), 10);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(num_pages(0), 1);
        assert_eq!(num_pages(10), 1);
        assert_eq!(num_pages(11), 2);
        assert_eq!(num_pages(25), 3);
    }

    #[test]
    fn navigation_flags() {
        let first: Page<u8> = Page::new(PageToken::new(1), 25, vec![]);
        assert!(first.has_next);
        assert!(!first.has_previous);

        let last: Page<u8> = Page::new(PageToken::new(3), 25, vec![]);
        assert!(!last.has_next);
        assert!(last.has_previous);

        let beyond: Page<u8> = Page::new(PageToken::new(9), 25, vec![]);
        assert!(!beyond.has_next);
        assert!(!beyond.has_previous);
        assert_eq!(beyond.num_pages, 3);
    }
}
