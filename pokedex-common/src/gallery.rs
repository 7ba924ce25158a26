use async_trait::async_trait;
use tracing::{debug, warn};

use crate::constants::PAGE_SIZE;
use crate::structs::CardRecord;

/// One image of a gallery, captioned with its card id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub image: String,
    pub caption: String,
}

impl From<&CardRecord> for GalleryItem {
    fn from(card: &CardRecord) -> GalleryItem {
        GalleryItem {
            image: card.image.clone(),
            caption: card.id.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    pub offset: usize,
    pub items: &'a [GalleryItem],
    /// Offset of the following page, if there is one.
    pub next: Option<usize>,
}

impl Page<'_> {
    /// The offset pointed past the end of the results.
    pub fn is_exhausted(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gallery<'a> {
    /// The search matched nothing at all.
    NoResults,
    Page(Page<'a>),
}

/// Window of at most [`PAGE_SIZE`] items starting at `offset`.
pub fn page(items: &[GalleryItem], offset: usize) -> Page<'_> {
    let start = offset.min(items.len());
    let end = offset.saturating_add(PAGE_SIZE).min(items.len());
    let next = match offset.checked_add(PAGE_SIZE) {
        Some(next) if next < items.len() => Some(next),
        _ => None,
    };
    Page {
        offset,
        items: &items[start..end],
        next,
    }
}

pub fn gallery(items: &[GalleryItem], offset: usize) -> Gallery<'_> {
    if items.is_empty() {
        return Gallery::NoResults;
    }
    Gallery::Page(page(items, offset))
}

/// Transport that shows a batch of images as one message.
#[async_trait]
pub trait MediaSink: Send + Sync {
    type Error: std::fmt::Debug + Send;

    async fn send_media(&self, items: &[GalleryItem]) -> Result<(), Self::Error>;

    /// Index of the item the transport complained about, when it says so.
    fn rejected_item(&self, _error: &Self::Error) -> Option<usize> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub sent: Vec<GalleryItem>,
    /// Index within the page of the item left out, if any.
    pub dropped: Option<usize>,
}

fn without(items: &[GalleryItem], skip: usize) -> Vec<GalleryItem> {
    items
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != skip)
        .map(|(_, item)| item.clone())
        .collect()
}

///
/// Send `items` as one batch, falling back to dropping one item at a time.
///
/// The full batch is tried first. If the transport names the rejected item,
/// the variant without it goes next; then every remaining single-item-removed
/// variant in order. At most `items.len() + 1` sends are made and the last
/// error is returned when none succeed.
///
pub async fn deliver<S: MediaSink>(sink: &S, items: &[GalleryItem]) -> Result<Delivery, S::Error> {
    if items.is_empty() {
        return Ok(Delivery {
            sent: Vec::new(),
            dropped: None,
        });
    }
    let mut last_error = match sink.send_media(items).await {
        Ok(()) => {
            return Ok(Delivery {
                sent: items.to_vec(),
                dropped: None,
            })
        }
        Err(why) => why,
    };
    debug!("Gallery of {} items rejected: {:?}", items.len(), last_error);
    let hint = sink
        .rejected_item(&last_error)
        .filter(|index| *index < items.len());
    let order = hint
        .into_iter()
        .chain((0..items.len()).filter(|index| Some(*index) != hint));
    for skip in order {
        let attempt = without(items, skip);
        if attempt.is_empty() {
            continue;
        }
        match sink.send_media(&attempt).await {
            Ok(()) => {
                warn!(
                    "Delivered gallery without item {} ({})",
                    skip, items[skip].caption
                );
                return Ok(Delivery {
                    sent: attempt,
                    dropped: Some(skip),
                });
            }
            Err(why) => {
                debug!("Gallery without item {} rejected: {:?}", skip, why);
                last_error = why;
            }
        }
    }
    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Mutex;

    fn items(count: usize) -> Vec<GalleryItem> {
        (0..count)
            .map(|i| GalleryItem {
                image: format!("https://images.pokemontcg.io/base1/{}_hires.png", i),
                caption: format!("base1-{}", i),
            })
            .collect()
    }

    /// Rejects any batch containing one of the `bad` captions.
    struct Sink {
        bad: Vec<String>,
        report_index: bool,
        attempts: Mutex<Vec<Vec<String>>>,
    }

    impl Sink {
        fn new(bad: &[&str], report_index: bool) -> Sink {
            Sink {
                bad: bad.iter().map(|s| s.to_string()).collect(),
                report_index,
                attempts: Mutex::new(Vec::new()),
            }
        }

        fn attempts(&self) -> usize {
            self.attempts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MediaSink for Sink {
        type Error = Option<usize>;

        async fn send_media(&self, items: &[GalleryItem]) -> Result<(), Option<usize>> {
            self.attempts
                .lock()
                .unwrap()
                .push(items.iter().map(|item| item.caption.clone()).collect());
            match items.iter().position(|item| self.bad.contains(&item.caption)) {
                Some(index) => Err(Some(index)),
                None => Ok(()),
            }
        }

        fn rejected_item(&self, error: &Option<usize>) -> Option<usize> {
            if self.report_index {
                *error
            } else {
                None
            }
        }
    }

    #[test]
    fn pikachu_scenario() {
        let results = items(23);
        let first = page(&results, 0);
        assert_eq!(first.items, &results[0..10]);
        assert_eq!(first.next, Some(10));
        let second = page(&results, first.next.unwrap());
        assert_eq!(second.items, &results[10..20]);
        assert_eq!(second.next, Some(20));
        let third = page(&results, second.next.unwrap());
        assert_eq!(third.offset, 20);
        assert_eq!(third.items, &results[20..23]);
        assert_eq!(third.next, None);
    }

    #[test]
    fn no_results_differs_from_exhausted() {
        assert_eq!(gallery(&[], 0), Gallery::NoResults);
        let results = items(5);
        match gallery(&results, 10) {
            Gallery::Page(page) => {
                assert!(page.is_exhausted());
                assert_eq!(page.next, None);
            }
            Gallery::NoResults => panic!("expected an exhausted page"),
        }
    }

    #[test]
    fn exact_multiple_has_no_next() {
        let results = items(20);
        assert_eq!(page(&results, 10).next, None);
        assert_eq!(page(&results, 10).items.len(), 10);
    }

    #[test]
    fn huge_offset_does_not_overflow() {
        let results = items(3);
        let page = page(&results, usize::MAX);
        assert!(page.items.is_empty());
        assert_eq!(page.next, None);
    }

    proptest! {
        #[test]
        fn page_size_and_next(len in 0usize..60, offset in 0usize..80) {
            let results = items(len);
            let page = page(&results, offset);
            let expected = if offset < len { PAGE_SIZE.min(len - offset) } else { 0 };
            prop_assert_eq!(page.items.len(), expected);
            prop_assert_eq!(page.next.is_some(), offset + PAGE_SIZE < len);
            if let Some(next) = page.next {
                prop_assert_eq!(next, offset + PAGE_SIZE);
            }
        }
    }

    #[tokio::test]
    async fn delivers_full_page_in_one_attempt() {
        let page = items(10);
        let sink = Sink::new(&[], false);
        let delivery = deliver(&sink, &page).await.unwrap();
        assert_eq!(delivery.sent, page);
        assert_eq!(delivery.dropped, None);
        assert_eq!(sink.attempts(), 1);
    }

    #[tokio::test]
    async fn drops_malformed_item() {
        let page = items(10);
        let sink = Sink::new(&["base1-3"], false);
        let delivery = deliver(&sink, &page).await.unwrap();
        assert_eq!(delivery.dropped, Some(3));
        assert_eq!(delivery.sent.len(), 9);
        assert!(delivery.sent.iter().all(|item| item.caption != "base1-3"));
        // Full page, then without 0, 1, 2 and finally without 3.
        assert_eq!(sink.attempts(), 5);
    }

    #[tokio::test]
    async fn reported_item_is_dropped_first() {
        let page = items(10);
        let sink = Sink::new(&["base1-3"], true);
        let delivery = deliver(&sink, &page).await.unwrap();
        assert_eq!(delivery.dropped, Some(3));
        assert_eq!(delivery.sent.len(), 9);
        assert_eq!(sink.attempts(), 2);
    }

    #[tokio::test]
    async fn gives_up_after_every_variant() {
        let page = items(10);
        let sink = Sink::new(&["base1-2", "base1-7"], false);
        assert!(deliver(&sink, &page).await.is_err());
        assert_eq!(sink.attempts(), 11);
    }

    #[tokio::test]
    async fn single_bad_item_is_not_sent_empty() {
        let page = items(1);
        let sink = Sink::new(&["base1-0"], false);
        assert!(deliver(&sink, &page).await.is_err());
        assert_eq!(sink.attempts(), 1);
    }
}
