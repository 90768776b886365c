//! Displayed content for one render pass
//!
//! A frame is created per render token. Results are accepted only when they
//! carry that token, so a slow result from a superseded pass can never paint
//! over the current view.

use super::renderer::RenderResult;
use super::request::RequestId;

#[derive(Clone, Debug)]
pub enum Slot {
    Pending { page: usize },
    Ready(RenderResult),
}

impl Slot {
    pub fn page(&self) -> usize {
        match self {
            Slot::Pending { page } => *page,
            Slot::Ready(result) => result.page(),
        }
    }

    pub fn result(&self) -> Option<&RenderResult> {
        match self {
            Slot::Pending { .. } => None,
            Slot::Ready(result) => Some(result),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Frame {
    id: RequestId,
    slots: Vec<Slot>,
}

impl Frame {
    /// Empty frame waiting on `pages`, left to right
    pub fn new(id: RequestId, pages: &[usize]) -> Self {
        Self {
            id,
            slots: pages.iter().map(|&page| Slot::Pending { page }).collect(),
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Store a result. Returns false, leaving the frame untouched, if the
    /// token or the slot does not belong to this frame.
    pub fn apply(&mut self, id: RequestId, slot: usize, result: RenderResult) -> bool {
        if id != self.id {
            log::debug!("Discarding stale result {id} for slot {slot}, showing {}", self.id);
            return false;
        }
        let Some(target) = self.slots.get_mut(slot) else {
            return false;
        };
        if target.page() != result.page() {
            return false;
        }
        *target = Slot::Ready(result);
        true
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|slot| matches!(slot, Slot::Ready(_)))
    }

    /// Results received so far, in slot order
    pub fn results(&self) -> impl Iterator<Item = &RenderResult> {
        self.slots.iter().filter_map(Slot::result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::renderer::{PlaceholderKind, RenderResult};
    use image::RgbaImage;

    fn painted(page: usize, shade: u8) -> RenderResult {
        RenderResult::Painted {
            page,
            image: RgbaImage::from_pixel(2, 2, image::Rgba([shade, shade, shade, 255])),
            effective_scale: 1.0,
        }
    }

    #[test]
    fn stale_token_never_changes_content() {
        // T1 issued for pages 2-3, then T2 for 4-5 which resolves first
        let t1 = RequestId::new(1);
        let t2 = RequestId::new(2);
        let mut frame = Frame::new(t2, &[4, 5]);
        assert!(frame.apply(t2, 0, painted(4, 40)));
        assert!(frame.apply(t2, 1, painted(5, 50)));
        assert!(frame.is_complete());

        assert!(!frame.apply(t1, 0, painted(2, 20)));
        assert!(!frame.apply(t1, 1, painted(3, 30)));

        let pages: Vec<_> = frame.results().map(RenderResult::page).collect();
        assert_eq!(pages, vec![4, 5]);
        assert_eq!(frame.results().next().unwrap().image().get_pixel(0, 0)[0], 40);
    }

    #[test]
    fn mismatched_slot_is_rejected() {
        let id = RequestId::new(7);
        let mut frame = Frame::new(id, &[6, 7]);
        assert!(!frame.apply(id, 2, painted(6, 1)));
        assert!(!frame.apply(id, 0, painted(7, 1)));
        assert!(!frame.is_complete());
    }

    #[test]
    fn placeholders_complete_a_frame() {
        let id = RequestId::new(3);
        let mut frame = Frame::new(id, &[8, 9]);
        frame.apply(id, 0, painted(8, 1));
        let blank = RenderResult::Placeholder {
            page: 9,
            kind: PlaceholderKind::Missing,
            image: RgbaImage::new(1, 1),
        };
        assert!(frame.apply(id, 1, blank));
        assert!(frame.is_complete());
        assert_eq!(frame.slots()[1].page(), 9);
    }
}
