//! Step-by-step walkthrough of a layout, one container per page.

use super::layout::{Layout, LayoutEntry};

pub const EMPTY_PREVIEW: &str = "You need to add Containers and Controls to see output here.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreviewStepper {
    index: usize,
}

impl PreviewStepper {
    pub fn index(&self) -> usize {
        self.index
    }

    /// The page being shown, or nothing for an empty layout. An index left
    /// past the end by a shrinking layout shows the last page.
    pub fn current<'a>(&self, layout: &'a Layout) -> Option<&'a LayoutEntry> {
        let last = layout.len().checked_sub(1)?;
        layout.entries().get(self.index.min(last))
    }

    pub fn has_back(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self, layout: &Layout) -> bool {
        self.index + 1 < layout.len()
    }

    /// The last page shows Submit instead of Next.
    pub fn is_last(&self, layout: &Layout) -> bool {
        !layout.is_empty() && self.index + 1 >= layout.len()
    }

    pub fn next(&mut self, layout: &Layout) {
        if self.has_next(layout) {
            self.index += 1;
        }
    }

    /// Steps back from the page actually shown, even when the index was
    /// left past the end by a shrinking layout.
    pub fn back(&mut self, layout: &Layout) {
        let shown = self.index.min(layout.len().saturating_sub(1));
        self.index = shown.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_builder::ids::SequentialIds;
    use crate::form_builder::palette::ContainerTemplate;

    #[test]
    fn walks_forward_and_back() {
        let ids = SequentialIds::new();
        let mut layout = Layout::new();
        let mut stepper = PreviewStepper::default();
        assert!(stepper.current(&layout).is_none());
        assert!(!stepper.is_last(&layout));

        for _ in 0..3 {
            layout.add_container(&ContainerTemplate::default(), &ids);
        }
        assert!(!stepper.has_back());

        stepper.next(&layout);
        stepper.next(&layout);
        stepper.next(&layout);
        assert_eq!(stepper.index(), 2);
        assert!(stepper.is_last(&layout));
        assert_eq!(stepper.current(&layout).unwrap().container.sequence, 3);

        stepper.back(&layout);
        assert_eq!(stepper.index(), 1);
        assert!(stepper.has_next(&layout));
    }

    #[test]
    fn back_after_shrinking_lands_one_before_the_shown_page() {
        let ids = SequentialIds::new();
        let mut layout = Layout::new();
        for _ in 0..5 {
            layout.add_container(&ContainerTemplate::default(), &ids);
        }
        let mut stepper = PreviewStepper::default();
        for _ in 0..4 {
            stepper.next(&layout);
        }
        assert_eq!(stepper.index(), 4);

        let shrunk = Layout::from_entries(layout.entries()[..2].to_vec());
        assert_eq!(stepper.current(&shrunk).unwrap().container.sequence, 2);

        stepper.back(&shrunk);
        assert_eq!(stepper.index(), 0);
        assert_eq!(stepper.current(&shrunk).unwrap().container.sequence, 1);
    }
}
