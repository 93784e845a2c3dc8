//! The element contract consumed by layout containers.
//!
//! A container never looks inside its children. It only asks them how big
//! they would like to be under some constraints, and later tells them the
//! rectangle they were given.
//!
//! # Examples
//!
//! ```
//! use trellis_core::{Constraints, Element, LayoutResult, Rect, Size};
//!
//! struct Label {
//!     natural: Size,
//!     bounds: Rect,
//! }
//!
//! impl Element for Label {
//!     fn measure(&mut self, constraints: Constraints) -> Size {
//!         constraints.constrain(self.natural)
//!     }
//!
//!     fn arrange(&mut self, bounds: Rect) -> LayoutResult {
//!         self.bounds = bounds;
//!         LayoutResult { size: bounds.size() }
//!     }
//! }
//!
//! let mut label = Label { natural: Size::new(40.0, 12.0), bounds: Rect::default() };
//! let desired = label.measure(Constraints::loose(Size::new(30.0, 100.0)));
//! assert_eq!(desired, Size::new(30.0, 12.0));
//! ```

use crate::constraints::Constraints;
use crate::geometry::{Rect, Size};

/// Result of arranging an element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutResult {
    /// Size the element ended up occupying
    pub size: Size,
}

/// A rectangular child that can be measured and arranged.
///
/// Containers may call `measure` several times per layout pass with
/// different constraints; `arrange` is called once per pass.
pub trait Element {
    /// Compute the desired size under the given constraints.
    fn measure(&mut self, constraints: Constraints) -> Size;

    /// Accept the final rectangle, relative to the container origin.
    fn arrange(&mut self, bounds: Rect) -> LayoutResult;
}

impl<E: Element + ?Sized> Element for Box<E> {
    fn measure(&mut self, constraints: Constraints) -> Size {
        (**self).measure(constraints)
    }

    fn arrange(&mut self, bounds: Rect) -> LayoutResult {
        (**self).arrange(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Size);

    impl Element for Fixed {
        fn measure(&mut self, constraints: Constraints) -> Size {
            constraints.constrain(self.0)
        }

        fn arrange(&mut self, bounds: Rect) -> LayoutResult {
            LayoutResult {
                size: bounds.size(),
            }
        }
    }

    #[test]
    fn test_boxed_element_forwards() {
        let mut boxed: Box<dyn Element> = Box::new(Fixed(Size::new(10.0, 20.0)));
        let size = boxed.measure(Constraints::unbounded());
        assert_eq!(size, Size::new(10.0, 20.0));

        let result = boxed.arrange(Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(result.size, Size::new(3.0, 4.0));
    }
}
