//! Core types and traits for Trellis layout containers.
//!
//! This crate provides the foundational types shared by every container:
//! - Geometric primitives: [`Point`], [`Size`], [`Rect`]
//! - Layout constraints: [`Constraints`]
//! - The child contract: [`Element`]
//! - Device-pixel rounding: [`DpiScale`], [`round_layout_value`]

mod constraints;
pub mod element;
mod geometry;
mod rounding;

pub use constraints::Constraints;
pub use element::{Element, LayoutResult};
pub use geometry::{Point, Rect, Size};
pub use rounding::{are_close, round_layout_value, DpiScale};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rect_from_size_sits_at_origin() {
        let r = Rect::from_size(Size::new(100.0, 200.0));
        assert_eq!(r.origin(), Point::ORIGIN);
        assert_eq!(r, Rect::new(0.0, 0.0, 100.0, 200.0));
    }

    #[test]
    fn test_unbounded_constraints_pass_natural_size() {
        let c = Constraints::unbounded();
        assert_eq!(c.constrain(Size::new(1e6, 3.0)), Size::new(1e6, 3.0));
    }

    proptest! {
        #[test]
        fn prop_loose_constrain_never_exceeds_max(w in 0.0f64..500.0, h in 0.0f64..500.0, mw in 0.0f64..500.0, mh in 0.0f64..500.0) {
            let c = Constraints::loose(Size::new(mw, mh));
            let s = c.constrain(Size::new(w, h));
            prop_assert!(s.width <= mw && s.height <= mh);
        }

        #[test]
        fn prop_translate_keeps_extent(x in -1000.0f64..1000.0, y in -1000.0f64..1000.0, w in 0.0f64..1000.0, h in 0.0f64..1000.0) {
            let r = Rect::new(0.0, 0.0, w, h).translate(Point::new(x, y));
            prop_assert_eq!(r.size(), Size::new(w, h));
            prop_assert!(are_close(r.x, x) && are_close(r.y, y));
        }
    }
}
