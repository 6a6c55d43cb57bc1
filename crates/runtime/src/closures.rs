//! Closure values for Strata
//!
//! A closure bundles:
//! - a diagnostic name (what `str` prints),
//! - an optional owned capture (any `Clone + 'static` value), and
//! - a plain function pointer that receives the capture plus typed arguments.
//!
//! Copying a closure clones its capture, so copies never share mutable state;
//! dropping it drops the capture. A closure without a capture copies and
//! frees nothing but its name.
//!
//! ## Equality
//!
//! Two closures are equal iff their function pointers are equal. Captured
//! state is not compared: `adder(1)` and `adder(2)` built from the same
//! function are equal. Generated code relies on this to compare callbacks by
//! behaviour identity. Function pointer identity is only as stable as the
//! compiler makes it (the same function may be emitted in more than one
//! codegen unit), so equality is a best-effort identity, never a proof of
//! difference.
//!
//! ## Callback shapes
//!
//! The array's higher-order operations use three shapes:
//! - **Predicate** (`filter`): `(capture, position, element) -> bool`
//! - **Visitor** (`for_each`): `(capture, position, element, index) -> ()`
//! - **Comparator** (`sort`): `(capture, position, a, b) -> i32`
//!
//! Every shape returns `Result`, so a callback can signal failure with
//! `RuntimeError::failure(position, message)`.

use std::any::Any;
use std::fmt;
use strata_core::{Element, Position, RuntimeError};

/// Owned, cloneable, type-erased capture
trait Capture: Any {
    fn clone_capture(&self) -> Box<dyn Capture>;
    fn as_any(&self) -> &dyn Any;
}

impl<C: Any + Clone> Capture for C {
    fn clone_capture(&self) -> Box<dyn Capture> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub type PredicateFn<T> = fn(Option<&dyn Any>, Position, &T) -> Result<bool, RuntimeError>;
pub type VisitorFn<T> = fn(Option<&dyn Any>, Position, &T, i32) -> Result<(), RuntimeError>;
pub type ComparatorFn<T> = fn(Option<&dyn Any>, Position, &T, &T) -> Result<i32, RuntimeError>;

pub type Predicate<T> = Closure<PredicateFn<T>>;
pub type Visitor<T> = Closure<VisitorFn<T>>;
pub type Comparator<T> = Closure<ComparatorFn<T>>;

/// Named function pointer with an optional owned capture
pub struct Closure<F> {
    name: String,
    capture: Option<Box<dyn Capture>>,
    call_fn: F,
}

impl<F: Copy> Closure<F> {
    /// Closure without a capture
    pub fn new(name: &str, call_fn: F) -> Self {
        Closure {
            name: name.to_string(),
            capture: None,
            call_fn,
        }
    }

    /// Closure owning `capture`
    pub fn with_capture<C: Any + Clone>(name: &str, capture: C, call_fn: F) -> Self {
        Closure {
            name: name.to_string(),
            capture: Some(Box::new(capture)),
            call_fn,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_capture(&self) -> bool {
        self.capture.is_some()
    }

    /// Borrow the capture as `C`, if present and of that type
    pub fn capture<C: Any>(&self) -> Option<&C> {
        self.capture.as_deref()?.as_any().downcast_ref::<C>()
    }

    /// The capture as handed to `call_fn`
    pub fn env(&self) -> Option<&dyn Any> {
        self.capture.as_deref().map(|c| c.as_any())
    }

    pub fn call_fn(&self) -> F {
        self.call_fn
    }

    /// Free the current capture and become a copy of `rhs`
    pub fn realloc(&mut self, rhs: &Self) {
        *self = rhs.clone();
    }
}

impl<F: Copy> Clone for Closure<F> {
    fn clone(&self) -> Self {
        Closure {
            name: self.name.clone(),
            capture: self.capture.as_deref().map(|c| c.clone_capture()),
            call_fn: self.call_fn,
        }
    }
}

impl<F: PartialEq> PartialEq for Closure<F> {
    fn eq(&self, other: &Self) -> bool {
        self.call_fn == other.call_fn
    }
}

impl<F> fmt::Debug for Closure<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.name)
            .field("has_capture", &self.capture.is_some())
            .finish()
    }
}

/// Closures are elements too; they render as their name
impl<F: Copy + PartialEq> Element for Closure<F> {
    fn to_text(&self) -> String {
        self.name.clone()
    }
}

impl<T> Closure<PredicateFn<T>> {
    pub fn call(&self, position: Position, element: &T) -> Result<bool, RuntimeError> {
        (self.call_fn)(self.env(), position, element)
    }
}

impl<T> Closure<VisitorFn<T>> {
    pub fn call(&self, position: Position, element: &T, index: i32) -> Result<(), RuntimeError> {
        (self.call_fn)(self.env(), position, element, index)
    }
}

impl<T> Closure<ComparatorFn<T>> {
    pub fn call(&self, position: Position, a: &T, b: &T) -> Result<i32, RuntimeError> {
        (self.call_fn)(self.env(), position, a, b)
    }
}

/// Read a capture of type `C` inside a call_fn
///
/// Fails with a positioned error when the closure was built without a
/// capture of that type.
pub fn expect_capture<'a, C: Any>(
    env: Option<&'a dyn Any>,
    position: Position,
) -> Result<&'a C, RuntimeError> {
    env.and_then(|env| env.downcast_ref::<C>()).ok_or_else(|| {
        RuntimeError::failure(
            position,
            format!("closure capture is not a {}", std::any::type_name::<C>()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_even(_: Option<&dyn Any>, _: Position, n: &i32) -> Result<bool, RuntimeError> {
        Ok(n % 2 == 0)
    }

    fn is_odd(_: Option<&dyn Any>, _: Position, n: &i32) -> Result<bool, RuntimeError> {
        Ok(n % 2 != 0)
    }

    fn above(env: Option<&dyn Any>, pos: Position, n: &i32) -> Result<bool, RuntimeError> {
        let limit = expect_capture::<i32>(env, pos)?;
        Ok(n > limit)
    }

    fn pos() -> Position {
        Position::new(1, 1)
    }

    #[test]
    fn test_call_without_capture() {
        let even = Predicate::new("isEven", is_even);
        assert!(!even.has_capture());
        assert_eq!(even.call(pos(), &4), Ok(true));
        assert_eq!(even.call(pos(), &3), Ok(false));
    }

    #[test]
    fn test_call_with_capture() {
        let gt2 = Predicate::with_capture("above", 2, above);
        assert!(gt2.has_capture());
        assert_eq!(gt2.capture::<i32>(), Some(&2));
        assert_eq!(gt2.call(pos(), &3), Ok(true));
        assert_eq!(gt2.call(pos(), &2), Ok(false));
    }

    #[test]
    fn test_missing_capture_fails_with_position() {
        let broken = Predicate::new("above", above);
        let err = broken.call(Position::new(4, 8), &1).unwrap_err();
        assert_eq!(err.position(), Position::new(4, 8));
    }

    #[test]
    fn test_equality_ignores_capture() {
        let a = Predicate::with_capture("above", 1, above);
        let b = Predicate::with_capture("other-name", 100, above);
        assert_eq!(a, b);
        assert_ne!(Predicate::new("isEven", is_even), Predicate::new("isOdd", is_odd));
    }

    #[test]
    fn test_copy_is_independent() {
        let original = Predicate::with_capture("oneOf", vec![1, 2, 3], |env, pos, n: &i32| {
            let items = expect_capture::<Vec<i32>>(env, pos)?;
            Ok(items.contains(n))
        });
        let copy = original.clone();
        drop(original);
        assert_eq!(copy.capture::<Vec<i32>>(), Some(&vec![1, 2, 3]));
        assert_eq!(copy.call(pos(), &2), Ok(true));
    }

    #[test]
    fn test_realloc() {
        let mut a = Predicate::new("isEven", is_even);
        let b = Predicate::with_capture("above", 5, above);
        a.realloc(&b);
        assert_eq!(a.name(), "above");
        assert_eq!(a.capture::<i32>(), Some(&5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_text_is_name() {
        let even = Predicate::new("isEven", is_even);
        assert_eq!(even.to_text(), "isEven");
        assert_eq!(format!("{:?}", even), "Closure { name: \"isEven\", has_capture: false }");
    }

    #[test]
    fn test_iterator_and_comparator_shapes() {
        fn record(env: Option<&dyn Any>, pos: Position, _: &i32, i: i32) -> Result<(), RuntimeError> {
            let stop = expect_capture::<i32>(env, pos)?;
            if i == *stop {
                return Err(RuntimeError::failure(pos, "stop"));
            }
            Ok(())
        }
        fn ascending(_: Option<&dyn Any>, _: Position, a: &i32, b: &i32) -> Result<i32, RuntimeError> {
            Ok(a - b)
        }

        let it = Visitor::with_capture("record", 1, record);
        assert_eq!(it.call(pos(), &0, 0), Ok(()));
        assert!(it.call(pos(), &0, 1).is_err());

        let cmp = Comparator::new("ascending", ascending);
        assert!(cmp.call(pos(), &1, &2).unwrap() < 0);
    }
}
