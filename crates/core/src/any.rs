//! Type-erased element values
//!
//! `AnyValue` lets generated code store values of mixed types in one
//! container. Each value carries a numeric type tag assigned by the compiler
//! plus a boxed payload that knows how to copy, compare and render itself.
//! An `AnyValue` with no payload is the empty value.

use crate::element::Element;
use std::any::Any;
use std::fmt;

/// Object-safe view of an `Element`
trait AnyPayload: Any {
    fn clone_box(&self) -> Box<dyn AnyPayload>;
    fn eq_dyn(&self, other: &dyn AnyPayload) -> bool;
    fn text(&self) -> String;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Element + Any> AnyPayload for T {
    fn clone_box(&self) -> Box<dyn AnyPayload> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn AnyPayload) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn text(&self) -> String {
        self.to_text()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A tagged, type-erased element
#[derive(Default)]
pub struct AnyValue {
    tag: u32,
    payload: Option<Box<dyn AnyPayload>>,
}

impl AnyValue {
    pub fn new<T: Element + Any>(tag: u32, value: T) -> Self {
        AnyValue {
            tag,
            payload: Some(Box::new(value)),
        }
    }

    /// The empty value (tag 0, no payload)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.as_ref()?.as_any().downcast_ref::<T>()
    }
}

impl Clone for AnyValue {
    fn clone(&self) -> Self {
        AnyValue {
            tag: self.tag,
            payload: self.payload.as_ref().map(|p| p.clone_box()),
        }
    }
}

impl PartialEq for AnyValue {
    fn eq(&self, other: &Self) -> bool {
        if self.tag != other.tag {
            return false;
        }
        match (&self.payload, &other.payload) {
            (None, None) => true,
            (Some(lhs), Some(rhs)) => lhs.eq_dyn(rhs.as_ref()),
            _ => false,
        }
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyValue")
            .field("tag", &self.tag)
            .field("text", &self.to_text())
            .finish()
    }
}

impl Element for AnyValue {
    fn to_text(&self) -> String {
        match &self.payload {
            Some(payload) => payload.text(),
            None => "any".to_string(),
        }
    }
}
