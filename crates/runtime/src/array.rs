//! Generic array container
//!
//! `Array<T>` is the dynamic array every generated program uses. It owns its
//! elements: copies going in (`alloc`, `push`, `merge`) clone, elements going
//! out by `pop` move, and `remove`/`clear`/drop free them, recursively for
//! nested arrays and strings.
//!
//! Indexed operations take a source position and follow the shared index
//! rule in `strata_core::index` (negative indices count from the end).
//! Higher-order operations take the call-site position and hand it to the
//! callback, so a failure signalled by the callback points at the user's
//! `filter`/`forEach`/`sort` call.
//!
//! # Examples
//!
//! ```
//! use strata_runtime::Array;
//! use strata_core::Position;
//!
//! let pos = Position::new(1, 1);
//! let mut numbers = Array::alloc(&[3, 1, 2]);
//! numbers.sort(pos, |_, a, b| Ok(a - b)).unwrap();
//! assert_eq!(numbers.to_string(), "[1, 2, 3]");
//! assert_eq!(*numbers.at(pos, -1).unwrap(), 3);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use strata_core::{
    Element, EmptyAccess, Position, RuntimeError, resolve_index, resolve_slice,
};

/// Separator used by `join` when none is given
pub const DEFAULT_JOIN_SEPARATOR: &str = ",";

/// Contiguous, growable, owning sequence of `T`
///
/// An empty array holds no storage; empty and unallocated are the same state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Array<T> {
    data: Vec<T>,
}

impl<T> Array<T> {
    pub fn new() -> Self {
        Array { data: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `empty` in the generated code's vocabulary
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Element at `index`, negative counting from the end
    pub fn at(&self, position: Position, index: i32) -> Result<&T, RuntimeError> {
        match resolve_index(index, self.data.len()) {
            Some(i) => Ok(&self.data[i]),
            None => Err(RuntimeError::OutOfBounds { position, index }),
        }
    }

    pub fn at_mut(&mut self, position: Position, index: i32) -> Result<&mut T, RuntimeError> {
        match resolve_index(index, self.data.len()) {
            Some(i) => Ok(&mut self.data[i]),
            None => Err(RuntimeError::OutOfBounds { position, index }),
        }
    }

    pub fn first(&self, position: Position) -> Result<&T, RuntimeError> {
        self.data.first().ok_or(RuntimeError::EmptyCollection {
            position,
            access: EmptyAccess::First,
        })
    }

    pub fn first_mut(&mut self, position: Position) -> Result<&mut T, RuntimeError> {
        self.data.first_mut().ok_or(RuntimeError::EmptyCollection {
            position,
            access: EmptyAccess::First,
        })
    }

    pub fn last(&self, position: Position) -> Result<&T, RuntimeError> {
        self.data.last().ok_or(RuntimeError::EmptyCollection {
            position,
            access: EmptyAccess::Last,
        })
    }

    pub fn last_mut(&mut self, position: Position) -> Result<&mut T, RuntimeError> {
        self.data.last_mut().ok_or(RuntimeError::EmptyCollection {
            position,
            access: EmptyAccess::Last,
        })
    }

    /// Move the last element out to the caller
    ///
    /// Popping an empty array is a runtime error rather than a silent
    /// precondition violation.
    pub fn pop(&mut self, position: Position) -> Result<T, RuntimeError> {
        self.data.pop().ok_or(RuntimeError::EmptyCollection {
            position,
            access: EmptyAccess::Pop,
        })
    }

    /// Append an element, taking ownership (no copy)
    pub fn push_owned(&mut self, element: T) {
        self.data.push(element);
    }

    /// Free the element at `index` and close the gap, preserving order
    pub fn remove(&mut self, position: Position, index: i32) -> Result<&mut Self, RuntimeError> {
        match resolve_index(index, self.data.len()) {
            Some(i) => {
                drop(self.data.remove(i));
                Ok(self)
            }
            None => Err(RuntimeError::OutOfBounds { position, index }),
        }
    }

    /// Free every element and return to the empty state
    pub fn clear(&mut self) -> &mut Self {
        // Release storage too, so a cleared array is indistinguishable from a new one
        self.data = Vec::new();
        self
    }

    /// Call `iterator` with (position, element, index) for each element in order
    ///
    /// The first failure aborts the traversal; later elements are not visited.
    /// Indices are `i32`, so elements past `i32::MAX` fail instead of being
    /// visited with a wrapped index.
    pub fn for_each<F>(&self, position: Position, mut iterator: F) -> Result<(), RuntimeError>
    where
        F: FnMut(Position, &T, i32) -> Result<(), RuntimeError>,
    {
        for (i, element) in self.data.iter().enumerate() {
            iterator(position, element, callback_index(position, i)?)?;
        }
        Ok(())
    }

    /// Bubble sort driven by a three-way comparator
    ///
    /// Adjacent pairs are swapped when `comparator(a, b) > 0`; full passes
    /// repeat until one makes no swap. This is O(n²), which suits the small
    /// arrays generated code builds. Elements comparing equal are never
    /// swapped, so the sort is stable, and an already sorted array costs one
    /// pass of `len - 1` comparisons.
    ///
    /// A comparator failure aborts the sort, leaving the array in whatever
    /// partially sorted order it had reached (every element still present).
    pub fn sort<F>(&mut self, position: Position, mut comparator: F) -> Result<&mut Self, RuntimeError>
    where
        F: FnMut(Position, &T, &T) -> Result<i32, RuntimeError>,
    {
        if self.data.len() <= 1 {
            return Ok(self);
        }
        loop {
            let mut swapped = false;
            for i in 1..self.data.len() {
                if comparator(position, &self.data[i - 1], &self.data[i])? > 0 {
                    self.data.swap(i - 1, i);
                    swapped = true;
                }
            }
            if !swapped {
                return Ok(self);
            }
        }
    }
}

fn callback_index(position: Position, index: usize) -> Result<i32, RuntimeError> {
    i32::try_from(index).map_err(|_| {
        RuntimeError::failure(position, format!("index {} exceeds the i32 index range", index))
    })
}

impl<T: Clone> Array<T> {
    /// Build an array holding copies of `elements`
    pub fn alloc(elements: &[T]) -> Self {
        Array {
            data: elements.to_vec(),
        }
    }

    /// Append copies of `elements`
    pub fn push(&mut self, elements: &[T]) {
        self.data.extend_from_slice(elements);
    }

    /// Copies of the half-open range `[start, end)`; never fails
    pub fn slice(&self, start: Option<i32>, end: Option<i32>) -> Self {
        match resolve_slice(start, end, self.data.len()) {
            Some(range) => Array {
                data: self.data[range].to_vec(),
            },
            None => Array::new(),
        }
    }

    /// New array: copies of `self` followed by copies of `other`
    pub fn concat(&self, other: &Array<T>) -> Self {
        let mut data = Vec::with_capacity(self.data.len() + other.data.len());
        data.extend_from_slice(&self.data);
        data.extend_from_slice(&other.data);
        Array { data }
    }

    /// Append copies of `other` in place
    pub fn merge(&mut self, other: &Array<T>) -> &mut Self {
        self.data.extend_from_slice(&other.data);
        self
    }

    /// New array with copies in reverse order
    pub fn reverse(&self) -> Self {
        Array {
            data: self.data.iter().rev().cloned().collect(),
        }
    }

    /// Free the current contents and become a copy of `rhs`
    pub fn realloc(&mut self, rhs: &Array<T>) -> &mut Self {
        self.data.clone_from(&rhs.data);
        self
    }

    /// Copies of the elements for which `predicate` returns true, in order
    ///
    /// A predicate failure aborts the filter; no partial result is returned.
    pub fn filter<F>(&self, position: Position, mut predicate: F) -> Result<Self, RuntimeError>
    where
        F: FnMut(Position, &T) -> Result<bool, RuntimeError>,
    {
        let mut data = Vec::new();
        for element in &self.data {
            if predicate(position, element)? {
                data.push(element.clone());
            }
        }
        Ok(Array { data })
    }
}

impl<T: PartialEq> Array<T> {
    /// Linear scan; stops at the first equal element
    pub fn contains(&self, value: &T) -> bool {
        self.data.iter().any(|element| element == value)
    }
}

impl<T: Element> Array<T> {
    /// Element texts joined by `separator` (`,` when omitted)
    pub fn join(&self, separator: Option<&str>) -> String {
        let separator = separator.unwrap_or(DEFAULT_JOIN_SEPARATOR);
        let mut result = String::new();
        for (i, element) in self.data.iter().enumerate() {
            if i != 0 {
                result.push_str(separator);
            }
            result.push_str(&element.to_text());
        }
        result
    }
}

/// Renders as `[e0, e1, ...]`
impl<T: Element> fmt::Display for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, element) in self.data.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", element.to_text())?;
        }
        write!(f, "]")
    }
}

/// Arrays nest: `Array<Array<T>>` is a valid array
impl<T: Element> Element for Array<T> {
    fn to_text(&self) -> String {
        self.to_string()
    }
}

impl<T> From<Vec<T>> for Array<T> {
    fn from(data: Vec<T>) -> Self {
        Array { data }
    }
}

impl<T> FromIterator<T> for Array<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Array {
            data: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for Array<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Array<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
