//! Integration tests for the generic array
//!
//! These exercise the array through its public API the way generated code
//! uses it, including the documented behaviour on edge cases.

use std::cell::Cell;
use strata_runtime::{Array, EmptyAccess, Position, RuntimeError};

fn pos() -> Position {
    Position::new(3, 14)
}

fn ascending(_: Position, a: &i32, b: &i32) -> Result<i32, RuntimeError> {
    Ok(a - b)
}

#[test]
fn test_concrete_scenarios() {
    let mut sorted = Array::alloc(&[3, 1, 2]);
    sorted.sort(pos(), ascending).unwrap();
    assert_eq!(sorted, Array::alloc(&[1, 2, 3]));

    let mut removed = Array::alloc(&[1, 2, 3]);
    removed.remove(pos(), 1).unwrap();
    assert_eq!(removed, Array::alloc(&[1, 3]));

    assert_eq!(
        Array::alloc(&[1, 2, 3, 4]).slice(Some(-2), None),
        Array::alloc(&[3, 4])
    );

    let words = Array::alloc(&["a".to_string(), "b".to_string()]);
    assert_eq!(words.join(Some("-")), "a-b");

    let numbers = Array::alloc(&[1, 2, 3]);
    assert_eq!(numbers.at(pos(), -1), Ok(&3));
    assert_eq!(
        numbers.at(pos(), 3),
        Err(RuntimeError::OutOfBounds {
            position: pos(),
            index: 3
        })
    );
}

#[test]
fn test_copy_isolation() {
    let original = Array::alloc(&[vec![1], vec![2, 3]].map(Array::from));
    let mut copy = original.clone();
    assert_eq!(copy, original);

    copy.at_mut(pos(), 0).unwrap().push(&[99]);
    copy.push_owned(Array::new());
    assert_eq!(original.to_string(), "[[1], [2, 3]]");
    assert_eq!(copy.to_string(), "[[1, 99], [2, 3], []]");
}

#[test]
fn test_free_then_alloc_reproduces() {
    let source = [4i64, 5, 6];
    let first = Array::alloc(&source);
    let snapshot = first.clone();
    drop(first);
    assert_eq!(Array::alloc(&source), snapshot);
}

#[test]
fn test_negative_index_equivalence() {
    let a = Array::alloc(&[10, 20, 30, 40]);
    let len = a.len() as i32;
    for i in 0..len {
        let direct = a.at(pos(), i).unwrap();
        let from_end = a.at(pos(), i - len).unwrap();
        assert!(std::ptr::eq(direct, from_end));
    }
    assert!(a.at(pos(), len).is_err());
    assert!(a.at(pos(), -len - 1).is_err());
}

#[test]
fn test_slice_never_fails() {
    let a = Array::alloc(&[1, 2, 3]);
    assert!(a.slice(Some(3), None).is_empty());
    assert!(a.slice(Some(50), Some(60)).is_empty());
    assert!(a.slice(Some(2), Some(1)).is_empty());
    assert!(a.slice(Some(-1), Some(-2)).is_empty());
    assert_eq!(a.slice(None, None), a);
    assert!(Array::<i32>::new().slice(None, None).is_empty());
}

#[test]
fn test_concat_layout() {
    let a = Array::alloc(&[1, 2]);
    let b = Array::alloc(&[7, 8, 9]);
    let c = a.concat(&b);
    assert_eq!(c.len(), a.len() + b.len());
    for k in 0..c.len() as i32 {
        let expected = if (k as usize) < a.len() {
            a.at(pos(), k).unwrap()
        } else {
            b.at(pos(), k - a.len() as i32).unwrap()
        };
        assert_eq!(c.at(pos(), k).unwrap(), expected);
    }
}

#[test]
fn test_sort_is_idempotent() {
    let mut a = Array::alloc(&[5, 3, 9, 1, 1, 7]);
    a.sort(pos(), ascending).unwrap();
    let once = a.clone();

    let comparisons = Cell::new(0);
    let swaps_needed = Cell::new(0);
    a.sort(pos(), |p, x, y| {
        comparisons.set(comparisons.get() + 1);
        let order = ascending(p, x, y)?;
        if order > 0 {
            swaps_needed.set(swaps_needed.get() + 1);
        }
        Ok(order)
    })
    .unwrap();

    assert_eq!(a, once);
    assert_eq!(swaps_needed.get(), 0);
    assert_eq!(comparisons.get(), a.len() - 1);
}

#[test]
fn test_filter_all_and_none() {
    let a = Array::alloc(&[1.5, -2.0, 3.25]);
    assert_eq!(a.filter(pos(), |_, _| Ok(true)).unwrap(), a.clone());
    assert!(a.filter(pos(), |_, _| Ok(false)).unwrap().is_empty());
}

#[test]
fn test_for_each_failure_aborts_with_call_position() {
    let a = Array::alloc(&[0, 1, 2, 3, 4]);
    let call_site = Position::new(21, 7);
    let mut visited = Vec::new();

    let err = a
        .for_each(call_site, |p, _, i| {
            visited.push(i);
            if i == 2 {
                return Err(RuntimeError::failure(p, "stop at two"));
            }
            Ok(())
        })
        .unwrap_err();

    assert_eq!(visited, vec![0, 1, 2]);
    assert_eq!(err.position(), call_site);
    assert_eq!(err.to_string(), "stop at two");
}

#[test]
fn test_empty_access_errors() {
    let mut empty: Array<bool> = Array::new();
    assert_eq!(
        empty.first(pos()),
        Err(RuntimeError::EmptyCollection {
            position: pos(),
            access: EmptyAccess::First
        })
    );
    assert!(empty.last(pos()).is_err());
    assert_eq!(
        empty.pop(pos()).unwrap_err().to_string(),
        "tried popping from empty array"
    );
}

#[test]
fn test_reverse_and_join_defaults() {
    let a = Array::alloc(&[1, 2, 3]);
    assert_eq!(a.reverse().join(None), "3,2,1");
    assert_eq!(a.join(None), "1,2,3");
    assert_eq!(Array::<i32>::new().to_string(), "[]");
}
