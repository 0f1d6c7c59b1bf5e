use std::{format, string::String};

use static_assertions::assert_not_impl_any;

use super::{Event, Journal, Tracked};
use crate::{Error, InplaceAny, TypeKey};

assert_not_impl_any!(InplaceAny<16>: Send, Sync);

#[test]
fn test_empty() {
    let mut any = InplaceAny::<16>::new();
    assert!(!any.is_valid());
    assert_eq!(any.type_key(), None);
    assert_eq!(any.downcast_ref::<u8>(), None);
    assert_eq!(
        any.cast_mut::<u8>(),
        Err(Error::BadCast {
            requested: "u8",
            found: None,
        })
    );

    any.reset();
    assert!(!any.is_valid());
}

#[test]
fn test_round_trip() {
    let mut any = InplaceAny::<32, 8>::new();
    *any.emplace(4i32) += 1;
    assert_eq!(any.downcast_ref::<i32>(), Some(&5));
    assert_eq!(any.type_key(), Some(TypeKey::of::<i32>()));
    assert!(any.is::<i32>());

    any.set(String::from("held"));
    assert_eq!(any.cast_ref::<String>().map(String::as_str), Ok("held"));
    assert_eq!(
        any.cast_ref::<i32>(),
        Err(Error::BadCast {
            requested: "i32",
            found: Some("alloc::string::String"),
        })
    );
}

#[test]
fn test_virtual_drop() {
    let journal = Journal::new();
    let mut any = InplaceAny::<32, 8>::from_value(journal.tracked(1));

    any.emplace(journal.tracked(2));
    assert_eq!(journal.events(), [Event::Drop(1)]);

    any.reset();
    any.reset();
    assert_eq!(journal.events(), [Event::Drop(1), Event::Drop(2)]);
}

#[test]
fn test_clone() {
    let journal = Journal::new();
    let a = InplaceAny::<32, 8>::from_value(journal.tracked(1));
    let b = a.clone();

    assert_eq!(journal.events(), [Event::Clone(1)]);
    assert_eq!(b.downcast_ref::<Tracked>().map(|t| t.id), Some(1));

    let mut c = InplaceAny::<32, 8>::from_value(journal.tracked(2));
    c.clone_from(&a);
    assert_eq!(
        journal.events(),
        [Event::Clone(1), Event::Drop(2), Event::Clone(1)]
    );
}

#[test]
fn test_take_and_swap() {
    let journal = Journal::new();
    let mut a = InplaceAny::<32, 8>::from_value(journal.tracked(1));
    let mut b = a.take();

    assert!(!a.is_valid());
    assert!(b.is::<Tracked>());

    a.swap(&mut b);
    assert!(a.is::<Tracked>());
    assert!(!b.is_valid());
    assert!(journal.events().is_empty());
}

#[test]
fn test_take_value() {
    let mut any = InplaceAny::<16>::from_value(9u64);
    assert_eq!(any.take_value::<u32>(), None);
    assert_eq!(any.take_value::<u64>(), Some(9));
    assert!(!any.is_valid());
}

#[test]
fn test_widen() {
    let journal = Journal::new();
    let small = InplaceAny::<16, 8>::from_value(journal.tracked(1));
    let large: InplaceAny<64, 16> = small.widen();

    assert!(journal.events().is_empty());
    assert_eq!(large.cast_ref::<Tracked>().map(|t| t.id), Ok(1));

    let copy: InplaceAny<64, 16> = large.widen_clone();
    assert_eq!(journal.events(), [Event::Clone(1)]);
    assert!(large.is_valid());
    assert!(copy.is_valid());
}

#[test]
fn test_debug() {
    let any = InplaceAny::<16>::from_value(1u8);
    let text = format!("{any:?}");
    assert!(text.contains("TypeKey(\"u8\")"), "{text}");
}
