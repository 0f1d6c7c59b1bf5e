use std::{format, string::String};

use static_assertions::assert_not_impl_any;

use super::{Event, Journal, Tracked};
use crate::{any_cast, any_cast_mut, make_any, Error, FixedAny, TypeKey};

assert_not_impl_any!(FixedAny<16>: Send, Sync);

#[derive(Clone, Debug, PartialEq)]
struct Pair {
    first: i32,
    second: i32,
}

#[test]
fn test_empty() {
    let mut any = FixedAny::<32, 8>::new();
    assert!(!any.has_value());
    assert_eq!(any.type_id(), None);
    assert_eq!(any.type_name(), None);
    assert_eq!(any.downcast_ref::<u32>(), None);
    assert_eq!(any.downcast_mut::<u32>(), None);
    assert_eq!(any_cast::<u32, 32, 8>(Some(&any)), None);
    assert_eq!(any_cast_mut::<u32, 32, 8>(None), None);

    any.reset();
    assert!(!any.has_value());
}

#[test]
fn test_small_primitive() {
    let mut any = FixedAny::<16>::from_value(42u32);
    assert_eq!(any.is::<u32>(), true);
    assert_eq!(any.is::<u64>(), false);
    assert_eq!(any.downcast_ref::<u32>(), Some(&42));
    assert_eq!(any.downcast_ref::<u64>(), None);
    assert_eq!(any.downcast_mut::<u32>(), Some(&mut 42));
    assert_eq!(any.downcast_mut::<u64>(), None);
    assert_eq!(any.type_key(), Some(TypeKey::of::<u32>()));
}

#[test]
fn test_emplace_scenario() {
    let mut any = FixedAny::<32, 8>::new();
    any.emplace(4i32);
    assert_eq!(any_cast::<i32, 32, 8>(Some(&any)), Some(&4));

    any.emplace(Pair {
        first: 3,
        second: 4,
    });
    assert_eq!(any_cast::<Pair, 32, 8>(Some(&any)).map(|pair| pair.first), Some(3));
    assert_eq!(any_cast::<i32, 32, 8>(Some(&any)), None);
}

#[test]
fn test_reference_points_into_storage() {
    let mut any = FixedAny::<16>::new();
    let emplaced: *const u64 = any.emplace(7u64);

    let extracted: *const u64 = any.downcast_ref::<u64>().unwrap();
    assert_eq!(emplaced, extracted);
}

#[test]
fn test_alignment() {
    #[derive(Clone)]
    #[repr(align(64))]
    struct Aligned(u8);

    let any = FixedAny::<64, 64>::from_value(Aligned(1));
    let ptr: *const Aligned = any.downcast_ref::<Aligned>().unwrap();
    assert_eq!(ptr as usize % 64, 0);
    assert!(!FixedAny::<64, 32>::fits::<Aligned>());
}

#[test]
fn test_clone_round_trip() {
    let journal = Journal::new();
    let a = FixedAny::<32, 8>::from_value(journal.tracked(1));
    let b = a.clone();

    assert_eq!(journal.events(), [Event::Clone(1)]);
    assert_eq!(b.downcast_ref::<Tracked>().map(|t| t.id), Some(1));
    assert!(a.has_value());

    drop(a);
    drop(b);
    assert_eq!(journal.count(Event::Drop(1)), 2);
}

#[test]
fn test_clone_empty() {
    let a = FixedAny::<16>::new();
    let b = a.clone();
    assert!(!b.has_value());
}

#[test]
fn test_clone_from_replaces() {
    let journal = Journal::new();
    let source = FixedAny::<32, 8>::from_value(journal.tracked(1));
    let mut target = FixedAny::<32, 8>::from_value(journal.tracked(2));

    target.clone_from(&source);
    assert_eq!(journal.events(), [Event::Drop(2), Event::Clone(1)]);
    assert!(target.is::<Tracked>());
}

#[test]
fn test_take_leaves_source_empty() {
    let journal = Journal::new();
    let mut a = FixedAny::<32, 8>::from_value(journal.tracked(1));
    let b = a.take();

    assert!(!a.has_value());
    assert_eq!(b.downcast_ref::<Tracked>().map(|t| t.id), Some(1));
    assert!(journal.events().is_empty());

    drop(a);
    assert!(journal.events().is_empty());
    drop(b);
    assert_eq!(journal.events(), [Event::Drop(1)]);
}

#[test]
fn test_emplace_destroys_previous_first() {
    let journal = Journal::new();
    let mut any = FixedAny::<32, 8>::from_value(journal.tracked(1));

    let observer = journal.clone();
    any.emplace_with(|| {
        assert_eq!(observer.events(), [Event::Drop(1)]);
        7u8
    });

    assert_eq!(any.downcast_ref::<u8>(), Some(&7));
    assert_eq!(journal.events(), [Event::Drop(1)]);
}

#[test]
fn test_reset_is_idempotent() {
    let journal = Journal::new();
    let mut any = FixedAny::<32, 8>::from_value(journal.tracked(1));

    any.reset();
    any.reset();
    drop(any);

    assert_eq!(journal.events(), [Event::Drop(1)]);
}

#[test]
fn test_swap() {
    let mut x = FixedAny::<32>::new();
    let mut y = FixedAny::<32>::from_value(1u32);

    x.swap(&mut y);
    assert_eq!(x.downcast_ref::<u32>(), Some(&1));
    assert!(!y.has_value());

    y.set(String::from("two"));
    x.swap(&mut y);
    assert_eq!(x.downcast_ref::<String>().map(String::as_str), Some("two"));
    assert_eq!(y.downcast_ref::<u32>(), Some(&1));

    let mut a = FixedAny::<32>::new();
    let mut b = FixedAny::<32>::new();
    a.swap(&mut b);
    assert!(!a.has_value());
    assert!(!b.has_value());
}

#[test]
fn test_downcast_primitive() {
    let mut any = FixedAny::<16>::from_value(42u32);

    any = match any.downcast::<u64>() {
        Ok(_) => panic!("expected downcast to fail"),
        Err(any) => any,
    };

    match any.downcast::<u32>() {
        Ok(v) => assert_eq!(v, 42),
        Err(_) => panic!("expected downcast to succeed"),
    }
}

#[test]
fn test_take_value() {
    let journal = Journal::new();
    let mut any = FixedAny::<32, 8>::from_value(journal.tracked(3));

    assert!(any.take_value::<u32>().is_none());
    assert!(any.has_value());

    let tracked = any.take_value::<Tracked>().unwrap();
    assert!(!any.has_value());
    assert!(journal.events().is_empty());

    drop(tracked);
    drop(any);
    assert_eq!(journal.events(), [Event::Drop(3)]);
}

#[test]
fn test_try_cast() {
    let any = FixedAny::<16>::from_value(42u32);
    assert_eq!(any.try_cast::<u32>(), Ok(42));
    assert_eq!(
        any.try_cast::<u8>(),
        Err(Error::BadCast {
            requested: "u8",
            found: Some("u32"),
        })
    );

    let empty = FixedAny::<16>::new();
    let err = empty.try_cast::<u8>().unwrap_err();
    assert_eq!(
        err,
        Error::BadCast {
            requested: "u8",
            found: None,
        }
    );
    assert_eq!(format!("{err}"), "bad cast: requested `u8`, found `nothing`");
}

#[test]
fn test_unchecked() {
    let mut any = FixedAny::<16>::from_value(5i64);

    unsafe {
        assert_eq!(any.downcast_ref_unchecked::<i64>(), &5);
        *any.downcast_mut_unchecked::<i64>() = 6;
    }

    assert_eq!(any.downcast_ref::<i64>(), Some(&6));
}

#[test]
fn test_widen() {
    let journal = Journal::new();
    let small = FixedAny::<16, 8>::from_value(journal.tracked(1));
    let large: FixedAny<64, 16> = small.widen();

    assert!(journal.events().is_empty());
    assert_eq!(large.downcast_ref::<Tracked>().map(|t| t.id), Some(1));

    let copy: FixedAny<128, 16> = large.widen_clone();
    assert_eq!(journal.events(), [Event::Clone(1)]);
    assert!(large.has_value());
    assert!(copy.is::<Tracked>());

    let empty: FixedAny<32> = FixedAny::<8, 8>::new().widen();
    assert!(!empty.has_value());
}

#[test]
fn test_make_any() {
    let any = make_any::<[u16; 4], 8, 8>(|| [1, 2, 3, 4]);
    assert_eq!(any.downcast_ref::<[u16; 4]>(), Some(&[1, 2, 3, 4]));

    let any = FixedAny::<8, 8>::in_place(|| 9u8);
    assert_eq!(any.downcast_ref::<u8>(), Some(&9));
}

#[test]
fn test_debug() {
    let any = FixedAny::<16, 8>::from_value(1u16);
    let text = format!("{any:?}");
    assert!(text.contains("u16"), "{text}");
    assert!(text.contains("16"), "{text}");

    let empty = FixedAny::<16, 8>::new();
    assert!(format!("{empty:?}").contains("None"));
}

#[test]
fn test_not_send_sync_values() {
    let rc = std::rc::Rc::new(42u32);
    let any = FixedAny::<16>::from_value(rc.clone());

    assert_eq!(std::rc::Rc::strong_count(&rc), 2);
    drop(any);
    assert_eq!(std::rc::Rc::strong_count(&rc), 1);
}
