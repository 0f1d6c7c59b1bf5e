use std::{cell::Cell, format, string::String, vec::Vec};

use static_assertions::{assert_impl_all, assert_not_impl_any};

use super::{Event, Journal, Tracked};
use crate::{Error, Variant, Visitor, VisitorMut};

assert_impl_all!(Variant<(u8, String)>: Send, Sync, Clone);
assert_not_impl_any!(Variant<(u8, std::rc::Rc<u8>)>: Send, Sync);

#[derive(Clone, Debug, Default, PartialEq)]
struct A {
    name: &'static str,
}

#[test]
fn test_index_scenario() {
    let mut v = Variant::<(i32, A)>::new(1i32);
    assert_eq!(v.index(), 0);

    v.set(A::default());
    assert_eq!(v.index(), 1);
    assert!(v.get::<A, _>().is_ok());
    assert_eq!(v.get_at::<1>(), Ok(&A::default()));
}

#[test]
fn test_default() {
    let v = Variant::<(i32, A)>::default();
    assert_eq!(v.index(), 0);
    assert_eq!(v.get_if::<i32, _>(), Some(&0));
}

#[test]
fn test_set_destroys_previous() {
    let journal = Journal::new();
    let mut v = Variant::<(Tracked, u64)>::new(journal.tracked(1));

    v.set(5u64);
    assert_eq!(journal.events(), [Event::Drop(1)]);
    assert_eq!(v.get_if::<u64, _>(), Some(&5));

    v.set(journal.tracked(2));
    v.set_at::<0>(journal.tracked(3));
    assert_eq!(journal.events(), [Event::Drop(1), Event::Drop(2)]);

    drop(v);
    assert_eq!(journal.count(Event::Drop(3)), 1);
}

#[test]
fn test_get_if() {
    let mut v = Variant::<(u8, String)>::new(String::from("text"));

    assert_eq!(v.get_if::<u8, _>(), None);
    assert_eq!(v.get_if::<String, _>().map(String::as_str), Some("text"));
    assert_eq!(v.get_if_at::<0>(), None);
    assert!(v.get_if_at::<1>().is_some());

    v.get_if_mut::<String, _>().unwrap().push('!');
    v.get_if_at_mut::<1>().unwrap().push('?');
    assert_eq!(v.get_if_mut::<u8, _>(), None);
    assert_eq!(v.get_if_at_mut::<0>(), None);
    assert_eq!(v.get::<String, _>().map(String::as_str), Ok("text!?"));
}

#[test]
fn test_get_reports_active() {
    let mut v = Variant::<(u8, u16, u32)>::new(3u32);

    assert_eq!(
        v.get::<u8, _>(),
        Err(Error::WrongAlternative {
            requested: 0,
            active: 2,
        })
    );
    assert_eq!(
        v.get_at_mut::<1>(),
        Err(Error::WrongAlternative {
            requested: 1,
            active: 2,
        })
    );

    *v.get_mut::<u32, _>().unwrap() += 1;
    assert_eq!(v.get_at::<2>(), Ok(&4));
}

#[test]
fn test_repeated_types_by_index() {
    let mut v = Variant::<(u8, u8)>::new_at::<0>(1);
    assert_eq!(v.index(), 0);

    v.set_at::<1>(2);
    assert_eq!(v.index(), 1);
    assert_eq!(v.get_if_at::<0>(), None);
    assert_eq!(v.get_at::<1>(), Ok(&2));
}

#[test]
fn test_holds_and_type_name() {
    let v = Variant::<(u8, char)>::new('x');
    assert!(v.holds::<char, _>());
    assert!(!v.holds::<u8, _>());
    assert_eq!(v.type_name(), "char");
}

#[test]
fn test_into() {
    let journal = Journal::new();
    let v = Variant::<(u8, Tracked)>::new(journal.tracked(1));

    let v = match v.into_inner::<u8, _>() {
        Ok(_) => panic!("expected into_inner to fail"),
        Err(v) => v,
    };

    let v = match v.into_at::<0>() {
        Ok(_) => panic!("expected into_at to fail"),
        Err(v) => v,
    };

    let tracked = match v.into_at::<1>() {
        Ok(tracked) => tracked,
        Err(_) => panic!("expected into_at to succeed"),
    };

    assert_eq!(tracked.id, 1);
    assert!(journal.events().is_empty());
}

#[test]
fn test_clone_eq_debug() {
    let journal = Journal::new();
    let v = Variant::<(u8, Tracked)>::new(journal.tracked(4));
    let w = v.clone();

    assert_eq!(journal.events(), [Event::Clone(4)]);
    assert_eq!(v, w);
    assert_ne!(v, Variant::new(4u8));

    let text = format!("{v:?}");
    assert_eq!(text, "Variant { index: 1, value: Tracked(4) }");
}

#[test]
fn test_eq_compares_values() {
    let a = Variant::<(u8, u16)>::new(1u16);
    let b = Variant::<(u8, u16)>::new(2u16);
    let c = Variant::<(u8, u16)>::new(1u16);

    assert_ne!(a, b);
    assert_eq!(a, c);
}

/// Records which alternative it was called with.
struct Recorder<'a> {
    calls: &'a Cell<usize>,
    seen: &'a Cell<Option<usize>>,
}

impl Recorder<'_> {
    fn record(self, index: usize) -> usize {
        self.calls.set(self.calls.get() + 1);
        self.seen.set(Some(index));
        index
    }
}

impl Visitor<u8> for Recorder<'_> {
    type Output = usize;

    fn visit(self, _: &u8) -> usize {
        self.record(0)
    }
}

impl Visitor<String> for Recorder<'_> {
    type Output = usize;

    fn visit(self, _: &String) -> usize {
        self.record(1)
    }
}

impl Visitor<f64> for Recorder<'_> {
    type Output = usize;

    fn visit(self, _: &f64) -> usize {
        self.record(2)
    }
}

#[test]
fn test_visit_once_per_index() {
    let values: Vec<Variant<(u8, String, f64)>> = Vec::from([
        Variant::new(1u8),
        Variant::new(String::from("one")),
        Variant::new(1.0f64),
    ]);

    for (index, value) in values.iter().enumerate() {
        let calls = Cell::new(0);
        let seen = Cell::new(None);

        let result = value.visit(Recorder {
            calls: &calls,
            seen: &seen,
        });

        assert_eq!(result, index);
        assert_eq!(calls.get(), 1);
        assert_eq!(seen.get(), Some(value.index()));
    }
}

struct Describe;

impl<T> Visitor<T> for Describe
where
    T: core::fmt::Debug,
{
    type Output = String;

    fn visit(self, value: &T) -> String {
        format!("{value:?}")
    }
}

#[test]
fn test_visit_generic() {
    let v = Variant::<(u8, &'static str, Option<i8>)>::new(Some(-1i8));
    assert_eq!(v.visit(Describe), "Some(-1)");
}

struct Reset;

impl VisitorMut<u32> for Reset {
    type Output = bool;

    fn visit_mut(self, value: &mut u32) -> bool {
        *value = 0;
        true
    }
}

impl VisitorMut<String> for Reset {
    type Output = bool;

    fn visit_mut(self, value: &mut String) -> bool {
        value.clear();
        false
    }
}

#[test]
fn test_visit_mut() {
    let mut v = Variant::<(u32, String)>::new(String::from("full"));
    assert!(!v.visit_mut(Reset));
    assert_eq!(v.get_if::<String, _>().map(String::len), Some(0));

    v.set(7u32);
    assert!(v.visit_mut(Reset));
    assert_eq!(v.get_if::<u32, _>(), Some(&0));
}

struct Numeric;

impl Visitor<u8> for Numeric {
    type Output = u8;

    fn visit(self, value: &u8) -> u8 {
        *value
    }
}

impl Visitor<i16> for Numeric {
    type Output = i16;

    fn visit(self, value: &i16) -> i16 {
        *value
    }
}

#[test]
fn test_visit_into() {
    let v = Variant::<(u8, i16)>::new(-3i16);
    assert_eq!(v.visit_into::<i64, _>(Numeric), -3);

    let v = Variant::<(u8, i16)>::new(200u8);
    assert_eq!(v.visit_into::<i64, _>(Numeric), 200);
}

#[test]
fn test_eight_alternatives() {
    type Wide = Variant<(u8, u16, u32, u64, i8, i16, i32, i64)>;

    let v = Wide::new(-7i64);
    assert_eq!(v.index(), 7);
    assert_eq!(v.get_at::<7>(), Ok(&-7));
    assert_eq!(v.visit(Describe), "-7");

    let v = Wide::new_at::<4>(-1);
    assert_eq!(v.type_name(), "i8");
}

/// Looks the value up in a borrowed list of labels.
struct Label<'a> {
    labels: &'a [String],
}

impl<'a> Visitor<u8> for Label<'a> {
    type Output = &'a str;

    fn visit(self, value: &u8) -> &'a str {
        &self.labels[usize::from(*value)]
    }
}

impl<'a> Visitor<char> for Label<'a> {
    type Output = &'a str;

    fn visit(self, _: &char) -> &'a str {
        &self.labels[0]
    }
}

/// Records every value it sees into a borrowed log.
struct Collect<'a> {
    log: &'a mut Vec<String>,
}

impl VisitorMut<u8> for Collect<'_> {
    type Output = usize;

    fn visit_mut(self, value: &mut u8) -> usize {
        *value += 1;
        self.log.push(format!("{value}"));
        self.log.len()
    }
}

impl VisitorMut<char> for Collect<'_> {
    type Output = usize;

    fn visit_mut(self, value: &mut char) -> usize {
        self.log.push(format!("{value}"));
        self.log.len()
    }
}

#[test]
fn test_visit_borrowing_visitor() {
    let labels = Vec::from([String::from("zero"), String::from("one")]);

    let v = Variant::<(u8, char)>::new(1u8);
    let label = v.visit(Label { labels: &labels });
    assert_eq!(label, "one");

    let v = Variant::<(u8, char)>::new('c');
    let label: &str = v.visit_into(Label { labels: &labels });
    assert_eq!(label, "zero");

    let mut log = Vec::new();
    let mut v = Variant::<(u8, char)>::new(4u8);
    assert_eq!(v.visit_mut(Collect { log: &mut log }), 1);

    v.set('x');
    assert_eq!(v.visit_mut(Collect { log: &mut log }), 2);
    assert_eq!(log, ["5", "x"]);
}
