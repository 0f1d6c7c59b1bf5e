use std::{cell::RefCell, rc::Rc, vec::Vec};

mod any;
mod inplace;
mod variant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Event {
    Clone(u32),
    Drop(u32),
}

/// Shared log of clone and drop events.
#[derive(Clone, Default)]
struct Journal(Rc<RefCell<Vec<Event>>>);

impl Journal {
    fn new() -> Self {
        Journal::default()
    }

    fn tracked(&self, id: u32) -> Tracked {
        Tracked {
            id,
            journal: self.clone(),
        }
    }

    fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    fn count(&self, event: Event) -> usize {
        self.0.borrow().iter().filter(|e| **e == event).count()
    }
}

/// Value that records its clones and drops in a [`Journal`].
struct Tracked {
    id: u32,
    journal: Journal,
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        self.journal.0.borrow_mut().push(Event::Clone(self.id));
        Tracked {
            id: self.id,
            journal: self.journal.clone(),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.journal.0.borrow_mut().push(Event::Drop(self.id));
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl core::fmt::Debug for Tracked {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Tracked").field(&self.id).finish()
    }
}
