//! Ordered listener lists keyed by event name.
//!
//! Plain bookkeeping: no locking, no native forwarding, no logging. The
//! emitter owns one of these behind a mutex and never calls out to user
//! code while holding it.

use std::collections::HashMap;

use crate::listener::Listener;

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    lists: HashMap<String, Vec<Listener>>,
    /// Cap in force when each list last logged its overflow warning.
    warned: HashMap<String, usize>,
}

impl ListenerRegistry {
    /// Append and return the new length of the list for `name`.
    pub fn add(&mut self, name: &str, listener: Listener) -> usize {
        let list = self.lists.entry(name.to_string()).or_default();
        list.push(listener);
        list.len()
    }

    /// Remove the first occurrence of `listener`. Returns whether one was
    /// found.
    pub fn remove_one(&mut self, name: &str, listener: &Listener) -> bool {
        let Some(list) = self.lists.get_mut(name) else {
            return false;
        };
        let Some(index) = list.iter().position(|it| it.ptr_eq(listener)) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            self.lists.remove(name);
            self.warned.remove(name);
        }
        true
    }

    pub fn remove_name(&mut self, name: &str) -> Vec<Listener> {
        self.warned.remove(name);
        self.lists.remove(name).unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.lists.clear();
        self.warned.clear();
    }

    /// Whether a list that just grew to `count` should log an overflow
    /// warning under `max`. True on the add that crosses the cap, and once
    /// more whenever the list is already over a cap it has not warned about.
    pub fn needs_overflow_warning(&mut self, name: &str, count: usize, max: usize) -> bool {
        if count <= max {
            return false;
        }
        let crossed = count - 1 <= max;
        if !crossed && self.warned.get(name) == Some(&max) {
            return false;
        }
        self.warned.insert(name.to_string(), max);
        true
    }

    /// Copy of the list for `name`, empty if nothing is registered.
    pub fn snapshot(&self, name: &str) -> Vec<Listener> {
        self.lists.get(name).cloned().unwrap_or_default()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lists.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn count(&self, name: &str) -> usize {
        self.lists.get(name).map_or(0, Vec::len)
    }
}
