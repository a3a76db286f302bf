//! Lexical environments: a chain of frames from the innermost scope up to
//! the shared root.
//!
//! Each frame holds two disjoint namespaces — value bindings and macro
//! bindings — as persistent maps, so cloning a frame for closure capture
//! is a structural share rather than a copy. Lookups walk the parent
//! chain; definitions always land in the frame they are issued against.

use std::cell::RefCell;
use std::rc::Rc;

use im::HashMap;

use crate::primitives;
use crate::value::Value;

#[derive(Debug, Default)]
struct Frame {
    values: HashMap<String, Value>,
    macros: HashMap<String, Value>,
    parent: Option<Env>,
}

/// A handle to one frame in the chain. Cloning the handle aliases the
/// frame; `child` creates a new frame that falls back to this one.
#[derive(Debug, Clone)]
pub struct Env(Rc<RefCell<Frame>>);

impl Env {
    /// A fresh root frame seeded with every primitive. The root is the
    /// target of `set*` and `setm*`.
    pub fn new_root() -> Env {
        let env = Env(Rc::new(RefCell::new(Frame::default())));
        primitives::install(&env);
        // Predicates answer with this atom, so it must resolve to itself.
        env.define_value("true", Value::atom("true"));
        env
    }

    /// An empty frame whose lookups fall back to `self`.
    pub fn child(&self) -> Env {
        Env(Rc::new(RefCell::new(Frame {
            values: HashMap::new(),
            macros: HashMap::new(),
            parent: Some(self.clone()),
        })))
    }

    /// The top of the parent chain.
    pub fn root(&self) -> Env {
        let mut current = self.clone();
        loop {
            let parent = current.0.borrow().parent.clone();
            match parent {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }

    pub fn lookup_value(&self, name: &str) -> Option<Value> {
        let mut current = self.clone();
        loop {
            let (found, parent) = {
                let frame = current.0.borrow();
                (frame.values.get(name).cloned(), frame.parent.clone())
            };
            if found.is_some() {
                return found;
            }
            current = parent?;
        }
    }

    pub fn lookup_macro(&self, name: &str) -> Option<Value> {
        let mut current = self.clone();
        loop {
            let (found, parent) = {
                let frame = current.0.borrow();
                (frame.macros.get(name).cloned(), frame.parent.clone())
            };
            if found.is_some() {
                return found;
            }
            current = parent?;
        }
    }

    /// Binds `name` in this frame, shadowing any outer binding.
    pub fn define_value(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().values.insert(name.into(), value);
    }

    /// Binds `name` in this frame's macro namespace.
    pub fn define_macro(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().macros.insert(name.into(), value);
    }

    /// Replaces the nearest existing binding of `name`. Returns `false`
    /// when no frame in the chain binds it.
    pub fn set_value(&self, name: &str, value: Value) -> bool {
        let mut current = self.clone();
        loop {
            let parent = {
                let mut frame = current.0.borrow_mut();
                if frame.values.contains_key(name) {
                    frame.values.insert(name.to_string(), value);
                    return true;
                }
                frame.parent.clone()
            };
            match parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_frames_shadow_and_fall_back() {
        let root = Env::new_root();
        root.define_value("x", Value::num(1));

        let inner = root.child();
        assert_eq!(inner.lookup_value("x").unwrap().as_num(), Some(1));

        inner.define_value("x", Value::num(2));
        assert_eq!(inner.lookup_value("x").unwrap().as_num(), Some(2));
        assert_eq!(root.lookup_value("x").unwrap().as_num(), Some(1));
    }

    #[test]
    fn set_value_targets_nearest_binding() {
        let root = Env::new_root();
        root.define_value("x", Value::num(1));
        let inner = root.child();

        assert!(inner.set_value("x", Value::num(9)));
        assert_eq!(root.lookup_value("x").unwrap().as_num(), Some(9));
        assert!(!inner.set_value("missing", Value::nil()));
    }

    #[test]
    fn namespaces_are_disjoint() {
        let root = Env::new_root();
        root.define_value("twice", Value::num(1));
        root.define_macro("twice", Value::num(2));

        assert_eq!(root.lookup_value("twice").unwrap().as_num(), Some(1));
        assert_eq!(root.lookup_macro("twice").unwrap().as_num(), Some(2));
    }
}
