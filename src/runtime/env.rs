//! Lexically scoped storage for variables.
//!
//! Environments form a chain through strong `Rc` parent links; a scope
//! stays alive for as long as the longest-lived closure that captured
//! it, which is exactly what closures require.

use crate::runtime::obj::LoxObj;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub struct Env {
    map: HashMap<String, LoxObj>,
    /// Enclosing environment (if any)
    parent: Option<Rc<RefCell<Self>>>,
}

impl Env {
    pub fn new() -> Self {
        Env {
            map: HashMap::new(),
            parent: None,
        }
    }

    pub fn from_parent(parent: &Rc<RefCell<Self>>) -> Self {
        Env {
            map: HashMap::new(),
            parent: Some(Rc::clone(parent)),
        }
    }

    pub fn into_shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Declaring is always allowed; redefinition overwrites, which is
    /// what globals want. Local redeclaration is rejected statically.
    pub fn define(&mut self, name: &str, obj: LoxObj) {
        self.map.insert(name.to_string(), obj);
    }

    /// Looks up through enclosing environments and clones the found
    /// object. `None` means the name is nowhere in the chain.
    pub fn get(&self, name: &str) -> Option<LoxObj> {
        match self.map.get(name) {
            Some(obj) => Some(obj.clone()),
            None => match self.parent {
                Some(ref parent) => parent.borrow().get(name),
                None => None,
            },
        }
    }

    /// Assigns to an existing name somewhere in the chain; `false` if
    /// the name is not bound anywhere.
    pub fn assign(&mut self, name: &str, obj: LoxObj) -> bool {
        if self.map.contains_key(name) {
            self.map.insert(name.to_string(), obj);
            true
        } else {
            match self.parent {
                Some(ref parent) => parent.borrow_mut().assign(name, obj),
                None => false,
            }
        }
    }

    /// Reads from exactly `depth` scopes up the chain. The resolver
    /// guarantees the binding exists there; `None` signals a resolver
    /// bug rather than a user error.
    pub fn get_at(&self, depth: usize, name: &str) -> Option<LoxObj> {
        if depth == 0 {
            self.map.get(name).cloned()
        } else {
            match self.parent {
                Some(ref parent) => parent.borrow().get_at(depth - 1, name),
                None => None,
            }
        }
    }

    /// Writes to exactly `depth` scopes up the chain
    pub fn assign_at(&mut self, depth: usize, name: &str, obj: LoxObj) -> bool {
        if depth == 0 {
            if self.map.contains_key(name) {
                self.map.insert(name.to_string(), obj);
                true
            } else {
                false
            }
        } else {
            match self.parent {
                Some(ref parent) => parent.borrow_mut().assign_at(depth - 1, name, obj),
                None => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::env::Env;
    use crate::runtime::obj::{LoxObj, LoxValue};

    fn num(n: f64) -> LoxObj {
        LoxObj::Value(LoxValue::Number(n))
    }

    #[test]
    fn lookup_walks_the_chain() {
        let globals = Env::new().into_shared();
        globals.borrow_mut().define("a", self::num(1.0));

        let inner = Env::from_parent(&globals).into_shared();
        assert_eq!(inner.borrow().get("a"), Some(self::num(1.0)));

        // shadowing only affects the inner scope
        inner.borrow_mut().define("a", self::num(2.0));
        assert_eq!(inner.borrow().get("a"), Some(self::num(2.0)));
        assert_eq!(globals.borrow().get("a"), Some(self::num(1.0)));
    }

    #[test]
    fn assignment_targets_the_defining_scope() {
        let globals = Env::new().into_shared();
        globals.borrow_mut().define("a", self::num(1.0));
        let inner = Env::from_parent(&globals).into_shared();

        assert!(inner.borrow_mut().assign("a", self::num(3.0)));
        assert_eq!(globals.borrow().get("a"), Some(self::num(3.0)));

        assert!(!inner.borrow_mut().assign("missing", self::num(0.0)));
    }

    #[test]
    fn resolved_access_skips_exactly_depth_scopes() {
        let globals = Env::new().into_shared();
        globals.borrow_mut().define("x", self::num(0.0));
        let mid = Env::from_parent(&globals).into_shared();
        mid.borrow_mut().define("x", self::num(1.0));
        let leaf = Env::from_parent(&mid).into_shared();

        assert_eq!(leaf.borrow().get_at(1, "x"), Some(self::num(1.0)));
        assert_eq!(leaf.borrow().get_at(2, "x"), Some(self::num(0.0)));
        assert_eq!(leaf.borrow().get_at(0, "x"), None);

        assert!(leaf.borrow_mut().assign_at(1, "x", self::num(9.0)));
        assert_eq!(mid.borrow().get("x"), Some(self::num(9.0)));
    }

    #[test]
    fn captured_scopes_outlive_their_creator() {
        let captured = {
            let globals = Env::new().into_shared();
            let scope = Env::from_parent(&globals).into_shared();
            scope.borrow_mut().define("i", self::num(7.0));
            scope
        };
        assert_eq!(captured.borrow().get("i"), Some(self::num(7.0)));
    }
}
