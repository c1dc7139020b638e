//! Object (value, function, class or instance) definitions

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::expr::LiteralData;
use crate::ast::stmt::FnDeclData;
use crate::runtime::env::Env;

/// Anything a Lox expression can evaluate to
#[derive(Clone, Debug)]
pub enum LoxObj {
    Value(LoxValue),
    Callable(LoxFn),
    Class(Rc<LoxClass>),
    Instance(Rc<LoxInstance>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoxValue {
    Nil,
    Bool(bool),
    StringLit(String),
    Number(f64),
}

impl LoxValue {
    pub fn from_lit(lit: &LiteralData) -> Self {
        match lit {
            LiteralData::Nil => LoxValue::Nil,
            LiteralData::Bool(b) => LoxValue::Bool(b.clone()),
            LiteralData::StringLit(s) => LoxValue::StringLit(s.clone()),
            LiteralData::Number(n) => LoxValue::Number(n.clone()),
        }
    }
}

impl From<LoxValue> for LoxObj {
    fn from(value: LoxValue) -> Self {
        LoxObj::Value(value)
    }
}

impl LoxObj {
    pub fn nil() -> Self {
        LoxObj::Value(LoxValue::Nil)
    }

    pub fn bool(b: bool) -> Self {
        LoxObj::Value(LoxValue::Bool(b))
    }

    pub fn from_lit(lit: &LiteralData) -> Self {
        LoxObj::Value(LoxValue::from_lit(lit))
    }

    /// A closure over the environment in force at its definition site
    pub fn f(def: &Rc<FnDeclData>, closure: &Rc<RefCell<Env>>) -> Self {
        LoxObj::Callable(LoxFn::User(LoxUserFn {
            def: Rc::clone(def),
            closure: Rc::clone(closure),
            is_initializer: false,
        }))
    }

    /// Everything is truthy except `nil` and `false`
    pub fn is_truthy(&self) -> bool {
        match self {
            LoxObj::Value(LoxValue::Nil) => false,
            LoxObj::Value(LoxValue::Bool(b)) => *b,
            _ => true,
        }
    }

    pub fn as_value(&self) -> Option<&LoxValue> {
        match self {
            LoxObj::Value(ref value) => Some(value),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            LoxObj::Value(LoxValue::Number(n)) => Some(n.clone()),
            _ => None,
        }
    }
}

/// Values compare by payload; functions, classes and instances compare
/// by identity. Cross-variant comparison is `false`, never an error.
/// Numbers follow IEEE-754 `==` (so `NaN != NaN`).
impl PartialEq for LoxObj {
    fn eq(&self, other: &Self) -> bool {
        use LoxObj::*;
        match (self, other) {
            (Value(l), Value(r)) => l == r,
            (Callable(l), Callable(r)) => l == r,
            (Class(l), Class(r)) => Rc::ptr_eq(l, r),
            (Instance(l), Instance(r)) => Rc::ptr_eq(l, r),
            _ => false,
        }
    }
}

#[derive(Clone, Debug)]
pub enum LoxFn {
    User(LoxUserFn),
    /// Native function: seconds since the interpreter started
    Clock,
}

impl PartialEq for LoxFn {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LoxFn::User(l), LoxFn::User(r)) => {
                Rc::ptr_eq(&l.def, &r.def) && Rc::ptr_eq(&l.closure, &r.closure)
            }
            (LoxFn::Clock, LoxFn::Clock) => true,
            _ => false,
        }
    }
}

#[derive(Clone)]
pub struct LoxUserFn {
    pub def: Rc<FnDeclData>,
    pub closure: Rc<RefCell<Env>>,
    pub is_initializer: bool,
}

impl LoxUserFn {
    /// A fresh function whose closure pre-binds `this` to the instance
    pub fn bind(&self, instance: &Rc<LoxInstance>) -> LoxUserFn {
        let mut env = Env::from_parent(&self.closure);
        env.define("this", LoxObj::Instance(Rc::clone(instance)));
        LoxUserFn {
            def: Rc::clone(&self.def),
            closure: env.into_shared(),
            is_initializer: self.is_initializer,
        }
    }
}

// The closure chain can reach back to this function; printing it would
// recurse, so only the name is shown.
impl fmt::Debug for LoxUserFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.def.name)
    }
}

pub struct LoxClass {
    pub name: String,
    pub superclass: Option<Rc<LoxClass>>,
    pub methods: HashMap<String, LoxUserFn>,
}

impl LoxClass {
    /// Walks the superclass chain for a method
    pub fn find_method(&self, name: &str) -> Option<LoxUserFn> {
        match self.methods.get(name) {
            Some(method) => Some(method.clone()),
            None => match self.superclass {
                Some(ref superclass) => superclass.find_method(name),
                None => None,
            },
        }
    }

    /// Class arity is its initializer's arity, or zero without one
    pub fn arity(&self) -> usize {
        self.find_method("init")
            .map(|init| init.def.params.len())
            .unwrap_or(0)
    }
}

impl fmt::Debug for LoxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

pub struct LoxInstance {
    pub class: Rc<LoxClass>,
    fields: RefCell<HashMap<String, LoxObj>>,
}

impl LoxInstance {
    pub fn new(class: &Rc<LoxClass>) -> Self {
        Self {
            class: Rc::clone(class),
            fields: RefCell::new(HashMap::new()),
        }
    }

    pub fn field(&self, name: &str) -> Option<LoxObj> {
        self.fields.borrow().get(name).cloned()
    }

    /// Fields shadow methods; writing a new name just creates the field
    pub fn set_field(&self, name: &str, obj: LoxObj) {
        self.fields.borrow_mut().insert(name.to_string(), obj);
    }
}

// Fields can contain the instance itself, so no recursive dump here.
impl fmt::Debug for LoxInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} instance>", self.class.name)
    }
}

/// `stringify`: how `print` and the REPL echo render objects
impl fmt::Display for LoxObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoxObj::Value(value) => match value {
                LoxValue::Nil => write!(f, "nil"),
                LoxValue::Bool(b) => write!(f, "{}", b),
                LoxValue::StringLit(s) => write!(f, "{}", s),
                // `{}` on f64 already renders integers without `.0`
                LoxValue::Number(n) => write!(f, "{}", n),
            },
            LoxObj::Callable(LoxFn::User(fn_obj)) => write!(f, "<fn {}>", fn_obj.def.name),
            LoxObj::Callable(LoxFn::Clock) => write!(f, "<native fn>"),
            LoxObj::Class(class) => write!(f, "{}", class.name),
            LoxObj::Instance(instance) => write!(f, "{} instance", instance.class.name),
        }
    }
}
