use crate::ast::expr::{Expr, VarUseData};
use crate::lexer::token::Location;
use std::rc::Rc;

pub type Params = Vec<Param>;

/// A declared parameter name
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub pos: Location,
}

impl Param {
    pub fn new(name: String, pos: Location) -> Self {
        Self {
            name: name,
            pos: pos,
        }
    }
}

/// Function declaration translated to AST.
///
/// Shared (`Rc`) with every closure created from it at runtime.
#[derive(Clone, Debug, PartialEq)]
pub struct FnDeclData {
    pub name: String,
    pub params: Params,
    pub body: Vec<Stmt>,
    pub pos: Location,
}

impl FnDeclData {
    pub fn new(name: String, params: Params, body: Vec<Stmt>, pos: Location) -> Self {
        Self {
            name: name,
            params: params,
            body: body,
            pos: pos,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDeclData {
    pub name: String,
    /// Superclass reference; resolved like any other variable use
    pub superclass: Option<VarUseData>,
    pub methods: Vec<Rc<FnDeclData>>,
    pub pos: Location,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Print(PrintData),
    Var(VarDeclData),
    If(Box<IfData>),
    While(Box<WhileData>),
    Block(BlockData),
    Fn(Rc<FnDeclData>),
    Return(ReturnData),
    Break(BreakData),
    Class(Rc<ClassDeclData>),
}

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }

    pub fn print(expr: Expr) -> Self {
        Stmt::Print(PrintData { expr: expr })
    }

    pub fn var_decl(name: String, init: Option<Expr>, pos: Location) -> Self {
        Stmt::Var(VarDeclData {
            name: name,
            init: init,
            pos: pos,
        })
    }

    pub fn if_then_else(condition: Expr, if_true: Stmt, if_false: Option<Stmt>) -> Self {
        Stmt::If(Box::new(IfData {
            condition: condition,
            if_true: if_true,
            if_false: if_false,
        }))
    }

    pub fn while_(condition: Expr, body: Stmt) -> Self {
        Stmt::While(Box::new(WhileData {
            condition: condition,
            body: body,
        }))
    }

    pub fn block(stmts: Vec<Stmt>) -> Self {
        Stmt::Block(BlockData { stmts: stmts })
    }

    pub fn return_(value: Option<Expr>, pos: Location) -> Self {
        Stmt::Return(ReturnData {
            value: value,
            pos: pos,
        })
    }

    pub fn break_(pos: Location) -> Self {
        Stmt::Break(BreakData { pos: pos })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrintData {
    pub expr: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDeclData {
    pub name: String,
    /// Missing initializer means `nil`
    pub init: Option<Expr>,
    pub pos: Location,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfData {
    pub condition: Expr,
    pub if_true: Stmt,
    /// May itself be an `if` (`else if`)
    pub if_false: Option<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileData {
    pub condition: Expr,
    pub body: Stmt,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlockData {
    pub stmts: Vec<Stmt>,
}

impl BlockData {
    pub fn into_stmt(self) -> Stmt {
        Stmt::Block(self)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnData {
    pub value: Option<Expr>,
    pub pos: Location,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BreakData {
    pub pos: Location,
}
