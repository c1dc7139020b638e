//! Static scope analysis.
//!
//! Walks the AST once, binding every local variable use to the number of
//! scopes between the use and the declaration. The result goes into the
//! interpreter's side table (`caches`); names that stay unresolved are
//! globals and are looked up dynamically.

use std::collections::HashMap;
use thiserror::Error;

use crate::ast::{expr::*, stmt::*, ExprVisitor, StmtVisitor};
use crate::lexer::token::Location;

#[derive(Debug, Clone, Error)]
pub enum SemanticError {
    #[error("Can't read local variable in its own initializer.")]
    RecursiveVarInit { name: String, pos: Location },
    #[error("Already a variable with this name in this scope.")]
    DuplicateDeclaration { name: String, pos: Location },
    #[error("Can't return from top-level code.")]
    ReturnOutsideFunction { pos: Location },
    #[error("Can't return a value from an initializer.")]
    ReturnValueFromInitializer { pos: Location },
    #[error("Can't use 'this' outside of a class.")]
    ThisOutsideClass { pos: Location },
    #[error("Can't use 'super' outside of a class.")]
    SuperOutsideClass { pos: Location },
    #[error("Can't use 'super' in a class with no superclass.")]
    SuperWithoutSuperclass { pos: Location },
    #[error("A class can't inherit from itself.")]
    SelfInheritance { name: String, pos: Location },
    #[error("Must be inside a loop to use 'break'.")]
    BreakOutsideLoop { pos: Location },
}

impl SemanticError {
    pub fn pos(&self) -> Location {
        use SemanticError::*;
        match self {
            RecursiveVarInit { pos, .. } => *pos,
            DuplicateDeclaration { pos, .. } => *pos,
            ReturnOutsideFunction { pos } => *pos,
            ReturnValueFromInitializer { pos } => *pos,
            ThisOutsideClass { pos } => *pos,
            SuperOutsideClass { pos } => *pos,
            SuperWithoutSuperclass { pos } => *pos,
            SelfInheritance { pos, .. } => *pos,
            BreakOutsideLoop { pos } => *pos,
        }
    }

    /// The lexeme diagnostics point at
    pub fn lexeme(&self) -> &str {
        use SemanticError::*;
        match self {
            RecursiveVarInit { name, .. } => name,
            DuplicateDeclaration { name, .. } => name,
            SelfInheritance { name, .. } => name,
            ReturnOutsideFunction { .. } | ReturnValueFromInitializer { .. } => "return",
            ThisOutsideClass { .. } => "this",
            SuperOutsideClass { .. } | SuperWithoutSuperclass { .. } => "super",
            BreakOutsideLoop { .. } => "break",
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum FnKind {
    None,
    Function,
    Method,
    Initializer,
}

#[derive(Clone, Copy, PartialEq)]
enum ClassKind {
    None,
    Class,
    SubClass,
}

#[derive(Clone, Copy, PartialEq)]
enum LoopKind {
    None,
    Loop,
}

pub struct Resolver<'a> {
    /// Maps variable uses to the distance to the scope they live in
    caches: &'a mut HashMap<VarUseId, usize>,
    /// Each scope maps names to "is it fully initialized yet". The
    /// global scope is not on the stack; globals resolve dynamically.
    scopes: Vec<HashMap<String, bool>>,
    current_fn: FnKind,
    current_class: ClassKind,
    current_loop: LoopKind,
    errors: Vec<SemanticError>,
}

impl<'a> Resolver<'a> {
    pub fn new(caches: &'a mut HashMap<VarUseId, usize>) -> Self {
        Self {
            caches: caches,
            scopes: Vec::new(),
            current_fn: FnKind::None,
            current_class: ClassKind::None,
            current_loop: LoopKind::None,
            errors: Vec::new(),
        }
    }

    /// Resolves a whole program, reporting as many errors as it can find
    pub fn resolve_stmts(mut self, stmts: &[Stmt]) -> Vec<SemanticError> {
        for stmt in stmts {
            self.resolve_stmt(stmt);
        }
        self.errors
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        self.visit_stmt(stmt);
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        self.visit_expr(expr);
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Adds the name to the current scope, not yet ready for reading
    fn declare(&mut self, name: &str, pos: Location) {
        let scope = match self.scopes.last_mut() {
            None => return,
            Some(scope) => scope,
        };
        if scope.contains_key(name) {
            self.errors.push(SemanticError::DuplicateDeclaration {
                name: name.to_string(),
                pos: pos,
            });
        }
        scope.insert(name.to_string(), false);
    }

    /// Marks the name ready; its initializer has been resolved
    fn define(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), true);
        }
    }

    /// Walks the scope stack innermost-out; the first hit determines the
    /// depth. No hit means the name is (hopefully) a global.
    fn resolve_local(&mut self, name: &str, id: VarUseId) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name) {
                self.caches.insert(id, depth);
                return;
            }
        }
    }

    /// Parameters go in one scope, the body in a nested one; the
    /// interpreter pairs environments the same way.
    fn resolve_fn(&mut self, f: &FnDeclData, kind: FnKind) {
        let enclosing_fn = self.current_fn;
        let enclosing_loop = self.current_loop;
        self.current_fn = kind;
        self.current_loop = LoopKind::None;

        self.begin_scope();
        for param in f.params.iter() {
            self.declare(&param.name, param.pos);
            self.define(&param.name);
        }
        self.begin_scope();
        for stmt in f.body.iter() {
            self.resolve_stmt(stmt);
        }
        self.end_scope();
        self.end_scope();

        self.current_fn = enclosing_fn;
        self.current_loop = enclosing_loop;
    }
}

impl<'a> StmtVisitor<()> for Resolver<'a> {
    fn visit_expr_stmt(&mut self, expr: &Expr) {
        self.resolve_expr(expr);
    }

    fn visit_print_stmt(&mut self, print: &PrintData) {
        self.resolve_expr(&print.expr);
    }

    fn visit_var_decl(&mut self, var: &VarDeclData) {
        self.declare(&var.name, var.pos);
        if let Some(ref init) = var.init {
            self.resolve_expr(init);
        }
        self.define(&var.name);
    }

    fn visit_if_stmt(&mut self, if_: &IfData) {
        self.resolve_expr(&if_.condition);
        self.resolve_stmt(&if_.if_true);
        if let Some(ref if_false) = if_.if_false {
            self.resolve_stmt(if_false);
        }
    }

    fn visit_while_stmt(&mut self, while_: &WhileData) {
        self.resolve_expr(&while_.condition);
        let enclosing_loop = self.current_loop;
        self.current_loop = LoopKind::Loop;
        self.resolve_stmt(&while_.body);
        self.current_loop = enclosing_loop;
    }

    fn visit_block_stmt(&mut self, block: &BlockData) {
        self.begin_scope();
        for stmt in block.stmts.iter() {
            self.resolve_stmt(stmt);
        }
        self.end_scope();
    }

    fn visit_fn_decl(&mut self, f: &std::rc::Rc<FnDeclData>) {
        // defined eagerly so the function can recurse into itself
        self.declare(&f.name, f.pos);
        self.define(&f.name);
        self.resolve_fn(f, FnKind::Function);
    }

    fn visit_return_stmt(&mut self, ret: &ReturnData) {
        if self.current_fn == FnKind::None {
            self.errors
                .push(SemanticError::ReturnOutsideFunction { pos: ret.pos });
        }
        if let Some(ref value) = ret.value {
            if self.current_fn == FnKind::Initializer {
                self.errors
                    .push(SemanticError::ReturnValueFromInitializer { pos: ret.pos });
            }
            self.resolve_expr(value);
        }
    }

    fn visit_break_stmt(&mut self, brk: &BreakData) {
        if self.current_loop == LoopKind::None {
            self.errors
                .push(SemanticError::BreakOutsideLoop { pos: brk.pos });
        }
    }

    fn visit_class_decl(&mut self, c: &std::rc::Rc<ClassDeclData>) {
        let enclosing_class = self.current_class;
        self.current_class = ClassKind::Class;

        self.declare(&c.name, c.pos);
        self.define(&c.name);

        if let Some(ref superclass) = c.superclass {
            if superclass.name == c.name {
                self.errors.push(SemanticError::SelfInheritance {
                    name: c.name.clone(),
                    pos: superclass.pos,
                });
            }
            self.current_class = ClassKind::SubClass;
            self.visit_var_expr(superclass);
            // `super` lives in a scope wrapped around the methods
            self.begin_scope();
            self.define("super");
        }

        self.begin_scope();
        self.define("this");
        for method in c.methods.iter() {
            let kind = if method.name == "init" {
                FnKind::Initializer
            } else {
                FnKind::Method
            };
            self.resolve_fn(method, kind);
        }
        self.end_scope();

        if c.superclass.is_some() {
            self.end_scope();
        }
        self.current_class = enclosing_class;
    }
}

impl<'a> ExprVisitor<()> for Resolver<'a> {
    fn visit_literal_expr(&mut self, _literal: &LiteralData) {}

    fn visit_unary_expr(&mut self, unary: &UnaryData) {
        self.resolve_expr(&unary.expr);
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) {
        self.resolve_expr(&binary.left);
        self.resolve_expr(&binary.right);
    }

    fn visit_logic_expr(&mut self, logic: &LogicData) {
        self.resolve_expr(&logic.left);
        self.resolve_expr(&logic.right);
    }

    fn visit_var_expr(&mut self, var: &VarUseData) {
        if let Some(scope) = self.scopes.last() {
            if scope.get(&var.name) == Some(&false) {
                self.errors.push(SemanticError::RecursiveVarInit {
                    name: var.name.clone(),
                    pos: var.pos,
                });
            }
        }
        self.resolve_local(&var.name, var.id);
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) {
        self.resolve_expr(&assign.expr);
        self.resolve_local(&assign.assigned.name, assign.assigned.id);
    }

    fn visit_call_expr(&mut self, call: &CallData) {
        self.resolve_expr(&call.callee);
        for arg in call.args.iter() {
            self.resolve_expr(arg);
        }
    }

    fn visit_get_expr(&mut self, get: &GetUseData) {
        self.resolve_expr(&get.body);
    }

    fn visit_set_expr(&mut self, set: &SetUseData) {
        self.resolve_expr(&set.body);
        self.resolve_expr(&set.value);
    }

    fn visit_this_expr(&mut self, this: &ThisData) {
        if self.current_class == ClassKind::None {
            self.errors
                .push(SemanticError::ThisOutsideClass { pos: this.pos });
            return;
        }
        self.resolve_local("this", this.id);
    }

    fn visit_super_expr(&mut self, sup: &SuperData) {
        match self.current_class {
            ClassKind::None => {
                self.errors
                    .push(SemanticError::SuperOutsideClass { pos: sup.pos });
            }
            ClassKind::Class => {
                self.errors
                    .push(SemanticError::SuperWithoutSuperclass { pos: sup.pos });
            }
            ClassKind::SubClass => {
                self.resolve_local("super", sup.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::analizer::resolver::{Resolver, SemanticError};
    use crate::ast::expr::{Expr, VarUseId, VarUseIdCounter};
    use crate::ast::stmt::Stmt;
    use crate::lexer::{parser::Parser, scanner::Scanner};

    fn resolve(src: &str) -> (Vec<Stmt>, HashMap<VarUseId, usize>, Vec<SemanticError>) {
        let (tks, scan_errs) = Scanner::new(src).scan();
        assert!(scan_errs.is_empty(), "scan errors: {:?}", scan_errs);
        let mut counter = VarUseIdCounter::new();
        let (stmts, parse_errs) = Parser::new(&tks, &mut counter).parse();
        assert!(parse_errs.is_empty(), "parse errors: {:?}", parse_errs);
        let mut caches = HashMap::new();
        let errors = Resolver::new(&mut caches).resolve_stmts(&stmts);
        (stmts, caches, errors)
    }

    fn resolve_errors(src: &str) -> Vec<SemanticError> {
        let (_, _, errors) = self::resolve(src);
        errors
    }

    #[test]
    fn shadowing_binds_to_the_nearest_scope() {
        let (stmts, caches, errors) = self::resolve("var a = 1; { var a = 2; { print a; } }");
        assert!(errors.is_empty());

        // dig out the `a` inside the inner block
        let outer = match &stmts[1] {
            Stmt::Block(block) => block,
            stmt => panic!("expected block, got {:?}", stmt),
        };
        let inner = match &outer.stmts[1] {
            Stmt::Block(block) => block,
            stmt => panic!("expected block, got {:?}", stmt),
        };
        let var = match &inner.stmts[0] {
            Stmt::Print(print) => match &print.expr {
                Expr::Variable(var) => var,
                expr => panic!("expected variable, got {:?}", expr),
            },
            stmt => panic!("expected print, got {:?}", stmt),
        };

        // one block boundary between the use and `var a = 2`
        assert_eq!(caches.get(&var.id), Some(&1));
    }

    #[test]
    fn globals_are_left_unresolved() {
        let (stmts, caches, errors) = self::resolve("var a = 1; print a;");
        assert!(errors.is_empty());
        let var = match &stmts[1] {
            Stmt::Print(print) => match &print.expr {
                Expr::Variable(var) => var,
                expr => panic!("expected variable, got {:?}", expr),
            },
            stmt => panic!("expected print, got {:?}", stmt),
        };
        assert_eq!(caches.get(&var.id), None);
    }

    #[test]
    fn closed_over_variables_skip_the_function_scopes() {
        let (stmts, caches, errors) =
            self::resolve("fun make() { var i = 0; fun inc() { i = i + 1; } }");
        assert!(errors.is_empty());

        let make = match &stmts[0] {
            Stmt::Fn(f) => f,
            stmt => panic!("expected fn, got {:?}", stmt),
        };
        let inc = match &make.body[1] {
            Stmt::Fn(f) => f,
            stmt => panic!("expected fn, got {:?}", stmt),
        };
        let assign = match &inc.body[0] {
            Stmt::Expr(Expr::Assign(assign)) => assign,
            stmt => panic!("expected assignment, got {:?}", stmt),
        };

        // inc body scope + inc param scope separate the use from `var i`
        assert_eq!(caches.get(&assign.assigned.id), Some(&2));
    }

    #[test]
    fn reading_a_variable_in_its_own_initializer_is_reported() {
        let errors = self::resolve_errors("{ var a = a; }");
        assert!(matches!(
            errors.as_slice(),
            [SemanticError::RecursiveVarInit { .. }]
        ));
    }

    #[test]
    fn redeclaring_in_the_same_local_scope_is_reported() {
        let errors = self::resolve_errors("{ var a = 1; var a = 2; }");
        assert!(matches!(
            errors.as_slice(),
            [SemanticError::DuplicateDeclaration { .. }]
        ));
        // the global scope allows redefinition
        assert!(self::resolve_errors("var a = 1; var a = 2;").is_empty());
    }

    #[test]
    fn top_level_return_is_reported() {
        let errors = self::resolve_errors("return 1;");
        assert!(matches!(
            errors.as_slice(),
            [SemanticError::ReturnOutsideFunction { .. }]
        ));
    }

    #[test]
    fn returning_a_value_from_an_initializer_is_reported() {
        let errors = self::resolve_errors("class A { init() { return 1; } }");
        assert!(matches!(
            errors.as_slice(),
            [SemanticError::ReturnValueFromInitializer { .. }]
        ));
        // a bare return is allowed
        assert!(self::resolve_errors("class A { init() { return; } }").is_empty());
    }

    #[test]
    fn this_and_super_need_a_class_around_them() {
        assert!(matches!(
            self::resolve_errors("print this;").as_slice(),
            [SemanticError::ThisOutsideClass { .. }]
        ));
        assert!(matches!(
            self::resolve_errors("class A { cook() { super.cook(); } }").as_slice(),
            [SemanticError::SuperWithoutSuperclass { .. }]
        ));
        assert!(self::resolve_errors(
            "class A { cook() {} } class B < A { cook() { super.cook(); } }"
        )
        .is_empty());
    }

    #[test]
    fn inheriting_from_itself_is_reported() {
        let errors = self::resolve_errors("class A < A {}");
        assert!(matches!(
            errors.as_slice(),
            [SemanticError::SelfInheritance { .. }]
        ));
    }

    #[test]
    fn break_must_be_inside_a_loop() {
        assert!(matches!(
            self::resolve_errors("break;").as_slice(),
            [SemanticError::BreakOutsideLoop { .. }]
        ));
        assert!(self::resolve_errors("while (true) break;").is_empty());
        // a function body resets the loop context
        assert!(matches!(
            self::resolve_errors("while (true) { fun f() { break; } }").as_slice(),
            [SemanticError::BreakOutsideLoop { .. }]
        ));
    }
}
