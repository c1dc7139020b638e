//! The tree-walking evaluator

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Instant;

use crate::ast::{expr::*, stmt::*, ExprVisitor, StmtVisitor};
use crate::lexer::token::Location;
use crate::runtime::env::Env;
use crate::runtime::obj::{LoxClass, LoxFn, LoxInstance, LoxObj, LoxUserFn, LoxValue};
use crate::runtime::{Result, RuntimeError};

/// Signal that unwinds out of nested statements.
///
/// `While` consumes `Break`; function invocation consumes `Return`.
/// Either way the environment swap in `interpret_stmts_with_scope` is
/// restored before the signal travels further.
#[derive(Clone, Debug)]
pub enum Unwind {
    Return(LoxObj),
    Break,
}

type StmtResult = Result<Option<Unwind>>;

pub struct Interpreter {
    /// Points at the global `Env`
    globals: Rc<RefCell<Env>>,
    /// The `Env` in force for the statement being interpreted
    env: Rc<RefCell<Env>>,
    /// The time interpretation started. Required for the `clock` native
    /// function.
    begin_time: Instant,
    /// Maps each resolved variable use to the distance of the scope it
    /// lives in. Filled in by the `Resolver`.
    pub caches: HashMap<VarUseId, usize>,
    /// REPL mode prints the value of bare expression statements
    echoes_exprs: bool,
    out: Box<dyn Write>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()), false)
    }

    pub fn repl() -> Self {
        Self::with_output(Box::new(io::stdout()), true)
    }

    pub fn with_output(out: Box<dyn Write>, echoes_exprs: bool) -> Self {
        let globals = Self::global_env().into_shared();
        let env = Rc::clone(&globals);
        Self {
            globals: globals,
            env: env,
            begin_time: Instant::now(),
            caches: HashMap::new(),
            echoes_exprs: echoes_exprs,
            out: out,
        }
    }

    /// Creates a new `Env` with native functions
    fn global_env() -> Env {
        let mut env = Env::new();
        env.define("clock", LoxObj::Callable(LoxFn::Clock));
        env
    }

    /// The entry point of statement interpretation
    pub fn interpret(&mut self, stmt: &Stmt) -> StmtResult {
        self.visit_stmt(stmt)
    }

    /// Dispatches a sub function to a specific `Expr`
    pub fn eval_expr(&mut self, expr: &Expr) -> Result<LoxObj> {
        self.visit_expr(expr)
    }

    fn interpret_stmts(&mut self, stmts: &[Stmt]) -> StmtResult {
        for stmt in stmts.iter() {
            if let Some(unwind) = self.interpret(stmt)? {
                return Ok(Some(unwind));
            }
        }
        Ok(None)
    }

    /// Interprets a block of statements in the given scope. The
    /// previous environment is restored on every exit path: normal,
    /// unwinding and error.
    fn interpret_stmts_with_scope(
        &mut self,
        stmts: &[Stmt],
        scope: Rc<RefCell<Env>>,
    ) -> StmtResult {
        let prev = Rc::clone(&self.env);
        self.env = scope;
        let result = self.interpret_stmts(stmts);
        self.env = prev;
        result
    }
}

/// Capabilities provided by the `Resolver`
impl Interpreter {
    fn lookup_resolved(&self, name: &str, id: VarUseId, pos: Location) -> Result<LoxObj> {
        let obj = if let Some(depth) = self.caches.get(&id) {
            // a resolved local; guaranteed present at that depth
            self.env.borrow().get_at(*depth, name)
        } else {
            // unresolved names are globals, looked up dynamically
            self.globals.borrow().get(name)
        };
        obj.ok_or_else(|| RuntimeError::Undefined {
            name: name.to_string(),
            pos: pos,
        })
    }

    fn assign_resolved(&mut self, var: &VarUseData, obj: LoxObj) -> Result<()> {
        let assigned = if let Some(depth) = self.caches.get(&var.id) {
            self.env.borrow_mut().assign_at(*depth, &var.name, obj)
        } else {
            self.globals.borrow_mut().assign(&var.name, obj)
        };
        if assigned {
            Ok(())
        } else {
            Err(RuntimeError::Undefined {
                name: var.name.clone(),
                pos: var.pos,
            })
        }
    }
}

/// Function invocation
impl Interpreter {
    /// Invokes a function object (native or user-defined) on already
    /// evaluated arguments
    pub fn invoke(&mut self, fn_obj: &LoxFn, args: Vec<LoxObj>, pos: Location) -> Result<LoxObj> {
        match fn_obj {
            LoxFn::User(ref f) => self.invoke_user_fn(f, args, pos),
            LoxFn::Clock => {
                if !args.is_empty() {
                    return Err(RuntimeError::WrongArity {
                        expected: 0,
                        got: args.len(),
                        pos: pos,
                    });
                }
                Ok(LoxObj::Value(LoxValue::Number(self.native_clock())))
            }
        }
    }

    fn invoke_user_fn(&mut self, f: &LoxUserFn, args: Vec<LoxObj>, pos: Location) -> Result<LoxObj> {
        if f.def.params.len() != args.len() {
            return Err(RuntimeError::WrongArity {
                expected: f.def.params.len(),
                got: args.len(),
                pos: pos,
            });
        }

        let mut scope = Env::from_parent(&f.closure);
        for (param, arg) in f.def.params.iter().zip(args.into_iter()) {
            scope.define(&param.name, arg);
        }
        // the body runs one scope below the parameters, mirroring the
        // resolver's scope pairing
        let params_env = scope.into_shared();
        let body_env = Env::from_parent(&params_env).into_shared();
        let unwind = self.interpret_stmts_with_scope(&f.def.body, body_env)?;

        if f.is_initializer {
            // an initializer always evaluates to its instance; the
            // bound closure holds `this` at depth zero
            return f
                .closure
                .borrow()
                .get_at(0, "this")
                .ok_or_else(|| RuntimeError::Undefined {
                    name: "this".to_string(),
                    pos: pos,
                });
        }
        Ok(match unwind {
            Some(Unwind::Return(obj)) => obj,
            _ => LoxObj::nil(),
        })
    }

    /// A class used as a callable allocates and initializes an instance
    fn instantiate(
        &mut self,
        class: &Rc<LoxClass>,
        args: Vec<LoxObj>,
        pos: Location,
    ) -> Result<LoxObj> {
        if args.len() != class.arity() {
            return Err(RuntimeError::WrongArity {
                expected: class.arity(),
                got: args.len(),
                pos: pos,
            });
        }
        let instance = Rc::new(LoxInstance::new(class));
        if let Some(init) = class.find_method("init") {
            self.invoke_user_fn(&init.bind(&instance), args, pos)?;
        }
        Ok(LoxObj::Instance(instance))
    }

    /// Seconds since the interpreter started
    fn native_clock(&self) -> f64 {
        self.begin_time.elapsed().as_secs_f64()
    }
}

/// Implements statement interpretation via the Visitor pattern
impl StmtVisitor<StmtResult> for Interpreter {
    fn visit_expr_stmt(&mut self, expr: &Expr) -> StmtResult {
        let obj = self.eval_expr(expr)?;
        if self.echoes_exprs {
            writeln!(self.out, "{}", obj).unwrap();
        }
        Ok(None)
    }

    fn visit_print_stmt(&mut self, print: &PrintData) -> StmtResult {
        let obj = self.eval_expr(&print.expr)?;
        writeln!(self.out, "{}", obj).unwrap();
        Ok(None)
    }

    fn visit_var_decl(&mut self, var: &VarDeclData) -> StmtResult {
        let obj = match var.init {
            Some(ref init) => self.eval_expr(init)?,
            None => LoxObj::nil(),
        };
        self.env.borrow_mut().define(&var.name, obj);
        Ok(None)
    }

    fn visit_if_stmt(&mut self, if_: &IfData) -> StmtResult {
        if self.eval_expr(&if_.condition)?.is_truthy() {
            self.interpret(&if_.if_true)
        } else if let Some(ref if_false) = if_.if_false {
            self.interpret(if_false)
        } else {
            Ok(None)
        }
    }

    fn visit_while_stmt(&mut self, while_: &WhileData) -> StmtResult {
        while self.eval_expr(&while_.condition)?.is_truthy() {
            match self.interpret(&while_.body)? {
                Some(Unwind::Break) => break,
                Some(unwind) => return Ok(Some(unwind)),
                None => {}
            }
        }
        Ok(None)
    }

    fn visit_block_stmt(&mut self, block: &BlockData) -> StmtResult {
        let scope = Env::from_parent(&self.env).into_shared();
        self.interpret_stmts_with_scope(&block.stmts, scope)
    }

    fn visit_fn_decl(&mut self, f: &Rc<FnDeclData>) -> StmtResult {
        let fn_obj = LoxObj::f(f, &self.env);
        self.env.borrow_mut().define(&f.name, fn_obj);
        Ok(None)
    }

    fn visit_return_stmt(&mut self, ret: &ReturnData) -> StmtResult {
        let obj = match ret.value {
            Some(ref value) => self.eval_expr(value)?,
            None => LoxObj::nil(),
        };
        Ok(Some(Unwind::Return(obj)))
    }

    fn visit_break_stmt(&mut self, _brk: &BreakData) -> StmtResult {
        Ok(Some(Unwind::Break))
    }

    fn visit_class_decl(&mut self, c: &Rc<ClassDeclData>) -> StmtResult {
        let superclass = match c.superclass {
            Some(ref sup) => {
                match self.lookup_resolved(&sup.name, sup.id, sup.pos)? {
                    LoxObj::Class(class) => Some(class),
                    _ => return Err(RuntimeError::SuperclassNotClass { pos: sup.pos }),
                }
            }
            None => None,
        };

        // the name is bound before the methods are built so they can
        // refer to the class itself
        self.env.borrow_mut().define(&c.name, LoxObj::nil());

        // methods close over an extra scope exposing `super`
        let method_env = match superclass {
            Some(ref superclass) => {
                let mut env = Env::from_parent(&self.env);
                env.define("super", LoxObj::Class(Rc::clone(superclass)));
                env.into_shared()
            }
            None => Rc::clone(&self.env),
        };

        let mut methods = HashMap::<String, LoxUserFn>::new();
        for method in c.methods.iter() {
            let f = LoxUserFn {
                def: Rc::clone(method),
                closure: Rc::clone(&method_env),
                is_initializer: method.name == "init",
            };
            methods.insert(method.name.clone(), f);
        }

        let class = LoxClass {
            name: c.name.clone(),
            superclass: superclass,
            methods: methods,
        };
        let assigned = self
            .env
            .borrow_mut()
            .assign(&c.name, LoxObj::Class(Rc::new(class)));
        debug_assert!(assigned, "class name was just defined");
        Ok(None)
    }
}

/// Visitors for implementing `eval_expr`
impl ExprVisitor<Result<LoxObj>> for Interpreter {
    fn visit_literal_expr(&mut self, lit: &LiteralData) -> Result<LoxObj> {
        Ok(LoxObj::from_lit(lit))
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) -> Result<LoxObj> {
        let obj = self.eval_expr(&unary.expr)?;
        match unary.oper {
            UnaryOper::Minus => {
                let n = obj
                    .as_num()
                    .ok_or(RuntimeError::OperandMustBeNumber { pos: unary.pos })?;
                Ok(LoxObj::Value(LoxValue::Number(-n)))
            }
            UnaryOper::Not => Ok(LoxObj::bool(!obj.is_truthy())),
        }
    }

    /// `==`, `!=`, `<`, `<=`, `>`, `>=`, `+`, `-`, `*`, `/`
    fn visit_binary_expr(&mut self, binary: &BinaryData) -> Result<LoxObj> {
        use BinaryOper::*;

        let left = self.eval_expr(&binary.left)?;
        let right = self.eval_expr(&binary.right)?;

        match binary.oper {
            // equality works on any pair of values and never errors
            Equal => return Ok(LoxObj::bool(left == right)),
            NotEqual => return Ok(LoxObj::bool(left != right)),

            // `+` is overloaded for concatenation
            Plus => {
                return match (left.as_value(), right.as_value()) {
                    (Some(LoxValue::Number(l)), Some(LoxValue::Number(r))) => {
                        Ok(LoxObj::Value(LoxValue::Number(l + r)))
                    }
                    (Some(LoxValue::StringLit(l)), Some(LoxValue::StringLit(r))) => {
                        Ok(LoxObj::Value(LoxValue::StringLit(format!("{}{}", l, r))))
                    }
                    _ => Err(RuntimeError::OperandsMustBeNumbersOrStrings { pos: binary.pos }),
                };
            }

            _ => {}
        }

        // all remaining operators want two numbers
        let (l, r) = match (left.as_num(), right.as_num()) {
            (Some(l), Some(r)) => (l, r),
            _ => return Err(RuntimeError::OperandsMustBeNumbers { pos: binary.pos }),
        };

        Ok(match binary.oper {
            Minus => LoxObj::Value(LoxValue::Number(l - r)),
            // division by zero follows IEEE-754 (inf / NaN), no error
            Div => LoxObj::Value(LoxValue::Number(l / r)),
            Mul => LoxObj::Value(LoxValue::Number(l * r)),
            Less => LoxObj::bool(l < r),
            LessEqual => LoxObj::bool(l <= r),
            Greater => LoxObj::bool(l > r),
            GreaterEqual => LoxObj::bool(l >= r),
            Equal | NotEqual | Plus => unreachable!(),
        })
    }

    /// `and`, `or`: short-circuits and yields the deciding operand
    /// uncoerced
    fn visit_logic_expr(&mut self, logic: &LogicData) -> Result<LoxObj> {
        let left = self.eval_expr(&logic.left)?;
        match logic.oper {
            LogicOper::Or if left.is_truthy() => Ok(left),
            LogicOper::And if !left.is_truthy() => Ok(left),
            _ => self.eval_expr(&logic.right),
        }
    }

    fn visit_var_expr(&mut self, var: &VarUseData) -> Result<LoxObj> {
        self.lookup_resolved(&var.name, var.id, var.pos)
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) -> Result<LoxObj> {
        let obj = self.eval_expr(&assign.expr)?;
        self.assign_resolved(&assign.assigned, obj.clone())?;
        Ok(obj)
    }

    fn visit_call_expr(&mut self, call: &CallData) -> Result<LoxObj> {
        let callee = self.eval_expr(&call.callee)?;

        // left-to-right argument evaluation is observable
        let mut args = Vec::with_capacity(call.args.len());
        for arg in call.args.iter() {
            args.push(self.eval_expr(arg)?);
        }

        match callee {
            LoxObj::Callable(ref fn_obj) => self.invoke(fn_obj, args, call.pos),
            LoxObj::Class(ref class) => self.instantiate(class, args, call.pos),
            _ => Err(RuntimeError::NotCallable { pos: call.pos }),
        }
    }

    fn visit_get_expr(&mut self, get: &GetUseData) -> Result<LoxObj> {
        let body = self.eval_expr(&get.body)?;
        let instance = match body {
            LoxObj::Instance(instance) => instance,
            _ => return Err(RuntimeError::NotAnInstanceProperty { pos: get.pos }),
        };

        if let Some(obj) = instance.field(&get.name) {
            return Ok(obj);
        }
        match instance.class.find_method(&get.name) {
            Some(method) => Ok(LoxObj::Callable(LoxFn::User(method.bind(&instance)))),
            None => Err(RuntimeError::UndefinedProperty {
                name: get.name.clone(),
                pos: get.pos,
            }),
        }
    }

    fn visit_set_expr(&mut self, set: &SetUseData) -> Result<LoxObj> {
        let body = self.eval_expr(&set.body)?;
        let instance = match body {
            LoxObj::Instance(instance) => instance,
            _ => return Err(RuntimeError::NotAnInstanceField { pos: set.pos }),
        };
        let obj = self.eval_expr(&set.value)?;
        instance.set_field(&set.name, obj.clone());
        Ok(obj)
    }

    fn visit_this_expr(&mut self, this: &ThisData) -> Result<LoxObj> {
        self.lookup_resolved("this", this.id, this.pos)
    }

    /// `super.m` looks the method up on the superclass but binds it to
    /// the current `this`, one scope below the `super` scope
    fn visit_super_expr(&mut self, sup: &SuperData) -> Result<LoxObj> {
        let depth = match self.caches.get(&sup.id) {
            Some(depth) => *depth,
            None => {
                return Err(RuntimeError::Undefined {
                    name: "super".to_string(),
                    pos: sup.pos,
                })
            }
        };

        let superclass = match self.env.borrow().get_at(depth, "super") {
            Some(LoxObj::Class(class)) => class,
            _ => {
                return Err(RuntimeError::Undefined {
                    name: "super".to_string(),
                    pos: sup.pos,
                })
            }
        };
        let instance = match self.env.borrow().get_at(depth - 1, "this") {
            Some(LoxObj::Instance(instance)) => instance,
            _ => {
                return Err(RuntimeError::Undefined {
                    name: "this".to_string(),
                    pos: sup.pos,
                })
            }
        };

        match superclass.find_method(&sup.method) {
            Some(method) => Ok(LoxObj::Callable(LoxFn::User(method.bind(&instance)))),
            None => Err(RuntimeError::UndefinedProperty {
                name: sup.method.clone(),
                pos: sup.pos,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::{self, Write};
    use std::rc::Rc;

    use crate::analizer::resolver::Resolver;
    use crate::ast::expr::VarUseIdCounter;
    use crate::lexer::{parser::Parser, scanner::Scanner};
    use crate::runtime::{Interpreter, RuntimeError};

    /// Write sink that the test can read back after the interpreter is
    /// done with its half
    #[derive(Clone, Default)]
    struct SharedOut(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedOut {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedOut {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    fn interpreter(out: &SharedOut, echoes_exprs: bool) -> Interpreter {
        Interpreter::with_output(Box::new(out.clone()), echoes_exprs)
    }

    /// Runs the whole pipeline, panicking on static errors and
    /// returning the first runtime error if any. The id counter is the
    /// caller's so that several runs against one interpreter keep node
    /// identities distinct, just like a REPL session.
    fn run_in(
        interpreter: &mut Interpreter,
        counter: &mut VarUseIdCounter,
        src: &str,
    ) -> Result<(), RuntimeError> {
        let (tks, scan_errs) = Scanner::new(src).scan();
        assert!(scan_errs.is_empty(), "scan errors: {:?}", scan_errs);
        let (stmts, parse_errs) = Parser::new(&tks, counter).parse();
        assert!(parse_errs.is_empty(), "parse errors: {:?}", parse_errs);
        let errors = Resolver::new(&mut interpreter.caches).resolve_stmts(&stmts);
        assert!(errors.is_empty(), "resolve errors: {:?}", errors);
        for stmt in stmts.iter() {
            interpreter.interpret(stmt)?;
        }
        Ok(())
    }

    fn run(src: &str) -> String {
        let out = SharedOut::default();
        let mut interpreter = self::interpreter(&out, false);
        let mut counter = VarUseIdCounter::new();
        self::run_in(&mut interpreter, &mut counter, src).unwrap();
        out.text()
    }

    fn run_err(src: &str) -> RuntimeError {
        let out = SharedOut::default();
        let mut interpreter = self::interpreter(&out, false);
        let mut counter = VarUseIdCounter::new();
        self::run_in(&mut interpreter, &mut counter, src).unwrap_err()
    }

    #[test]
    fn arithmetic_and_stringification() {
        assert_eq!(self::run("print 1 + 2 * 3;"), "7\n");
        assert_eq!(self::run("print 10 / 4;"), "2.5\n");
        assert_eq!(self::run("print \"foo\" + \"bar\";"), "foobar\n");
        assert_eq!(self::run("print -(1 + 2);"), "-3\n");
        assert_eq!(self::run("print nil; print true; print !0;"), "nil\ntrue\nfalse\n");
    }

    #[test]
    fn block_scoping_shadows_and_restores() {
        assert_eq!(
            self::run("var a = 1; { var a = 2; print a; } print a;"),
            "2\n1\n"
        );
    }

    #[test]
    fn closures_capture_environments_not_values() {
        let src = "
            fun make() {
                var i = 0;
                fun inc() { i = i + 1; print i; }
                return inc;
            }
            var c = make();
            c(); c(); c();
        ";
        assert_eq!(self::run(src), "1\n2\n3\n");
    }

    #[test]
    fn for_loops_run_their_desugared_form() {
        assert_eq!(
            self::run("for (var i = 0; i < 3; i = i + 1) print i;"),
            "0\n1\n2\n"
        );
    }

    #[test]
    fn break_stops_the_nearest_loop() {
        let src = "
            for (var i = 0; i < 10; i = i + 1) {
                if (i == 2) break;
                print i;
            }
            print \"done\";
        ";
        assert_eq!(self::run(src), "0\n1\ndone\n");

        // only the inner loop stops
        let nested = "
            for (var i = 0; i < 2; i = i + 1) {
                for (var j = 0; j < 10; j = j + 1) {
                    if (j == 1) break;
                    print i + j;
                }
            }
        ";
        assert_eq!(self::run(nested), "0\n1\n");
    }

    #[test]
    fn logic_operators_short_circuit_and_yield_raw_values() {
        assert_eq!(self::run("print \"hi\" or 2;"), "hi\n");
        assert_eq!(self::run("print nil or \"yes\";"), "yes\n");
        assert_eq!(self::run("print nil and 2;"), "nil\n");
        assert_eq!(self::run("print 1 and 2;"), "2\n");

        // the right side only runs when it has to
        let src = "
            fun say(x) { print x; return x; }
            false and say(1);
            true or say(2);
            true and say(3);
            false or say(4);
        ";
        assert_eq!(self::run(src), "3\n4\n");
    }

    #[test]
    fn equality_is_by_value_and_never_errors() {
        assert_eq!(self::run("print 1 == 1;"), "true\n");
        assert_eq!(self::run("print nil == nil;"), "true\n");
        assert_eq!(self::run("print 1 == \"1\";"), "false\n");
        assert_eq!(self::run("print \"a\" != \"b\";"), "true\n");
        // IEEE-754: NaN is not equal to itself
        assert_eq!(self::run("print 0/0 == 0/0;"), "false\n");
    }

    #[test]
    fn methods_bind_this_to_their_instance() {
        assert_eq!(
            self::run("class Cake { taste() { print \"yum\"; } } Cake().taste();"),
            "yum\n"
        );

        // a method stays bound when stored and called later
        let src = "
            class Counter {
                init(n) { this.n = n; }
                get() { return this.n; }
            }
            var c = Counter(5);
            var m = c.get;
            print m();
        ";
        assert_eq!(self::run(src), "5\n");
    }

    #[test]
    fn inheritance_shares_methods_and_super_dispatches_upward() {
        let src = "
            class A { init(n) { this.n = n; } }
            class B < A { show() { print this.n; } }
            B(5).show();
        ";
        assert_eq!(self::run(src), "5\n");

        let sup = "
            class A { cook() { print \"A\"; } }
            class B < A { cook() { super.cook(); print \"B\"; } }
            B().cook();
        ";
        assert_eq!(self::run(sup), "A\nB\n");
    }

    #[test]
    fn initializers_evaluate_to_their_instance() {
        assert_eq!(
            self::run("class A { init() { return; } } print A();"),
            "A instance\n"
        );
        assert_eq!(self::run("class A {} print A; print A();"), "A\nA instance\n");
    }

    #[test]
    fn fields_shadow_methods_and_sets_create_fields() {
        let src = "
            class Box {}
            var b = Box();
            b.value = 1;
            b.value = b.value + 1;
            print b.value;
        ";
        assert_eq!(self::run(src), "2\n");
    }

    #[test]
    fn clock_is_a_native_function() {
        assert_eq!(self::run("print clock() >= 0;"), "true\n");
        assert_eq!(self::run("print clock;"), "<native fn>\n");
    }

    #[test]
    fn functions_print_their_names() {
        assert_eq!(self::run("fun f() {} print f;"), "<fn f>\n");
    }

    #[test]
    fn runtime_errors_carry_their_line() {
        match self::run_err("print \"a\" - 1;") {
            RuntimeError::OperandsMustBeNumbers { pos } => assert_eq!(pos.ln(), 1),
            err => panic!("expected an operands error, got {:?}", err),
        }
        match self::run_err("print 1;\nprint -\"x\";") {
            RuntimeError::OperandMustBeNumber { pos } => assert_eq!(pos.ln(), 2),
            err => panic!("expected an operand error, got {:?}", err),
        }
    }

    #[test]
    fn undefined_names_and_bad_calls_error() {
        assert!(matches!(
            self::run_err("print missing;"),
            RuntimeError::Undefined { .. }
        ));
        assert!(matches!(
            self::run_err("missing = 1;"),
            RuntimeError::Undefined { .. }
        ));
        assert!(matches!(
            self::run_err("\"hi\"();"),
            RuntimeError::NotCallable { .. }
        ));
        assert!(matches!(
            self::run_err("fun f(a) {} f(1, 2);"),
            RuntimeError::WrongArity {
                expected: 1,
                got: 2,
                ..
            }
        ));
        assert!(matches!(
            self::run_err("class A {} A(1);"),
            RuntimeError::WrongArity { .. }
        ));
        assert!(matches!(
            self::run_err("1 .field;"),
            RuntimeError::NotAnInstanceProperty { .. }
        ));
        assert!(matches!(
            self::run_err("1 .field = 2;"),
            RuntimeError::NotAnInstanceField { .. }
        ));
        assert!(matches!(
            self::run_err("class A {} A().missing;"),
            RuntimeError::UndefinedProperty { .. }
        ));
        assert!(matches!(
            self::run_err("var NotAClass = 1; class A < NotAClass {}"),
            RuntimeError::SuperclassNotClass { .. }
        ));
    }

    #[test]
    fn globals_survive_across_runs_like_a_repl_session() {
        let out = SharedOut::default();
        let mut interpreter = self::interpreter(&out, false);
        let mut counter = VarUseIdCounter::new();
        self::run_in(&mut interpreter, &mut counter, "var a = 1;").unwrap();
        self::run_in(&mut interpreter, &mut counter, "print a;").unwrap();
        assert_eq!(out.text(), "1\n");
    }

    #[test]
    fn environment_is_restored_after_a_runtime_error() {
        let out = SharedOut::default();
        let mut interpreter = self::interpreter(&out, false);
        let mut counter = VarUseIdCounter::new();
        let err = self::run_in(
            &mut interpreter,
            &mut counter,
            "var a = 1; { var a = 2; print a - \"x\"; }",
        );
        assert!(err.is_err());
        // back at globals: the outer `a` is visible again
        self::run_in(&mut interpreter, &mut counter, "print a;").unwrap();
        assert_eq!(out.text(), "1\n");
    }

    #[test]
    fn repl_mode_echoes_bare_expressions() {
        let out = SharedOut::default();
        let mut interpreter = self::interpreter(&out, true);
        let mut counter = VarUseIdCounter::new();
        self::run_in(&mut interpreter, &mut counter, "1 + 2;").unwrap();
        self::run_in(&mut interpreter, &mut counter, "var a = 3;").unwrap();
        assert_eq!(out.text(), "3\n");
    }

    #[test]
    fn recursion_works_through_the_declaring_scope() {
        let src = "
            fun fib(n) {
                if (n < 2) return n;
                return fib(n - 1) + fib(n - 2);
            }
            print fib(10);
        ";
        assert_eq!(self::run(src), "55\n");
    }

    #[test]
    fn evaluation_order_is_left_to_right() {
        let src = "
            fun say(x) { print x; return x; }
            say(1) + say(2);
            say(3)(say(4));
        ";
        // the last line errors (1 is not callable) but only after both
        // sides were evaluated in order
        let out = SharedOut::default();
        let mut interpreter = self::interpreter(&out, false);
        let mut counter = VarUseIdCounter::new();
        let err = self::run_in(&mut interpreter, &mut counter, src);
        assert!(matches!(err, Err(RuntimeError::NotCallable { .. })));
        assert_eq!(out.text(), "1\n2\n3\n4\n");
    }
}
