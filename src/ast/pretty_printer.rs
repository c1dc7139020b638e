//! Prints expressions/statements in a Lisp-ish format (`--debug` output)

use crate::ast::{expr::*, stmt::*};
use std::fmt::Write;

pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

// *****************************
// ***** Pretty print Expr *****
// *****************************

impl PrettyPrint for Expr {
    fn pretty_print(&self) -> String {
        let mut s = String::new();
        self::write_expr(&mut s, self);
        return s;
    }
}

fn oper_str(oper: &BinaryOper) -> &'static str {
    use BinaryOper::*;
    match oper {
        Minus => "-",
        Plus => "+",
        Div => "/",
        Mul => "*",
        Equal => "==",
        NotEqual => "!=",
        Less => "<",
        LessEqual => "<=",
        Greater => ">",
        GreaterEqual => ">=",
    }
}

/// Dispatches a sub function to pretty write an `Expr`
pub fn write_expr(s: &mut String, expr: &Expr) {
    use Expr::*;
    match *expr {
        Literal(ref lit) => match lit {
            LiteralData::Nil => write!(s, "nil").unwrap(),
            LiteralData::Bool(b) => write!(s, "{}", b).unwrap(),
            LiteralData::StringLit(lit) => write!(s, "\"{}\"", lit).unwrap(),
            LiteralData::Number(n) => write!(s, "{}", n).unwrap(),
        },
        Unary(ref unary) => {
            let oper = match unary.oper {
                UnaryOper::Not => "!",
                UnaryOper::Minus => "-",
            };
            write!(s, "({} {})", oper, unary.expr.pretty_print()).unwrap();
        }
        Binary(ref binary) => write!(
            s,
            "({} {} {})",
            self::oper_str(&binary.oper),
            binary.left.pretty_print(),
            binary.right.pretty_print()
        )
        .unwrap(),
        Logic(ref logic) => {
            let oper = match logic.oper {
                LogicOper::Or => "or",
                LogicOper::And => "and",
            };
            write!(
                s,
                "({} {} {})",
                oper,
                logic.left.pretty_print(),
                logic.right.pretty_print()
            )
            .unwrap();
        }
        Grouping(ref group) => write!(s, "(group {})", group.expr.pretty_print()).unwrap(),
        Variable(ref var) => write!(s, "{}", var.name).unwrap(),
        Assign(ref assign) => write!(
            s,
            "(= {} {})",
            assign.assigned.name,
            assign.expr.pretty_print()
        )
        .unwrap(),
        Call(ref call) => {
            write!(s, "(call {}", call.callee.pretty_print()).unwrap();
            for arg in call.args.iter() {
                write!(s, " {}", arg.pretty_print()).unwrap();
            }
            write!(s, ")").unwrap();
        }
        Get(ref get) => write!(s, "(.{} {})", get.name, get.body.pretty_print()).unwrap(),
        Set(ref set) => write!(
            s,
            "(set .{} {} {})",
            set.name,
            set.body.pretty_print(),
            set.value.pretty_print()
        )
        .unwrap(),
        This(_) => write!(s, "this").unwrap(),
        Super(ref sup) => write!(s, "(super {})", sup.method).unwrap(),
    }
}

// *****************************
// ***** Pretty print Stmt *****
// *****************************

impl PrettyPrint for Stmt {
    fn pretty_print(&self) -> String {
        let mut s = String::new();
        self::write_stmt(&mut s, 0, self);
        return s;
    }
}

/// Dispatches a sub function to pretty write a `Stmt`
pub fn write_stmt(s: &mut String, indent: isize, stmt: &Stmt) {
    use Stmt::*;
    match *stmt {
        Expr(ref expr) => write!(s, "(eval {})", expr.pretty_print()).unwrap(),
        Print(ref print) => write!(s, "(print {})", print.expr.pretty_print()).unwrap(),
        Var(ref var) => match var.init {
            Some(ref init) => write!(s, "(var {} {})", var.name, init.pretty_print()).unwrap(),
            None => write!(s, "(var {} nil)", var.name).unwrap(),
        },
        If(ref if_) => self::write_if(s, indent + 1, if_),
        While(ref while_) => {
            write!(s, "(while {}\n", while_.condition.pretty_print()).unwrap();
            self::write_indent(s, indent + 1);
            self::write_stmt(s, indent + 1, &while_.body);
            write!(s, ")").unwrap();
        }
        Block(ref block) => {
            write!(s, "(block ").unwrap();
            self::write_stmts(s, indent + 1, &block.stmts);
            write!(s, ")").unwrap();
        }
        Fn(ref f) => self::write_fn(s, indent, f),
        Return(ref ret) => match ret.value {
            Some(ref value) => write!(s, "(return {})", value.pretty_print()).unwrap(),
            None => write!(s, "(return)").unwrap(),
        },
        Break(_) => write!(s, "(break)").unwrap(),
        Class(ref class) => self::write_class(s, indent, class),
    }
}

pub fn write_indent(s: &mut String, indent: isize) {
    for _ in 0..indent {
        write!(s, "    ").unwrap();
    }
}

pub fn write_params(s: &mut String, params: &Params) {
    write!(s, "(").unwrap();
    if let Some((last, params)) = params.split_last() {
        for param in params.iter() {
            write!(s, "{}, ", param.name).unwrap();
        }
        write!(s, "{}", last.name).unwrap();
    }
    write!(s, ")").unwrap();
}

pub fn write_fn(s: &mut String, indent: isize, f: &FnDeclData) {
    write!(s, "(defn {} ", f.name).unwrap();
    self::write_params(s, &f.params);
    write!(s, "\n").unwrap();
    self::write_indent(s, indent + 1);
    self::write_stmts(s, indent + 1, &f.body);
    write!(s, ")").unwrap();
}

pub fn write_class(s: &mut String, indent: isize, class: &ClassDeclData) {
    match class.superclass {
        Some(ref sup) => write!(s, "(class {} < {}", class.name, sup.name).unwrap(),
        None => write!(s, "(class {}", class.name).unwrap(),
    }
    for method in class.methods.iter() {
        write!(s, "\n").unwrap();
        self::write_indent(s, indent + 1);
        self::write_fn(s, indent + 1, method);
    }
    write!(s, ")").unwrap();
}

pub fn write_stmts(s: &mut String, indent: isize, stmts: &[Stmt]) {
    if stmts.len() == 1 {
        self::write_stmt(s, indent, &stmts[0]);
        return;
    }
    match stmts.split_last() {
        Some((last, stmts)) => {
            for stmt in stmts {
                self::write_stmt(s, indent, stmt);
                write!(s, "\n").unwrap();
                self::write_indent(s, indent);
            }
            self::write_stmt(s, indent, last);
        }
        None => {}
    }
}

pub fn write_if(s: &mut String, indent: isize, if_: &IfData) {
    write!(s, "(if {} ", if_.condition.pretty_print()).unwrap();
    self::write_stmt(s, indent + 1, &if_.if_true);
    match if_.if_false {
        Some(ref else_) => {
            write!(s, " ").unwrap();
            self::write_stmt(s, indent + 1, else_);
            write!(s, ")").unwrap();
        }
        None => write!(s, ")").unwrap(),
    }
}

/// Tests expression printing
#[cfg(test)]
mod tests {
    use crate::ast::expr::*;
    use crate::ast::pretty_printer::PrettyPrint;
    use crate::lexer::token::Location;

    /// Prints this: (* (- 123) (group 45.67))
    #[test]
    fn operator_nesting() {
        let pos = Location::initial();
        let expr = Expr::binary(
            Expr::unary(UnaryOper::Minus, Expr::literal(123.0.into()), pos),
            BinaryOper::Mul,
            pos,
            Expr::group(Expr::literal(45.67.into())),
        );
        assert_eq!(expr.pretty_print(), "(* (- 123) (group 45.67))");
    }

    #[test]
    fn literals() {
        assert_eq!(Expr::literal(true.into()).pretty_print(), "true");
        assert_eq!(
            Expr::literal("hi".to_string().into()).pretty_print(),
            "\"hi\""
        );
        assert_eq!(Expr::literal(LiteralData::Nil).pretty_print(), "nil");
    }
}
