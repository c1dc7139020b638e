//! Command line interface of the `rulox` tree-walk interpreter

pub use anyhow::Result;
use anyhow::anyhow;
use log::debug;
use rustyline::{error::ReadlineError, DefaultEditor};
use std::{
    fs,
    io::{self, BufWriter, Write},
};

use crate::{
    analizer::resolver::Resolver,
    ast::expr::VarUseIdCounter,
    ast::PrettyPrint,
    diag::Reporter,
    lexer::{parser::Parser, scanner::Scanner},
    runtime::Interpreter,
};

/// Exit code of a run that had scan, parse or resolution errors
pub const EXIT_SYNTAX_ERROR: i32 = 65;
/// Exit code of a run that hit a runtime error
pub const EXIT_RUNTIME_ERROR: i32 = 70;

// --------------------------------------------------------------------------------
// API

pub fn parse() -> Result<Cli> {
    let mut cli = Cli::default();
    cli.parse_args()?;
    Ok(cli)
}

#[derive(Default)]
pub struct RunContext {
    /// If true, prints tokens and AST
    pub is_debug: bool,
    /// Is it a read, evaluate and print loop?
    pub is_repl: bool,
}

/// The command line interface
#[derive(Default)]
pub struct Cli {
    pub cx: RunContext,
    pub run_file: Option<String>,
}

impl Cli {
    fn parse_args(&mut self) -> Result<()> {
        let args: Vec<String> = std::env::args().collect();
        for arg in args.iter().skip(1) {
            self.parse_arg(arg.as_str())?;
        }
        self.cx.is_repl = self.run_file.is_none();
        Ok(())
    }

    fn parse_arg(&mut self, arg: &str) -> Result<()> {
        match arg {
            "-d" | "--debug" => self.cx.is_debug = true,
            arg => {
                if self.run_file.is_some() {
                    return Err(anyhow!("Given more than one argument"));
                }
                self.run_file = Some(arg.to_string());
            }
        };
        Ok(())
    }

    /// Runs the file or the REPL, returning the process exit code
    pub fn run(&self) -> Result<i32> {
        if let Some(file) = self.run_file.as_ref() {
            self::run_file(file, &self.cx)
        } else {
            self::run_repl(&self.cx)?;
            Ok(0)
        }
    }
}

// --------------------------------------------------------------------------------
// Running

pub fn run_file(path: &str, cx: &RunContext) -> Result<i32> {
    let src = fs::read_to_string(path)
        .map_err(|why| anyhow!("{} (given path: `{}`)", why, path))?;

    let mut reporter = Reporter::new();
    let mut interpreter = Interpreter::new();
    let mut counter = VarUseIdCounter::new();
    self::run_string(&src, cx, &mut reporter, &mut interpreter, &mut counter);

    Ok(if reporter.had_syntax_error() {
        EXIT_SYNTAX_ERROR
    } else if reporter.had_runtime_error() {
        EXIT_RUNTIME_ERROR
    } else {
        0
    })
}

/// Drives source text through scan → parse → resolve → interpret.
///
/// Every diagnostic goes through the `reporter`, whose flags gate the
/// later stages: the resolver only runs on a program that scanned and
/// parsed cleanly, and the interpreter only runs on one that resolved
/// cleanly.
pub fn run_string(
    source: &str,
    cx: &RunContext,
    reporter: &mut Reporter,
    interpreter: &mut Interpreter,
    counter: &mut VarUseIdCounter,
) {
    // scanning
    let (tks, scan_errors) = Scanner::new(source).scan();
    if cx.is_debug {
        self::print_all_debug("====== tokens ======", &tks);
    }
    for err in scan_errors.iter() {
        reporter.scan_error(err);
    }
    debug!("scanned {} tokens, {} errors", tks.len(), scan_errors.len());

    // parsing
    let (stmts, parse_errors) = Parser::new(&tks, counter).parse();
    if cx.is_debug {
        self::print_all_display(
            "====== AST ======",
            stmts
                .iter()
                .enumerate()
                .map(|(i, s)| format!("{} {}", i, s.pretty_print())),
        );
    }
    for err in parse_errors.iter() {
        reporter.parse_error(err);
    }
    if reporter.had_syntax_error() {
        return;
    }

    // analizing
    let semantic_errors = Resolver::new(&mut interpreter.caches).resolve_stmts(&stmts);
    for err in semantic_errors.iter() {
        reporter.resolve_error(err);
    }
    if reporter.had_syntax_error() {
        return;
    }
    debug!("resolved {} statements", stmts.len());

    // interpretation; a runtime error aborts the rest of the run
    for stmt in stmts.iter() {
        if let Err(why) = interpreter.interpret(stmt) {
            reporter.runtime_error(&why);
            return;
        }
    }
}

// --------------------------------------------------------------------------------
// REPL

pub fn run_repl(cx: &RunContext) -> Result<()> {
    println!("Entered rulox REPL (Ctrl-d to quit)");

    let mut editor = DefaultEditor::new()?;
    let mut reporter = Reporter::new();
    let mut interpreter = Interpreter::repl();
    let mut counter = VarUseIdCounter::new();

    loop {
        match editor.readline(">>> ") {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                self::run_string(&line, cx, &mut reporter, &mut interpreter, &mut counter);
                // errors don't outlive their line; globals do
                reporter.reset();
            }
            // Ctrl-c abandons the current line only
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(why) => return Err(why.into()),
        }
    }

    Ok(())
}

// --------------------------------------------------------------------------------
// utilities

fn print_all_debug<T, U>(header: &str, items: U)
where
    T: std::fmt::Debug,
    U: IntoIterator<Item = T>,
{
    let out = io::stdout();
    let mut out = BufWriter::new(out.lock());
    writeln!(out, "{}", header).unwrap();

    for i in items {
        writeln!(out, "{:?}", i).unwrap();
    }
    writeln!(out).unwrap();
}

fn print_all_display<T, U>(header: &str, items: U)
where
    T: std::fmt::Display,
    U: IntoIterator<Item = T>,
{
    let out = io::stdout();
    let mut out = BufWriter::new(out.lock());
    writeln!(out, "{}", header).unwrap();

    for i in items {
        writeln!(out, "{}", i).unwrap();
    }
    writeln!(out).unwrap();
}
