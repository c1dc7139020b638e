//! Diagnostics. Every stage hands its errors to the `Reporter`; no
//! other component writes to stderr.

use crate::analizer::resolver::SemanticError;
use crate::lexer::parser::ParseError;
use crate::lexer::scanner::ScanError;
use crate::runtime::RuntimeError;

/// Accumulates what went wrong during one run and formats the
/// human-readable diagnostics.
///
/// A file run keeps its flags for the exit code; the REPL calls
/// `reset` after every line.
#[derive(Default)]
pub struct Reporter {
    had_syntax_error: bool,
    had_runtime_error: bool,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn had_syntax_error(&self) -> bool {
        self.had_syntax_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    pub fn reset(&mut self) {
        self.had_syntax_error = false;
        self.had_runtime_error = false;
    }

    /// Scan errors only know a line, not a lexeme
    pub fn scan_error(&mut self, err: &ScanError) {
        self.had_syntax_error = true;
        eprintln!("[line {}] Error: {}", err.pos().ln(), err);
    }

    pub fn parse_error(&mut self, err: &ParseError) {
        self.had_syntax_error = true;
        match err.found() {
            Some(token) if token.is_eof() => {
                eprintln!("[line {}] Error at end: {}", token.pos.ln(), err);
            }
            Some(token) => {
                eprintln!("[line {}] Error at '{}': {}", token.pos.ln(), token.lexeme, err);
            }
            None => eprintln!("Error: {}", err),
        }
    }

    pub fn resolve_error(&mut self, err: &SemanticError) {
        self.had_syntax_error = true;
        eprintln!(
            "[line {}] Error at '{}': {}",
            err.pos().ln(),
            err.lexeme(),
            err
        );
    }

    pub fn runtime_error(&mut self, err: &RuntimeError) {
        self.had_runtime_error = true;
        eprintln!("{}\n[line {}]", err, err.pos().ln());
    }
}

#[cfg(test)]
mod tests {
    use crate::diag::Reporter;
    use crate::lexer::scanner::ScanError;
    use crate::lexer::token::Location;
    use crate::runtime::RuntimeError;

    #[test]
    fn flags_accumulate_and_reset() {
        let mut reporter = Reporter::new();
        assert!(!reporter.had_syntax_error());
        assert!(!reporter.had_runtime_error());

        reporter.scan_error(&ScanError::UnexpectedCharacter('#', Location::initial()));
        assert!(reporter.had_syntax_error());

        reporter.runtime_error(&RuntimeError::NotCallable {
            pos: Location::initial(),
        });
        assert!(reporter.had_runtime_error());

        reporter.reset();
        assert!(!reporter.had_syntax_error());
        assert!(!reporter.had_runtime_error());
    }
}
