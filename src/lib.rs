//! Symbol presence smoke test generator
//!
//! Reads a flat listing of qualified library symbols and writes a C++ program
//! that references every one of them:
//!
//! - each class and class template is constructed once
//! - each free function and global singleton lands in a `{ name, pointer }`
//!   table that is printed at runtime
//!
//! The generated program checks nothing at runtime. Compiling and linking it
//! is the test: a missing, inaccessible or misclassified symbol breaks the
//! build.
//!
//! # Example
//!
//! ```
//! use symcheck::{Generator, GeneratorConfig, SymbolListing};
//!
//! let listing = SymbolListing::from_text("  pwx::CException;\n  pwx::are_locked;\n");
//! let program = Generator::new(GeneratorConfig::default()).generate(&listing);
//!
//! assert!(program.source.contains("static void test_CException(void)"));
//! assert_eq!(program.report.table_rows, 2);
//! ```

pub mod classify;
pub mod emit;
pub mod error;
pub mod generator;
pub mod headers;
pub mod listing;
pub mod rules;
pub mod synth;

pub use classify::{Classification, Classifier, SymbolKind};
pub use error::{Result, SymcheckError};
pub use generator::{
    split_command_args, GeneratedProgram, GenerationReport, Generator, GeneratorConfig, Profile,
};
pub use headers::IncludeList;
pub use listing::SymbolListing;
pub use rules::{ClassRule, FunctionRule, RuleFile, RuleSet, Signature, TemplateRule};
pub use synth::{Fragment, ObjectCheck, Synthesizer, TableRow};
