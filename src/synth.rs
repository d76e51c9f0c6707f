//! Code fragment synthesis
//!
//! Turns a [`Classification`] into the C++ fragments that reference it:
//! an [`ObjectCheck`] for classes and templates, or [`TableRow`]s for
//! functions and singletons. Every fragment resolves to exactly one
//! overload or instantiation as long as the [`RuleSet`] knows the symbol.

use crate::classify::{Classification, SymbolKind};
use crate::rules::{FunctionRule, RuleSet};

/// Name of the local object built in every test function
pub const TEST_OBJECT: &str = "test_obj";

/// A test function body constructing one instance of a class or template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectCheck {
    pub kind: SymbolKind,
    /// Unqualified symbol name, also used in `test_<name>`
    pub name: String,
    /// Fully qualified type, with template parameters if any
    pub type_expr: String,
    /// Statements preceding the object declaration
    pub prelude: Vec<String>,
    /// Constructor arguments
    pub args: Vec<String>,
}

impl ObjectCheck {
    pub fn function_name(&self) -> String {
        format!("test_{}", self.name)
    }

    /// The object declaration, e.g. `pwx::TSet<int> test_obj;`
    pub fn declaration(&self) -> String {
        if self.args.is_empty() {
            format!("{} {};", self.type_expr, TEST_OBJECT)
        } else {
            format!("{} {}({});", self.type_expr, TEST_OBJECT, self.args.join(", "))
        }
    }

    /// Whether the object uses the default constructor
    pub fn is_nullary(&self) -> bool {
        self.args.is_empty()
    }
}

/// One `{ name, pointer }` entry of the symbol table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub kind: SymbolKind,
    pub name: String,
    /// Expression already cast to `void*`
    pub pointer: String,
}

/// Output of one recognized line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Object(ObjectCheck),
    Rows(Vec<TableRow>),
}

/// Applies a rule set to classified symbols
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer<'a> {
    rules: &'a RuleSet,
}

impl<'a> Synthesizer<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    pub fn synthesize(&self, classification: &Classification) -> Option<Fragment> {
        match classification {
            Classification::Class(name) => Some(Fragment::Object(self.class_check(name))),
            Classification::ClassTemplate(name) => {
                Some(Fragment::Object(self.template_check(name)))
            }
            Classification::FreeFunction(name) => Some(Fragment::Rows(self.function_rows(name))),
            Classification::GlobalSingleton(name) => {
                Some(Fragment::Rows(vec![self.singleton_row(name)]))
            }
            Classification::Unrecognized => None,
        }
    }

    pub fn class_check(&self, name: &str) -> ObjectCheck {
        let rule = self.rules.class_rule(name).cloned().unwrap_or_default();
        ObjectCheck {
            kind: SymbolKind::Class,
            name: name.to_string(),
            type_expr: self.qualify(name),
            prelude: rule.prelude,
            args: rule.args,
        }
    }

    pub fn template_check(&self, name: &str) -> ObjectCheck {
        let rule = self.rules.template_rule(name);
        ObjectCheck {
            kind: SymbolKind::ClassTemplate,
            name: name.to_string(),
            type_expr: format!("{}<{}>", self.qualify(name), rule.params.join(",")),
            prelude: rule.prelude,
            args: rule.args,
        }
    }

    /// One row per overload, in rule order
    pub fn function_rows(&self, name: &str) -> Vec<TableRow> {
        let qualified = self.qualify(name);
        let row = |pointer: String| TableRow {
            kind: SymbolKind::FreeFunction,
            name: name.to_string(),
            pointer,
        };

        match self.rules.function_rule(name) {
            FunctionRule::Address => vec![row(format!("(void*){}", qualified))],
            FunctionRule::Instantiate { args } => {
                vec![row(format!("(void*){}<{}>", qualified, args))]
            }
            FunctionRule::Overloads { signatures } => signatures
                .iter()
                .map(|sig| {
                    row(format!(
                        "(void*)static_cast<{}>(&{})",
                        sig.pointer_type(),
                        qualified
                    ))
                })
                .collect(),
        }
    }

    pub fn singleton_row(&self, name: &str) -> TableRow {
        TableRow {
            kind: SymbolKind::GlobalSingleton,
            name: name.to_string(),
            pointer: format!("(void*)&{}", self.qualify(name)),
        }
    }

    fn qualify(&self, name: &str) -> String {
        format!("{}::{}", self.rules.namespace(), name)
    }
}
