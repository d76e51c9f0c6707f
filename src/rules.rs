//! Synthesis rules
//!
//! A [`RuleSet`] decides how a classified symbol is referenced in the
//! generated program:
//!
//! - classes: constructor arguments (and any objects those arguments need)
//! - class templates: template parameters and constructor arguments
//! - free functions: bare address, explicit instantiation, or one cast per
//!   overload
//!
//! Special cases are data. The built-in table covers the library's known
//! overloads; a YAML rule file can add or replace entries without touching
//! code.
//!
//! # Rule file example
//!
//! ```yaml
//! classes:
//!   CMatrix:
//!     args: ["3", "3"]
//! templates:
//!   TRingBuffer:
//!     params: [int]
//!     args: ["16"]
//! functions:
//!   lerp:
//!     kind: overloads
//!     signatures:
//!       - returns: float
//!         params: [float, float, float]
//!       - returns: double
//!         params: [double, double, double]
//! patterns:
//!   - pattern: "^get_[a-z]+$"
//!     rule:
//!       kind: instantiate
//!       args: int
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SymcheckError};

// =============================================================================
// BUILT-IN NAME PATTERNS
// =============================================================================

/// Conversion functions, templated on the target type
static CONVERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^to_[a-z_0-9]+$").unwrap());

/// Set operations, overloaded on pointer and reference arguments
static SET_OPERATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^set_[a-z]+$").unwrap());

// =============================================================================
// RULE TYPES
// =============================================================================

/// How a class is constructed in its test function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRule {
    /// Statements emitted before the object, e.g. objects passed by address
    #[serde(default)]
    pub prelude: Vec<String>,
    /// Constructor arguments; empty means default construction
    #[serde(default)]
    pub args: Vec<String>,
}

/// How a class template is instantiated in its test function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRule {
    /// Template parameters, e.g. `[int, int]`
    pub params: Vec<String>,
    #[serde(default)]
    pub prelude: Vec<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

/// One concrete function signature used to select an overload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub returns: String,
    #[serde(default)]
    pub params: Vec<String>,
}

impl Signature {
    /// Same parameter type repeated `arity` times
    pub fn repeated(returns: impl Into<String>, param: &str, arity: usize) -> Self {
        Self {
            returns: returns.into(),
            params: vec![param.to_string(); arity],
        }
    }

    /// Function pointer type, e.g. `bool(*)(float,float)`
    pub fn pointer_type(&self) -> String {
        format!("{}(*)({})", self.returns, self.params.join(","))
    }
}

/// How a free function's address is taken
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunctionRule {
    /// Plain `&ns::name`; the function is neither overloaded nor templated
    Address,
    /// Explicit template instantiation `ns::name<args>`
    Instantiate { args: String },
    /// One `static_cast` per overload, one table row each
    Overloads { signatures: Vec<Signature> },
}

impl FunctionRule {
    /// Number of table rows this rule produces
    pub fn row_count(&self) -> usize {
        match self {
            FunctionRule::Address | FunctionRule::Instantiate { .. } => 1,
            FunctionRule::Overloads { signatures } => signatures.len(),
        }
    }

    /// Whether the rule forces a specific overload or instantiation
    pub fn is_disambiguating(&self) -> bool {
        !matches!(self, FunctionRule::Address)
    }
}

static ADDRESS_RULE: FunctionRule = FunctionRule::Address;

/// A function rule selected by name pattern
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub pattern: Regex,
    pub rule: FunctionRule,
}

/// Defaults used for templates without an explicit rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateDefaults {
    /// Type used for every template parameter
    pub value_type: String,
    /// Name fragment marking key/value containers
    pub associative_marker: String,
    /// Name fragment marking element types that wrap a heap value
    pub element_marker: String,
    /// Initial value of the heap-allocated element data
    pub element_value: String,
    /// Key passed to associative elements
    pub element_key: String,
}

impl Default for TemplateDefaults {
    fn default() -> Self {
        Self {
            value_type: "int".to_string(),
            associative_marker: "Hash".to_string(),
            element_marker: "Element".to_string(),
            element_value: "42".to_string(),
            element_key: "69".to_string(),
        }
    }
}

// =============================================================================
// RULE FILE
// =============================================================================

/// Pattern entry as written in a rule file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternEntry {
    pub pattern: String,
    pub rule: FunctionRule,
}

/// Rule additions loaded from YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub classes: BTreeMap<String, ClassRule>,
    #[serde(default)]
    pub templates: BTreeMap<String, TemplateRule>,
    #[serde(default)]
    pub functions: BTreeMap<String, FunctionRule>,
    #[serde(default)]
    pub patterns: Vec<PatternEntry>,
    #[serde(default)]
    pub template_defaults: Option<TemplateDefaults>,
}

impl RuleFile {
    /// Load from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SymcheckError::RulesRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Load from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

// =============================================================================
// RULE SET
// =============================================================================

/// Lookup structure from symbol name to synthesis rule
#[derive(Debug, Clone)]
pub struct RuleSet {
    namespace: String,
    classes: BTreeMap<String, ClassRule>,
    templates: BTreeMap<String, TemplateRule>,
    template_defaults: TemplateDefaults,
    functions: BTreeMap<String, FunctionRule>,
    patterns: Vec<PatternRule>,
}

impl RuleSet {
    /// Rule set with no special cases at all
    pub fn empty(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            classes: BTreeMap::new(),
            templates: BTreeMap::new(),
            template_defaults: TemplateDefaults::default(),
            functions: BTreeMap::new(),
            patterns: Vec::new(),
        }
    }

    /// The library's known constructor overrides and overload sets
    pub fn builtin(namespace: &str) -> Self {
        let ns = namespace;
        let mut rules = Self::empty(ns);

        // Classes without a default constructor
        rules.classes.insert(
            "CException".to_string(),
            ClassRule {
                prelude: Vec::new(),
                args: ["name", "what", "where", "func", "when"]
                    .iter()
                    .map(|s| format!("\"{}\"", s))
                    .collect(),
            },
        );
        rules.classes.insert(
            "CLockGuard".to_string(),
            ClassRule {
                prelude: vec![format!("{}::CLockable lock_me;", ns)],
                args: vec!["&lock_me".to_string()],
            },
        );
        rules.classes.insert(
            "CSinCosTable".to_string(),
            ClassRule {
                prelude: Vec::new(),
                args: vec!["2".to_string()],
            },
        );

        // Lock helpers over two or three lockables
        let lockable = format!("const {}::CLockable*", ns);
        let lock_overloads = FunctionRule::Overloads {
            signatures: vec![
                Signature::repeated("bool", &lockable, 2),
                Signature::repeated("bool", &lockable, 3),
            ],
        };
        for name in ["are_locked", "try_locks", "unlock_all"] {
            rules
                .functions
                .insert(name.to_string(), lock_overloads.clone());
        }

        // Math helpers
        rules.functions.insert(
            "absDistance".to_string(),
            FunctionRule::Overloads {
                signatures: vec![
                    Signature::repeated("double", "double", 4),
                    Signature::repeated("double", "double", 6),
                ],
            },
        );
        rules.functions.insert(
            "areAlmostEqual".to_string(),
            FunctionRule::Overloads {
                signatures: ["float", "double", "long double"]
                    .iter()
                    .map(|t| Signature::repeated("bool", t, 2))
                    .collect(),
            },
        );
        for name in ["degToRad", "getNormalizedDegree"] {
            rules.functions.insert(
                name.to_string(),
                FunctionRule::Instantiate {
                    args: "double".to_string(),
                },
            );
        }
        rules.functions.insert(
            "readNextValue".to_string(),
            FunctionRule::Instantiate {
                args: "int".to_string(),
            },
        );

        // Name conventions
        rules.patterns.push(PatternRule {
            pattern: CONVERSION_RE.clone(),
            rule: FunctionRule::Instantiate {
                args: "char*".to_string(),
            },
        });

        let set_type = format!("{}::TSet<int>", ns);
        rules.patterns.push(PatternRule {
            pattern: SET_OPERATION_RE.clone(),
            rule: FunctionRule::Overloads {
                signatures: vec![
                    Signature::repeated(
                        format!("{}*", set_type),
                        &format!("const {}* const", set_type),
                        2,
                    ),
                    Signature::repeated(set_type.clone(), &format!("const {}&", set_type), 2),
                ],
            },
        });

        rules
    }

    /// Merge a rule file over this set
    ///
    /// Named entries replace existing ones. File patterns are checked before
    /// the existing patterns.
    pub fn merge(&mut self, file: RuleFile) -> Result<()> {
        debug!(
            classes = file.classes.len(),
            templates = file.templates.len(),
            functions = file.functions.len(),
            patterns = file.patterns.len(),
            "merging rule file"
        );

        self.classes.extend(file.classes);
        self.templates.extend(file.templates);
        self.functions.extend(file.functions);
        if let Some(defaults) = file.template_defaults {
            self.template_defaults = defaults;
        }

        let mut patterns = Vec::with_capacity(file.patterns.len() + self.patterns.len());
        for entry in file.patterns {
            let pattern =
                Regex::new(&entry.pattern).map_err(|e| SymcheckError::InvalidPattern {
                    pattern: entry.pattern.clone(),
                    source: e,
                })?;
            patterns.push(PatternRule {
                pattern,
                rule: entry.rule,
            });
        }
        patterns.append(&mut self.patterns);
        self.patterns = patterns;

        Ok(())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Constructor override for a class, if any
    pub fn class_rule(&self, name: &str) -> Option<&ClassRule> {
        self.classes.get(name)
    }

    /// Instantiation rule for a class template
    ///
    /// Explicit entries win. Otherwise the shape follows the name: key/value
    /// containers get two parameters, element types get a heap value (and a
    /// key when they are associative).
    pub fn template_rule(&self, name: &str) -> TemplateRule {
        if let Some(rule) = self.templates.get(name) {
            return rule.clone();
        }

        let d = &self.template_defaults;
        let associative = name.contains(d.associative_marker.as_str());
        let element = name.contains(d.element_marker.as_str());

        let params = if associative {
            vec![d.value_type.clone(), d.value_type.clone()]
        } else {
            vec![d.value_type.clone()]
        };

        let mut prelude = Vec::new();
        let mut args = Vec::new();
        if element {
            prelude.push(format!(
                "{0}* data = new {0}({1});",
                d.value_type, d.element_value
            ));
            if associative {
                prelude.push(format!("{} key = {};", d.value_type, d.element_key));
                args.push("key".to_string());
            }
            args.push("data".to_string());
        }

        TemplateRule {
            params,
            prelude,
            args,
        }
    }

    /// Address rule for a free function
    ///
    /// Exact names first, then patterns in order, then a plain address.
    pub fn function_rule(&self, name: &str) -> &FunctionRule {
        if let Some(rule) = self.functions.get(name) {
            return rule;
        }
        self.patterns
            .iter()
            .find(|p| p.pattern.is_match(name))
            .map(|p| &p.rule)
            .unwrap_or(&ADDRESS_RULE)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin(crate::classify::DEFAULT_NAMESPACE)
    }
}
