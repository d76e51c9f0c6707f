//! Verification program generator
//!
//! Drives one generation run: classify every listing line, synthesize its
//! fragments, apply the profile's filters and emit the program. The run is
//! deterministic; the same listing, rules and configuration always give the
//! same source text.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::{Classification, Classifier, DEFAULT_MAX_SINGLETON_LEN, DEFAULT_NAMESPACE};
use crate::emit::{emit_program, ProgramParts};
use crate::headers::IncludeList;
use crate::listing::SymbolListing;
use crate::rules::RuleSet;
use crate::synth::{Fragment, ObjectCheck, Synthesizer, TableRow};

/// Name fragment marking debug-only library facilities
pub const DEBUG_MARKER: &str = "debug";

/// The only `--debug-symbols` value that keeps debug functions
pub const DEBUG_ENABLED: &str = "true";

/// Default private sub-namespace names, never emitted as functions
pub const DEFAULT_PRIVATE_NAMESPACES: &[&str] = &["private_"];

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Which optional filters a run applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Drop debug functions unless enabled, skip forward-declaration headers
    #[default]
    Filtered,
    /// Emit everything that classifies
    Plain,
}

impl Profile {
    pub fn filters_debug_symbols(&self) -> bool {
        matches!(self, Profile::Filtered)
    }

    pub fn excludes_forward_headers(&self) -> bool {
        matches!(self, Profile::Filtered)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Filtered => f.write_str("filtered"),
            Profile::Plain => f.write_str("plain"),
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "filtered" => Ok(Profile::Filtered),
            "plain" => Ok(Profile::Plain),
            other => Err(format!(
                "unknown profile '{}', expected 'filtered' or 'plain'",
                other
            )),
        }
    }
}

/// Configuration for one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Namespace qualifying every listed symbol
    pub namespace: String,
    pub profile: Profile,
    /// Raw debug flag; only [`DEBUG_ENABLED`] keeps debug functions
    pub debug_symbols: String,
    /// Header paths as given on the command line
    pub headers: Vec<String>,
    /// Lowercase names that are sub-namespaces, not functions
    pub private_namespaces: Vec<String>,
    pub max_singleton_len: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            profile: Profile::default(),
            debug_symbols: "false".to_string(),
            headers: Vec::new(),
            private_namespaces: DEFAULT_PRIVATE_NAMESPACES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_singleton_len: DEFAULT_MAX_SINGLETON_LEN,
        }
    }
}

impl GeneratorConfig {
    pub fn debug_enabled(&self) -> bool {
        self.debug_symbols == DEBUG_ENABLED
    }

    /// Whether a free function is dropped by the debug filter
    pub fn excludes_function(&self, name: &str) -> bool {
        self.profile.filters_debug_symbols()
            && !self.debug_enabled()
            && name.contains(DEBUG_MARKER)
    }

    fn is_private_namespace(&self, name: &str) -> bool {
        self.private_namespaces.iter().any(|p| p == name)
    }
}

/// Split the arguments following the listing into debug flag and headers
///
/// Under [`Profile::Filtered`] the first argument is the debug flag and the
/// rest are headers, unless the flag was given explicitly. Under
/// [`Profile::Plain`] every argument is a header.
pub fn split_command_args(
    profile: Profile,
    explicit_debug: Option<String>,
    mut args: Vec<String>,
) -> (String, Vec<String>) {
    match (profile, explicit_debug) {
        (_, Some(flag)) => (flag, args),
        (Profile::Filtered, None) if !args.is_empty() => {
            let flag = args.remove(0);
            (flag, args)
        }
        _ => ("false".to_string(), args),
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Counters describing one run, for operator visibility
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub lines: usize,
    pub blank_lines: usize,
    /// Non-blank lines matching no symbol shape
    pub skipped_lines: usize,
    pub classes: usize,
    pub templates: usize,
    pub functions: usize,
    pub singletons: usize,
    pub table_rows: usize,
    pub debug_filtered: usize,
    pub private_skipped: usize,
    /// Class/template names seen more than once
    pub duplicate_objects: Vec<String>,
    pub headers_included: usize,
    pub headers_excluded: usize,
}

impl GenerationReport {
    /// Lines that produced at least one fragment
    pub fn recognized(&self) -> usize {
        self.classes + self.templates + self.functions + self.singletons
    }
}

/// Generated source plus its report
#[derive(Debug, Clone)]
pub struct GeneratedProgram {
    pub source: String,
    pub report: GenerationReport,
}

// =============================================================================
// GENERATOR
// =============================================================================

/// Symbol test generator
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
    classifier: Classifier,
    rules: RuleSet,
}

impl Generator {
    /// Generator with the built-in rule set for the configured namespace
    pub fn new(config: GeneratorConfig) -> Self {
        let rules = RuleSet::builtin(&config.namespace);
        Self::with_rules(config, rules)
    }

    /// Generator with a caller-supplied rule set
    ///
    /// Lines are matched against the rule set's namespace, since that is the
    /// namespace every emitted reference is qualified with.
    pub fn with_rules(config: GeneratorConfig, rules: RuleSet) -> Self {
        if config.namespace != rules.namespace() {
            warn!(
                configured = %config.namespace,
                rules = rules.namespace(),
                "namespace differs from rule set, using the rule set's"
            );
        }
        let classifier =
            Classifier::new(rules.namespace()).with_max_singleton_len(config.max_singleton_len);
        Self {
            config,
            classifier,
            rules,
        }
    }

    /// Run one generation over a listing
    pub fn generate(&self, listing: &SymbolListing) -> GeneratedProgram {
        let synth = Synthesizer::new(&self.rules);
        let includes = IncludeList::from_paths(
            &self.config.headers,
            self.config.profile.excludes_forward_headers(),
        );

        let mut report = GenerationReport {
            lines: listing.len(),
            headers_included: includes.includes().len(),
            headers_excluded: includes.excluded().len(),
            ..Default::default()
        };

        let mut objects: Vec<ObjectCheck> = Vec::new();
        let mut functions: Vec<TableRow> = Vec::new();
        let mut singletons: Vec<TableRow> = Vec::new();
        let mut seen_objects: HashSet<String> = HashSet::new();

        for (line_no, line) in listing.numbered() {
            let classification = self.classifier.classify(line);

            match &classification {
                Classification::Unrecognized => {
                    if line.trim().is_empty() {
                        report.blank_lines += 1;
                    } else {
                        debug!(line = line_no, text = line, "skipping unrecognized line");
                        report.skipped_lines += 1;
                    }
                    continue;
                }
                Classification::FreeFunction(name) if self.config.is_private_namespace(name) => {
                    debug!(line = line_no, name = %name, "skipping private namespace member");
                    report.private_skipped += 1;
                    continue;
                }
                Classification::FreeFunction(name) if self.config.excludes_function(name) => {
                    debug!(line = line_no, name = %name, "debug symbols disabled, skipping");
                    report.debug_filtered += 1;
                    continue;
                }
                _ => {}
            }

            match synth.synthesize(&classification) {
                Some(Fragment::Object(check)) => {
                    if !seen_objects.insert(check.name.clone()) {
                        warn!(
                            line = line_no,
                            name = %check.name,
                            "duplicate test function, generated program will not compile"
                        );
                        report.duplicate_objects.push(check.name.clone());
                    }
                    match classification {
                        Classification::ClassTemplate(_) => report.templates += 1,
                        _ => report.classes += 1,
                    }
                    objects.push(check);
                }
                Some(Fragment::Rows(rows)) => {
                    if let Classification::GlobalSingleton(_) = classification {
                        report.singletons += 1;
                        singletons.extend(rows);
                    } else {
                        report.functions += 1;
                        functions.extend(rows);
                    }
                }
                None => {}
            }
        }

        let parts = ProgramParts {
            includes: &includes,
            objects: &objects,
            functions: &functions,
            singletons: &singletons,
        };
        report.table_rows = parts.table_len();
        let source = emit_program(&parts);

        info!(
            namespace = self.classifier.namespace(),
            profile = %self.config.profile,
            classes = report.classes,
            templates = report.templates,
            functions = report.functions,
            singletons = report.singletons,
            table_rows = report.table_rows,
            skipped = report.skipped_lines,
            "generated symbol test program"
        );

        GeneratedProgram { source, report }
    }
}
