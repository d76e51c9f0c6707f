//! C++ source emission
//!
//! Writes the verification program in four phases. Later phases refer to
//! names declared by earlier ones, so the order is fixed:
//!
//! 1. one `test_<Name>()` function per class or template
//! 2. the `functions` table rows for free functions
//! 3. singleton rows appended to the same table
//! 4. `main()`, calling every test function and printing every table row

use crate::headers::IncludeList;
use crate::synth::{ObjectCheck, TableRow, TEST_OBJECT};

/// Name of the generated `{ name, pointer }` table
pub const TABLE_NAME: &str = "functions";

/// Everything the emitter needs, already synthesized and in listing order
#[derive(Debug, Clone, Copy)]
pub struct ProgramParts<'a> {
    pub includes: &'a IncludeList,
    pub objects: &'a [ObjectCheck],
    pub functions: &'a [TableRow],
    pub singletons: &'a [TableRow],
}

impl ProgramParts<'_> {
    pub fn table_len(&self) -> usize {
        self.functions.len() + self.singletons.len()
    }
}

/// Line-oriented writer for the generated program
#[derive(Debug, Default)]
struct Emitter {
    out: String,
}

impl Emitter {
    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn indented(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push('\t');
        }
        self.line(text);
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }
}

/// Render the complete program source
pub fn emit_program(parts: &ProgramParts<'_>) -> String {
    let mut e = Emitter::default();

    e.line("#include <cstdio>");
    for directive in parts.includes.directives() {
        e.line(&directive);
    }

    // Phase 1: object construction tests
    for check in parts.objects {
        e.blank();
        emit_object_check(&mut e, check);
    }

    // Phases 2 and 3: the pointer table
    let has_table = parts.table_len() > 0;
    if has_table {
        e.blank();
        e.line(&format!("static void* {}[][2] = {{", TABLE_NAME));
        for row in parts.functions.iter().chain(parts.singletons) {
            e.indented(1, &table_row(row));
        }
        e.line("};");
    }

    // Phase 4: entry point
    e.blank();
    e.line("int main(void) {");
    for check in parts.objects {
        e.indented(1, &format!("{}();", check.function_name()));
    }
    if has_table {
        e.blank();
        e.indented(
            1,
            &format!(
                "for (unsigned i = 0; i < sizeof({0})/sizeof(void*)/2; i++)",
                TABLE_NAME
            ),
        );
        e.indented(
            2,
            &format!(
                "printf(\"%16s: %p\\n\", (const char*){0}[i][0], {0}[i][1]);",
                TABLE_NAME
            ),
        );
    }
    e.indented(1, "return 0;");
    e.line("}");

    e.out
}

fn emit_object_check(e: &mut Emitter, check: &ObjectCheck) {
    e.line(&format!("static void {}(void) {{", check.function_name()));
    for stmt in &check.prelude {
        e.indented(1, stmt);
    }
    e.indented(1, &check.declaration());
    e.indented(
        1,
        &format!(
            "printf(\"%16s: %p\\n\", \"{}\", (void*)&{});",
            check.name, TEST_OBJECT
        ),
    );
    e.line("}");
}

fn table_row(row: &TableRow) -> String {
    format!("{{ (void*)\"{}\", {} }},", row.name, row.pointer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;
    use crate::synth::Synthesizer;

    #[test]
    fn test_full_program_layout() {
        let rules = RuleSet::default();
        let synth = Synthesizer::new(&rules);
        let includes = IncludeList::from_paths(&["src/pwx/CLockGuard.h"], true);
        let objects = vec![synth.class_check("CLockGuard")];
        let functions = synth.function_rows("get_trimmed");
        let singletons = vec![synth.singleton_row("PAH")];

        let source = emit_program(&ProgramParts {
            includes: &includes,
            objects: &objects,
            functions: &functions,
            singletons: &singletons,
        });

        let expected = "\
#include <cstdio>
#include \"CLockGuard.h\"

static void test_CLockGuard(void) {
\tpwx::CLockable lock_me;
\tpwx::CLockGuard test_obj(&lock_me);
\tprintf(\"%16s: %p\\n\", \"CLockGuard\", (void*)&test_obj);
}

static void* functions[][2] = {
\t{ (void*)\"get_trimmed\", (void*)pwx::get_trimmed },
\t{ (void*)\"PAH\", (void*)&pwx::PAH },
};

int main(void) {
\ttest_CLockGuard();

\tfor (unsigned i = 0; i < sizeof(functions)/sizeof(void*)/2; i++)
\t\tprintf(\"%16s: %p\\n\", (const char*)functions[i][0], functions[i][1]);
\treturn 0;
}
";
        assert_eq!(source, expected);
    }

    #[test]
    fn test_empty_table_is_omitted() {
        let rules = RuleSet::default();
        let synth = Synthesizer::new(&rules);
        let includes = IncludeList::default();
        let objects = vec![synth.template_check("TSet")];

        let source = emit_program(&ProgramParts {
            includes: &includes,
            objects: &objects,
            functions: &[],
            singletons: &[],
        });

        assert!(!source.contains(TABLE_NAME));
        assert!(source.contains("\ttest_TSet();\n\treturn 0;\n}"));
    }

    #[test]
    fn test_singletons_follow_functions() {
        let rules = RuleSet::default();
        let synth = Synthesizer::new(&rules);
        let includes = IncludeList::default();
        let functions = synth.function_rows("are_locked");
        let singletons = vec![synth.singleton_row("RNG")];

        let source = emit_program(&ProgramParts {
            includes: &includes,
            objects: &[],
            functions: &functions,
            singletons: &singletons,
        });

        let first_lock = source.find("\"are_locked\"").unwrap();
        let rng = source.find("\"RNG\"").unwrap();
        assert!(first_lock < rng);
        assert_eq!(source.matches("(void*)\"are_locked\"").count(), 2);
    }
}
