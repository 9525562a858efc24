//! LaTeX to plain text normalization.
//!
//! The pipeline is an ordered list of named regex rewrite steps. Each step
//! works on the output of the previous one, so the order matters: comments
//! go before whitespace folding, math and figures go before the generic
//! command rule, and braces and backslashes are cleared last.
//!
//! Matching is textual and non-greedy. Nested braces inside a removed region
//! end the region at the first closing brace, e.g. `\emph{a {b} c}` leaves
//! ` c` behind.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// What a step does with each match.
#[derive(Clone, Copy)]
pub enum Rewrite {
    /// Delete the match.
    Remove,
    /// Replace with a template; `${1}` refers to the first capture group.
    Template(&'static str),
    /// Compute the replacement from the captures.
    With(fn(&Captures) -> String),
}

/// One named rewrite rule of the pipeline.
#[derive(Clone)]
pub struct RewriteStep {
    name: &'static str,
    pattern: Regex,
    rewrite: Rewrite,
}

impl RewriteStep {
    pub fn new(name: &'static str, pattern: Regex, rewrite: Rewrite) -> Self {
        Self { name, pattern, rewrite }
    }

    pub fn name(&self) -> &'static str { self.name }

    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match self.rewrite {
            Rewrite::Remove => self.pattern.replace_all(text, ""),
            Rewrite::Template(template) => self.pattern.replace_all(text, template),
            Rewrite::With(f) => self.pattern.replace_all(text, |caps: &Captures| f(caps)),
        }
    }
}

impl std::fmt::Debug for RewriteStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewriteStep").field("name", &self.name).field("pattern", &self.pattern.as_str()).finish()
    }
}

/// `(name, pattern, rewrite)` for the default pipeline, in application order.
const DEFAULT_STEPS: &[(&str, &str, Rewrite)] = &[
    // `%` to end of line unless escaped as `\%`; the preceding char is kept
    ("strip_comments", r"(^|[^\\])%.*", Rewrite::Template("${1}")),
    ("paragraph_breaks", r"\n\s*\n", Rewrite::Template("\n")),
    ("line_breaks", r"\s*\n\s*", Rewrite::Template(" ")),
    ("collapse_spaces", r"\s{2,}", Rewrite::Template(" ")),
    ("trim", r"^\s+|\s+$", Rewrite::Remove),
    ("remove_graphics", r"\\includegraphics(\[.*?\])?\{.*?\}", Rewrite::Remove),
    ("remove_centering", r"\\centering", Rewrite::Remove),
    ("remove_figures", r"(?s)\\begin\{figure\}.*?\\end\{figure\}", Rewrite::Remove),
    ("remove_inline_math", r"\$.*?\$", Rewrite::Remove),
    ("remove_display_math", r"(?s)\\\[.*?\\\]", Rewrite::Remove),
    ("remove_paren_math", r"\\\(.*?\\\)", Rewrite::Remove),
    // unreachable after remove_display_math
    ("tidy_display_math", r"\\\[(.*?)\\\]", Rewrite::With(tidy_display_math)),
    // inline styling keeps its argument as text
    (
        "unwrap_text_styles",
        r"\\(?:textbf|textit|emph|underline|texttt|textsc|textsf|textrm|textsl|textup|textmd|mbox)\s*\{(.*?)\}",
        Rewrite::Template("${1}"),
    ),
    ("remove_commands", r"\\[a-zA-Z]+(\{.*?\})?", Rewrite::Remove),
    // unreachable after remove_commands
    ("tidy_command_args", r"\\([a-zA-Z]+)\s*\{(.*?)\}", Rewrite::With(tidy_command_args)),
    ("remove_groups", r"\{.*?\}", Rewrite::Remove),
    ("remove_escapes", r"\\", Rewrite::Remove),
    ("strip_residue", r"[{}$%]", Rewrite::Remove),
    ("final_spaces", r"\s{2,}", Rewrite::Template(" ")),
    ("final_trim", r"^\s+|\s+$", Rewrite::Remove),
];

fn tidy_display_math(caps: &Captures) -> String {
    format!("\\[{}\\]", caps[1].trim())
}

fn tidy_command_args(caps: &Captures) -> String {
    format!("\\{}{{{}}}", &caps[1], caps[2].trim())
}

/// An ordered rewrite pipeline.
#[derive(Debug, Clone)]
pub struct Normalizer {
    steps: Vec<RewriteStep>,
}

impl Default for Normalizer {
    fn default() -> Self {
        DEFAULT_NORMALIZER.clone()
    }
}

static DEFAULT_NORMALIZER: LazyLock<Normalizer> = LazyLock::new(|| {
    let steps = DEFAULT_STEPS
        .iter()
        .map(|&(name, pattern, rewrite)| {
            let regex = Regex::new(pattern).expect("built-in normalizer pattern must compile");
            RewriteStep::new(name, regex, rewrite)
        })
        .collect();
    Normalizer { steps }
});

impl Normalizer {
    /// The default pipeline.
    pub fn new() -> Self { Self::default() }

    /// A pipeline with caller-chosen steps, e.g. a reordered default.
    pub fn from_steps(steps: Vec<RewriteStep>) -> Self { Self { steps } }

    pub fn steps(&self) -> &[RewriteStep] { &self.steps }

    pub fn step(&self, name: &str) -> Option<&RewriteStep> {
        self.steps.iter().find(|s| s.name == name)
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name).collect()
    }

    /// Run every step in order. Never fails; malformed markup yields some string.
    pub fn normalize(&self, content: &str) -> String {
        let mut text = content.to_string();
        for step in &self.steps {
            let rewritten = match step.apply(&text) {
                Cow::Owned(rewritten) => Some(rewritten),
                Cow::Borrowed(_) => None,
            };
            if let Some(rewritten) = rewritten {
                text = rewritten;
            }
        }
        text
    }
}

/// Normalize with the default pipeline.
pub fn normalize(content: &str) -> String {
    DEFAULT_NORMALIZER.normalize(content)
}
