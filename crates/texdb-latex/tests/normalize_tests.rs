use texdb_latex::normalize::{normalize, Normalizer};

const MALFORMED: &[&str] = &[
    "",
    "\\",
    "{",
    "}",
    "$",
    "%",
    "50\\% of the grade",
    "\\[ never closed",
    "\\( never closed",
    "$ never closed",
    "{{nested {deep}}}",
    "\\begin{figure} never closed",
    "\\textbf{\\emph{x}}",
    "line\\\\%comment after a forced break",
    "\t\ttabs\r\nand crlf\r\n",
    "\\section*[short]{Long {title}}",
    "\\$5 and \\{set\\}",
];

#[test]
fn reference_example() {
    let input = "Hello \\textbf{world} % comment\n\nMore text $x=1$ end.";
    assert_eq!(normalize(input), "Hello world More text end.");
}

#[test]
fn output_has_no_markup_characters() {
    for input in MALFORMED {
        let out = normalize(input);
        for forbidden in ['%', '{', '}', '\\', '$'] {
            assert!(!out.contains(forbidden), "{input:?} -> {out:?} still contains {forbidden:?}");
        }
    }
}

#[test]
fn normalize_is_idempotent() {
    let samples = MALFORMED.iter().copied().chain([
        "A \\emph{simple} sentence.\n\nSecond paragraph with $a+b$ math.",
        "\\begin{figure}[h]\n\\centering\n\\includegraphics[width=3cm]{x.png}\n\\end{figure}\nAfter.",
    ]);
    for input in samples {
        let once = normalize(input);
        assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
    }
}

#[test]
fn whitespace_is_collapsed_and_trimmed() {
    assert_eq!(normalize("  one\n two  \n\n\n three\t\tfour  "), "one two three four");
}

#[test]
fn figures_and_display_math_span_lines() {
    let input = "Before.\n\\begin{figure}\n  \\centering\n  \\caption{Plot}\n\\end{figure}\nMiddle \\[\n a^2 + b^2\n\\] after.";
    assert_eq!(normalize(input), "Before. Middle after.");
}

#[test]
fn escaped_percent_is_not_a_comment() {
    assert_eq!(normalize("About 50\\% of cases % really?\nare easy."), "About 50 of cases are easy.");
}

#[test]
fn nested_braces_truncate_at_first_close() {
    // textual matching: a braced argument ends at the first `}`
    assert_eq!(normalize("\\textbf{a {b} c} d"), "a d");
    assert_eq!(normalize("x \\foo{a {b} c} y"), "x c y");
}

#[test]
fn default_pipeline_order() {
    let names = Normalizer::new().step_names();
    assert_eq!(
        names,
        [
            "strip_comments",
            "paragraph_breaks",
            "line_breaks",
            "collapse_spaces",
            "trim",
            "remove_graphics",
            "remove_centering",
            "remove_figures",
            "remove_inline_math",
            "remove_display_math",
            "remove_paren_math",
            "tidy_display_math",
            "unwrap_text_styles",
            "remove_commands",
            "tidy_command_args",
            "remove_groups",
            "remove_escapes",
            "strip_residue",
            "final_spaces",
            "final_trim",
        ]
    );
}

fn apply(step: &str, input: &str) -> String {
    let normalizer = Normalizer::new();
    let step = normalizer.step(step).unwrap_or_else(|| panic!("no step {step}"));
    step.apply(input).into_owned()
}

#[test]
fn step_strip_comments() {
    assert_eq!(apply("strip_comments", "a % c\nb"), "a \nb");
    assert_eq!(apply("strip_comments", "% whole line\nb"), "\nb");
    assert_eq!(apply("strip_comments", "50\\% kept"), "50\\% kept");
}

#[test]
fn step_paragraph_and_line_breaks() {
    assert_eq!(apply("paragraph_breaks", "a\n  \n\nb"), "a\nb");
    assert_eq!(apply("line_breaks", "a  \n  b"), "a b");
}

#[test]
fn step_remove_graphics() {
    assert_eq!(apply("remove_graphics", "x\\includegraphics[width=2cm]{a.png}y"), "xy");
    assert_eq!(apply("remove_graphics", "x\\includegraphics{a.png}y"), "xy");
}

#[test]
fn step_math_regions() {
    assert_eq!(apply("remove_inline_math", "a $x$ b $y$"), "a  b ");
    assert_eq!(apply("remove_display_math", "a \\[\nx\n\\] b"), "a  b");
    assert_eq!(apply("remove_paren_math", "a \\(x\\) b"), "a  b");
}

#[test]
fn step_tidy_display_math_trims_inside() {
    assert_eq!(apply("tidy_display_math", "\\[  x + y  \\]"), "\\[x + y\\]");
}

#[test]
fn step_remove_commands_takes_one_argument() {
    assert_eq!(apply("remove_commands", "\\label{eq:1} text \\noindent"), " text ");
}

#[test]
fn step_tidy_command_args_trims_argument() {
    assert_eq!(apply("tidy_command_args", "\\textbf {  bold }"), "\\textbf{bold}");
}

#[test]
fn step_remove_groups_and_escapes() {
    assert_eq!(apply("remove_groups", "a {b} c {d}"), "a  c ");
    assert_eq!(apply("remove_escapes", "a\\,b\\\\"), "a,b");
}

#[test]
fn reordering_steps_changes_result() {
    let default = Normalizer::new();
    let mut steps = default.steps().to_vec();
    let unwrap = steps.iter().position(|s| s.name() == "unwrap_text_styles").unwrap();
    let remove = steps.iter().position(|s| s.name() == "remove_commands").unwrap();
    steps.swap(unwrap, remove);
    let reordered = Normalizer::from_steps(steps);

    assert_eq!(default.normalize("keep \\textbf{bold} text"), "keep bold text");
    assert_eq!(reordered.normalize("keep \\textbf{bold} text"), "keep text");
}
