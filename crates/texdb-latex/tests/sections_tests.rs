use texdb_core::Error;
use texdb_latex::sections::{extract_section_titles, section_id_from_include, section_titles_from_source, DocumentLayout};

const ROOT: &str = "\\documentclass{article}
\\begin{document}
\\section{Intro}
\\input{section/1}
\\section{With figure}
\\includegraphics[width=2cm]{img/a.png}
\\section{\\emph{Styled}}
\\input{section/3}
\\section{Trees}
\\input{section/sub/4.tex}
\\section{Last}
\\end{document}
";

#[test]
fn extracts_titles_in_document_order() {
    let titles = section_titles_from_source(ROOT, &DocumentLayout::default()).expect("titles");
    let pairs: Vec<(&str, &str)> = titles.iter().collect();
    assert_eq!(pairs, [("1", "Intro"), ("4", "Trees")]);
}

#[test]
fn missing_body_node_is_a_layout_error() {
    let err = section_titles_from_source("\\section{A}\n", &DocumentLayout::default()).unwrap_err();
    assert!(matches!(err, Error::Layout(_)), "{err}");
}

#[test]
fn body_node_without_children_is_a_layout_error() {
    let err = section_titles_from_source("a\\relax b", &DocumentLayout::default()).unwrap_err();
    assert!(matches!(err, Error::Layout(_)), "{err}");
}

#[test]
fn custom_layout_offsets() {
    let source = "\\begin{document}\\section{Tight}\\input{x/7}\\end{document}";
    let layout = DocumentLayout { body_node: 0, include_offset: 1 };
    let titles = section_titles_from_source(source, &layout).expect("titles");
    assert_eq!(titles.get("7"), Some("Tight"));

    let titles = section_titles_from_source(source, &DocumentLayout { body_node: 0, include_offset: 2 }).expect("titles");
    assert!(titles.is_empty());
}

#[test]
fn include_path_to_identifier() {
    assert_eq!(section_id_from_include("section/1"), "1");
    assert_eq!(section_id_from_include("section/2.tex"), "2");
    assert_eq!(section_id_from_include("a/b/c.draft.tex"), "c");
    assert_eq!(section_id_from_include("plain"), "plain");
}

#[test]
fn root_document_with_invalid_utf8_is_read_lossily() {
    let tmp = tempfile::TempDir::new().unwrap();
    let root = tmp.path().join("main.tex");
    let mut bytes = b"\\documentclass{article}\n\\begin{document}\n\\section{Caf".to_vec();
    bytes.push(0xe9);
    bytes.extend_from_slice(b"}\n\\input{section/1}\n\\end{document}\n");
    std::fs::write(&root, bytes).unwrap();

    let titles = extract_section_titles(&root, &DocumentLayout::default()).expect("titles");
    assert_eq!(titles.get("1"), Some("Caf\u{fffd}"));
}
