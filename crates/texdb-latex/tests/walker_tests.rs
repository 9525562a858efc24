use texdb_latex::walker::{parse, ArgKind, Node};

#[test]
fn section_then_input_are_two_apart() {
    let nodes = parse("\\section{Intro}\n\\input{section/1}");
    assert_eq!(nodes.len(), 3);
    assert!(nodes[0].is_macro("section"));
    assert_eq!(nodes[1], Node::Chars("\n".to_string()));
    assert!(nodes[2].is_macro("input"));

    let section = nodes[0].as_macro().unwrap();
    assert!(section.arg(0).is_none());
    assert!(section.arg(1).is_none());
    let title = section.arg(2).unwrap();
    assert_eq!(title.kind, ArgKind::Mandatory);
    assert_eq!(title.first_chars(), Some("Intro"));
}

#[test]
fn starred_section_with_short_title() {
    let nodes = parse("\\section*[Short]{Long title}");
    let section = nodes[0].as_macro().unwrap();
    assert_eq!(section.arg(0).map(|a| a.kind), Some(ArgKind::Star));
    assert_eq!(section.arg(1).and_then(|a| a.first_chars()), Some("Short"));
    assert_eq!(section.arg(2).and_then(|a| a.first_chars()), Some("Long title"));
}

#[test]
fn document_body_is_third_top_level_node() {
    let nodes = parse("\\documentclass[a4paper]{article}\n\\begin{document}\nHi\n\\end{document}\n");
    assert!(nodes[0].is_macro("documentclass"));
    match &nodes[2] {
        Node::Environment(env) => {
            assert_eq!(env.name, "document");
            assert_eq!(env.children, vec![Node::Chars("\nHi\n".to_string())]);
        }
        other => panic!("expected environment, got {other:?}"),
    }
}

#[test]
fn nested_environments_close_in_order() {
    let nodes = parse("\\begin{a}x\\begin{b}y\\end{b}z\\end{a}");
    assert_eq!(nodes.len(), 1);
    let Node::Environment(outer) = &nodes[0] else { panic!("expected environment") };
    assert_eq!(outer.name, "a");
    assert_eq!(outer.children.len(), 3);
    assert!(matches!(&outer.children[1], Node::Environment(inner) if inner.name == "b"));
}

#[test]
fn unclosed_structures_end_at_input_end() {
    let nodes = parse("{open \\begin{figure} $x");
    assert_eq!(nodes.len(), 1);
    let children = nodes[0].children().unwrap();
    assert_eq!(children[0], Node::Chars("open ".to_string()));
    let Node::Environment(env) = &children[1] else { panic!("expected environment") };
    assert!(matches!(&env.children[1], Node::Math(m) if m.content == "x" && !m.display));
}

#[test]
fn mismatched_end_closes_inner_environment() {
    let nodes = parse("\\begin{a}\\begin{b}text\\end{a}after");
    let Node::Environment(outer) = &nodes[0] else { panic!("expected environment") };
    assert_eq!(outer.name, "a");
    assert!(matches!(&outer.children[0], Node::Environment(inner) if inner.name == "b"));
    assert_eq!(nodes[1], Node::Chars("after".to_string()));
}

#[test]
fn comments_math_and_escapes() {
    let nodes = parse("a % note\n\\[ y \\] \\( z \\) 5\\% $$w$$");
    assert_eq!(nodes[0], Node::Chars("a ".to_string()));
    assert_eq!(nodes[1], Node::Comment(" note".to_string()));
    assert!(matches!(&nodes[3], Node::Math(m) if m.display && m.content == " y "));
    assert!(matches!(&nodes[5], Node::Math(m) if !m.display && m.content == " z "));
    assert!(nodes[7].is_macro("%"));
    assert!(matches!(nodes.last(), Some(Node::Math(m)) if m.display && m.content == "w"));
}

#[test]
fn stray_closing_brace_is_text() {
    let nodes = parse("a}b");
    assert_eq!(
        nodes,
        vec![Node::Chars("a".to_string()), Node::Chars("}".to_string()), Node::Chars("b".to_string())]
    );
}
