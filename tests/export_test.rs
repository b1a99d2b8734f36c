//! Tests for the tree and DOT views

use flexitex::domain::{
    RawArgument, Rule, RuleEngine, RuleSet, RuleTarget, Serializer, Token, TreeBuilder,
    TreeExport,
};

fn tokens() -> Vec<Token> {
    vec![
        Token::macro_call("documentclass", vec![RawArgument::brace("article")]),
        Token::chars("\n"),
        Token::environment(
            "document",
            vec![],
            vec![
                Token::chars("\n"),
                Token::macro_call("section", vec![RawArgument::brace("Intro")]),
                Token::chars("\nHello   world.\n"),
                Token::comment(" a remark"),
            ],
        ),
    ]
}

#[test]
fn given_tree_when_to_tree_string_then_summarizes_each_node() {
    // Arrange
    let tree = TreeBuilder::new().build(&tokens());

    // Act
    let rendered = tree.to_tree_string().to_string();

    // Assert
    assert!(rendered.starts_with("root ("), "{rendered}");
    assert!(rendered.contains("\\documentclass{article} (1 lines)"), "{rendered}");
    assert!(rendered.contains("{document} ("), "{rendered}");
    assert!(rendered.contains("\\section{Intro} ("), "{rendered}");
    assert!(rendered.contains("text \"Hello world.\""), "{rendered}");
    assert!(rendered.contains("% a remark"), "{rendered}");
}

#[test]
fn given_split_tree_when_to_tree_string_then_shows_file_names() {
    let mut tree = TreeBuilder::new().build(&tokens());
    let engine = RuleEngine::new(RuleSet::new(
        "out",
        "main.tex",
        vec![Rule::new(RuleTarget::Macro, "section", "sec-[section].tex")],
    ));
    let root = tree.root();
    Serializer::new(&engine).render(&mut tree, root).unwrap();

    let rendered = tree.to_tree_string().to_string();

    assert!(rendered.contains("\\section{Intro} (") && rendered.contains("-> sec-1.tex"), "{rendered}");
}

#[test]
fn given_full_tree_when_to_dot_then_root_first_and_edges_present() {
    // Arrange
    let tree = TreeBuilder::new().build(&tokens());

    // Act
    let dot = tree.to_dot(false);

    // Assert
    assert!(dot.starts_with("digraph AST {\n  node [fontname=Helvetica];\n"));
    assert!(dot.contains("  0 [label=\"0. root\", style=filled, fillcolor=\"orange\"];"));
    assert!(dot.contains("  1 [label=\"1. documentclass\", style=filled, fillcolor=\"lightblue\"];"));
    assert!(dot.contains("  0 -> 1;"));
    assert!(dot.contains("fillcolor=\"lightgreen\""));
    assert!(dot.ends_with("}\n"));
}

#[test]
fn given_hide_preamble_when_to_dot_then_starts_at_document() {
    let tree = TreeBuilder::new().build(&tokens());

    let dot = tree.to_dot(true);

    assert!(dot.contains("  0 [label=\"1. document\""), "{dot}");
    assert!(!dot.contains("documentclass"), "{dot}");
    assert!(!dot.contains("orange"), "{dot}");
}

#[test]
fn given_no_document_when_to_dot_hidden_then_empty_graph() {
    let tree = TreeBuilder::new().build(&[Token::chars("just text")]);

    let dot = tree.to_dot(true);

    assert_eq!(dot, "digraph AST {\n  node [fontname=Helvetica];\n}\n");
}
