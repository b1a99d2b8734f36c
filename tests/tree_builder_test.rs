//! Tests for TreeBuilder
//!
//! Heading macros nest by level, environments are opaque to headings,
//! everything else lands under the innermost open node.

use generational_arena::Index;

use flexitex::domain::token::GroupDelimiter;
use flexitex::domain::{DocumentTree, NodeKind, NodeType, RawArgument, Token, TreeBuilder};

fn heading(name: &str, title: &str) -> Token {
    Token::macro_call(name, vec![RawArgument::brace(title)])
}

/// (type, name, first argument) of each child, for compact assertions
fn shape(tree: &DocumentTree, idx: Index) -> Vec<(NodeType, String, String)> {
    tree.children(idx)
        .iter()
        .map(|&c| {
            let node = tree.get_node(c).unwrap();
            (node.node_type(), node.name().to_string(), node.arg(0).to_string())
        })
        .collect()
}

fn child(tree: &DocumentTree, idx: Index, n: usize) -> Index {
    tree.children(idx)[n]
}

#[test]
fn given_mixed_headings_when_build_then_nests_by_level() {
    // Arrange
    let tokens = vec![
        heading("chapter", "A"),
        Token::chars("\nintro\n"),
        heading("section", "B"),
        heading("subsection", "C"),
        Token::chars("x"),
        heading("section", "D"),
    ];

    // Act
    let tree = TreeBuilder::new().build(&tokens);

    // Assert
    let root = tree.root();
    assert_eq!(
        shape(&tree, root),
        vec![(NodeType::Macro, "chapter".into(), "A".into())]
    );
    let chapter = child(&tree, root, 0);
    assert_eq!(
        shape(&tree, chapter),
        vec![
            (NodeType::Text, "text".into(), "".into()),
            (NodeType::Macro, "section".into(), "B".into()),
            (NodeType::Macro, "section".into(), "D".into()),
        ]
    );
    let section_b = child(&tree, chapter, 1);
    let subsection = child(&tree, section_b, 0);
    assert_eq!(tree.get_node(subsection).unwrap().arg(0), "C");
    assert_eq!(shape(&tree, subsection).len(), 1);
}

#[test]
fn given_subsubsection_when_section_follows_then_both_levels_close() {
    let tokens = vec![
        heading("section", "1"),
        heading("subsection", "1.1"),
        heading("subsubsection", "1.1.1"),
        heading("section", "2"),
    ];

    let tree = TreeBuilder::new().build(&tokens);

    let sections = shape(&tree, tree.root());
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[1].2, "2");
}

#[test]
fn given_section_inside_environment_when_build_then_heading_stays_inside() {
    // Arrange
    let tokens = vec![
        heading("section", "A"),
        Token::environment(
            "minipage",
            vec![RawArgument::brace("0.5\\textwidth")],
            vec![heading("section", "Inner"), Token::chars("inside")],
        ),
        heading("section", "B"),
    ];

    // Act
    let tree = TreeBuilder::new().build(&tokens);

    // Assert
    let root = tree.root();
    assert_eq!(
        shape(&tree, root),
        vec![
            (NodeType::Macro, "section".into(), "A".into()),
            (NodeType::Macro, "section".into(), "B".into()),
        ]
    );
    let env = child(&tree, child(&tree, root, 0), 0);
    assert_eq!(tree.get_node(env).unwrap().node_type(), NodeType::Environment);
    assert_eq!(tree.get_node(env).unwrap().arg(0), "0.5\\textwidth");
    let inner = child(&tree, env, 0);
    assert_eq!(tree.get_node(inner).unwrap().arg(0), "Inner");
    assert_eq!(shape(&tree, inner)[0].0, NodeType::Text);
}

#[test]
fn given_many_blank_lines_when_build_then_collapses_to_one_paragraph_break() {
    let tree = TreeBuilder::new().build(&[Token::chars("a\n\n\n\n\nb")]);

    let text = child(&tree, tree.root(), 0);
    assert_eq!(
        tree.get_node(text).unwrap().kind,
        NodeKind::Text("a\n\nb".to_string())
    );
}

#[test]
fn given_empty_chars_when_build_then_no_text_node() {
    let tree = TreeBuilder::new().build(&[Token::chars(""), Token::comment(" c")]);

    assert_eq!(
        shape(&tree, tree.root()),
        vec![(NodeType::Comment, "comment".into(), "".into())]
    );
}

#[test]
fn given_plain_macro_after_heading_when_build_then_attached_to_heading() {
    let tokens = vec![
        heading("section", "A"),
        Token::macro_call("label", vec![RawArgument::brace("sec:a")]),
        Token::bare_macro("item", " "),
    ];

    let tree = TreeBuilder::new().build(&tokens);

    let section = child(&tree, tree.root(), 0);
    assert_eq!(
        shape(&tree, section),
        vec![
            (NodeType::Macro, "label".into(), "sec:a".into()),
            (NodeType::Macro, "item".into(), "".into()),
        ]
    );
}

#[test]
fn given_no_tokens_when_build_then_tree_has_only_root() {
    let tree = TreeBuilder::new().build(&[]);

    assert!(tree.is_empty());
    assert_eq!(tree.len(), 1);
    assert!(tree.get_node(tree.root()).unwrap().is_root());
}

#[test]
fn given_standalone_group_when_build_then_single_trimmed_text_node() {
    // Arrange
    let tokens = vec![Token::group(vec![
        Token::chars("  bold "),
        Token::macro_call("textbf", vec![RawArgument::brace("x")]),
        Token::group(vec![Token::chars("dropped")]),
        Token::chars(" end  "),
    ])];

    // Act
    let tree = TreeBuilder::new().build(&tokens);

    // Assert
    assert_eq!(tree.children(tree.root()).len(), 1);
    let text = child(&tree, tree.root(), 0);
    assert_eq!(
        tree.get_node(text).unwrap().kind,
        NodeKind::Text("bold \\textbf{x} end".to_string())
    );
}

#[test]
fn given_empty_or_blank_group_when_build_then_no_node() {
    let tokens = vec![
        Token::group(vec![]),
        Token::group(vec![Token::chars(" \n\t ")]),
        Token::comment(" kept"),
    ];

    let tree = TreeBuilder::new().build(&tokens);

    assert_eq!(
        shape(&tree, tree.root()),
        vec![(NodeType::Comment, "comment".into(), "".into())]
    );
}

#[test]
fn given_spaced_macro_inside_argument_when_build_then_spelled_without_trailing_space() {
    let spaced = Token::Macro {
        name: "textbf".into(),
        args: vec![RawArgument::brace("x")],
        post_space: " ".into(),
    };
    let tokens = vec![Token::macro_call(
        "caption",
        vec![RawArgument::Group {
            delimiter: GroupDelimiter::Brace,
            body: vec![Token::chars("A "), spaced],
        }],
    )];

    let tree = TreeBuilder::new().build(&tokens);

    let caption = child(&tree, tree.root(), 0);
    assert_eq!(tree.get_node(caption).unwrap().arg(0), "A \\textbf{x}");
}
