//! Tests for the Serializer
//!
//! - Without rules the output reproduces the input token stream
//! - A split node becomes its own artifact plus `\input{name}` at the call site
//! - Nested artifacts precede their parents; the main file is last

use std::path::PathBuf;

use flexitex::domain::serializer::include_directive;
use flexitex::domain::{
    Artifact, DomainError, NodeType, RawArgument, Rule, RuleEngine, RuleSet, RuleTarget,
    Serializer, Token, TreeBuilder,
};

fn heading(name: &str, title: &str) -> Token {
    Token::macro_call(name, vec![RawArgument::brace(title)])
}

fn engine(rules: Vec<Rule>) -> RuleEngine {
    RuleEngine::new(RuleSet::new("out", "main.tex", rules))
}

fn render(tokens: &[Token], rules: Vec<Rule>) -> Vec<Artifact> {
    let mut tree = TreeBuilder::new().build(tokens);
    let root = tree.root();
    let engine = engine(rules);
    Serializer::new(&engine).render(&mut tree, root).unwrap()
}

fn artifact(path: &str, content: &str) -> Artifact {
    Artifact {
        path: PathBuf::from(path),
        content: content.to_string(),
    }
}

fn article() -> Vec<Token> {
    vec![
        Token::macro_call("documentclass", vec![RawArgument::bracket("11pt"), RawArgument::brace("article")]),
        Token::chars("\n"),
        Token::macro_call("newcommand", vec![RawArgument::macro_ref("\\R"), RawArgument::brace("\\mathbb{R}")]),
        Token::chars("\n"),
        Token::environment(
            "document",
            vec![],
            vec![
                Token::chars("\n"),
                heading("section", "Intro"),
                Token::chars("\nHello world.\n"),
                Token::comment(" a remark"),
                Token::chars("\n"),
                Token::environment(
                    "itemize",
                    vec![],
                    vec![
                        Token::chars("\n"),
                        Token::bare_macro("item", " "),
                        Token::chars("first\n"),
                    ],
                ),
                Token::chars("\n"),
                heading("subsection", "Detail"),
                Token::chars("\nMore.\n"),
            ],
        ),
        Token::chars("\n"),
    ]
}

#[test]
fn given_no_rules_when_render_then_reproduces_input() {
    // Arrange
    let tokens = article();
    let expected: String = tokens.iter().map(Token::verbatim).collect();

    // Act
    let artifacts = render(&tokens, vec![]);

    // Assert
    assert_eq!(artifacts, vec![artifact("out/main.tex", &expected)]);
    assert!(expected.contains("\\newcommand\\R{\\mathbb{R}}"));
    assert!(expected.contains("\\item first"));
}

#[test]
fn given_section_rule_when_render_then_each_section_split() {
    let tokens = vec![
        heading("section", "A"),
        Token::chars("\na\n"),
        heading("section", "B"),
        Token::chars("\nb\n"),
    ];
    let rules = vec![Rule::new(RuleTarget::Macro, "section", "sec-[section].tex")];

    let artifacts = render(&tokens, rules);

    assert_eq!(
        artifacts,
        vec![
            artifact("out/sec-1.tex", "\\section{A}\na\n"),
            artifact("out/sec-2.tex", "\\section{B}\nb\n"),
            artifact("out/main.tex", "\\input{sec-1.tex}\n\\input{sec-2.tex}\n"),
        ]
    );
}

#[test]
fn given_depth_condition_when_render_then_nested_figure_stays_inline() {
    let tokens = vec![
        Token::environment(
            "figure",
            vec![],
            vec![
                Token::chars("a"),
                Token::environment("figure", vec![], vec![Token::chars("b")]),
            ],
        ),
        Token::chars("\n"),
        Token::environment("figure", vec![], vec![Token::chars("c")]),
    ];
    let rules = vec![
        Rule::new(RuleTarget::Environment, "figure", "fig-<index>.tex").with_condition("<depth> = 0"),
    ];

    let artifacts = render(&tokens, rules);

    assert_eq!(
        artifacts,
        vec![
            artifact(
                "out/fig-1.tex",
                "\\begin{figure}a\\begin{figure}b\\end{figure}\\end{figure}"
            ),
            artifact("out/fig-2.tex", "\\begin{figure}c\\end{figure}"),
            artifact("out/main.tex", "\\input{fig-1.tex}\n\n\\input{fig-2.tex}\n"),
        ]
    );
}

#[test]
fn given_nested_splits_when_render_then_children_precede_parents() {
    let tokens = vec![
        heading("section", "A"),
        heading("subsection", "B"),
        Token::chars("x"),
    ];
    let rules = vec![
        Rule::new(RuleTarget::Macro, "section", "s-<index>.tex"),
        Rule::new(RuleTarget::Macro, "subsection", "ss-[section]-<index>.tex"),
    ];

    let artifacts = render(&tokens, rules);

    let paths: Vec<_> = artifacts.iter().map(|a| a.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("out/ss-1-1.tex"),
            PathBuf::from("out/s-1.tex"),
            PathBuf::from("out/main.tex"),
        ]
    );
    assert_eq!(artifacts[0].content, "\\subsection{B}x");
    assert_eq!(
        artifacts[1].content,
        format!("\\section{{A}}{}", include_directive("ss-1-1.tex"))
    );
}

#[test]
fn given_split_tree_when_rendered_twice_then_identical_artifacts() {
    // Arrange
    let mut tree = TreeBuilder::new().build(&article());
    let root = tree.root();
    let engine = engine(vec![
        Rule::new(RuleTarget::Environment, "itemize", "list-[section].tex"),
        Rule::new(RuleTarget::Macro, "section", "[name:chapter]-<index>.tex"),
    ]);
    let serializer = Serializer::new(&engine);

    // Act
    let first = serializer.render(&mut tree, root).unwrap();
    let second = serializer.render(&mut tree, root).unwrap();

    // Assert
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
    assert_eq!(first[0].path, PathBuf::from("out/list-1.tex"));
    assert_eq!(first[1].path, PathBuf::from("out/[name:chapter]-1.tex"));
}

#[test]
fn given_non_root_node_when_render_then_contract_violation() {
    let mut tree = TreeBuilder::new().build(&[heading("section", "A")]);
    let section = tree.children(tree.root())[0];
    let engine = engine(vec![]);

    let err = Serializer::new(&engine).render(&mut tree, section).unwrap_err();

    assert!(matches!(err, DomainError::NotRoot(NodeType::Macro)));
}

#[test]
fn given_split_node_when_render_then_file_name_recorded_on_node() {
    let mut tree = TreeBuilder::new().build(&[heading("section", "A")]);
    let root = tree.root();
    let engine = engine(vec![Rule::new(RuleTarget::Macro, "section", "a.tex")]);

    Serializer::new(&engine).render(&mut tree, root).unwrap();

    let section = tree.children(root)[0];
    assert_eq!(tree.get_node(section).unwrap().file_name(), Some("a.tex"));
}
