//! Tests for RuleEngine decisions and placeholder resolution

use generational_arena::Index;

use flexitex::domain::{
    DocumentTree, DomainError, RawArgument, Rule, RuleEngine, RuleSet, RuleTarget, Token,
    TreeBuilder,
};

fn heading(name: &str, title: &str) -> Token {
    Token::macro_call(name, vec![RawArgument::brace(title)])
}

fn figure(body: Vec<Token>) -> Token {
    Token::environment("figure", vec![], body)
}

fn engine(rules: Vec<Rule>) -> RuleEngine {
    RuleEngine::new(RuleSet::new("out", "main.tex", rules))
}

/// Indices in pre-order whose node has the given name
fn find_all(tree: &DocumentTree, name: &str) -> Vec<Index> {
    tree.iter()
        .filter(|(_, n)| n.name() == name)
        .map(|(idx, _)| idx)
        .collect()
}

fn sample_tree() -> DocumentTree {
    TreeBuilder::new().build(&[
        heading("chapter", "Getting Started"),
        heading("section", "Related Work: An Overview"),
        Token::chars("\nsome words\nand more\n"),
        figure(vec![Token::chars("a"), figure(vec![Token::chars("b")])]),
        heading("section", "Method"),
        Token::chars("\n"),
        figure(vec![Token::chars("c")]),
    ])
}

// ============================================================
// decide()
// ============================================================

#[test]
fn given_no_matching_rule_when_decide_then_inline() {
    let tree = sample_tree();
    let engine = engine(vec![Rule::new(RuleTarget::Environment, "table", "t.tex")]);

    for (idx, _) in tree.iter() {
        assert_eq!(engine.decide(&tree, idx).unwrap(), None);
    }
}

#[test]
fn given_section_rule_when_decide_then_uses_scoped_ordinal() {
    // Arrange
    let tree = sample_tree();
    let engine = engine(vec![Rule::new(RuleTarget::Macro, "section", "sec-[section].tex")]);
    let sections = find_all(&tree, "section");

    // Act
    let names: Vec<_> = sections
        .iter()
        .map(|&s| engine.decide(&tree, s).unwrap())
        .collect();

    // Assert
    assert_eq!(
        names,
        vec![Some("sec-1.tex".to_string()), Some("sec-2.tex".to_string())]
    );
}

#[test]
fn given_depth_condition_when_decide_then_only_outer_figures_split() {
    let tree = sample_tree();
    let engine = engine(vec![Rule::new(
        RuleTarget::Environment,
        "figure",
        "fig-[section]-<index>.tex",
    )
    .with_condition("<depth> = 0")]);
    let figures = find_all(&tree, "figure");

    let names: Vec<_> = figures
        .iter()
        .map(|&f| engine.decide(&tree, f).unwrap())
        .collect();

    assert_eq!(
        names,
        vec![
            Some("fig-1-1.tex".to_string()),
            None,
            Some("fig-2-1.tex".to_string()),
        ]
    );
}

#[test]
fn given_failing_condition_when_decide_then_next_rule_is_tried() {
    let tree = sample_tree();
    let engine = engine(vec![
        Rule::new(RuleTarget::Macro, "section", "long.tex").with_condition("<length> > 6"),
        Rule::new(RuleTarget::Macro, "section", "short-<index>.tex"),
    ]);
    let sections = find_all(&tree, "section");

    assert_eq!(
        engine.decide(&tree, sections[0]).unwrap(),
        Some("long.tex".to_string())
    );
    assert_eq!(
        engine.decide(&tree, sections[1]).unwrap(),
        Some("short-2.tex".to_string())
    );
}

#[test]
fn given_invalid_condition_when_decide_then_error() {
    let tree = sample_tree();
    let engine = engine(vec![
        Rule::new(RuleTarget::Macro, "chapter", "c.tex").with_condition("<length> + 1")
    ]);
    let chapter = find_all(&tree, "chapter")[0];

    let err = engine.decide(&tree, chapter).unwrap_err();

    assert!(matches!(err, DomainError::Condition { .. }));
}

// ============================================================
// placeholders
// ============================================================

#[test]
fn given_name_placeholder_when_substitute_then_uses_normalized_heading_title() {
    let tree = sample_tree();
    let engine = engine(vec![]);
    let figure = find_all(&tree, "figure")[0];

    let text = engine
        .substitute(&tree, figure, "[name:chapter]/[name:section].tex")
        .unwrap();

    assert_eq!(text, "getting_started/related_work_an_overview.tex");
}

#[test]
fn given_name_placeholder_on_heading_itself_when_substitute_then_uses_enclosing_one() {
    let tree = sample_tree();
    let engine = engine(vec![]);
    let section = find_all(&tree, "section")[1];

    let text = engine.substitute(&tree, section, "[name:section]").unwrap();

    assert_eq!(text, "[name:section]");
}

#[test]
fn given_unknown_structural_name_when_substitute_then_error() {
    let tree = sample_tree();
    let engine = engine(vec![]);
    let figure = find_all(&tree, "figure")[0];

    let err = engine.substitute(&tree, figure, "[name:figure].tex").unwrap_err();

    assert!(matches!(err, DomainError::UnknownStructuralMacro(ref n) if n == "figure"));
    assert_eq!(err.to_string(), "[name:figure] is not a valid structural macro");
}

#[test]
fn given_unresolvable_placeholders_when_substitute_then_kept_literally() {
    let tree = sample_tree();
    let engine = engine(vec![]);
    let chapter = find_all(&tree, "chapter")[0];

    let text = engine
        .substitute(&tree, chapter, "[part]-<colour>-<index>")
        .unwrap();

    assert_eq!(text, "[part]-<colour>-1");
}

#[test]
fn given_attribute_placeholders_when_substitute_then_resolves_each() {
    // Arrange
    let tree = sample_tree();
    let engine = engine(vec![]);
    let section = find_all(&tree, "section")[0];
    let inner_figure = find_all(&tree, "figure")[1];

    // Act
    let section_text = engine
        .substitute(&tree, section, "<type>:<name>:<level>:<children>:<width>:<arg>")
        .unwrap();
    let figure_text = engine
        .substitute(&tree, inner_figure, "<depth>/<level>/<length>")
        .unwrap();

    // Assert
    assert_eq!(section_text, "macro:section:1:2:10:Related Work: An Overview");
    assert_eq!(figure_text, "1/3/3");
}
