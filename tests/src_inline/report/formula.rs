use super::*;

#[test]
fn test_ratio_of_two_groups() {
    let f = Formula::parse("A/B").unwrap();
    assert_eq!(f.evaluate(&[Some(3.0), Some(12.0)]), Some(0.25));
}

#[test]
fn test_division_by_zero_is_none() {
    let f = Formula::parse("A/B").unwrap();
    assert_eq!(f.evaluate(&[Some(3.0), Some(0.0)]), None);
    assert_eq!(f.evaluate(&[Some(3.0), None]), None);
    let g = Formula::parse("(A+1)/(B-B)").unwrap();
    assert_eq!(g.evaluate(&[Some(1.0), Some(2.0)]), None);
}

#[test]
fn test_precedence_and_parentheses() {
    let f = Formula::parse("A + B * C").unwrap();
    assert_eq!(f.evaluate(&[Some(1.0), Some(2.0), Some(3.0)]), Some(7.0));
    let g = Formula::parse("(A + B) * C").unwrap();
    assert_eq!(g.evaluate(&[Some(1.0), Some(2.0), Some(3.0)]), Some(9.0));
    let h = Formula::parse("A - B - C").unwrap();
    assert_eq!(h.evaluate(&[Some(10.0), Some(2.0), Some(3.0)]), Some(5.0));
    let k = Formula::parse("100 * A / 4").unwrap();
    assert_eq!(k.evaluate(&[Some(2.0)]), Some(50.0));
}

#[test]
fn test_unary_minus_and_decimals() {
    let f = Formula::parse("-A + 0.5").unwrap();
    assert_eq!(f.evaluate(&[Some(2.0)]), Some(-1.5));
    let g = Formula::parse("--A").unwrap();
    assert_eq!(g.evaluate(&[Some(2.0)]), Some(2.0));
}

#[test]
fn test_missing_operands_default_to_zero() {
    let f = Formula::parse("A + B + C").unwrap();
    assert_eq!(f.evaluate(&[Some(4.0)]), Some(4.0));
    assert_eq!(f.evaluate(&[]), Some(0.0));
}

#[test]
fn test_ast_shape() {
    let f = Formula::parse("A/2").unwrap();
    assert_eq!(
        f.expr(),
        &Expr::Binary(
            BinaryOp::Div,
            Box::new(Expr::Operand(Operand::A)),
            Box::new(Expr::Number(2.0))
        )
    );
    assert_eq!(f.source(), "A/2");
}

#[test]
fn test_grammar_rejections() {
    assert!(matches!(Formula::parse("D/A"), Err(FormulaError::Grammar(_))));
    assert!(matches!(Formula::parse("system('ls')"), Err(FormulaError::Grammar(_))));
    assert!(matches!(Formula::parse("A**B"), Err(FormulaError::UnexpectedToken { .. })));
    assert!(matches!(Formula::parse(""), Err(FormulaError::Empty)));
    assert!(matches!(Formula::parse("   "), Err(FormulaError::Empty)));
}

#[test]
fn test_structural_rejections() {
    assert!(matches!(Formula::parse("(A+B"), Err(FormulaError::UnexpectedEnd)));
    assert!(matches!(Formula::parse("A+"), Err(FormulaError::UnexpectedEnd)));
    assert!(matches!(Formula::parse("A B"), Err(FormulaError::UnexpectedToken { offset: 2, .. })));
    assert!(matches!(Formula::parse("A)"), Err(FormulaError::UnexpectedToken { .. })));
    assert!(matches!(Formula::parse("1.2.3"), Err(FormulaError::Number(_))));
}

#[test]
fn test_grammar_gate_shared_across_parses() {
    assert!(GRAMMAR.is_match("(A + B) / 2.5"));
    assert!(!GRAMMAR.is_match("A % B"));
    for _ in 0..3 {
        assert_eq!(Formula::parse("A/B").unwrap().evaluate(&[Some(6.0), Some(3.0)]), Some(2.0));
        assert!(matches!(Formula::parse("A%B"), Err(FormulaError::Grammar(_))));
    }
}
