//! A recognizer for the generated language, used to check the shape of test cases.
//!
//! Every rule returns the bracket nesting depth of what it matched.

use peg::parser;

parser! {
pub grammar shape() for str {
    pub rule expression() -> usize
        = sign()? t:term() ts:(sign() t:term() { t })* { ts.into_iter().fold(t, usize::max) }

    rule term() -> usize
        = sign()? f:factor() fs:("*" f:factor() { f })* { fs.into_iter().fold(f, usize::max) }

    rule factor() -> usize
        = "dx(" e:expression() ")" { e + 1 }
        / ("sin" / "cos") "(" f:factor() ")" exponent()? { f + 1 }
        / call()
        / "(" e:expression() ")" exponent()? { e + 1 }
        / sign()? integer() { 0 }
        / ['x' | 'y'] exponent()? { 0 }

    rule call() -> usize
        = ("f{" ['0'..='2'] "}" / "g" / "h") a:arguments() { a }

    rule arguments() -> usize
        = "(" a:factor() b:("," b:factor() { b })? ")" { a.max(b.unwrap_or(0)) + 1 }

    pub rule declaration() -> usize
        = ("g" / "h" / "f{0}" / "f{1}") params() "=" e:expression() { e }
        / "f{n}" params() "=" a:recurrence() "+" b:recurrence() c:("+" e:expression() { e })? {
            a.max(b).max(c.unwrap_or(0))
        }

    rule recurrence() -> usize
        = sign()? integer() "*f{n-" ['1' | '2'] "}" a:arguments() { a }

    rule params() = "(x)" / "(y)" / "(x,y)" / "(y,x)"
    rule exponent() = "^" integer()
    rule integer() = ['0'..='9']+
    rule sign() = ['+' | '-']
}}

/// Parsed layout of one test case.
#[derive(Debug, Default)]
pub struct Case {
    pub headers: Vec<u32>,
    pub declarations: Vec<String>,
    pub expression: String,
    /// Deepest nesting over all declarations and the expression.
    pub depth: usize,
}

/// Splits a case into header, declaration and expression lines and checks each one.
pub fn parse(text: &str) -> Result<Case, String> {
    let mut case = Case::default();
    let lines: Vec<&str> = text.lines().collect();
    let (last, rest) = lines.split_last().ok_or("empty case")?;
    for line in rest {
        if let Ok(n) = line.parse::<u32>() {
            case.headers.push(n);
        } else {
            let depth = shape::declaration(line).map_err(|e| format!("{line}: {e}"))?;
            case.depth = case.depth.max(depth);
            case.declarations.push(line.to_string());
        }
    }
    let depth = shape::expression(last).map_err(|e| format!("{last}: {e}"))?;
    case.depth = case.depth.max(depth);
    case.expression = last.to_string();
    Ok(case)
}

#[test]
fn recognizes_samples() {
    assert_eq!(shape::expression("x"), Ok(0));
    assert_eq!(shape::expression("+-+03*x^2-y"), Ok(0));
    assert_eq!(shape::expression("-sin((x+1)^2)^3*dx(cos(x))"), Ok(2));
    assert_eq!(shape::expression("f{2}(g(x,-1))+h(y)"), Ok(2));
    assert!(shape::expression("sin(x").is_err());
    assert!(shape::expression("x**2").is_err());
    assert!(shape::expression("").is_err());

    assert_eq!(shape::declaration("g(y,x)=x*y"), Ok(0));
    assert_eq!(
        shape::declaration("f{n}(x)=-2*f{n-1}(x^2)+3*f{n-2}(sin(x))+x"),
        Ok(2)
    );
    assert!(shape::declaration("f{n}(x)=f{n-1}(x)").is_err());
}
