use super::lexer::*;
use utils::DiagnosticEmitter;

#[derive(Debug)]
struct LexTestResult {
    output: String,
    result: LexResult,
}

fn lex_string(source: &str) -> LexTestResult {
    let mut diag = DiagnosticEmitter::log_to_buffer();
    let lexer = Lexer::new(source, &mut diag);
    let result = lexer.lex_all();
    LexTestResult {
        output: diag.out_buffer().unwrap_or_default() + &diag.err_buffer().unwrap_or_default(),
        result,
    }
}

fn to_token_values(tokens: Vec<Token>) -> Vec<TokenValue> {
    tokens.into_iter().map(|tok| tok.value).collect()
}

use TokenValue::*;

#[test]
fn test_empty_input() {
    let LexTestResult { output, result } = lex_string("");
    assert_eq!(to_token_values(result.tokens), vec![EndOfFile]);
    assert_eq!(output, "");

    let LexTestResult { output, result } = lex_string("  \n\t\n");
    assert_eq!(to_token_values(result.tokens), vec![EndOfFile]);
    assert_eq!(output, "");
}

#[test]
fn test_all_tokens() {
    let LexTestResult { output, result } = lex_string("x = Yes & !foo? | x;");
    let expected = vec![
        Name(Identifier(0)),
        Define,
        Name(Identifier(1)),
        And,
        Not,
        Name(Identifier(2)),
        Unstable,
        Or,
        Name(Identifier(0)),
        Semicolon,
        EndOfFile,
    ];
    assert_eq!(to_token_values(result.tokens), expected);
    assert_eq!(result.identifiers.get_name(Identifier(1)), "Yes");
    assert_eq!(result.identifiers.lookup("foo"), Some(Identifier(2)));
    assert_eq!(output, "");
}

#[test]
fn test_method_names() {
    let LexTestResult { output, result } =
        lex_string("java/lang/String.length()I = Pure; Outer$Inner.<init>(I)V = Top;");
    assert_eq!(output, "");
    assert_eq!(
        result.identifiers.get_name(Identifier(0)),
        "java/lang/String.length()I"
    );
    assert_eq!(
        result.identifiers.get_name(Identifier(2)),
        "Outer$Inner.<init>(I)V"
    );
}

#[test]
fn test_comments() {
    let LexTestResult { output, result } =
        lex_string("# header\nx = Yes; // the rest is ignored\n\n//so is this\n  # and this");
    let expected = vec![
        Name(Identifier(0)),
        Define,
        Name(Identifier(1)),
        Semicolon,
        EndOfFile,
    ];
    assert_eq!(to_token_values(result.tokens), expected);
    assert_eq!(output, "");
}

#[test]
fn test_line_numbers() {
    let LexTestResult { result, .. } = lex_string("a\n\nb\n");
    let lines: Vec<_> = result.tokens.iter().map(|tok| tok.line_num.0).collect();
    assert_eq!(lines, vec![1, 3, 4]);
}

#[test]
fn test_error_messages() {
    let LexTestResult { output, result } = lex_string("x = @;");
    assert!(result.tokens.is_empty());
    assert_eq!(output, "[line 1] Error : Unexpected token: '@'.\n");

    let LexTestResult { output, result } = lex_string("\nx = y / z;");
    assert!(result.tokens.is_empty());
    assert_eq!(output, "[line 2] Error : Unexpected token: '/'.\n");

    let LexTestResult { output, result } = lex_string("x = \u{e9};");
    assert!(result.tokens.is_empty());
    assert_eq!(output, "[line 1] Error : Only ASCII input is supported.\n");
}

#[test]
fn test_comment_after_name() {
    let LexTestResult { output, result } = lex_string("x = y// note\n;\nz = a/b//c\n;");
    let expected = vec![
        Name(Identifier(0)),
        Define,
        Name(Identifier(1)),
        Semicolon,
        Name(Identifier(2)),
        Define,
        Name(Identifier(3)),
        Semicolon,
        EndOfFile,
    ];
    assert_eq!(to_token_values(result.tokens), expected);
    assert_eq!(result.identifiers.get_name(Identifier(1)), "y");
    assert_eq!(result.identifiers.get_name(Identifier(3)), "a/b");
    assert_eq!(output, "");
}
