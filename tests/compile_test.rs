//! Black-box tests that drive the compiler's library entry point directly,
//! asserting on the `Result` it returns and, for successful compiles, on
//! the emitted Jasmin text. No subprocess, no dependency on a real `jasmin`
//! jar being installed.

use simplc::error::CompileError;
use simplc::parser::parse;

fn compile(src: &str) -> Result<String, CompileError> {
    parse(src.as_bytes().to_vec()).map(|e| e.render())
}

#[test]
fn minimal_program_compiles_with_no_diagnostics() {
    let text = compile("program P begin chill end").unwrap();
    assert!(text.contains(".class public P"));
    assert!(text.contains(".method public static main([Ljava/lang/String;)V"));
}

#[test]
fn duplicate_variable_is_a_multiple_definition_error() {
    let err = compile("program P begin integer x; integer x; chill end").unwrap_err();
    match err {
        CompileError::MultipleDefinition { name, .. } => assert_eq!(name, "x"),
        other => panic!("expected MultipleDefinition, got {other:?}"),
    }
}

#[test]
fn if_guard_must_be_boolean() {
    let err = compile("program P begin integer x; x <- 1; if x then chill end end").unwrap_err();
    match err {
        CompileError::IncompatibleTypes { expected, found, context, .. } => {
            assert!(expected.is_boolean());
            assert!(found.is_integer());
            assert!(context.contains("if"));
        }
        other => panic!("expected IncompatibleTypes, got {other:?}"),
    }
}

#[test]
fn unclosed_nested_comment_reports_comment_not_closed() {
    let err = compile("program P begin (* outer (* inner *) chill end").unwrap_err();
    assert!(matches!(err, CompileError::CommentNotClosed { .. }));
}

#[test]
fn number_overflow_is_reported() {
    let err = compile("program P begin integer x; x <- 9999999999; chill end").unwrap_err();
    assert!(matches!(err, CompileError::NumberTooLarge { .. }));
}

#[test]
fn unknown_identifier_in_write_is_reported() {
    let err = compile("program P begin write y end").unwrap_err();
    match err {
        CompileError::UnknownIdentifier { name, .. } => assert_eq!(name, "y"),
        other => panic!("expected UnknownIdentifier, got {other:?}"),
    }
}

#[test]
fn arithmetic_and_write_emit_expected_instructions() {
    let text = compile("program P begin integer x; x <- 2 + 3 * 4; write x end").unwrap();
    assert!(text.contains("imul"));
    assert!(text.contains("iadd"));
    assert!(text.contains("istore"));
    assert!(text.contains("invokestatic P/printInt(I)V"));
}

#[test]
fn if_elsif_else_emits_a_shared_end_label() {
    let text = compile(
        "program P begin integer x; x <- 1; \
         if x = 1 then write 1 elsif x = 2 then write 2 else write 3 end end",
    )
    .unwrap();
    assert!(text.contains("if_icmpeq"));
    assert!(text.contains("ifeq"));
    assert!(text.contains("goto"));
}

#[test]
fn while_loop_branches_back_to_its_guard() {
    let text = compile(
        "program P begin integer x; x <- 0; while x < 10 do x <- x + 1 end end",
    )
    .unwrap();
    assert!(text.contains("if_icmplt"));
    assert!(text.contains("goto"));
}

#[test]
fn boolean_and_relational_operators_round_trip() {
    let text = compile(
        "program P begin boolean b; b <- true and not false; if b then chill end end",
    )
    .unwrap();
    assert!(text.contains("iand"));
    assert!(text.contains("ixor 1"));
}

#[test]
fn arrays_allocate_index_and_store() {
    let text = compile(
        "program P begin integer array a; a <- array 10; a[0] <- 5; write a[0] end",
    )
    .unwrap();
    assert!(text.contains("newarray int"));
    assert!(text.contains("iastore"));
    assert!(text.contains("iaload"));
}

#[test]
fn function_call_with_arguments_and_return_type() {
    let text = compile(
        "program P \
         define add(integer a, integer b) -> integer begin exit a + b end \
         begin integer x; x <- add(1, 2); write x end",
    )
    .unwrap();
    assert!(text.contains(".method public static add(II)I"));
    assert!(text.contains("invokestatic P/add(II)I"));
    assert!(text.contains("ireturn"));
}

#[test]
fn procedure_call_as_a_statement() {
    let text = compile(
        "program P \
         define greet() begin write \"hi\" end \
         begin greet() end",
    )
    .unwrap();
    assert!(text.contains(".method public static greet()V"));
    assert!(text.contains("invokestatic P/greet()V"));
}

#[test]
fn read_into_scalar_and_array_element() {
    let text = compile(
        "program P begin integer x; integer array a; a <- array 3; read x; read a[0] end",
    )
    .unwrap();
    assert!(text.contains("invokestatic P/readInt()I"));
}

#[test]
fn write_concatenates_strings_and_expressions() {
    let text = compile("program P begin integer x; x <- 5; write \"x is \" & x end").unwrap();
    assert!(text.contains("printString"));
    assert!(text.contains("printInt"));
}

#[test]
fn call_argument_type_mismatch_is_reported() {
    let err = compile(
        "program P \
         define f(integer a) begin chill end \
         begin boolean b; b <- true; f(b) end",
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::IncompatibleTypes { .. }));
}

#[test]
fn expected_token_error_names_what_was_expected() {
    let err = compile("program P begin integer x chill end").unwrap_err();
    assert!(matches!(err, CompileError::Expected { .. }));
}

#[test]
fn name_followed_by_neither_call_index_nor_assignment_is_reported() {
    let err = compile("program P begin integer x; x end").unwrap_err();
    match err {
        CompileError::Expected { expected, .. } => {
            assert_eq!(expected, "argument list or variable assignment");
        }
        other => panic!("expected Expected, got {other:?}"),
    }
}

#[test]
fn assignment_with_neither_expression_nor_array_keyword_is_reported() {
    let err = compile("program P begin integer x; x <- chill end").unwrap_err();
    match err {
        CompileError::Expected { expected, .. } => {
            assert_eq!(expected, "array allocation or expression");
        }
        other => panic!("expected Expected, got {other:?}"),
    }
}

#[test]
fn array_allocation_after_an_index_is_rejected() {
    let err = compile(
        "program P begin integer array a; a <- array 3; a[0] <- array 3; chill end",
    )
    .unwrap_err();
    match err {
        CompileError::Expected { expected, .. } => {
            assert_eq!(expected, "array allocation or expression");
        }
        other => panic!("expected Expected, got {other:?}"),
    }
}

#[test]
fn write_with_neither_expression_nor_string_is_reported() {
    let err = compile("program P begin write end").unwrap_err();
    match err {
        CompileError::Expected { expected, .. } => {
            assert_eq!(expected, "expression or string");
        }
        other => panic!("expected Expected, got {other:?}"),
    }
}
