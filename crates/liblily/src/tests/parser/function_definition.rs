use pretty_assertions::assert_eq;
use rstest::*;

use crate::{file::SourceFile, nom_tools::State};

#[rstest]
#[case("fun init(): string {}", "fun init(): string {}")]
#[case("fun init(): string {} fun init(): string {}", "fun init(): string {}\nfun init(): string {}")]
#[case(
    "fun init(): string {} fun init(): string {}",
    "fun init(): string {}\nfun init(): string {}"
)]
#[case("fun init(): string { var a = 1;test();test1.test2();}", "fun init(): string {var a = 1; test(); test1.test2();}")]
#[case(
    "fun init(): string { var a = test(1,2,3);} fun test(): string {}",
    "fun init(): string {var a = test(1, 2, 3);}\nfun test(): string {}"
)]
#[case("fun init(): string { var a = 1; var b = ref a;}", "fun init(): string {var a = 1; var b = ref a;}")]
#[case(
    "fun init(a:a, b:b): string { var a = 1; var b = ref a; a = 20;}",
    "fun init(a: a, b: b): string {var a = 1; var b = ref a; a = 20;}"
)]
#[case(
    "fun init(this): string {if (true || false) {} else if false {} else if false {} else if false {} else {}}",
    "fun init(this): string {if (true || false) {} else if false {} else if false {} else if false {} else {}}"
)]
#[case("fun init(a: ref ?string): string {}", "fun init(a: ref ?string): string {}")]
fn custom_function_test<'base>(#[case] code: &'base str, #[case] expected: &'base str) {
    let source_file = SourceFile::new(vec!["<memory>".into()], code.to_string());

    let state = State {
        file: source_file.clone(),
        indexer: Default::default(),
    };

    let (_, response) = crate::parser::parse(&state).unwrap();
    assert_eq!(response.to_string(), expected, "{}", code);
}
