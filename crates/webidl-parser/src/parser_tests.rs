//! End-to-end tests of the parse session.
//!
//! These run whole sources through [`Parser`], from tokens to validated
//! definitions, and check the behavior a binding generator depends on.

use webidl_core::location::SourceMap;

use crate::{
    Definition, Definitions, ParseConfig, Parser,
    elaborate::Builder,
    error::{ErrorCode, ParseError},
    finish::finish_all,
    lexer, link,
    model::{Member, Model},
    parser,
};

/// Helper function to run a single source through a fresh session
fn parse_source(source: &str) -> Result<Definitions, ParseError> {
    let mut parser = Parser::new()?;
    parser.parse(source, "test.webidl")?;
    parser.finish()
}

/// Helper function to parse a source string and assert success
fn assert_parses_successfully(source: &str) -> Definitions {
    match parse_source(source) {
        Ok(definitions) => definitions,
        Err(e) => panic!("Expected parsing to succeed, but got error: {}", e),
    }
}

/// Helper function to parse a source string and assert failure
fn assert_parse_fails(source: &str) -> ParseError {
    match parse_source(source) {
        Ok(_) => panic!("Expected parsing to fail, but it succeeded"),
        Err(e) => e,
    }
}

fn interface<'a>(definitions: &'a Definitions, name: &str) -> &'a crate::model::Interface {
    match definitions.get(definitions.lookup(name).unwrap()) {
        Definition::Interface(iface) => iface,
        other => panic!("{name} is a {}", other.kind()),
    }
}

fn member_names(iface: &crate::model::Interface) -> Vec<String> {
    iface.members().iter().map(|m| m.name().as_string()).collect()
}

#[test]
fn test_forward_references_across_files() {
    let mut parser = Parser::new().unwrap();
    parser
        .parse("interface Node : EventTarget { attribute Document? ownerDocument; };", "node.webidl")
        .unwrap();
    parser.parse("interface Document : Node {};", "document.webidl").unwrap();
    parser.parse("interface EventTarget {};", "event.webidl").unwrap();

    let definitions = parser.finish().unwrap();
    let document = interface(&definitions, "Document");
    let ancestors = document.parent().map(|p| definitions.model().interface(p).name());

    assert_eq!(definitions.len(), 3);
    assert_eq!(ancestors.map(|n| n.as_string()).as_deref(), Some("Node"));
}

#[test]
fn test_partial_members_follow_original() {
    let definitions = assert_parses_successfully(
        "partial interface A { void b(); }; interface A { void a(); };",
    );
    assert_eq!(member_names(interface(&definitions, "A")), ["a", "b"]);
}

#[test]
fn test_finishing_twice_does_not_duplicate_members() {
    let source = "interface A { void a(); }; partial interface A { void b(); };
                  [NoInterfaceObject] interface M { void m(); }; A implements M;";
    let mut sources = SourceMap::new();
    let file = sources.add("idempotent.webidl", source);
    let tokens = lexer::tokenize(source, file).unwrap();
    let definitions = parser::build_definitions(&tokens, file).unwrap();
    let mut model = Model::new();
    let elaborated = Builder::new(&mut model, file).build(definitions).unwrap();
    link::link(&mut model, &elaborated.productions).unwrap();

    finish_all(&mut model, &elaborated.productions).unwrap();
    finish_all(&mut model, &elaborated.productions).unwrap();

    let (_, a) = model.interfaces().next().unwrap();
    assert_eq!(a.members().len(), 3);
}

#[test]
fn test_dictionary_inheritance() {
    let definitions =
        assert_parses_successfully("dictionary A { long x; }; dictionary B : A { long y; };");
    let Definition::Dictionary(b) = definitions.get(definitions.lookup("B").unwrap()) else {
        panic!("expected a dictionary");
    };
    assert_eq!(b.members()[0].name.as_string(), "y");

    let err = assert_parse_fails(
        "dictionary A { long x; }; dictionary B : A { long y; }; dictionary C : B { long x; };",
    );
    let primary = err.primary().unwrap();
    assert_eq!(primary.code(), Some(ErrorCode::E601));
    assert_eq!(primary.locations().count(), 2);
}

#[test]
fn test_indistinguishable_overloads_are_rejected() {
    let err = assert_parse_fails("interface A { void f(long x); void f(long y); };");
    assert_eq!(err.primary().unwrap().code(), Some(ErrorCode::E501));
}

#[test]
fn test_implements_cycle_reports_both_interfaces() {
    let err = assert_parse_fails(
        "interface A {}; interface B {}; A implements B; B implements A;",
    );
    let primary = err.primary().unwrap();
    assert_eq!(primary.code(), Some(ErrorCode::E402));
    assert!(primary.locations().count() >= 2);
}

#[test]
fn test_global_with_named_setter() {
    let err = assert_parse_fails(
        "[Global] interface G { setter void (DOMString name, any value); getter any (DOMString name); };",
    );
    assert_eq!(err.primary().unwrap().message(), "Interface with [Global] has a named setter");

    let definitions = assert_parses_successfully(
        "interface Base {}; interface Middle : Base {}; [Global] interface G : Middle {};",
    );
    assert!(interface(&definitions, "Base").is_on_global_proto_chain());
    assert!(interface(&definitions, "Middle").is_on_global_proto_chain());
    assert!(interface(&definitions, "G").is_on_global_proto_chain());
}

#[test]
fn test_maplike_expansion_is_visible() {
    let definitions = assert_parses_successfully("interface M { maplike<DOMString, long>; };");
    let names = member_names(interface(&definitions, "M"));

    for expected in ["size", "get", "has", "set", "delete", "clear", "entries", "keys", "values"] {
        assert!(names.iter().any(|n| n == expected), "missing {expected}");
    }
    assert!(matches!(
        interface(&definitions, "M").members()[0],
        Member::MaplikeOrSetlike(_)
    ));
}

#[test]
fn test_warnings_are_collected() {
    let mut parser = Parser::new().unwrap();
    parser.parse("exception E { long code; };", "a.webidl").unwrap();
    parser.parse("module m { interface I {}; };", "b.webidl").unwrap();

    let definitions = parser.finish().unwrap();
    assert!(definitions.is_empty());
    assert_eq!(definitions.warnings().len(), 2);
}

#[test]
fn test_deny_warnings() {
    let mut parser = Parser::with_config(ParseConfig {
        deny_warnings: true,
    })
    .unwrap();

    let err = parser.parse("exception E {};", "a.webidl").unwrap_err();
    assert_eq!(err.diagnostics().len(), 1);
}

#[test]
fn test_error_comes_before_collected_warnings() {
    let mut parser = Parser::new().unwrap();
    parser.parse("exception E {};", "a.webidl").unwrap();

    let err = parser.parse("interface {", "b.webidl").unwrap_err();
    assert!(err.diagnostics()[0].severity().is_error());
    assert_eq!(err.diagnostics().len(), 2);

    let rendered = err.render(parser.sources());
    assert!(rendered.contains("b.webidl line 1:"));
}

#[test]
fn test_error_rendering_points_at_declaration() {
    let mut parser = Parser::new().unwrap();
    let err = parser
        .parse("interface A {};\ninterface A {};\n", "dup.webidl")
        .unwrap_err();

    let rendered = err.render(parser.sources());
    assert!(rendered.contains("dup.webidl line 2:"));
    assert!(rendered.contains("dup.webidl line 1:"));
}

#[test]
fn test_builtin_typedefs_are_available() {
    let definitions = assert_parses_successfully(
        "interface Crypto { void digest(BufferSource data, DOMTimeStamp when); };",
    );
    assert_eq!(definitions.len(), 1);
}

#[test]
fn test_syntax_errors() {
    assert_parse_fails("interface A { attribute long; };");
    assert_parse_fails("interface A { void f(long a,); };");
    assert_parse_fails("dictionary D { long x = ; };");
    assert_parse_fails("enum E { };");
    assert_parse_fails("interface A { long?? x(); };");
}

#[test]
fn test_realistic_corpus() {
    let definitions = assert_parses_successfully(
        r#"
        [PrimaryGlobal] interface Window : EventTarget {
          [Unforgeable] readonly attribute Window window;
          [Replaceable] readonly attribute long innerWidth;
          void alert(optional DOMString message = "");
        };
        interface EventTarget {
          void addEventListener(DOMString type, EventListener? callback, optional boolean capture = false);
        };
        callback interface EventListener {
          void handleEvent(Event event);
        };
        [Constructor(DOMString type, optional EventInit eventInitDict)]
        interface Event {
          const unsigned short NONE = 0;
          const unsigned short CAPTURING_PHASE = 1;
          readonly attribute DOMString type;
          readonly attribute EventTarget? target;
          [Pure] readonly attribute boolean bubbles;
        };
        dictionary EventInit {
          boolean bubbles = false;
          boolean cancelable = false;
        };
        enum ReadyState { "loading", "interactive", "complete" };
        typedef (Event or DOMString) EventOrString;
        callback FrameRequestCallback = void (double time);
        "#,
    );

    let kinds: Vec<_> = definitions.iter().map(|(_, d)| d.kind()).collect();
    assert_eq!(
        kinds,
        [
            "interface",
            "interface",
            "callback interface",
            "interface",
            "dictionary",
            "enum",
            "typedef",
            "callback"
        ]
    );

    let event = interface(&definitions, "Event");
    assert!(event.constructor().is_some());
    assert_eq!(event.exposure_set().len(), 1);
}

#[test]
fn test_promise_needs_a_declared_interface() {
    let err = assert_parse_fails("interface A { Promise<long> ready(); };");
    assert_eq!(err.primary().unwrap().message(), "Unresolved type 'Promise'.");

    let definitions = assert_parses_successfully(
        "[NoInterfaceObject] interface _Promise {};
         interface A { Promise<long> ready(); };",
    );
    let method = interface(&definitions, "A").members()[0].as_method().unwrap();
    let return_type = &method.overloads[0].return_type;
    assert!(return_type.is_promise());
    assert!(return_type.promise_inner().is_some());
}
