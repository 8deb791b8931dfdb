use std::fmt::Write;

use indoc::indoc;
use signa_core::{EntityKind, TypeName};

use crate::ancestors::Context;
use crate::resolve::Nesting;
use crate::session::{Session, SessionBuilder};
use crate::source::Provenance;
use crate::{DiagnosticKind, Error};

impl Session {
    /// Core signatures plus `src` as `test.rbs`.
    #[track_caller]
    pub fn expect(src: &str) -> Self {
        SessionBuilder::new()
            .add_file("test.rbs", src)
            .build()
            .unwrap()
    }

    #[track_caller]
    pub fn expect_valid(src: &str) -> Self {
        let session = Self::expect(src);
        let diagnostics = session.validate();
        if !diagnostics.is_empty() {
            panic!(
                "Expected valid signatures, got error:\n{}",
                diagnostics.render(session.source_map())
            );
        }
        session
    }

    #[track_caller]
    pub fn expect_invalid(src: &str) -> String {
        let session = Self::expect(src);
        let diagnostics = session.validate();
        if diagnostics.is_empty() {
            panic!("Expected invalid signatures, got no errors");
        }
        diagnostics.render(session.source_map())
    }

    /// One chain entry per line.
    #[track_caller]
    pub fn dump_ancestors(&self, name: &str, context: Context) -> String {
        let chain = self.ancestors(&type_name(name), context).unwrap();
        let mut out = String::new();
        for entry in chain.iter() {
            writeln!(out, "{entry}").unwrap();
        }
        out
    }

    /// One `name: owner (implementation) overloads` line per method, sorted.
    #[track_caller]
    pub fn dump_methods(&self, name: &str, context: Context, only: &[&str]) -> String {
        let definition = self.definition(&type_name(name), context).unwrap();
        let mut out = String::new();
        for method in definition.methods() {
            if !only.is_empty() && !only.contains(&method.name.as_str()) {
                continue;
            }
            let overloads: Vec<String> = method.overloads.iter().map(ToString::to_string).collect();
            write!(out, "{} {}: {}", method.accessibility, method.name, method.owner).unwrap();
            if method.implementation != method.owner {
                write!(out, " ({})", method.implementation).unwrap();
            }
            writeln!(out, " = {}", overloads.join(" | ")).unwrap();
        }
        out
    }
}

#[track_caller]
pub(crate) fn type_name(name: &str) -> TypeName {
    TypeName::parse(name).unwrap()
}

#[test]
fn bundled_signatures_validate() {
    let session = SessionBuilder::new().library("set").build().unwrap();
    let diagnostics = session.validate();

    assert!(
        diagnostics.is_empty(),
        "{}",
        diagnostics.render(session.source_map())
    );
}

#[test]
fn unknown_library() {
    let result = SessionBuilder::new().library("yaml").build();

    assert!(matches!(result, Err(Error::UnknownSource(name)) if name == "yaml"));
}

#[test]
fn syntax_errors_from_every_source() {
    let result = SessionBuilder::new()
        .no_stdlib()
        .add_file("b.rbs", "class B\n")
        .add_file("a.rbs", "X: -\n")
        .build();

    let Err(Error::ParseFailed(diagnostics)) = result else {
        panic!("expected a parse failure");
    };
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(
        diagnostics.kinds(),
        [DiagnosticKind::Syntax, DiagnosticKind::Syntax]
    );
}

#[test]
fn exec_fuel_applies_per_source() {
    let result = SessionBuilder::new()
        .no_stdlib()
        .with_exec_fuel(Some(2))
        .add_file("test.rbs", "class Foo\nend\n")
        .build();

    assert!(matches!(result, Err(Error::ExecFuelExhausted)));
}

#[test]
fn deep_nesting_hits_recursion_fuel() {
    let nested = |depth: usize| format!("X: {}Integer{}\n", "[".repeat(depth), "]".repeat(depth));

    let shallow = SessionBuilder::new()
        .no_stdlib()
        .add_file("test.rbs", &nested(100))
        .build();
    assert!(shallow.is_ok());

    let deep = SessionBuilder::new()
        .no_stdlib()
        .add_file("test.rbs", &nested(2000))
        .build();
    assert!(matches!(deep, Err(Error::RecursionLimitExceeded)));
}

#[test]
fn unlimited_fuel() {
    let session = SessionBuilder::new()
        .with_exec_fuel(None)
        .with_recursion_fuel(None)
        .build()
        .unwrap();

    assert!(session.environment().contains(&type_name("::Object")));
}

#[test]
fn check_sources_reports_each_file() {
    let builder = SessionBuilder::new()
        .no_stdlib()
        .add_file(
            "syntax_error.rbs",
            indoc! {r#"
            class C
              def foo: () ->
            end
            "#},
        )
        .add_file(
            "semantics_error.rbs",
            indoc! {r#"
            interface _I
              def self.foo: () -> void
            end
            "#},
        )
        .add_file(
            "no_error.rbs",
            indoc! {r#"
            class C
              def foo: () -> void
            end
            "#},
        );

    let diagnostics = builder.check_sources().unwrap();
    let sources = builder.source_map().unwrap();

    insta::assert_snapshot!(diagnostics.render(&sources), @r"
    semantics_error.rbs:2:2: Interface cannot have singleton method
    syntax_error.rbs:3:0: unexpected `end`, expected a type
    ");
}

#[test]
fn check_sources_finds_nested_interfaces() {
    let builder = SessionBuilder::new().no_stdlib().add_file(
        "a.rbs",
        indoc! {r#"
        module M
          interface _I
            def self.foo: () -> void
          end
        end
        "#},
    );

    let diagnostics = builder.check_sources().unwrap();
    let sources = builder.source_map().unwrap();

    insta::assert_snapshot!(
        diagnostics.render(&sources),
        @"a.rbs:3:4: Interface cannot have singleton method"
    );
}

#[test]
fn source_provenance() {
    let session = SessionBuilder::new()
        .library("set")
        .add_source(
            Provenance::Gem {
                name: "racc".to_owned(),
                version: None,
            },
            "class Racc\nend\n",
        )
        .build()
        .unwrap();

    let listing: Vec<String> = session
        .source_map()
        .iter()
        .filter(|source| *source.provenance != Provenance::Stdlib)
        .map(|source| format!("{} ({})", source.path, source.provenance))
        .collect();

    insta::assert_snapshot!(listing.join("\n"), @r"
    set/set.rbs (library, name=set)
    <gem:racc> (gem, name=racc, version=)
    ");
}

#[test]
fn entities_by_kind() {
    let session = SessionBuilder::new()
        .no_stdlib()
        .add_file(
            "test.rbs",
            indoc! {r#"
            class A
              module B
              end
            end

            interface _I
            end

            type t = A
            C: A
            "#},
        )
        .build()
        .unwrap();

    let all: Vec<String> = session
        .entities(None)
        .map(|(name, kind)| format!("{kind} {name}"))
        .collect();
    let modules: Vec<String> = session
        .entities(Some(EntityKind::Module))
        .map(|(name, _)| name.to_string())
        .collect();

    insta::assert_snapshot!(all.join("\n"), @r"
    class ::A
    module ::A::B
    interface ::_I
    type alias ::t
    constant ::C
    ");
    assert_eq!(modules, ["::A::B"]);
}

#[test]
fn constant_lookup() {
    let session = Session::expect_valid(indoc! {r#"
    module App
      VERSION: String

      class Config
        DEFAULTS: Hash[Symbol, Config]
      end
    end
    "#});
    let app = Nesting::top_level().enter(type_name("::App").to_namespace());
    let config = app.enter(type_name("::App::Config").to_namespace());

    let show = |name: &str, nesting: &Nesting| {
        session
            .constant(&type_name(name), nesting)
            .map(|ty| ty.to_string())
    };

    assert_eq!(show("VERSION", &app).as_deref(), Some("::String"));
    assert_eq!(show("DEFAULTS", &config).as_deref(), Some("::Hash[::Symbol, ::App::Config]"));
    assert_eq!(show("Config", &app).as_deref(), Some("singleton(::App::Config)"));
    assert_eq!(show("Kernel", &Nesting::top_level()).as_deref(), Some("singleton(::Kernel)"));
    assert_eq!(show("VERSION", &Nesting::top_level()), None);
    assert_eq!(show("_Each", &Nesting::top_level()), None);
}

#[test]
fn dump_declarations_of_empty_session() {
    let session = SessionBuilder::new().no_stdlib().build().unwrap();

    insta::assert_snapshot!(session.dump_declarations().unwrap(), @"[]");
}

#[test]
fn dump_declarations_is_json() {
    let session = SessionBuilder::new()
        .no_stdlib()
        .add_file("test.rbs", "X: Integer\n")
        .build()
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&session.dump_declarations().unwrap()).unwrap();

    assert_eq!(json[0]["declaration"], "constant");
    assert_eq!(json[0]["name"], "X");
}

#[test]
fn queries_for_undeclared_names() {
    let session = Session::expect_valid("");
    let missing = type_name("::Missing");

    assert!(matches!(
        session.instance_ancestors(&missing),
        Err(Error::UnknownType(name)) if name == missing
    ));
    assert!(matches!(
        session.method(&missing, Context::Instance, "foo"),
        Err(Error::UnknownType(_))
    ));
    assert_eq!(
        session
            .method(&type_name("::Object"), Context::Instance, "missing")
            .unwrap(),
        None
    );
}

#[test]
fn rebuilding_gives_identical_results() {
    let source = indoc! {r#"
    module Wrap[T]
      include Enumerable[T, Wrap[T]]

      def unwrap: () -> T
    end

    class Box[V] < Object
      include Wrap[Array[V]]
    end
    "#};
    let first = Session::expect_valid(source);
    let second = Session::expect_valid(source);

    for context in [Context::Instance, Context::Singleton] {
        assert_eq!(
            first.dump_ancestors("::Box", context),
            second.dump_ancestors("::Box", context)
        );
        assert_eq!(
            first.dump_methods("::Box", context, &[]),
            second.dump_methods("::Box", context, &[])
        );
    }
    assert_eq!(
        first.dump_declarations().unwrap(),
        second.dump_declarations().unwrap()
    );
}
