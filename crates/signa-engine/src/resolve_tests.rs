use indoc::indoc;

use crate::env::Entry;
use crate::resolve::{NameResolver, Nesting, Usage};
use crate::session::Session;
use crate::session_tests::type_name;

fn inside(path: &[&str]) -> Nesting {
    path.iter().fold(Nesting::top_level(), |nesting, name| {
        nesting.enter(type_name(name).to_namespace())
    })
}

#[test]
fn nesting_lists_innermost_first() {
    let nesting = inside(&["::Outer", "::Outer::Inner"]);
    let scopes: Vec<String> = nesting.scopes().map(ToString::to_string).collect();

    assert_eq!(nesting.innermost().to_string(), "::Outer::Inner::");
    assert_eq!(scopes, ["::Outer::Inner::", "::Outer::", "::"]);
}

#[test]
fn innermost_declaration_wins() {
    let session = Session::expect(indoc! {r#"
    class Name
    end

    module Outer
      class Name
      end

      module Inner
      end
    end
    "#});
    let resolver = NameResolver::new(session.environment());
    let resolve = |name: &str, nesting: &Nesting| {
        resolver
            .resolve(&type_name(name), nesting, Usage::Type)
            .map(|resolved| resolved.to_string())
    };

    let deep = inside(&["::Outer", "::Outer::Inner"]);
    assert_eq!(resolve("Name", &deep).as_deref(), Ok("::Outer::Name"));
    assert_eq!(resolve("Name", &Nesting::top_level()).as_deref(), Ok("::Name"));
    assert_eq!(resolve("::Name", &deep).as_deref(), Ok("::Name"));
    assert_eq!(resolve("Inner", &deep).as_deref(), Ok("::Outer::Inner"));
    assert_eq!(resolve("Outer::Name", &deep).as_deref(), Ok("::Outer::Name"));
}

#[test]
fn usage_selects_declaration_kinds() {
    let session = Session::expect(indoc! {r#"
    module App
      LIMIT: Integer

      type id = Integer

      interface _Run
      end
    end
    "#});
    let resolver = NameResolver::new(session.environment());
    let app = inside(&["::App"]);
    let resolve = |name: &str, usage: Usage| {
        match resolver.resolve(&type_name(name), &app, usage) {
            Ok(resolved) => resolved.to_string(),
            Err(unresolved) => format!("missing {}", unresolved.missing),
        }
    };

    assert_eq!(resolve("LIMIT", Usage::Constant), "::App::LIMIT");
    assert_eq!(resolve("LIMIT", Usage::Type), "missing ::App::LIMIT");
    assert_eq!(resolve("id", Usage::Type), "::App::id");
    assert_eq!(resolve("_Run", Usage::Type), "::App::_Run");
    assert_eq!(resolve("_Run", Usage::Namespace), "missing ::App::_Run");
    assert_eq!(resolve("App", Usage::Namespace), "::App");
    assert_eq!(resolve("Kernel", Usage::Constant), "::Kernel");
}

#[test]
fn failures_name_the_shortest_missing_prefix() {
    let session = Session::expect(indoc! {r#"
    module A
      module Tools
      end
    end

    VALUE: Integer
    "#});
    let resolver = NameResolver::new(session.environment());
    let missing = |name: &str, nesting: &Nesting| {
        resolver
            .resolve(&type_name(name), nesting, Usage::Type)
            .map_err(|unresolved| unresolved.missing.to_string())
            .err()
    };
    let top = Nesting::top_level();
    let in_a = inside(&["::A"]);

    assert_eq!(missing("Missing::Deep::Name", &top).as_deref(), Some("::Missing"));
    assert_eq!(missing("A::B::C", &top).as_deref(), Some("::A::B"));
    assert_eq!(missing("::A::Tools::Saw", &top).as_deref(), Some("::A::Tools::Saw"));
    assert_eq!(missing("Tools::Saw", &in_a).as_deref(), Some("::A::Tools::Saw"));
    assert_eq!(missing("VALUE::Inner", &top).as_deref(), Some("::VALUE"));
    assert_eq!(missing("Tools", &top).as_deref(), Some("::Tools"));
}

#[test]
fn absolutize_rewrites_resolvable_names() {
    let session = Session::expect(indoc! {r#"
    module Shop
      class Item
      end

      SAMPLE: Array[Item] | singleton(Item) | _Unknown | Hash[Symbol, Missing]?
    end
    "#});
    let env = session.environment();
    let Some(Entry::Constant(group)) = env.get(&type_name("::Shop::SAMPLE")) else {
        panic!("expected a constant");
    };
    let ty = &group.primary().decl.ty;
    let resolver = NameResolver::new(env);

    insta::assert_snapshot!(
        resolver.absolutize(ty, &inside(&["::Shop"])),
        @"::Array[::Shop::Item] | singleton(::Shop::Item) | _Unknown | ::Hash[::Symbol, Missing]?"
    );
    insta::assert_snapshot!(
        resolver.absolutize(ty, &Nesting::top_level()),
        @"::Array[Item] | singleton(Item) | _Unknown | ::Hash[::Symbol, Missing]?"
    );
}
