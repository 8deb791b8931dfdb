use std::sync::Arc;

use indoc::indoc;

use crate::Error;
use crate::ancestors::{Context, Origin};
use crate::diagnostics::SignatureError;
use crate::session::{Session, SessionBuilder};
use crate::session_tests::type_name;

fn with_set() -> Session {
    SessionBuilder::new().library("set").build().unwrap()
}

#[test]
fn set_instance_chain() {
    let session = with_set();

    insta::assert_snapshot!(session.dump_ancestors("::Set", Context::Instance), @r"
    ::Set[A]
    ::Enumerable[A, self]
    ::Object
    ::Kernel
    ::BasicObject
    ");
}

#[test]
fn set_singleton_chain() {
    let session = with_set();

    insta::assert_snapshot!(session.dump_ancestors("::Set", Context::Singleton), @r"
    singleton(::Set)
    singleton(::Object)
    singleton(::BasicObject)
    ::Class
    ::Module
    ::Object
    ::Kernel
    ::BasicObject
    ");
}

#[test]
fn prepends_keep_declared_order_and_includes_reverse() {
    let session = Session::expect_valid(indoc! {r#"
    module A
    end

    module B
    end

    module P
    end

    module Q
    end

    class C
      include A
      include B
      prepend P
      prepend Q
    end
    "#});

    insta::assert_snapshot!(session.dump_ancestors("::C", Context::Instance), @r"
    ::P
    ::Q
    ::C
    ::B
    ::A
    ::Object
    ::Kernel
    ::BasicObject
    ");

    let chain = session.instance_ancestors(&type_name("::C")).unwrap();
    let origins: Vec<Origin> = chain.iter().map(|entry| entry.origin).collect();
    assert_eq!(
        origins,
        [
            Origin::Prepend,
            Origin::Prepend,
            Origin::Own,
            Origin::Include,
            Origin::Include,
            Origin::Superclass,
            Origin::Include,
            Origin::Superclass,
        ]
    );
}

#[test]
fn arguments_compose_through_nested_mixins() {
    let session = Session::expect_valid(indoc! {r#"
    module Wrap[T]
      include Enumerable[T, Wrap[T]]
    end

    class Box[V]
      include Wrap[Array[V]]
    end
    "#});

    insta::assert_snapshot!(session.dump_ancestors("::Box", Context::Instance), @r"
    ::Box[V]
    ::Wrap[::Array[V]]
    ::Enumerable[::Array[V], ::Wrap[::Array[V]]]
    ::Object
    ::Kernel
    ::BasicObject
    ");
}

#[test]
fn superclass_arguments() {
    let session = Session::expect_valid(indoc! {r#"
    class Base[X]
    end

    class Derived < Base[String]
    end
    "#});

    insta::assert_snapshot!(session.dump_ancestors("::Derived", Context::Instance), @r"
    ::Derived
    ::Base[::String]
    ::Object
    ::Kernel
    ::BasicObject
    ");
}

#[test]
fn reopening_may_rename_type_parameters() {
    let session = Session::expect_valid(indoc! {r#"
    class Pair[A, B]
    end

    class Pair[X, Y]
      include Enumerable[Y, self]
    end
    "#});

    insta::assert_snapshot!(session.dump_ancestors("::Pair", Context::Instance), @r"
    ::Pair[A, B]
    ::Enumerable[B, self]
    ::Object
    ::Kernel
    ::BasicObject
    ");
}

#[test]
fn repeated_modules_keep_first_position() {
    let session = Session::expect_valid(indoc! {r#"
    module M
    end

    class Parent
      include M
    end

    class Child < Parent
      include M
    end
    "#});

    insta::assert_snapshot!(session.dump_ancestors("::Child", Context::Instance), @r"
    ::Child
    ::M
    ::Parent
    ::Object
    ::Kernel
    ::BasicObject
    ");
}

#[test]
fn mixins_resolve_in_lexical_scope() {
    let session = Session::expect_valid(indoc! {r#"
    module Outer
      module Helper
      end

      class Inner
        include Helper
      end
    end
    "#});

    insta::assert_snapshot!(session.dump_ancestors("::Outer::Inner", Context::Instance), @r"
    ::Outer::Inner
    ::Outer::Helper
    ::Object
    ::Kernel
    ::BasicObject
    ");
}

#[test]
fn class_singleton_chain_with_extend() {
    let session = Session::expect_valid(indoc! {r#"
    module Helpers
    end

    class Widget
      extend Helpers
    end
    "#});

    insta::assert_snapshot!(session.dump_ancestors("::Widget", Context::Singleton), @r"
    singleton(::Widget)
    ::Helpers
    singleton(::Object)
    singleton(::BasicObject)
    ::Class
    ::Module
    ::Object
    ::Kernel
    ::BasicObject
    ");

    let chain = session.singleton_ancestors(&type_name("::Widget")).unwrap();
    assert_eq!(chain.entries()[1].origin, Origin::Extend);
    assert_eq!(chain.entries()[4].origin, Origin::Metaclass);
}

#[test]
fn module_singleton_chain() {
    let session = Session::expect_valid(indoc! {r#"
    module Helpers
    end

    module Tool
      extend Helpers
    end
    "#});

    insta::assert_snapshot!(session.dump_ancestors("::Tool", Context::Singleton), @r"
    singleton(::Tool)
    ::Helpers
    ::Module
    ::Object
    ::Kernel
    ::BasicObject
    ");
}

#[test]
fn interface_chain() {
    let session = Session::expect_valid(indoc! {r#"
    interface _Named
      def name: () -> String
    end

    interface _Labeled
      include _Named
    end
    "#});

    insta::assert_snapshot!(session.dump_ancestors("::_Labeled", Context::Instance), @r"
    ::_Labeled
    ::_Named
    ");
    let chain = session.instance_ancestors(&type_name("::_Labeled")).unwrap();
    assert_eq!(chain.entries()[1].origin, Origin::InterfaceInclude);
}

#[test]
fn interfaces_have_no_singleton_chain() {
    let session = Session::expect_valid("interface _Named\nend\n");
    let result = session.singleton_ancestors(&type_name("::_Named"));

    assert!(matches!(
        result,
        Err(Error::Signature(SignatureError::NoSingletonChain { type_name, .. }))
            if type_name.to_string() == "::_Named"
    ));
}

#[test]
fn superclass_cycle() {
    let session = Session::expect(indoc! {r#"
    class A < B
    end

    class B < A
    end
    "#});

    let Err(Error::Signature(error)) = session.instance_ancestors(&type_name("::A")) else {
        panic!("expected a cycle");
    };
    insta::assert_snapshot!(error, @"cyclic ancestors: ::A -> ::B -> ::A");
}

#[test]
fn include_cycle() {
    let session = Session::expect(indoc! {r#"
    module M
      include N
    end

    module N
      include M
    end
    "#});

    let Err(Error::Signature(error)) = session.instance_ancestors(&type_name("::N")) else {
        panic!("expected a cycle");
    };
    insta::assert_snapshot!(error, @"cyclic ancestors: ::N -> ::M -> ::N");
}

#[test]
fn invalid_mixin_targets_are_skipped() {
    let session = Session::expect(indoc! {r#"
    class Plain
    end

    class C
      include Plain
    end
    "#});

    insta::assert_snapshot!(session.dump_ancestors("::C", Context::Instance), @r"
    ::C
    ::Object
    ::Kernel
    ::BasicObject
    ");
}

#[test]
fn no_implicit_superclass_without_object() {
    let session = SessionBuilder::new()
        .no_stdlib()
        .add_file("test.rbs", "class Lonely\nend\n")
        .build()
        .unwrap();

    insta::assert_snapshot!(session.dump_ancestors("::Lonely", Context::Instance), @"::Lonely");
    insta::assert_snapshot!(session.dump_ancestors("::Lonely", Context::Singleton), @"singleton(::Lonely)");
}

#[test]
fn deep_superclass_chains() {
    let mut source = String::from("class C0\nend\n");
    for i in 1..1000 {
        source.push_str(&format!("class C{i} < C{}\nend\n", i - 1));
    }
    let session = Session::expect(&source);
    let deepest = type_name("::C999");

    let instance = session.instance_ancestors(&deepest).unwrap();
    assert_eq!(instance.len(), 1003);
    assert_eq!(instance.entries()[999].to_string(), "::C0");

    let singleton = session.singleton_ancestors(&deepest).unwrap();
    assert_eq!(singleton.len(), 1007);
}

#[test]
fn long_include_cycle() {
    let mut source = String::new();
    for i in 0..800 {
        source.push_str(&format!("module M{i}\n  include M{}\nend\n", (i + 1) % 800));
    }
    let session = Session::expect(&source);

    let Err(Error::Signature(SignatureError::CyclicAncestor { path, .. })) =
        session.instance_ancestors(&type_name("::M0"))
    else {
        panic!("expected a cycle");
    };
    assert_eq!(path.len(), 801);
    assert_eq!(path.first(), path.last());
}

#[test]
fn chains_are_cached() {
    let session = with_set();
    let set = type_name("::Set");

    let first = session.instance_ancestors(&set).unwrap();
    let second = session.instance_ancestors(&set).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn aliases_and_constants_have_no_chain() {
    let session = Session::expect_valid("type t = Integer\nLIMIT: Integer\n");

    assert!(matches!(
        session.instance_ancestors(&type_name("::t")),
        Err(Error::UnknownType(_))
    ));
    assert!(matches!(
        session.instance_ancestors(&type_name("::LIMIT")),
        Err(Error::UnknownType(_))
    ));
}
