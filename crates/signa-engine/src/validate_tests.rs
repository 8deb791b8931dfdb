use indoc::indoc;

use crate::DiagnosticKind;
use crate::session::{Session, SessionBuilder};

#[test]
fn class_in_undeclared_namespace() {
    let input = indoc! {r#"
    class Hello::World
    end
    "#};

    insta::assert_snapshot!(Session::expect_invalid(input), @"test.rbs:1:6: Could not find ::Hello");
}

#[test]
fn constant_in_undeclared_namespace() {
    insta::assert_snapshot!(
        Session::expect_invalid("Hello::World: Integer\n"),
        @"test.rbs:1:0: Could not find ::Hello"
    );
}

#[test]
fn alias_in_undeclared_namespace() {
    insta::assert_snapshot!(
        Session::expect_invalid("type Hello::world = Integer\n"),
        @"test.rbs:1:5: Could not find ::Hello"
    );
}

#[test]
fn namespace_must_be_class_or_module() {
    let input = indoc! {r#"
    Config: Integer

    class Config::Loader
    end
    "#};

    insta::assert_snapshot!(Session::expect_invalid(input), @"test.rbs:3:6: Could not find ::Config");
}

#[test]
fn unresolved_reference_reports_top_level_candidate() {
    let input = indoc! {r#"
    module Outer
      class Inner
        def run: () -> Missing::Thing
      end
    end
    "#};

    insta::assert_snapshot!(Session::expect_invalid(input), @"test.rbs:3:19: Could not find ::Missing");
}

#[test]
fn unresolved_reference_reports_innermost_candidate() {
    let input = indoc! {r#"
    module Outer
      module Tools
      end

      class Inner
        def run: () -> Tools::Hammer
      end
    end
    "#};

    insta::assert_snapshot!(
        Session::expect_invalid(input),
        @"test.rbs:6:19: Could not find ::Outer::Tools::Hammer"
    );
}

#[test]
fn generic_argument_counts() {
    let input = indoc! {r#"
    class Box
      def items: () -> Array
      def pair: () -> Hash[String]
      def wrong: () -> Integer[String]
      include Enumerable[Integer]
    end
    "#};

    insta::assert_snapshot!(Session::expect_invalid(input), @r"
    test.rbs:2:19: `::Array` expects 1 type arguments, but 0 given
    test.rbs:3:18: `::Hash` expects 2 type arguments, but 1 given
    test.rbs:4:19: `::Integer` expects 0 type arguments, but 1 given
    test.rbs:5:10: `::Enumerable` expects 2 type arguments, but 1 given
    ");
}

#[test]
fn interface_singleton_methods() {
    let input = indoc! {r#"
    interface _Shape
      def self.area: () -> Integer
      def self?.sides: () -> Integer
    end
    "#};

    insta::assert_snapshot!(Session::expect_invalid(input), @r"
    test.rbs:2:2: Interface cannot have singleton method
    test.rbs:3:2: Interface cannot have singleton method
    ");
}

#[test]
fn mixin_target_kinds() {
    let input = indoc! {r#"
    class Plain
    end

    module Mod
    end

    interface _Iface
    end

    class C
      include Plain
      prepend _Iface
      extend Mod
    end

    interface _J
      include Mod
    end
    "#};

    insta::assert_snapshot!(Session::expect_invalid(input), @r"
    test.rbs:11:10: `::Plain` cannot be used with include in `::C`
    test.rbs:12:10: `::_Iface` cannot be used with prepend in `::C`
    test.rbs:17:10: `::Mod` cannot be used with include in `::_J`
    ");
}

#[test]
fn superclass_problems() {
    let input = indoc! {r#"
    module Mod
    end

    class A < Mod
    end

    class B < Missing
    end

    class C < Array
    end
    "#};

    insta::assert_snapshot!(Session::expect_invalid(input), @r"
    test.rbs:4:10: superclass of `::A` must be a class, but `::Mod` is not
    test.rbs:7:10: Could not find ::Missing
    test.rbs:10:10: `::Array` expects 1 type arguments, but 0 given
    ");
}

#[test]
fn duplicated_methods() {
    let input = indoc! {r#"
    class Dup
      def run: () -> void
      def run: () -> Integer
      def self.run: () -> void
      attr_reader name: String
      def name: () -> String
    end
    "#};

    insta::assert_snapshot!(Session::expect_invalid(input), @r"
    test.rbs:3:2: `::Dup` defines method `run` more than once
    test.rbs:6:2: `::Dup` defines method `name` more than once
    ");
}

#[test]
fn reopenings_share_one_method_namespace() {
    let input = indoc! {r#"
    class Split
      def go: () -> void
    end

    class Split
      def self?.go: () -> void
    end
    "#};

    insta::assert_snapshot!(
        Session::expect_invalid(input),
        @"test.rbs:6:2: `::Split` defines method `go` more than once"
    );
}

#[test]
fn unknown_alias_target() {
    let input = indoc! {r#"
    class Words
      alias speak talk
    end

    class MoreWords < Words
    end
    "#};

    insta::assert_snapshot!(
        Session::expect_invalid(input),
        @"test.rbs:2:2: alias target `talk` is not defined for `::Words`"
    );
}

#[test]
fn ancestor_cycles() {
    let input = indoc! {r#"
    class A < B
    end

    class B < A
    end
    "#};

    insta::assert_snapshot!(Session::expect_invalid(input), @r"
    test.rbs:1:6: cyclic ancestors: ::A -> ::B -> ::A
    test.rbs:4:6: cyclic ancestors: ::B -> ::A -> ::B
    ");
}

#[test]
fn declaration_conflicts_are_included() {
    let input = indoc! {r#"
    class Thing
    end

    module Thing
    end
    "#};

    insta::assert_snapshot!(
        Session::expect_invalid(input),
        @"test.rbs:4:7: `::Thing` is declared inconsistently: both class and module"
    );
}

#[test]
fn singleton_types_globals_and_self_types() {
    let input = indoc! {r#"
    class Factory
      def k: () -> singleton(Nope)
    end

    $cfg: Missing

    module M : _Missing
    end
    "#};

    insta::assert_snapshot!(Session::expect_invalid(input), @r"
    test.rbs:2:15: Could not find ::Nope
    test.rbs:5:6: Could not find ::Missing
    test.rbs:7:11: Could not find ::_Missing
    ");
}

#[test]
fn every_problem_is_collected() {
    let session = SessionBuilder::new()
        .add_file("b.rbs", "X: Unknown\n")
        .add_file("a.rbs", "interface _I\n  def self.x: () -> void\nend\n")
        .build()
        .unwrap();

    let diagnostics = session.validate();

    assert_eq!(
        diagnostics.kinds(),
        [
            DiagnosticKind::InterfaceSingletonMethod,
            DiagnosticKind::NoTypeFound
        ]
    );
}

#[test]
fn well_formed_signatures() {
    Session::expect_valid(indoc! {r#"
    module Collections
      class Stack[unchecked out Elem] < Object
        include Enumerable[Elem, self]

        attr_reader size: Integer

        def self.of: [T] (*T items) -> Stack[T]

        def push: (Elem item) -> self

        def pop: () -> Elem?

        def each: () { (Elem item) -> void } -> self

        def peek: () -> Elem?

        alias top peek

        private

        @items: Array[Elem]
      end

      EMPTY: Stack[untyped]
    end

    type Collections::stack_like = Collections::Stack[untyped] | Array[untyped]
    $default_stack: Collections::Stack[Integer]
    "#});
}
