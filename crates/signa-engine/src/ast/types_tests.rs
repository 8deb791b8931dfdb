use signa_core::TypeName;
use text_size::TextRange;

use super::*;
use crate::source::{SourceId, Span};

fn span() -> Span {
    Span::new(SourceId(0), TextRange::default())
}

fn named(name: &str, args: Vec<TypeExpr>) -> TypeExpr {
    TypeExpr::Named(NamedType {
        name: TypeName::parse(name).unwrap(),
        args,
        span: span(),
    })
}

fn param(ty: TypeExpr) -> Param {
    Param { ty, name: None }
}

#[test]
fn method_type_display() {
    let yield_self = MethodType {
        type_params: vec![TypeParam {
            name: "X".to_owned(),
            variance: Variance::Invariant,
            unchecked: false,
            upper_bound: None,
            span: span(),
        }],
        function: FunctionType::returning(TypeExpr::var("X")),
        block: Some(Block {
            required: true,
            function: FunctionType {
                required: vec![param(TypeExpr::Special {
                    special: Special::SelfType,
                })],
                ..FunctionType::returning(TypeExpr::var("X"))
            },
        }),
        span: span(),
    };

    insta::assert_snapshot!(yield_self, @"[X] () { (self) -> X } -> X");
}

#[test]
fn optional_block_display() {
    let each = MethodType {
        type_params: Vec::new(),
        function: FunctionType::returning(named("::Enumerator", vec![TypeExpr::untyped()])),
        block: Some(Block {
            required: false,
            function: FunctionType::returning(TypeExpr::Special {
                special: Special::Void,
            }),
        }),
        span: span(),
    };

    insta::assert_snapshot!(each, @"() ?{ () -> void } -> ::Enumerator[untyped]");
}

#[test]
fn union_in_return_position_is_parenthesized() {
    let function = FunctionType::returning(TypeExpr::Union {
        types: vec![named("::Integer", vec![]), named("::String", vec![])],
    });

    insta::assert_snapshot!(function, @"() -> (::Integer | ::String)");
}

#[test]
fn map_replaces_variables() {
    let ty = named(
        "::Hash",
        vec![
            TypeExpr::var("K"),
            TypeExpr::Optional {
                inner: Box::new(TypeExpr::var("V")),
            },
        ],
    );

    let mapped = ty.map(&mut |t| match t {
        TypeExpr::Var { name } if name == "V" => named("::String", vec![]),
        other => other,
    });

    insta::assert_snapshot!(mapped, @"::Hash[K, ::String?]");
}

#[test]
fn walk_visits_parents_first() {
    let ty = TypeExpr::Tuple {
        types: vec![named("::Array", vec![TypeExpr::var("T")]), TypeExpr::untyped()],
    };

    let mut seen = Vec::new();
    ty.walk(&mut |t| seen.push(t.to_string()));

    insta::assert_snapshot!(seen.join("\n"), @r"
    [::Array[T], untyped]
    ::Array[T]
    T
    untyped
    ");
}

#[test]
fn method_type_walk_includes_bounds_and_block() {
    let method = MethodType {
        type_params: vec![TypeParam {
            name: "X".to_owned(),
            variance: Variance::Invariant,
            unchecked: false,
            upper_bound: Some(named("::Comparable", vec![])),
            span: span(),
        }],
        function: FunctionType {
            required: vec![param(TypeExpr::var("X"))],
            ..FunctionType::returning(TypeExpr::Special {
                special: Special::Bool,
            })
        },
        block: Some(Block {
            required: true,
            function: FunctionType::returning(named("::Integer", vec![])),
        }),
        span: span(),
    };

    let mut seen = Vec::new();
    method.walk(&mut |t| seen.push(t.to_string()));

    assert_eq!(seen, ["::Comparable", "X", "bool", "::Integer"]);
    assert_eq!(method.type_param_names().collect::<Vec<_>>(), ["X"]);
}
