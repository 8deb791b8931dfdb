use crate::{EntityKind, NameKind, Namespace, TypeName};

fn name(text: &str) -> TypeName {
    TypeName::parse(text).unwrap()
}

#[test]
fn parse_and_display() {
    insta::assert_snapshot!(name("Foo"), @"Foo");
    insta::assert_snapshot!(name("::Foo::Bar"), @"::Foo::Bar");
    insta::assert_snapshot!(name("Foo::_Each"), @"Foo::_Each");
    insta::assert_snapshot!(name("::Foo::t"), @"::Foo::t");
}

#[test]
fn parse_rejects_malformed() {
    assert!(TypeName::parse("").is_none());
    assert!(TypeName::parse("::").is_none());
    assert!(TypeName::parse("Foo::").is_none());
    assert!(TypeName::parse("foo::Bar").is_none());
    assert!(TypeName::parse("_Each::Bar").is_none());
    assert!(TypeName::parse("Foo-Bar").is_none());
}

#[test]
fn name_kinds() {
    assert_eq!(name("Foo").kind(), NameKind::Class);
    assert_eq!(name("::Foo::_Each").kind(), NameKind::Interface);
    assert_eq!(name("int").kind(), NameKind::Alias);
    assert_eq!(name("_foo").kind(), NameKind::Alias);
    assert_eq!(name("_").kind(), NameKind::Alias);
}

#[test]
fn prefixes_outermost_first() {
    let prefixes: Vec<String> = name("::A::B::C")
        .prefixes()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(prefixes, ["::A", "::A::B"]);
    assert!(name("::A").prefixes().is_empty());
}

#[test]
fn with_prefix_keeps_absolute_names() {
    let ns = name("::Outer").to_namespace();
    insta::assert_snapshot!(name("Inner::X").with_prefix(&ns), @"::Outer::Inner::X");
    insta::assert_snapshot!(name("::X").with_prefix(&ns), @"::X");
}

#[test]
fn namespace_navigation() {
    let ns = Namespace::root().append("A").append("B");
    insta::assert_snapshot!(ns, @"::A::B::");
    insta::assert_snapshot!(ns.parent().unwrap(), @"::A::");
    insta::assert_snapshot!(ns.to_type_name().unwrap(), @"::A::B");
    assert!(Namespace::root().parent().is_none());
    assert!(Namespace::root().to_type_name().is_none());
    insta::assert_snapshot!(Namespace::empty(), @"");
}

#[test]
fn head_and_segments() {
    assert_eq!(name("A::B::C").head(), "A");
    assert_eq!(name("C").head(), "C");
    let n = name("::A::b");
    let segments: Vec<&str> = n.segments().collect();
    assert_eq!(segments, ["A", "b"]);
}

#[test]
fn entity_kinds() {
    assert!(EntityKind::Module.is_namespace());
    assert!(!EntityKind::Interface.is_namespace());
    assert!(EntityKind::Module.accepts(NameKind::Class));
    assert!(!EntityKind::Constant.accepts(NameKind::Class));
    insta::assert_snapshot!(EntityKind::Alias, @"type alias");
}
