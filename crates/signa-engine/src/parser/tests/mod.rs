//! Grammar tests. Declarations are printed back as an indented outline.


use std::fmt::Write;

use crate::ast::{AttributeKind, Declaration, Member, MethodKind, MethodMember, TypeParam};
use crate::source::{SourceId, SourceMap};

pub(super) fn parse_outline(source: &str) -> String {
    let mut sources = SourceMap::new();
    let id = sources.add_file("test.rbs", source);
    let (declarations, diagnostics) = super::parse(source, id).expect("no fatal error");
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics:\n{}",
        diagnostics.render(&sources)
    );
    let mut out = String::new();
    for declaration in &declarations {
        write_declaration(&mut out, declaration, 0);
    }
    out
}

/// Rendered syntax errors. The file must not parse.
pub(super) fn parse_errors(source: &str) -> String {
    let mut sources = SourceMap::new();
    let id = sources.add_file("test.rbs", source);
    let (declarations, diagnostics) = super::parse(source, id).expect("no fatal error");
    assert!(declarations.is_empty(), "a failed file keeps no declarations");
    assert!(!diagnostics.is_empty(), "expected a syntax error");
    diagnostics.render(&sources)
}

pub(super) fn parse_raw(source: &str) -> Vec<Declaration> {
    let (declarations, diagnostics) =
        super::parse(source, SourceId(0)).expect("no fatal error");
    assert!(diagnostics.is_empty());
    declarations
}

fn params(params: &[TypeParam]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let list: Vec<String> = params.iter().map(ToString::to_string).collect();
    format!("[{}]", list.join(", "))
}

fn write_declaration(out: &mut String, declaration: &Declaration, indent: usize) {
    let pad = "  ".repeat(indent);
    let members = match declaration {
        Declaration::Class(d) => {
            write!(out, "{pad}class {}{}", d.name, params(&d.type_params)).unwrap();
            if let Some(super_class) = &d.super_class {
                write!(out, " < {super_class}").unwrap();
            }
            &d.members
        }
        Declaration::Module(d) => {
            write!(out, "{pad}module {}{}", d.name, params(&d.type_params)).unwrap();
            for (i, self_type) in d.self_types.iter().enumerate() {
                let sep = if i == 0 { " : " } else { ", " };
                write!(out, "{sep}{self_type}").unwrap();
            }
            &d.members
        }
        Declaration::Interface(d) => {
            write!(out, "{pad}interface {}{}", d.name, params(&d.type_params)).unwrap();
            &d.members
        }
        Declaration::Alias(d) => {
            writeln!(out, "{pad}type {}{} = {}", d.name, params(&d.type_params), d.ty).unwrap();
            return;
        }
        Declaration::Constant(d) => {
            writeln!(out, "{pad}{}: {}", d.name, d.ty).unwrap();
            return;
        }
        Declaration::Global(d) => {
            writeln!(out, "{pad}{}: {}", d.name, d.ty).unwrap();
            return;
        }
    };
    out.push('\n');
    for member in members {
        write_member(out, member, indent + 1);
    }
}

fn write_member(out: &mut String, member: &Member, indent: usize) {
    let pad = "  ".repeat(indent);
    match member {
        Member::Method(method) => writeln!(out, "{pad}{}", method_line(method)).unwrap(),
        Member::Attribute(attr) => {
            let visibility = attr.visibility.map(|v| format!("{v} ")).unwrap_or_default();
            let target = if attr.singleton { "self." } else { "" };
            let keyword = match attr.kind {
                AttributeKind::Reader => "attr_reader",
                AttributeKind::Writer => "attr_writer",
                AttributeKind::Accessor => "attr_accessor",
            };
            writeln!(
                out,
                "{pad}{visibility}{keyword} {target}{}: {}",
                attr.name, attr.ty
            )
            .unwrap();
        }
        Member::Alias(alias) => {
            let target = if alias.singleton { "self." } else { "" };
            writeln!(
                out,
                "{pad}alias {target}{} {target}{}",
                alias.new_name, alias.old_name
            )
            .unwrap();
        }
        Member::Mixin(mixin) => writeln!(out, "{pad}{} {}", mixin.kind, mixin.target).unwrap(),
        Member::Visibility(marker) => writeln!(out, "{pad}{}", marker.visibility).unwrap(),
        Member::Variable(variable) => {
            writeln!(out, "{pad}{}: {}", variable.name, variable.ty).unwrap()
        }
        Member::Declaration(declaration) => write_declaration(out, declaration, indent),
    }
}

fn method_line(method: &MethodMember) -> String {
    let visibility = method
        .visibility
        .map(|v| format!("{v} "))
        .unwrap_or_default();
    let prefix = match method.kind {
        MethodKind::Instance => "",
        MethodKind::Singleton => "self.",
        MethodKind::SingletonInstance => "self?.",
    };
    let overloads: Vec<String> = method.overloads.iter().map(ToString::to_string).collect();
    format!(
        "{visibility}def {prefix}{}: {}",
        method.name,
        overloads.join(" | ")
    )
}
