//! Grammar productions for the signature language.
//!
//! This module implements all `parse_*` methods as an extension of `Parser`.
//! Declarations live here; class bodies in `members`, type expressions in `types`.

mod members;
mod types;

use signa_core::{Namespace, TypeName};
use text_size::TextRange;

use super::core::{Parsed, Parser};
use super::syntax_kind::SyntaxKind::{self, *};
use crate::ast::{
    AliasDecl, ClassDecl, ConstantDecl, Declaration, GlobalDecl, InterfaceDecl, ModuleDecl,
    TypeParam, Variance,
};

/// Which body a member list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Owner {
    Class,
    Module,
    Interface,
}

impl Parser<'_> {
    pub(super) fn parse_file(&mut self) -> Parsed<Vec<Declaration>> {
        let mut declarations = Vec::new();
        while !self.should_stop() {
            declarations.push(self.parse_declaration()?);
        }
        Ok(declarations)
    }

    pub(super) fn parse_declaration(&mut self) -> Parsed<Declaration> {
        match self.current() {
            KwClass => self.parse_class().map(Declaration::Class),
            KwModule => self.parse_module().map(Declaration::Module),
            KwInterface => self.parse_interface().map(Declaration::Interface),
            KwType => self.parse_alias_decl().map(Declaration::Alias),
            UIdent | DoubleColon => self.parse_constant().map(Declaration::Constant),
            GVar => self.parse_global().map(Declaration::Global),
            _ => Err(self.error_expected("a declaration")),
        }
    }

    fn parse_class(&mut self) -> Parsed<ClassDecl> {
        let start = self.start();
        self.assert_current(KwClass);
        self.bump();
        let (name, name_range) = self.parse_type_name("a class name", |k| k == UIdent)?;

        self.in_type_scope(|p| {
            let type_params = p.parse_type_params(true)?;
            let super_class = if p.eat_token(Lt) {
                Some(p.parse_named_type("a superclass name")?)
            } else {
                None
            };
            let members = p.parse_members(Owner::Class)?;
            Ok(ClassDecl {
                name,
                type_params,
                super_class,
                members,
                name_span: p.span(name_range),
                span: p.span_from(start),
            })
        })
    }

    fn parse_module(&mut self) -> Parsed<ModuleDecl> {
        let start = self.start();
        self.assert_current(KwModule);
        self.bump();
        let (name, name_range) = self.parse_type_name("a module name", |k| k == UIdent)?;

        self.in_type_scope(|p| {
            let type_params = p.parse_type_params(true)?;
            let mut self_types = Vec::new();
            if p.eat_token(Colon) {
                loop {
                    self_types.push(p.parse_named_type("a self type")?);
                    if !p.eat_token(Comma) {
                        break;
                    }
                }
            }
            let members = p.parse_members(Owner::Module)?;
            Ok(ModuleDecl {
                name,
                type_params,
                self_types,
                members,
                name_span: p.span(name_range),
                span: p.span_from(start),
            })
        })
    }

    fn parse_interface(&mut self) -> Parsed<InterfaceDecl> {
        let start = self.start();
        self.assert_current(KwInterface);
        self.bump();
        let (name, name_range) =
            self.parse_type_name("an interface name", |k| k == InterfaceIdent)?;

        self.in_type_scope(|p| {
            let type_params = p.parse_type_params(true)?;
            let members = p.parse_members(Owner::Interface)?;
            Ok(InterfaceDecl {
                name,
                type_params,
                members,
                name_span: p.span(name_range),
                span: p.span_from(start),
            })
        })
    }

    fn parse_alias_decl(&mut self) -> Parsed<AliasDecl> {
        let start = self.start();
        self.assert_current(KwType);
        self.bump();
        let (name, name_range) = self.parse_type_name("a type alias name", |k| k == LIdent)?;

        self.in_type_scope(|p| {
            let type_params = p.parse_type_params(true)?;
            p.expect(Equals, "`=`")?;
            let ty = p.parse_type()?;
            Ok(AliasDecl {
                name,
                type_params,
                ty,
                name_span: p.span(name_range),
                span: p.span_from(start),
            })
        })
    }

    fn parse_constant(&mut self) -> Parsed<ConstantDecl> {
        let start = self.start();
        let (name, name_range) = self.parse_type_name("a constant name", |k| k == UIdent)?;
        self.expect(Colon, "`:`")?;
        let ty = self.parse_type()?;
        Ok(ConstantDecl {
            name,
            ty,
            name_span: self.span(name_range),
            span: self.span_from(start),
        })
    }

    fn parse_global(&mut self) -> Parsed<GlobalDecl> {
        let start = self.start();
        self.assert_current(GVar);
        let name = self.bump().to_owned();
        self.expect(Colon, "`:`")?;
        let ty = self.parse_type()?;
        Ok(GlobalDecl {
            name,
            ty,
            span: self.span_from(start),
        })
    }

    /// `::`? (`Name` `::`)* last, where `last` must satisfy `accept`.
    pub(super) fn parse_type_name(
        &mut self,
        what: &str,
        accept: impl Fn(SyntaxKind) -> bool,
    ) -> Parsed<(TypeName, TextRange)> {
        let start = self.start();
        let absolute = self.eat_token(DoubleColon);
        let mut path = Vec::new();
        while self.currently_is(UIdent) && self.next_is(DoubleColon) {
            path.push(self.bump().to_owned());
            self.bump();
        }
        if !accept(self.current()) {
            return Err(self.error_expected(what));
        }
        let last = self.bump().to_owned();
        let range = self.span_from(start).range;
        Ok((TypeName::new(Namespace::new(path, absolute), last), range))
    }

    /// `[unchecked? (in|out)? Name (< Bound)?, ...]`, or nothing.
    ///
    /// Names join the innermost type scope as they are parsed, so a bound may
    /// mention earlier parameters.
    pub(super) fn parse_type_params(&mut self, allow_variance: bool) -> Parsed<Vec<TypeParam>> {
        let mut params = Vec::new();
        if !self.eat_token(BracketOpen) {
            return Ok(params);
        }
        loop {
            let start = self.start();
            let unchecked = allow_variance && self.eat_token(KwUnchecked);
            let variance = match self.current() {
                KwIn if allow_variance => {
                    self.bump();
                    Variance::Contravariant
                }
                KwOut if allow_variance => {
                    self.bump();
                    Variance::Covariant
                }
                _ => Variance::Invariant,
            };
            if !self.currently_is(UIdent) {
                return Err(self.error_expected("a type parameter name"));
            }
            let name = self.bump().to_owned();
            if let Some(scope) = self.type_vars.last_mut() {
                scope.push(name.clone());
            }
            let upper_bound = if self.eat_token(Lt) {
                Some(self.parse_type()?)
            } else {
                None
            };
            params.push(TypeParam {
                name,
                variance,
                unchecked,
                upper_bound,
                span: self.span_from(start),
            });
            if !self.eat_token(Comma) {
                break;
            }
        }
        self.expect(BracketClose, "`,` or `]`")?;
        Ok(params)
    }

    /// Runs `f` with a fresh, isolated type scope: parameters of enclosing
    /// declarations are not visible inside a nested one.
    fn in_type_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> Parsed<T>) -> Parsed<T> {
        let outer = std::mem::replace(&mut self.type_vars, vec![Vec::new()]);
        let result = f(self);
        self.type_vars = outer;
        result
    }

    /// Runs `f` with an extra scope stacked on the current ones.
    pub(super) fn in_nested_type_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Parsed<T>,
    ) -> Parsed<T> {
        self.type_vars.push(Vec::new());
        let result = f(self);
        self.type_vars.pop();
        result
    }
}
