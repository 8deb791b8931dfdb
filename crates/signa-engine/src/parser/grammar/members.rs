//! Class, module and interface bodies.

use text_size::TextSize;

use super::Owner;
use crate::ast::{
    AliasMember, AttributeKind, AttributeMember, Member, MethodKind, MethodMember, Mixin,
    MixinKind, VariableKind, VariableMember, Visibility, VisibilityMarker,
};
use crate::parser::core::{Parsed, Parser};
use crate::parser::syntax_kind::SyntaxKind::*;

impl Parser<'_> {
    /// Members up to and including the closing `end`.
    pub(super) fn parse_members(&mut self, owner: Owner) -> Parsed<Vec<Member>> {
        let mut members = Vec::new();
        loop {
            if self.eat_token(KwEnd) {
                return Ok(members);
            }
            if self.should_stop() {
                return Err(self.error_expected("`end`"));
            }
            self.enter_recursion()?;
            let member = self.parse_member(owner);
            self.exit_recursion();
            members.push(member?);
        }
    }

    fn parse_member(&mut self, owner: Owner) -> Parsed<Member> {
        let interface = owner == Owner::Interface;
        match self.current() {
            KwDef => {
                let start = self.start();
                self.parse_method(None, start).map(Member::Method)
            }
            KwAlias => self.parse_alias_member().map(Member::Alias),
            KwInclude => self.parse_mixin(MixinKind::Include).map(Member::Mixin),
            KwExtend if !interface => self.parse_mixin(MixinKind::Extend).map(Member::Mixin),
            KwPrepend if !interface => self.parse_mixin(MixinKind::Prepend).map(Member::Mixin),
            KwAttrReader | KwAttrWriter | KwAttrAccessor if !interface => {
                let start = self.start();
                self.parse_attribute(None, start).map(Member::Attribute)
            }
            KwPrivate | KwPublic if !interface => self.parse_visibility(),
            IVar | CVar if !interface => self.parse_variable().map(Member::Variable),
            KwClass | KwModule | KwInterface | KwType | UIdent | DoubleColon if !interface => {
                self.parse_declaration().map(Member::Declaration)
            }
            _ if interface => Err(self.error_expected("an interface member or `end`")),
            _ => Err(self.error_expected("a member or `end`")),
        }
    }

    /// `private`/`public` either prefixes a member on the same line or opens a section.
    fn parse_visibility(&mut self) -> Parsed<Member> {
        let start = self.start();
        let range = self.current_span();
        let visibility = if self.currently_is(KwPrivate) {
            Visibility::Private
        } else {
            Visibility::Public
        };
        let prefixes_member = self.next_on_same_line()
            && matches!(
                self.peek_nth(1),
                KwDef | KwAttrReader | KwAttrWriter | KwAttrAccessor
            );
        self.bump();

        if !prefixes_member {
            return Ok(Member::Visibility(VisibilityMarker {
                visibility,
                span: self.span(range),
            }));
        }
        if self.currently_is(KwDef) {
            self.parse_method(Some(visibility), start)
                .map(Member::Method)
        } else {
            self.parse_attribute(Some(visibility), start)
                .map(Member::Attribute)
        }
    }

    fn parse_method(
        &mut self,
        visibility: Option<Visibility>,
        start: TextSize,
    ) -> Parsed<MethodMember> {
        self.assert_current(KwDef);
        self.bump();
        let kind = self.parse_method_kind();
        let name = self.parse_method_name()?;
        self.expect(Colon, "`:`")?;

        let mut overloads = vec![self.parse_method_type()?];
        while self.eat_token(Pipe) {
            overloads.push(self.parse_method_type()?);
        }

        Ok(MethodMember {
            name,
            kind,
            overloads,
            visibility,
            span: self.span_from(start),
        })
    }

    /// `self.` or `self?.` in front of a method name.
    fn parse_method_kind(&mut self) -> MethodKind {
        if !self.currently_is(KwSelf) {
            return MethodKind::Instance;
        }
        match (self.peek_nth(1), self.peek_nth(2)) {
            (Dot, _) => {
                self.bump();
                self.bump();
                MethodKind::Singleton
            }
            (Question, Dot) => {
                self.bump();
                self.bump();
                self.bump();
                MethodKind::SingletonInstance
            }
            _ => MethodKind::Instance,
        }
    }

    /// Words (with an adjacent `?`, `!` or `=` suffix), operators, `[]` and `[]=`.
    pub(super) fn parse_method_name(&mut self) -> Parsed<String> {
        let kind = self.current();
        if kind.is_word() {
            let mut name = self.bump().to_owned();
            if matches!(self.current(), Question | Bang | Equals) && self.is_adjacent() {
                name.push_str(self.bump());
            }
            return Ok(name);
        }
        match kind {
            Operator | Lt | Gt | Bang | Star | StarStar | Pipe | Amp | Caret | Backtick => {
                Ok(self.bump().to_owned())
            }
            BracketOpen => {
                self.bump();
                if !(self.currently_is(BracketClose) && self.is_adjacent()) {
                    return Err(self.error_expected("`]`"));
                }
                self.bump();
                if self.currently_is(Equals) && self.is_adjacent() {
                    self.bump();
                    return Ok("[]=".to_owned());
                }
                Ok("[]".to_owned())
            }
            _ => Err(self.error_expected("a method name")),
        }
    }

    fn parse_attribute(
        &mut self,
        visibility: Option<Visibility>,
        start: TextSize,
    ) -> Parsed<AttributeMember> {
        let kind = match self.current() {
            KwAttrReader => AttributeKind::Reader,
            KwAttrWriter => AttributeKind::Writer,
            _ => {
                self.assert_current(KwAttrAccessor);
                AttributeKind::Accessor
            }
        };
        self.bump();
        let singleton = self.eat_self_dot();
        if !self.current().is_word() {
            return Err(self.error_expected("an attribute name"));
        }
        let name = self.bump().to_owned();
        self.expect(Colon, "`:`")?;
        let ty = self.parse_type()?;
        Ok(AttributeMember {
            kind,
            name,
            ty,
            singleton,
            visibility,
            span: self.span_from(start),
        })
    }

    fn parse_alias_member(&mut self) -> Parsed<AliasMember> {
        let start = self.start();
        self.assert_current(KwAlias);
        self.bump();
        let singleton = self.eat_self_dot();
        let new_name = self.parse_method_name()?;
        let old_start = self.current_span();
        if self.eat_self_dot() != singleton {
            return Err(self.error_at(
                old_start,
                "alias must name two instance methods or two singleton methods",
            ));
        }
        let old_name = self.parse_method_name()?;
        Ok(AliasMember {
            new_name,
            old_name,
            singleton,
            span: self.span_from(start),
        })
    }

    fn parse_mixin(&mut self, kind: MixinKind) -> Parsed<Mixin> {
        let start = self.start();
        self.bump();
        let target = self.parse_named_type("a module or interface name")?;
        Ok(Mixin {
            kind,
            target,
            span: self.span_from(start),
        })
    }

    fn parse_variable(&mut self) -> Parsed<VariableMember> {
        let start = self.start();
        let kind = if self.currently_is(IVar) {
            VariableKind::Instance
        } else {
            VariableKind::Class
        };
        let name = self.bump().to_owned();
        self.expect(Colon, "`:`")?;
        let ty = self.parse_type()?;
        Ok(VariableMember {
            kind,
            name,
            ty,
            span: self.span_from(start),
        })
    }

    fn eat_self_dot(&mut self) -> bool {
        if self.currently_is(KwSelf) && self.next_is(Dot) {
            self.bump();
            self.bump();
            return true;
        }
        false
    }
}
