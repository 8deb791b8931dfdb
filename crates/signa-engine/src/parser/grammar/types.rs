//! Type expressions, method types and parameter lists.

use crate::ast::{
    Block, FunctionType, Literal, MethodType, NamedType, Param, ProcType, RecordField, RecordKey,
    SingletonType, Special, TypeExpr,
};
use crate::parser::core::{Parsed, Parser};
use crate::parser::syntax_kind::SPECIAL_TYPES;
use crate::parser::syntax_kind::SyntaxKind::{self, *};

impl Parser<'_> {
    /// Full type: `A | B & C?`.
    pub(super) fn parse_type(&mut self) -> Parsed<TypeExpr> {
        self.enter_recursion()?;
        let ty = self.parse_union();
        self.exit_recursion();
        ty
    }

    fn parse_union(&mut self) -> Parsed<TypeExpr> {
        let first = self.parse_intersection()?;
        if !self.currently_is(Pipe) {
            return Ok(first);
        }
        let mut types = vec![first];
        while self.eat_token(Pipe) {
            types.push(self.parse_intersection()?);
        }
        Ok(TypeExpr::Union { types })
    }

    fn parse_intersection(&mut self) -> Parsed<TypeExpr> {
        let first = self.parse_optional()?;
        if !self.currently_is(Amp) {
            return Ok(first);
        }
        let mut types = vec![first];
        while self.eat_token(Amp) {
            types.push(self.parse_optional()?);
        }
        Ok(TypeExpr::Intersection { types })
    }

    /// Postfix `?`. Return types stop here so that `|` can separate overloads.
    fn parse_optional(&mut self) -> Parsed<TypeExpr> {
        let mut ty = self.parse_simple_type()?;
        while self.currently_is(Question) && !self.next_is(BraceOpen) {
            self.bump();
            ty = TypeExpr::Optional {
                inner: Box::new(ty),
            };
        }
        Ok(ty)
    }

    fn parse_return_type(&mut self) -> Parsed<TypeExpr> {
        self.enter_recursion()?;
        let ty = self.parse_optional();
        self.exit_recursion();
        ty
    }

    fn parse_simple_type(&mut self) -> Parsed<TypeExpr> {
        let kind = self.current();
        if SPECIAL_TYPES.contains(kind) {
            self.bump();
            return Ok(TypeExpr::Special {
                special: special_of(kind),
            });
        }
        match kind {
            ParenOpen => {
                self.bump();
                let ty = self.parse_type()?;
                self.expect(ParenClose, "`)`")?;
                Ok(ty)
            }
            BracketOpen => self.parse_tuple(),
            BraceOpen => self.parse_record(),
            Caret => self.parse_proc(),
            StringLit => Ok(literal(Literal::String(self.bump().to_owned()))),
            SymbolLit => Ok(literal(Literal::Symbol(self.bump()[1..].to_owned()))),
            IntegerLit => {
                let range = self.current_span();
                match self.bump().parse::<i64>() {
                    Ok(value) => Ok(literal(Literal::Integer(value))),
                    Err(_) => Err(self.error_at(range, "integer literal out of range")),
                }
            }
            KwTrue => {
                self.bump();
                Ok(literal(Literal::True))
            }
            KwFalse => {
                self.bump();
                Ok(literal(Literal::False))
            }
            KwSingleton => self.parse_singleton_type(),
            UIdent if self.at_type_var() => Ok(TypeExpr::var(self.bump())),
            UIdent | InterfaceIdent | LIdent | DoubleColon => {
                self.parse_named("a type", |k| matches!(k, UIdent | InterfaceIdent | LIdent))
                    .map(TypeExpr::Named)
            }
            _ => Err(self.error_expected("a type")),
        }
    }

    /// A bare capitalized name that refers to a type parameter in scope.
    fn at_type_var(&mut self) -> bool {
        let text = self.current_text();
        !self.next_is(DoubleColon) && self.is_type_var(text)
    }

    /// Class, module or interface name with optional arguments, as used by
    /// superclasses, mixins and module self types.
    pub(super) fn parse_named_type(&mut self, what: &str) -> Parsed<NamedType> {
        self.parse_named(what, |k| matches!(k, UIdent | InterfaceIdent))
    }

    fn parse_named(
        &mut self,
        what: &str,
        accept: impl Fn(SyntaxKind) -> bool,
    ) -> Parsed<NamedType> {
        let start = self.start();
        let (name, _) = self.parse_type_name(what, accept)?;
        let mut args = Vec::new();
        if self.eat_token(BracketOpen) {
            loop {
                args.push(self.parse_type()?);
                if !self.eat_token(Comma) {
                    break;
                }
            }
            self.expect(BracketClose, "`,` or `]`")?;
        }
        Ok(NamedType {
            name,
            args,
            span: self.span_from(start),
        })
    }

    fn parse_singleton_type(&mut self) -> Parsed<TypeExpr> {
        let start = self.start();
        self.assert_current(KwSingleton);
        self.bump();
        self.expect(ParenOpen, "`(`")?;
        let (name, _) = self.parse_type_name("a class or module name", |k| k == UIdent)?;
        self.expect(ParenClose, "`)`")?;
        Ok(TypeExpr::Singleton(SingletonType {
            name,
            span: self.span_from(start),
        }))
    }

    fn parse_tuple(&mut self) -> Parsed<TypeExpr> {
        self.assert_current(BracketOpen);
        self.bump();
        let mut types = Vec::new();
        while !self.currently_is(BracketClose) {
            types.push(self.parse_type()?);
            if !self.eat_token(Comma) {
                break;
            }
        }
        self.expect(BracketClose, "`,` or `]`")?;
        Ok(TypeExpr::Tuple { types })
    }

    /// `{ name: T, "key" => T, :sym => T }`
    fn parse_record(&mut self) -> Parsed<TypeExpr> {
        self.assert_current(BraceOpen);
        self.bump();
        let mut fields = Vec::new();
        while !self.currently_is(BraceClose) {
            let kind = self.current();
            let key = if kind.is_word() && self.next_is(Colon) {
                let key = self.bump().to_owned();
                self.bump();
                RecordKey::Symbol(key)
            } else if kind == StringLit {
                let key = self.bump().to_owned();
                self.expect(FatArrow, "`=>`")?;
                RecordKey::String(key)
            } else if kind == SymbolLit {
                let key = self.bump()[1..].to_owned();
                self.expect(FatArrow, "`=>`")?;
                RecordKey::Symbol(key)
            } else {
                return Err(self.error_expected("a record key"));
            };
            let ty = self.parse_type()?;
            fields.push(RecordField { key, ty });
            if !self.eat_token(Comma) {
                break;
            }
        }
        self.expect(BraceClose, "`,` or `}`")?;
        Ok(TypeExpr::Record { fields })
    }

    /// `^(params) { block } -> T`
    fn parse_proc(&mut self) -> Parsed<TypeExpr> {
        self.assert_current(Caret);
        self.bump();
        let (function, block) = self.parse_callable()?;
        Ok(TypeExpr::Proc(Box::new(ProcType { function, block })))
    }

    /// One overload: `[X] (params) ?{ (params) -> T } -> T`.
    pub(super) fn parse_method_type(&mut self) -> Parsed<MethodType> {
        let start = self.start();
        self.in_nested_type_scope(|p| {
            let type_params = p.parse_type_params(false)?;
            let (function, block) = p.parse_callable()?;
            Ok(MethodType {
                type_params,
                function,
                block,
                span: p.span_from(start),
            })
        })
    }

    /// Parameters, block and return type shared by methods and procs.
    fn parse_callable(&mut self) -> Parsed<(FunctionType, Option<Block>)> {
        let mut function = self.parse_params()?;
        let block = self.parse_block()?;
        self.expect(Arrow, "`->`")?;
        function.return_type = Box::new(self.parse_return_type()?);
        Ok((function, block))
    }

    fn parse_block(&mut self) -> Parsed<Option<Block>> {
        let required = match self.current() {
            BraceOpen => true,
            Question if self.next_is(BraceOpen) => {
                self.bump();
                false
            }
            _ => return Ok(None),
        };
        self.bump();
        let mut function = self.parse_params()?;
        self.expect(Arrow, "`->`")?;
        function.return_type = Box::new(self.parse_type()?);
        self.expect(BraceClose, "`}`")?;
        Ok(Some(Block { required, function }))
    }

    /// Optional `(...)` parameter list. The return type is left as `untyped`.
    fn parse_params(&mut self) -> Parsed<FunctionType> {
        let mut function = FunctionType::returning(TypeExpr::untyped());
        if !self.eat_token(ParenOpen) {
            return Ok(function);
        }
        while !self.currently_is(ParenClose) {
            self.parse_param(&mut function)?;
            if !self.eat_token(Comma) {
                break;
            }
        }
        self.expect(ParenClose, "`,` or `)`")?;
        Ok(function)
    }

    fn parse_param(&mut self, function: &mut FunctionType) -> Parsed<()> {
        match self.current() {
            Question if self.peek_nth(1).is_word() && self.peek_nth(2) == Colon => {
                self.bump();
                let key = self.parse_keyword_name()?;
                function.optional_keywords.push((key, self.parse_param_type()?));
            }
            Question => {
                self.bump();
                function.optional.push(self.parse_param_type()?);
            }
            StarStar => {
                self.bump();
                function.rest_keywords = Some(self.parse_param_type()?);
            }
            Star => {
                self.bump();
                function.rest = Some(self.parse_param_type()?);
            }
            kind if kind.is_word() && self.next_is(Colon) => {
                let key = self.parse_keyword_name()?;
                function.required_keywords.push((key, self.parse_param_type()?));
            }
            _ => {
                let param = self.parse_param_type()?;
                if function.rest.is_some() || !function.optional.is_empty() {
                    function.trailing.push(param);
                } else {
                    function.required.push(param);
                }
            }
        }
        Ok(())
    }

    fn parse_keyword_name(&mut self) -> Parsed<String> {
        let name = self.bump().to_owned();
        self.expect(Colon, "`:`")?;
        Ok(name)
    }

    /// A type followed by an optional variable name.
    fn parse_param_type(&mut self) -> Parsed<Param> {
        let ty = self.parse_type()?;
        let name = if self.currently_is(LIdent) {
            Some(self.bump().to_owned())
        } else {
            None
        };
        Ok(Param { ty, name })
    }
}

fn literal(value: Literal) -> TypeExpr {
    TypeExpr::Literal { value }
}

fn special_of(kind: SyntaxKind) -> Special {
    match kind {
        KwUntyped => Special::Untyped,
        KwVoid => Special::Void,
        KwSelf => Special::SelfType,
        KwInstance => Special::Instance,
        KwClass => Special::Class,
        KwBot => Special::Bot,
        KwTop => Special::Top,
        KwNil => Special::Nil,
        _ => Special::Bool,
    }
}
