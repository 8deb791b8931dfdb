//! Visitor over members and type expressions.
//!
//! # Usage
//!
//! Implement `Visitor` for your struct. Override `visit_*` methods to add logic.
//! Call `walk_*` within your override to continue recursion (or omit it to stop).
//!
//! ```ignore
//! impl Visitor for MyPass {
//!     fn visit_named_type(&mut self, named: &NamedType) {
//!         // Pre-order logic
//!         walk_named_type(self, named);
//!     }
//! }
//! ```
//!
//! Nested declarations are not entered: each is an entity of its own.

use super::{
    Member, MethodMember, MethodType, Mixin, NamedType, SingletonType, TypeExpr, TypeParam,
};

pub trait Visitor: Sized {
    fn visit_member(&mut self, member: &Member) {
        walk_member(self, member);
    }

    fn visit_method(&mut self, method: &MethodMember) {
        walk_method(self, method);
    }

    fn visit_method_type(&mut self, method: &MethodType) {
        walk_method_type(self, method);
    }

    fn visit_mixin(&mut self, mixin: &Mixin) {
        walk_mixin(self, mixin);
    }

    fn visit_type_param(&mut self, param: &TypeParam) {
        walk_type_param(self, param);
    }

    fn visit_type(&mut self, ty: &TypeExpr) {
        walk_type(self, ty);
    }

    fn visit_named_type(&mut self, named: &NamedType) {
        walk_named_type(self, named);
    }

    fn visit_singleton_type(&mut self, _singleton: &SingletonType) {
        // Leaf
    }
}

pub fn walk_member<V: Visitor>(visitor: &mut V, member: &Member) {
    match member {
        Member::Method(method) => visitor.visit_method(method),
        Member::Attribute(attribute) => visitor.visit_type(&attribute.ty),
        Member::Variable(variable) => visitor.visit_type(&variable.ty),
        Member::Mixin(mixin) => visitor.visit_mixin(mixin),
        Member::Alias(_) | Member::Visibility(_) | Member::Declaration(_) => {}
    }
}

pub fn walk_method<V: Visitor>(visitor: &mut V, method: &MethodMember) {
    for overload in &method.overloads {
        visitor.visit_method_type(overload);
    }
}

pub fn walk_method_type<V: Visitor>(visitor: &mut V, method: &MethodType) {
    for param in &method.type_params {
        visitor.visit_type_param(param);
    }
    for param in method.function.params() {
        visitor.visit_type(&param.ty);
    }
    visitor.visit_type(&method.function.return_type);
    if let Some(block) = &method.block {
        for param in block.function.params() {
            visitor.visit_type(&param.ty);
        }
        visitor.visit_type(&block.function.return_type);
    }
}

pub fn walk_mixin<V: Visitor>(visitor: &mut V, mixin: &Mixin) {
    visitor.visit_named_type(&mixin.target);
}

pub fn walk_type_param<V: Visitor>(visitor: &mut V, param: &TypeParam) {
    if let Some(bound) = &param.upper_bound {
        visitor.visit_type(bound);
    }
}

pub fn walk_type<V: Visitor>(visitor: &mut V, ty: &TypeExpr) {
    match ty {
        TypeExpr::Named(named) => visitor.visit_named_type(named),
        TypeExpr::Singleton(singleton) => visitor.visit_singleton_type(singleton),
        TypeExpr::Union { types } | TypeExpr::Intersection { types } | TypeExpr::Tuple { types } => {
            for ty in types {
                visitor.visit_type(ty);
            }
        }
        TypeExpr::Optional { inner } => visitor.visit_type(inner),
        TypeExpr::Record { fields } => {
            for field in fields {
                visitor.visit_type(&field.ty);
            }
        }
        TypeExpr::Proc(proc) => {
            for param in proc.function.params() {
                visitor.visit_type(&param.ty);
            }
            visitor.visit_type(&proc.function.return_type);
            if let Some(block) = &proc.block {
                for param in block.function.params() {
                    visitor.visit_type(&param.ty);
                }
                visitor.visit_type(&block.function.return_type);
            }
        }
        TypeExpr::Var { .. } | TypeExpr::Literal { .. } | TypeExpr::Special { .. } => {}
    }
}

pub fn walk_named_type<V: Visitor>(visitor: &mut V, named: &NamedType) {
    for arg in &named.args {
        visitor.visit_type(arg);
    }
}
