use signa_core::TypeName;

use crate::source::Span;

/// Fieldless tag for every [`SignatureError`] variant.
///
/// Ordered roughly by pipeline stage: parser, environment merge, resolution,
/// then semantic rules and on-demand builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    Syntax,
    DeclarationConflict,
    NoTypeFound,
    ArityMismatch,
    InvalidSuperclass,
    InvalidMixinTarget,
    InterfaceSingletonMethod,
    DuplicatedMethodDefinition,
    UnknownMethodAlias,
    CyclicAncestor,
    NoSingletonChain,
}

impl DiagnosticKind {
    /// Stable name used when listing errors by kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Syntax => "SyntaxError",
            Self::DeclarationConflict => "DeclarationConflictError",
            Self::NoTypeFound => "NoTypeFoundError",
            Self::ArityMismatch => "ArityMismatchError",
            Self::InvalidSuperclass => "InvalidSuperclassError",
            Self::InvalidMixinTarget => "InvalidMixinTargetError",
            Self::InterfaceSingletonMethod => "InterfaceSingletonMethodError",
            Self::DuplicatedMethodDefinition => "DuplicatedMethodDefinitionError",
            Self::UnknownMethodAlias => "UnknownMethodAliasError",
            Self::CyclicAncestor => "CyclicAncestorError",
            Self::NoSingletonChain => "NoSingletonChainError",
        }
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One structured error. Callers match on fields, not on messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("{message}")]
    Syntax { message: String, span: Span },

    #[error("`{type_name}` is declared inconsistently: {reason}")]
    DeclarationConflict {
        type_name: TypeName,
        reason: String,
        span: Span,
    },

    #[error("Could not find {type_name}")]
    NoTypeFound { type_name: TypeName, span: Span },

    #[error("`{type_name}` expects {expected} type arguments, but {actual} given")]
    ArityMismatch {
        type_name: TypeName,
        expected: usize,
        actual: usize,
        span: Span,
    },

    #[error("superclass of `{type_name}` must be a class, but `{super_class}` is not")]
    InvalidSuperclass {
        type_name: TypeName,
        super_class: TypeName,
        span: Span,
    },

    #[error("`{target}` cannot be used with {directive} in `{type_name}`")]
    InvalidMixinTarget {
        type_name: TypeName,
        target: TypeName,
        directive: &'static str,
        span: Span,
    },

    #[error("Interface cannot have singleton method")]
    InterfaceSingletonMethod {
        interface: TypeName,
        method: String,
        span: Span,
    },

    #[error("`{type_name}` defines method `{method}` more than once")]
    DuplicatedMethodDefinition {
        type_name: TypeName,
        method: String,
        span: Span,
    },

    #[error("alias target `{method}` is not defined for `{type_name}`")]
    UnknownMethodAlias {
        type_name: TypeName,
        method: String,
        span: Span,
    },

    #[error("cyclic ancestors: {}", format_path(.path))]
    CyclicAncestor { path: Vec<TypeName>, span: Span },

    #[error("interface `{type_name}` has no singleton ancestors")]
    NoSingletonChain { type_name: TypeName, span: Span },
}

fn format_path(path: &[TypeName]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl SignatureError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::Syntax { .. } => DiagnosticKind::Syntax,
            Self::DeclarationConflict { .. } => DiagnosticKind::DeclarationConflict,
            Self::NoTypeFound { .. } => DiagnosticKind::NoTypeFound,
            Self::ArityMismatch { .. } => DiagnosticKind::ArityMismatch,
            Self::InvalidSuperclass { .. } => DiagnosticKind::InvalidSuperclass,
            Self::InvalidMixinTarget { .. } => DiagnosticKind::InvalidMixinTarget,
            Self::InterfaceSingletonMethod { .. } => DiagnosticKind::InterfaceSingletonMethod,
            Self::DuplicatedMethodDefinition { .. } => DiagnosticKind::DuplicatedMethodDefinition,
            Self::UnknownMethodAlias { .. } => DiagnosticKind::UnknownMethodAlias,
            Self::CyclicAncestor { .. } => DiagnosticKind::CyclicAncestor,
            Self::NoSingletonChain { .. } => DiagnosticKind::NoSingletonChain,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Syntax { span, .. }
            | Self::DeclarationConflict { span, .. }
            | Self::NoTypeFound { span, .. }
            | Self::ArityMismatch { span, .. }
            | Self::InvalidSuperclass { span, .. }
            | Self::InvalidMixinTarget { span, .. }
            | Self::InterfaceSingletonMethod { span, .. }
            | Self::DuplicatedMethodDefinition { span, .. }
            | Self::UnknownMethodAlias { span, .. }
            | Self::CyclicAncestor { span, .. }
            | Self::NoSingletonChain { span, .. } => *span,
        }
    }
}
