//! # Registration-time classification of listener calling conventions.
//!
//! A listener declares a [`Signature`]; [`classify`] turns it into one of four
//! [`CallingConvention`]s or rejects it.
//!
//! ## Rules
//! ```text
//! accepts 1 argument?  ── yes ──► Arity1{Sync,Async}
//!        │ no
//! accepts 0 arguments? ── yes ──► Arity0{Sync,Async}
//!        │ no
//!        └──► ManagerError::InvalidListenerSignature
//!
//! Signature::Opaque ──► Arity1 (cannot be inspected; assume it takes the payload)
//! ```

use crate::error::ManagerError;

/// Declared parameter list of a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// Positional parameters: `required` mandatory, then `optional` defaulted ones,
    /// then (if `variadic`) any number of extra arguments.
    Positional {
        required: usize,
        optional: usize,
        variadic: bool,
    },
    /// Parameter list is unknown.
    Opaque,
}

impl Signature {
    /// No parameters.
    pub const fn nullary() -> Self {
        Self::positional(0, 0)
    }

    /// Exactly one parameter (the event payload).
    pub const fn unary() -> Self {
        Self::positional(1, 0)
    }

    /// `required` mandatory and `optional` defaulted parameters.
    pub const fn positional(required: usize, optional: usize) -> Self {
        Signature::Positional {
            required,
            optional,
            variadic: false,
        }
    }

    /// `required` mandatory parameters followed by a variadic tail.
    pub const fn variadic(required: usize) -> Self {
        Signature::Positional {
            required,
            optional: 0,
            variadic: true,
        }
    }

    /// Unknown parameter list.
    pub const fn opaque() -> Self {
        Signature::Opaque
    }

    /// Whether a call with `n` positional arguments binds.
    pub fn accepts(&self, n: usize) -> bool {
        match *self {
            Signature::Positional {
                required,
                optional,
                variadic,
            } => n >= required && (variadic || n <= required + optional),
            Signature::Opaque => true,
        }
    }
}

/// How the adapter calls a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallingConvention {
    Arity0Sync,
    Arity1Sync,
    Arity0Async,
    Arity1Async,
}

impl CallingConvention {
    /// Number of arguments passed on each call.
    #[inline]
    pub fn arity(self) -> usize {
        match self {
            CallingConvention::Arity0Sync | CallingConvention::Arity0Async => 0,
            CallingConvention::Arity1Sync | CallingConvention::Arity1Async => 1,
        }
    }

    /// Whether the listener returns a future that must be awaited.
    #[inline]
    pub fn is_async(self) -> bool {
        matches!(
            self,
            CallingConvention::Arity0Async | CallingConvention::Arity1Async
        )
    }
}

/// Resolves the calling convention for a listener named `listener`.
pub fn classify(
    listener: &str,
    signature: Signature,
    is_async: bool,
) -> Result<CallingConvention, ManagerError> {
    let arity = if signature.accepts(1) {
        1
    } else if signature.accepts(0) {
        0
    } else {
        return Err(ManagerError::InvalidListenerSignature {
            listener: listener.to_string(),
            signature,
        });
    };

    Ok(match (arity, is_async) {
        (0, false) => CallingConvention::Arity0Sync,
        (0, true) => CallingConvention::Arity0Async,
        (_, false) => CallingConvention::Arity1Sync,
        (_, true) => CallingConvention::Arity1Async,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_preferred_when_both_bind() {
        // one optional parameter binds with and without the payload
        let conv = classify("opt", Signature::positional(0, 1), false).unwrap();
        assert_eq!(conv, CallingConvention::Arity1Sync);

        let conv = classify("rest", Signature::variadic(0), true).unwrap();
        assert_eq!(conv, CallingConvention::Arity1Async);
    }

    #[test]
    fn test_nullary_and_unary() {
        assert_eq!(
            classify("zero", Signature::nullary(), true).unwrap(),
            CallingConvention::Arity0Async
        );
        assert_eq!(
            classify("one", Signature::unary(), false).unwrap(),
            CallingConvention::Arity1Sync
        );
    }

    #[test]
    fn test_opaque_defaults_to_one_argument() {
        let conv = classify("builtin", Signature::opaque(), false).unwrap();
        assert_eq!(conv.arity(), 1);
        assert!(!conv.is_async());
    }

    #[test]
    fn test_two_required_arguments_are_rejected() {
        let err = classify("pair", Signature::positional(2, 0), false).unwrap_err();
        match err {
            ManagerError::InvalidListenerSignature {
                listener,
                signature,
            } => {
                assert_eq!(listener, "pair");
                assert_eq!(signature, Signature::positional(2, 0));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(classify("pair_rest", Signature::variadic(2), true).is_err());
    }
}
