//! Error conversion glue between layers.
//!
//! The domain layer must not depend on form error types, so the conversion
//! from [`TypeConstraintError`] lives here.

use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;

impl From<TypeConstraintError> for FormError {
    fn from(val: TypeConstraintError) -> Self {
        FormError::Constraint(val.to_string())
    }
}
