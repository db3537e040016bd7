pub mod complex;
pub mod error;
pub mod gradient;
pub mod simplex;

pub use complex::Complex;
pub use error::{ComplexError, FieldError};
pub use gradient::{generate_field, generate_field_seeded, GradientField};
pub use simplex::{contained, Simplex};

pub type Dim = usize;
