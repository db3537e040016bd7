use crate::simplex::Simplex;

/// Error in constructing or querying a [`Complex`](crate::complex::Complex).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ComplexError<V = usize> {
  /// A top simplex was requested from a complex without simplicies.
  #[error("complex contains no simplicies")]
  EmptyComplex,
  /// A simplex was given without any vertices.
  #[error("simplex has no vertices")]
  EmptySimplex,
  /// A vertex occurs more than once in the vertex list of a simplex.
  #[error("vertex {vertex:?} occurs more than once in {vertices:?}")]
  DuplicateVertex { vertices: Vec<V>, vertex: V },
  /// The simplex set is not closed under taking facets.
  #[error("facet {facet} of {simplex} is missing from the complex")]
  NotClosed { simplex: Simplex<V>, facet: Simplex<V> },
}

/// Violation of the gradient field properties, found by
/// [`GradientField::check`](crate::gradient::GradientField::check).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError<V = usize> {
  /// A simplex of the complex is neither paired nor critical.
  #[error("simplex {simplex} is neither paired nor critical")]
  Unaccounted { simplex: Simplex<V> },
  /// The field mentions a simplex that is not part of the complex.
  #[error("simplex {simplex} is not part of the complex")]
  Foreign { simplex: Simplex<V> },
  /// A simplex is recorded more than once.
  #[error("simplex {simplex} is recorded more than once")]
  Repeated { simplex: Simplex<V> },
  /// A pair whose second simplex is not a cofacet of the first.
  #[error("{coface} is not a cofacet of {face}")]
  NotCofacet { face: Simplex<V>, coface: Simplex<V> },
}
