use crate::{error::ComplexError, Dim};

use itertools::Itertools as _;
use std::{fmt, hash::Hash};

/// Anything that can label the vertex of a simplex.
pub trait Vertex: Clone + Ord + Hash + fmt::Debug {}
impl<T: Clone + Ord + Hash + fmt::Debug> Vertex for T {}

/// A simplex as a set of vertices.
///
/// The vertices are kept in canonical (sorted) order without repetitions.
/// Allows for cheap comparison and hashing of vertex sets,
/// independent of the order the vertices were given in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Simplex<V = usize>(Vec<V>);

/// constructors
impl<V: Vertex> Simplex<V> {
  /// Set semantics: the vertices get sorted and repetitions are dropped.
  pub fn new(vertices: impl IntoIterator<Item = V>) -> Self {
    let mut vertices: Vec<V> = vertices.into_iter().collect();
    vertices.sort();
    vertices.dedup();
    Self(vertices)
  }

  /// Like [`Self::new`], but rejects repeated and missing vertices
  /// instead of silently fixing them up.
  pub fn try_new(vertices: impl IntoIterator<Item = V>) -> Result<Self, ComplexError<V>> {
    let mut vertices: Vec<V> = vertices.into_iter().collect();
    if vertices.is_empty() {
      return Err(ComplexError::EmptySimplex);
    }
    let given = vertices.clone();
    vertices.sort();
    if let Some((v, _)) = vertices.iter().tuple_windows().find(|(a, b)| a == b) {
      return Err(ComplexError::DuplicateVertex {
        vertices: given,
        vertex: v.clone(),
      });
    }
    Ok(Self(vertices))
  }

  pub fn new_unchecked(vertices: Vec<V>) -> Self {
    debug_assert!(vertices.iter().tuple_windows().all(|(a, b)| a < b));
    Self(vertices)
  }

  pub fn vertex(v: V) -> Self {
    Self(vec![v])
  }
  pub fn edge(a: V, b: V) -> Self {
    Self::new([a, b])
  }
}

impl<V: Vertex> Simplex<V> {
  pub fn nvertices(&self) -> usize {
    self.0.len()
  }

  /// # Panics
  /// The empty simplex has no dimension.
  pub fn dim(&self) -> Dim {
    self.nvertices() - 1
  }

  pub fn vertices(&self) -> &[V] {
    &self.0
  }
  pub fn into_vertices(self) -> Vec<V> {
    self.0
  }
  pub fn iter(&self) -> std::slice::Iter<'_, V> {
    self.0.iter()
  }

  pub fn contains_vertex(&self, v: &V) -> bool {
    self.0.binary_search(v).is_ok()
  }

  /// Subset relation on the vertex sets, by a single merge walk
  /// over both sorted vertex lists.
  pub fn is_subsimp_of(&self, other: &Self) -> bool {
    use std::cmp::Ordering as O;

    if self.nvertices() > other.nvertices() {
      return false;
    }

    let mut other = other.0.iter();
    'this: for v in &self.0 {
      for w in other.by_ref() {
        match v.cmp(w) {
          O::Equal => continue 'this,
          O::Greater => continue,
          O::Less => return false,
        }
      }
      return false;
    }
    true
  }

  /// `self` is a face of `other` of exactly one dimension lower.
  pub fn is_facet_of(&self, other: &Self) -> bool {
    other.nvertices() == self.nvertices() + 1 && self.is_subsimp_of(other)
  }
  pub fn is_cofacet_of(&self, other: &Self) -> bool {
    other.is_facet_of(self)
  }

  /// Generates all `dim`-subsimplicies of `self` in lexicographic order.
  pub fn subsimps(&self, dim: Dim) -> impl Iterator<Item = Self> + '_ {
    self
      .0
      .iter()
      .cloned()
      .combinations(dim + 1)
      .map(Self::new_unchecked)
  }

  /// All subsimplicies of one dimension lower. Empty for a vertex.
  pub fn facets(&self) -> Vec<Self> {
    match self.nvertices() {
      0 | 1 => Vec::new(),
      n => self.subsimps(n - 2).collect(),
    }
  }
}

/// Containment check: every vertex of `a` is also a vertex of `b`.
///
/// No restriction on the relative sizes of `a` and `b`.
pub fn contained<V: Vertex>(a: &Simplex<V>, b: &Simplex<V>) -> bool {
  a.is_subsimp_of(b)
}

/// Number of `dim_sub`-faces of a `dim`-simplex.
pub fn nsubsimplicies(dim: Dim, dim_sub: Dim) -> usize {
  num_integer::binomial(dim + 1, dim_sub + 1)
}

impl<V: Vertex> FromIterator<V> for Simplex<V> {
  fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
    Self::new(iter)
  }
}
impl<V: Vertex> From<Vec<V>> for Simplex<V> {
  fn from(value: Vec<V>) -> Self {
    Self::new(value)
  }
}
impl<V: Vertex, const N: usize> From<[V; N]> for Simplex<V> {
  fn from(value: [V; N]) -> Self {
    Self::new(value)
  }
}

impl<'a, V> IntoIterator for &'a Simplex<V> {
  type Item = &'a V;
  type IntoIter = std::slice::Iter<'a, V>;
  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}

impl<V: Vertex> fmt::Display for Simplex<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{{{}}}", self.0.iter().map(|v| format!("{v:?}")).join(","))
  }
}
