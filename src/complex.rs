use crate::{
  error::ComplexError,
  simplex::{nsubsimplicies, Simplex, Vertex},
  Dim,
};

use indexmap::IndexSet;
use tracing::warn;

/// A finite set of simplicies.
///
/// Iteration order is the order the simplicies were inserted in.
/// Complexes built through [`Complex::new`] are closed under taking faces,
/// so every simplex comes with all of its subsimplicies.
#[derive(Debug, Clone)]
pub struct Complex<V = usize> {
  simplicies: IndexSet<Simplex<V>>,
}

/// constructors
impl<V: Vertex> Complex<V> {
  /// Validates that no simplex is empty and that
  /// every facet of every simplex is part of the complex.
  ///
  /// Repeated simplicies are merged.
  pub fn new(simplicies: impl IntoIterator<Item = Simplex<V>>) -> Result<Self, ComplexError<V>> {
    let this = Self::new_unchecked(simplicies);
    if this.iter().any(|s| s.nvertices() == 0) {
      return Err(ComplexError::EmptySimplex);
    }
    this.check_closed()?;
    Ok(this)
  }

  /// No validation at all.
  ///
  /// The gradient field of a set of simplicies that is not closed under
  /// taking faces is not meaningful.
  pub fn new_unchecked(simplicies: impl IntoIterator<Item = Simplex<V>>) -> Self {
    let mut ngiven = 0;
    let simplicies: IndexSet<_> = simplicies.into_iter().inspect(|_| ngiven += 1).collect();
    let nrepeated = ngiven - simplicies.len();
    if nrepeated > 0 {
      warn!("merged {nrepeated} repeated simplicies");
    }
    Self { simplicies }
  }

  /// Builds a complex from raw vertex lists.
  /// Every list must name at least one vertex and no vertex twice.
  pub fn try_from_vertex_lists<I, S>(lists: I) -> Result<Self, ComplexError<V>>
  where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = V>,
  {
    let simplicies = lists
      .into_iter()
      .map(Simplex::try_new)
      .collect::<Result<Vec<_>, _>>()?;
    Self::new(simplicies)
  }

  /// The smallest complex containing all of `facets`.
  pub fn from_facets(
    facets: impl IntoIterator<Item = Simplex<V>>,
  ) -> Result<Self, ComplexError<V>> {
    let mut simplicies = IndexSet::new();
    for facet in facets {
      if facet.nvertices() == 0 {
        return Err(ComplexError::EmptySimplex);
      }
      for dim_sub in 0..=facet.dim() {
        simplicies.extend(facet.subsimps(dim_sub));
      }
    }
    Ok(Self { simplicies })
  }
}

impl Complex {
  /// The standard `dim`-simplex on the vertices `0..=dim` with all its faces.
  pub fn standard(dim: Dim) -> Self {
    let top = Simplex::new(0..=dim);
    let mut simplicies =
      IndexSet::with_capacity((0..=dim).map(|d| nsubsimplicies(dim, d)).sum());
    for dim_sub in 0..=dim {
      simplicies.extend(top.subsimps(dim_sub));
    }
    Self { simplicies }
  }
}

impl<V: Vertex> Complex<V> {
  pub fn len(&self) -> usize {
    self.simplicies.len()
  }
  pub fn is_empty(&self) -> bool {
    self.simplicies.is_empty()
  }
  pub fn contains(&self, simplex: &Simplex<V>) -> bool {
    self.simplicies.contains(simplex)
  }
  pub fn iter(&self) -> indexmap::set::Iter<'_, Simplex<V>> {
    self.simplicies.iter()
  }

  /// The maximal dimension of any simplex. `None` for the empty complex.
  pub fn dim(&self) -> Option<Dim> {
    self
      .iter()
      .map(|s| s.nvertices())
      .max()
      .and_then(|n| n.checked_sub(1))
  }

  /// All simplicies of dimension `dim`.
  pub fn skeleton(&self, dim: Dim) -> impl Iterator<Item = &Simplex<V>> {
    self.iter().filter(move |s| s.nvertices() == dim + 1)
  }

  /// Number of simplicies per dimension, indexed by dimension.
  pub fn nsimplicies_by_dim(&self) -> Vec<usize> {
    count_by_dim(self.iter())
  }

  pub fn euler_characteristic(&self) -> i64 {
    alternating_sum(&self.nsimplicies_by_dim())
  }

  /// All simplicies that have `simplex` as a facet.
  pub fn cofacets<'a>(&'a self, simplex: &'a Simplex<V>) -> impl Iterator<Item = &'a Simplex<V>> {
    self.iter().filter(move |c| simplex.is_facet_of(c))
  }

  /// All simplicies of maximal dimension.
  pub fn top_simplicies(&self) -> Vec<&Simplex<V>> {
    let Some(max) = self.iter().map(|s| s.nvertices()).max() else {
      return Vec::new();
    };
    self.iter().filter(|s| s.nvertices() == max).collect()
  }

  /// Checks that every facet of every simplex is part of the complex.
  pub fn check_closed(&self) -> Result<(), ComplexError<V>> {
    for simplex in self.iter() {
      if let Some(facet) = simplex.facets().into_iter().find(|f| !self.contains(f)) {
        return Err(ComplexError::NotClosed {
          simplex: simplex.clone(),
          facet,
        });
      }
    }
    Ok(())
  }
  pub fn is_closed(&self) -> bool {
    self.check_closed().is_ok()
  }

  pub(crate) fn remove(&mut self, simplex: &Simplex<V>) -> bool {
    self.simplicies.shift_remove(simplex)
  }
}

pub(crate) fn count_by_dim<'a, V: Vertex + 'a>(
  simplicies: impl Iterator<Item = &'a Simplex<V>>,
) -> Vec<usize> {
  let mut counts = Vec::new();
  for s in simplicies {
    let Some(dim) = s.nvertices().checked_sub(1) else {
      continue;
    };
    if counts.len() <= dim {
      counts.resize(dim + 1, 0);
    }
    counts[dim] += 1;
  }
  counts
}

pub(crate) fn alternating_sum(counts: &[usize]) -> i64 {
  counts
    .iter()
    .enumerate()
    .map(|(dim, &n)| if dim % 2 == 0 { n as i64 } else { -(n as i64) })
    .sum()
}

impl<V: Vertex> PartialEq for Complex<V> {
  fn eq(&self, other: &Self) -> bool {
    self.simplicies == other.simplicies
  }
}
impl<V: Vertex> Eq for Complex<V> {}

impl<V: Vertex> Default for Complex<V> {
  fn default() -> Self {
    Self {
      simplicies: IndexSet::new(),
    }
  }
}

impl<'a, V: Vertex> IntoIterator for &'a Complex<V> {
  type Item = &'a Simplex<V>;
  type IntoIter = indexmap::set::Iter<'a, Simplex<V>>;
  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}
