//! Discrete gradient vector fields by greedy collapse.
//!
//! Free face/cofacet pairs are collapsed as long as there are any.
//! When the collapse gets stuck, a simplex of maximal dimension is declared
//! critical and removed, which leaves a complex again.

use crate::{
  complex::{alternating_sum, count_by_dim, Complex},
  error::{ComplexError, FieldError},
  simplex::{Simplex, Vertex},
};

use indexmap::{IndexMap, IndexSet};
use rand::{rngs::StdRng, seq::IndexedRandom, Rng, SeedableRng};
use tracing::{debug, trace};

/// Free-face finder.
///
/// Returns the first simplex (in iteration order) that is a facet of
/// exactly one other simplex, together with that cofacet.
/// `None` if the complex has no free face.
pub fn free_face<V: Vertex>(complex: &Complex<V>) -> Option<(&Simplex<V>, &Simplex<V>)> {
  complex.iter().find_map(|face| {
    let mut cofacets = complex.cofacets(face);
    match (cofacets.next(), cofacets.next()) {
      (Some(coface), None) => Some((face, coface)),
      _ => None,
    }
  })
}

/// Top-simplex selector.
///
/// Chooses uniformly at random among the simplicies of maximal dimension.
pub fn top_simplex<'a, V: Vertex, R: Rng + ?Sized>(
  complex: &'a Complex<V>,
  rng: &mut R,
) -> Result<&'a Simplex<V>, ComplexError<V>> {
  complex
    .top_simplicies()
    .choose(rng)
    .copied()
    .ok_or(ComplexError::EmptyComplex)
}

/// One transition of the collapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<V = usize> {
  /// A free face got paired with its unique cofacet.
  Pair { face: Simplex<V>, coface: Simplex<V> },
  /// No free face was left, so a top simplex became critical.
  Critical(Simplex<V>),
}

/// The greedy collapse of a complex as a sequence of [`Step`]s.
///
/// Owns the working set of not yet removed simplicies.
/// Every step removes one or two simplicies, so the iterator
/// yields at most as many steps as the complex has simplicies.
pub struct Collapse<'r, V, R: ?Sized> {
  working: Complex<V>,
  rng: &'r mut R,
}

impl<'r, V: Vertex, R: Rng + ?Sized> Collapse<'r, V, R> {
  pub fn new(complex: Complex<V>, rng: &'r mut R) -> Self {
    Self {
      working: complex,
      rng,
    }
  }

  /// The simplicies not yet removed.
  pub fn remaining(&self) -> &Complex<V> {
    &self.working
  }

  fn next_step(&mut self) -> Option<Step<V>> {
    if let Some((face, coface)) = free_face(&self.working) {
      return Some(Step::Pair {
        face: face.clone(),
        coface: coface.clone(),
      });
    }
    // only fails on the empty working set, which ends the collapse
    let simplex = top_simplex(&self.working, self.rng).ok()?;
    Some(Step::Critical(simplex.clone()))
  }
}

impl<V: Vertex, R: Rng + ?Sized> Iterator for Collapse<'_, V, R> {
  type Item = Step<V>;

  fn next(&mut self) -> Option<Self::Item> {
    let step = self.next_step()?;
    match &step {
      Step::Pair { face, coface } => {
        trace!("pair {face} -> {coface}");
        self.working.remove(face);
        self.working.remove(coface);
      }
      Step::Critical(simplex) => {
        trace!("critical {simplex}");
        self.working.remove(simplex);
      }
    }
    Some(step)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let n = self.working.len();
    (n.div_ceil(2), Some(n))
  }
}

/// Gradient field generator.
///
/// Collapses a copy of `complex`, drawing the top simplex choices from `rng`.
pub fn generate_field<V: Vertex, R: Rng + ?Sized>(
  complex: &Complex<V>,
  rng: &mut R,
) -> GradientField<V> {
  debug!("generating gradient field on {} simplicies", complex.len());
  let field: GradientField<V> = Collapse::new(complex.clone(), rng).collect();
  debug!(
    "gradient field with {} pairs and {} critical simplicies",
    field.npairs(),
    field.ncritical()
  );
  field
}

/// Reproducible [`generate_field`].
pub fn generate_field_seeded<V: Vertex>(complex: &Complex<V>, seed: u64) -> GradientField<V> {
  let mut rng = StdRng::seed_from_u64(seed);
  generate_field(complex, &mut rng)
}

/// A discrete gradient vector field.
///
/// Pairs each free face with the cofacet it was collapsed into,
/// and lists the critical simplicies in the order they were found.
#[derive(Debug, Clone)]
pub struct GradientField<V = usize> {
  pairs: IndexMap<Simplex<V>, Simplex<V>>,
  heads: IndexMap<Simplex<V>, Simplex<V>>,
  critical: IndexSet<Simplex<V>>,
  /// First simplex that was recorded again in the same role.
  repeated: Option<Simplex<V>>,
}

impl<V: Vertex> GradientField<V> {
  fn push(&mut self, step: Step<V>) {
    match step {
      Step::Pair { face, coface } => {
        if self.heads.insert(coface.clone(), face.clone()).is_some() {
          self.mark_repeated(&coface);
        }
        if self.pairs.insert(face.clone(), coface).is_some() {
          self.mark_repeated(&face);
        }
      }
      Step::Critical(simplex) => {
        if !self.critical.insert(simplex.clone()) {
          self.mark_repeated(&simplex);
        }
      }
    }
  }

  fn mark_repeated(&mut self, simplex: &Simplex<V>) {
    self.repeated.get_or_insert_with(|| simplex.clone());
  }

  /// Free face to cofacet, in collapse order.
  pub fn pairs(&self) -> &IndexMap<Simplex<V>, Simplex<V>> {
    &self.pairs
  }
  /// Critical simplicies, in the order they were found.
  pub fn critical(&self) -> &IndexSet<Simplex<V>> {
    &self.critical
  }
  pub fn into_parts(self) -> (IndexMap<Simplex<V>, Simplex<V>>, Vec<Simplex<V>>) {
    (self.pairs, self.critical.into_iter().collect())
  }

  pub fn npairs(&self) -> usize {
    self.pairs.len()
  }
  pub fn ncritical(&self) -> usize {
    self.critical.len()
  }
  /// Number of simplicies the field covers.
  pub fn nsimplicies(&self) -> usize {
    2 * self.npairs() + self.ncritical()
  }

  pub fn is_critical(&self, simplex: &Simplex<V>) -> bool {
    self.critical.contains(simplex)
  }
  /// Whether `simplex` is the lower half of a pair.
  pub fn is_face_paired(&self, simplex: &Simplex<V>) -> bool {
    self.pairs.contains_key(simplex)
  }
  /// The simplex `simplex` is paired with, in either direction.
  pub fn partner(&self, simplex: &Simplex<V>) -> Option<&Simplex<V>> {
    self
      .pairs
      .get(simplex)
      .or_else(|| self.heads.get(simplex))
  }

  /// Number of critical simplicies per dimension.
  pub fn morse_numbers(&self) -> Vec<usize> {
    count_by_dim(self.critical.iter())
  }
  pub fn euler_characteristic(&self) -> i64 {
    alternating_sum(&self.morse_numbers())
  }

  /// Checks that the field partitions `complex` into facet/cofacet pairs
  /// and critical simplicies.
  pub fn check(&self, complex: &Complex<V>) -> Result<(), FieldError<V>> {
    if let Some(simplex) = &self.repeated {
      return Err(FieldError::Repeated {
        simplex: simplex.clone(),
      });
    }

    let mut seen = IndexSet::with_capacity(self.nsimplicies());
    let recorded = self
      .pairs
      .iter()
      .flat_map(|(face, coface)| [face, coface])
      .chain(self.critical.iter());
    for simplex in recorded {
      if !complex.contains(simplex) {
        return Err(FieldError::Foreign {
          simplex: simplex.clone(),
        });
      }
      if !seen.insert(simplex) {
        return Err(FieldError::Repeated {
          simplex: simplex.clone(),
        });
      }
    }

    if let Some((face, coface)) = self.pairs.iter().find(|(f, c)| !f.is_facet_of(c)) {
      return Err(FieldError::NotCofacet {
        face: face.clone(),
        coface: coface.clone(),
      });
    }

    if let Some(simplex) = complex.iter().find(|s| !seen.contains(s)) {
      return Err(FieldError::Unaccounted {
        simplex: simplex.clone(),
      });
    }
    Ok(())
  }

  /// Whether the field has no closed V-path.
  ///
  /// A V-path alternates between a paired face `a`, its cofacet `V(a)`
  /// and another facet of `V(a)` that is itself a paired face.
  /// Only these are gradient fields of a discrete Morse function.
  pub fn is_acyclic(&self, complex: &Complex<V>) -> bool {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
      Unvisited,
      Active,
      Done,
    }

    let faces: Vec<&Simplex<V>> = self.pairs.keys().collect();
    let mut marks = vec![Mark::Unvisited; faces.len()];

    // successors of the face at `i` along V-paths
    let next = |i: usize| -> Vec<usize> {
      let (face, coface) = (faces[i], &self.pairs[i]);
      coface
        .facets()
        .into_iter()
        .filter(|f| f != face && complex.contains(f))
        .filter_map(|f| self.pairs.get_index_of(&f))
        .collect()
    };

    for root in 0..faces.len() {
      if marks[root] != Mark::Unvisited {
        continue;
      }
      marks[root] = Mark::Active;
      let mut stack = vec![(root, next(root))];
      while let Some((node, succs)) = stack.last_mut() {
        let node = *node;
        match succs.pop() {
          Some(succ) => match marks[succ] {
            Mark::Active => return false,
            Mark::Done => {}
            Mark::Unvisited => {
              marks[succ] = Mark::Active;
              stack.push((succ, next(succ)));
            }
          },
          None => {
            marks[node] = Mark::Done;
            stack.pop();
          }
        }
      }
    }
    true
  }
}

impl<V: Vertex> Default for GradientField<V> {
  fn default() -> Self {
    Self {
      pairs: IndexMap::new(),
      heads: IndexMap::new(),
      critical: IndexSet::new(),
      repeated: None,
    }
  }
}

impl<V: Vertex> FromIterator<Step<V>> for GradientField<V> {
  fn from_iter<I: IntoIterator<Item = Step<V>>>(iter: I) -> Self {
    let mut field = Self::default();
    for step in iter {
      field.push(step);
    }
    field
  }
}

#[cfg(test)]
mod test {
  use super::{free_face, generate_field_seeded, top_simplex, Collapse, GradientField, Step};
  use crate::{
    complex::Complex,
    error::{ComplexError, FieldError},
    simplex::Simplex,
  };

  use rand::{rngs::StdRng, SeedableRng};

  #[test]
  fn free_face_of_edge() {
    let complex = Complex::standard(1);
    let (face, coface) = free_face(&complex).unwrap();
    assert_eq!(face, &Simplex::vertex(0));
    assert_eq!(coface, &Simplex::edge(0, 1));
  }

  #[test]
  fn no_free_face() {
    let hollow = Complex::from_facets([
      Simplex::edge(0, 1),
      Simplex::edge(1, 2),
      Simplex::edge(0, 2),
    ])
    .unwrap();
    assert_eq!(free_face(&hollow), None);
    assert_eq!(free_face(&Complex::new([Simplex::vertex(0)]).unwrap()), None);
    assert_eq!(free_face(&Complex::<usize>::default()), None);
  }

  #[test]
  fn free_face_needs_unique_cofacet() {
    // the vertex 1 has two cofacets, the vertices 0 and 2 one each
    let path = Complex::from_facets([Simplex::edge(1, 0), Simplex::edge(1, 2)]).unwrap();
    let (face, _) = free_face(&path).unwrap();
    assert_ne!(face, &Simplex::vertex(1));
  }

  #[test]
  fn top_simplex_of_empty() {
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(
      top_simplex(&Complex::<usize>::default(), &mut rng),
      Err(ComplexError::EmptyComplex)
    );
  }

  #[test]
  fn top_simplex_is_maximal() {
    let complex = Complex::from_facets([Simplex::from([0, 1, 2]), Simplex::edge(2, 3)]).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
      assert_eq!(
        top_simplex(&complex, &mut rng),
        Ok(&Simplex::from([0, 1, 2]))
      );
    }
  }

  #[test]
  fn collapse_steps() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut collapse = Collapse::new(Complex::standard(1), &mut rng);
    assert_eq!(collapse.remaining().len(), 3);
    let first = collapse.next();
    assert_eq!(
      collapse.remaining(),
      &Complex::new([Simplex::vertex(1)]).unwrap()
    );
    let steps: Vec<_> = first.into_iter().chain(collapse).collect();
    assert_eq!(
      steps,
      vec![
        Step::Pair {
          face: Simplex::vertex(0),
          coface: Simplex::edge(0, 1),
        },
        Step::Critical(Simplex::vertex(1)),
      ]
    );
  }

  #[test]
  fn partner_lookup() {
    let field = generate_field_seeded(&Complex::standard(1), 3);
    let v0 = Simplex::vertex(0);
    let e = Simplex::edge(0, 1);
    assert_eq!(field.partner(&v0), Some(&e));
    assert_eq!(field.partner(&e), Some(&v0));
    assert!(field.is_face_paired(&v0));
    assert!(!field.is_face_paired(&e));
    assert!(field.is_critical(&Simplex::vertex(1)));
    assert_eq!(field.partner(&Simplex::vertex(1)), None);

    let (pairs, critical) = field.into_parts();
    assert_eq!(pairs.get(&v0), Some(&e));
    assert_eq!(critical, vec![Simplex::vertex(1)]);
  }

  #[test]
  fn check_violations() {
    let complex = Complex::standard(1);
    let pair = |face, coface| Step::Pair { face, coface };

    let unaccounted: GradientField = [pair(Simplex::vertex(0), Simplex::edge(0, 1))]
      .into_iter()
      .collect();
    assert_eq!(
      unaccounted.check(&complex),
      Err(FieldError::Unaccounted {
        simplex: Simplex::vertex(1)
      })
    );

    let foreign: GradientField = [Step::Critical(Simplex::vertex(5))].into_iter().collect();
    assert_eq!(
      foreign.check(&complex),
      Err(FieldError::Foreign {
        simplex: Simplex::vertex(5)
      })
    );

    let repeated: GradientField = [
      pair(Simplex::vertex(0), Simplex::edge(0, 1)),
      Step::Critical(Simplex::vertex(0)),
    ]
    .into_iter()
    .collect();
    assert_eq!(
      repeated.check(&complex),
      Err(FieldError::Repeated {
        simplex: Simplex::vertex(0)
      })
    );

    // a face paired twice keeps only the later pair in the map
    let twice_face: GradientField = [
      pair(Simplex::vertex(0), Simplex::edge(0, 1)),
      pair(Simplex::vertex(0), Simplex::edge(0, 2)),
      Step::Critical(Simplex::edge(0, 1)),
      pair(Simplex::vertex(1), Simplex::edge(1, 2)),
      Step::Critical(Simplex::vertex(2)),
      Step::Critical(Simplex::from([0, 1, 2])),
    ]
    .into_iter()
    .collect();
    assert_eq!(twice_face.npairs(), 2);
    assert_eq!(
      twice_face.check(&Complex::standard(2)),
      Err(FieldError::Repeated {
        simplex: Simplex::vertex(0)
      })
    );

    let twice_coface: GradientField = [
      pair(Simplex::vertex(0), Simplex::edge(0, 1)),
      pair(Simplex::vertex(1), Simplex::edge(0, 1)),
    ]
    .into_iter()
    .collect();
    assert_eq!(
      twice_coface.check(&complex),
      Err(FieldError::Repeated {
        simplex: Simplex::edge(0, 1)
      })
    );

    let twice_critical: GradientField = [
      Step::Critical(Simplex::edge(0, 1)),
      Step::Critical(Simplex::vertex(0)),
      Step::Critical(Simplex::vertex(1)),
      Step::Critical(Simplex::vertex(0)),
    ]
    .into_iter()
    .collect();
    assert_eq!(twice_critical.ncritical(), 3);
    assert_eq!(
      twice_critical.check(&complex),
      Err(FieldError::Repeated {
        simplex: Simplex::vertex(0)
      })
    );

    let skewed: GradientField = [
      pair(Simplex::vertex(0), Simplex::vertex(1)),
      Step::Critical(Simplex::edge(0, 1)),
    ]
    .into_iter()
    .collect();
    assert_eq!(
      skewed.check(&complex),
      Err(FieldError::NotCofacet {
        face: Simplex::vertex(0),
        coface: Simplex::vertex(1),
      })
    );
  }

  #[test]
  fn acyclicity() {
    let complex = Complex::standard(2);
    let field = generate_field_seeded(&complex, 0);
    assert!(field.is_acyclic(&complex));

    // a closed V-path around the hollow triangle
    let hollow = Complex::from_facets([
      Simplex::edge(0, 1),
      Simplex::edge(1, 2),
      Simplex::edge(0, 2),
    ])
    .unwrap();
    let cyclic: GradientField = [
      Step::Pair {
        face: Simplex::vertex(0),
        coface: Simplex::edge(0, 1),
      },
      Step::Pair {
        face: Simplex::vertex(1),
        coface: Simplex::edge(1, 2),
      },
      Step::Pair {
        face: Simplex::vertex(2),
        coface: Simplex::edge(0, 2),
      },
    ]
    .into_iter()
    .collect();
    assert!(cyclic.check(&hollow).is_ok());
    assert!(!cyclic.is_acyclic(&hollow));
  }
}
