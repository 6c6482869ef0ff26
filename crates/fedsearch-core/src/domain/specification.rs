//! Specification pattern for composable business rules
//!
//! A specification is a predicate object. Rule sets are kept as lists of
//! boxed specifications so callers can add rules without touching the
//! evaluator.

/// Core specification trait for business rules
pub trait Specification<T>: Send + Sync {
    /// Check if the entity satisfies this specification
    fn is_satisfied_by(&self, entity: &T) -> bool;

    /// Short rule name used in logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A list of specifications evaluated with OR semantics
pub struct AnySpecification<T> {
    specs: Vec<Box<dyn Specification<T>>>,
}

impl<T> AnySpecification<T> {
    pub fn new() -> Self {
        Self { specs: Vec::new() }
    }

    /// Add a rule to the set
    pub fn with(mut self, spec: impl Specification<T> + 'static) -> Self {
        self.specs.push(Box::new(spec));
        self
    }

    /// First rule satisfied by the entity, if any
    pub fn first_match(&self, entity: &T) -> Option<&dyn Specification<T>> {
        self.specs
            .iter()
            .map(|spec| spec.as_ref())
            .find(|spec| spec.is_satisfied_by(entity))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl<T> Default for AnySpecification<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Specification<T> for AnySpecification<T> {
    fn is_satisfied_by(&self, entity: &T) -> bool {
        self.first_match(entity).is_some()
    }

    fn name(&self) -> &'static str {
        "any"
    }
}
