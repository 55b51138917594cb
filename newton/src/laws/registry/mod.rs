use crate::core::math::ad::{self, Dual};
use crate::core::state::ObjectState;
use glam::DVec3;

/// A Physical Law acting on a single object.
///
/// Conservative contributions are expressed through their **Potential Energy**
/// $V(q)$; the registry derives the force $F = -\nabla V(q)$ with forward-mode
/// Automatic Differentiation, so the potential used for energy bookkeeping and
/// the force used for stepping can never disagree.
///
/// Non-conservative contributions (damping, friction, magnetic force) have no
/// potential and are returned directly from [`Law::force`].
pub trait Law {
    fn name(&self) -> &str;

    /// Potential energy of `body` when placed at the dual coordinates `q`.
    fn potential(&self, _q: &[Dual; 3], _body: &ObjectState) -> Dual {
        Dual::constant(0.0)
    }

    /// Force not derivable from a potential.
    fn force(&self, _body: &ObjectState) -> DVec3 {
        DVec3::ZERO
    }

    fn is_conservative(&self) -> bool {
        true
    }
}

/// A registry that aggregates multiple laws.
/// $V_{total} = \sum V_i$, $F_{total} = -\nabla V_{total} + \sum F_i$
#[derive(Default)]
pub struct LawRegistry {
    laws: Vec<Box<dyn Law>>,
}

impl std::fmt::Debug for LawRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl LawRegistry {
    pub fn new() -> Self {
        Self { laws: Vec::new() }
    }

    pub fn add(&mut self, law: impl Law + 'static) {
        self.laws.push(Box::new(law));
    }

    pub fn with(mut self, law: impl Law + 'static) -> Self {
        self.add(law);
        self
    }

    pub fn len(&self) -> usize {
        self.laws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laws.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.laws.iter().map(|l| l.name()).collect()
    }

    /// Whether every registered law conserves mechanical energy.
    pub fn is_conservative(&self) -> bool {
        self.laws.iter().all(|l| l.is_conservative())
    }

    pub fn potential(&self, q: &[Dual; 3], body: &ObjectState) -> Dual {
        let mut total = Dual::new(0.0, 0.0);
        for law in &self.laws {
            total = total + law.potential(q, body);
        }
        total
    }

    /// Potential energy of `body` at its current position.
    pub fn potential_energy(&self, body: &ObjectState) -> f64 {
        self.potential(&ad::lift(body.position), body).val
    }

    /// Total force on `body`: potential gradient plus explicit forces.
    pub fn force(&self, body: &ObjectState) -> DVec3 {
        let grad = ad::gradient(body.position, |q| self.potential(q, body));
        let explicit: DVec3 = self.laws.iter().map(|l| l.force(body)).sum();
        explicit - grad
    }

    pub fn acceleration(&self, body: &ObjectState) -> DVec3 {
        if body.mass > 0.0 {
            self.force(body) / body.mass
        } else {
            DVec3::ZERO
        }
    }
}
