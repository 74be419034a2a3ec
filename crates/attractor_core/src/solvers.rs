use crate::traits::{lit, DynamicalSystem, Scalar, Steppable};

/// Forward Euler solver.
///
/// x_{n+1} = x_n + dt * f(x_n)
///
/// First order, fixed step. The trail engine only ever needs one evaluation
/// per particle per frame, so this is the only solver it carries.
pub struct ExplicitEuler<T: Scalar> {
    k: Vec<T>,
}

impl<T: Scalar> ExplicitEuler<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            k: vec![lit(0.0); dim],
        }
    }

    pub fn dimension(&self) -> usize {
        self.k.len()
    }
}

impl<T: Scalar> Steppable<T> for ExplicitEuler<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        // k = f(t, y)
        system.apply(*t, state, &mut self.k);

        for (value, slope) in state.iter_mut().zip(&self.k) {
            *value = *value + dt * *slope;
        }

        *t = *t + dt;
    }
}
