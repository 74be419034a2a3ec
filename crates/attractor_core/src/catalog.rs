//! The fixed set of strange attractors the engine can integrate.
//!
//! Each catalog entry pairs a vector field with its default parameters,
//! slider ranges, integration step, display scale and a suggested camera
//! position. The numbers are defining data: changing them changes the
//! picture.

use crate::error::{EngineError, Result};
use crate::solvers::ExplicitEuler;
use crate::traits::{lit, DynamicalSystem, Scalar, Steppable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attractor {
    Lorenz,
    Thomas,
    Dadras,
    Rossler,
    Aizawa,
    Chen,
    Halvorsen,
    Sprott,
}

impl Attractor {
    /// Declaration order; `list()` yields identifiers in this order.
    pub const ALL: [Attractor; 8] = [
        Attractor::Lorenz,
        Attractor::Thomas,
        Attractor::Dadras,
        Attractor::Rossler,
        Attractor::Aizawa,
        Attractor::Chen,
        Attractor::Halvorsen,
        Attractor::Sprott,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Attractor::Lorenz => "lorenz",
            Attractor::Thomas => "thomas",
            Attractor::Dadras => "dadras",
            Attractor::Rossler => "rossler",
            Attractor::Aizawa => "aizawa",
            Attractor::Chen => "chen",
            Attractor::Halvorsen => "halvorsen",
            Attractor::Sprott => "sprott",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_id(id: &str) -> Result<Self> {
        Attractor::ALL
            .into_iter()
            .find(|attractor| attractor.id() == id)
            .ok_or_else(|| EngineError::UnknownField(id.to_string()))
    }

    pub fn default_params(self) -> FieldParams {
        match self {
            Attractor::Lorenz => FieldParams::Lorenz {
                sigma: 10.0,
                rho: 28.0,
                beta: 8.0 / 3.0,
            },
            Attractor::Thomas => FieldParams::Thomas { b: 0.208186 },
            Attractor::Dadras => FieldParams::Dadras {
                a: 3.0,
                b: 2.7,
                c: 1.7,
                d: 2.0,
                e: 9.0,
            },
            Attractor::Rossler => FieldParams::Rossler {
                a: 0.2,
                b: 0.2,
                c: 5.7,
            },
            Attractor::Aizawa => FieldParams::Aizawa {
                a: 0.95,
                b: 0.7,
                c: 0.6,
                d: 3.5,
                e: 0.25,
                f: 0.1,
            },
            Attractor::Chen => FieldParams::Chen {
                a: 40.0,
                b: 3.0,
                c: 28.0,
            },
            Attractor::Halvorsen => FieldParams::Halvorsen { a: 1.89 },
            Attractor::Sprott => FieldParams::Sprott { a: 2.07, b: 1.79 },
        }
    }

    pub fn time_step(self) -> f64 {
        match self {
            Attractor::Lorenz => 0.005,
            Attractor::Thomas => 0.04,
            Attractor::Dadras => 0.004,
            Attractor::Rossler => 0.01,
            Attractor::Aizawa => 0.005,
            Attractor::Chen => 0.002,
            Attractor::Halvorsen => 0.005,
            Attractor::Sprott => 0.02,
        }
    }

    pub fn display_scale(self) -> f64 {
        match self {
            Attractor::Lorenz => 1.5,
            Attractor::Thomas => 8.0,
            Attractor::Dadras => 2.0,
            Attractor::Rossler => 2.5,
            Attractor::Aizawa => 10.0,
            Attractor::Chen => 1.2,
            Attractor::Halvorsen => 4.0,
            Attractor::Sprott => 5.0,
        }
    }

    pub fn camera(self) -> [f64; 3] {
        match self {
            Attractor::Lorenz => [0.0, -90.0, 40.0],
            Attractor::Thomas => [60.0, 60.0, 60.0],
            Attractor::Dadras => [0.0, -60.0, 30.0],
            Attractor::Rossler => [0.0, -70.0, 40.0],
            Attractor::Aizawa => [0.0, -40.0, 20.0],
            Attractor::Chen => [0.0, -80.0, 40.0],
            Attractor::Halvorsen => [60.0, 60.0, 60.0],
            Attractor::Sprott => [30.0, -30.0, 20.0],
        }
    }

    pub fn ranges(self) -> &'static [ParamRange] {
        match self {
            Attractor::Lorenz => &LORENZ_RANGES,
            Attractor::Thomas => &THOMAS_RANGES,
            Attractor::Dadras => &DADRAS_RANGES,
            Attractor::Rossler => &ROSSLER_RANGES,
            Attractor::Aizawa => &AIZAWA_RANGES,
            Attractor::Chen => &CHEN_RANGES,
            Attractor::Halvorsen => &HALVORSEN_RANGES,
            Attractor::Sprott => &SPROTT_RANGES,
        }
    }

    pub fn descriptor(self) -> FieldDescriptor {
        FieldDescriptor {
            id: self.id(),
            params: self.default_params(),
            ranges: self.ranges(),
            time_step: self.time_step(),
            display_scale: self.display_scale(),
            camera: self.camera(),
        }
    }
}

impl fmt::Display for Attractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Attractor {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Attractor::from_id(s)
    }
}

/// Slider bounds for one parameter. Advisory: the engine never clamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamRange {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

const fn range(name: &'static str, min: f64, max: f64, step: f64) -> ParamRange {
    ParamRange {
        name,
        min,
        max,
        step,
    }
}

const LORENZ_RANGES: [ParamRange; 3] = [
    range("sigma", 0.0, 50.0, 0.1),
    range("rho", 0.0, 100.0, 0.1),
    range("beta", 0.0, 10.0, 0.01),
];
const THOMAS_RANGES: [ParamRange; 1] = [range("b", 0.0, 1.0, 0.001)];
const DADRAS_RANGES: [ParamRange; 5] = [
    range("a", 0.0, 10.0, 0.1),
    range("b", 0.0, 10.0, 0.1),
    range("c", 0.0, 10.0, 0.1),
    range("d", 0.0, 10.0, 0.1),
    range("e", 0.0, 20.0, 0.1),
];
const ROSSLER_RANGES: [ParamRange; 3] = [
    range("a", 0.0, 1.0, 0.01),
    range("b", 0.0, 2.0, 0.01),
    range("c", 0.0, 20.0, 0.1),
];
const AIZAWA_RANGES: [ParamRange; 6] = [
    range("a", 0.0, 2.0, 0.01),
    range("b", 0.0, 2.0, 0.01),
    range("c", 0.0, 2.0, 0.01),
    range("d", 0.0, 10.0, 0.1),
    range("e", 0.0, 1.0, 0.01),
    range("f", 0.0, 1.0, 0.01),
];
const CHEN_RANGES: [ParamRange; 3] = [
    range("a", 0.0, 60.0, 0.1),
    range("b", 0.0, 10.0, 0.1),
    range("c", 0.0, 50.0, 0.1),
];
const HALVORSEN_RANGES: [ParamRange; 1] = [range("a", 0.0, 5.0, 0.01)];
const SPROTT_RANGES: [ParamRange; 2] = [range("a", 0.0, 5.0, 0.01), range("b", 0.0, 5.0, 0.01)];

/// Parameter record for one field. Each variant names exactly the knobs its
/// equations read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum FieldParams {
    Lorenz { sigma: f64, rho: f64, beta: f64 },
    Thomas { b: f64 },
    Dadras { a: f64, b: f64, c: f64, d: f64, e: f64 },
    Rossler { a: f64, b: f64, c: f64 },
    Aizawa { a: f64, b: f64, c: f64, d: f64, e: f64, f: f64 },
    Chen { a: f64, b: f64, c: f64 },
    Halvorsen { a: f64 },
    Sprott { a: f64, b: f64 },
}

impl FieldParams {
    pub fn attractor(&self) -> Attractor {
        match self {
            FieldParams::Lorenz { .. } => Attractor::Lorenz,
            FieldParams::Thomas { .. } => Attractor::Thomas,
            FieldParams::Dadras { .. } => Attractor::Dadras,
            FieldParams::Rossler { .. } => Attractor::Rossler,
            FieldParams::Aizawa { .. } => Attractor::Aizawa,
            FieldParams::Chen { .. } => Attractor::Chen,
            FieldParams::Halvorsen { .. } => Attractor::Halvorsen,
            FieldParams::Sprott { .. } => Attractor::Sprott,
        }
    }

    fn slots_mut(&mut self) -> Vec<(&'static str, &mut f64)> {
        match self {
            FieldParams::Lorenz { sigma, rho, beta } => {
                vec![("sigma", sigma), ("rho", rho), ("beta", beta)]
            }
            FieldParams::Thomas { b } => vec![("b", b)],
            FieldParams::Dadras { a, b, c, d, e } => {
                vec![("a", a), ("b", b), ("c", c), ("d", d), ("e", e)]
            }
            FieldParams::Rossler { a, b, c } | FieldParams::Chen { a, b, c } => {
                vec![("a", a), ("b", b), ("c", c)]
            }
            FieldParams::Aizawa { a, b, c, d, e, f } => {
                vec![("a", a), ("b", b), ("c", c), ("d", d), ("e", e), ("f", f)]
            }
            FieldParams::Halvorsen { a } => vec![("a", a)],
            FieldParams::Sprott { a, b } => vec![("a", a), ("b", b)],
        }
    }

    /// Name/value pairs in declaration order.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        let mut copy = *self;
        let entries = copy
            .slots_mut()
            .into_iter()
            .map(|(name, value)| (name, *value))
            .collect();
        entries
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries()
            .into_iter()
            .find(|(slot, _)| *slot == name)
            .map(|(_, value)| value)
    }

    /// Sets one named knob. Values are not checked against the slider ranges.
    pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        let field = self.attractor().id();
        let slot = self
            .slots_mut()
            .into_iter()
            .find(|(slot, _)| *slot == name)
            .map(|(_, slot)| slot)
            .ok_or_else(|| EngineError::UnknownParameter {
                field,
                name: name.to_string(),
            })?;
        *slot = value;
        Ok(())
    }

    /// One explicit Euler step: state + dt * f(state).
    ///
    /// Pure; non-finite inputs simply produce non-finite outputs.
    pub fn step(&self, state: [f64; 3], dt: f64) -> [f64; 3] {
        let mut next = state;
        let mut t = 0.0;
        ExplicitEuler::<f64>::new(3).step(self, &mut t, &mut next, dt);
        next
    }
}

impl<T: Scalar> DynamicalSystem<T> for FieldParams {
    fn dimension(&self) -> usize {
        3
    }

    fn apply(&self, _t: T, x: &[T], out: &mut [T]) {
        let (px, py, pz) = (x[0], x[1], x[2]);
        let four: T = lit(4.0);

        let (dx, dy, dz) = match *self {
            FieldParams::Lorenz { sigma, rho, beta } => {
                let (sigma, rho, beta) = (lit::<T>(sigma), lit::<T>(rho), lit::<T>(beta));
                (
                    sigma * (py - px),
                    px * (rho - pz) - py,
                    px * py - beta * pz,
                )
            }
            FieldParams::Thomas { b } => {
                let b = lit::<T>(b);
                (
                    py.sin() - b * px,
                    pz.sin() - b * py,
                    px.sin() - b * pz,
                )
            }
            FieldParams::Dadras { a, b, c, d, e } => {
                let (a, b, c, d, e) = (
                    lit::<T>(a),
                    lit::<T>(b),
                    lit::<T>(c),
                    lit::<T>(d),
                    lit::<T>(e),
                );
                (
                    py - a * px + b * py * pz,
                    c * py - px * pz + pz,
                    d * px * py - e * pz,
                )
            }
            FieldParams::Rossler { a, b, c } => {
                let (a, b, c) = (lit::<T>(a), lit::<T>(b), lit::<T>(c));
                (-py - pz, px + a * py, b + pz * (px - c))
            }
            FieldParams::Aizawa { a, b, c, d, e, f } => {
                let (a, b, c, d, e, f) = (
                    lit::<T>(a),
                    lit::<T>(b),
                    lit::<T>(c),
                    lit::<T>(d),
                    lit::<T>(e),
                    lit::<T>(f),
                );
                let three: T = lit(3.0);
                (
                    (pz - b) * px - d * py,
                    d * px + (pz - b) * py,
                    c + a * pz - pz.powi(3) / three - (px * px + py * py) * (T::one() + e * pz)
                        + f * pz * px.powi(3),
                )
            }
            FieldParams::Chen { a, b, c } => {
                let (a, b, c) = (lit::<T>(a), lit::<T>(b), lit::<T>(c));
                (
                    a * (py - px),
                    (c - a) * px - px * pz + c * py,
                    px * py - b * pz,
                )
            }
            FieldParams::Halvorsen { a } => {
                let a = lit::<T>(a);
                (
                    -a * px - four * py - four * pz - py * py,
                    -a * py - four * pz - four * px - pz * pz,
                    -a * pz - four * px - four * py - px * px,
                )
            }
            FieldParams::Sprott { a, b } => {
                let (a, b) = (lit::<T>(a), lit::<T>(b));
                (
                    py + a * px * py + px * pz,
                    T::one() - b * px * px + py * pz,
                    px - px * px - py * py,
                )
            }
        };

        out[0] = dx;
        out[1] = dy;
        out[2] = dz;
    }
}

/// Everything the engine and the driver need to know about one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub id: &'static str,
    /// Starts at the defaults; the driver may edit its copy freely.
    pub params: FieldParams,
    pub ranges: &'static [ParamRange],
    pub time_step: f64,
    pub display_scale: f64,
    pub camera: [f64; 3],
}

impl FieldDescriptor {
    pub fn attractor(&self) -> Attractor {
        self.params.attractor()
    }

    pub fn step(&self, state: [f64; 3], dt: f64) -> [f64; 3] {
        self.params.step(state, dt)
    }
}

/// Catalog identifiers in declaration order.
pub fn list() -> impl Iterator<Item = &'static str> {
    Attractor::ALL.into_iter().map(Attractor::id)
}

pub fn get(id: &str) -> Result<FieldDescriptor> {
    Attractor::from_id(id).map(Attractor::descriptor)
}
