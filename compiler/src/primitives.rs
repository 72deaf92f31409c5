// primitives.rs — Helper functions the generated code may call
//
// The generated procedure depends only on a fixed fixed-point math library
// (`primitives`) plus, for the remap/clamp/polar helpers, the host numeric
// library. This module names those helpers and decides which imports a
// given set of used helpers requires.

use std::collections::BTreeSet;
use std::fmt;

/// Module that is always imported by generated code.
pub const PRIMITIVE_MODULE: &str = "primitives";

/// Numeric library imported only when a helper needs it.
pub const NUMERIC_MODULE: &str = "std/math";

/// Units in one full turn of a fixed-point angle (tenths of a degree).
pub const FULL_TURN: i64 = 3600;

/// Half of `FULL_TURN`; the square wave flips sign here.
pub const HALF_TURN: i64 = FULL_TURN / 2;

/// Fixed-point amplitude of a unit wave.
pub const UNIT_AMPLITUDE: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    Isin,
    Icos,
    Map,
    Clamp,
    PolarDistance,
    PolarAngle,
    WaveAdd,
    WaveMultiply,
}

impl Primitive {
    /// Identifier the generated code uses to call the helper.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Isin => "isin",
            Primitive::Icos => "icos",
            Primitive::Map => "map",
            Primitive::Clamp => "clamp",
            Primitive::PolarDistance => "polarDistance",
            Primitive::PolarAngle => "polarAngle",
            Primitive::WaveAdd => "waveAdd",
            Primitive::WaveMultiply => "waveMultiply",
        }
    }

    /// Arity-4 and clamp-style helpers lean on the numeric library.
    pub fn needs_numeric_module(self) -> bool {
        matches!(
            self,
            Primitive::Map | Primitive::Clamp | Primitive::PolarDistance | Primitive::PolarAngle
        )
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Import lines required by `used`, primitive module first.
pub fn required_imports(used: &BTreeSet<Primitive>) -> Vec<&'static str> {
    let mut imports = vec![PRIMITIVE_MODULE];
    if used.iter().any(|p| p.needs_numeric_module()) {
        imports.push(NUMERIC_MODULE);
    }
    imports
}
