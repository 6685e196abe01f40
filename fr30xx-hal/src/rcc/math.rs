//! Fixed-point helpers for the fractional-N PLL dividers.

use super::Error;

/// Full scale of the 16-bit fractional divider fields.
pub const FRAC_FULL_SCALE: u32 = 0xFFFF;

/// Scaled multiply: `floor(u * v / z)` over the full 64-bit product.
///
/// Returns `None` for `z == 0` and for quotients that do not fit in 32 bits.
/// Used to turn a PLL fraction `u / z` of the reference `v` into hertz.
pub const fn mul_mod(u: u32, v: u32, z: u32) -> Option<u32> {
    if z == 0 {
        return None;
    }
    let q = (u as u64 * v as u64) / z as u64;
    if q > u32::MAX as u64 {
        None
    } else {
        Some(q as u32)
    }
}

/// Greatest common divisor, Euclid's algorithm.
pub const fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Values for one PLL's `DIV` and `OUT.DEN` fields.
///
/// The hardware multiplier is `n / 2 + frac / 0xFFFF / 2`: the integer part
/// counts half steps, and the fraction is stored doubled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PllDivider {
    pub n: u8,
    pub frac: u16,
    /// Reduced fraction denominator minus one, `0` for an integer multiplier.
    pub den: u16,
}

impl PllDivider {
    pub const fn is_fractional(&self) -> bool {
        self.frac != 0
    }
}

const fn half_steps(n: u32) -> Result<u8, Error> {
    if n > u8::MAX as u32 {
        Err(Error::InvalidParameter {
            reason: "PLL multiplier overflows the divider field",
        })
    } else {
        Ok(n as u8)
    }
}

/// SPLL divider fields for `N + M / 65536`.
///
/// A doubled fraction above full scale carries into the integer half steps.
pub fn spll_divider(n: u8, m: u16) -> Result<PllDivider, Error> {
    let mut n2 = n as u32 * 2;
    let mut m2 = m as u32 * 2;
    if m2 > FRAC_FULL_SCALE {
        n2 += 1;
        m2 -= FRAC_FULL_SCALE;
    }

    Ok(PllDivider {
        n: half_steps(n2)?,
        frac: m2 as u16,
        den: 0,
    })
}

/// AUPLL divider fields for `N + K / D`. Requires `k <= d`.
///
/// The doubled fraction carries like the SPLL one; an exact half
/// (`2K == D`) becomes one extra half step with no fraction. What is left
/// is reduced to lowest terms and rescaled to a `0xFFFF` denominator.
pub fn aupll_divider(n: u8, k: u32, d: u32) -> Result<PllDivider, Error> {
    let mut n2 = n as u32 * 2;
    let mut k2 = k as u64 * 2;
    let d = d as u64;

    // K = D = 0 stays integer, unlike a literal `2K == D` test
    if k2 != 0 && k2 == d {
        n2 += 1;
        k2 = 0;
    } else if k2 > d {
        n2 += 1;
        k2 -= d;
    }

    let n = half_steps(n2)?;
    if k2 == 0 {
        return Ok(PllDivider { n, frac: 0, den: 0 });
    }

    // k2 <= d <= u32::MAX here
    let k2 = k2 as u32;
    let d = d as u32;
    let g = gcd(k2, d);
    let (k_red, d_red) = (k2 / g, d / g);
    if d_red > FRAC_FULL_SCALE + 1 {
        return Err(Error::InvalidParameter {
            reason: "AUPLL fraction denominator does not fit 16 bits",
        });
    }

    let frac = match mul_mod(k_red, FRAC_FULL_SCALE, d_red) {
        Some(frac) => frac as u16,
        None => {
            return Err(Error::InvalidParameter {
                reason: "AUPLL fraction out of range",
            })
        }
    };

    Ok(PllDivider {
        n,
        frac,
        den: (d_red - 1) as u16,
    })
}

/// `n * hse + fraction`, rejecting results above 32 bits.
pub(crate) fn pll_freq(n: u8, hse: u32, fraction: u32) -> Result<u32, Error> {
    (n as u32)
        .checked_mul(hse)
        .and_then(|base| base.checked_add(fraction))
        .ok_or(Error::InvalidParameter {
            reason: "PLL output frequency overflows",
        })
}
