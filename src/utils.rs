//! Utility functions

use crate::error::{Result, SurveyError};

/// Floor division with Python semantics: the quotient is rounded toward
/// negative infinity, so the result is consistent for negative steps.
pub(crate) fn floor_div(a: f64, b: f64) -> f64 {
    (a / b).floor()
}

/// Modulo with Python semantics: the remainder takes the sign of the divisor.
pub(crate) fn floor_mod(a: f64, b: f64) -> f64 {
    a - b * (a / b).floor()
}

/// Convert raw little-endian bytes to f32 samples
pub(crate) fn bytes_to_samples(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(SurveyError::ShapeMismatch(format!(
            "byte length {} is not a multiple of the sample size",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Convert f32 samples to little-endian bytes
pub(crate) fn samples_to_bytes(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 4);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

/// Round to a fixed number of decimal places
pub(crate) fn round_decimals(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_div_matches_python() {
        assert_eq!(floor_div(110.0, 20.0), 5.0);
        assert_eq!(floor_div(-10.0, 20.0), -1.0);
        assert_eq!(floor_div(10.0, -20.0), -1.0);
    }

    #[test]
    fn test_floor_mod_takes_divisor_sign() {
        assert_eq!(floor_mod(110.0, 20.0), 10.0);
        assert_eq!(floor_mod(-10.0, 20.0), 10.0);
        assert_eq!(floor_mod(10.0, -20.0), -10.0);
    }

    #[test]
    fn test_sample_conversion_round_trip() {
        let samples = vec![1.0f32, -2.5, 3.25, 0.0];
        let bytes = samples_to_bytes(&samples);
        assert_eq!(bytes.len(), samples.len() * 4);

        let recovered = bytes_to_samples(&bytes).unwrap();
        assert_eq!(samples, recovered);
    }

    #[test]
    fn test_misaligned_bytes_rejected() {
        assert!(bytes_to_samples(&[0u8, 1, 2]).is_err());
    }

    #[test]
    fn test_round_decimals() {
        assert_eq!(round_decimals(499.9880341, 2), 499.99);
        assert_eq!(round_decimals(137.4999, 2), 137.5);
    }
}
