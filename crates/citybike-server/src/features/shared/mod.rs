//! Helpers shared across feature slices

/// Decimal places kept on presentation values (coordinates, kilometers,
/// minutes).
pub const DECIMAL_ROUND: i32 = 5;

/// Round a presentation value to the given number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_requested_precision() {
        assert_eq!(round_to(8.333333333, DECIMAL_ROUND), 8.33333);
        assert_eq!(round_to(60.168265666, DECIMAL_ROUND), 60.16827);
        assert_eq!(round_to(2.043, DECIMAL_ROUND), 2.043);
        assert_eq!(round_to(-1.0000049, DECIMAL_ROUND), -1.0);
    }
}
