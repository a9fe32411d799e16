//! Validation utilities for the Kitforge operations platform

use rust_decimal::Decimal;

use crate::models::{JobLine, MaterialLine};

/// Validate a stock or order quantity is strictly positive
pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a minimum-stock level (zero allowed)
pub fn validate_min_stock_level(level: Decimal) -> Result<(), &'static str> {
    if level < Decimal::ZERO {
        return Err("Minimum stock level cannot be negative");
    }
    Ok(())
}

/// Validate a material/inventory name
pub fn validate_material_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name is required");
    }
    if name.len() > 200 {
        return Err("Name must be at most 200 characters");
    }
    Ok(())
}

/// Validate one material line of a kit list or packing container
pub fn validate_material_line(line: &MaterialLine) -> Result<(), &'static str> {
    validate_material_name(&line.name)?;
    validate_positive_quantity(line.quantity)?;
    if line.unit.trim().is_empty() {
        return Err("Unit is required");
    }
    Ok(())
}

/// Validate the source/target lines of a processing job
pub fn validate_job_lines(lines: &[JobLine]) -> Result<(), &'static str> {
    if lines.is_empty() {
        return Err("At least one line is required");
    }
    for line in lines {
        validate_material_name(&line.item_name)?;
        validate_positive_quantity(line.quantity)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_quantity() {
        assert!(validate_positive_quantity(Decimal::from(1)).is_ok());
        assert!(validate_positive_quantity(Decimal::ZERO).is_err());
        assert!(validate_positive_quantity(Decimal::from(-3)).is_err());
    }

    #[test]
    fn test_validate_min_stock_level() {
        assert!(validate_min_stock_level(Decimal::ZERO).is_ok());
        assert!(validate_min_stock_level(Decimal::from(10)).is_ok());
        assert!(validate_min_stock_level(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_validate_material_name() {
        assert!(validate_material_name("LED").is_ok());
        assert!(validate_material_name("   ").is_err());
        assert!(validate_material_name(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_job_lines() {
        assert!(validate_job_lines(&[]).is_err());
        let good = JobLine {
            item_name: "Resin".to_string(),
            quantity: Decimal::from(5),
            unit: "kg".to_string(),
        };
        assert!(validate_job_lines(std::slice::from_ref(&good)).is_ok());
        let bad = JobLine {
            quantity: Decimal::ZERO,
            ..good
        };
        assert!(validate_job_lines(&[bad]).is_err());
    }
}
