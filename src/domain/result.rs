//! Result type alias for IQBridge

use super::errors::BridgeError;

/// Result type alias for IQBridge operations
///
/// # Examples
///
/// ```
/// use iqbridge::domain::result::Result;
/// use iqbridge::domain::errors::BridgeError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(BridgeError::Other("boom".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::MappingField;

    fn site_location(configured: bool) -> Result<i32> {
        if configured {
            Ok(7)
        } else {
            Err(BridgeError::incomplete(MappingField::SiteLocation, "unset"))
        }
    }

    #[test]
    fn test_question_mark_keeps_incomplete_mapping() {
        fn encounter_location(configured: bool) -> Result<i32> {
            let location = site_location(configured)?;
            Ok(location)
        }

        assert_eq!(encounter_location(true).unwrap(), 7);
        assert!(encounter_location(false).unwrap_err().is_incomplete_mapping());
    }
}
