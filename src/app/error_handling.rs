//! Error handling utilities
//!
//! This module provides centralized error handling for the application.

use crate::error::KitchenError;
use tracing::error;

/// Exit code for an error that ends the program
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<KitchenError>()
        .map_or(1, KitchenError::exit_code)
}

/// Handle fatal errors and exit with appropriate status code
///
/// The error message is always printed; with `verbose >= 1` the full cause
/// chain follows it.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);
    eprintln!("Error: {error}");

    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    std::process::exit(exit_code_for(&error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_exit_with_two() {
        let error = anyhow::Error::from(KitchenError::Config("bad".to_string()));

        assert_eq!(exit_code_for(&error), 2);
    }

    #[test]
    fn test_other_errors_exit_with_one() {
        let kitchen = anyhow::Error::from(KitchenError::ResourceExhaustedPermanently);
        let other = anyhow::anyhow!("something else");

        assert_eq!(exit_code_for(&kitchen), 1);
        assert_eq!(exit_code_for(&other), 1);
    }
}
