// validation.rs - Input validation utilities

use crate::cli::args::Args;
use crate::ndex::Visibility;
use regex::Regex;
use std::str::FromStr;

/// Pattern identifying assembly nodes in the NeST model.
pub const NEST_NAME_PATTERN: &str = "^NEST:";

#[derive(Debug)]
pub struct ValidationResult {
    pub visibility: Visibility,
    pub nest_pattern: Regex,
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult, String> {
    if args.nest.trim().is_empty() {
        return Err("--nest must be a non-empty NDEx network UUID".to_string());
    }

    if args.ias_score.trim().is_empty() {
        return Err("--ias-score must be a file path or an http(s) URL".to_string());
    }

    if args.maxsize == 0 {
        return Err("--maxsize must be greater than 0".to_string());
    }

    let visibility = Visibility::from_str(&args.visibility)?;

    let nest_pattern = Regex::new(NEST_NAME_PATTERN)
        .map_err(|e| format!("Invalid assembly name pattern: {}", e))?;

    Ok(ValidationResult {
        visibility,
        nest_pattern,
    })
}
