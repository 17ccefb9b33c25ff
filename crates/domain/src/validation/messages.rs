//! Shared message templates; `$` is replaced by the field name

pub const REQUIRED: &str = "$ is required.";
pub const STRING_REQUIRED: &str = "Provided $ should be a string.";
pub const BOOLEAN_REQUIRED: &str = "Provided $ should be a boolean.";
pub const EMPTY: &str = "Provided $ should not be empty.";
pub const INVALID_EMAIL: &str = "Provided $ is not a valid email address.";
pub const LENGTH: &str = "Provided $ is too long.";
pub const INVALID_VALUE: &str = "Provided $ is not an accepted value.";
pub const INVALID_REGION: &str = "Provided $ is not a supported region.";
pub const INVALID_UUID: &str = "Provided $ should be a valid UUID.";

/// Substitute the field name into a template
pub fn render(template: &str, field: &str) -> String {
    template.replace('$', field)
}
