/// LicensePolicy for determining license information precedence
///
/// Distribution metadata can carry license information in three places:
/// the `License` header, the `License-Expression` header, and the trove
/// classifiers. This policy encodes the selection rules used when more
/// than one is present.
///
/// Priority order:
/// 1. `License` header (if non-empty and not "UNKNOWN")
/// 2. `License-Expression` header (if non-empty)
/// 3. OSI Approved license from classifiers
pub struct LicensePolicy;

impl LicensePolicy {
    /// Selects the most appropriate license text based on priority rules
    ///
    /// # Arguments
    /// * `license` - `License` header from distribution metadata
    /// * `license_expression` - `License-Expression` header
    /// * `classifiers` - Trove classifier strings
    ///
    /// # Returns
    /// The selected license text, or None if no valid license found
    pub fn select_license(
        license: Option<String>,
        license_expression: Option<String>,
        classifiers: &[String],
    ) -> Option<String> {
        license
            .filter(|l| !l.is_empty() && l != "UNKNOWN")
            .or_else(|| license_expression.filter(|l| !l.is_empty()))
            .or_else(|| Self::extract_license_from_classifiers(classifiers))
    }

    /// Extracts license information from classifier strings
    ///
    /// Looks for classifiers with the prefix "License :: OSI Approved :: "
    /// and extracts the license name.
    fn extract_license_from_classifiers(classifiers: &[String]) -> Option<String> {
        for classifier in classifiers {
            if let Some(license) = classifier.strip_prefix("License :: OSI Approved :: ") {
                return Some(license.to_string());
            }
        }
        None
    }
}
