/// Package metadata model and enrichment
///
/// Metadata is attached to lock graph nodes by the [`enricher`], which
/// consults one or more [`crate::ports::outbound::MetadataSource`]
/// implementations. Absent facts stay `None`; exporters decide how each
/// target schema renders "unknown".
pub mod enricher;
pub mod policies;

pub use enricher::{EnricherReport, MetadataEnricher};
pub use policies::LicensePolicy;

/// A package author, as declared in distribution metadata or the
/// project manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: Option<String>,
}

impl Author {
    pub fn new(name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            name: name.into(),
            email,
        }
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.email {
            Some(email) => write!(f, "{} <{}>", self.name, email),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Authorship, license and description facts for one resolved package.
///
/// Every field is optional: a missing fact is represented as `None`, never
/// as an empty string, so exporters can substitute the target schema's
/// "unknown" sentinel where one is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    pub authors: Vec<Author>,
    /// SPDX-style license expression, or free text where not representable
    pub license: Option<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
}

impl PackageMetadata {
    /// True when no fact at all is known for the package
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
            && self.license.is_none()
            && self.description.is_none()
            && self.homepage.is_none()
    }
}
