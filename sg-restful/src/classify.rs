//! Backend exception classification
//!
//! The backend reports failures as `{"exception": true, "message": "..."}`
//! with free-form text. Each CRUD handler turns that text into an outward
//! status with its own ordered list of substring rules; the first rule whose
//! needle occurs in the message wins, and anything unmatched is a bad request.
//!
//! ```rust
//! use sg_restful::classify::{Category, ExceptionClassifier};
//!
//! let classifier = ExceptionClassifier::for_update();
//! assert_eq!(classifier.classify(false, ""), Category::Success);
//! assert_eq!(
//!     classifier.classify(true, "Entity of type [Shot] with id=1 does not exist."),
//!     Category::NotFound
//! );
//! assert_eq!(classifier.classify(true, "something else"), Category::BadRequest);
//! ```

use std::fmt;

use axum::http::StatusCode;

/// Outward result of a backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// No exception was reported
    Success,
    /// Uniqueness violation
    Conflict,
    /// Permission rule rejected the call
    Forbidden,
    /// Target entity does not exist
    NotFound,
    /// Any other backend exception
    BadRequest,
}

impl Category {
    /// HTTP status for this category; `Success` maps to `200 OK`
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest => StatusCode::BAD_REQUEST,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Conflict => write!(f, "conflict"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::NotFound => write!(f, "not_found"),
            Self::BadRequest => write!(f, "bad_request"),
        }
    }
}

/// Substring the backend uses for uniqueness violations
pub const UNIQUE: &str = "unique";
/// Substring the backend uses for permission-rule rejections
pub const PERMISSION: &str = "Permission";
/// Substring the backend uses for missing entities
pub const DOES_NOT_EXIST: &str = "does not exist";

/// One `needle -> category` rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    /// Case-sensitive substring searched for in the backend message
    pub needle: String,
    /// Category returned when the needle occurs
    pub category: Category,
}

impl ClassificationRule {
    /// Create a rule
    pub fn new(needle: impl Into<String>, category: Category) -> Self {
        Self {
            needle: needle.into(),
            category,
        }
    }

    fn matches(&self, message: &str) -> bool {
        message.contains(self.needle.as_str())
    }
}

/// Ordered rule list for one call site
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExceptionClassifier {
    rules: Vec<ClassificationRule>,
}

impl ExceptionClassifier {
    /// Classifier with the given rules, evaluated in order
    #[must_use]
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    /// Append a rule (lowest precedence so far)
    #[must_use]
    pub fn rule(mut self, needle: impl Into<String>, category: Category) -> Self {
        self.rules.push(ClassificationRule::new(needle, category));
        self
    }

    /// Rules for `create`: uniqueness, then permission
    #[must_use]
    pub fn for_create() -> Self {
        Self::default()
            .rule(UNIQUE, Category::Conflict)
            .rule(PERMISSION, Category::Forbidden)
    }

    /// Rules for `update`: uniqueness, permission, then missing entity
    #[must_use]
    pub fn for_update() -> Self {
        Self::for_create().rule(DOES_NOT_EXIST, Category::NotFound)
    }

    /// Rules for `delete`: permission, then missing entity
    #[must_use]
    pub fn for_delete() -> Self {
        Self::default()
            .rule(PERMISSION, Category::Forbidden)
            .rule(DOES_NOT_EXIST, Category::NotFound)
    }

    /// Rules for `revive`; same as delete
    #[must_use]
    pub fn for_revive() -> Self {
        Self::for_delete()
    }

    /// Rules in evaluation order
    #[must_use]
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Classify a backend response
    #[must_use]
    pub fn classify(&self, exception: bool, message: &str) -> Category {
        if !exception {
            return Category::Success;
        }
        self.classify_message(message)
    }

    /// Classify an exception message; never returns `Success`
    #[must_use]
    pub fn classify_message(&self, message: &str) -> Category {
        self.rules
            .iter()
            .find(|rule| rule.matches(message))
            .map_or(Category::BadRequest, |rule| rule.category)
    }
}
