//! Field paths and field-level validation errors.
//!
//! Validators never stop at the first problem. Each check appends
//! [`FieldError`]s to an [`ErrorList`], so the caller sees every problem with
//! an object in one pass. An empty list means the object is valid.

use std::fmt;

/// An ordered list of field errors. Empty means valid.
pub type ErrorList = Vec<FieldError>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(usize),
    Key(String),
}

/// A path to a field inside a resource, such as `spec.solvers[0].http01`.
///
/// Paths are cheap values: every builder method returns a new path and leaves
/// `self` untouched, so a parent path can be reused for several children.
///
/// # Example
/// ```
/// use certcheck::field::Path;
///
/// let solvers = Path::new("spec").child("acme").child("solvers");
/// assert_eq!(solvers.index(0).child("http01").to_string(), "spec.acme.solvers[0].http01");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Creates a path rooted at `name`. An empty name yields the root path.
    pub fn new(name: &str) -> Self {
        Self::root().child(name)
    }

    /// The empty path. Its children render without a leading dot.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path with one field name appended.
    pub fn child(&self, name: &str) -> Self {
        self.with(if name.is_empty() {
            None
        } else {
            Some(Segment::Field(name.to_string()))
        })
    }

    /// Returns a new path with a list index appended.
    pub fn index(&self, index: usize) -> Self {
        self.with(Some(Segment::Index(index)))
    }

    /// Returns a new path with a map key subscript appended.
    pub fn key(&self, key: &str) -> Self {
        self.with(Some(Segment::Key(key.to_string())))
    }

    fn with(&self, segment: Option<Segment>) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(segment);
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(key) => write!(f, "[{key}]")?,
            }
        }
        Ok(())
    }
}

/// The category of a [`FieldError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldErrorType {
    /// A required field is unset.
    Required,
    /// A field holds a value that is malformed or inconsistent.
    Invalid,
    /// A field is set where it may not be.
    Forbidden,
    /// A field holds a value outside a fixed set of supported values.
    NotSupported,
}

impl FieldErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldErrorType::Required => "Required value",
            FieldErrorType::Invalid => "Invalid value",
            FieldErrorType::Forbidden => "Forbidden",
            FieldErrorType::NotSupported => "Unsupported value",
        }
    }
}

impl fmt::Display for FieldErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation problem tied to a field path.
///
/// # Fields
/// * `error_type` - The category of the problem.
/// * `field` - The rendered path of the offending field.
/// * `bad_value` - The rejected value, for `Invalid` and `NotSupported` errors.
/// * `detail` - A human readable explanation. May be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub error_type: FieldErrorType,
    pub field: String,
    pub bad_value: Option<String>,
    pub detail: String,
}

impl FieldError {
    pub fn required(path: &Path, detail: impl Into<String>) -> Self {
        Self::new(FieldErrorType::Required, path, None, detail.into())
    }

    pub fn invalid(path: &Path, value: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(
            FieldErrorType::Invalid,
            path,
            Some(value.into()),
            detail.into(),
        )
    }

    pub fn forbidden(path: &Path, detail: impl Into<String>) -> Self {
        Self::new(FieldErrorType::Forbidden, path, None, detail.into())
    }

    /// Reports `value` as unsupported, listing every accepted value in the
    /// detail.
    pub fn not_supported(path: &Path, value: impl Into<String>, supported: &[&str]) -> Self {
        let quoted = supported
            .iter()
            .map(|v| format!("{v:?}"))
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(
            FieldErrorType::NotSupported,
            path,
            Some(value.into()),
            format!("supported values: {quoted}"),
        )
    }

    fn new(
        error_type: FieldErrorType,
        path: &Path,
        bad_value: Option<String>,
        detail: String,
    ) -> Self {
        Self {
            error_type,
            field: path.to_string(),
            bad_value,
            detail,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.error_type)?;
        if let Some(value) = &self.bad_value {
            write!(f, ": {value:?}")?;
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldError {}
