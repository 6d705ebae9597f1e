use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelfmark_core::constants::DEFAULT_SEARCH_LIMIT;
use shelfmark_core::{MaterialType, SearchSort};
use sqlx::types::Json;

/// Catalog entry available for borrowing
///
/// # Fields
///
/// * `id` - UUID v4 string assigned on creation
/// * `title` / `author` - Display metadata, required
/// * `title_lower` / `author_lower` - Lowercase shadow columns used only by prefix search
/// * `publication_year` - Four-digit year, validated on write
/// * `material_type` - One of the [`MaterialType`] names (`"Book"`, `"Journal"`, ...)
/// * `abstract_text` - Free-text abstract (may be empty)
/// * `keywords` - Keyword list, stored as a JSON array
/// * `file_url` / `file_name` - Optional reference to an uploaded file
/// * `view_count` - Number of detail views, only ever incremented
/// * `created_at` / `updated_at` - Record timestamps
///
/// # Database Schema
///
/// Maps to the `materials` table. The shadow columns are derived by the
/// repository on every create and update; callers never write them directly.
///
/// # Examples
///
/// ```
/// use shelfmark_storage::models::{Material, MaterialDraft};
/// use shelfmark_core::MaterialType;
///
/// let draft = MaterialDraft::new("Data Structures", "N. Wirth", 1976, MaterialType::Book)
///     .keywords(vec!["algorithms".to_string()]);
///
/// let material = Material::from_draft("m-1".to_string(), &draft);
/// assert_eq!(material.title_lower, "data structures");
/// assert_eq!(material.get_material_type(), Some(MaterialType::Book));
/// assert_eq!(material.view_count, 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Material {
    /// UUID v4 string primary key
    pub id: String,

    /// Title as entered by the librarian
    pub title: String,

    /// Author as entered by the librarian
    pub author: String,

    /// Lowercased title for prefix search
    pub title_lower: String,

    /// Lowercased author for prefix search
    pub author_lower: String,

    /// Year of publication
    pub publication_year: i32,

    /// Material type name
    ///
    /// Use `get_material_type()` to convert to the `MaterialType` enum.
    pub material_type: String,

    /// Abstract text
    pub abstract_text: String,

    /// Keywords, persisted as a JSON array
    pub keywords: Json<Vec<String>>,

    /// URL of the uploaded file, if any
    pub file_url: Option<String>,

    /// Original name of the uploaded file, if any
    pub file_name: Option<String>,

    /// Number of detail-page views
    pub view_count: i64,

    /// Record creation timestamp
    pub created_at: DateTime<Utc>,

    /// Record last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Material {
    /// Build an unsaved material from a draft, deriving the shadow fields.
    pub fn from_draft(id: String, draft: &MaterialDraft) -> Self {
        let now = Utc::now();
        let (file_url, file_name) = match &draft.file {
            Some(file) => (Some(file.url.clone()), Some(file.name.clone())),
            None => (None, None),
        };

        Self {
            id,
            title: draft.title.trim().to_string(),
            author: draft.author.trim().to_string(),
            title_lower: shadow(&draft.title),
            author_lower: shadow(&draft.author),
            publication_year: draft.publication_year,
            material_type: draft.material_type.as_str().to_string(),
            abstract_text: draft.abstract_text.clone(),
            keywords: Json(draft.keywords.clone()),
            file_url,
            file_name,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Get the material type as an enum
    pub fn get_material_type(&self) -> Option<MaterialType> {
        self.material_type.parse().ok()
    }

    /// Get the attached file reference, if both URL and name are present
    pub fn file(&self) -> Option<FileReference> {
        match (&self.file_url, &self.file_name) {
            (Some(url), Some(name)) if !url.is_empty() => Some(FileReference {
                url: url.clone(),
                name: name.clone(),
            }),
            _ => None,
        }
    }

    /// Lowercased "title author keywords..." haystack for free-text matching
    pub fn search_text(&self) -> String {
        std::iter::once(self.title.as_str())
            .chain(std::iter::once(self.author.as_str()))
            .chain(self.keywords.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Check whether a lowercase needle occurs in title, author or keywords
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.search_text().contains(needle_lower)
    }
}

/// Derive the lowercase shadow value for a searchable field.
pub fn shadow(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Reference to a file held by the external asset host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    /// Stable URL returned by the asset host
    pub url: String,
    /// Original file name
    pub name: String,
}

/// Input for creating a material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialDraft {
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub material_type: MaterialType,
    pub abstract_text: String,
    pub keywords: Vec<String>,
    pub file: Option<FileReference>,
}

impl MaterialDraft {
    /// Create a draft with the required fields
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        publication_year: i32,
        material_type: MaterialType,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            publication_year,
            material_type,
            abstract_text: String::new(),
            keywords: Vec::new(),
            file: None,
        }
    }

    /// Set the abstract
    pub fn abstract_text(mut self, text: impl Into<String>) -> Self {
        self.abstract_text = text.into();
        self
    }

    /// Set the keywords
    pub fn keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    /// Attach an uploaded file
    pub fn file(mut self, file: FileReference) -> Self {
        self.file = Some(file);
        self
    }
}

/// Partial update of a material's metadata
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publication_year: Option<i32>,
    pub material_type: Option<MaterialType>,
    pub abstract_text: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub file: Option<FileReference>,
}

impl MaterialPatch {
    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.publication_year.is_none()
            && self.material_type.is_none()
            && self.abstract_text.is_none()
            && self.keywords.is_none()
            && self.file.is_none()
    }
}

/// Parameters for the filtered catalog search
///
/// Type, year, sort and limit are applied by the store; `text` is matched
/// afterwards against the fetched rows, so the limit bounds the candidate set
/// rather than the number of matches.
///
/// # Examples
///
/// ```
/// use shelfmark_storage::models::SearchQuery;
/// use shelfmark_core::{MaterialType, SearchSort};
///
/// let query = SearchQuery::new("graph")
///     .material_type(MaterialType::Thesis)
///     .sort(SearchSort::Recent)
///     .limit(5);
///
/// assert_eq!(query.limit, 5);
/// assert_eq!(query.normalized_text(), "graph");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub material_type: Option<MaterialType>,
    pub year: Option<i32>,
    pub sort: SearchSort,
    pub limit: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: String::new(),
            material_type: None,
            year: None,
            sort: SearchSort::default(),
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl SearchQuery {
    /// Create a query with free text and default filters
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Only return materials of this type
    pub fn material_type(mut self, material_type: MaterialType) -> Self {
        self.material_type = Some(material_type);
        self
    }

    /// Only return materials published in this year
    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Set the ordering
    pub fn sort(mut self, sort: SearchSort) -> Self {
        self.sort = sort;
        self
    }

    /// Set the number of rows fetched from the store
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Trimmed, lowercased free text
    pub fn normalized_text(&self) -> String {
        self.text.trim().to_lowercase()
    }
}
