//! Book submission wizard.
//!
//! Five sequential steps, each with its own typed record. A step only
//! validates its own fields; the draft keeps the records accepted so far and
//! hands back a [`CompletedSubmission`] once the final step validates. The
//! caller persists the draft between requests and commits the completed
//! submission in a single transaction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::choices::{Genre, Language, Marketplace, ReadingType};
use super::errors::{DomainError, FieldError};
use super::validation::{optional_http_url, price, required_text};

pub const MAX_BOOK_FILE_BYTES: u64 = 50 * 1024 * 1024;
pub const MAX_COVER_BYTES: u64 = 5 * 1024 * 1024;

const BOOK_FILE_EXTENSIONS: &[&str] = &["pdf", "epub", "doc", "docx"];
const COVER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    BasicInfo = 1,
    ReadingSetup = 2,
    Cover = 3,
    Placement = 4,
    FinalDetails = 5,
}

impl WizardStep {
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(WizardStep::BasicInfo),
            2 => Some(WizardStep::ReadingSetup),
            3 => Some(WizardStep::Cover),
            4 => Some(WizardStep::Placement),
            5 => Some(WizardStep::FinalDetails),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }
}

/// Metadata of an uploaded file. The bytes are stored by the upload
/// collaborator under `storage_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub file_name: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub storage_key: Option<String>,
}

impl UploadedFile {
    fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }

    fn validate(
        self,
        field: &str,
        allowed: &[&str],
        max_bytes: u64,
    ) -> Result<UploadedFile, FieldError> {
        match self.extension() {
            Some(ext) if allowed.contains(&ext.as_str()) => {}
            _ => {
                return Err(FieldError::new(
                    field,
                    format!("Unsupported file type. Allowed: {}.", allowed.join(", ")),
                ));
            }
        }
        if self.size_bytes == 0 {
            return Err(FieldError::new(field, "The submitted file is empty."));
        }
        if self.size_bytes > max_bytes {
            return Err(FieldError::new(
                field,
                format!("File too large. Maximum size is {} MB.", max_bytes / (1024 * 1024)),
            ));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub title: String,
    pub author: String,
    pub asin: String,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingSetup {
    pub reading_type: ReadingType,
    pub book_file: UploadedFile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverImage {
    pub cover_image: UploadedFile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub preferred_marketplace: Marketplace,
    pub genre: Genre,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalDetails {
    pub book_price: f64,
    pub print_book_link: Option<String>,
    pub print_book_price: Option<f64>,
    pub goodreads_link: Option<String>,
    pub add_goodreads_review: bool,
}

// Raw step forms: every field optional so that missing values become
// field errors instead of a deserialization failure.

#[derive(Debug, Default, Deserialize)]
struct BasicInfoForm {
    title: Option<String>,
    author: Option<String>,
    asin: Option<String>,
    language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ReadingSetupForm {
    reading_type: Option<String>,
    book_file: Option<UploadedFile>,
}

#[derive(Debug, Default, Deserialize)]
struct CoverForm {
    cover_image: Option<UploadedFile>,
}

#[derive(Debug, Default, Deserialize)]
struct PlacementForm {
    preferred_marketplace: Option<String>,
    genre: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FinalDetailsForm {
    book_price: Option<f64>,
    print_book_link: Option<String>,
    print_book_price: Option<f64>,
    goodreads_link: Option<String>,
    #[serde(default)]
    add_goodreads_review: bool,
}

/// Collects errors across fields so a step reports all of them at once.
#[derive(Default)]
struct Errors(Vec<FieldError>);

impl Errors {
    fn take<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.0.push(e);
                None
            }
        }
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, DomainError> {
        match value {
            Some(value) if self.0.is_empty() => Ok(value),
            _ => Err(DomainError::InvalidFields(self.0)),
        }
    }
}

fn choice<T: std::str::FromStr>(field: &str, raw: Option<&str>) -> Result<T, FieldError>
where
    T::Err: std::fmt::Display,
{
    match raw.map(str::trim) {
        None | Some("") => Err(FieldError::new(field, "This field is required.")),
        Some(value) => value
            .parse()
            .map_err(|e: T::Err| FieldError::new(field, format!("Select a valid choice. {}", e))),
    }
}

fn parse_form<T: for<'de> Deserialize<'de>>(payload: Value) -> Result<T, DomainError> {
    serde_json::from_value(payload)
        .map_err(|e| DomainError::Validation(format!("Malformed step payload: {}", e)))
}

impl BasicInfoForm {
    fn validate(self) -> Result<BasicInfo, DomainError> {
        let mut errors = Errors::default();
        let title = errors.take(required_text("title", self.title.as_deref(), 255));
        let author = errors.take(required_text("author", self.author.as_deref(), 255));
        let asin = errors.take(required_text("asin", self.asin.as_deref(), 30));
        let language = match self.language.as_deref().map(str::trim) {
            None | Some("") => Some(Language::default()),
            raw => errors.take(choice("language", raw)),
        };
        let value = match (title, author, asin, language) {
            (Some(title), Some(author), Some(asin), Some(language)) => Some(BasicInfo {
                title,
                author,
                asin,
                language,
            }),
            _ => None,
        };
        errors.finish(value)
    }
}

impl ReadingSetupForm {
    fn validate(self) -> Result<ReadingSetup, DomainError> {
        let mut errors = Errors::default();
        let reading_type = errors.take(choice("reading_type", self.reading_type.as_deref()));
        let book_file = match self.book_file {
            Some(file) => errors.take(file.validate(
                "book_file",
                BOOK_FILE_EXTENSIONS,
                MAX_BOOK_FILE_BYTES,
            )),
            None => errors.take(Err(FieldError::new("book_file", "This field is required."))),
        };
        let value = match (reading_type, book_file) {
            (Some(reading_type), Some(book_file)) => Some(ReadingSetup {
                reading_type,
                book_file,
            }),
            _ => None,
        };
        errors.finish(value)
    }
}

impl CoverForm {
    fn validate(self) -> Result<CoverImage, DomainError> {
        let mut errors = Errors::default();
        let cover_image = match self.cover_image {
            Some(file) => errors.take(file.validate(
                "cover_image",
                COVER_EXTENSIONS,
                MAX_COVER_BYTES,
            )),
            None => errors.take(Err(FieldError::new(
                "cover_image",
                "This field is required.",
            ))),
        };
        errors.finish(cover_image.map(|cover_image| CoverImage { cover_image }))
    }
}

impl PlacementForm {
    fn validate(self) -> Result<Placement, DomainError> {
        let mut errors = Errors::default();
        let preferred_marketplace = errors.take(choice(
            "preferred_marketplace",
            self.preferred_marketplace.as_deref(),
        ));
        let genre = match self.genre.as_deref().map(str::trim) {
            None | Some("") => Some(Genre::default()),
            raw => errors.take(choice("genre", raw)),
        };
        let value = match (preferred_marketplace, genre) {
            (Some(preferred_marketplace), Some(genre)) => Some(Placement {
                preferred_marketplace,
                genre,
            }),
            _ => None,
        };
        errors.finish(value)
    }
}

impl FinalDetailsForm {
    fn validate(self, reading_type: ReadingType) -> Result<FinalDetails, DomainError> {
        let mut errors = Errors::default();
        let book_price = match self.book_price {
            Some(raw) => errors.take(price("book_price", raw)),
            None => errors.take(Err(FieldError::new("book_price", "This field is required."))),
        };
        let print_book_link =
            errors.take(optional_http_url("print_book_link", self.print_book_link.as_deref()));
        let print_book_price = match self.print_book_price {
            Some(raw) => errors.take(price("print_book_price", raw).map(Some)),
            None => Some(None),
        };
        let goodreads_link =
            errors.take(optional_http_url("goodreads_link", self.goodreads_link.as_deref()));

        if reading_type.is_print() {
            if matches!(print_book_link, Some(None)) {
                errors.0.push(FieldError::new(
                    "print_book_link",
                    "A print link is required for verified print reviews.",
                ));
            }
            if matches!(print_book_price, Some(None)) {
                errors.0.push(FieldError::new(
                    "print_book_price",
                    "A print price is required for verified print reviews.",
                ));
            }
        }
        if self.add_goodreads_review && matches!(goodreads_link, Some(None)) {
            errors.0.push(FieldError::new(
                "goodreads_link",
                "Provide the Goodreads link to request Goodreads reviews.",
            ));
        }

        let value = match (book_price, print_book_link, print_book_price, goodreads_link) {
            (Some(book_price), Some(print_book_link), Some(print_book_price), Some(goodreads_link)) => {
                Some(FinalDetails {
                    book_price,
                    print_book_link,
                    print_book_price,
                    goodreads_link,
                    add_goodreads_review: self.add_goodreads_review,
                })
            }
            _ => None,
        };
        errors.finish(value)
    }
}

/// Everything needed to create the book.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSubmission {
    pub basic_info: BasicInfo,
    pub reading: ReadingSetup,
    pub cover: CoverImage,
    pub placement: Placement,
    pub details: FinalDetails,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The step was stored; the wizard continues at the given step.
    Advanced(WizardStep),
    /// The final step validated; the submission is ready to commit.
    Ready(Box<CompletedSubmission>),
}

/// Accumulated state of one submission, persisted between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDraft {
    pub basic_info: Option<BasicInfo>,
    pub reading: Option<ReadingSetup>,
    pub cover: Option<CoverImage>,
    pub placement: Option<Placement>,
}

impl SubmissionDraft {
    /// First step whose record is still missing.
    pub fn next_step(&self) -> WizardStep {
        if self.basic_info.is_none() {
            WizardStep::BasicInfo
        } else if self.reading.is_none() {
            WizardStep::ReadingSetup
        } else if self.cover.is_none() {
            WizardStep::Cover
        } else if self.placement.is_none() {
            WizardStep::Placement
        } else {
            WizardStep::FinalDetails
        }
    }

    /// Validate `payload` for `step` and record it.
    ///
    /// Earlier steps may be revised; later ones are refused until the steps
    /// before them are complete. A failed step leaves the draft untouched.
    pub fn accept(&mut self, step: WizardStep, payload: Value) -> Result<StepOutcome, DomainError> {
        let next = self.next_step();
        if step > next {
            return Err(DomainError::InvalidState(format!(
                "Complete step {} before step {}",
                next.number(),
                step.number()
            )));
        }

        match step {
            WizardStep::BasicInfo => {
                self.basic_info = Some(parse_form::<BasicInfoForm>(payload)?.validate()?);
            }
            WizardStep::ReadingSetup => {
                self.reading = Some(parse_form::<ReadingSetupForm>(payload)?.validate()?);
            }
            WizardStep::Cover => {
                self.cover = Some(parse_form::<CoverForm>(payload)?.validate()?);
            }
            WizardStep::Placement => {
                self.placement = Some(parse_form::<PlacementForm>(payload)?.validate()?);
            }
            WizardStep::FinalDetails => {
                return self.finish(payload);
            }
        }
        Ok(StepOutcome::Advanced(self.next_step()))
    }

    fn finish(&self, payload: Value) -> Result<StepOutcome, DomainError> {
        let (Some(basic_info), Some(reading), Some(cover), Some(placement)) = (
            self.basic_info.clone(),
            self.reading.clone(),
            self.cover.clone(),
            self.placement.clone(),
        ) else {
            return Err(DomainError::InvalidState(
                "Submission is missing earlier steps".to_string(),
            ));
        };
        let details = parse_form::<FinalDetailsForm>(payload)?.validate(reading.reading_type)?;
        Ok(StepOutcome::Ready(Box::new(CompletedSubmission {
            basic_info,
            reading,
            cover,
            placement,
            details,
        })))
    }
}
