//! Person card fields and validation rules.
//!
//! Submitted form values arrive as a [`PersonInput`] of raw strings. The only
//! way to obtain a [`ValidPerson`] (which is what the repository accepts) is
//! [`PersonInput::into_valid`], so nothing reaches the database unvalidated.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use image::ImageFormat;
use regex::Regex;
use serde::Serialize;
use validator::Validate;


// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of every name field, in characters.
pub const MAX_NAME_LENGTH: usize = 100;

/// Cyrillic letters (including `Ё`/`ё`), whitespace and hyphen.
pub const CYRILLIC_NAME_PATTERN: &str = r"^[А-ЯЁа-яё\s-]+$";

static CYRILLIC_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CYRILLIC_NAME_PATTERN).expect("valid regex"));

/// Wire format of `birth_date` in forms.
pub const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

/// Subdirectory of the media root that holds uploaded photos.
pub const PHOTO_UPLOAD_DIR: &str = "persons";

pub const REQUIRED_MESSAGE: &str = "Обязательное поле.";
pub const INVALID_DATE_MESSAGE: &str = "Введите правильную дату.";
pub const INVALID_IMAGE_MESSAGE: &str =
    "Загрузите правильное изображение. Файл не является изображением или поврежден.";

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// The editable fields of a person card, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PersonField {
    LastName,
    FirstName,
    Patronymic,
    BirthDate,
    Photo,
}

impl PersonField {
    pub const ALL: [PersonField; 5] = [
        PersonField::LastName,
        PersonField::FirstName,
        PersonField::Patronymic,
        PersonField::BirthDate,
        PersonField::Photo,
    ];

    /// Form/column name, also the key under `label.*` in translation bundles.
    pub fn name(self) -> &'static str {
        match self {
            PersonField::LastName => "last_name",
            PersonField::FirstName => "first_name",
            PersonField::Patronymic => "patronymic",
            PersonField::BirthDate => "birth_date",
            PersonField::Photo => "photo",
        }
    }

    /// Built-in label used when the active bundle has no override.
    pub fn default_label(self) -> &'static str {
        match self {
            PersonField::LastName => "Фамилия",
            PersonField::FirstName => "Имя",
            PersonField::Patronymic => "Отчество",
            PersonField::BirthDate => "Дата рождения",
            PersonField::Photo => "Фотография",
        }
    }

    /// HTML input type the form should render.
    pub fn input_type(self) -> &'static str {
        match self {
            PersonField::BirthDate => "date",
            PersonField::Photo => "file",
            _ => "text",
        }
    }

    pub fn required(self) -> bool {
        matches!(
            self,
            PersonField::LastName | PersonField::FirstName | PersonField::BirthDate
        )
    }

    /// File inputs get no placeholder.
    pub fn has_placeholder(self) -> bool {
        self != PersonField::Photo
    }
}

// ---------------------------------------------------------------------------
// Field errors
// ---------------------------------------------------------------------------

/// Field name -> error messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: PersonField, message: impl Into<String>) {
        self.0
            .entry(field.name().to_string())
            .or_default()
            .push(message.into());
    }

    /// Replace every message recorded for `field` with a single one.
    fn replace(&mut self, field: PersonField, message: impl Into<String>) {
        self.0
            .insert(field.name().to_string(), vec![message.into()]);
    }

    pub fn get(&self, field: PersonField) -> &[String] {
        self.0
            .get(field.name())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, field: PersonField) -> bool {
        self.0.contains_key(field.name())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge another error set into this one.
    pub fn extend(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = BTreeMap::<String, Vec<String>>::new();
        for (field, errs) in errors.field_errors() {
            let messages = out.entry(field.to_string()).or_default();
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                messages.push(message);
            }
        }
        FieldErrors(out)
    }
}

// ---------------------------------------------------------------------------
// Input and validated person
// ---------------------------------------------------------------------------

/// Raw submitted values for a person card.
///
/// Name fields are trimmed on construction; an empty patronymic becomes `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct PersonInput {
    #[validate(
        length(max = 100, message = "Не более 100 символов."),
        regex(
            path = *CYRILLIC_NAME_RE,
            message = "Фамилия должна содержать только кириллицу, пробел и дефис"
        )
    )]
    pub last_name: String,

    #[validate(
        length(max = 100, message = "Не более 100 символов."),
        regex(
            path = *CYRILLIC_NAME_RE,
            message = "Имя должно содержать только кириллицу, пробел и дефис"
        )
    )]
    pub first_name: String,

    #[validate(
        length(max = 100, message = "Не более 100 символов."),
        regex(
            path = *CYRILLIC_NAME_RE,
            message = "Отчество должно содержать только кириллицу, пробел и дефис"
        )
    )]
    pub patronymic: Option<String>,

    pub birth_date: String,
}

impl PersonInput {
    pub fn new(
        last_name: impl AsRef<str>,
        first_name: impl AsRef<str>,
        patronymic: impl AsRef<str>,
        birth_date: impl AsRef<str>,
    ) -> Self {
        let patronymic = patronymic.as_ref().trim();
        Self {
            last_name: last_name.as_ref().trim().to_string(),
            first_name: first_name.as_ref().trim().to_string(),
            patronymic: (!patronymic.is_empty()).then(|| patronymic.to_string()),
            birth_date: birth_date.as_ref().trim().to_string(),
        }
    }

    /// Run every field rule, returning the validated person or all field errors.
    pub fn into_valid(self) -> Result<ValidPerson, FieldErrors> {
        let mut errors = match Validate::validate(&self) {
            Ok(()) => FieldErrors::new(),
            Err(errs) => FieldErrors::from(errs),
        };

        if self.last_name.is_empty() {
            errors.replace(PersonField::LastName, REQUIRED_MESSAGE);
        }
        if self.first_name.is_empty() {
            errors.replace(PersonField::FirstName, REQUIRED_MESSAGE);
        }

        let birth_date = if self.birth_date.is_empty() {
            errors.add(PersonField::BirthDate, REQUIRED_MESSAGE);
            None
        } else {
            match parse_birth_date(&self.birth_date) {
                Some(date) => Some(date),
                None => {
                    errors.add(PersonField::BirthDate, INVALID_DATE_MESSAGE);
                    None
                }
            }
        };

        match birth_date {
            Some(birth_date) if errors.is_empty() => Ok(ValidPerson {
                last_name: self.last_name,
                first_name: self.first_name,
                patronymic: self.patronymic.unwrap_or_default(),
                birth_date,
                photo: None,
            }),
            _ => Err(errors),
        }
    }
}

/// Parse a `YYYY-MM-DD` birth date.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), BIRTH_DATE_FORMAT).ok()
}

/// A person card that passed validation and may be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPerson {
    last_name: String,
    first_name: String,
    patronymic: String,
    birth_date: NaiveDate,
    photo: Option<String>,
}

impl ValidPerson {
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Empty when no patronymic was given.
    pub fn patronymic(&self) -> &str {
        &self.patronymic
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    /// Path of the stored photo, relative to the media root.
    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    pub fn with_photo(mut self, photo: Option<String>) -> Self {
        self.photo = photo;
        self
    }
}

/// `"<last_name> <first_name>"`, used in confirmation views and logs.
pub fn display_name(last_name: &str, first_name: &str) -> String {
    format!("{last_name} {first_name}")
}

// ---------------------------------------------------------------------------
// Photo checks
// ---------------------------------------------------------------------------

const ACCEPTED_PHOTO_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::WebP,
    ImageFormat::Gif,
];

/// Detect an accepted image format from the file's magic bytes.
///
/// Returns the canonical file extension for the format, or `None` when the
/// bytes are not one of the accepted image types.
pub fn photo_extension(bytes: &[u8]) -> Option<&'static str> {
    let format = image::guess_format(bytes).ok()?;
    if !ACCEPTED_PHOTO_FORMATS.contains(&format) {
        return None;
    }
    format.extensions_str().first().copied()
}
