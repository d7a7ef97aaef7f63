//! Person form documents and multipart submissions.
//!
//! Create and Edit render the same [`PersonForm`]: the built-in field list,
//! relabelled from the active bundle by [`localize_fields`], filled with
//! values and errors. Submissions are read from `multipart/form-data` by
//! [`read_submission`] and checked by [`PersonSubmission::validate`].

use axum::body::Bytes;
use axum::extract::Multipart;
use cards_core::person::{
    photo_extension, FieldErrors, PersonField, PersonInput, ValidPerson, BIRTH_DATE_FORMAT,
    INVALID_IMAGE_MESSAGE,
};
use cards_core::translation::Labels;
use cards_db::models::person::Person;
use serde::Serialize;

use crate::error::AppResult;

/// Name of the checkbox that removes the current photo on edit.
pub const PHOTO_CLEAR_FIELD: &str = "photo-clear";

pub const CONTRADICTORY_PHOTO_MESSAGE: &str =
    "Пожалуйста, загрузите файл или поставьте флажок \"Очистить\", но не оба одновременно.";

// ---------------------------------------------------------------------------
// Form document
// ---------------------------------------------------------------------------

/// One input of a rendered form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub input_type: &'static str,
    pub required: bool,
    pub value: Option<String>,
    pub errors: Vec<String>,
}

impl FormField {
    fn builtin(field: PersonField) -> Self {
        let label = field.default_label().to_string();
        Self {
            name: field.name(),
            placeholder: field.has_placeholder().then(|| label.clone()),
            label,
            input_type: field.input_type(),
            required: field.required(),
            value: None,
            errors: Vec::new(),
        }
    }
}

/// The person card fields with built-in labels, in form order.
pub fn person_fields() -> Vec<FormField> {
    PersonField::ALL.into_iter().map(FormField::builtin).collect()
}

/// Relabel `fields` from a bundle's `label` group.
///
/// A field whose name has an entry takes it as both label and placeholder
/// (fields without a placeholder keep none); other fields are left as they
/// are.
pub fn localize_fields(fields: &mut [FormField], labels: Labels<'_>) {
    for field in fields {
        let label = labels.get_or(field.name, &field.label).to_string();
        if field.placeholder.is_some() {
            field.placeholder = Some(label.clone());
        }
        field.label = label;
    }
}

/// Current values of a person form, as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub last_name: String,
    pub first_name: String,
    pub patronymic: String,
    pub birth_date: String,
    /// Stored photo path, relative to the media root.
    pub photo: Option<String>,
}

impl FormValues {
    fn get(&self, field: PersonField) -> Option<String> {
        let text = match field {
            PersonField::LastName => &self.last_name,
            PersonField::FirstName => &self.first_name,
            PersonField::Patronymic => &self.patronymic,
            PersonField::BirthDate => &self.birth_date,
            PersonField::Photo => return self.photo.clone(),
        };
        Some(text.clone())
    }
}

impl From<&Person> for FormValues {
    fn from(person: &Person) -> Self {
        Self {
            last_name: person.last_name.clone(),
            first_name: person.first_name.clone(),
            patronymic: person.patronymic.clone(),
            birth_date: person.birth_date.format(BIRTH_DATE_FORMAT).to_string(),
            photo: person.photo.clone(),
        }
    }
}

/// A complete form document for Create or Edit.
#[derive(Debug, Clone, Serialize)]
pub struct PersonForm {
    pub action: String,
    pub method: &'static str,
    pub fields: Vec<FormField>,
}

impl PersonForm {
    pub fn new(
        action: impl Into<String>,
        values: &FormValues,
        errors: &FieldErrors,
        labels: Labels<'_>,
    ) -> Self {
        let mut fields = person_fields();
        for (field, kind) in fields.iter_mut().zip(PersonField::ALL) {
            field.value = values.get(kind);
            field.errors = errors.get(kind).to_vec();
        }
        localize_fields(&mut fields, labels);
        Self {
            action: action.into(),
            method: "post",
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// A photo that passed the image check.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub bytes: Bytes,
    pub extension: &'static str,
}

/// What a submission asks to do with the photo.
#[derive(Debug, Clone)]
pub enum PhotoChange {
    Keep,
    Replace(PhotoUpload),
    Clear,
}

/// A raw multipart submission of the person form.
#[derive(Debug, Clone, Default)]
pub struct PersonSubmission {
    pub values: FormValues,
    pub photo: Option<Bytes>,
    pub clear_photo: bool,
}

impl PersonSubmission {
    /// Check every field, returning the person to persist and the photo
    /// change, or all field errors at once.
    pub fn validate(&self) -> Result<(ValidPerson, PhotoChange), FieldErrors> {
        let input = PersonInput::new(
            &self.values.last_name,
            &self.values.first_name,
            &self.values.patronymic,
            &self.values.birth_date,
        );
        let (person, mut errors) = match input.into_valid() {
            Ok(person) => (Some(person), FieldErrors::new()),
            Err(errors) => (None, errors),
        };

        let change = match (&self.photo, self.clear_photo) {
            (Some(_), true) => {
                errors.add(PersonField::Photo, CONTRADICTORY_PHOTO_MESSAGE);
                None
            }
            (Some(bytes), false) => match photo_extension(bytes) {
                Some(extension) => Some(PhotoChange::Replace(PhotoUpload {
                    bytes: bytes.clone(),
                    extension,
                })),
                None => {
                    errors.add(PersonField::Photo, INVALID_IMAGE_MESSAGE);
                    None
                }
            },
            (None, true) => Some(PhotoChange::Clear),
            (None, false) => Some(PhotoChange::Keep),
        };

        match (person, change) {
            (Some(person), Some(change)) if errors.is_empty() => Ok((person, change)),
            _ => Err(errors),
        }
    }
}

/// Read the person form from a multipart body.
///
/// Unknown parts are ignored. A file part with no content counts as no
/// upload, the way browsers submit an untouched file input.
pub async fn read_submission(mut multipart: Multipart) -> AppResult<PersonSubmission> {
    let mut submission = PersonSubmission::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        if name == PersonField::Photo.name() {
            let data = field.bytes().await?;
            submission.photo = (!data.is_empty()).then_some(data);
            continue;
        }
        if name == PHOTO_CLEAR_FIELD {
            submission.clear_photo = true;
            continue;
        }

        let slot = match name.as_str() {
            "last_name" => &mut submission.values.last_name,
            "first_name" => &mut submission.values.first_name,
            "patronymic" => &mut submission.values.patronymic,
            "birth_date" => &mut submission.values.birth_date,
            _ => continue,
        };
        *slot = field.text().await?;
    }

    Ok(submission)
}
