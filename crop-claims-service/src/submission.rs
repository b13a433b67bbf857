//! Parse-and-validate step between the raw form payload and the service.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::ClaimError;
use crate::models::{ClaimSubmission, PhotoUpload};

pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;
pub const ACCEPTED_PHOTO_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

const MIN_NAME_CHARS: usize = 2;
const MIN_DESCRIPTION_CHARS: usize = 10;

/// Untyped form fields as they arrive from the caller.
#[derive(Debug, Clone, Default)]
pub struct RawClaimForm {
    pub name: Option<String>,
    pub crop_type: Option<String>,
    pub damage_description: Option<String>,
    pub photo: Option<PhotoUpload>,
}

impl RawClaimForm {
    pub fn validate(self) -> Result<ClaimSubmission, ClaimError> {
        let name = required_text("name", self.name, MIN_NAME_CHARS)?;
        let crop_type = required_text("cropType", self.crop_type, 1)?;
        let damage_description =
            required_text("damageDescription", self.damage_description, MIN_DESCRIPTION_CHARS)?;

        let photo = match self.photo {
            Some(photo) if photo.bytes.is_empty() => None,
            Some(photo) => Some(validate_photo(photo)?),
            None => None,
        };

        Ok(ClaimSubmission {
            name,
            crop_type,
            damage_description,
            photo,
        })
    }
}

fn required_text(field: &str, value: Option<String>, min_chars: usize) -> Result<String, ClaimError> {
    let value = value
        .map(|v| v.trim().to_string())
        .ok_or_else(|| ClaimError::InvalidInput(format!("{} is required", field)))?;

    if value.chars().count() < min_chars {
        return Err(ClaimError::InvalidInput(format!(
            "{} must be at least {} characters",
            field, min_chars
        )));
    }
    Ok(value)
}

fn validate_photo(photo: PhotoUpload) -> Result<PhotoUpload, ClaimError> {
    if photo.bytes.len() > MAX_PHOTO_BYTES {
        return Err(ClaimError::InvalidInput(format!(
            "photo is {} bytes, max is {}",
            photo.bytes.len(),
            MAX_PHOTO_BYTES
        )));
    }
    if !ACCEPTED_PHOTO_TYPES.contains(&photo.content_type.as_str()) {
        return Err(ClaimError::InvalidInput(format!(
            "unsupported photo type {}",
            photo.content_type
        )));
    }
    Ok(photo)
}

/// Encodes a validated photo as `data:<mime>;base64,<payload>`.
pub fn to_data_uri(photo: &PhotoUpload) -> Result<String, ClaimError> {
    if photo.content_type.is_empty() || photo.content_type.contains([';', ',']) {
        return Err(ClaimError::MediaProcessing(format!(
            "cannot build data URI for content type {:?}",
            photo.content_type
        )));
    }
    Ok(format!(
        "data:{};base64,{}",
        photo.content_type,
        STANDARD.encode(&photo.bytes)
    ))
}
