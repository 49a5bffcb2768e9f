//! Multipart parsing for property creation

use axum::extract::Multipart;
use estate_core::models::NewProperty;
use estate_core::AppError;
use estate_services::UploadFile;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Fields of `POST /properties` as sent by the client.
#[derive(Debug, Default)]
pub struct PropertyForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price: Option<String>,
    pub property_type_id: Option<String>,
    pub property_category_id: Option<String>,
    pub images: Vec<UploadFile>,
}

impl PropertyForm {
    /// Parse the text fields into a record owned by `owner_id`, returning the
    /// images alongside in upload order.
    pub fn into_new_property(self, owner_id: i64) -> Result<(NewProperty, Vec<UploadFile>), AppError> {
        let property = NewProperty {
            name: required(self.name, "name")?,
            description: self.description.unwrap_or_default(),
            location: required(self.location, "location")?,
            price: parse_field::<Decimal>(self.price, "price")?,
            owner_id,
            property_type_id: parse_field::<i64>(self.property_type_id, "propertyTypeId")?,
            property_category_id: parse_field::<i64>(
                self.property_category_id,
                "propertyCategoryId",
            )?,
        };

        if property.price.is_sign_negative() {
            return Err(AppError::InvalidInput(
                "Price must not be negative".to_string(),
            ));
        }

        Ok((property, self.images))
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("Missing field: {}", field)))
}

fn parse_field<T: FromStr>(value: Option<String>, field: &str) -> Result<T, AppError> {
    required(value, field)?
        .parse::<T>()
        .map_err(|_| AppError::InvalidInput(format!("Invalid {}", field)))
}

pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Read every field of the form. Files arrive under `images` (or `images[]`)
/// and keep the order in which they were sent.
pub async fn read_property_form(
    mut multipart: Multipart,
    max_file_size: usize,
) -> Result<PropertyForm, AppError> {
    let mut form = PropertyForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == "images" || field_name == "images[]" {
            let filename_hint = field.file_name().map(|s| s.to_string()).unwrap_or_default();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;
            validate_file_size(data.len(), max_file_size)?;
            form.images.push(UploadFile {
                payload: data.to_vec(),
                filename_hint,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read field {}: {}", field_name, e)))?;

        match field_name.as_str() {
            "name" => form.name = Some(value),
            "description" => form.description = Some(value),
            "location" => form.location = Some(value),
            "price" => form.price = Some(value),
            "propertyTypeId" => form.property_type_id = Some(value),
            "propertyCategoryId" => form.property_category_id = Some(value),
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    const BOUNDARY: &str = "estate-boundary";

    fn text_part(name: &str, value: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
    }

    fn file_part(filename: &str, body: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{filename}\"\r\nContent-Type: image/jpeg\r\n\r\n{body}\r\n"
        )
    }

    async fn multipart(body: String) -> Multipart {
        let request = Request::builder()
            .method("POST")
            .uri("/properties")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    fn complete_form() -> String {
        [
            text_part("name", "Harbour loft"),
            text_part("description", "Sea view"),
            text_part("location", "Porto"),
            text_part("price", "250000.50"),
            text_part("propertyTypeId", "1"),
            text_part("propertyCategoryId", "2"),
            file_part("front.jpg", "first"),
            file_part("back.png", "second"),
        ]
        .concat()
            + &format!("--{BOUNDARY}--\r\n")
    }

    #[tokio::test]
    async fn test_form_keeps_images_in_order() {
        let form = read_property_form(multipart(complete_form()).await, 1024)
            .await
            .unwrap();
        let (property, images) = form.into_new_property(9).unwrap();

        assert_eq!(property.name, "Harbour loft");
        assert_eq!(property.owner_id, 9);
        assert_eq!(property.price, Decimal::new(25_000_050, 2));
        assert_eq!(property.property_category_id, 2);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].filename_hint, "front.jpg");
        assert_eq!(images[0].payload, b"first".to_vec());
        assert_eq!(images[1].filename_hint, "back.png");
    }

    #[tokio::test]
    async fn test_oversized_image_is_rejected() {
        let err = read_property_form(multipart(complete_form()).await, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }

    #[test]
    fn test_bad_numbers_are_invalid_input() {
        let form = PropertyForm {
            name: Some("Loft".to_string()),
            location: Some("Porto".to_string()),
            price: Some("cheap".to_string()),
            property_type_id: Some("1".to_string()),
            property_category_id: Some("1".to_string()),
            ..Default::default()
        };
        let err = form.into_new_property(1).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(msg) if msg == "Invalid price"));
    }

    #[test]
    fn test_missing_name_is_reported() {
        let err = PropertyForm::default().into_new_property(1).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(msg) if msg == "Missing field: name"));
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let form = PropertyForm {
            name: Some("Loft".to_string()),
            location: Some("Porto".to_string()),
            price: Some("-1".to_string()),
            property_type_id: Some("1".to_string()),
            property_category_id: Some("1".to_string()),
            ..Default::default()
        };
        assert!(form.into_new_property(1).is_err());
    }
}
