use estate_services::UploadFile;

pub fn image(name: &str) -> UploadFile {
    UploadFile {
        payload: format!("bytes of {}", name).into_bytes(),
        filename_hint: name.to_string(),
    }
}

/// `count` files named photo_{i}.jpg
pub fn images(count: usize) -> Vec<UploadFile> {
    (0..count).map(|i| image(&format!("photo_{}.jpg", i))).collect()
}
