use std::fs;
use std::path;

use reqwest::multipart::{Form, Part};

use crate::error::{Error, Result};

/// Form field the document service reads the upload from.
pub const UPLOAD_FIELD: &str = "file";

/// A file to hand to the document service. The contents are sent as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub contents: Vec<u8>,
}

impl DocumentFile {
    pub fn new<S, B>(file_name: S, contents: B) -> Self
    where
        S: Into<String>,
        B: Into<Vec<u8>>,
    {
        DocumentFile {
            file_name: file_name.into(),
            content_type: None,
            contents: contents.into(),
        }
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn from_path(p: &path::Path) -> Result<Self> {
        let file_name = p
            .file_name()
            .ok_or(Error::MissingFileName)?
            .to_string_lossy()
            .into_owned();
        Ok(DocumentFile::new(file_name, fs::read(p)?))
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub(crate) fn into_part(self) -> Result<Part> {
        let part = Part::bytes(self.contents).file_name(self.file_name);
        Ok(match self.content_type {
            Some(ct) => part.mime_str(&ct)?,
            None => part,
        })
    }

    /// Single-part multipart body with the file under [`UPLOAD_FIELD`].
    pub(crate) fn into_form(self) -> Result<Form> {
        Ok(Form::new().part(UPLOAD_FIELD, self.into_part()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_path_takes_last_component() {
        let dir = std::env::temp_dir().join(format!("receiving-docs-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let p = dir.join("invoice.txt");
        fs::write(&p, b"Test Invoice\n").unwrap();

        let doc = DocumentFile::from_path(&p).unwrap();
        assert_eq!(doc.file_name, "invoice.txt");
        assert_eq!(doc.contents, b"Test Invoice\n");
        assert_eq!(doc.content_type, None);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn from_path_without_file_name() {
        assert!(matches!(
            DocumentFile::from_path(path::Path::new("/")),
            Err(Error::MissingFileName)
        ));
    }

    #[test]
    fn from_path_missing_file() {
        assert!(matches!(
            DocumentFile::from_path(path::Path::new("/definitely/not/here.pdf")),
            Err(Error::IoError { .. })
        ));
    }

    #[test]
    fn bad_content_type_is_rejected() {
        let doc = DocumentFile::new("a.bin", vec![1, 2, 3]).with_content_type("not a mime");
        assert!(matches!(doc.into_form(), Err(Error::HttpError { .. })));
    }

    #[test]
    fn good_content_type_is_accepted() {
        let doc = DocumentFile::new("a.pdf", vec![0u8; 4]).with_content_type("application/pdf");
        assert_eq!(doc.len(), 4);
        assert!(doc.into_form().is_ok());
    }
}
