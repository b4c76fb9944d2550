// tests/common.rs

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

// Helper function to get the binary command
#[allow(dead_code)] // Not every integration test runs the binary.
pub fn docsub_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("docsub"))
}

/// Writes a minimal Word document with one run per paragraph.
#[allow(dead_code)]
pub fn create_docx(path: &Path, paragraphs: &[&str]) -> Result<(), Box<dyn std::error::Error>> {
    let body: String = paragraphs
        .iter()
        .map(|text| {
            format!(
                "<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
                docsub::docx::escape(text)
            )
        })
        .collect();
    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
<w:body>{body}</w:body></w:document>"
    );

    let mut writer = ZipWriter::new(File::create(path)?);
    writer.start_file("[Content_Types].xml", SimpleFileOptions::default())?;
    writer.write_all(b"<?xml version=\"1.0\"?><Types/>")?;
    writer.start_file("word/document.xml", SimpleFileOptions::default())?;
    writer.write_all(document.as_bytes())?;
    writer.finish()?;
    Ok(())
}

/// The paragraphs of a document joined by newlines.
#[allow(dead_code)]
pub fn read_text(path: &Path) -> String {
    docsub::DocxPackage::open(path)
        .map(|doc| doc.text())
        .unwrap_or_default()
}
