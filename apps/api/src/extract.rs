//! Raw-text extraction adapters. Uploads arrive as bytes plus a filename;
//! the screening core only ever sees the plain text produced here.
//!
//! Unsupported formats and empty documents are rejected loudly at upload
//! time so the ranking engine never receives invalid candidate text.

use std::io::Read;

use crate::errors::AppError;

/// Extracts plain text from an uploaded file, dispatching on the filename
/// extension. Supported: .txt, .pdf, .docx, .csv.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, AppError> {
    let extension = filename
        .rsplit_once('.')
        .filter(|(stem, _)| !stem.is_empty())
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("txt") => Ok(String::from_utf8_lossy(bytes).into_owned()),
        Some("pdf") => pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            AppError::InvalidInput(format!("Could not extract text from '{filename}': {e}"))
        }),
        Some("docx") => extract_docx(filename, bytes),
        Some("csv") => Ok(flatten_csv(&String::from_utf8_lossy(bytes))),
        _ => Err(AppError::InvalidInput(format!(
            "Unsupported file format: '{filename}' (expected .txt, .pdf, .docx or .csv)"
        ))),
    }
}

/// A .docx is a zip archive with the visible text in `word/document.xml`,
/// held in `<w:t>` runs. Unzips that one entry and pulls the runs out.
fn extract_docx(filename: &str, bytes: &[u8]) -> Result<String, AppError> {
    let invalid =
        |e: &dyn std::fmt::Display| AppError::InvalidInput(format!("Could not extract text from '{filename}': {e}"));

    let mut archive =
        zip::ZipArchive::new(std::io::Cursor::new(bytes)).map_err(|e| invalid(&e))?;
    let mut entry = archive.by_name("word/document.xml").map_err(|e| invalid(&e))?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml).map_err(|e| invalid(&e))?;

    Ok(document_xml_text(&xml))
}

/// Collects the character content of every `<w:t>` run in document order.
/// A `</w:p>` between runs becomes a newline, one line per paragraph.
fn document_xml_text(xml: &str) -> String {
    let mut out = String::new();
    let mut pos = 0;

    while let Some(found) = xml[pos..].find("<w:t") {
        let tag_start = pos + found;
        let after_name = &xml[tag_start + 4..];

        // "<w:t" is a prefix of "<w:tbl", "<w:tc" etc; only a run tag may
        // continue with '>', '/', or an attribute
        if !matches!(
            after_name.bytes().next(),
            Some(b'>' | b'/' | b' ' | b'\t' | b'\r' | b'\n')
        ) {
            pos = tag_start + 4;
            continue;
        }

        if !out.is_empty() && xml[pos..tag_start].contains("</w:p>") {
            out.push('\n');
        }

        let Some(gt) = after_name.find('>').map(|i| tag_start + 4 + i) else {
            break;
        };
        if xml.as_bytes()[gt - 1] == b'/' {
            pos = gt + 1; // self-closing empty run
            continue;
        }

        let content_start = gt + 1;
        let Some(end) = xml[content_start..].find("</w:t>").map(|i| content_start + i) else {
            break;
        };
        push_unescaped(&mut out, &xml[content_start..end]);
        pos = end + "</w:t>".len();
    }

    out
}

/// Resolves the five predefined XML entities. `&amp;` goes last so the
/// others cannot be double-decoded.
fn push_unescaped(out: &mut String, s: &str) {
    let decoded = s
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&");
    out.push_str(&decoded);
}

/// Flattens a CSV into one space-joined string of cell values. Embedding
/// input only needs the words; quoting fidelity does not matter here.
fn flatten_csv(raw: &str) -> String {
    raw.lines()
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Builds a minimal in-memory .docx: a zip holding word/document.xml.
    fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_txt_decodes_utf8() {
        let text = extract_text("resume.txt", "Senior engineer, Rust".as_bytes()).unwrap();
        assert_eq!(text, "Senior engineer, Rust");
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let text = extract_text("RESUME.TXT", b"hello").unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_docx_text_runs_extracted() {
        let bytes = docx_bytes(
            "<w:document><w:body>\
             <w:p><w:r><w:t>Senior backend engineer</w:t></w:r></w:p>\
             <w:p><w:r><w:t xml:space=\"preserve\">Rust &amp; SQL</w:t></w:r></w:p>\
             </w:body></w:document>",
        );
        let text = extract_text("resume.docx", &bytes).unwrap();
        assert_eq!(text, "Senior backend engineer\nRust & SQL");
    }

    #[test]
    fn test_docx_table_tags_are_not_text_runs() {
        let bytes = docx_bytes(
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>",
        );
        let text = extract_text("table.docx", &bytes).unwrap();
        assert_eq!(text, "cell");
    }

    #[test]
    fn test_docx_empty_self_closing_run() {
        let bytes = docx_bytes("<w:p><w:r><w:t/></w:r><w:r><w:t>after</w:t></w:r></w:p>");
        let text = extract_text("gap.docx", &bytes).unwrap();
        assert_eq!(text, "after");
    }

    #[test]
    fn test_docx_that_is_not_a_zip_is_rejected_by_name() {
        let err = extract_text("broken.docx", b"not a zip archive").unwrap_err();
        match err {
            AppError::InvalidInput(msg) => assert!(msg.contains("broken.docx")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_csv_cells_flattened_with_spaces() {
        let raw = b"name,skill\nAlice,Rust\nBob,SQL\n";
        let text = extract_text("skills.csv", raw).unwrap();
        assert_eq!(text, "name skill Alice Rust Bob SQL");
    }

    #[test]
    fn test_csv_skips_empty_cells() {
        let text = extract_text("sparse.csv", b"a,,b\n,c,").unwrap();
        assert_eq!(text, "a b c");
    }

    #[test]
    fn test_unknown_extension_is_rejected_by_name() {
        let err = extract_text("resume.odt", b"...").unwrap_err();
        match err {
            AppError::InvalidInput(msg) => assert!(msg.contains("resume.odt")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_extension_is_rejected() {
        assert!(extract_text("resume", b"...").is_err());
    }

    #[test]
    fn test_bare_dotfile_is_not_an_extension() {
        assert!(extract_text(".txt", b"hidden").is_err());
    }
}
