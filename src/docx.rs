//! Reading, editing and writing WordprocessingML (`.docx`) packages.
//!
//! A `.docx` file is a ZIP archive. The visible text lives in XML parts: the
//! main document body plus any header and footer parts. Inside a part, text is
//! grouped into paragraphs (`<w:p>`), paragraphs into runs (`<w:r>`), and each
//! run stores its characters in one or more `<w:t>` text nodes.
//!
//! Replacement works one text node at a time. Word frequently splits a visually
//! continuous phrase over several runs (spell-check marks, revision ids,
//! formatting changes), and an occurrence that straddles two runs is left
//! alone so that formatting boundaries never move.

use crate::errors::{Error, Result};
use regex::{Captures, Regex};
use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Name of the main document part inside the package.
pub const MAIN_PART: &str = "word/document.xml";

/// A run text node. Group 1 holds the attributes, group 2 the escaped text.
static TEXT_NODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<w:t(\s[^>]*)?>([^<]*)</w:t>").expect("text node pattern is valid")
});

/// Tokens needed to rebuild paragraph text: paragraph open/close, text nodes,
/// tabs and line breaks.
static PARAGRAPH_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<w:p(?:\s[^>]*)?/?>|</w:p>|<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab/>|<w:br(?:\s[^>]*)?/>|<w:cr/>")
        .expect("paragraph token pattern is valid")
});

/// The legacy copy of a drawing (e.g. a VML textbox) that Word writes next to
/// the modern one. Its text duplicates the `mc:Choice` content.
static FALLBACK_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<mc:Fallback(?:\s[^>]*)?>.*?</mc:Fallback>")
        .expect("fallback pattern is valid")
});

/// Upper bound on the buffer reserved from a part's declared size.
const MAX_PREALLOCATION: usize = 1 << 24;

/// One XML part of the package that can contain document text.
#[derive(Debug, Clone)]
struct TextPart {
    name: String,
    xml: String,
    modified: bool,
}

/// An opened `.docx` document.
///
/// Only the text-bearing parts are held in memory. Everything else in the
/// archive (styles, images, relationships) is streamed through untouched when
/// the document is saved.
#[derive(Debug)]
pub struct DocxPackage {
    path: PathBuf,
    parts: Vec<TextPart>,
}

impl DocxPackage {
    /// Opens the document at `path` and loads its text parts.
    ///
    /// Fails if the file is not a ZIP archive or has no main document part.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;
        let mut parts = Vec::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();
            if !is_text_part(&name) {
                continue;
            }
            let declared = usize::try_from(entry.size()).unwrap_or(MAX_PREALLOCATION);
            let mut bytes = Vec::with_capacity(declared.min(MAX_PREALLOCATION));
            entry.read_to_end(&mut bytes)?;
            parts.push(TextPart {
                name,
                xml: String::from_utf8(bytes)?,
                modified: false,
            });
        }

        if !parts.iter().any(|p| p.name == MAIN_PART) {
            return Err(Error::Document {
                path: path.to_path_buf(),
                message: format!("missing {MAIN_PART}"),
            });
        }

        // Main body first, headers and footers after it in archive order.
        parts.sort_by_key(|p| p.name != MAIN_PART);

        Ok(Self {
            path: path.to_path_buf(),
            parts,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the text of every paragraph in the main document body.
    ///
    /// Paragraphs inside tables are included. Run text is concatenated, tabs
    /// become `\t` and line breaks become `\n`.
    pub fn paragraphs(&self) -> Vec<String> {
        self.parts
            .iter()
            .find(|p| p.name == MAIN_PART)
            .map(|p| paragraph_texts(&p.xml))
            .unwrap_or_default()
    }

    /// Returns the paragraphs of the main body joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs().join("\n")
    }

    /// Counts occurrences of `find` inside individual runs, across all parts.
    ///
    /// Text inside `mc:Fallback` blocks is not counted, since it repeats
    /// content already counted in the matching `mc:Choice`.
    pub fn count_occurrences(&self, find: &str) -> usize {
        if find.is_empty() {
            return 0;
        }
        let mut total = 0;
        for part in &self.parts {
            let fallbacks = fallback_ranges(&part.xml);
            for caps in TEXT_NODE.captures_iter(&part.xml) {
                if !in_ranges(&fallbacks, caps.get(0).map_or(0, |m| m.start())) {
                    total += unescape(&caps[2]).matches(find).count();
                }
            }
        }
        total
    }

    /// Replaces every occurrence of `find` with `replace` inside each run.
    ///
    /// Returns the number of occurrences replaced. Parts without a match are
    /// left byte-for-byte identical.
    pub fn replace_in_runs(&mut self, find: &str, replace: &str) -> usize {
        if find.is_empty() {
            return 0;
        }

        let mut total = 0;
        for part in &mut self.parts {
            let (xml, count) = replace_in_xml(&part.xml, find, replace);
            if count > 0 {
                log::debug!("{}: {count} replacement(s) in {}", self.path.display(), part.name);
                part.xml = xml;
                part.modified = true;
                total += count;
            }
        }
        total
    }

    /// Returns `true` if any part changed since the document was opened or last saved.
    pub fn is_modified(&self) -> bool {
        self.parts.iter().any(|p| p.modified)
    }

    /// Writes the document back to the path it was opened from.
    ///
    /// The new archive is assembled in a temporary file next to the original
    /// and then moved over it, keeping the original permissions.
    pub fn save(&mut self) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let source = File::open(&self.path)?;
        let mut archive = ZipArchive::new(BufReader::new(source))?;
        let mut temp_file = NamedTempFile::new_in(&parent)?;

        {
            let mut writer = ZipWriter::new(temp_file.as_file_mut());

            for i in 0..archive.len() {
                let entry = archive.by_index_raw(i)?;
                let replacement = self
                    .parts
                    .iter()
                    .find(|p| p.modified && p.name == entry.name());

                match replacement {
                    Some(part) => {
                        let options = SimpleFileOptions::default()
                            .compression_method(CompressionMethod::Deflated);
                        writer.start_file(part.name.as_str(), options)?;
                        writer.write_all(part.xml.as_bytes())?;
                    }
                    None => writer.raw_copy_file(entry)?,
                }
            }

            writer.finish()?;
        }
        drop(archive);

        let perms = fs::metadata(&self.path)?.permissions();
        fs::set_permissions(temp_file.path(), perms)?;
        temp_file.persist(&self.path)?;

        for part in &mut self.parts {
            part.modified = false;
        }
        Ok(())
    }
}

/// Returns `true` for archive entries that can hold visible document text.
fn is_text_part(name: &str) -> bool {
    if name == MAIN_PART {
        return true;
    }
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    !file.contains('/')
        && file.ends_with(".xml")
        && (file.starts_with("header") || file.starts_with("footer"))
}

/// Byte ranges of the `mc:Fallback` blocks in `xml`.
fn fallback_ranges(xml: &str) -> Vec<Range<usize>> {
    FALLBACK_BLOCK.find_iter(xml).map(|m| m.range()).collect()
}

fn in_ranges(ranges: &[Range<usize>], offset: usize) -> bool {
    ranges.iter().any(|r| r.contains(&offset))
}

/// Replaces `find` inside every `<w:t>` node of `xml`.
///
/// Returns the rewritten XML and the number of occurrences replaced outside
/// `mc:Fallback` blocks. Fallback copies are rewritten too, so both renderings
/// stay in sync, but they are not counted twice.
fn replace_in_xml(xml: &str, find: &str, replace: &str) -> (String, usize) {
    let fallbacks = fallback_ranges(xml);
    let mut count = 0;
    let mut fallback_hits = 0;
    let replaced = TEXT_NODE.replace_all(xml, |caps: &Captures| {
        let text = unescape(&caps[2]);
        let hits = text.matches(find).count();
        if hits == 0 {
            return caps[0].to_string();
        }
        if in_ranges(&fallbacks, caps.get(0).map_or(0, |m| m.start())) {
            fallback_hits += hits;
        } else {
            count += hits;
        }

        let new_text = text.replace(find, replace);
        let mut attrs = caps.get(1).map_or("", |m| m.as_str()).to_string();
        if needs_preserve(&new_text) && !attrs.contains("xml:space") {
            attrs.push_str(" xml:space=\"preserve\"");
        }
        format!("<w:t{attrs}>{}</w:t>", escape(&new_text))
    });
    if fallback_hits > 0 {
        log::debug!("{fallback_hits} fallback occurrence(s) rewritten without counting");
    }
    (replaced.into_owned(), count)
}

/// Rebuilds paragraph text from a part's XML.
fn paragraph_texts(xml: &str) -> Vec<String> {
    let mut open: Vec<String> = Vec::new();
    let mut done = Vec::new();

    for caps in PARAGRAPH_TOKEN.captures_iter(xml) {
        let token = &caps[0];
        if let Some(text) = caps.get(1) {
            if let Some(current) = open.last_mut() {
                current.push_str(&unescape(text.as_str()));
            }
        } else if token == "</w:p>" {
            if let Some(paragraph) = open.pop() {
                done.push(paragraph);
            }
        } else if token.starts_with("<w:p") {
            if token.ends_with("/>") {
                done.push(String::new());
            } else {
                open.push(String::new());
            }
        } else if let Some(current) = open.last_mut() {
            current.push(if token == "<w:tab/>" { '\t' } else { '\n' });
        }
    }
    done
}

/// Text containing leading or trailing whitespace must be marked as preserved,
/// otherwise Word collapses it.
fn needs_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace)
}

/// Escapes character data for inclusion in an XML text node.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decodes the predefined XML entities and numeric character references.
///
/// Anything that does not parse as a reference is kept verbatim.
pub fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
