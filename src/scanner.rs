use crate::docx::DocxPackage;
use crate::errors::Result;
use crate::templates::TemplateWhitelist;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Checks that `folder` is an existing directory.
///
/// A missing folder is a recoverable condition, so this logs a warning and
/// returns `false` instead of failing.
pub fn verify_folder(folder: &Path) -> bool {
    if !folder.is_dir() {
        log::warn!("Folder not found: {}", folder.display());
        return false;
    }
    true
}

/// Lists the template documents directly inside `folder`.
///
/// A file is eligible when it is a regular file, its extension is `docx`
/// (any case), and its name starts with a whitelisted prefix. Sub-folders are
/// not searched. The result is sorted by file name.
pub fn find_docx_files(folder: &Path, whitelist: &TemplateWhitelist) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let mut walker = WalkBuilder::new(folder);
    walker.max_depth(Some(1)).standard_filters(false);

    for entry in walker.build() {
        let entry = entry?;
        if entry.depth() == 0 {
            continue;
        }
        let path = entry.path();
        if path.is_file() && is_template(path, whitelist) {
            files.push(path.to_path_buf());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if files.is_empty() {
        log::warn!("No matching .docx files found in {}", folder.display());
    } else {
        log::debug!("Found {} template(s) in {}", files.len(), folder.display());
    }

    Ok(files)
}

/// Returns `true` if the path names a whitelisted `.docx` document.
pub fn is_template(path: &Path, whitelist: &TemplateWhitelist) -> bool {
    let is_docx = path
        .extension()
        .and_then(|os| os.to_str())
        .map(|s| s.eq_ignore_ascii_case("docx"))
        .unwrap_or(false);

    is_docx
        && path
            .file_name()
            .and_then(|os| os.to_str())
            .map(|name| whitelist.matches(name))
            .unwrap_or(false)
}

/// The main entry point for the `scan` command.
///
/// Lists every eligible template in `dir`. When `find` is given, each file is
/// opened read-only and the number of occurrences inside its runs is shown.
pub fn run_scan(dir: PathBuf, find: Option<String>, prefixes: Vec<String>) -> Result<()> {
    let whitelist = if prefixes.is_empty() {
        TemplateWhitelist::default()
    } else {
        TemplateWhitelist::new(prefixes)
    };

    if !verify_folder(&dir) {
        return Err(format!("Folder not found: {}", dir.display()).into());
    }

    let files = find_docx_files(&dir, &whitelist)?;
    if files.is_empty() {
        return Err("No .docx files found.".into());
    }

    let find = find.filter(|f| !f.trim().is_empty());
    let mut total = 0;

    for path in &files {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        match &find {
            Some(needle) => match DocxPackage::open(path) {
                Ok(package) => {
                    let count = package.count_occurrences(needle);
                    total += count;
                    println!("{count:>5}  {name}");
                }
                Err(e) => eprintln!("  ERR  {name}: {e}"),
            },
            None => println!("{name}"),
        }
    }

    println!("\n{}", "-".repeat(50));
    println!("Templates found : {}", files.len());
    if let Some(needle) = &find {
        println!("Occurrences of '{needle}': {total}");
    }

    Ok(())
}
