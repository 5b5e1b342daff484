//! Text representative derivation and path helpers.

use crate::model::Representative;
use crate::parser::{TextLevel, TextLocation, TextSetting};

/// Split a path into its directory and file name.
///
/// Both `/` and `\` are treated as separators. The directory is empty when
/// the path has no separator.
pub(crate) fn split_path(path: &str) -> (&str, &str) {
    match path.rfind(['/', '\\']) {
        Some(i) => (&path[..i], &path[i + 1..]),
        None => ("", path),
    }
}

/// Join a directory and a file name with the directory's separator style.
///
/// `/` is kept only when the directory has no `\`.
pub(crate) fn join_path(dir: &str, file: &str) -> String {
    if dir.is_empty() {
        return file.to_string();
    }
    if dir.ends_with(['/', '\\']) {
        return format!("{}{}", dir, file);
    }
    let separator = if dir.contains('/') && !dir.contains('\\') {
        '/'
    } else {
        '\\'
    };
    format!("{}{}{}", dir, separator, file)
}

/// File name with its extension replaced.
fn with_extension(file: &str, extension: &str) -> String {
    let stem = match file.rfind('.') {
        Some(i) if i > 0 => &file[..i],
        _ => file,
    };
    format!("{}.{}", stem, extension)
}

/// Path of the text file that belongs to an image file.
pub fn text_path(image_path: &str, setting: &TextSetting) -> String {
    let (dir, file) = split_path(image_path);
    let file = with_extension(file, &setting.extension);

    match &setting.location {
        TextLocation::SameAsImages => join_path(dir, &file),
        TextLocation::AlternateLocation { find, replace } => {
            let dir = find.replace_all(dir, replace.as_str());
            join_path(&dir, &file)
        }
    }
}

/// Derive a text representative from an image representative.
///
/// Returns `None` when the level is [`TextLevel::None`] or the image
/// representative has no files.
pub fn derive_text(
    image: &Representative,
    setting: &TextSetting,
    name: &str,
) -> Option<Representative> {
    let files: Vec<String> = match setting.level {
        TextLevel::None => return None,
        TextLevel::Page => image.files.iter().map(|f| text_path(f, setting)).collect(),
        TextLevel::Doc => image
            .first_file()
            .map(|f| text_path(f, setting))
            .into_iter()
            .collect(),
    };

    if files.is_empty() {
        return None;
    }
    Some(Representative::text(name).with_files(files))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn images() -> Representative {
        Representative::image("default")
            .with_file("VOL001\\IMAGES\\0001\\ABC0001.tif")
            .with_file("VOL001\\IMAGES\\0001\\ABC0002.tif")
    }

    #[test]
    fn test_split_and_join() {
        assert_eq!(split_path("a/b/c.tif"), ("a/b", "c.tif"));
        assert_eq!(split_path("a\\b\\c.tif"), ("a\\b", "c.tif"));
        assert_eq!(split_path("c.tif"), ("", "c.tif"));
        assert_eq!(join_path("a\\b", "c.tif"), "a\\b\\c.tif");
        assert_eq!(join_path("a/b", "c.tif"), "a/b/c.tif");
        assert_eq!(join_path("a/b/", "c.tif"), "a/b/c.tif");
        assert_eq!(join_path("", "c.tif"), "c.tif");
        assert_eq!(join_path("IMG", "c.tif"), "IMG\\c.tif");
    }

    #[test]
    fn test_page_level_same_location() {
        let setting = TextSetting::new(TextLevel::Page);
        let text = derive_text(&images(), &setting, "ocr").unwrap();
        assert_eq!(text.name, "ocr");
        let files: Vec<_> = text.files.iter().map(String::as_str).collect();
        assert_eq!(
            files,
            vec![
                "VOL001\\IMAGES\\0001\\ABC0001.txt",
                "VOL001\\IMAGES\\0001\\ABC0002.txt"
            ]
        );
    }

    #[test]
    fn test_doc_level_uses_first_page() {
        let setting = TextSetting::new(TextLevel::Doc).with_extension("TXT");
        let text = derive_text(&images(), &setting, "default").unwrap();
        assert_eq!(text.file_count(), 1);
        assert_eq!(text.first_file(), Some("VOL001\\IMAGES\\0001\\ABC0001.TXT"));
    }

    #[test]
    fn test_alternate_location_rewrites_directory_only() {
        let find = Regex::new("IMAGES").unwrap();
        let setting = TextSetting::new(TextLevel::Doc)
            .with_location(TextLocation::alternate(find, "TEXT"));
        let text = derive_text(&images(), &setting, "default").unwrap();
        assert_eq!(text.first_file(), Some("VOL001\\TEXT\\0001\\ABC0001.txt"));

        let find = Regex::new("ABC").unwrap();
        let setting =
            TextSetting::new(TextLevel::Doc).with_location(TextLocation::alternate(find, "XYZ"));
        let text = derive_text(&images(), &setting, "default").unwrap();
        assert_eq!(text.first_file(), Some("VOL001\\IMAGES\\0001\\ABC0001.txt"));
    }

    #[test]
    fn test_no_text_without_files_or_level() {
        let setting = TextSetting::new(TextLevel::Page);
        assert!(derive_text(&Representative::image("default"), &setting, "default").is_none());
        assert!(derive_text(&images(), &TextSetting::default(), "default").is_none());
    }
}
