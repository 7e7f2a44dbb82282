//! `read` output formatting and owner-only file writes.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};

/// How variable names are generated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameStyle<'a> {
    /// Joined to the name with `_`
    pub prefix: Option<&'a str>,
    pub upper: bool,
}

/// Variable name for a parameter.
///
/// Uses `explicit` when set, otherwise the last path segment.
pub fn env_name(path: &str, explicit: Option<&str>, style: NameStyle<'_>) -> String {
    let base = explicit
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| path.rsplit('/').next().unwrap_or(path));

    let name = match style.prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}_{}", prefix, base),
        None => base.to_string(),
    };

    if style.upper {
        name.to_uppercase()
    } else {
        name
    }
}

/// Double-quote a value for a POSIX shell `export` line.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            // Cc characters all fit in one byte
            c if c.is_control() => quoted.push_str(&format!("\\x{:02x}", u32::from(c))),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}


/// `export NAME="value"` followed by a newline.
pub fn export_line(name: &str, value: &str) -> String {
    format!("export {}={}\n", name, quote(value))
}

fn output_error(path: &Path, source: std::io::Error) -> Error {
    Error::Output {
        path: path.display().to_string(),
        source,
    }
}

/// Create-or-truncate `path` and write `contents` in one go.
///
/// Missing parent directories are created `0700` and the file is `0600`
/// before any byte is written, since values may be decrypted secrets.
pub fn write_private_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            let mut builder = fs::DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                builder.mode(0o700);
            }
            builder.create(dir).map_err(|e| output_error(dir, e))?;
        }
    }

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path).map_err(|e| output_error(path, e))?;

    // An existing file keeps its old mode through open()
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| output_error(path, e))?;
    }

    file.write_all(contents).map_err(|e| output_error(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_name_from_last_segment() {
        let style = NameStyle {
            prefix: None,
            upper: true,
        };
        assert_eq!(env_name("/myapp/db/url", None, style), "URL");
    }

    #[test]
    fn test_env_name_explicit_and_prefix() {
        let style = NameStyle {
            prefix: Some("app"),
            upper: false,
        };
        assert_eq!(env_name("/myapp/db/url", Some("db_url"), style), "app_db_url");
        assert_eq!(env_name("/myapp/db/url", Some(""), style), "app_url");
    }

    #[test]
    fn test_env_name_lower_when_upper_disabled() {
        assert_eq!(env_name("/a/MixedCase", None, NameStyle::default()), "MixedCase");
    }

    #[test]
    fn test_export_line_quoting() {
        assert_eq!(export_line("X", "plain"), "export X=\"plain\"\n");
        assert_eq!(
            export_line("X", "a \"b\" \\c\nd"),
            "export X=\"a \\\"b\\\" \\\\c\\nd\"\n"
        );
    }

    #[test]
    fn test_export_line_escapes_control_characters() {
        assert_eq!(
            export_line("X", "\x1b[31mred\x07"),
            "export X=\"\\x1b[31mred\\x07\"\n"
        );
        assert_eq!(export_line("X", "a\u{7f}b"), "export X=\"a\\x7fb\"\n");
        assert_eq!(export_line("X", "caf\u{e9}"), "export X=\"caf\u{e9}\"\n");
    }

    #[test]
    fn test_write_private_file_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/app.env");

        write_private_file(&path, b"export A=\"1\"\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "export A=\"1\"\n");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let file_mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
            assert_eq!(file_mode, 0o600);
            let dir_mode = fs::metadata(path.parent().unwrap()).unwrap().permissions().mode() & 0o777;
            assert_eq!(dir_mode, 0o700);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_write_private_file_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.env");
        fs::write(&path, "old contents that are longer").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_private_file(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o600);
    }
}
